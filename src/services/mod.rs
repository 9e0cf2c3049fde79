pub mod checkpoint;
pub mod lexicon;
pub mod llm_service;
pub mod response_parser;

pub use checkpoint::CheckpointStore;
pub use llm_service::{LlmService, RemoteClassifier};
