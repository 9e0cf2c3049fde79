pub mod loaders;
pub mod record;

pub use loaders::load_comments;
pub use record::{
    ClassificationResult, Comment, LocalScore, ParsedRecord, SentimentLabel, ERROR_LABEL,
    PARSE_ERROR_LABEL,
};
