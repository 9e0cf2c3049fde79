use anyhow::Result;
use sentiment_batch_classify::config::Config;
use sentiment_batch_classify::logger;
use sentiment_batch_classify::orchestrator::App;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logger::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
