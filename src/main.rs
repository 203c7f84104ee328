use anyhow::Result;

use maps_lead_scraper::config::Config;
use maps_lead_scraper::orchestrator::App;
use maps_lead_scraper::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
