use anyhow::Result;
use question_bank_fix::utils::logging;
use question_bank_fix::{App, Config};
use tracing::error;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let app = App::initialize(config).await?;
    if let Err(e) = app.run().await {
        error!("❌ 运行失败: {:#}", e);
        return Err(e);
    }

    Ok(())
}
