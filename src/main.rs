use anyhow::Context;
use clap::Parser;
use royalty_etl::app::report;
use royalty_etl::utils::{logger, validation::Validate};
use royalty_etl::{CliConfig, EtlEngine, LocalStorage, TermPipeline};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose, config.log_file.as_deref().map(Path::new))
            .context("failed to open log file")?;
    }

    tracing::info!("Starting royalty-etl");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 輸入與輸出路徑都相對於目前目錄
    let storage = LocalStorage::new(".".to_string());
    let pipeline = TermPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    let code = match engine.run().await {
        Ok(summary) => report::report_success(&summary),
        Err(e) => report::report_failure(&e),
    };
    if code > 0 {
        std::process::exit(code);
    }

    Ok(())
}
