use anyhow::Context;
use clap::Parser;
use royalty_etl::app::report;
use royalty_etl::utils::{logger, validation::Validate};
use royalty_etl::{EtlEngine, LocalStorage, RoyaltyPipeline, TomlConfig};
use std::path::Path;

#[derive(Parser)]
#[command(name = "royalty-fees")]
#[command(about = "Fill royalty and renewal fees into a term result workbook")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "royalty-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Compute renewals relative to this date (dd/mm/YYYY)
    #[arg(long)]
    as_of: Option<String>,

    /// Dry run - show the fee table and outputs without processing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    logger::init_cli_logger(args.verbose, config.log_file().map(Path::new))
        .context("failed to open log file")?;

    tracing::info!("🚀 Starting royalty-fees");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 應用命令列覆蓋設定
    if let Some(as_of) = &args.as_of {
        config.terms.as_of = Some(as_of.clone());
        tracing::info!("🔧 Renewal date overridden to: {}", as_of);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual processing will occur");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".".to_string());
    let pipeline = RoyaltyPipeline::new(storage, config).context("invalid fee table")?;
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

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Pipeline: {} v{}",
        config.pipeline.name,
        config.pipeline.version.as_deref().unwrap_or("0.1.0")
    );
    if let Some(description) = &config.pipeline.description {
        println!("  Description: {}", description);
    }
    println!("  Inputs: {}", config.source.input_files.join(", "));
    println!("  Output: {}", config.load.output_path);
    println!("  Formats: {}", config.load.output_formats.join(", "));

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    use royalty_etl::core::ConfigProvider;

    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📅 Terms:");
    println!("  Initial term: {} years", config.initial_term());
    println!("  Renewal term: {} years", config.ext_term());
    match config.as_of() {
        Some(date) => println!("  As of: {}", date.format("%d/%m/%Y")),
        None => println!("  As of: today"),
    }

    println!();
    println!("💰 Fee Table ({} usage types):", config.royalty.rates.len());
    for rate in &config.royalty.rates {
        println!(
            "  {}: full {} / half {} / renew {}",
            rate.usage_type, rate.full, rate.half, rate.renew
        );
    }
    println!(
        "  Half rate below: {} seconds",
        config.short_usage_seconds()
    );
    println!(
        "  Renewal policy: {:?} (ratio {})",
        config.renewal_policy(),
        config.renewal_ratio()
    );

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.load.output_path);
    if let Some(file) = &config.load.output_file {
        println!("  File: {}", file);
    }
    println!("  Backup: {}", config.auto_backup());

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
