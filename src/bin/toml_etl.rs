use anyhow::Context;
use clap::Parser;
use erdos_etl::core::{ConfigProvider, Pipeline};
use erdos_etl::utils::error::ErrorSeverity;
use erdos_etl::utils::validation::{check_integrity, Validate};
use erdos_etl::utils::logger;
use erdos_etl::{DatasetPipeline, EtlEngine, LocalStorage, TomlConfig};

#[derive(Parser)]
#[command(name = "erdos-toml")]
#[command(about = "Dataset run driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "erdos-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override validation strictness from config
    #[arg(long)]
    strict: Option<bool>,

    /// Load and check the dataset without writing any output
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("failed to load config file '{}'", args.config))?;

    if config.json_logs() {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting TOML-based dataset run");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    if let Some(strict) = args.strict {
        config.validation.strict = strict;
        tracing::info!("🔧 Strict validation overridden to: {}", strict);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no output will be written");
        return perform_dry_run(config).await;
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let pipeline = DatasetPipeline::new(LocalStorage::default(), config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            println!("✅ Dataset processed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!("  Articles: {}", config.articles_path());
    println!("  Authors: {}", config.authors_path());
    println!("  Authorships: {}", config.authorships_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.load.output_formats.join(", "));
    if let Some(archive) = config.archive_name() {
        println!("  Archive: {}", archive);
    }
    println!("  Strict validation: {}", config.strict());
    if let Some((from, to)) = config.erdos_query() {
        println!("  Erdős query: {} -> {}", from, to);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

async fn perform_dry_run(config: TomlConfig) -> anyhow::Result<()> {
    let pipeline = DatasetPipeline::new(LocalStorage::default(), config);
    let raw = pipeline.extract().await.context("failed to read the dataset")?;

    println!("🔍 Dry Run Analysis:");
    println!("  Articles: {}", raw.articles.len());
    println!("  Authors: {}", raw.authors.len());
    println!("  Authorships: {}", raw.authorships.len());

    let report = check_integrity(&raw);
    if report.is_clean() {
        println!("  ✅ All integrity checks passed");
    } else {
        println!("  ⚠️ {} integrity violation(s):", report.violations().len());
        for violation in report.violations() {
            println!("    - {}", violation);
        }
    }

    println!();
    println!("✅ Dry run complete.");
    Ok(())
}
