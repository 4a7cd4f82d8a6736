use clap::Parser;
use email_host_etl::utils::error::exit_code;
use email_host_etl::utils::{logger, validation::Validate};
use email_host_etl::{run_job, CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting email-host-etl");
    tracing::debug!("CLI config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(exit_code(&e));
    }

    if config.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    match run_job(config).await {
        Ok(report) => {
            tracing::info!("✅ CSV processing complete: {}", report.output_path);
            for (label, count) in &report.summary.labels {
                tracing::info!("  {:<14} {}", label, count);
            }
            println!("✅ CSV processing complete.");
            println!("📁 Output saved to: {}", report.output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Job failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            let code = exit_code(&e);
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
