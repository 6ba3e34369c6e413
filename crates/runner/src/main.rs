use anyhow::Context as _;
use meridian_runner::{Context, RunnerConfig, load_config, load_default_config};

/// Environment variable naming the config file
const CONFIG_ENV: &str = "MERIDIAN_CONFIG";

fn print_help() {
    eprintln!(
        r#"Meridian - market snapshot streaming and bot orchestration

USAGE:
    meridian [OPTIONS]

OPTIONS:
    --config <PATH>     Load configuration from JSON file
    --help              Print this help message

ENVIRONMENT VARIABLES:
    MERIDIAN_CONFIG             Config file path (when --config is not given)
    MERIDIAN_BOT_API_KEY        Bot backend API key
    MERIDIAN_BOT_API_SECRET     Bot backend API secret
    RUST_LOG                    Log level filter (default: info)

EXAMPLES:
    # Run with the embedded defaults (mock bots)
    meridian

    # Run with a config file
    meridian --config meridian.json
"#
    );
}

fn read_config(path: Option<String>) -> anyhow::Result<RunnerConfig> {
    let mut config = match path {
        Some(path) => {
            log::info!("Loading config from {}", path);
            load_config(&path).with_context(|| format!("loading {}", path))?
        }
        None => {
            log::info!("Using embedded default config");
            load_default_config()?
        }
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let mut config_path: Option<String> = std::env::var(CONFIG_ENV).ok();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--config" | "-c" => {
                i += 1;
                let Some(path) = args.get(i) else {
                    anyhow::bail!("--config requires a path argument");
                };
                config_path = Some(path.clone());
            }
            other => {
                print_help();
                anyhow::bail!("unknown argument: {}", other);
            }
        }
        i += 1;
    }

    let config = read_config(config_path)?;
    log::info!(
        "Starting Meridian: mode={} pairs={:?} interval={:?}",
        config.mode,
        config.trading_pairs,
        config.update_interval()
    );

    let mut context = Context::from_config(config)?;
    context.start().await?;

    tokio::signal::ctrl_c()
        .await
        .context("waiting for ctrl-c")?;
    log::info!("Shutdown requested");

    if let Some(orchestrator) = context.stop().await? {
        log::info!("Completed {} cycle(s)", orchestrator.cycles());
    }
    Ok(())
}
