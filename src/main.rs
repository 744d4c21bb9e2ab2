use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use pastelinker::cli::{Cli, Commands};
use pastelinker::config::{StaticConfig, get_config, init_config_from};
use pastelinker::interfaces::cli::run_cli_command;
use pastelinker::system::{AppContext, init_logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 打印示例配置不需要连接任何后端
    if let Commands::Config = cli.command {
        println!("{}", StaticConfig::generate_sample_config());
        return Ok(());
    }

    init_config_from(&cli.config);
    let config = get_config();
    let _guard = init_logging(&config.logging).context("Failed to initialize logging")?;
    debug!("Using configuration file: {}", cli.config);

    let ctx = AppContext::init(&config)
        .await
        .context("Failed to initialize backends")?;

    let result = run_cli_command(&ctx, &cli.owner, cli.json, cli.command).await;

    ctx.shutdown().await.context("Failed to shut down backends")?;

    if let Err(e) = result {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
    Ok(())
}
