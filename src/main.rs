use clap::Parser;
use ioclient::cli::{Cli, Commands};
use ioclient::config::AppConfig;
use ioclient::coordination::{
    control_channel, run_control_loop, wait_for_shutdown_signal, Collaborators,
    LifecycleCoordinator,
};
use ioclient::error::{IoClientError, Result};
use ioclient::logging::{init_logging, init_logging_simple};
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load_from(&cli.config)?;
    cli.apply_overrides(&mut config);

    match cli.command {
        Commands::CheckConfig => {
            init_logging_simple();
            check_config(&config)?;
        }
        Commands::Run => {
            init_logging(&config.logging);
            run(config).await?;
        }
    }

    Ok(())
}

fn validate(config: &AppConfig) -> Result<()> {
    config
        .validate()
        .map_err(|errors| IoClientError::Config(errors.join("; ")))
}

fn check_config(config: &AppConfig) -> Result<()> {
    validate(config)?;
    println!("profile: {}", config.client.profile);
    println!("token:   set");
    println!("logging: level={} json={}", config.logging.level, config.logging.json);
    if let Some(dir) = &config.logging.dir {
        println!("log dir: {}", dir);
    }
    Ok(())
}

async fn run(config: AppConfig) -> Result<()> {
    if let Err(e) = validate(&config) {
        error!("{}", e);
        return Err(e);
    }

    let coordinator = Arc::new(LifecycleCoordinator::new(
        &config.client,
        Collaborators::loopback(),
    )?);
    let (control, commands) = control_channel(16);
    let control_task = tokio::spawn(run_control_loop(coordinator.clone(), commands));

    if let Err(e) = control.start().await {
        error!("Failed to bring the bot up: {}", e);
        let _ = control.quit().await;
        let _ = control_task.await;
        return Err(e);
    }

    info!(
        "Bot is running with profile {}. Press Ctrl+C to stop.",
        coordinator.profile()
    );
    let signal = wait_for_shutdown_signal().await;
    info!("Shutting down ({})", signal);

    let result = control.quit().await;
    if let Err(e) = control_task.await {
        warn!("control loop ended abnormally: {}", e);
    }

    let snapshot = serde_json::to_string(&coordinator.snapshot())?;
    info!("Final state: {}", snapshot);
    result
}
