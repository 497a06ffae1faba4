//! OTPi terminal application shell
//!
//! Loads configuration, installs logging, and drives an
//! [`otpi_auth::OtpController`] from commands typed on stdin. The login flow
//! itself lives in the `crates/` directory.

pub mod commands;
pub mod terminal;

use anyhow::Context;
use commands::{Command, ParseError};
use otpi_auth::{ControllerSettings, OtpController};
use otpi_core::{AppConfig, LoggingConfig};
use otpi_gateway::HttpAuthGateway;
use std::sync::Arc;
use terminal::TerminalView;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

type Controller = OtpController<TerminalView<std::io::Stdout>>;

/// Initialize tracing subscriber for logging.
///
/// `RUST_LOG` wins over the configured filter. Output goes to stderr so it
/// does not interleave with the view on stdout.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.filter)
            .with_context(|| format!("invalid log filter '{}'", logging.filter))?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

/// Run the application until `quit` or end of input.
///
/// With `--init-config` the effective configuration is written to the
/// config path and the program exits.
pub fn run() -> anyhow::Result<()> {
    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    init_tracing(&config.logging)?;

    if std::env::args().skip(1).any(|arg| arg == "--init-config") {
        config.save().context("failed to write configuration")?;
        println!("wrote {}", AppConfig::config_path()?.display());
        return Ok(());
    }

    info!("Starting OTPi v{}", env!("CARGO_PKG_VERSION"));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(serve(config))
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let gateway = HttpAuthGateway::new(&config.gateway).context("failed to create HTTP client")?;
    info!(base_url = gateway.base_url(), "using authentication service");

    let controller = OtpController::new(
        Arc::new(gateway),
        TerminalView::stdout(),
        ControllerSettings::from_config(&config),
    );

    // Failures are already on screen; the login form is usable regardless.
    if let Err(err) = controller.bootstrap().await {
        debug!(error = %err, "bootstrap finished with an error");
    }
    controller.view().notice("type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match commands::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => execute(&controller, command).await,
            Err(ParseError::Empty) => {}
            Err(err) => controller.view().notice(&err.to_string()),
        }
    }

    controller.cancel();
    info!("Exiting");
    Ok(())
}

async fn execute(controller: &Controller, command: Command) {
    let result = match command {
        Command::Request { email } => controller.request_code(&email).await,
        Command::Verify { email, code } => controller.verify_code(&email, &code).await.map(drop),
        Command::Resend { email } => controller.resend(&email).await,
        Command::Register { email, name } => controller.register(&name, &email).await.map(drop),
        Command::Tab(tab) => controller.switch_tab(tab),
        Command::Logout => controller.logout().await.map(drop),
        Command::Status => {
            let session = controller.session();
            controller.view().print_status(
                controller.tab(),
                controller.status(),
                controller.remaining_seconds(),
                session.as_ref(),
            );
            Ok(())
        }
        Command::Help => {
            controller.view().notice(commands::HELP);
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    if let Err(err) = result {
        debug!(error = %err, "command failed");
    }
}
