//! Timetrack CLI - time tracking from the terminal
//!
//! Every data command goes through the gateway, so its error policy is
//! visible from the shell:
//! - reads degrade to empty output when the host fails
//! - mutations exit non-zero when the host fails
//! - a missing session prints a sign-in hint

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tokio::signal::unix::{signal, SignalKind};

use timetrack::cli::{Cli, Commands, Display, HostArgs};
use timetrack::config::{BuildMode, Endpoints, HostConfig};
use timetrack::gateway::{Gateway, GatewayError, SocketInvoker};
use timetrack::host::{ApiHost, HostServer, LogNotifier, Notifier, ToggleOutcome};

/// Main entry point
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_tracing(cli.verbose);

    // Execute command
    if let Err(e) = execute(cli).await {
        match e.downcast_ref::<GatewayError>() {
            Some(err) => Display::show_gateway_error(err),
            None => Display::show_error(&format!("{:#}", e)),
        }
        std::process::exit(1);
    }
}

/// Initializes the tracing subscriber for logging.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Builds a gateway over the configured socket.
fn gateway(socket: Option<PathBuf>) -> Result<Gateway<SocketInvoker>> {
    let invoker = match socket {
        Some(path) => SocketInvoker::with_socket_path(path),
        None => SocketInvoker::new()?,
    };
    Ok(Gateway::new(invoker))
}

/// Executes the CLI command.
async fn execute(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        // No command provided, show help
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Status => {
            let timer = gateway(cli.socket)?.get_active_timer().await?;
            Display::show_status(timer.as_ref());
        }
        Commands::Start {
            project_id,
            description,
        } => {
            let entry = gateway(cli.socket)?
                .start_timer(project_id, description.as_deref())
                .await?;
            Display::show_entry_result("Timer started", entry.as_ref());
        }
        Commands::Stop { timer_id } => {
            let entry = gateway(cli.socket)?.stop_timer(timer_id).await?;
            Display::show_entry_result("Timer stopped", entry.as_ref());
        }
        Commands::Restart { timer_id } => {
            let entry = gateway(cli.socket)?.restart_timer(timer_id).await?;
            Display::show_entry_result("Timer restarted", entry.as_ref());
        }
        Commands::Delete { entry_id } => {
            gateway(cli.socket)?.delete_entry(entry_id).await?;
            println!("Entry #{} deleted", entry_id);
        }
        Commands::Edit(args) => {
            let entry = gateway(cli.socket)?
                .update_entry(args.entry_id, &args.to_update())
                .await?;
            Display::show_entry_result("Entry updated", entry.as_ref());
        }
        Commands::Entries => {
            let entries = gateway(cli.socket)?.get_time_entries().await?;
            Display::show_entries(&entries);
        }
        Commands::Projects => {
            let projects = gateway(cli.socket)?.get_recent_projects().await?;
            Display::show_projects(&projects);
        }
        Commands::Clients => {
            let clients = gateway(cli.socket)?.get_clients().await?;
            Display::show_clients(&clients);
        }
        Commands::ClientProjects { client_id } => {
            let projects = gateway(cli.socket)?.get_client_projects(client_id).await?;
            Display::show_projects(&projects);
        }
        Commands::Settings => {
            let settings = gateway(cli.socket)?.get_settings().await;
            Display::show_settings(&settings);
        }
        Commands::Notify { title, body } => {
            gateway(cli.socket)?.show_notification(&title, &body).await;
        }
        Commands::Host(args) => {
            run_host(cli.socket, args).await?;
        }
        Commands::Endpoints { mode } => {
            let endpoints = Endpoints::for_mode(mode.unwrap_or_else(BuildMode::current));
            Display::show_endpoints(&endpoints);
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Runs the reference host until Ctrl-C.
///
/// SIGUSR1 toggles the timer, the way the global shortcut does.
async fn run_host(socket: Option<PathBuf>, args: HostArgs) -> Result<()> {
    let mut config =
        HostConfig::new(args.endpoints())?.with_widget_secret(args.widget_secret.clone());
    if let Some(path) = socket {
        config = config.with_socket_path(path);
    }

    let host = ApiHost::from_config(&config, LogNotifier)
        .context("Failed to create widget API client")?;
    let server = HostServer::new(&config.socket_path)?;
    let mut toggle_signal =
        signal(SignalKind::user_defined1()).context("Failed to install SIGUSR1 handler")?;

    tracing::info!(api = %host.api().base_url(), "Host started");

    let serve = server.run(&host);
    tokio::pin!(serve);

    loop {
        tokio::select! {
            result = &mut serve => return result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received Ctrl-C, shutting down");
                return Ok(());
            }
            Some(()) = toggle_signal.recv() => {
                toggle(&host).await;
            }
        }
    }
}

/// Toggles the timer, logging failures.
async fn toggle<N: Notifier>(host: &ApiHost<N>) -> Option<ToggleOutcome> {
    match host.toggle_timer().await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            tracing::error!(error = %e, "Failed to toggle timer");
            None
        }
    }
}

/// Generates shell completion scripts.
fn generate_completions(shell: clap_complete::Shell) {
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, bin_name, &mut io::stdout());
}

// ============================================================================
// Tests
// ============================================================================
