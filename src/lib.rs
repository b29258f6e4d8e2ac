pub mod cli;
mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::core::downloader::Downloader;
use crate::core::error::LauncherResult;
use crate::core::http::build_http_client;
use crate::core::state::{default_data_dir, AppState};

/// Structured logging to stderr; `RUST_LOG` overrides the defaults.
pub fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "info,mcserver_lib=debug"
    } else {
        "warn,mcserver_lib=info"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

pub async fn run(cli: Cli) -> LauncherResult<()> {
    let data_dir = cli.data_dir.unwrap_or_else(default_data_dir);
    tracing::debug!("Data directory is {:?}", data_dir);

    let downloader = Downloader::new(build_http_client()?).with_progress(true);
    let mut state = AppState::with_downloader(data_dir, cli.refresh, downloader).await?;

    if cli.find_java {
        commands::find_java(&mut state).await?;
    }

    match cli.command {
        None if cli.find_java => Ok(()),
        None | Some(Command::List) => commands::list_instances(&state).await,
        Some(Command::Versions { snapshots }) => commands::show_versions(&state, snapshots).await,
        Some(Command::Create(args)) => commands::create_instance(&state, args).await,
        Some(Command::Show { name }) => commands::show_instance(&state, &name).await,
        Some(Command::Remove { name, yes }) => commands::remove_instance(&state, &name, yes).await,
        Some(Command::Install { name, force }) => {
            commands::install_instance(&state, &name, force).await
        }
        Some(Command::Run { name }) => commands::run_instance(&state, &name).await,
        Some(Command::Modify { name, change }) => {
            commands::modify_instance(&state, &name, change).await
        }
    }
}
