use std::process::ExitCode;

use clap::Parser;
use mcserver_lib::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    mcserver_lib::init_tracing(cli.verbose);

    match mcserver_lib::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
