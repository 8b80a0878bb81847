use clap::Parser;
use governor_scripts::{cli::Cli, config::Settings, errors::ScriptError};
use tracing::warn;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let Cli { global, command } = Cli::parse();

    tracing_subscriber::fmt().pretty().init();

    let settings = Settings::from_args(&global)?;

    tokio::select! {
        res = command.run(settings) => res,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, completed steps are recorded in the deployments ledger");
            Err(ScriptError::Aborted)
        }
    }
}
