mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::{Command, ConfigAction};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    let config_flag = cli.config.as_deref();
    match cli.command {
        Some(Command::Export(args)) => run::run_export(config_flag, &args),
        Some(Command::Probe(args)) => run::run_probe(config_flag, &args),
        Some(Command::Config(config_cmd)) => match config_cmd.action {
            ConfigAction::Where => run::run_config_where(config_flag),
        },
        None => run::run_view(config_flag, &cli.view),
    }
}
