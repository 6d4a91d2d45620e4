use clap::Parser;
use droid_probe::cli::commands::{cmd_actions, cmd_describe, cmd_run};
use droid_probe::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Describe { state } => {
            cmd_describe(&state, cli.verbose)?;
        }
        Commands::Actions { state } => {
            cmd_actions(&state, cli.verbose)?;
        }
        Commands::Run {
            script,
            catalog,
            frames,
            trace,
            max_actions,
        } => {
            // Resolve: CLI > config > default
            let max_actions = max_actions.unwrap_or(config.run.max_actions);
            let trace = trace.or(config.run.trace);

            let ok = cmd_run(
                &script,
                &catalog,
                &frames,
                trace.as_deref(),
                max_actions,
                cli.verbose,
            )?;
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
