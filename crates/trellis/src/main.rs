mod cli;
mod commands;
mod context;
mod logging;
mod output;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Render {
            template,
            data,
            output,
        } => commands::render::run(&template, data.as_deref(), output.as_deref(), config),
        Commands::Check { template, shape } => {
            commands::check::run(&template, shape.as_deref(), config)
        }
        Commands::Directives { json } => commands::directives::run(json, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
