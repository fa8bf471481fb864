mod commands;

use clap::{Arg, Command};
use log::error;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

fn cli() -> Command {
    Command::new("espcompose")
        .about(format!("espcompose - {}\n\n{}", VERSION, DESCRIPTION))
        .version(VERSION)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .args([
            Arg::new("configuration_file")
                .short('c')
                .long("configuration")
                .help("Configuration file to read.")
                .default_value("config.yaml")
        ])
        .subcommand(
            Command::new("validate")
                    .about("Validates the Configuration File.")
        )
        .subcommand(
            Command::new("compose")
                    .about("Validates and composes the configuration, printing the device graphs as YAML.")
        )
}

fn main() {
    let matches = cli().get_matches();
    let config_file = matches
        .get_one::<String>("configuration_file")
        .map(String::as_str)
        .unwrap_or("config.yaml");

    let result = match matches.subcommand() {
        Some(("validate", _)) => commands::validate::validate(config_file),
        Some(("compose", _)) => commands::compose::compose(config_file),
        _ => {
            println!("No subcommand was used");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
