use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "cmdpal")]
#[command(about = "Fuzzy command palette for the terminal", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    action: Option<Action>,
}

#[derive(Subcommand)]
enum Action {
    /// Run the palette with the sample commands (default)
    #[command(name = "-run")]
    Run,

    /// Open config file in editor
    #[command(name = "-edit-config")]
    EditConfig,

    /// Display current configuration
    #[command(name = "-show-config")]
    ShowConfig,

    /// Validate configuration file
    #[command(name = "-validate-config")]
    ValidateConfig,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.action {
        Some(Action::EditConfig) => commands::edit_config::run(),
        Some(Action::ShowConfig) => commands::show_config::run(),
        Some(Action::ValidateConfig) => commands::validate_config::run(),
        Some(Action::Run) | None => {
            if let Err(error) = commands::run::run() {
                eprintln!("cmdpal: {error:#}");
                std::process::exit(1);
            }
        }
    }
}
