//! Learnmap - terminal client for a learning workspace
//!
#![doc = "Main entry point for the learnmap CLI."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use learnmap::cli::{Cli, Commands, SessionCommand};
use learnmap::commands::{self, AppContext};
use learnmap::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let ctx = AppContext::from_config(config)?;

    // Execute command
    match cli.command {
        Commands::Login { email, password } => {
            commands::account::login(&ctx, &email, password).await
        }
        Commands::Signup {
            email,
            name,
            password,
        } => commands::account::signup(&ctx, &email, name.as_deref(), password).await,
        Commands::Logout => commands::account::logout(&ctx).await,
        Commands::Status => commands::account::status(&ctx),
        Commands::Materials { json } => commands::materials::list(&ctx, json).await,
        Commands::Sessions { command } => match command {
            SessionCommand::List { json } => commands::sessions::list(&ctx, json).await,
            SessionCommand::Show { id, json } => commands::sessions::show(&ctx, id, json).await,
            SessionCommand::Create {
                title,
                objective,
                materials,
            } => {
                tracing::debug!("Creating session with materials {:?}", materials);
                commands::sessions::create(&ctx, &title, objective.as_deref(), &materials).await
            }
        },
        Commands::Workspace => commands::workspace::run_workspace(&ctx).await,
    }
}

fn init_tracing(verbose: bool, json_logs: bool) {
    let default_level = if verbose {
        "learnmap=debug"
    } else {
        "learnmap=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
