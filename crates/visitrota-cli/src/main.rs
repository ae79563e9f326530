use clap::{Parser, Subcommand};

mod commands;
mod common;

#[derive(Parser)]
#[command(name = "visitrota", version, about = "Rotating-visit scheduler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management
    User {
        #[command(subcommand)]
        action: commands::user::UserAction,
    },
    /// Group and membership management
    Group {
        #[command(subcommand)]
        action: commands::group::GroupAction,
    },
    /// Skip-week management
    Skip {
        #[command(subcommand)]
        action: commands::skip::SkipAction,
    },
    /// Batch scheduling
    Schedule {
        #[command(subcommand)]
        action: commands::schedule::ScheduleAction,
    },
    /// Rotation mutations
    Rotation {
        #[command(subcommand)]
        action: commands::rotation::RotationAction,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::User { action } => commands::user::run(action),
        Commands::Group { action } => commands::group::run(action).await,
        Commands::Skip { action } => commands::skip::run(action),
        Commands::Schedule { action } => commands::schedule::run(action).await,
        Commands::Rotation { action } => commands::rotation::run(action).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
