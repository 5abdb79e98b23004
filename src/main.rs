//! bsd CLI - Sign waste shipment documents and follow their status

use bordereaux::cli::commands::sign::SignOptions;
use bordereaux::cli::{Cli, Commands};
use bordereaux::errors::to_exit_code;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing; explicit flags win over RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.quiet {
        EnvFilter::new("warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = run(cli).await;

    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error [{}]: {}", e.code(), e);
            std::process::exit(to_exit_code(&e));
        }
    }
}

async fn run(cli: Cli) -> bordereaux::Result<()> {
    let cwd = cli.cwd.as_deref();
    match cli.command {
        Some(Commands::Init { force }) => bordereaux::cli::commands::init::run(cwd, force).await,
        Some(Commands::Import { file }) => {
            bordereaux::cli::commands::import::run(cwd, &file).await
        }
        Some(Commands::List { json, status }) => {
            bordereaux::cli::commands::list::run(cwd, json, status).await
        }
        Some(Commands::Show { id, json }) => {
            bordereaux::cli::commands::show::run(cwd, &id, json).await
        }
        Some(Commands::Publish { id, user }) => {
            bordereaux::cli::commands::publish::run(cwd, &id, &user).await
        }
        Some(Commands::Sign {
            id,
            signature_type,
            user,
            author,
            code,
            date,
        }) => {
            let options = SignOptions { author, code, date };
            bordereaux::cli::commands::sign::run(cwd, &id, signature_type, &user, options).await
        }
        Some(Commands::Check { id, stage }) => {
            bordereaux::cli::commands::check::run(cwd, &id, stage).await
        }
        Some(Commands::Delete { id, user }) => {
            bordereaux::cli::commands::delete::run(cwd, &id, &user).await
        }
        None => {
            // Default to showing help - clap handles this
            println!("Use --help for usage information");
            Ok(())
        }
    }
}
