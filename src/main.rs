use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use tunesearch::search::run_fetch;
use tunesearch::{Applied, CatalogClient, Config, SearchController, Session};

#[derive(Parser)]
#[command(name = "tunesearch")]
#[command(about = "Search the music catalog and keep a list of favourites")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive search screen (default)
    Interactive,

    /// Run a single search and print the results
    Search {
        /// Words to search for
        #[arg(required = true)]
        term: Vec<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration help
    Setup,
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so they don't interleave with the screen on stdout.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Interactive => {
            interactive().await?;
        }
        Commands::Search { term, json } => {
            search_once(&term.join(" "), json).await?;
        }
        Commands::Setup => {
            show_setup_guide();
        }
    }

    Ok(())
}

async fn interactive() -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let client = CatalogClient::new(&config).context("Failed to create catalog client")?;

    Session::new(&config, client)
        .run()
        .await
        .context("Interactive session failed")
}

async fn search_once(term: &str, json: bool) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    let client = CatalogClient::new(&config).context("Failed to create catalog client")?;
    let mut controller = SearchController::new(&config);

    let Some(ticket) = controller.set_text(term) else {
        println!("{}", "Nothing to search for".yellow());
        return Ok(());
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(format!("Searching for \"{}\"", term));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = run_fetch(&client, ticket).await;
    spinner.finish_and_clear();

    if controller.apply(outcome) == Applied::Failed {
        bail!(
            "Search failed: {}",
            controller.last_error().unwrap_or("unknown error")
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(controller.results())?);
        return Ok(());
    }

    if controller.results().is_empty() {
        println!("{}", "No tracks found".yellow());
        return Ok(());
    }

    for (i, track) in controller.results().iter().enumerate() {
        let minutes = track
            .duration_minutes()
            .map(|m| format!("{} min", m))
            .unwrap_or_default();
        println!(
            "{:2}. {} - {} ({}) {}",
            i + 1,
            track.display_name().green(),
            track.display_artist(),
            track.display_collection().cyan(),
            minutes.dimmed()
        );
    }

    println!(
        "\n{}",
        format!("Total: {} tracks", controller.results().len()).cyan()
    );

    Ok(())
}

fn show_setup_guide() {
    println!("{}", "tunesearch Setup Guide".cyan().bold());
    println!("{}", "=".repeat(50));

    println!("\n{}", "1. Configuration".yellow());
    println!("   No account or API key is needed. Optional settings can go in");
    println!("   the environment or a .env file:");
    println!("     CATALOG_SEARCH_URL=https://itunes.apple.com/search");
    println!("     CATALOG_MEDIA=music");
    println!("     CATALOG_RESULT_LIMIT=20");
    println!("     CATALOG_TIMEOUT_SECS=10");

    println!("\n{}", "2. Usage".yellow());
    println!("   - tunesearch                     (interactive search screen)");
    println!("   - tunesearch search daft punk    (one-off search)");
    println!("   - tunesearch search --json daft  (results as JSON)");

    println!("\n{}", "3. Favourites".yellow());
    println!("   Favourites live in memory only and are gone when you quit.");
}
