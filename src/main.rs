// vitrine CLI.
// Regenerates the published GitHub data snapshot for the portfolio site.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vitrine::github::GitHubClient;
use vitrine::producer;

#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(author, version, about)]
struct Cli {
    /// Account to snapshot.
    #[arg(short, long, default_value = "Ayfri")]
    login: String,

    /// Output path for the snapshot document.
    #[arg(short, long, default_value = "github.json")]
    output: PathBuf,

    /// Log every request at debug level.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> vitrine::Result<()> {
    let mut client = GitHubClient::from_env()?;
    let snapshot = producer::build_snapshot(&mut client, &cli.login).await?;
    producer::write_snapshot(&snapshot, &cli.output)?;

    info!(
        path = %cli.output.display(),
        repos = snapshot.repos.len(),
        rate_limit_remaining = client.rate_limit().remaining,
        "snapshot written"
    );
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default subscriber failed");
}
