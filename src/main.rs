use std::sync::Arc;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use genrescope::{cli, config, error, types::ImplicitGrant};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Forget the stored access token
    Logout,

    /// List the genre seeds usable as search filters
    Genres,

    #[clap(about = "Search tracks by genre and release year range")]
    Search(SearchOptions),

    /// Show sections, bars and beats of one track
    Analysis(AnalysisOptions),

    /// Run the token refresh proxy
    Serve,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Genre to search for (see `genres`)
    #[clap(long)]
    pub genre: String,

    /// First release year (inclusive)
    #[clap(long)]
    pub start_year: String,

    /// Last release year (inclusive)
    #[clap(long)]
    pub end_year: String,

    /// Only print the first N tracks
    #[clap(long)]
    pub limit: Option<usize>,
}

#[derive(Parser, Debug, Clone)]
pub struct AnalysisOptions {
    /// Spotify track id
    pub track_id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    match cli.command {
        Command::Auth => {
            let grant: Arc<Mutex<Option<ImplicitGrant>>> = Arc::new(Mutex::new(None));
            cli::auth(Arc::clone(&grant)).await;
        }
        Command::Logout => cli::logout().await,
        Command::Genres => cli::genres().await,
        Command::Search(opt) => {
            cli::search(opt.genre, opt.start_year, opt.end_year, opt.limit).await
        }
        Command::Analysis(opt) => cli::analysis(opt.track_id).await,
        Command::Serve => cli::serve().await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
