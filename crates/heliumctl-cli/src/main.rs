use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use heliumctl_browser::LaunchMode;
use std::path::PathBuf;

mod commands;

const COMPLETION_HELP: &str = "\
SUPPORTED SHELLS:
    bash, zsh, fish, powershell, elvish

INSTALLATION:
    Bash:       heliumctl completion --shell bash >> ~/.bashrc
    Zsh:        heliumctl completion --shell zsh >> ~/.zshrc
    Fish:       heliumctl completion --shell fish > ~/.config/fish/completions/heliumctl.fish
    PowerShell: heliumctl completion --shell powershell >> $PROFILE";

#[derive(Parser)]
#[command(name = "heliumctl")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Control the Helium browser from the command line",
    long_about = "heliumctl opens tabs, windows and private windows in the Helium browser, \
                  closes it, and searches or deletes its bookmarks and history."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the Helium User Data directory
    #[arg(long, global = true, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,

    /// Path to the Helium executable
    #[arg(long, global = true, value_name = "PATH")]
    browser_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open Helium, optionally at a URL (reuses a running instance)
    Open {
        /// URL to open
        url: Option<String>,
    },

    /// Open a new browser window
    Window {
        /// URL to open in the new window
        url: Option<String>,
    },

    /// Open a new private (incognito) window
    Private {
        /// URL to open in the private window
        url: Option<String>,
    },

    /// Open a new tab
    Tab {
        /// URL to open in the new tab
        url: Option<String>,
    },

    /// Close all running Helium processes
    Close,

    /// Search or delete bookmarks
    Bookmarks {
        #[command(subcommand)]
        action: BookmarksAction,
    },

    /// Search or delete history entries
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Generate shell completion scripts
    #[command(after_long_help = COMPLETION_HELP)]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum BookmarksAction {
    /// List bookmarks matching a query; omit the query for an interactive prompt
    Search {
        /// Text to match against names, URLs and folder paths
        query: Option<String>,

        /// Emit results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete bookmarks or folders by id
    Delete {
        /// Node ids as shown by `bookmarks search`
        #[arg(value_name = "ID", required = true)]
        ids: Vec<String>,

        /// Skip the post-replace verification pass
        #[arg(long)]
        no_verify: bool,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List history entries matching a query; omit the query for an interactive prompt
    Search {
        /// Text to match against titles and URLs
        query: Option<String>,

        /// Emit results as JSON
        #[arg(long)]
        json: bool,

        /// Maximum number of entries to show
        #[arg(long, default_value_t = 25)]
        limit: usize,
    },

    /// Delete history entries by id
    Delete {
        /// Entry ids as shown by `history search`
        #[arg(value_name = "ID", required = true)]
        ids: Vec<i64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Open { url } => commands::launch::execute(LaunchMode::Tab, url, cli.browser_path),
        Commands::Window { url } => {
            commands::launch::execute(LaunchMode::Window, url, cli.browser_path)
        }
        Commands::Private { url } => {
            commands::launch::execute(LaunchMode::PrivateWindow, url, cli.browser_path)
        }
        Commands::Tab { url } => commands::launch::execute(LaunchMode::Tab, url, cli.browser_path),
        Commands::Close => commands::close::execute(),
        Commands::Bookmarks { action } => match action {
            BookmarksAction::Search { query, json } => {
                commands::bookmarks::search(query, json, cli.user_data_dir)
            }
            BookmarksAction::Delete { ids, no_verify } => {
                commands::bookmarks::delete(ids, no_verify, cli.user_data_dir)
            }
        },
        Commands::History { action } => match action {
            HistoryAction::Search { query, json, limit } => {
                commands::history::search(query, json, limit, cli.user_data_dir)
            }
            HistoryAction::Delete { ids } => commands::history::delete(ids, cli.user_data_dir),
        },
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "heliumctl=debug,heliumctl_core=debug,heliumctl_store=debug,heliumctl_browser=debug",
        )
    } else {
        EnvFilter::new("heliumctl=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
