use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cinesync")]
#[command(about = "Movie catalog client: session, favorites, watchlist and cached lookups", long_about = None)]
pub struct Args {
    #[arg(long = "api-url", global = true, help = "Backend base URL (e.g., http://localhost:8000)")]
    pub api_url: Option<String>,

    #[arg(long = "data-dir", global = true, help = "Directory for the stored session and cache")]
    pub data_dir: Option<PathBuf>,

    #[arg(short = 'v', long = "verbose", global = true, help = "Log debug output to stderr")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(short = 'u', long)]
        username: String,
        #[arg(
            short = 'p',
            long,
            env = "CINESYNC_PASSWORD",
            hide_env_values = true
        )]
        password: String,
    },
    /// End the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Create an account
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long, env = "CINESYNC_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long = "confirm-password", env = "CINESYNC_CONFIRM_PASSWORD", hide_env_values = true)]
        confirm_password: String,
    },
    /// Manage favorites
    Favorites {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Manage the watchlist
    Watchlist {
        #[command(subcommand)]
        action: CollectionAction,
    },
    /// Show a movie (cached for 30 minutes)
    Movie { id: u64 },
    /// Search the catalog (cached for 30 minutes)
    Search {
        #[arg(long, value_enum, default_value_t = Department::Movies)]
        department: Department,
        #[arg(required = true)]
        query: Vec<String>,
    },
    /// Show personalised recommendations
    Recommendations,
    /// Rate a movie from 1 to 10
    Rate {
        id: u64,
        rating: u8,
        #[arg(long)]
        feedback: Option<String>,
    },
    /// Drop every cached lookup
    ClearCache,
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum CollectionAction {
    List,
    Add { id: u64 },
    Remove { id: u64 },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Department {
    Movies,
    Persons,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Movies => "movies",
            Department::Persons => "persons",
        }
    }
}
