use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use mediadiary_core::VERSION;

/// Media Diary - log films, TV and albums, then slice your diary by facet
#[derive(Parser)]
#[command(name = "mediadiary")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "MEDIADIARY_CONFIG")]
    pub config: Option<String>,

    /// Path to the diary store
    #[arg(short, long, global = true, env = "MEDIADIARY_STORE")]
    pub store: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the config file and point it at a diary store
    Init(InitArgs),

    /// Sign in as a user
    Login(LoginArgs),

    /// Sign out and drop the local session
    Logout,

    /// Log a film, show or album
    Add(AddArgs),

    /// List diary records, newest first
    List(ListArgs),

    /// Show selectable facet values and their counts
    Facets(FacetsArgs),

    /// Highest-rated records
    Top(TopArgs),

    /// Records matching a filter, highest rated first
    Chart(ChartArgs),

    /// Compose a filter interactively and chart the result
    Browse,

    /// Show or change preferences
    #[command(subcommand)]
    Prefs(PrefsSubcommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

/// Arguments for the `init` command
#[derive(Args)]
pub struct InitArgs {
    /// Path where the diary store will live
    #[arg(value_name = "PATH")]
    pub path: Option<String>,

    /// Number of records shown by `top`
    #[arg(long)]
    pub top_limit: Option<usize>,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `login` command
#[derive(Args)]
pub struct LoginArgs {
    /// User id
    #[arg(long)]
    pub uid: String,

    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Email address
    #[arg(long)]
    pub email: Option<String>,
}

/// Arguments for the `add` command
#[derive(Args)]
pub struct AddArgs {
    /// Media type (film, tv, album)
    #[arg(value_name = "TYPE")]
    pub media_type: String,

    /// Title
    #[arg(value_name = "TITLE")]
    pub title: String,

    /// Diary date (YYYY-MM-DD, default today)
    #[arg(long)]
    pub date: Option<String>,

    /// Rating in stars, half steps allowed (e.g. 3.5)
    #[arg(long)]
    pub rating: Option<f32>,

    /// Release year
    #[arg(long)]
    pub released: Option<i32>,

    /// Genre
    #[arg(long)]
    pub genre: Option<String>,

    /// Seen or heard before this entry
    #[arg(long)]
    pub logged_before: bool,
}

/// Arguments for the `list` command
#[derive(Args)]
pub struct ListArgs {
    /// Limit number of results
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `facets` command
#[derive(Args)]
pub struct FacetsArgs {
    /// Scope counts to one diary year
    #[arg(long)]
    pub year: Option<i32>,

    /// Only this dimension (media-type, rating, decade, logged-before, genre, diary-year)
    #[arg(long)]
    pub dimension: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `top` command
#[derive(Args)]
pub struct TopArgs {
    /// Number of records (default from config)
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `chart` command
#[derive(Args)]
pub struct ChartArgs {
    /// Diary year
    #[arg(long)]
    pub year: Option<i32>,

    /// Media type, repeatable
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub media_types: Vec<String>,

    /// Rating in stars (e.g. 4.5), or "none" for unrated records
    #[arg(long)]
    pub rating: Option<String>,

    /// Release decade (e.g. 1990)
    #[arg(long)]
    pub decade: Option<i32>,

    /// Genre
    #[arg(long)]
    pub genre: Option<String>,

    /// Logged before (true/false)
    #[arg(long)]
    pub logged_before: Option<bool>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum PrefsSubcommand {
    /// Show current preferences
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Change one or more preferences
    Set(PrefsSetArgs),
}

/// Arguments for the `prefs set` command
#[derive(Args)]
pub struct PrefsSetArgs {
    /// Colour theme (light, dark)
    #[arg(long)]
    pub theme: Option<String>,

    /// Current year shown by default, or "none"
    #[arg(long)]
    pub year: Option<String>,

    /// Years with diary pages, comma separated
    #[arg(long, value_delimiter = ',')]
    pub years: Option<Vec<i32>>,

    /// Media types to track, comma separated
    #[arg(long, value_delimiter = ',')]
    pub track: Option<Vec<String>>,
}
