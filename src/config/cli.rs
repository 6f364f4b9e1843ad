use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "rental")]
#[command(about = "Apartment rental catalog, booking and review tool")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "rental.toml")]
    pub config: String,

    /// Catalog JSON file, overrides [catalog] data_file
    #[arg(long)]
    pub catalog: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List available units
    Search {
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short = 't', long = "type", default_value = "any")]
        unit_type: String,
        /// low, mid, high or any
        #[arg(short, long, default_value = "any")]
        price: String,
        #[arg(long)]
        bedrooms: Option<u32>,
    },
    /// Show one unit with its rating summary
    Show { unit: u32 },
    /// Price a lease without booking
    Quote {
        unit: u32,
        #[arg(short, long, default_value_t = 6)]
        months: u32,
    },
    /// Run a checkout for the configured tenant
    Book {
        unit: u32,
        /// Start date, YYYY-MM-DD
        #[arg(short, long, default_value = "")]
        start: String,
        #[arg(short, long, default_value_t = 6)]
        months: u32,
        #[arg(short, long, default_value = "transfer")]
        payment: String,
        /// Confirm right away instead of stopping at the summary
        #[arg(short, long)]
        yes: bool,
    },
    /// List reviews of a unit
    Reviews {
        unit: u32,
        /// 1-5 or all
        #[arg(short, long, default_value = "all")]
        rating: String,
        /// newest, oldest, highest or lowest
        #[arg(short, long, default_value = "newest")]
        sort: String,
    },
    /// Write a review as the configured tenant
    Review {
        unit: u32,
        #[arg(short, long)]
        rating: u8,
        #[arg(short, long)]
        body: String,
        #[arg(long, value_delimiter = ',')]
        photos: Vec<String>,
    },
    /// Mark a review as helpful
    Vote { unit: u32, review: u32 },
    /// Add or remove a unit from favorites
    Favorite { unit: u32 },
    /// List saved units
    Favorites {
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Summary for the configured user: tenant or manager view
    Dashboard,
}
