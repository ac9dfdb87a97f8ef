use clap::{Args, Parser, Subcommand, ValueEnum};
use depot::model::Role;
use depot::report::TimeFrame;
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "depot", bin_name = "depot", version = get_version())]
#[command(
    about = "Warehouse inventory, orders and sales reports on plain text files",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the data files (default: $DEPOT_HOME, then the current directory)
    #[arg(short, long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data_dir: Option<PathBuf>,

    /// Username to log in with
    #[arg(short, long, global = true, help_heading = "Options")]
    pub user: Option<String>,

    /// Password (prompted for when omitted)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub password: Option<String>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Admin,
    Customer,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Role::Admin,
            RoleArg::Customer => Role::Customer,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TimeFrameArg {
    Week,
    Month,
    Year,
}

impl From<TimeFrameArg> for TimeFrame {
    fn from(arg: TimeFrameArg) -> Self {
        match arg {
            TimeFrameArg::Week => TimeFrame::LastWeek,
            TimeFrameArg::Month => TimeFrame::LastMonth,
            TimeFrameArg::Year => TimeFrame::LastYear,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the interactive menu (the default)
    #[command(display_order = 1)]
    Menu,

    /// Register a new admin or customer account
    #[command(display_order = 2)]
    Register {
        #[arg(value_enum)]
        role: RoleArg,
        username: String,
    },

    /// Manage products (admin)
    #[command(subcommand, display_order = 3)]
    Product(ProductCommands),

    /// Show the inventory
    #[command(alias = "ls", display_order = 4)]
    Inventory {
        /// Only products whose id or name matches
        #[arg(short, long)]
        search: Option<String>,

        /// Role to log in as
        #[arg(long, value_enum, default_value = "customer")]
        role: RoleArg,
    },

    /// Place or list orders
    #[command(subcommand, display_order = 5)]
    Order(OrderCommands),

    /// Sales report for a recent period (admin)
    #[command(display_order = 6)]
    Report {
        #[arg(value_enum)]
        timeframe: TimeFrameArg,
    },

    /// Show or change settings
    #[command(display_order = 7)]
    Config(ConfigArgs),
}

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// Add a product
    Add {
        id: String,
        name: String,
        quantity: u32,
        price: f64,
    },

    /// Change a product's name, quantity or price
    Update(UpdateArgs),

    /// Remove a product
    #[command(alias = "rm")]
    Remove { id: String },
}

#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("fields")
        .required(true)
        .multiple(true)
        .args(["name", "quantity", "price"])
))]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub quantity: Option<u32>,

    #[arg(long)]
    pub price: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// Place an order (customer)
    Place {
        /// Items as PRODUCT_ID:QUANTITY
        #[arg(required = true, num_args = 1.., value_name = "ID:QTY")]
        items: Vec<String>,
    },

    /// List all orders (admin)
    #[command(alias = "ls")]
    List,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigCommands>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print one setting
    Get { key: String },

    /// Change one setting
    Set { key: String, value: String },
}
