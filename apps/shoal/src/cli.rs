use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "shoal")]
#[command(about = "Command-line dashboard for a remote torrent daemon")]
pub struct Cli {
    /// RPC endpoint of the daemon
    #[arg(
        long,
        env = "SHOAL_RPC_URL",
        default_value = "http://127.0.0.1:9091/transmission/rpc"
    )]
    pub rpc_url: String,

    /// Root of the search gateway
    #[arg(long, env = "SHOAL_SEARCH_URL", default_value = "http://127.0.0.1:8010")]
    pub search_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List every torrent the daemon tracks
    List,

    /// Show details for one or more torrents
    Details {
        #[arg(required = true)]
        ids: Vec<i64>,

        /// Also show the torrents' file trees
        #[arg(long)]
        files: bool,
    },

    /// Start torrents
    Start {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Stop torrents
    Stop {
        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Add a torrent file, URL, or magnet link
    Add { link: String },

    /// Move torrents to a new location
    Move {
        location: String,

        #[arg(required = true)]
        ids: Vec<i64>,
    },

    /// Rename a path inside a torrent
    Rename { id: i64, path: String, name: String },

    /// Remove torrents from the daemon
    Remove {
        #[arg(required = true)]
        ids: Vec<i64>,

        /// Also delete the downloaded data
        #[arg(long)]
        delete_data: bool,
    },

    /// Show daemon session settings
    Session,

    /// Change one session setting
    SessionSet { key: String, value: String },

    /// Poll torrents and print live transfer stats until interrupted
    Watch {
        #[arg(required = true)]
        ids: Vec<i64>,

        /// Poll interval in seconds
        #[arg(long, default_value_t = 10)]
        interval: u64,
    },

    /// Query the search gateway
    Search { term: String },

    /// Manage filesystem path mappings
    Mappings {
        #[command(subcommand)]
        command: MappingsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum MappingsCommand {
    /// List configured mappings
    List,

    /// Add or replace a mapping
    Add { base: String, path: String },

    /// Remove the mapping for a base path
    Remove { base: String },
}
