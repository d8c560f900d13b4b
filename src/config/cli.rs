use clap::Subcommand;
use uuid::Uuid;

use crate::core::repository::{ALL_PAGES, DEFAULT_PAGE_SIZE};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List whiskies, one page at a time
    List {
        #[arg(long, default_value_t = 0)]
        page: i32,

        #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
        size: i32,

        #[arg(long, help = "Ignore paging and list the whole catalog")]
        all: bool,
    },

    /// Show a single whisky
    Get { id: Uuid },

    /// Add a whisky and notify subscribers
    Add { name: String, region: String },

    /// Change the region of the whisky with this name
    Update { name: String, region: String },

    /// Remove a whisky and its ratings
    Delete { id: Uuid },

    /// Rate a whisky; the message must equal the whisky's name
    Rate {
        id: Uuid,
        #[arg(allow_negative_numbers = true)]
        stars: i16,
        message: String,
    },
}

impl Command {
    /// Page arguments as the repository expects them.
    pub fn paging(&self) -> Option<(i32, i32)> {
        match self {
            Command::List { all: true, .. } => Some((ALL_PAGES, ALL_PAGES)),
            Command::List { page, size, .. } => Some((*page, *size)),
            _ => None,
        }
    }
}
