//! Command-line arguments

use std::str::FromStr;

use billbook_client::ClientConfig;
use clap::{Parser, Subcommand};
use shared::StatusFilter;

#[derive(Parser)]
#[command(name = "billbook")]
#[command(about = "Client order book backed by a remote record store")]
pub struct Cli {
    /// Order collection resource URL
    #[arg(long, global = true, env = "BILLBOOK_API_URL")]
    pub api_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "BILLBOOK_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    /// Max deletes in flight during delete-all (unbounded when unset)
    #[arg(long, global = true, env = "BILLBOOK_DELETE_CONCURRENCY")]
    pub delete_concurrency: Option<usize>,

    /// Login token
    #[arg(long, global = true, env = "BILLBOOK_SESSION_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List orders, newest first
    List {
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show one order with its line items
    Show { id: String },
    /// Totals across all orders
    Stats,
    /// Create an order
    Create {
        #[arg(long, default_value = "")]
        client: String,
        /// Line item as name:count:price (repeatable)
        #[arg(long = "item", required = true)]
        items: Vec<ItemSpec>,
        /// Half bill: payment is not tracked
        #[arg(long)]
        half: bool,
        /// Amount paid so far
        #[arg(long)]
        paid: Option<f64>,
    },
    /// Record the amount paid on an order
    Pay { id: String, amount: f64 },
    /// Mark an order fully paid
    Clear { id: String },
    /// Delete one order
    Delete { id: String },
    /// Delete every order
    DeleteAll {
        /// Required to confirm
        #[arg(long)]
        yes: bool,
    },
}

impl Cli {
    /// Environment config with command-line overrides applied
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &self.api_url {
            config.base_url = url.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if self.delete_concurrency.is_some() {
            config = config.with_delete_concurrency(self.delete_concurrency);
        }
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        config
    }
}

/// `name:count:price`; the name may itself contain colons
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSpec {
    pub name: String,
    pub count: f64,
    pub price: f64,
}

impl FromStr for ItemSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(price), Some(count), Some(name)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected name:count:price, got {:?}", s));
        };
        let count = count
            .trim()
            .parse()
            .map_err(|_| format!("invalid count {:?}", count))?;
        let price = price
            .trim()
            .parse()
            .map_err(|_| format!("invalid price {:?}", price))?;
        Ok(Self {
            name: name.to_string(),
            count,
            price,
        })
    }
}
