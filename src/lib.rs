//! Suidigest - human-readable interpretation of finalized Sui transactions
//!
//! Takes a transaction record as returned by a Sui full node and produces a
//! deterministic summary, a gas-cost breakdown and a participant/balance
//! view. An optional natural-language explanation is requested from a
//! language-model provider, with a single fallback hop.
//!
//! # Examples
//!
//! ```no_run
//! use suidigest::rpc::{SuiRpcClient, TransactionSource};
//! use suidigest::config::Config;
//! use suidigest::TransactionInterpreter;
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::parse();
//!     let client = SuiRpcClient::new(reqwest::Client::new(), config.sui.network_info());
//!
//!     let record = client.fetch("E2gtnNchwDrLUL7prNSdfcUzwwR4egJV4qpncwHz1hwJ").await?;
//!     let interpreted = TransactionInterpreter::default().interpret(&record)?;
//!     println!("{}", interpreted.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod address;
pub mod ai;
pub mod balance;
pub mod coins;
pub mod config;
pub mod error;
pub mod format;
pub mod gas;
pub mod interpreter;
pub mod record;
pub mod rpc;
pub mod server;
pub mod summary;

// Re-export commonly used types for convenience
pub use ai::{AiExplainer, ExplainerConfig, FailureKind, Provider, ProviderId};
pub use balance::{BalanceChange, Participants, RecipientPolicy};
pub use error::{InterpretError, Result};
pub use gas::GasBreakdown;
pub use interpreter::{InterpretedTransaction, TransactionInterpreter};
pub use record::TransactionRecord;
