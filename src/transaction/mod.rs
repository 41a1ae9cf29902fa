//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the wire representation shared with the
//!   remote store
//! - The ledger, which persists transactions remotely with a local snapshot
//!   fallback
//! - The monthly aggregator
//! - View handlers for the transactions page and its form endpoints

mod core;
mod create_endpoint;
mod delete_endpoint;
mod ledger;
mod summary;
mod transactions_page;

pub use core::{Transaction, TransactionDraft, TransactionKind};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use ledger::{Backend, TransactionLedger};
pub use summary::{FinancialSummary, Period, PeriodQuery, summarize};
pub use transactions_page::get_transactions_page;
