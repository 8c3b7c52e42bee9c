//! Row-to-document synchronization.
//!
//! ## Flow
//!
//! 1. Compile the [`RowMapping`](crate::rules::RowMapping) against the table;
//!    unknown columns fail here, before any row is read
//! 2. Build every keyed document in memory, in table order
//! 3. Write each document with one `set` call, awaiting each before the next
//!
//! A failed write aborts the run. Documents written before the failure stay
//! written; nothing is retried or rolled back.

mod error;
mod plan;
mod synchronizer;

pub use error::SyncError;
pub use plan::SyncPlan;
pub use synchronizer::{prepare, synchronize, SyncReport};
