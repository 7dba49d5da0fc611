// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Log storage
//!
//! Holds observed records newest first, bounded by the configured capacity,
//! and notifies subscribers after every change.

mod log_store;
mod query;

pub use log_store::{Completion, LogStore, StoreChanged};
pub use query::Statistics;
