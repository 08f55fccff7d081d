// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Persistence of [`TestResult`] records.
//!
//! Two stores share one query surface, [`ResultStore`]:
//!
//! - [`JsonlResultStore`] appends one JSON record per line to a file
//! - [`MemoryResultStore`] keeps records in memory for tests and one-off runs

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod jsonl;
pub mod memory;
mod query;

pub use error::{Result, StorageError};
pub use jsonl::JsonlResultStore;
pub use memory::MemoryResultStore;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use llm_health_core::TestResult;

/// The instant `days` days before now.
///
/// Saturates at the earliest (or, for negative `days`, latest)
/// representable time instead of overflowing.
pub fn days_ago(days: i64) -> DateTime<Utc> {
    Duration::try_days(days)
        .and_then(|span| Utc::now().checked_sub_signed(span))
        .unwrap_or(if days >= 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
}

/// Storage for test results.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist one record.
    async fn save(&self, result: &TestResult) -> Result<()>;

    /// All records, newest first, optionally truncated to `limit`.
    async fn load_all(&self, limit: Option<usize>) -> Result<Vec<TestResult>>;

    /// The newest record of each integration, highest score first.
    async fn latest_per_integration(&self) -> Result<Vec<TestResult>>;

    /// Records tested at or after `cutoff`, oldest first.
    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<TestResult>>;

    /// Every record of one integration, newest first.
    async fn history(&self, integration_name: &str) -> Result<Vec<TestResult>>;

    /// Remove records older than `days` days and return how many were removed.
    async fn delete_older_than(&self, days: i64) -> Result<usize>;
}
