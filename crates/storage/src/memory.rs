// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-memory store.

use crate::error::Result;
use crate::{query, ResultStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use llm_health_core::TestResult;
use tokio::sync::RwLock;

/// Store that keeps records in memory for tests and one-off runs.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    records: RwLock<Vec<TestResult>>,
}

impl MemoryResultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    async fn snapshot(&self) -> Vec<TestResult> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl ResultStore for MemoryResultStore {
    async fn save(&self, result: &TestResult) -> Result<()> {
        self.records.write().await.push(result.clone());
        Ok(())
    }

    async fn load_all(&self, limit: Option<usize>) -> Result<Vec<TestResult>> {
        Ok(query::newest_first(self.snapshot().await, limit))
    }

    async fn latest_per_integration(&self) -> Result<Vec<TestResult>> {
        Ok(query::latest_per_integration(self.snapshot().await))
    }

    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<TestResult>> {
        Ok(query::since(self.snapshot().await, cutoff))
    }

    async fn history(&self, integration_name: &str) -> Result<Vec<TestResult>> {
        Ok(query::history(self.snapshot().await, integration_name))
    }

    async fn delete_older_than(&self, days: i64) -> Result<usize> {
        let mut records = self.records.write().await;
        let (kept, removed) = query::retain_recent(std::mem::take(&mut *records), days);
        *records = kept;
        Ok(removed)
    }
}
