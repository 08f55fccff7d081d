// Copyright 2025 LLM Integration Health Contributors
// SPDX-License-Identifier: Apache-2.0

//! Append-only JSON-lines store.

use crate::error::Result;
use crate::{query, ResultStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use llm_health_core::TestResult;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// File-backed store holding one JSON record per line.
///
/// Lines that fail to parse are skipped with a warning, so a truncated
/// trailing write never makes the whole history unreadable.
pub struct JsonlResultStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonlResultStore {
    /// Open a store at `path`, creating parent directories if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<TestResult>> {
        let file = match File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut lines = BufReader::new(file).lines();
        let mut records = Vec::new();
        let mut line_number = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<TestResult>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = line_number,
                    error = %e,
                    "Skipping unreadable result record"
                ),
            }
        }

        Ok(records)
    }

    async fn rewrite(&self, records: &[TestResult]) -> Result<()> {
        let mut contents = String::new();
        for record in records {
            contents.push_str(&serde_json::to_string(record)?);
            contents.push('\n');
        }

        let staging = self.path.with_extension("jsonl.tmp");
        tokio::fs::write(&staging, contents).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl ResultStore for JsonlResultStore {
    async fn save(&self, result: &TestResult) -> Result<()> {
        let mut line = serde_json::to_string(result)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        debug!(integration = %result.integration_name, path = %self.path.display(), "Saved test result");
        Ok(())
    }

    async fn load_all(&self, limit: Option<usize>) -> Result<Vec<TestResult>> {
        Ok(query::newest_first(self.read_all().await?, limit))
    }

    async fn latest_per_integration(&self) -> Result<Vec<TestResult>> {
        Ok(query::latest_per_integration(self.read_all().await?))
    }

    async fn since(&self, cutoff: DateTime<Utc>) -> Result<Vec<TestResult>> {
        Ok(query::since(self.read_all().await?, cutoff))
    }

    async fn history(&self, integration_name: &str) -> Result<Vec<TestResult>> {
        Ok(query::history(self.read_all().await?, integration_name))
    }

    async fn delete_older_than(&self, days: i64) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let (kept, removed) = query::retain_recent(self.read_all().await?, days);
        if removed > 0 {
            self.rewrite(&kept).await?;
        }
        debug!(removed, days, "Deleted old test results");
        Ok(removed)
    }
}
