//
//  gitlab-tools
//  api/batch.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Bounded Batch Resolver
//!
//! Resolves many keys through a single-entity lookup with a fixed number of
//! lookups in flight. Every key becomes a tokio task that must acquire a
//! semaphore permit before it calls the lookup, so a slow lookup only holds
//! its own slot and the next queued key starts as soon as any slot frees.
//!
//! ## Outcomes
//!
//! Each lookup reports a [`Lookup`]:
//!
//! - `Found(entity)`: stored in the key's slot
//! - `NotFound`: stored in the key's slot as a miss
//! - `Fatal(error)`: the whole batch fails with that error, outstanding
//!   lookups are aborted and no partial result is returned
//!
//! The returned [`BatchOutcome`] is index-aligned with the input keys no
//! matter in which order lookups complete.
//!
//! ## Example
//!
//! ```rust,no_run
//! use gitlab_tools::api::batch::{BatchResolver, Lookup};
//!
//! # async fn example() -> Result<(), gitlab_tools::api::ApiError> {
//! let outcome = BatchResolver::new(4)
//!     .resolve(vec![1u64, 2, 3], |id| async move {
//!         if id == 2 { Lookup::NotFound } else { Lookup::Found(id * 10) }
//!     })
//!     .await?;
//!
//! assert_eq!(outcome.resolved().copied().collect::<Vec<_>>(), vec![10, 30]);
//! assert_eq!(outcome.not_found().copied().collect::<Vec<_>>(), vec![2]);
//! # Ok(())
//! # }
//! ```

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use super::common::ApiError;

/// Largest batch accepted by default.
pub const MAX_BATCH_SIZE: usize = 50;

/// Lookups in flight when the caller does not configure a limit.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Result of a single lookup inside a batch.
#[derive(Debug)]
pub enum Lookup<T> {
    /// The key resolved to an entity
    Found(T),
    /// The remote reported that the key does not exist
    NotFound,
    /// Any other failure; aborts the batch
    Fatal(ApiError),
}

impl<T> From<Result<T, ApiError>> for Lookup<T> {
    /// `NotFound` errors become misses, every other error is fatal.
    fn from(result: Result<T, ApiError>) -> Self {
        match result {
            Ok(entity) => Self::Found(entity),
            Err(err) if err.is_not_found() => Self::NotFound,
            Err(err) => Self::Fatal(err),
        }
    }
}

/// Final state of one key in a successful batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "entity", rename_all = "snake_case")]
pub enum Resolution<T> {
    /// The key resolved to this entity
    Found(T),
    /// The key does not exist on the remote
    NotFound,
}

/// Index-aligned results of a batch: one entry per input key, in input order.
#[derive(Debug, Clone)]
pub struct BatchOutcome<K, T> {
    entries: Vec<(K, Resolution<T>)>,
}

impl<K, T> BatchOutcome<K, T> {
    /// All entries, in input order.
    pub fn entries(&self) -> &[(K, Resolution<T>)] {
        &self.entries
    }

    /// Resolved entities, in input order.
    pub fn resolved(&self) -> impl Iterator<Item = &T> {
        self.entries.iter().filter_map(|(_, r)| match r {
            Resolution::Found(entity) => Some(entity),
            Resolution::NotFound => None,
        })
    }

    /// Keys that did not resolve, in input order.
    pub fn not_found(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().filter_map(|(key, r)| match r {
            Resolution::Found(_) => None,
            Resolution::NotFound => Some(key),
        })
    }

    /// Number of input keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` for an empty batch.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Splits into resolved entities and unresolved keys, both in input order.
    pub fn into_parts(self) -> (Vec<T>, Vec<K>) {
        let mut resolved = Vec::new();
        let mut missing = Vec::new();
        for (key, resolution) in self.entries {
            match resolution {
                Resolution::Found(entity) => resolved.push(entity),
                Resolution::NotFound => missing.push(key),
            }
        }
        (resolved, missing)
    }
}

/// Runs lookups with a bounded worker pool.
#[derive(Debug, Clone, Copy)]
pub struct BatchResolver {
    concurrency: usize,
    max_size: usize,
}

impl Default for BatchResolver {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENCY)
    }
}

impl BatchResolver {
    /// Creates a resolver with the given number of lookups in flight (min 1).
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
            max_size: MAX_BATCH_SIZE,
        }
    }

    /// Overrides the largest accepted batch.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    /// Lookups in flight at most.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolves every key through `lookup`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Validation`] when more than the maximum number of keys
    ///   is given; no lookup runs in that case
    /// - The first fatal lookup error, in completion order
    pub async fn resolve<K, T, F, Fut>(
        &self,
        keys: Vec<K>,
        lookup: F,
    ) -> Result<BatchOutcome<K, T>, ApiError>
    where
        K: Clone + Send + 'static,
        T: Send + 'static,
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Lookup<T>> + Send + 'static,
    {
        if keys.len() > self.max_size {
            return Err(ApiError::validation(
                "keys",
                format!(
                    "batch size {} exceeds maximum of {}",
                    keys.len(),
                    self.max_size
                ),
            ));
        }
        if keys.is_empty() {
            return Ok(BatchOutcome {
                entries: Vec::new(),
            });
        }

        let concurrency = self.concurrency.min(keys.len());
        debug!(keys = keys.len(), concurrency, "resolving batch");

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let lookup = Arc::new(lookup);
        let mut tasks = JoinSet::new();

        for (index, key) in keys.iter().cloned().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let lookup = Arc::clone(&lookup);
            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            index,
                            Lookup::Fatal(ApiError::Unknown(
                                "batch semaphore closed unexpectedly".to_string(),
                            )),
                        );
                    }
                };
                (index, lookup(key).await)
            });
        }

        let mut slots: Vec<Option<Resolution<T>>> = keys.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (index, outcome) =
                joined.map_err(|e| ApiError::Unknown(format!("lookup task failed: {e}")))?;
            match outcome {
                Lookup::Found(entity) => slots[index] = Some(Resolution::Found(entity)),
                Lookup::NotFound => slots[index] = Some(Resolution::NotFound),
                Lookup::Fatal(err) => {
                    debug!(index, error = %err, "batch aborted");
                    tasks.abort_all();
                    return Err(err);
                }
            }
        }

        let entries: Vec<(K, Resolution<T>)> = keys
            .into_iter()
            .zip(slots)
            .map(|(key, slot)| (key, slot.unwrap_or(Resolution::NotFound)))
            .collect();

        debug!(
            resolved = entries
                .iter()
                .filter(|(_, r)| matches!(r, Resolution::Found(_)))
                .count(),
            total = entries.len(),
            "batch resolved"
        );

        Ok(BatchOutcome { entries })
    }
}
