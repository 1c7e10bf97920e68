//! Concurrent batch enrichment.
//!
//! Given an ordered list of keys, [`BatchEnricher`] fetches one bulk dataset
//! and one value per key concurrently, then pairs every key with its value
//! and its bulk-derived count. Output order always equals input order:
//! per-key futures are driven by an ordered join, so each result lands in
//! the slot of its own index no matter when its reply arrives.
//!
//! Failures are split by domain:
//!
//! - a malformed key rejects the batch before any request is made;
//! - an authentication failure anywhere aborts the batch at once;
//! - a failed bulk fetch degrades every count to zero;
//! - a failed per-key fetch degrades that slot to `Default` and is recorded
//!   in the [`ErrorReport`].

pub mod assembler;
pub mod report;
pub mod source;

use futures::future::try_join_all;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::{CliError, CliResult};

pub use assembler::{count_matches, ResultAssembler};
pub use report::{ErrorReport, KeyFailure};
pub use source::RemoteDataSource;

/// One key with its bulk-derived count and per-key value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedRecord<V> {
    /// The input key.
    pub key: String,
    /// Number of bulk records matching the key.
    pub bulk_count: usize,
    /// Value fetched for the key, or `Default` if the fetch failed.
    pub value: V,
}

/// Result of one batch.
#[derive(Debug)]
pub struct Enrichment<V> {
    /// One record per input key, in input order.
    pub records: Vec<EnrichedRecord<V>>,
    /// Keys whose per-key fetch failed.
    pub errors: ErrorReport,
}

impl<V> Enrichment<V> {
    fn empty() -> Self {
        Self {
            records: Vec::new(),
            errors: ErrorReport::default(),
        }
    }
}

/// Outcome of one per-key fetch that did not abort the batch.
enum Slot<V> {
    Filled(V),
    Failed(CliError),
}

/// Enriches keys from a [`RemoteDataSource`].
pub struct BatchEnricher<S> {
    source: S,
    wildcard: Option<String>,
    cancel: CancellationToken,
}

impl<S: RemoteDataSource> BatchEnricher<S> {
    /// Creates an enricher with no wildcard and a token nobody cancels.
    pub fn new(source: S) -> Self {
        Self {
            source,
            wildcard: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Treats bulk records whose discriminator equals `wildcard` as matching
    /// every key.
    pub fn with_wildcard(mut self, wildcard: impl Into<String>) -> Self {
        self.wildcard = Some(wildcard.into());
        self
    }

    /// Aborts the batch when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Enriches `keys`, preserving their order and duplicates.
    ///
    /// ## Errors
    ///
    /// - `CliError::Validation` if a key is malformed; nothing is fetched.
    /// - `CliError::Auth` if any request is rejected for authentication.
    /// - `CliError::Cancelled` if the cancellation token fires first.
    ///
    /// Any other per-key failure is reported in [`Enrichment::errors`].
    pub async fn enrich(&self, keys: &[String]) -> CliResult<Enrichment<S::Value>> {
        if keys.is_empty() {
            return Ok(Enrichment::empty());
        }

        for key in keys {
            self.source.validate_key(key)?;
        }

        // Dropping the batch future drops every in-flight request with it.
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                tracing::debug!(count = keys.len(), "Batch cancelled");
                Err(CliError::Cancelled)
            }
            result = self.run(keys) => result,
        }
    }

    async fn run(&self, keys: &[String]) -> CliResult<Enrichment<S::Value>> {
        tracing::debug!(count = keys.len(), "Enriching batch");

        let bulk = async {
            match self.source.fetch_bulk().await {
                Ok(records) => Ok(records),
                Err(e) if e.is_fatal() => Err(e),
                Err(e) => {
                    tracing::warn!(error = %e, "Bulk fetch failed, counts default to zero");
                    Ok(Vec::new())
                }
            }
        };
        let slots = try_join_all(
            keys.iter()
                .enumerate()
                .map(|(index, key)| self.fetch_slot(index, key)),
        );

        let (bulk, slots) = tokio::try_join!(bulk, slots)?;

        let assembler = ResultAssembler::new(&bulk, S::discriminator, self.wildcard.as_deref());
        let mut errors = ErrorReport::default();
        let mut records = Vec::with_capacity(keys.len());

        for (index, (key, slot)) in keys.iter().zip(slots).enumerate() {
            let value = match slot {
                Slot::Filled(value) => value,
                Slot::Failed(error) => {
                    errors.push(index, key, error);
                    S::Value::default()
                }
            };
            records.push(EnrichedRecord {
                key: key.clone(),
                bulk_count: assembler.count(key),
                value,
            });
        }

        Ok(Enrichment { records, errors })
    }

    async fn fetch_slot(&self, index: usize, key: &str) -> CliResult<Slot<S::Value>> {
        match self.source.fetch_per_key(key).await {
            Ok(value) => Ok(Slot::Filled(value)),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::debug!(index, key, error = %e, "Per-key fetch failed");
                Ok(Slot::Failed(e))
            }
        }
    }
}
