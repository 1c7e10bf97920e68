//! Per-key failures collected during a batch.

use crate::CliError;

/// One key that could not be fetched.
#[derive(Debug)]
pub struct KeyFailure {
    /// Position of the key in the input.
    pub index: usize,
    /// The key itself.
    pub key: String,
    /// Why the fetch failed.
    pub error: CliError,
}

/// Failures of one batch, ordered by input position.
#[derive(Debug, Default)]
pub struct ErrorReport {
    failures: Vec<KeyFailure>,
}

impl ErrorReport {
    /// Records a failure. Entries are kept sorted by `index`.
    pub fn push(&mut self, index: usize, key: &str, error: CliError) {
        let at = self.failures.partition_point(|f| f.index <= index);
        self.failures.insert(
            at,
            KeyFailure {
                index,
                key: key.to_string(),
                error,
            },
        );
    }

    /// Returns true if every key was fetched.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of failed keys.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Returns true if the key at `index` failed.
    pub fn is_failed(&self, index: usize) -> bool {
        self.failures
            .binary_search_by_key(&index, |f| f.index)
            .is_ok()
    }

    /// Failures in input order.
    pub fn iter(&self) -> impl Iterator<Item = &KeyFailure> {
        self.failures.iter()
    }

    /// One-line summary, e.g.
    /// `failed to fetch 2 item(s): [1] editor: <error>; [2] viewer: <error>`.
    pub fn report(&self) -> String {
        let entries = self
            .failures
            .iter()
            .map(|f| format!("[{}] {}: {}", f.index, f.key, f.error))
            .collect::<Vec<_>>()
            .join("; ");
        format!("failed to fetch {} item(s): {}", self.failures.len(), entries)
    }

    /// Fails with the report when it is not empty.
    pub fn into_strict(self) -> crate::CliResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CliError::Batch(self.report()))
        }
    }
}
