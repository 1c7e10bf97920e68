//! Bulk-derived counts.

/// Extracts the field of a bulk record that keys are compared against.
pub type Discriminator<R> = fn(&R) -> &str;

/// Counts the records whose discriminator equals `key` exactly, or equals the
/// wildcard when one is configured.
pub fn count_matches<R>(
    bulk: &[R],
    discriminator: Discriminator<R>,
    key: &str,
    wildcard: Option<&str>,
) -> usize {
    bulk.iter()
        .filter(|&record| {
            let value = discriminator(record);
            value == key || wildcard.is_some_and(|w| value == w)
        })
        .count()
}

/// Counts matches for several keys against one shared dataset.
pub struct ResultAssembler<'a, R> {
    bulk: &'a [R],
    discriminator: Discriminator<R>,
    wildcard: Option<&'a str>,
}

impl<'a, R> ResultAssembler<'a, R> {
    /// Creates an assembler over `bulk`.
    pub fn new(bulk: &'a [R], discriminator: Discriminator<R>, wildcard: Option<&'a str>) -> Self {
        Self {
            bulk,
            discriminator,
            wildcard,
        }
    }

    /// Bulk-derived count for one key.
    pub fn count(&self, key: &str) -> usize {
        count_matches(self.bulk, self.discriminator, key, self.wildcard)
    }

    /// Counts for every key, in key order.
    pub fn count_all<'k>(&self, keys: &'k [String]) -> Vec<(&'k str, usize)> {
        keys.iter().map(|key| (key.as_str(), self.count(key))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Policy;

    fn by_role(policy: &Policy) -> &str {
        &policy.role
    }

    fn by_group(policy: &Policy) -> &str {
        &policy.resource_group
    }

    fn policies() -> Vec<Policy> {
        vec![
            Policy::new("admin", "*", "GET"),
            Policy::new("admin", "*", "POST"),
            Policy::new("editor", "rg1", "GET"),
        ]
    }

    #[test]
    fn counts_exact_matches() {
        let bulk = policies();
        assert_eq!(count_matches(&bulk, by_role, "admin", None), 2);
        assert_eq!(count_matches(&bulk, by_role, "editor", None), 1);
        assert_eq!(count_matches(&bulk, by_role, "viewer", None), 0);
    }

    #[test]
    fn matching_is_case_sensitive() {
        let bulk = policies();
        assert_eq!(count_matches(&bulk, by_role, "Admin", None), 0);
    }

    #[test]
    fn wildcard_matches_every_key() {
        let bulk = policies();
        assert_eq!(count_matches(&bulk, by_group, "rg1", Some("*")), 3);
        assert_eq!(count_matches(&bulk, by_group, "rg2", Some("*")), 2);
        assert_eq!(count_matches(&bulk, by_group, "rg2", None), 0);
    }

    #[test]
    fn empty_bulk_counts_zero() {
        let bulk: Vec<Policy> = Vec::new();
        assert_eq!(count_matches(&bulk, by_role, "admin", Some("*")), 0);
    }

    #[test]
    fn count_all_keeps_key_order() {
        let bulk = policies();
        let assembler = ResultAssembler::new(&bulk, by_role, None);
        let keys = vec![
            "viewer".to_string(),
            "admin".to_string(),
            "admin".to_string(),
        ];
        assert_eq!(
            assembler.count_all(&keys),
            vec![("viewer", 0), ("admin", 2), ("admin", 2)]
        );
    }
}
