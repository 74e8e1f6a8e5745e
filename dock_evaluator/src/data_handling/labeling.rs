/// Decides from a compound identifier whether it is a known active.
pub trait ActivityLabeler {
    fn is_active(&self, identifier: &str) -> bool;
}

impl<F> ActivityLabeler for F
where
    F: Fn(&str) -> bool,
{
    fn is_active(&self, identifier: &str) -> bool {
        self(identifier)
    }
}

/// Benchmark naming convention: actives carry a marker word in their title.
/// The match is a case-sensitive substring test.
#[derive(Debug, Clone)]
pub struct MarkerLabeler {
    marker: String,
}

impl MarkerLabeler {
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }
}

impl Default for MarkerLabeler {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_ACTIVE_MARKER)
    }
}

impl ActivityLabeler for MarkerLabeler {
    fn is_active(&self, identifier: &str) -> bool {
        identifier.contains(self.marker.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_is_case_sensitive_substring() {
        let labeler = MarkerLabeler::default();
        assert!(labeler.is_active("CHEMBL123_active"));
        assert!(!labeler.is_active("ZINC000_decoy"));
        assert!(!labeler.is_active("ACTIVE_upper"));
    }

    #[test]
    fn closures_are_labelers() {
        let labeler = |id: &str| id.starts_with("act_");
        assert!(labeler.is_active("act_01"));
        assert!(!labeler.is_active("dec_01"));
    }
}
