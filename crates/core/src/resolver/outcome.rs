use serde::Serialize;

use crate::catalog::AssetRecord;

/// Result of resolving one request against the catalog.
///
/// Either exactly one asset satisfies the request, or none does and the
/// outcome carries what was found nearby plus an optional SQL draft.
/// `draft: None` means no draft could be produced; it is never an empty
/// string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionOutcome {
    Matched {
        asset: AssetRecord,
    },
    Unmatched {
        related: Vec<AssetRecord>,
        draft: Option<String>,
    },
}

impl ResolutionOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, ResolutionOutcome::Matched { .. })
    }

    pub fn matched_asset(&self) -> Option<&AssetRecord> {
        match self {
            ResolutionOutcome::Matched { asset } => Some(asset),
            ResolutionOutcome::Unmatched { .. } => None,
        }
    }

    /// Related assets of an unmatched outcome; empty for a match.
    pub fn related(&self) -> &[AssetRecord] {
        match self {
            ResolutionOutcome::Matched { .. } => &[],
            ResolutionOutcome::Unmatched { related, .. } => related,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            ResolutionOutcome::Matched { .. } => None,
            ResolutionOutcome::Unmatched { draft, .. } => draft.as_deref(),
        }
    }

    /// Verdict label for logs and metrics.
    pub fn verdict(&self) -> &'static str {
        match self {
            ResolutionOutcome::Matched { .. } => "matched",
            ResolutionOutcome::Unmatched { .. } => "unmatched",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[test]
    fn test_matched_accessors() {
        let outcome = ResolutionOutcome::Matched {
            asset: fixtures::asset("sales_monthly", "analytics", "db.analytics.sales_monthly"),
        };
        assert!(outcome.is_matched());
        assert_eq!(outcome.matched_asset().unwrap().name, "sales_monthly");
        assert!(outcome.related().is_empty());
        assert!(outcome.draft().is_none());
        assert_eq!(outcome.verdict(), "matched");
    }

    #[test]
    fn test_unmatched_accessors() {
        let outcome = ResolutionOutcome::Unmatched {
            related: vec![fixtures::asset("orders", "sales", "db.sales.orders")],
            draft: Some("SELECT 1".to_string()),
        };
        assert!(!outcome.is_matched());
        assert!(outcome.matched_asset().is_none());
        assert_eq!(outcome.related().len(), 1);
        assert_eq!(outcome.draft(), Some("SELECT 1"));
        assert_eq!(outcome.verdict(), "unmatched");
    }

    #[test]
    fn test_serialization_is_tagged() {
        let outcome = ResolutionOutcome::Unmatched {
            related: vec![],
            draft: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "unmatched");
        assert!(json["related"].as_array().unwrap().is_empty());
        assert!(json["draft"].is_null());
    }
}
