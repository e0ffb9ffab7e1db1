use super::{list_document, selection, FilterBuilder, LimitPolicy, QueryDocument, QuerySpec};
use crate::errors::ClientError;
use serde::Deserialize;

const FIELDS: &[&str] = &[
    "id",
    "title",
    "severity",
    "status",
    "riskScore",
    "source",
    "assetId",
    "assetName",
    "vulnerabilityId",
    "firstSeen",
    "lastSeen",
    "dueDate",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FindingQuery {
    pub severity: Option<String>,
    pub status: Option<String>,
    pub asset_id: Option<String>,
    pub source: Option<String>,
    pub first_seen_after: Option<String>,
    pub limit: Option<i64>,
}

impl QuerySpec for FindingQuery {
    fn to_document(&self) -> Result<QueryDocument, ClientError> {
        let filter = FilterBuilder::new()
            .eq("severity", self.severity.as_deref())?
            .eq("status", self.status.as_deref())?
            .eq("assetId", self.asset_id.as_deref())?
            .eq("source", self.source.as_deref())?
            .since("firstSeen", self.first_seen_after.as_deref())?
            .build();
        Ok(list_document(
            "Findings",
            "findings",
            selection(FIELDS, 4),
            LimitPolicy::STANDARD.clamp(self.limit),
            filter,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_follow_declaration_order() {
        let doc = FindingQuery {
            status: Some("OPEN".into()),
            asset_id: Some("host-1".into()),
            first_seen_after: Some("2024-01-01".into()),
            limit: Some(10),
            ..Default::default()
        }
        .to_document()
        .expect("document");
        assert_eq!(
            doc.get_variable("filter"),
            Some(&serde_json::json!(
                "status = 'OPEN' AND assetId = 'host-1' AND firstSeen >= '2024-01-01'"
            ))
        );
        assert_eq!(doc.get_variable("limit"), Some(&serde_json::json!(10)));
        assert!(doc.query.starts_with("query Findings("));
    }

    #[test]
    fn secondary_operation_keyword_is_rejected() {
        let err = FindingQuery {
            source: Some("scanner mutation".into()),
            ..Default::default()
        }
        .to_document()
        .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }
}
