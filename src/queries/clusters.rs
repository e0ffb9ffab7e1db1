use super::{list_document, selection, FilterBuilder, LimitPolicy, QueryDocument, QuerySpec};
use crate::errors::ClientError;
use serde::Deserialize;

const FIELDS: &[&str] = &[
    "id",
    "name",
    "type",
    "size",
    "riskScore",
    "createdAt",
    "updatedAt",
];

/// Clusters are heavier per row, so they use the smaller limit policy.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClusterQuery {
    pub cluster_type: Option<String>,
    pub min_size: Option<i64>,
    pub limit: Option<i64>,
}

impl QuerySpec for ClusterQuery {
    fn to_document(&self) -> Result<QueryDocument, ClientError> {
        let filter = FilterBuilder::new()
            .eq("type", self.cluster_type.as_deref())?
            .at_least("size", self.min_size.map(|n| n as f64))?
            .build();
        Ok(list_document(
            "Clusters",
            "clusters",
            selection(FIELDS, 4),
            LimitPolicy::CLUSTERS.clamp(self.limit),
            filter,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_limits_are_smaller() {
        let doc = ClusterQuery::default().to_document().expect("document");
        assert_eq!(doc.get_variable("limit"), Some(&serde_json::json!(50)));

        let doc = ClusterQuery {
            limit: Some(900),
            ..Default::default()
        }
        .to_document()
        .expect("document");
        assert_eq!(doc.get_variable("limit"), Some(&serde_json::json!(500)));
    }

    #[test]
    fn zero_min_size_still_filters() {
        let doc = ClusterQuery {
            min_size: Some(0),
            ..Default::default()
        }
        .to_document()
        .expect("document");
        assert_eq!(doc.get_variable("filter"), Some(&serde_json::json!("size >= 0")));
    }
}
