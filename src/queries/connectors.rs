use super::{list_document, nested_block, selection, FilterBuilder, LimitPolicy, QueryDocument, QuerySpec};
use crate::errors::ClientError;
use serde::Deserialize;

const FIELDS: &[&str] = &[
    "id",
    "name",
    "type",
    "status",
    "enabled",
    "lastSyncAt",
    "nextSyncAt",
    "recordCount",
];

const SYNC_HISTORY_FIELDS: &[&str] = &[
    "startedAt",
    "finishedAt",
    "status",
    "recordsProcessed",
    "errorMessage",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectorQuery {
    pub status: Option<String>,
    pub connector_type: Option<String>,
    #[serde(default)]
    pub include_sync_history: bool,
    pub limit: Option<i64>,
}

impl QuerySpec for ConnectorQuery {
    fn to_document(&self) -> Result<QueryDocument, ClientError> {
        let filter = FilterBuilder::new()
            .eq("status", self.status.as_deref())?
            .eq("type", self.connector_type.as_deref())?
            .build();
        let body = format!(
            "{}{}",
            selection(FIELDS, 4),
            nested_block(self.include_sync_history, "syncHistory", SYNC_HISTORY_FIELDS, 4)
        );
        Ok(list_document(
            "Connectors",
            "connectors",
            body,
            LimitPolicy::STANDARD.clamp(self.limit),
            filter,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_history_only_when_requested() {
        let without = ConnectorQuery::default().to_document().expect("document");
        assert!(!without.query.contains("syncHistory"));
        assert!(!without.query.contains("recordsProcessed"));

        let with = ConnectorQuery {
            include_sync_history: true,
            ..Default::default()
        }
        .to_document()
        .expect("document");
        assert!(with.query.contains("syncHistory {"));
        assert!(with.query.contains("recordsProcessed"));
    }

    #[test]
    fn type_filter_uses_remote_field_name() {
        let doc = ConnectorQuery {
            connector_type: Some("Qualys".into()),
            ..Default::default()
        }
        .to_document()
        .expect("document");
        assert_eq!(
            doc.get_variable("filter"),
            Some(&serde_json::json!("type = 'Qualys'"))
        );
    }
}
