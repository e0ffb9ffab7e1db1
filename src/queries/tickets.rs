use super::{list_document, selection, FilterBuilder, LimitPolicy, QueryDocument, QuerySpec};
use crate::errors::ClientError;
use serde::Deserialize;

const FIELDS: &[&str] = &[
    "id",
    "key",
    "title",
    "status",
    "priority",
    "assignee",
    "createdAt",
    "updatedAt",
    "dueDate",
    "linkedFindingCount",
];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TicketQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub limit: Option<i64>,
}

impl QuerySpec for TicketQuery {
    fn to_document(&self) -> Result<QueryDocument, ClientError> {
        let filter = FilterBuilder::new()
            .eq("status", self.status.as_deref())?
            .eq("priority", self.priority.as_deref())?
            .eq("assignee", self.assignee.as_deref())?
            .build();
        Ok(list_document(
            "Tickets",
            "tickets",
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
    fn assignee_filter() {
        let doc = TicketQuery {
            assignee: Some("sec-ops@example.com".into()),
            ..Default::default()
        }
        .to_document()
        .expect("document");
        assert_eq!(
            doc.get_variable("filter"),
            Some(&serde_json::json!("assignee = 'sec-ops@example.com'"))
        );
        assert_eq!(doc.get_variable("limit"), Some(&serde_json::json!(100)));
    }

    #[test]
    fn empty_string_filters_still_produce_clauses() {
        let doc = TicketQuery {
            status: Some(String::new()),
            priority: Some(" HIGH ".into()),
            ..Default::default()
        }
        .to_document()
        .expect("document");
        assert_eq!(
            doc.get_variable("filter"),
            Some(&serde_json::json!("status = '' AND priority = ' HIGH '"))
        );
    }
}
