use super::{list_document, nested_block, selection, FilterBuilder, LimitPolicy, QueryDocument, QuerySpec};
use crate::errors::ClientError;
use serde::Deserialize;

const FIELDS: &[&str] = &["name", "displayName", "description", "recordCount", "updatedAt"];
const ATTRIBUTE_FIELDS: &[&str] = &["name", "type", "required", "description"];
const RELATIONSHIP_FIELDS: &[&str] = &["name", "targetModel", "cardinality"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataModelQuery {
    pub name: Option<String>,
    #[serde(default)]
    pub include_attributes: bool,
    #[serde(default)]
    pub include_relationships: bool,
    pub limit: Option<i64>,
}

impl QuerySpec for DataModelQuery {
    fn to_document(&self) -> Result<QueryDocument, ClientError> {
        let filter = FilterBuilder::new().eq("name", self.name.as_deref())?.build();
        let body = format!(
            "{}{}{}",
            selection(FIELDS, 4),
            nested_block(self.include_attributes, "attributes", ATTRIBUTE_FIELDS, 4),
            nested_block(
                self.include_relationships,
                "relationships",
                RELATIONSHIP_FIELDS,
                4
            ),
        );
        Ok(list_document(
            "DataModels",
            "dataModels",
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
    fn blocks_are_independent() {
        let doc = DataModelQuery {
            include_relationships: true,
            ..Default::default()
        }
        .to_document()
        .expect("document");
        assert!(doc.query.contains("relationships {"));
        assert!(!doc.query.contains("attributes"));

        let doc = DataModelQuery {
            include_attributes: true,
            include_relationships: true,
            ..Default::default()
        }
        .to_document()
        .expect("document");
        assert!(doc.query.contains("attributes {"));
        assert!(doc.query.contains("targetModel"));
    }

    #[test]
    fn bare_query_has_no_nested_blocks() {
        let doc = DataModelQuery::default().to_document().expect("document");
        assert!(!doc.query.contains("attributes"));
        assert!(!doc.query.contains("relationships"));
        assert!(doc.query.contains("dataModels(limit: $limit, filter: $filter)"));
    }
}
