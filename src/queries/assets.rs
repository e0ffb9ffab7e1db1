use super::{list_document, selection, FilterBuilder, LimitPolicy, QueryDocument, QuerySpec};
use crate::errors::ClientError;
use crate::services::validation::Validation;
use serde::Deserialize;

pub const DEFAULT_FIELDS: &[&str] = &[
    "id",
    "name",
    "displayName",
    "type",
    "status",
    "riskScore",
    "ipAddresses",
    "hostnames",
    "operatingSystem",
    "owner",
    "tags",
    "lastSeen",
];

/// Parameters for `query_assets`. The only resource with caller-chosen fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetQuery {
    pub fields: Option<Vec<String>>,
    pub status: Option<String>,
    pub asset_type: Option<String>,
    pub risk_score_min: Option<f64>,
    pub risk_score_max: Option<f64>,
    pub tag: Option<String>,
    pub limit: Option<i64>,
}

impl QuerySpec for AssetQuery {
    fn to_document(&self) -> Result<QueryDocument, ClientError> {
        let validation = Validation::new();
        let fields: Vec<&str> = match self.fields.as_deref() {
            Some(list) if !list.is_empty() => list
                .iter()
                .map(|field| validation.ensure_field_name(field))
                .collect::<Result<_, _>>()?,
            _ => DEFAULT_FIELDS.to_vec(),
        };

        let filter = FilterBuilder::new()
            .eq("status", self.status.as_deref())?
            .eq("type", self.asset_type.as_deref())?
            .at_least("riskScore", self.risk_score_min)?
            .at_most("riskScore", self.risk_score_max)?
            .contains("tags", self.tag.as_deref())?
            .build();

        Ok(list_document(
            "Assets",
            "assets",
            selection(&fields, 4),
            LimitPolicy::STANDARD.clamp(self.limit),
            filter,
        ))
    }
}
