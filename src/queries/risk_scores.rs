use super::{nested_block, selection, LimitPolicy, QueryDocument, QuerySpec};
use crate::errors::ClientError;
use crate::services::validation::Validation;
use serde::Deserialize;

const ENTITY_FIELDS: &[&str] = &["entityId", "entityName", "score", "level", "calculatedAt"];
const SUMMARY_FIELDS: &[&str] = &[
    "overallScore",
    "level",
    "calculatedAt",
    "assetCount",
    "criticalCount",
    "highCount",
    "mediumCount",
    "lowCount",
];
const TOP_RISK_FIELDS: &[&str] = &["entityId", "entityName", "score", "level"];
const TREND_FIELDS: &[&str] = &["date", "score"];
const FACTOR_FIELDS: &[&str] = &["name", "weight", "contribution"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum RiskScope {
    #[default]
    #[serde(rename = "ORGANIZATION", alias = "organization")]
    Organization,
    #[serde(rename = "ASSET", alias = "asset")]
    Asset,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RiskScoreQuery {
    pub scope: Option<RiskScope>,
    pub entity_id: Option<String>,
    #[serde(default)]
    pub include_trend: bool,
    #[serde(default)]
    pub include_factors: bool,
    pub limit: Option<i64>,
}

/// The two document templates a risk score request can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskDocumentShape<'a> {
    Entity { id: &'a str },
    Organization,
}

impl RiskScoreQuery {
    pub fn shape(&self) -> RiskDocumentShape<'_> {
        match (self.scope.unwrap_or_default(), self.entity_id.as_deref()) {
            (RiskScope::Asset, Some(id)) => RiskDocumentShape::Entity { id },
            _ => RiskDocumentShape::Organization,
        }
    }

    fn breakdowns(&self, indent: usize) -> String {
        format!(
            "{}{}",
            nested_block(self.include_trend, "trend", TREND_FIELDS, indent),
            nested_block(self.include_factors, "factors", FACTOR_FIELDS, indent)
        )
    }
}

impl QuerySpec for RiskScoreQuery {
    fn to_document(&self) -> Result<QueryDocument, ClientError> {
        match self.shape() {
            RiskDocumentShape::Entity { id } => {
                let validation = Validation::new();
                let id = validation.ensure_non_empty(id, "entity_id")?;
                let id = validation.ensure_filter_value(id, "entity_id")?;
                let query = format!(
                    "query AssetRiskScore($id: ID!) {{\n  riskScore(entityType: ASSET, entityId: $id) {{\n{}{}\n  }}\n}}",
                    selection(ENTITY_FIELDS, 4),
                    self.breakdowns(4)
                );
                Ok(QueryDocument::new(query).variable("id", id))
            }
            RiskDocumentShape::Organization => {
                let query = format!(
                    "query OrganizationRiskSummary($limit: Int!) {{\n  riskSummary {{\n{}\n    topRisks(limit: $limit) {{\n{}\n    }}{}\n  }}\n}}",
                    selection(SUMMARY_FIELDS, 4),
                    selection(TOP_RISK_FIELDS, 6),
                    self.breakdowns(4)
                );
                Ok(QueryDocument::new(query)
                    .variable("limit", LimitPolicy::STANDARD.clamp(self.limit)))
            }
        }
    }
}
