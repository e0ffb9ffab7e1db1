use super::{list_document, nested_block, selection, FilterBuilder, LimitPolicy, QueryDocument, QuerySpec};
use crate::errors::ClientError;
use serde::Deserialize;

const FIELDS: &[&str] = &[
    "id",
    "cveId",
    "title",
    "severity",
    "status",
    "cvssScore",
    "exploitAvailable",
    "publishedAt",
    "firstSeen",
    "lastSeen",
    "affectedAssetCount",
];

const AFFECTED_ASSET_FIELDS: &[&str] = &["id", "name", "type", "riskScore"];

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VulnerabilityQuery {
    pub severity: Option<String>,
    pub status: Option<String>,
    pub cve_id: Option<String>,
    pub cvss_min: Option<f64>,
    #[serde(default)]
    pub include_affected_assets: bool,
    pub limit: Option<i64>,
}

impl QuerySpec for VulnerabilityQuery {
    fn to_document(&self) -> Result<QueryDocument, ClientError> {
        let filter = FilterBuilder::new()
            .eq("severity", self.severity.as_deref())?
            .eq("status", self.status.as_deref())?
            .eq("cveId", self.cve_id.as_deref())?
            .at_least("cvssScore", self.cvss_min)?
            .build();

        let body = format!(
            "{}{}",
            selection(FIELDS, 4),
            nested_block(
                self.include_affected_assets,
                "affectedAssets",
                AFFECTED_ASSET_FIELDS,
                4
            )
        );
        Ok(list_document(
            "Vulnerabilities",
            "vulnerabilities",
            body,
            LimitPolicy::STANDARD.clamp(self.limit),
            filter,
        ))
    }
}
