//! Translation of tool parameters into GraphQL documents.
//!
//! Every translator is a pure function of its parameter struct. Filter values
//! travel in the `filter` variable as a conjunction of quoted clauses; limits
//! and identifiers travel as typed variables. Optional nested blocks are only
//! written into the query text when their flag is set.

pub mod assets;
pub mod clusters;
pub mod connectors;
pub mod data_models;
pub mod findings;
pub mod risk_scores;
pub mod tickets;
pub mod vulnerabilities;

use crate::errors::ClientError;
use crate::services::validation::Validation;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body for the GraphQL endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryDocument {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
}

impl QueryDocument {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
        }
    }

    pub fn variable(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables
            .get_or_insert_with(Map::new)
            .insert(name.to_string(), value.into());
        self
    }

    pub fn variable_opt(self, name: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(value) => self.variable(name, value),
            None => self,
        }
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        self.variables.as_ref().and_then(|vars| vars.get(name))
    }
}

/// A structured query tool's parameter set.
pub trait QuerySpec: DeserializeOwned + Send + Sync {
    fn to_document(&self) -> Result<QueryDocument, ClientError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub default: i64,
    pub max: i64,
}

impl LimitPolicy {
    pub const STANDARD: LimitPolicy = LimitPolicy {
        default: crate::constants::limits::DEFAULT_LIMIT,
        max: crate::constants::limits::MAX_LIMIT,
    };

    pub const CLUSTERS: LimitPolicy = LimitPolicy {
        default: crate::constants::limits::CLUSTER_DEFAULT_LIMIT,
        max: crate::constants::limits::CLUSTER_MAX_LIMIT,
    };

    pub fn clamp(self, requested: Option<i64>) -> i64 {
        requested.unwrap_or(self.default).clamp(1, self.max)
    }
}

/// Conjunction of `field op 'value'` clauses.
#[derive(Default)]
pub struct FilterBuilder {
    validation: Validation,
    clauses: Vec<String>,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: Option<&str>) -> Result<Self, ClientError> {
        if let Some(value) = value {
            let value = self.validation.ensure_filter_value(value, field)?;
            self.clauses.push(format!("{} = '{}'", field, value));
        }
        Ok(self)
    }

    pub fn contains(mut self, field: &str, value: Option<&str>) -> Result<Self, ClientError> {
        if let Some(value) = value {
            let value = self.validation.ensure_filter_value(value, field)?;
            self.clauses.push(format!("{} CONTAINS '{}'", field, value));
        }
        Ok(self)
    }

    pub fn since(mut self, field: &str, value: Option<&str>) -> Result<Self, ClientError> {
        if let Some(value) = value {
            let value = self.validation.ensure_filter_value(value, field)?;
            self.clauses.push(format!("{} >= '{}'", field, value));
        }
        Ok(self)
    }

    pub fn at_least(mut self, field: &str, value: Option<f64>) -> Result<Self, ClientError> {
        if let Some(value) = value {
            self.clauses.push(format!("{} >= {}", field, finite(field, value)?));
        }
        Ok(self)
    }

    pub fn at_most(mut self, field: &str, value: Option<f64>) -> Result<Self, ClientError> {
        if let Some(value) = value {
            self.clauses.push(format!("{} <= {}", field, finite(field, value)?));
        }
        Ok(self)
    }

    pub fn build(self) -> Option<String> {
        if self.clauses.is_empty() {
            None
        } else {
            Some(self.clauses.join(" AND "))
        }
    }
}

fn finite(field: &str, value: f64) -> Result<f64, ClientError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ClientError::validation(format!("{} must be a finite number", field)))
    }
}

/// Renders a selection set body, one field per line at `indent` spaces.
pub(crate) fn selection(fields: &[&str], indent: usize) -> String {
    let pad = " ".repeat(indent);
    fields
        .iter()
        .map(|field| format!("{}{}", pad, field))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Nested block written only when `include` is set.
pub(crate) fn nested_block(include: bool, name: &str, fields: &[&str], indent: usize) -> String {
    if !include {
        return String::new();
    }
    let pad = " ".repeat(indent);
    format!(
        "\n{}{} {{\n{}\n{}}}",
        pad,
        name,
        selection(fields, indent + 2),
        pad
    )
}

/// Standard list query: `root(limit: $limit, filter: $filter) { ... }`.
pub(crate) fn list_document(
    operation: &str,
    root: &str,
    body: String,
    limit: i64,
    filter: Option<String>,
) -> QueryDocument {
    let query = format!(
        "query {}($limit: Int!, $filter: String) {{\n  {}(limit: $limit, filter: $filter) {{\n{}\n  }}\n}}",
        operation, root, body
    );
    QueryDocument::new(query)
        .variable("limit", limit)
        .variable_opt("filter", filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limits_default_and_clamp() {
        assert_eq!(LimitPolicy::STANDARD.clamp(None), 100);
        assert_eq!(LimitPolicy::STANDARD.clamp(Some(250)), 250);
        assert_eq!(LimitPolicy::STANDARD.clamp(Some(50_000)), 1_000);
        assert_eq!(LimitPolicy::STANDARD.clamp(Some(0)), 1);
        assert_eq!(LimitPolicy::CLUSTERS.clamp(None), 50);
        assert_eq!(LimitPolicy::CLUSTERS.clamp(Some(501)), 500);
    }

    #[test]
    fn filters_join_conjunctively_and_keep_zero() {
        let filter = FilterBuilder::new()
            .eq("status", Some("ACTIVE"))
            .and_then(|f| f.at_least("riskScore", Some(0.0)))
            .and_then(|f| f.at_most("riskScore", None))
            .expect("filter")
            .build();
        assert_eq!(filter.as_deref(), Some("status = 'ACTIVE' AND riskScore >= 0"));
    }

    #[test]
    fn defined_empty_string_is_a_clause() {
        let filter = FilterBuilder::new()
            .eq("status", Some(""))
            .and_then(|f| f.contains("tags", Some(" ")))
            .expect("filter")
            .build();
        assert_eq!(filter.as_deref(), Some("status = '' AND tags CONTAINS ' '"));
    }

    #[test]
    fn empty_filter_is_absent() {
        assert_eq!(FilterBuilder::new().eq("status", None).expect("filter").build(), None);
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let err = FilterBuilder::new()
            .at_least("riskScore", Some(f64::NAN))
            .err()
            .expect("error");
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[test]
    fn document_serializes_without_empty_variables() {
        let doc = QueryDocument::new("{ ping }");
        assert_eq!(serde_json::to_value(&doc).unwrap(), serde_json::json!({"query": "{ ping }"}));
    }

    #[test]
    fn nested_block_is_absent_when_not_requested() {
        assert_eq!(nested_block(false, "trend", &["date"], 4), "");
        assert_eq!(
            nested_block(true, "trend", &["date", "score"], 4),
            "\n    trend {\n      date\n      score\n    }"
        );
    }
}
