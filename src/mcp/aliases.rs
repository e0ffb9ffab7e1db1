use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Short names accepted by `tools/call` in addition to the canonical ones.
pub const BUILTIN_TOOL_ALIASES: &[(&str, &str)] = &[
    ("assets", "query_assets"),
    ("vulns", "query_vulnerabilities"),
    ("vulnerabilities", "query_vulnerabilities"),
    ("findings", "query_findings"),
    ("risk", "get_risk_scores"),
    ("tickets", "query_tickets"),
    ("connectors", "query_connectors"),
    ("clusters", "query_clusters"),
    ("models", "query_data_models"),
    ("graphql", "execute_graphql"),
    ("ingest", "ingest_data"),
];

static BUILTIN_TOOL_ALIAS_MAP: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| BUILTIN_TOOL_ALIASES.iter().copied().collect());

pub fn canonical_tool_name(tool: &str) -> &str {
    BUILTIN_TOOL_ALIAS_MAP.get(tool).copied().unwrap_or(tool)
}

pub fn builtin_tool_alias_map_owned() -> HashMap<String, String> {
    BUILTIN_TOOL_ALIASES
        .iter()
        .map(|(alias, target)| (alias.to_string(), target.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::catalog::tool_by_name;

    #[test]
    fn every_alias_targets_a_catalog_tool() {
        for (alias, target) in BUILTIN_TOOL_ALIASES {
            assert!(tool_by_name(target).is_some(), "{} -> {} is dangling", alias, target);
            assert!(tool_by_name(alias).is_none(), "{} shadows a tool", alias);
        }
    }

    #[test]
    fn canonical_names_pass_through() {
        assert_eq!(canonical_tool_name("vulns"), "query_vulnerabilities");
        assert_eq!(canonical_tool_name("query_assets"), "query_assets");
    }
}
