use std::collections::HashSet;
use std::fs;

use anyhow::{Context, Result, anyhow};

use super::model::CaseGraph;

/// Reads and validates a JSON case file. Out-of-range scores are clamped
/// rather than rejected; duplicate node ids are a hard error because every
/// lookup in the app assumes id uniqueness.
pub fn load_case_graph(path: &str) -> Result<CaseGraph> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read case file {path}"))?;

    let case: CaseGraph =
        serde_json::from_str(&raw).with_context(|| format!("failed to parse case file {path}"))?;

    validate(case)
}

pub(super) fn validate(mut case: CaseGraph) -> Result<CaseGraph> {
    if case.nodes.is_empty() {
        return Err(anyhow!("case file contains no entity nodes"));
    }

    let mut seen = HashSet::with_capacity(case.nodes.len());
    for node in &mut case.nodes {
        if node.id.trim().is_empty() {
            return Err(anyhow!("entity node with empty id (label: {})", node.label));
        }
        if !seen.insert(node.id.clone()) {
            return Err(anyhow!("duplicate entity id {}", node.id));
        }
        node.risk_score = node.risk_score.clamp(0.0, 100.0);
    }

    let mut unresolved = 0usize;
    for edge in &mut case.edges {
        edge.strength = edge.strength.clamp(0.0, 1.0);
        if !seen.contains(edge.source.id()) || !seen.contains(edge.target.id()) {
            unresolved += 1;
        }
    }

    // Unresolved endpoints are not an error; normalization drops those
    // edges so a filtered subgraph never shows a dangling line.
    if unresolved > 0 {
        log::debug!("{unresolved} edge(s) reference entities missing from the case");
    }

    log::info!(
        "loaded case {:?}: {} nodes, {} edges, {} alerts",
        case.name,
        case.nodes.len(),
        case.edges.len(),
        case.alerts.len()
    );

    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::sample_case;

    #[test]
    fn sample_case_passes_validation() {
        let case = validate(sample_case()).unwrap();
        assert_eq!(case.node_count(), 11);
        assert_eq!(case.edge_count(), 10);
        for edge in &case.edges {
            assert!(case.node(edge.source.id()).is_some());
            assert!(case.node(edge.target.id()).is_some());
        }
    }

    #[test]
    fn validation_clamps_out_of_range_scores() {
        let mut case = sample_case();
        case.nodes[0].risk_score = 140.0;
        case.nodes[1].risk_score = -3.0;
        case.edges[0].strength = 2.5;

        let case = validate(case).unwrap();
        assert_eq!(case.nodes[0].risk_score, 100.0);
        assert_eq!(case.nodes[1].risk_score, 0.0);
        assert_eq!(case.edges[0].strength, 1.0);
    }

    #[test]
    fn validation_rejects_duplicate_ids() {
        let mut case = sample_case();
        let copy = case.nodes[0].clone();
        case.nodes.push(copy);
        assert!(validate(case).is_err());
    }

    #[test]
    fn validation_rejects_empty_case() {
        let mut case = sample_case();
        case.nodes.clear();
        assert!(validate(case).is_err());
    }
}
