use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use crate::case::{CaseGraph, NodeType};

pub(in crate::app) struct IntelligenceReport {
    pub(in crate::app) summary: String,
    pub(in crate::app) key_suspects: Vec<String>,
    pub(in crate::app) recommended_actions: Vec<String>,
    pub(in crate::app) network_type: String,
    pub(in crate::app) generated_at: String,
}

/// Analysis runs on its own thread and reports back over a channel; the
/// panel polls once per frame. One analysis at a time.
pub(in crate::app) struct IntelState {
    rx: Option<Receiver<IntelligenceReport>>,
    report: Option<IntelligenceReport>,
}

impl IntelState {
    pub(in crate::app) fn new() -> Self {
        Self {
            rx: None,
            report: None,
        }
    }

    pub(in crate::app) fn running(&self) -> bool {
        self.rx.is_some()
    }

    pub(in crate::app) fn report(&self) -> Option<&IntelligenceReport> {
        self.report.as_ref()
    }

    pub(in crate::app) fn start(&mut self, case: CaseGraph) {
        if self.rx.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(analyze_case(&case));
        });
        self.rx = Some(rx);
    }

    pub(in crate::app) fn poll(&mut self) {
        let Some(rx) = &self.rx else {
            return;
        };

        match rx.try_recv() {
            Ok(report) => {
                self.report = Some(report);
                self.rx = None;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.rx = None;
            }
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

/// Deterministic offline network analysis standing in for the remote
/// intelligence service: centrality-weighted suspect ranking, a type
/// census for network classification, and actionable follow-ups.
pub(in crate::app) fn analyze_case(case: &CaseGraph) -> IntelligenceReport {
    if case.nodes.is_empty() {
        return IntelligenceReport {
            summary: "Analysis service received an empty case; no network to evaluate.".to_owned(),
            key_suspects: Vec::new(),
            recommended_actions: vec![
                "Check manual logs".to_owned(),
                "Verify case data ingestion".to_owned(),
            ],
            network_type: "Unknown".to_owned(),
            generated_at: timestamp(),
        };
    }

    // Centrality proxy: risk dominates, connectivity breaks near-ties.
    let mut ranked: Vec<(f32, &str, &str)> = case
        .nodes
        .iter()
        .filter(|node| node.node_type == NodeType::Suspect)
        .map(|node| {
            let score = node.risk_score + (5.0 * case.degree(&node.id) as f32);
            (score, node.label.as_str(), node.id.as_str())
        })
        .collect();
    ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.2.cmp(b.2)));

    let key_suspects: Vec<String> = ranked
        .iter()
        .take(3)
        .map(|(_score, label, id)| format!("{label} ({id})"))
        .collect();

    let count_of = |node_type: NodeType| {
        case.nodes
            .iter()
            .filter(|node| node.node_type == node_type)
            .count()
    };
    let suspects = count_of(NodeType::Suspect);
    let sims = count_of(NodeType::Sim);
    let accounts = count_of(NodeType::BankAccount);
    let ips = count_of(NodeType::IpAddress);

    let network_type = if sims >= 2 && sims >= suspects {
        "SIM box operation"
    } else if accounts >= 2 {
        "Money mule network"
    } else if ips >= 2 {
        "Online fraud infrastructure"
    } else if suspects >= 2 {
        "Organized fraud cell"
    } else {
        "Isolated activity"
    }
    .to_owned();

    let mut recommended_actions = Vec::new();
    if let Some((_score, label, _id)) = ranked.first() {
        recommended_actions.push(format!("Prioritize surveillance on {label}"));
    }
    for node in &case.nodes {
        if node.node_type == NodeType::BankAccount && node.risk_score >= 70.0 {
            recommended_actions.push(format!("Freeze {}", node.label));
        }
    }
    for node in &case.nodes {
        if node.node_type == NodeType::Device && case.degree(&node.id) >= 3 {
            recommended_actions.push(format!("Subpoena IMEI records for {}", node.label));
        }
    }
    recommended_actions.truncate(4);

    let kingpin = ranked
        .first()
        .map(|(_score, label, _id)| *label)
        .unwrap_or("no clear central figure");
    let summary = format!(
        "Network of {} entities over {} relationships, classified as {}. \
         Connectivity and risk concentrate on {}; {} of {} alert(s) remain unread.",
        case.node_count(),
        case.edge_count(),
        network_type.to_lowercase(),
        kingpin,
        case.unread_alert_count(),
        case.alerts.len()
    );

    IntelligenceReport {
        summary,
        key_suspects,
        recommended_actions,
        network_type,
        generated_at: timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use crate::case::sample_case;

    use super::*;

    #[test]
    fn ranking_weights_risk_by_connectivity() {
        let report = analyze_case(&sample_case());
        assert_eq!(report.key_suspects.len(), 3);
        assert!(report.key_suspects[0].contains("Raju"), "gang leader should rank first");
        assert!(report.key_suspects[1].contains("Vikram"));
    }

    #[test]
    fn sample_case_is_classified_as_mule_network() {
        let report = analyze_case(&sample_case());
        assert_eq!(report.network_type, "Money mule network");
        assert!(report.recommended_actions.iter().any(|action| action.contains("Freeze")));
        assert!(!report.summary.is_empty());
    }

    #[test]
    fn analysis_is_deterministic_apart_from_the_timestamp() {
        let a = analyze_case(&sample_case());
        let b = analyze_case(&sample_case());
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.key_suspects, b.key_suspects);
        assert_eq!(a.recommended_actions, b.recommended_actions);
        assert_eq!(a.network_type, b.network_type);
    }

    #[test]
    fn empty_case_degrades_to_the_fallback_report() {
        let mut case = sample_case();
        case.nodes.clear();
        case.edges.clear();

        let report = analyze_case(&case);
        assert_eq!(report.network_type, "Unknown");
        assert!(report.key_suspects.is_empty());
        assert!(!report.recommended_actions.is_empty());
    }
}
