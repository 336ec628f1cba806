use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeType {
    Suspect,
    Sim,
    Device,
    BankAccount,
    IpAddress,
    Location,
}

impl NodeType {
    pub const ALL: [NodeType; 6] = [
        NodeType::Suspect,
        NodeType::Sim,
        NodeType::Device,
        NodeType::BankAccount,
        NodeType::IpAddress,
        NodeType::Location,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Suspect => "Suspect",
            Self::Sim => "SIM card",
            Self::Device => "Device",
            Self::BankAccount => "Bank account",
            Self::IpAddress => "IP address",
            Self::Location => "Location",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntityNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(rename = "riskScore")]
    pub risk_score: f32,
    #[serde(default)]
    pub details: Map<String, Value>,
}

/// Edge endpoints in a case file may be a bare node id or an embedded node
/// object (the original export format produces both); either way only the
/// id participates in lookups.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EdgeEndpoint {
    Id(String),
    Node(Box<EntityNode>),
}

impl EdgeEndpoint {
    pub fn id(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Node(node) => &node.id,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub source: EdgeEndpoint,
    pub target: EdgeEndpoint,
    #[serde(rename = "type", alias = "relation")]
    pub relation: String,
    pub strength: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub timestamp: String,
    #[serde(default)]
    pub read: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CaseGraph {
    #[serde(default = "default_case_name")]
    pub name: String,
    pub nodes: Vec<EntityNode>,
    #[serde(alias = "links")]
    pub edges: Vec<RelationshipEdge>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

fn default_case_name() -> String {
    "Untitled case".to_owned()
}

impl CaseGraph {
    pub fn node(&self, id: &str) -> Option<&EntityNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn unread_alert_count(&self) -> usize {
        self.alerts.iter().filter(|alert| !alert.read).count()
    }

    /// Number of resolved edges touching `id`; endpoints that do not
    /// resolve to a current node are skipped, mirroring normalization.
    pub fn degree(&self, id: &str) -> usize {
        self.edges
            .iter()
            .filter(|edge| {
                (edge.source.id() == id || edge.target.id() == id)
                    && self.node(edge.source.id()).is_some()
                    && self.node(edge.target.id()).is_some()
            })
            .count()
    }

    /// Direct relationships of `id` for the details panel, as
    /// (neighbor, relation, outgoing). Dangling edges are skipped.
    pub fn relationships_of(&self, id: &str) -> Vec<(&EntityNode, &str, bool)> {
        let mut related = Vec::new();
        for edge in &self.edges {
            let (neighbor_id, outgoing) = if edge.source.id() == id {
                (edge.target.id(), true)
            } else if edge.target.id() == id {
                (edge.source.id(), false)
            } else {
                continue;
            };

            if let Some(neighbor) = self.node(neighbor_id) {
                related.push((neighbor, edge.relation.as_str(), outgoing));
            }
        }
        related
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_type_uses_original_wire_names() {
        let parsed: NodeType = serde_json::from_str("\"BANK_ACCOUNT\"").unwrap();
        assert_eq!(parsed, NodeType::BankAccount);
        assert_eq!(serde_json::to_string(&NodeType::IpAddress).unwrap(), "\"IP_ADDRESS\"");
        assert_eq!(serde_json::to_string(&NodeType::Sim).unwrap(), "\"SIM\"");
    }

    #[test]
    fn edge_endpoint_accepts_id_and_embedded_node() {
        let by_id: EdgeEndpoint = serde_json::from_str("\"S001\"").unwrap();
        assert_eq!(by_id.id(), "S001");

        let embedded: EdgeEndpoint = serde_json::from_value(serde_json::json!({
            "id": "D001",
            "label": "iPhone 13 Pro",
            "type": "DEVICE",
            "riskScore": 40.0,
            "details": {}
        }))
        .unwrap();
        assert_eq!(embedded.id(), "D001");
    }

    #[test]
    fn edge_relation_accepts_both_field_names() {
        let via_type: RelationshipEdge = serde_json::from_value(serde_json::json!({
            "source": "A", "target": "B", "type": "OWNS", "strength": 1.0
        }))
        .unwrap();
        assert_eq!(via_type.relation, "OWNS");

        let via_relation: RelationshipEdge = serde_json::from_value(serde_json::json!({
            "source": "A", "target": "B", "relation": "OWNS", "strength": 1.0
        }))
        .unwrap();
        assert_eq!(via_relation.relation, "OWNS");
    }

    #[test]
    fn relationships_skip_dangling_endpoints() {
        let case: CaseGraph = serde_json::from_value(serde_json::json!({
            "name": "t",
            "nodes": [
                { "id": "A", "label": "a", "type": "SUSPECT", "riskScore": 50.0 },
                { "id": "B", "label": "b", "type": "DEVICE", "riskScore": 10.0 }
            ],
            "links": [
                { "source": "A", "target": "B", "type": "OWNS", "strength": 1.0 },
                { "source": "A", "target": "GONE", "type": "CALLS", "strength": 0.5 }
            ]
        }))
        .unwrap();

        assert_eq!(case.degree("A"), 1);
        let related = case.relationships_of("A");
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].0.id, "B");
        assert!(related[0].2);
    }
}
