use serde_json::{Map, Value, json};

use super::model::{
    Alert, CaseGraph, EdgeEndpoint, EntityNode, NodeType, RelationshipEdge, Severity,
};

fn details(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn node(id: &str, label: &str, node_type: NodeType, risk_score: f32, extra: Value) -> EntityNode {
    EntityNode {
        id: id.to_owned(),
        label: label.to_owned(),
        node_type,
        risk_score,
        details: details(extra),
    }
}

fn edge(source: &str, target: &str, relation: &str, strength: f32) -> RelationshipEdge {
    RelationshipEdge {
        source: EdgeEndpoint::Id(source.to_owned()),
        target: EdgeEndpoint::Id(target.to_owned()),
        relation: relation.to_owned(),
        strength,
    }
}

fn alert(id: &str, title: &str, description: &str, severity: Severity, timestamp: &str) -> Alert {
    Alert {
        id: id.to_owned(),
        title: title.to_owned(),
        description: description.to_owned(),
        severity,
        timestamp: timestamp.to_owned(),
        read: false,
    }
}

/// The built-in "Operation Jamtara" demonstration case, used when no case
/// file is supplied on the command line.
pub fn sample_case() -> CaseGraph {
    CaseGraph {
        name: "Operation Jamtara".to_owned(),
        nodes: vec![
            node(
                "S001",
                "Raju \"The Spider\" Mandal",
                NodeType::Suspect,
                95.0,
                json!({ "age": 28, "criminalRecord": "Fraud, 420 IPC", "active": true, "notes": "Suspected gang leader" }),
            ),
            node(
                "S002",
                "Amit Kumar",
                NodeType::Suspect,
                75.0,
                json!({ "age": 22, "role": "Caller", "location": "Deoghar", "notes": "Frequent calls to S001" }),
            ),
            node(
                "S003",
                "Vikram Singh",
                NodeType::Suspect,
                88.0,
                json!({ "age": 34, "role": "Handler", "location": "Jamtara", "notes": "Money mule coordinator" }),
            ),
            node(
                "D001",
                "iPhone 13 Pro",
                NodeType::Device,
                40.0,
                json!({ "activeSince": "2023-01", "imei": "356987045612445", "model": "iPhone 13" }),
            ),
            node(
                "D002",
                "Vivo Y21",
                NodeType::Device,
                60.0,
                json!({ "activeSince": "2023-05", "imei": "865432014567992", "model": "Vivo Y21" }),
            ),
            node(
                "SIM001",
                "+91 98765 43210",
                NodeType::Sim,
                80.0,
                json!({ "carrier": "Airtel", "registeredTo": "Fake ID (Ramesh)", "phone": "9876543210" }),
            ),
            node(
                "SIM002",
                "+91 88888 11111",
                NodeType::Sim,
                70.0,
                json!({ "carrier": "Jio", "registeredTo": "Unknown", "phone": "8888811111" }),
            ),
            node(
                "BK001",
                "SBI Acct ...4555",
                NodeType::BankAccount,
                90.0,
                json!({ "type": "Mule", "balance": "₹4,50,000", "accountHolder": "Suresh Das" }),
            ),
            node(
                "BK002",
                "HDFC Acct ...2231",
                NodeType::BankAccount,
                65.0,
                json!({ "type": "Transit", "balance": "₹1,20,000", "accountHolder": "Priya Ent." }),
            ),
            node(
                "IP001",
                "192.168.45.22",
                NodeType::IpAddress,
                50.0,
                json!({ "isp": "Jio Fiber", "geo": "Karmatanr, Jharkhand" }),
            ),
            node(
                "LOC1",
                "Karmatanr Tower A",
                NodeType::Location,
                30.0,
                json!({ "lat": 24.0, "lng": 86.0, "range": "2km" }),
            ),
        ],
        edges: vec![
            edge("S001", "D001", "OWNS", 1.0),
            edge("S002", "D001", "USES_SHARED", 0.8),
            edge("D001", "SIM001", "EQUIPPED_WITH", 1.0),
            edge("D001", "SIM002", "SWAPPED_IN", 0.9),
            edge("S003", "BK001", "CONTROLS", 1.0),
            edge("BK001", "BK002", "TRANSFERS_TO", 0.7),
            edge("SIM001", "IP001", "CONNECTED_VIA", 0.5),
            edge("S001", "S003", "CALLS", 0.9),
            edge("S002", "S003", "REPORTS_TO", 0.6),
            edge("SIM001", "LOC1", "PINGED", 0.4),
        ],
        alerts: vec![
            alert(
                "A1",
                "SIM swapping detected",
                "Device D001 associated with 5 different SIMs in 24 hours.",
                Severity::High,
                "2 mins ago",
            ),
            alert(
                "A2",
                "High value transfer",
                "₹20L moved from mule account BK001 to unknown offshore wallet.",
                Severity::Critical,
                "15 mins ago",
            ),
            alert(
                "A3",
                "New device cluster",
                "3 suspects linked to shared device IMEI ...992 in Deoghar.",
                Severity::Medium,
                "1 hour ago",
            ),
        ],
    }
}
