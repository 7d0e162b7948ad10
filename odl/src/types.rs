// SDN-TE: Delay-Aware Traffic Engineering for Software-Defined Networks
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Types of the flow-node-inventory model

use serde::{Deserialize, Serialize};

/// Body of a flow request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowConfig {
    /// The flow
    pub flow: Flow,
}

/// Flow entry of a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    /// Flow ID
    pub id: String,
    /// Table ID
    pub table_id: u8,
    /// Priority of the entry
    pub priority: u32,
    /// Name tag
    #[serde(rename = "flow-name")]
    pub flow_name: String,
    /// Match
    #[serde(rename = "match")]
    pub flow_match: FlowMatch,
    /// Instructions
    pub instructions: Instructions,
}

impl Flow {
    /// Flow matching on the IPv4 destination, with a single instruction sending the packet out of
    /// the given port.
    pub fn output_to(
        id: impl Into<String>,
        table_id: u8,
        priority: u32,
        flow_name: impl Into<String>,
        ipv4_destination: impl Into<String>,
        port: u32,
        max_length: u32,
    ) -> Self {
        Self {
            id: id.into(),
            table_id,
            priority,
            flow_name: flow_name.into(),
            flow_match: FlowMatch { ipv4_destination: ipv4_destination.into() },
            instructions: Instructions {
                instruction: vec![Instruction {
                    order: 0,
                    apply_actions: ApplyActions {
                        action: vec![Action {
                            order: 0,
                            output_action: OutputAction {
                                output_node_connector: port.to_string(),
                                max_length,
                            },
                        }],
                    },
                }],
            },
        }
    }
}

/// Match of a flow entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowMatch {
    /// IPv4 destination in CIDR notation
    #[serde(rename = "ipv4-destination")]
    pub ipv4_destination: String,
}

/// List of instructions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instructions {
    /// Instructions
    pub instruction: Vec<Instruction>,
}

/// Single instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// Order of the instruction
    pub order: u32,
    /// Actions applied
    #[serde(rename = "apply-actions")]
    pub apply_actions: ApplyActions,
}

/// List of actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyActions {
    /// Actions
    pub action: Vec<Action>,
}

/// Single action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Order of the action
    pub order: u32,
    /// Output action
    #[serde(rename = "output-action")]
    pub output_action: OutputAction,
}

/// Send the packet out of a port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputAction {
    /// Port number
    #[serde(rename = "output-node-connector")]
    pub output_node_connector: String,
    /// Maximum length of the packet
    #[serde(rename = "max-length")]
    pub max_length: u32,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn flow_body() {
        let config = FlowConfig {
            flow: Flow::output_to("flow_s3_s6_1", 0, 1000, "dest-ip-flow", "10.0.0.6/24", 2, 65535),
        };
        let expected = json!({
            "flow": {
                "id": "flow_s3_s6_1",
                "table_id": 0,
                "priority": 1000,
                "flow-name": "dest-ip-flow",
                "match": { "ipv4-destination": "10.0.0.6/24" },
                "instructions": {
                    "instruction": [{
                        "order": 0,
                        "apply-actions": {
                            "action": [{
                                "order": 0,
                                "output-action": {
                                    "output-node-connector": "2",
                                    "max-length": 65535
                                }
                            }]
                        }
                    }]
                }
            }
        });
        assert_eq!(serde_json::to_value(&config).unwrap(), expected);
        let parsed: FlowConfig = serde_json::from_value(expected).unwrap();
        assert_eq!(parsed, config);
    }
}
