// autocommit-core/src/models/tools.rs
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

/// A tool call requested by the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String, // Usually "function"
    pub function: ToolFunction,
}

/// The function name and its JSON-encoded arguments.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolFunction {
    pub name: String,
    /// Arguments arrive as a JSON string, not an object.
    pub arguments: String,
}

/// Schema for a tool presented to the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ToolParametersDefinition,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolParametersDefinition {
    #[serde(rename = "type")]
    pub param_type: String,
    pub properties: HashMap<String, ToolParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

impl ToolParametersDefinition {
    /// Builds an `object` schema from `(name, parameter)` pairs.
    pub fn object(properties: Vec<(&str, ToolParameter)>, required: &[&str]) -> Self {
        Self {
            param_type: "object".to_string(),
            properties: properties
                .into_iter()
                .map(|(name, param)| (name.to_string(), param))
                .collect(),
            required: required.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A single parameter within a tool schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolParameter {
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: String,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ToolParameter>>,
}

impl ToolParameter {
    fn new(param_type: ToolParameterType, description: &str) -> Self {
        Self {
            param_type,
            description: description.to_string(),
            enum_values: None,
            items: None,
        }
    }

    pub fn string(description: &str) -> Self {
        Self::new(ToolParameterType::String, description)
    }

    pub fn boolean(description: &str) -> Self {
        Self::new(ToolParameterType::Boolean, description)
    }

    pub fn integer(description: &str) -> Self {
        Self::new(ToolParameterType::Integer, description)
    }

    pub fn string_array(description: &str) -> Self {
        Self {
            items: Some(Box::new(Self::string("A single string item"))),
            ..Self::new(ToolParameterType::Array, description)
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

/// Runtime arguments for a tool call, kept as raw JSON until the provider
/// validates them against its own typed schema.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ToolInput {
    pub arguments: HashMap<String, JsonValue>,
}
