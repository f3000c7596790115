//! Tool and parameter definitions.

use serde::Serialize;
use serde_json::{Map, Value};

/// The type a parameter value is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
}

impl ParamKind {
    fn json_type(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
        }
    }
}

/// Declaration of a single tool parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
    pub description: String,
    /// Filled in when an optional parameter is omitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Lower bound for integer parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    /// Upper bound for integer parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
}

impl ParamSpec {
    fn new(name: impl Into<String>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: String::new(),
            default: None,
            minimum: None,
            maximum: None,
        }
    }

    /// A required string parameter.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::String)
    }

    /// A required integer parameter.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Integer)
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Make the parameter optional, defaulting to `default` when omitted.
    pub fn optional(mut self, default: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(default.into());
        self
    }

    pub fn minimum(mut self, minimum: i64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    pub fn maximum(mut self, maximum: i64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    fn json_schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::from(self.kind.json_type()));
        if !self.description.is_empty() {
            schema.insert(
                "description".to_string(),
                Value::from(self.description.clone()),
            );
        }
        if let Some(default) = &self.default {
            schema.insert("default".to_string(), default.clone());
        }
        if let Some(minimum) = self.minimum {
            schema.insert("minimum".to_string(), Value::from(minimum));
        }
        if let Some(maximum) = self.maximum {
            schema.insert("maximum".to_string(), Value::from(maximum));
        }
        Value::Object(schema)
    }
}

/// A tool as exposed to clients. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// Parameters in declaration order
    pub parameters: Vec<ParamSpec>,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn param(mut self, spec: ParamSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// JSON Schema of the parameters, as MCP clients expect it.
    pub fn input_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.json_schema()))
            .collect();
        let required: Vec<Value> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| Value::from(p.name.clone()))
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Parameters after validation: coerced to their declared kind, with defaults
/// filled in. Undeclared parameters are not carried over.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_schema() {
        let definition = ToolDefinition::new("query_metrics", "Query metrics")
            .param(ParamSpec::string("query").description("Metric query"))
            .param(
                ParamSpec::integer("days_back")
                    .optional(7)
                    .minimum(1)
                    .maximum(3650),
            );

        assert_eq!(
            definition.input_schema(),
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "Metric query"},
                    "days_back": {
                        "type": "integer",
                        "default": 7,
                        "minimum": 1,
                        "maximum": 3650
                    }
                },
                "required": ["query"]
            })
        );
    }

    #[test]
    fn test_param_spec_serialization() {
        let spec = ParamSpec::integer("days_back").optional(7);
        let json = serde_json::to_value(&spec).unwrap();

        assert_eq!(json["kind"], "integer");
        assert_eq!(json["required"], false);
        assert_eq!(json["default"], 7);
        assert!(json.get("minimum").is_none());
        assert!(json.get("maximum").is_none());
    }
}
