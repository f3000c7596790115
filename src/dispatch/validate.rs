//! Parameter validation and coercion.

use serde_json::{Map, Value};

use super::failure::ToolFailure;
use crate::tools::{ParamKind, ParamSpec, ToolArguments, ToolDefinition};

/// Check `raw` against the declared parameters of `definition`, in declaration
/// order. Absent optional parameters take their default; undeclared ones are
/// dropped.
pub(crate) fn coerce_arguments(
    definition: &ToolDefinition,
    raw: &Map<String, Value>,
) -> Result<ToolArguments, ToolFailure> {
    let mut arguments = ToolArguments::new();

    for spec in &definition.parameters {
        let value = match raw.get(&spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    return Err(ToolFailure::missing_parameter(&spec.name));
                }
                match &spec.default {
                    Some(default) => default.clone(),
                    None => continue,
                }
            }
            Some(value) => coerce_value(spec, value)?,
        };
        arguments.insert(spec.name.clone(), value);
    }

    Ok(arguments)
}

fn coerce_value(spec: &ParamSpec, value: &Value) -> Result<Value, ToolFailure> {
    match spec.kind {
        ParamKind::String => match value {
            Value::String(s) if !s.trim().is_empty() => Ok(Value::String(s.clone())),
            Value::String(_) => Err(ToolFailure::invalid_parameter(format!(
                "Parameter '{}' must not be empty",
                spec.name
            ))),
            _ => Err(ToolFailure::invalid_parameter(format!(
                "Parameter '{}' must be a string",
                spec.name
            ))),
        },
        ParamKind::Integer => {
            let number = match value {
                Value::Number(n) => n.as_i64(),
                // Query strings carry everything as text
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| {
                ToolFailure::invalid_parameter(format!(
                    "Parameter '{}' must be an integer, got {}",
                    spec.name, value
                ))
            })?;

            if let Some(minimum) = spec.minimum {
                if number < minimum {
                    return Err(ToolFailure::invalid_parameter(format!(
                        "Parameter '{}' must be at least {}, got {}",
                        spec.name, minimum, number
                    )));
                }
            }

            if let Some(maximum) = spec.maximum {
                if number > maximum {
                    return Err(ToolFailure::invalid_parameter(format!(
                        "Parameter '{}' must be at most {}, got {}",
                        spec.name, maximum, number
                    )));
                }
            }

            Ok(Value::from(number))
        }
    }
}
