//! Tool Registry
//!
//! Maps tool names to their definition and the kind that handles them. Built
//! once at startup and read-only afterwards.

use std::collections::HashMap;

use thiserror::Error;

use super::definition::ToolDefinition;
use super::metrics::ToolKind;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool registered twice: {0}")]
    DuplicateTool(String),
}

/// A registered tool with metadata and handler
#[derive(Debug, Clone)]
pub struct RegisteredTool {
    pub definition: ToolDefinition,
    pub kind: ToolKind,
}

impl RegisteredTool {
    pub fn new(kind: ToolKind) -> Self {
        Self {
            definition: kind.definition(),
            kind,
        }
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }
}

/// Registry for tools, in registration order.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the full built-in catalogue.
    pub fn builtin() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for kind in ToolKind::ALL {
            registry.register(RegisteredTool::new(kind))?;
        }
        Ok(registry)
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, tool: RegisteredTool) -> Result<(), RegistryError> {
        if self.by_name.contains_key(tool.name()) {
            return Err(RegistryError::DuplicateTool(tool.name().to_string()));
        }
        self.by_name.insert(tool.name().to_string(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&RegisteredTool> {
        self.by_name.get(name).map(|&index| &self.tools[index])
    }

    /// Tool definitions in registration order.
    pub fn list(&self) -> Vec<&ToolDefinition> {
        self.tools.iter().map(|tool| &tool.definition).collect()
    }

    /// Get the number of registered tools
    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }
}
