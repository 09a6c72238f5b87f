//! Tool Trait and Registry
//!
//! The unified `Tool` interface and the `ToolRegistry` the orchestrator
//! dispatches through. Registration happens once at startup; lookups are
//! by name over the closed set of known tools.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use taskline_core::TaskStore;
use taskline_llm::{ParameterSchema, ToolDefinition};

use crate::handlers::{AddTask, CompleteTask, DeleteTask, ListTasks, UpdateTask};
use crate::outcome::{ToolError, ToolResult};

/// Context provided to each tool during execution.
///
/// Carries the verified caller identity and the task store handle. The
/// identity always comes from the authenticated request, never from tool
/// arguments or reasoning output.
pub struct ToolExecutionContext {
    /// Verified caller identity; scopes every store query
    pub user_id: String,
    /// Task store the handlers operate on
    pub tasks: Arc<dyn TaskStore>,
}

impl ToolExecutionContext {
    /// Create a context for one turn
    pub fn new(user_id: impl Into<String>, tasks: Arc<dyn TaskStore>) -> Self {
        Self {
            user_id: user_id.into(),
            tasks,
        }
    }
}

/// Unified tool interface.
///
/// Each of the five task operations implements this trait, providing
/// identity (name, description, parameter schema) and execution logic.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of this tool (e.g., "add_task")
    fn name(&self) -> &str;

    /// Human-readable description of what this tool does
    fn description(&self) -> &str;

    /// JSON schema describing the tool's input parameters
    fn parameters_schema(&self) -> ParameterSchema;

    /// Execute the tool with the given context and arguments
    async fn execute(&self, ctx: &ToolExecutionContext, args: Value) -> ToolResult;
}

/// Registry of available tools.
///
/// Provides O(1) lookup by name and generates the tool catalog handed to
/// the reasoning capability. Insertion order is kept so the catalog is
/// deterministic.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool; replaces any previous tool with the same name
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Build the tool catalog for the reasoning capability
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.parameters_schema(),
            })
            .collect()
    }

    /// Dispatch a named tool call.
    ///
    /// Unknown names are rejected; the reasoning step only ever gets the
    /// catalog built from this registry, so an unknown name means it
    /// invented one.
    pub async fn dispatch(
        &self,
        name: &str,
        ctx: &ToolExecutionContext,
        args: Value,
    ) -> ToolResult {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        tool.execute(ctx, args).await
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the registry holding the five task-management tools
pub fn standard_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(AddTask));
    registry.register(Arc::new(ListTasks));
    registry.register(Arc::new(CompleteTask));
    registry.register(Arc::new(UpdateTask));
    registry.register(Arc::new(DeleteTask));
    registry
}
