// Tool trait, descriptors, and the startup-time tool registry

use crate::protocol::ToolSchema;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tollgate_core::{FieldKind, InputSchema, ToolOutput, ValidatedInput, ValidationError};

/// Domain failure reported by a handler, passed to the caller unchanged
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    pub message: String,
}

impl ToolError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A named, schema-typed operation
#[async_trait::async_trait]
pub trait Tool: Send + Sync + 'static {
    /// Arguments decoded after schema validation
    type Input: DeserializeOwned + Send + 'static;

    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> InputSchema;

    /// Run the tool against arguments that already passed `input_schema`
    async fn call(&self, input: ValidatedInput<Self::Input>) -> Result<ToolOutput, ToolError>;
}

/// Handler invocation that has passed validation but not yet started
pub struct PendingCall<'a> {
    future: Pin<Box<dyn Future<Output = Result<ToolOutput, ToolError>> + Send + 'a>>,
}

impl PendingCall<'_> {
    pub async fn invoke(self) -> Result<ToolOutput, ToolError> {
        self.future.await
    }
}

// Type-erased view of a Tool so descriptors with different inputs share a map
trait Handler: Send + Sync {
    fn bind(&self, schema: &InputSchema, raw: serde_json::Value)
        -> Result<PendingCall<'_>, ValidationError>;
}

impl<T: Tool> Handler for T {
    fn bind(
        &self,
        schema: &InputSchema,
        raw: serde_json::Value,
    ) -> Result<PendingCall<'_>, ValidationError> {
        let input = schema.validate::<T::Input>(raw)?;
        Ok(PendingCall {
            future: self.call(input),
        })
    }
}

/// Registered tool: name, description, input schema and handler
#[derive(Clone)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    input_schema: InputSchema,
    handler: Arc<dyn Handler>,
}

impl ToolDescriptor {
    pub fn new<T: Tool>(tool: T) -> Self {
        Self {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.input_schema(),
            handler: Arc::new(tool),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Validate `raw` and return the handler call it unlocks.
    ///
    /// The handler does not run until the returned call is invoked.
    pub fn prepare(&self, raw: serde_json::Value) -> Result<PendingCall<'_>, ValidationError> {
        self.handler.bind(&self.input_schema, raw)
    }

    /// Get the tool schema for MCP
    pub fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.clone(),
            description: self.description.clone(),
            input_schema: input_schema_json(&self.input_schema),
        }
    }
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    DuplicateTool(String),
}

/// Tool registry, filled once at startup and read-only afterwards
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, ToolDescriptor>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a name can only be taken once
    pub fn register<T: Tool>(&mut self, tool: T) -> Result<(), RegistryError> {
        self.register_descriptor(ToolDescriptor::new(tool))
    }

    pub fn register_descriptor(&mut self, descriptor: ToolDescriptor) -> Result<(), RegistryError> {
        if self.tools.contains_key(descriptor.name()) {
            return Err(RegistryError::DuplicateTool(descriptor.name().to_string()));
        }

        tracing::debug!(tool = descriptor.name(), "Registered tool");
        self.tools.insert(descriptor.name().to_string(), descriptor);
        Ok(())
    }

    /// Get a tool by name
    pub fn lookup(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.get(name)
    }

    /// List all tool schemas, ordered by name
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.tools.values().map(ToolDescriptor::schema).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// Helper functions for creating tool schemas

/// Render an [`InputSchema`] as the JSON Schema object MCP clients expect
pub fn input_schema_json(schema: &InputSchema) -> serde_json::Value {
    let mut properties = serde_json::Map::new();

    for field in schema.fields() {
        let mut property = match field.kind {
            FieldKind::String => json_schema_string(&field.description),
            FieldKind::Number => json_schema_number(&field.description),
            FieldKind::Integer => json_schema_integer(&field.description),
            FieldKind::Boolean => json_schema_boolean(&field.description),
            FieldKind::Array => json_schema_array(serde_json::json!({}), &field.description),
            FieldKind::Object => serde_json::json!({
                "type": "object",
                "description": field.description
            }),
        };
        if field.non_blank {
            property["minLength"] = serde_json::json!(1);
        }
        properties.insert(field.name.clone(), property);
    }

    json_schema_object(
        serde_json::Value::Object(properties),
        schema.required_fields().collect(),
    )
}

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_number(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "number",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "integer",
        "description": description
    })
}

pub fn json_schema_boolean(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "boolean",
        "description": description
    })
}

pub fn json_schema_array(items: serde_json::Value, description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "array",
        "items": items,
        "description": description
    })
}
