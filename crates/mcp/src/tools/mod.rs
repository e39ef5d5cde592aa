pub mod reverse;
pub mod validate;
mod registry;

pub use registry::{
    input_schema_json, json_schema_array, json_schema_boolean, json_schema_integer,
    json_schema_number, json_schema_object, json_schema_string, PendingCall, RegistryError, Tool,
    ToolDescriptor, ToolError, ToolRegistry,
};
pub use reverse::ReverseTextTool;
pub use validate::ValidateTool;

/// Registry holding the built-in `validate` and `reverse_text` tools
pub fn builtin_registry(identity: impl Into<String>) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();
    registry.register(ValidateTool::new(identity))?;
    registry.register(ReverseTextTool)?;
    Ok(registry)
}
