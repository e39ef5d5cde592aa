// Connectivity check that reports the operator's identity

use crate::tools::{Tool, ToolError};
use serde::de::IgnoredAny;
use tollgate_core::{InputSchema, ToolOutput, ValidatedInput};

/// Returns the configured server identity to any authenticated caller
pub struct ValidateTool {
    identity: String,
}

impl ValidateTool {
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
        }
    }
}

#[async_trait::async_trait]
impl Tool for ValidateTool {
    type Input = IgnoredAny;

    fn name(&self) -> &str {
        "validate"
    }

    fn description(&self) -> &str {
        "Used to check if the server is connected and authorized."
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::empty()
    }

    async fn call(&self, _input: ValidatedInput<IgnoredAny>) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::new(self.identity.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolDescriptor;
    use serde_json::json;

    #[tokio::test]
    async fn test_returns_identity_for_any_input() {
        let descriptor = ToolDescriptor::new(ValidateTool::new("+10000000000"));

        for raw in [json!(null), json!({}), json!({"text": "ignored"}), json!([1, 2])] {
            let output = descriptor.prepare(raw).unwrap().invoke().await.unwrap();
            assert_eq!(output.value, json!("+10000000000"));
        }
    }
}
