// Text reversal tool

use crate::tools::{Tool, ToolError};
use serde::Deserialize;
use tollgate_core::{FieldKind, FieldSpec, InputSchema, ToolOutput, ValidatedInput};

/// Reverses the full character sequence of its input
pub struct ReverseTextTool;

#[derive(Debug, Deserialize)]
pub struct ReverseTextArgs {
    pub text: String,
}

pub fn reverse(text: &str) -> String {
    text.chars().rev().collect()
}

#[async_trait::async_trait]
impl Tool for ReverseTextTool {
    type Input = ReverseTextArgs;

    fn name(&self) -> &str {
        "reverse_text"
    }

    fn description(&self) -> &str {
        "Reverses the given text string."
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::empty().field(
            FieldSpec::new("text", FieldKind::String, "The text to reverse.")
                .required()
                .non_blank(),
        )
    }

    async fn call(&self, input: ValidatedInput<ReverseTextArgs>) -> Result<ToolOutput, ToolError> {
        Ok(ToolOutput::new(reverse(&input.text)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolDescriptor;
    use serde_json::json;

    #[test]
    fn test_reverse_whole_sequence() {
        assert_eq!(reverse("hello"), "olleh");
        assert_eq!(reverse("hello world"), "dlrow olleh");
        assert_eq!(reverse("  padded"), "deddap  ");
        assert_eq!(reverse("héllo→"), "→olléh");
    }

    #[test]
    fn test_reverse_is_an_involution() {
        for text in ["a", "ab", "hello world", "日本語のテキスト", " x ", "🦀 crab"] {
            assert_eq!(reverse(&reverse(text)), text);
        }
    }

    #[tokio::test]
    async fn test_blank_text_fails_validation() {
        let descriptor = ToolDescriptor::new(ReverseTextTool);

        for blank in ["", "   "] {
            let err = descriptor.prepare(json!({ "text": blank })).err().unwrap();
            assert_eq!(err.to_string(), "text cannot be empty");
        }

        let output = descriptor
            .prepare(json!({"text": "hello"}))
            .unwrap()
            .invoke()
            .await
            .unwrap();
        assert_eq!(output.value, json!("olleh"));
    }
}
