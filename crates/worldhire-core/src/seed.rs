//! Uniform result shape for seeding steps.

use serde::{Deserialize, Serialize};

/// Outcome of a seeding step or of a whole seeding run.
///
/// A successful result never carries errors. A failed result may still have
/// written data: seeding never rolls back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

impl SeedResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            errors: None,
        }
    }

    /// A failure with no error detail, e.g. a skipped step.
    pub fn skipped(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: None,
        }
    }

    pub fn failed(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            errors: (!errors.is_empty()).then_some(errors),
        }
    }

    /// Success when `errors` is empty, failure carrying them otherwise.
    pub fn from_errors(message: impl Into<String>, errors: Vec<String>) -> Self {
        if errors.is_empty() {
            Self::ok(message)
        } else {
            Self::failed(message, errors)
        }
    }

    pub fn error_list(&self) -> &[String] {
        self.errors.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_never_carries_errors() {
        let result = SeedResult::from_errors("done", Vec::new());
        assert!(result.success);
        assert!(result.errors.is_none());

        let result = SeedResult::from_errors("partial", vec!["boom".to_string()]);
        assert!(!result.success);
        assert_eq!(result.error_list(), ["boom".to_string()]);
    }

    #[test]
    fn test_serialized_shape_omits_empty_errors() {
        let json = serde_json::to_value(SeedResult::ok("fine")).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "message": "fine"}));
    }
}
