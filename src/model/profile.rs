use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// The single profile record held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Request body for PATCH /api/profile
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchProfileRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image: Option<String>,
}

// A binary image received through the multipart form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
}

/// What the full-update form said about `profileImage`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageField {
    /// No `profileImage` part was sent; keep the stored reference.
    #[default]
    NotSupplied,
    /// The part was sent but empty; clear the stored reference.
    Cleared,
    Upload(ImageUpload),
}

// Parsed PUT /api/profile multipart form
#[derive(Debug, Clone, Default)]
pub struct FullUpdateForm {
    pub name: Option<String>,
    pub email: Option<String>,
    pub profile_image: ImageField,
}

// One violated rule, as reported in the `details` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Envelope returned by every profile endpoint.
///
/// Absent members are omitted from the JSON, so a success carries
/// `data` (and maybe `message`) while a failure carries `error` and,
/// for schema violations, `details`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
            details: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    pub fn failure(error: impl Into<String>, details: Option<Vec<FieldError>>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
            details,
        }
    }
}

// Request body for POST /api/profile/validate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateProfileRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

// Accepted candidate echoed back by the validate endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedProfile {
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_envelope_decodes_without_data() {
        let body = r#"{"success":false,"error":"Validation failed","details":[{"field":"email","message":"Email is required"}]}"#;
        let envelope: ApiResponse<Profile> = serde_json::from_str(body).unwrap();

        assert!(!envelope.success);
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error.as_deref(), Some("Validation failed"));
        assert_eq!(
            envelope.details,
            Some(vec![FieldError::new("email", "Email is required")])
        );
    }
}
