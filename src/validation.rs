//! Declarative profile schema.
//!
//! The rules themselves are `validator` derives on small rule structs. Its
//! report is keyed by field and carries no order, so each `check_*` re-reads it
//! per field and emits the fixed messages in name, email, image order, one
//! entry per violated rule.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::Validate;

use crate::model::profile::{FieldError, ImageUpload};

pub const FIELD_NAME: &str = "name";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_IMAGE: &str = "profileImage";

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const EMAIL_MAX_CHARS: usize = 100;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub const ACCEPTED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s]+$").expect("name pattern compiles"));

// No leading dot and no ".." are checked separately; the regex crate has no lookahead
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

const EMAIL_SYNTAX: &str = "email_syntax";
const IMAGE_TYPE: &str = "image_type";

#[derive(Validate)]
struct NameRules {
    #[validate(length(min = 2, max = 50), regex(path = *NAME_PATTERN))]
    name: String,
}

#[derive(Validate)]
struct EmailRules {
    #[validate(length(min = 1, max = 100), custom(function = "email_syntax"))]
    email: String,
}

#[derive(Validate)]
struct UploadRules {
    #[validate(range(max = 5_242_880))]
    size: usize,
    #[validate(custom(function = "accepted_image_type"))]
    content_type: String,
}

fn email_syntax(email: &str) -> Result<(), validator::ValidationError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        Err(validator::ValidationError::new(EMAIL_SYNTAX))
    }
}

fn accepted_image_type(content_type: &str) -> Result<(), validator::ValidationError> {
    let normalized = content_type.trim().to_ascii_lowercase();
    if ACCEPTED_IMAGE_TYPES.contains(&normalized.as_str()) {
        Ok(())
    } else {
        Err(validator::ValidationError::new(IMAGE_TYPE))
    }
}

/// Non-empty, ordered list of rule violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("validation failed with {} violation(s)", .0.len())]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|e| e.field.as_str())
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

/// Image part of a candidate profile.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ImageCandidate {
    /// Absent or explicitly null.
    #[default]
    None,
    /// A plain reference string; bypasses the binary checks.
    Reference(String),
    Upload(ImageUpload),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileCandidate {
    pub name: String,
    pub email: String,
    pub profile_image: ImageCandidate,
}

/// A candidate that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfile {
    pub name: String,
    pub email: String,
    pub profile_image: ImageCandidate,
}

// Codes the derive reported for `field`, empty when it passed
fn codes(report: &Result<(), validator::ValidationErrors>, field: &str) -> Vec<String> {
    match report {
        Ok(()) => Vec::new(),
        Err(report) => report
            .field_errors()
            .get(field)
            .map(|errors| errors.iter().map(|e| e.code.to_string()).collect())
            .unwrap_or_default(),
    }
}

pub fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    let report = NameRules {
        name: name.to_string(),
    }
    .validate();
    let codes = codes(&report, FIELD_NAME);
    let len = name.chars().count();

    if codes.iter().any(|c| c == "length") {
        let message = if len < NAME_MIN_CHARS {
            "Name must be at least 2 characters"
        } else {
            "Name must be less than 50 characters"
        };
        errors.push(FieldError::new(FIELD_NAME, message));
    }
    if codes.iter().any(|c| c == "regex") {
        errors.push(FieldError::new(
            FIELD_NAME,
            "Name can only contain letters and spaces",
        ));
    }
}

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

pub fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    let report = EmailRules {
        email: email.to_string(),
    }
    .validate();
    let codes = codes(&report, FIELD_EMAIL);
    let length_failed = codes.iter().any(|c| c == "length");

    if length_failed && email.is_empty() {
        errors.push(FieldError::new(FIELD_EMAIL, "Email is required"));
    }
    if codes.iter().any(|c| c == EMAIL_SYNTAX) {
        errors.push(FieldError::new(
            FIELD_EMAIL,
            "Please enter a valid email address",
        ));
    }
    if length_failed && !email.is_empty() {
        errors.push(FieldError::new(
            FIELD_EMAIL,
            "Email must be less than 100 characters",
        ));
    }
}

pub fn check_upload(upload: &ImageUpload, errors: &mut Vec<FieldError>) {
    let report = UploadRules {
        size: upload.size,
        content_type: upload.content_type.clone().unwrap_or_default(),
    }
    .validate();

    if !codes(&report, "size").is_empty() {
        errors.push(FieldError::new(
            FIELD_IMAGE,
            "File size must be less than 5MB",
        ));
    }
    if !codes(&report, "content_type").is_empty() {
        errors.push(FieldError::new(
            FIELD_IMAGE,
            "Only .jpg, .jpeg, .png, .gif and .webp formats are supported",
        ));
    }
}

pub fn check_image(image: &ImageCandidate, errors: &mut Vec<FieldError>) {
    if let ImageCandidate::Upload(upload) = image {
        check_upload(upload, errors);
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), ValidationErrors> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors(errors))
    }
}

/// Runs the whole schema against `candidate`.
pub fn validate_profile(candidate: ProfileCandidate) -> Result<ValidProfile, ValidationErrors> {
    let mut errors = Vec::new();
    check_name(&candidate.name, &mut errors);
    check_email(&candidate.email, &mut errors);
    check_image(&candidate.profile_image, &mut errors);
    finish(errors)?;

    Ok(ValidProfile {
        name: candidate.name,
        email: candidate.email,
        profile_image: candidate.profile_image,
    })
}

pub fn validate_upload(upload: &ImageUpload) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    check_upload(upload, &mut errors);
    finish(errors)
}

/// Name/email rules for whichever of the two fields are present.
pub fn validate_partial(name: Option<&str>, email: Option<&str>) -> Result<(), ValidationErrors> {
    let mut errors = Vec::new();
    if let Some(name) = name {
        check_name(name, &mut errors);
    }
    if let Some(email) = email {
        check_email(email, &mut errors);
    }
    finish(errors)
}
