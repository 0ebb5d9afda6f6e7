//! HTTP client for the profile API.
//!
//! Mirrors what the browser form does: validate locally with the same
//! schema, then make a single request. There is no retry or backoff and
//! nothing stops two submissions from overlapping.

use reqwest::{
    multipart::{Form, Part},
    Response, StatusCode,
};
use serde::de::DeserializeOwned;

use crate::{
    model::profile::{
        ApiResponse, FieldError, ImageUpload, PatchProfileRequest, Profile,
        ValidateProfileRequest, ValidatedProfile,
    },
    validation::{self, ImageCandidate, ProfileCandidate, ValidationErrors},
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("server returned {status}: {message}")]
    Api {
        status: StatusCode,
        message: String,
        details: Vec<FieldError>,
    },

    #[error("response carried no data")]
    MissingData,
}

/// Image picked by the user for a full update.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What a full update does to the stored image.
#[derive(Debug, Clone, Default)]
pub enum ImageChange {
    /// No `profileImage` part; the server keeps its current reference.
    #[default]
    Keep,
    /// An empty `profileImage` part; the server clears the reference.
    Clear,
    Upload(ImageFile),
}

/// Input of [`ProfileClient::update_profile`].
#[derive(Debug, Clone)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub profile_image: ImageChange,
}

#[derive(Debug, Clone)]
pub struct ProfileClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProfileClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn profile_url(&self) -> String {
        format!("{}/api/profile", self.base_url)
    }

    pub async fn get_profile(&self) -> Result<Profile, ClientError> {
        let response = self.http.get(self.profile_url()).send().await?;
        read_envelope(response).await
    }

    /// Full update. Runs the schema locally before sending anything.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Profile, ClientError> {
        let profile_image = match &update.profile_image {
            ImageChange::Upload(image) => ImageCandidate::Upload(ImageUpload {
                file_name: Some(image.file_name.clone()),
                content_type: Some(image.content_type.clone()),
                size: image.bytes.len(),
            }),
            ImageChange::Keep | ImageChange::Clear => ImageCandidate::None,
        };
        validation::validate_profile(ProfileCandidate {
            name: update.name.clone(),
            email: update.email.clone(),
            profile_image,
        })?;

        let form = Form::new()
            .text("name", update.name)
            .text("email", update.email);
        let form = match update.profile_image {
            ImageChange::Keep => form,
            ImageChange::Clear => form.text("profileImage", ""),
            ImageChange::Upload(image) => {
                let part = Part::bytes(image.bytes)
                    .file_name(image.file_name)
                    .mime_str(&image.content_type)?;
                form.part("profileImage", part)
            }
        };

        let response = self
            .http
            .put(self.profile_url())
            .multipart(form)
            .send()
            .await?;
        read_envelope(response).await
    }

    pub async fn patch_profile(&self, patch: &PatchProfileRequest) -> Result<Profile, ClientError> {
        let response = self
            .http
            .patch(self.profile_url())
            .json(patch)
            .send()
            .await?;
        read_envelope(response).await
    }

    /// Asks the server to run the schema without changing anything.
    pub async fn validate(
        &self,
        request: &ValidateProfileRequest,
    ) -> Result<ValidatedProfile, ClientError> {
        let response = self
            .http
            .post(format!("{}/validate", self.profile_url()))
            .json(request)
            .send()
            .await?;
        read_envelope(response).await
    }
}

async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    match serde_json::from_slice::<ApiResponse<T>>(&bytes) {
        Ok(envelope) if status.is_success() && envelope.success => {
            envelope.data.ok_or(ClientError::MissingData)
        }
        Ok(envelope) => Err(ClientError::Api {
            status,
            message: envelope
                .error
                .unwrap_or_else(|| "API request failed".to_string()),
            details: envelope.details.unwrap_or_default(),
        }),
        // Non-envelope bodies come from the framework (e.g. extractor rejections)
        Err(_) => Err(ClientError::Api {
            status,
            message: String::from_utf8_lossy(&bytes).into_owned(),
            details: Vec::new(),
        }),
    }
}
