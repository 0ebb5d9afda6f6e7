use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Extension, Json, Multipart,
    },
    response::Json as RespJson,
    routing::{get, post},
    Router,
};
use tracing::{debug, info};

use crate::{
    config::Settings,
    errors::{ApiError, ApiResult},
    model::profile::{
        ApiResponse, FullUpdateForm, ImageField, ImageUpload, PatchProfileRequest, Profile,
        ValidateProfileRequest, ValidatedProfile,
    },
    store::{FullUpdate, ProfileStore},
    validation::{self, ImageCandidate, ProfileCandidate},
};

pub const UPDATE_FAILED: &str = "Failed to update profile";
pub const UPDATED_MESSAGE: &str = "Profile updated successfully";

// Nested under /api/profile
pub fn profile_router() -> Router {
    Router::new()
        .route(
            "/",
            get(get_profile).put(update_profile).patch(patch_profile), // GET | PUT | PATCH /api/profile
        )
        .route("/validate", post(validate_profile)) // POST /api/profile/validate
}

async fn simulate_latency(settings: &Settings) {
    if !settings.simulated_latency.is_zero() {
        tokio::time::sleep(settings.simulated_latency).await;
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

async fn read_full_update_form(mut multipart: Multipart) -> Result<FullUpdateForm, MultipartError> {
    let mut form = FullUpdateForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "name" => form.name = Some(field.text().await?),
            "email" => form.email = Some(field.text().await?),
            "profileImage" => {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field.bytes().await?;
                form.profile_image = if bytes.is_empty() {
                    ImageField::Cleared
                } else if file_name.is_none() && content_type.is_none() {
                    // A plain string is the reference the form already shows
                    debug!("profileImage sent as text, keeping stored reference");
                    ImageField::NotSupplied
                } else {
                    ImageField::Upload(ImageUpload {
                        file_name,
                        content_type,
                        size: bytes.len(),
                    })
                };
            }
            other => debug!(field = other, "ignoring unknown form field"),
        }
    }

    Ok(form)
}

/// Presence check, then the image rules (or the whole schema in strict mode).
pub fn accept_full_update(form: FullUpdateForm, strict: bool) -> ApiResult<FullUpdate> {
    let (Some(name), Some(email)) = (non_empty(form.name), non_empty(form.email)) else {
        return Err(ApiError::MissingFields);
    };

    if strict {
        let profile_image = match &form.profile_image {
            ImageField::Upload(upload) => ImageCandidate::Upload(upload.clone()),
            ImageField::NotSupplied | ImageField::Cleared => ImageCandidate::None,
        };
        validation::validate_profile(ProfileCandidate {
            name: name.clone(),
            email: email.clone(),
            profile_image,
        })?;
    } else if let ImageField::Upload(upload) = &form.profile_image {
        validation::validate_upload(upload)?;
    }

    Ok(FullUpdate {
        name,
        email,
        profile_image: form.profile_image,
    })
}

// GET /api/profile
async fn get_profile(
    Extension(store): Extension<ProfileStore>,
    Extension(settings): Extension<Arc<Settings>>,
) -> RespJson<ApiResponse<Profile>> {
    simulate_latency(&settings).await;

    let profile = store.get().await;
    debug!(id = %profile.id, "profile fetched");
    RespJson(ApiResponse::ok(profile))
}

// PUT /api/profile (multipart)
async fn update_profile(
    Extension(store): Extension<ProfileStore>,
    Extension(settings): Extension<Arc<Settings>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<RespJson<ApiResponse<Profile>>> {
    let multipart = multipart.map_err(|e| ApiError::internal(UPDATE_FAILED, e))?;
    let form = read_full_update_form(multipart)
        .await
        .map_err(|e| ApiError::internal(UPDATE_FAILED, e))?;

    simulate_latency(&settings).await;

    let update = accept_full_update(form, settings.strict_validation).inspect_err(|e| {
        info!(error = %e, "full profile update rejected");
    })?;
    let profile = store.replace(update).await;

    info!(updated_at = %profile.updated_at, "profile replaced");
    Ok(RespJson(ApiResponse::ok(profile).with_message(UPDATED_MESSAGE)))
}

// PATCH /api/profile (JSON)
async fn patch_profile(
    Extension(store): Extension<ProfileStore>,
    Extension(settings): Extension<Arc<Settings>>,
    body: Result<Json<PatchProfileRequest>, JsonRejection>,
) -> ApiResult<RespJson<ApiResponse<Profile>>> {
    let Json(patch) = body.map_err(|e| ApiError::internal(UPDATE_FAILED, e))?;

    simulate_latency(&settings).await;

    if settings.strict_validation {
        let name = patch.name.as_deref().filter(|v| !v.is_empty());
        let email = patch.email.as_deref().filter(|v| !v.is_empty());
        validation::validate_partial(name, email)?;
    }
    let profile = store.patch(patch).await;

    info!(updated_at = %profile.updated_at, "profile patched");
    Ok(RespJson(ApiResponse::ok(profile).with_message(UPDATED_MESSAGE)))
}

// POST /api/profile/validate
async fn validate_profile(
    Json(request): Json<ValidateProfileRequest>,
) -> ApiResult<RespJson<ApiResponse<ValidatedProfile>>> {
    let profile_image = match request.profile_image {
        Some(reference) => ImageCandidate::Reference(reference),
        None => ImageCandidate::None,
    };
    let valid = validation::validate_profile(ProfileCandidate {
        name: request.name,
        email: request.email,
        profile_image,
    })?;

    let profile_image = match valid.profile_image {
        ImageCandidate::Reference(reference) => Some(reference),
        ImageCandidate::None | ImageCandidate::Upload(_) => None,
    };
    Ok(RespJson(ApiResponse::ok(ValidatedProfile {
        name: valid.name,
        email: valid.email,
        profile_image,
    })))
}
