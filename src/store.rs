//! In-memory home of the one and only profile record.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::model::profile::{ImageField, PatchProfileRequest, Profile};

pub const SEED_IMAGE_URL: &str = "https://bonzai.iodigital.com/images/677fa8df0ca13e1b58cf4fa1/3f1ed94f-f25e-40af-816d-a4f1d002bb73-image_edit_oai_toolu_vrtx_01DoXseZ1k5EtUSXJSH7szgM_img_3Lgy22kc53A-XgVlDFLo6.png";

/// Reference substituted for every accepted upload; nothing is stored.
pub const PLACEHOLDER_UPLOAD_URL: &str = "https://bonzai.iodigital.com/images/677fa8df0ca13e1b58cf4fa1/7897fe5c-439f-4aa4-b9cb-e23194141346-image_edit_oai_toolu_vrtx_01NEhvsUbjyjHcP5SMydthqK_img_O1UX8392L40STniGkvHsp.png";

/// Accepted full update, after the presence check (and any schema run).
#[derive(Debug, Clone)]
pub struct FullUpdate {
    pub name: String,
    pub email: String,
    pub profile_image: ImageField,
}

pub fn seed_profile() -> Profile {
    Profile {
        id: "1".to_string(),
        name: "John Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        profile_image: Some(SEED_IMAGE_URL.to_string()),
        // 2024-01-15T10:30:00Z and 2024-01-20T14:45:00Z
        created_at: DateTime::<Utc>::from_timestamp(1_705_314_600, 0).unwrap_or_default(),
        updated_at: DateTime::<Utc>::from_timestamp(1_705_761_900, 0).unwrap_or_default(),
    }
}

// updatedAt must move forward even when two writes land in the same tick
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    Utc::now().max(previous + Duration::milliseconds(1))
}

fn is_truthy(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Cloneable handle to the singleton record.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    profile: Arc<RwLock<Profile>>,
    upload_url: Arc<str>,
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new(seed_profile(), PLACEHOLDER_UPLOAD_URL)
    }
}

impl ProfileStore {
    pub fn new(profile: Profile, upload_url: impl Into<Arc<str>>) -> Self {
        Self {
            profile: Arc::new(RwLock::new(profile)),
            upload_url: upload_url.into(),
        }
    }

    pub async fn get(&self) -> Profile {
        self.profile.read().await.clone()
    }

    /// Replaces the editable fields wholesale and returns the new record.
    pub async fn replace(&self, update: FullUpdate) -> Profile {
        let mut profile = self.profile.write().await;

        match update.profile_image {
            ImageField::NotSupplied => {}
            ImageField::Cleared => profile.profile_image = None,
            ImageField::Upload(upload) => {
                tracing::debug!(
                    file_name = ?upload.file_name,
                    size = upload.size,
                    "substituting placeholder for uploaded image"
                );
                profile.profile_image = Some(self.upload_url.to_string());
            }
        }
        profile.name = update.name;
        profile.email = update.email;
        profile.updated_at = next_timestamp(profile.updated_at);

        profile.clone()
    }

    /// Merges the truthy fields of `patch`; everything else keeps its value.
    pub async fn patch(&self, patch: PatchProfileRequest) -> Profile {
        let mut profile = self.profile.write().await;

        if is_truthy(&patch.name) {
            profile.name = patch.name.unwrap_or_default();
        }
        if is_truthy(&patch.email) {
            profile.email = patch.email.unwrap_or_default();
        }
        if is_truthy(&patch.profile_image) {
            profile.profile_image = patch.profile_image;
        }
        profile.updated_at = next_timestamp(profile.updated_at);

        profile.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::profile::ImageUpload;

    fn full(name: &str, email: &str, profile_image: ImageField) -> FullUpdate {
        FullUpdate {
            name: name.to_string(),
            email: email.to_string(),
            profile_image,
        }
    }

    #[tokio::test]
    async fn starts_from_seed() {
        let store = ProfileStore::default();
        let profile = store.get().await;
        assert_eq!(profile, seed_profile());
        assert_eq!(profile.profile_image.as_deref(), Some(SEED_IMAGE_URL));
        assert_eq!(profile.created_at.to_rfc3339(), "2024-01-15T10:30:00+00:00");
        assert_eq!(profile.updated_at.to_rfc3339(), "2024-01-20T14:45:00+00:00");
    }

    #[tokio::test]
    async fn replace_handles_each_image_case() {
        let store = ProfileStore::default();

        let kept = store
            .replace(full("Jane Roe", "jane@example.com", ImageField::NotSupplied))
            .await;
        assert_eq!(kept.name, "Jane Roe");
        assert_eq!(kept.email, "jane@example.com");
        assert_eq!(kept.profile_image.as_deref(), Some(SEED_IMAGE_URL));

        let uploaded = store
            .replace(full(
                "Jane Roe",
                "jane@example.com",
                ImageField::Upload(ImageUpload {
                    file_name: Some("me.png".to_string()),
                    content_type: Some("image/png".to_string()),
                    size: 42,
                }),
            ))
            .await;
        assert_eq!(uploaded.profile_image.as_deref(), Some(PLACEHOLDER_UPLOAD_URL));

        let cleared = store
            .replace(full("Jane Roe", "jane@example.com", ImageField::Cleared))
            .await;
        assert_eq!(cleared.profile_image, None);
        assert_eq!(store.get().await, cleared);
    }

    #[tokio::test]
    async fn patch_ignores_missing_and_falsy_fields() {
        let store = ProfileStore::default();
        let before = store.get().await;

        let after = store
            .patch(PatchProfileRequest {
                name: Some(String::new()),
                email: None,
                profile_image: Some(String::new()),
            })
            .await;
        assert_eq!(after.name, before.name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.profile_image, before.profile_image);
        assert!(after.updated_at > before.updated_at);

        let after = store
            .patch(PatchProfileRequest {
                profile_image: Some("https://cdn.example.com/a.png".to_string()),
                ..Default::default()
            })
            .await;
        assert_eq!(after.profile_image.as_deref(), Some("https://cdn.example.com/a.png"));
        assert_eq!(after.name, before.name);
    }

    #[tokio::test]
    async fn every_mutation_advances_updated_at() {
        let store = ProfileStore::default();
        let mut last = store.get().await.updated_at;
        for _ in 0..20 {
            let p = store.patch(PatchProfileRequest::default()).await;
            assert!(p.updated_at > last);
            last = p.updated_at;
            let p = store
                .replace(full("John Doe", "john.doe@example.com", ImageField::NotSupplied))
                .await;
            assert!(p.updated_at > last);
            last = p.updated_at;
        }
    }

    #[test]
    fn next_timestamp_never_repeats() {
        let future = Utc::now() + Duration::hours(1);
        assert_eq!(next_timestamp(future), future + Duration::milliseconds(1));
    }
}
