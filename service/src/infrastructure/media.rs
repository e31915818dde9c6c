//! Media collaborator adapter: multipart uploads to the hosted image/video
//! API, with one configurable authentication strategy.

use chrono::Utc;
use reqwest::multipart;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::domain::error::PlatformError;
use crate::domain::{MediaFile, MediaStore, UploadedMedia};
use crate::infrastructure::settings::MediaSettings;

const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com/v1_1";
const DEFAULT_FOLDER: &str = "tutorials";

/// How upload requests authenticate, selected by deployment configuration.
#[derive(Clone)]
pub enum UploadAuth {
    /// Time-boxed signed request: timestamp plus a sha256 signature derived
    /// from the shared secret.
    Signed { api_key: String, api_secret: String },
    /// Pre-shared unsigned upload preset.
    Preset { preset: String },
}

// The shared secret must never reach logs or panic messages.
impl std::fmt::Debug for UploadAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Signed { api_key, .. } => f
                .debug_struct("Signed")
                .field("api_key", api_key)
                .field("api_secret", &"<redacted>")
                .finish(),
            Self::Preset { preset } => {
                f.debug_struct("Preset").field("preset", preset).finish()
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaClient {
    http: reqwest::Client,
    endpoint: String,
    auth: UploadAuth,
    folder: String,
}

impl MediaClient {
    /// Builds the client from deployment configuration, failing fast with
    /// `ConfigMissing` before any network I/O when a required credential is
    /// absent.
    pub fn from_settings(settings: &MediaSettings) -> Result<Self, PlatformError> {
        let cloud_name = require(settings.cloud_name.as_deref(), "media.cloud_name")?;
        let base_url = settings.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);

        let auth = match settings.auth_mode.as_deref().unwrap_or("preset") {
            "signed" => UploadAuth::Signed {
                api_key: require(settings.api_key.as_deref(), "media.api_key")?.to_string(),
                api_secret: require(settings.api_secret.as_deref(), "media.api_secret")?
                    .to_string(),
            },
            "preset" => UploadAuth::Preset {
                preset: require(settings.upload_preset.as_deref(), "media.upload_preset")?
                    .to_string(),
            },
            other => {
                return Err(PlatformError::ConfigMissing(format!(
                    "media.auth_mode must be \"signed\" or \"preset\", got \"{other}\""
                )));
            }
        };

        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: format!("{base_url}/{cloud_name}/image/upload"),
            auth,
            folder: settings
                .folder
                .clone()
                .unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
        })
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }
}

/// sha256 over `timestamp={ts}` immediately followed by the shared secret,
/// hex-encoded; the scheme the provider verifies signed uploads against.
fn request_signature(api_secret: &str, timestamp: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("timestamp={timestamp}").as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn require<'a>(value: Option<&'a str>, key: &str) -> Result<&'a str, PlatformError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PlatformError::ConfigMissing(key.to_string()))
}

#[derive(Deserialize)]
struct ProviderUpload {
    public_id: String,
    secure_url: String,
}

#[derive(Deserialize)]
struct ProviderFailure {
    error: Option<ProviderFailureDetail>,
}

#[derive(Deserialize)]
struct ProviderFailureDetail {
    message: String,
}

impl MediaStore for MediaClient {
    async fn upload(&self, file: MediaFile, folder: &str) -> Result<UploadedMedia, PlatformError> {
        let part = multipart::Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.content_type)
            .map_err(|e| PlatformError::Unexpected(format!("invalid media content type: {e}")))?;

        let mut form = multipart::Form::new()
            .part("file", part)
            .text("folder", folder.to_string());

        match &self.auth {
            UploadAuth::Signed {
                api_key,
                api_secret,
            } => {
                let timestamp = Utc::now().timestamp();
                form = form
                    .text("timestamp", timestamp.to_string())
                    .text("api_key", api_key.clone())
                    .text("signature", request_signature(api_secret, timestamp));
            }
            UploadAuth::Preset { preset } => {
                form = form.text("upload_preset", preset.clone());
            }
        }

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PlatformError::UploadFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // Prefer the provider's own message when it sends one.
            let detail = response
                .json::<ProviderFailure>()
                .await
                .ok()
                .and_then(|failure| failure.error.map(|e| e.message))
                .unwrap_or_else(|| format!("provider answered {status}"));
            return Err(PlatformError::UploadFailed(detail));
        }

        let uploaded: ProviderUpload = response
            .json()
            .await
            .map_err(|e| PlatformError::UploadFailed(format!("malformed provider response: {e}")))?;

        Ok(UploadedMedia {
            public_id: uploaded.public_id,
            secure_url: uploaded.secure_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MediaSettings {
        MediaSettings {
            base_url: None,
            cloud_name: Some("demo".into()),
            auth_mode: None,
            api_key: None,
            api_secret: None,
            upload_preset: Some("unsigned-tutorials".into()),
            folder: None,
        }
    }

    #[test]
    fn signature_is_sha256_over_timestamp_and_secret() {
        assert_eq!(
            request_signature("sekret", 1_700_000_000),
            "6731482728e3e4eb4a4a94b180f3691040d8808973551ac1a3375d7e3c8291cc"
        );
    }

    #[test]
    fn missing_cloud_name_fails_fast() {
        let mut settings = settings();
        settings.cloud_name = None;
        assert_eq!(
            MediaClient::from_settings(&settings).unwrap_err(),
            PlatformError::ConfigMissing("media.cloud_name".into())
        );
    }

    #[test]
    fn signed_mode_requires_both_credentials() {
        let mut settings = settings();
        settings.auth_mode = Some("signed".into());
        settings.api_key = Some("key".into());
        assert_eq!(
            MediaClient::from_settings(&settings).unwrap_err(),
            PlatformError::ConfigMissing("media.api_secret".into())
        );

        settings.api_secret = Some("secret".into());
        let client = MediaClient::from_settings(&settings).unwrap();
        assert!(matches!(client.auth, UploadAuth::Signed { .. }));
    }

    #[test]
    fn preset_mode_is_the_default_and_requires_the_preset() {
        let client = MediaClient::from_settings(&settings()).unwrap();
        assert!(matches!(client.auth, UploadAuth::Preset { .. }));
        assert_eq!(client.endpoint, "https://api.cloudinary.com/v1_1/demo/image/upload");
        assert_eq!(client.folder(), "tutorials");

        let mut missing = settings();
        missing.upload_preset = None;
        assert_eq!(
            MediaClient::from_settings(&missing).unwrap_err(),
            PlatformError::ConfigMissing("media.upload_preset".into())
        );
    }

    #[test]
    fn debug_output_redacts_the_shared_secret() {
        let mut settings = settings();
        settings.auth_mode = Some("signed".into());
        settings.api_key = Some("key-123".into());
        settings.api_secret = Some("super-secret".into());

        let rendered = format!("{:?}", MediaClient::from_settings(&settings).unwrap());
        assert!(rendered.contains("key-123"));
        assert!(rendered.contains("<redacted>"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn unknown_auth_mode_is_a_config_error() {
        let mut settings = settings();
        settings.auth_mode = Some("oauth".into());
        assert!(matches!(
            MediaClient::from_settings(&settings).unwrap_err(),
            PlatformError::ConfigMissing(_)
        ));
    }
}
