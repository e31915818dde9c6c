//! Identity collaborator adapter. Sign-in/sign-out go to the managed
//! provider's HTTP endpoints; the resulting session state is broadcast on a
//! watch channel that session guards subscribe to.

use std::sync::Arc;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::domain::Identity;
use crate::domain::error::PlatformError;
use crate::domain::session::{Principal, SessionState};
use crate::infrastructure::settings::IdentitySettings;

#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<watch::Sender<SessionState>>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct PrincipalResponse {
    id: String,
    email: String,
}

impl IdentityClient {
    /// The stream starts in `Unknown` until [`Self::resolve_initial_session`]
    /// has heard from the provider; guards neither grant nor deny while it
    /// lasts.
    pub fn new(settings: &IdentitySettings) -> Self {
        let (tx, _rx) = watch::channel(SessionState::Unknown);
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            session: Arc::new(tx),
        }
    }

    /// Startup probe for an existing provider session. An unreachable
    /// provider resolves to signed-out rather than leaving guards waiting
    /// forever.
    pub async fn resolve_initial_session(&self) {
        let state = match self
            .http
            .get(format!("{}/session", self.base_url))
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response
                .json::<PrincipalResponse>()
                .await
                .map(|principal| {
                    SessionState::SignedIn(Principal {
                        id: principal.id,
                        email: principal.email,
                    })
                })
                .unwrap_or(SessionState::SignedOut),
            Ok(_) => SessionState::SignedOut,
            Err(e) => {
                tracing::warn!("identity provider unreachable during startup probe: {e}");
                SessionState::SignedOut
            }
        };
        self.session.send_replace(state);
    }
}

impl Identity for IdentityClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Principal, PlatformError> {
        let response = self
            .http
            .post(format!("{}/sign-in", self.base_url))
            .json(&Credentials { email, password })
            .send()
            .await
            .map_err(|e| PlatformError::Unexpected(format!("identity provider error: {e}")))?;

        match response.status() {
            status if status.is_success() => {
                let principal = response
                    .json::<PrincipalResponse>()
                    .await
                    .map_err(|e| PlatformError::Unexpected(format!("malformed principal: {e}")))?;
                let principal = Principal {
                    id: principal.id,
                    email: principal.email,
                };
                self.session
                    .send_replace(SessionState::SignedIn(principal.clone()));
                Ok(principal)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(
                PlatformError::ValidationFailed("invalid email or password".into()),
            ),
            status => Err(PlatformError::Unexpected(format!(
                "identity provider answered {status}"
            ))),
        }
    }

    async fn sign_out(&self) -> Result<(), PlatformError> {
        let result = self
            .http
            .post(format!("{}/sign-out", self.base_url))
            .send()
            .await;

        // The local session ends either way; a provider hiccup should not
        // leave the admin area unlocked.
        self.session.send_replace(SessionState::SignedOut);

        result
            .map(|_| ())
            .map_err(|e| PlatformError::Unexpected(format!("identity provider error: {e}")))
    }

    fn watch_session(&self) -> watch::Receiver<SessionState> {
        self.session.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_stream_starts_unresolved() {
        let client = IdentityClient::new(&IdentitySettings {
            base_url: "http://identity.local/".into(),
        });
        assert_eq!(*client.watch_session().borrow(), SessionState::Unknown);
        assert_eq!(client.base_url, "http://identity.local");
    }
}
