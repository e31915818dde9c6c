//! Session guard over the identity collaborator's auth-state stream.

use serde::Serialize;
use tokio::sync::watch;

/// An authenticated identity as reported by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
}

/// What the auth-state stream currently reports. `Unknown` is the window
/// before the first event arrives: neither granting nor denying access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Unknown,
    SignedOut,
    SignedIn(Principal),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Grant(Principal),
    RedirectToLogin,
}

/// Gates a protected view. Holds its own subscription to the stream; the
/// subscription ends when the guard is dropped.
pub struct SessionGuard {
    stream: watch::Receiver<SessionState>,
}

impl SessionGuard {
    pub fn new(stream: watch::Receiver<SessionState>) -> Self {
        Self { stream }
    }

    /// Waits out the loading window, then decides. A stream that closes
    /// while still unresolved denies access, the same as a signed-out
    /// principal.
    pub async fn resolve(&mut self) -> GuardDecision {
        let state = self
            .stream
            .wait_for(|state| !matches!(state, SessionState::Unknown))
            .await;

        match state.as_deref() {
            Ok(SessionState::SignedIn(principal)) => GuardDecision::Grant(principal.clone()),
            _ => GuardDecision::RedirectToLogin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn signed_in_principal_is_granted() {
        let (tx, rx) = watch::channel(SessionState::SignedIn(Principal {
            id: "p-1".into(),
            email: "admin@tuto.time".into(),
        }));
        let mut guard = SessionGuard::new(rx);
        match guard.resolve().await {
            GuardDecision::Grant(principal) => assert_eq!(principal.id, "p-1"),
            other => panic!("expected grant, got {other:?}"),
        }
        drop(tx);
    }

    #[tokio::test]
    async fn signed_out_redirects_to_login() {
        let (_tx, rx) = watch::channel(SessionState::SignedOut);
        let mut guard = SessionGuard::new(rx);
        assert_eq!(guard.resolve().await, GuardDecision::RedirectToLogin);
    }

    #[tokio::test]
    async fn unknown_state_waits_for_the_first_event() {
        let (tx, rx) = watch::channel(SessionState::Unknown);
        let mut guard = SessionGuard::new(rx);

        let decision = tokio::spawn(async move { guard.resolve().await });
        tokio::task::yield_now().await;

        tx.send(SessionState::SignedIn(Principal {
            id: "p-2".into(),
            email: "late@tuto.time".into(),
        }))
        .unwrap();

        match decision.await.unwrap() {
            GuardDecision::Grant(principal) => assert_eq!(principal.id, "p-2"),
            other => panic!("expected grant after the event arrived, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn closed_stream_denies_access() {
        let (tx, rx) = watch::channel(SessionState::Unknown);
        let mut guard = SessionGuard::new(rx);
        drop(tx);
        assert_eq!(guard.resolve().await, GuardDecision::RedirectToLogin);
    }
}
