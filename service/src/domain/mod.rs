use tokio::sync::watch;
use tutotime_common::{TutorialId, TutorialRecord};

use crate::domain::catalog::CatalogQuery;
use crate::domain::error::PlatformError;
use crate::domain::session::{Principal, SessionState};
use crate::domain::submit::{SubmitPipeline, TutorialDraft};

pub mod catalog;
pub mod error;
pub mod session;
pub mod submit;

#[cfg(test)]
pub mod testing;

/// The record store collaborator: the hosted document database holding
/// tutorial documents. Adapters translate these calls into store queries and
/// run every result through the shared normalization.
pub trait RecordStore: Clone + Send + Sync + 'static {
    /// One ordered page of published tutorials matching `query`.
    fn find_page(
        &self,
        query: &CatalogQuery,
    ) -> impl Future<Output = Result<Vec<TutorialRecord>, PlatformError>> + Send;

    /// Single-document lookup; `PlatformError::NotFound` when the id does
    /// not resolve.
    fn find_by_id(
        &self,
        id: TutorialId,
    ) -> impl Future<Output = Result<TutorialRecord, PlatformError>> + Send;

    /// Persist a composed draft and return the assigned identifier.
    fn insert(
        &self,
        draft: &TutorialDraft,
    ) -> impl Future<Output = Result<TutorialId, PlatformError>> + Send;

    /// Administrative side-channel flipping a record's visibility.
    fn set_published(
        &self,
        id: TutorialId,
        published: bool,
    ) -> impl Future<Output = Result<(), PlatformError>> + Send;
}

/// A file handed to the media collaborator.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// What the media collaborator reports back for a stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub public_id: String,
    pub secure_url: String,
}

/// The media upload collaborator.
pub trait MediaStore: Clone + Send + Sync + 'static {
    fn upload(
        &self,
        file: MediaFile,
        folder: &str,
    ) -> impl Future<Output = Result<UploadedMedia, PlatformError>> + Send;
}

/// The identity collaborator: sign-in/sign-out plus the auth-state stream
/// the session guard observes.
pub trait Identity: Clone + Send + Sync + 'static {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Principal, PlatformError>> + Send;

    fn sign_out(&self) -> impl Future<Output = Result<(), PlatformError>> + Send;

    /// A fresh subscription to the auth-state stream. Dropping the receiver
    /// is the unsubscribe.
    fn watch_session(&self) -> watch::Receiver<SessionState>;
}

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type R: RecordStore;
    type M: MediaStore;
    type I: Identity;

    fn records(&self) -> &Self::R;
    fn media(&self) -> &Self::M;
    fn identity(&self) -> &Self::I;

    /// The shared submission pipeline; shared so per-target upload state
    /// survives across requests.
    fn submit_pipeline(&self) -> &SubmitPipeline<Self::R, Self::M>;
}
