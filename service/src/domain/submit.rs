//! Admin submission pipeline: draft authoring, pre-submit validation,
//! per-target media uploads, and the final persist.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tutotime_common::{
    Difficulty, STEP_PLACEHOLDER, TUTORIAL_PLACEHOLDER, TutorialId, TutorialStep, parse_tags,
};

use crate::domain::error::PlatformError;
use crate::domain::session::Principal;
use crate::domain::{MediaFile, MediaStore, RecordStore, UploadedMedia};

/// A step under construction; `media_url` stays empty until an upload
/// completes or the submit-time placeholder backfill runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftStep {
    pub title: String,
    pub description: String,
    pub media_url: Option<String>,
    pub order: u32,
}

/// An in-memory tutorial under construction. Nothing is persisted until an
/// explicit submit; every per-field edit refreshes `updated_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorialDraft {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub tags: Vec<String>,
    pub thumbnail_url: String,
    pub steps: Vec<DraftStep>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author_id: String,
}

impl TutorialDraft {
    /// The empty initial shape the admin form starts from and returns to
    /// after a successful submit.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            title: String::new(),
            description: String::new(),
            difficulty: Difficulty::Beginner,
            tags: Vec::new(),
            thumbnail_url: TUTORIAL_PLACEHOLDER.to_string(),
            steps: Vec::new(),
            published: false,
            created_at: now,
            updated_at: now,
            author_id: String::new(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
        self.touch();
    }

    /// Accepts the raw comma-separated tag input.
    pub fn set_tags_input(&mut self, input: &str) {
        self.tags = parse_tags(input);
        self.touch();
    }

    pub fn set_thumbnail(&mut self, url: impl Into<String>) {
        self.thumbnail_url = url.into();
        self.touch();
    }

    /// Appends an empty step at the end; its order is its position.
    pub fn add_step(&mut self) {
        let order = self.steps.len() as u32;
        self.steps.push(DraftStep {
            order,
            ..DraftStep::default()
        });
        self.touch();
    }

    /// Removes a step and recomputes the remaining orders so they stay
    /// contiguous and gap-free.
    pub fn remove_step(&mut self, index: usize) {
        if index >= self.steps.len() {
            return;
        }
        self.steps.remove(index);
        for (position, step) in self.steps.iter_mut().enumerate() {
            step.order = position as u32;
        }
        self.touch();
    }

    pub fn set_step_title(&mut self, index: usize, title: impl Into<String>) {
        if let Some(step) = self.steps.get_mut(index) {
            step.title = title.into();
            self.touch();
        }
    }

    pub fn set_step_description(&mut self, index: usize, description: impl Into<String>) {
        if let Some(step) = self.steps.get_mut(index) {
            step.description = description.into();
            self.touch();
        }
    }

    pub fn set_step_media(&mut self, index: usize, url: impl Into<String>) {
        if let Some(step) = self.steps.get_mut(index) {
            step.media_url = Some(url.into());
            self.touch();
        }
    }

    /// Pre-submit validation, in order, short-circuiting on the first
    /// failure. No partial write ever happens on a failed check.
    pub fn validate(&self) -> Result<(), PlatformError> {
        if self.title.trim().is_empty() {
            return Err(PlatformError::ValidationFailed("a title is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(PlatformError::ValidationFailed(
                "a description is required".into(),
            ));
        }
        if self.steps.is_empty() {
            return Err(PlatformError::ValidationFailed(
                "at least one step is required".into(),
            ));
        }
        if self
            .steps
            .iter()
            .any(|step| step.title.trim().is_empty() || step.description.trim().is_empty())
        {
            return Err(PlatformError::ValidationFailed(
                "every step needs a title and a description".into(),
            ));
        }
        Ok(())
    }

    /// Submit-time invariant repair: orders follow array position whatever
    /// they were before, and steps without media get the step placeholder
    /// so stored steps never miss the field.
    pub fn finalize(&mut self) {
        for (position, step) in self.steps.iter_mut().enumerate() {
            step.order = position as u32;
            if step.media_url.as_deref().is_none_or(str::is_empty) {
                step.media_url = Some(STEP_PLACEHOLDER.to_string());
            }
        }
    }

    /// The steps in their persisted shape. Only meaningful after
    /// [`TutorialDraft::finalize`].
    pub fn persisted_steps(&self) -> Vec<TutorialStep> {
        self.steps
            .iter()
            .map(|step| TutorialStep {
                title: step.title.clone(),
                description: step.description.clone(),
                media_url: step
                    .media_url
                    .clone()
                    .unwrap_or_else(|| STEP_PLACEHOLDER.to_string()),
                media_type: None,
                order: step.order,
                duration: None,
            })
            .collect()
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for TutorialDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Which input an upload belongs to: the global thumbnail or one step.
/// Each target tracks its own in-flight state so the UI can disable only
/// the relevant input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadTarget {
    Thumbnail,
    Step(usize),
}

/// Validates drafts, pushes media through the upload collaborator, and
/// persists the composed record.
#[derive(Clone)]
pub struct SubmitPipeline<R: RecordStore, M: MediaStore> {
    store: R,
    media: M,
    folder: String,
    in_flight: Arc<Mutex<HashSet<UploadTarget>>>,
}

impl<R: RecordStore, M: MediaStore> SubmitPipeline<R, M> {
    pub fn new(store: R, media: M, folder: impl Into<String>) -> Self {
        Self {
            store,
            media,
            folder: folder.into(),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn is_uploading(&self, target: UploadTarget) -> bool {
        self.lock_in_flight().contains(&target)
    }

    pub fn uploads_in_flight(&self) -> bool {
        !self.lock_in_flight().is_empty()
    }

    /// Upload a file for one target. Targets are independent, so concurrent
    /// uploads for the thumbnail and for step N may overlap; a second
    /// upload for the *same* target is refused while the first is in
    /// flight.
    pub async fn upload_for(
        &self,
        target: UploadTarget,
        file: MediaFile,
    ) -> Result<UploadedMedia, PlatformError> {
        let _slot = self.claim(target)?;
        self.media.upload(file, &self.folder).await
    }

    /// Marks `target` in flight for as long as the returned guard lives.
    /// The guard releases the target on drop, so an upload future that is
    /// cancelled mid-await frees its input the same way completion and
    /// failure do.
    fn claim(&self, target: UploadTarget) -> Result<UploadSlot, PlatformError> {
        if !self.lock_in_flight().insert(target) {
            return Err(PlatformError::ValidationFailed(
                "an upload is already in progress for this input".into(),
            ));
        }
        Ok(UploadSlot {
            targets: Arc::clone(&self.in_flight),
            target,
        })
    }

    /// Upload and write the resulting URL into the draft, refreshing
    /// `updated_at`. Returns the durable URL.
    pub async fn attach_media(
        &self,
        draft: &mut TutorialDraft,
        target: UploadTarget,
        file: MediaFile,
    ) -> Result<String, PlatformError> {
        let media = self.upload_for(target, file).await?;
        match target {
            UploadTarget::Thumbnail => draft.set_thumbnail(media.secure_url.clone()),
            UploadTarget::Step(index) => {
                if index >= draft.steps.len() {
                    return Err(PlatformError::Unexpected(format!(
                        "upload targeted step {index} of a {}-step draft",
                        draft.steps.len()
                    )));
                }
                draft.set_step_media(index, media.secure_url.clone());
            }
        }
        Ok(media.secure_url)
    }

    /// Validate and persist. On success the draft is reset to its empty
    /// initial shape and the assigned identifier is returned.
    pub async fn submit(
        &self,
        draft: &mut TutorialDraft,
        author: &Principal,
    ) -> Result<TutorialId, PlatformError> {
        if self.uploads_in_flight() {
            return Err(PlatformError::ValidationFailed(
                "media uploads are still in progress".into(),
            ));
        }
        draft.validate()?;

        draft.author_id = author.id.clone();
        draft.published = false;
        draft.finalize();
        draft.touch();

        let id = self.store.insert(draft).await?;
        tracing::info!(%id, "tutorial created");

        *draft = TutorialDraft::new();
        Ok(id)
    }

    fn lock_in_flight(&self) -> std::sync::MutexGuard<'_, HashSet<UploadTarget>> {
        self.in_flight.lock().expect("upload tracker poisoned")
    }
}

/// Ownership of one upload target's in-flight marker.
struct UploadSlot {
    targets: Arc<Mutex<HashSet<UploadTarget>>>,
    target: UploadTarget,
}

impl Drop for UploadSlot {
    fn drop(&mut self) {
        if let Ok(mut targets) = self.targets.lock() {
            targets.remove(&self.target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing::{FakeMedia, InMemoryStore};
    use std::sync::Arc;
    use tokio::sync::Notify;

    fn admin() -> Principal {
        Principal {
            id: "principal-7".into(),
            email: "admin@tuto.time".into(),
        }
    }

    fn pipeline() -> (
        SubmitPipeline<InMemoryStore, FakeMedia>,
        InMemoryStore,
        FakeMedia,
    ) {
        let store = InMemoryStore::new();
        let media = FakeMedia::new();
        (
            SubmitPipeline::new(store.clone(), media.clone(), "tutorials"),
            store,
            media,
        )
    }

    fn complete_draft() -> TutorialDraft {
        let mut draft = TutorialDraft::new();
        draft.set_title("Sourdough");
        draft.set_description("Bread from scratch");
        draft.add_step();
        draft.set_step_title(0, "Feed the starter");
        draft.set_step_description(0, "Flour and water");
        draft
    }

    #[tokio::test]
    async fn validation_failures_are_ordered_and_write_nothing() {
        let (pipeline, store, _) = pipeline();
        let author = admin();

        let mut draft = TutorialDraft::new();
        let err = pipeline.submit(&mut draft, &author).await.unwrap_err();
        assert_eq!(
            err,
            PlatformError::ValidationFailed("a title is required".into())
        );

        draft.set_title("Sourdough");
        let err = pipeline.submit(&mut draft, &author).await.unwrap_err();
        assert_eq!(
            err,
            PlatformError::ValidationFailed("a description is required".into())
        );

        draft.set_description("Bread from scratch");
        let err = pipeline.submit(&mut draft, &author).await.unwrap_err();
        assert_eq!(
            err,
            PlatformError::ValidationFailed("at least one step is required".into())
        );

        draft.add_step();
        draft.set_step_title(0, "Feed the starter");
        let err = pipeline.submit(&mut draft, &author).await.unwrap_err();
        assert_eq!(
            err,
            PlatformError::ValidationFailed("every step needs a title and a description".into())
        );

        assert_eq!(store.insert_count(), 0, "no partial write on any failure");
    }

    #[tokio::test]
    async fn submit_repairs_orders_and_backfills_media() {
        let (pipeline, store, _) = pipeline();

        let mut draft = complete_draft();
        draft.add_step();
        draft.set_step_title(1, "Shape");
        draft.set_step_description(1, "Fold the dough");
        draft.set_step_media(1, "https://cdn/shape.jpg");
        // Scramble the stored orders; submit must recompute from position.
        draft.steps[0].order = 5;
        draft.steps[1].order = 5;

        let id = pipeline.submit(&mut draft, &admin()).await.unwrap();

        let stored = store.find_by_id(id).await.unwrap();
        assert_eq!(stored.steps.len(), 2);
        for (position, step) in stored.steps.iter().enumerate() {
            assert_eq!(step.order, position as u32);
        }
        assert_eq!(stored.steps[0].media_url, STEP_PLACEHOLDER);
        assert_eq!(stored.steps[1].media_url, "https://cdn/shape.jpg");
        assert!(!stored.published, "new records start unpublished");
    }

    #[tokio::test]
    async fn author_comes_from_the_signed_in_principal() {
        let (pipeline, store, _) = pipeline();
        let mut draft = complete_draft();
        let id = pipeline.submit(&mut draft, &admin()).await.unwrap();
        assert_eq!(store.find_by_id(id).await.unwrap().author_id, "principal-7");
    }

    #[tokio::test]
    async fn successful_submit_resets_the_draft() {
        let (pipeline, _, _) = pipeline();
        let mut draft = complete_draft();
        pipeline.submit(&mut draft, &admin()).await.unwrap();
        assert_eq!(draft.title, "");
        assert!(draft.steps.is_empty());
        assert_eq!(draft.thumbnail_url, TUTORIAL_PLACEHOLDER);
    }

    #[tokio::test]
    async fn concurrent_uploads_to_different_targets_are_independent() {
        let (pipeline, _, media) = pipeline();

        let file = |name: &str| MediaFile {
            name: name.into(),
            content_type: "image/jpeg".into(),
            bytes: vec![1, 2, 3],
        };

        let (thumb, step) = tokio::join!(
            pipeline.upload_for(UploadTarget::Thumbnail, file("thumb.jpg")),
            pipeline.upload_for(UploadTarget::Step(0), file("step.jpg")),
        );
        thumb.unwrap();
        step.unwrap();
        assert_eq!(media.upload_count(), 2);
        assert!(!pipeline.uploads_in_flight());
    }

    #[tokio::test]
    async fn same_target_refuses_overlapping_uploads() {
        let (pipeline, _, media) = pipeline();
        let gate = Arc::new(Notify::new());
        media.hold_next(gate.clone());

        let file = MediaFile {
            name: "a.jpg".into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0],
        };

        let slow = {
            let pipeline = pipeline.clone();
            let file = file.clone();
            tokio::spawn(async move { pipeline.upload_for(UploadTarget::Thumbnail, file).await })
        };
        tokio::task::yield_now().await;
        assert!(pipeline.is_uploading(UploadTarget::Thumbnail));

        let err = pipeline
            .upload_for(UploadTarget::Thumbnail, file)
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::ValidationFailed(_)));

        gate.notify_one();
        slow.await.unwrap().unwrap();
        assert!(!pipeline.is_uploading(UploadTarget::Thumbnail));
    }

    #[tokio::test]
    async fn cancelled_upload_releases_its_target() {
        let (pipeline, _, media) = pipeline();
        let gate = Arc::new(Notify::new());
        media.hold_next(gate.clone());

        let file = |name: &str| MediaFile {
            name: name.into(),
            content_type: "image/jpeg".into(),
            bytes: vec![0],
        };

        let task = {
            let pipeline = pipeline.clone();
            let file = file("gone.jpg");
            tokio::spawn(async move { pipeline.upload_for(UploadTarget::Thumbnail, file).await })
        };
        tokio::task::yield_now().await;
        assert!(pipeline.is_uploading(UploadTarget::Thumbnail));

        // The caller disconnects; the upload future is dropped mid-await.
        task.abort();
        assert!(task.await.is_err());

        assert!(
            !pipeline.is_uploading(UploadTarget::Thumbnail),
            "a dropped upload must release its target"
        );

        // The target is usable again, and nothing blocks a submit.
        pipeline
            .upload_for(UploadTarget::Thumbnail, file("retry.jpg"))
            .await
            .unwrap();
        let mut draft = complete_draft();
        pipeline.submit(&mut draft, &admin()).await.unwrap();
    }

    #[tokio::test]
    async fn submit_waits_for_in_flight_uploads() {
        let (pipeline, store, media) = pipeline();
        let gate = Arc::new(Notify::new());
        media.hold_next(gate.clone());

        let slow = {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                pipeline
                    .upload_for(
                        UploadTarget::Thumbnail,
                        MediaFile {
                            name: "t.jpg".into(),
                            content_type: "image/jpeg".into(),
                            bytes: vec![0],
                        },
                    )
                    .await
            })
        };
        tokio::task::yield_now().await;

        let mut draft = complete_draft();
        let err = pipeline.submit(&mut draft, &admin()).await.unwrap_err();
        assert_eq!(
            err,
            PlatformError::ValidationFailed("media uploads are still in progress".into())
        );
        assert_eq!(store.insert_count(), 0);

        gate.notify_one();
        slow.await.unwrap().unwrap();
        pipeline.submit(&mut draft, &admin()).await.unwrap();
    }

    #[tokio::test]
    async fn failed_upload_clears_the_in_flight_flag() {
        let (pipeline, _, media) = pipeline();
        media.fail_next(PlatformError::UploadFailed("provider said no".into()));

        let mut draft = complete_draft();
        let err = pipeline
            .attach_media(
                &mut draft,
                UploadTarget::Thumbnail,
                MediaFile {
                    name: "t.jpg".into(),
                    content_type: "image/jpeg".into(),
                    bytes: vec![0],
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err, PlatformError::UploadFailed("provider said no".into()));
        assert!(!pipeline.is_uploading(UploadTarget::Thumbnail));
        assert_eq!(draft.thumbnail_url, TUTORIAL_PLACEHOLDER, "draft untouched");
    }

    #[tokio::test]
    async fn attach_media_writes_the_url_into_the_draft() {
        let (pipeline, _, _) = pipeline();
        let mut draft = complete_draft();
        let before = draft.updated_at;

        let url = pipeline
            .attach_media(
                &mut draft,
                UploadTarget::Step(0),
                MediaFile {
                    name: "s.jpg".into(),
                    content_type: "image/jpeg".into(),
                    bytes: vec![9],
                },
            )
            .await
            .unwrap();
        assert_eq!(draft.steps[0].media_url.as_deref(), Some(url.as_str()));
        assert!(draft.updated_at >= before);
    }

    #[test]
    fn removing_a_step_keeps_orders_contiguous() {
        let mut draft = TutorialDraft::new();
        draft.add_step();
        draft.add_step();
        draft.add_step();
        draft.remove_step(1);

        assert_eq!(draft.steps.len(), 2);
        assert_eq!(draft.steps[0].order, 0);
        assert_eq!(draft.steps[1].order, 1);
    }

    #[test]
    fn every_field_edit_refreshes_updated_at() {
        let mut draft = TutorialDraft::new();
        let start = draft.updated_at;
        draft.set_tags_input(" rust , bread ");
        assert_eq!(draft.tags, vec!["rust", "bread"]);
        assert!(draft.updated_at >= start);
    }
}
