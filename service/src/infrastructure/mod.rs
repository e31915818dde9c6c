use crate::domain::AppState;
use crate::domain::submit::SubmitPipeline;
use crate::infrastructure::auth::IdentityClient;
use crate::infrastructure::media::MediaClient;
use crate::infrastructure::persistence::PostgresRecordStore;

pub mod auth;
pub mod http;
pub mod media;
pub mod persistence;
pub mod settings;

/// Production wiring of the application state: Postgres records, the hosted
/// media provider, and the remote identity service, with one submission
/// pipeline shared across requests.
#[derive(Clone)]
pub struct AppStateImpl {
    records: PostgresRecordStore,
    media: MediaClient,
    identity: IdentityClient,
    pipeline: SubmitPipeline<PostgresRecordStore, MediaClient>,
}

impl AppStateImpl {
    pub fn new(records: PostgresRecordStore, media: MediaClient, identity: IdentityClient) -> Self {
        let pipeline = SubmitPipeline::new(records.clone(), media.clone(), media.folder());
        Self {
            records,
            media,
            identity,
            pipeline,
        }
    }
}

impl AppState for AppStateImpl {
    type R = PostgresRecordStore;
    type M = MediaClient;
    type I = IdentityClient;

    fn records(&self) -> &Self::R {
        &self.records
    }

    fn media(&self) -> &Self::M {
        &self.media
    }

    fn identity(&self) -> &Self::I {
        &self.identity
    }

    fn submit_pipeline(&self) -> &SubmitPipeline<Self::R, Self::M> {
        &self.pipeline
    }
}
