use std::sync::Arc;

use async_trait::async_trait;
use outage_core::{AreaCode, TimeWindow};
use outage_db::{DbError, TranscriptRow};
use sqlx::PgPool;

/// Source of technical-support transcripts for one area and window.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn area_transcripts(
        &self,
        area_code: &AreaCode,
        window: &TimeWindow,
    ) -> Result<Vec<TranscriptRow>, DbError>;
}

#[async_trait]
impl TranscriptStore for PgPool {
    async fn area_transcripts(
        &self,
        area_code: &AreaCode,
        window: &TimeWindow,
    ) -> Result<Vec<TranscriptRow>, DbError> {
        outage_db::list_area_transcripts(self, area_code, window).await
    }
}

#[async_trait]
impl<T: TranscriptStore + ?Sized> TranscriptStore for Arc<T> {
    async fn area_transcripts(
        &self,
        area_code: &AreaCode,
        window: &TimeWindow,
    ) -> Result<Vec<TranscriptRow>, DbError> {
        (**self).area_transcripts(area_code, window).await
    }
}
