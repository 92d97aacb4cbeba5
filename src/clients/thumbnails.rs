//! Thumbnails façade.
//!
//! All thumbnail kinds share one engine. Requests are identified by
//! `"{type}_{id}_{size}"`, which is both the dedup key and the cache key.
//! Thumbnails the service is still rendering come back as pending and are
//! retried after the cooldown.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_engine, ClientResult, ClientSettings, ResourceRejection};
use crate::cache::TtlCache;
use crate::scheduler::{
    BatchEngine, BatchLoader, EngineStats, ErrorObserver, LoadOutcome, LoaderError, OutcomeOf,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ThumbnailKind {
    Asset,
    BundleThumbnail,
    AvatarHeadShot,
}

impl ThumbnailKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "Asset",
            Self::BundleThumbnail => "BundleThumbnail",
            Self::AvatarHeadShot => "AvatarHeadShot",
        }
    }
}

impl fmt::Display for ThumbnailKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a thumbnail batch request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailRequest {
    pub target_id: u64,
    /// Size token such as `"150x150"`.
    pub size: String,
    #[serde(rename = "type")]
    pub kind: ThumbnailKind,
}

impl ThumbnailRequest {
    pub fn new(kind: ThumbnailKind, target_id: u64, size: impl Into<String>) -> Self {
        Self { target_id, size: size.into(), kind }
    }

    /// `"{type}_{id}_{size}"`, echoed back by the service.
    pub fn request_id(&self) -> String {
        format!("{}_{}_{}", self.kind, self.target_id, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThumbnailState {
    Completed,
    Pending,
    Blocked,
    Error,
    InReview,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailRecord {
    pub request_id: String,
    pub state: ThumbnailState,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Thumbnail {
    pub state: ThumbnailState,
    pub image_url: Option<String>,
}

#[async_trait]
pub trait ThumbnailsApi: Send + Sync + 'static {
    async fn batch(&self, requests: &[ThumbnailRequest]) -> Result<Vec<ThumbnailRecord>, LoaderError>;
}

pub(crate) struct ThumbnailsLoader {
    api: Arc<dyn ThumbnailsApi>,
}

#[async_trait]
impl BatchLoader for ThumbnailsLoader {
    type Key = ThumbnailRequest;
    type DedupKey = String;
    type Value = Thumbnail;
    type Rejection = ResourceRejection;

    fn dedup_key(&self, key: &ThumbnailRequest) -> String {
        key.request_id()
    }

    async fn load(&self, keys: Vec<ThumbnailRequest>) -> Result<Vec<OutcomeOf<Self>>, LoaderError> {
        let mut outcomes = Vec::with_capacity(keys.len());
        let mut valid = Vec::with_capacity(keys.len());
        for request in keys {
            if request.target_id == 0 {
                let rejection = ResourceRejection::InvalidId(request.target_id);
                outcomes.push(LoadOutcome::rejected(request, rejection));
            } else if request.size.trim().is_empty() {
                let rejection = ResourceRejection::InvalidSize(request.size.clone());
                outcomes.push(LoadOutcome::rejected(request, rejection));
            } else {
                valid.push(request);
            }
        }

        if valid.is_empty() {
            return Ok(outcomes);
        }

        let mut found: HashMap<String, ThumbnailRecord> = self
            .api
            .batch(&valid)
            .await?
            .into_iter()
            .map(|record| (record.request_id.clone(), record))
            .collect();

        for request in valid {
            // Missing entries are left out and retried.
            let Some(record) = found.remove(&request.request_id()) else { continue };
            let outcome = match record.state {
                ThumbnailState::Pending => LoadOutcome::pending(request),
                state => LoadOutcome::resolved(request, Thumbnail { state, image_url: record.image_url }),
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Batched thumbnail URLs for assets, bundles and user headshots.
pub struct ThumbnailsClient {
    engine: BatchEngine<ThumbnailsLoader>,
    cache: TtlCache<String, Thumbnail>,
    settings: ClientSettings,
}

impl ThumbnailsClient {
    pub fn new(
        api: Arc<dyn ThumbnailsApi>,
        observer: Arc<dyn ErrorObserver>,
        settings: ClientSettings,
    ) -> ClientResult<Self> {
        let engine = build_engine("thumbnails", ThumbnailsLoader { api }, settings.batch_config(), &observer)?;
        Ok(Self {
            engine,
            cache: TtlCache::new("thumbnails", settings.cache_ttl),
            settings,
        })
    }

    pub async fn asset_thumbnail(&self, asset_id: u64, size: &str) -> ClientResult<Thumbnail> {
        self.thumbnail(ThumbnailRequest::new(ThumbnailKind::Asset, asset_id, size)).await
    }

    pub async fn bundle_thumbnail(&self, bundle_id: u64, size: &str) -> ClientResult<Thumbnail> {
        self.thumbnail(ThumbnailRequest::new(ThumbnailKind::BundleThumbnail, bundle_id, size)).await
    }

    pub async fn user_headshot_thumbnail(&self, user_id: u64, size: &str) -> ClientResult<Thumbnail> {
        self.thumbnail(ThumbnailRequest::new(ThumbnailKind::AvatarHeadShot, user_id, size)).await
    }

    async fn thumbnail(&self, request: ThumbnailRequest) -> ClientResult<Thumbnail> {
        let cache_key = request.request_id();
        if let Some(thumbnail) = self.cache.get(&cache_key) {
            return Ok(thumbnail);
        }

        let thumbnail = self.engine.submit(request).await?;
        self.cache.insert(cache_key, thumbnail.clone());
        Ok(thumbnail)
    }

    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}
