//! Groups façade.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_engine, split_invalid, ClientResult, ClientSettings, ResourceRejection};
use crate::cache::TtlCache;
use crate::scheduler::{
    BatchEngine, BatchLoader, EngineStats, ErrorObserver, LoadOutcome, LoaderError, OutcomeOf,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner: GroupOwner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOwner {
    pub id: u64,
    #[serde(rename = "type")]
    pub owner_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub id: u64,
    pub name: String,
    pub owner: GroupOwner,
}

impl From<GroupRecord> for Group {
    fn from(record: GroupRecord) -> Self {
        Self { id: record.id, name: record.name, owner: record.owner }
    }
}

#[async_trait]
pub trait GroupsApi: Send + Sync + 'static {
    async fn groups_by_id(&self, ids: &[u64]) -> Result<Vec<GroupRecord>, LoaderError>;
}

pub(crate) struct GroupsLoader {
    api: Arc<dyn GroupsApi>,
}

#[async_trait]
impl BatchLoader for GroupsLoader {
    type Key = u64;
    type DedupKey = u64;
    type Value = Option<Group>;
    type Rejection = ResourceRejection;

    fn dedup_key(&self, key: &u64) -> u64 {
        *key
    }

    async fn load(&self, keys: Vec<u64>) -> Result<Vec<OutcomeOf<Self>>, LoaderError> {
        let (valid, mut outcomes) = split_invalid(keys);

        if valid.is_empty() {
            return Ok(outcomes);
        }

        let mut found: HashMap<u64, GroupRecord> = self
            .api
            .groups_by_id(&valid)
            .await?
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        outcomes.extend(
            valid
                .into_iter()
                .map(|id| LoadOutcome::resolved(id, found.remove(&id).map(Group::from))),
        );
        Ok(outcomes)
    }
}

/// Batched group lookups. Only groups that exist are cached.
pub struct GroupsClient {
    engine: BatchEngine<GroupsLoader>,
    cache: TtlCache<u64, Group>,
    settings: ClientSettings,
}

impl GroupsClient {
    pub fn new(
        api: Arc<dyn GroupsApi>,
        observer: Arc<dyn ErrorObserver>,
        settings: ClientSettings,
    ) -> ClientResult<Self> {
        let engine = build_engine("groups", GroupsLoader { api }, settings.batch_config(), &observer)?;
        Ok(Self {
            engine,
            cache: TtlCache::new("groups", settings.cache_ttl),
            settings,
        })
    }

    pub async fn group_by_id(&self, group_id: u64) -> ClientResult<Option<Group>> {
        if let Some(group) = self.cache.get(&group_id) {
            return Ok(Some(group));
        }

        let group = self.engine.submit(group_id).await?;
        if let Some(group) = &group {
            self.cache.insert(group.id, group.clone());
        }
        Ok(group)
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
