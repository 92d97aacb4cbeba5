//! Users façade: id ↔ username lookups.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_engine, split_invalid, ClientResult, ClientSettings, ResourceRejection};
use crate::cache::TtlCache;
use crate::scheduler::{BatchEngine, BatchLoader, ErrorObserver, LoadOutcome, LoaderError, OutcomeOf};

/// User entry as returned by the id lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// User entry as returned by the username lookup endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameRecord {
    pub requested_username: String,
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self { id: record.id, name: record.name }
    }
}

/// Transport for the users service. Missing users are simply absent from
/// the returned list.
#[async_trait]
pub trait UsersApi: Send + Sync + 'static {
    async fn users_by_id(&self, ids: &[u64]) -> Result<Vec<UserRecord>, LoaderError>;

    /// `names` are already lowercased.
    async fn users_by_name(&self, names: &[String]) -> Result<Vec<UsernameRecord>, LoaderError>;
}

pub(crate) struct UsersByIdLoader {
    api: Arc<dyn UsersApi>,
}

#[async_trait]
impl BatchLoader for UsersByIdLoader {
    type Key = u64;
    type DedupKey = u64;
    type Value = Option<User>;
    type Rejection = ResourceRejection;

    fn dedup_key(&self, key: &u64) -> u64 {
        *key
    }

    async fn load(&self, keys: Vec<u64>) -> Result<Vec<OutcomeOf<Self>>, LoaderError> {
        let (valid, mut outcomes) = split_invalid(keys);

        if valid.is_empty() {
            return Ok(outcomes);
        }

        let mut found: HashMap<u64, UserRecord> = self
            .api
            .users_by_id(&valid)
            .await?
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        outcomes.extend(valid.into_iter().map(|id| {
            let user = found.remove(&id).map(User::from);
            LoadOutcome::resolved(id, user)
        }));
        Ok(outcomes)
    }
}

pub(crate) struct UsersByNameLoader {
    api: Arc<dyn UsersApi>,
}

#[async_trait]
impl BatchLoader for UsersByNameLoader {
    type Key = String;
    type DedupKey = String;
    type Value = Option<User>;
    type Rejection = ResourceRejection;

    fn dedup_key(&self, key: &String) -> String {
        key.to_lowercase()
    }

    async fn load(&self, keys: Vec<String>) -> Result<Vec<OutcomeOf<Self>>, LoaderError> {
        let mut outcomes = Vec::with_capacity(keys.len());
        let mut valid = Vec::with_capacity(keys.len());
        for name in keys {
            if name.trim().is_empty() {
                let rejection = ResourceRejection::InvalidName(name.clone());
                outcomes.push(LoadOutcome::rejected(name, rejection));
            } else {
                valid.push(name);
            }
        }

        if valid.is_empty() {
            return Ok(outcomes);
        }

        let lowered: Vec<String> = valid.iter().map(|name| name.to_lowercase()).collect();
        let found: HashMap<String, UsernameRecord> = self
            .api
            .users_by_name(&lowered)
            .await?
            .into_iter()
            .map(|record| (record.requested_username.to_lowercase(), record))
            .collect();

        outcomes.extend(valid.into_iter().zip(lowered).map(|(name, folded)| {
            let user = found.get(&folded).map(|record| User { id: record.id, name: record.name.clone() });
            LoadOutcome::resolved(name, user)
        }));
        Ok(outcomes)
    }
}

/// Batched username/id resolution with a shared two-way cache.
///
/// A successful lookup in either direction primes both caches. Users that
/// do not exist resolve to `None` and are not cached.
pub struct UsersClient {
    by_id: BatchEngine<UsersByIdLoader>,
    by_name: BatchEngine<UsersByNameLoader>,
    names_by_id: TtlCache<u64, String>,
    ids_by_name: TtlCache<String, u64>,
    settings: ClientSettings,
}

impl UsersClient {
    pub fn new(
        api: Arc<dyn UsersApi>,
        observer: Arc<dyn ErrorObserver>,
        settings: ClientSettings,
    ) -> ClientResult<Self> {
        let config = settings.batch_config();
        let by_id = build_engine("users_by_id", UsersByIdLoader { api: Arc::clone(&api) }, config.clone(), &observer)?;
        let by_name = build_engine("users_by_name", UsersByNameLoader { api }, config, &observer)?;

        Ok(Self {
            by_id,
            by_name,
            names_by_id: TtlCache::new("user_names_by_id", settings.cache_ttl),
            ids_by_name: TtlCache::new("user_ids_by_name", settings.cache_ttl),
            settings,
        })
    }

    pub async fn user_name_by_id(&self, user_id: u64) -> ClientResult<Option<String>> {
        if let Some(name) = self.names_by_id.get(&user_id) {
            return Ok(Some(name));
        }

        let user = self.by_id.submit(user_id).await?;
        if let Some(user) = &user {
            self.prime(user);
        }
        Ok(user.map(|user| user.name))
    }

    /// Case-insensitive.
    pub async fn user_id_by_name(&self, user_name: &str) -> ClientResult<Option<u64>> {
        let cache_key = user_name.to_lowercase();
        if let Some(id) = self.ids_by_name.get(&cache_key) {
            return Ok(Some(id));
        }

        let user = self.by_name.submit(user_name.to_string()).await?;
        if let Some(user) = &user {
            self.prime(user);
            self.ids_by_name.insert(cache_key, user.id);
        }
        Ok(user.map(|user| user.id))
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn shutdown(&self) {
        self.by_id.shutdown();
        self.by_name.shutdown();
    }

    fn prime(&self, user: &User) {
        self.names_by_id.insert(user.id, user.name.clone());
        self.ids_by_name.insert(user.name.to_lowercase(), user.id);
    }
}
