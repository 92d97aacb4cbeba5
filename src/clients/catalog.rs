//! Catalog façade: asset and bundle details.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{build_engine, split_invalid, ClientResult, ClientSettings, ResourceRejection};
use crate::assets::AssetTypeTranslator;
use crate::cache::TtlCache;
use crate::scheduler::{BatchEngine, BatchLoader, ErrorObserver, LoadOutcome, LoaderError, OutcomeOf};

/// The service has reported asset types both as numeric ids and as names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssetTypeField {
    Id(u32),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<u64>,
    pub creator_target_id: u64,
    pub creator_type: String,
    #[serde(default)]
    pub product_id: Option<u64>,
    #[serde(default)]
    pub item_restrictions: Vec<String>,
    #[serde(default)]
    pub asset_type: Option<AssetTypeField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorRecord {
    pub id: u64,
    #[serde(rename = "type")]
    pub creator_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleItemRecord {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: String,
    /// Depends on the authenticated user and is not carried into `Bundle`.
    #[serde(default)]
    pub owned: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub id: u64,
    #[serde(default)]
    pub is_public_domain: bool,
    #[serde(default)]
    pub is_for_sale: bool,
    #[serde(default)]
    pub price_in_robux: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRecord {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub bundle_type: String,
    pub creator: CreatorRecord,
    #[serde(default)]
    pub items: Vec<BundleItemRecord>,
    #[serde(default)]
    pub product: Option<ProductRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Creator {
    pub id: u64,
    pub creator_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    /// `None` when the asset has no price; a free asset is `Some(0)`.
    pub price: Option<u64>,
    pub creator: Creator,
    pub product_id: Option<u64>,
    pub limited: bool,
    pub asset_type: Option<String>,
}

impl From<AssetRecord> for Asset {
    fn from(record: AssetRecord) -> Self {
        let limited = record
            .item_restrictions
            .iter()
            .any(|restriction| restriction == "Limited" || restriction == "LimitedUnique");
        let asset_type = match record.asset_type {
            Some(AssetTypeField::Id(id)) => AssetTypeTranslator::shared().name_by_id(id).map(str::to_string),
            Some(AssetTypeField::Name(name)) => Some(name),
            None => None,
        };

        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            price: record.price,
            creator: Creator { id: record.creator_target_id, creator_type: record.creator_type },
            product_id: record.product_id,
            limited,
            asset_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleItem {
    pub id: u64,
    pub name: String,
    pub item_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bundle {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub bundle_type: String,
    pub creator: Creator,
    pub items: Vec<BundleItem>,
    pub price: Option<u64>,
    pub product_id: Option<u64>,
}

impl From<BundleRecord> for Bundle {
    fn from(record: BundleRecord) -> Self {
        let (product_id, price) = match &record.product {
            Some(product) if product.is_public_domain => (Some(product.id), Some(0)),
            Some(product) if product.is_for_sale => (Some(product.id), product.price_in_robux),
            Some(product) => (Some(product.id), None),
            None => (None, None),
        };

        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            bundle_type: record.bundle_type,
            creator: Creator { id: record.creator.id, creator_type: record.creator.creator_type },
            items: record
                .items
                .into_iter()
                .map(|item| BundleItem { id: item.id, name: item.name, item_type: item.item_type })
                .collect(),
            price,
            product_id,
        }
    }
}

#[async_trait]
pub trait CatalogApi: Send + Sync + 'static {
    async fn asset_details(&self, ids: &[u64]) -> Result<Vec<AssetRecord>, LoaderError>;
    async fn bundle_details(&self, ids: &[u64]) -> Result<Vec<BundleRecord>, LoaderError>;
}

pub(crate) struct AssetLoader {
    api: Arc<dyn CatalogApi>,
}

pub(crate) struct BundleLoader {
    api: Arc<dyn CatalogApi>,
}

#[async_trait]
impl BatchLoader for AssetLoader {
    type Key = u64;
    type DedupKey = u64;
    type Value = Option<Asset>;
    type Rejection = ResourceRejection;

    fn dedup_key(&self, key: &u64) -> u64 {
        *key
    }

    async fn load(&self, keys: Vec<u64>) -> Result<Vec<OutcomeOf<Self>>, LoaderError> {
        let (valid, mut outcomes) = split_invalid(keys);
        if valid.is_empty() {
            return Ok(outcomes);
        }

        let mut found: HashMap<u64, AssetRecord> = self
            .api
            .asset_details(&valid)
            .await?
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        outcomes.extend(
            valid
                .into_iter()
                .map(|id| LoadOutcome::resolved(id, found.remove(&id).map(Asset::from))),
        );
        Ok(outcomes)
    }
}

#[async_trait]
impl BatchLoader for BundleLoader {
    type Key = u64;
    type DedupKey = u64;
    type Value = Option<Bundle>;
    type Rejection = ResourceRejection;

    fn dedup_key(&self, key: &u64) -> u64 {
        *key
    }

    async fn load(&self, keys: Vec<u64>) -> Result<Vec<OutcomeOf<Self>>, LoaderError> {
        let (valid, mut outcomes) = split_invalid(keys);
        if valid.is_empty() {
            return Ok(outcomes);
        }

        let mut found: HashMap<u64, BundleRecord> = self
            .api
            .bundle_details(&valid)
            .await?
            .into_iter()
            .map(|record| (record.id, record))
            .collect();

        outcomes.extend(
            valid
                .into_iter()
                .map(|id| LoadOutcome::resolved(id, found.remove(&id).map(Bundle::from))),
        );
        Ok(outcomes)
    }
}

/// Batched asset and bundle details. Lookups for items that do not exist
/// are cached as `None` too.
pub struct CatalogClient {
    assets: BatchEngine<AssetLoader>,
    bundles: BatchEngine<BundleLoader>,
    asset_cache: TtlCache<u64, Option<Asset>>,
    bundle_cache: TtlCache<u64, Option<Bundle>>,
    settings: ClientSettings,
}

impl CatalogClient {
    pub fn new(
        api: Arc<dyn CatalogApi>,
        observer: Arc<dyn ErrorObserver>,
        settings: ClientSettings,
    ) -> ClientResult<Self> {
        let config = settings.batch_config();
        let assets = build_engine("catalog_assets", AssetLoader { api: Arc::clone(&api) }, config.clone(), &observer)?;
        let bundles = build_engine("catalog_bundles", BundleLoader { api }, config, &observer)?;

        Ok(Self {
            assets,
            bundles,
            asset_cache: TtlCache::new("catalog_assets", settings.cache_ttl),
            bundle_cache: TtlCache::new("catalog_bundles", settings.cache_ttl),
            settings,
        })
    }

    pub async fn asset(&self, asset_id: u64) -> ClientResult<Option<Asset>> {
        if let Some(asset) = self.asset_cache.get(&asset_id) {
            return Ok(asset);
        }

        let asset = self.assets.submit(asset_id).await?;
        self.asset_cache.insert(asset_id, asset.clone());
        Ok(asset)
    }

    pub async fn bundle(&self, bundle_id: u64) -> ClientResult<Option<Bundle>> {
        if let Some(bundle) = self.bundle_cache.get(&bundle_id) {
            return Ok(bundle);
        }

        let bundle = self.bundles.submit(bundle_id).await?;
        self.bundle_cache.insert(bundle_id, bundle.clone());
        Ok(bundle)
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn shutdown(&self) {
        self.assets.shutdown();
        self.bundles.shutdown();
    }
}
