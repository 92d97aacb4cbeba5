//! Catalog façade against a mock transport.

use std::sync::Arc;

use async_trait::async_trait;
use coalesce_core::clients::{
    AssetRecord, AssetTypeField, BundleItemRecord, BundleRecord, CatalogApi, CatalogClient,
    ClientSettings, CreatorRecord, ProductRecord,
};
use coalesce_core::scheduler::{LoaderError, NoopObserver};
use parking_lot::Mutex;

#[derive(Default)]
struct MockCatalog {
    asset_calls: Mutex<Vec<Vec<u64>>>,
    bundle_calls: Mutex<Vec<Vec<u64>>>,
}

fn asset_record(id: u64) -> Option<AssetRecord> {
    let base = AssetRecord {
        id,
        name: format!("Asset {}", id),
        description: Some("desc".to_string()),
        price: None,
        creator_target_id: 1,
        creator_type: "User".to_string(),
        product_id: Some(id * 10),
        item_restrictions: Vec::new(),
        asset_type: None,
    };
    match id {
        1 => Some(AssetRecord { price: Some(0), asset_type: Some(AssetTypeField::Id(8)), ..base }),
        2 => Some(AssetRecord {
            price: Some(250),
            item_restrictions: vec!["LimitedUnique".to_string()],
            asset_type: Some(AssetTypeField::Name("Hat".to_string())),
            ..base
        }),
        3 => Some(base),
        _ => None,
    }
}

fn bundle_record(id: u64) -> Option<BundleRecord> {
    let product = match id {
        10 => Some(ProductRecord { id: 100, is_public_domain: true, is_for_sale: false, price_in_robux: None }),
        11 => Some(ProductRecord { id: 110, is_public_domain: false, is_for_sale: true, price_in_robux: Some(75) }),
        12 => Some(ProductRecord { id: 120, is_public_domain: false, is_for_sale: false, price_in_robux: Some(75) }),
        13 => None,
        _ => return None,
    };
    Some(BundleRecord {
        id,
        name: format!("Bundle {}", id),
        description: None,
        bundle_type: "BodyParts".to_string(),
        creator: CreatorRecord { id: 1, creator_type: "User".to_string() },
        items: vec![BundleItemRecord {
            id: 5,
            name: "Torso".to_string(),
            item_type: "Asset".to_string(),
            owned: Some(true),
        }],
        product,
    })
}

#[async_trait]
impl CatalogApi for MockCatalog {
    async fn asset_details(&self, ids: &[u64]) -> Result<Vec<AssetRecord>, LoaderError> {
        self.asset_calls.lock().push(ids.to_vec());
        Ok(ids.iter().filter_map(|id| asset_record(*id)).collect())
    }

    async fn bundle_details(&self, ids: &[u64]) -> Result<Vec<BundleRecord>, LoaderError> {
        self.bundle_calls.lock().push(ids.to_vec());
        Ok(ids.iter().filter_map(|id| bundle_record(*id)).collect())
    }
}

fn client() -> (CatalogClient, Arc<MockCatalog>) {
    let api = Arc::new(MockCatalog::default());
    let client = CatalogClient::new(api.clone(), Arc::new(NoopObserver), ClientSettings::catalog()).unwrap();
    (client, api)
}

#[tokio::test(start_paused = true)]
async fn assets_map_price_type_and_limited() {
    let (client, api) = client();

    let (free, limited, plain) = tokio::join!(client.asset(1), client.asset(2), client.asset(3));
    let free = free.unwrap().unwrap();
    let limited = limited.unwrap().unwrap();
    let plain = plain.unwrap().unwrap();

    assert_eq!(free.price, Some(0));
    assert_eq!(free.asset_type.as_deref(), Some("Hat"));
    assert!(!free.limited);

    assert_eq!(limited.price, Some(250));
    assert!(limited.limited);
    assert_eq!(limited.asset_type.as_deref(), Some("Hat"));

    assert_eq!(plain.price, None);
    assert_eq!(plain.asset_type, None);
    assert_eq!(plain.creator.id, 1);
    assert_eq!(plain.product_id, Some(30));

    assert_eq!(*api.asset_calls.lock(), vec![vec![1, 2, 3]]);
}

#[tokio::test(start_paused = true)]
async fn missing_asset_is_cached_as_none() {
    let (client, api) = client();

    assert_eq!(client.asset(404).await.unwrap(), None);
    assert_eq!(client.asset(404).await.unwrap(), None);
    assert_eq!(api.asset_calls.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn bundle_price_follows_product() {
    let (client, api) = client();

    let (public, for_sale, off_sale, no_product) =
        tokio::join!(client.bundle(10), client.bundle(11), client.bundle(12), client.bundle(13));

    let public = public.unwrap().unwrap();
    assert_eq!(public.price, Some(0));
    assert_eq!(public.product_id, Some(100));
    assert_eq!(public.items.len(), 1);
    assert_eq!(public.items[0].name, "Torso");

    assert_eq!(for_sale.unwrap().unwrap().price, Some(75));
    assert_eq!(off_sale.unwrap().unwrap().price, None);

    let no_product = no_product.unwrap().unwrap();
    assert_eq!(no_product.price, None);
    assert_eq!(no_product.product_id, None);

    assert_eq!(api.bundle_calls.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn zero_id_is_rejected() {
    let (client, api) = client();

    let err = client.bundle(0).await.unwrap_err();
    assert!(err.rejection().is_some());
    assert!(api.bundle_calls.lock().is_empty());
}

#[test]
fn asset_record_decodes_either_type_form() {
    let numeric: AssetRecord = serde_json::from_str(
        r#"{"id":1,"name":"A","price":0,"creatorTargetId":2,"creatorType":"Group","assetType":8}"#,
    )
    .unwrap();
    assert_eq!(numeric.asset_type, Some(AssetTypeField::Id(8)));
    assert_eq!(numeric.price, Some(0));
    assert!(numeric.item_restrictions.is_empty());

    let named: AssetRecord = serde_json::from_str(
        r#"{"id":1,"name":"A","creatorTargetId":2,"creatorType":"Group","assetType":"Hat","itemRestrictions":["Limited"]}"#,
    )
    .unwrap();
    assert_eq!(named.asset_type, Some(AssetTypeField::Name("Hat".to_string())));
    assert_eq!(named.price, None);
}
