//! Thumbnails façade against a mock transport.

use std::sync::Arc;

use async_trait::async_trait;
use coalesce_core::clients::{
    ClientError, ClientSettings, ResourceRejection, ThumbnailKind, ThumbnailRecord, ThumbnailRequest,
    ThumbnailState, ThumbnailsApi, ThumbnailsClient,
};
use coalesce_core::scheduler::{BatchError, LoaderError, NoopObserver};
use parking_lot::Mutex;

/// Reports every request as pending for the first `pending_rounds` calls.
#[derive(Default)]
struct MockThumbnails {
    calls: Mutex<Vec<Vec<String>>>,
    pending_rounds: usize,
    omit: Vec<String>,
}

#[async_trait]
impl ThumbnailsApi for MockThumbnails {
    async fn batch(&self, requests: &[ThumbnailRequest]) -> Result<Vec<ThumbnailRecord>, LoaderError> {
        let round = {
            let mut calls = self.calls.lock();
            calls.push(requests.iter().map(ThumbnailRequest::request_id).collect());
            calls.len()
        };
        Ok(requests
            .iter()
            .map(ThumbnailRequest::request_id)
            .filter(|id| !self.omit.contains(id))
            .map(|request_id| {
                if round <= self.pending_rounds {
                    ThumbnailRecord { request_id, state: ThumbnailState::Pending, image_url: None }
                } else {
                    let image_url = Some(format!("https://cdn.example/{}.png", request_id));
                    ThumbnailRecord { request_id, state: ThumbnailState::Completed, image_url }
                }
            })
            .collect())
    }
}

fn client_with(api: MockThumbnails, settings: ClientSettings) -> (ThumbnailsClient, Arc<MockThumbnails>) {
    let api = Arc::new(api);
    let client = ThumbnailsClient::new(api.clone(), Arc::new(NoopObserver), settings).unwrap();
    (client, api)
}

#[test]
fn request_id_combines_type_id_and_size() {
    let request = ThumbnailRequest::new(ThumbnailKind::AvatarHeadShot, 1, "150x150");
    assert_eq!(request.request_id(), "AvatarHeadShot_1_150x150");

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["targetId"], 1);
    assert_eq!(json["type"], "AvatarHeadShot");
}

#[test]
fn unknown_state_decodes() {
    let record: ThumbnailRecord =
        serde_json::from_str(r#"{"requestId":"Asset_1_42x42","state":"TemporarilyUnavailable"}"#).unwrap();
    assert_eq!(record.state, ThumbnailState::Unknown);
    assert_eq!(record.image_url, None);
}

#[tokio::test(start_paused = true)]
async fn kinds_share_one_batch() {
    let (client, api) = client_with(MockThumbnails::default(), ClientSettings::thumbnails());

    let (asset, bundle, headshot) = tokio::join!(
        client.asset_thumbnail(1, "420x420"),
        client.bundle_thumbnail(1, "420x420"),
        client.user_headshot_thumbnail(1, "48x48"),
    );

    assert_eq!(asset.unwrap().image_url.as_deref(), Some("https://cdn.example/Asset_1_420x420.png"));
    assert_eq!(bundle.unwrap().state, ThumbnailState::Completed);
    assert!(headshot.unwrap().image_url.unwrap().contains("AvatarHeadShot_1_48x48"));
    assert_eq!(api.calls.lock().len(), 1);
    assert_eq!(api.calls.lock()[0].len(), 3);
}

#[tokio::test(start_paused = true)]
async fn pending_thumbnail_is_retried_until_ready() {
    let api = MockThumbnails { pending_rounds: 2, ..MockThumbnails::default() };
    let (client, api) = client_with(api, ClientSettings::thumbnails());

    let thumbnail = client.asset_thumbnail(9, "150x150").await.unwrap();

    assert_eq!(thumbnail.state, ThumbnailState::Completed);
    assert_eq!(api.calls.lock().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn thumbnail_stuck_pending_fails() {
    let api = MockThumbnails { pending_rounds: usize::MAX, ..MockThumbnails::default() };
    let settings = ClientSettings { max_attempts: 3, ..ClientSettings::thumbnails() };
    let (client, _api) = client_with(api, settings);

    let err = client.asset_thumbnail(9, "150x150").await.unwrap_err();
    assert_eq!(err, ClientError::Batch(BatchError::StillPending { attempts: 3 }));
}

#[tokio::test(start_paused = true)]
async fn omitted_thumbnail_is_retried() {
    let api = MockThumbnails { omit: vec!["Asset_5_150x150".to_string()], ..MockThumbnails::default() };
    let settings = ClientSettings { max_attempts: 2, ..ClientSettings::thumbnails() };
    let (client, api) = client_with(api, settings);

    let err = client.asset_thumbnail(5, "150x150").await.unwrap_err();
    assert_eq!(err, ClientError::Batch(BatchError::MaxAttemptsExceeded { attempts: 2 }));
    assert_eq!(api.calls.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn completed_thumbnail_is_cached() {
    let (client, api) = client_with(MockThumbnails::default(), ClientSettings::thumbnails());

    client.user_headshot_thumbnail(3, "48x48").await.unwrap();
    client.user_headshot_thumbnail(3, "48x48").await.unwrap();
    client.user_headshot_thumbnail(3, "60x60").await.unwrap();

    assert_eq!(api.calls.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn invalid_requests_are_rejected() {
    let (client, api) = client_with(MockThumbnails::default(), ClientSettings::thumbnails());

    let err = client.asset_thumbnail(0, "150x150").await.unwrap_err();
    assert_eq!(err.rejection(), Some(&ResourceRejection::InvalidId(0)));

    let err = client.asset_thumbnail(4, "").await.unwrap_err();
    assert_eq!(err.rejection(), Some(&ResourceRejection::InvalidSize(String::new())));

    assert!(api.calls.lock().is_empty());
}
