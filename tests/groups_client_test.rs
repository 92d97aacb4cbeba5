//! Groups façade against a mock transport.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use coalesce_core::clients::{
    ClientError, ClientSettings, Group, GroupOwner, GroupRecord, GroupsApi, GroupsClient,
};
use coalesce_core::scheduler::{BatchError, EngineFault, ErrorObserver, LoaderError, NoopObserver};
use parking_lot::Mutex;

#[derive(Default)]
struct MockGroups {
    calls: Mutex<Vec<Vec<u64>>>,
    fail: bool,
}

#[async_trait]
impl GroupsApi for MockGroups {
    async fn groups_by_id(&self, ids: &[u64]) -> Result<Vec<GroupRecord>, LoaderError> {
        self.calls.lock().push(ids.to_vec());
        if self.fail {
            return Err(LoaderError::Status { status: 500, message: "internal".to_string() });
        }
        Ok(ids
            .iter()
            .filter(|id| **id < 100)
            .map(|id| GroupRecord {
                id: *id,
                name: format!("Group {}", id),
                description: None,
                owner: GroupOwner { id: 1, owner_type: "User".to_string() },
            })
            .collect())
    }
}

#[tokio::test(start_paused = true)]
async fn group_lookup_maps_and_caches() {
    let api = Arc::new(MockGroups::default());
    let client = GroupsClient::new(api.clone(), Arc::new(NoopObserver), ClientSettings::groups()).unwrap();

    let expected = Group {
        id: 7,
        name: "Group 7".to_string(),
        owner: GroupOwner { id: 1, owner_type: "User".to_string() },
    };
    assert_eq!(client.group_by_id(7).await.unwrap(), Some(expected.clone()));
    assert_eq!(client.group_by_id(7).await.unwrap(), Some(expected));
    assert_eq!(api.calls.lock().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn missing_group_is_none_and_not_cached() {
    let api = Arc::new(MockGroups::default());
    let client = GroupsClient::new(api.clone(), Arc::new(NoopObserver), ClientSettings::groups()).unwrap();

    assert_eq!(client.group_by_id(500).await.unwrap(), None);
    assert_eq!(client.group_by_id(500).await.unwrap(), None);
    assert_eq!(api.calls.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn bounded_queue_refuses_overflow() {
    let api = Arc::new(MockGroups::default());
    let settings = ClientSettings { max_queue_size: Some(1), ..ClientSettings::groups() };
    let client = GroupsClient::new(api.clone(), Arc::new(NoopObserver), settings).unwrap();

    let (first, second) = tokio::join!(client.group_by_id(1), client.group_by_id(2));

    assert!(first.unwrap().is_some());
    assert_eq!(second.unwrap_err(), ClientError::Batch(BatchError::QueueFull { current: 1, max: 1 }));
    assert_eq!(*api.calls.lock(), vec![vec![1]]);
}

#[tokio::test(start_paused = true)]
async fn failing_transport_reaches_observer() {
    let api = Arc::new(MockGroups { fail: true, ..MockGroups::default() });
    let faults = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&faults);
    let observer: Arc<dyn ErrorObserver> = Arc::new(move |fault: &EngineFault| {
        if matches!(fault, EngineFault::LoaderFailed { .. }) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });
    let settings = ClientSettings { max_attempts: 2, ..ClientSettings::groups() };
    let client = GroupsClient::new(api.clone(), observer, settings).unwrap();

    let err = client.group_by_id(3).await.unwrap_err();

    assert_eq!(err, ClientError::Batch(BatchError::MaxAttemptsExceeded { attempts: 2 }));
    assert_eq!(faults.load(Ordering::SeqCst), 2);
    assert_eq!(api.calls.lock().len(), 2);
}

#[test]
fn client_rejects_invalid_settings() {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
    let _guard = runtime.enter();

    let settings = ClientSettings { batch_size: 0, ..ClientSettings::groups() };
    let result = GroupsClient::new(Arc::new(MockGroups::default()), Arc::new(NoopObserver), settings);
    assert!(matches!(result, Err(ClientError::InvalidConfig(_))));
}
