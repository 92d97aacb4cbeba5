//! Resource façades over the batch engine.
//!
//! Each client owns its engines and result caches and talks to the remote
//! service through an async transport trait the caller implements.

mod catalog;
mod groups;
mod settings;
mod thumbnails;
mod users;

use std::sync::Arc;

use thiserror::Error;

use crate::scheduler::{
    BatchConfig, BatchEngine, BatchError, BatchLoader, ConfigError, ErrorObserver, LoadOutcome,
};

pub use catalog::{
    Asset, AssetRecord, AssetTypeField, Bundle, BundleItem, BundleItemRecord, BundleRecord,
    CatalogApi, CatalogClient, Creator, CreatorRecord, ProductRecord,
};
pub use groups::{Group, GroupOwner, GroupRecord, GroupsApi, GroupsClient};
pub use settings::ClientSettings;
pub use thumbnails::{
    Thumbnail, ThumbnailKind, ThumbnailRecord, ThumbnailRequest, ThumbnailState, ThumbnailsApi,
    ThumbnailsClient,
};
pub use users::{User, UserRecord, UsernameRecord, UsersApi, UsersClient};

/// Terminal per-item rejection raised by the façade loaders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResourceRejection {
    #[error("invalid id: {0}")]
    InvalidId(u64),

    #[error("invalid name: {0:?}")]
    InvalidName(String),

    #[error("invalid thumbnail size: {0:?}")]
    InvalidSize(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error(transparent)]
    Batch(#[from] BatchError<ResourceRejection>),

    #[error("invalid client configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl ClientError {
    /// Rejection reported for this item, if that is why it failed.
    pub fn rejection(&self) -> Option<&ResourceRejection> {
        match self {
            Self::Batch(BatchError::Rejected(rejection)) => Some(rejection),
            _ => None,
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

fn build_engine<L>(
    name: &str,
    loader: L,
    config: BatchConfig,
    observer: &Arc<dyn ErrorObserver>,
) -> ClientResult<BatchEngine<L>>
where
    L: BatchLoader<Rejection = ResourceRejection>,
{
    Ok(BatchEngine::new(name, loader, config, Arc::clone(observer))?)
}

/// Reject zero ids up front; returns the ids worth sending downstream.
fn split_invalid<V>(keys: Vec<u64>) -> (Vec<u64>, Vec<LoadOutcome<u64, V, ResourceRejection>>) {
    let (valid, invalid): (Vec<u64>, Vec<u64>) = keys.into_iter().partition(|id| *id != 0);
    let rejected = invalid
        .into_iter()
        .map(|id| LoadOutcome::rejected(id, ResourceRejection::InvalidId(id)))
        .collect();
    (valid, rejected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_invalid_keeps_order_and_rejects_zero() {
        let (valid, rejected) = split_invalid::<()>(vec![3, 0, 1, 0]);
        assert_eq!(valid, vec![3, 1]);
        assert_eq!(
            rejected,
            vec![
                LoadOutcome::rejected(0, ResourceRejection::InvalidId(0)),
                LoadOutcome::rejected(0, ResourceRejection::InvalidId(0)),
            ]
        );
    }

    #[test]
    fn rejection_accessor() {
        let err = ClientError::Batch(BatchError::Rejected(ResourceRejection::InvalidId(0)));
        assert_eq!(err.rejection(), Some(&ResourceRejection::InvalidId(0)));
        assert_eq!(ClientError::Batch(BatchError::EngineStopped).rejection(), None);
    }
}
