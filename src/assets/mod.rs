//! Catalog helpers: asset type naming and catalog page URLs.

mod types;
mod urls;

pub use types::{AssetTypeTranslator, ASSET_TYPES};
pub use urls::{seo_name, CatalogUrls, DEFAULT_BASE_URL};
