//! Fuzz target for downstream record decoding.
//!
//! Tests that arbitrary bytes cannot cause panics when decoded as the
//! records the façades receive, or when mapped into public types.

#![no_main]

use coalesce_core::clients::{Asset, AssetRecord, Bundle, BundleRecord, ThumbnailRecord};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(record) = serde_json::from_slice::<AssetRecord>(data) {
        let _ = Asset::from(record);
    }
    if let Ok(record) = serde_json::from_slice::<BundleRecord>(data) {
        let _ = Bundle::from(record);
    }
    let _ = serde_json::from_slice::<ThumbnailRecord>(data);
});
