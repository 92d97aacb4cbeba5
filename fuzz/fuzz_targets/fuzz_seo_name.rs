//! Fuzz target for catalog URL slugs.

#![no_main]

use coalesce_core::assets::seo_name;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let slug = seo_name(data);

    assert!(!slug.is_empty());
    assert!(!slug.starts_with('-') && !slug.ends_with('-'));
    assert!(slug.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
});
