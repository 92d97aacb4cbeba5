//! Catalog page URLs with SEO slugs.

use std::sync::OnceLock;

use regex::Regex;

pub const DEFAULT_BASE_URL: &str = "https://www.roblox.com/";

/// Builds catalog and bundle page links.
///
/// `referral` is appended as the `rbxp` query parameter when set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogUrls {
    base_url: String,
    referral: Option<u64>,
}

impl CatalogUrls {
    /// `base_url` is used as a prefix and should end with `/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), referral: None }
    }

    pub fn with_referral(mut self, referral: u64) -> Self {
        self.referral = (referral != 0).then_some(referral);
        self
    }

    pub fn referral(&self) -> Option<u64> {
        self.referral
    }

    pub fn asset_url(&self, asset_id: u64, asset_name: &str) -> String {
        self.build("catalog", asset_id, asset_name)
    }

    pub fn bundle_url(&self, bundle_id: u64, bundle_name: &str) -> String {
        self.build("bundles", bundle_id, bundle_name)
    }

    fn build(&self, section: &str, id: u64, name: &str) -> String {
        let mut url = format!("{}{}/{}/{}", self.base_url, section, id, seo_name(name));
        if let Some(referral) = self.referral {
            url.push_str(&format!("?rbxp={referral}"));
        }
        url
    }
}

impl Default for CatalogUrls {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// URL slug for an item name. Falls back to `redirect` when nothing usable
/// remains.
pub fn seo_name(name: &str) -> String {
    static STRIP: OnceLock<Regex> = OnceLock::new();
    static NON_WORD: OnceLock<Regex> = OnceLock::new();

    let strip = STRIP.get_or_init(|| Regex::new(r#"["'_]+"#).expect("valid regex literal"));
    let non_word = NON_WORD.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]+").expect("valid regex literal"));

    let stripped = strip.replace_all(name, "");
    let dashed = non_word.replace_all(&stripped, "-");
    let slug = dashed.trim_matches('-');

    if slug.is_empty() {
        "redirect".to_string()
    } else {
        slug.to_string()
    }
}
