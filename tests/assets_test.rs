//! Asset type names and catalog links.

use coalesce_core::assets::{seo_name, AssetTypeTranslator, CatalogUrls, ASSET_TYPES};

#[test]
fn translator_round_trips_every_table_entry() {
    let translator = AssetTypeTranslator::shared();
    for (id, name) in ASSET_TYPES {
        assert_eq!(translator.name_by_id(*id), Some(*name));
        assert_eq!(translator.id_by_name(&name.to_uppercase()), Some(*id));
    }
    assert_eq!(translator.name_by_id(0), None);
}

#[test]
fn display_names() {
    let translator = AssetTypeTranslator::new();
    assert_eq!(translator.display_name("HairAccessory"), Some("hair accessory"));
    assert_eq!(translator.display_name("TShirt"), Some("T-shirt"));
    assert_eq!(translator.display_name("YouTubeVideo"), Some("YouTube video"));
    assert_eq!(translator.display_name("Lua"), Some("Lua"));
    assert_eq!(translator.display_name("NotAType"), None);
}

#[test]
fn asset_link_uses_slug() {
    let urls = CatalogUrls::default();
    assert_eq!(
        urls.asset_url(1818, "Classic Swordpack Throwdown"),
        "https://www.roblox.com/catalog/1818/Classic-Swordpack-Throwdown"
    );
    assert_eq!(urls.bundle_url(192, "Man"), "https://www.roblox.com/bundles/192/Man");
}

#[test]
fn referral_is_appended() {
    let urls = CatalogUrls::new("https://example.test/").with_referral(42);
    assert_eq!(urls.referral(), Some(42));
    assert_eq!(urls.asset_url(5, "Hat"), "https://example.test/catalog/5/Hat?rbxp=42");

    let urls = CatalogUrls::new("https://example.test/").with_referral(0);
    assert_eq!(urls.referral(), None);
}

#[test]
fn slug_edge_cases() {
    assert_eq!(seo_name("Dominus \"Empyreus\""), "Dominus-Empyreus");
    assert_eq!(seo_name("it's_a hat!!"), "itsa-hat");
    assert_eq!(seo_name("???"), "redirect");
    assert_eq!(seo_name(""), "redirect");
}
