//! Asset type table and display-name translation.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Known asset types as `(id, name)`.
pub const ASSET_TYPES: &[(u32, &str)] = &[
    (1, "Image"),
    (2, "TShirt"),
    (3, "Audio"),
    (4, "Mesh"),
    (5, "Lua"),
    (6, "HTML"),
    (7, "Text"),
    (8, "Hat"),
    (9, "Place"),
    (10, "Model"),
    (11, "Shirt"),
    (12, "Pants"),
    (13, "Decal"),
    (16, "Avatar"),
    (17, "Head"),
    (18, "Face"),
    (19, "Gear"),
    (21, "Badge"),
    (22, "GroupEmblem"),
    (24, "Animation"),
    (25, "Arms"),
    (26, "Legs"),
    (27, "Torso"),
    (28, "RightArm"),
    (29, "LeftArm"),
    (30, "LeftLeg"),
    (31, "RightLeg"),
    (32, "Package"),
    (33, "YouTubeVideo"),
    (34, "GamePass"),
    (35, "App"),
    (37, "Code"),
    (38, "Plugin"),
    (39, "SolidModel"),
    (40, "MeshPart"),
    (41, "HairAccessory"),
    (42, "FaceAccessory"),
    (43, "NeckAccessory"),
    (44, "ShoulderAccessory"),
    (45, "FrontAccessory"),
    (46, "BackAccessory"),
    (47, "WaistAccessory"),
    (48, "ClimbAnimation"),
    (49, "DeathAnimation"),
    (50, "FallAnimation"),
    (51, "IdleAnimation"),
    (52, "JumpAnimation"),
    (53, "RunAnimation"),
    (54, "SwimAnimation"),
    (55, "WalkAnimation"),
    (56, "PoseAnimation"),
    (57, "EarAccessory"),
    (58, "EyeAccessory"),
    (61, "EmoteAnimation"),
    (62, "Video"),
];

/// Bidirectional lookup over `ASSET_TYPES`. Name lookups ignore case.
#[derive(Debug)]
pub struct AssetTypeTranslator {
    names_by_id: HashMap<u32, &'static str>,
    ids_by_name: HashMap<String, u32>,
    display_names: HashMap<String, String>,
}

impl AssetTypeTranslator {
    pub fn new() -> Self {
        let mut names_by_id = HashMap::with_capacity(ASSET_TYPES.len());
        let mut ids_by_name = HashMap::with_capacity(ASSET_TYPES.len());
        let mut display_names = HashMap::with_capacity(ASSET_TYPES.len());

        for &(id, name) in ASSET_TYPES {
            let folded = name.to_ascii_lowercase();
            names_by_id.insert(id, name);
            ids_by_name.insert(folded.clone(), id);
            display_names.insert(folded, display_name(name));
        }

        Self { names_by_id, ids_by_name, display_names }
    }

    /// Process-wide instance.
    pub fn shared() -> &'static AssetTypeTranslator {
        static SHARED: OnceLock<AssetTypeTranslator> = OnceLock::new();
        SHARED.get_or_init(AssetTypeTranslator::new)
    }

    pub fn name_by_id(&self, id: u32) -> Option<&'static str> {
        self.names_by_id.get(&id).copied()
    }

    pub fn id_by_name(&self, name: &str) -> Option<u32> {
        self.ids_by_name.get(&name.to_ascii_lowercase()).copied()
    }

    /// Human-readable name, e.g. "hair accessory" for `HairAccessory`.
    pub fn display_name(&self, name: &str) -> Option<&str> {
        self.display_names.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

impl Default for AssetTypeTranslator {
    fn default() -> Self {
        Self::new()
    }
}

fn display_name(name: &str) -> String {
    static UPPER: OnceLock<Regex> = OnceLock::new();

    match name.to_ascii_lowercase().as_str() {
        "html" => "HTML".to_string(),
        "lua" => "Lua".to_string(),
        "youtubevideo" => "YouTube video".to_string(),
        "tshirt" => "T-shirt".to_string(),
        _ => {
            let upper = UPPER.get_or_init(|| Regex::new("[A-Z]").expect("valid regex literal"));
            upper
                .replace_all(name, |caps: &Captures| format!(" {}", caps[0].to_ascii_lowercase()))
                .trim()
                .to_string()
        }
    }
}
