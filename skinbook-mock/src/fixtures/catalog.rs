use skinbook_core::{CatalogEntry, NameIdMap};

/// Hash name present in the catalog but absent from the name-id map.
pub const UNMAPPED: &str = "Sticker | Unmapped (Holo)";

const ITEMS: &[(&str, Option<&str>, Option<u64>)] = &[
    (
        "AK-47 | Redline (Field-Tested)",
        Some("https://community.cloudflare.steamstatic.com/economy/image/ak47_redline"),
        Some(176_288_467),
    ),
    ("Glove Case", Some("https://community.cloudflare.steamstatic.com/economy/image/glove_case"), Some(175_999_886)),
    (
        "AWP | Asiimov (Battle-Scarred)",
        Some("https://community.cloudflare.steamstatic.com/economy/image/awp_asiimov"),
        Some(176_042_493),
    ),
    ("Operation Breakout Weapon Case", None, Some(1_376_383)),
    (
        "Zeus x27 | Olympus (Field-Tested)",
        Some("https://community.cloudflare.steamstatic.com/economy/image/zeus_olympus"),
        Some(176_185_874),
    ),
    (UNMAPPED, None, None),
    ("Sealed Graffiti | Lambda (Bazooka Pink)", None, Some(176_001_244)),
];

pub fn catalog() -> Vec<CatalogEntry> {
    ITEMS
        .iter()
        .map(|(name, image, _)| CatalogEntry::new(*name, *image))
        .collect()
}

pub fn name_ids() -> NameIdMap {
    ITEMS
        .iter()
        .filter_map(|(name, _, id)| id.map(|id| ((*name).to_string(), id)))
        .collect()
}
