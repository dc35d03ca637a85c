/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Catalog defaults
pub const DEFAULT_CATALOG_PATH: &str = "channels.json";
pub const DEFAULT_REGISTRY_PATH: &str = "used_tvg_ids.txt";
pub const DEFAULT_GROUP: &str = "GERAL";
pub const DEFAULT_VIDEO_PLATFORM_DOMAINS: &[&str] = &["youtube.com", "youtu.be"];

// Builtin special channels: (id, name, url, group)
pub const DEFAULT_BUILTIN_SPECIALS: &[(&str, &str, &str, &str)] = &[
    (
        "tvassembleia",
        "TV Assembleia PI",
        "https://www.youtube.com/@tvassembleia-pi/live",
        "YOUTUBE",
    ),
    (
        "tv_cancao_nova",
        "TV Canção Nova",
        "https://www.youtube.com/user/tvcancaonova/live",
        "YOUTUBE",
    ),
];

// EPG output defaults
pub const DEFAULT_OUTPUT_PATH: &str = "epg.xml";
pub const DEFAULT_GENERATOR_NAME: &str = "iptv-guide";

// Fetch defaults
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

// Fallback programme defaults
pub const DEFAULT_FALLBACK_TITLE: &str = "Programação Indisponível";
pub const DEFAULT_FALLBACK_DESCRIPTION: &str =
    "Informações de programação não disponíveis para este canal.";
pub const DEFAULT_FALLBACK_START: &str = "19700101000000 +0000";
pub const DEFAULT_FALLBACK_STOP: &str = "20991231235959 +0000";

// Feed sources, visited in this order
pub const DEFAULT_EPG_SOURCES: &[&str] = &[
    "https://m3u4u.com/epg/jq2zy9epr3bwxmgwyxr5",
    "https://m3u4u.com/epg/3wk1y24kx7uzdevxygz7",
    "https://m3u4u.com/epg/782dyqdrqkh1xegen4zp",
    "https://www.open-epg.com/files/brazil1.xml.gz",
    "https://www.open-epg.com/files/brazil2.xml.gz",
    "https://www.open-epg.com/files/brazil3.xml.gz",
    "https://www.open-epg.com/files/brazil4.xml.gz",
    "https://www.open-epg.com/files/portugal1.xml.gz",
    "https://www.open-epg.com/files/portugal2.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_BR1.xml.gz",
    "https://epgshare01.online/epgshare01/epg_ripper_PT1.xml.gz",
];
