//! File names and default endpoints.

/// Default location of the version catalog.
pub const DEFAULT_MANIFEST_URL: &str = "https://piston-meta.mojang.com/mc/game/version_manifest.json";

/// Default account lookup endpoint; the account name is appended.
pub const DEFAULT_PROFILE_URL: &str = "https://api.mojang.com/users/profiles/minecraft";

/// Default configuration file name.
pub const CONFIG_FILENAME: &str = "servers.json";

/// Default install root, relative to the config file.
pub const DEFAULT_INSTALL_DIR: &str = "minecraft_servers";

/// Version string that bypasses resolution and download.
pub const CUSTOM_VERSION: &str = "custom";

/// Prefix of symbolic version references (`latest:release`).
pub const LATEST_PREFIX: &str = "latest:";

pub const SERVER_JAR: &str = "server.jar";
pub const PROPERTIES_FILE: &str = "server.properties";
pub const EULA_FILE: &str = "eula.txt";
pub const WHITELIST_FILE: &str = "whitelist.json";
pub const OPS_FILE: &str = "ops.json";
pub const BANNED_PLAYERS_FILE: &str = "banned-players.json";
pub const BANNED_IPS_FILE: &str = "banned-ips.json";
pub const ICON_FILE: &str = "server-icon.png";

/// Operator permission level granted to new ops entries.
pub const DEFAULT_OP_LEVEL: u8 = 4;

/// Expiry recorded on new ban entries.
pub const BAN_EXPIRES_FOREVER: &str = "forever";

/// User agent sent with every HTTP request.
pub const USER_AGENT: &str = concat!("craftfleet/", env!("CARGO_PKG_VERSION"));
