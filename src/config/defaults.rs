pub const SERVICE_NAME: &str = "zodiac-api";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: i64 = 8000;
pub const DEFAULT_RUST_LOG: &str = "info,tower_http=info,sqlx=warn";
pub const DEFAULT_LOG_WITH_TARGET: bool = false;
pub const DEFAULT_LOG_ANSI: bool = true;
pub const DEFAULT_DB_MAX_CONNECTIONS: i64 = 10;
pub const DEFAULT_DB_MIN_IDLE: i64 = 2;
pub const DEFAULT_DB_CONNECT_TIMEOUT_SECS: i64 = 5;
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 30 * 60;

/// Plain variable read when `APP_DATABASE__URL` is absent.
pub const LEGACY_DATABASE_URL_VAR: &str = "DATABASE_URL";
