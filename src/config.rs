use serde::Deserialize;

pub const AMADEUS_BASE_URL: &str = "https://test.api.amadeus.com";
pub const TOKEN_PATH: &str = "/v1/security/oauth2/token";
pub const OFFERS_PATH: &str = "/v2/shopping/flight-offers";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const TOKEN_TTL_SECS: u64 = 30 * 60; // 30 minutes
pub const QUOTE_TTL_SECS: u64 = 10 * 60; // 10 minutes
pub const MAX_OFFERS: u32 = 1;
pub const DEFAULT_ADULTS: u32 = 1;
pub const NO_CACHE_FLAG: &str = "1";

const ENV_PREFIX: &str = "FLIGHT_GATEWAY";

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub amadeus: AmadeusSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AmadeusSettings {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Resolve arrival airports to city codes using the locations
    /// dictionary returned next to the offers.
    #[serde(default)]
    pub resolve_city_codes: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl AmadeusSettings {
    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), TOKEN_PATH)
    }

    pub fn offers_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), OFFERS_PATH)
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3030
}

fn default_base_url() -> String {
    AMADEUS_BASE_URL.to_string()
}

impl Settings {
    /// Reads `config.toml` when present, then `FLIGHT_GATEWAY__*` environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(config::File::with_name("config"));
        }

        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

        builder.build()?.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
