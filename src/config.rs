use std::str::FromStr;
use std::time::Duration;

/// Upload cap for query images.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;
pub const DEFAULT_BATCH_SIZE: usize = 32;
pub const DEFAULT_IMAGE_URL_PREFIX: &str = "/static/product_images";
pub const DEFAULT_EMBED_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// SQLite path, or `:memory:`.
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: "./zabatda.db".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedderKind {
    Histogram,
    Http,
}

impl FromStr for EmbedderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "histogram" => Ok(EmbedderKind::Histogram),
            "http" => Ok(EmbedderKind::Http),
            _ => Err(format!("Unknown embedder: {s}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    pub kind: EmbedderKind,
    /// Required for `EmbedderKind::Http`.
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub timeout: Duration,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            kind: EmbedderKind::Histogram,
            endpoint: None,
            model: None,
            timeout: DEFAULT_EMBED_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub batch_size: usize,
    pub image_url_prefix: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            image_url_prefix: DEFAULT_IMAGE_URL_PREFIX.into(),
        }
    }
}

/// Settings the use cases need at runtime, independent of how the store
/// and embedder were built.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    pub embed_timeout: Duration,
    pub max_image_bytes: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            embed_timeout: DEFAULT_EMBED_TIMEOUT,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub embedder: EmbedderConfig,
    pub ingest: IngestConfig,
    pub max_image_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            embedder: EmbedderConfig::default(),
            ingest: IngestConfig::default(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

fn parse_var<T>(name: &str, raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse().map_err(|e| format!("Invalid {name}: {e}"))
}

impl Config {
    /// Reads `ZABATDA_*` variables on top of the defaults. Only the binary calls this.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, with variables resolved through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let mut config = Config::default();
        if let Some(path) = lookup("ZABATDA_DB") {
            config.store.path = path;
        }
        if let Some(kind) = lookup("ZABATDA_EMBEDDER") {
            config.embedder.kind = kind.parse()?;
        }
        config.embedder.endpoint = lookup("ZABATDA_EMBEDDER_URL");
        config.embedder.model = lookup("ZABATDA_EMBEDDER_MODEL");
        if let Some(secs) = lookup("ZABATDA_EMBED_TIMEOUT_SECS") {
            config.embedder.timeout = Duration::from_secs(parse_var("ZABATDA_EMBED_TIMEOUT_SECS", &secs)?);
        }
        if let Some(size) = lookup("ZABATDA_BATCH_SIZE") {
            config.ingest.batch_size = parse_var("ZABATDA_BATCH_SIZE", &size)?;
        }
        if let Some(prefix) = lookup("ZABATDA_IMAGE_URL_PREFIX") {
            config.ingest.image_url_prefix = prefix;
        }
        if let Some(bytes) = lookup("ZABATDA_MAX_IMAGE_BYTES") {
            config.max_image_bytes = parse_var("ZABATDA_MAX_IMAGE_BYTES", &bytes)?;
        }
        Ok(config)
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            embed_timeout: self.embedder.timeout,
            max_image_bytes: self.max_image_bytes,
        }
    }
}
