use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "imagechat.toml",
    "config/imagechat.toml",
    "crates/config/imagechat.toml",
    "../imagechat.toml",
    "../config/imagechat.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub channel: ChannelConfig,
    #[serde(default)]
    pub assets: AssetConfig,
}

/// Client-side limits applied before an image ever reaches the channel.
///
/// ```
/// use imagechat_config::UploadConfig;
///
/// let upload = UploadConfig::default();
/// assert_eq!(upload.max_size_bytes, 5 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    #[serde(default = "UploadConfig::default_max_size")]
    pub max_size_bytes: u64,
}

impl UploadConfig {
    pub const DEFAULT_MAX_SIZE_BYTES: u64 = 5_242_880;

    const fn default_max_size() -> u64 {
        Self::DEFAULT_MAX_SIZE_BYTES
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_bytes: Self::default_max_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub url: String,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8000/ws/chat/".to_string(),
        }
    }
}

/// Origin the chat backend serves processed images from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    pub host: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            host: "https://assets.example.com".to_string(),
        }
    }
}

impl AssetConfig {
    /// Host name component of the configured origin, if it parses.
    pub fn host_name(&self) -> Option<String> {
        url::Url::parse(&self.host)
            .ok()
            .and_then(|origin| origin.host_str().map(str::to_string))
    }

    /// Scheme, host and port of the configured asset host, if it parses.
    pub fn origin(&self) -> Option<url::Origin> {
        url::Url::parse(&self.host).ok().map(|url| url.origin())
    }
}

impl AppConfig {
    /// Reject values that would make every upload or every delivery fail.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.upload.max_size_bytes == 0 {
            bail!("upload.max_size_bytes must be greater than zero");
        }

        let origin = url::Url::parse(&self.assets.host)
            .with_context(|| format!("assets.host is not a valid url: {}", self.assets.host))?;
        if origin.scheme() != "https" {
            bail!("assets.host must use https, got {}", origin.scheme());
        }
        if origin.host_str().is_none() {
            bail!("assets.host must name a host");
        }

        Ok(())
    }
}

/// Load the client configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use imagechat_config::load;
///
/// std::env::remove_var("IMAGECHAT_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(config.upload.max_size_bytes > 0);
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let max_size = i64::try_from(defaults.upload.max_size_bytes).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("upload.max_size_bytes", max_size)
        .context("unable to register upload defaults")?
        .set_default("channel.url", defaults.channel.url.clone())
        .context("unable to register channel defaults")?
        .set_default("assets.host", defaults.assets.host.clone())
        .context("unable to register asset defaults")?;

    let environment_overrides = config::Environment::with_prefix("IMAGECHAT").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("IMAGECHAT_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via IMAGECHAT_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    config.validate().context("invalid configuration")?;

    debug!(?config, "loaded client configuration");
    Ok(config)
}
