//! # Configuration
//!
//! Settings are layered with [`figment`]; later sources override earlier ones:
//!
//! 1. **Compiled defaults** ([`Config::default`])
//! 2. **User config**: `config.toml` in the OS-appropriate config directory
//!    (via `directories`)
//! 3. **Working directory**: `stockshot.toml`
//! 4. **Explicit file**: `--config <path>`, TOML, YAML or JSON by extension
//! 5. **Environment**: `STOCKSHOT_` prefix, `__` for nesting, e.g.
//!    `STOCKSHOT_POSITIONS__OFFSET=1`
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `output.directory` | `Outputs` | Where run output roots are created |
//! | `output.identifier_suffix` | `_identified` | Appended to the run id by the identifier stage |
//! | `images.extensions` | jpg, jpeg, png, webp, bmp, tif, tiff | Eligible image extensions |
//! | `images.gif` | `false` | Also treat `gif` as eligible |
//! | `images.include_hidden` | `false` | Include `.`/`_` prefixed entries |
//! | `positions.offset` | `2` | Added to each permutation value to form `PT##` |
//! | `positions.min_width` | `2` | Minimum digits in a position tag |
//! | `positions.concurrency` | min(8, cores) | Leaves planned in parallel |
//! | `positions.carry_extras` | `false` | Copy images beyond the permutation unchanged |
//! | `identifiers.table` | `sku2asin.csv` | SKU → identifier CSV |
//! | `identifiers.key_depth` | `4` | Ancestor directories forming a derived key |
//! | `archive.cap_bytes` | 1 GiB | Maximum summed size per archive |
//! | `archive.compression` | `deflated` | `stored`, `deflated` or `bzip2` |

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use stockshot_archive::{Compression, DEFAULT_CAP_BYTES};
use stockshot_storage::{DEFAULT_EXTENSIONS, ImageFilter};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "stockshot.toml";
/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "STOCKSHOT_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub identifier_suffix: String,
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("Outputs"),
            identifier_suffix: "_identified".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub extensions: Vec<String>,
    pub gif: bool,
    pub include_hidden: bool,
}
impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            gif: false,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    pub offset: u32,
    pub min_width: usize,
    pub concurrency: Option<usize>,
    pub carry_extras: bool,
}
impl Default for PositionConfig {
    fn default() -> Self {
        Self { offset: 2, min_width: 2, concurrency: None, carry_extras: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentifierConfig {
    pub table: PathBuf,
    pub key_depth: usize,
}
impl Default for IdentifierConfig {
    fn default() -> Self {
        Self { table: PathBuf::from("sku2asin.csv"), key_depth: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    pub cap_bytes: u64,
    pub compression: Compression,
}
impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { cap_bytes: DEFAULT_CAP_BYTES, compression: Compression::default() }
    }
}

/// Complete, validated settings for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub images: ImageConfig,
    pub positions: PositionConfig,
    pub identifiers: IdentifierConfig,
    pub archive: ArchiveConfig,
}
impl Config {
    /// Loads configuration from every layer and validates it.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = Self::extract(Self::figment(Self::user_config_path().as_deref(), explicit)?)?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Where the user-level config file lives, if the platform has a
    /// config directory at all.
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "stockshot").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Builds the layered provider stack. Missing user and working-directory
    /// files are skipped; a missing explicit file is an error.
    pub fn figment(user: Option<&Path>, explicit: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(user) = user {
            figment = figment.merge(Toml::file(user));
        }
        figment = figment.merge(Toml::file(LOCAL_CONFIG_FILE));
        if let Some(path) = explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.to_path_buf()));
            }
            let extension = path.extension().and_then(|e| e.to_str()).map(str::to_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
                Some("json") => figment.merge(Json::file(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Extracts and validates a configuration from any provider stack.
    pub fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| ErrorKind::Load(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |field, reason| ErrorKind::Invalid { field, reason };
        if self.image_filter().extensions().next().is_none() {
            exn::bail!(invalid("images.extensions", "at least one extension is required"));
        }
        if self.archive.cap_bytes == 0 {
            exn::bail!(invalid("archive.cap_bytes", "must be greater than zero"));
        }
        if self.identifiers.key_depth == 0 {
            exn::bail!(invalid("identifiers.key_depth", "must be greater than zero"));
        }
        if self.positions.min_width == 0 {
            exn::bail!(invalid("positions.min_width", "must be greater than zero"));
        }
        if self.positions.concurrency == Some(0) {
            exn::bail!(invalid("positions.concurrency", "must be greater than zero"));
        }
        if self.output.directory.as_os_str().is_empty() {
            exn::bail!(invalid("output.directory", "must not be empty"));
        }
        Ok(())
    }

    /// The image eligibility filter described by `images.*`.
    pub fn image_filter(&self) -> ImageFilter {
        let filter = ImageFilter::new(&self.images.extensions, self.images.include_hidden);
        match self.images.gif {
            true => filter.with_gif(),
            false => filter,
        }
    }
}
