use std::path::{Path, PathBuf};

use ::config::{Config as Settings, Environment, File, FileFormat};

use crate::model::Config;
use crate::validation::ValidationErrors;

/// 环境变量覆盖前缀，例如 `TINYMONITOR__ALERTS__NTFY__TOPIC_URL`
pub const ENV_PREFIX: &str = "TINYMONITOR";
const ENV_SEPARATOR: &str = "__";

/// 配置加载错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("error loading config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ::config::ConfigError,
    },

    #[error("failed to apply environment overrides: {0}")]
    Environment(#[source] ::config::ConfigError),

    #[error("{0}")]
    Invalid(#[from] ValidationErrors),
}

/// 加载结果，`source` 为 `None` 表示没有找到配置文件、使用内置默认值
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    pub source: Option<PathBuf>,
}

/// 默认查找顺序：当前目录、用户配置目录、系统配置目录
pub fn search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(3);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    paths.push(cwd.join("config.toml"));

    if let Some(home) = std::env::var_os("HOME") {
        paths.push(
            PathBuf::from(home)
                .join(".config")
                .join("tinymonitor")
                .join("config.toml"),
        );
    }

    paths.push(PathBuf::from("/etc/tinymonitor/config.toml"));
    paths
}

impl Config {
    /// 加载并校验配置
    ///
    /// 指定路径时只读取该文件，不存在即报错；否则按 [`search_paths`] 依次查找，
    /// 全部不存在时使用默认值。
    pub fn load(explicit: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        Self::load_from(explicit, &search_paths())
    }

    pub fn load_from(explicit: Option<&Path>, candidates: &[PathBuf]) -> Result<LoadedConfig, ConfigError> {
        let loaded = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                LoadedConfig {
                    config: Self::from_file(path)?,
                    source: Some(path.to_path_buf()),
                }
            }
            None => match candidates.iter().find(|path| path.is_file()) {
                Some(path) => LoadedConfig {
                    config: Self::from_file(path)?,
                    source: Some(path.clone()),
                },
                None => LoadedConfig {
                    config: Self::from_env()?,
                    source: None,
                },
            },
        };

        loaded.config.validate()?;
        Ok(loaded)
    }

    /// 读取单个文件（叠加默认值和环境变量），不做校验
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        Settings::builder()
            .add_source(File::from(path).format(FileFormat::Toml))
            .add_source(environment())
            .build()
            .and_then(|settings| settings.try_deserialize::<Self>())
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    /// 只有默认值和环境变量
    fn from_env() -> Result<Self, ConfigError> {
        Settings::builder()
            .add_source(environment())
            .build()
            .and_then(|settings| settings.try_deserialize::<Self>())
            .map_err(ConfigError::Environment)
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator(ENV_SEPARATOR)
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}
