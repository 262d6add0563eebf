use crate::config::types::{ConfigError, ReplayConfig};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "rureplay.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ReplayConfig, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// 加载配置
    ///
    /// 显式指定路径时必须成功；否则按查找顺序加载，找不到则使用默认配置。
    pub fn load(explicit: Option<&Path>) -> Result<ReplayConfig, ConfigError> {
        match explicit {
            Some(path) => Self::load_from_path(path),
            None => Ok(Self::find_and_load().unwrap_or_default()),
        }
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/rureplay/
    pub fn find_and_load() -> Option<ReplayConfig> {
        let path = Self::find_in_ancestors().or_else(Self::find_in_user_dir)?;

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring config file: {}", e);
                None
            }
        }
    }

    fn find_in_ancestors() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::find_from(&current)
    }

    /// 从 `start` 开始向上查找配置文件
    pub fn find_from(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(Self::CONFIG_FILE))
            .find(|path| path.is_file())
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("rureplay").join(Self::CONFIG_FILE);
        config_path.is_file().then_some(config_path)
    }
}
