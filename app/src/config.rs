use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use wordswap_render::{OutputFormat, RenderOptions};

/// 未指定 `--config` 时使用的配置文件
pub const DEFAULT_CONFIG_FILE: &str = "wordswap.json";

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    // ============ 词库 ============
    /// 默认词库路径（.json 词库或 .csv 表格）
    pub dictionary_path: Option<String>,
    /// 词条数上限
    pub max_terms: usize,

    // ============ 处理 ============
    /// 文本字符数上限，超出时拒绝处理
    pub max_text_chars: usize,
    /// 没有任何替换时是否视为失败
    pub strict: bool,

    // ============ 输出 ============
    pub output_format: OutputFormat,
    pub render: RenderOptions,

    /// 日志级别（RUST_LOG 优先）
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            dictionary_path: None,
            max_terms: 100_000,
            max_text_chars: 2_000_000,
            strict: false,
            output_format: OutputFormat::default(),
            render: RenderOptions::default(),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// 读取配置，文件不存在时返回默认值
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let raw = serde_json::to_string_pretty(config)?;
    fs::write(path, raw)?;
    Ok(())
}

/// 写出默认配置，不读取已有文件（用于修复损坏的配置）
pub fn init_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = AppConfig::default();
    save_config(path, &config)?;
    Ok(config)
}
