//! 驱动配置
//!
//! 加载顺序：默认值 → TOML 文件 → 环境变量。
//! UID 是设备身份，HAL 会持久化它们，因此不可配置。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::format::{is_supported_rate, AudioFormat, DEFAULT_CHANNELS, SUPPORTED_SAMPLE_RATES};

/// 插件读取的配置文件位置
pub const DEFAULT_CONFIG_PATH: &str = "/Library/Application Support/Vocana/driver.toml";

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// 驱动配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    pub device_name: String,
    pub box_name: String,
    pub manufacturer: String,
    /// 标称采样率，必须在支持列表中
    pub sample_rate: u32,
    /// 16（整数）或 32（float）
    pub bits_per_channel: u16,
    /// DoIOOperation 接受的最大帧数
    pub max_frame_count: u32,
    /// 零时间戳周期（帧）
    pub zero_timestamp_period: u32,
    pub volume_min_db: f32,
    pub volume_max_db: f32,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            device_name: "Vocana".to_string(),
            box_name: "Vocana Box".to_string(),
            manufacturer: "Vocana Inc.".to_string(),
            sample_rate: 48_000,
            bits_per_channel: 32,
            max_frame_count: 4096,
            zero_timestamp_period: 16_384,
            volume_min_db: -64.0,
            volume_max_db: 0.0,
        }
    }
}

impl DriverConfig {
    pub fn default_path() -> PathBuf {
        PathBuf::from(DEFAULT_CONFIG_PATH)
    }

    /// 流格式布局
    pub fn format(&self) -> AudioFormat {
        AudioFormat::new(self.sample_rate, DEFAULT_CHANNELS, self.bits_per_channel)
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_supported_rate(self.sample_rate) {
            return Err(ConfigError::Invalid(format!(
                "sample_rate {} not in {:?}",
                self.sample_rate, SUPPORTED_SAMPLE_RATES
            )));
        }
        if self.bits_per_channel != 16 && self.bits_per_channel != 32 {
            return Err(ConfigError::Invalid(format!(
                "bits_per_channel must be 16 or 32, got {}",
                self.bits_per_channel
            )));
        }
        if self.max_frame_count == 0 {
            return Err(ConfigError::Invalid("max_frame_count must be > 0".into()));
        }
        if self.zero_timestamp_period == 0 {
            return Err(ConfigError::Invalid("zero_timestamp_period must be > 0".into()));
        }
        if !(self.volume_min_db < self.volume_max_db) {
            return Err(ConfigError::Invalid(format!(
                "volume range [{}, {}] dB is empty",
                self.volume_min_db, self.volume_max_db
            )));
        }
        if self.device_name.is_empty() || self.box_name.is_empty() {
            return Err(ConfigError::Invalid("names must not be empty".into()));
        }
        Ok(())
    }

    /// 应用环境变量覆盖
    ///
    /// `lookup` 通常是 `std::env::var(..).ok()`，测试中可替换
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(rate) = lookup("VOCANA_SAMPLE_RATE") {
            self.sample_rate = rate
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("VOCANA_SAMPLE_RATE={}", rate)))?;
        }
        if let Some(bits) = lookup("VOCANA_BITS_PER_CHANNEL") {
            self.bits_per_channel = bits
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("VOCANA_BITS_PER_CHANNEL={}", bits)))?;
        }
        Ok(())
    }
}

/// 从文件加载配置，缺失的字段使用默认值
///
/// `path` 为 None 时使用 `DEFAULT_CONFIG_PATH`；文件不存在时返回默认配置
pub fn load_config(path: Option<&Path>) -> Result<DriverConfig, ConfigError> {
    let path = path.map(PathBuf::from).unwrap_or_else(DriverConfig::default_path);

    let mut config = if path.exists() {
        log::debug!("Loading config from {:?}", path);
        let contents = std::fs::read_to_string(&path)?;
        toml::from_str(&contents)?
    } else {
        log::debug!("Config file not found at {:?}, using defaults", path);
        DriverConfig::default()
    };

    config.apply_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// 插件加载时使用：出错时记录日志并回退到默认配置
pub fn load_or_default() -> DriverConfig {
    match load_config(None) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("{}; falling back to default config", e);
            DriverConfig::default()
        }
    }
}
