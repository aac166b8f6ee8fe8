//! 音频基础模块
//!
//! 包含：
//! - Format: 流格式与 ASBD
//! - Timing: Mach 时间相关函数
//! - Stats: IO 周期统计

pub mod format;
pub mod stats;
pub mod timing;

pub use format::AudioFormat;
pub use stats::{IoStats, IoStatsReport};
