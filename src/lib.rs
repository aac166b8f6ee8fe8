//! Vocana HAL 插件
//!
//! macOS AudioServerPlugIn 虚拟音频设备：一个 Box、一个双向设备、
//! 每个方向一条立体声流及音量/静音控件。
//!
//! - `driver`: 平台无关的对象模型、属性分派与 IO 周期
//! - `plugin`: CoreAudio ABI 层（仅 macOS）
//!
//! 离线检查工具 `vocana-inspect` 直接驱动同一个 [`Driver`]。

pub mod audio;
pub mod config;
pub mod driver;

#[cfg(target_os = "macos")]
pub mod plugin;

pub use config::DriverConfig;
pub use driver::Driver;
