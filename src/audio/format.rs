//! 流格式描述
//!
//! 虚拟设备只暴露一种固定布局：线性 PCM、交织、packed、双声道。
//! - 32-bit: float 样本
//! - 16-bit: 有符号整数样本
//!
//! 采样率在 `SUPPORTED_SAMPLE_RATES` 中选择，运行时不做协商。

use crate::driver::constants::{
    K_AUDIO_FORMAT_FLAG_IS_FLOAT, K_AUDIO_FORMAT_FLAG_IS_PACKED,
    K_AUDIO_FORMAT_FLAG_IS_SIGNED_INTEGER, K_AUDIO_FORMAT_LINEAR_PCM,
};

/// 支持的标称采样率（规范顺序）
pub const SUPPORTED_SAMPLE_RATES: [u32; 6] = [44_100, 48_000, 88_200, 96_000, 176_400, 192_000];

/// 默认声道数
pub const DEFAULT_CHANNELS: u16 = 2;

/// 与 CoreAudio `AudioStreamBasicDescription` 二进制兼容
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioStreamBasicDescription {
    pub sample_rate: f64,
    pub format_id: u32,
    pub format_flags: u32,
    pub bytes_per_packet: u32,
    pub frames_per_packet: u32,
    pub bytes_per_frame: u32,
    pub channels_per_frame: u32,
    pub bits_per_channel: u32,
    pub reserved: u32,
}

/// 与 CoreAudio `AudioValueRange` 二进制兼容
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioValueRange {
    pub minimum: f64,
    pub maximum: f64,
}

impl AudioValueRange {
    /// 离散值：min == max
    #[inline]
    pub fn discrete(value: f64) -> Self {
        Self {
            minimum: value,
            maximum: value,
        }
    }
}

/// 与 CoreAudio `AudioStreamRangedDescription` 二进制兼容
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AudioStreamRangedDescription {
    pub format: AudioStreamBasicDescription,
    pub sample_rate_range: AudioValueRange,
}

/// 是否为支持的标称采样率
#[inline]
pub fn is_supported_rate(rate: u32) -> bool {
    SUPPORTED_SAMPLE_RATES.contains(&rate)
}

/// 可用采样率列表（每项 min == max）
pub fn available_sample_rates() -> Vec<AudioValueRange> {
    SUPPORTED_SAMPLE_RATES
        .iter()
        .map(|&rate| AudioValueRange::discrete(rate as f64))
        .collect()
}

/// 音频格式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_channel: u16,
}

impl AudioFormat {
    /// 创建新的音频格式
    pub fn new(sample_rate: u32, channels: u16, bits_per_channel: u16) -> Self {
        Self {
            sample_rate,
            channels,
            bits_per_channel,
        }
    }

    /// 相同布局，不同采样率
    #[inline]
    pub fn with_sample_rate(&self, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..*self
        }
    }

    /// 每声道的字节数
    #[inline]
    pub fn bytes_per_channel(&self) -> usize {
        self.bits_per_channel as usize / 8
    }

    /// 每帧的字节数
    #[inline]
    pub fn bytes_per_frame(&self) -> usize {
        self.bytes_per_channel() * self.channels as usize
    }

    /// 是否为 float 样本
    #[inline]
    pub fn is_float(&self) -> bool {
        self.bits_per_channel == 32
    }

    /// ASBD 的 format flags
    pub fn format_flags(&self) -> u32 {
        if self.is_float() {
            K_AUDIO_FORMAT_FLAG_IS_FLOAT | K_AUDIO_FORMAT_FLAG_IS_PACKED
        } else {
            K_AUDIO_FORMAT_FLAG_IS_SIGNED_INTEGER | K_AUDIO_FORMAT_FLAG_IS_PACKED
        }
    }

    /// 转换为 ASBD
    pub fn to_asbd(&self) -> AudioStreamBasicDescription {
        let bytes_per_frame = self.bytes_per_frame() as u32;
        AudioStreamBasicDescription {
            sample_rate: self.sample_rate as f64,
            format_id: K_AUDIO_FORMAT_LINEAR_PCM,
            format_flags: self.format_flags(),
            bytes_per_packet: bytes_per_frame,
            frames_per_packet: 1,
            bytes_per_frame,
            channels_per_frame: self.channels as u32,
            bits_per_channel: self.bits_per_channel as u32,
            reserved: 0,
        }
    }

    /// 每个支持采样率对应一项的 ranged 描述
    pub fn available_formats(&self) -> Vec<AudioStreamRangedDescription> {
        SUPPORTED_SAMPLE_RATES
            .iter()
            .map(|&rate| AudioStreamRangedDescription {
                format: self.with_sample_rate(rate).to_asbd(),
                sample_rate_range: AudioValueRange::discrete(rate as f64),
            })
            .collect()
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self::new(48_000, DEFAULT_CHANNELS, 32)
    }
}

impl std::fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}Hz/{}bit/{}ch {}",
            self.sample_rate,
            self.bits_per_channel,
            self.channels,
            if self.is_float() { "float" } else { "int" }
        )
    }
}
