//! 属性模型
//!
//! 每个对象类别对应一张 selector 表（`PropertyEntry`），
//! Has / IsSettable / GetSize / Get / Set 五个操作都从同一张表分派：
//! - `size`：缺省时为值类型的固定大小
//! - `get`：生成完整的值，列表截断由分派层统一处理
//! - `set`：存在即可写

use std::mem::size_of;

use super::constants::*;
use super::error::{DriverError, Result};
use super::object::AudioObjectNode;
use super::state::DriverState;
use crate::audio::format::{
    AudioFormat, AudioStreamBasicDescription, AudioStreamRangedDescription, AudioValueRange,
};
use crate::config::DriverConfig;

/// 与 CoreAudio `AudioObjectPropertyAddress` 二进制兼容
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PropertyAddress {
    pub selector: AudioObjectPropertySelector,
    pub scope: AudioObjectPropertyScope,
    pub element: AudioObjectPropertyElement,
}

impl PropertyAddress {
    pub const fn new(
        selector: AudioObjectPropertySelector,
        scope: AudioObjectPropertyScope,
        element: AudioObjectPropertyElement,
    ) -> Self {
        Self {
            selector,
            scope,
            element,
        }
    }

    /// (selector, Global, Main)
    pub const fn global(selector: AudioObjectPropertySelector) -> Self {
        Self::new(
            selector,
            K_AUDIO_OBJECT_PROPERTY_SCOPE_GLOBAL,
            K_AUDIO_OBJECT_PROPERTY_ELEMENT_MAIN,
        )
    }
}

impl std::fmt::Display for PropertyAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            fourcc_to_string(self.selector),
            fourcc_to_string(self.scope),
            self.element
        )
    }
}

/// 属性值的线上类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// UInt32 / class ID / object ID / 布尔
    U32,
    F32,
    F64,
    /// CFStringRef（指针大小）
    String,
    /// AudioObjectID 数组
    ObjectList,
    /// 两个 UInt32（立体声首选声道）
    ChannelPair,
    ValueRange,
    /// AudioValueRange 数组
    RangeList,
    Format,
    /// AudioStreamRangedDescription 数组
    FormatList,
}

impl ValueKind {
    /// 单个元素的字节数
    pub const fn element_size(self) -> u32 {
        match self {
            Self::U32 | Self::F32 | Self::ObjectList => 4,
            Self::F64 | Self::ChannelPair => 8,
            Self::String => size_of::<usize>() as u32,
            Self::ValueRange | Self::RangeList => size_of::<AudioValueRange>() as u32,
            Self::Format => size_of::<AudioStreamBasicDescription>() as u32,
            Self::FormatList => size_of::<AudioStreamRangedDescription>() as u32,
        }
    }

    /// 变长列表：允许调用方只取前 N 项
    pub const fn is_list(self) -> bool {
        matches!(self, Self::ObjectList | Self::RangeList | Self::FormatList)
    }
}

/// 属性值
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    U32(u32),
    F32(f32),
    F64(f64),
    String(String),
    ObjectList(Vec<AudioObjectID>),
    ChannelPair([u32; 2]),
    ValueRange(AudioValueRange),
    RangeList(Vec<AudioValueRange>),
    Format(AudioStreamBasicDescription),
    FormatList(Vec<AudioStreamRangedDescription>),
}

impl PropertyValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::U32(_) => ValueKind::U32,
            Self::F32(_) => ValueKind::F32,
            Self::F64(_) => ValueKind::F64,
            Self::String(_) => ValueKind::String,
            Self::ObjectList(_) => ValueKind::ObjectList,
            Self::ChannelPair(_) => ValueKind::ChannelPair,
            Self::ValueRange(_) => ValueKind::ValueRange,
            Self::RangeList(_) => ValueKind::RangeList,
            Self::Format(_) => ValueKind::Format,
            Self::FormatList(_) => ValueKind::FormatList,
        }
    }

    /// 元素个数（标量为 1）
    pub fn len(&self) -> usize {
        match self {
            Self::ObjectList(v) => v.len(),
            Self::RangeList(v) => v.len(),
            Self::FormatList(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 写入调用方缓冲区时占用的字节数
    pub fn byte_size(&self) -> u32 {
        self.len() as u32 * self.kind().element_size()
    }

    /// 列表只保留前 `max_items` 项；标量不变
    pub fn truncate(&mut self, max_items: usize) {
        match self {
            Self::ObjectList(v) => v.truncate(max_items),
            Self::RangeList(v) => v.truncate(max_items),
            Self::FormatList(v) => v.truncate(max_items),
            _ => {}
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_objects(&self) -> Option<&[AudioObjectID]> {
        match self {
            Self::ObjectList(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::U32(value as u32)
    }
}

/// 限定符（qualifier）
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyQualifier {
    /// TranslateUIDTo* 的 UID 字符串
    Uid(String),
    /// Convert* 属性的输入值（原地转换）
    Float(f32),
}

/// 属性访问上下文
pub struct PropertyContext<'a> {
    pub node: &'static AudioObjectNode,
    pub address: PropertyAddress,
    pub qualifier: Option<&'a PropertyQualifier>,
    pub config: &'a DriverConfig,
    pub state: &'a DriverState,
}

impl PropertyContext<'_> {
    /// 当前流格式（采样率来自运行时状态）
    pub fn format(&self) -> AudioFormat {
        self.config.format().with_sample_rate(self.state.lock().sample_rate)
    }

    pub fn uid_qualifier(&self) -> Result<&str> {
        match self.qualifier {
            Some(PropertyQualifier::Uid(uid)) => Ok(uid),
            _ => Err(DriverError::BadPropertySize {
                expected: ValueKind::String.element_size(),
                actual: 0,
            }),
        }
    }

    pub fn float_qualifier(&self) -> Result<f32> {
        match self.qualifier {
            Some(PropertyQualifier::Float(v)) => Ok(*v),
            _ => Err(DriverError::BadPropertySize {
                expected: ValueKind::F32.element_size(),
                actual: 0,
            }),
        }
    }
}

pub type SizeFn = fn(&PropertyContext<'_>) -> u32;
pub type GetFn = fn(&PropertyContext<'_>) -> Result<PropertyValue>;
pub type SetFn = fn(&PropertyContext<'_>, PropertyValue) -> Result<Vec<PropertyAddress>>;

/// 属性表中的一项
#[derive(Clone, Copy)]
pub struct PropertyEntry {
    pub selector: AudioObjectPropertySelector,
    pub kind: ValueKind,
    pub size: Option<SizeFn>,
    pub get: GetFn,
    pub set: Option<SetFn>,
}

impl PropertyEntry {
    /// 只读、固定大小
    pub const fn read(selector: AudioObjectPropertySelector, kind: ValueKind, get: GetFn) -> Self {
        Self {
            selector,
            kind,
            size: None,
            get,
            set: None,
        }
    }

    /// 变长属性的最大大小
    pub const fn sized(self, size: SizeFn) -> Self {
        Self {
            size: Some(size),
            ..self
        }
    }

    pub const fn settable(self, set: SetFn) -> Self {
        Self {
            set: Some(set),
            ..self
        }
    }

    #[inline]
    pub fn is_settable(&self) -> bool {
        self.set.is_some()
    }

    /// GetPropertyDataSize 的结果
    pub fn data_size(&self, cx: &PropertyContext<'_>) -> u32 {
        match self.size {
            Some(size) => size(cx),
            None => self.kind.element_size(),
        }
    }
}

/// 取出 u32，类型不符视为大小错误
pub fn expect_u32(value: &PropertyValue) -> Result<u32> {
    value.as_u32().ok_or(DriverError::BadPropertySize {
        expected: ValueKind::U32.element_size(),
        actual: value.byte_size(),
    })
}

pub fn expect_f32(value: &PropertyValue) -> Result<f32> {
    value.as_f32().ok_or(DriverError::BadPropertySize {
        expected: ValueKind::F32.element_size(),
        actual: value.byte_size(),
    })
}
