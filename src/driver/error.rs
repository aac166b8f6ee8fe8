//! 驱动错误类型
//!
//! 所有错误最终都以 OSStatus 形式同步返回给 HAL，不做内部重试

use thiserror::Error;

use super::constants::*;

/// 驱动操作错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    /// 驱动引用或对象 ID 不匹配，或实时缓冲区参数非法
    #[error("bad object: {0}")]
    BadObject(AudioObjectID),

    /// 必需的输出指针为空等非法调用
    #[error("illegal operation: {0}")]
    IllegalOperation(&'static str),

    #[error("unknown property {} on object {object}", fourcc_to_string(*.selector))]
    UnknownProperty {
        object: AudioObjectID,
        selector: AudioObjectPropertySelector,
    },

    #[error("bad property size: expected {expected} bytes, got {actual}")]
    BadPropertySize { expected: u32, actual: u32 },

    /// 本驱动不承担的职责（设备创建/销毁、配置变更）
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(&'static str),

    #[error("device is not running")]
    NotRunning,

    #[error("no such interface")]
    NoInterface,

    #[error("unspecified error: {0}")]
    Unspecified(&'static str),
}

impl DriverError {
    /// 转换为 HAL 状态码
    pub fn status(&self) -> OSStatus {
        match self {
            Self::BadObject(_) => K_AUDIO_HARDWARE_BAD_OBJECT_ERROR,
            Self::IllegalOperation(_) => K_AUDIO_HARDWARE_ILLEGAL_OPERATION_ERROR,
            Self::UnknownProperty { .. } => K_AUDIO_HARDWARE_UNKNOWN_PROPERTY_ERROR,
            Self::BadPropertySize { .. } => K_AUDIO_HARDWARE_BAD_PROPERTY_SIZE_ERROR,
            Self::UnsupportedOperation(_) => K_AUDIO_HARDWARE_UNSUPPORTED_OPERATION_ERROR,
            Self::NotRunning => K_AUDIO_HARDWARE_NOT_RUNNING_ERROR,
            Self::NoInterface => E_NOINTERFACE,
            Self::Unspecified(_) => K_AUDIO_HARDWARE_UNSPECIFIED_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, DriverError>;

/// 将操作结果折叠为状态码
#[inline]
pub fn status_of<T>(result: &Result<T>) -> OSStatus {
    match result {
        Ok(_) => K_AUDIO_HARDWARE_NO_ERROR,
        Err(e) => e.status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            DriverError::BadObject(42).status(),
            K_AUDIO_HARDWARE_BAD_OBJECT_ERROR
        );
        assert_eq!(
            DriverError::UnsupportedOperation("CreateDevice").status(),
            K_AUDIO_HARDWARE_UNSUPPORTED_OPERATION_ERROR
        );
        assert_eq!(DriverError::NoInterface.status(), E_NOINTERFACE);
        assert_eq!(status_of::<()>(&Ok(())), K_AUDIO_HARDWARE_NO_ERROR);
    }

    #[test]
    fn test_display() {
        let err = DriverError::UnknownProperty {
            object: 3,
            selector: K_AUDIO_DEVICE_PROPERTY_STREAMS,
        };
        assert_eq!(err.to_string(), "unknown property 'stm#' on object 3");

        let err = DriverError::BadPropertySize {
            expected: 8,
            actual: 4,
        };
        assert!(err.to_string().contains("expected 8"));
    }
}
