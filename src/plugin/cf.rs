//! 属性值与 HAL 原始内存之间的转换
//!
//! - 字符串属性以 CFStringRef 交给调用方，调用方负责 release（+1 引用）
//! - 调用方传入的 CFStringRef 只借用，不改变引用计数

use std::ffi::c_void;
use std::mem::{self, size_of};
use std::ptr;

use core_foundation::base::TCFType;
use core_foundation::string::{CFString, CFStringRef};

use crate::driver::constants::*;
use crate::driver::error::{DriverError, Result};
use crate::driver::properties::is_in_out_conversion;
use crate::driver::property::{PropertyQualifier, PropertyValue, ValueKind};

/// 借用调用方的 CFString
///
/// # Safety
/// `string` 为空或指向有效的 CFString
pub(super) unsafe fn string_from_ref(string: CFStringRef) -> Option<String> {
    if string.is_null() {
        return None;
    }
    Some(CFString::wrap_under_get_rule(string).to_string())
}

/// 创建 +1 引用的 CFString，所有权交给调用方
fn string_into_ref(value: &str) -> CFStringRef {
    let string = CFString::new(value);
    let raw = string.as_concrete_TypeRef();
    mem::forget(string);
    raw
}

/// 拷贝一个列表到调用方缓冲区
unsafe fn write_slice<T: Copy>(items: &[T], out: *mut c_void) {
    ptr::copy_nonoverlapping(items.as_ptr(), out as *mut T, items.len());
}

/// 将值写入调用方缓冲区，返回写入的字节数
///
/// # Safety
/// `out` 至少有 `value.byte_size()` 字节可写；分派层已保证不超过调用方给出的容量
pub(super) unsafe fn write_value(value: &PropertyValue, out: *mut c_void) -> u32 {
    match value {
        PropertyValue::U32(v) => (out as *mut u32).write_unaligned(*v),
        PropertyValue::F32(v) => (out as *mut f32).write_unaligned(*v),
        PropertyValue::F64(v) => (out as *mut f64).write_unaligned(*v),
        PropertyValue::String(s) => (out as *mut CFStringRef).write_unaligned(string_into_ref(s)),
        PropertyValue::ObjectList(ids) => write_slice(ids, out),
        PropertyValue::ChannelPair(pair) => write_slice(pair, out),
        PropertyValue::ValueRange(range) => write_slice(std::slice::from_ref(range), out),
        PropertyValue::RangeList(ranges) => write_slice(ranges, out),
        PropertyValue::Format(asbd) => write_slice(std::slice::from_ref(asbd), out),
        PropertyValue::FormatList(formats) => write_slice(formats, out),
    }
    value.byte_size()
}

/// 按可写属性的类型解码调用方数据，大小必须完全一致
///
/// # Safety
/// `data` 为空或至少有 `size` 字节可读
pub(super) unsafe fn read_value(kind: ValueKind, size: u32, data: *const c_void) -> Result<PropertyValue> {
    if data.is_null() {
        return Err(DriverError::IllegalOperation("null property data"));
    }
    let expected = kind.element_size();
    if kind.is_list() || size != expected {
        return Err(DriverError::BadPropertySize {
            expected,
            actual: size,
        });
    }

    match kind {
        ValueKind::U32 => Ok(PropertyValue::U32((data as *const u32).read_unaligned())),
        ValueKind::F32 => Ok(PropertyValue::F32((data as *const f32).read_unaligned())),
        ValueKind::F64 => Ok(PropertyValue::F64((data as *const f64).read_unaligned())),
        ValueKind::String => {
            let string = (data as *const CFStringRef).read_unaligned();
            string_from_ref(string)
                .map(PropertyValue::String)
                .ok_or(DriverError::IllegalOperation("null CFString"))
        }
        _ => Err(DriverError::UnsupportedOperation("property value kind")),
    }
}

/// 解码限定数据
///
/// - TranslateUIDTo*：限定数据是一个 CFStringRef
/// - Convert*：输入值在调用方的输出缓冲区中
///
/// # Safety
/// 指针为空或指向至少对应大小的内存
pub(super) unsafe fn read_qualifier(
    selector: AudioObjectPropertySelector,
    qualifier_size: u32,
    qualifier_data: *const c_void,
    io_data_size: u32,
    io_data: *const c_void,
) -> Option<PropertyQualifier> {
    if is_in_out_conversion(selector) {
        if io_data.is_null() || (io_data_size as usize) < size_of::<f32>() {
            return None;
        }
        return Some(PropertyQualifier::Float((io_data as *const f32).read_unaligned()));
    }

    let translates = selector == K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_BOX
        || selector == K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_DEVICE;
    if translates && !qualifier_data.is_null() && qualifier_size as usize == size_of::<CFStringRef>() {
        let string = (qualifier_data as *const CFStringRef).read_unaligned();
        return string_from_ref(string).map(PropertyQualifier::Uid);
    }
    None
}
