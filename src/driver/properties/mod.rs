//! 属性分派
//!
//! 外层入口先按对象 ID 找到节点（未知 ID → BadObject），
//! 再按对象类别取 selector 表（未知 selector → UnknownProperty）。

mod audio_box;
mod control;
mod device;
mod plugin;
mod stream;

pub use control::VolumeCurve;

use super::constants::*;
use super::error::{DriverError, Result};
use super::object::{self, AudioObjectNode, ControlKind, Direction, ObjectKind};
use super::property::{
    PropertyAddress, PropertyContext, PropertyEntry, PropertyQualifier, PropertyValue, ValueKind,
};
use super::Driver;

/// Box 和 Device 的 UID（HAL 会持久化，不能改）
pub const BOX_UID: &str = "Vocana_UID";
pub const DEVICE_UID: &str = "Vocana_UID";
pub const DEVICE_MODEL_UID: &str = "Vocana_ModelUID";
pub const MODEL_NAME: &str = "Vocana";
pub const FIRMWARE_VERSION: &str = "1.0.0";

/// 对象类别对应的属性表
pub fn table(kind: ObjectKind) -> &'static [PropertyEntry] {
    match kind {
        ObjectKind::PlugIn => plugin::PROPERTIES,
        ObjectKind::Box => audio_box::PROPERTIES,
        ObjectKind::Device => device::PROPERTIES,
        ObjectKind::Stream(_) => stream::PROPERTIES,
        ObjectKind::Control(ControlKind::Volume, _) => control::VOLUME_PROPERTIES,
        ObjectKind::Control(ControlKind::Mute, _) => control::MUTE_PROPERTIES,
    }
}

#[inline]
pub fn find(kind: ObjectKind, selector: AudioObjectPropertySelector) -> Option<&'static PropertyEntry> {
    table(kind).iter().find(|entry| entry.selector == selector)
}

/// Convert* 属性：输入值在调用方的数据缓冲区中（原地转换）
pub fn is_in_out_conversion(selector: AudioObjectPropertySelector) -> bool {
    selector == K_AUDIO_LEVEL_CONTROL_PROPERTY_CONVERT_SCALAR_TO_DECIBELS
        || selector == K_AUDIO_LEVEL_CONTROL_PROPERTY_CONVERT_DECIBELS_TO_SCALAR
}

// ============================================================================
// 各类对象共用的属性
// ============================================================================

fn base_class(cx: &PropertyContext<'_>) -> Result<PropertyValue> {
    Ok(PropertyValue::U32(cx.node.kind.base_class()))
}

fn class(cx: &PropertyContext<'_>) -> Result<PropertyValue> {
    Ok(PropertyValue::U32(cx.node.kind.class()))
}

fn owner(cx: &PropertyContext<'_>) -> Result<PropertyValue> {
    Ok(PropertyValue::U32(cx.node.owner))
}

fn manufacturer(cx: &PropertyContext<'_>) -> Result<PropertyValue> {
    Ok(PropertyValue::String(cx.config.manufacturer.clone()))
}

/// 子对象，流和控件按 scope 过滤
fn owned_ids(node: &AudioObjectNode, scope: AudioObjectPropertyScope) -> Vec<AudioObjectID> {
    object::children(node.id)
        .filter(|child| match child.kind.direction() {
            Some(dir) => dir.matches_scope(scope),
            None => true,
        })
        .map(|child| child.id)
        .collect()
}

fn owned_objects(cx: &PropertyContext<'_>) -> Result<PropertyValue> {
    Ok(PropertyValue::ObjectList(owned_ids(cx.node, cx.address.scope)))
}

fn owned_objects_size(cx: &PropertyContext<'_>) -> u32 {
    object_list_size(owned_ids(cx.node, cx.address.scope).len())
}

#[inline]
fn object_list_size(count: usize) -> u32 {
    count as u32 * ValueKind::ObjectList.element_size()
}

fn direction(cx: &PropertyContext<'_>) -> Result<Direction> {
    cx.node
        .kind
        .direction()
        .ok_or(DriverError::IllegalOperation("object has no direction"))
}

/// 属性表：自动带上所有对象都有的 BaseClass / Class / Owner / OwnedObjects
macro_rules! property_table {
    ($($entry:expr),* $(,)?) => {
        &[
            $crate::driver::property::PropertyEntry::read(
                $crate::driver::constants::K_AUDIO_OBJECT_PROPERTY_BASE_CLASS,
                $crate::driver::property::ValueKind::U32,
                $crate::driver::properties::base_class,
            ),
            $crate::driver::property::PropertyEntry::read(
                $crate::driver::constants::K_AUDIO_OBJECT_PROPERTY_CLASS,
                $crate::driver::property::ValueKind::U32,
                $crate::driver::properties::class,
            ),
            $crate::driver::property::PropertyEntry::read(
                $crate::driver::constants::K_AUDIO_OBJECT_PROPERTY_OWNER,
                $crate::driver::property::ValueKind::U32,
                $crate::driver::properties::owner,
            ),
            $crate::driver::property::PropertyEntry::read(
                $crate::driver::constants::K_AUDIO_OBJECT_PROPERTY_OWNED_OBJECTS,
                $crate::driver::property::ValueKind::ObjectList,
                $crate::driver::properties::owned_objects,
            )
            .sized($crate::driver::properties::owned_objects_size),
            $($entry),*
        ]
    };
}
pub(crate) use property_table;

// ============================================================================
// 分派入口
// ============================================================================

impl Driver {
    fn property_context<'a>(
        &'a self,
        node: &'static AudioObjectNode,
        address: &PropertyAddress,
        qualifier: Option<&'a PropertyQualifier>,
    ) -> PropertyContext<'a> {
        PropertyContext {
            node,
            address: *address,
            qualifier,
            config: &self.config,
            state: &self.state,
        }
    }

    fn resolve(
        &self,
        object: AudioObjectID,
        address: &PropertyAddress,
    ) -> Result<(&'static AudioObjectNode, &'static PropertyEntry)> {
        let node = object::lookup(object).ok_or(DriverError::BadObject(object))?;
        let entry = find(node.kind, address.selector).ok_or(DriverError::UnknownProperty {
            object,
            selector: address.selector,
        })?;
        Ok((node, entry))
    }

    /// HasProperty：未知对象返回 false，不报错
    pub fn has_property(&self, object: AudioObjectID, address: &PropertyAddress) -> bool {
        self.resolve(object, address).is_ok()
    }

    /// IsPropertySettable
    pub fn is_property_settable(
        &self,
        object: AudioObjectID,
        address: &PropertyAddress,
    ) -> Result<bool> {
        let (_, entry) = self.resolve(object, address)?;
        Ok(entry.is_settable())
    }

    /// 可写属性的值类型；只读属性报 UnknownProperty
    pub fn settable_kind(&self, object: AudioObjectID, address: &PropertyAddress) -> Result<ValueKind> {
        let (_, entry) = self.resolve(object, address)?;
        if !entry.is_settable() {
            return Err(DriverError::UnknownProperty {
                object,
                selector: address.selector,
            });
        }
        Ok(entry.kind)
    }

    /// GetPropertyDataSize：列表属性返回最大大小
    pub fn get_property_data_size(
        &self,
        object: AudioObjectID,
        address: &PropertyAddress,
        qualifier: Option<&PropertyQualifier>,
    ) -> Result<u32> {
        let (node, entry) = self.resolve(object, address)?;
        let cx = self.property_context(node, address, qualifier);
        Ok(entry.data_size(&cx))
    }

    /// GetPropertyData
    ///
    /// `capacity` 是调用方缓冲区的字节数。标量属性要求至少一个元素，
    /// 列表属性写入 `floor(capacity / element_size)` 项（不超过实际长度）。
    pub fn get_property_data(
        &self,
        object: AudioObjectID,
        address: &PropertyAddress,
        qualifier: Option<&PropertyQualifier>,
        capacity: u32,
    ) -> Result<PropertyValue> {
        let (node, entry) = self.resolve(object, address)?;
        let element_size = entry.kind.element_size();

        if !entry.kind.is_list() && capacity < element_size {
            return Err(DriverError::BadPropertySize {
                expected: element_size,
                actual: capacity,
            });
        }

        let cx = self.property_context(node, address, qualifier);
        let mut value = (entry.get)(&cx)?;
        if entry.kind.is_list() {
            value.truncate((capacity / element_size) as usize);
        }
        Ok(value)
    }

    /// SetPropertyData
    ///
    /// 成功后返回变化的地址列表，并在状态锁之外通知 host
    pub fn set_property_data(
        &self,
        object: AudioObjectID,
        address: &PropertyAddress,
        qualifier: Option<&PropertyQualifier>,
        value: PropertyValue,
    ) -> Result<Vec<PropertyAddress>> {
        let (node, entry) = self.resolve(object, address)?;
        let set = entry.set.ok_or(DriverError::UnknownProperty {
            object,
            selector: address.selector,
        })?;

        let cx = self.property_context(node, address, qualifier);
        let expected = entry.data_size(&cx);
        if value.kind() != entry.kind || value.byte_size() != expected {
            return Err(DriverError::BadPropertySize {
                expected,
                actual: value.byte_size(),
            });
        }

        let changed = set(&cx, value)?;
        log::debug!(
            "{} {} set, {} address(es) changed",
            node.kind.label(),
            address,
            changed.len()
        );

        if !changed.is_empty() {
            if let Some(host) = self.state.host() {
                host.properties_changed(object, &changed);
            }
        }
        Ok(changed)
    }

    /// 对象的全部属性（inspect 工具用）
    pub fn property_table(&self, object: AudioObjectID) -> Result<&'static [PropertyEntry]> {
        let node = object::lookup(object).ok_or(DriverError::BadObject(object))?;
        Ok(table(node.kind))
    }
}
