//! Box 对象属性
//!
//! 可写：Name / Identify / Acquired，每次写入报告一个变化地址

use super::{
    manufacturer, object_list_size, property_table, BOX_UID, FIRMWARE_VERSION, MODEL_NAME,
};
use crate::driver::constants::*;
use crate::driver::error::{DriverError, Result};
use crate::driver::object::K_OBJECT_ID_DEVICE;
use crate::driver::property::{
    expect_u32, PropertyAddress, PropertyContext, PropertyEntry, PropertyValue, ValueKind,
};

const SERIAL_NUMBER: &str = "vocana-001";

pub(super) static PROPERTIES: &[PropertyEntry] = property_table![
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_NAME, ValueKind::String, |cx| {
        Ok(PropertyValue::String(cx.state.lock().box_name.clone()))
    })
    .settable(set_name),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_MODEL_NAME, ValueKind::String, |_| {
        Ok(PropertyValue::String(MODEL_NAME.to_string()))
    }),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_MANUFACTURER, ValueKind::String, manufacturer),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_IDENTIFY, ValueKind::U32, |cx| {
        Ok(PropertyValue::U32(cx.state.lock().box_identify))
    })
    .settable(set_identify),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_SERIAL_NUMBER, ValueKind::String, |_| {
        Ok(PropertyValue::String(SERIAL_NUMBER.to_string()))
    }),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_FIRMWARE_VERSION, ValueKind::String, |_| {
        Ok(PropertyValue::String(FIRMWARE_VERSION.to_string()))
    }),
    PropertyEntry::read(K_AUDIO_BOX_PROPERTY_BOX_UID, ValueKind::String, |_| {
        Ok(PropertyValue::String(BOX_UID.to_string()))
    }),
    PropertyEntry::read(K_AUDIO_BOX_PROPERTY_TRANSPORT_TYPE, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(K_AUDIO_DEVICE_TRANSPORT_TYPE_VIRTUAL))
    }),
    PropertyEntry::read(K_AUDIO_BOX_PROPERTY_HAS_AUDIO, ValueKind::U32, |_| Ok(true.into())),
    PropertyEntry::read(K_AUDIO_BOX_PROPERTY_HAS_VIDEO, ValueKind::U32, |_| Ok(false.into())),
    PropertyEntry::read(K_AUDIO_BOX_PROPERTY_HAS_MIDI, ValueKind::U32, |_| Ok(false.into())),
    PropertyEntry::read(K_AUDIO_BOX_PROPERTY_IS_PROTECTED, ValueKind::U32, |_| Ok(false.into())),
    PropertyEntry::read(K_AUDIO_BOX_PROPERTY_ACQUIRED, ValueKind::U32, |cx| {
        Ok(cx.state.lock().box_acquired.into())
    })
    .settable(set_acquired),
    PropertyEntry::read(K_AUDIO_BOX_PROPERTY_ACQUISITION_FAILED, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(0))
    }),
    PropertyEntry::read(K_AUDIO_BOX_PROPERTY_DEVICE_LIST, ValueKind::ObjectList, |_| {
        Ok(PropertyValue::ObjectList(vec![K_OBJECT_ID_DEVICE]))
    })
    .sized(|_| object_list_size(1)),
];

fn set_name(cx: &PropertyContext<'_>, value: PropertyValue) -> Result<Vec<PropertyAddress>> {
    let PropertyValue::String(name) = value else {
        return Err(DriverError::IllegalOperation("box name must be a string"));
    };
    log::info!("Box renamed to {:?}", name);
    cx.state.lock().box_name = name;
    Ok(vec![PropertyAddress::global(K_AUDIO_OBJECT_PROPERTY_NAME)])
}

fn set_identify(cx: &PropertyContext<'_>, value: PropertyValue) -> Result<Vec<PropertyAddress>> {
    let identify = expect_u32(&value)?;
    cx.state.lock().box_identify = identify;
    Ok(vec![PropertyAddress::global(K_AUDIO_OBJECT_PROPERTY_IDENTIFY)])
}

fn set_acquired(cx: &PropertyContext<'_>, value: PropertyValue) -> Result<Vec<PropertyAddress>> {
    let acquired = expect_u32(&value)? != 0;
    cx.state.lock().box_acquired = acquired;
    log::info!("Box {}", if acquired { "acquired" } else { "released" });
    Ok(vec![PropertyAddress::global(K_AUDIO_BOX_PROPERTY_ACQUIRED)])
}

#[cfg(test)]
mod tests {
    use crate::config::DriverConfig;
    use crate::driver::constants::*;
    use crate::driver::object::*;
    use crate::driver::property::{PropertyAddress, PropertyValue};
    use crate::driver::Driver;

    fn get(driver: &Driver, selector: u32) -> PropertyValue {
        driver
            .get_property_data(K_OBJECT_ID_BOX, &PropertyAddress::global(selector), None, 64)
            .unwrap()
    }

    #[test]
    fn test_static_properties() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(
            get(&driver, K_AUDIO_OBJECT_PROPERTY_CLASS),
            PropertyValue::U32(K_AUDIO_BOX_CLASS_ID)
        );
        assert_eq!(
            get(&driver, K_AUDIO_OBJECT_PROPERTY_OWNER),
            PropertyValue::U32(K_OBJECT_ID_PLUG_IN)
        );
        assert_eq!(get(&driver, K_AUDIO_BOX_PROPERTY_BOX_UID).as_str(), Some("Vocana_UID"));
        assert_eq!(
            get(&driver, K_AUDIO_BOX_PROPERTY_TRANSPORT_TYPE),
            PropertyValue::U32(K_AUDIO_DEVICE_TRANSPORT_TYPE_VIRTUAL)
        );
        assert_eq!(get(&driver, K_AUDIO_BOX_PROPERTY_HAS_AUDIO), PropertyValue::U32(1));
        assert_eq!(get(&driver, K_AUDIO_BOX_PROPERTY_HAS_MIDI), PropertyValue::U32(0));
        assert_eq!(
            get(&driver, K_AUDIO_BOX_PROPERTY_DEVICE_LIST).as_objects(),
            Some(&[K_OBJECT_ID_DEVICE][..])
        );
        assert!(get(&driver, K_AUDIO_OBJECT_PROPERTY_OWNED_OBJECTS).is_empty());
    }

    #[test]
    fn test_default_name() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(get(&driver, K_AUDIO_OBJECT_PROPERTY_NAME).as_str(), Some("Vocana Box"));
    }

    #[test]
    fn test_acquired() {
        let driver = Driver::new(DriverConfig::default());
        let addr = PropertyAddress::global(K_AUDIO_BOX_PROPERTY_ACQUIRED);
        assert_eq!(get(&driver, K_AUDIO_BOX_PROPERTY_ACQUIRED), PropertyValue::U32(1));

        let changed = driver
            .set_property_data(K_OBJECT_ID_BOX, &addr, None, PropertyValue::U32(0))
            .unwrap();
        assert_eq!(changed, vec![addr]);
        assert_eq!(get(&driver, K_AUDIO_BOX_PROPERTY_ACQUIRED), PropertyValue::U32(0));
    }

    #[test]
    fn test_identify() {
        let driver = Driver::new(DriverConfig::default());
        let addr = PropertyAddress::global(K_AUDIO_OBJECT_PROPERTY_IDENTIFY);
        let changed = driver
            .set_property_data(K_OBJECT_ID_BOX, &addr, None, PropertyValue::U32(1))
            .unwrap();
        assert_eq!(changed.len(), 1);
        assert_eq!(get(&driver, K_AUDIO_OBJECT_PROPERTY_IDENTIFY), PropertyValue::U32(1));
    }
}
