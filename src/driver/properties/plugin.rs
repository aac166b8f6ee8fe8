//! PlugIn 对象属性

use super::{manufacturer, object_list_size, property_table, BOX_UID, DEVICE_UID};
use crate::driver::constants::*;
use crate::driver::error::Result;
use crate::driver::object::{K_OBJECT_ID_BOX, K_OBJECT_ID_DEVICE};
use crate::driver::property::{PropertyContext, PropertyEntry, PropertyValue, ValueKind};

pub(super) static PROPERTIES: &[PropertyEntry] = property_table![
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_MANUFACTURER, ValueKind::String, manufacturer),
    PropertyEntry::read(K_AUDIO_PLUG_IN_PROPERTY_BOX_LIST, ValueKind::ObjectList, |_| {
        Ok(PropertyValue::ObjectList(vec![K_OBJECT_ID_BOX]))
    })
    .sized(|_| object_list_size(1)),
    PropertyEntry::read(
        K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_BOX,
        ValueKind::U32,
        translate_uid_to_box
    ),
    PropertyEntry::read(K_AUDIO_PLUG_IN_PROPERTY_DEVICE_LIST, ValueKind::ObjectList, |_| {
        Ok(PropertyValue::ObjectList(vec![K_OBJECT_ID_DEVICE]))
    })
    .sized(|_| object_list_size(1)),
    PropertyEntry::read(
        K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_DEVICE,
        ValueKind::U32,
        translate_uid_to_device
    ),
    PropertyEntry::read(K_AUDIO_PLUG_IN_PROPERTY_RESOURCE_BUNDLE, ValueKind::String, |_| {
        Ok(PropertyValue::String(String::new()))
    }),
];

/// UID 不匹配时返回 kAudioObjectUnknown，不报错
fn translate_uid_to_box(cx: &PropertyContext<'_>) -> Result<PropertyValue> {
    let uid = cx.uid_qualifier()?;
    Ok(PropertyValue::U32(if uid == BOX_UID {
        K_OBJECT_ID_BOX
    } else {
        K_AUDIO_OBJECT_UNKNOWN
    }))
}

fn translate_uid_to_device(cx: &PropertyContext<'_>) -> Result<PropertyValue> {
    let uid = cx.uid_qualifier()?;
    Ok(PropertyValue::U32(if uid == DEVICE_UID {
        K_OBJECT_ID_DEVICE
    } else {
        K_AUDIO_OBJECT_UNKNOWN
    }))
}

#[cfg(test)]
mod tests {
    use crate::config::DriverConfig;
    use crate::driver::constants::*;
    use crate::driver::error::DriverError;
    use crate::driver::object::*;
    use crate::driver::property::{PropertyAddress, PropertyQualifier, PropertyValue};
    use crate::driver::Driver;

    fn get(driver: &Driver, selector: u32, qualifier: Option<&PropertyQualifier>) -> PropertyValue {
        driver
            .get_property_data(
                K_OBJECT_ID_PLUG_IN,
                &PropertyAddress::global(selector),
                qualifier,
                64,
            )
            .unwrap()
    }

    #[test]
    fn test_identity() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(
            get(&driver, K_AUDIO_OBJECT_PROPERTY_CLASS, None),
            PropertyValue::U32(K_AUDIO_PLUG_IN_CLASS_ID)
        );
        assert_eq!(
            get(&driver, K_AUDIO_OBJECT_PROPERTY_BASE_CLASS, None),
            PropertyValue::U32(K_AUDIO_OBJECT_CLASS_ID)
        );
        assert_eq!(
            get(&driver, K_AUDIO_OBJECT_PROPERTY_OWNER, None),
            PropertyValue::U32(K_AUDIO_OBJECT_UNKNOWN)
        );
        assert_eq!(
            get(&driver, K_AUDIO_OBJECT_PROPERTY_MANUFACTURER, None).as_str(),
            Some("Vocana Inc.")
        );
    }

    #[test]
    fn test_lists() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(
            get(&driver, K_AUDIO_PLUG_IN_PROPERTY_BOX_LIST, None).as_objects(),
            Some(&[K_OBJECT_ID_BOX][..])
        );
        assert_eq!(
            get(&driver, K_AUDIO_PLUG_IN_PROPERTY_DEVICE_LIST, None).as_objects(),
            Some(&[K_OBJECT_ID_DEVICE][..])
        );
    }

    #[test]
    fn test_translate_uid() {
        let driver = Driver::new(DriverConfig::default());
        let known = PropertyQualifier::Uid("Vocana_UID".to_string());
        let unknown = PropertyQualifier::Uid("Other_UID".to_string());

        assert_eq!(
            get(&driver, K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_BOX, Some(&known)),
            PropertyValue::U32(K_OBJECT_ID_BOX)
        );
        assert_eq!(
            get(&driver, K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_DEVICE, Some(&known)),
            PropertyValue::U32(K_OBJECT_ID_DEVICE)
        );
        assert_eq!(
            get(&driver, K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_DEVICE, Some(&unknown)),
            PropertyValue::U32(K_AUDIO_OBJECT_UNKNOWN)
        );
    }

    #[test]
    fn test_translate_requires_qualifier() {
        let driver = Driver::new(DriverConfig::default());
        let result = driver.get_property_data(
            K_OBJECT_ID_PLUG_IN,
            &PropertyAddress::global(K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_BOX),
            None,
            4,
        );
        assert!(matches!(result, Err(DriverError::BadPropertySize { .. })));
    }
}
