//! Device 对象属性
//!
//! 设备属性全部只读。标称采样率由配置决定，运行时不可更改。

use super::{
    manufacturer, object_list_size, property_table, DEVICE_MODEL_UID, DEVICE_UID,
    FIRMWARE_VERSION, MODEL_NAME,
};
use crate::audio::format::{available_sample_rates, SUPPORTED_SAMPLE_RATES};
use crate::driver::constants::*;
use crate::driver::object::{control_ids, stream_ids, K_OBJECT_ID_DEVICE};
use crate::driver::property::{PropertyEntry, PropertyValue, ValueKind};

const SERIAL_NUMBER: &str = "vocana-device-001";
const CONFIGURATION_APPLICATION: &str = "com.apple.audio.AudioMIDISetup";

pub(super) static PROPERTIES: &[PropertyEntry] = property_table![
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_NAME, ValueKind::String, |cx| {
        Ok(PropertyValue::String(cx.config.device_name.clone()))
    }),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_MODEL_NAME, ValueKind::String, |_| {
        Ok(PropertyValue::String(MODEL_NAME.to_string()))
    }),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_MANUFACTURER, ValueKind::String, manufacturer),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_IDENTIFY, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(0))
    }),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_SERIAL_NUMBER, ValueKind::String, |_| {
        Ok(PropertyValue::String(SERIAL_NUMBER.to_string()))
    }),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_FIRMWARE_VERSION, ValueKind::String, |_| {
        Ok(PropertyValue::String(FIRMWARE_VERSION.to_string()))
    }),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_DEVICE_UID, ValueKind::String, |_| {
        Ok(PropertyValue::String(DEVICE_UID.to_string()))
    }),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_MODEL_UID, ValueKind::String, |_| {
        Ok(PropertyValue::String(DEVICE_MODEL_UID.to_string()))
    }),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_TRANSPORT_TYPE, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(K_AUDIO_DEVICE_TRANSPORT_TYPE_VIRTUAL))
    }),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_RELATED_DEVICES, ValueKind::ObjectList, |_| {
        Ok(PropertyValue::ObjectList(vec![K_OBJECT_ID_DEVICE]))
    })
    .sized(|_| object_list_size(1)),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_CLOCK_DOMAIN, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(0))
    }),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_DEVICE_IS_ALIVE, ValueKind::U32, |_| {
        Ok(true.into())
    }),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_DEVICE_IS_RUNNING, ValueKind::U32, |cx| {
        Ok(cx.state.lock().is_running().into())
    }),
    PropertyEntry::read(
        K_AUDIO_DEVICE_PROPERTY_DEVICE_CAN_BE_DEFAULT_DEVICE,
        ValueKind::U32,
        |_| Ok(true.into())
    ),
    PropertyEntry::read(
        K_AUDIO_DEVICE_PROPERTY_DEVICE_CAN_BE_DEFAULT_SYSTEM_DEVICE,
        ValueKind::U32,
        |_| Ok(true.into())
    ),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_LATENCY, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(0))
    }),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_STREAMS, ValueKind::ObjectList, |cx| {
        Ok(PropertyValue::ObjectList(stream_ids(cx.address.scope)))
    })
    .sized(|cx| object_list_size(stream_ids(cx.address.scope).len())),
    PropertyEntry::read(K_AUDIO_OBJECT_PROPERTY_CONTROL_LIST, ValueKind::ObjectList, |cx| {
        Ok(PropertyValue::ObjectList(control_ids(cx.address.scope)))
    })
    .sized(|cx| object_list_size(control_ids(cx.address.scope).len())),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_SAFETY_OFFSET, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(0))
    }),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_NOMINAL_SAMPLE_RATE, ValueKind::F64, |cx| {
        Ok(PropertyValue::F64(cx.state.lock().sample_rate as f64))
    }),
    PropertyEntry::read(
        K_AUDIO_DEVICE_PROPERTY_AVAILABLE_NOMINAL_SAMPLE_RATES,
        ValueKind::RangeList,
        |_| Ok(PropertyValue::RangeList(available_sample_rates()))
    )
    .sized(|_| SUPPORTED_SAMPLE_RATES.len() as u32 * ValueKind::RangeList.element_size()),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_IS_HIDDEN, ValueKind::U32, |_| {
        Ok(false.into())
    }),
    PropertyEntry::read(K_AUDIO_DEVICE_PROPERTY_ZERO_TIME_STAMP_PERIOD, ValueKind::U32, |cx| {
        Ok(PropertyValue::U32(cx.config.zero_timestamp_period))
    }),
    PropertyEntry::read(
        K_AUDIO_DEVICE_PROPERTY_CONFIGURATION_APPLICATION,
        ValueKind::String,
        |_| Ok(PropertyValue::String(CONFIGURATION_APPLICATION.to_string()))
    ),
    PropertyEntry::read(
        K_AUDIO_DEVICE_PROPERTY_PREFERRED_CHANNELS_FOR_STEREO,
        ValueKind::ChannelPair,
        |_| Ok(PropertyValue::ChannelPair([1, 2]))
    ),
];

#[cfg(test)]
mod tests {
    use crate::config::DriverConfig;
    use crate::driver::constants::*;
    use crate::driver::object::*;
    use crate::driver::property::{PropertyAddress, PropertyValue};
    use crate::driver::Driver;

    fn get_scoped(driver: &Driver, selector: u32, scope: u32) -> PropertyValue {
        let addr = PropertyAddress::new(selector, scope, K_AUDIO_OBJECT_PROPERTY_ELEMENT_MAIN);
        let size = driver
            .get_property_data_size(K_OBJECT_ID_DEVICE, &addr, None)
            .unwrap();
        driver
            .get_property_data(K_OBJECT_ID_DEVICE, &addr, None, size)
            .unwrap()
    }

    fn get(driver: &Driver, selector: u32) -> PropertyValue {
        get_scoped(driver, selector, K_AUDIO_OBJECT_PROPERTY_SCOPE_GLOBAL)
    }

    #[test]
    fn test_identity() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(
            get(&driver, K_AUDIO_OBJECT_PROPERTY_CLASS),
            PropertyValue::U32(K_AUDIO_DEVICE_CLASS_ID)
        );
        assert_eq!(get(&driver, K_AUDIO_OBJECT_PROPERTY_NAME).as_str(), Some("Vocana"));
        assert_eq!(
            get(&driver, K_AUDIO_DEVICE_PROPERTY_DEVICE_UID).as_str(),
            Some("Vocana_UID")
        );
        assert_eq!(
            get(&driver, K_AUDIO_DEVICE_PROPERTY_MODEL_UID).as_str(),
            Some("Vocana_ModelUID")
        );
        assert_eq!(
            get(&driver, K_AUDIO_DEVICE_PROPERTY_DEVICE_CAN_BE_DEFAULT_SYSTEM_DEVICE),
            PropertyValue::U32(1)
        );
    }

    #[test]
    fn test_streams_by_scope() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(
            get(&driver, K_AUDIO_DEVICE_PROPERTY_STREAMS).as_objects(),
            Some(&[K_OBJECT_ID_STREAM_INPUT, K_OBJECT_ID_STREAM_OUTPUT][..])
        );
        assert_eq!(
            get_scoped(&driver, K_AUDIO_DEVICE_PROPERTY_STREAMS, K_AUDIO_OBJECT_PROPERTY_SCOPE_INPUT)
                .as_objects(),
            Some(&[K_OBJECT_ID_STREAM_INPUT][..])
        );
        assert_eq!(
            get_scoped(&driver, K_AUDIO_DEVICE_PROPERTY_STREAMS, K_AUDIO_OBJECT_PROPERTY_SCOPE_OUTPUT)
                .as_objects(),
            Some(&[K_OBJECT_ID_STREAM_OUTPUT][..])
        );
    }

    #[test]
    fn test_owned_objects_and_controls() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(get(&driver, K_AUDIO_OBJECT_PROPERTY_OWNED_OBJECTS).len(), 6);
        assert_eq!(
            get(&driver, K_AUDIO_OBJECT_PROPERTY_CONTROL_LIST).as_objects(),
            Some(
                &[
                    K_OBJECT_ID_VOLUME_INPUT,
                    K_OBJECT_ID_MUTE_INPUT,
                    K_OBJECT_ID_VOLUME_OUTPUT,
                    K_OBJECT_ID_MUTE_OUTPUT
                ][..]
            )
        );
        assert_eq!(
            get_scoped(
                &driver,
                K_AUDIO_OBJECT_PROPERTY_OWNED_OBJECTS,
                K_AUDIO_OBJECT_PROPERTY_SCOPE_INPUT
            )
            .as_objects(),
            Some(
                &[
                    K_OBJECT_ID_STREAM_INPUT,
                    K_OBJECT_ID_VOLUME_INPUT,
                    K_OBJECT_ID_MUTE_INPUT
                ][..]
            )
        );
    }

    #[test]
    fn test_sample_rates() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(
            get(&driver, K_AUDIO_DEVICE_PROPERTY_NOMINAL_SAMPLE_RATE),
            PropertyValue::F64(48_000.0)
        );

        let PropertyValue::RangeList(ranges) =
            get(&driver, K_AUDIO_DEVICE_PROPERTY_AVAILABLE_NOMINAL_SAMPLE_RATES)
        else {
            panic!("expected a range list");
        };
        assert_eq!(ranges.len(), 6);
        assert!(ranges.iter().all(|r| r.minimum == r.maximum));
    }

    #[test]
    fn test_configured_rate() {
        let config = DriverConfig {
            sample_rate: 96_000,
            ..DriverConfig::default()
        };
        let driver = Driver::new(config);
        assert_eq!(
            get(&driver, K_AUDIO_DEVICE_PROPERTY_NOMINAL_SAMPLE_RATE),
            PropertyValue::F64(96_000.0)
        );
    }

    #[test]
    fn test_is_running_tracks_io() {
        let driver = Driver::new(DriverConfig::default());
        driver.initialize(None).unwrap();
        assert_eq!(get(&driver, K_AUDIO_DEVICE_PROPERTY_DEVICE_IS_RUNNING), PropertyValue::U32(0));
        driver.start_io(K_OBJECT_ID_DEVICE, 1).unwrap();
        assert_eq!(get(&driver, K_AUDIO_DEVICE_PROPERTY_DEVICE_IS_RUNNING), PropertyValue::U32(1));
        driver.stop_io(K_OBJECT_ID_DEVICE, 1).unwrap();
        assert_eq!(get(&driver, K_AUDIO_DEVICE_PROPERTY_DEVICE_IS_RUNNING), PropertyValue::U32(0));
    }

    #[test]
    fn test_zero_time_stamp_period() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(
            get(&driver, K_AUDIO_DEVICE_PROPERTY_ZERO_TIME_STAMP_PERIOD),
            PropertyValue::U32(16_384)
        );
        assert_eq!(
            get(&driver, K_AUDIO_DEVICE_PROPERTY_PREFERRED_CHANNELS_FOR_STEREO),
            PropertyValue::ChannelPair([1, 2])
        );
    }
}
