//! Stream 对象属性
//!
//! 虚拟格式与物理格式相同；可用格式每个支持采样率一项

use super::{direction, property_table};
use crate::audio::format::SUPPORTED_SAMPLE_RATES;
use crate::driver::constants::*;
use crate::driver::error::Result;
use crate::driver::property::{
    expect_u32, PropertyAddress, PropertyContext, PropertyEntry, PropertyValue, ValueKind,
};

pub(super) static PROPERTIES: &[PropertyEntry] = property_table![
    PropertyEntry::read(K_AUDIO_STREAM_PROPERTY_IS_ACTIVE, ValueKind::U32, |cx| {
        let dir = direction(cx)?;
        Ok(cx.state.lock().stream_active(dir).into())
    })
    .settable(set_is_active),
    PropertyEntry::read(K_AUDIO_STREAM_PROPERTY_DIRECTION, ValueKind::U32, |cx| {
        Ok(PropertyValue::U32(direction(cx)?.stream_direction()))
    }),
    PropertyEntry::read(K_AUDIO_STREAM_PROPERTY_TERMINAL_TYPE, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(K_AUDIO_STREAM_TERMINAL_TYPE_LINE))
    }),
    PropertyEntry::read(K_AUDIO_STREAM_PROPERTY_STARTING_CHANNEL, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(1))
    }),
    PropertyEntry::read(K_AUDIO_STREAM_PROPERTY_LATENCY, ValueKind::U32, |_| {
        Ok(PropertyValue::U32(0))
    }),
    PropertyEntry::read(K_AUDIO_STREAM_PROPERTY_VIRTUAL_FORMAT, ValueKind::Format, current_format),
    PropertyEntry::read(K_AUDIO_STREAM_PROPERTY_PHYSICAL_FORMAT, ValueKind::Format, current_format),
    PropertyEntry::read(
        K_AUDIO_STREAM_PROPERTY_AVAILABLE_VIRTUAL_FORMATS,
        ValueKind::FormatList,
        available_formats
    )
    .sized(available_formats_size),
    PropertyEntry::read(
        K_AUDIO_STREAM_PROPERTY_AVAILABLE_PHYSICAL_FORMATS,
        ValueKind::FormatList,
        available_formats
    )
    .sized(available_formats_size),
];

fn current_format(cx: &PropertyContext<'_>) -> Result<PropertyValue> {
    Ok(PropertyValue::Format(cx.format().to_asbd()))
}

fn available_formats(cx: &PropertyContext<'_>) -> Result<PropertyValue> {
    Ok(PropertyValue::FormatList(cx.config.format().available_formats()))
}

fn available_formats_size(_: &PropertyContext<'_>) -> u32 {
    SUPPORTED_SAMPLE_RATES.len() as u32 * ValueKind::FormatList.element_size()
}

fn set_is_active(cx: &PropertyContext<'_>, value: PropertyValue) -> Result<Vec<PropertyAddress>> {
    let dir = direction(cx)?;
    let active = expect_u32(&value)? != 0;
    cx.state.lock().stream_active[dir.index()] = active;
    log::debug!("{:?} stream active={}", dir, active);
    Ok(vec![PropertyAddress::global(K_AUDIO_STREAM_PROPERTY_IS_ACTIVE)])
}

#[cfg(test)]
mod tests {
    use crate::config::DriverConfig;
    use crate::driver::constants::*;
    use crate::driver::object::*;
    use crate::driver::property::{PropertyAddress, PropertyValue};
    use crate::driver::Driver;

    fn get(driver: &Driver, stream: u32, selector: u32) -> PropertyValue {
        driver
            .get_property_data(stream, &PropertyAddress::global(selector), None, 1024)
            .unwrap()
    }

    #[test]
    fn test_direction_and_owner() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(
            get(&driver, K_OBJECT_ID_STREAM_INPUT, K_AUDIO_STREAM_PROPERTY_DIRECTION),
            PropertyValue::U32(1)
        );
        assert_eq!(
            get(&driver, K_OBJECT_ID_STREAM_OUTPUT, K_AUDIO_STREAM_PROPERTY_DIRECTION),
            PropertyValue::U32(0)
        );
        assert_eq!(
            get(&driver, K_OBJECT_ID_STREAM_OUTPUT, K_AUDIO_OBJECT_PROPERTY_OWNER),
            PropertyValue::U32(K_OBJECT_ID_DEVICE)
        );
        assert_eq!(
            get(&driver, K_OBJECT_ID_STREAM_INPUT, K_AUDIO_STREAM_PROPERTY_STARTING_CHANNEL),
            PropertyValue::U32(1)
        );
    }

    #[test]
    fn test_formats() {
        let driver = Driver::new(DriverConfig::default());
        let PropertyValue::Format(asbd) =
            get(&driver, K_OBJECT_ID_STREAM_INPUT, K_AUDIO_STREAM_PROPERTY_VIRTUAL_FORMAT)
        else {
            panic!("expected a format");
        };
        assert_eq!(asbd.sample_rate, 48_000.0);
        assert_eq!(asbd.bytes_per_frame, 8);
        assert_eq!(asbd.channels_per_frame, 2);
        assert_eq!(
            asbd.format_flags,
            K_AUDIO_FORMAT_FLAG_IS_FLOAT | K_AUDIO_FORMAT_FLAG_IS_PACKED
        );

        let PropertyValue::FormatList(formats) = get(
            &driver,
            K_OBJECT_ID_STREAM_OUTPUT,
            K_AUDIO_STREAM_PROPERTY_AVAILABLE_PHYSICAL_FORMATS,
        ) else {
            panic!("expected a format list");
        };
        assert_eq!(formats.len(), 6);
        assert!(formats
            .iter()
            .all(|f| f.sample_rate_range.minimum == f.sample_rate_range.maximum));
    }

    #[test]
    fn test_available_formats_truncated() {
        let driver = Driver::new(DriverConfig::default());
        let value = driver
            .get_property_data(
                K_OBJECT_ID_STREAM_INPUT,
                &PropertyAddress::global(K_AUDIO_STREAM_PROPERTY_AVAILABLE_VIRTUAL_FORMATS),
                None,
                2 * 56 + 10,
            )
            .unwrap();
        assert_eq!(value.len(), 2);
    }

    #[test]
    fn test_is_active() {
        let driver = Driver::new(DriverConfig::default());
        let addr = PropertyAddress::global(K_AUDIO_STREAM_PROPERTY_IS_ACTIVE);
        driver
            .set_property_data(K_OBJECT_ID_STREAM_OUTPUT, &addr, None, PropertyValue::U32(0))
            .unwrap();
        assert_eq!(
            get(&driver, K_OBJECT_ID_STREAM_OUTPUT, K_AUDIO_STREAM_PROPERTY_IS_ACTIVE),
            PropertyValue::U32(0)
        );
        assert_eq!(
            get(&driver, K_OBJECT_ID_STREAM_INPUT, K_AUDIO_STREAM_PROPERTY_IS_ACTIVE),
            PropertyValue::U32(1)
        );
    }
}
