//! Volume / Mute 控件属性
//!
//! 音量以 scalar [0, 1] 存储，dB 值按平方曲线换算：
//! `scalar = ((db - min) / (max - min))^2`

use super::{direction, property_table};
use crate::audio::format::AudioValueRange;
use crate::config::DriverConfig;
use crate::driver::constants::*;
use crate::driver::error::Result;
use crate::driver::property::{
    expect_f32, expect_u32, PropertyAddress, PropertyContext, PropertyEntry, PropertyValue,
    ValueKind,
};

/// scalar ⇄ dB 换算
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VolumeCurve {
    min_db: f32,
    max_db: f32,
}

impl VolumeCurve {
    pub fn new(min_db: f32, max_db: f32) -> Self {
        Self { min_db, max_db }
    }

    pub fn from_config(config: &DriverConfig) -> Self {
        Self::new(config.volume_min_db, config.volume_max_db)
    }

    #[inline]
    fn span(&self) -> f32 {
        self.max_db - self.min_db
    }

    /// NaN 按最小值处理
    pub fn scalar_to_db(&self, scalar: f32) -> f32 {
        if scalar.is_nan() {
            return self.min_db;
        }
        self.min_db + scalar.clamp(0.0, 1.0).sqrt() * self.span()
    }

    pub fn db_to_scalar(&self, db: f32) -> f32 {
        if db.is_nan() {
            return 0.0;
        }
        let normalized = (db.clamp(self.min_db, self.max_db) - self.min_db) / self.span();
        normalized * normalized
    }

    pub fn range(&self) -> AudioValueRange {
        AudioValueRange {
            minimum: self.min_db as f64,
            maximum: self.max_db as f64,
        }
    }
}

/// 控件共有：Scope / Element
macro_rules! control_table {
    ($($entry:expr),* $(,)?) => {
        property_table![
            PropertyEntry::read(K_AUDIO_CONTROL_PROPERTY_SCOPE, ValueKind::U32, |cx| {
                Ok(PropertyValue::U32(direction(cx)?.scope()))
            }),
            PropertyEntry::read(K_AUDIO_CONTROL_PROPERTY_ELEMENT, ValueKind::U32, |_| {
                Ok(PropertyValue::U32(K_AUDIO_OBJECT_PROPERTY_ELEMENT_MAIN))
            }),
            $($entry),*
        ]
    };
}

pub(super) static VOLUME_PROPERTIES: &[PropertyEntry] = control_table![
    PropertyEntry::read(K_AUDIO_LEVEL_CONTROL_PROPERTY_SCALAR_VALUE, ValueKind::F32, |cx| {
        let dir = direction(cx)?;
        Ok(PropertyValue::F32(cx.state.lock().volume(dir)))
    })
    .settable(set_scalar_value),
    PropertyEntry::read(K_AUDIO_LEVEL_CONTROL_PROPERTY_DECIBEL_VALUE, ValueKind::F32, |cx| {
        let dir = direction(cx)?;
        let scalar = cx.state.lock().volume(dir);
        Ok(PropertyValue::F32(VolumeCurve::from_config(cx.config).scalar_to_db(scalar)))
    })
    .settable(set_decibel_value),
    PropertyEntry::read(
        K_AUDIO_LEVEL_CONTROL_PROPERTY_DECIBEL_RANGE,
        ValueKind::ValueRange,
        |cx| Ok(PropertyValue::ValueRange(VolumeCurve::from_config(cx.config).range()))
    ),
    PropertyEntry::read(
        K_AUDIO_LEVEL_CONTROL_PROPERTY_CONVERT_SCALAR_TO_DECIBELS,
        ValueKind::F32,
        |cx| {
            let scalar = cx.float_qualifier()?;
            Ok(PropertyValue::F32(VolumeCurve::from_config(cx.config).scalar_to_db(scalar)))
        }
    ),
    PropertyEntry::read(
        K_AUDIO_LEVEL_CONTROL_PROPERTY_CONVERT_DECIBELS_TO_SCALAR,
        ValueKind::F32,
        |cx| {
            let db = cx.float_qualifier()?;
            Ok(PropertyValue::F32(VolumeCurve::from_config(cx.config).db_to_scalar(db)))
        }
    ),
];

pub(super) static MUTE_PROPERTIES: &[PropertyEntry] = control_table![
    PropertyEntry::read(K_AUDIO_BOOLEAN_CONTROL_PROPERTY_VALUE, ValueKind::U32, |cx| {
        let dir = direction(cx)?;
        Ok(cx.state.lock().is_muted(dir).into())
    })
    .settable(set_mute),
];

/// 音量变化同时影响 scalar 和 dB 两个属性
fn volume_changed() -> Vec<PropertyAddress> {
    vec![
        PropertyAddress::global(K_AUDIO_LEVEL_CONTROL_PROPERTY_SCALAR_VALUE),
        PropertyAddress::global(K_AUDIO_LEVEL_CONTROL_PROPERTY_DECIBEL_VALUE),
    ]
}

fn store_volume(cx: &PropertyContext<'_>, scalar: f32) -> Result<Vec<PropertyAddress>> {
    let dir = direction(cx)?;
    let scalar = if scalar.is_nan() { 0.0 } else { scalar.clamp(0.0, 1.0) };
    cx.state.lock().volume_scalar[dir.index()] = scalar;
    log::debug!("{:?} volume={:.3}", dir, scalar);
    Ok(volume_changed())
}

fn set_scalar_value(cx: &PropertyContext<'_>, value: PropertyValue) -> Result<Vec<PropertyAddress>> {
    store_volume(cx, expect_f32(&value)?)
}

fn set_decibel_value(cx: &PropertyContext<'_>, value: PropertyValue) -> Result<Vec<PropertyAddress>> {
    let db = expect_f32(&value)?;
    store_volume(cx, VolumeCurve::from_config(cx.config).db_to_scalar(db))
}

fn set_mute(cx: &PropertyContext<'_>, value: PropertyValue) -> Result<Vec<PropertyAddress>> {
    let dir = direction(cx)?;
    let muted = expect_u32(&value)? != 0;
    cx.state.lock().mute[dir.index()] = muted;
    log::debug!("{:?} mute={}", dir, muted);
    Ok(vec![PropertyAddress::global(K_AUDIO_BOOLEAN_CONTROL_PROPERTY_VALUE)])
}

#[cfg(test)]
mod tests {
    use super::VolumeCurve;
    use crate::config::DriverConfig;
    use crate::driver::constants::*;
    use crate::driver::object::*;
    use crate::driver::property::{PropertyAddress, PropertyQualifier, PropertyValue};
    use crate::driver::Driver;

    fn get(driver: &Driver, object: u32, selector: u32) -> PropertyValue {
        driver
            .get_property_data(object, &PropertyAddress::global(selector), None, 64)
            .unwrap()
    }

    #[test]
    fn test_curve() {
        let curve = VolumeCurve::new(-64.0, 0.0);
        assert_eq!(curve.scalar_to_db(1.0), 0.0);
        assert_eq!(curve.scalar_to_db(0.0), -64.0);
        assert_eq!(curve.scalar_to_db(0.25), -32.0);
        assert_eq!(curve.db_to_scalar(-32.0), 0.25);
        // 越界值被钳位
        assert_eq!(curve.db_to_scalar(12.0), 1.0);
        assert_eq!(curve.db_to_scalar(-100.0), 0.0);
        assert_eq!(curve.scalar_to_db(2.0), 0.0);
        assert_eq!(curve.scalar_to_db(f32::NAN), -64.0);
        assert_eq!(curve.db_to_scalar(f32::NAN), 0.0);
    }

    #[test]
    fn test_control_identity() {
        let driver = Driver::new(DriverConfig::default());
        assert_eq!(
            get(&driver, K_OBJECT_ID_VOLUME_INPUT, K_AUDIO_OBJECT_PROPERTY_BASE_CLASS),
            PropertyValue::U32(K_AUDIO_LEVEL_CONTROL_CLASS_ID)
        );
        assert_eq!(
            get(&driver, K_OBJECT_ID_MUTE_OUTPUT, K_AUDIO_OBJECT_PROPERTY_CLASS),
            PropertyValue::U32(K_AUDIO_MUTE_CONTROL_CLASS_ID)
        );
        assert_eq!(
            get(&driver, K_OBJECT_ID_MUTE_OUTPUT, K_AUDIO_CONTROL_PROPERTY_SCOPE),
            PropertyValue::U32(K_AUDIO_OBJECT_PROPERTY_SCOPE_OUTPUT)
        );
        assert_eq!(
            get(&driver, K_OBJECT_ID_VOLUME_INPUT, K_AUDIO_OBJECT_PROPERTY_OWNER),
            PropertyValue::U32(K_OBJECT_ID_DEVICE)
        );
    }

    #[test]
    fn test_set_volume_reports_both_addresses() {
        let driver = Driver::new(DriverConfig::default());
        let addr = PropertyAddress::global(K_AUDIO_LEVEL_CONTROL_PROPERTY_SCALAR_VALUE);
        let changed = driver
            .set_property_data(K_OBJECT_ID_VOLUME_OUTPUT, &addr, None, PropertyValue::F32(0.25))
            .unwrap();
        assert_eq!(changed.len(), 2);
        assert_eq!(
            get(&driver, K_OBJECT_ID_VOLUME_OUTPUT, K_AUDIO_LEVEL_CONTROL_PROPERTY_DECIBEL_VALUE),
            PropertyValue::F32(-32.0)
        );
        // 另一个方向不受影响
        assert_eq!(
            get(&driver, K_OBJECT_ID_VOLUME_INPUT, K_AUDIO_LEVEL_CONTROL_PROPERTY_SCALAR_VALUE),
            PropertyValue::F32(1.0)
        );
    }

    #[test]
    fn test_set_decibels() {
        let driver = Driver::new(DriverConfig::default());
        let addr = PropertyAddress::global(K_AUDIO_LEVEL_CONTROL_PROPERTY_DECIBEL_VALUE);
        driver
            .set_property_data(K_OBJECT_ID_VOLUME_INPUT, &addr, None, PropertyValue::F32(-64.0))
            .unwrap();
        assert_eq!(
            get(&driver, K_OBJECT_ID_VOLUME_INPUT, K_AUDIO_LEVEL_CONTROL_PROPERTY_SCALAR_VALUE),
            PropertyValue::F32(0.0)
        );
    }

    #[test]
    fn test_convert() {
        let driver = Driver::new(DriverConfig::default());
        let value = driver
            .get_property_data(
                K_OBJECT_ID_VOLUME_INPUT,
                &PropertyAddress::global(K_AUDIO_LEVEL_CONTROL_PROPERTY_CONVERT_DECIBELS_TO_SCALAR),
                Some(&PropertyQualifier::Float(-32.0)),
                4,
            )
            .unwrap();
        assert_eq!(value, PropertyValue::F32(0.25));
    }

    #[test]
    fn test_convert_nan_is_clamped() {
        let driver = Driver::new(DriverConfig::default());
        let curve = VolumeCurve::from_config(driver.config());
        let nan = PropertyQualifier::Float(f32::NAN);

        let convert = |selector| {
            driver
                .get_property_data(
                    K_OBJECT_ID_VOLUME_INPUT,
                    &PropertyAddress::global(selector),
                    Some(&nan),
                    4,
                )
                .unwrap()
        };
        assert_eq!(
            convert(K_AUDIO_LEVEL_CONTROL_PROPERTY_CONVERT_SCALAR_TO_DECIBELS),
            PropertyValue::F32(curve.range().minimum as f32)
        );
        assert_eq!(
            convert(K_AUDIO_LEVEL_CONTROL_PROPERTY_CONVERT_DECIBELS_TO_SCALAR),
            PropertyValue::F32(0.0)
        );
    }

    #[test]
    fn test_mute() {
        let driver = Driver::new(DriverConfig::default());
        let addr = PropertyAddress::global(K_AUDIO_BOOLEAN_CONTROL_PROPERTY_VALUE);
        let changed = driver
            .set_property_data(K_OBJECT_ID_MUTE_INPUT, &addr, None, PropertyValue::U32(1))
            .unwrap();
        assert_eq!(changed, vec![addr]);
        assert_eq!(
            get(&driver, K_OBJECT_ID_MUTE_INPUT, K_AUDIO_BOOLEAN_CONTROL_PROPERTY_VALUE),
            PropertyValue::U32(1)
        );
        assert_eq!(
            get(&driver, K_OBJECT_ID_MUTE_OUTPUT, K_AUDIO_BOOLEAN_CONTROL_PROPERTY_VALUE),
            PropertyValue::U32(0)
        );
    }
}
