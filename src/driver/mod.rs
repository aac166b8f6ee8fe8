//! HAL 驱动核心
//!
//! 平台无关的驱动实现，包含：
//! - Object graph: 固定的对象层级
//! - Properties: 按对象类别分派的 selector 表
//! - State: 单把锁保护的运行时状态
//! - IO: StartIO / StopIO / 零时间戳 / Begin-Do-End 周期
//!
//! ABI 层（`crate::plugin`）只负责指针校验与类型转换，然后调用这里的方法。

pub mod clock;
pub mod constants;
pub mod error;
pub mod host;
pub mod io;
pub mod object;
pub mod properties;
pub mod property;
pub mod state;

use std::sync::Arc;

pub use clock::ZeroTimestamp;
pub use error::{DriverError, Result};
pub use host::HostInterface;
pub use io::{IoCycleInfo, IoOperation, IoOperationSupport};
pub use property::{PropertyAddress, PropertyQualifier, PropertyValue, ValueKind};

use crate::audio::format::AudioFormat;
use crate::audio::stats::IoStats;
use crate::audio::timing::host_ticks_per_frame;
use crate::config::DriverConfig;
use constants::AudioObjectID;
use io::IoEngine;
use object::K_OBJECT_ID_DEVICE;
use state::DriverState;

/// IUnknown
pub const IUNKNOWN_UUID: [u8; 16] = [
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x46,
];

/// kAudioServerPlugInDriverInterfaceUUID
pub const DRIVER_INTERFACE_UUID: [u8; 16] = [
    0xEE, 0xA5, 0x77, 0x3D, 0xCC, 0x43, 0x49, 0xF1, 0x8E, 0x00, 0x8F, 0x96, 0xE7, 0xD2, 0x3B, 0x17,
];

/// kAudioServerPlugInTypeUUID
pub const PLUG_IN_TYPE_UUID: [u8; 16] = [
    0x44, 0x3A, 0xBA, 0xB8, 0xE7, 0xB3, 0x49, 0x1A, 0xB9, 0x85, 0xBE, 0xB9, 0x18, 0x70, 0x30, 0xDB,
];

/// HAL 客户端信息（AddDeviceClient / RemoveDeviceClient）
#[derive(Clone, Debug, Default)]
pub struct ClientInfo {
    pub client_id: u32,
    pub process_id: i32,
    pub is_native_endian: bool,
    pub bundle_id: Option<String>,
}

/// Vocana 虚拟设备驱动
///
/// 进程内单例：由工厂函数创建一次，生命周期与进程相同
pub struct Driver {
    config: DriverConfig,
    state: DriverState,
    io: IoEngine,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        let state = DriverState::new(&config);
        Self {
            config,
            state,
            io: IoEngine::new(),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn state(&self) -> &DriverState {
        &self.state
    }

    pub fn stats(&self) -> &IoStats {
        self.io.stats()
    }

    /// 当前流格式
    pub fn format(&self) -> AudioFormat {
        self.config
            .format()
            .with_sample_rate(self.state.lock().sample_rate)
    }

    /// 只有一个设备对象
    #[inline]
    fn check_device(&self, device: AudioObjectID) -> Result<()> {
        if device == K_OBJECT_ID_DEVICE {
            Ok(())
        } else {
            Err(DriverError::BadObject(device))
        }
    }

    /// 入口参数校验：对象 ID 先于指针
    ///
    /// 未知对象总是 BadObject，即使同时传入了空指针
    pub fn check_call(&self, object: AudioObjectID, pointers_valid: bool) -> Result<()> {
        object::lookup(object).ok_or(DriverError::BadObject(object))?;
        if !pointers_valid {
            return Err(DriverError::IllegalOperation("null argument pointer"));
        }
        Ok(())
    }

    /// 同 [`Driver::check_call`]，对象必须是设备
    pub fn check_device_call(&self, device: AudioObjectID, pointers_valid: bool) -> Result<()> {
        self.check_device(device)?;
        if !pointers_valid {
            return Err(DriverError::IllegalOperation("null argument pointer"));
        }
        Ok(())
    }

    // ========================================================================
    // IUnknown
    // ========================================================================

    /// QueryInterface：接受 IUnknown 和驱动接口，命中时引用计数 +1
    pub fn query_interface(&self, uuid: &[u8; 16]) -> Result<u32> {
        if *uuid == IUNKNOWN_UUID || *uuid == DRIVER_INTERFACE_UUID {
            Ok(self.state.lock().add_ref())
        } else {
            log::debug!("QueryInterface: unsupported interface {:02X?}", uuid);
            Err(DriverError::NoInterface)
        }
    }

    pub fn add_ref(&self) -> u32 {
        self.state.lock().add_ref()
    }

    pub fn release(&self) -> u32 {
        self.state.lock().release()
    }

    // ========================================================================
    // 生命周期
    // ========================================================================

    /// Initialize：记录 host，按标称采样率计算每帧 host ticks
    pub fn initialize(&self, host: Option<Arc<dyn HostInterface>>) -> Result<()> {
        let ticks_per_frame = host_ticks_per_frame(self.config.sample_rate);
        if ticks_per_frame <= 0.0 {
            return Err(DriverError::Unspecified("invalid host clock calibration"));
        }

        let mut state = self.state.lock();
        if state.initialized {
            log::warn!("Initialize called twice, replacing host reference");
        }
        state.host = host;
        state.sample_rate = self.config.sample_rate;
        state.clock.set_host_ticks_per_frame(ticks_per_frame);
        // 重复 Initialize 保留 host 设置过的名字
        if !state.initialized {
            state.box_name = self.config.box_name.clone();
        }
        state.initialized = true;
        drop(state);

        log::info!(
            "Driver initialized: {} ({:.3} host ticks/frame)",
            self.format(),
            ticks_per_frame
        );
        Ok(())
    }

    /// 设备在加载时静态创建，不是 Transport Manager
    pub fn create_device(&self) -> Result<AudioObjectID> {
        Err(DriverError::UnsupportedOperation("CreateDevice"))
    }

    pub fn destroy_device(&self, device: AudioObjectID) -> Result<()> {
        self.check_device(device)?;
        Err(DriverError::UnsupportedOperation("DestroyDevice"))
    }

    pub fn add_device_client(&self, device: AudioObjectID, client: &ClientInfo) -> Result<()> {
        self.check_device(device)?;
        let count = self.state.lock().add_client();
        log::debug!(
            "Client {} (pid {}, {:?}) added, {} client(s)",
            client.client_id,
            client.process_id,
            client.bundle_id,
            count
        );
        Ok(())
    }

    /// 计数下限为 0，多余的移除不报错
    pub fn remove_device_client(&self, device: AudioObjectID, client: &ClientInfo) -> Result<()> {
        self.check_device(device)?;
        let count = self.state.lock().remove_client();
        log::debug!("Client {} removed, {} client(s)", client.client_id, count);
        Ok(())
    }

    /// 不支持任何异步配置变更（采样率固定）
    pub fn perform_device_configuration_change(
        &self,
        device: AudioObjectID,
        action: u64,
    ) -> Result<()> {
        self.check_device(device)?;
        log::warn!("Declining device configuration change (action {})", action);
        Err(DriverError::UnsupportedOperation("PerformDeviceConfigurationChange"))
    }

    /// 没有挂起的变更需要清理
    pub fn abort_device_configuration_change(
        &self,
        device: AudioObjectID,
        action: u64,
    ) -> Result<()> {
        self.check_device(device)?;
        log::debug!("Configuration change {} aborted", action);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::host::testing::RecordingHost;

    fn driver() -> Driver {
        Driver::new(DriverConfig::default())
    }

    #[test]
    fn test_query_interface() {
        let driver = driver();
        assert_eq!(driver.query_interface(&IUNKNOWN_UUID), Ok(2));
        assert_eq!(driver.query_interface(&DRIVER_INTERFACE_UUID), Ok(3));
        assert_eq!(
            driver.query_interface(&PLUG_IN_TYPE_UUID),
            Err(DriverError::NoInterface)
        );
        assert_eq!(driver.release(), 2);
    }

    #[test]
    fn test_ref_count_never_underflows() {
        let driver = driver();
        assert_eq!(driver.release(), 0);
        assert_eq!(driver.release(), 0);
        assert_eq!(driver.add_ref(), 1);
    }

    #[test]
    fn test_initialize() {
        let driver = driver();
        let host = Arc::new(RecordingHost::default());
        driver.initialize(Some(host)).unwrap();

        let state = driver.state().lock();
        assert!(state.initialized);
        assert!(state.host.is_some());
        assert!(state.clock.host_ticks_per_frame() > 0.0);
    }

    #[test]
    fn test_device_lifecycle_unsupported() {
        let driver = driver();
        assert_eq!(
            driver.create_device(),
            Err(DriverError::UnsupportedOperation("CreateDevice"))
        );
        assert_eq!(
            driver.destroy_device(K_OBJECT_ID_DEVICE),
            Err(DriverError::UnsupportedOperation("DestroyDevice"))
        );
        assert_eq!(driver.destroy_device(42), Err(DriverError::BadObject(42)));
    }

    #[test]
    fn test_configuration_change() {
        let driver = driver();
        assert!(matches!(
            driver.perform_device_configuration_change(K_OBJECT_ID_DEVICE, 1),
            Err(DriverError::UnsupportedOperation(_))
        ));
        assert_eq!(
            driver.perform_device_configuration_change(7, 1),
            Err(DriverError::BadObject(7))
        );
        assert_eq!(driver.abort_device_configuration_change(K_OBJECT_ID_DEVICE, 1), Ok(()));
    }

    #[test]
    fn test_clients() {
        let driver = driver();
        let client = ClientInfo {
            client_id: 7,
            process_id: 100,
            is_native_endian: true,
            bundle_id: Some("com.example.app".to_string()),
        };
        driver.add_device_client(K_OBJECT_ID_DEVICE, &client).unwrap();
        driver.remove_device_client(K_OBJECT_ID_DEVICE, &client).unwrap();
        driver.remove_device_client(K_OBJECT_ID_DEVICE, &client).unwrap();
        assert_eq!(driver.state().lock().client_count, 0);
        assert_eq!(
            driver.add_device_client(object::K_OBJECT_ID_BOX, &client),
            Err(DriverError::BadObject(object::K_OBJECT_ID_BOX))
        );
    }

    #[test]
    fn test_call_checks_object_before_pointers() {
        let driver = driver();
        assert_eq!(driver.check_call(99, false), Err(DriverError::BadObject(99)));
        assert_eq!(driver.check_call(99, true), Err(DriverError::BadObject(99)));
        assert!(matches!(
            driver.check_call(object::K_OBJECT_ID_BOX, false),
            Err(DriverError::IllegalOperation(_))
        ));
        assert_eq!(driver.check_call(object::K_OBJECT_ID_BOX, true), Ok(()));

        assert_eq!(
            driver.check_device_call(object::K_OBJECT_ID_BOX, false),
            Err(DriverError::BadObject(object::K_OBJECT_ID_BOX))
        );
        assert!(matches!(
            driver.check_device_call(K_OBJECT_ID_DEVICE, false),
            Err(DriverError::IllegalOperation(_))
        ));
        assert_eq!(driver.check_device_call(K_OBJECT_ID_DEVICE, true), Ok(()));
    }

    #[test]
    fn test_reinitialize_keeps_box_name() {
        let driver = driver();
        driver.initialize(None).unwrap();
        driver.state().lock().box_name = "Studio".to_string();

        driver.initialize(None).unwrap();
        assert_eq!(driver.state().lock().box_name, "Studio");
    }
}
