//! AudioServerPlugIn 入口 (macOS)
//!
//! coreaudiod 通过 Info.plist 中的工厂函数加载插件：
//! 1. 工厂函数校验请求的类型 UUID，创建进程内唯一的驱动对象
//! 2. 返回的指针是 COM 风格的 `AudioServerPlugInDriverRef`（指向 vtable 指针）
//! 3. 之后所有调用经 `interface` 中的 trampoline 转到 [`Driver`]

mod cf;
mod interface;

use std::ffi::c_void;
use std::ptr;
use std::sync::OnceLock;

use coreaudio_sys::{
    AudioObjectPropertyAddress, AudioServerPlugInDriverInterface, AudioServerPlugInHostRef,
    CFAllocatorRef, CFUUIDBytes, CFUUIDGetUUIDBytes, CFUUIDRef,
};

use crate::config;
use crate::driver::constants::AudioObjectID;
use crate::driver::{Driver, HostInterface, PropertyAddress, PLUG_IN_TYPE_UUID};

/// 日志级别环境变量
pub const LOG_ENV: &str = "VOCANA_LOG";

/// COM 对象：第一个字段必须是 vtable 指针
#[repr(C)]
pub(crate) struct PlugInObject {
    interface: *const AudioServerPlugInDriverInterface,
    driver: Driver,
}

// vtable 是只读的静态数据
unsafe impl Send for PlugInObject {}
unsafe impl Sync for PlugInObject {}

static INSTANCE: OnceLock<PlugInObject> = OnceLock::new();

impl PlugInObject {
    #[inline]
    fn as_driver_ref(&'static self) -> *mut c_void {
        self as *const Self as *mut c_void
    }
}

/// 校验 HAL 传入的 driver 引用，只接受本插件的实例
#[inline]
pub(crate) fn driver_from_ref(driver_ref: *const c_void) -> Option<&'static Driver> {
    let instance = INSTANCE.get()?;
    if ptr::eq(driver_ref as *const PlugInObject, instance) {
        Some(&instance.driver)
    } else {
        None
    }
}

fn init_logging() {
    // coreaudiod 可能多次调用工厂函数，重复初始化直接忽略
    let _ = env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "warn"))
        .format_timestamp_millis()
        .try_init();
}

fn uuid_bytes(uuid: &CFUUIDBytes) -> [u8; 16] {
    [
        uuid.byte0, uuid.byte1, uuid.byte2, uuid.byte3, uuid.byte4, uuid.byte5, uuid.byte6,
        uuid.byte7, uuid.byte8, uuid.byte9, uuid.byte10, uuid.byte11, uuid.byte12, uuid.byte13,
        uuid.byte14, uuid.byte15,
    ]
}

/// 工厂函数（Info.plist `CFPlugInFactories`）
///
/// 请求的类型不是 AudioServerPlugIn 时返回空指针
#[no_mangle]
pub extern "C" fn VocanaAudioServerPlugin_Create(
    _allocator: CFAllocatorRef,
    requested_type: CFUUIDRef,
) -> *mut c_void {
    if requested_type.is_null() {
        return ptr::null_mut();
    }
    let requested = uuid_bytes(&unsafe { CFUUIDGetUUIDBytes(requested_type) });
    if requested != PLUG_IN_TYPE_UUID {
        return ptr::null_mut();
    }

    init_logging();
    let instance = INSTANCE.get_or_init(|| {
        let config = config::load_or_default();
        log::info!(
            "Creating {} driver v{} ({})",
            config.device_name,
            env!("CARGO_PKG_VERSION"),
            config.format()
        );
        PlugInObject {
            interface: interface::driver_interface(),
            driver: Driver::new(config),
        }
    });
    instance.as_driver_ref()
}

/// HAL 提供的 host 接口
pub(crate) struct HalHost {
    host: AudioServerPlugInHostRef,
}

// host 接口在插件生命周期内有效，且可从任意线程调用
unsafe impl Send for HalHost {}
unsafe impl Sync for HalHost {}

impl HalHost {
    pub(crate) fn new(host: AudioServerPlugInHostRef) -> Option<Self> {
        (!host.is_null()).then_some(Self { host })
    }
}

impl HostInterface for HalHost {
    fn properties_changed(&self, object: AudioObjectID, addresses: &[PropertyAddress]) {
        let raw: Vec<AudioObjectPropertyAddress> = addresses
            .iter()
            .map(|a| AudioObjectPropertyAddress {
                mSelector: a.selector,
                mScope: a.scope,
                mElement: a.element,
            })
            .collect();

        let Some(notify) = (unsafe { (*self.host).PropertiesChanged }) else {
            log::warn!("Host has no PropertiesChanged callback");
            return;
        };
        let status = unsafe { notify(self.host, object, raw.len() as u32, raw.as_ptr()) };
        if status != 0 {
            log::warn!("PropertiesChanged({}) failed: {}", object, status);
        }
    }
}
