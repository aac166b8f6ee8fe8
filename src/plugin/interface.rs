//! AudioServerPlugInDriverInterface vtable
//!
//! 每个入口先校验 driver 引用和对象 ID，再校验指针、转换参数、调用 [`Driver`]。
//! 入口用 `catch_unwind` 包裹，panic 不会越过 FFI 边界。

use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::Arc;

use coreaudio_sys::{
    pid_t, AudioObjectPropertyAddress, AudioServerPlugInClientInfo,
    AudioServerPlugInDriverInterface, AudioServerPlugInDriverRef, AudioServerPlugInHostRef,
    AudioServerPlugInIOCycleInfo, Boolean, CFDictionaryRef, Float64, UInt32, UInt64, HRESULT,
    LPVOID, REFIID, ULONG,
};

use super::{cf, driver_from_ref, uuid_bytes, HalHost};
use crate::driver::constants::*;
use crate::driver::error::{DriverError, Result};
use crate::driver::{
    ClientInfo, Driver, HostInterface, IoCycleInfo, IoOperation, PropertyAddress,
};

#[repr(transparent)]
struct StaticInterface(AudioServerPlugInDriverInterface);

// 只包含函数指针和一个空的保留字段
unsafe impl Sync for StaticInterface {}

static DRIVER_INTERFACE: StaticInterface = StaticInterface(AudioServerPlugInDriverInterface {
    _reserved: ptr::null_mut(),
    QueryInterface: Some(query_interface),
    AddRef: Some(add_ref),
    Release: Some(release),
    Initialize: Some(initialize),
    CreateDevice: Some(create_device),
    DestroyDevice: Some(destroy_device),
    AddDeviceClient: Some(add_device_client),
    RemoveDeviceClient: Some(remove_device_client),
    PerformDeviceConfigurationChange: Some(perform_device_configuration_change),
    AbortDeviceConfigurationChange: Some(abort_device_configuration_change),
    HasProperty: Some(has_property),
    IsPropertySettable: Some(is_property_settable),
    GetPropertyDataSize: Some(get_property_data_size),
    GetPropertyData: Some(get_property_data),
    SetPropertyData: Some(set_property_data),
    StartIO: Some(start_io),
    StopIO: Some(stop_io),
    GetZeroTimeStamp: Some(get_zero_timestamp),
    WillDoIOOperation: Some(will_do_io_operation),
    BeginIOOperation: Some(begin_io_operation),
    DoIOOperation: Some(do_io_operation),
    EndIOOperation: Some(end_io_operation),
});

pub(super) fn driver_interface() -> *const AudioServerPlugInDriverInterface {
    &DRIVER_INTERFACE.0
}

// ============================================================================
// 辅助
// ============================================================================

/// 运行一个入口：解析 driver、捕获 panic、折叠为状态码
#[inline]
fn dispatch<F>(name: &'static str, driver_ref: *const c_void, f: F) -> OSStatus
where
    F: FnOnce(&'static Driver) -> Result<()>,
{
    let Some(driver) = driver_from_ref(driver_ref) else {
        return K_AUDIO_HARDWARE_BAD_OBJECT_ERROR;
    };
    match panic::catch_unwind(AssertUnwindSafe(|| f(driver))) {
        Ok(Ok(())) => K_AUDIO_HARDWARE_NO_ERROR,
        Ok(Err(e)) => e.status(),
        Err(_) => {
            log::error!("{} panicked", name);
            K_AUDIO_HARDWARE_UNSPECIFIED_ERROR
        }
    }
}

/// 写出参数；空指针报 IllegalOperation
#[inline]
unsafe fn write_out<T>(out: *mut T, value: T) -> Result<()> {
    if out.is_null() {
        return Err(DriverError::IllegalOperation("null out pointer"));
    }
    out.write(value);
    Ok(())
}

#[inline]
unsafe fn read_address(address: *const AudioObjectPropertyAddress) -> Result<PropertyAddress> {
    if address.is_null() {
        return Err(DriverError::IllegalOperation("null property address"));
    }
    let a = &*address;
    Ok(PropertyAddress::new(a.mSelector, a.mScope, a.mElement))
}

unsafe fn read_client(info: *const AudioServerPlugInClientInfo) -> Result<ClientInfo> {
    if info.is_null() {
        return Err(DriverError::IllegalOperation("null client info"));
    }
    let info = &*info;
    Ok(ClientInfo {
        client_id: info.mClientID,
        process_id: info.mProcessID,
        is_native_endian: info.mIsNativeEndian != 0,
        bundle_id: cf::string_from_ref(info.mBundleID as _),
    })
}

unsafe fn read_cycle(info: *const AudioServerPlugInIOCycleInfo) -> IoCycleInfo {
    if info.is_null() {
        return IoCycleInfo::default();
    }
    let info = &*info;
    IoCycleInfo {
        cycle_counter: info.mIOCycleCounter,
        nominal_frame_count: info.mNominalIOBufferFrameSize,
        current_host_time: info.mCurrentTime.mHostTime,
    }
}

// ============================================================================
// IUnknown
// ============================================================================

unsafe extern "C" fn query_interface(
    driver_ref: *mut c_void,
    uuid: REFIID,
    out_interface: *mut LPVOID,
) -> HRESULT {
    let Some(driver) = driver_from_ref(driver_ref) else {
        return K_AUDIO_HARDWARE_BAD_OBJECT_ERROR;
    };
    if out_interface.is_null() {
        return K_AUDIO_HARDWARE_ILLEGAL_OPERATION_ERROR;
    }
    match driver.query_interface(&uuid_bytes(&uuid)) {
        Ok(_) => {
            *out_interface = driver_ref;
            0
        }
        Err(e) => {
            *out_interface = ptr::null_mut();
            e.status()
        }
    }
}

unsafe extern "C" fn add_ref(driver_ref: *mut c_void) -> ULONG {
    driver_from_ref(driver_ref).map_or(0, Driver::add_ref)
}

unsafe extern "C" fn release(driver_ref: *mut c_void) -> ULONG {
    driver_from_ref(driver_ref).map_or(0, Driver::release)
}

// ============================================================================
// 生命周期
// ============================================================================

unsafe extern "C" fn initialize(
    driver_ref: AudioServerPlugInDriverRef,
    host: AudioServerPlugInHostRef,
) -> OSStatus {
    dispatch("Initialize", driver_ref as _, |driver| {
        let host = HalHost::new(host).map(|h| Arc::new(h) as Arc<dyn HostInterface>);
        driver.initialize(host)
    })
}

unsafe extern "C" fn create_device(
    driver_ref: AudioServerPlugInDriverRef,
    _description: CFDictionaryRef,
    _client_info: *const AudioServerPlugInClientInfo,
    out_device: *mut AudioObjectID,
) -> OSStatus {
    dispatch("CreateDevice", driver_ref as _, |driver| {
        let device = driver.create_device()?;
        write_out(out_device, device)
    })
}

unsafe extern "C" fn destroy_device(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
) -> OSStatus {
    dispatch("DestroyDevice", driver_ref as _, |driver| driver.destroy_device(device))
}

unsafe extern "C" fn add_device_client(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client_info: *const AudioServerPlugInClientInfo,
) -> OSStatus {
    dispatch("AddDeviceClient", driver_ref as _, |driver| {
        driver.check_device_call(device, !client_info.is_null())?;
        driver.add_device_client(device, &read_client(client_info)?)
    })
}

unsafe extern "C" fn remove_device_client(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client_info: *const AudioServerPlugInClientInfo,
) -> OSStatus {
    dispatch("RemoveDeviceClient", driver_ref as _, |driver| {
        driver.check_device_call(device, !client_info.is_null())?;
        driver.remove_device_client(device, &read_client(client_info)?)
    })
}

unsafe extern "C" fn perform_device_configuration_change(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    action: UInt64,
    _change_info: *mut c_void,
) -> OSStatus {
    dispatch("PerformDeviceConfigurationChange", driver_ref as _, |driver| {
        driver.perform_device_configuration_change(device, action)
    })
}

unsafe extern "C" fn abort_device_configuration_change(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    action: UInt64,
    _change_info: *mut c_void,
) -> OSStatus {
    dispatch("AbortDeviceConfigurationChange", driver_ref as _, |driver| {
        driver.abort_device_configuration_change(device, action)
    })
}

// ============================================================================
// 属性
// ============================================================================

unsafe extern "C" fn has_property(
    driver_ref: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _client_pid: pid_t,
    address: *const AudioObjectPropertyAddress,
) -> Boolean {
    let Some(driver) = driver_from_ref(driver_ref as _) else {
        return 0;
    };
    match read_address(address) {
        Ok(address) => driver.has_property(object, &address) as Boolean,
        Err(_) => 0,
    }
}

unsafe extern "C" fn is_property_settable(
    driver_ref: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _client_pid: pid_t,
    address: *const AudioObjectPropertyAddress,
    out_is_settable: *mut Boolean,
) -> OSStatus {
    dispatch("IsPropertySettable", driver_ref as _, |driver| {
        driver.check_call(object, !address.is_null() && !out_is_settable.is_null())?;
        let address = read_address(address)?;
        let settable = driver.is_property_settable(object, &address)?;
        write_out(out_is_settable, settable as Boolean)
    })
}

unsafe extern "C" fn get_property_data_size(
    driver_ref: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _client_pid: pid_t,
    address: *const AudioObjectPropertyAddress,
    qualifier_size: UInt32,
    qualifier_data: *const c_void,
    out_size: *mut UInt32,
) -> OSStatus {
    dispatch("GetPropertyDataSize", driver_ref as _, |driver| {
        driver.check_call(object, !address.is_null() && !out_size.is_null())?;
        let address = read_address(address)?;
        let qualifier =
            cf::read_qualifier(address.selector, qualifier_size, qualifier_data, 0, ptr::null());
        let size = driver.get_property_data_size(object, &address, qualifier.as_ref())?;
        write_out(out_size, size)
    })
}

unsafe extern "C" fn get_property_data(
    driver_ref: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _client_pid: pid_t,
    address: *const AudioObjectPropertyAddress,
    qualifier_size: UInt32,
    qualifier_data: *const c_void,
    in_data_size: UInt32,
    out_data_size: *mut UInt32,
    out_data: *mut c_void,
) -> OSStatus {
    dispatch("GetPropertyData", driver_ref as _, |driver| {
        driver.check_call(
            object,
            !address.is_null() && !out_data.is_null() && !out_data_size.is_null(),
        )?;
        let address = read_address(address)?;
        let qualifier = cf::read_qualifier(
            address.selector,
            qualifier_size,
            qualifier_data,
            in_data_size,
            out_data,
        );
        let value = driver.get_property_data(object, &address, qualifier.as_ref(), in_data_size)?;
        let written = cf::write_value(&value, out_data);
        write_out(out_data_size, written)
    })
}

unsafe extern "C" fn set_property_data(
    driver_ref: AudioServerPlugInDriverRef,
    object: AudioObjectID,
    _client_pid: pid_t,
    address: *const AudioObjectPropertyAddress,
    qualifier_size: UInt32,
    qualifier_data: *const c_void,
    in_data_size: UInt32,
    in_data: *const c_void,
) -> OSStatus {
    dispatch("SetPropertyData", driver_ref as _, |driver| {
        driver.check_call(object, !address.is_null())?;
        let address = read_address(address)?;
        let kind = driver.settable_kind(object, &address)?;
        let value = cf::read_value(kind, in_data_size, in_data)?;
        let qualifier =
            cf::read_qualifier(address.selector, qualifier_size, qualifier_data, 0, ptr::null());
        // 变化通知由 Driver 在状态锁之外发出
        driver
            .set_property_data(object, &address, qualifier.as_ref(), value)
            .map(|_| ())
    })
}

// ============================================================================
// IO
// ============================================================================

unsafe extern "C" fn start_io(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client_id: UInt32,
) -> OSStatus {
    dispatch("StartIO", driver_ref as _, |driver| driver.start_io(device, client_id))
}

unsafe extern "C" fn stop_io(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client_id: UInt32,
) -> OSStatus {
    dispatch("StopIO", driver_ref as _, |driver| driver.stop_io(device, client_id))
}

unsafe extern "C" fn get_zero_timestamp(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    _client_id: UInt32,
    out_sample_time: *mut Float64,
    out_host_time: *mut UInt64,
    out_seed: *mut UInt64,
) -> OSStatus {
    dispatch("GetZeroTimeStamp", driver_ref as _, |driver| {
        driver.check_device_call(
            device,
            !out_sample_time.is_null() && !out_host_time.is_null() && !out_seed.is_null(),
        )?;
        let timestamp = driver.get_zero_timestamp(device)?;
        *out_sample_time = timestamp.sample_time;
        *out_host_time = timestamp.host_time;
        *out_seed = timestamp.seed;
        Ok(())
    })
}

unsafe extern "C" fn will_do_io_operation(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client_id: UInt32,
    operation: UInt32,
    out_will_do: *mut Boolean,
    out_will_do_in_place: *mut Boolean,
) -> OSStatus {
    dispatch("WillDoIOOperation", driver_ref as _, |driver| {
        let support =
            driver.will_do_io_operation(device, client_id, IoOperation::from_id(operation))?;
        write_out(out_will_do, support.will_do as Boolean)?;
        write_out(out_will_do_in_place, support.in_place as Boolean)
    })
}

unsafe extern "C" fn begin_io_operation(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client_id: UInt32,
    operation: UInt32,
    frame_count: UInt32,
    cycle_info: *const AudioServerPlugInIOCycleInfo,
) -> OSStatus {
    dispatch("BeginIOOperation", driver_ref as _, |driver| {
        driver.begin_io_operation(
            device,
            client_id,
            IoOperation::from_id(operation),
            frame_count,
            &read_cycle(cycle_info),
        )
    })
}

unsafe extern "C" fn do_io_operation(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    stream: AudioObjectID,
    client_id: UInt32,
    operation: UInt32,
    frame_count: UInt32,
    _cycle_info: *const AudioServerPlugInIOCycleInfo,
    main_buffer: *mut c_void,
    _secondary_buffer: *mut c_void,
) -> OSStatus {
    dispatch("DoIOOperation", driver_ref as _, |driver| {
        // 先校验参数，再构造切片
        let len = driver.io_buffer_len(device, stream, frame_count)?;
        let main = (!main_buffer.is_null())
            .then(|| std::slice::from_raw_parts_mut(main_buffer as *mut u8, len));
        driver.do_io_operation(
            device,
            stream,
            client_id,
            IoOperation::from_id(operation),
            frame_count,
            main,
        )
    })
}

unsafe extern "C" fn end_io_operation(
    driver_ref: AudioServerPlugInDriverRef,
    device: AudioObjectID,
    client_id: UInt32,
    operation: UInt32,
    frame_count: UInt32,
    cycle_info: *const AudioServerPlugInIOCycleInfo,
) -> OSStatus {
    dispatch("EndIOOperation", driver_ref as _, |driver| {
        driver.end_io_operation(
            device,
            client_id,
            IoOperation::from_id(operation),
            frame_count,
            &read_cycle(cycle_info),
        )
    })
}
