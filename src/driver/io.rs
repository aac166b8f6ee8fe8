//! I/O 周期
//!
//! HAL 在实时线程上按周期调用 Begin → Do → End。约束：
//! - Do 路径不分配内存、不写日志、不回调 host
//! - Begin 只在请求的大小变化时重新分配 scratch 缓冲区
//! - 帧数为 0 或超过上限的调用在接触任何缓冲区之前被拒绝

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::clock::ZeroTimestamp;
use super::constants::*;
use super::error::{DriverError, Result};
use super::object::{self, Direction, ObjectKind, K_OBJECT_ID_DEVICE};
use super::property::PropertyAddress;
use super::Driver;
use crate::audio::stats::IoStats;
use crate::audio::timing::now_ticks;

/// I/O 操作类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoOperation {
    Thread,
    Cycle,
    ReadInput,
    ConvertInput,
    ProcessInput,
    ProcessOutput,
    MixOutput,
    ProcessMix,
    ConvertMix,
    WriteMix,
    Unknown(u32),
}

impl IoOperation {
    pub fn from_id(id: u32) -> Self {
        match id {
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_THREAD => Self::Thread,
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_CYCLE => Self::Cycle,
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_READ_INPUT => Self::ReadInput,
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_CONVERT_INPUT => Self::ConvertInput,
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_PROCESS_INPUT => Self::ProcessInput,
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_PROCESS_OUTPUT => Self::ProcessOutput,
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_MIX_OUTPUT => Self::MixOutput,
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_PROCESS_MIX => Self::ProcessMix,
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_CONVERT_MIX => Self::ConvertMix,
            K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_WRITE_MIX => Self::WriteMix,
            other => Self::Unknown(other),
        }
    }
}

/// WillDoIOOperation 的结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IoOperationSupport {
    pub will_do: bool,
    pub in_place: bool,
}

/// 每个周期的时间信息
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct IoCycleInfo {
    pub cycle_counter: u64,
    pub nominal_frame_count: u32,
    pub current_host_time: u64,
}

/// 输入/输出 scratch 缓冲区
#[derive(Default)]
struct ScratchBuffers {
    input: Vec<u8>,
    output: Vec<u8>,
    resizes: u64,
}

impl ScratchBuffers {
    /// 大小不同才重新分配
    fn ensure(buffer: &mut Vec<u8>, bytes: usize, resizes: &mut u64) {
        if buffer.len() != bytes {
            buffer.resize(bytes, 0);
            *resizes += 1;
        }
    }
}

/// I/O 引擎：scratch 缓冲区 + 统计
///
/// 缓冲区使用独立的锁，只在 I/O 线程上争用
pub(crate) struct IoEngine {
    buffers: Mutex<ScratchBuffers>,
    stats: IoStats,
    last_cycle: AtomicU64,
    // 最近一个周期的标称帧数，只用于统计报告
    nominal_frames: AtomicU32,
}

impl IoEngine {
    pub(crate) fn new() -> Self {
        Self {
            buffers: Mutex::new(ScratchBuffers::default()),
            stats: IoStats::new(),
            last_cycle: AtomicU64::new(u64::MAX),
            nominal_frames: AtomicU32::new(0),
        }
    }

    pub(crate) fn stats(&self) -> &IoStats {
        &self.stats
    }

    #[inline]
    fn buffers(&self) -> MutexGuard<'_, ScratchBuffers> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 新的 IO 会话开始
    fn reset(&self) {
        self.stats.reset();
        self.last_cycle.store(u64::MAX, Ordering::Relaxed);
    }
}

impl Driver {
    #[inline]
    fn bytes_per_frame(&self) -> usize {
        // 帧布局与采样率无关，不需要取状态锁
        self.config.format().bytes_per_frame()
    }

    /// 帧数必须在 1..=max_frame_count 内，返回对应的字节数
    fn check_frame_count(&self, object: AudioObjectID, frame_count: u32) -> Result<usize> {
        if frame_count == 0 || frame_count > self.config.max_frame_count {
            self.io.stats.record_rejected();
            return Err(DriverError::BadObject(object));
        }
        Ok(frame_count as usize * self.bytes_per_frame())
    }

    fn stream_direction(&self, stream: AudioObjectID) -> Result<Direction> {
        match object::lookup(stream).map(|node| node.kind) {
            Some(ObjectKind::Stream(dir)) => Ok(dir),
            _ => Err(DriverError::BadObject(stream)),
        }
    }

    /// DeviceIsRunning 变化，状态锁之外通知 host
    fn notify_running_changed(&self) {
        if let Some(host) = self.state.host() {
            host.properties_changed(
                K_OBJECT_ID_DEVICE,
                &[PropertyAddress::global(K_AUDIO_DEVICE_PROPERTY_DEVICE_IS_RUNNING)],
            );
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().is_running()
    }

    pub fn io_running_count(&self) -> u32 {
        self.state.lock().io_running_count
    }

    /// StartIO：运行计数 +1，0 → 1 时锚定零时间戳
    pub fn start_io(&self, device: AudioObjectID, client_id: u32) -> Result<()> {
        self.check_device(device)?;

        let mut state = self.state.lock();
        if !state.initialized {
            return Err(DriverError::IllegalOperation("StartIO before Initialize"));
        }
        let started = state.start_io(now_ticks());
        let count = state.io_running_count;
        drop(state);

        if started {
            self.io.reset();
            self.notify_running_changed();
            log::info!("IO started by client {}", client_id);
        } else {
            log::debug!("StartIO client {}, {} running", client_id, count);
        }
        Ok(())
    }

    /// StopIO：运行计数 -1（下限 0），1 → 0 时输出统计
    pub fn stop_io(&self, device: AudioObjectID, client_id: u32) -> Result<()> {
        self.check_device(device)?;

        let stopped = self.state.lock().stop_io();
        if stopped {
            self.notify_running_changed();
            let format = self.format();
            let frames = self.io.nominal_frames.load(Ordering::Relaxed);
            let report = self.io.stats.report(frames, format.sample_rate);
            log::info!("IO stopped by client {}: {}", client_id, report);
            if report.rejected_cycles > 0 {
                log::warn!("{} IO call(s) rejected this session", report.rejected_cycles);
            }
        }
        Ok(())
    }

    /// GetZeroTimeStamp
    pub fn get_zero_timestamp(&self, device: AudioObjectID) -> Result<ZeroTimestamp> {
        self.check_device(device)?;
        let now = now_ticks();
        Ok(self.state.lock().clock.timestamp(now))
    }

    /// WillDoIOOperation：只参与 ReadInput 和 WriteMix，均不原地处理
    pub fn will_do_io_operation(
        &self,
        device: AudioObjectID,
        _client_id: u32,
        operation: IoOperation,
    ) -> Result<IoOperationSupport> {
        self.check_device(device)?;
        let will_do = matches!(operation, IoOperation::ReadInput | IoOperation::WriteMix);
        Ok(IoOperationSupport {
            will_do,
            in_place: false,
        })
    }

    /// BeginIOOperation：按需调整 scratch 缓冲区
    pub fn begin_io_operation(
        &self,
        device: AudioObjectID,
        _client_id: u32,
        operation: IoOperation,
        frame_count: u32,
        cycle: &IoCycleInfo,
    ) -> Result<()> {
        self.check_device(device)?;
        let bytes = self.check_frame_count(device, frame_count)?;

        if self.io.last_cycle.swap(cycle.cycle_counter, Ordering::Relaxed) != cycle.cycle_counter {
            self.io.stats.on_cycle(cycle.current_host_time);
            let nominal = if cycle.nominal_frame_count > 0 {
                cycle.nominal_frame_count
            } else {
                frame_count
            };
            self.io.nominal_frames.store(nominal, Ordering::Relaxed);
        }

        let mut guard = self.io.buffers();
        let buffers = &mut *guard;
        match operation {
            IoOperation::ReadInput => {
                ScratchBuffers::ensure(&mut buffers.input, bytes, &mut buffers.resizes)
            }
            IoOperation::WriteMix => {
                ScratchBuffers::ensure(&mut buffers.output, bytes, &mut buffers.resizes)
            }
            _ => {}
        }
        Ok(())
    }

    /// DoIOOperation 的主缓冲区字节数
    ///
    /// ABI 层在构造缓冲区切片之前用它校验参数
    pub fn io_buffer_len(
        &self,
        device: AudioObjectID,
        stream: AudioObjectID,
        frame_count: u32,
    ) -> Result<usize> {
        self.check_device(device)?;
        self.stream_direction(stream)?;
        self.check_frame_count(stream, frame_count)
    }

    /// DoIOOperation
    ///
    /// - ReadInput（输入流）：主缓冲区写满 `frame_count × bytes_per_frame` 字节静音
    /// - WriteMix（输出流）：消费同样多的字节
    /// - 其它组合：不做任何事
    pub fn do_io_operation(
        &self,
        device: AudioObjectID,
        stream: AudioObjectID,
        _client_id: u32,
        operation: IoOperation,
        frame_count: u32,
        main: Option<&mut [u8]>,
    ) -> Result<()> {
        let bytes = self.io_buffer_len(device, stream, frame_count)?;
        let direction = self.stream_direction(stream)?;

        let participates = matches!(
            (operation, direction),
            (IoOperation::ReadInput, Direction::Input) | (IoOperation::WriteMix, Direction::Output)
        );
        if !participates {
            return Ok(());
        }

        let main = main.ok_or(DriverError::IllegalOperation("null IO buffer"))?;
        let Some(main) = main.get_mut(..bytes) else {
            self.io.stats.record_rejected();
            return Err(DriverError::BadObject(stream));
        };

        let mut buffers = self.io.buffers();
        match direction {
            Direction::Input => {
                // 没有 Begin 过这个大小：拒绝，不写任何数据
                if buffers.input.len() < bytes {
                    self.io.stats.record_rejected();
                    return Err(DriverError::BadObject(stream));
                }
                // 输入侧没有数据源，输出静音
                main.fill(0);
                self.io.stats.add_frames_read(frame_count);
            }
            Direction::Output => {
                let Some(scratch) = buffers.output.get_mut(..bytes) else {
                    self.io.stats.record_rejected();
                    return Err(DriverError::BadObject(stream));
                };
                scratch.copy_from_slice(main);
                self.io.stats.add_frames_written(frame_count);
            }
        }
        Ok(())
    }

    /// EndIOOperation：缓冲区保留到下一个周期复用
    pub fn end_io_operation(
        &self,
        device: AudioObjectID,
        _client_id: u32,
        _operation: IoOperation,
        _frame_count: u32,
        _cycle: &IoCycleInfo,
    ) -> Result<()> {
        self.check_device(device)
    }

    /// (输入, 输出) scratch 大小与重新分配次数
    pub fn scratch_state(&self) -> (usize, usize, u64) {
        let buffers = self.io.buffers();
        (buffers.input.len(), buffers.output.len(), buffers.resizes)
    }
}
