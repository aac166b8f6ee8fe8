//! 驱动运行时状态
//!
//! 一把互斥锁保护所有可变状态：引用计数、客户端计数、IO 运行计数、
//! 采样率、box 名称/获取标志、流激活标志、控件值。
//! 临界区内不做 I/O，不回调 host。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::clock::ZeroTimestampClock;
use super::host::HostInterface;
use super::object::Direction;
use crate::config::DriverConfig;

/// 受锁保护的状态
pub struct RuntimeState {
    pub host: Option<Arc<dyn HostInterface>>,
    pub initialized: bool,
    pub ref_count: u32,
    pub client_count: u32,
    pub io_running_count: u32,
    pub sample_rate: u32,
    pub clock: ZeroTimestampClock,
    pub box_name: String,
    pub box_acquired: bool,
    pub box_identify: u32,
    /// 按 `Direction::index()` 索引
    pub stream_active: [bool; 2],
    pub volume_scalar: [f32; 2],
    pub mute: [bool; 2],
}

impl RuntimeState {
    fn new(config: &DriverConfig) -> Self {
        Self {
            host: None,
            initialized: false,
            ref_count: 1,
            client_count: 0,
            io_running_count: 0,
            sample_rate: config.sample_rate,
            clock: ZeroTimestampClock::new(config.zero_timestamp_period),
            box_name: config.box_name.clone(),
            box_acquired: true,
            box_identify: 0,
            stream_active: [true; 2],
            volume_scalar: [1.0; 2],
            mute: [false; 2],
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.io_running_count > 0
    }

    /// 引用计数 +1（饱和）
    pub fn add_ref(&mut self) -> u32 {
        self.ref_count = self.ref_count.saturating_add(1);
        self.ref_count
    }

    /// 引用计数 -1（下限 0）。单例驱动，计数归零也不销毁
    pub fn release(&mut self) -> u32 {
        self.ref_count = self.ref_count.saturating_sub(1);
        self.ref_count
    }

    pub fn add_client(&mut self) -> u32 {
        self.client_count = self.client_count.saturating_add(1);
        self.client_count
    }

    pub fn remove_client(&mut self) -> u32 {
        self.client_count = self.client_count.saturating_sub(1);
        self.client_count
    }

    /// IO 计数 +1，返回是否为 0 → 1 的转变
    pub fn start_io(&mut self, now: u64) -> bool {
        let was_running = self.is_running();
        self.io_running_count = self.io_running_count.saturating_add(1);
        if !was_running {
            self.clock.start(now);
        }
        !was_running
    }

    /// IO 计数 -1（下限 0），返回是否为 1 → 0 的转变
    pub fn stop_io(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.io_running_count -= 1;
        if self.is_running() {
            return false;
        }
        self.clock.stop();
        true
    }

    #[inline]
    pub fn stream_active(&self, direction: Direction) -> bool {
        self.stream_active[direction.index()]
    }

    #[inline]
    pub fn volume(&self, direction: Direction) -> f32 {
        self.volume_scalar[direction.index()]
    }

    #[inline]
    pub fn is_muted(&self, direction: Direction) -> bool {
        self.mute[direction.index()]
    }
}

/// 进程内唯一的驱动状态
pub struct DriverState {
    inner: Mutex<RuntimeState>,
}

impl DriverState {
    pub fn new(config: &DriverConfig) -> Self {
        Self {
            inner: Mutex::new(RuntimeState::new(config)),
        }
    }

    /// 获取状态锁
    ///
    /// 临界区内不会 panic 到一半留下不一致状态，所以忽略 poison
    #[inline]
    pub fn lock(&self) -> MutexGuard<'_, RuntimeState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 取出 host 引用（在锁外调用 host）
    pub fn host(&self) -> Option<Arc<dyn HostInterface>> {
        self.lock().host.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> DriverState {
        DriverState::new(&DriverConfig::default())
    }

    #[test]
    fn test_defaults() {
        let state = state();
        let s = state.lock();
        assert_eq!(s.ref_count, 1);
        assert_eq!(s.sample_rate, 48_000);
        assert_eq!(s.box_name, "Vocana Box");
        assert!(s.box_acquired);
        assert!(s.stream_active(Direction::Input));
        assert_eq!(s.volume(Direction::Output), 1.0);
        assert!(!s.is_muted(Direction::Input));
        assert!(!s.is_running());
    }

    #[test]
    fn test_ref_count_saturates() {
        let state = state();
        let mut s = state.lock();
        assert_eq!(s.release(), 0);
        assert_eq!(s.release(), 0);
        s.ref_count = u32::MAX;
        assert_eq!(s.add_ref(), u32::MAX);
    }

    #[test]
    fn test_clients_clamped() {
        let state = state();
        let mut s = state.lock();
        assert_eq!(s.add_client(), 1);
        assert_eq!(s.remove_client(), 0);
        assert_eq!(s.remove_client(), 0);
    }

    #[test]
    fn test_io_transitions() {
        let state = state();
        let mut s = state.lock();
        assert!(s.start_io(100));
        assert!(!s.start_io(200));
        assert_eq!(s.clock.anchor_host_time(), 100);
        assert!(!s.stop_io());
        assert!(s.is_running());
        assert!(s.stop_io());
        assert!(!s.is_running());
        assert!(!s.clock.is_anchored());
        // 多余的 stop 不会下溢
        assert!(!s.stop_io());
        assert_eq!(s.io_running_count, 0);
    }
}
