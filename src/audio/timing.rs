//! Host 时钟
//!
//! HAL 的时间戳以 mach ticks 表示。这里提供 ticks → 纳秒转换，
//! 以及按采样率计算每帧对应的 host ticks。

use std::sync::OnceLock;

/// Mach timebase 信息（全局缓存，只初始化一次）
static TIMEBASE: OnceLock<TimebaseInfo> = OnceLock::new();

#[derive(Clone, Copy, Debug)]
struct TimebaseInfo {
    numer: u32,
    denom: u32,
}

impl TimebaseInfo {
    #[cfg(target_os = "macos")]
    #[allow(deprecated)]
    fn get() -> Self {
        *TIMEBASE.get_or_init(|| {
            let mut info = libc::mach_timebase_info_data_t { numer: 0, denom: 0 };
            let status = unsafe { libc::mach_timebase_info(&mut info) };
            if status != 0 || info.numer == 0 || info.denom == 0 {
                log::warn!("mach_timebase_info failed ({}), assuming 1/1", status);
                return TimebaseInfo { numer: 1, denom: 1 };
            }
            TimebaseInfo {
                numer: info.numer,
                denom: info.denom,
            }
        })
    }

    #[cfg(not(target_os = "macos"))]
    fn get() -> Self {
        *TIMEBASE.get_or_init(|| TimebaseInfo { numer: 1, denom: 1 })
    }
}

/// 将 mach ticks 转换为纳秒
///
/// Intel Mac 上 timebase 通常是 1/1，Apple Silicon 上通常是 125/3
#[inline]
pub fn mach_ticks_to_ns(ticks: u64) -> u64 {
    let info = TimebaseInfo::get();
    (ticks as u128 * info.numer as u128 / info.denom as u128) as u64
}

/// 每秒的 host ticks
pub fn host_ticks_per_second() -> f64 {
    let info = TimebaseInfo::get();
    1_000_000_000.0 * info.denom as f64 / info.numer as f64
}

/// 每帧的 host ticks
///
/// 采样率为 0 时返回 0，调用方负责拒绝这种配置
pub fn host_ticks_per_frame(sample_rate: u32) -> f64 {
    if sample_rate == 0 {
        return 0.0;
    }
    host_ticks_per_second() / sample_rate as f64
}

/// 获取当前时间（mach ticks）
#[cfg(target_os = "macos")]
#[inline]
#[allow(deprecated)]
pub fn now_ticks() -> u64 {
    unsafe { libc::mach_absolute_time() }
}

/// 非 macOS 平台：以进程内单调时钟模拟 mach_absolute_time
#[cfg(not(target_os = "macos"))]
#[inline]
pub fn now_ticks() -> u64 {
    use std::time::Instant;
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    // 从 1 开始，0 保留给“未设置”
    ORIGIN.get_or_init(Instant::now).elapsed().as_nanos() as u64 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timebase() {
        let info = TimebaseInfo::get();
        assert!(info.numer > 0);
        assert!(info.denom > 0);
        assert!(mach_ticks_to_ns(1_000_000) > 0);
    }

    #[test]
    fn test_host_ticks_per_frame() {
        let per_second = host_ticks_per_second();
        let per_frame = host_ticks_per_frame(48_000);
        assert!(per_frame > 0.0);
        assert!((per_frame * 48_000.0 - per_second).abs() < 1e-3);
        // 采样率越高，每帧 ticks 越少
        assert!(host_ticks_per_frame(96_000) < per_frame);
        assert_eq!(host_ticks_per_frame(0), 0.0);
    }

    #[test]
    fn test_now() {
        let t1 = now_ticks();
        std::thread::sleep(std::time::Duration::from_millis(10));
        let t2 = now_ticks();
        assert!(t2 > t1, "time should advance");

        let elapsed_ns = mach_ticks_to_ns(t2 - t1);
        assert!(elapsed_ns >= 8_000_000, "expected at least 8ms, got {}ns", elapsed_ns);
    }
}
