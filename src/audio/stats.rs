//! I/O 周期统计
//!
//! 在 Begin/Do/EndIOOperation 中收集，采用降频采样策略减少开销。
//! 报告只在非实时路径（StopIO / inspect 工具）生成。

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crossbeam_utils::CachePadded;

use super::timing::{mach_ticks_to_ns, now_ticks};

/// 统计采样间隔：每 N 个周期才采样一次
const SAMPLE_INTERVAL: u64 = 16;

/// 时间间隔缓冲区大小
const INTERVAL_BUFFER_SIZE: usize = 256;

/// I/O 统计收集器
///
/// 所有操作都是 lock-free 的，可在实时线程中使用
pub struct IoStats {
    cycle_count: CachePadded<AtomicU64>,
    last_sampled_ticks: AtomicU64,

    // 存储 interval（单位：mach ticks，报告时转换）
    interval_buffer: Box<[AtomicU64; INTERVAL_BUFFER_SIZE]>,
    interval_write_idx: AtomicUsize,

    frames_read: CachePadded<AtomicU64>,
    frames_written: CachePadded<AtomicU64>,
    rejected_cycles: AtomicU64,
}

impl IoStats {
    pub fn new() -> Self {
        Self {
            cycle_count: CachePadded::new(AtomicU64::new(0)),
            last_sampled_ticks: AtomicU64::new(0),
            interval_buffer: Box::new(std::array::from_fn(|_| AtomicU64::new(0))),
            interval_write_idx: AtomicUsize::new(0),
            frames_read: CachePadded::new(AtomicU64::new(0)),
            frames_written: CachePadded::new(AtomicU64::new(0)),
            rejected_cycles: AtomicU64::new(0),
        }
    }

    /// 每个 I/O 周期开始时调用
    ///
    /// `host_time`: 周期的 host 时间（mach ticks），为 0 时回退到 now_ticks()
    #[inline]
    pub fn on_cycle(&self, host_time: u64) {
        let count = self.cycle_count.fetch_add(1, Ordering::Relaxed);

        if count % SAMPLE_INTERVAL == 0 {
            let now = if host_time > 0 { host_time } else { now_ticks() };
            let last = self.last_sampled_ticks.swap(now, Ordering::Relaxed);

            if last > 0 && now > last {
                let idx = self.interval_write_idx.fetch_add(1, Ordering::Relaxed)
                    % INTERVAL_BUFFER_SIZE;
                self.interval_buffer[idx].store(now - last, Ordering::Relaxed);
            }
        }
    }

    #[inline]
    pub fn add_frames_read(&self, frames: u32) {
        self.frames_read.fetch_add(frames as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_frames_written(&self, frames: u32) {
        self.frames_written.fetch_add(frames as u64, Ordering::Relaxed);
    }

    /// 记录被拒绝的周期（帧数越界、未分配缓冲区等）
    #[inline]
    pub fn record_rejected(&self) {
        self.rejected_cycles.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn cycle_count(&self) -> u64 {
        self.cycle_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn frames_read(&self) -> u64 {
        self.frames_read.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn frames_written(&self) -> u64 {
        self.frames_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_cycles(&self) -> u64 {
        self.rejected_cycles.load(Ordering::Relaxed)
    }

    /// 生成报告
    pub fn report(&self, frames_per_cycle: u32, sample_rate: u32) -> IoStatsReport {
        let expected_interval_ns = if sample_rate > 0 {
            (frames_per_cycle as u64 * 1_000_000_000) / sample_rate as u64
        } else {
            0
        };

        let intervals_ns: Vec<u64> = self
            .interval_buffer
            .iter()
            .map(|slot| slot.load(Ordering::Relaxed))
            .filter(|&ticks| ticks > 0)
            .map(mach_ticks_to_ns)
            .collect();

        let interval_stats = match (intervals_ns.iter().min(), intervals_ns.iter().max()) {
            (Some(&min_ns), Some(&max_ns)) => IntervalStats {
                min_ns,
                max_ns,
                avg_ns: intervals_ns.iter().sum::<u64>() / intervals_ns.len() as u64,
            },
            _ => IntervalStats::default(),
        };

        IoStatsReport {
            cycle_count: self.cycle_count(),
            sample_interval: SAMPLE_INTERVAL,
            expected_sampled_interval_ns: expected_interval_ns * SAMPLE_INTERVAL,
            interval_stats,
            frames_read: self.frames_read(),
            frames_written: self.frames_written(),
            rejected_cycles: self.rejected_cycles(),
        }
    }

    /// 重置统计（每次 IO 会话开始时）
    pub fn reset(&self) {
        self.cycle_count.store(0, Ordering::Relaxed);
        self.last_sampled_ticks.store(0, Ordering::Relaxed);
        self.interval_write_idx.store(0, Ordering::Relaxed);
        self.frames_read.store(0, Ordering::Relaxed);
        self.frames_written.store(0, Ordering::Relaxed);
        self.rejected_cycles.store(0, Ordering::Relaxed);

        for slot in self.interval_buffer.iter() {
            slot.store(0, Ordering::Relaxed);
        }
    }
}

impl Default for IoStats {
    fn default() -> Self {
        Self::new()
    }
}

/// 周期间隔统计（纳秒）
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalStats {
    pub min_ns: u64,
    pub max_ns: u64,
    pub avg_ns: u64,
}

/// 统计报告
#[derive(Debug, Clone)]
pub struct IoStatsReport {
    pub cycle_count: u64,
    pub sample_interval: u64,
    pub expected_sampled_interval_ns: u64,
    pub interval_stats: IntervalStats,
    pub frames_read: u64,
    pub frames_written: u64,
    pub rejected_cycles: u64,
}

impl IoStatsReport {
    /// 采样间隔的最大抖动（相对期望值，纳秒）
    pub fn max_jitter_ns(&self) -> u64 {
        if self.interval_stats.max_ns == 0 {
            return 0;
        }
        let expected = self.expected_sampled_interval_ns;
        self.interval_stats
            .max_ns
            .abs_diff(expected)
            .max(self.interval_stats.min_ns.abs_diff(expected))
    }
}

impl fmt::Display for IoStatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycles={} frames_read={} frames_written={} rejected={}",
            self.cycle_count, self.frames_read, self.frames_written, self.rejected_cycles
        )?;
        if self.interval_stats.avg_ns > 0 {
            write!(
                f,
                " interval(x{}) avg={:.3}ms min={:.3}ms max={:.3}ms",
                self.sample_interval,
                self.interval_stats.avg_ns as f64 / 1e6,
                self.interval_stats.min_ns as f64 / 1e6,
                self.interval_stats.max_ns as f64 / 1e6
            )?;
        }
        Ok(())
    }
}
