//! 零时间戳时钟
//!
//! 把 host 时钟映射到设备的采样时间。设备运行期间，每经过一个
//! ring 周期（`period_frames` 帧），时间戳前进一格：
//!
//! ```text
//! sample_time = n * period
//! host_time   = anchor + n * period * ticks_per_frame
//! ```

/// 时间戳种子：时钟关系从不重建，固定为 1
pub const ZERO_TIMESTAMP_SEED: u64 = 1;

/// GetZeroTimeStamp 的结果
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZeroTimestamp {
    pub sample_time: f64,
    pub host_time: u64,
    pub seed: u64,
}

#[derive(Clone, Debug)]
pub struct ZeroTimestampClock {
    period_frames: u32,
    host_ticks_per_frame: f64,
    anchor_host_time: u64,
    timestamp_count: u64,
}

impl ZeroTimestampClock {
    pub fn new(period_frames: u32) -> Self {
        Self {
            period_frames,
            host_ticks_per_frame: 0.0,
            anchor_host_time: 0,
            timestamp_count: 0,
        }
    }

    /// Initialize 时根据采样率设置
    pub fn set_host_ticks_per_frame(&mut self, ticks: f64) {
        self.host_ticks_per_frame = ticks;
    }

    #[inline]
    pub fn host_ticks_per_frame(&self) -> f64 {
        self.host_ticks_per_frame
    }

    #[inline]
    pub fn period_frames(&self) -> u32 {
        self.period_frames
    }

    #[inline]
    pub fn anchor_host_time(&self) -> u64 {
        self.anchor_host_time
    }

    #[inline]
    pub fn is_anchored(&self) -> bool {
        self.anchor_host_time != 0
    }

    /// 一个 ring 周期对应的 host ticks
    #[inline]
    pub fn host_ticks_per_period(&self) -> f64 {
        self.host_ticks_per_frame * self.period_frames as f64
    }

    /// IO 从 0 → 1 时调用：以当前时间为锚点
    pub fn start(&mut self, now: u64) {
        // 0 保留为“未锚定”
        self.anchor_host_time = now.max(1);
        self.timestamp_count = 0;
    }

    /// IO 从 1 → 0 时调用
    pub fn stop(&mut self) {
        self.anchor_host_time = 0;
        self.timestamp_count = 0;
    }

    /// 计算零时间戳
    ///
    /// 未运行时返回 (0, now, 1)
    pub fn timestamp(&mut self, now: u64) -> ZeroTimestamp {
        let ticks_per_period = self.host_ticks_per_period();
        if !self.is_anchored() || ticks_per_period <= 0.0 {
            return ZeroTimestamp {
                sample_time: 0.0,
                host_time: if self.is_anchored() {
                    self.anchor_host_time
                } else {
                    now
                },
                seed: ZERO_TIMESTAMP_SEED,
            };
        }

        let next_offset = ((self.timestamp_count + 1) as f64 * ticks_per_period) as u64;
        if self.anchor_host_time.saturating_add(next_offset) <= now {
            self.timestamp_count += 1;
        }

        let offset = (self.timestamp_count as f64 * ticks_per_period) as u64;
        ZeroTimestamp {
            sample_time: (self.timestamp_count * self.period_frames as u64) as f64,
            host_time: self.anchor_host_time + offset,
            seed: ZERO_TIMESTAMP_SEED,
        }
    }
}
