//! Host 回调接口
//!
//! 驱动唯一主动调用 HAL 的途径。ABI 层把 `AudioServerPlugInHostRef`
//! 包装成这个 trait；测试中用记录型实现代替。

use super::constants::AudioObjectID;
use super::property::PropertyAddress;

pub trait HostInterface: Send + Sync {
    /// 通知 HAL 属性已变化，HAL 会重新查询并通知它的客户端
    fn properties_changed(&self, object: AudioObjectID, addresses: &[PropertyAddress]);
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// 记录所有通知的 host
    #[derive(Default)]
    pub struct RecordingHost {
        pub notifications: Mutex<Vec<(AudioObjectID, Vec<PropertyAddress>)>>,
    }

    impl RecordingHost {
        pub fn take(&self) -> Vec<(AudioObjectID, Vec<PropertyAddress>)> {
            std::mem::take(&mut *self.notifications.lock().unwrap())
        }
    }

    impl HostInterface for RecordingHost {
        fn properties_changed(&self, object: AudioObjectID, addresses: &[PropertyAddress]) {
            self.notifications
                .lock()
                .unwrap()
                .push((object, addresses.to_vec()));
        }
    }
}
