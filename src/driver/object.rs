//! 音频对象图
//!
//! 对象集合在加载时固定，运行期不增删：
//!
//! ```text
//! PlugIn(1)
//! ├── Box(2)
//! └── Device(3)
//!     ├── Stream-In(4)      Stream-Out(5)
//!     ├── Volume-In(6)      Mute-In(7)
//!     └── Volume-Out(8)     Mute-Out(9)
//! ```

use super::constants::*;

pub const K_OBJECT_ID_PLUG_IN: AudioObjectID = 1;
pub const K_OBJECT_ID_BOX: AudioObjectID = 2;
pub const K_OBJECT_ID_DEVICE: AudioObjectID = 3;
pub const K_OBJECT_ID_STREAM_INPUT: AudioObjectID = 4;
pub const K_OBJECT_ID_STREAM_OUTPUT: AudioObjectID = 5;
pub const K_OBJECT_ID_VOLUME_INPUT: AudioObjectID = 6;
pub const K_OBJECT_ID_MUTE_INPUT: AudioObjectID = 7;
pub const K_OBJECT_ID_VOLUME_OUTPUT: AudioObjectID = 8;
pub const K_OBJECT_ID_MUTE_OUTPUT: AudioObjectID = 9;

/// 流/控件方向
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// 对应的属性 scope
    #[inline]
    pub fn scope(self) -> AudioObjectPropertyScope {
        match self {
            Self::Input => K_AUDIO_OBJECT_PROPERTY_SCOPE_INPUT,
            Self::Output => K_AUDIO_OBJECT_PROPERTY_SCOPE_OUTPUT,
        }
    }

    /// kAudioStreamPropertyDirection 的取值：1 = 输入，0 = 输出
    #[inline]
    pub fn stream_direction(self) -> u32 {
        match self {
            Self::Input => 1,
            Self::Output => 0,
        }
    }

    /// 是否匹配给定 scope（global 匹配所有方向）
    #[inline]
    pub fn matches_scope(self, scope: AudioObjectPropertyScope) -> bool {
        scope == K_AUDIO_OBJECT_PROPERTY_SCOPE_GLOBAL || scope == self.scope()
    }

    pub fn index(self) -> usize {
        match self {
            Self::Input => 0,
            Self::Output => 1,
        }
    }
}

/// 控件类型
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Volume,
    Mute,
}

/// 对象类别（属性分派的粗粒度 key）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    PlugIn,
    Box,
    Device,
    Stream(Direction),
    Control(ControlKind, Direction),
}

impl ObjectKind {
    /// kAudioObjectPropertyBaseClass
    pub fn base_class(self) -> AudioClassID {
        match self {
            Self::Control(ControlKind::Volume, _) => K_AUDIO_LEVEL_CONTROL_CLASS_ID,
            Self::Control(ControlKind::Mute, _) => K_AUDIO_BOOLEAN_CONTROL_CLASS_ID,
            _ => K_AUDIO_OBJECT_CLASS_ID,
        }
    }

    /// kAudioObjectPropertyClass
    pub fn class(self) -> AudioClassID {
        match self {
            Self::PlugIn => K_AUDIO_PLUG_IN_CLASS_ID,
            Self::Box => K_AUDIO_BOX_CLASS_ID,
            Self::Device => K_AUDIO_DEVICE_CLASS_ID,
            Self::Stream(_) => K_AUDIO_STREAM_CLASS_ID,
            Self::Control(ControlKind::Volume, _) => K_AUDIO_VOLUME_CONTROL_CLASS_ID,
            Self::Control(ControlKind::Mute, _) => K_AUDIO_MUTE_CONTROL_CLASS_ID,
        }
    }

    /// 流和控件的方向
    pub fn direction(self) -> Option<Direction> {
        match self {
            Self::Stream(dir) | Self::Control(_, dir) => Some(dir),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PlugIn => "PlugIn",
            Self::Box => "Box",
            Self::Device => "Device",
            Self::Stream(Direction::Input) => "Stream-In",
            Self::Stream(Direction::Output) => "Stream-Out",
            Self::Control(ControlKind::Volume, Direction::Input) => "Volume-In",
            Self::Control(ControlKind::Volume, Direction::Output) => "Volume-Out",
            Self::Control(ControlKind::Mute, Direction::Input) => "Mute-In",
            Self::Control(ControlKind::Mute, Direction::Output) => "Mute-Out",
        }
    }
}

/// 对象图中的一个节点
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioObjectNode {
    pub id: AudioObjectID,
    pub kind: ObjectKind,
    pub owner: AudioObjectID,
}

/// 固定对象图（按 ID 升序）
pub static OBJECT_GRAPH: [AudioObjectNode; 9] = [
    AudioObjectNode {
        id: K_OBJECT_ID_PLUG_IN,
        kind: ObjectKind::PlugIn,
        owner: K_AUDIO_OBJECT_UNKNOWN,
    },
    AudioObjectNode {
        id: K_OBJECT_ID_BOX,
        kind: ObjectKind::Box,
        owner: K_OBJECT_ID_PLUG_IN,
    },
    AudioObjectNode {
        id: K_OBJECT_ID_DEVICE,
        kind: ObjectKind::Device,
        owner: K_OBJECT_ID_PLUG_IN,
    },
    AudioObjectNode {
        id: K_OBJECT_ID_STREAM_INPUT,
        kind: ObjectKind::Stream(Direction::Input),
        owner: K_OBJECT_ID_DEVICE,
    },
    AudioObjectNode {
        id: K_OBJECT_ID_STREAM_OUTPUT,
        kind: ObjectKind::Stream(Direction::Output),
        owner: K_OBJECT_ID_DEVICE,
    },
    AudioObjectNode {
        id: K_OBJECT_ID_VOLUME_INPUT,
        kind: ObjectKind::Control(ControlKind::Volume, Direction::Input),
        owner: K_OBJECT_ID_DEVICE,
    },
    AudioObjectNode {
        id: K_OBJECT_ID_MUTE_INPUT,
        kind: ObjectKind::Control(ControlKind::Mute, Direction::Input),
        owner: K_OBJECT_ID_DEVICE,
    },
    AudioObjectNode {
        id: K_OBJECT_ID_VOLUME_OUTPUT,
        kind: ObjectKind::Control(ControlKind::Volume, Direction::Output),
        owner: K_OBJECT_ID_DEVICE,
    },
    AudioObjectNode {
        id: K_OBJECT_ID_MUTE_OUTPUT,
        kind: ObjectKind::Control(ControlKind::Mute, Direction::Output),
        owner: K_OBJECT_ID_DEVICE,
    },
];

/// 按 ID 查找节点；未知 ID 返回 None
#[inline]
pub fn lookup(id: AudioObjectID) -> Option<&'static AudioObjectNode> {
    OBJECT_GRAPH.iter().find(|node| node.id == id)
}

/// 直接子对象（按 ID 升序，即规范顺序）
pub fn children(owner: AudioObjectID) -> impl Iterator<Item = &'static AudioObjectNode> {
    OBJECT_GRAPH.iter().filter(move |node| node.owner == owner)
}

/// 设备上的流 ID：输入在前，输出在后
pub fn stream_ids(scope: AudioObjectPropertyScope) -> Vec<AudioObjectID> {
    children(K_OBJECT_ID_DEVICE)
        .filter(|node| matches!(node.kind, ObjectKind::Stream(dir) if dir.matches_scope(scope)))
        .map(|node| node.id)
        .collect()
}

/// 设备上的控件 ID
pub fn control_ids(scope: AudioObjectPropertyScope) -> Vec<AudioObjectID> {
    children(K_OBJECT_ID_DEVICE)
        .filter(|node| matches!(node.kind, ObjectKind::Control(_, dir) if dir.matches_scope(scope)))
        .map(|node| node.id)
        .collect()
}

/// 给定方向的流对象 ID
#[inline]
pub fn stream_id(direction: Direction) -> AudioObjectID {
    match direction {
        Direction::Input => K_OBJECT_ID_STREAM_INPUT,
        Direction::Output => K_OBJECT_ID_STREAM_OUTPUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup(K_OBJECT_ID_DEVICE).map(|n| n.kind), Some(ObjectKind::Device));
        assert_eq!(
            lookup(K_OBJECT_ID_MUTE_OUTPUT).map(|n| n.kind),
            Some(ObjectKind::Control(ControlKind::Mute, Direction::Output))
        );
        assert!(lookup(0).is_none());
        assert!(lookup(10).is_none());
    }

    #[test]
    fn test_ids_unique_and_sorted() {
        for pair in OBJECT_GRAPH.windows(2) {
            assert!(pair[0].id < pair[1].id);
        }
    }

    #[test]
    fn test_owners_exist() {
        for node in OBJECT_GRAPH.iter() {
            if node.kind == ObjectKind::PlugIn {
                assert_eq!(node.owner, K_AUDIO_OBJECT_UNKNOWN);
            } else {
                assert!(lookup(node.owner).is_some(), "{} has no owner", node.id);
            }
        }
    }

    #[test]
    fn test_children() {
        let plug_in: Vec<_> = children(K_OBJECT_ID_PLUG_IN).map(|n| n.id).collect();
        assert_eq!(plug_in, vec![K_OBJECT_ID_BOX, K_OBJECT_ID_DEVICE]);
        assert_eq!(children(K_OBJECT_ID_DEVICE).count(), 6);
        assert_eq!(children(K_OBJECT_ID_STREAM_INPUT).count(), 0);
    }

    #[test]
    fn test_stream_ids_by_scope() {
        assert_eq!(
            stream_ids(K_AUDIO_OBJECT_PROPERTY_SCOPE_GLOBAL),
            vec![K_OBJECT_ID_STREAM_INPUT, K_OBJECT_ID_STREAM_OUTPUT]
        );
        assert_eq!(
            stream_ids(K_AUDIO_OBJECT_PROPERTY_SCOPE_INPUT),
            vec![K_OBJECT_ID_STREAM_INPUT]
        );
        assert_eq!(
            control_ids(K_AUDIO_OBJECT_PROPERTY_SCOPE_OUTPUT),
            vec![K_OBJECT_ID_VOLUME_OUTPUT, K_OBJECT_ID_MUTE_OUTPUT]
        );
    }

    #[test]
    fn test_classes() {
        assert_eq!(ObjectKind::Device.class(), K_AUDIO_DEVICE_CLASS_ID);
        assert_eq!(ObjectKind::Device.base_class(), K_AUDIO_OBJECT_CLASS_ID);
        let volume = ObjectKind::Control(ControlKind::Volume, Direction::Input);
        assert_eq!(volume.base_class(), K_AUDIO_LEVEL_CONTROL_CLASS_ID);
        assert_eq!(volume.class(), K_AUDIO_VOLUME_CONTROL_CLASS_ID);
    }
}
