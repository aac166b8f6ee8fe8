//! Core Audio 常量定义
//!
//! HAL 协议中使用的 FourCC 常量（selector / class / scope / status）。
//! 这里自行声明而不依赖 framework 头文件，使属性模型可以在任意平台上编译和测试。

/// Core Audio 类型定义
pub type AudioObjectID = u32;
pub type AudioClassID = u32;
pub type AudioObjectPropertySelector = u32;
pub type AudioObjectPropertyScope = u32;
pub type AudioObjectPropertyElement = u32;
pub type OSStatus = i32;

pub const K_AUDIO_OBJECT_UNKNOWN: AudioObjectID = 0;

// ============================================================================
// 类 ID
// ============================================================================

pub const K_AUDIO_OBJECT_CLASS_ID: AudioClassID = 0x616F626A; // 'aobj'
pub const K_AUDIO_PLUG_IN_CLASS_ID: AudioClassID = 0x61706C67; // 'aplg'
pub const K_AUDIO_BOX_CLASS_ID: AudioClassID = 0x61626F78; // 'abox'
pub const K_AUDIO_DEVICE_CLASS_ID: AudioClassID = 0x61646576; // 'adev'
pub const K_AUDIO_STREAM_CLASS_ID: AudioClassID = 0x61737472; // 'astr'
pub const K_AUDIO_LEVEL_CONTROL_CLASS_ID: AudioClassID = 0x6C65766C; // 'levl'
pub const K_AUDIO_VOLUME_CONTROL_CLASS_ID: AudioClassID = 0x766C6D65; // 'vlme'
pub const K_AUDIO_BOOLEAN_CONTROL_CLASS_ID: AudioClassID = 0x746F676C; // 'togl'
pub const K_AUDIO_MUTE_CONTROL_CLASS_ID: AudioClassID = 0x6D757465; // 'mute'

// ============================================================================
// Scope / Element
// ============================================================================

pub const K_AUDIO_OBJECT_PROPERTY_SCOPE_GLOBAL: AudioObjectPropertyScope = 0x676C6F62; // 'glob'
pub const K_AUDIO_OBJECT_PROPERTY_SCOPE_INPUT: AudioObjectPropertyScope = 0x696E7074; // 'inpt'
pub const K_AUDIO_OBJECT_PROPERTY_SCOPE_OUTPUT: AudioObjectPropertyScope = 0x6F757470; // 'outp'
pub const K_AUDIO_OBJECT_PROPERTY_ELEMENT_MAIN: AudioObjectPropertyElement = 0;

// ============================================================================
// AudioObject 通用属性
// ============================================================================

pub const K_AUDIO_OBJECT_PROPERTY_BASE_CLASS: AudioObjectPropertySelector = 0x62636C73; // 'bcls'
pub const K_AUDIO_OBJECT_PROPERTY_CLASS: AudioObjectPropertySelector = 0x636C6173; // 'clas'
pub const K_AUDIO_OBJECT_PROPERTY_OWNER: AudioObjectPropertySelector = 0x73746476; // 'stdv'
pub const K_AUDIO_OBJECT_PROPERTY_NAME: AudioObjectPropertySelector = 0x6C6E616D; // 'lnam'
pub const K_AUDIO_OBJECT_PROPERTY_MODEL_NAME: AudioObjectPropertySelector = 0x6C6D6F64; // 'lmod'
pub const K_AUDIO_OBJECT_PROPERTY_MANUFACTURER: AudioObjectPropertySelector = 0x6C6D616B; // 'lmak'
pub const K_AUDIO_OBJECT_PROPERTY_OWNED_OBJECTS: AudioObjectPropertySelector = 0x6F776E64; // 'ownd'
pub const K_AUDIO_OBJECT_PROPERTY_IDENTIFY: AudioObjectPropertySelector = 0x6964656E; // 'iden'
pub const K_AUDIO_OBJECT_PROPERTY_SERIAL_NUMBER: AudioObjectPropertySelector = 0x736E756D; // 'snum'
pub const K_AUDIO_OBJECT_PROPERTY_FIRMWARE_VERSION: AudioObjectPropertySelector = 0x6677766E; // 'fwvn'
pub const K_AUDIO_OBJECT_PROPERTY_CONTROL_LIST: AudioObjectPropertySelector = 0x6374726C; // 'ctrl'

// ============================================================================
// PlugIn 属性
// ============================================================================

pub const K_AUDIO_PLUG_IN_PROPERTY_BOX_LIST: AudioObjectPropertySelector = 0x626F7823; // 'box#'
pub const K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_BOX: AudioObjectPropertySelector = 0x75696462; // 'uidb'
pub const K_AUDIO_PLUG_IN_PROPERTY_DEVICE_LIST: AudioObjectPropertySelector = 0x64657623; // 'dev#'
pub const K_AUDIO_PLUG_IN_PROPERTY_TRANSLATE_UID_TO_DEVICE: AudioObjectPropertySelector =
    0x75696464; // 'uidd'
pub const K_AUDIO_PLUG_IN_PROPERTY_RESOURCE_BUNDLE: AudioObjectPropertySelector = 0x72737263; // 'rsrc'

// ============================================================================
// Box 属性
// ============================================================================

pub const K_AUDIO_BOX_PROPERTY_BOX_UID: AudioObjectPropertySelector = 0x62756964; // 'buid'
pub const K_AUDIO_BOX_PROPERTY_TRANSPORT_TYPE: AudioObjectPropertySelector = 0x7472616E; // 'tran'
pub const K_AUDIO_BOX_PROPERTY_HAS_AUDIO: AudioObjectPropertySelector = 0x62686175; // 'bhau'
pub const K_AUDIO_BOX_PROPERTY_HAS_VIDEO: AudioObjectPropertySelector = 0x62687669; // 'bhvi'
pub const K_AUDIO_BOX_PROPERTY_HAS_MIDI: AudioObjectPropertySelector = 0x62686D69; // 'bhmi'
pub const K_AUDIO_BOX_PROPERTY_IS_PROTECTED: AudioObjectPropertySelector = 0x6270726F; // 'bpro'
pub const K_AUDIO_BOX_PROPERTY_ACQUIRED: AudioObjectPropertySelector = 0x62786F6E; // 'bxon'
pub const K_AUDIO_BOX_PROPERTY_ACQUISITION_FAILED: AudioObjectPropertySelector = 0x62786F66; // 'bxof'
pub const K_AUDIO_BOX_PROPERTY_DEVICE_LIST: AudioObjectPropertySelector = 0x62647623; // 'bdv#'

// ============================================================================
// Device 属性
// ============================================================================

pub const K_AUDIO_DEVICE_PROPERTY_DEVICE_UID: AudioObjectPropertySelector = 0x75696420; // 'uid '
pub const K_AUDIO_DEVICE_PROPERTY_MODEL_UID: AudioObjectPropertySelector = 0x6D756964; // 'muid'
pub const K_AUDIO_DEVICE_PROPERTY_TRANSPORT_TYPE: AudioObjectPropertySelector = 0x7472616E; // 'tran'
pub const K_AUDIO_DEVICE_PROPERTY_RELATED_DEVICES: AudioObjectPropertySelector = 0x616B696E; // 'akin'
pub const K_AUDIO_DEVICE_PROPERTY_CLOCK_DOMAIN: AudioObjectPropertySelector = 0x636C6B64; // 'clkd'
pub const K_AUDIO_DEVICE_PROPERTY_DEVICE_IS_ALIVE: AudioObjectPropertySelector = 0x6C69766E; // 'livn'
pub const K_AUDIO_DEVICE_PROPERTY_DEVICE_IS_RUNNING: AudioObjectPropertySelector = 0x676F696E; // 'goin'
pub const K_AUDIO_DEVICE_PROPERTY_DEVICE_CAN_BE_DEFAULT_DEVICE: AudioObjectPropertySelector =
    0x64666C74; // 'dflt'
pub const K_AUDIO_DEVICE_PROPERTY_DEVICE_CAN_BE_DEFAULT_SYSTEM_DEVICE: AudioObjectPropertySelector =
    0x73666C74; // 'sflt'
pub const K_AUDIO_DEVICE_PROPERTY_LATENCY: AudioObjectPropertySelector = 0x6C746E63; // 'ltnc'
pub const K_AUDIO_DEVICE_PROPERTY_STREAMS: AudioObjectPropertySelector = 0x73746D23; // 'stm#'
pub const K_AUDIO_DEVICE_PROPERTY_SAFETY_OFFSET: AudioObjectPropertySelector = 0x73616674; // 'saft'
pub const K_AUDIO_DEVICE_PROPERTY_NOMINAL_SAMPLE_RATE: AudioObjectPropertySelector = 0x6E737274; // 'nsrt'
pub const K_AUDIO_DEVICE_PROPERTY_AVAILABLE_NOMINAL_SAMPLE_RATES: AudioObjectPropertySelector =
    0x6E737223; // 'nsr#'
pub const K_AUDIO_DEVICE_PROPERTY_IS_HIDDEN: AudioObjectPropertySelector = 0x6869646E; // 'hidn'
pub const K_AUDIO_DEVICE_PROPERTY_ZERO_TIME_STAMP_PERIOD: AudioObjectPropertySelector = 0x72696E67; // 'ring'
pub const K_AUDIO_DEVICE_PROPERTY_CONFIGURATION_APPLICATION: AudioObjectPropertySelector =
    0x63617070; // 'capp'
pub const K_AUDIO_DEVICE_PROPERTY_PREFERRED_CHANNELS_FOR_STEREO: AudioObjectPropertySelector =
    0x64636832; // 'dch2'

// ============================================================================
// Stream 属性
// ============================================================================

pub const K_AUDIO_STREAM_PROPERTY_IS_ACTIVE: AudioObjectPropertySelector = 0x73616374; // 'sact'
pub const K_AUDIO_STREAM_PROPERTY_DIRECTION: AudioObjectPropertySelector = 0x73646972; // 'sdir'
pub const K_AUDIO_STREAM_PROPERTY_TERMINAL_TYPE: AudioObjectPropertySelector = 0x7465726D; // 'term'
pub const K_AUDIO_STREAM_PROPERTY_STARTING_CHANNEL: AudioObjectPropertySelector = 0x7363686E; // 'schn'
pub const K_AUDIO_STREAM_PROPERTY_LATENCY: AudioObjectPropertySelector = 0x6C746E63; // 'ltnc'
pub const K_AUDIO_STREAM_PROPERTY_VIRTUAL_FORMAT: AudioObjectPropertySelector = 0x73666D74; // 'sfmt'
pub const K_AUDIO_STREAM_PROPERTY_AVAILABLE_VIRTUAL_FORMATS: AudioObjectPropertySelector =
    0x73666D61; // 'sfma'
pub const K_AUDIO_STREAM_PROPERTY_PHYSICAL_FORMAT: AudioObjectPropertySelector = 0x70667420; // 'pft '
pub const K_AUDIO_STREAM_PROPERTY_AVAILABLE_PHYSICAL_FORMATS: AudioObjectPropertySelector =
    0x70667461; // 'pfta'

// ============================================================================
// Control 属性
// ============================================================================

pub const K_AUDIO_CONTROL_PROPERTY_SCOPE: AudioObjectPropertySelector = 0x63736370; // 'cscp'
pub const K_AUDIO_CONTROL_PROPERTY_ELEMENT: AudioObjectPropertySelector = 0x63656C6D; // 'celm'
pub const K_AUDIO_LEVEL_CONTROL_PROPERTY_SCALAR_VALUE: AudioObjectPropertySelector = 0x6C637376; // 'lcsv'
pub const K_AUDIO_LEVEL_CONTROL_PROPERTY_DECIBEL_VALUE: AudioObjectPropertySelector = 0x6C636476; // 'lcdv'
pub const K_AUDIO_LEVEL_CONTROL_PROPERTY_DECIBEL_RANGE: AudioObjectPropertySelector = 0x6C636472; // 'lcdr'
pub const K_AUDIO_LEVEL_CONTROL_PROPERTY_CONVERT_SCALAR_TO_DECIBELS: AudioObjectPropertySelector =
    0x6C637364; // 'lcsd'
pub const K_AUDIO_LEVEL_CONTROL_PROPERTY_CONVERT_DECIBELS_TO_SCALAR: AudioObjectPropertySelector =
    0x6C636473; // 'lcds'
pub const K_AUDIO_BOOLEAN_CONTROL_PROPERTY_VALUE: AudioObjectPropertySelector = 0x6263766C; // 'bcvl'

// ============================================================================
// 属性值常量
// ============================================================================

pub const K_AUDIO_DEVICE_TRANSPORT_TYPE_VIRTUAL: u32 = 0x76697274; // 'virt'
pub const K_AUDIO_STREAM_TERMINAL_TYPE_LINE: u32 = 0x6C696E65; // 'line'

pub const K_AUDIO_FORMAT_LINEAR_PCM: u32 = 0x6C70636D; // 'lpcm'
pub const K_AUDIO_FORMAT_FLAG_IS_FLOAT: u32 = 1 << 0;
pub const K_AUDIO_FORMAT_FLAG_IS_SIGNED_INTEGER: u32 = 1 << 2;
pub const K_AUDIO_FORMAT_FLAG_IS_PACKED: u32 = 1 << 3;

// ============================================================================
// I/O 操作 ID
// ============================================================================

pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_THREAD: u32 = 0x74687264; // 'thrd'
pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_CYCLE: u32 = 0x6379636C; // 'cycl'
pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_READ_INPUT: u32 = 0x72656164; // 'read'
pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_CONVERT_INPUT: u32 = 0x63696E70; // 'cinp'
pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_PROCESS_INPUT: u32 = 0x70696E70; // 'pinp'
pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_PROCESS_OUTPUT: u32 = 0x706F7574; // 'pout'
pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_MIX_OUTPUT: u32 = 0x6D69786F; // 'mixo'
pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_PROCESS_MIX: u32 = 0x706D6978; // 'pmix'
pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_CONVERT_MIX: u32 = 0x636D6978; // 'cmix'
pub const K_AUDIO_SERVER_PLUG_IN_IO_OPERATION_WRITE_MIX: u32 = 0x72697465; // 'rite'

// ============================================================================
// 状态码
// ============================================================================

pub const K_AUDIO_HARDWARE_NO_ERROR: OSStatus = 0;
pub const K_AUDIO_HARDWARE_NOT_RUNNING_ERROR: OSStatus = 0x73746F70; // 'stop'
pub const K_AUDIO_HARDWARE_UNSPECIFIED_ERROR: OSStatus = 0x77686174; // 'what'
pub const K_AUDIO_HARDWARE_UNKNOWN_PROPERTY_ERROR: OSStatus = 0x77686F3F; // 'who?'
pub const K_AUDIO_HARDWARE_BAD_PROPERTY_SIZE_ERROR: OSStatus = 0x2173697A; // '!siz'
pub const K_AUDIO_HARDWARE_ILLEGAL_OPERATION_ERROR: OSStatus = 0x6E6F7065; // 'nope'
pub const K_AUDIO_HARDWARE_BAD_OBJECT_ERROR: OSStatus = 0x216F626A; // '!obj'
pub const K_AUDIO_HARDWARE_UNSUPPORTED_OPERATION_ERROR: OSStatus = 0x756E6F70; // 'unop'
pub const E_NOINTERFACE: OSStatus = 0x80000004_u32 as i32;

/// 将 FourCC 格式化为可读字符串（日志用）
pub fn fourcc_to_string(code: u32) -> String {
    let bytes = code.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        format!("'{}'", String::from_utf8_lossy(&bytes))
    } else {
        format!("0x{:08X}", code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourcc_to_string() {
        assert_eq!(fourcc_to_string(K_AUDIO_OBJECT_PROPERTY_NAME), "'lnam'");
        assert_eq!(fourcc_to_string(K_AUDIO_DEVICE_PROPERTY_DEVICE_UID), "'uid '");
        assert_eq!(fourcc_to_string(K_AUDIO_HARDWARE_BAD_OBJECT_ERROR as u32), "'!obj'");
        assert_eq!(fourcc_to_string(0), "0x00000000");
    }

    #[test]
    fn test_status_codes_match_fourcc() {
        assert_eq!(
            K_AUDIO_HARDWARE_UNKNOWN_PROPERTY_ERROR.to_be_bytes(),
            *b"who?"
        );
        assert_eq!(K_AUDIO_HARDWARE_BAD_PROPERTY_SIZE_ERROR.to_be_bytes(), *b"!siz");
        assert_eq!(K_AUDIO_HARDWARE_UNSUPPORTED_OPERATION_ERROR.to_be_bytes(), *b"unop");
    }
}
