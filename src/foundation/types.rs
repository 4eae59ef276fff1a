//! 公共类型和常量定义
//!
//! 定义整个库使用的通用类型和常量，为所有层提供基础数据类型支持。

/// PCAP格式常量定义
pub mod constants {
    /// PCAP文件标识（微秒时间精度），固定值 0xA1B2C3D4
    pub const PCAP_MAGIC_NUMBER: u32 = 0xA1B2C3D4;

    /// PCAP文件标识（纳秒时间精度），固定值 0xA1B23C4D
    pub const PCAP_MAGIC_NANO: u32 = 0xA1B23C4D;

    /// 主版本号，固定值 0x0002
    pub const MAJOR_VERSION: u16 = 2;

    /// 次版本号，固定值 0x0004
    pub const MINOR_VERSION: u16 = 4;

    /// 全局文件头大小（字节）
    pub const GLOBAL_HEADER_SIZE: usize = 24;

    /// 数据包记录头大小（字节）
    pub const PACKET_HEADER_SIZE: usize = 16;

    /// 映射窗口包含的内存页数量
    ///
    /// 窗口固定为两页，保证一个记录头加上最大长度的
    /// 载荷（页大小减去记录头大小）在一次滑动范围内
    /// 始终完整可见。
    pub const WINDOW_PAGES: usize = 2;
}

/// 错误代码枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcapErrorCode {
    /// 未知错误
    Unknown = 0,
    /// 文件未找到
    FileNotFound = 1001,
    /// 文件打开或探测映射失败
    OpenFailed = 1002,
    /// 无效的文件格式
    InvalidFormat = 2001,
    /// 文件长度不足
    FileTooShort = 2002,
    /// 文件被截断
    FileTruncated = 2003,
    /// 数据包长度超出允许上限
    PacketTooBig = 3001,
    /// 数据包长度字段自相矛盾
    PacketCorrupted = 3002,
    /// 参数无效
    InvalidArgument = 3004,
    /// 操作状态无效
    InvalidState = 3005,
}

impl std::fmt::Display for PcapErrorCode {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            PcapErrorCode::Unknown => write!(f, "未知错误"),
            PcapErrorCode::FileNotFound => {
                write!(f, "文件未找到")
            }
            PcapErrorCode::OpenFailed => {
                write!(f, "文件打开或探测映射失败")
            }
            PcapErrorCode::InvalidFormat => {
                write!(f, "无效的文件格式")
            }
            PcapErrorCode::FileTooShort => {
                write!(f, "文件长度不足")
            }
            PcapErrorCode::FileTruncated => {
                write!(f, "文件被截断")
            }
            PcapErrorCode::PacketTooBig => {
                write!(f, "数据包长度超出允许上限")
            }
            PcapErrorCode::PacketCorrupted => {
                write!(f, "数据包长度字段自相矛盾")
            }
            PcapErrorCode::InvalidArgument => {
                write!(f, "参数无效")
            }
            PcapErrorCode::InvalidState => {
                write!(f, "操作状态无效")
            }
        }
    }
}
