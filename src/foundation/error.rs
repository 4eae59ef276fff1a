use crate::foundation::types::PcapErrorCode;
use thiserror::Error;

/// PCAP操作错误
#[derive(Error, Debug)]
pub enum PcapError {
    #[error("文件未找到: {0}")]
    FileNotFound(String),

    #[error("文件打开或探测映射失败: {0}")]
    OpenFailed(String),

    #[error("无效的文件格式: {0}")]
    InvalidFormat(String),

    #[error("文件长度不足: 需要 {required} 字节，实际 {actual} 字节")]
    FileTooShort { required: u64, actual: u64 },

    #[error("文件被截断: 期望 {expected} 字节，剩余 {remaining} 字节，位置 {position}")]
    FileTruncated {
        expected: u64,
        remaining: u64,
        position: u64,
    },

    #[error("数据包长度超出允许上限: 声明 {captured} 字节，上限 {max} 字节，位置 {position}")]
    PacketTooBig {
        captured: u32,
        max: u32,
        position: u64,
    },

    #[error("数据包长度字段自相矛盾: 捕获长度 {captured} 超过原始长度 {original}，位置 {position}")]
    PacketCorrupted {
        captured: u32,
        original: u32,
        position: u64,
    },

    #[error("参数无效: {0}")]
    InvalidArgument(String),

    #[error("操作状态无效: {0}")]
    InvalidState(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("未知错误: {0}")]
    Unknown(String),
}

impl PcapError {
    /// 获取错误代码
    pub fn error_code(&self) -> PcapErrorCode {
        match self {
            PcapError::FileNotFound(_) => {
                PcapErrorCode::FileNotFound
            }
            PcapError::OpenFailed(_) => {
                PcapErrorCode::OpenFailed
            }
            PcapError::InvalidFormat(_) => {
                PcapErrorCode::InvalidFormat
            }
            PcapError::FileTooShort { .. } => {
                PcapErrorCode::FileTooShort
            }
            PcapError::FileTruncated { .. } => {
                PcapErrorCode::FileTruncated
            }
            PcapError::PacketTooBig { .. } => {
                PcapErrorCode::PacketTooBig
            }
            PcapError::PacketCorrupted { .. } => {
                PcapErrorCode::PacketCorrupted
            }
            PcapError::InvalidArgument(_) => {
                PcapErrorCode::InvalidArgument
            }
            PcapError::InvalidState(_) => {
                PcapErrorCode::InvalidState
            }
            PcapError::Io(_) => PcapErrorCode::Unknown,
            PcapError::Unknown(_) => PcapErrorCode::Unknown,
        }
    }

    /// 判断错误是否可重试
    ///
    /// 实时跟读场景下，文件长度不足和文件被截断都可能
    /// 只是写入方尚未写完，调用方可在 refresh 之后重试；
    /// 其余错误对当前读取器是终结性的。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PcapError::FileTooShort { .. }
                | PcapError::FileTruncated { .. }
        )
    }

    /// 获取详细错误信息
    pub fn detailed_message(&self) -> String {
        format!(
            "错误代码: {}, 错误信息: {}",
            self.error_code(),
            self
        )
    }
}

/// 结果类型别名
pub type PcapResult<T> = std::result::Result<T, PcapError>;

/// 从字符串错误转换为PcapError
impl From<String> for PcapError {
    fn from(err: String) -> Self {
        PcapError::Unknown(err)
    }
}

/// 从&str错误转换为PcapError
impl From<&str> for PcapError {
    fn from(err: &str) -> Self {
        PcapError::Unknown(err.to_string())
    }
}
