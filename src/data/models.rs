//! PCAP数据模型
//!
//! 定义全局文件头和数据包记录的结构，所有字段均按
//! 固定偏移做显式边界检查后解码，不做任何指针转换。
//!
//! 字段按写入时存储的字节序读取，本库不做字节序交换：
//! 实时捕获文件由同一主机写入，交换意图无法判定。

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone, Utc};

use crate::foundation::types::constants;

#[inline]
fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_ne_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[inline]
fn read_i32(bytes: &[u8], offset: usize) -> i32 {
    i32::from_ne_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// PCAP全局文件头
///
/// 文件起始的24字节结构。打开文件时仅要求其存在，
/// 字段内容默认不做校验（见 `ReaderConfig::validate_header`）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcapFileHeader {
    /// 文件标识
    pub magic_number: u32,
    /// 主版本号
    pub major_version: u16,
    /// 次版本号
    pub minor_version: u16,
    /// 时区偏移（秒，有符号）
    pub timezone_offset: i32,
    /// 时间戳精度
    pub timestamp_accuracy: u32,
    /// 最大捕获长度声明
    pub max_capture_length: u32,
    /// 链路层类型
    pub link_layer_type: u32,
}

impl PcapFileHeader {
    /// 文件头大小（字节）
    pub const HEADER_SIZE: usize =
        constants::GLOBAL_HEADER_SIZE;

    /// 从字节序列解析文件头
    pub fn from_bytes(
        bytes: &[u8],
    ) -> Result<Self, String> {
        if bytes.len() < Self::HEADER_SIZE {
            return Err(format!(
                "文件头字节数不足: 需要{}字节，实际{}字节",
                Self::HEADER_SIZE,
                bytes.len()
            ));
        }

        Ok(Self {
            magic_number: read_u32(bytes, 0),
            major_version: read_u16(bytes, 4),
            minor_version: read_u16(bytes, 6),
            timezone_offset: read_i32(bytes, 8),
            timestamp_accuracy: read_u32(bytes, 12),
            max_capture_length: read_u32(bytes, 16),
            link_layer_type: read_u32(bytes, 20),
        })
    }

    /// 序列化文件头为字节序列
    pub fn to_bytes(&self) -> [u8; Self::HEADER_SIZE] {
        let mut bytes = [0u8; Self::HEADER_SIZE];
        bytes[0..4].copy_from_slice(
            &self.magic_number.to_ne_bytes(),
        );
        bytes[4..6].copy_from_slice(
            &self.major_version.to_ne_bytes(),
        );
        bytes[6..8].copy_from_slice(
            &self.minor_version.to_ne_bytes(),
        );
        bytes[8..12].copy_from_slice(
            &self.timezone_offset.to_ne_bytes(),
        );
        bytes[12..16].copy_from_slice(
            &self.timestamp_accuracy.to_ne_bytes(),
        );
        bytes[16..20].copy_from_slice(
            &self.max_capture_length.to_ne_bytes(),
        );
        bytes[20..24].copy_from_slice(
            &self.link_layer_type.to_ne_bytes(),
        );
        bytes
    }

    /// 检查文件头标识和版本是否符合PCAP格式
    pub fn is_valid(&self) -> bool {
        (self.magic_number
            == constants::PCAP_MAGIC_NUMBER
            || self.magic_number
                == constants::PCAP_MAGIC_NANO)
            && self.major_version
                == constants::MAJOR_VERSION
    }
}

impl Default for PcapFileHeader {
    fn default() -> Self {
        Self {
            magic_number: constants::PCAP_MAGIC_NUMBER,
            major_version: constants::MAJOR_VERSION,
            minor_version: constants::MINOR_VERSION,
            timezone_offset: 0,
            timestamp_accuracy: 0,
            max_capture_length: 65535,
            link_layer_type: 1,
        }
    }
}

/// 数据包记录头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPacketHeader {
    /// 时间戳：秒部分
    pub timestamp_seconds: u32,
    /// 时间戳：微秒部分
    pub timestamp_microseconds: u32,
    /// 实际捕获长度（字节）
    pub captured_length: u32,
    /// 原始数据包长度（字节）
    pub original_length: u32,
}

impl DataPacketHeader {
    /// 记录头大小（字节）
    pub const HEADER_SIZE: usize =
        constants::PACKET_HEADER_SIZE;

    /// 从字节序列解析记录头
    pub fn from_bytes(
        bytes: &[u8],
    ) -> Result<Self, String> {
        if bytes.len() < Self::HEADER_SIZE {
            return Err(format!(
                "记录头字节数不足: 需要{}字节，实际{}字节",
                Self::HEADER_SIZE,
                bytes.len()
            ));
        }

        Ok(Self {
            timestamp_seconds: read_u32(bytes, 0),
            timestamp_microseconds: read_u32(bytes, 4),
            captured_length: read_u32(bytes, 8),
            original_length: read_u32(bytes, 12),
        })
    }

    /// 序列化记录头为字节序列
    pub fn to_bytes(&self) -> [u8; Self::HEADER_SIZE] {
        let mut bytes = [0u8; Self::HEADER_SIZE];
        bytes[0..4].copy_from_slice(
            &self.timestamp_seconds.to_ne_bytes(),
        );
        bytes[4..8].copy_from_slice(
            &self.timestamp_microseconds.to_ne_bytes(),
        );
        bytes[8..12].copy_from_slice(
            &self.captured_length.to_ne_bytes(),
        );
        bytes[12..16].copy_from_slice(
            &self.original_length.to_ne_bytes(),
        );
        bytes
    }

    /// 获取时间戳（纳秒）
    pub fn timestamp_ns(&self) -> u64 {
        self.timestamp_seconds as u64 * 1_000_000_000
            + self.timestamp_microseconds as u64 * 1_000
    }
}

/// 借用窗口字节的数据包视图
///
/// `data` 直接指向映射窗口内的载荷字节，在下一次可能
/// 滑动或解除映射的操作之前有效。需要长期持有时应
/// 调用 [`PacketRef::to_packet`] 复制为独立数据包。
#[derive(Debug, Clone, Copy)]
pub struct PacketRef<'a> {
    /// 记录头
    pub header: DataPacketHeader,
    /// 载荷字节（借用自映射窗口）
    pub data: &'a [u8],
}

impl<'a> PacketRef<'a> {
    /// 实际捕获长度（字节）
    pub fn captured_length(&self) -> u32 {
        self.header.captured_length
    }

    /// 获取时间戳（纳秒）
    pub fn timestamp_ns(&self) -> u64 {
        self.header.timestamp_ns()
    }

    /// 复制为拥有载荷的独立数据包
    pub fn to_packet(&self) -> DataPacket {
        DataPacket {
            header: self.header,
            data: self.data.to_vec(),
        }
    }
}

/// 拥有载荷的数据包
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPacket {
    /// 记录头
    pub header: DataPacketHeader,
    /// 载荷数据
    pub data: Vec<u8>,
}

impl DataPacket {
    /// 从捕获时间和载荷创建数据包
    pub fn from_datetime(
        capture_time: SystemTime,
        data: Vec<u8>,
    ) -> Result<Self, String> {
        let since_epoch = capture_time
            .duration_since(UNIX_EPOCH)
            .map_err(|e| {
                format!("捕获时间早于Unix纪元: {e}")
            })?;
        Ok(Self::from_timestamp(
            since_epoch.as_secs() as u32,
            since_epoch.subsec_micros(),
            data,
        ))
    }

    /// 从时间戳（秒+微秒）和载荷创建数据包
    pub fn from_timestamp(
        timestamp_seconds: u32,
        timestamp_microseconds: u32,
        data: Vec<u8>,
    ) -> Self {
        let length = data.len() as u32;
        Self {
            header: DataPacketHeader {
                timestamp_seconds,
                timestamp_microseconds,
                captured_length: length,
                original_length: length,
            },
            data,
        }
    }

    /// 载荷长度（字节）
    pub fn packet_length(&self) -> usize {
        self.data.len()
    }

    /// 获取时间戳（纳秒）
    pub fn get_timestamp_ns(&self) -> u64 {
        self.header.timestamp_ns()
    }

    /// 获取捕获时间（UTC）
    pub fn capture_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(
            self.header.timestamp_seconds as i64,
            self.header
                .timestamp_microseconds
                .saturating_mul(1_000),
        )
        .single()
    }

    /// 获取捕获时间（SystemTime）
    pub fn capture_system_time(&self) -> SystemTime {
        UNIX_EPOCH
            + Duration::new(
                self.header.timestamp_seconds as u64,
                self.header
                    .timestamp_microseconds
                    .saturating_mul(1_000),
            )
    }

    /// 序列化记录（记录头+载荷）为字节序列
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            DataPacketHeader::HEADER_SIZE
                + self.data.len(),
        );
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_header_roundtrip() {
        let header = PcapFileHeader {
            timezone_offset: -28800, // UTC+8 的西向偏移
            ..Default::default()
        };
        let bytes = header.to_bytes();
        let parsed = PcapFileHeader::from_bytes(&bytes)
            .expect("解析文件头失败");
        assert_eq!(parsed, header);
        assert_eq!(parsed.timezone_offset, -28800);
        assert!(parsed.is_valid());
    }

    #[test]
    fn test_file_header_too_short() {
        let bytes = [0u8; 10];
        assert!(PcapFileHeader::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_packet_header_roundtrip() {
        let header = DataPacketHeader {
            timestamp_seconds: 1_700_000_000,
            timestamp_microseconds: 123_456,
            captured_length: 60,
            original_length: 1500,
        };
        let bytes = header.to_bytes();
        let parsed = DataPacketHeader::from_bytes(&bytes)
            .expect("解析记录头失败");
        assert_eq!(parsed, header);
        assert_eq!(
            parsed.timestamp_ns(),
            1_700_000_000u64 * 1_000_000_000
                + 123_456_000
        );
    }

    #[test]
    fn test_packet_header_too_short() {
        let bytes = [0u8; 15];
        assert!(
            DataPacketHeader::from_bytes(&bytes).is_err()
        );
    }

    #[test]
    fn test_packet_from_timestamp() {
        let packet = DataPacket::from_timestamp(
            100,
            500_000,
            vec![1, 2, 3, 4],
        );
        assert_eq!(packet.packet_length(), 4);
        assert_eq!(packet.header.captured_length, 4);
        assert_eq!(packet.header.original_length, 4);
        assert_eq!(
            packet.get_timestamp_ns(),
            100_500_000_000
        );
    }
}
