//! 测试公共工具模块
//!
//! 提供所有测试文件共用的辅助函数和工具

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use pcaplive_io::{
    DataPacket, DataPacketHeader, PcapFileHeader,
    PcapResult,
};

/// 在指定目录下创建只含全局文件头的PCAP文件
#[allow(dead_code)]
pub fn create_capture_file<P: AsRef<Path>>(
    dir: P,
    name: &str,
) -> PcapResult<PathBuf> {
    let path = dir.as_ref().join(name);
    let mut file = File::create(&path)
        .map_err(pcaplive_io::PcapError::Io)?;
    file.write_all(&PcapFileHeader::default().to_bytes())
        .map_err(pcaplive_io::PcapError::Io)?;
    Ok(path)
}

/// 向捕获文件追加一个数据包记录
#[allow(dead_code)]
pub fn append_packet<P: AsRef<Path>>(
    path: P,
    packet: &DataPacket,
) -> PcapResult<()> {
    append_raw(path, &packet.to_bytes())
}

/// 向捕获文件追加任意原始字节（用于构造损坏数据）
#[allow(dead_code)]
pub fn append_raw<P: AsRef<Path>>(
    path: P,
    bytes: &[u8],
) -> PcapResult<()> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(pcaplive_io::PcapError::Io)?;
    file.write_all(bytes)
        .map_err(pcaplive_io::PcapError::Io)?;
    file.flush().map_err(pcaplive_io::PcapError::Io)?;
    Ok(())
}

/// 创建具有确定性内容模式的测试数据包
#[allow(dead_code)]
pub fn make_packet(
    sequence: u32,
    size: usize,
) -> DataPacket {
    let mut data = vec![0u8; size];
    for (i, item) in data.iter_mut().enumerate() {
        *item = (i + sequence as usize) as u8;
    }
    DataPacket::from_timestamp(
        1_700_000_000 + sequence,
        sequence * 100,
        data,
    )
}

/// 对整个文件做一次参考解析
///
/// 一次性读入全部字节并顺序解码所有记录，作为窗口化
/// 读取结果的对照基准。
#[allow(dead_code)]
pub fn reference_parse<P: AsRef<Path>>(
    path: P,
) -> PcapResult<Vec<DataPacket>> {
    let bytes = fs::read(path)
        .map_err(pcaplive_io::PcapError::Io)?;
    let mut packets = Vec::new();
    let mut offset = PcapFileHeader::HEADER_SIZE;

    while offset + DataPacketHeader::HEADER_SIZE
        <= bytes.len()
    {
        let header = DataPacketHeader::from_bytes(
            &bytes[offset
                ..offset + DataPacketHeader::HEADER_SIZE],
        )
        .map_err(pcaplive_io::PcapError::InvalidFormat)?;
        let data_start =
            offset + DataPacketHeader::HEADER_SIZE;
        let data_end = data_start
            + header.captured_length as usize;
        if data_end > bytes.len() {
            break;
        }
        packets.push(DataPacket {
            header,
            data: bytes[data_start..data_end].to_vec(),
        });
        offset = data_end;
    }

    Ok(packets)
}
