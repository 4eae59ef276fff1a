//! 实时PCAP读取器模块
//!
//! 提供对单个PCAP文件的增量读取功能，支持读取正在被
//! 并发捕获进程追加写入的"活"文件。读取器只映射两个
//! 内存页大小的滑动窗口，不把整个文件读入内存。
//!
//! 到达文件末尾不是终结状态：调用方在 [`PcapLiveReader::refresh`]
//! 之后重试即可继续读取新追加的数据包。只有数据包长度
//! 字段违反约束或文件被外部收缩时，读取器才进入粘性的
//! 中断状态（见 [`PcapLiveReader::interrupted`]）。

use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use memmap2::Mmap;

use crate::business::config::ReaderConfig;
use crate::data::models::{
    DataPacket, DataPacketHeader, PacketRef,
    PcapFileHeader,
};
use crate::data::window::PageWindow;
use crate::foundation::error::{PcapError, PcapResult};

// 错误消息常量
const ERR_FILE_NOT_OPEN: &str = "文件未打开";
const ERR_WINDOW_NOT_MAPPED: &str = "窗口未映射";

/// 实时PCAP文件读取器
///
/// 提供对增长中PCAP文件的增量读取功能，支持：
/// - 两页滑动窗口映射，内存占用与文件大小无关
/// - 文件增长检测与 refresh/重试 续读协议
/// - 截断、超限与长度矛盾的精确错误分类
/// - 粘性中断标志，标记流位置不再可信的损坏
///
/// 读取器不做内部加锁，同一实例不可跨线程并发使用；
/// 不同文件上的独立读取器可以完全并行。
#[derive(Debug)]
pub struct PcapLiveReader {
    /// 文件句柄，close 之后为 None
    file: Option<File>,
    /// 文件路径
    file_path: PathBuf,
    /// 页面窗口管理器
    page_window: PageWindow,
    /// 当前映射窗口，读取进行中才存在
    window: Option<Mmap>,
    /// 窗口起始的文件偏移，始终页对齐
    window_offset: u64,
    /// 窗口内下一个记录头的偏移
    cursor: usize,
    /// 最近一次观察到的文件大小，0表示需要重新查询
    known_size: u64,
    /// 上一次观察到的文件大小，用于检测文件收缩
    prev_known_size: u64,
    /// 粘性中断标志，一旦置位不再清除
    interrupted: bool,
    /// 打开时读出的全局文件头
    global_header: PcapFileHeader,
    /// 配置信息
    configuration: ReaderConfig,
}

impl PcapLiveReader {
    /// 打开PCAP文件并创建读取器
    ///
    /// # 参数
    /// - `file_path` - PCAP文件路径
    ///
    /// # 返回
    /// 返回游标位于全局文件头之后的读取器实例
    pub fn new<P: AsRef<Path>>(
        file_path: P,
    ) -> PcapResult<Self> {
        Self::new_with_config(
            file_path,
            ReaderConfig::default(),
        )
    }

    /// 打开PCAP文件并创建读取器（带配置）
    ///
    /// 打开流程：获取只读句柄，在偏移0处做一次探测映射
    /// （不可映射的特殊文件在此处以更友好的错误失败），
    /// 查询文件大小并要求至少容纳全局文件头。
    ///
    /// # 参数
    /// - `file_path` - PCAP文件路径
    /// - `configuration` - 读取器配置信息
    pub fn new_with_config<P: AsRef<Path>>(
        file_path: P,
        configuration: ReaderConfig,
    ) -> PcapResult<Self> {
        configuration.validate().map_err(|e| {
            PcapError::InvalidArgument(format!(
                "读取器配置无效: {e}"
            ))
        })?;

        let path = file_path.as_ref();
        if !path.exists() {
            return Err(PcapError::FileNotFound(format!(
                "文件不存在: {path:?}"
            )));
        }

        let file = File::open(path).map_err(PcapError::Io)?;
        let page_window = PageWindow::new()?;

        // 探测映射：先于大小检查，保证特殊设备得到
        // 明确的"不可映射"错误而非"文件太小"
        let probe = page_window.map(&file, 0).map_err(
            |e| {
                PcapError::OpenFailed(format!(
                    "文件不可映射（可能是特殊设备）: {e}"
                ))
            },
        )?;

        let file_size = file
            .metadata()
            .map_err(PcapError::Io)?
            .len();

        if file_size < PcapFileHeader::HEADER_SIZE as u64 {
            return Err(PcapError::FileTooShort {
                required: PcapFileHeader::HEADER_SIZE
                    as u64,
                actual: file_size,
            });
        }

        // 大小检查通过后才能安全访问映射的头部字节
        let global_header = PcapFileHeader::from_bytes(
            &probe[..PcapFileHeader::HEADER_SIZE],
        )
        .map_err(PcapError::InvalidFormat)?;
        drop(probe);

        if configuration.validate_header
            && !global_header.is_valid()
        {
            return Err(PcapError::InvalidFormat(format!(
                "文件头标识或版本不符: 0x{:08X} v{}.{}",
                global_header.magic_number,
                global_header.major_version,
                global_header.minor_version
            )));
        }

        info!("成功打开PCAP文件: {path:?}");

        Ok(Self {
            file: Some(file),
            file_path: path.to_path_buf(),
            page_window,
            window: None,
            window_offset: 0,
            cursor: PcapFileHeader::HEADER_SIZE,
            known_size: file_size,
            prev_known_size: file_size,
            interrupted: false,
            global_header,
            configuration,
        })
    }

    /// 读取下一个数据包（零拷贝）
    ///
    /// 返回直接借用映射窗口的数据包视图，在下一次可能
    /// 滑动或解除映射的操作之前有效。
    ///
    /// # 返回
    /// - `Ok(Some(packet))` - 成功读取到数据包
    /// - `Ok(None)` - 恰好到达最后一个完整写入的字节
    ///   （非终结，追加后 refresh+重试 可继续）
    /// - `Err(error)` - 读取过程中发生错误
    pub fn next_packet(
        &mut self,
    ) -> PcapResult<Option<PacketRef<'_>>> {
        let file = self.file.as_ref().ok_or_else(|| {
            PcapError::InvalidState(
                ERR_FILE_NOT_OPEN.to_string(),
            )
        })?;

        // 1. 必要时重新查询文件大小并建立窗口映射
        if self.window.is_none() {
            if self.known_size == 0 {
                let size = file
                    .metadata()
                    .map_err(PcapError::Io)?
                    .len();

                // 收缩检查先于最小长度检查：文件被外部
                // 改写即视为不可恢复的损坏，但本次读取
                // 仍可能以更具体的原因失败
                if size < self.prev_known_size {
                    self.interrupted = true;
                    warn!(
                        "文件发生收缩: {} -> {} 字节，读取器进入中断状态",
                        self.prev_known_size, size
                    );
                }

                let required = self.window_offset
                    + self.cursor as u64
                    + DataPacketHeader::HEADER_SIZE as u64;
                if size < required {
                    return Err(PcapError::FileTooShort {
                        required,
                        actual: size,
                    });
                }

                self.prev_known_size = size;
                self.known_size = size;
                debug!("已更新文件大小: {size} 字节");
            }

            self.window = Some(
                self.page_window
                    .map(file, self.window_offset)?,
            );
        }

        // 2. 末尾与截断判定
        let header_pos =
            self.window_offset + self.cursor as u64;
        if header_pos == self.known_size {
            return Ok(None);
        }
        if header_pos
            + DataPacketHeader::HEADER_SIZE as u64
            > self.known_size
        {
            return Err(PcapError::FileTruncated {
                expected: DataPacketHeader::HEADER_SIZE
                    as u64,
                remaining: self
                    .known_size
                    .saturating_sub(header_pos),
                position: header_pos,
            });
        }

        // 3. 游标越过窗口中点时滑动一页
        let page = self.page_window.page_size();
        if self.cursor >= page {
            self.window = None;
            self.window_offset += page as u64;
            self.cursor -= page;
            self.window = Some(
                self.page_window
                    .map(file, self.window_offset)?,
            );
            debug!(
                "窗口已滑动至偏移 {}",
                self.window_offset
            );
        }

        let window =
            self.window.as_ref().ok_or_else(|| {
                PcapError::InvalidState(
                    ERR_WINDOW_NOT_MAPPED.to_string(),
                )
            })?;

        // 4. 解码并校验记录头
        let header = DataPacketHeader::from_bytes(
            &window[self.cursor
                ..self.cursor
                    + DataPacketHeader::HEADER_SIZE],
        )
        .map_err(PcapError::InvalidFormat)?;

        let max_snaplen = self.page_window.max_snaplen();
        if header.captured_length > max_snaplen {
            self.interrupted = true;
            warn!(
                "数据包捕获长度 {} 超出上限 {}，位置 {header_pos}，读取器进入中断状态",
                header.captured_length, max_snaplen
            );
            return Err(PcapError::PacketTooBig {
                captured: header.captured_length,
                max: max_snaplen,
                position: header_pos,
            });
        }
        if header.captured_length > header.original_length
        {
            self.interrupted = true;
            warn!(
                "数据包捕获长度 {} 超过原始长度 {}，位置 {header_pos}，读取器进入中断状态",
                header.captured_length,
                header.original_length
            );
            return Err(PcapError::PacketCorrupted {
                captured: header.captured_length,
                original: header.original_length,
                position: header_pos,
            });
        }

        // 5. 记录头完整但载荷尚未写全：不返回部分载荷
        let record_len = DataPacketHeader::HEADER_SIZE
            as u64
            + header.captured_length as u64;
        if header_pos + record_len > self.known_size {
            return Err(PcapError::FileTruncated {
                expected: record_len,
                remaining: self.known_size - header_pos,
                position: header_pos,
            });
        }

        // 6. 产出载荷视图并提交游标
        let data_start =
            self.cursor + DataPacketHeader::HEADER_SIZE;
        let data_end = data_start
            + header.captured_length as usize;
        let data = &window[data_start..data_end];
        self.cursor = data_end;

        Ok(Some(PacketRef { header, data }))
    }

    /// 读取下一个数据包（复制为独立数据包）
    ///
    /// # 返回
    /// - `Ok(Some(packet))` - 成功读取到数据包
    /// - `Ok(None)` - 到达文件末尾，无更多数据包
    /// - `Err(error)` - 读取过程中发生错误
    pub fn read_packet(
        &mut self,
    ) -> PcapResult<Option<DataPacket>> {
        match self.next_packet()? {
            Some(packet) => Ok(Some(packet.to_packet())),
            None => Ok(None),
        }
    }

    /// 批量读取多个数据包
    ///
    /// # 参数
    /// - `count` - 要读取的数据包数量
    ///
    /// # 返回
    /// 实际读取到的数据包（到达末尾时可能少于请求数量）
    pub fn read_packets(
        &mut self,
        count: usize,
    ) -> PcapResult<Vec<DataPacket>> {
        let mut packets = Vec::with_capacity(count);

        for _ in 0..count {
            if let Some(packet) = self.read_packet()? {
                packets.push(packet);
            } else {
                break; // 没有更多数据包
            }
        }

        Ok(packets)
    }

    /// 获取惰性数据包迭代器
    ///
    /// 迭代到文件末尾即结束；文件继续增长后，调用
    /// [`PcapLiveReader::refresh`] 再次获取迭代器即可从
    /// 中断位置继续，不重复也不丢失数据包。
    pub fn packets(&mut self) -> PacketIter<'_> {
        PacketIter { reader: self }
    }

    /// 重置文件大小观察，准备续读增长中的文件
    ///
    /// 解除当前窗口映射并把已知文件大小清零，下一次
    /// 读取会重新查询文件大小。这是到达末尾后续读新
    /// 追加数据的唯一机制。
    pub fn refresh(&mut self) {
        self.window = None;
        self.known_size = 0;
        debug!("读取器已重置文件大小观察");
    }

    /// 查询粘性中断标志
    ///
    /// 一旦数据包长度字段违反约束或文件被外部收缩，
    /// 该标志置位且不再清除。此后流位置不再可信，
    /// 继续读取的结果没有意义，但本库不强制阻止调用。
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// 关闭读取器
    ///
    /// 解除窗口映射并关闭文件句柄。重复关闭是无害的
    /// 空操作。
    pub fn close(&mut self) {
        self.window = None;
        if self.file.take().is_some() {
            debug!(
                "已关闭PCAP文件: {:?}",
                self.file_path
            );
        }
    }

    /// 获取文件路径
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// 获取配置信息
    pub fn configuration(&self) -> &ReaderConfig {
        &self.configuration
    }

    /// 获取打开时读出的全局文件头
    pub fn global_header(&self) -> &PcapFileHeader {
        &self.global_header
    }

    /// 下一个记录头的文件绝对偏移
    pub fn current_offset(&self) -> u64 {
        self.window_offset + self.cursor as u64
    }

    /// 最近一次观察到的文件大小（0表示待查询）
    pub fn known_file_size(&self) -> u64 {
        self.known_size
    }

    /// 单个数据包允许的最大捕获长度（字节）
    pub fn max_snaplen(&self) -> u32 {
        self.page_window.max_snaplen()
    }

    /// 检查是否已消费到最近观察的文件末尾
    pub fn is_eof(&self) -> bool {
        self.known_size != 0
            && self.current_offset() == self.known_size
    }
}

impl Drop for PcapLiveReader {
    fn drop(&mut self) {
        // 兜底释放：正常路径应由调用方显式 close
        self.close();
    }
}

/// 数据包迭代器
///
/// 产出拥有载荷的独立数据包。到达文件末尾即结束，
/// refresh 之后重新获取即可继续。
pub struct PacketIter<'a> {
    reader: &'a mut PcapLiveReader,
}

impl Iterator for PacketIter<'_> {
    type Item = PcapResult<DataPacket>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_packet() {
            Ok(Some(packet)) => Some(Ok(packet)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
