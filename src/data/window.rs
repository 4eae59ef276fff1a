//! 页面窗口管理
//!
//! 管理固定为两个内存页大小的只读文件映射窗口。
//! 读取器每次只映射文件的一小段，通过按页滑动窗口
//! 遍历任意大小的文件，而不把整个文件读入内存。

use std::fs::File;

use log::debug;
use memmap2::{Mmap, MmapOptions};

use crate::foundation::error::{PcapError, PcapResult};
use crate::foundation::types::constants;

/// 页面窗口管理器
///
/// 创建时查询一次平台页大小，之后负责在页对齐的
/// 文件偏移处建立窗口映射。窗口恒为两页：一个记录头
/// 加上最大允许载荷（页大小减去记录头大小）必然完整
/// 落在一次滑动可覆盖的范围内。
#[derive(Debug, Clone, Copy)]
pub struct PageWindow {
    page_size: usize,
}

impl PageWindow {
    /// 创建窗口管理器并查询平台页大小
    pub fn new() -> PcapResult<Self> {
        let page_size = unsafe {
            libc::sysconf(libc::_SC_PAGESIZE)
        };
        if page_size <= 0 {
            return Err(PcapError::OpenFailed(
                "无法查询平台内存页大小".to_string(),
            ));
        }
        Ok(Self {
            page_size: page_size as usize,
        })
    }

    /// 平台页大小（字节）
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// 窗口长度（字节），固定为两页
    pub fn window_len(&self) -> usize {
        self.page_size * constants::WINDOW_PAGES
    }

    /// 单个数据包允许的最大捕获长度（字节）
    ///
    /// 页大小减去记录头大小。超过该值的记录无法保证
    /// 在两页窗口内完整可见，视为损坏。
    pub fn max_snaplen(&self) -> u32 {
        (self.page_size - constants::PACKET_HEADER_SIZE)
            as u32
    }

    /// 在页对齐偏移处建立只读窗口映射
    ///
    /// 映射由文件支撑、只读、非写时复制。映射长度可以
    /// 越过文件末尾（读取方通过已知文件大小保证不会
    /// 访问越界部分）。映射失败对调用操作是致命的，
    /// 不做重试。
    ///
    /// 解除映射即丢弃返回的 `Mmap`，与映射一一对应。
    pub fn map(
        &self,
        file: &File,
        offset: u64,
    ) -> PcapResult<Mmap> {
        debug_assert_eq!(
            offset % self.page_size as u64,
            0,
            "窗口偏移必须页对齐"
        );

        let view = unsafe {
            MmapOptions::new()
                .offset(offset)
                .len(self.window_len())
                .map(file)
                .map_err(PcapError::Io)?
        };

        debug!(
            "已映射窗口: 偏移 {offset}, 长度 {}",
            self.window_len()
        );
        Ok(view)
    }

}
