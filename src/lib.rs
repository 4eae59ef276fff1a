//! # PcapLive.IO
//!
//! 支持实时增长文件的窗口化内存映射PCAP读取库。
//!
//! 读取器每次只映射两个内存页大小的文件窗口，按页
//! 滑动遍历数据包记录，内存占用与文件大小无关。针对
//! 正在被并发捕获进程追加写入的"活"文件，库把"尚未
//! 写入"（可重试）与"损坏/截断"（致命）明确区分：
//! 到达末尾后通过 `refresh` 加重试即可续读新数据。
//!
//! ## 基本用法
//!
//! ```no_run
//! use pcaplive_io::{PcapLiveReader, PcapResult};
//!
//! fn main() -> PcapResult<()> {
//!     let mut reader =
//!         PcapLiveReader::new("capture.pcap")?;
//!
//!     // 读取当前已写入的所有数据包
//!     for packet in reader.packets() {
//!         let packet = packet?;
//!         println!(
//!             "{} 字节 @ {} ns",
//!             packet.packet_length(),
//!             packet.get_timestamp_ns()
//!         );
//!     }
//!
//!     // 文件继续增长后续读
//!     reader.refresh();
//!     while let Some(packet) = reader.read_packet()? {
//!         println!("新增 {} 字节", packet.packet_length());
//!     }
//!
//!     reader.close();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod business;
pub mod data;
pub mod foundation;

pub use api::reader::{PacketIter, PcapLiveReader};
pub use business::config::ReaderConfig;
pub use data::models::{
    DataPacket, DataPacketHeader, PacketRef,
    PcapFileHeader,
};
pub use data::window::PageWindow;
pub use foundation::error::{PcapError, PcapResult};
pub use foundation::types::{constants, PcapErrorCode};
