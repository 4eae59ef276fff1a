//! 数据层
//!
//! 提供PCAP格式的结构解码和页面窗口映射管理。

pub mod models;
pub mod window;
