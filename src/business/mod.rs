//! 业务层
//!
//! 提供读取器配置管理。

pub mod config;
