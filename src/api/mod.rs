//! API层
//!
//! 提供面向调用方的实时读取器接口。

pub mod reader;
