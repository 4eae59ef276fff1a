//! 基础层
//!
//! 提供错误类型、错误代码和格式常量等基础设施。

pub mod error;
pub mod types;
