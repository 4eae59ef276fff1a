use serde::{Deserialize, Serialize};

/// 读取器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaderConfig {
    /// 是否在打开时校验全局文件头的标识和版本
    ///
    /// 默认关闭：与原始设计保持一致，文件头内容只要求
    /// 存在，不做格式校验。开启后标识或主版本不符会在
    /// 打开阶段直接报错。
    pub validate_header: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            validate_header: false,
        }
    }
}

impl ReaderConfig {
    /// 验证读取器配置的有效性
    pub fn validate(&self) -> Result<(), String> {
        // 当前所有字段组合均合法，保留校验入口以便扩展
        Ok(())
    }

    /// 重置为默认值
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
