//! 统一文档接口定义
//!
//! 所有文件处理器都必须实现 `Document` trait。处理器只负责从容器格式中
//! 取出纯文本、把替换结果写回，匹配与替换统一交给核心引擎。

use crate::term::Dictionary;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// 页面数据结构
///
/// 对于无分页概念的文件（如 .txt），整个文件内容作为页码为 1 的唯一页面。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// 页码，从 1 开始
    pub page_number: u32,
    /// 页面的纯文本内容
    pub content: String,
}

/// 统一文档接口
pub trait Document: Send + Sync {
    /// 加载文档
    ///
    /// # 返回
    /// - 成功：已加载的文档实例
    /// - 失败：明确的错误信息（文件不存在、格式损坏等）
    fn load(path: &std::path::Path) -> Result<Self>
    where
        Self: Sized;

    /// 提取页面文本
    fn get_pages(&self) -> Result<Vec<Page>>;

    /// 执行替换
    ///
    /// 返回已替换文档的二进制数据。
    fn replace(&self, dictionary: &Dictionary) -> Result<Vec<u8>>;

    /// 声明支持的功能
    ///
    /// # 常见功能标识
    /// - `term_replace`: 词条替换
    /// - `annotate`: 双栏标注输出
    fn get_supported_features(&self) -> Vec<String>;
}
