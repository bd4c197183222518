//! 纯文本文档处理器
//!
//! 实现 `Document` trait，支持 .txt 和 .md 文件的加载、文本提取和词条替换。

use anyhow::{anyhow, Result};
use std::fs;
use std::path::{Path, PathBuf};
use wordswap_core::document::{Document, Page};
use wordswap_core::Dictionary;

/// 支持的扩展名
pub const EXTENSIONS: &[&str] = &["txt", "md"];

/// 纯文本文档处理器
///
/// 整个文件内容作为单页处理。
pub struct TextDocument {
    path: PathBuf,
    content: String,
}

impl Document for TextDocument {
    fn load(path: &Path) -> Result<Self>
    where
        Self: Sized,
    {
        if !path.exists() {
            return Err(anyhow!("文件不存在: {}", path.display()));
        }

        let content = fs::read_to_string(path).map_err(|e| anyhow!("无法读取文件: {}", e))?;
        log::debug!("[Text] 已读取 {} 字节: {}", content.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    fn get_pages(&self) -> Result<Vec<Page>> {
        Ok(vec![Page {
            page_number: 1,
            content: self.content.clone(),
        }])
    }

    fn replace(&self, dictionary: &Dictionary) -> Result<Vec<u8>> {
        let replacement = wordswap_core::process(&self.content, dictionary)?;
        log::info!("[Text] {}", replacement.summary());
        Ok(replacement.replaced_text().as_bytes().to_vec())
    }

    fn get_supported_features(&self) -> Vec<String> {
        vec!["term_replace".to_string(), "annotate".to_string()]
    }
}

impl TextDocument {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// 是否为本处理器支持的文件
    pub fn supports(path: &Path) -> bool {
        path.extension()
            .and_then(std::ffi::OsStr::to_str)
            .map(|ext| EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }
}
