//! Core orchestration for term replacement.
//!
//! 流程：词典 + 原文 → 匹配解析 → 顺序替换 → 双坐标行标注。

pub mod annotate;
pub mod document;
pub mod resolver;
pub mod substitute;
pub mod term;

pub use annotate::{project, AnnotatedLine, HighlightSpan, Role};
pub use document::{Document, Page};
pub use resolver::find_matches;
pub use substitute::{apply_matches, Match, MatchSet, ReplacementTrace};
pub use term::{Dictionary, Term};

use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("没有可处理的文本")]
    NoProcessableText,
    #[error("没有需要替换的内容")]
    NothingToReplace,
    #[error("匹配区间重叠: {first:?} 与 {second:?}")]
    Overlap {
        first: (usize, usize),
        second: (usize, usize),
    },
    #[error("匹配与原文不一致: 位置 {position} 处应为 {expected:?}")]
    MatchMismatch { position: usize, expected: String },
}

impl CoreError {
    /// 是否为内部一致性错误（区别于用户输入问题）
    pub fn is_internal(&self) -> bool {
        matches!(self, CoreError::Overlap { .. } | CoreError::MatchMismatch { .. })
    }
}

/// 一次完整替换的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replacement {
    pub trace: ReplacementTrace,
    /// 原文各行，高亮原词
    pub original_lines: Vec<AnnotatedLine>,
    /// 替换后各行，高亮替换词
    pub replaced_lines: Vec<AnnotatedLine>,
}

impl Replacement {
    pub fn match_count(&self) -> usize {
        self.trace.matches.len()
    }

    pub fn original_text(&self) -> &str {
        &self.trace.original_text
    }

    pub fn replaced_text(&self) -> &str {
        &self.trace.replaced_text
    }

    /// 面向调用方的摘要信息
    pub fn summary(&self) -> String {
        format!("替换完成，共替换了 {} 个词", self.match_count())
    }
}

/// 执行完整替换流程
///
/// 空文本或零匹配不会报错，由调用方根据 `match_count()` 决定是否失败。
pub fn process(text: &str, dictionary: &Dictionary) -> Result<Replacement> {
    let matches = find_matches(text, dictionary);
    let trace = apply_matches(text, matches)?;
    let (original_lines, replaced_lines) = project(&trace);

    log::info!(
        "[Core] 处理完成: {} 个匹配, 原文 {} 行",
        trace.matches.len(),
        original_lines.len()
    );

    Ok(Replacement {
        trace,
        original_lines,
        replaced_lines,
    })
}

/// 面向调用方的替换入口
///
/// 与 [`process`] 相同，但把空白文本报告为 `NoProcessableText`；
/// `strict` 为真时零匹配报告为 `NothingToReplace`。
pub fn process_document(text: &str, dictionary: &Dictionary, strict: bool) -> Result<Replacement> {
    if text.trim().is_empty() {
        return Err(CoreError::NoProcessableText);
    }

    let replacement = process(text, dictionary)?;
    if strict && replacement.match_count() == 0 {
        return Err(CoreError::NothingToReplace);
    }
    Ok(replacement)
}
