//! 顺序替换引擎
//!
//! 匹配集合已按位置排序且互不重叠，替换只需沿原文从左到右走一遍：
//! 未匹配片段原样拷贝，匹配片段写入替换词。所有位置都指向原文，
//! 不做原地字符串手术，后续匹配的位置不会因前面的替换而失效。

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// 一次被接受的匹配
///
/// `position` 与 `length` 以字符计；`byte_start` 是同一位置的 UTF-8 字节偏移，
/// 用于切片。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub original: String,
    pub substitute: String,
    pub position: usize,
    pub length: usize,
    pub byte_start: usize,
}

impl Match {
    /// 原文中的结束位置（字符，不含）
    pub fn end(&self) -> usize {
        self.position + self.length
    }

    pub fn byte_end(&self) -> usize {
        self.byte_start + self.original.len()
    }

    pub fn substitute_len(&self) -> usize {
        self.substitute.chars().count()
    }

    /// 区间 [a1,a2) 与 [b1,b2) 重叠当且仅当 a1 < b2 且 b1 < a2
    pub fn overlaps(&self, other: &Match) -> bool {
        self.position < other.end() && other.position < self.end()
    }
}

/// 按位置升序、互不重叠的匹配集合
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Match>", into = "Vec<Match>")]
pub struct MatchSet {
    matches: Vec<Match>,
}

impl MatchSet {
    /// 排序并校验互不重叠
    pub fn from_matches(mut matches: Vec<Match>) -> Result<Self> {
        matches.sort_by_key(|m| m.position);
        for pair in matches.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(CoreError::Overlap {
                    first: (pair[0].position, pair[0].end()),
                    second: (pair[1].position, pair[1].end()),
                });
            }
        }
        Ok(Self { matches })
    }

    /// 解析器内部使用，调用方需保证已排序且不重叠
    pub(crate) fn from_sorted(matches: Vec<Match>) -> Self {
        debug_assert!(matches.windows(2).all(|p| p[0].end() <= p[1].position));
        Self { matches }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn as_slice(&self) -> &[Match] {
        &self.matches
    }
}

impl TryFrom<Vec<Match>> for MatchSet {
    type Error = CoreError;

    fn try_from(matches: Vec<Match>) -> Result<Self> {
        Self::from_matches(matches)
    }
}

impl From<MatchSet> for Vec<Match> {
    fn from(set: MatchSet) -> Self {
        set.matches
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

/// 替换轨迹：匹配集合及其派生的替换后文本
///
/// 匹配位置仍指向原文坐标，换算到替换后坐标由标注阶段完成。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplacementTrace {
    pub original_text: String,
    pub replaced_text: String,
    pub matches: MatchSet,
}

/// 将匹配集合应用到原文
///
/// 每个匹配都会与原文核对（字节区间、字符位置、原词内容），
/// 不一致时返回内部一致性错误而不是产出错误文本。
pub fn apply_matches(text: &str, matches: MatchSet) -> Result<ReplacementTrace> {
    let mut replaced = String::with_capacity(text.len());
    let mut byte_cursor = 0;
    let mut char_cursor = 0;
    let mut previous: Option<&Match> = None;

    for m in &matches {
        if m.byte_start < byte_cursor {
            let prev = previous.map(|p| (p.position, p.end())).unwrap_or((0, 0));
            return Err(CoreError::Overlap {
                first: prev,
                second: (m.position, m.end()),
            });
        }

        let mismatch = || CoreError::MatchMismatch {
            position: m.position,
            expected: m.original.clone(),
        };

        let gap = text.get(byte_cursor..m.byte_start).ok_or_else(mismatch)?;
        let found = text.get(m.byte_start..m.byte_end()).ok_or_else(mismatch)?;
        char_cursor += gap.chars().count();

        if found != m.original || char_cursor != m.position || m.length != found.chars().count() {
            return Err(mismatch());
        }

        replaced.push_str(gap);
        replaced.push_str(&m.substitute);

        byte_cursor = m.byte_end();
        char_cursor += m.length;
        previous = Some(m);
    }

    replaced.push_str(text.get(byte_cursor..).unwrap_or_default());

    log::debug!(
        "[Substitute] 应用 {} 个匹配，文本长度 {} -> {} 字节",
        matches.len(),
        text.len(),
        replaced.len()
    );

    Ok(ReplacementTrace {
        original_text: text.to_string(),
        replaced_text: replaced,
        matches,
    })
}
