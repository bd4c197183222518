//! 替换词典
//!
//! 词典是调用方提供的不可变值，每次处理时传入。匹配阶段只读取它的
//! 优先级视图，从不原地排序。

use serde::{Deserialize, Serialize};

/// 一条替换规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// 原词（非空）
    pub original: String,
    /// 替换词，可以为空
    pub substitute: String,
}

impl Term {
    pub fn new(original: impl Into<String>, substitute: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            substitute: substitute.into(),
        }
    }

    /// 原词或替换词是否跨行
    pub fn has_line_break(&self) -> bool {
        let breaks = |s: &str| s.contains(['\n', '\r']);
        breaks(&self.original) || breaks(&self.substitute)
    }

    /// 原词长度（按字符计）
    pub fn char_len(&self) -> usize {
        self.original.chars().count()
    }
}

/// 替换词典
///
/// 构造时丢弃原词为空、或原词/替换词含换行符的条目，其余条目保持插入顺序。
/// 原词唯一性由调用方保证，这里不去重。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Term>", into = "Vec<Term>")]
pub struct Dictionary {
    terms: Vec<Term>,
    skipped: usize,
}

impl Dictionary {
    pub fn new(terms: Vec<Term>) -> Self {
        let total = terms.len();
        let mut kept = Vec::with_capacity(total);

        for (index, term) in terms.into_iter().enumerate() {
            if term.original.is_empty() {
                log::warn!("[Dictionary] 跳过第 {} 条：原词为空", index + 1);
                continue;
            }
            if term.has_line_break() {
                log::warn!(
                    "[Dictionary] 跳过第 {} 条：{:?} -> {:?} 含换行符",
                    index + 1,
                    term.original,
                    term.substitute
                );
                continue;
            }
            kept.push(term);
        }

        let skipped = total - kept.len();
        if skipped > 0 {
            log::info!("[Dictionary] 共 {} 条规则，跳过 {} 条", total, skipped);
        }

        Self {
            terms: kept,
            skipped,
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// 构造时被丢弃的条目数
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// 按匹配优先级排列的视图
    ///
    /// 原词越长优先级越高；等长时保持插入顺序。返回值携带插入序号。
    pub fn by_priority(&self) -> Vec<(usize, &Term)> {
        let mut ordered: Vec<(usize, usize, &Term)> = self
            .terms
            .iter()
            .enumerate()
            .map(|(index, term)| (term.char_len(), index, term))
            .collect();
        // sort_by 是稳定排序
        ordered.sort_by(|a, b| b.0.cmp(&a.0));
        ordered
            .into_iter()
            .map(|(_, index, term)| (index, term))
            .collect()
    }
}

impl From<Vec<Term>> for Dictionary {
    fn from(terms: Vec<Term>) -> Self {
        Self::new(terms)
    }
}

impl From<Dictionary> for Vec<Term> {
    fn from(dictionary: Dictionary) -> Self {
        dictionary.terms
    }
}

impl FromIterator<Term> for Dictionary {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
