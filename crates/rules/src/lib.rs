//! 词库导入与存储
//!
//! 把表格行转换为替换词条，并以 JSON 词库文件的形式保存。
//! 表格本身的解析（xlsx 等）不在这里处理，调用方先导出为 CSV 或行数据。

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;
use wordswap_core::{Dictionary, Term};

pub type Result<T> = std::result::Result<T, RulesError>;

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV 解析失败: {0}")]
    Csv(#[from] csv::Error),
    #[error("词库文件格式错误: {0}")]
    Json(#[from] serde_json::Error),
}

/// 词库
///
/// 词条按原词长度降序存放，与导入时的排序一致。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPack {
    pub name: String,
    pub version: String,
    pub terms: Vec<Term>,
}

impl Default for WordPack {
    fn default() -> Self {
        Self::new("default")
    }
}

impl WordPack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: "1".to_string(),
            terms: Vec::new(),
        }
    }

    /// 读取词库文件，文件不存在时返回空词库
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("[WordPack] 词库文件不存在，使用空词库: {}", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)?;
        let pack: WordPack = serde_json::from_str(&raw)?;
        log::info!("[WordPack] 已加载 {} 个词条: {}", pack.terms.len(), path.display());
        Ok(pack)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)?;
        Ok(())
    }

    /// 用新词条整体替换词库内容（长词优先）
    ///
    /// 返回导入的词条数。
    pub fn import(&mut self, terms: Vec<Term>) -> usize {
        let mut terms = terms;
        terms.sort_by_key(|t| std::cmp::Reverse(t.char_len()));
        self.terms = terms;
        self.terms.len()
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// 转换为核心引擎使用的词典
    pub fn dictionary(&self) -> Dictionary {
        Dictionary::new(self.terms.clone())
    }
}

/// 把表格行转换为词条
///
/// 前两个单元格去除首尾空白后都非空、且不含换行符的行才会成为词条，其余行跳过。
/// 重复的原词以后出现的为准，但保留首次出现的位置。
pub fn terms_from_rows<I, R, S>(rows: I) -> Vec<Term>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut terms: Vec<Term> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0usize;

    for (row_index, row) in rows.into_iter().enumerate() {
        let row_number = row_index + 1;
        let mut cells = row.into_iter();
        let original = cells.next().map(|c| c.as_ref().trim().to_string());
        let substitute = cells.next().map(|c| c.as_ref().trim().to_string());

        let (original, substitute) = match (original, substitute) {
            (Some(o), Some(s)) if !o.is_empty() && !s.is_empty() => (o, s),
            _ => {
                skipped += 1;
                continue;
            }
        };

        if original.contains(['\n', '\r']) || substitute.contains(['\n', '\r']) {
            log::warn!(
                "[Rules] 跳过第 {} 行：{:?} -> {:?} 含换行符",
                row_number,
                original,
                substitute
            );
            skipped += 1;
            continue;
        }

        match index.get(&original) {
            Some(&i) => terms[i].substitute = substitute,
            None => {
                index.insert(original.clone(), terms.len());
                terms.push(Term::new(original, substitute));
            }
        }
    }

    if skipped > 0 {
        log::debug!("[Rules] 跳过 {} 个不完整的行", skipped);
    }
    terms
}

/// 从 CSV 文件读取词条（无表头，每行至少两列）
pub fn read_csv(path: &Path) -> Result<Vec<Term>> {
    let file = fs::File::open(path)?;
    read_csv_from(file)
}

pub fn read_csv_from<R: Read>(reader: R) -> Result<Vec<Term>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let terms = terms_from_rows(rows);
    log::info!("[Rules] CSV 导入 {} 个词条", terms.len());
    Ok(terms)
}
