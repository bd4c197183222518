//! Post-processing verification checks.
//!
//! 一致性检查失败说明引擎内部出错（`ok = false`）；残留词检查只产生警告。

use serde::{Deserialize, Serialize};
use wordswap_core::annotate::replaced_positions;
use wordswap_core::{Dictionary, Replacement};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOptions {
    /// 在替换后文本中搜索残留的原词
    pub text_search: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self { text_search: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyResult {
    pub ok: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// 校验一次替换结果
pub fn verify_replacement(
    replacement: &Replacement,
    dictionary: &Dictionary,
    options: &VerifyOptions,
) -> VerifyResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_consistency(replacement, &mut errors);
    if options.text_search {
        check_residual_terms(replacement, dictionary, &mut warnings);
    }

    for e in &errors {
        log::error!("[Verify] {}", e);
    }
    for w in &warnings {
        log::warn!("[Verify] {}", w);
    }

    VerifyResult {
        ok: errors.is_empty(),
        errors,
        warnings,
    }
}

fn check_consistency(replacement: &Replacement, errors: &mut Vec<String>) {
    let trace = &replacement.trace;
    let matches = trace.matches.as_slice();

    for pair in matches.windows(2) {
        if pair[0].end() > pair[1].position {
            errors.push(format!(
                "匹配重叠: [{}, {}) 与 [{}, {})",
                pair[0].position,
                pair[0].end(),
                pair[1].position,
                pair[1].end()
            ));
        }
    }

    // 用原文片段与替换词重建替换后文本
    let original: Vec<char> = trace.original_text.chars().collect();
    let mut rebuilt = String::with_capacity(trace.replaced_text.len());
    let mut cursor = 0;
    for m in matches {
        if m.position < cursor || m.end() > original.len() {
            errors.push(format!("匹配位置越界: {}", m.position));
            return;
        }
        let found: String = original[m.position..m.end()].iter().collect();
        if found != m.original {
            errors.push(format!("位置 {} 处原文为 {:?}，应为 {:?}", m.position, found, m.original));
        }
        rebuilt.extend(&original[cursor..m.position]);
        rebuilt.push_str(&m.substitute);
        cursor = m.end();
    }
    rebuilt.extend(&original[cursor..]);
    if rebuilt != trace.replaced_text {
        errors.push("替换后文本无法由匹配集合重建".to_string());
    }

    let delta: isize = matches
        .iter()
        .map(|m| m.substitute_len() as isize - m.length as isize)
        .sum();
    let expected_len = original.len() as isize + delta;
    let replaced: Vec<char> = trace.replaced_text.chars().collect();
    if replaced.len() as isize != expected_len {
        errors.push(format!(
            "替换后长度 {} 与预期 {} 不符",
            replaced.len(),
            expected_len
        ));
    }

    for (m, position) in matches.iter().zip(replaced_positions(&trace.matches)) {
        let end = position + m.substitute_len();
        let found: Option<String> = replaced.get(position..end).map(|s| s.iter().collect());
        if found.as_deref() != Some(m.substitute.as_str()) {
            errors.push(format!("替换词 {:?} 的位置换算错误: {}", m.substitute, position));
        }
    }

    if replacement.original_lines.len() != replacement.replaced_lines.len() {
        errors.push(format!(
            "行数不一致: 原文 {} 行，替换后 {} 行",
            replacement.original_lines.len(),
            replacement.replaced_lines.len()
        ));
    }
}

fn check_residual_terms(replacement: &Replacement, dictionary: &Dictionary, warnings: &mut Vec<String>) {
    let replaced = replacement.replaced_text();
    // 原词与替换词相同的词条本就保留原文
    for term in dictionary.terms().iter().filter(|t| t.original != t.substitute) {
        let count = replaced.matches(term.original.as_str()).count();
        if count > 0 {
            warnings.push(format!("替换后文本中仍含有 {:?}（{} 处）", term.original, count));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wordswap_core::{process, Term};

    fn dict(pairs: &[(&str, &str)]) -> Dictionary {
        Dictionary::new(pairs.iter().map(|(o, s)| Term::new(*o, *s)).collect())
    }

    #[test]
    fn test_clean_replacement_passes() {
        let d = dict(&[("贿赂", "礼品"), ("贿赂官员", "商业往来"), ("裁员", "")]);
        let r = process("贿赂官员\n随后裁员，再次贿赂", &d).unwrap();
        let result = verify_replacement(&r, &d, &VerifyOptions::default());
        assert!(result.ok, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_residual_term_is_warned() {
        // 替换词本身包含另一个原词
        let d = dict(&[("裁员", "减少裁员")]);
        let r = process("裁员", &d).unwrap();
        let result = verify_replacement(&r, &d, &VerifyOptions::default());
        assert!(result.ok);
        assert_eq!(result.warnings.len(), 1);

        let quiet = verify_replacement(&r, &d, &VerifyOptions { text_search: false });
        assert!(quiet.warnings.is_empty());
    }

    #[test]
    fn test_identity_term_is_not_warned() {
        let d = dict(&[("keep", "keep"), ("drop", "x")]);
        let r = process("keep drop", &d).unwrap();
        assert_eq!(r.match_count(), 2);

        let result = verify_replacement(&r, &d, &VerifyOptions::default());
        assert!(result.ok);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_tampered_text_fails() {
        let d = dict(&[("AA", "11"), ("BB", "22")]);
        let mut r = process("AABB", &d).unwrap();
        r.trace.replaced_text = "1222".to_string();
        let result = verify_replacement(&r, &d, &VerifyOptions::default());
        assert!(!result.ok);
        assert!(result.errors.iter().any(|e| e.contains("重建")));
    }
}
