//! 行级标注
//!
//! 把替换轨迹投影到按行切分的文本上，分别生成原文坐标和替换后坐标
//! 两套高亮区间，供外部渲染器使用。

use crate::substitute::{MatchSet, ReplacementTrace};
use serde::{Deserialize, Serialize};

/// 高亮角色，决定渲染样式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// 原词
    Original,
    /// 替换词
    Substitute,
}

/// 行内高亮区间，以字符计，相对于行首
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub role: Role,
}

/// 带高亮的一行文本（不含换行符）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedLine {
    pub text: String,
    pub highlight_spans: Vec<HighlightSpan>,
}

impl AnnotatedLine {
    /// 按高亮区间切分本行
    ///
    /// 未高亮片段的角色为 `None`。空替换词会产生一个空的高亮片段。
    pub fn segments(&self) -> Vec<(&str, Option<Role>)> {
        let len = self.text.len();
        let offsets: Vec<usize> = self
            .text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(len))
            .collect();
        let to_byte = |c: usize| offsets.get(c).copied().unwrap_or(len);

        let mut segments = Vec::with_capacity(self.highlight_spans.len() * 2 + 1);
        let mut cursor = 0;
        for span in &self.highlight_spans {
            let start = to_byte(span.start).max(cursor);
            let end = to_byte(span.end).max(start);
            if start > cursor {
                segments.push((&self.text[cursor..start], None));
            }
            segments.push((&self.text[start..end], Some(span.role)));
            cursor = end;
        }
        if cursor < len {
            segments.push((&self.text[cursor..], None));
        }
        segments
    }

    pub fn is_highlighted(&self) -> bool {
        !self.highlight_spans.is_empty()
    }
}

/// 每个匹配在替换后文本中的位置（字符）
///
/// 位置 = 原位置 + 之前所有匹配的 (替换词长度 - 原词长度) 之和。
/// 这里用「已产出替换词长度 - 已消耗原词长度」累加，避免有符号运算。
pub fn replaced_positions(matches: &MatchSet) -> Vec<usize> {
    let mut consumed = 0;
    let mut produced = 0;
    matches
        .iter()
        .map(|m| {
            let position = m.position - consumed + produced;
            consumed += m.length;
            produced += m.substitute_len();
            position
        })
        .collect()
}

/// 生成原文行与替换后行的标注
///
/// 区间只会被分配给完整包含它的那一行；跨行的区间（原词或替换词中含换行符）
/// 会被丢弃并记录警告。
pub fn project(trace: &ReplacementTrace) -> (Vec<AnnotatedLine>, Vec<AnnotatedLine>) {
    let original_spans: Vec<(usize, usize)> = trace
        .matches
        .iter()
        .map(|m| (m.position, m.end()))
        .collect();

    let replaced_spans: Vec<(usize, usize)> = replaced_positions(&trace.matches)
        .into_iter()
        .zip(trace.matches.iter())
        .map(|(position, m)| (position, position + m.substitute_len()))
        .collect();

    let original = annotate_lines(&trace.original_text, &original_spans, Role::Original);
    let replaced = annotate_lines(&trace.replaced_text, &replaced_spans, Role::Substitute);

    log::debug!(
        "[Projector] 原文 {} 行，替换后 {} 行",
        original.len(),
        replaced.len()
    );

    (original, replaced)
}

/// 按 '\n' 切分文本并分配高亮区间
///
/// `spans` 为全文字符坐标，按起点升序且互不重叠。行尾的 '\r' 不计入行内容。
fn annotate_lines(text: &str, spans: &[(usize, usize)], role: Role) -> Vec<AnnotatedLine> {
    let mut lines = Vec::new();
    let mut next = 0;
    let mut line_start = 0;

    for raw in text.split('\n') {
        let content = raw.strip_suffix('\r').unwrap_or(raw);
        let content_end = line_start + content.chars().count();

        let mut highlight_spans = Vec::new();
        while let Some(&(start, end)) = spans.get(next) {
            if start > content_end {
                break;
            }
            next += 1;
            if start >= line_start && end <= content_end {
                highlight_spans.push(HighlightSpan {
                    start: start - line_start,
                    end: end - line_start,
                    role,
                });
            } else {
                log::warn!("[Projector] 丢弃跨行高亮区间 [{}, {})", start, end);
            }
        }

        lines.push(AnnotatedLine {
            text: content.to_string(),
            highlight_spans,
        });
        line_start += raw.chars().count() + 1;
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{apply_matches, find_matches, Dictionary, Term};

    fn trace(text: &str, pairs: &[(&str, &str)]) -> ReplacementTrace {
        let dict = Dictionary::new(pairs.iter().map(|(o, s)| Term::new(*o, *s)).collect());
        apply_matches(text, find_matches(text, &dict)).unwrap()
    }

    fn highlighted<'a>(line: &'a AnnotatedLine) -> Vec<&'a str> {
        line.segments()
            .into_iter()
            .filter(|(_, role)| role.is_some())
            .map(|(s, _)| s)
            .collect()
    }

    #[test]
    fn test_replaced_positions_cumulative_offset() {
        let t = trace("AB裁员CD裁员", &[("裁员", "优化人员结构"), ("CD", "")]);
        let positions = replaced_positions(&t.matches);
        assert_eq!(positions, vec![2, 8, 8]);

        let chars: Vec<char> = t.replaced_text.chars().collect();
        for (m, p) in t.matches.iter().zip(&positions) {
            let found: String = chars[*p..*p + m.substitute_len()].iter().collect();
            assert_eq!(found, m.substitute);
        }
    }

    #[test]
    fn test_project_single_line() {
        let t = trace("公司决定裁员以降低成本", &[("裁员", "优化人员结构")]);
        let (original, replaced) = project(&t);

        assert_eq!(
            original[0].highlight_spans,
            vec![HighlightSpan { start: 4, end: 6, role: Role::Original }]
        );
        assert_eq!(
            replaced[0].highlight_spans,
            vec![HighlightSpan { start: 4, end: 10, role: Role::Substitute }]
        );
        assert_eq!(highlighted(&original[0]), vec!["裁员"]);
        assert_eq!(highlighted(&replaced[0]), vec!["优化人员结构"]);
    }

    #[test]
    fn test_project_multi_line_relative_offsets() {
        let text = "第一行裁员\n第二行没有\r\n裁员与贿赂";
        let t = trace(text, &[("裁员", "优化"), ("贿赂", "礼品往来")]);
        let (original, replaced) = project(&t);

        assert_eq!(original.len(), 3);
        assert_eq!(replaced.len(), 3);
        assert_eq!(original[1].text, "第二行没有");
        assert!(!original[1].is_highlighted());

        assert_eq!(original[0].highlight_spans[0].start, 3);
        assert_eq!(original[2].highlight_spans.len(), 2);
        assert_eq!(original[2].highlight_spans[1].start, 3);
        assert_eq!(highlighted(&replaced[2]), vec!["优化", "礼品往来"]);
        assert_eq!(replaced[2].highlight_spans[1], HighlightSpan { start: 3, end: 7, role: Role::Substitute });
    }

    #[test]
    fn test_repeated_substitute_is_not_searched() {
        // 替换词与原文其他位置相同时，按偏移计算而不是查找
        let t = trace("XY A", &[("A", "XY")]);
        let (_, replaced) = project(&t);
        assert_eq!(replaced[0].text, "XY XY");
        assert_eq!(
            replaced[0].highlight_spans,
            vec![HighlightSpan { start: 3, end: 5, role: Role::Substitute }]
        );
    }

    #[test]
    fn test_empty_substitute_yields_zero_width_span() {
        let t = trace("a-b", &[("-", "")]);
        let (original, replaced) = project(&t);
        assert_eq!(original[0].highlight_spans[0], HighlightSpan { start: 1, end: 2, role: Role::Original });
        assert_eq!(replaced[0].highlight_spans[0], HighlightSpan { start: 1, end: 1, role: Role::Substitute });
        assert_eq!(
            replaced[0].segments(),
            vec![("a", None), ("", Some(Role::Substitute)), ("b", None)]
        );
    }

    #[test]
    fn test_span_across_newline_is_dropped() {
        // 词库会跳过含换行符的词条，这里直接构造匹配
        let matches = MatchSet::from_matches(vec![crate::Match {
            original: "b\nc".to_string(),
            substitute: "X".to_string(),
            position: 1,
            length: 3,
            byte_start: 1,
        }])
        .unwrap();
        let t = apply_matches("ab\ncd", matches).unwrap();
        let (original, replaced) = project(&t);
        assert!(original.iter().all(|l| l.highlight_spans.is_empty()));
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced[0].text, "aXd");
        assert_eq!(replaced[0].highlight_spans.len(), 1);
    }

    #[test]
    fn test_empty_text_has_one_empty_line() {
        let t = trace("", &[("a", "b")]);
        let (original, replaced) = project(&t);
        assert_eq!(original, vec![AnnotatedLine { text: String::new(), highlight_spans: vec![] }]);
        assert_eq!(replaced.len(), 1);
    }

    #[test]
    fn test_segments_without_spans() {
        let line = AnnotatedLine {
            text: "正常文本".to_string(),
            highlight_spans: vec![],
        };
        assert_eq!(line.segments(), vec![("正常文本", None)]);
    }
}
