//! 匹配解析
//!
//! 在原文中查找词典中所有原词的出现位置，并按长度优先策略消解冲突：
//! 长词先于短词处理，与已接受匹配重叠的候选一律丢弃。
//!
//! 匹配是纯字面子串匹配（区分大小写，不做分词），原词中的任何字符都按字面处理。

use crate::substitute::{Match, MatchSet};
use crate::term::{Dictionary, Term};
use std::collections::BTreeMap;

/// 候选匹配
struct Candidate<'a> {
    byte_start: usize,
    /// 词条在词典中的插入序号
    order: usize,
    term: &'a Term,
}

impl Candidate<'_> {
    fn byte_end(&self) -> usize {
        self.byte_start + self.term.original.len()
    }
}

/// 查找并消解所有匹配
///
/// 词条按原词长度分层处理（长的在前）。同一层内，所有词条的所有出现位置
/// 都是候选，按位置从左到右依次接受；同一位置的候选按插入顺序决定。
/// 任何与已接受匹配重叠的候选都被丢弃，因此结果与词典的排列顺序无关。
pub fn find_matches(text: &str, dictionary: &Dictionary) -> MatchSet {
    if text.is_empty() || dictionary.is_empty() {
        return MatchSet::default();
    }

    let prioritized = dictionary.by_priority();
    // byte_start -> 已接受的候选
    let mut accepted: BTreeMap<usize, Candidate<'_>> = BTreeMap::new();
    let mut rejected = 0usize;

    let mut tier_start = 0;
    while tier_start < prioritized.len() {
        let tier_len = prioritized[tier_start].1.char_len();
        let tier_end = prioritized[tier_start..]
            .iter()
            .position(|(_, term)| term.char_len() != tier_len)
            .map_or(prioritized.len(), |offset| tier_start + offset);

        let mut candidates = Vec::new();
        for &(order, term) in &prioritized[tier_start..tier_end] {
            collect_occurrences(text, order, term, &mut candidates);
        }
        candidates.sort_by_key(|c| (c.byte_start, c.order));

        for candidate in candidates {
            if overlaps_accepted(&accepted, &candidate) {
                rejected += 1;
                continue;
            }
            accepted.insert(candidate.byte_start, candidate);
        }

        tier_start = tier_end;
    }

    log::debug!(
        "[Resolver] {} 条词条，接受 {} 个匹配，丢弃 {} 个冲突候选",
        dictionary.len(),
        accepted.len(),
        rejected
    );

    MatchSet::from_sorted(to_matches(text, accepted))
}

/// 收集一个词条的全部出现位置（包括与自身重叠的位置）
fn collect_occurrences<'a>(text: &str, order: usize, term: &'a Term, out: &mut Vec<Candidate<'a>>) {
    let needle = term.original.as_str();
    if needle.is_empty() {
        return;
    }

    let mut from = 0;
    while let Some(found) = text[from..].find(needle) {
        let byte_start = from + found;
        out.push(Candidate {
            byte_start,
            order,
            term,
        });
        // 前进一个字符，保证 from 始终落在字符边界上
        from = byte_start + text[byte_start..].chars().next().map_or(1, char::len_utf8);
        if from >= text.len() {
            break;
        }
    }
}

/// 已接受区间互不重叠，只需检查起点小于候选终点的最后一个区间
fn overlaps_accepted(accepted: &BTreeMap<usize, Candidate<'_>>, candidate: &Candidate<'_>) -> bool {
    accepted
        .range(..candidate.byte_end())
        .next_back()
        .is_some_and(|(_, prev)| prev.byte_end() > candidate.byte_start)
}

/// 字节偏移换算为字符位置，生成按位置排序的匹配
fn to_matches(text: &str, accepted: BTreeMap<usize, Candidate<'_>>) -> Vec<Match> {
    let mut matches = Vec::with_capacity(accepted.len());
    let mut byte_cursor = 0;
    let mut char_cursor = 0;

    for (byte_start, candidate) in accepted {
        char_cursor += text[byte_cursor..byte_start].chars().count();
        let length = candidate.term.char_len();
        matches.push(Match {
            original: candidate.term.original.clone(),
            substitute: candidate.term.substitute.clone(),
            position: char_cursor,
            length,
            byte_start,
        });
        byte_cursor = candidate.byte_end();
        char_cursor += length;
    }

    matches
}
