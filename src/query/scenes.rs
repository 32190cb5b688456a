// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Scenepad-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Scenepad and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::SceneInfo;

/// Filters and orders `scenes` for a picker query.
///
/// An empty query keeps every scene in its given order. Otherwise scenes whose name or id
/// contains the query rank above fuzzy (subsequence) matches; non-matches are dropped.
pub fn rank_scenes<'a>(scenes: &'a [SceneInfo], query: &str) -> Vec<&'a SceneInfo> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return scenes.iter().collect();
    }

    let mut scored: Vec<(i64, usize)> = scenes
        .iter()
        .enumerate()
        .filter_map(|(idx, info)| {
            let name = info.display_name().to_lowercase();
            let by_name = score(&needle, &name);
            let by_id = score(&needle, &info.scene_id.as_str().to_lowercase()).map(|s| s / 2);
            by_name.max(by_id).map(|s| (s, idx))
        })
        .collect();
    // Stable: equal scores keep list order (most recent first).
    scored.sort_by(|(a, _), (b, _)| b.cmp(a));
    scored.into_iter().map(|(_, idx)| &scenes[idx]).collect()
}

fn score(needle: &str, haystack: &str) -> Option<i64> {
    if let Some(first) = haystack.find(needle) {
        let boundary =
            first == 0 || haystack[..first].chars().last().is_some_and(is_boundary_char);
        let mut score = 200_000i64.saturating_sub(first as i64 * 1000);
        score -= haystack.chars().count() as i64;
        if boundary {
            score += 20_000;
        }
        if haystack == needle {
            score += 100_000;
        }
        return Some(score);
    }

    let subseq = subsequence(needle, haystack)?;
    let ratio = rapidfuzz::fuzz::ratio(needle.chars(), haystack.chars());
    let mut score = (ratio * 1000.0).round() as i64;
    score -= subseq.span as i64;
    score += subseq.consecutive as i64 * 40;
    if subseq.start_boundary {
        score += 150;
    }
    Some(score)
}

struct Subsequence {
    span: usize,
    consecutive: usize,
    start_boundary: bool,
}

fn subsequence(needle: &str, haystack: &str) -> Option<Subsequence> {
    let mut wanted = needle.chars().peekable();
    let mut first = None;
    let mut last = 0;
    let mut prev_match: Option<usize> = None;
    let mut consecutive = 0;
    let mut start_boundary = false;
    let mut prev_char = None;

    for (idx, ch) in haystack.chars().enumerate() {
        let Some(&want) = wanted.peek() else {
            break;
        };
        if ch == want {
            wanted.next();
            if first.is_none() {
                first = Some(idx);
                start_boundary = prev_char.map_or(true, is_boundary_char);
            }
            if prev_match.is_some_and(|prev| idx == prev + 1) {
                consecutive += 1;
            }
            prev_match = Some(idx);
            last = idx;
        }
        prev_char = Some(ch);
    }

    if wanted.peek().is_some() {
        return None;
    }
    let first = first?;
    Some(Subsequence { span: last - first + 1, consecutive, start_boundary })
}

fn is_boundary_char(ch: char) -> bool {
    matches!(ch, '/' | ':' | '-' | '_' | ' ')
}
