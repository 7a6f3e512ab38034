use unicode_casefold::UnicodeCaseFold;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;
use crate::catalog::Catalog;
use crate::model::ScoredResult;

/// Score returned for an empty query.
pub const NEUTRAL_SCORE: i64 = 100;

const MATCH_SCORE: i64 = 10;
const CONSECUTIVE_STEP: i64 = 5;
const WORD_START_BONUS: i64 = 15;
const LENGTH_BONUS_CEILING: i64 = 50;
const EXACT_LENGTH_BONUS: i64 = 50;

/// NFC-normalized, case-folded form of `text`. Folding can leave
/// decomposed sequences behind, so it is normalized again.
fn fold(text: &str) -> String {
    text.nfc().case_fold().nfc().collect()
}

fn starts_word(previous: Option<&str>) -> bool {
    match previous.and_then(|g| g.chars().next()) {
        Some(ch) => !ch.is_alphabetic(),
        None => true,
    }
}

/// Ordered, case-insensitive subsequence score of `query` against `target`.
///
/// Both sides are compared as extended grapheme clusters after normalization
/// and full case folding, so `é` and `e\u{301}` are the same position and
/// `ß` matches `ss`. Returns `None` when some query grapheme cannot be found
/// in the rest of the target. A present score is always positive.
pub fn score(query: &str, target: &str) -> Option<i64> {
    if query.is_empty() {
        return Some(NEUTRAL_SCORE);
    }

    let folded_query = fold(query);
    let folded_target = fold(target);
    let query_graphemes: Vec<&str> = folded_query.graphemes(true).collect();
    let target_graphemes: Vec<&str> = folded_target.graphemes(true).collect();

    let mut query_index = 0;
    let mut score = 0;
    let mut consecutive_bonus = 0;
    let mut last_match: Option<usize> = None;

    for (target_index, &grapheme) in target_graphemes.iter().enumerate() {
        if query_index == query_graphemes.len() {
            break;
        }
        if query_graphemes[query_index] != grapheme {
            continue;
        }

        score += MATCH_SCORE;

        // Running bonus: grows while matches stay contiguous, resets on a gap.
        if last_match.is_some_and(|last| last + 1 == target_index) {
            consecutive_bonus += CONSECUTIVE_STEP;
            score += consecutive_bonus;
        } else {
            consecutive_bonus = 0;
        }

        let previous = target_index.checked_sub(1).map(|i| target_graphemes[i]);
        if starts_word(previous) {
            score += WORD_START_BONUS;
        }

        last_match = Some(target_index);
        query_index += 1;
    }

    if query_index != query_graphemes.len() {
        return None;
    }

    score += (LENGTH_BONUS_CEILING - target_graphemes.len() as i64).max(0);

    if query_graphemes.len() == target_graphemes.len() {
        score += EXACT_LENGTH_BONUS;
    }

    Some(score)
}

pub struct FuzzyMatcher;

impl FuzzyMatcher {
    /// Scores every catalog entry by name, drops non-matches and sorts by
    /// score descending. The sort is stable, so equal scores keep the
    /// catalog's alphabetical order.
    pub fn rank(query: &str, catalog: &Catalog) -> Vec<ScoredResult> {
        let mut results: Vec<ScoredResult> = catalog
            .entries()
            .iter()
            .filter_map(|entry| {
                score(query, &entry.name).map(|score| ScoredResult {
                    entry: entry.clone(),
                    score,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.cmp(&a.score));
        results
    }
}
