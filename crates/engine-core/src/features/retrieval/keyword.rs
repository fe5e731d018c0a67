//! Weighted bag-of-matches keyword scoring (spec §4.G).

const FILENAME_WEIGHT: f64 = 3.0;
const MODULE_WEIGHT: f64 = 2.0;
const SYMBOL_WEIGHT: f64 = 1.0;
const CONTENT_WEIGHT: f64 = 0.5;
const CONTENT_SLICE_BYTES: usize = 1024;

pub struct KeywordCandidate<'a> {
    pub filename: &'a str,
    pub module_name: &'a str,
    pub symbol_names: &'a [String],
    pub content: &'a str,
}

fn count_matches(haystack: &str, terms: &[String]) -> usize {
    let haystack = haystack.to_lowercase();
    terms.iter().filter(|t| haystack.contains(t.as_str())).count()
}

/// Sums weighted term-presence across four fields, normalized by a padded
/// denominator (`terms.len() * total_weight`, plus one to avoid a zero
/// denominator for an empty query), clamped to `[0,1]`.
pub fn keyword_score(expanded_query: &str, candidate: &KeywordCandidate) -> f64 {
    let terms: Vec<String> = expanded_query.split_whitespace().map(|t| t.to_lowercase()).collect();
    if terms.is_empty() {
        return 0.0;
    }

    let filename_hits = count_matches(candidate.filename, &terms) as f64 * FILENAME_WEIGHT;
    let module_hits = count_matches(candidate.module_name, &terms) as f64 * MODULE_WEIGHT;
    let symbol_hits = candidate
        .symbol_names
        .iter()
        .map(|s| count_matches(s, &terms) as f64)
        .sum::<f64>()
        * SYMBOL_WEIGHT;

    let slice_end = candidate
        .content
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= CONTENT_SLICE_BYTES)
        .last()
        .unwrap_or(0);
    let content_slice = &candidate.content[..slice_end];
    let content_hits = count_matches(content_slice, &terms) as f64 * CONTENT_WEIGHT;

    let raw = filename_hits + module_hits + symbol_hits + content_hits;
    let total_weight = FILENAME_WEIGHT + MODULE_WEIGHT + SYMBOL_WEIGHT + CONTENT_WEIGHT;
    let denominator = terms.len() as f64 * total_weight + 1.0;

    (raw / denominator).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_match_outweighs_content_match() {
        let filename_candidate = KeywordCandidate {
            filename: "auth_service.rs",
            module_name: "unrelated",
            symbol_names: &[],
            content: "nothing relevant here",
        };
        let content_candidate = KeywordCandidate {
            filename: "unrelated.rs",
            module_name: "unrelated",
            symbol_names: &[],
            content: "auth logic lives here",
        };
        let a = keyword_score("auth", &filename_candidate);
        let b = keyword_score("auth", &content_candidate);
        assert!(a > b);
    }

    #[test]
    fn score_is_clamped_to_unit_interval() {
        let content = "auth ".repeat(500);
        let candidate = KeywordCandidate {
            filename: "auth auth auth",
            module_name: "auth",
            symbol_names: &["auth".to_string(); 20],
            content: &content,
        };
        let score = keyword_score("auth", &candidate);
        assert!(score <= 1.0);
    }

    #[test]
    fn empty_query_scores_zero() {
        let candidate = KeywordCandidate {
            filename: "a.rs",
            module_name: "a",
            symbol_names: &[],
            content: "",
        };
        assert_eq!(keyword_score("", &candidate), 0.0);
    }

    #[test]
    fn no_matches_scores_zero() {
        let candidate = KeywordCandidate {
            filename: "totally_unrelated.rs",
            module_name: "other",
            symbol_names: &[],
            content: "nothing matches",
        };
        assert_eq!(keyword_score("xyzzy", &candidate), 0.0);
    }
}
