//! Query expansion: a bounded synonym and abbreviation table (spec §4.G).

use std::collections::HashMap;
use std::sync::OnceLock;

fn synonyms() -> &'static HashMap<&'static str, &'static [&'static str]> {
    static TABLE: OnceLock<HashMap<&'static str, &'static [&'static str]>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("auth", ["authentication", "authorization"].as_slice()),
            ("config", ["configuration", "settings"].as_slice()),
            ("db", ["database"].as_slice()),
            ("init", ["initialize", "setup"].as_slice()),
            ("func", ["function"].as_slice()),
            ("bug", ["defect", "issue"].as_slice()),
            ("perf", ["performance"].as_slice()),
        ])
    })
}

fn abbreviations() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        HashMap::from([
            ("ast", "abstract syntax tree"),
            ("api", "application programming interface"),
            ("orm", "object relational mapper"),
            ("ci", "continuous integration"),
            ("cd", "continuous delivery"),
            ("sdk", "software development kit"),
        ])
    })
}

/// Appends synonym/abbreviation expansions for every recognized token in
/// `query`, deduplicated, in first-seen order. The original query always
/// leads the result so exact-match scoring is unaffected.
pub fn expand_query(query: &str) -> String {
    let synonym_table = synonyms();
    let abbrev_table = abbreviations();
    let mut seen: Vec<String> = vec![query.to_string()];

    for token in query.split_whitespace() {
        let lower = token.to_lowercase();
        if let Some(expansion) = abbrev_table.get(lower.as_str()) {
            if !seen.iter().any(|s| s.eq_ignore_ascii_case(expansion)) {
                seen.push((*expansion).to_string());
            }
        }
        if let Some(syns) = synonym_table.get(lower.as_str()) {
            for syn in *syns {
                if !seen.iter().any(|s| s.eq_ignore_ascii_case(syn)) {
                    seen.push((*syn).to_string());
                }
            }
        }
    }

    seen.join(" ")
}
