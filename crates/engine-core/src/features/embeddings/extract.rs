//! Builds the exact input strings for each of the five aspect vectors
//! (spec §4.E). These functions produce the text an embedding provider is
//! asked to embed; they do no embedding themselves.

use crate::errors::CoreError;

const PURPOSE_MAX_BYTES: usize = 10 * 1024;
const SEMANTIC_CODE_SLICE_BYTES: usize = 500;
const MAX_USAGE_SIGNATURES: usize = 10;

fn strip_control_chars(s: &str) -> String {
    s.chars().filter(|c| !c.is_control()).collect()
}

/// Truncates `s` to at most `max_bytes`, landing on a char boundary.
fn truncate_bytes(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|&end| end <= max_bytes)
        .last()
        .unwrap_or(0);
    s[..end].to_string()
}

fn humanize_module_name(module_name: &str) -> String {
    module_name
        .split(|c: char| c == '_' || c == '-' || c == '/')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `llm_purpose` is the LLM-extracted statement when available; absent it,
/// the module name is humanized into a fallback. Non-empty after
/// normalization is required (spec §4.E.1).
pub fn extract_purpose(llm_purpose: Option<&str>, module_name: &str) -> Result<String, CoreError> {
    let raw = match llm_purpose {
        Some(p) => p.to_string(),
        None => humanize_module_name(module_name),
    };
    let stripped = strip_control_chars(&raw);
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        return Err(CoreError::PurposeInputInvalid(
            "purpose statement is empty after stripping control characters".to_string(),
        ));
    }
    Ok(truncate_bytes(trimmed, PURPOSE_MAX_BYTES))
}

/// `purpose + description + symbol list + first 500 bytes of code`.
pub fn extract_semantic(purpose: &str, description: Option<&str>, symbols: &[String], code: &str) -> String {
    let code_slice = truncate_bytes(code, SEMANTIC_CODE_SLICE_BYTES);
    let mut parts = vec![purpose.to_string()];
    if let Some(d) = description {
        parts.push(d.to_string());
    }
    if !symbols.is_empty() {
        parts.push(symbols.join(", "));
    }
    parts.push(code_slice);
    parts.join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeBucket {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

impl SizeBucket {
    fn from_loc(loc: usize) -> Self {
        match loc {
            0..=49 => SizeBucket::Tiny,
            50..=199 => SizeBucket::Small,
            200..=999 => SizeBucket::Medium,
            1000..=4999 => SizeBucket::Large,
            _ => SizeBucket::Huge,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            SizeBucket::Tiny => "tiny",
            SizeBucket::Small => "small",
            SizeBucket::Medium => "medium",
            SizeBucket::Large => "large",
            SizeBucket::Huge => "huge",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StructuralFacts {
    pub function_count: usize,
    pub class_count: usize,
    pub async_function_count: usize,
    pub exported_function_count: usize,
    pub has_class_with_inheritance: bool,
    pub loc: usize,
}

/// AST-derived counts, detected patterns, and a size bucket, flattened into
/// one input string.
pub fn extract_structural(facts: &StructuralFacts) -> String {
    let mut patterns = Vec::new();
    if facts.async_function_count > 0 {
        patterns.push("async-function");
    }
    if facts.exported_function_count > 0 {
        patterns.push("exported-function");
    }
    if facts.has_class_with_inheritance {
        patterns.push("class-with-inheritance");
    }

    format!(
        "functions={} classes={} patterns=[{}] size={}",
        facts.function_count,
        facts.class_count,
        patterns.join(","),
        SizeBucket::from_loc(facts.loc).as_str(),
    )
}

#[derive(Debug, Clone)]
pub struct ImportRef {
    pub path: String,
    pub is_external: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyFacts {
    pub imports: Vec<ImportRef>,
}

/// Known framework fingerprints matched against import paths (prefix match).
const FRAMEWORK_FINGERPRINTS: &[(&str, &str)] = &[
    ("react", "react"),
    ("next", "nextjs"),
    ("express", "express"),
    ("tokio", "tokio"),
    ("actix-web", "actix-web"),
    ("axum", "axum"),
    ("django", "django"),
    ("flask", "flask"),
    ("fastapi", "fastapi"),
    ("vue", "vue"),
    ("@angular", "angular"),
];

/// Categorized imports plus any detected framework fingerprints.
pub fn extract_dependency(facts: &DependencyFacts) -> String {
    let mut external: Vec<&str> = facts.imports.iter().filter(|i| i.is_external).map(|i| i.path.as_str()).collect();
    let mut local: Vec<&str> = facts.imports.iter().filter(|i| !i.is_external).map(|i| i.path.as_str()).collect();
    external.sort_unstable();
    local.sort_unstable();

    let mut frameworks: Vec<&str> = FRAMEWORK_FINGERPRINTS
        .iter()
        .filter(|(prefix, _)| facts.imports.iter().any(|i| i.path.starts_with(prefix)))
        .map(|(_, name)| *name)
        .collect();
    frameworks.sort_unstable();
    frameworks.dedup();

    format!(
        "external=[{}] local=[{}] frameworks=[{}]",
        external.join(","),
        local.join(","),
        frameworks.join(","),
    )
}

/// Exports plus up to ten public signatures.
pub fn extract_usage(exports: &[String], signatures: &[String]) -> String {
    let truncated: Vec<&str> = signatures.iter().take(MAX_USAGE_SIGNATURES).map(|s| s.as_str()).collect();
    format!("exports=[{}] signatures=[{}]", exports.join(","), truncated.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purpose_falls_back_to_humanized_module_name() {
        let purpose = extract_purpose(None, "auth_service").unwrap();
        assert_eq!(purpose, "Auth Service");
    }

    #[test]
    fn purpose_strips_control_characters() {
        let purpose = extract_purpose(Some("Handles\x07 auth\ttokens"), "x").unwrap();
        assert!(!purpose.contains('\x07'));
    }

    #[test]
    fn purpose_rejects_empty_after_normalization() {
        let result = extract_purpose(Some("\x01\x02"), "");
        assert!(result.is_err());
    }

    #[test]
    fn purpose_truncates_to_10kib() {
        let long = "a".repeat(20 * 1024);
        let purpose = extract_purpose(Some(&long), "x").unwrap();
        assert!(purpose.len() <= PURPOSE_MAX_BYTES);
    }

    #[test]
    fn semantic_combines_purpose_description_symbols_and_code_slice() {
        let semantic = extract_semantic("does auth", Some("a file"), &["login".to_string()], "fn login() {}");
        assert!(semantic.contains("does auth"));
        assert!(semantic.contains("a file"));
        assert!(semantic.contains("login"));
    }

    #[test]
    fn structural_reports_detected_patterns() {
        let facts = StructuralFacts {
            function_count: 3,
            class_count: 1,
            async_function_count: 1,
            exported_function_count: 2,
            has_class_with_inheritance: true,
            loc: 150,
        };
        let structural = extract_structural(&facts);
        assert!(structural.contains("async-function"));
        assert!(structural.contains("class-with-inheritance"));
        assert!(structural.contains("size=small"));
    }

    #[test]
    fn dependency_detects_known_frameworks() {
        let facts = DependencyFacts {
            imports: vec![
                ImportRef { path: "react".to_string(), is_external: true },
                ImportRef { path: "./utils".to_string(), is_external: false },
            ],
        };
        let dependency = extract_dependency(&facts);
        assert!(dependency.contains("frameworks=[react]"));
        assert!(dependency.contains("external=[react]"));
        assert!(dependency.contains("local=[./utils]"));
    }

    #[test]
    fn usage_caps_signatures_at_ten() {
        let signatures: Vec<String> = (0..20).map(|i| format!("fn f{i}()")).collect();
        let usage = extract_usage(&["f".to_string()], &signatures);
        assert_eq!(usage.matches('|').count(), MAX_USAGE_SIGNATURES - 1);
    }
}
