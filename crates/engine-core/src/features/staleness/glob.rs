//! Minimal glob matcher supporting `*`, `**`, and `?` over `/`-separated
//! paths. Patterns are translated to an anchored regex once per call;
//! callers that match many files against a fixed pattern set should cache
//! the translation themselves.

use regex::Regex;

fn translate(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    // consume an optional following slash so `**/x` matches `x` too
                    if chars.peek() == Some(&'/') {
                        chars.next();
                    }
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str("[^/]*");
                }
            }
            '?' => out.push_str("[^/]"),
            '.' | '+' | '(' | ')' | '|' | '^' | '$' | '{' | '}' | '[' | ']' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            other => out.push(other),
        }
    }
    out.push('$');
    out
}

/// True if `path` (already forward-slash normalized) matches `pattern`.
pub fn glob_match(pattern: &str, path: &str) -> bool {
    match Regex::new(&translate(pattern)) {
        Ok(re) => re.is_match(path),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_star_matches_any_depth() {
        assert!(glob_match("**/node_modules/**", "a/b/node_modules/x.js"));
        assert!(glob_match("**/node_modules/**", "node_modules/x.js"));
        assert!(!glob_match("**/node_modules/**", "src/node_modules_like/x.js"));
    }

    #[test]
    fn single_star_matches_within_segment() {
        assert!(glob_match("**/*.lock", "a/b/Cargo.lock"));
        assert!(!glob_match("**/*.lock", "a/b/Cargo.lock.bak"));
    }

    #[test]
    fn literal_dots_are_escaped() {
        // without escaping, "." would match any char and "xlock" would pass
        assert!(!glob_match("**/*.lock", "a/xlock"));
        assert!(glob_match("**/*.lock", "a/x.lock"));
    }
}
