//! File-extension-based language detection for the structural scanner.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Rust,
    Python,
    JavaScriptTs,
    Unknown,
}

impl Language {
    pub fn from_path(path: &str) -> Self {
        match path.rsplit('.').next() {
            Some("rs") => Language::Rust,
            Some("py") => Language::Python,
            Some("js") | Some("jsx") | Some("ts") | Some("tsx") | Some("mjs") | Some("cjs") => Language::JavaScriptTs,
            _ => Language::Unknown,
        }
    }
}
