//! Regex-based counts, import extraction, and signature capture per
//! language, feeding `features::embeddings::extract_structural` /
//! `extract_dependency` / `extract_usage`.

use super::language::Language;
use crate::features::embeddings::{DependencyFacts, ImportRef, StructuralFacts};
use regex::Regex;
use std::sync::OnceLock;

struct RustPatterns {
    function: Regex,
    async_function: Regex,
    exported_function: Regex,
    type_decl: Regex,
    trait_with_supertrait: Regex,
    use_stmt: Regex,
}

fn rust_patterns() -> &'static RustPatterns {
    static PATTERNS: OnceLock<RustPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| RustPatterns {
        function: Regex::new(r"\bfn\s+\w+").unwrap(),
        async_function: Regex::new(r"\basync\s+fn\s+\w+").unwrap(),
        exported_function: Regex::new(r"\bpub(?:\([^)]*\))?\s+(?:async\s+)?fn\s+(\w+)").unwrap(),
        type_decl: Regex::new(r"\b(?:struct|enum|trait)\s+\w+").unwrap(),
        trait_with_supertrait: Regex::new(r"\btrait\s+\w+\s*:\s*\w+").unwrap(),
        use_stmt: Regex::new(r"(?m)^\s*use\s+([\w:]+)").unwrap(),
    })
}

struct PythonPatterns {
    function: Regex,
    async_function: Regex,
    exported_function: Regex,
    class_decl: Regex,
    class_with_base: Regex,
    import_stmt: Regex,
}

fn python_patterns() -> &'static PythonPatterns {
    static PATTERNS: OnceLock<PythonPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| PythonPatterns {
        function: Regex::new(r"\bdef\s+\w+").unwrap(),
        async_function: Regex::new(r"\basync\s+def\s+\w+").unwrap(),
        exported_function: Regex::new(r"(?m)^def\s+([a-zA-Z]\w*)").unwrap(),
        class_decl: Regex::new(r"\bclass\s+\w+").unwrap(),
        class_with_base: Regex::new(r"\bclass\s+\w+\s*\([^)]+\)").unwrap(),
        import_stmt: Regex::new(r"(?m)^(?:import|from)\s+([\w.]+)").unwrap(),
    })
}

struct JsTsPatterns {
    function: Regex,
    async_function: Regex,
    exported_function: Regex,
    class_decl: Regex,
    class_with_extends: Regex,
    import_stmt: Regex,
}

fn js_ts_patterns() -> &'static JsTsPatterns {
    static PATTERNS: OnceLock<JsTsPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| JsTsPatterns {
        function: Regex::new(r"\bfunction\s+\w+|=>\s*\{?").unwrap(),
        async_function: Regex::new(r"\basync\s+function|\basync\s*\(").unwrap(),
        exported_function: Regex::new(r"\bexport\s+(?:default\s+)?(?:async\s+)?function\s+(\w+)").unwrap(),
        class_decl: Regex::new(r"\bclass\s+\w+").unwrap(),
        class_with_extends: Regex::new(r"\bclass\s+\w+\s+extends\s+\w+").unwrap(),
        import_stmt: Regex::new(r#"import\s+.*?from\s+['"]([^'"]+)['"]"#).unwrap(),
    })
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub language: Language,
    pub structural: StructuralFacts,
    pub dependency: DependencyFacts,
    pub exports: Vec<String>,
    pub signatures: Vec<String>,
}

fn import_ref(path: &str, is_external: bool) -> ImportRef {
    ImportRef { path: path.to_string(), is_external }
}

pub fn scan_source(path: &str, content: &str) -> ScanResult {
    let language = Language::from_path(path);
    let loc = content.lines().count();

    match language {
        Language::Rust => scan_rust(content, loc),
        Language::Python => scan_python(content, loc),
        Language::JavaScriptTs => scan_js_ts(content, loc),
        Language::Unknown => ScanResult {
            language,
            structural: StructuralFacts { loc, ..Default::default() },
            dependency: DependencyFacts::default(),
            exports: Vec::new(),
            signatures: Vec::new(),
        },
    }
}

fn scan_rust(content: &str, loc: usize) -> ScanResult {
    let p = rust_patterns();
    let exported: Vec<String> = p.exported_function.captures_iter(content).map(|c| c[1].to_string()).collect();
    let imports = p
        .use_stmt
        .captures_iter(content)
        .map(|c| {
            let path = c[1].to_string();
            let is_external = !(path.starts_with("crate") || path.starts_with("self") || path.starts_with("super"));
            import_ref(&path, is_external)
        })
        .collect();

    ScanResult {
        language: Language::Rust,
        structural: StructuralFacts {
            function_count: p.function.find_iter(content).count(),
            class_count: p.type_decl.find_iter(content).count(),
            async_function_count: p.async_function.find_iter(content).count(),
            exported_function_count: exported.len(),
            has_class_with_inheritance: p.trait_with_supertrait.is_match(content),
            loc,
        },
        dependency: DependencyFacts { imports },
        signatures: exported.iter().map(|name| format!("fn {name}(...)")).collect(),
        exports: exported,
    }
}

fn scan_python(content: &str, loc: usize) -> ScanResult {
    let p = python_patterns();
    let exported: Vec<String> = p
        .exported_function
        .captures_iter(content)
        .map(|c| c[1].to_string())
        .filter(|name| !name.starts_with('_'))
        .collect();
    let imports = p
        .import_stmt
        .captures_iter(content)
        .map(|c| {
            let path = c[1].to_string();
            let is_external = !path.starts_with('.');
            import_ref(&path, is_external)
        })
        .collect();

    ScanResult {
        language: Language::Python,
        structural: StructuralFacts {
            function_count: p.function.find_iter(content).count(),
            class_count: p.class_decl.find_iter(content).count(),
            async_function_count: p.async_function.find_iter(content).count(),
            exported_function_count: exported.len(),
            has_class_with_inheritance: p.class_with_base.is_match(content),
            loc,
        },
        dependency: DependencyFacts { imports },
        signatures: exported.iter().map(|name| format!("def {name}(...)")).collect(),
        exports: exported,
    }
}

fn scan_js_ts(content: &str, loc: usize) -> ScanResult {
    let p = js_ts_patterns();
    let exported: Vec<String> = p.exported_function.captures_iter(content).map(|c| c[1].to_string()).collect();
    let imports = p
        .import_stmt
        .captures_iter(content)
        .map(|c| {
            let path = c[1].to_string();
            let is_external = !(path.starts_with('.') || path.starts_with('/'));
            import_ref(&path, is_external)
        })
        .collect();

    ScanResult {
        language: Language::JavaScriptTs,
        structural: StructuralFacts {
            function_count: p.function.find_iter(content).count(),
            class_count: p.class_decl.find_iter(content).count(),
            async_function_count: p.async_function.find_iter(content).count(),
            exported_function_count: exported.len(),
            has_class_with_inheritance: p.class_with_extends.is_match(content),
            loc,
        },
        dependency: DependencyFacts { imports },
        signatures: exported.iter().map(|name| format!("function {name}(...)")).collect(),
        exports: exported,
    }
}
