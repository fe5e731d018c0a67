//! Structural scan (spec §4.D phase 1): a regex-based scanner over
//! Rust/Python/JS-TS source that produces the counts and import lists fed
//! into the embedding core's structural and dependency aspects. This is
//! intentionally a lightweight scanner, not a full parser — it trades
//! precision for zero extra grammar dependencies.

mod language;
mod scanner;

pub use language::Language;
pub use scanner::{scan_source, ScanResult};
