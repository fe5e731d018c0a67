//! Classifies files into durability classes and derives revalidation
//! priority and batch scheduling (spec §4.C).

use super::glob::glob_match;
use crate::config::StalenessConfig;
use crate::shared::constants::staleness::{PRIORITY_IMMUTABLE, PRIORITY_STABLE, PRIORITY_VOLATILE};
use crate::shared::models::{Durability, FileEntity};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct ClassifyResult {
    pub path: String,
    pub durability: Durability,
    pub priority: i32,
    /// Present only for `Durability::Missing`.
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub total: usize,
    pub immutable: usize,
    pub volatile: usize,
    pub stable: usize,
    pub missing: usize,
}

impl BatchStats {
    pub fn skip_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.immutable as f64 / self.total as f64 * 100.0
    }
}

pub struct StalenessTracker {
    config: StalenessConfig,
}

impl StalenessTracker {
    pub fn new(config: StalenessConfig) -> Self {
        Self { config }
    }

    fn is_immutable(&self, normalized_path: &str) -> bool {
        self.config.immutable_patterns.iter().any(|p| glob_match(p, normalized_path))
    }

    /// Classifies a single file. `modified` and `now` are caller-supplied so
    /// the tracker stays independent of the filesystem and the clock.
    pub fn classify(&self, path: &str, modified: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ClassifyResult {
        let normalized = FileEntity::normalize_path(path);

        let Some(modified) = modified else {
            return ClassifyResult {
                path: normalized,
                durability: Durability::Missing,
                priority: PRIORITY_IMMUTABLE,
                reason: Some("file not found on disk".to_string()),
            };
        };

        if self.is_immutable(&normalized) {
            return ClassifyResult {
                path: normalized,
                durability: Durability::Immutable,
                priority: PRIORITY_IMMUTABLE,
                reason: None,
            };
        }

        // Future mtimes (clock skew, clones with bad timestamps) are treated
        // as freshly modified rather than trusted.
        let age_minutes = (now - modified).num_minutes();
        if modified > now || age_minutes <= self.config.volatile_threshold_minutes {
            return ClassifyResult {
                path: normalized,
                durability: Durability::Volatile,
                priority: PRIORITY_VOLATILE,
                reason: None,
            };
        }

        ClassifyResult {
            path: normalized,
            durability: Durability::Stable,
            priority: PRIORITY_STABLE,
            reason: None,
        }
    }

    /// Partitions `files` into what can be skipped and what must be
    /// (re)validated, sorted by descending priority.
    pub fn classify_batch(
        &self,
        files: &[(String, Option<DateTime<Utc>>)],
        now: DateTime<Utc>,
    ) -> (Vec<ClassifyResult>, Vec<ClassifyResult>, BatchStats) {
        let mut skip = Vec::new();
        let mut batch = Vec::new();
        let mut stats = BatchStats {
            total: files.len(),
            ..Default::default()
        };

        for (path, modified) in files {
            let result = self.classify(path, *modified, now);
            match result.durability {
                Durability::Immutable => {
                    stats.immutable += 1;
                    skip.push(result);
                }
                Durability::Volatile => {
                    stats.volatile += 1;
                    batch.push(result);
                }
                Durability::Stable => {
                    stats.stable += 1;
                    batch.push(result);
                }
                Durability::Missing => {
                    stats.missing += 1;
                    batch.push(result);
                }
            }
        }

        batch.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.path.cmp(&b.path)));
        (skip, batch, stats)
    }

    /// Whether a `STABLE`/`VOLATILE` file needs revalidation given how long
    /// ago it was last validated (table in spec §4.C).
    pub fn needs_revalidation(&self, durability: Durability, since_last_validation_minutes: i64) -> bool {
        match durability {
            Durability::Immutable => false,
            Durability::Missing => true,
            Durability::Volatile => since_last_validation_minutes > 5,
            Durability::Stable => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
    }

    fn tracker() -> StalenessTracker {
        StalenessTracker::new(StalenessConfig::default())
    }

    #[test]
    fn immutable_pattern_wins_regardless_of_mtime() {
        let t = tracker();
        let r = t.classify("node_modules/pkg/index.js", Some(now()), now());
        assert_eq!(r.durability, Durability::Immutable);
        assert_eq!(r.priority, PRIORITY_IMMUTABLE);
    }

    #[test]
    fn recently_modified_file_is_volatile() {
        let t = tracker();
        let modified = now() - Duration::minutes(5);
        let r = t.classify("src/auth.rs", Some(modified), now());
        assert_eq!(r.durability, Durability::Volatile);
        assert_eq!(r.priority, PRIORITY_VOLATILE);
    }

    #[test]
    fn old_file_is_stable() {
        let t = tracker();
        let modified = now() - Duration::hours(48);
        let r = t.classify("src/auth.rs", Some(modified), now());
        assert_eq!(r.durability, Durability::Stable);
    }

    #[test]
    fn future_mtime_is_treated_as_volatile() {
        let t = tracker();
        let modified = now() + Duration::hours(1);
        let r = t.classify("src/auth.rs", Some(modified), now());
        assert_eq!(r.durability, Durability::Volatile);
    }

    #[test]
    fn missing_file_is_distinct_class_with_reason() {
        let t = tracker();
        let r = t.classify("src/deleted.rs", None, now());
        assert_eq!(r.durability, Durability::Missing);
        assert!(r.reason.is_some());
    }

    #[test]
    fn path_separators_normalized_before_matching() {
        let t = tracker();
        let r = t.classify("node_modules\\pkg\\index.js", Some(now()), now());
        assert_eq!(r.durability, Durability::Immutable);
        assert_eq!(r.path, "node_modules/pkg/index.js");
    }

    #[test]
    fn batch_sorts_volatile_before_stable_and_skips_immutable() {
        let t = tracker();
        let files = vec![
            ("a_stable.rs".to_string(), Some(now() - Duration::hours(48))),
            ("b_volatile.rs".to_string(), Some(now() - Duration::minutes(1))),
            ("node_modules/x.js".to_string(), Some(now())),
        ];
        let (skip, batch, stats) = t.classify_batch(&files, now());
        assert_eq!(skip.len(), 1);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].path, "b_volatile.rs");
        assert_eq!(stats.immutable, 1);
        assert_eq!(stats.volatile, 1);
        assert_eq!(stats.stable, 1);
    }

    #[test]
    fn revalidation_policy_matches_table() {
        let t = tracker();
        assert!(!t.needs_revalidation(Durability::Immutable, 999));
        assert!(!t.needs_revalidation(Durability::Volatile, 3));
        assert!(t.needs_revalidation(Durability::Volatile, 10));
        assert!(t.needs_revalidation(Durability::Stable, 1));
    }
}
