//! Co-change graph: walks git history via the `Git` trait and counts file
//! pairs touched in the same commit (spec §4.F).

use crate::provider::Git;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CoChangeEdge {
    pub file_a: String,
    pub file_b: String,
    pub cochange_count: u32,
    /// Normalized by total commits walked; in `[0, 1]`.
    pub strength: f64,
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// `max_commits`/`max_files_per_commit` bound the walk exactly as the `Git`
/// trait's contract describes. Returns edges sorted by descending strength,
/// then lexically by `(file_a, file_b)` for determinism.
pub fn co_change_graph(git: &dyn Git, max_commits: usize, max_files_per_commit: usize) -> std::io::Result<Vec<CoChangeEdge>> {
    let commits = git.recent_commits(max_commits, max_files_per_commit)?;
    let total_commits = commits.len().max(1);

    let mut pair_counts: BTreeMap<(String, String), u32> = BTreeMap::new();
    for commit in &commits {
        for i in 0..commit.files.len() {
            for j in (i + 1)..commit.files.len() {
                let key = pair_key(&commit.files[i], &commit.files[j]);
                *pair_counts.entry(key).or_insert(0) += 1;
            }
        }
    }

    let mut edges: Vec<CoChangeEdge> = pair_counts
        .into_iter()
        .map(|((file_a, file_b), count)| CoChangeEdge {
            file_a,
            file_b,
            cochange_count: count,
            strength: (count as f64 / total_commits as f64).clamp(0.0, 1.0),
        })
        .collect();

    edges.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file_a.cmp(&b.file_a))
            .then_with(|| a.file_b.cmp(&b.file_b))
    });
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CommitFiles;

    struct FakeGit(Vec<CommitFiles>);

    impl Git for FakeGit {
        fn recent_commits(&self, max_commits: usize, max_files_per_commit: usize) -> std::io::Result<Vec<CommitFiles>> {
            Ok(self
                .0
                .iter()
                .take(max_commits)
                .map(|c| CommitFiles {
                    commit_hash: c.commit_hash.clone(),
                    files: c.files.iter().take(max_files_per_commit).cloned().collect(),
                })
                .collect())
        }
    }

    fn commit(hash: &str, files: &[&str]) -> CommitFiles {
        CommitFiles {
            commit_hash: hash.to_string(),
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn files_changed_together_produce_an_edge() {
        let git = FakeGit(vec![
            commit("c1", &["a.rs", "b.rs"]),
            commit("c2", &["a.rs", "b.rs"]),
            commit("c3", &["c.rs"]),
        ]);
        let edges = co_change_graph(&git, 10, 10).unwrap();
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].file_a, "a.rs");
        assert_eq!(edges[0].file_b, "b.rs");
        assert_eq!(edges[0].cochange_count, 2);
    }

    #[test]
    fn strength_is_normalized_by_commit_count() {
        let git = FakeGit(vec![commit("c1", &["a.rs", "b.rs"]), commit("c2", &["c.rs", "d.rs"])]);
        let edges = co_change_graph(&git, 10, 10).unwrap();
        for e in &edges {
            assert!(e.strength >= 0.0 && e.strength <= 1.0);
        }
    }

    #[test]
    fn no_commits_returns_no_edges() {
        let git = FakeGit(vec![]);
        let edges = co_change_graph(&git, 10, 10).unwrap();
        assert!(edges.is_empty());
    }
}
