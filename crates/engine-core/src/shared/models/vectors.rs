//! `MultiVector`: the five per-aspect embeddings kept for a file (spec §3,
//! §4.E). Serialization is a stable record so an external datastore or
//! report can round-trip it losslessly (testable property §8 round-trip
//! law).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    Purpose,
    Semantic,
    Structural,
    Dependency,
    Usage,
}

impl Aspect {
    pub const ALL: [Aspect; 5] = [
        Aspect::Purpose,
        Aspect::Semantic,
        Aspect::Structural,
        Aspect::Dependency,
        Aspect::Usage,
    ];
}

/// The five aspect vectors for one file, plus the exact input strings that
/// produced them (kept for reproducibility, per spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiVector {
    pub file_path: String,
    pub model_id: String,
    pub last_updated: DateTime<Utc>,
    pub vectors: HashMap<Aspect, Vec<f32>>,
    pub inputs: HashMap<Aspect, String>,
}

impl MultiVector {
    pub fn new(file_path: impl Into<String>, model_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            file_path: file_path.into(),
            model_id: model_id.into(),
            last_updated: now,
            vectors: HashMap::new(),
            inputs: HashMap::new(),
        }
    }

    pub fn set_aspect(&mut self, aspect: Aspect, vector: Vec<f32>, input: String) {
        self.vectors.insert(aspect, vector);
        self.inputs.insert(aspect, input);
    }

    pub fn get(&self, aspect: Aspect) -> Option<&[f32]> {
        self.vectors.get(&aspect).map(|v| v.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_roundtrip_preserves_all_fields() {
        let now = Utc::now();
        let mut mv = MultiVector::new("src/auth.rs", "model-a", now);
        mv.set_aspect(Aspect::Purpose, vec![0.1, 0.2], "purpose text".into());
        mv.set_aspect(Aspect::Semantic, vec![0.3, 0.4, 0.5], "semantic text".into());

        let json = serde_json::to_string(&mv).unwrap();
        let back: MultiVector = serde_json::from_str(&json).unwrap();

        assert_eq!(back.file_path, mv.file_path);
        assert_eq!(back.model_id, mv.model_id);
        assert_eq!(back.last_updated, mv.last_updated);
        assert_eq!(back.get(Aspect::Purpose), mv.get(Aspect::Purpose));
        assert_eq!(back.get(Aspect::Semantic), mv.get(Aspect::Semantic));
        assert_eq!(back.inputs, mv.inputs);
    }
}
