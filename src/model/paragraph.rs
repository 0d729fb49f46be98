//! Paragraph records and embeddings: the input snapshot.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Upstream stance tag attached to a paragraph by the extraction layer.
///
/// Declaration order doubles as the deterministic tie-break when a
/// majority vote over stances is split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stance {
    Prescriptive,
    Cautionary,
    Prerequisite,
    Dependent,
    #[default]
    Assertive,
    Uncertain,
}

impl Stance {
    pub const ALL: [Stance; 6] = [
        Stance::Prescriptive,
        Stance::Cautionary,
        Stance::Prerequisite,
        Stance::Dependent,
        Stance::Assertive,
        Stance::Uncertain,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stance::Prescriptive => "prescriptive",
            Stance::Cautionary => "cautionary",
            Stance::Prerequisite => "prerequisite",
            Stance::Dependent => "dependent",
            Stance::Assertive => "assertive",
            Stance::Uncertain => "uncertain",
        }
    }
}

impl std::fmt::Display for Stance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One paragraph produced by one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphRecord {
    pub id: String,
    pub model_index: usize,
    #[serde(default)]
    pub stance: Stance,
    #[serde(default)]
    pub contested: bool,
    #[serde(default)]
    pub statement_ids: Vec<String>,
}

impl ParagraphRecord {
    pub fn new(id: impl Into<String>, model_index: usize) -> Self {
        Self {
            id: id.into(),
            model_index,
            stance: Stance::default(),
            contested: false,
            statement_ids: Vec::new(),
        }
    }

    pub fn with_stance(mut self, stance: Stance) -> Self {
        self.stance = stance;
        self
    }

    pub fn contested(mut self, contested: bool) -> Self {
        self.contested = contested;
        self
    }

    pub fn with_statements(mut self, ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.statement_ids = ids.into_iter().map(Into::into).collect();
        self
    }
}

/// ID → embedding vector, tagged with the backend that produced it.
///
/// Vectors are expected to be fixed-dimension and normalized, but nothing
/// downstream relies on either: cosine similarity renormalizes and skips
/// mismatched pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingSet {
    pub backend: String,
    pub vectors: BTreeMap<String, Vec<f32>>,
}

impl EmbeddingSet {
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            vectors: BTreeMap::new(),
        }
    }

    pub fn with_vector(mut self, id: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(id.into(), vector);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, vector: Vec<f32>) {
        self.vectors.insert(id.into(), vector);
    }

    pub fn get(&self, id: &str) -> Option<&[f32]> {
        self.vectors.get(id).map(Vec::as_slice).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.values().all(Vec::is_empty)
    }
}
