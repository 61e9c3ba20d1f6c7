//! Structural hashing helpers.
//!
//! `weight` values are short digests used as alignment hints, `hash` values
//! are full SHA-256 digests used for equality shortcuts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const SEPARATOR: &[u8] = b"\x1f";
const WEIGHT_LEN: usize = 16;

/// Incremental hash over an ordered list of parts
#[derive(Clone, Default)]
pub struct HashBuilder {
    hasher: Sha256,
    parts: usize,
}

impl HashBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, part: impl AsRef<[u8]>) -> &mut Self {
        if self.parts > 0 {
            self.hasher.update(SEPARATOR);
        }
        self.hasher.update(part.as_ref());
        self.parts += 1;
        self
    }

    /// Hex digest of everything added so far
    pub fn result(self) -> String {
        format!("{:x}", self.hasher.finalize())
    }

    /// Shortened digest used as a cheap structural weight
    pub fn weight(self) -> String {
        let mut hex = self.result();
        hex.truncate(WEIGHT_LEN);
        hex
    }
}

/// Hex SHA-256 of raw bytes
pub fn sha256_hex(data: impl AsRef<[u8]>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data.as_ref());
    format!("{:x}", hasher.finalize())
}

/// Node of a structural weight tree, as stored alongside a policy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightTree {
    pub weight: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<WeightTree>,
}

impl WeightTree {
    pub fn leaf(weight: impl Into<String>) -> Self {
        Self {
            weight: weight.into(),
            children: Vec::new(),
        }
    }

    /// Pre-order list of node weights
    pub fn weights(&self) -> Vec<&str> {
        let mut out = vec![self.weight.as_str()];
        for child in &self.children {
            out.extend(child.weights());
        }
        out
    }
}
