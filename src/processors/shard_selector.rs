use crate::error::{ProcessingError, Result};
use glob::Pattern;
use sha2::{Digest, Sha256};

/// SHA-256 of a station filename as 64 lowercase hex characters
pub fn shard_of(filename: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(filename.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Every `len`-digit hex prefix pattern, e.g. `00*` .. `ff*` for `len == 2`.
///
/// Running one worker per pattern covers the corpus exactly once.
pub fn prefix_patterns(len: u32) -> Vec<String> {
    if len == 0 {
        return vec!["*".to_string()];
    }
    (0..16u64.pow(len))
        .map(|n| format!("{:0width$x}*", n, width = len as usize))
        .collect()
}

/// Selects the station files belonging to one shard.
///
/// The pattern is a glob over the filename digest. Patterns handed to parallel
/// workers must be disjoint; nothing here checks that.
#[derive(Debug, Clone)]
pub struct ShardSelector {
    /// `None` selects every file without hashing
    pattern: Option<Pattern>,
    raw: String,
}

impl ShardSelector {
    pub fn new(pattern: &str) -> Result<Self> {
        let valid = !pattern.is_empty()
            && pattern
                .chars()
                .all(|c| (c.is_ascii_hexdigit() && !c.is_ascii_uppercase()) || c == '*' || c == '?');
        if !valid {
            return Err(ProcessingError::InvalidShardPattern(pattern.to_string()));
        }
        if pattern.chars().all(|c| c == '*') {
            return Ok(Self::all());
        }

        Ok(Self {
            pattern: Some(Pattern::new(pattern)?),
            raw: pattern.to_string(),
        })
    }

    pub fn all() -> Self {
        Self {
            pattern: None,
            raw: "*".to_string(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.raw
    }

    pub fn selects(&self, filename: &str) -> bool {
        match &self.pattern {
            Some(pattern) => pattern.matches(&shard_of(filename)),
            None => true,
        }
    }
}

impl Default for ShardSelector {
    fn default() -> Self {
        Self::all()
    }
}
