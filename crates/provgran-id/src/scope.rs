//! Caller-managed scope stack for hierarchical identifiers.
//!
//! Callers push a segment when they enter a logical step of their workflow and
//! pop it when they leave; identifiers minted in between carry the path, e.g.
//! `https://example.com/preprocessing/clip/<uuid>`.

use crate::{IdError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdScope {
    segments: Vec<String>,
}

impl IdScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: impl Into<String>) -> Result<()> {
        let segment = segment.into();
        let valid = !segment.is_empty()
            && segment
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'));
        if !valid {
            return Err(IdError::InvalidScopeSegment(segment));
        }
        self.segments.push(segment);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path prefix for identifiers minted in this scope, `""` at top level.
    pub fn path(&self) -> String {
        let mut path = String::new();
        for segment in &self.segments {
            path.push_str(segment);
            path.push('/');
        }
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_follows_push_and_pop() {
        let mut scope = IdScope::new();
        assert_eq!(scope.path(), "");
        scope.push("preprocessing").unwrap();
        scope.push("clip").unwrap();
        assert_eq!(scope.path(), "preprocessing/clip/");
        assert_eq!(scope.pop().as_deref(), Some("clip"));
        assert_eq!(scope.path(), "preprocessing/");
        assert_eq!(scope.depth(), 1);
    }

    #[test]
    fn rejects_segments_that_break_iris() {
        let mut scope = IdScope::new();
        assert!(scope.push("has space").is_err());
        assert!(scope.push("").is_err());
        assert!(scope.push("a/b").is_err());
        assert!(scope.is_empty());
    }
}
