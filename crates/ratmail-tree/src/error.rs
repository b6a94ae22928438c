use std::fmt::Debug;

/// Errors raised by tree lookups and strict decoration layout.
///
/// Navigation never fails: a missing parent, child or sibling is `None`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// The position no longer resolves in its tree (stale handle).
    #[error("position {position} not found")]
    NotFound { position: String },

    /// A decoration role does not fit into the columns available to it.
    #[error("no space for {role}: needs {needed} columns, {available} available")]
    Layout {
        role: &'static str,
        needed: usize,
        available: usize,
    },

    /// A tree implementation broke one of the navigation invariants.
    #[error("inconsistent tree: {detail}")]
    Inconsistent { detail: String },
}

impl TreeError {
    pub fn not_found(position: &impl Debug) -> Self {
        Self::NotFound {
            position: format!("{:?}", position),
        }
    }

    pub fn layout(role: &'static str, needed: usize, available: usize) -> Self {
        Self::Layout {
            role,
            needed,
            available,
        }
    }

    pub fn inconsistent(detail: impl Into<String>) -> Self {
        Self::Inconsistent {
            detail: detail.into(),
        }
    }
}
