//! Common ECS components

use crate::agent::EnemyKind;

/// Name component for debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(pub String);

impl Name {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// "Slime #3" style label
    pub fn numbered(kind: EnemyKind, number: u32) -> Self {
        Self(format!("{} #{number}", kind.name()))
    }
}
