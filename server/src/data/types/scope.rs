//! Scope entity references

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Kind of entity an analytics request can be restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Category,
    Tag,
    Post,
}

impl ScopeKind {
    /// Table holding the scope entity
    pub fn table(&self) -> &'static str {
        match self {
            ScopeKind::Category => "ctgry_info",
            ScopeKind::Tag => "tag_info",
            ScopeKind::Post => "pst_info",
        }
    }

    /// Primary key of the scope entity (also the foreign key name elsewhere)
    pub fn key_column(&self) -> &'static str {
        match self {
            ScopeKind::Category => "ctgry_no",
            ScopeKind::Tag => "tag_no",
            ScopeKind::Post => "pst_no",
        }
    }

    /// Request parameter carrying this scope
    pub fn param(&self) -> &'static str {
        match self {
            ScopeKind::Category => "ctgryNo",
            ScopeKind::Tag => "tagNo",
            ScopeKind::Post => "pstNo",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Category => write!(f, "category"),
            ScopeKind::Tag => write!(f, "tag"),
            ScopeKind::Post => write!(f, "post"),
        }
    }
}

/// A concrete scope entity (`ctgryNo=3`, `pstNo=12`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeRef {
    pub kind: ScopeKind,
    pub id: i64,
}

impl ScopeRef {
    pub fn new(kind: ScopeKind, id: i64) -> Self {
        Self { kind, id }
    }
}

impl fmt::Display for ScopeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}
