//! Catalog of the blog tables read by the analytics engine
//!
//! Every table carries the audit columns `use_yn`, `del_yn`, `crt_dt` and
//! `updt_dt`. Scope bindings list which scope filters a table can honor.

use super::aggregate::{ScopeBinding, SourceTable};
use super::scope::ScopeKind;

pub static USER_INFO: SourceTable = SourceTable {
    name: "user_info",
    key_column: "user_no",
    scopes: &[],
};

pub static PST_INFO: SourceTable = SourceTable {
    name: "pst_info",
    key_column: "pst_no",
    scopes: &[
        ScopeBinding {
            kind: ScopeKind::Category,
            column: "ctgry_no",
        },
        ScopeBinding {
            kind: ScopeKind::Post,
            column: "pst_no",
        },
    ],
};

pub static CMNT_INFO: SourceTable = SourceTable {
    name: "cmnt_info",
    key_column: "cmnt_no",
    scopes: &[ScopeBinding {
        kind: ScopeKind::Post,
        column: "pst_no",
    }],
};

pub static TAG_INFO: SourceTable = SourceTable {
    name: "tag_info",
    key_column: "tag_no",
    scopes: &[ScopeBinding {
        kind: ScopeKind::Tag,
        column: "tag_no",
    }],
};

pub static PST_TAG_MAP: SourceTable = SourceTable {
    name: "pst_tag_map",
    key_column: "pst_tag_no",
    scopes: &[
        ScopeBinding {
            kind: ScopeKind::Tag,
            column: "tag_no",
        },
        ScopeBinding {
            kind: ScopeKind::Post,
            column: "pst_no",
        },
    ],
};

pub static CTGRY_INFO: SourceTable = SourceTable {
    name: "ctgry_info",
    key_column: "ctgry_no",
    scopes: &[ScopeBinding {
        kind: ScopeKind::Category,
        column: "ctgry_no",
    }],
};

pub static SBCR_INFO: SourceTable = SourceTable {
    name: "sbcr_info",
    key_column: "sbcr_no",
    scopes: &[
        ScopeBinding {
            kind: ScopeKind::Category,
            column: "ctgry_no",
        },
        ScopeBinding {
            kind: ScopeKind::Tag,
            column: "tag_no",
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_columns() {
        assert_eq!(PST_INFO.scope_column(ScopeKind::Category), Some("ctgry_no"));
        assert_eq!(CMNT_INFO.scope_column(ScopeKind::Post), Some("pst_no"));
        assert_eq!(CMNT_INFO.scope_column(ScopeKind::Tag), None);
        assert_eq!(USER_INFO.scope_column(ScopeKind::Category), None);
        assert_eq!(SBCR_INFO.scope_column(ScopeKind::Tag), Some("tag_no"));
    }
}
