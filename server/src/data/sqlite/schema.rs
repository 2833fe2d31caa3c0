//! SQLite schema of the blog tables read by the engine
//!
//! The engine does not own this schema; the blog platform creates and writes
//! these tables. This copy only seeds test databases.
//!
//! Timestamps are stored as `YYYY-MM-DD HH:MM:SS` text so that lexical and
//! chronological order coincide.

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Users
-- =============================================================================
CREATE TABLE IF NOT EXISTS user_info (
    user_no INTEGER PRIMARY KEY AUTOINCREMENT,
    user_nm TEXT NOT NULL,
    user_role TEXT NOT NULL DEFAULT 'USER',
    lst_lgn_dt TEXT,
    use_yn TEXT NOT NULL DEFAULT 'Y',
    del_yn TEXT NOT NULL DEFAULT 'N',
    crt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- =============================================================================
-- Categories (self-referencing hierarchy)
-- =============================================================================
CREATE TABLE IF NOT EXISTS ctgry_info (
    ctgry_no INTEGER PRIMARY KEY AUTOINCREMENT,
    ctgry_nm TEXT NOT NULL,
    up_ctgry_no INTEGER REFERENCES ctgry_info(ctgry_no),
    use_yn TEXT NOT NULL DEFAULT 'Y',
    del_yn TEXT NOT NULL DEFAULT 'N',
    crt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- =============================================================================
-- Posts
-- =============================================================================
CREATE TABLE IF NOT EXISTS pst_info (
    pst_no INTEGER PRIMARY KEY AUTOINCREMENT,
    user_no INTEGER NOT NULL REFERENCES user_info(user_no),
    ctgry_no INTEGER REFERENCES ctgry_info(ctgry_no),
    pst_ttl TEXT NOT NULL,
    pst_stts TEXT NOT NULL DEFAULT 'WRITING',
    pst_view_cnt INTEGER NOT NULL DEFAULT 0,
    use_yn TEXT NOT NULL DEFAULT 'Y',
    del_yn TEXT NOT NULL DEFAULT 'N',
    crt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_pst_info_crt_dt ON pst_info(crt_dt);
CREATE INDEX IF NOT EXISTS idx_pst_info_ctgry ON pst_info(ctgry_no);

-- =============================================================================
-- Comments
-- =============================================================================
CREATE TABLE IF NOT EXISTS cmnt_info (
    cmnt_no INTEGER PRIMARY KEY AUTOINCREMENT,
    pst_no INTEGER NOT NULL REFERENCES pst_info(pst_no),
    user_no INTEGER REFERENCES user_info(user_no),
    cmnt_stts TEXT NOT NULL DEFAULT 'PENDING',
    use_yn TEXT NOT NULL DEFAULT 'Y',
    del_yn TEXT NOT NULL DEFAULT 'N',
    crt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_cmnt_info_pst ON cmnt_info(pst_no);

-- =============================================================================
-- Tags and post-tag mapping
-- =============================================================================
CREATE TABLE IF NOT EXISTS tag_info (
    tag_no INTEGER PRIMARY KEY AUTOINCREMENT,
    tag_nm TEXT NOT NULL,
    use_yn TEXT NOT NULL DEFAULT 'Y',
    del_yn TEXT NOT NULL DEFAULT 'N',
    crt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS pst_tag_map (
    pst_tag_no INTEGER PRIMARY KEY AUTOINCREMENT,
    pst_no INTEGER NOT NULL REFERENCES pst_info(pst_no),
    tag_no INTEGER NOT NULL REFERENCES tag_info(tag_no),
    use_yn TEXT NOT NULL DEFAULT 'Y',
    del_yn TEXT NOT NULL DEFAULT 'N',
    crt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- =============================================================================
-- Subscriptions (to a category or a tag)
-- =============================================================================
CREATE TABLE IF NOT EXISTS sbcr_info (
    sbcr_no INTEGER PRIMARY KEY AUTOINCREMENT,
    user_no INTEGER NOT NULL REFERENCES user_info(user_no),
    sbcr_type TEXT NOT NULL,
    ctgry_no INTEGER REFERENCES ctgry_info(ctgry_no),
    tag_no INTEGER REFERENCES tag_info(tag_no),
    use_yn TEXT NOT NULL DEFAULT 'Y',
    del_yn TEXT NOT NULL DEFAULT 'N',
    crt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updt_dt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;
