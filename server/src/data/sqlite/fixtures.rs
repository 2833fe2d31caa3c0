//! In-memory blog database for tests
//!
//! Seed layout (timestamps are `crt_dt` unless noted):
//!
//! - users: 1 alice ADMIN (2024-01-05, logged in), 2 bob USER (2024-01-10),
//!   3 carol USER (2024-03-15, logged in), 4 dave USER deleted
//!   (2024-03-20, `updt_dt` 2024-03-25)
//! - categories: 1 Rust (root), 2 Async (child of 1), 3 Archive (deleted)
//! - posts 1..=10 in January (2024-01-02 ..= 2024-01-11), none in February,
//!   posts 11..=15 in March (2024-03-01 ..= 2024-03-05), post 16 deleted
//!   (2024-01-15, `updt_dt` 2024-02-10)
//! - comments: 3 on post 1 and 1 on post 2 in January, 2 on post 11 in March
//! - tags: 1 rust, 2 tokio; five post-tag mappings
//! - subscriptions: two to category 1, one to tag 2

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use super::schema::SCHEMA;

/// Single-connection in-memory pool with the blog schema applied
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool");
    sqlx::raw_sql(SCHEMA)
        .execute(&pool)
        .await
        .expect("Failed to apply blog schema");
    pool
}

/// In-memory pool with the blog schema and the seed data described above
pub async fn seeded_pool() -> SqlitePool {
    let pool = memory_pool().await;
    seed(&pool).await;
    pool
}

async fn exec(pool: &SqlitePool, sql: &str) {
    sqlx::query(sql)
        .execute(pool)
        .await
        .unwrap_or_else(|e| panic!("Seed statement failed: {e}\n{sql}"));
}

async fn seed(pool: &SqlitePool) {
    exec(
        pool,
        "INSERT INTO user_info (user_no, user_nm, user_role, lst_lgn_dt, use_yn, del_yn, crt_dt, updt_dt) VALUES
            (1, 'alice', 'ADMIN', '2024-01-20 10:00:00', 'Y', 'N', '2024-01-05 08:00:00', '2024-01-05 08:00:00'),
            (2, 'bob', 'USER', NULL, 'Y', 'N', '2024-01-10 08:00:00', '2024-01-10 08:00:00'),
            (3, 'carol', 'USER', '2024-03-16 10:00:00', 'Y', 'N', '2024-03-15 08:00:00', '2024-03-15 08:00:00'),
            (4, 'dave', 'USER', NULL, 'N', 'Y', '2024-03-20 08:00:00', '2024-03-25 08:00:00')",
    )
    .await;

    exec(
        pool,
        "INSERT INTO ctgry_info (ctgry_no, ctgry_nm, up_ctgry_no, use_yn, del_yn, crt_dt, updt_dt) VALUES
            (1, 'Rust', NULL, 'Y', 'N', '2024-01-01 00:00:00', '2024-01-01 00:00:00'),
            (2, 'Async', 1, 'Y', 'N', '2024-01-02 00:00:00', '2024-01-02 00:00:00'),
            (3, 'Archive', NULL, 'N', 'Y', '2024-01-03 00:00:00', '2024-02-01 00:00:00')",
    )
    .await;

    // January: posts 1..=10, users 1 (1..=6) and 2 (7..=10),
    // category 1 (1..=7) and 2 (8..=10), odd posts FINISHED, views = 10 * n
    for n in 1..=10 {
        let user = if n <= 6 { 1 } else { 2 };
        let category = if n <= 7 { 1 } else { 2 };
        let status = if n % 2 == 1 { "FINISHED" } else { "WRITING" };
        let crt = format!("2024-01-{:02} 09:00:00", n + 1);
        exec(
            pool,
            &format!(
                "INSERT INTO pst_info (pst_no, user_no, ctgry_no, pst_ttl, pst_stts, pst_view_cnt, crt_dt, updt_dt)
                 VALUES ({n}, {user}, {category}, 'Post {n}', '{status}', {views}, '{crt}', '{crt}')",
                views = n * 10
            ),
        )
        .await;
    }

    // March: posts 11..=15 by carol in category 2, FINISHED, 5 views each
    for n in 11..=15 {
        let crt = format!("2024-03-{:02} 09:00:00", n - 10);
        exec(
            pool,
            &format!(
                "INSERT INTO pst_info (pst_no, user_no, ctgry_no, pst_ttl, pst_stts, pst_view_cnt, crt_dt, updt_dt)
                 VALUES ({n}, 3, 2, 'Post {n}', 'FINISHED', 5, '{crt}', '{crt}')"
            ),
        )
        .await;
    }

    exec(
        pool,
        "INSERT INTO pst_info (pst_no, user_no, ctgry_no, pst_ttl, pst_stts, pst_view_cnt, use_yn, del_yn, crt_dt, updt_dt)
         VALUES (16, 1, 1, 'Removed', 'FINISHED', 999, 'N', 'Y', '2024-01-15 09:00:00', '2024-02-10 09:00:00')",
    )
    .await;

    exec(
        pool,
        "INSERT INTO cmnt_info (cmnt_no, pst_no, user_no, cmnt_stts, crt_dt, updt_dt) VALUES
            (1, 1, 2, 'APPROVED', '2024-01-03 10:00:00', '2024-01-03 10:00:00'),
            (2, 1, 2, 'APPROVED', '2024-01-04 10:00:00', '2024-01-04 10:00:00'),
            (3, 1, 3, 'PENDING', '2024-01-05 10:00:00', '2024-01-05 10:00:00'),
            (4, 2, 1, 'SPAM', '2024-01-06 10:00:00', '2024-01-06 10:00:00'),
            (5, 11, 1, 'APPROVED', '2024-03-02 10:00:00', '2024-03-02 10:00:00'),
            (6, 11, 2, 'APPROVED', '2024-03-03 10:00:00', '2024-03-03 10:00:00')",
    )
    .await;

    exec(
        pool,
        "INSERT INTO tag_info (tag_no, tag_nm, crt_dt, updt_dt) VALUES
            (1, 'rust', '2024-01-01 00:00:00', '2024-01-01 00:00:00'),
            (2, 'tokio', '2024-01-02 00:00:00', '2024-01-02 00:00:00')",
    )
    .await;

    exec(
        pool,
        "INSERT INTO pst_tag_map (pst_tag_no, pst_no, tag_no, crt_dt, updt_dt) VALUES
            (1, 1, 1, '2024-01-02 09:00:00', '2024-01-02 09:00:00'),
            (2, 1, 2, '2024-01-02 09:00:00', '2024-01-02 09:00:00'),
            (3, 2, 1, '2024-01-03 09:00:00', '2024-01-03 09:00:00'),
            (4, 3, 1, '2024-01-04 09:00:00', '2024-01-04 09:00:00'),
            (5, 11, 2, '2024-03-01 09:00:00', '2024-03-01 09:00:00')",
    )
    .await;

    exec(
        pool,
        "INSERT INTO sbcr_info (sbcr_no, user_no, sbcr_type, ctgry_no, tag_no, crt_dt, updt_dt) VALUES
            (1, 2, 'CATEGORY', 1, NULL, '2024-01-12 00:00:00', '2024-01-12 00:00:00'),
            (2, 3, 'CATEGORY', 1, NULL, '2024-03-16 00:00:00', '2024-03-16 00:00:00'),
            (3, 2, 'TAG', NULL, 2, '2024-03-17 00:00:00', '2024-03-17 00:00:00')",
    )
    .await;
}
