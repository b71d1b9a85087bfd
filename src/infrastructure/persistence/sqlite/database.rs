//! SQLite Database - 数据库连接和迁移
//!
//! 每个租户一个数据库；迁移在租户连接时执行，可重复运行

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};

use crate::config::DatabaseConfig;

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 遇到锁时等待而不是立即失败
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// 连接参数；PRAGMA 按连接生效，因此在连接选项上设置，池内每个连接都会应用
fn connect_options(
    config: &DatabaseConfig,
    tenant_code: &str,
) -> Result<SqliteConnectOptions, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.tenant_url(tenant_code))?
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    if config.in_memory {
        return Ok(options);
    }

    // WAL 允许并发读写；NORMAL 平衡性能和安全性
    Ok(options
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal))
}

/// 创建租户数据库连接池
pub async fn create_pool(config: &DatabaseConfig, tenant_code: &str) -> Result<DbPool, sqlx::Error> {
    let options = connect_options(config, tenant_code)?;

    let pool = if config.in_memory {
        // 内存库随最后一个连接关闭而销毁：单连接且永不回收
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        tokio::fs::create_dir_all(&config.dir).await?;

        SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?
    };

    tracing::info!(
        tenant = %tenant_code,
        in_memory = config.in_memory,
        "SQLite pool created"
    );

    Ok(pool)
}

macro_rules! audit_columns {
    () => {
        "
            created_by INTEGER,
            updated_by INTEGER,
            deleted_by INTEGER,
            deleted_at TIMESTAMP,
            created_at TIMESTAMP,
            updated_at TIMESTAMP
        "
    };
}

macro_rules! lookup_table {
    ($table:literal) => {
        concat!(
            "CREATE TABLE IF NOT EXISTS ",
            $table,
            " (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT,",
            audit_columns!(),
            ")"
        )
    };
}

/// 表结构
const SCHEMA: &[&str] = &[
    // 字典表
    lookup_table!("sales_order_status"),
    lookup_table!("reminded"),
    lookup_table!("bookkeeping_status"),
    lookup_table!("payment_method"),
    lookup_table!("book_transaction_type"),
    lookup_table!("book_transaction_category"),
    // 销售单
    concat!(
        "CREATE TABLE IF NOT EXISTS sales_order (
            id BLOB PRIMARY KEY,
            location_id INTEGER,
            customer_id INTEGER,
            doc_number INTEGER,
            doc_date DATE,
            inv_number TEXT,
            address TEXT,
            delivery_cost REAL,
            total_amount REAL,
            total_payment REAL,
            outstanding REAL,
            total_voucher REAL,
            voucher_number TEXT,
            posted_date DATE,
            migrated BOOLEAN,
            additional_cost REAL,
            previous_payment REAL,
            fully_paid BOOLEAN,
            note TEXT,
            status_id INTEGER,",
        audit_columns!(),
        ")"
    ),
    concat!(
        "CREATE TABLE IF NOT EXISTS sales_order_detail (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sales_order_id BLOB,
            item_id INTEGER,
            unit_id INTEGER,
            promoter_id INTEGER,
            item_name TEXT,
            quantity INTEGER,
            price REAL,
            item_total REAL,
            discount_pct INTEGER,
            used_sessions INTEGER,",
        audit_columns!(),
        ")"
    ),
    concat!(
        "CREATE TABLE IF NOT EXISTS sales_order_service (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sales_order_id BLOB,
            sales_order_detail_id INTEGER,
            service_id INTEGER,
            treatment_id BLOB,
            message_log_detail_id TEXT,
            reminded_id INTEGER,
            service_name TEXT,
            treated BOOLEAN,
            schedule DATE,",
        audit_columns!(),
        ")"
    ),
    // 应收款收据
    concat!(
        "CREATE TABLE IF NOT EXISTS ar_receipt (
            id BLOB PRIMARY KEY,
            location_id INTEGER,
            customer_id INTEGER,
            payment_method_id INTEGER,
            doc_number INTEGER,
            doc_date DATE,
            posted_date DATE,
            total_amount REAL,
            note TEXT,
            status_id INTEGER,",
        audit_columns!(),
        ")"
    ),
    concat!(
        "CREATE TABLE IF NOT EXISTS ar_receipt_detail (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            ar_receipt_id BLOB,
            sales_order_id BLOB,
            receipt_amount REAL,",
        audit_columns!(),
        ")"
    ),
    // 疗程
    concat!(
        "CREATE TABLE IF NOT EXISTS treatment (
            id BLOB PRIMARY KEY,
            location_id INTEGER,
            customer_id INTEGER,
            sales_order_id BLOB,
            sales_order_detail_id INTEGER,
            sales_order_service_id INTEGER,
            service_id INTEGER,
            patient_id INTEGER,
            doctor_id INTEGER,
            nurse_id INTEGER,
            beautician_id INTEGER,
            doc_number TEXT,
            doc_date DATE,
            posted_date DATE,
            service_text TEXT,
            note TEXT,
            status_id INTEGER,",
        audit_columns!(),
        ")"
    ),
    concat!(
        "CREATE TABLE IF NOT EXISTS treatment_detail (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            treatment_id BLOB,
            item_id INTEGER,
            unit_id INTEGER,
            quantity INTEGER,",
        audit_columns!(),
        ")"
    ),
    // 账簿
    concat!(
        "CREATE TABLE IF NOT EXISTS bookkeeping (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            location_id TEXT,
            book_date DATE,
            opening REAL,
            income REAL,
            expanse REAL,
            balance REAL,
            note TEXT,
            status_id INTEGER,",
        audit_columns!(),
        ")"
    ),
    concat!(
        "CREATE TABLE IF NOT EXISTS bookkeeping_detail (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bookkeeping_id INTEGER,
            type_id INTEGER,
            category_id INTEGER,
            payment_method_id INTEGER,
            posted_date DATE,
            doc_number TEXT,
            income REAL,
            expanse REAL,
            description TEXT,",
        audit_columns!(),
        ")"
    ),
    concat!(
        "CREATE TABLE IF NOT EXISTS summary_by_transaction_type (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bookkeeping_id INTEGER,
            type_id INTEGER,
            total REAL,",
        audit_columns!(),
        ")"
    ),
    concat!(
        "CREATE TABLE IF NOT EXISTS summary_by_payment_method (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bookkeeping_id INTEGER,
            payment_method_id INTEGER,
            total REAL,",
        audit_columns!(),
        ")"
    ),
    concat!(
        "CREATE TABLE IF NOT EXISTS summary_by_transaction_type_and_payment_method (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            bookkeeping_id INTEGER,
            type_id INTEGER,
            payment_method_id INTEGER,
            total REAL,",
        audit_columns!(),
        ")"
    ),
];

/// 外键与过滤列索引
const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_sales_order_customer_id ON sales_order(customer_id)",
    "CREATE INDEX IF NOT EXISTS idx_sales_order_detail_sales_order_id ON sales_order_detail(sales_order_id)",
    "CREATE INDEX IF NOT EXISTS idx_sales_order_service_sales_order_id ON sales_order_service(sales_order_id)",
    "CREATE INDEX IF NOT EXISTS idx_ar_receipt_detail_ar_receipt_id ON ar_receipt_detail(ar_receipt_id)",
    "CREATE INDEX IF NOT EXISTS idx_treatment_detail_treatment_id ON treatment_detail(treatment_id)",
    "CREATE INDEX IF NOT EXISTS idx_bookkeeping_location_id ON bookkeeping(location_id)",
    "CREATE INDEX IF NOT EXISTS idx_bookkeeping_detail_bookkeeping_id ON bookkeeping_detail(bookkeeping_id)",
    "CREATE INDEX IF NOT EXISTS idx_summary_by_transaction_type_bookkeeping_id ON summary_by_transaction_type(bookkeeping_id)",
    "CREATE INDEX IF NOT EXISTS idx_summary_by_payment_method_bookkeeping_id ON summary_by_payment_method(bookkeeping_id)",
    "CREATE INDEX IF NOT EXISTS idx_summary_by_type_and_method_bookkeeping_id ON summary_by_transaction_type_and_payment_method(bookkeeping_id)",
];

/// 运行数据库迁移
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA.iter().chain(INDEXES) {
        sqlx::query(statement).execute(pool).await?;
    }

    tracing::info!(
        tables = SCHEMA.len(),
        indexes = INDEXES.len(),
        "Database migrations completed"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> DatabaseConfig {
        DatabaseConfig {
            in_memory: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_in_memory_db() {
        let pool = create_pool(&memory_config(), "alana").await.unwrap();
        run_migrations(&pool).await.unwrap();

        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 18);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool(&memory_config(), "alana").await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_file_database_per_tenant() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            dir: dir.path().to_path_buf(),
            ..Default::default()
        };

        let pool = create_pool(&config, "alana").await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool.close().await;

        assert!(dir.path().join("alana.db").exists());
    }

    #[tokio::test]
    async fn test_pragmas_apply_to_every_connection() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig {
            dir: dir.path().to_path_buf(),
            max_connections: 2,
            ..Default::default()
        };
        let pool = create_pool(&config, "alana").await.unwrap();

        let mut first = pool.acquire().await.unwrap();
        let mut second = pool.acquire().await.unwrap();
        for conn in [&mut first, &mut second] {
            let (busy,): (i64,) = sqlx::query_as("PRAGMA busy_timeout")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            let (foreign_keys,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            let (journal,): (String,) = sqlx::query_as("PRAGMA journal_mode")
                .fetch_one(&mut **conn)
                .await
                .unwrap();
            assert_eq!(busy, 5000);
            assert_eq!(foreign_keys, 1);
            assert_eq!(journal, "wal");
        }
    }
}
