//! Eager-loaded Relations
//!
//! 列表与单行读取后批量加载关联：每种关联一条 `IN (...)` 查询，
//! 已软删除的关联行不加载

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite};
use std::collections::BTreeSet;
use uuid::Uuid;

use super::crud_repo::push_value;
use super::DbPool;
use crate::application::ports::RepositoryError;
use crate::domain::{
    ArReceipt, ArReceiptDetail, BookTransactionCategory, BookTransactionType, Bookkeeping,
    BookkeepingDetail, BookkeepingStatus, Entity, FieldValue, PaymentMethod, Reminded, SalesOrder,
    SalesOrderDetail, SalesOrderService, SalesOrderStatus, SummaryByPaymentMethod,
    SummaryByTransactionType, SummaryByTransactionTypeAndPaymentMethod, Treatment,
    TreatmentDetail,
};

/// 可由 SQLite 仓储读写的实体
#[async_trait]
pub trait SqliteEntity: Entity {
    /// 为已读取的行填充关联字段
    async fn attach_relations(_pool: &DbPool, _rows: &mut [Self]) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// 读取 `column IN (keys)` 的未删除行，按主键排序
async fn load_where_in<T>(
    pool: &DbPool,
    column: &str,
    keys: Vec<FieldValue>,
) -> Result<Vec<T>, RepositoryError>
where
    T: Entity + for<'r> FromRow<'r, SqliteRow>,
{
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM ");
    builder
        .push(T::TABLE)
        .push(" WHERE deleted_at IS NULL AND ")
        .push(column)
        .push(" IN (");
    for (index, key) in keys.iter().enumerate() {
        if index > 0 {
            builder.push(", ");
        }
        push_value(&mut builder, key);
    }
    builder.push(") ORDER BY id");

    builder
        .build_query_as::<T>()
        .fetch_all(pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))
}

/// 按主键批量读取被引用的行
async fn load_referenced<T>(
    pool: &DbPool,
    ids: impl Iterator<Item = Option<i64>>,
) -> Result<Vec<T>, RepositoryError>
where
    T: Entity<Id = i64> + Clone + for<'r> FromRow<'r, SqliteRow>,
{
    let keys = ids
        .flatten()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|id| FieldValue::Int(Some(id)))
        .collect();
    load_where_in(pool, "id", keys).await
}

/// 读取一组 uuid 父行的子行
async fn load_children<T>(
    pool: &DbPool,
    column: &str,
    parents: impl Iterator<Item = Uuid>,
) -> Result<Vec<T>, RepositoryError>
where
    T: Entity + for<'r> FromRow<'r, SqliteRow>,
{
    let keys = parents.map(|id| FieldValue::Uuid(Some(id))).collect();
    load_where_in(pool, column, keys).await
}

fn find_by_key<T: Entity<Id = i64> + Clone>(rows: &[T], key: Option<i64>) -> Option<T> {
    key.and_then(|key| rows.iter().find(|row| row.id() == key).cloned())
}

fn children_of<T: Clone>(rows: &[T], matches: impl Fn(&T) -> bool) -> Option<Vec<T>> {
    Some(rows.iter().filter(|row| matches(row)).cloned().collect())
}

// ============================================================================
// Entities without relations
// ============================================================================

impl SqliteEntity for SalesOrderStatus {}
impl SqliteEntity for Reminded {}
impl SqliteEntity for BookkeepingStatus {}
impl SqliteEntity for PaymentMethod {}
impl SqliteEntity for BookTransactionType {}
impl SqliteEntity for BookTransactionCategory {}
impl SqliteEntity for SalesOrderDetail {}
impl SqliteEntity for SalesOrderService {}
impl SqliteEntity for ArReceiptDetail {}
impl SqliteEntity for TreatmentDetail {}

// ============================================================================
// Documents
// ============================================================================

#[async_trait]
impl SqliteEntity for SalesOrder {
    async fn attach_relations(pool: &DbPool, rows: &mut [Self]) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let statuses: Vec<SalesOrderStatus> =
            load_referenced(pool, rows.iter().map(|r| r.status_id)).await?;
        let details: Vec<SalesOrderDetail> =
            load_children(pool, "sales_order_id", rows.iter().map(|r| r.id)).await?;
        let services: Vec<SalesOrderService> =
            load_children(pool, "sales_order_id", rows.iter().map(|r| r.id)).await?;

        for row in rows.iter_mut() {
            let id = Some(row.id);
            row.status = find_by_key(&statuses, row.status_id);
            row.details = children_of(&details, |d| d.sales_order_id == id);
            row.services = children_of(&services, |s| s.sales_order_id == id);
        }
        Ok(())
    }
}

#[async_trait]
impl SqliteEntity for ArReceipt {
    async fn attach_relations(pool: &DbPool, rows: &mut [Self]) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let details: Vec<ArReceiptDetail> =
            load_children(pool, "ar_receipt_id", rows.iter().map(|r| r.id)).await?;

        for row in rows.iter_mut() {
            let id = Some(row.id);
            row.details = children_of(&details, |d| d.ar_receipt_id == id);
        }
        Ok(())
    }
}

#[async_trait]
impl SqliteEntity for Treatment {
    async fn attach_relations(pool: &DbPool, rows: &mut [Self]) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let details: Vec<TreatmentDetail> =
            load_children(pool, "treatment_id", rows.iter().map(|r| r.id)).await?;

        for row in rows.iter_mut() {
            let id = Some(row.id);
            row.details = children_of(&details, |d| d.treatment_id == id);
        }
        Ok(())
    }
}

// ============================================================================
// Bookkeeping
// ============================================================================

#[async_trait]
impl SqliteEntity for Bookkeeping {
    async fn attach_relations(pool: &DbPool, rows: &mut [Self]) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let statuses: Vec<BookkeepingStatus> =
            load_referenced(pool, rows.iter().map(|r| r.status_id)).await?;
        let keys = rows.iter().map(|r| FieldValue::Int(Some(r.id))).collect();
        let mut details: Vec<BookkeepingDetail> =
            load_where_in(pool, "bookkeeping_id", keys).await?;
        BookkeepingDetail::attach_relations(pool, &mut details).await?;

        for row in rows.iter_mut() {
            let id = Some(row.id);
            row.status = find_by_key(&statuses, row.status_id);
            row.details = children_of(&details, |d| d.bookkeeping_id == id);
        }
        Ok(())
    }
}

#[async_trait]
impl SqliteEntity for BookkeepingDetail {
    async fn attach_relations(pool: &DbPool, rows: &mut [Self]) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let types: Vec<BookTransactionType> =
            load_referenced(pool, rows.iter().map(|r| r.type_id)).await?;
        let categories: Vec<BookTransactionCategory> =
            load_referenced(pool, rows.iter().map(|r| r.category_id)).await?;
        let methods: Vec<PaymentMethod> =
            load_referenced(pool, rows.iter().map(|r| r.payment_method_id)).await?;

        for row in rows.iter_mut() {
            row.transaction_type = find_by_key(&types, row.type_id);
            row.category = find_by_key(&categories, row.category_id);
            row.payment_method = find_by_key(&methods, row.payment_method_id);
        }
        Ok(())
    }
}

/// 汇总表引用的账簿头（不含明细）
async fn load_bookkeeping_headers(
    pool: &DbPool,
    ids: impl Iterator<Item = Option<i64>>,
) -> Result<Vec<Bookkeeping>, RepositoryError> {
    load_referenced(pool, ids).await
}

#[async_trait]
impl SqliteEntity for SummaryByTransactionType {
    async fn attach_relations(pool: &DbPool, rows: &mut [Self]) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let books = load_bookkeeping_headers(pool, rows.iter().map(|r| r.bookkeeping_id)).await?;
        let types: Vec<BookTransactionType> =
            load_referenced(pool, rows.iter().map(|r| r.type_id)).await?;

        for row in rows.iter_mut() {
            row.bookkeeping = find_by_key(&books, row.bookkeeping_id).map(Box::new);
            row.transaction_type = find_by_key(&types, row.type_id);
        }
        Ok(())
    }
}

#[async_trait]
impl SqliteEntity for SummaryByPaymentMethod {
    async fn attach_relations(pool: &DbPool, rows: &mut [Self]) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let books = load_bookkeeping_headers(pool, rows.iter().map(|r| r.bookkeeping_id)).await?;
        let methods: Vec<PaymentMethod> =
            load_referenced(pool, rows.iter().map(|r| r.payment_method_id)).await?;

        for row in rows.iter_mut() {
            row.bookkeeping = find_by_key(&books, row.bookkeeping_id).map(Box::new);
            row.payment_method = find_by_key(&methods, row.payment_method_id);
        }
        Ok(())
    }
}

#[async_trait]
impl SqliteEntity for SummaryByTransactionTypeAndPaymentMethod {
    async fn attach_relations(pool: &DbPool, rows: &mut [Self]) -> Result<(), RepositoryError> {
        if rows.is_empty() {
            return Ok(());
        }

        let books = load_bookkeeping_headers(pool, rows.iter().map(|r| r.bookkeeping_id)).await?;
        let types: Vec<BookTransactionType> =
            load_referenced(pool, rows.iter().map(|r| r.type_id)).await?;
        let methods: Vec<PaymentMethod> =
            load_referenced(pool, rows.iter().map(|r| r.payment_method_id)).await?;

        for row in rows.iter_mut() {
            row.bookkeeping = find_by_key(&books, row.bookkeeping_id).map(Box::new);
            row.transaction_type = find_by_key(&types, row.type_id);
            row.payment_method = find_by_key(&methods, row.payment_method_id);
        }
        Ok(())
    }
}
