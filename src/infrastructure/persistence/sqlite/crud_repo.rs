//! SQLite CRUD Repository
//!
//! 所有实体共用的仓储实现；SQL 由 `QueryBuilder` 按实体描述动态拼接，
//! 列名只来自编译期常量，值一律参数绑定

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection};
use std::marker::PhantomData;
use uuid::Uuid;

use super::relations::SqliteEntity;
use super::DbPool;
use crate::application::ports::{
    CrudRepositoryPort, DocumentRepositoryPort, ListQuery, NewDocument, RepositoryError,
    Visibility,
};
use crate::domain::{EntityId, FieldValue, Fields, Filter, FilterOp};

/// 绑定一个可空值
pub(crate) fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &FieldValue) {
    match value.clone() {
        FieldValue::Int(v) => builder.push_bind(v),
        FieldValue::Real(v) => builder.push_bind(v),
        FieldValue::Text(v) => builder.push_bind(v),
        FieldValue::Bool(v) => builder.push_bind(v),
        FieldValue::Date(v) => builder.push_bind(v),
        FieldValue::Uuid(v) => builder.push_bind(v),
    };
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) {
    builder.push(" AND ").push(filter.column);
    match filter.op {
        FilterOp::Eq => {
            builder.push(" = ");
            push_value(builder, &filter.value);
        }
        FilterOp::Contains => {
            builder.push(" LIKE '%' || ");
            push_value(builder, &filter.value);
            builder.push(" || '%'");
        }
        FilterOp::Gte => {
            builder.push(" >= ");
            push_value(builder, &filter.value);
        }
        FilterOp::Lte => {
            builder.push(" <= ");
            push_value(builder, &filter.value);
        }
    }
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}

/// 插入一行并写入 created_by / created_at / updated_at，返回 rowid
///
/// 单行写入与单据事务共用
pub(crate) async fn insert_row(
    conn: &mut SqliteConnection,
    table: &str,
    id: Option<FieldValue>,
    fields: &Fields,
    actor: i64,
) -> Result<i64, sqlx::Error> {
    let now = Utc::now();

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("INSERT INTO ");
    builder
        .push(table)
        .push(" (created_by, created_at, updated_at");
    if id.is_some() {
        builder.push(", id");
    }
    for (column, _) in fields {
        builder.push(", ").push(*column);
    }

    builder.push(") VALUES (");
    builder.push_bind(actor);
    builder.push(", ").push_bind(now);
    builder.push(", ").push_bind(now);
    if let Some(id) = &id {
        builder.push(", ");
        push_value(&mut builder, id);
    }
    for (_, value) in fields {
        builder.push(", ");
        push_value(&mut builder, value);
    }
    builder.push(")");

    let result = builder.build().execute(&mut *conn).await?;
    Ok(result.last_insert_rowid())
}

/// 通用 SQLite 仓储
pub struct SqliteCrudRepository<E> {
    pool: DbPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> SqliteCrudRepository<E> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E> CrudRepositoryPort<E> for SqliteCrudRepository<E>
where
    E: SqliteEntity + for<'r> FromRow<'r, SqliteRow>,
{
    async fn find_all(&self, query: &ListQuery) -> Result<Vec<E>, RepositoryError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM ");
        builder.push(E::TABLE).push(" WHERE deleted_at IS NULL");
        for filter in &query.filters {
            push_filter(&mut builder, filter);
        }
        builder.push(" ORDER BY created_at DESC, rowid DESC");

        if let Some(page) = query.page {
            builder.push(" LIMIT ").push_bind(i64::from(page.size));
            builder
                .push(" OFFSET ")
                .push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));
        }

        let mut rows = builder
            .build_query_as::<E>()
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        E::attach_relations(&self.pool, &mut rows).await?;
        Ok(rows)
    }

    async fn find_by_id(
        &self,
        id: E::Id,
        visibility: Visibility,
    ) -> Result<Option<E>, RepositoryError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM ");
        builder.push(E::TABLE).push(" WHERE id = ");
        push_value(&mut builder, &id.value());
        if visibility == Visibility::Live {
            builder.push(" AND deleted_at IS NULL");
        }

        let row = builder
            .build_query_as::<E>()
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut rows = vec![row];
        E::attach_relations(&self.pool, &mut rows).await?;
        Ok(rows.pop())
    }

    async fn insert(&self, fields: Fields, actor: i64) -> Result<E::Id, RepositoryError> {
        let generated = E::Id::generate();

        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        let rowid = insert_row(
            &mut conn,
            E::TABLE,
            generated.map(|id| id.value()),
            &fields,
            actor,
        )
        .await
        .map_err(db_error)?;

        generated
            .or_else(|| E::Id::from_rowid(rowid))
            .ok_or_else(|| {
                RepositoryError::DatabaseError(format!("no id assigned for {}", E::TABLE))
            })
    }

    async fn update(&self, id: E::Id, fields: Fields, actor: i64) -> Result<(), RepositoryError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE ");
        builder
            .push(E::TABLE)
            .push(" SET updated_by = ")
            .push_bind(actor)
            .push(", updated_at = ")
            .push_bind(Utc::now());
        for (column, value) in &fields {
            builder.push(", ").push(*column).push(" = ");
            push_value(&mut builder, value);
        }
        builder.push(" WHERE id = ");
        push_value(&mut builder, &id.value());
        builder.push(" AND deleted_at IS NULL");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("{} {}", E::TABLE, id)));
        }
        Ok(())
    }

    async fn soft_delete(&self, id: E::Id, actor: i64) -> Result<(), RepositoryError> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE ");
        builder
            .push(E::TABLE)
            .push(" SET deleted_by = ")
            .push_bind(actor)
            .push(", deleted_at = ")
            .push_bind(Utc::now())
            .push(" WHERE id = ");
        push_value(&mut builder, &id.value());
        builder.push(" AND deleted_at IS NULL");

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("{} {}", E::TABLE, id)));
        }
        Ok(())
    }
}

#[async_trait]
impl<E> DocumentRepositoryPort<E> for SqliteCrudRepository<E>
where
    E: SqliteEntity<Id = Uuid> + for<'r> FromRow<'r, SqliteRow>,
{
    async fn insert_document(
        &self,
        document: NewDocument,
        actor: i64,
    ) -> Result<Uuid, RepositoryError> {
        let id = Uuid::new_v4();

        // 提前返回时事务随 drop 回滚
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        insert_row(&mut tx, E::TABLE, Some(id.value()), &document.header, actor)
            .await
            .map_err(db_error)?;

        for set in document.lines {
            for mut row in set.rows {
                row.push((set.parent_column, FieldValue::Uuid(Some(id))));
                insert_row(&mut tx, set.table, None, &row, actor)
                    .await
                    .map_err(|e| RepositoryError::LineInsertFailed {
                        label: set.label,
                        message: e.to_string(),
                    })?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::TransactionError(e.to_string()))?;

        Ok(id)
    }
}
