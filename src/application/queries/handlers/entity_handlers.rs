//! Entity Query Handlers

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{CrudRepositoryPort, ListQuery, Visibility};
use crate::application::queries::{GetEntity, ListByParent, ListEntities};
use crate::domain::{Entity, Filter, FilterOp};

// ============================================================================
// ListEntities
// ============================================================================

/// ListEntities Handler
pub struct ListEntitiesHandler<E: Entity> {
    repo: Arc<dyn CrudRepositoryPort<E>>,
}

impl<E: Entity> ListEntitiesHandler<E> {
    pub fn new(repo: Arc<dyn CrudRepositoryPort<E>>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, query: ListEntities) -> Result<Vec<E>, ApplicationError> {
        let rows = self.repo.find_all(&query.query).await.map_err(|e| {
            ApplicationError::read_failed(format!("Failed to retrieve {}", E::LABEL_PLURAL), e)
        })?;

        tracing::debug!(table = E::TABLE, count = rows.len(), "Entities listed");

        Ok(rows)
    }
}

// ============================================================================
// GetEntity
// ============================================================================

/// GetEntity Handler
///
/// 按主键读取不过滤软删除，已删除的行仍可获取
pub struct GetEntityHandler<E: Entity> {
    repo: Arc<dyn CrudRepositoryPort<E>>,
}

impl<E: Entity> GetEntityHandler<E> {
    pub fn new(repo: Arc<dyn CrudRepositoryPort<E>>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, query: GetEntity<E::Id>) -> Result<E, ApplicationError> {
        self.repo
            .find_by_id(query.id, Visibility::IncludeDeleted)
            .await
            .map_err(|e| ApplicationError::read_failed(format!("Failed to retrieve {}", E::LABEL), e))?
            .ok_or_else(|| ApplicationError::not_found(E::LABEL, query.id))
    }
}

// ============================================================================
// ListByParent
// ============================================================================

/// ListByParent Handler
pub struct ListByParentHandler<E: Entity> {
    repo: Arc<dyn CrudRepositoryPort<E>>,
}

impl<E: Entity> ListByParentHandler<E> {
    pub fn new(repo: Arc<dyn CrudRepositoryPort<E>>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, query: ListByParent) -> Result<Vec<E>, ApplicationError> {
        let parent = E::PARENT.ok_or_else(|| {
            ApplicationError::internal(format!("{} has no parent key", E::TABLE))
        })?;

        let filter = Filter {
            column: parent.column,
            op: FilterOp::Eq,
            value: query.parent,
        };
        let list = ListQuery::new(vec![filter]).with_page(query.page);

        self.repo.find_all(&list).await.map_err(|e| {
            ApplicationError::read_failed(format!("Failed to retrieve {}", E::LABEL_PLURAL), e)
        })
    }
}
