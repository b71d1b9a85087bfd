//! Entity Command Handlers
//!
//! 通用的创建、更新、删除处理器，每个请求基于租户连接池构建

use std::sync::Arc;

use crate::application::commands::{CreateEntity, DeleteEntity, PatchEntity, UpdateEntity};
use crate::application::error::ApplicationError;
use crate::application::ports::{CrudRepositoryPort, Visibility};
use crate::domain::{Entity, Payload, Writable};

/// 读取未删除的行，不存在时返回 NotFound
async fn load_live<E: Entity>(
    repo: &dyn CrudRepositoryPort<E>,
    id: E::Id,
) -> Result<E, ApplicationError> {
    repo.find_by_id(id, Visibility::Live)
        .await
        .map_err(|e| ApplicationError::read_failed(format!("Failed to retrieve {}", E::LABEL), e))?
        .ok_or_else(|| ApplicationError::not_found(E::LABEL, id))
}

/// 写入后重新读取（附带关联数据）
async fn reload<E: Entity>(
    repo: &dyn CrudRepositoryPort<E>,
    id: E::Id,
) -> Result<E, ApplicationError> {
    repo.find_by_id(id, Visibility::IncludeDeleted)
        .await
        .map_err(|e| ApplicationError::read_failed(format!("Failed to retrieve {}", E::LABEL), e))?
        .ok_or_else(|| ApplicationError::not_found(E::LABEL, id))
}

// ============================================================================
// CreateEntity
// ============================================================================

/// CreateEntity Handler
pub struct CreateEntityHandler<E: Writable> {
    repo: Arc<dyn CrudRepositoryPort<E>>,
}

impl<E: Writable> CreateEntityHandler<E> {
    pub fn new(repo: Arc<dyn CrudRepositoryPort<E>>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, command: CreateEntity<E::Payload>) -> Result<E, ApplicationError> {
        let mut payload = command.payload;
        payload.validate().map_err(ApplicationError::validation)?;
        payload.fill_computed();

        let id = self
            .repo
            .insert(payload.fields(), command.actor)
            .await
            .map_err(|e| ApplicationError::write_failed(format!("Failed to create {}", E::LABEL), e))?;

        tracing::info!(
            table = E::TABLE,
            id = %id,
            actor = command.actor,
            "Entity created"
        );

        reload(self.repo.as_ref(), id).await
    }
}

// ============================================================================
// UpdateEntity
// ============================================================================

/// UpdateEntity Handler
///
/// 已软删除的行视为不存在
pub struct UpdateEntityHandler<E: Writable> {
    repo: Arc<dyn CrudRepositoryPort<E>>,
}

impl<E: Writable> UpdateEntityHandler<E> {
    pub fn new(repo: Arc<dyn CrudRepositoryPort<E>>) -> Self {
        Self { repo }
    }

    pub async fn handle(
        &self,
        command: UpdateEntity<E::Id, E::Payload>,
    ) -> Result<E, ApplicationError> {
        let mut payload = command.payload;
        payload.validate().map_err(ApplicationError::validation)?;
        payload.fill_computed();

        load_live(self.repo.as_ref(), command.id).await?;

        self.repo
            .update(command.id, payload.fields(), command.actor)
            .await
            .map_err(|e| ApplicationError::write_failed(format!("Failed to update {}", E::LABEL), e))?;

        tracing::info!(
            table = E::TABLE,
            id = %command.id,
            actor = command.actor,
            "Entity updated"
        );

        reload(self.repo.as_ref(), command.id).await
    }
}

// ============================================================================
// PatchEntity
// ============================================================================

/// PatchEntity Handler：只改写给定列
pub struct PatchEntityHandler<E: Entity> {
    repo: Arc<dyn CrudRepositoryPort<E>>,
}

impl<E: Entity> PatchEntityHandler<E> {
    pub fn new(repo: Arc<dyn CrudRepositoryPort<E>>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, command: PatchEntity<E::Id>) -> Result<E, ApplicationError> {
        load_live(self.repo.as_ref(), command.id).await?;

        let columns: Vec<&str> = command.fields.iter().map(|(column, _)| *column).collect();

        self.repo
            .update(command.id, command.fields, command.actor)
            .await
            .map_err(|e| ApplicationError::write_failed(format!("Failed to update {}", E::LABEL), e))?;

        tracing::info!(
            table = E::TABLE,
            id = %command.id,
            columns = ?columns,
            actor = command.actor,
            "Entity patched"
        );

        reload(self.repo.as_ref(), command.id).await
    }
}

// ============================================================================
// DeleteEntity
// ============================================================================

/// DeleteEntity Handler（软删除）
pub struct DeleteEntityHandler<E: Entity> {
    repo: Arc<dyn CrudRepositoryPort<E>>,
}

impl<E: Entity> DeleteEntityHandler<E> {
    pub fn new(repo: Arc<dyn CrudRepositoryPort<E>>) -> Self {
        Self { repo }
    }

    pub async fn handle(&self, command: DeleteEntity<E::Id>) -> Result<(), ApplicationError> {
        load_live(self.repo.as_ref(), command.id).await?;

        self.repo
            .soft_delete(command.id, command.actor)
            .await
            .map_err(|e| ApplicationError::write_failed(format!("Failed to delete {}", E::LABEL), e))?;

        tracing::info!(
            table = E::TABLE,
            id = %command.id,
            actor = command.actor,
            "Entity deleted"
        );

        Ok(())
    }
}
