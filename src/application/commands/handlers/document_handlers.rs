//! Document Command Handlers
//!
//! 父表与明细在同一事务中创建

use std::sync::Arc;

use crate::application::commands::CreateDocument;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    CrudRepositoryPort, DocumentRepositoryPort, NewDocument, RepositoryError, Visibility,
};
use crate::domain::{DocumentPayload, Payload, Writable};

/// CreateDocument Handler
pub struct CreateDocumentHandler<E: Writable> {
    documents: Arc<dyn DocumentRepositoryPort<E>>,
    repo: Arc<dyn CrudRepositoryPort<E>>,
}

impl<E> CreateDocumentHandler<E>
where
    E: Writable,
    E::Payload: DocumentPayload,
{
    pub fn new(
        documents: Arc<dyn DocumentRepositoryPort<E>>,
        repo: Arc<dyn CrudRepositoryPort<E>>,
    ) -> Self {
        Self { documents, repo }
    }

    pub async fn handle(&self, command: CreateDocument<E::Payload>) -> Result<E, ApplicationError> {
        let mut payload = command.payload;

        let mut errors = payload.validate().err().unwrap_or_default();
        if let Err(line_errors) = payload.validate_lines() {
            errors.extend(line_errors);
        }
        if !errors.is_empty() {
            return Err(ApplicationError::validation(errors));
        }
        payload.fill_computed();

        let document = NewDocument {
            header: payload.fields(),
            lines: payload.lines(),
        };
        let line_count: usize = document.lines.iter().map(|set| set.rows.len()).sum();

        let id = self
            .documents
            .insert_document(document, command.actor)
            .await
            .map_err(|e| match e {
                RepositoryError::LineInsertFailed { label, .. } => {
                    ApplicationError::write_failed(format!("Failed to create {}", label), e)
                }
                RepositoryError::TransactionError(_) => {
                    ApplicationError::write_failed("Failed to commit transaction", e)
                }
                other => {
                    ApplicationError::write_failed(format!("Failed to create {}", E::LABEL), other)
                }
            })?;

        tracing::info!(
            table = E::TABLE,
            id = %id,
            lines = line_count,
            actor = command.actor,
            "Document created"
        );

        self.repo
            .find_by_id(id, Visibility::IncludeDeleted)
            .await
            .map_err(|e| ApplicationError::read_failed(format!("Failed to retrieve {}", E::LABEL), e))?
            .ok_or_else(|| ApplicationError::not_found(E::LABEL, id))
    }
}
