//! Operation repository.
//!
//! Operations are maintained from a spreadsheet by a separate ingestion
//! path; this repository only reads them as the business-facing join
//! target.

use sea_orm::{DatabaseConnection, DbErr, EntityTrait, QueryOrder};
use uuid::Uuid;

use crate::entities::operations;

/// Error types for operation lookups.
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Read-only repository for investment operations.
#[derive(Debug, Clone)]
pub struct OperationRepository {
    db: DatabaseConnection,
}

impl OperationRepository {
    /// Creates a new operation repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds one operation by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<operations::Model>, OperationError> {
        let operation = operations::Entity::find_by_id(id).one(&self.db).await?;
        Ok(operation)
    }

    /// Every operation, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_all(&self) -> Result<Vec<operations::Model>, OperationError> {
        let operations = operations::Entity::find()
            .order_by_asc(operations::Column::Name)
            .all(&self.db)
            .await?;
        Ok(operations)
    }
}
