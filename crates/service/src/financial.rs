//! Read-time reconciliation services.
//!
//! None of the four keyspaces (investor CPF/CNPJ, ERP client code, ERP
//! project code, operation name) carry an authoritative foreign key
//! chain, so every query walks the chain: document → client codes →
//! project codes → project names → operations → movement rows. The walk
//! is resolved once per request into an [`InvestorScope`] and reused;
//! operation visibility is the named predicate
//! [`FinancialService::investor_can_view`] over that scope.

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use lastro_core::financial::{
    cost_breakdown, is_cost_row, matching, summarize, CostBreakdown, FinancialSummary,
    MovementRow, ProjectCandidate,
};
use lastro_db::entities::operations;
use lastro_db::repositories::{
    CategoryError, CategoryRepository, MovementError, MovementRepository, OperationError,
    OperationRepository, PartyError, PartyRepository, ProjectError, ProjectRepository,
};
use lastro_shared::types::Document;
use lastro_shared::AppError;

/// Error types for financial queries.
#[derive(Debug, thiserror::Error)]
pub enum FinancialError {
    /// The document resolved to no ERP client code.
    #[error("no ERP client code for document {0}")]
    NoClientCode(String),

    /// Unknown operation id.
    #[error("operation not found: {0}")]
    OperationNotFound(Uuid),

    /// The operation name matches no ERP project.
    #[error("no ERP project matches operation {0}")]
    NoProjectMatch(String),

    /// Storage failure.
    #[error("repository error: {0}")]
    Repository(String),
}

impl From<FinancialError> for AppError {
    fn from(err: FinancialError) -> Self {
        match err {
            FinancialError::NoClientCode(doc) => Self::NoClientCode(doc),
            FinancialError::OperationNotFound(id) => Self::NotFound(id.to_string()),
            FinancialError::NoProjectMatch(name) => Self::NoProjectMatch(name),
            FinancialError::Repository(msg) => Self::Database(msg),
        }
    }
}

impl From<MovementError> for FinancialError {
    fn from(err: MovementError) -> Self {
        Self::Repository(err.to_string())
    }
}

impl From<PartyError> for FinancialError {
    fn from(err: PartyError) -> Self {
        Self::Repository(err.to_string())
    }
}

impl From<ProjectError> for FinancialError {
    fn from(err: ProjectError) -> Self {
        Self::Repository(err.to_string())
    }
}

impl From<CategoryError> for FinancialError {
    fn from(err: CategoryError) -> Self {
        Self::Repository(err.to_string())
    }
}

impl From<OperationError> for FinancialError {
    fn from(err: OperationError) -> Self {
        Self::Repository(err.to_string())
    }
}

/// An investor's resolved reach across the keyspaces, computed once per
/// request.
#[derive(Debug, Clone)]
pub struct InvestorScope {
    /// Every ERP client code matching the investor's document.
    pub client_codes: Vec<i64>,
    /// Distinct project codes the investor's movements touch.
    pub project_codes: Vec<i64>,
    /// Names of those projects; the visibility set for operations.
    pub project_names: Vec<String>,
}

impl InvestorScope {
    /// Whether an operation name falls inside this scope.
    ///
    /// This is the de facto access-control boundary for investor-facing
    /// queries: an operation is visible only if its name resolves from
    /// the investor's own movements.
    #[must_use]
    pub fn covers_operation(&self, operation_name: &str) -> bool {
        self.project_names
            .iter()
            .any(|name| matching::names_match(name, operation_name))
    }
}

/// An operation with its financial summary inlined, as returned by
/// investor listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationFinancials {
    /// Operation id.
    pub id: Uuid,
    /// Operation name.
    pub name: String,
    /// Business status.
    pub status: Option<String>,
    /// City.
    pub city: Option<String>,
    /// State (UF).
    pub state: Option<String>,
    /// Timeline start.
    pub start_date: Option<NaiveDate>,
    /// Expected completion.
    pub expected_completion_date: Option<NaiveDate>,
    /// Document link.
    pub document_url: Option<String>,
    /// Financial summary for this investor-visible operation.
    #[serde(flatten)]
    pub financial: FinancialSummary,
    /// Total costs across the operation's payable movements.
    pub total_costs: Decimal,
}

/// Investor-facing financial queries over the synchronized data.
#[derive(Debug, Clone)]
pub struct FinancialService {
    movements: MovementRepository,
    parties: PartyRepository,
    projects: ProjectRepository,
    categories: CategoryRepository,
    operations: OperationRepository,
}

impl FinancialService {
    /// Creates a financial service over a database connection.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            movements: MovementRepository::new(db.clone()),
            parties: PartyRepository::new(db.clone()),
            projects: ProjectRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            operations: OperationRepository::new(db),
        }
    }

    /// Resolves an investor document to its scope across the keyspaces.
    ///
    /// # Errors
    ///
    /// Returns [`FinancialError::NoClientCode`] when the document maps
    /// to no ERP party, or a repository error on storage failure.
    pub async fn resolve_investor_scope(
        &self,
        cpf_cnpj: &str,
    ) -> Result<InvestorScope, FinancialError> {
        let document = Document::parse(cpf_cnpj);
        if document.is_empty() {
            return Err(FinancialError::NoClientCode(cpf_cnpj.to_string()));
        }

        let client_codes = self.parties.find_client_codes_by_document(&document).await?;
        if client_codes.is_empty() {
            return Err(FinancialError::NoClientCode(document.raw.clone()));
        }

        let project_codes = self
            .movements
            .distinct_project_codes_for_clients(&client_codes)
            .await?;
        let project_names = self
            .projects
            .find_by_internal_codes(&project_codes)
            .await?
            .into_iter()
            .map(|project| project.name)
            .collect();

        let scope = InvestorScope {
            client_codes,
            project_codes,
            project_names,
        };
        debug!(
            clients = scope.client_codes.len(),
            projects = scope.project_codes.len(),
            "resolved investor scope"
        );
        Ok(scope)
    }

    /// Whether an investor may see an operation.
    ///
    /// # Errors
    ///
    /// Returns an error when the operation does not exist, the document
    /// maps to no client code, or storage fails.
    pub async fn investor_can_view(
        &self,
        cpf_cnpj: &str,
        operation_id: Uuid,
    ) -> Result<bool, FinancialError> {
        let operation = self
            .operations
            .find_by_id(operation_id)
            .await?
            .ok_or(FinancialError::OperationNotFound(operation_id))?;
        let scope = self.resolve_investor_scope(cpf_cnpj).await?;
        Ok(scope.covers_operation(&operation.name))
    }

    /// Financial summary for one operation.
    ///
    /// `roi_expected_percent` comes from the spreadsheet-driven
    /// operation record and is normalized (fractions below one are
    /// scaled to percentages).
    ///
    /// # Errors
    ///
    /// Returns an error when the operation does not exist, no ERP
    /// project matches its name, or storage fails.
    pub async fn operation_financial(
        &self,
        operation_id: Uuid,
        roi_expected_percent: Decimal,
    ) -> Result<FinancialSummary, FinancialError> {
        let rows = self.operation_rows(operation_id).await?;
        Ok(summarize(&rows, roi_expected_percent))
    }

    /// Cost breakdown for one operation: payable movements grouped by
    /// category and supplier.
    ///
    /// # Errors
    ///
    /// Returns an error when the operation does not exist, no ERP
    /// project matches its name, or storage fails.
    pub async fn operation_costs(
        &self,
        operation_id: Uuid,
    ) -> Result<CostBreakdown, FinancialError> {
        let rows = self.operation_rows(operation_id).await?;

        let category_codes: Vec<String> = {
            let mut codes: Vec<String> = rows
                .iter()
                .filter(|row| is_cost_row(row))
                .filter_map(|row| row.category_code.clone())
                .collect();
            codes.sort_unstable();
            codes.dedup();
            codes
        };
        let party_codes: Vec<i64> = {
            let mut codes: Vec<i64> = rows
                .iter()
                .filter(|row| is_cost_row(row))
                .filter_map(|row| row.client_code)
                .collect();
            codes.sort_unstable();
            codes.dedup();
            codes
        };

        let category_names = self.categories.names_by_codes(&category_codes).await?;
        let party_names = self.parties.names_by_codes(&party_codes).await?;

        Ok(cost_breakdown(&rows, &category_names, &party_names))
    }

    /// Every operation visible to an investor, with financials inlined.
    ///
    /// # Errors
    ///
    /// Returns an error when the document maps to no client code or
    /// storage fails.
    pub async fn list_operations_for_investor(
        &self,
        cpf_cnpj: &str,
    ) -> Result<Vec<OperationFinancials>, FinancialError> {
        let scope = self.resolve_investor_scope(cpf_cnpj).await?;

        let candidates: Vec<ProjectCandidate> = self
            .projects
            .find_by_internal_codes(&scope.project_codes)
            .await?
            .into_iter()
            .map(lastro_db::repositories::project::candidate)
            .collect();

        let rows = self
            .movements
            .rows_by_project_codes(&scope.project_codes)
            .await?;
        let mut rows_by_project: HashMap<i64, Vec<MovementRow>> = HashMap::new();
        for row in rows {
            if let Some(project_code) = row.project_code {
                rows_by_project.entry(project_code).or_default().push(row);
            }
        }

        let mut results = Vec::new();
        for operation in self.operations.list_all().await? {
            if !scope.covers_operation(&operation.name) {
                continue;
            }
            let Some(project) = matching::best_project_match(&operation.name, &candidates)
            else {
                continue;
            };
            let project_rows = rows_by_project
                .get(&project.internal_code)
                .map_or(&[] as &[MovementRow], Vec::as_slice);

            let roi_expected = operation.expected_roi.unwrap_or(Decimal::ZERO);
            let financial = summarize(project_rows, roi_expected);
            let total_costs = project_rows
                .iter()
                .filter(|row| is_cost_row(row))
                .map(|row| row.amount)
                .sum();

            results.push(operation_financials(operation, financial, total_costs));
        }

        Ok(results)
    }

    /// Resolves an operation to its best-matching project's movement
    /// rows.
    async fn operation_rows(
        &self,
        operation_id: Uuid,
    ) -> Result<Vec<MovementRow>, FinancialError> {
        let operation = self
            .operations
            .find_by_id(operation_id)
            .await?
            .ok_or(FinancialError::OperationNotFound(operation_id))?;

        let candidates = self.projects.list_candidates().await?;
        let project = matching::best_project_match(&operation.name, &candidates)
            .ok_or_else(|| FinancialError::NoProjectMatch(operation.name.clone()))?;

        let rows = self
            .movements
            .rows_by_project_codes(&[project.internal_code])
            .await?;
        Ok(rows)
    }
}

fn operation_financials(
    operation: operations::Model,
    financial: FinancialSummary,
    total_costs: Decimal,
) -> OperationFinancials {
    OperationFinancials {
        id: operation.id,
        name: operation.name,
        status: operation.status,
        city: operation.city,
        state: operation.state,
        start_date: operation.start_date,
        expected_completion_date: operation.expected_completion_date,
        document_url: operation.document_url,
        financial,
        total_costs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(names: &[&str]) -> InvestorScope {
        InvestorScope {
            client_codes: vec![1],
            project_codes: vec![77],
            project_names: names.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_scope_covers_operation_normalized() {
        let scope = scope(&["Residencial Aurora", "Edificio Horizonte"]);

        assert!(scope.covers_operation("residencial  aurora"));
        assert!(scope.covers_operation("Edificio Horizonte"));
        assert!(!scope.covers_operation("Residencial Aurora 2"));
        assert!(!scope.covers_operation("Outra Obra"));
    }

    #[test]
    fn test_empty_scope_covers_nothing() {
        let scope = scope(&[]);
        assert!(!scope.covers_operation("Residencial Aurora"));
    }

    #[test]
    fn test_financial_error_maps_to_app_error_codes() {
        let err: AppError = FinancialError::NoClientCode("123".to_string()).into();
        assert_eq!(err.error_code(), "NO_CLIENT_CODE");
        assert_eq!(err.status_code(), 404);

        let err: AppError = FinancialError::NoProjectMatch("Aurora".to_string()).into();
        assert_eq!(err.error_code(), "NO_PROJECT_MATCH");

        let err: AppError = FinancialError::OperationNotFound(Uuid::nil()).into();
        assert_eq!(err.error_code(), "NOT_FOUND");

        let err: AppError = FinancialError::Repository("boom".to_string()).into();
        assert_eq!(err.error_code(), "DATABASE_ERROR");
        assert_eq!(err.status_code(), 500);
    }
}
