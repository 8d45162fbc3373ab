//! Error type shared by the store, the services and the HTTP layer.

use poem::{error::ResponseError, http::StatusCode};
use sea_orm::{DbErr, SqlErr};

pub type Result<T, E = PortalError> = std::result::Result<T, E>;

/// Which registry a duplicate email was rejected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    Student,
    Company,
}

impl std::fmt::Display for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Registry::Student => f.write_str("Student"),
            Registry::Company => f.write_str("Company"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Advisory: the email is already taken within this registry.
    #[error("{0} already registered.")]
    AlreadyRegistered(Registry),
    #[error("company {0} does not exist")]
    UnknownCompany(i32),
    #[error("invalid input: {0}")]
    Invalid(#[from] validator::ValidationErrors),
    #[error("file type not allowed: {0}")]
    DisallowedFile(String),
    #[error("invalid file name: {0:?}")]
    BadFileName(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl PortalError {
    /// Classifies a failed insert. A unique violation means a concurrent
    /// registration won the race after our pre-check, a foreign key violation
    /// means the company vanished or never existed.
    pub fn from_insert(err: DbErr, registry: Option<Registry>, company_id: Option<i32>) -> Self {
        match (err.sql_err(), registry, company_id) {
            (Some(SqlErr::UniqueConstraintViolation(_)), Some(registry), _) => {
                PortalError::AlreadyRegistered(registry)
            }
            (Some(SqlErr::ForeignKeyConstraintViolation(_)), _, Some(id)) => {
                PortalError::UnknownCompany(id)
            }
            _ => PortalError::Db(err),
        }
    }
}

impl ResponseError for PortalError {
    fn status(&self) -> StatusCode {
        match self {
            PortalError::AlreadyRegistered(_) => StatusCode::CONFLICT,
            PortalError::UnknownCompany(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PortalError::Invalid(_)
            | PortalError::DisallowedFile(_)
            | PortalError::BadFileName(_) => StatusCode::BAD_REQUEST,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Db(_) | PortalError::Io(_) | PortalError::Csv(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_names_the_registry() {
        assert_eq!(
            PortalError::AlreadyRegistered(Registry::Student).to_string(),
            "Student already registered."
        );
        assert_eq!(
            PortalError::AlreadyRegistered(Registry::Company).to_string(),
            "Company already registered."
        );
    }

    #[test]
    fn statuses_follow_the_taxonomy() {
        assert_eq!(
            PortalError::AlreadyRegistered(Registry::Student).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            PortalError::UnknownCompany(7).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            PortalError::NotFound("cv.pdf".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            PortalError::Db(DbErr::Custom("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn unclassified_insert_failure_stays_a_db_error() {
        let err = PortalError::from_insert(DbErr::Custom("boom".into()), Some(Registry::Student), None);
        assert!(matches!(err, PortalError::Db(_)));
    }
}
