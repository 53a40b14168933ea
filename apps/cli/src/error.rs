//! # CLI Error Type
//!
//! Every command returns [`CliResult`]; `main` prints the message and exits
//! with [`CliError::exit_code`].
//!
//! ```text
//! DbError::Validation / Import ─┐
//! CoreError::Validation ────────┼──► Usage      (2)
//! bad arguments ────────────────┘
//! CoreError::ItemNotFound ──────────► NotFound  (3)
//! CoreError::AlreadySold ───────────► Conflict  (4)
//! everything else ──────────────────► Failure   (1)
//! ```

use shoebox_core::{CoreError, ValidationError};
use shoebox_db::{ConfigError, DbError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("설정 오류: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Core(#[from] CoreError),

    /// Arguments that parse but make no sense together.
    #[error("{0}")]
    Usage(String),

    /// The command ran but achieved nothing (e.g. an import with zero rows saved).
    #[error("{0}")]
    Failed(String),

    #[error("입출력 오류: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationError> for CliError {
    fn from(err: ValidationError) -> Self {
        CliError::Core(CoreError::Validation(err))
    }
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) | CliError::Config(_) => 2,
            CliError::Core(err) => match err {
                CoreError::Validation(_) => 2,
                CoreError::ItemNotFound(_) | CoreError::BarcodeNotFound(_) => 3,
                CoreError::AlreadySold { .. } => 4,
                CoreError::Render(_) => 1,
            },
            CliError::Db(err) => match err {
                DbError::NotFound { .. } => 3,
                DbError::Core(CoreError::AlreadySold { .. }) => 4,
                err if err.is_client_error() => 2,
                _ => 1,
            },
            CliError::Failed(_) | CliError::Io(_) => 1,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shoebox_core::ImportError;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Usage("x".into()).exit_code(), 2);
        assert_eq!(CliError::from(ValidationError::required("name")).exit_code(), 2);
        assert_eq!(CliError::from(DbError::from(ImportError::EmptyInput)).exit_code(), 2);
        assert_eq!(CliError::Core(CoreError::ItemNotFound("a".into())).exit_code(), 3);
        assert_eq!(
            CliError::Core(CoreError::AlreadySold {
                id: "a".into(),
                sale_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            })
            .exit_code(),
            4
        );
        assert_eq!(CliError::Db(DbError::PoolExhausted).exit_code(), 1);
        assert_eq!(CliError::Failed("nothing".into()).exit_code(), 1);
    }
}
