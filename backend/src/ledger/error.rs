//! Failure taxonomy of the stock write path

use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Coarse classification callers translate into responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    InvalidState,
    Conflict,
    Unavailable,
    Internal,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("invalid {field}: {message}")]
    InvalidInput { field: &'static str, message: String },

    #[error("insufficient stock for spare part {spare_part_id}: {requested} requested, {on_hand} on hand")]
    InsufficientStock {
        spare_part_id: Uuid,
        requested: i32,
        on_hand: i32,
    },

    #[error("spare part {spare_part_id} would be left with {quantity_after} in stock")]
    NegativeStock {
        spare_part_id: Uuid,
        quantity_after: i32,
    },

    #[error("concurrent modification: {0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("internal store failure: {0}")]
    Internal(String),
}

pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NotFound { .. } => ErrorKind::NotFound,
            LedgerError::InvalidInput { .. } => ErrorKind::InvalidInput,
            LedgerError::InsufficientStock { .. } | LedgerError::NegativeStock { .. } => {
                ErrorKind::InvalidState
            }
            LedgerError::Conflict(_) => ErrorKind::Conflict,
            LedgerError::Unavailable(_) => ErrorKind::Unavailable,
            LedgerError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        LedgerError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn spare_part_not_found(id: Uuid) -> Self {
        LedgerError::NotFound {
            entity: "spare part",
            id,
        }
    }

    pub(crate) fn stock_out_not_found(id: Uuid) -> Self {
        LedgerError::NotFound {
            entity: "stock-out record",
            id,
        }
    }

    /// Field name of an input error, if any
    pub fn field(&self) -> Option<&'static str> {
        match self {
            LedgerError::InvalidInput { field, .. } => Some(*field),
            _ => None,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => LedgerError::Conflict(msg),
            StoreError::Unavailable(msg) => LedgerError::Unavailable(msg),
            StoreError::Constraint(msg) | StoreError::Backend(msg) => LedgerError::Internal(msg),
        }
    }
}

impl From<ValidationErrors> for LedgerError {
    /// Reports the first offending field, by name
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(field, _)| *field);

        match fields.first() {
            Some((field, errs)) => {
                let rule = errs.first().map(|e| e.code.to_string()).unwrap_or_default();
                LedgerError::invalid(*field, format!("failed {} check", rule))
            }
            None => LedgerError::invalid("input", "invalid input"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        let id = Uuid::new_v4();
        assert_eq!(LedgerError::spare_part_not_found(id).kind(), ErrorKind::NotFound);
        assert_eq!(LedgerError::invalid("quantity", "bad").kind(), ErrorKind::InvalidInput);
        assert_eq!(
            LedgerError::InsufficientStock {
                spare_part_id: id,
                requested: 3,
                on_hand: 2
            }
            .kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            LedgerError::NegativeStock {
                spare_part_id: id,
                quantity_after: -1
            }
            .kind(),
            ErrorKind::InvalidState
        );
    }

    #[test]
    fn test_store_errors_map_to_kinds() {
        let kind = |e: StoreError| LedgerError::from(e).kind();
        assert_eq!(kind(StoreError::Conflict("lock".into())), ErrorKind::Conflict);
        assert_eq!(kind(StoreError::Unavailable("down".into())), ErrorKind::Unavailable);
        assert_eq!(kind(StoreError::Constraint("fk".into())), ErrorKind::Internal);
        assert_eq!(kind(StoreError::Backend("boom".into())), ErrorKind::Internal);
    }

    #[test]
    fn test_field_only_on_input_errors() {
        assert_eq!(LedgerError::invalid("unit_price", "negative").field(), Some("unit_price"));
        assert_eq!(LedgerError::Conflict("x".into()).field(), None);
    }
}
