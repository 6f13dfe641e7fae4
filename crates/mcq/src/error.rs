use crate::Field;

/// Reason why a question block was dropped by the parser.
///
/// A block is either parsed as a whole or rejected as a whole,
/// there is no partial recovery.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("The block has no `{field}` field (or the fields are out of order)")]
    MissingField { field: Field },

    #[error("The `{field}` field is empty")]
    EmptyField { field: Field },

    #[error("The correct answer must be a single letter from A to D, but got `{input}`")]
    InvalidAnswer { input: String },
}
