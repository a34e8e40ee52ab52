use patungan_domain::{
    model::{BillId, Money, UserId},
    services::{BillValidationError, SettlementError, ShareRoundingError},
};

/// Coarse classification used to pick a log level at the edge of the
/// application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// The caller sent something invalid; log quietly, tell the caller.
    UserInput,
    /// The deployment is wired up wrong (missing accounts and the like).
    Misconfiguration,
    /// An invariant the code maintains itself was broken.
    InternalBug,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("bill {0} already stored")]
    DuplicateBill(BillId),
    #[error("bill {0} not stored")]
    MissingBill(BillId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("no balance account for user {0}")]
    UnknownAccount(UserId),
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Money, available: Money },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BillingError {
    #[error("no active session")]
    NotAuthenticated,
    #[error("bill {0} not found")]
    BillNotFound(BillId),
    #[error("participant record {index} names neither a user nor an external person")]
    MalformedParticipant { index: usize },
    #[error("split record {index} of item {item} names neither a user nor an external person")]
    MalformedSplit { item: usize, index: usize },
    #[error("top-up amount must be positive")]
    NonPositiveTopUp,
    #[error("bill rejected: {0:?}")]
    Validation(BillValidationError),
    #[error("settlement rejected: {0:?}")]
    Settlement(SettlementError),
    #[error("ledger failure: {0}")]
    Ledger(#[from] LedgerError),
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

impl From<BillValidationError> for BillingError {
    fn from(err: BillValidationError) -> Self {
        Self::Validation(err)
    }
}

impl From<SettlementError> for BillingError {
    fn from(err: SettlementError) -> Self {
        Self::Settlement(err)
    }
}

impl BillingError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotAuthenticated
            | Self::BillNotFound(_)
            | Self::MalformedParticipant { .. }
            | Self::MalformedSplit { .. }
            | Self::NonPositiveTopUp
            | Self::Settlement(_) => FailureKind::UserInput,
            // Quantization only fails on apportionment bugs; every other
            // validation failure is the caller's.
            Self::Validation(BillValidationError::Rounding(rounding)) => match rounding {
                ShareRoundingError::TotalMismatch { .. }
                | ShareRoundingError::NonIntegralTotal
                | ShareRoundingError::NonIntegral
                | ShareRoundingError::AdjustmentOutOfBounds => FailureKind::InternalBug,
            },
            Self::Validation(_) => FailureKind::UserInput,
            Self::Ledger(LedgerError::UnknownAccount(_)) => FailureKind::Misconfiguration,
            Self::Ledger(LedgerError::InsufficientFunds { .. }) => FailureKind::UserInput,
            Self::Store(_) => FailureKind::InternalBug,
        }
    }
}
