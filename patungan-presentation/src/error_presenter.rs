use patungan_application::{BillingError, LedgerError, StoreError};
use patungan_domain::services::{BillValidationError, SettlementError};

use crate::currency::format_idr;

/// Maps an application error to the message shown to the user. Internal
/// failures get a generic line; the detail belongs in the logs.
pub fn format_billing_error(err: &BillingError) -> String {
    match err {
        BillingError::NotAuthenticated => "Please sign in first.".to_string(),
        BillingError::BillNotFound(_) => "That bill does not exist.".to_string(),
        BillingError::MalformedParticipant { index } => {
            format!(
                "Participant {} must be either a registered user or a named guest.",
                index + 1
            )
        }
        BillingError::MalformedSplit { item, index } => {
            format!(
                "Split entry {} of item {} must be either a registered user or a named guest.",
                index + 1,
                item + 1
            )
        }
        BillingError::NonPositiveTopUp => "Top-up amount must be greater than zero.".to_string(),
        BillingError::Validation(validation) => format_validation_error(validation),
        BillingError::Settlement(settlement) => format_settlement_error(settlement),
        BillingError::Ledger(LedgerError::InsufficientFunds {
            required,
            available,
        }) => {
            format!(
                "Insufficient balance: {} needed, {} available.",
                format_idr(*required),
                format_idr(*available)
            )
        }
        BillingError::Ledger(LedgerError::UnknownAccount(_)) => {
            "Your balance account is not set up yet.".to_string()
        }
        BillingError::Store(StoreError::DuplicateBill(_) | StoreError::MissingBill(_)) => {
            "Something went wrong saving the bill. Please try again.".to_string()
        }
    }
}

fn format_validation_error(err: &BillValidationError) -> String {
    match err {
        BillValidationError::BlankBillName => "The bill needs a name.".to_string(),
        BillValidationError::NoParticipants => {
            "Add at least one participant to the bill.".to_string()
        }
        BillValidationError::DuplicateParticipant { .. } => {
            "Each participant can only appear once.".to_string()
        }
        BillValidationError::BlankItemName { index } => {
            format!("Item {} needs a name.", index + 1)
        }
        BillValidationError::NonPositivePrice { item } => {
            format!("\"{item}\" needs a price greater than zero.")
        }
        BillValidationError::ZeroQuantity { item } => {
            format!("\"{item}\" needs a quantity of at least one.")
        }
        BillValidationError::AmountTooLarge { item } => {
            format!("\"{item}\" makes the bill total too large to compute.")
        }
        BillValidationError::UndeclaredSplitParty { item, .. } => {
            format!("\"{item}\" is assigned to someone who is not on the bill.")
        }
        BillValidationError::SplitQuantityMismatch {
            item,
            expected,
            actual,
        } => {
            format!("\"{item}\" splits {actual} of {expected} units; they must match.")
        }
        BillValidationError::UnsplittableSingleUnit { item } => {
            format!("\"{item}\" is a single unit and cannot be divided.")
        }
        BillValidationError::Rounding(_) => {
            "Something went wrong computing the shares. Please try again.".to_string()
        }
    }
}

fn format_settlement_error(err: &SettlementError) -> String {
    match err {
        SettlementError::PayerNotParticipant => "You are not part of this bill.".to_string(),
        SettlementError::ParticipantIndexOutOfRange { .. } => {
            "That participant is not on this bill.".to_string()
        }
        SettlementError::NotCreator => {
            "Only the bill creator can mark someone else as paid.".to_string()
        }
        SettlementError::ParticipantLinked { .. } => {
            "That participant has an account and must pay from their own balance.".to_string()
        }
        SettlementError::AlreadySettled => "This share has already been paid.".to_string(),
        SettlementError::InsufficientFunds {
            required,
            available,
        } => {
            format!(
                "Insufficient balance: {} needed, {} available.",
                format_idr(*required),
                format_idr(*available)
            )
        }
    }
}
