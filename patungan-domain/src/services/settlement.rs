//! Settlement of participant obligations.
//!
//! Two paths exist: a registered participant pays their own share from
//! their balance, or the bill creator marks an external participant as
//! settled after collecting the money out-of-band. Both flip the
//! participant from unpaid to paid; neither path can be reversed. All
//! checks run before any mutation, so a failed settlement leaves the bill
//! exactly as it was.

use chrono::{DateTime, Utc};

use crate::model::{Bill, Money, PaymentStatus, UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettlementError {
    /// The payer is not linked to any participant on this bill.
    PayerNotParticipant,
    ParticipantIndexOutOfRange { index: usize },
    /// Only the bill creator may settle on behalf of others.
    NotCreator,
    /// The participant is a registered user and must pay from their own
    /// balance.
    ParticipantLinked { index: usize },
    AlreadySettled,
    InsufficientFunds { required: Money, available: Money },
}

/// Result of a successful settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementOutcome {
    pub participant_index: usize,
    pub amount_paid: Money,
    /// Change to apply to the payer's balance. Zero when the money moved
    /// outside the system.
    pub balance_delta: Money,
}

pub struct SettlementProcessor;

impl SettlementProcessor {
    /// Settles the payer's own share, funded by `payer_balance`.
    ///
    /// The caller is responsible for actually debiting the ledger by
    /// `balance_delta`; this function only decides whether the payment is
    /// allowed and records it on the bill.
    pub fn self_pay(
        &self,
        bill: &mut Bill,
        payer: UserId,
        payer_balance: Money,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome, SettlementError> {
        let index = bill
            .participant_of(payer)
            .ok_or(SettlementError::PayerNotParticipant)?;

        let amount_due = {
            let participant = &bill.participants[index];
            if participant.status == PaymentStatus::Paid {
                return Err(SettlementError::AlreadySettled);
            }
            participant.amount_due
        };

        if payer_balance < amount_due {
            return Err(SettlementError::InsufficientFunds {
                required: amount_due,
                available: payer_balance,
            });
        }

        bill.participants[index].status = PaymentStatus::Paid;
        bill.updated_at = now;

        Ok(SettlementOutcome {
            participant_index: index,
            amount_paid: amount_due,
            balance_delta: -amount_due,
        })
    }

    /// Marks an external participant's share as settled on the creator's
    /// say-so. No balance moves; the creator collected the cash directly.
    pub fn mark_external_paid(
        &self,
        bill: &mut Bill,
        actor: UserId,
        participant_index: usize,
        now: DateTime<Utc>,
    ) -> Result<SettlementOutcome, SettlementError> {
        if actor != bill.created_by {
            return Err(SettlementError::NotCreator);
        }

        let participant = bill
            .participants
            .get(participant_index)
            .ok_or(SettlementError::ParticipantIndexOutOfRange {
                index: participant_index,
            })?;

        if participant.party.is_registered() {
            return Err(SettlementError::ParticipantLinked {
                index: participant_index,
            });
        }
        if participant.status == PaymentStatus::Paid {
            return Err(SettlementError::AlreadySettled);
        }
        let amount_paid = participant.amount_due;

        bill.participants[participant_index].status = PaymentStatus::Paid;
        bill.updated_at = now;

        Ok(SettlementOutcome {
            participant_index,
            amount_paid,
            balance_delta: Money::ZERO,
        })
    }
}
