use dashmap::DashMap;
use patungan_application::{error::LedgerError, ports::BalanceLedger};
use patungan_domain::model::{Money, UserId};

/// In-memory balance ledger. Accounts must be opened before they can be
/// credited or debited; balances never go negative.
#[derive(Default)]
pub struct MemoryLedger {
    balances: DashMap<UserId, Money>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_account(&self, user_id: UserId, initial: Money) {
        self.balances.insert(user_id, initial);
    }
}

impl BalanceLedger for MemoryLedger {
    fn balance_of(&self, user_id: UserId) -> Result<Money, LedgerError> {
        self.balances
            .get(&user_id)
            .map(|balance| *balance)
            .ok_or(LedgerError::UnknownAccount(user_id))
    }

    fn credit(&self, user_id: UserId, amount: Money) -> Result<Money, LedgerError> {
        let mut balance = self
            .balances
            .get_mut(&user_id)
            .ok_or(LedgerError::UnknownAccount(user_id))?;
        *balance += amount;
        Ok(*balance)
    }

    fn debit(&self, user_id: UserId, amount: Money) -> Result<Money, LedgerError> {
        let mut balance = self
            .balances
            .get_mut(&user_id)
            .ok_or(LedgerError::UnknownAccount(user_id))?;
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        Ok(*balance)
    }
}
