use std::collections::HashMap;

use patungan_domain::model::{Bill, BillId, Money, UserId};

use crate::error::{BillingError, LedgerError, StoreError};

pub trait BillStore: Send + Sync {
    fn insert(&self, bill: Bill) -> Result<(), StoreError>;
    fn fetch(&self, id: BillId) -> Result<Bill, StoreError>;
    /// All stored bills in insertion order.
    fn list(&self) -> Vec<Bill>;
    fn update(&self, bill: Bill) -> Result<(), StoreError>;
}

pub trait BalanceLedger: Send + Sync {
    fn balance_of(&self, user_id: UserId) -> Result<Money, LedgerError>;
    /// Adds `amount` and returns the new balance.
    fn credit(&self, user_id: UserId, amount: Money) -> Result<Money, LedgerError>;
    /// Removes `amount` and returns the new balance. Fails rather than
    /// going negative.
    fn debit(&self, user_id: UserId, amount: Money) -> Result<Money, LedgerError>;
}

/// The signed-in user and their bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub token: String,
}

pub trait SessionProvider: Send + Sync {
    fn current_session(&self) -> Option<Session>;
}

/// Identity of the caller, resolved once at the start of a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestContext {
    pub actor: UserId,
}

impl RequestContext {
    pub fn from_session(sessions: &dyn SessionProvider) -> Result<Self, BillingError> {
        let session = sessions
            .current_session()
            .ok_or(BillingError::NotAuthenticated)?;
        Ok(Self {
            actor: session.user_id,
        })
    }
}

pub trait UserDirectory: Send + Sync {
    fn display_name(&self, user_id: UserId) -> Option<&str>;
}

impl UserDirectory for HashMap<UserId, String> {
    fn display_name(&self, user_id: UserId) -> Option<&str> {
        self.get(&user_id).map(String::as_str)
    }
}
