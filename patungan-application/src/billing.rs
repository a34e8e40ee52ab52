use chrono::{DateTime, Utc};
use patungan_domain::{
    model::{Bill, BillId, Money, UserId},
    services::{BillBuilder, SettlementProcessor},
};

use crate::{
    error::{BillingError, StoreError},
    model::{CreateBillRequest, ExternalPaymentReceipt, PaymentReceipt, TopUpReceipt},
    ports::{BalanceLedger, BillStore},
};

/// Orchestrates bill creation and settlement over the storage and ledger
/// ports. Holds no state of its own; every call resolves the actor, runs
/// the domain rules, and writes the results back through the ports.
#[derive(Clone, Copy)]
pub struct BillingService<'a> {
    bills: &'a dyn BillStore,
    ledger: &'a dyn BalanceLedger,
    builder: &'a BillBuilder,
}

impl<'a> BillingService<'a> {
    pub fn new(
        bills: &'a dyn BillStore,
        ledger: &'a dyn BalanceLedger,
        builder: &'a BillBuilder,
    ) -> Self {
        Self {
            bills,
            ledger,
            builder,
        }
    }

    pub fn create_bill(
        &self,
        actor: UserId,
        request: CreateBillRequest,
        now: DateTime<Utc>,
    ) -> Result<Bill, BillingError> {
        let draft = request.into_draft(actor)?;
        let bill = self.builder.build(draft, now)?;
        self.bills.insert(bill.clone())?;

        tracing::info!(
            bill_id = %bill.id,
            total = %bill.total_amount,
            participant_count = bill.participants.len(),
            "Bill created"
        );
        Ok(bill)
    }

    pub fn get_bill(&self, id: BillId) -> Result<Bill, BillingError> {
        self.bills.fetch(id).map_err(not_found)
    }

    pub fn list_bills(&self) -> Vec<Bill> {
        self.bills.list()
    }

    /// Settles the actor's own share from their balance.
    pub fn pay_bill(
        &self,
        actor: UserId,
        bill_id: BillId,
        now: DateTime<Utc>,
    ) -> Result<PaymentReceipt, BillingError> {
        let mut bill = self.bills.fetch(bill_id).map_err(not_found)?;
        let balance = self.ledger.balance_of(actor)?;
        let outcome = SettlementProcessor.self_pay(&mut bill, actor, balance, now)?;

        let new_balance = self.ledger.debit(actor, outcome.amount_paid)?;
        self.bills.update(bill)?;

        tracing::info!(
            bill_id = %bill_id,
            user_id = %actor,
            amount_paid = %outcome.amount_paid,
            "Share settled from balance"
        );
        Ok(PaymentReceipt {
            amount_paid: outcome.amount_paid,
            new_balance,
        })
    }

    /// Marks an external participant's share as settled. Only the bill
    /// creator may do this, and no balance moves.
    pub fn mark_participant_paid(
        &self,
        actor: UserId,
        bill_id: BillId,
        participant_index: usize,
        now: DateTime<Utc>,
    ) -> Result<ExternalPaymentReceipt, BillingError> {
        let mut bill = self.bills.fetch(bill_id).map_err(not_found)?;
        let outcome =
            SettlementProcessor.mark_external_paid(&mut bill, actor, participant_index, now)?;

        let participant_name = bill.participants[outcome.participant_index]
            .party
            .external_name()
            .unwrap_or_default()
            .to_string();
        self.bills.update(bill)?;

        tracing::info!(
            bill_id = %bill_id,
            participant_index,
            amount_paid = %outcome.amount_paid,
            "External share marked settled"
        );
        Ok(ExternalPaymentReceipt {
            participant_name,
            amount_paid: outcome.amount_paid,
        })
    }

    pub fn add_balance(&self, actor: UserId, amount: Money) -> Result<TopUpReceipt, BillingError> {
        if amount <= Money::ZERO {
            return Err(BillingError::NonPositiveTopUp);
        }
        let new_balance = self.ledger.credit(actor, amount)?;

        tracing::info!(user_id = %actor, amount = %amount, "Balance topped up");
        Ok(TopUpReceipt { new_balance })
    }

    pub fn balance_of(&self, actor: UserId) -> Result<Money, BillingError> {
        Ok(self.ledger.balance_of(actor)?)
    }
}

fn not_found(err: StoreError) -> BillingError {
    match err {
        StoreError::MissingBill(id) => BillingError::BillNotFound(id),
        other => BillingError::Store(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::LedgerError,
        model::{ItemRecord, ParticipantRecord, SplitMethodRecord},
    };
    use patungan_domain::services::SettlementError;
    use rust_decimal::Decimal;
    use std::{collections::HashMap, sync::Mutex};
    use uuid::Uuid;

    struct StubStore {
        bills: Mutex<Vec<Bill>>,
    }

    impl StubStore {
        fn empty() -> Self {
            Self {
                bills: Mutex::new(Vec::new()),
            }
        }
    }

    impl BillStore for StubStore {
        fn insert(&self, bill: Bill) -> Result<(), StoreError> {
            let mut bills = self.bills.lock().unwrap();
            if bills.iter().any(|stored| stored.id == bill.id) {
                return Err(StoreError::DuplicateBill(bill.id));
            }
            bills.push(bill);
            Ok(())
        }

        fn fetch(&self, id: BillId) -> Result<Bill, StoreError> {
            self.bills
                .lock()
                .unwrap()
                .iter()
                .find(|bill| bill.id == id)
                .cloned()
                .ok_or(StoreError::MissingBill(id))
        }

        fn list(&self) -> Vec<Bill> {
            self.bills.lock().unwrap().clone()
        }

        fn update(&self, bill: Bill) -> Result<(), StoreError> {
            let mut bills = self.bills.lock().unwrap();
            let slot = bills
                .iter_mut()
                .find(|stored| stored.id == bill.id)
                .ok_or(StoreError::MissingBill(bill.id))?;
            *slot = bill;
            Ok(())
        }
    }

    struct StubLedger {
        balances: Mutex<HashMap<UserId, Money>>,
    }

    impl StubLedger {
        fn with_balance(user_id: UserId, amount: i64) -> Self {
            Self {
                balances: Mutex::new(HashMap::from([(user_id, Money::from_i64(amount))])),
            }
        }
    }

    impl BalanceLedger for StubLedger {
        fn balance_of(&self, user_id: UserId) -> Result<Money, LedgerError> {
            self.balances
                .lock()
                .unwrap()
                .get(&user_id)
                .copied()
                .ok_or(LedgerError::UnknownAccount(user_id))
        }

        fn credit(&self, user_id: UserId, amount: Money) -> Result<Money, LedgerError> {
            let mut balances = self.balances.lock().unwrap();
            let balance = balances
                .get_mut(&user_id)
                .ok_or(LedgerError::UnknownAccount(user_id))?;
            *balance += amount;
            Ok(*balance)
        }

        fn debit(&self, user_id: UserId, amount: Money) -> Result<Money, LedgerError> {
            let mut balances = self.balances.lock().unwrap();
            let balance = balances
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

    fn actor() -> UserId {
        UserId(Uuid::from_u128(7))
    }

    fn dinner_request() -> CreateBillRequest {
        CreateBillRequest {
            bill_name: "Makan Malam".to_string(),
            split_method: SplitMethodRecord::Equal,
            participants: vec![
                ParticipantRecord {
                    user_id: Some(actor().0),
                    external_name: None,
                },
                ParticipantRecord {
                    user_id: None,
                    external_name: Some("Sari".to_string()),
                },
            ],
            items: vec![ItemRecord {
                name: "Nasi Goreng".to_string(),
                price_per_unit: Decimal::from(30_000),
                quantity: 2,
                split: Vec::new(),
            }],
        }
    }

    #[test]
    fn create_and_pay_settles_share_and_debits_balance() {
        let store = StubStore::empty();
        let ledger = StubLedger::with_balance(actor(), 100_000);
        let builder = BillBuilder::idr();
        let service = BillingService::new(&store, &ledger, &builder);

        let bill = service
            .create_bill(actor(), dinner_request(), Utc::now())
            .expect("bill should be created");
        assert_eq!(bill.total_amount, Money::from_i64(60_000));

        let receipt = service
            .pay_bill(actor(), bill.id, Utc::now())
            .expect("payment should succeed");
        assert_eq!(receipt.amount_paid, Money::from_i64(30_000));
        assert_eq!(receipt.new_balance, Money::from_i64(70_000));

        let stored = service.get_bill(bill.id).expect("bill should be stored");
        assert!(stored.participants[0].status == patungan_domain::model::PaymentStatus::Paid);
    }

    #[test]
    fn paying_twice_is_rejected_and_balance_untouched() {
        let store = StubStore::empty();
        let ledger = StubLedger::with_balance(actor(), 100_000);
        let builder = BillBuilder::idr();
        let service = BillingService::new(&store, &ledger, &builder);

        let bill = service
            .create_bill(actor(), dinner_request(), Utc::now())
            .expect("bill should be created");
        service
            .pay_bill(actor(), bill.id, Utc::now())
            .expect("first payment should succeed");

        let result = service.pay_bill(actor(), bill.id, Utc::now());
        assert_eq!(
            result,
            Err(BillingError::Settlement(SettlementError::AlreadySettled))
        );
        assert_eq!(
            service.balance_of(actor()).expect("balance should exist"),
            Money::from_i64(70_000)
        );
    }

    #[test]
    fn insufficient_balance_fails_before_any_mutation() {
        let store = StubStore::empty();
        let ledger = StubLedger::with_balance(actor(), 10_000);
        let builder = BillBuilder::idr();
        let service = BillingService::new(&store, &ledger, &builder);

        let bill = service
            .create_bill(actor(), dinner_request(), Utc::now())
            .expect("bill should be created");
        let result = service.pay_bill(actor(), bill.id, Utc::now());

        assert_eq!(
            result,
            Err(BillingError::Settlement(SettlementError::InsufficientFunds {
                required: Money::from_i64(30_000),
                available: Money::from_i64(10_000),
            }))
        );
        let stored = service.get_bill(bill.id).expect("bill should be stored");
        assert!(stored.participants[0].status == patungan_domain::model::PaymentStatus::Unpaid);
    }

    #[test]
    fn paying_unknown_bill_reports_not_found() {
        let store = StubStore::empty();
        let ledger = StubLedger::with_balance(actor(), 100_000);
        let builder = BillBuilder::idr();
        let service = BillingService::new(&store, &ledger, &builder);

        let missing = BillId::new();
        assert_eq!(
            service.pay_bill(actor(), missing, Utc::now()),
            Err(BillingError::BillNotFound(missing))
        );
    }

    #[test]
    fn creator_settles_external_share_without_balance_movement() {
        let store = StubStore::empty();
        let ledger = StubLedger::with_balance(actor(), 100_000);
        let builder = BillBuilder::idr();
        let service = BillingService::new(&store, &ledger, &builder);

        let bill = service
            .create_bill(actor(), dinner_request(), Utc::now())
            .expect("bill should be created");
        let receipt = service
            .mark_participant_paid(actor(), bill.id, 1, Utc::now())
            .expect("creator may settle external shares");

        assert_eq!(receipt.participant_name, "Sari");
        assert_eq!(receipt.amount_paid, Money::from_i64(30_000));
        assert_eq!(
            service.balance_of(actor()).expect("balance should exist"),
            Money::from_i64(100_000)
        );
    }

    #[test]
    fn top_up_must_be_positive() {
        let store = StubStore::empty();
        let ledger = StubLedger::with_balance(actor(), 0);
        let builder = BillBuilder::idr();
        let service = BillingService::new(&store, &ledger, &builder);

        assert_eq!(
            service.add_balance(actor(), Money::ZERO),
            Err(BillingError::NonPositiveTopUp)
        );
        let receipt = service
            .add_balance(actor(), Money::from_i64(50_000))
            .expect("top-up should succeed");
        assert_eq!(receipt.new_balance, Money::from_i64(50_000));
    }
}
