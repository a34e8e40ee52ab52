use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;
use patungan_application::{error::StoreError, ports::BillStore};
use patungan_domain::model::{Bill, BillId};

/// In-memory bill store. Insertion order is preserved, so `list` returns
/// bills in the order they were created.
#[derive(Default)]
pub struct MemoryBillStore {
    bills: RwLock<IndexMap<BillId, Bill>>,
}

impl MemoryBillStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bills
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BillStore for MemoryBillStore {
    fn insert(&self, bill: Bill) -> Result<(), StoreError> {
        let mut bills = self.bills.write().unwrap_or_else(PoisonError::into_inner);
        if bills.contains_key(&bill.id) {
            return Err(StoreError::DuplicateBill(bill.id));
        }
        bills.insert(bill.id, bill);
        Ok(())
    }

    fn fetch(&self, id: BillId) -> Result<Bill, StoreError> {
        self.bills
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or(StoreError::MissingBill(id))
    }

    fn list(&self) -> Vec<Bill> {
        self.bills
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn update(&self, bill: Bill) -> Result<(), StoreError> {
        let mut bills = self.bills.write().unwrap_or_else(PoisonError::into_inner);
        match bills.get_mut(&bill.id) {
            Some(stored) => {
                *stored = bill;
                Ok(())
            }
            None => Err(StoreError::MissingBill(bill.id)),
        }
    }
}
