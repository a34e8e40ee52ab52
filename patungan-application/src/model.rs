//! Request records and receipts at the application boundary.
//!
//! Requests mirror the JSON a web client sends: participants and split
//! entries carry either a `user_id` or an `external_name`, and prices are
//! plain decimals. Conversion into domain drafts rejects records that
//! name neither identity (or both).

use patungan_domain::{
    model::{Money, PartyRef, SplitMethod, UserId},
    services::{BillDraft, ItemDraft, SplitDraft},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BillingError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMethodRecord {
    Equal,
    PerProduct,
}

impl From<SplitMethodRecord> for SplitMethod {
    fn from(record: SplitMethodRecord) -> Self {
        match record {
            SplitMethodRecord::Equal => Self::Equal,
            SplitMethodRecord::PerProduct => Self::PerProduct,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub external_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRecord {
    #[serde(default)]
    pub user_id: Option<Uuid>,
    #[serde(default)]
    pub external_name: Option<String>,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    pub price_per_unit: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub split: Vec<SplitRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CreateBillRequest {
    pub bill_name: String,
    pub split_method: SplitMethodRecord,
    pub participants: Vec<ParticipantRecord>,
    pub items: Vec<ItemRecord>,
}

impl CreateBillRequest {
    /// Resolves the record into a domain draft created by `actor`.
    pub fn into_draft(self, actor: UserId) -> Result<BillDraft, BillingError> {
        let participants = self
            .participants
            .into_iter()
            .enumerate()
            .map(|(index, record)| {
                resolve_party(record.user_id, record.external_name)
                    .ok_or(BillingError::MalformedParticipant { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let items = self
            .items
            .into_iter()
            .enumerate()
            .map(|(item_index, record)| {
                let split = record
                    .split
                    .into_iter()
                    .enumerate()
                    .map(|(index, split)| {
                        let party = resolve_party(split.user_id, split.external_name).ok_or(
                            BillingError::MalformedSplit {
                                item: item_index,
                                index,
                            },
                        )?;
                        Ok(SplitDraft {
                            party,
                            quantity: split.quantity,
                        })
                    })
                    .collect::<Result<Vec<_>, BillingError>>()?;

                Ok(ItemDraft {
                    name: record.name,
                    price_per_unit: Money::from_decimal(record.price_per_unit),
                    quantity: record.quantity,
                    split,
                })
            })
            .collect::<Result<Vec<_>, BillingError>>()?;

        Ok(BillDraft {
            name: self.bill_name,
            split_method: self.split_method.into(),
            created_by: actor,
            participants,
            items,
        })
    }
}

fn resolve_party(user_id: Option<Uuid>, external_name: Option<String>) -> Option<PartyRef> {
    match (user_id, external_name) {
        (Some(user_id), None) => Some(PartyRef::Registered(UserId(user_id))),
        (None, Some(name)) if !name.trim().is_empty() => Some(PartyRef::External(name)),
        _ => None,
    }
}

/// Outcome of a registered participant paying their own share.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub amount_paid: Money,
    pub new_balance: Money,
}

/// Outcome of the creator marking an external participant settled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalPaymentReceipt {
    pub participant_name: String,
    pub amount_paid: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TopUpReceipt {
    pub new_balance: Money,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn actor() -> UserId {
        UserId(Uuid::from_u128(7))
    }

    #[test]
    fn create_bill_request_deserializes_client_json() {
        let request: CreateBillRequest = serde_json::from_value(json!({
            "bill_name": "Makan Malam",
            "split_method": "per_product",
            "participants": [
                { "user_id": Uuid::from_u128(7) },
                { "external_name": "Sari" },
            ],
            "items": [
                {
                    "name": "Nasi Goreng",
                    "price_per_unit": "30000",
                    "quantity": 2,
                    "split": [
                        { "user_id": Uuid::from_u128(7), "quantity": 1 },
                        { "external_name": "Sari", "quantity": 1 },
                    ],
                },
                { "name": "Es Teh", "price_per_unit": "5000", "quantity": 2 },
            ],
        }))
        .expect("request should deserialize");

        assert_eq!(request.split_method, SplitMethodRecord::PerProduct);
        assert_eq!(request.items[1].split, Vec::new());

        let draft = request.into_draft(actor()).expect("draft should resolve");
        assert_eq!(draft.created_by, actor());
        assert_eq!(draft.participants[0], PartyRef::Registered(actor()));
        assert_eq!(
            draft.participants[1],
            PartyRef::External("Sari".to_string())
        );
    }

    #[rstest]
    #[case::neither_identity(None, None)]
    #[case::both_identities(Some(Uuid::from_u128(7)), Some("Sari".to_string()))]
    #[case::blank_name(None, Some("   ".to_string()))]
    fn ambiguous_participant_record_is_rejected(
        #[case] user_id: Option<Uuid>,
        #[case] external_name: Option<String>,
    ) {
        let request = CreateBillRequest {
            bill_name: "Makan".to_string(),
            split_method: SplitMethodRecord::Equal,
            participants: vec![ParticipantRecord {
                user_id,
                external_name,
            }],
            items: Vec::new(),
        };

        assert_eq!(
            request.into_draft(actor()),
            Err(BillingError::MalformedParticipant { index: 0 })
        );
    }

    #[test]
    fn blank_external_name_in_split_is_rejected() {
        let request = CreateBillRequest {
            bill_name: "Makan".to_string(),
            split_method: SplitMethodRecord::PerProduct,
            participants: vec![ParticipantRecord {
                user_id: Some(Uuid::from_u128(7)),
                external_name: None,
            }],
            items: vec![ItemRecord {
                name: "Nasi".to_string(),
                price_per_unit: Decimal::from(10_000),
                quantity: 1,
                split: vec![SplitRecord {
                    user_id: None,
                    external_name: Some("   ".to_string()),
                    quantity: 1,
                }],
            }],
        };

        assert_eq!(
            request.into_draft(actor()),
            Err(BillingError::MalformedSplit { item: 0, index: 0 })
        );
    }
}
