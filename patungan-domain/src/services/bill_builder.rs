//! Bill construction and cost apportionment.
//!
//! `BillBuilder::build` is a pure function from a validated draft to a
//! finished [`Bill`]: it derives the total from the line items, apportions
//! exact decimal shares according to the split method, and quantizes them so
//! that participant amounts sum exactly to the total. Amounts are computed
//! once here and persisted; nothing downstream recomputes or mutates them.

use chrono::{DateTime, Utc};
use fxhash::{FxHashMap, FxHashSet};
use rust_decimal::Decimal;

use crate::{
    model::{Bill, BillId, Item, ItemSplit, Money, Participant, PartyRef, PaymentStatus,
        SplitMethod, UserId},
    services::share_rounding::{quantize_shares, CurrencyContext, ShareRoundingError},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitDraft {
    pub party: PartyRef,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemDraft {
    pub name: String,
    pub price_per_unit: Money,
    pub quantity: u32,
    pub split: Vec<SplitDraft>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BillDraft {
    pub name: String,
    pub split_method: SplitMethod,
    pub created_by: UserId,
    pub participants: Vec<PartyRef>,
    pub items: Vec<ItemDraft>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BillValidationError {
    BlankBillName,
    NoParticipants,
    DuplicateParticipant { index: usize },
    BlankItemName { index: usize },
    NonPositivePrice { item: String },
    ZeroQuantity { item: String },
    /// The item amounts exceed the representable decimal range.
    AmountTooLarge { item: String },
    UndeclaredSplitParty { item: String, party: PartyRef },
    SplitQuantityMismatch { item: String, expected: u32, actual: u64 },
    /// A single unit cannot be subdivided between participants.
    UnsplittableSingleUnit { item: String },
    /// Quantization failed; carries the underlying reason.
    Rounding(ShareRoundingError),
}

impl From<ShareRoundingError> for BillValidationError {
    fn from(err: ShareRoundingError) -> Self {
        Self::Rounding(err)
    }
}

pub struct BillBuilder {
    context: CurrencyContext,
}

impl BillBuilder {
    pub fn new(context: CurrencyContext) -> Self {
        Self { context }
    }

    /// Builder for whole-rupiah amounts.
    pub fn idr() -> Self {
        Self::new(CurrencyContext::idr_default())
    }

    /// Validates the draft and produces a bill with derived totals and
    /// per-participant amounts due. Identical drafts build identical
    /// amounts.
    pub fn build(&self, draft: BillDraft, now: DateTime<Utc>) -> Result<Bill, BillValidationError> {
        validate_draft(&draft)?;

        // Overflow is a validation failure, never a panic.
        let mut total = Decimal::ZERO;
        for item in &draft.items {
            total = checked_item_total(item)
                .and_then(|item_total| total.checked_add(item_total))
                .ok_or_else(|| amount_too_large(item))?;
        }
        let total = Money::from_decimal(total);

        let exact_shares = match draft.split_method {
            SplitMethod::Equal => equal_shares(total, draft.participants.len()),
            SplitMethod::PerProduct => per_product_shares(&draft)?,
        };

        let amounts = quantize_shares(&exact_shares, total, self.context)?;

        let participants = draft
            .participants
            .into_iter()
            .zip(amounts)
            .map(|(party, amount_due)| Participant {
                party,
                amount_due,
                status: PaymentStatus::Unpaid,
            })
            .collect();

        // Splits are only part of the contract under per-product billing.
        let keep_splits = draft.split_method == SplitMethod::PerProduct;
        let items = draft
            .items
            .into_iter()
            .map(|item| Item {
                name: item.name,
                price_per_unit: item.price_per_unit,
                quantity: item.quantity,
                split: if keep_splits {
                    item.split
                        .into_iter()
                        .map(|split| ItemSplit {
                            party: split.party,
                            quantity: split.quantity,
                        })
                        .collect()
                } else {
                    Vec::new()
                },
            })
            .collect();

        Ok(Bill {
            id: BillId::new(),
            name: draft.name,
            total_amount: total,
            split_method: draft.split_method,
            created_by: draft.created_by,
            items,
            participants,
            created_at: now,
            updated_at: now,
        })
    }
}

fn validate_draft(draft: &BillDraft) -> Result<(), BillValidationError> {
    if draft.name.trim().is_empty() {
        return Err(BillValidationError::BlankBillName);
    }
    if draft.participants.is_empty() {
        return Err(BillValidationError::NoParticipants);
    }

    let mut seen: FxHashSet<&PartyRef> = FxHashSet::default();
    for (index, party) in draft.participants.iter().enumerate() {
        if !seen.insert(party) {
            return Err(BillValidationError::DuplicateParticipant { index });
        }
    }

    for (index, item) in draft.items.iter().enumerate() {
        if item.name.trim().is_empty() {
            return Err(BillValidationError::BlankItemName { index });
        }
        if item.price_per_unit <= Money::ZERO {
            return Err(BillValidationError::NonPositivePrice {
                item: item.name.clone(),
            });
        }
        if item.quantity == 0 {
            return Err(BillValidationError::ZeroQuantity {
                item: item.name.clone(),
            });
        }
    }

    if draft.split_method == SplitMethod::PerProduct {
        for item in &draft.items {
            validate_item_split(item, &seen)?;
        }
    }

    Ok(())
}

fn validate_item_split(
    item: &ItemDraft,
    declared: &FxHashSet<&PartyRef>,
) -> Result<(), BillValidationError> {
    if item.split.is_empty() {
        // Explicit fallback: the item is divided equally among everyone.
        return Ok(());
    }

    for split in &item.split {
        if !declared.contains(&split.party) {
            return Err(BillValidationError::UndeclaredSplitParty {
                item: item.name.clone(),
                party: split.party.clone(),
            });
        }
    }

    // Summed in u64 so oversized split lists report a mismatch instead of
    // wrapping around.
    let assigned: u64 = item.split.iter().map(|split| u64::from(split.quantity)).sum();
    if assigned != u64::from(item.quantity) {
        return Err(BillValidationError::SplitQuantityMismatch {
            item: item.name.clone(),
            expected: item.quantity,
            actual: assigned,
        });
    }

    if item.quantity == 1 && item.split.len() > 1 {
        return Err(BillValidationError::UnsplittableSingleUnit {
            item: item.name.clone(),
        });
    }

    Ok(())
}

fn equal_shares(total: Money, participant_count: usize) -> Vec<Decimal> {
    let share = total.as_decimal() / Decimal::from(participant_count as u64);
    vec![share; participant_count]
}

fn per_product_shares(draft: &BillDraft) -> Result<Vec<Decimal>, BillValidationError> {
    let index_of: FxHashMap<&PartyRef, usize> = draft
        .participants
        .iter()
        .enumerate()
        .map(|(index, party)| (party, index))
        .collect();

    let mut shares = vec![Decimal::ZERO; draft.participants.len()];
    let participant_count = Decimal::from(draft.participants.len() as u64);

    for item in &draft.items {
        let item_total = checked_item_total(item).ok_or_else(|| amount_too_large(item))?;

        if item.split.is_empty() {
            // No allocation recorded for this item: divide it equally.
            let fallback = item_total / participant_count;
            for share in &mut shares {
                *share = share
                    .checked_add(fallback)
                    .ok_or_else(|| amount_too_large(item))?;
            }
            continue;
        }

        for split in &item.split {
            // Validated against the declared participants beforehand.
            if let Some(&index) = index_of.get(&split.party) {
                let contribution = item_total
                    .checked_mul(Decimal::from(split.quantity))
                    .ok_or_else(|| amount_too_large(item))?
                    / Decimal::from(item.quantity);
                shares[index] = shares[index]
                    .checked_add(contribution)
                    .ok_or_else(|| amount_too_large(item))?;
            }
        }
    }

    Ok(shares)
}

fn checked_item_total(item: &ItemDraft) -> Option<Decimal> {
    item.price_per_unit
        .as_decimal()
        .checked_mul(Decimal::from(item.quantity))
}

fn amount_too_large(item: &ItemDraft) -> BillValidationError {
    BillValidationError::AmountTooLarge {
        item: item.name.clone(),
    }
}
