use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Monetary amount with exact decimal precision.
///
/// Apportionment is carried out on the raw decimal value; amounts that leave
/// the domain layer are quantized to the currency's minor unit first
/// (see [`crate::services::share_rounding`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, value| acc + value)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillId(pub Uuid);

impl BillId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BillId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a bill participant.
///
/// A participant is either a registered user (settles from their own
/// balance) or an external person known only by name (settled out-of-band by
/// the bill creator). Equality on this enum is the single participant-lookup
/// rule; nothing else in the crate matches participants by raw strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PartyRef {
    Registered(UserId),
    External(String),
}

impl PartyRef {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Self::Registered(user_id) => Some(*user_id),
            Self::External(_) => None,
        }
    }

    pub fn external_name(&self) -> Option<&str> {
        match self {
            Self::Registered(_) => None,
            Self::External(name) => Some(name.as_str()),
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SplitMethod {
    Equal,
    PerProduct,
}

/// Per-participant payment state. `Unpaid -> Paid` is the only transition;
/// there is no way back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSplit {
    pub party: PartyRef,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub price_per_unit: Money,
    pub quantity: u32,
    /// Only meaningful under [`SplitMethod::PerProduct`]; empty otherwise.
    pub split: Vec<ItemSplit>,
}

impl Item {
    /// Line total, saturating at the decimal range limit. Bills produced by
    /// the builder reject drafts whose totals would overflow.
    pub fn total(&self) -> Money {
        Money::from_decimal(
            self.price_per_unit
                .as_decimal()
                .saturating_mul(Decimal::from(self.quantity)),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Participant {
    pub party: PartyRef,
    /// Derived by the bill builder; never mutated afterwards.
    pub amount_due: Money,
    pub status: PaymentStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bill {
    pub id: BillId,
    pub name: String,
    /// Always equals the sum of item totals and the sum of participant
    /// amounts due.
    pub total_amount: Money,
    pub split_method: SplitMethod,
    pub created_by: UserId,
    pub items: Vec<Item>,
    pub participants: Vec<Participant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bill {
    /// Looks up the participant linked to `user_id`, if any.
    pub fn participant_of(&self, user_id: UserId) -> Option<usize> {
        self.participants
            .iter()
            .position(|participant| participant.party.user_id() == Some(user_id))
    }
}
