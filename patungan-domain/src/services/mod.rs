pub mod bill_builder;
pub mod settlement;
pub mod share_rounding;

pub use bill_builder::{BillBuilder, BillDraft, BillValidationError, ItemDraft, SplitDraft};
pub use settlement::{SettlementError, SettlementOutcome, SettlementProcessor};
pub use share_rounding::{quantize_shares, CurrencyContext, RoundingMode, ShareRoundingError};
