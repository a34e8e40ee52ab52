#![warn(clippy::uninlined_format_args)]

pub mod billing;
pub mod error;
pub mod model;
pub mod ports;

pub use billing::BillingService;
pub use error::{BillingError, FailureKind, LedgerError, StoreError};
pub use model::{
    CreateBillRequest, ExternalPaymentReceipt, ItemRecord, ParticipantRecord, PaymentReceipt,
    SplitMethodRecord, SplitRecord, TopUpReceipt,
};
pub use ports::{
    BalanceLedger, BillStore, RequestContext, Session, SessionProvider, UserDirectory,
};
