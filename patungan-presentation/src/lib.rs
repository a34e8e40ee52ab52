#![warn(clippy::uninlined_format_args)]

pub mod bill_presenter;
pub mod currency;
pub mod error_presenter;

pub use bill_presenter::BillPresenter;
pub use currency::format_idr;
pub use error_presenter::format_billing_error;
