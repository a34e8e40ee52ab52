#![warn(clippy::uninlined_format_args)]

mod memory_ledger;
mod memory_store;
mod session;

pub use memory_ledger::MemoryLedger;
pub use memory_store::MemoryBillStore;
pub use session::FixedSessionProvider;
