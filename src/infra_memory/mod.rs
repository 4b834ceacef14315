mod friendship_ledger_memory;
mod request_ledger_memory;

pub use friendship_ledger_memory::*;
pub use request_ledger_memory::*;
