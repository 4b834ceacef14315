mod clock;

pub use clock::*;

// ledger

mod friendship_ledger;
mod request_ledger;

pub use friendship_ledger::*;
pub use request_ledger::*;
