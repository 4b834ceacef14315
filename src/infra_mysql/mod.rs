mod friendship_ledger_mysql;
mod request_ledger_mysql;
mod schema;

pub use friendship_ledger_mysql::*;
pub use request_ledger_mysql::*;
pub use schema::*;

mod util;
