mod server;
mod session;

pub use server::*;
pub use session::*;
