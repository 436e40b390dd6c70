//! Email allow-list with an admin/user split.

pub mod error;
pub mod store;
pub mod types;

pub use error::WhitelistError;
pub use store::WhitelistStore;
pub use types::{Whitelist, WhitelistEntry};
