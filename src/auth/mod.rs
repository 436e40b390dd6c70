pub mod access;
pub mod identity;
pub mod middleware;

pub use access::AccessDecision;
pub use identity::{ClientInfo, User};
