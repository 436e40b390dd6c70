pub mod audit;
pub mod config;
pub mod error;
pub mod store;
pub mod timestamp;

pub mod api;
pub mod auth;
pub mod validation;
pub mod whitelist;

pub mod dashboard;
pub mod jenkins;
