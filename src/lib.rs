pub mod actor;
pub mod audit;
pub mod cash_call;
pub mod error;
pub mod permission;
pub mod service;
pub mod utils;
pub mod visibility;
pub mod workflow;
