// Staking reward reconciliation
pub mod executor;
pub mod policy;
pub mod report;
pub mod runner;
pub mod scanner;

#[cfg(test)]
pub mod testing;

pub use policy::NotificationMode;
pub use runner::{ReconciliationRunner, ReconciliationSettings};
