pub mod error;
pub mod ledger;
pub mod metrics;
pub mod partition;
pub mod source;
