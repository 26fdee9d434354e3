//! Admin credential checks for pricing-config changes

mod admin;

pub use admin::AdminGate;
