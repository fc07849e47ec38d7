pub mod readiness;
pub mod wellness;
