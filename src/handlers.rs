pub mod companies;
pub mod currencies;
pub mod dashboard;
pub mod notifications;
pub mod policies;
pub mod policy_types;
pub mod policyholders;
