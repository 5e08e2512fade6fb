pub mod auth;
pub mod company;
pub mod currency;
pub mod custom_field;
pub mod dashboard;
pub mod notification;
pub mod policy;
pub mod policy_type;
pub mod policyholder;
