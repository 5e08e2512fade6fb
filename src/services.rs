pub mod auth;
pub mod catalog_service;
pub mod dashboard_service;
pub mod field_presets;
pub mod form_binder;
pub mod notification_service;
pub mod policy_editor;
pub mod policy_service;
pub mod policy_type_service;
pub mod policyholder_service;
