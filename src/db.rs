pub mod company_repo;
pub use company_repo::CompanyRepository;
pub mod currency_repo;
pub use currency_repo::CurrencyRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;
pub mod policy_repo;
pub use policy_repo::PolicyRepository;
pub mod policy_type_repo;
pub use policy_type_repo::PolicyTypeRepository;
pub mod policyholder_repo;
pub use policyholder_repo::PolicyholderRepository;
