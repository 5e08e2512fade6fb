// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{
        CompanyRepository, CurrencyRepository, DashboardRepository, NotificationRepository,
        PolicyRepository, PolicyTypeRepository, PolicyholderRepository,
    },
    services::{
        auth::AuthService, catalog_service::CatalogService, dashboard_service::DashboardService,
        notification_service::NotificationService, policy_service::PolicyService,
        policy_type_service::PolicyTypeService, policyholder_service::PolicyholderService,
    },
};

// Tudo o que vem do ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_audience: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    pub expiry_window_days: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            jwt_audience: env::var("JWT_AUDIENCE").unwrap_or_else(|_| "authenticated".to_string()),
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            expiry_window_days: parse_or("EXPIRY_WINDOW_DAYS", 30)?,
        })
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} tem um valor inválido: '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub i18n_store: Arc<I18nStore>,
    pub expiry_window_days: i64,

    pub auth_service: AuthService,
    pub policy_type_service: PolicyTypeService,
    pub policy_service: PolicyService,
    pub catalog_service: CatalogService,
    pub policyholder_service: PolicyholderService,
    pub notification_service: NotificationService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Self::with_pool(config, db_pool)
    }

    /// Monta o gráfico de dependências sobre uma pool já criada (os testes usam uma pool "lazy").
    pub fn with_pool(config: &Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let policy_type_repo = PolicyTypeRepository::new();
        let policy_repo = PolicyRepository::new();
        let policyholder_repo = PolicyholderRepository::new();
        let company_repo = CompanyRepository::new();
        let currency_repo = CurrencyRepository::new();
        let notification_repo = NotificationRepository::new();
        let dashboard_repo = DashboardRepository::new();

        let catalog_service = CatalogService::new(company_repo.clone(), currency_repo);
        let policy_service = PolicyService::new(
            policy_repo.clone(),
            policy_type_repo.clone(),
            policyholder_repo.clone(),
            company_repo,
        );
        let dashboard_service = DashboardService::new(
            dashboard_repo,
            policy_repo.clone(),
            policyholder_repo.clone(),
            notification_repo.clone(),
        );

        Ok(Self {
            db_pool,
            i18n_store,
            expiry_window_days: config.expiry_window_days,
            auth_service: AuthService::new(config.jwt_secret.clone(), config.jwt_audience.clone()),
            policy_type_service: PolicyTypeService::new(policy_type_repo),
            policy_service,
            catalog_service,
            policyholder_service: PolicyholderService::new(policyholder_repo),
            notification_service: NotificationService::new(notification_repo, policy_repo),
            dashboard_service,
        })
    }
}
