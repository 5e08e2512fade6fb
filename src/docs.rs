// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Policy Types ---
        handlers::policy_types::list_policy_types,
        handlers::policy_types::get_field_presets,
        handlers::policy_types::list_common_icons,
        handlers::policy_types::create_policy_type,
        handlers::policy_types::get_policy_type,
        handlers::policy_types::update_policy_type,
        handlers::policy_types::delete_policy_type,
        handlers::policy_types::toggle_policy_type_status,
        handlers::policy_types::set_policy_type_sort_order,
        handlers::policy_types::add_custom_field,
        handlers::policy_types::remove_custom_field,
        handlers::policy_types::move_custom_field,

        // --- Policies ---
        handlers::policies::list_policies,
        handlers::policies::get_policy,
        handlers::policies::new_policy_editor,
        handlers::policies::policy_editor,
        handlers::policies::apply_editor_action,
        handlers::policies::create_policy,
        handlers::policies::update_policy,
        handlers::policies::delete_policy,

        // --- Companies ---
        handlers::companies::list_companies,
        handlers::companies::create_company,
        handlers::companies::get_company,
        handlers::companies::update_company,
        handlers::companies::toggle_company_status,
        handlers::companies::delete_company,
        handlers::companies::list_coverage_types,
        handlers::companies::create_coverage_type,
        handlers::companies::update_coverage_type,
        handlers::companies::delete_coverage_type,

        // --- Currencies ---
        handlers::currencies::list_currencies,
        handlers::currencies::list_currency_presets,
        handlers::currencies::create_currency,
        handlers::currencies::update_currency,
        handlers::currencies::toggle_currency_status,
        handlers::currencies::delete_currency,

        // --- Policyholders ---
        handlers::policyholders::list_policyholders,
        handlers::policyholders::upcoming_birthdays,
        handlers::policyholders::create_policyholder,
        handlers::policyholders::get_policyholder,
        handlers::policyholders::update_policyholder,
        handlers::policyholders::delete_policyholder,

        // --- Notifications ---
        handlers::notifications::list_notifications,
        handlers::notifications::mark_notification_read,
        handlers::notifications::mark_all_notifications_read,
        handlers::notifications::run_expiry_scan,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
    ),
    components(
        schemas(
            // --- Custom fields ---
            models::custom_field::FieldType,
            models::custom_field::FieldValidation,
            models::custom_field::CustomFieldDefinition,
            models::custom_field::IssueCode,
            models::custom_field::FieldIssue,

            // --- Policy types ---
            models::policy_type::PolicyType,
            models::policy_type::PolicyTypeInput,
            handlers::policy_types::SortOrderPayload,
            handlers::policy_types::MoveFieldPayload,
            services::form_binder::MoveDirection,

            // --- Policies / editor ---
            models::policy::PaymentFrequency,
            models::policy::PolicyStatus,
            models::policy::Policy,
            models::policy::PolicyListEntry,
            models::policy::PolicyDraft,
            services::form_binder::ControlKind,
            services::form_binder::SelectOption,
            services::form_binder::FieldControl,
            services::policy_editor::EditorState,
            services::policy_editor::BaseFieldsPatch,
            services::policy_editor::EditorAction,
            services::policy_editor::EditorView,
            handlers::policies::EditorActionPayload,

            // --- Companies ---
            models::company::InsuranceCompany,
            models::company::CompanyListEntry,
            models::company::CompanyInput,
            models::company::CoverageType,
            models::company::CoverageTypeInput,

            // --- Currencies ---
            models::currency::Currency,
            models::currency::CurrencyPreset,
            models::currency::CurrencyInput,

            // --- Policyholders ---
            models::policyholder::EntityKind,
            models::policyholder::Policyholder,
            models::policyholder::PolicyholderInput,
            models::policyholder::BirthdayEntry,

            // --- Notifications ---
            models::notification::NotificationType,
            models::notification::Notification,
            models::notification::NotificationEntry,
            handlers::notifications::MarkAllResponse,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
        )
    ),
    tags(
        (name = "Policy Types", description = "Tipos de apólice e seus campos personalizados"),
        (name = "Policies", description = "Apólices, editor e envio"),
        (name = "Companies", description = "Companhias e coberturas"),
        (name = "Currencies", description = "Moedas"),
        (name = "Policyholders", description = "Asegurados e aniversários"),
        (name = "Notifications", description = "Avisos de vencimento"),
        (name = "Dashboard", description = "Indicadores da tela inicial")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
