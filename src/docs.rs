// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Users ---
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Regulação ---
        handlers::regulacao::list_records,
        handlers::regulacao::create_record,
        handlers::regulacao::get_stats,
        handlers::regulacao::export_records,
        handlers::regulacao::get_record,
        handlers::regulacao::update_record,
        handlers::regulacao::delete_record,

        // --- Fisioterapia ---
        handlers::fisioterapia::list_records,
        handlers::fisioterapia::create_record,
        handlers::fisioterapia::get_report,
        handlers::fisioterapia::lookup_patient,
        handlers::fisioterapia::get_record,
        handlers::fisioterapia::update_patient,
        handlers::fisioterapia::admit_patient,
        handlers::fisioterapia::record_session,
        handlers::fisioterapia::discharge_patient,
        handlers::fisioterapia::update_observation,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserResponse,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::auth::MeResponse,
            models::auth::NewUserPayload,
            models::auth::UpdateUserPayload,
            models::rbac::Capabilities,

            // --- Consulta ---
            models::query::SortDirection,

            // --- Regulação ---
            models::regulacao::RegulacaoStatus,
            models::regulacao::AtendimentoTipo,
            models::regulacao::RegulacaoRecord,
            models::regulacao::RegulacaoDraft,
            models::regulacao::RegulacaoPatch,
            models::regulacao::UpdateRegulacaoPayload,
            models::regulacao::RegulacaoSortKey,
            models::regulacao::RegulacaoStats,

            // --- Fisioterapia ---
            models::fisioterapia::FisioterapiaStatus,
            models::fisioterapia::PrioridadeClinica,
            models::fisioterapia::FisioterapiaSessao,
            models::fisioterapia::FisioterapiaRecord,
            models::fisioterapia::FisioterapiaDraft,
            models::fisioterapia::FisioterapiaPatch,
            models::fisioterapia::AdmitPayload,
            models::fisioterapia::RecordSessionPayload,
            models::fisioterapia::ObservationPayload,
            models::fisioterapia::PatientPrefill,
            models::fisioterapia::FisioterapiaSortKey,
            models::fisioterapia::UbsReferralCount,
            models::fisioterapia::FisioterapiaStats,
        )
    ),
    tags(
        (name = "Auth", description = "Login, logout e sessão corrente"),
        (name = "Users", description = "Gestão de usuários (somente ADMIN)"),
        (name = "Regulação", description = "Encaminhamentos para especialidades, exames e procedimentos"),
        (name = "Fisioterapia", description = "Fila, admissão, sessões e alta do E-mult")
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
