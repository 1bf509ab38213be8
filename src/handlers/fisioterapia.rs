// src/handlers/fisioterapia.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermEmultAccess, RequirePermission},
    },
    models::{
        fisioterapia::{
            AdmitPayload, FisioterapiaDraft, FisioterapiaFilters, FisioterapiaPatch, FisioterapiaRecord,
            FisioterapiaSortKey, FisioterapiaStats, FisioterapiaStatus, ObservationPayload, PatientPrefill,
            PrioridadeClinica, RecordSessionPayload,
        },
        query::{Page, SortDirection},
    },
    services::query_service::QueryParams,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FisioterapiaListQuery {
    pub nome: Option<String>,
    pub cns_cpf: Option<String>,
    pub ubs_origem: Option<String>,
    pub status: Option<FisioterapiaStatus>,
    pub prioridade: Option<PrioridadeClinica>,
    pub sort_by: Option<FisioterapiaSortKey>,
    pub sort_dir: Option<SortDirection>,
    pub page: Option<usize>,
    /// 10, 30 ou 50
    pub page_size: Option<u32>,
}

// GET /api/fisioterapia
#[utoipa::path(
    get,
    path = "/api/fisioterapia",
    tag = "Fisioterapia",
    params(FisioterapiaListQuery),
    responses(
        (status = 200, description = "Fila de fisioterapia paginada", body = Page<FisioterapiaRecord>),
        (status = 403, description = "Sem acesso ao módulo E-mult")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_records(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
    Query(query): Query<FisioterapiaListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let params = QueryParams::from_request(query.sort_by, query.sort_dir, query.page, query.page_size)?;
    let filters = FisioterapiaFilters {
        nome: query.nome,
        cns_cpf: query.cns_cpf,
        ubs_origem: query.ubs_origem,
        status: query.status,
        prioridade: query.prioridade,
    };

    let page = app_state
        .fisioterapia_service
        .list(&user.session(), &filters, params)
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/fisioterapia
#[utoipa::path(
    post,
    path = "/api/fisioterapia",
    tag = "Fisioterapia",
    request_body = FisioterapiaDraft,
    responses(
        (status = 201, description = "Paciente incluído na fila", body = FisioterapiaRecord),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_record(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
    Json(draft): Json<FisioterapiaDraft>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.fisioterapia_service.create(&user.session(), draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

// GET /api/fisioterapia/report
#[utoipa::path(
    get,
    path = "/api/fisioterapia/report",
    tag = "Fisioterapia",
    responses(
        (status = 200, description = "Indicadores de comparecimento e encaminhamentos por UBS", body = FisioterapiaStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.fisioterapia_service.report(&user.session()).await?;
    Ok((StatusCode::OK, Json(report)))
}

// GET /api/fisioterapia/lookup/{cnsCpf}
#[utoipa::path(
    get,
    path = "/api/fisioterapia/lookup/{cnsCpf}",
    tag = "Fisioterapia",
    params(("cnsCpf" = String, Path, description = "CNS/CPF (mínimo 5 caracteres)")),
    responses(
        (status = 200, description = "Dados do cadastro mais recente com o mesmo CNS/CPF", body = PatientPrefill),
        (status = 404, description = "Nenhum cadastro encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn lookup_patient(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
    Path(cns_cpf): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let prefill = app_state
        .fisioterapia_service
        .lookup(&user.session(), &cns_cpf)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Paciente {cns_cpf}")))?;
    Ok((StatusCode::OK, Json(prefill)))
}

// GET /api/fisioterapia/{id}
#[utoipa::path(
    get,
    path = "/api/fisioterapia/{id}",
    tag = "Fisioterapia",
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Registro com suas sessões", body = FisioterapiaRecord),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_record(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.fisioterapia_service.get(&user.session(), id).await?;
    Ok((StatusCode::OK, Json(record)))
}

// PUT /api/fisioterapia/{id}
#[utoipa::path(
    put,
    path = "/api/fisioterapia/{id}",
    tag = "Fisioterapia",
    request_body = FisioterapiaPatch,
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Dados do paciente alterados", body = FisioterapiaRecord),
        (status = 409, description = "Paciente já recebeu alta")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_patient(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
    Path(id): Path<Uuid>,
    Json(patch): Json<FisioterapiaPatch>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state
        .fisioterapia_service
        .update_patient(&user.session(), id, patch)
        .await?;
    Ok((StatusCode::OK, Json(record)))
}

// POST /api/fisioterapia/{id}/admit
#[utoipa::path(
    post,
    path = "/api/fisioterapia/{id}/admit",
    tag = "Fisioterapia",
    request_body = AdmitPayload,
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Paciente admitido e sessões geradas", body = FisioterapiaRecord),
        (status = 400, description = "Quantidade de sessões inválida"),
        (status = 409, description = "Paciente não está aguardando")
    ),
    security(("api_jwt" = []))
)]
pub async fn admit_patient(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdmitPayload>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.fisioterapia_service.admit(&user.session(), id, payload).await?;
    Ok((StatusCode::OK, Json(record)))
}

// PUT /api/fisioterapia/{id}/sessions/{numero}
#[utoipa::path(
    put,
    path = "/api/fisioterapia/{id}/sessions/{numero}",
    tag = "Fisioterapia",
    request_body = RecordSessionPayload,
    params(
        ("id" = Uuid, Path, description = "ID do registro"),
        ("numero" = u32, Path, description = "Número da sessão (1..N)")
    ),
    responses(
        (status = 200, description = "Sessão registrada", body = FisioterapiaRecord),
        (status = 400, description = "Falta sem motivo"),
        (status = 404, description = "Sessão inexistente"),
        (status = 409, description = "Sessão já registrada ou paciente não admitido")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_session(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
    Path((id, numero)): Path<(Uuid, u32)>,
    Json(payload): Json<RecordSessionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state
        .fisioterapia_service
        .record_session(&user.session(), id, numero, payload)
        .await?;
    Ok((StatusCode::OK, Json(record)))
}

// POST /api/fisioterapia/{id}/discharge
#[utoipa::path(
    post,
    path = "/api/fisioterapia/{id}/discharge",
    tag = "Fisioterapia",
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Alta registrada", body = FisioterapiaRecord),
        (status = 409, description = "Paciente não está admitido")
    ),
    security(("api_jwt" = []))
)]
pub async fn discharge_patient(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.fisioterapia_service.discharge(&user.session(), id).await?;
    Ok((StatusCode::OK, Json(record)))
}

// PUT /api/fisioterapia/{id}/observation
#[utoipa::path(
    put,
    path = "/api/fisioterapia/{id}/observation",
    tag = "Fisioterapia",
    request_body = ObservationPayload,
    params(("id" = Uuid, Path, description = "ID do registro")),
    responses(
        (status = 200, description = "Observação atualizada", body = FisioterapiaRecord)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_observation(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermEmultAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ObservationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state
        .fisioterapia_service
        .update_observation(&user.session(), id, &payload.observacao)
        .await?;
    Ok((StatusCode::OK, Json(record)))
}
