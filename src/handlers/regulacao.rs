// src/handlers/regulacao.rs

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
        rbac::{PermImportExport, PermRegulacaoAccess, RequirePermission},
    },
    models::{
        query::{Page, SortConfig, SortDirection},
        regulacao::{
            AtendimentoTipo, RegulacaoDraft, RegulacaoFilters, RegulacaoRecord, RegulacaoSortKey,
            RegulacaoStats, RegulacaoStatus, UpdateRegulacaoPayload,
        },
    },
    services::query_service::QueryParams,
};

// Query string de listagem/exportação. Campos planos (sem flatten) para
// que os números sejam lidos corretamente.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RegulacaoListQuery {
    pub nome: Option<String>,
    pub cns_cpf: Option<String>,
    pub acs: Option<String>,
    pub especialidade: Option<String>,
    pub status: Option<RegulacaoStatus>,
    pub atendimento: Option<AtendimentoTipo>,
    /// Nome de quem registrou (só para perfis que veem tudo)
    pub origem: Option<String>,
    pub sort_by: Option<RegulacaoSortKey>,
    pub sort_dir: Option<SortDirection>,
    pub page: Option<usize>,
    /// 10, 30 ou 50
    pub page_size: Option<u32>,
}

impl RegulacaoListQuery {
    fn filters(&self) -> RegulacaoFilters {
        RegulacaoFilters {
            nome: self.nome.clone(),
            cns_cpf: self.cns_cpf.clone(),
            acs: self.acs.clone(),
            especialidade: self.especialidade.clone(),
            status: self.status,
            atendimento: self.atendimento,
            origem: self.origem.clone(),
        }
    }

    fn sort(&self) -> Option<SortConfig<RegulacaoSortKey>> {
        self.sort_by.map(|key| SortConfig { key, direction: self.sort_dir.unwrap_or_default() })
    }
}

// GET /api/regulacao
#[utoipa::path(
    get,
    path = "/api/regulacao",
    tag = "Regulação",
    params(RegulacaoListQuery),
    responses(
        (status = 200, description = "Página de encaminhamentos visíveis ao usuário", body = Page<RegulacaoRecord>),
        (status = 403, description = "Sem acesso ao módulo")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_records(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermRegulacaoAccess>,
    Query(query): Query<RegulacaoListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let params = QueryParams::from_request(query.sort_by, query.sort_dir, query.page, query.page_size)?;
    let page = app_state
        .regulacao_service
        .list(&user.session(), &query.filters(), params)
        .await?;
    Ok((StatusCode::OK, Json(page)))
}

// POST /api/regulacao
#[utoipa::path(
    post,
    path = "/api/regulacao",
    tag = "Regulação",
    request_body = RegulacaoDraft,
    responses(
        (status = 201, description = "Encaminhamento registrado", body = RegulacaoRecord),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_record(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermRegulacaoAccess>,
    Json(draft): Json<RegulacaoDraft>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.regulacao_service.create(&user.session(), draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

// GET /api/regulacao/stats
#[utoipa::path(
    get,
    path = "/api/regulacao/stats",
    tag = "Regulação",
    responses(
        (status = 200, description = "Totais por status do recorte visível", body = RegulacaoStats)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermRegulacaoAccess>,
) -> Result<impl IntoResponse, AppError> {
    let stats = app_state.regulacao_service.stats(&user.session()).await?;
    Ok((StatusCode::OK, Json(stats)))
}

// GET /api/regulacao/export
#[utoipa::path(
    get,
    path = "/api/regulacao/export",
    tag = "Regulação",
    params(RegulacaoListQuery),
    responses(
        (status = 200, description = "Todas as linhas filtradas e ordenadas, sem paginação", body = Vec<RegulacaoRecord>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_records(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermImportExport>,
    Query(query): Query<RegulacaoListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let rows = app_state
        .regulacao_service
        .export(&user.session(), &query.filters(), query.sort())
        .await?;
    Ok((StatusCode::OK, Json(rows)))
}

// GET /api/regulacao/{id}
#[utoipa::path(
    get,
    path = "/api/regulacao/{id}",
    tag = "Regulação",
    params(("id" = Uuid, Path, description = "ID do encaminhamento")),
    responses(
        (status = 200, description = "Encaminhamento", body = RegulacaoRecord),
        (status = 404, description = "Não encontrado ou fora do seu recorte")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_record(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermRegulacaoAccess>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state.regulacao_service.get(&user.session(), id).await?;
    Ok((StatusCode::OK, Json(record)))
}

// PUT /api/regulacao/{id}
#[utoipa::path(
    put,
    path = "/api/regulacao/{id}",
    tag = "Regulação",
    request_body = UpdateRegulacaoPayload,
    params(("id" = Uuid, Path, description = "ID do encaminhamento")),
    responses(
        (status = 200, description = "Encaminhamento alterado", body = RegulacaoRecord),
        (status = 400, description = "Motivo da alteração ausente"),
        (status = 403, description = "Alteração de campo sensível sem permissão"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_record(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermRegulacaoAccess>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRegulacaoPayload>,
) -> Result<impl IntoResponse, AppError> {
    let record = app_state
        .regulacao_service
        .update(&user.session(), id, payload.patch, payload.motivo_alteracao.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(record)))
}

// DELETE /api/regulacao/{id}
#[utoipa::path(
    delete,
    path = "/api/regulacao/{id}",
    tag = "Regulação",
    params(("id" = Uuid, Path, description = "ID do encaminhamento")),
    responses(
        (status = 204, description = "Excluído (ou já inexistente)"),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_record(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _perm: RequirePermission<PermRegulacaoAccess>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.regulacao_service.delete(&user.session(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
