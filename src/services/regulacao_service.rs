// src/services/regulacao_service.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        validation::{normalize_optional, require_text, validation_error},
    },
    db::RegulacaoRepository,
    models::{
        auth::{Session, User},
        query::{Page, SortConfig},
        regulacao::{
            RegulacaoDraft, RegulacaoFilters, RegulacaoPatch, RegulacaoRecord, RegulacaoSortKey,
            RegulacaoStats, RegulacaoStatus,
        },
    },
    services::{
        dashboard_service,
        query_service::{self, contains_ci, matches_exact, QueryParams, SortField},
        rbac_service::{capabilities, is_visible, require_regulacao_access},
    },
};

impl SortField<RegulacaoSortKey> for RegulacaoRecord {
    fn sort_text(&self, key: RegulacaoSortKey) -> String {
        match key {
            RegulacaoSortKey::DataRegistro => self.data_registro.to_rfc3339(),
            RegulacaoSortKey::CnsCpf => self.cns_cpf.clone(),
            RegulacaoSortKey::NomePaciente => self.nome_paciente.clone(),
            RegulacaoSortKey::NomeAcs => self.nome_acs.clone().unwrap_or_default(),
            RegulacaoSortKey::Especialidade => self.especialidade.clone().unwrap_or_default(),
            RegulacaoSortKey::ExameProcedimento => self.exame_procedimento.clone().unwrap_or_default(),
            RegulacaoSortKey::Status => self.status.as_str().to_string(),
            RegulacaoSortKey::Atendimento => self.atendimento.as_str().to_string(),
            RegulacaoSortKey::CriadoPor => self.criado_por.clone(),
            RegulacaoSortKey::DataAgendamento => self
                .data_agendamento
                .map(|d| d.to_string())
                .unwrap_or_default(),
        }
    }
}

// =========================================================================
//  MÁQUINA DE ESTADOS (funções puras sobre a coleção)
// =========================================================================

/// Registra um novo encaminhamento no topo da coleção.
pub fn create_record(
    records: &mut Vec<RegulacaoRecord>,
    draft: RegulacaoDraft,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<RegulacaoRecord, AppError> {
    let user = session.user();
    require_regulacao_access(user)?;
    draft.validate()?;

    let record = RegulacaoRecord {
        id: Uuid::new_v4(),
        data_registro: now,
        cns_cpf: draft.cns_cpf.trim().to_string(),
        nome_paciente: draft.nome_paciente.trim().to_string(),
        nome_acs: normalize_optional(draft.nome_acs),
        status: RegulacaoStatus::Aguardando,
        atendimento: draft.atendimento.unwrap_or_default(),
        criado_por: user.name.clone(),
        criado_por_email: user.email.clone(),
        especialidade: normalize_optional(draft.especialidade),
        exame_procedimento: normalize_optional(draft.exame_procedimento),
        endereco: normalize_optional(draft.endereco),
        telefone: normalize_optional(draft.telefone),
        cid: normalize_optional(draft.cid),
        tipo: normalize_optional(draft.tipo),
        data_agendamento: None,
        data_entrega: None,
        observacao: normalize_optional(draft.observacao),
        motivo_alteracao: None,
        alterado_por: None,
    };

    records.insert(0, record.clone());
    Ok(record)
}

// Mudança real em um campo sensível (reenviar o mesmo valor não conta).
fn touches(current: &str, patched: Option<&str>) -> bool {
    patched.is_some_and(|value| value.trim() != current)
}

/// Edita um encaminhamento visível ao editor. Exige justificativa;
/// CNS/CPF e nome do paciente só mudam com `can_edit_sensitive_fields`.
pub fn edit_record(
    records: &mut [RegulacaoRecord],
    id: Uuid,
    patch: RegulacaoPatch,
    justification: Option<&str>,
    session: &Session,
) -> Result<RegulacaoRecord, AppError> {
    let user = session.user();
    require_regulacao_access(user)?;

    let record = records
        .iter_mut()
        .find(|r| r.id == id && is_visible(user, r))
        .ok_or_else(|| AppError::NotFound(format!("Registro de regulação {id}")))?;

    let motivo = require_text(
        "motivoAlteracao",
        justification,
        "Informe o motivo da alteração.",
    )?;

    let sensitive = touches(&record.cns_cpf, patch.cns_cpf.as_deref())
        || touches(&record.nome_paciente, patch.nome_paciente.as_deref());
    if sensitive && !capabilities(user.role).can_edit_sensitive_fields {
        return Err(AppError::PermissionDenied(
            "Apenas administradores podem alterar CNS/CPF ou nome do paciente.".into(),
        ));
    }

    // Trabalha numa cópia: qualquer erro abaixo deixa o registro intacto.
    let mut updated = record.clone();
    if let Some(cns) = patch.cns_cpf {
        let cns = cns.trim().to_string();
        if cns.is_empty() {
            return Err(validation_error("cnsCpf", "O CNS/CPF é obrigatório."));
        }
        updated.cns_cpf = cns;
    }
    if let Some(nome) = patch.nome_paciente {
        let nome = nome.trim().to_string();
        if nome.is_empty() {
            return Err(validation_error("nomePaciente", "O nome do paciente é obrigatório."));
        }
        updated.nome_paciente = nome;
    }

    if patch.nome_acs.is_some() {
        updated.nome_acs = normalize_optional(patch.nome_acs);
    }
    if let Some(status) = patch.status {
        updated.status = status;
    }
    if let Some(atendimento) = patch.atendimento {
        updated.atendimento = atendimento;
    }
    if patch.especialidade.is_some() {
        updated.especialidade = normalize_optional(patch.especialidade);
    }
    if patch.exame_procedimento.is_some() {
        updated.exame_procedimento = normalize_optional(patch.exame_procedimento);
    }
    if patch.endereco.is_some() {
        updated.endereco = normalize_optional(patch.endereco);
    }
    if patch.telefone.is_some() {
        updated.telefone = normalize_optional(patch.telefone);
    }
    if patch.cid.is_some() {
        updated.cid = normalize_optional(patch.cid);
    }
    if patch.tipo.is_some() {
        updated.tipo = normalize_optional(patch.tipo);
    }
    if let Some(data) = patch.data_agendamento {
        updated.data_agendamento = data;
    }
    if let Some(data) = patch.data_entrega {
        updated.data_entrega = data;
    }
    if patch.observacao.is_some() {
        updated.observacao = normalize_optional(patch.observacao);
    }

    updated.alterado_por = Some(user.name.clone());
    updated.motivo_alteracao = Some(motivo);

    *record = updated.clone();
    Ok(updated)
}

/// Remove um encaminhamento. Só ADMIN; id ausente não é erro.
/// Retorna `true` quando algo foi removido.
pub fn delete_record(records: &mut Vec<RegulacaoRecord>, id: Uuid, session: &Session) -> Result<bool, AppError> {
    if !capabilities(session.user().role).can_delete_records {
        return Err(AppError::PermissionDenied(
            "Apenas administradores podem excluir registros.".into(),
        ));
    }
    let before = records.len();
    records.retain(|r| r.id != id);
    Ok(records.len() != before)
}

/// Recorte da coleção que o usuário pode ver.
pub fn visible_records(records: Vec<RegulacaoRecord>, user: &User) -> Vec<RegulacaoRecord> {
    records.into_iter().filter(|r| is_visible(user, r)).collect()
}

/// AND de todos os filtros ativos. O filtro de origem só vale para quem vê tudo.
pub fn matches_filters(record: &RegulacaoRecord, filters: &RegulacaoFilters, can_filter_origin: bool) -> bool {
    let origem_ok = match filters.origem.as_deref().map(str::trim) {
        Some(origem) if can_filter_origin && !origem.is_empty() => record.criado_por == origem,
        _ => true,
    };

    contains_ci(Some(record.nome_paciente.as_str()), filters.nome.as_deref())
        && contains_ci(Some(record.cns_cpf.as_str()), filters.cns_cpf.as_deref())
        && contains_ci(record.nome_acs.as_deref(), filters.acs.as_deref())
        && contains_ci(record.especialidade.as_deref(), filters.especialidade.as_deref())
        && matches_exact(&record.status, filters.status.as_ref())
        && matches_exact(&record.atendimento, filters.atendimento.as_ref())
        && origem_ok
}

// =========================================================================
//  SERVIÇO (carrega, aplica, grava)
// =========================================================================

#[derive(Clone)]
pub struct RegulacaoService {
    repo: RegulacaoRepository,
}

impl RegulacaoService {
    pub fn new(repo: RegulacaoRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, session: &Session, draft: RegulacaoDraft) -> Result<RegulacaoRecord, AppError> {
        let record = self
            .repo
            .update(|records| create_record(records, draft, session, Utc::now()))
            .await?;

        tracing::info!(
            "📋 Regulação: registro {} criado por {}",
            record.id,
            session.user().email
        );
        Ok(record)
    }

    pub async fn update(
        &self,
        session: &Session,
        id: Uuid,
        patch: RegulacaoPatch,
        justification: Option<&str>,
    ) -> Result<RegulacaoRecord, AppError> {
        let record = self
            .repo
            .update(|records| edit_record(records, id, patch, justification, session))
            .await?;

        tracing::info!(
            "✏️ Regulação: registro {} alterado por {} ({:?})",
            id,
            session.user().email,
            record.motivo_alteracao
        );
        Ok(record)
    }

    pub async fn delete(&self, session: &Session, id: Uuid) -> Result<(), AppError> {
        let removed = self
            .repo
            .update(|records| delete_record(records, id, session))
            .await?;

        if removed {
            tracing::warn!("🗑️ Regulação: registro {} excluído por {}", id, session.user().email);
        }
        Ok(())
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> Result<RegulacaoRecord, AppError> {
        let user = session.user();
        require_regulacao_access(user)?;
        self.repo
            .load_all()
            .await?
            .into_iter()
            .find(|r| r.id == id && is_visible(user, r))
            .ok_or_else(|| AppError::NotFound(format!("Registro de regulação {id}")))
    }

    pub async fn list(
        &self,
        session: &Session,
        filters: &RegulacaoFilters,
        params: QueryParams<RegulacaoSortKey>,
    ) -> Result<Page<RegulacaoRecord>, AppError> {
        let user = session.user();
        require_regulacao_access(user)?;
        let can_filter_origin = capabilities(user.role).can_view_all_regulacao;

        let visible = visible_records(self.repo.load_all().await?, user);
        Ok(query_service::query(
            visible,
            |r| matches_filters(r, filters, can_filter_origin),
            params,
        ))
    }

    /// Conjunto completo (sem paginação) para o colaborador que gera o CSV.
    pub async fn export(
        &self,
        session: &Session,
        filters: &RegulacaoFilters,
        sort: Option<SortConfig<RegulacaoSortKey>>,
    ) -> Result<Vec<RegulacaoRecord>, AppError> {
        let user = session.user();
        require_regulacao_access(user)?;
        let caps = capabilities(user.role);
        if !caps.can_import_export {
            return Err(AppError::PermissionDenied(
                "Apenas administradores podem exportar dados.".into(),
            ));
        }

        let visible = visible_records(self.repo.load_all().await?, user);
        let rows = query_service::filter_and_sort(
            visible,
            |r| matches_filters(r, filters, caps.can_view_all_regulacao),
            sort,
        );
        tracing::info!("📤 Regulação: {} linhas exportadas por {}", rows.len(), user.email);
        Ok(rows)
    }

    pub async fn stats(&self, session: &Session) -> Result<RegulacaoStats, AppError> {
        let user = session.user();
        require_regulacao_access(user)?;
        let visible = visible_records(self.repo.load_all().await?, user);
        Ok(dashboard_service::regulacao_stats(&visible))
    }
}
