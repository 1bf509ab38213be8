// src/services/fisioterapia_service.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        validation::{normalize_optional, require_text, validation_error},
    },
    db::FisioterapiaRepository,
    models::{
        auth::Session,
        fisioterapia::{
            AdmitPayload, FisioterapiaDraft, FisioterapiaFilters, FisioterapiaPatch, FisioterapiaRecord,
            FisioterapiaSessao, FisioterapiaSortKey, FisioterapiaStats, FisioterapiaStatus, PatientPrefill,
            RecordSessionPayload,
        },
        query::Page,
    },
    services::{
        dashboard_service,
        query_service::{self, contains_ci, matches_exact, QueryParams, SortField},
        rbac_service::require_emult_access,
    },
};

// Abaixo disso o identificador ainda está sendo digitado.
pub const MIN_IDENTIFIER_LEN: usize = 5;

impl SortField<FisioterapiaSortKey> for FisioterapiaRecord {
    fn sort_text(&self, key: FisioterapiaSortKey) -> String {
        match key {
            FisioterapiaSortKey::DataRegistro => self.data_registro.to_rfc3339(),
            FisioterapiaSortKey::CnsCpf => self.cns_cpf.clone(),
            FisioterapiaSortKey::Nome => self.nome.clone(),
            FisioterapiaSortKey::UbsOrigem => self.ubs_origem.clone(),
            FisioterapiaSortKey::EmailAdmissor => self.email_admissor.clone().unwrap_or_default(),
            FisioterapiaSortKey::Prioridade => self.prioridade.as_str().to_string(),
            FisioterapiaSortKey::Status => self.status.as_str().to_string(),
        }
    }
}

fn find_mut(records: &mut [FisioterapiaRecord], id: Uuid) -> Result<&mut FisioterapiaRecord, AppError> {
    records
        .iter_mut()
        .find(|r| r.id == id)
        .ok_or_else(|| AppError::NotFound(format!("Registro de fisioterapia {id}")))
}

fn transition_error(action: &str, status: FisioterapiaStatus) -> AppError {
    AppError::InvalidTransition(format!(
        "Não é possível {action} um paciente com status {}.",
        status.as_str()
    ))
}

// =========================================================================
//  MÁQUINA DE ESTADOS: AGUARDANDO -> ADMITIDO -> ALTA
// =========================================================================

pub fn create_record(
    records: &mut Vec<FisioterapiaRecord>,
    draft: FisioterapiaDraft,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<FisioterapiaRecord, AppError> {
    let user = session.user();
    require_emult_access(user)?;
    draft.validate()?;

    let record = FisioterapiaRecord {
        id: Uuid::new_v4(),
        data_registro: now,
        cns_cpf: draft.cns_cpf.trim().to_string(),
        nome: draft.nome.trim().to_string(),
        ubs_origem: normalize_optional(draft.ubs_origem).unwrap_or_else(|| user.group_name.clone()),
        endereco: normalize_optional(draft.endereco).unwrap_or_default(),
        acs: normalize_optional(draft.acs).unwrap_or_default(),
        telefone: normalize_optional(draft.telefone).unwrap_or_default(),
        cid: normalize_optional(draft.cid).unwrap_or_default(),
        prioridade: draft.prioridade.unwrap_or_default(),
        email_criador: user.email.clone(),
        status: FisioterapiaStatus::Aguardando,
        quantidade_sessoes: None,
        data_admissao: None,
        email_admissor: None,
        observacao: None,
        sessoes: Vec::new(),
    };

    records.insert(0, record.clone());
    Ok(record)
}

/// Admite o paciente e gera as sessões 1..N pendentes.
pub fn admit(
    records: &mut [FisioterapiaRecord],
    id: Uuid,
    payload: AdmitPayload,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<FisioterapiaRecord, AppError> {
    let user = session.user();
    require_emult_access(user)?;

    let record = find_mut(records, id)?;
    if record.status != FisioterapiaStatus::Aguardando {
        return Err(transition_error("admitir", record.status));
    }
    payload.validate()?;

    record.status = FisioterapiaStatus::Admitido;
    record.quantidade_sessoes = Some(payload.quantidade_sessoes);
    record.sessoes = (1..=payload.quantidade_sessoes).map(FisioterapiaSessao::pendente).collect();
    record.data_admissao = Some(now);
    record.email_admissor = Some(user.email.clone());
    record.observacao = normalize_optional(payload.observacao);

    Ok(record.clone())
}

/// Registra presença ou falta numa sessão pendente.
pub fn record_session(
    records: &mut [FisioterapiaRecord],
    id: Uuid,
    numero: u32,
    payload: RecordSessionPayload,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<FisioterapiaRecord, AppError> {
    require_emult_access(session.user())?;

    let record = find_mut(records, id)?;
    if record.status != FisioterapiaStatus::Admitido {
        return Err(transition_error("registrar sessão de", record.status));
    }

    let sessao = record
        .sessoes
        .iter_mut()
        .find(|s| s.numero == numero)
        .ok_or_else(|| AppError::NotFound(format!("Sessão {numero}")))?;

    if sessao.executada.is_some() {
        return Err(AppError::InvalidTransition(format!(
            "A sessão {numero} já foi registrada."
        )));
    }

    let motivo = if payload.executada {
        None
    } else {
        Some(require_text(
            "motivoNaoExecucao",
            payload.motivo_nao_execucao.as_deref(),
            "Informe o motivo da falta.",
        )?)
    };

    sessao.executada = Some(payload.executada);
    sessao.motivo_nao_execucao = motivo;
    sessao.data_registro_atendimento = Some(now);

    Ok(record.clone())
}

pub fn discharge(
    records: &mut [FisioterapiaRecord],
    id: Uuid,
    session: &Session,
) -> Result<FisioterapiaRecord, AppError> {
    require_emult_access(session.user())?;

    let record = find_mut(records, id)?;
    if record.status != FisioterapiaStatus::Admitido {
        return Err(transition_error("dar alta a", record.status));
    }
    record.status = FisioterapiaStatus::Alta;
    Ok(record.clone())
}

// Vale em qualquer status, inclusive ALTA.
pub fn update_observation(
    records: &mut [FisioterapiaRecord],
    id: Uuid,
    observacao: &str,
    session: &Session,
) -> Result<FisioterapiaRecord, AppError> {
    require_emult_access(session.user())?;

    let record = find_mut(records, id)?;
    record.observacao = normalize_optional(Some(observacao.to_string()));
    Ok(record.clone())
}

/// Corrige dados cadastrais do paciente. Status, sessões e criador ficam intactos.
pub fn update_patient(
    records: &mut [FisioterapiaRecord],
    id: Uuid,
    patch: FisioterapiaPatch,
    session: &Session,
) -> Result<FisioterapiaRecord, AppError> {
    require_emult_access(session.user())?;

    let record = find_mut(records, id)?;
    if record.status == FisioterapiaStatus::Alta {
        return Err(transition_error("editar", record.status));
    }

    let mut updated = record.clone();
    if let Some(cns) = patch.cns_cpf {
        updated.cns_cpf = cns.trim().to_string();
        if updated.cns_cpf.is_empty() {
            return Err(validation_error("cnsCpf", "O CNS/CPF é obrigatório."));
        }
    }
    if let Some(nome) = patch.nome {
        updated.nome = nome.trim().to_string();
        if updated.nome.is_empty() {
            return Err(validation_error("nome", "O nome é obrigatório."));
        }
    }
    if let Some(ubs) = normalize_optional(patch.ubs_origem) {
        updated.ubs_origem = ubs;
    }
    if let Some(endereco) = patch.endereco {
        updated.endereco = endereco.trim().to_string();
    }
    if let Some(acs) = patch.acs {
        updated.acs = acs.trim().to_string();
    }
    if let Some(telefone) = patch.telefone {
        updated.telefone = telefone.trim().to_string();
    }
    if let Some(cid) = patch.cid {
        updated.cid = cid.trim().to_string();
    }
    if let Some(prioridade) = patch.prioridade {
        updated.prioridade = prioridade;
    }

    *record = updated.clone();
    Ok(updated)
}

/// Registro mais recente (ordem da coleção) com o identificador exato.
pub fn find_by_identifier<'a>(records: &'a [FisioterapiaRecord], cns_cpf: &str) -> Option<&'a FisioterapiaRecord> {
    let cns_cpf = cns_cpf.trim();
    if cns_cpf.chars().count() < MIN_IDENTIFIER_LEN {
        return None;
    }
    records.iter().find(|r| r.cns_cpf == cns_cpf)
}

pub fn matches_filters(record: &FisioterapiaRecord, filters: &FisioterapiaFilters) -> bool {
    contains_ci(Some(record.nome.as_str()), filters.nome.as_deref())
        && contains_ci(Some(record.cns_cpf.as_str()), filters.cns_cpf.as_deref())
        && contains_ci(Some(record.ubs_origem.as_str()), filters.ubs_origem.as_deref())
        && matches_exact(&record.status, filters.status.as_ref())
        && matches_exact(&record.prioridade, filters.prioridade.as_ref())
}

// =========================================================================
//  SERVIÇO
// =========================================================================

#[derive(Clone)]
pub struct FisioterapiaService {
    repo: FisioterapiaRepository,
}

impl FisioterapiaService {
    pub fn new(repo: FisioterapiaRepository) -> Self {
        Self { repo }
    }

    pub async fn create(&self, session: &Session, draft: FisioterapiaDraft) -> Result<FisioterapiaRecord, AppError> {
        let record = self
            .repo
            .update(|records| create_record(records, draft, session, Utc::now()))
            .await?;
        tracing::info!("🩺 Fisioterapia: paciente {} registrado por {}", record.id, session.user().email);
        Ok(record)
    }

    pub async fn admit(&self, session: &Session, id: Uuid, payload: AdmitPayload) -> Result<FisioterapiaRecord, AppError> {
        let record = self
            .repo
            .update(|records| admit(records, id, payload, session, Utc::now()))
            .await?;
        tracing::info!(
            "✅ Fisioterapia: paciente {} admitido com {:?} sessões",
            id,
            record.quantidade_sessoes
        );
        Ok(record)
    }

    pub async fn record_session(
        &self,
        session: &Session,
        id: Uuid,
        numero: u32,
        payload: RecordSessionPayload,
    ) -> Result<FisioterapiaRecord, AppError> {
        let executada = payload.executada;
        let record = self
            .repo
            .update(|records| record_session(records, id, numero, payload, session, Utc::now()))
            .await?;
        tracing::debug!("Fisioterapia: sessão {numero} de {id} registrada (executada={executada})");
        Ok(record)
    }

    pub async fn discharge(&self, session: &Session, id: Uuid) -> Result<FisioterapiaRecord, AppError> {
        let record = self.repo.update(|records| discharge(records, id, session)).await?;
        tracing::info!("🏁 Fisioterapia: alta do paciente {} por {}", id, session.user().email);
        Ok(record)
    }

    pub async fn update_observation(
        &self,
        session: &Session,
        id: Uuid,
        observacao: &str,
    ) -> Result<FisioterapiaRecord, AppError> {
        self.repo
            .update(|records| update_observation(records, id, observacao, session))
            .await
    }

    pub async fn update_patient(
        &self,
        session: &Session,
        id: Uuid,
        patch: FisioterapiaPatch,
    ) -> Result<FisioterapiaRecord, AppError> {
        self.repo
            .update(|records| update_patient(records, id, patch, session))
            .await
    }

    pub async fn get(&self, session: &Session, id: Uuid) -> Result<FisioterapiaRecord, AppError> {
        require_emult_access(session.user())?;
        self.repo
            .load_all()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Registro de fisioterapia {id}")))
    }

    pub async fn lookup(&self, session: &Session, cns_cpf: &str) -> Result<Option<PatientPrefill>, AppError> {
        require_emult_access(session.user())?;
        let records = self.repo.load_all().await?;
        Ok(find_by_identifier(&records, cns_cpf).map(PatientPrefill::from))
    }

    pub async fn list(
        &self,
        session: &Session,
        filters: &FisioterapiaFilters,
        params: QueryParams<FisioterapiaSortKey>,
    ) -> Result<Page<FisioterapiaRecord>, AppError> {
        require_emult_access(session.user())?;
        let records = self.repo.load_all().await?;
        Ok(query_service::query(records, |r| matches_filters(r, filters), params))
    }

    pub async fn report(&self, session: &Session) -> Result<FisioterapiaStats, AppError> {
        require_emult_access(session.user())?;
        let records = self.repo.load_all().await?;
        Ok(dashboard_service::fisioterapia_stats(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::db::{seed, store::FISIOTERAPIA_KEY, CollectionRepository, MemoryStore, Store};
    use crate::models::auth::{Role, User};
    use crate::models::fisioterapia::{PrioridadeClinica, MAX_SESSOES};

    fn session(role: Role) -> Session {
        Session::new(User {
            id: Uuid::new_v4(),
            email: "em@saude.com".into(),
            name: "Equipe E-mult".into(),
            role,
            group_name: "E-mult".into(),
            password_hash: None,
        })
    }

    fn emult() -> Session {
        session(Role::Emult)
    }

    fn draft(cns: &str) -> FisioterapiaDraft {
        FisioterapiaDraft {
            cns_cpf: cns.into(),
            nome: "João".into(),
            ubs_origem: Some("Sede 1".into()),
            ..Default::default()
        }
    }

    fn admit_payload(n: u32) -> AdmitPayload {
        AdmitPayload { quantidade_sessoes: n, observacao: Some("Lombalgia".into()) }
    }

    fn outcome(executada: bool, motivo: Option<&str>) -> RecordSessionPayload {
        RecordSessionPayload { executada, motivo_nao_execucao: motivo.map(str::to_string) }
    }

    fn admitted(n: u32) -> (Vec<FisioterapiaRecord>, Uuid) {
        let mut records = Vec::new();
        let rec = create_record(&mut records, draft("12345678900"), &emult(), Utc::now()).unwrap();
        admit(&mut records, rec.id, admit_payload(n), &emult(), Utc::now()).unwrap();
        (records, rec.id)
    }

    #[test]
    fn create_defaults_origin_to_creator_unit() {
        let mut records = Vec::new();
        let blank = FisioterapiaDraft { ubs_origem: Some("  ".into()), ..draft("12345") };
        let rec = create_record(&mut records, blank, &emult(), Utc::now()).unwrap();

        assert_eq!(rec.ubs_origem, "E-mult");
        assert_eq!(rec.status, FisioterapiaStatus::Aguardando);
        assert_eq!(rec.prioridade, PrioridadeClinica::Eletivo);
        assert!(rec.sessoes.is_empty());
        assert_eq!(rec.email_criador, "em@saude.com");
    }

    #[test]
    fn regulacao_role_has_no_access() {
        let mut records = Vec::new();
        let err = create_record(&mut records, draft("12345"), &session(Role::Regulacao), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(_)));
    }

    #[test]
    fn admit_creates_contiguous_pending_sessions() {
        let (records, _) = admitted(8);
        let rec = &records[0];

        assert_eq!(rec.status, FisioterapiaStatus::Admitido);
        assert_eq!(rec.quantidade_sessoes, Some(8));
        assert_eq!(rec.email_admissor.as_deref(), Some("em@saude.com"));
        assert!(rec.data_admissao.is_some());
        let numeros: Vec<u32> = rec.sessoes.iter().map(|s| s.numero).collect();
        assert_eq!(numeros, (1..=8).collect::<Vec<_>>());
        assert!(rec.sessoes.iter().all(|s| s.executada.is_none()));
    }

    #[test]
    fn admit_rejects_zero_sessions_and_second_admission() {
        let mut records = Vec::new();
        let rec = create_record(&mut records, draft("12345"), &emult(), Utc::now()).unwrap();

        let err = admit(&mut records, rec.id, admit_payload(0), &emult(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert_eq!(records[0].status, FisioterapiaStatus::Aguardando);

        admit(&mut records, rec.id, admit_payload(3), &emult(), Utc::now()).unwrap();
        let err = admit(&mut records, rec.id, admit_payload(3), &emult(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn admit_caps_session_count() {
        let mut records = Vec::new();
        let rec = create_record(&mut records, draft("12345"), &emult(), Utc::now()).unwrap();

        for n in [MAX_SESSOES + 1, u32::MAX] {
            let err = admit(&mut records, rec.id, admit_payload(n), &emult(), Utc::now()).unwrap_err();
            assert!(matches!(err, AppError::ValidationError(_)));
            assert_eq!(records[0].status, FisioterapiaStatus::Aguardando);
            assert!(records[0].sessoes.is_empty());
            assert_eq!(records[0].quantidade_sessoes, None);
        }

        let rec = admit(&mut records, rec.id, admit_payload(MAX_SESSOES), &emult(), Utc::now()).unwrap();
        assert_eq!(rec.sessoes.len(), MAX_SESSOES as usize);
    }

    #[test]
    fn recorded_sessions_are_terminal() {
        let (mut records, id) = admitted(8);

        let rec = record_session(&mut records, id, 1, outcome(true, None), &emult(), Utc::now()).unwrap();
        assert_eq!(rec.sessoes[0].executada, Some(true));
        assert!(rec.sessoes[0].data_registro_atendimento.is_some());

        let err = record_session(&mut records, id, 1, outcome(false, Some("Chuva")), &emult(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert_eq!(records[0].sessoes[0].executada, Some(true));
    }

    #[test]
    fn missed_session_requires_reason() {
        let (mut records, id) = admitted(4);

        let err = record_session(&mut records, id, 2, outcome(false, Some("  ")), &emult(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
        assert!(records[0].sessoes[1].executada.is_none());

        let rec = record_session(&mut records, id, 2, outcome(false, Some("Paciente viajou")), &emult(), Utc::now())
            .unwrap();
        assert_eq!(rec.sessoes[1].executada, Some(false));
        assert_eq!(rec.sessoes[1].motivo_nao_execucao.as_deref(), Some("Paciente viajou"));
    }

    #[test]
    fn unknown_session_number_is_not_found() {
        let (mut records, id) = admitted(4);
        let err = record_session(&mut records, id, 5, outcome(true, None), &emult(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn sessions_only_recorded_while_admitted() {
        let mut records = Vec::new();
        let rec = create_record(&mut records, draft("12345"), &emult(), Utc::now()).unwrap();
        let err = record_session(&mut records, rec.id, 1, outcome(true, None), &emult(), Utc::now()).unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }

    #[test]
    fn discharge_is_terminal_and_keeps_outcomes() {
        let (mut records, id) = admitted(3);
        record_session(&mut records, id, 1, outcome(true, None), &emult(), Utc::now()).unwrap();

        let rec = discharge(&mut records, id, &emult()).unwrap();
        assert_eq!(rec.status, FisioterapiaStatus::Alta);
        assert_eq!(rec.sessoes[0].executada, Some(true));
        assert!(rec.sessoes[1].executada.is_none());

        assert!(matches!(discharge(&mut records, id, &emult()), Err(AppError::InvalidTransition(_))));
        assert!(matches!(
            admit(&mut records, id, admit_payload(2), &emult(), Utc::now()),
            Err(AppError::InvalidTransition(_))
        ));
        assert!(matches!(
            record_session(&mut records, id, 2, outcome(true, None), &emult(), Utc::now()),
            Err(AppError::InvalidTransition(_))
        ));
        assert!(matches!(
            update_patient(&mut records, id, FisioterapiaPatch::default(), &emult()),
            Err(AppError::InvalidTransition(_))
        ));

        // Observação continua editável depois da alta.
        let rec = update_observation(&mut records, id, "Alta com melhora", &emult()).unwrap();
        assert_eq!(rec.observacao.as_deref(), Some("Alta com melhora"));
    }

    #[test]
    fn waiting_patient_cannot_be_discharged() {
        let mut records = Vec::new();
        let rec = create_record(&mut records, draft("12345"), &emult(), Utc::now()).unwrap();
        assert!(matches!(discharge(&mut records, rec.id, &emult()), Err(AppError::InvalidTransition(_))));
    }

    #[test]
    fn update_patient_never_touches_state() {
        let (mut records, id) = admitted(2);
        let before = records[0].clone();

        let patch = FisioterapiaPatch {
            nome: Some("João Pedro".into()),
            telefone: Some("(75) 99999-0000".into()),
            ..Default::default()
        };
        let rec = update_patient(&mut records, id, patch, &emult()).unwrap();
        assert_eq!(rec.nome, "João Pedro");
        assert_eq!(rec.status, before.status);
        assert_eq!(rec.sessoes, before.sessoes);
        assert_eq!(rec.email_criador, before.email_criador);

        let blank = FisioterapiaPatch { cns_cpf: Some(" ".into()), ..Default::default() };
        assert!(matches!(update_patient(&mut records, id, blank, &emult()), Err(AppError::ValidationError(_))));
        assert_eq!(records[0].nome, "João Pedro");
    }

    #[test]
    fn lookup_needs_five_chars_and_exact_match() {
        let mut records = Vec::new();
        create_record(&mut records, draft("12345"), &emult(), Utc::now()).unwrap();
        let newer = FisioterapiaDraft { nome: "João Atualizado".into(), ..draft("12345") };
        create_record(&mut records, newer, &emult(), Utc::now()).unwrap();

        assert!(find_by_identifier(&records, "1234").is_none());
        assert!(find_by_identifier(&records, "123456").is_none());
        assert_eq!(find_by_identifier(&records, "12345").unwrap().nome, "João Atualizado");
    }

    #[test]
    fn filters_combine_with_and() {
        let (records, _) = admitted(2);
        let rec = &records[0];

        let f = FisioterapiaFilters { ubs_origem: Some("sede".into()), ..Default::default() };
        assert!(matches_filters(rec, &f));
        let f = FisioterapiaFilters {
            ubs_origem: Some("sede".into()),
            status: Some(FisioterapiaStatus::Aguardando),
            ..Default::default()
        };
        assert!(!matches_filters(rec, &f));
    }

    #[tokio::test]
    async fn empty_collection_reseeds_on_read() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        store.save(FISIOTERAPIA_KEY, serde_json::json!([])).await.unwrap();
        let service = FisioterapiaService::new(
            CollectionRepository::new(store, FISIOTERAPIA_KEY, seed::initial_fisioterapia).reseed_when_empty(),
        );

        let page = service
            .list(&emult(), &FisioterapiaFilters::default(), QueryParams::default())
            .await
            .unwrap();
        assert_eq!(page.total, seed::initial_fisioterapia().len());
    }

    #[tokio::test]
    async fn service_persists_full_lifecycle() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let service = FisioterapiaService::new(CollectionRepository::new(store, FISIOTERAPIA_KEY, Vec::new));

        let rec = service.create(&emult(), draft("98765")).await.unwrap();
        service.admit(&emult(), rec.id, admit_payload(2)).await.unwrap();
        service.record_session(&emult(), rec.id, 1, outcome(true, None)).await.unwrap();
        service
            .record_session(&emult(), rec.id, 2, outcome(false, Some("Doente")))
            .await
            .unwrap();
        service.discharge(&emult(), rec.id).await.unwrap();

        let report = service.report(&emult()).await.unwrap();
        assert_eq!(report.alta, 1);
        assert_eq!(report.sessoes_executadas, 1);
        assert_eq!(report.sessoes_faltas, 1);

        let prefill = service.lookup(&emult(), "98765").await.unwrap().unwrap();
        assert_eq!(prefill.ubs_origem, "Sede 1");
    }
}
