// src/models/fisioterapia.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::not_blank;

// --- ENUMS ---

// AGUARDANDO -> ADMITIDO -> ALTA
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum FisioterapiaStatus {
    Aguardando,
    Admitido,
    Alta,
}

impl FisioterapiaStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FisioterapiaStatus::Aguardando => "AGUARDANDO",
            FisioterapiaStatus::Admitido => "ADMITIDO",
            FisioterapiaStatus::Alta => "ALTA",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum PrioridadeClinica {
    #[default]
    Eletivo,
    #[serde(rename = "Prioritário")]
    Prioritario,
    Urgente,
}

impl PrioridadeClinica {
    pub fn as_str(self) -> &'static str {
        match self {
            PrioridadeClinica::Eletivo => "Eletivo",
            PrioridadeClinica::Prioritario => "Prioritário",
            PrioridadeClinica::Urgente => "Urgente",
        }
    }
}

// --- SESSÃO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FisioterapiaSessao {
    // 1..N, fixo desde a admissão
    pub numero: u32,
    #[serde(default)]
    pub data_prevista: Option<NaiveDate>,
    // null = ainda não registrada; true/false são terminais
    pub executada: Option<bool>,
    #[serde(default)]
    pub motivo_nao_execucao: Option<String>,
    #[serde(default)]
    pub data_registro_atendimento: Option<DateTime<Utc>>,
}

impl FisioterapiaSessao {
    pub fn pendente(numero: u32) -> Self {
        Self {
            numero,
            data_prevista: None,
            executada: None,
            motivo_nao_execucao: None,
            data_registro_atendimento: None,
        }
    }
}

// --- REGISTRO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FisioterapiaRecord {
    pub id: Uuid,
    pub data_registro: DateTime<Utc>,

    #[schema(example = "123.456.789-00")]
    pub cns_cpf: String,
    #[schema(example = "Paciente Fisio 1")]
    pub nome: String,
    #[schema(example = "Fátima 1")]
    pub ubs_origem: String,
    #[serde(default)]
    pub endereco: String,
    #[serde(default)]
    pub acs: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    #[schema(example = "M54.5")]
    pub cid: String,
    #[serde(default)]
    pub prioridade: PrioridadeClinica,

    pub email_criador: String,
    pub status: FisioterapiaStatus,

    // Campos de Admissão
    #[serde(default)]
    pub quantidade_sessoes: Option<u32>,
    #[serde(default)]
    pub data_admissao: Option<DateTime<Utc>>,
    #[serde(default)]
    pub email_admissor: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
    #[serde(default)]
    pub sessoes: Vec<FisioterapiaSessao>,
}

// Rascunho do formulário "Novo Registro" de fisioterapia.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FisioterapiaDraft {
    #[validate(custom(function = "not_blank", message = "O CNS/CPF é obrigatório."))]
    pub cns_cpf: String,

    #[validate(custom(function = "not_blank", message = "O nome é obrigatório."))]
    pub nome: String,

    // Vazio = unidade do usuário que registra
    #[serde(default)]
    pub ubs_origem: Option<String>,
    #[serde(default)]
    pub endereco: Option<String>,
    #[serde(default)]
    pub acs: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub cid: Option<String>,
    #[serde(default)]
    pub prioridade: Option<PrioridadeClinica>,
}

// Edição dos dados do paciente (não toca status nem sessões).
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FisioterapiaPatch {
    pub cns_cpf: Option<String>,
    pub nome: Option<String>,
    pub ubs_origem: Option<String>,
    pub endereco: Option<String>,
    pub acs: Option<String>,
    pub telefone: Option<String>,
    pub cid: Option<String>,
    pub prioridade: Option<PrioridadeClinica>,
}

/// Teto de sessões por admissão.
pub const MAX_SESSOES: u32 = 100;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdmitPayload {
    #[validate(range(min = 1, max = "MAX_SESSOES", message = "A quantidade de sessões deve estar entre 1 e 100."))]
    #[schema(example = 8, minimum = 1, maximum = 100)]
    pub quantidade_sessoes: u32,
    #[serde(default)]
    pub observacao: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordSessionPayload {
    pub executada: bool,
    #[serde(default)]
    #[schema(example = "Paciente não compareceu")]
    pub motivo_nao_execucao: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObservationPayload {
    pub observacao: String,
}

// Autocomplemento do formulário a partir de um CNS/CPF já cadastrado.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientPrefill {
    pub nome: String,
    pub endereco: String,
    pub acs: String,
    pub telefone: String,
    pub ubs_origem: String,
}

impl From<&FisioterapiaRecord> for PatientPrefill {
    fn from(record: &FisioterapiaRecord) -> Self {
        Self {
            nome: record.nome.clone(),
            endereco: record.endereco.clone(),
            acs: record.acs.clone(),
            telefone: record.telefone.clone(),
            ubs_origem: record.ubs_origem.clone(),
        }
    }
}

// --- CONSULTA ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FisioterapiaFilters {
    pub nome: Option<String>,
    pub cns_cpf: Option<String>,
    pub ubs_origem: Option<String>,
    pub status: Option<FisioterapiaStatus>,
    pub prioridade: Option<PrioridadeClinica>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum FisioterapiaSortKey {
    DataRegistro,
    CnsCpf,
    Nome,
    UbsOrigem,
    EmailAdmissor,
    Prioridade,
    Status,
}

// --- RELATÓRIO ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UbsReferralCount {
    pub ubs: String,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FisioterapiaStats {
    pub total: usize,
    pub aguardando: usize,
    pub admitido: usize,
    pub alta: usize,
    pub sessoes_executadas: usize,
    pub sessoes_faltas: usize,
    // Percentual com uma casa decimal
    #[schema(value_type = f64, example = 80.0)]
    pub taxa_comparecimento: Decimal,
    // Ordenado por total decrescente
    pub encaminhamentos_por_ubs: Vec<UbsReferralCount>,
}
