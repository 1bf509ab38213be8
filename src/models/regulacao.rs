// src/models/regulacao.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::not_blank;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegulacaoStatus {
    Aguardando,
    Agendado,
    Devolvido,
}

impl RegulacaoStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RegulacaoStatus::Aguardando => "AGUARDANDO",
            RegulacaoStatus::Agendado => "AGENDADO",
            RegulacaoStatus::Devolvido => "DEVOLVIDO",
        }
    }
}

// Tipo de atendimento (prioridade do encaminhamento)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum AtendimentoTipo {
    #[default]
    Eletivo,
    Prioridade,
    Urgente,
}

impl AtendimentoTipo {
    pub fn as_str(self) -> &'static str {
        match self {
            AtendimentoTipo::Eletivo => "Eletivo",
            AtendimentoTipo::Prioridade => "Prioridade",
            AtendimentoTipo::Urgente => "Urgente",
        }
    }
}

// --- REGISTRO ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegulacaoRecord {
    pub id: Uuid,
    pub data_registro: DateTime<Utc>,

    #[schema(example = "123.456.789-00")]
    pub cns_cpf: String,
    #[schema(example = "Maria Silva Oliveira")]
    pub nome_paciente: String,
    #[serde(rename = "nomeACS", default)]
    pub nome_acs: Option<String>,

    pub status: RegulacaoStatus,
    #[serde(default)]
    pub atendimento: AtendimentoTipo,

    // Quem registrou. Imutável depois da criação.
    pub criado_por: String,
    pub criado_por_email: String,

    #[serde(default)]
    #[schema(example = "Cardiologia")]
    pub especialidade: Option<String>,
    #[serde(default)]
    pub exame_procedimento: Option<String>,
    #[serde(default)]
    pub endereco: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub cid: Option<String>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub data_agendamento: Option<NaiveDate>,
    #[serde(default)]
    pub data_entrega: Option<NaiveDate>,
    #[serde(default)]
    pub observacao: Option<String>,

    // Última alteração (sem histórico)
    #[serde(default)]
    pub motivo_alteracao: Option<String>,
    #[serde(default)]
    pub alterado_por: Option<String>,
}

// Rascunho do formulário "Novo Registro".
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegulacaoDraft {
    #[validate(custom(function = "not_blank", message = "O CNS/CPF é obrigatório."))]
    #[schema(example = "123.456.789-00")]
    pub cns_cpf: String,

    #[validate(custom(function = "not_blank", message = "O nome do paciente é obrigatório."))]
    #[schema(example = "Maria Silva Oliveira")]
    pub nome_paciente: String,

    #[serde(rename = "nomeACS", default)]
    pub nome_acs: Option<String>,
    #[serde(default)]
    pub atendimento: Option<AtendimentoTipo>,
    #[serde(default)]
    pub especialidade: Option<String>,
    #[serde(default)]
    pub exame_procedimento: Option<String>,
    #[serde(default)]
    pub endereco: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub cid: Option<String>,
    #[serde(default)]
    pub tipo: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
}

// Alteração parcial. `None` = campo não tocado.
// Nas datas, `Some(None)` (JSON `null`) apaga o valor gravado.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegulacaoPatch {
    // Campos sensíveis: só ADMIN pode mudar.
    pub cns_cpf: Option<String>,
    pub nome_paciente: Option<String>,

    #[serde(rename = "nomeACS")]
    pub nome_acs: Option<String>,
    pub status: Option<RegulacaoStatus>,
    pub atendimento: Option<AtendimentoTipo>,
    pub especialidade: Option<String>,
    pub exame_procedimento: Option<String>,
    pub endereco: Option<String>,
    pub telefone: Option<String>,
    pub cid: Option<String>,
    pub tipo: Option<String>,
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<NaiveDate>)]
    pub data_agendamento: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "present_or_null")]
    #[schema(value_type = Option<NaiveDate>)]
    pub data_entrega: Option<Option<NaiveDate>>,
    pub observacao: Option<String>,
}

// Campo presente vira `Some`, mesmo quando vem `null`
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Payload de PUT /api/regulacao/{id}
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRegulacaoPayload {
    #[serde(flatten)]
    pub patch: RegulacaoPatch,
    #[schema(example = "Paciente remarcado a pedido da unidade")]
    pub motivo_alteracao: Option<String>,
}

// --- CONSULTA ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegulacaoFilters {
    pub nome: Option<String>,
    pub cns_cpf: Option<String>,
    pub acs: Option<String>,
    pub especialidade: Option<String>,
    pub status: Option<RegulacaoStatus>,
    pub atendimento: Option<AtendimentoTipo>,
    // Nome de quem registrou (match exato)
    pub origem: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum RegulacaoSortKey {
    DataRegistro,
    CnsCpf,
    NomePaciente,
    #[serde(rename = "nomeACS")]
    NomeAcs,
    Especialidade,
    ExameProcedimento,
    Status,
    Atendimento,
    CriadoPor,
    DataAgendamento,
}

// Cards do topo do módulo
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegulacaoStats {
    pub total: usize,
    pub aguardando: usize,
    pub agendado: usize,
    pub devolvido: usize,
}
