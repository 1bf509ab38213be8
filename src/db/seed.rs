// src/db/seed.rs
//
// Dados de exemplo usados quando uma coleção ainda não existe.
// Determinísticos: mesma entrada, mesma base.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::models::{
    auth::{Role, User},
    fisioterapia::{FisioterapiaRecord, FisioterapiaSessao, FisioterapiaStatus, PrioridadeClinica},
    regulacao::{AtendimentoTipo, RegulacaoRecord, RegulacaoStatus},
};

const USERS: [(&str, &str, Role, &str); 15] = [
    ("admin@saude.com", "Administrador", Role::Admin, "Admin"),
    ("f1@saude.com", "Equipe Fátima 1", Role::Fatima1, "Unidade Fátima 1"),
    ("f2@saude.com", "Equipe Fátima 2", Role::Fatima2, "Unidade Fátima 2"),
    ("re@saude.com", "Gestor Regulação", Role::Regulacao, "Regulação Central"),
    ("em@saude.com", "Equipe E-mult", Role::Emult, "E-mult"),
    ("s1@saude.com", "Equipe Sede 1", Role::Sede1, "Unidade Sede 1"),
    ("s2@saude.com", "Equipe Sede 2", Role::Sede2, "Unidade Sede 2"),
    ("r1@saude.com", "Equipe Raso 1", Role::Raso1, "Unidade Raso 1"),
    ("r2@saude.com", "Equipe Raso 2", Role::Raso2, "Unidade Raso 2"),
    ("pa@saude.com", "Equipe Paiaiá", Role::Paiaia, "Unidade Paiaiá"),
    ("t1@saude.com", "Equipe Torre 1", Role::Torre1, "Unidade Torre 1"),
    ("t2@saude.com", "Equipe Torre 2", Role::Torre2, "Unidade Torre 2"),
    ("me@saude.com", "Equipe Melancia", Role::Melancia, "Unidade Melancia"),
    ("mo@saude.com", "Equipe Montealegre", Role::Montealegre, "Unidade Montealegre"),
    ("ca@saude.com", "Equipe Candeia", Role::Candeia, "Unidade Candeia"),
];

const ESPECIALIDADES: [&str; 8] = [
    "Cardiologia", "Oftalmologia", "Ortopedia", "Ginecologia",
    "Pediatria", "Dermatologia", "Neurologia", "Urologia",
];
const ACS_REGULACAO: [&str; 5] = ["Carlos Silva", "Ana Paula", "João Santos", "Maria Oliveira", "Roberto Costa"];
const UBS_FISIO: [&str; 8] = ["Fátima 1", "Fátima 2", "Sede 1", "Sede 2", "Raso 1", "Paiaiá", "Torre 1", "Melancia"];
const ACS_FISIO: [&str; 5] = ["Marta", "Ricardo", "Sueli", "Tiago", "Bruna"];

const REGISTROS_POR_USUARIO: u32 = 30;
const REGISTROS_FISIO: u32 = 30;

fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .unwrap_or_default()
}

// CNS/CPF fictício no formato 000.000.000-00
fn fake_cpf(n: u32) -> String {
    let n = n.wrapping_mul(2_654_435_761);
    format!(
        "{:03}.{:03}.{:03}-{:02}",
        100 + n % 899,
        100 + (n / 7) % 899,
        100 + (n / 13) % 899,
        10 + (n / 17) % 89
    )
}

// Senha ausente = "123"
pub fn initial_users() -> Vec<User> {
    USERS
        .iter()
        .enumerate()
        .map(|(idx, (email, name, role, group))| User {
            id: Uuid::from_u128(0x1000 + idx as u128),
            email: email.to_string(),
            name: name.to_string(),
            role: *role,
            group_name: group.to_string(),
            password_hash: None,
        })
        .collect()
}

pub fn initial_regulacao() -> Vec<RegulacaoRecord> {
    let statuses = [RegulacaoStatus::Aguardando, RegulacaoStatus::Agendado, RegulacaoStatus::Devolvido];
    let mut records = Vec::new();

    for (u, user) in initial_users().iter().enumerate() {
        let u = u as u32;
        for i in 1..=REGISTROS_POR_USUARIO {
            let n = u * 100 + i;
            let status = statuses[((i + u) % 3) as usize];
            let role = serde_json::to_value(user.role)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();

            records.push(RegulacaoRecord {
                id: Uuid::from_u128(0x2000_0000 + n as u128),
                data_registro: at(2024, 4, 1 + (i * 7 + u) % 28, 10),
                cns_cpf: fake_cpf(n),
                nome_paciente: format!("Paciente {:02} - {}", i, user.group_name),
                nome_acs: Some(ACS_REGULACAO[(n % 5) as usize].to_string()),
                status,
                atendimento: AtendimentoTipo::Eletivo,
                criado_por: user.name.clone(),
                criado_por_email: user.email.clone(),
                especialidade: Some(ESPECIALIDADES[(n % 8) as usize].to_string()),
                exame_procedimento: Some("Consulta Especializada".to_string()),
                endereco: None,
                telefone: None,
                cid: None,
                tipo: None,
                data_agendamento: match status {
                    RegulacaoStatus::Agendado => NaiveDate::from_ymd_opt(2024, 6, 10 + i % 20),
                    _ => None,
                },
                data_entrega: None,
                observacao: Some(format!("Registro de teste gerado para validação do grupo {role}.")),
                motivo_alteracao: None,
                alterado_por: None,
            });
        }
    }

    records
}

pub fn initial_fisioterapia() -> Vec<FisioterapiaRecord> {
    let statuses = [FisioterapiaStatus::Aguardando, FisioterapiaStatus::Admitido, FisioterapiaStatus::Alta];
    let prioridades = [PrioridadeClinica::Eletivo, PrioridadeClinica::Prioritario, PrioridadeClinica::Urgente];

    (1..=REGISTROS_FISIO)
        .map(|i| {
            let status = statuses[(i % 3) as usize];
            let quantidade = 5 + i % 10;
            let admitido = status != FisioterapiaStatus::Aguardando;

            let sessoes = if admitido {
                (1..=quantidade)
                    .map(|s| {
                        // ~80% executadas
                        let executada = (s + i) % 5 != 0;
                        let resolvida = status == FisioterapiaStatus::Alta || s * 2 < quantidade;
                        FisioterapiaSessao {
                            numero: s,
                            data_prevista: NaiveDate::from_ymd_opt(2024, 5, 1)
                                .map(|d| d + chrono::Days::new(u64::from(s) * 2)),
                            executada: resolvida.then_some(executada),
                            motivo_nao_execucao: (resolvida && !executada)
                                .then(|| "Paciente não compareceu".to_string()),
                            data_registro_atendimento: resolvida
                                .then(|| at(2024, 5, 1, 14) + chrono::Duration::days(i64::from(s) * 2)),
                        }
                    })
                    .collect()
            } else {
                Vec::new()
            };

            FisioterapiaRecord {
                id: Uuid::from_u128(0x3000_0000 + i as u128),
                data_registro: at(2024, 3, i, 9),
                cns_cpf: fake_cpf(10_000 + i),
                nome: format!("Paciente Fisio {i}"),
                ubs_origem: UBS_FISIO[(i % 8) as usize].to_string(),
                endereco: format!("Rua das Flores, nº {}", i * 10),
                acs: ACS_FISIO[(i % 5) as usize].to_string(),
                telefone: format!("(75) 9{:04}-{:04}", 8000 + (i * 37) % 1999, 1000 + (i * 53) % 8999),
                cid: format!("M{}", 40 + i % 20),
                prioridade: prioridades[(i % 3) as usize],
                email_criador: "admin@saude.com".to_string(),
                status,
                quantidade_sessoes: admitido.then_some(quantidade),
                data_admissao: admitido.then(|| at(2024, 4, 1, 0)),
                email_admissor: admitido.then(|| "em@saude.com".to_string()),
                observacao: Some("Paciente com dores crônicas encaminhado via UBS.".to_string()),
                sessoes,
            }
        })
        .collect()
}
