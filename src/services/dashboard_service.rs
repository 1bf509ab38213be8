// src/services/dashboard_service.rs
//
// Agregações dos cards e relatórios. Sempre derivadas, nunca gravadas.

use std::collections::HashMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::{
    fisioterapia::{FisioterapiaRecord, FisioterapiaStats, FisioterapiaStatus, UbsReferralCount},
    regulacao::{RegulacaoRecord, RegulacaoStats, RegulacaoStatus},
};

/// Contagem por status sobre o recorte já filtrado por visibilidade.
pub fn regulacao_stats(records: &[RegulacaoRecord]) -> RegulacaoStats {
    records.iter().fold(
        RegulacaoStats { total: records.len(), ..Default::default() },
        |mut stats, r| {
            match r.status {
                RegulacaoStatus::Aguardando => stats.aguardando += 1,
                RegulacaoStatus::Agendado => stats.agendado += 1,
                RegulacaoStatus::Devolvido => stats.devolvido += 1,
            }
            stats
        },
    )
}

/// executadas / max(executadas + faltas, 1) * 100, com uma casa decimal.
pub fn attendance_rate(executadas: usize, faltas: usize) -> Decimal {
    let resolvidas = (executadas + faltas).max(1);
    (Decimal::from(executadas) * Decimal::ONE_HUNDRED / Decimal::from(resolvidas))
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

pub fn fisioterapia_stats(records: &[FisioterapiaRecord]) -> FisioterapiaStats {
    let (mut aguardando, mut admitido, mut alta) = (0, 0, 0);
    let (mut executadas, mut faltas) = (0, 0);
    let mut por_ubs: HashMap<&str, usize> = HashMap::new();

    for record in records {
        match record.status {
            FisioterapiaStatus::Aguardando => aguardando += 1,
            FisioterapiaStatus::Admitido => admitido += 1,
            FisioterapiaStatus::Alta => alta += 1,
        }
        for sessao in &record.sessoes {
            match sessao.executada {
                Some(true) => executadas += 1,
                Some(false) => faltas += 1,
                None => {}
            }
        }
        *por_ubs.entry(record.ubs_origem.as_str()).or_default() += 1;
    }

    let mut encaminhamentos_por_ubs: Vec<UbsReferralCount> = por_ubs
        .into_iter()
        .map(|(ubs, total)| UbsReferralCount { ubs: ubs.to_string(), total })
        .collect();
    // Maior volume primeiro; empate pelo nome da unidade
    encaminhamentos_por_ubs.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.ubs.cmp(&b.ubs)));

    FisioterapiaStats {
        total: records.len(),
        aguardando,
        admitido,
        alta,
        sessoes_executadas: executadas,
        sessoes_faltas: faltas,
        taxa_comparecimento: attendance_rate(executadas, faltas),
        encaminhamentos_por_ubs,
    }
}
