// src/models/query.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

// Ordenação por uma única chave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + PartialEq> SortConfig<K> {
    pub fn asc(key: K) -> Self {
        Self { key, direction: SortDirection::Asc }
    }

    /// Clique no cabeçalho: mesma chave em ordem crescente inverte para
    /// decrescente; qualquer outro caso recomeça em crescente.
    pub fn toggle(previous: Option<SortConfig<K>>, key: K) -> Self {
        let direction = match previous {
            Some(prev) if prev.key == key && prev.direction == SortDirection::Asc => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Self { key, direction }
    }
}

/// Opções de "Exibir: N pacientes".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageSize {
    #[default]
    Ten,
    Thirty,
    Fifty,
}

impl PageSize {
    pub fn get(self) -> usize {
        match self {
            PageSize::Ten => 10,
            PageSize::Thirty => 30,
            PageSize::Fifty => 50,
        }
    }
}

impl TryFrom<u32> for PageSize {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            10 => Ok(PageSize::Ten),
            30 => Ok(PageSize::Thirty),
            50 => Ok(PageSize::Fifty),
            other => Err(other),
        }
    }
}

// Página de resultados (1-indexada).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}
