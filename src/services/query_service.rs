// src/services/query_service.rs

use crate::common::{error::AppError, validation::validation_error};
use crate::models::query::{Page, PageSize, SortConfig, SortDirection};

/// Valor textual de um campo usado na ordenação da tabela.
/// Campos ausentes devolvem string vazia.
pub trait SortField<K> {
    fn sort_text(&self, key: K) -> String;
}

/// Parâmetros de uma consulta: ordenação opcional + página.
#[derive(Debug, Clone, Copy)]
pub struct QueryParams<K> {
    pub sort: Option<SortConfig<K>>,
    pub page: usize,
    pub page_size: PageSize,
}

impl<K> Default for QueryParams<K> {
    fn default() -> Self {
        Self { sort: None, page: 1, page_size: PageSize::default() }
    }
}

impl<K> QueryParams<K> {
    /// Monta os parâmetros a partir da query string. Tamanho de página
    /// fora de {10, 30, 50} é erro de validação.
    pub fn from_request(
        sort_by: Option<K>,
        sort_dir: Option<SortDirection>,
        page: Option<usize>,
        page_size: Option<u32>,
    ) -> Result<Self, AppError> {
        let page_size = match page_size {
            None => PageSize::default(),
            Some(n) => PageSize::try_from(n)
                .map_err(|_| validation_error("pageSize", "Tamanho de página deve ser 10, 30 ou 50."))?,
        };

        Ok(Self {
            sort: sort_by.map(|key| SortConfig { key, direction: sort_dir.unwrap_or_default() }),
            page: page.unwrap_or(1),
            page_size,
        })
    }
}

// Filtro de texto: substring sem diferenciar maiúsculas. Filtro vazio passa tudo.
pub fn contains_ci(value: Option<&str>, filter: Option<&str>) -> bool {
    match filter.map(str::trim) {
        None | Some("") => true,
        Some(needle) => value
            .unwrap_or("")
            .to_lowercase()
            .contains(&needle.to_lowercase()),
    }
}

// Filtro de enum: igualdade exata quando ativo.
pub fn matches_exact<T: PartialEq>(value: &T, filter: Option<&T>) -> bool {
    filter.is_none_or(|wanted| value == wanted)
}

/// Ordenação estável por uma chave. Sem chave mantém a ordem da coleção.
/// Em ordem decrescente os empates continuam na ordem original.
pub fn sort_records<T, K>(records: Vec<T>, sort: Option<SortConfig<K>>) -> Vec<T>
where
    T: SortField<K>,
    K: Copy,
{
    let Some(config) = sort else {
        return records;
    };

    let mut keyed: Vec<(String, T)> = records
        .into_iter()
        .map(|r| (r.sort_text(config.key).to_lowercase(), r))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match config.direction {
        SortDirection::Asc => a.cmp(b),
        SortDirection::Desc => b.cmp(a),
    });

    keyed.into_iter().map(|(_, r)| r).collect()
}

/// Recorta a página `page` (1-indexada). Página fora do intervalo volta vazia.
pub fn paginate<T>(records: Vec<T>, page: usize, page_size: PageSize) -> Page<T> {
    let size = page_size.get();
    let total = records.len();
    let total_pages = total.div_ceil(size);

    let items = if page == 0 {
        Vec::new()
    } else {
        records
            .into_iter()
            .skip((page - 1).saturating_mul(size))
            .take(size)
            .collect()
    };

    Page { items, total, page, page_size: size, total_pages }
}

/// Filtra (AND de todos os filtros ativos, via `predicate`) e ordena.
pub fn filter_and_sort<T, K, P>(records: Vec<T>, predicate: P, sort: Option<SortConfig<K>>) -> Vec<T>
where
    T: SortField<K>,
    K: Copy,
    P: Fn(&T) -> bool,
{
    let filtered: Vec<T> = records.into_iter().filter(|r| predicate(r)).collect();
    sort_records(filtered, sort)
}

pub fn query<T, K, P>(records: Vec<T>, predicate: P, params: QueryParams<K>) -> Page<T>
where
    T: SortField<K>,
    K: Copy,
    P: Fn(&T) -> bool,
{
    let processed = filter_and_sort(records, predicate, params.sort);
    paginate(processed, params.page, params.page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        nome: &'static str,
        acs: Option<&'static str>,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Key {
        Nome,
        Acs,
    }

    impl SortField<Key> for Row {
        fn sort_text(&self, key: Key) -> String {
            match key {
                Key::Nome => self.nome.to_string(),
                Key::Acs => self.acs.unwrap_or_default().to_string(),
            }
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, nome: "carla", acs: Some("Marta") },
            Row { id: 2, nome: "Ana", acs: None },
            Row { id: 3, nome: "bruno", acs: Some("ricardo") },
            Row { id: 4, nome: "ana", acs: Some("Sueli") },
            Row { id: 5, nome: "Daniel", acs: Some("bruna") },
        ]
    }

    fn ids(rows: &[Row]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn no_sort_key_keeps_collection_order() {
        assert_eq!(ids(&sort_records(rows(), None::<SortConfig<Key>>)), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sort_is_case_insensitive_and_stable() {
        let asc = sort_records(rows(), Some(SortConfig::asc(Key::Nome)));
        // "Ana"(2) e "ana"(4) empatam e mantêm a ordem original
        assert_eq!(ids(&asc), vec![2, 4, 3, 1, 5]);

        let toggled = SortConfig::toggle(Some(SortConfig::asc(Key::Nome)), Key::Nome);
        assert_eq!(toggled.direction, SortDirection::Desc);
        let desc = sort_records(rows(), Some(toggled));
        assert_eq!(ids(&desc), vec![5, 1, 3, 2, 4]);
    }

    #[test]
    fn toggle_reverses_distinct_values_exactly() {
        let data: Vec<Row> = rows().into_iter().filter(|r| r.id != 4).collect();
        let asc = sort_records(data.clone(), Some(SortConfig::asc(Key::Nome)));
        let desc = sort_records(data, Some(SortConfig::toggle(Some(SortConfig::asc(Key::Nome)), Key::Nome)));
        let mut reversed = ids(&asc);
        reversed.reverse();
        assert_eq!(ids(&desc), reversed);
    }

    #[test]
    fn toggle_on_new_key_starts_ascending() {
        let prev = Some(SortConfig { key: Key::Nome, direction: SortDirection::Asc });
        assert_eq!(SortConfig::toggle(prev, Key::Acs).direction, SortDirection::Asc);
        let prev_desc = Some(SortConfig { key: Key::Nome, direction: SortDirection::Desc });
        assert_eq!(SortConfig::toggle(prev_desc, Key::Nome).direction, SortDirection::Asc);
        assert_eq!(SortConfig::toggle(None, Key::Nome).direction, SortDirection::Asc);
    }

    #[test]
    fn missing_values_sort_as_empty() {
        let asc = sort_records(rows(), Some(SortConfig::asc(Key::Acs)));
        assert_eq!(asc[0].id, 2);
    }

    #[test]
    fn text_filters_are_case_insensitive_substrings() {
        assert!(contains_ci(Some("Paciente 01 - Unidade Sede 1"), Some("sede")));
        assert!(contains_ci(None, None));
        assert!(contains_ci(None, Some("")));
        assert!(!contains_ci(None, Some("x")));
        assert!(matches_exact(&3, None));
        assert!(!matches_exact(&3, Some(&4)));
    }

    #[test]
    fn pagination_is_one_indexed_and_tolerates_out_of_range() {
        let data: Vec<u32> = (1..=23).collect();
        let p1 = paginate(data.clone(), 1, PageSize::Ten);
        assert_eq!(p1.items, (1..=10).collect::<Vec<_>>());
        assert_eq!(p1.total, 23);
        assert_eq!(p1.total_pages, 3);

        let p3 = paginate(data.clone(), 3, PageSize::Ten);
        assert_eq!(p3.items, vec![21, 22, 23]);

        assert!(paginate(data.clone(), 4, PageSize::Ten).items.is_empty());
        assert!(paginate(data, 0, PageSize::Ten).items.is_empty());
    }

    #[test]
    fn query_combines_filters_with_and() {
        let page = query(
            rows(),
            |r: &Row| contains_ci(Some(r.nome), Some("an")) && contains_ci(r.acs, Some("su")),
            QueryParams::<Key> { sort: None, page: 1, page_size: PageSize::Ten },
        );
        assert_eq!(ids(&page.items), vec![4]);
        assert_eq!(page.total, 1);
    }

    #[test]
    fn request_params_default_and_reject_odd_page_sizes() {
        let params = QueryParams::<Key>::from_request(Some(Key::Acs), None, None, None).unwrap();
        assert_eq!(params.sort, Some(SortConfig::asc(Key::Acs)));
        assert_eq!(params.page, 1);
        assert_eq!(params.page_size, PageSize::Ten);

        let params = QueryParams::<Key>::from_request(None, Some(SortDirection::Desc), Some(3), Some(50)).unwrap();
        assert!(params.sort.is_none());
        assert_eq!(params.page_size, PageSize::Fifty);

        assert!(QueryParams::<Key>::from_request(None, None, None, Some(25)).is_err());
    }

    #[test]
    fn page_size_accepts_only_known_options() {
        assert_eq!(PageSize::try_from(30), Ok(PageSize::Thirty));
        assert_eq!(PageSize::try_from(20), Err(20));
    }
}
