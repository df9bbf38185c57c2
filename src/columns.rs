// Header → column index resolution

use crate::config::SynonymSets;
use std::fmt;

/// Semantic role of a CSV column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Name,
    Price,
    Weight,
}

impl ColumnRole {
    /// Fixed matching order: a header claimed by an earlier role is not offered to later ones
    pub const ALL: [ColumnRole; 3] = [ColumnRole::Name, ColumnRole::Price, ColumnRole::Weight];

    pub fn label(&self) -> &'static str {
        match self {
            ColumnRole::Name => "name",
            ColumnRole::Price => "price",
            ColumnRole::Weight => "weight",
        }
    }
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Column indices found in one header row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub name: Option<usize>,
    pub price: Option<usize>,
    pub weight: Option<usize>,
}

/// All three required columns, ready for row extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub name: usize,
    pub price: usize,
    pub weight: usize,
}

impl ResolvedColumns {
    /// Minimum row length that covers every required column
    pub fn min_row_len(&self) -> usize {
        self.name.max(self.price).max(self.weight) + 1
    }
}

impl ColumnMap {
    fn slot(&mut self, role: ColumnRole) -> &mut Option<usize> {
        match role {
            ColumnRole::Name => &mut self.name,
            ColumnRole::Price => &mut self.price,
            ColumnRole::Weight => &mut self.weight,
        }
    }

    pub fn get(&self, role: ColumnRole) -> Option<usize> {
        match role {
            ColumnRole::Name => self.name,
            ColumnRole::Price => self.price,
            ColumnRole::Weight => self.weight,
        }
    }

    /// Roles no header matched
    pub fn missing(&self) -> Vec<ColumnRole> {
        ColumnRole::ALL
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    pub fn resolve(&self) -> Option<ResolvedColumns> {
        Some(ResolvedColumns {
            name: self.name?,
            price: self.price?,
            weight: self.weight?,
        })
    }
}

/// Map header cells to column roles.
///
/// First match wins: each header takes the first role it matches, and a role
/// already bound to an earlier column keeps that column.
pub fn map_columns<'a, I>(headers: I, synonyms: &SynonymSets) -> ColumnMap
where
    I: IntoIterator<Item = &'a str>,
{
    let mut map = ColumnMap::default();

    for (index, header) in headers.into_iter().enumerate() {
        let role = ColumnRole::ALL
            .into_iter()
            .find(|role| synonyms.matches(*role, header));

        if let Some(role) = role {
            let slot = map.slot(role);
            if slot.is_none() {
                *slot = Some(index);
            }
        }
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_english_headers() {
        let map = map_columns(["name", "price", "weight"], &SynonymSets::default());
        assert_eq!(
            map.resolve(),
            Some(ResolvedColumns { name: 0, price: 1, weight: 2 })
        );
    }

    #[test]
    fn test_map_russian_headers_any_order() {
        let headers = ["Фасовка", " Цена ", "Артикул", "Наименование"];
        let map = map_columns(headers, &SynonymSets::default());

        assert_eq!(map.name, Some(3));
        assert_eq!(map.price, Some(1));
        assert_eq!(map.weight, Some(0));
    }

    #[test]
    fn test_first_column_wins() {
        let headers = ["product", "price", "retail", "weight", "title"];
        let map = map_columns(headers, &SynonymSets::default());

        assert_eq!(map.name, Some(0));
        assert_eq!(map.price, Some(1));
        assert_eq!(map.weight, Some(3));
    }

    #[test]
    fn test_missing_column_unresolved() {
        let map = map_columns(["name", "price", "unit"], &SynonymSets::default());

        assert!(map.resolve().is_none());
        assert_eq!(map.missing(), vec![ColumnRole::Weight]);
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let map = map_columns(["product name", "price, rub", "weight"], &SynonymSets::default());
        assert_eq!(map.name, None);
        assert_eq!(map.price, None);
    }

    #[test]
    fn test_min_row_len() {
        let cols = ResolvedColumns { name: 4, price: 1, weight: 2 };
        assert_eq!(cols.min_row_len(), 5);
    }
}
