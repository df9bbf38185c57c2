use crate::catalog::{Catalog, PriceRecord};

/// Records whose name contains `query` (case-insensitive), cheapest unit price first.
/// Equal unit prices keep catalog order.
pub fn search<'a>(query: &str, catalog: &'a Catalog) -> Vec<&'a PriceRecord> {
    let needle = query.to_lowercase();

    let mut results: Vec<&PriceRecord> = catalog
        .iter()
        .filter(|record| record.name().to_lowercase().contains(&needle))
        .collect();

    // sort_by is stable
    results.sort_by(|a, b| a.unit_price().total_cmp(&b.unit_price()));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(rows: &[(&str, f64, f64)]) -> Catalog {
        rows.iter()
            .map(|(name, price, weight)| {
                PriceRecord::new(name.to_string(), *price, *weight, "price.csv".to_string()).unwrap()
            })
            .collect()
    }

    fn names<'a>(results: &[&'a PriceRecord]) -> Vec<&'a str> {
        results.iter().map(|r| r.name()).collect()
    }

    #[test]
    fn test_search_scenario() {
        let catalog = catalog(&[("Apple", 100.0, 2.0)]);

        let found = search("ap", &catalog);
        assert_eq!(names(&found), vec!["Apple"]);
        assert_eq!(found[0].unit_price(), 50.0);

        assert!(search("xyz", &catalog).is_empty());
    }

    #[test]
    fn test_sorted_by_unit_price() {
        let catalog = catalog(&[
            ("Green apple", 300.0, 1.0),
            ("Apple juice", 100.0, 1.0),
            ("Pineapple", 400.0, 2.0),
            ("Banana", 10.0, 1.0),
        ]);

        let found = search("APPLE", &catalog);
        assert_eq!(names(&found), vec!["Apple juice", "Pineapple", "Green apple"]);
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = catalog(&[
            ("Milk B", 100.0, 1.0),
            ("Milk A", 50.0, 0.5),
            ("Milk C", 10.0, 1.0),
            ("Milk D", 200.0, 2.0),
        ]);

        let found = search("milk", &catalog);
        assert_eq!(names(&found), vec!["Milk C", "Milk B", "Milk A", "Milk D"]);
    }

    #[test]
    fn test_cyrillic_case_insensitive() {
        let catalog = catalog(&[("Сахар ПЕСОК", 90.0, 1.0), ("Соль", 20.0, 1.0)]);
        let found = search("песок", &catalog);
        assert_eq!(names(&found), vec!["Сахар ПЕСОК"]);
    }

    #[test]
    fn test_empty_query_matches_all() {
        let catalog = catalog(&[("B", 2.0, 1.0), ("A", 1.0, 1.0)]);
        assert_eq!(names(&search("", &catalog)), vec!["A", "B"]);
    }

    #[test]
    fn test_results_are_exact_subset() {
        let catalog = catalog(&[
            ("Rice", 80.0, 1.0),
            ("Rice flour", 60.0, 0.5),
            ("Price tag", 1.0, 1.0),
            ("Buckwheat", 120.0, 1.0),
        ]);

        let found = search("rice", &catalog);
        let expected: Vec<&PriceRecord> = catalog
            .iter()
            .filter(|r| r.name().to_lowercase().contains("rice"))
            .collect();

        assert_eq!(found.len(), expected.len());
        assert!(found.windows(2).all(|w| w[0].unit_price() <= w[1].unit_price()));
        assert!(expected.iter().all(|r| found.contains(r)));
    }
}
