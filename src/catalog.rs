use serde::Serialize;

/// One normalized row from a price list.
/// Fields are read-only so `unit_price` always matches `price / weight`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    name: String,
    price: f64,
    weight: f64,
    source_file: String,
    unit_price: f64,
}

impl PriceRecord {
    /// Build a record, or `None` when price or weight is not a positive finite number.
    pub fn new(name: String, price: f64, weight: f64, source_file: String) -> Option<Self> {
        if !(price.is_finite() && price > 0.0) {
            return None;
        }
        if !(weight.is_finite() && weight > 0.0) {
            return None;
        }

        let unit_price = price / weight;
        if !unit_price.is_finite() {
            return None;
        }

        Some(PriceRecord {
            name,
            price,
            weight,
            source_file,
            unit_price,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// File name (not full path) the record was read from
    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// Price per unit of weight; the search ranking key
    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    /// Display width of the name in characters
    pub fn name_len(&self) -> usize {
        self.name.chars().count()
    }
}

// ============================================================================
// CATALOG
// ============================================================================

/// Ordered collection of records in file-then-row scan order.
/// Duplicate names across files are kept as separate entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Catalog {
    records: Vec<PriceRecord>,
    #[serde(skip)]
    max_name_length: usize,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: PriceRecord) {
        self.max_name_length = self.max_name_length.max(record.name_len());
        self.records.push(record);
    }

    /// Append every record of `other` after the existing ones
    pub fn extend(&mut self, other: Catalog) {
        self.max_name_length = self.max_name_length.max(other.max_name_length);
        self.records.extend(other.records);
    }

    /// Order-preserving concatenation of two catalogs
    pub fn merge(mut self, other: Catalog) -> Catalog {
        self.extend(other);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    /// Longest record name seen, used for console column padding
    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }
}

impl FromIterator<PriceRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = PriceRecord>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for record in iter {
            catalog.push(record);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a PriceRecord;
    type IntoIter = std::slice::Iter<'a, PriceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
