// HTML export of the full catalog

use crate::catalog::{Catalog, PriceRecord};
use anyhow::{Context, Result};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::path::Path;

/// Default export file, relative to the working directory
pub const DEFAULT_OUTPUT: &str = "output.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Escape `& < > " '` in names and file names.
    /// Turning this off interpolates cell text verbatim.
    pub escape: bool,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        HtmlOptions { escape: true }
    }
}

/// Shortest round-trip form, always with a fractional part (100.0, 2.5).
/// Very large or small magnitudes switch to Rust's exponent form with no
/// sign padding or zero padding: 1e16, 1e-5.
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(|c: char| matches!(c, '&' | '<' | '>' | '"' | '\'')) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Render every catalog record as one table row, in catalog order.
pub fn render_html(catalog: &Catalog, options: HtmlOptions) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>Product positions</title>\n\
         </head>\n\
         <body>\n\
         <table border=\"1\">\n\
         <tr>\n\
         <th>№</th>\n\
         <th>Name</th>\n\
         <th>Price</th>\n\
         <th>Weight</th>\n\
         <th>File</th>\n\
         <th>Price per kg</th>\n\
         </tr>\n",
    );

    for (idx, record) in catalog.iter().enumerate() {
        write_row(&mut html, idx + 1, record, options);
    }

    html.push_str("</table>\n</body>\n</html>\n");
    html
}

fn write_row(html: &mut String, index: usize, record: &PriceRecord, options: HtmlOptions) {
    let cell = |text: &str| -> String {
        if options.escape {
            escape_html(text).into_owned()
        } else {
            text.to_string()
        }
    };

    // Writing into a String cannot fail
    let _ = write!(
        html,
        "<tr>\n\
         <td>{}</td>\n\
         <td>{}</td>\n\
         <td>{}</td>\n\
         <td>{}</td>\n\
         <td>{}</td>\n\
         <td>{:.2}</td>\n\
         </tr>\n",
        index,
        cell(record.name()),
        format_number(record.price()),
        format_number(record.weight()),
        cell(record.source_file()),
        record.unit_price(),
    );
}

/// Write the catalog to `path` as UTF-8 HTML, replacing any existing file.
pub fn export_html(catalog: &Catalog, path: &Path, options: HtmlOptions) -> Result<()> {
    let html = render_html(catalog, options);
    std::fs::write(path, html)
        .with_context(|| format!("Failed to write HTML export: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, price: f64, weight: f64, file: &str) -> PriceRecord {
        PriceRecord::new(name.to_string(), price, weight, file.to_string()).unwrap()
    }

    fn sample() -> Catalog {
        vec![
            record("Apple", 100.0, 2.0, "price_fruit.csv"),
            record("Melon", 90.0, 3.0, "price_fruit.csv"),
            record("Nuts", 250.0, 0.3, "price_nuts.csv"),
        ]
        .into_iter()
        .collect()
    }

    fn data_rows(html: &str) -> usize {
        html.matches("<tr>").count() - 1
    }

    #[test]
    fn test_one_row_per_record() {
        let html = render_html(&sample(), HtmlOptions::default());
        assert_eq!(data_rows(&html), 3);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<meta charset=\"utf-8\">"));
    }

    #[test]
    fn test_row_cells() {
        let html = render_html(&sample(), HtmlOptions::default());

        assert!(html.contains(
            "<td>1</td>\n<td>Apple</td>\n<td>100.0</td>\n<td>2.0</td>\n<td>price_fruit.csv</td>\n<td>50.00</td>"
        ));
        assert!(html.contains("<td>2</td>\n<td>Melon</td>\n<td>90.0</td>\n<td>3.0</td>"));
        assert!(html.contains("<td>30.00</td>"));
        assert!(html.contains("<td>833.33</td>"));
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(100.0), "100.0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.93), "0.93");
        assert_eq!(format_number(1e16), "1e16");
        assert_eq!(format_number(0.00001), "1e-5");
    }

    #[test]
    fn test_unit_price_two_decimals() {
        let catalog: Catalog = vec![record("Salt", 3.0, 1.0, "price.csv")].into_iter().collect();
        let html = render_html(&catalog, HtmlOptions::default());
        assert!(html.contains("<td>3.00</td>"));
    }

    #[test]
    fn test_empty_catalog_has_header_only() {
        let html = render_html(&Catalog::new(), HtmlOptions::default());
        assert_eq!(data_rows(&html), 0);
        assert!(html.contains("<th>Price per kg</th>"));
    }

    #[test]
    fn test_escapes_by_default() {
        let catalog: Catalog = vec![record("<b>Tea & \"Coffee\"</b>", 10.0, 1.0, "price'.csv")]
            .into_iter()
            .collect();

        let html = render_html(&catalog, HtmlOptions::default());
        assert!(html.contains("<td>&lt;b&gt;Tea &amp; &quot;Coffee&quot;&lt;/b&gt;</td>"));
        assert!(html.contains("<td>price&#39;.csv</td>"));

        let raw = render_html(&catalog, HtmlOptions { escape: false });
        assert!(raw.contains("<td><b>Tea & \"Coffee\"</b></td>"));
    }

    #[test]
    fn test_export_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_OUTPUT);
        std::fs::write(&path, "stale").unwrap();

        export_html(&sample(), &path, HtmlOptions::default()).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("stale"));
        assert_eq!(data_rows(&written), 3);
    }

    #[test]
    fn test_export_to_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.html");

        let result = export_html(&sample(), &path, HtmlOptions::default());
        assert!(result.is_err());
    }
}
