// Console front end: prompt loop and fixed-width result table

use crate::catalog::{Catalog, PriceRecord};
use crate::export::format_number;
use crate::search::search;
use anyhow::Result;
use std::io::{BufRead, Write};

pub const PROMPT: &str = "Enter search text (or 'exit' to quit): ";
pub const NOTHING_FOUND: &str = "Nothing found.";
pub const FAREWELL: &str = "Done.";

/// How search results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Table,
    Json,
}

pub struct App<'a> {
    pub catalog: &'a Catalog,
    pub mode: OutputMode,
}

impl<'a> App<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            mode: OutputMode::Table,
        }
    }

    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    /// Search and format the results for printing
    pub fn answer(&self, query: &str) -> Result<String> {
        let results = search(query, self.catalog);

        match self.mode {
            OutputMode::Json => Ok(serde_json::to_string_pretty(&results)?),
            OutputMode::Table if results.is_empty() => Ok(NOTHING_FOUND.to_string()),
            OutputMode::Table => Ok(render_table(&results, self.catalog.max_name_length())),
        }
    }
}

/// `exit` in any case, surrounding whitespace ignored
pub fn is_exit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("exit")
}

/// Results table; the name column is `max_name_length + 2` characters wide.
pub fn render_table(results: &[&PriceRecord], max_name_length: usize) -> String {
    let name_width = max_name_length + 2;
    let mut out = String::new();

    out.push_str(&format!(
        "\n{:<4}{:<name_width$}{:<8}{:<8}{:<20}{:<10}\n",
        "№", "Name", "Price", "Weight", "File", "Price per kg"
    ));

    for (idx, record) in results.iter().enumerate() {
        out.push_str(&format!(
            "{:<4}{:<name_width$}{:<8}{:<8}{:<20}{:<10.2}\n",
            idx + 1,
            record.name(),
            format_number(record.price()),
            format_number(record.weight()),
            record.source_file(),
            record.unit_price(),
        ));
    }

    out
}

/// Prompt loop: one query per line until `exit` or end of input.
pub fn run_ui<R: BufRead, W: Write>(app: &App<'_>, mut input: R, mut output: W) -> Result<()> {
    let mut line = String::new();

    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 || is_exit(&line) {
            writeln!(output, "{}", FAREWELL)?;
            break;
        }

        let query = line.trim_end_matches(&['\r', '\n'][..]);
        writeln!(output, "{}", app.answer(query)?)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        vec![
            PriceRecord::new("Apple".into(), 100.0, 2.0, "price_fruit.csv".into()).unwrap(),
            PriceRecord::new("Pineapple".into(), 300.0, 2.0, "price_fruit.csv".into()).unwrap(),
            PriceRecord::new("Green apple".into(), 60.0, 2.0, "price_b.csv".into()).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    fn run(catalog: &Catalog, input: &str) -> String {
        let mut output = Vec::new();
        run_ui(&App::new(catalog), input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_is_exit() {
        assert!(is_exit("exit\n"));
        assert!(is_exit("  EXIT "));
        assert!(is_exit("Exit\r\n"));
        assert!(!is_exit("exit now"));
    }

    #[test]
    fn test_table_layout() {
        let catalog = catalog();
        let results = search("apple", &catalog);
        let table = render_table(&results, catalog.max_name_length());
        let lines: Vec<&str> = table.lines().collect();

        // Blank line, header, three rows
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("№   Name"));
        assert_eq!(
            lines[2],
            "1   Green apple  60.0    2.0     price_b.csv         30.00     "
        );
        assert!(lines[3].starts_with("2   Apple        100.0   2.0     price_fruit.csv     50.00"));
        assert!(lines[4].starts_with("3   Pineapple    300.0"));
    }

    #[test]
    fn test_name_padding_counts_chars() {
        let record = PriceRecord::new("Чай".into(), 10.0, 1.0, "p.csv".into()).unwrap();
        let table = render_table(&[&record], 5);
        let row = table.lines().nth(2).unwrap();
        assert!(row.starts_with("1   Чай    10.0"));
    }

    #[test]
    fn test_session_until_exit() {
        let catalog = catalog();
        let out = run(&catalog, "pine\nxyz\nEXIT\nApple\n");

        assert_eq!(out.matches(PROMPT).count(), 3);
        assert!(out.contains("Pineapple"));
        assert!(out.contains(NOTHING_FOUND));
        assert!(out.trim_end().ends_with(FAREWELL));
        assert!(!out.contains("Green apple"));
    }

    #[test]
    fn test_session_ends_at_eof() {
        let catalog = catalog();
        let out = run(&catalog, "apple");

        assert!(out.contains("Green apple"));
        assert!(out.trim_end().ends_with(FAREWELL));
    }

    #[test]
    fn test_json_mode() {
        let catalog = catalog();
        let app = App::new(&catalog).with_mode(OutputMode::Json);
        let json = app.answer("pine").unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "Pineapple");
        assert_eq!(value[0]["unit_price"], 150.0);

        assert_eq!(app.answer("xyz").unwrap(), "[]");
    }
}
