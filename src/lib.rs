// Price List Aggregator - Core Library
// Ingests heterogeneous price list CSVs into one catalog, searches it, exports it as HTML

pub mod catalog;
pub mod columns;
pub mod config;
pub mod detect;
pub mod export;
pub mod ingest;
pub mod search;
pub mod ui;

// Re-export commonly used types
pub use catalog::{Catalog, PriceRecord};
pub use columns::{map_columns, ColumnMap, ColumnRole, ResolvedColumns};
pub use config::{ConfigError, IngestConfig, SynonymSets};
pub use detect::{
    decode, detect_delimiter, detect_format, read_price_file, sniff_encoding,
    DecodedFile, DetectError, Delimiter, FileFormat, SNIFF_LEN,
};
pub use export::{export_html, render_html, HtmlOptions, DEFAULT_OUTPUT};
pub use ingest::{
    parse_number, FileFailure, FileIngest, IngestError, IngestReport, Ingested, Ingestor,
    RowOutcome, SkipReason,
};
pub use search::search;
pub use ui::{run_ui, App, OutputMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
