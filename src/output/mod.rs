mod console;
mod export;

pub use console::ConsoleReporter;
pub use export::{csv_row, from_json_str, read_json, to_json_string, write_csv, write_json, ExportFormat};
