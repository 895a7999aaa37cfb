pub mod archive;

pub use archive::{build_archive, export_file_name, requests_csv, stats_csv, ExportStats};
