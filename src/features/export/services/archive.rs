//! CSV and ZIP encoding of request exports.

use std::io::{Cursor, Write};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::core::error::{AppError, Result};
use crate::features::requests::models::PurchaseRequestView;

const REQUEST_HEADERS: [&str; 9] = [
    "id",
    "title",
    "amount",
    "status",
    "owner",
    "owner_email",
    "manager",
    "created_at",
    "ai_score",
];

/// Aggregate figures over the exported amounts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportStats {
    pub count: usize,
    pub sum: Decimal,
    pub mean: Decimal,
}

impl ExportStats {
    pub fn from_requests(requests: &[PurchaseRequestView]) -> Self {
        let count = requests.len();
        let sum: Decimal = requests.iter().map(|r| r.request.amount).sum();
        let mean = if count == 0 {
            Decimal::ZERO
        } else {
            (sum / Decimal::from(count)).round_dp(2)
        };

        Self { count, sum, mean }
    }
}

fn csv_err(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Failed to write CSV: {}", e))
}

fn zip_err(e: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("Failed to build archive: {}", e))
}

pub fn requests_csv(requests: &[PurchaseRequestView]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(REQUEST_HEADERS).map_err(csv_err)?;

    for view in requests {
        let r = &view.request;
        writer
            .write_record([
                r.id.to_string(),
                r.title.clone(),
                r.amount.to_string(),
                r.status.to_string(),
                view.owner_name.clone(),
                view.owner_email.clone(),
                view.manager_name.clone(),
                r.created_at.to_rfc3339(),
                r.ai_score.map(|s| s.to_string()).unwrap_or_default(),
            ])
            .map_err(csv_err)?;
    }

    writer.into_inner().map_err(csv_err)
}

pub fn stats_csv(stats: &ExportStats) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["count", "sum", "mean"])
        .map_err(csv_err)?;
    writer
        .write_record([
            stats.count.to_string(),
            stats.sum.to_string(),
            format!("{:.2}", stats.mean),
        ])
        .map_err(csv_err)?;

    writer.into_inner().map_err(csv_err)
}

/// Zip `requests.csv` and `stats.csv` for the given requests
pub fn build_archive(requests: &[PurchaseRequestView]) -> Result<Vec<u8>> {
    let stats = ExportStats::from_requests(requests);
    let files = [
        ("requests.csv", requests_csv(requests)?),
        ("stats.csv", stats_csv(&stats)?),
    ];

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, content) in files {
        zip.start_file(name, options).map_err(zip_err)?;
        zip.write_all(&content).map_err(zip_err)?;
    }

    Ok(zip.finish().map_err(zip_err)?.into_inner())
}

pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("requests-export-{}.zip", at.format("%Y%m%d%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use chrono::TimeZone;
    use uuid::Uuid;

    use crate::features::requests::models::{PurchaseRequest, RequestStatus};

    fn view(title: &str, amount: i64, ai_score: Option<f64>) -> PurchaseRequestView {
        PurchaseRequestView {
            request: PurchaseRequest {
                id: Uuid::now_v7(),
                title: title.to_string(),
                description: String::new(),
                reason: "Needed".to_string(),
                url: "https://shop.example.com/item".to_string(),
                amount: Decimal::from(amount),
                status: RequestStatus::Waiting,
                ai_score,
                ai_score_generated_at: None,
                user_id: Uuid::now_v7(),
                manager_id: Uuid::now_v7(),
                created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
                updated_at: None,
            },
            owner_name: "Ana Lima".to_string(),
            owner_email: "ana@example.com".to_string(),
            manager_name: "Bruno Reis".to_string(),
            manager_email: "bruno@example.com".to_string(),
        }
    }

    #[test]
    fn test_stats_mean_is_rounded() {
        let requests = [view("a", 10, None), view("b", 10, None), view("c", 11, None)];
        let stats = ExportStats::from_requests(&requests);

        assert_eq!(stats.count, 3);
        assert_eq!(stats.sum, Decimal::from(31));
        assert_eq!(stats.mean, Decimal::new(1033, 2));
    }

    #[test]
    fn test_stats_of_empty_export_are_zero() {
        let stats = ExportStats::from_requests(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.sum, Decimal::ZERO);
        assert_eq!(stats.mean, Decimal::ZERO);
    }

    #[test]
    fn test_requests_csv_quotes_and_blank_score() {
        let requests = [view("Desk, standing", 1200, None), view("Mouse", 80, Some(7.5))];
        let text = String::from_utf8(requests_csv(&requests).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "id,title,amount,status,owner,owner_email,manager,created_at,ai_score"
        );
        assert!(lines[1].contains("\"Desk, standing\",1200,waiting,Ana Lima"));
        assert!(lines[1].ends_with("2025-03-01T09:30:00+00:00,"));
        assert!(lines[2].ends_with(",7.5"));
    }

    #[test]
    fn test_archive_contains_both_files() {
        let requests = [view("Chair", 900, Some(4.0))];
        let bytes = build_archive(&requests).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 2);

        let mut stats = String::new();
        archive
            .by_name("stats.csv")
            .unwrap()
            .read_to_string(&mut stats)
            .unwrap();
        assert_eq!(stats, "count,sum,mean\n1,900,900.00\n");

        assert!(archive.by_name("requests.csv").is_ok());
    }

    #[test]
    fn test_file_name_uses_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 5).unwrap();
        assert_eq!(export_file_name(at), "requests-export-20250301093005.zip");
    }
}
