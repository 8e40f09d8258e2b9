//! Receipt print service - sends receipts to the location printer

use std::time::Duration;

use chrono_tz::Tz;
use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, Location};
use shared::order::OrderSnapshot;
use thali_printer::{NetworkPrinter, PrintError, Printer};
use thiserror::Error;

use super::receipt::ReceiptRenderer;
use crate::db::{DbService, RepoError};

#[derive(Debug, Error)]
pub enum PrintServiceError {
    #[error("Database error: {0}")]
    Database(#[from] RepoError),

    #[error("Location not found: {0}")]
    LocationNotFound(i64),
}

pub type PrintServiceResult<T> = Result<T, PrintServiceError>;

impl From<PrintServiceError> for AppError {
    fn from(err: PrintServiceError) -> Self {
        match err {
            PrintServiceError::Database(e) => e.into(),
            PrintServiceError::LocationNotFound(id) => {
                AppError::with_message(ErrorCode::LocationNotFound, format!("Location {} not found", id))
            }
        }
    }
}

/// Outcome of a print request.
///
/// `text` is always the plain-text receipt so the client can fall back to
/// the browser print dialog when `printed` is false.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptPrint {
    pub printed: bool,
    /// `ip:port` of the printer that was tried
    pub printer: Option<String>,
    pub error: Option<String>,
    pub text: String,
}

#[derive(Clone)]
pub struct PrintService {
    db: DbService,
    timezone: Tz,
    timeout: Duration,
}

impl PrintService {
    pub fn new(db: DbService, timezone: Tz, timeout: Duration) -> Self {
        Self {
            db,
            timezone,
            timeout,
        }
    }

    /// Render the receipt and send it to the order's location printer.
    ///
    /// Printer failures are reported in the result, never as an error.
    pub async fn print_receipt(&self, order: &OrderSnapshot) -> PrintServiceResult<ReceiptPrint> {
        let location: Location = self
            .db
            .get(order.location_id)?
            .ok_or(PrintServiceError::LocationNotFound(order.location_id))?;

        let mut table_numbers = Vec::with_capacity(order.table_ids.len());
        for id in &order.table_ids {
            let number = self
                .db
                .get::<DiningTable>(*id)?
                .map(|t| t.number)
                .unwrap_or_else(|| id.to_string());
            table_numbers.push(number);
        }

        let doc = ReceiptRenderer::new(&location, self.timezone).render(order, &table_numbers);
        let text = doc.to_plain_text();

        let Some(ip) = location.printer_ip.as_deref().filter(|ip| !ip.trim().is_empty()) else {
            return Ok(ReceiptPrint {
                printed: false,
                printer: None,
                error: Some(ErrorCode::PrinterNotAvailable.message().to_string()),
                text,
            });
        };

        let result = async {
            let printer = NetworkPrinter::new(ip, location.printer_port)?.with_timeout(self.timeout);
            printer.print(&doc.to_escpos()).await
        }
        .await;

        let printer = Some(format!("{}:{}", ip, location.printer_port));
        match result {
            Ok(()) => {
                tracing::info!(
                    order_id = %order.order_id,
                    order_number = %order.order_number,
                    printer = ?printer,
                    "Receipt printed"
                );
                Ok(ReceiptPrint {
                    printed: true,
                    printer,
                    error: None,
                    text,
                })
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %order.order_id,
                    printer = ?printer,
                    error = %e,
                    "Receipt print failed, returning text fallback"
                );
                Ok(ReceiptPrint {
                    printed: false,
                    printer,
                    error: Some(describe(&e)),
                    text,
                })
            }
        }
    }
}

fn describe(err: &PrintError) -> String {
    match err {
        PrintError::Timeout(_) => "Printer did not respond".to_string(),
        PrintError::InvalidConfig(msg) => format!("Printer misconfigured: {}", msg),
        other => other.to_string(),
    }
}
