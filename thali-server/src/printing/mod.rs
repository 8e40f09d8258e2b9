//! Receipt printing
//!
//! Receipts are rendered to a 45-column [`thali_printer::Document`] and sent
//! as ESC/POS to the location's network printer. The plain-text rendering is
//! returned in every case for the browser print fallback.

pub mod receipt;
pub mod service;

pub use receipt::ReceiptRenderer;
pub use service::{PrintService, PrintServiceError, PrintServiceResult, ReceiptPrint};
