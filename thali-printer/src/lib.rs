//! # thali-printer
//!
//! Receipt printing for thermal printers on the shop LAN.
//!
//! - [`Document`]: printer-independent receipt layout
//! - [`EscPosBuilder`]: ESC/POS command builder
//! - [`NetworkPrinter`]: raw TCP sink (port 9100)
//! - Windows-1252 text conversion (`₹` is printed as `Rs.`)
//!
//! ```no_run
//! use thali_printer::{Document, NetworkPrinter, Printer};
//!
//! # async fn demo() -> thali_printer::PrintResult<()> {
//! let mut doc = Document::default();
//! doc.title("Spice Route").rule().pair("Chai x2", "₹40.00");
//!
//! let printer = NetworkPrinter::new("192.168.1.100", 9100)?;
//! printer.print(&doc.to_escpos()).await?;
//! # Ok(())
//! # }
//! ```

mod document;
mod encoding;
mod error;
mod escpos;
mod printer;

pub use document::{Align, Document, Line};
pub use encoding::{encode_for_printer, pad_text, sanitize_for_printer, text_width, truncate_text};
pub use error::{PrintError, PrintResult};
pub use escpos::{DEFAULT_WIDTH, EscPosBuilder};
pub use printer::{NetworkPrinter, Printer};
