//! ESC/POS command builder
//!
//! Text is accumulated as UTF-8 together with raw command bytes and is
//! converted to the printer code page by [`EscPosBuilder::build`].

use crate::encoding::{encode_for_printer, pad_text, text_width, truncate_text};

/// Columns on an 80mm roll in Font A
pub const DEFAULT_WIDTH: usize = 45;

/// ESC/POS command builder
///
/// # Example
///
/// ```
/// use thali_printer::EscPosBuilder;
///
/// let mut b = EscPosBuilder::new(45);
/// b.center();
/// b.bold();
/// b.line("Spice Route");
/// b.bold_off();
/// b.left();
/// b.line_lr("Masala Dosa x2", "₹240.00");
/// b.cut_feed(3);
/// let data = b.build();
/// assert!(!data.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct EscPosBuilder {
    buf: Vec<u8>,
    width: usize,
}

impl EscPosBuilder {
    /// Create a builder; emits INIT (`ESC @`)
    pub fn new(width: usize) -> Self {
        let mut buf = Vec::with_capacity(1024);
        buf.extend_from_slice(&[0x1B, 0x40]);
        Self { buf, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    // === Text ===

    pub fn text(&mut self, s: &str) -> &mut Self {
        self.buf.extend_from_slice(s.as_bytes());
        self
    }

    /// Text followed by LF
    pub fn line(&mut self, s: &str) -> &mut Self {
        self.text(s).newline()
    }

    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(b'\n');
        self
    }

    /// Feed `n` lines (`ESC d n`)
    pub fn feed(&mut self, n: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x64, n]);
        self
    }

    // === Alignment ===

    pub fn left(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 0]);
        self
    }

    pub fn center(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 1]);
        self
    }

    pub fn right(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x61, 2]);
        self
    }

    // === Style ===

    pub fn bold(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 1]);
        self
    }

    pub fn bold_off(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x45, 0]);
        self
    }

    /// Double width and height (`GS ! 0x11`)
    pub fn double_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x11]);
        self
    }

    pub fn double_height(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x01]);
        self
    }

    pub fn reset_size(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x21, 0x00]);
        self
    }

    // === Layout ===

    /// Full-width `=` rule
    pub fn sep_double(&mut self) -> &mut Self {
        let rule = "=".repeat(self.width);
        self.line(&rule)
    }

    /// Full-width `-` rule
    pub fn sep_single(&mut self) -> &mut Self {
        let rule = "-".repeat(self.width);
        self.line(&rule)
    }

    /// Left text and right text on one line, padded to width.
    ///
    /// The left side is truncated when both do not fit.
    pub fn line_lr(&mut self, left: &str, right: &str) -> &mut Self {
        let line = layout_lr(left, right, self.width);
        self.line(&line)
    }

    // === Paper ===

    /// Full cut (`GS V 0`)
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x00]);
        self
    }

    /// Feed then partial cut (`GS V 66 n`)
    pub fn cut_feed(&mut self, n: u8) -> &mut Self {
        self.buf.extend_from_slice(&[0x1D, 0x56, 0x42, n]);
        self
    }

    /// Kick the cash drawer on pin 2 (`ESC p 0 25 250`)
    pub fn open_drawer(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&[0x1B, 0x70, 0x00, 0x19, 0xFA]);
        self
    }

    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Bytes ready to send, in the printer code page
    pub fn build(&self) -> Vec<u8> {
        encode_for_printer(&self.buf)
    }

    /// Bytes as accumulated (UTF-8 text, no code page conversion)
    pub fn build_raw(&self) -> Vec<u8> {
        self.buf.clone()
    }
}

impl Default for EscPosBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

/// Compose `left ... right` in exactly `width` columns
pub(crate) fn layout_lr(left: &str, right: &str, width: usize) -> String {
    let right_w = text_width(right);
    if right_w >= width {
        return truncate_text(right, width);
    }
    // Keep at least one space between the two halves
    let left_room = width - right_w - 1;
    let left = pad_text(left, left_room, false);
    format!("{left} {}", truncate_text(right, right_w))
}
