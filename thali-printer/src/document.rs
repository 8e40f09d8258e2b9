//! Printer-independent receipt layout
//!
//! A [`Document`] is a list of lines that can be rendered either to ESC/POS
//! bytes for a network printer or to plain text for the browser print
//! fallback. Both renderings share the same column width.

use crate::encoding::{pad_text, sanitize_for_printer, text_width, truncate_text};
use crate::escpos::{DEFAULT_WIDTH, EscPosBuilder, layout_lr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Text {
        text: String,
        align: Align,
        bold: bool,
        large: bool,
    },
    /// Left and right text on one row
    Pair { left: String, right: String, bold: bool },
    /// Full-width rule made of `ch`
    Rule(char),
    Blank,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    width: usize,
    lines: Vec<Line>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl Document {
    pub fn new(width: usize) -> Self {
        Self {
            width,
            lines: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.push_text(text.into(), Align::Left, false, false)
    }

    pub fn centered(&mut self, text: impl Into<String>) -> &mut Self {
        self.push_text(text.into(), Align::Center, false, false)
    }

    pub fn title(&mut self, text: impl Into<String>) -> &mut Self {
        self.push_text(text.into(), Align::Center, true, true)
    }

    pub fn push_text(&mut self, text: String, align: Align, bold: bool, large: bool) -> &mut Self {
        self.lines.push(Line::Text {
            text,
            align,
            bold,
            large,
        });
        self
    }

    pub fn pair(&mut self, left: impl Into<String>, right: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Pair {
            left: left.into(),
            right: right.into(),
            bold: false,
        });
        self
    }

    pub fn pair_bold(&mut self, left: impl Into<String>, right: impl Into<String>) -> &mut Self {
        self.lines.push(Line::Pair {
            left: left.into(),
            right: right.into(),
            bold: true,
        });
        self
    }

    pub fn rule(&mut self) -> &mut Self {
        self.lines.push(Line::Rule('-'));
        self
    }

    pub fn double_rule(&mut self) -> &mut Self {
        self.lines.push(Line::Rule('='));
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(Line::Blank);
        self
    }

    /// ESC/POS bytes, with feed and cut at the end
    pub fn to_escpos(&self) -> Vec<u8> {
        let mut b = EscPosBuilder::new(self.width);
        for line in &self.lines {
            match line {
                Line::Text {
                    text,
                    align,
                    bold,
                    large,
                } => {
                    match align {
                        Align::Left => b.left(),
                        Align::Center => b.center(),
                        Align::Right => b.right(),
                    };
                    if *bold {
                        b.bold();
                    }
                    if *large {
                        b.double_height();
                    }
                    b.line(&truncate_text(text, self.width));
                    if *large {
                        b.reset_size();
                    }
                    if *bold {
                        b.bold_off();
                    }
                }
                Line::Pair { left, right, bold } => {
                    b.left();
                    if *bold {
                        b.bold();
                    }
                    b.line_lr(left, right);
                    if *bold {
                        b.bold_off();
                    }
                }
                Line::Rule('=') => {
                    b.left().sep_double();
                }
                Line::Rule(ch) => {
                    let rule = ch.to_string().repeat(self.width);
                    b.left().line(&rule);
                }
                Line::Blank => {
                    b.newline();
                }
            }
        }
        b.feed(3).cut_feed(0);
        b.build()
    }

    /// Monospace text for the browser print dialog
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            let rendered = match line {
                Line::Text { text, align, .. } => self.align_plain(text, *align),
                Line::Pair { left, right, .. } => layout_lr(left, right, self.width),
                Line::Rule(ch) => ch.to_string().repeat(self.width),
                Line::Blank => String::new(),
            };
            out.push_str(rendered.trim_end());
            out.push('\n');
        }
        out
    }

    fn align_plain(&self, text: &str, align: Align) -> String {
        let clean = sanitize_for_printer(text);
        let w = text_width(&clean);
        if w >= self.width {
            return truncate_text(&clean, self.width);
        }
        match align {
            Align::Left => clean,
            Align::Right => pad_text(&clean, self.width, true),
            Align::Center => {
                let left = (self.width - w) / 2;
                format!("{}{}", " ".repeat(left), clean)
            }
        }
    }
}
