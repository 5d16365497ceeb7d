//! CSV options

/// How worksheet files are parsed and written
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Quote character (default: double quote)
    pub quote: u8,
    /// Line terminator used when rewriting a file
    pub line_terminator: LineTerminator,
    /// File extension of worksheet files, without the dot
    pub extension: String,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            line_terminator: LineTerminator::LF,
            extension: "csv".to_string(),
        }
    }
}

impl CsvOptions {
    /// Use tab-separated files with the `tsv` extension
    pub fn tsv() -> Self {
        Self {
            delimiter: b'\t',
            extension: "tsv".to_string(),
            ..Default::default()
        }
    }
}

/// Line terminator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// Unix-style (LF)
    LF,
    /// Windows-style (CRLF)
    CRLF,
}

impl LineTerminator {
    pub(crate) fn to_csv(self) -> csv::Terminator {
        match self {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        }
    }
}
