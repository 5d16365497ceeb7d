//! Cell address type

use std::fmt;

use crate::error::{TransportError, TransportResult};

/// A cell location inside a worksheet
///
/// Rows and columns are 0-based internally; [`fmt::Display`] renders the
/// familiar A1 notation (`CellAddress::new(0, 0)` is `A1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u16,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Create an address from unbounded indices
    ///
    /// Fails when the row does not fit in `u32` or the column in `u16`.
    pub fn from_indices(row: usize, col: usize) -> TransportResult<Self> {
        let row = u32::try_from(row).map_err(|_| TransportError::RowOutOfBounds(row))?;
        let col = u16::try_from(col).map_err(|_| TransportError::ColumnOutOfBounds(col))?;
        Ok(Self::new(row, col))
    }

    /// 1-based row number as shown in a spreadsheet UI
    pub fn row_number(&self) -> u32 {
        self.row + 1
    }

    /// 1-based column number
    pub fn col_number(&self) -> u32 {
        self.col as u32 + 1
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            Self::column_to_letters(self.col),
            self.row_number()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
    }

    #[test]
    fn test_display_is_one_based() {
        assert_eq!(CellAddress::new(0, 0).to_string(), "A1");
        assert_eq!(CellAddress::new(3, 2).to_string(), "C4");
        assert_eq!(CellAddress::new(3, 2).row_number(), 4);
        assert_eq!(CellAddress::new(3, 2).col_number(), 3);
    }

    #[test]
    fn test_from_indices_checks_limits() {
        assert_eq!(CellAddress::from_indices(3, 2).unwrap(), CellAddress::new(3, 2));
        assert!(matches!(
            CellAddress::from_indices(u32::MAX as usize + 1, 0),
            Err(TransportError::RowOutOfBounds(_))
        ));
        assert!(matches!(
            CellAddress::from_indices(0, 70_000),
            Err(TransportError::ColumnOutOfBounds(70_000))
        ));
    }
}
