//! Header sentinel scanning for free-header exports
//!
//! Free-header files start with an arbitrary preamble. Lines are scanned in
//! order until one matches the profile's [`HeaderSentinel`]; that line
//! defines the keywords for the positional data below it. The header is
//! recognized exactly once per file.

use tracing::debug;

use super::decoder::RawRow;
use crate::app::models::Keyword;
use crate::profiles::HeaderSentinel;

/// Keywords discovered on the sentinel line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveredHeader {
    /// One keyword label per data column, in column order
    Columns(Vec<String>),

    /// A single analyte keyword for the whole file
    Analyte(Keyword),
}

/// Result of a successful header scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderScan {
    /// Index of the sentinel line within the scanned rows
    pub header_index: usize,
    pub header: DiscoveredHeader,
}

impl HeaderScan {
    /// Rows following the sentinel line
    pub fn data_rows<'a>(&self, rows: &'a [RawRow]) -> &'a [RawRow] {
        rows.get(self.header_index + 1..).unwrap_or(&[])
    }
}

/// Scan rows until the sentinel line is found
pub fn scan_header(rows: &[RawRow], sentinel: &HeaderSentinel) -> Option<HeaderScan> {
    let scan = rows.iter().enumerate().find_map(|(index, row)| {
        match_sentinel(row, sentinel).map(|header| HeaderScan {
            header_index: index,
            header,
        })
    });

    match &scan {
        Some(found) => debug!(
            "Header sentinel {} found on line {}",
            sentinel,
            rows[found.header_index].line_number()
        ),
        None => debug!("Header sentinel {} not found in {} rows", sentinel, rows.len()),
    }
    scan
}

fn match_sentinel(row: &RawRow, sentinel: &HeaderSentinel) -> Option<DiscoveredHeader> {
    match sentinel {
        HeaderSentinel::FirstTokenPrefix {
            prefix,
            keyword_column,
        } => {
            if !row.cell(0).starts_with(prefix.as_str()) {
                return None;
            }
            let first_word = row.cell(*keyword_column).split(' ').next().unwrap_or("");
            let keyword = Keyword::normalize(first_word);
            (!keyword.is_empty()).then_some(DiscoveredHeader::Analyte(keyword))
        }
        HeaderSentinel::LastToken { token } => {
            let cells: Vec<&str> = row.cells().collect();
            match cells.as_slice() {
                [_, middle @ .., last] if *last == token.as_str() => Some(
                    DiscoveredHeader::Columns(middle.iter().map(|s| s.to_string()).collect()),
                ),
                _ => None,
            }
        }
    }
}
