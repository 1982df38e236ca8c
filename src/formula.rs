//! Aggregation-formula reference extraction.
//!
//! Recognizes two reference shapes against the designated column:
//! contiguous range aggregates (`=SUM(K39:K55)`), which expand to every row
//! in the inclusive span so aggregated leaves without formulas of their own
//! are not lost, and individual cell references (`=K7+K14`).

use itertools::Itertools;
use regex::Regex;

use crate::errors::{HierarchyError, HierarchyResult};

pub struct FormulaParser {
    column: String,
    sum_range: Regex,
    cell_ref: Regex,
}

impl FormulaParser {
    /// `column` is the spreadsheet column letter the formulas aggregate over
    /// (e.g. "K"). Lowercase input is accepted and normalized.
    pub fn new(column: &str) -> HierarchyResult<Self> {
        let column = column.trim().to_ascii_uppercase();
        if column.is_empty() || !column.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(HierarchyError::InvalidColumn(column));
        }

        let sum_range = Regex::new(&format!(r"(?i)SUM\({col}(\d+):{col}(\d+)\)", col = column))
            .map_err(|e| HierarchyError::InvalidColumn(e.to_string()))?;
        // Word boundary so a column-K scan does not match the tail of AK12.
        let cell_ref = Regex::new(&format!(r"\b{col}(\d+)", col = column))
            .map_err(|e| HierarchyError::InvalidColumn(e.to_string()))?;

        Ok(Self {
            column,
            sum_range,
            cell_ref,
        })
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Extract referenced row numbers from one formula. Returns an empty
    /// list for anything that is not a formula (no leading `=`).
    pub fn refs(&self, formula: &str) -> Vec<u32> {
        let body = match formula.trim().strip_prefix('=') {
            Some(body) => body,
            None => return Vec::new(),
        };

        if let Some(caps) = self.sum_range.captures(body) {
            let start: u32 = caps[1].parse().unwrap_or(0);
            let end: u32 = caps[2].parse().unwrap_or(0);
            return (start..=end).collect();
        }

        self.cell_ref
            .captures_iter(body)
            .filter_map(|caps| caps[1].parse::<u32>().ok())
            .sorted()
            .dedup()
            .collect()
    }
}

/// 0-indexed column for a spreadsheet column letter ("A" -> 0, "K" -> 10).
pub fn column_index(column: &str) -> HierarchyResult<usize> {
    let column = column.trim().to_ascii_uppercase();
    if column.is_empty() || !column.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(HierarchyError::InvalidColumn(column));
    }
    let mut index = 0usize;
    for c in column.chars() {
        index = index * 26 + (c as usize - 'A' as usize + 1);
    }
    Ok(index - 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_sum_range_expands_inclusive() {
        let parser = FormulaParser::new("K").unwrap();
        let refs = parser.refs("=SUM(K39:K55)");
        assert_eq!(refs.len(), 17);
        assert_eq!(refs.first(), Some(&39));
        assert_eq!(refs.last(), Some(&55));
    }

    #[test]
    fn test_individual_refs_are_sorted_and_deduped() {
        let parser = FormulaParser::new("K").unwrap();
        assert_eq!(parser.refs("=K7+K14"), vec![7, 14]);
        assert_eq!(parser.refs("=K14+K7+K7"), vec![7, 14]);
    }

    #[test]
    fn test_non_formula_yields_nothing() {
        let parser = FormulaParser::new("K").unwrap();
        assert!(parser.refs("K7+K14").is_empty());
        assert!(parser.refs("").is_empty());
    }

    #[test]
    fn test_other_columns_are_ignored() {
        let parser = FormulaParser::new("K").unwrap();
        assert_eq!(parser.refs("=J5+K9+AK12"), vec![9]);
    }

    #[test]
    fn test_lowercase_sum_is_recognized() {
        let parser = FormulaParser::new("K").unwrap();
        assert_eq!(parser.refs("=sum(K3:K5)"), vec![3, 4, 5]);
    }

    #[test]
    fn test_invalid_column_is_rejected() {
        assert!(FormulaParser::new("K1").is_err());
        assert!(FormulaParser::new("").is_err());
    }

    #[rstest]
    #[case("A", 0)]
    #[case("K", 10)]
    #[case("Z", 25)]
    #[case("AA", 26)]
    #[case("AK", 36)]
    fn test_column_index(#[case] letter: &str, #[case] expected: usize) {
        assert_eq!(column_index(letter).unwrap(), expected);
    }
}
