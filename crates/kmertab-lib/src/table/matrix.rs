//! Finished dense table
//!
//! A [`MatrixTable`] is read-only: the builder that produced it has been
//! consumed, so every row rendered from it sees the complete input.

use crate::{
    constants::{is_plain_identifier, FIELD_DELIMITER, QUOTE_CHAR},
    hasher::{SeededHashMap, SeededIndexSet},
    table::{
        builder::{dense_cell_count, CellKey},
        config::IdentifierPolicy,
    },
};
use std::io::{self, Write};
use std::iter::FusedIterator;
use tracing::info;

/// Dense (entity x feature) count table ready for emission
pub struct MatrixTable {
    row_key_label: String,
    identifier_policy: IdentifierPolicy,
    entities: SeededIndexSet<String>,
    features: SeededIndexSet<String>,
    /// Feature indices in emission order
    column_order: Vec<usize>,
    counts: SeededHashMap<CellKey, u64>,
}

impl MatrixTable {
    pub(crate) fn new(
        row_key_label: String,
        identifier_policy: IdentifierPolicy,
        entities: SeededIndexSet<String>,
        features: SeededIndexSet<String>,
        column_order: Vec<usize>,
        counts: SeededHashMap<CellKey, u64>,
    ) -> Self {
        Self {
            row_key_label,
            identifier_policy,
            entities,
            features,
            column_order,
            counts,
        }
    }

    /// Number of data rows (distinct entities)
    pub fn num_rows(&self) -> usize {
        self.entities.len()
    }

    /// Number of data columns (distinct features)
    pub fn num_columns(&self) -> usize {
        self.features.len()
    }

    /// Number of cells backed by an observed tuple
    pub fn num_observed_pairs(&self) -> usize {
        self.counts.len()
    }

    /// Number of cells in the rendered grid, the row-key column excluded
    pub fn dense_cells(&self) -> u64 {
        dense_cell_count(self.num_rows(), self.num_columns())
    }

    /// Entities in row order
    pub fn entities(&self) -> impl Iterator<Item = &str> + '_ {
        self.entities.iter().map(String::as_str)
    }

    /// Features in column order
    pub fn features(&self) -> impl Iterator<Item = &str> + '_ {
        self.column_order.iter().map(move |&i| self.features[i].as_str())
    }

    /// Count of a cell, `Some(0)` when both keys exist but the pair was
    /// never observed, `None` when either key is unknown
    pub fn count(&self, entity: &str, feature: &str) -> Option<u64> {
        let key = CellKey {
            entity: self.entities.get_index_of(entity)?,
            feature: self.features.get_index_of(feature)?,
        };
        Some(self.cell(key))
    }

    #[inline]
    fn cell(&self, key: CellKey) -> u64 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// The header line: row-key label followed by every feature
    pub fn header(&self) -> String {
        let mut line = String::new();
        self.render_header(&mut line);
        line
    }

    /// The data line of the `row`-th entity
    pub fn row(&self, row: usize) -> Option<String> {
        if row >= self.entities.len() {
            return None;
        }
        let mut line = String::new();
        self.render_row(row, &mut line);
        Some(line)
    }

    /// All lines, header first, rendered lazily
    pub fn lines(&self) -> Lines<'_> {
        Lines {
            table: self,
            next: 0,
            end: self.entities.len() + 1,
        }
    }

    /// All lines collected into a vector
    pub fn to_lines(&self) -> Vec<String> {
        self.lines().collect()
    }

    /// Write the table, one newline-terminated line per row
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        info!("Generating rows");
        let mut line = String::new();
        self.render_header(&mut line);
        line.push('\n');
        writer.write_all(line.as_bytes())?;

        for row in 0..self.entities.len() {
            line.clear();
            self.render_row(row, &mut line);
            line.push('\n');
            writer.write_all(line.as_bytes())?;
        }
        writer.flush()?;
        info!("Completed table generation");
        Ok(())
    }

    fn render_header(&self, out: &mut String) {
        push_identifier(out, &self.row_key_label, self.identifier_policy);
        for &feature in &self.column_order {
            out.push(FIELD_DELIMITER);
            push_identifier(out, &self.features[feature], self.identifier_policy);
        }
    }

    fn render_row(&self, entity: usize, out: &mut String) {
        push_identifier(out, &self.entities[entity], self.identifier_policy);
        for &feature in &self.column_order {
            out.push(FIELD_DELIMITER);
            out.push_str(&self.cell(CellKey { entity, feature }).to_string());
        }
    }
}

/// Append `id` as one field, quoting it if the policy allows and it needs it
fn push_identifier(out: &mut String, id: &str, policy: IdentifierPolicy) {
    if policy == IdentifierPolicy::Reject || is_plain_identifier(id) {
        out.push_str(id);
        return;
    }
    out.push(QUOTE_CHAR);
    for c in id.chars() {
        if c == QUOTE_CHAR {
            out.push(QUOTE_CHAR);
        }
        out.push(c);
    }
    out.push(QUOTE_CHAR);
}

/// Iterator over the rendered lines of a [`MatrixTable`], header first
pub struct Lines<'a> {
    table: &'a MatrixTable,
    next: usize,
    end: usize,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.next >= self.end {
            return None;
        }
        let line = match self.next {
            0 => self.table.header(),
            n => self.table.row(n - 1)?,
        };
        self.next += 1;
        Some(line)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Lines<'_> {}

impl FusedIterator for Lines<'_> {}

#[cfg(test)]
mod tests {
    use crate::table::{IdentifierPolicy, MatrixTableBuilder, TableConfiguration};
    use crate::tuple::CountTuple;

    fn build(config: TableConfiguration, raw: &[(&str, &str, i64)]) -> super::MatrixTable {
        let tuples: Vec<CountTuple> = raw.iter().map(|&t| t.into()).collect();
        MatrixTableBuilder::build_from_tuples(config, &tuples).unwrap()
    }

    #[test]
    fn test_dense_rows_with_zero_fill() {
        let table = build(
            TableConfiguration::default(),
            &[("A", "x", 3), ("B", "y", 5), ("A", "y", 2)],
        );
        assert_eq!(table.to_lines(), ["Accessions,x,y", "A,3,2", "B,0,5"]);
    }

    #[test]
    fn test_empty_table_is_header_only() {
        let table = build(TableConfiguration::default(), &[]);
        assert_eq!(table.to_lines(), ["Accessions"]);
        assert_eq!(table.num_rows(), 0);
        assert_eq!(table.num_columns(), 0);
        assert_eq!(table.dense_cells(), 0);
    }

    #[test]
    fn test_columns_sorted_rows_first_seen() {
        let table = build(
            TableConfiguration::default(),
            &[("zebra", "TTT", 1), ("ant", "AAA", 2), ("zebra", "CCC", 3)],
        );
        let entities: Vec<&str> = table.entities().collect();
        let features: Vec<&str> = table.features().collect();
        assert_eq!(entities, ["zebra", "ant"]);
        assert_eq!(features, ["AAA", "CCC", "TTT"]);
        assert_eq!(table.header(), "Accessions,AAA,CCC,TTT");
        assert_eq!(table.row(0).as_deref(), Some("zebra,0,3,1"));
        assert_eq!(table.row(1).as_deref(), Some("ant,2,0,0"));
        assert_eq!(table.row(2), None);
    }

    #[test]
    fn test_count_lookup() {
        let table = build(TableConfiguration::default(), &[("A", "x", 3), ("B", "y", 5)]);
        assert_eq!(table.count("A", "x"), Some(3));
        assert_eq!(table.count("A", "y"), Some(0));
        assert_eq!(table.count("C", "x"), None);
        assert_eq!(table.count("A", "z"), None);
        assert_eq!(table.num_observed_pairs(), 2);
        assert_eq!(table.dense_cells(), 4);
    }

    #[test]
    fn test_custom_row_key_label() {
        let config = TableConfiguration::new("Samples").unwrap();
        let table = build(config, &[("s1", "k", 1)]);
        assert_eq!(table.header(), "Samples,k");
    }

    #[test]
    fn test_quote_policy_escapes_identifiers() {
        let config = TableConfiguration {
            identifier_policy: IdentifierPolicy::Quote,
            ..TableConfiguration::default()
        };
        let table = build(config, &[("A,1", "say \"hi\"", 2), ("B", "x", 1)]);
        assert_eq!(
            table.to_lines(),
            ["Accessions,\"say \"\"hi\"\"\",x", "\"A,1\",2,0", "B,0,1"]
        );
    }

    #[test]
    fn test_lines_iterator_is_exact_size() {
        let table = build(TableConfiguration::default(), &[("A", "x", 1), ("B", "x", 2)]);
        let mut lines = table.lines();
        assert_eq!(lines.len(), 3);
        lines.next();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines.by_ref().count(), 2);
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_to_matches_lines() {
        let table = build(
            TableConfiguration::default(),
            &[("A", "x", 3), ("B", "y", 5), ("A", "y", 2)],
        );
        let mut out = Vec::new();
        table.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Accessions,x,y\nA,3,2\nB,0,5\n");
    }

    #[test]
    fn test_rectangular() {
        let table = build(
            TableConfiguration::default(),
            &[("A", "x", 1), ("B", "y", 2), ("C", "z", 3), ("A", "w", 4)],
        );
        let widths: Vec<usize> = table.lines().map(|l| l.split(',').count()).collect();
        assert_eq!(widths, [5, 5, 5, 5]);
    }
}
