use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};

/// Ordered rows of string cells under named columns.
///
/// Every row holds exactly `headers.len()` cells; short rows are padded with
/// empty cells on the way in. An empty cell is a missing value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let mut table = Self::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
        Self::from_reader(file).with_context(|| format!("read csv {}", path.display()))
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(rdr);
        let headers = reader
            .headers()
            .context("missing header row")?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        let mut table = Self::new(headers);
        for record in reader.records() {
            let record = record.context("malformed csv record")?;
            if record.len() > table.headers.len() {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                return Err(anyhow!(
                    "malformed csv record at line {line}: {} cells for {} columns",
                    record.len(),
                    table.headers.len()
                ));
            }
            table.push_row(record.iter().map(|c| c.to_string()).collect());
        }
        Ok(table)
    }

    /// Writes the table, replacing whatever was at `path`.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        self.to_writer(&mut buf)?;
        fs::write(path, buf).with_context(|| format!("write {}", path.display()))
    }

    pub fn to_writer<W: Write>(&self, wtr: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new().from_writer(wtr);
        writer
            .write_record(&self.headers)
            .context("write csv header")?;
        for row in &self.rows {
            writer.write_record(row).context("write csv row")?;
        }
        writer.flush().context("flush csv")?;
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, mut row: Vec<String>) {
        // Ragged provider exports: pad short rows.
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Appends `other`'s rows, matching cells by column name. Columns this
    /// table lacks are dropped; an empty table adopts `other`'s headers.
    pub fn append(&mut self, other: &Table) {
        if self.headers.is_empty() {
            self.headers = other.headers.clone();
        }
        let mapping = self
            .headers
            .iter()
            .map(|h| other.column_index(h))
            .collect::<Vec<_>>();
        for row in &other.rows {
            let aligned = mapping
                .iter()
                .map(|idx| idx.map(|i| row[i].clone()).unwrap_or_default())
                .collect();
            self.rows.push(aligned);
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    pub fn get(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row).map(|r| r[idx].as_str())
    }

    /// Replaces `name` in place if present, otherwise appends it as the last column.
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(anyhow!(
                "column {name} has {} values for {} rows",
                values.len(),
                self.rows.len()
            ));
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    pub fn retain_rows<F>(&mut self, mut keep: F)
    where
        F: FnMut(&[String]) -> bool,
    {
        self.rows.retain(|row| keep(row));
    }
}
