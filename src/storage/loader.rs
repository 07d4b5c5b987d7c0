//! Bulk loader from the output tree into SQLite
//!
//! Items are loaded one transaction at a time. Rows already stored for a
//! voting are deleted before its files are inserted, so loading the same
//! tree twice leaves one copy of every row.

use crate::dates::{date_key, parse_dutch_date};
use crate::output::table_path;
use crate::records::{Table, Voting, TABLE_ORDER};
use crate::storage::schema::{initialize_schema, is_date_column, is_flag_column, table_columns};
use crate::storage::{StorageError, StorageResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Transaction};
use std::path::{Path, PathBuf};

/// Counts of what one `load_tree` call stored
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Item directories loaded
    pub items: usize,
    /// Item directories skipped for lacking a voting file
    pub skipped: usize,
    pub votings: usize,
    pub motions: usize,
    pub sponsors: usize,
    pub details: usize,
}

impl LoadSummary {
    fn add_rows(&mut self, stem: &str, rows: usize) {
        match TABLE_ORDER.iter().position(|s| *s == stem) {
            Some(0) => self.votings += rows,
            Some(1) => self.motions += rows,
            Some(2) => self.sponsors += rows,
            Some(3) => self.details += rows,
            _ => {}
        }
    }
}

/// SQLite loader
pub struct Loader {
    conn: Connection,
}

impl Loader {
    /// Opens or creates the database and its tables
    pub fn open(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Loads every `<date>/<id>/` directory below `data_dir`
    ///
    /// # Arguments
    ///
    /// * `data_dir` - Root of the output tree written by the crawler
    ///
    /// # Returns
    ///
    /// * `Ok(LoadSummary)` - What was stored and what was skipped
    /// * `Err(StorageError)` - A file could not be read or a row not stored
    pub fn load_tree(&mut self, data_dir: &Path) -> StorageResult<LoadSummary> {
        let mut summary = LoadSummary::default();

        for date_dir in sorted_subdirs(data_dir)? {
            for item_dir in sorted_subdirs(&date_dir)? {
                if !table_path(&item_dir, Voting::FILE_STEM).is_file() {
                    tracing::warn!("Skipping {}: no voting file", item_dir.display());
                    summary.skipped += 1;
                    continue;
                }
                self.load_item(&item_dir, &mut summary)?;
                summary.items += 1;
            }
        }

        tracing::info!(
            "Loaded {} items ({} votings, {} motions, {} sponsors, {} details)",
            summary.items,
            summary.votings,
            summary.motions,
            summary.sponsors,
            summary.details
        );
        Ok(summary)
    }

    /// Replaces the stored rows of one item directory
    fn load_item(&mut self, dir: &Path, summary: &mut LoadSummary) -> StorageResult<()> {
        tracing::debug!("Loading {}", dir.display());

        let mut tables = Vec::with_capacity(TABLE_ORDER.len());
        for stem in TABLE_ORDER {
            let path = table_path(dir, stem);
            if !path.is_file() {
                tracing::warn!("{} is missing; treating it as empty", path.display());
                continue;
            }
            tables.push((stem, read_table(&path)?));
        }

        let voting_ids: Vec<String> = tables
            .iter()
            .filter(|(stem, _)| *stem == Voting::FILE_STEM)
            .flat_map(|(_, table)| table.column_values("voting_id"))
            .collect();

        let tx = self.conn.transaction()?;
        for voting_id in &voting_ids {
            for stem in TABLE_ORDER {
                tx.execute(
                    &format!("DELETE FROM {} WHERE voting_id = ?1", stem),
                    params![voting_id],
                )?;
            }
        }
        for (stem, table) in &tables {
            let rows = insert_table(&tx, stem, table)?;
            summary.add_rows(stem, rows);
        }
        tx.commit()?;

        Ok(())
    }

    /// Number of rows stored in one of the four tables
    pub fn row_count(&self, stem: &str) -> StorageResult<usize> {
        if table_columns(stem).is_none() {
            return Err(StorageError::UnknownTable(stem.to_string()));
        }
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", stem), [], |row| {
                    row.get(0)
                })?;
        Ok(count as usize)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// One CSV file: its header and its records
struct CsvTable {
    path: PathBuf,
    header: Vec<String>,
    records: Vec<Vec<String>>,
}

impl CsvTable {
    fn column_values(&self, column: &str) -> Vec<String> {
        match self.header.iter().position(|h| h == column) {
            Some(index) => self
                .records
                .iter()
                .filter_map(|record| record.get(index).cloned())
                .collect(),
            None => Vec::new(),
        }
    }
}

fn read_table(path: &Path) -> StorageResult<CsvTable> {
    let csv_error = |source| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(csv_error)?;
    let header = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();
    let records = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(csv_error)
        })
        .collect::<StorageResult<Vec<Vec<String>>>>()?;

    Ok(CsvTable {
        path: path.to_path_buf(),
        header,
        records,
    })
}

fn insert_table(tx: &Transaction<'_>, stem: &str, table: &CsvTable) -> StorageResult<usize> {
    let known = table_columns(stem).ok_or_else(|| StorageError::UnknownTable(stem.to_string()))?;
    if let Some(column) = table.header.iter().find(|h| !known.contains(&h.as_str())) {
        return Err(StorageError::UnknownColumn {
            path: table.path.clone(),
            column: column.clone(),
        });
    }

    let placeholders: Vec<String> = (1..=table.header.len()).map(|i| format!("?{}", i)).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        stem,
        table.header.join(", "),
        placeholders.join(", ")
    );
    let mut stmt = tx.prepare(&sql)?;

    for record in &table.records {
        let values = table
            .header
            .iter()
            .zip(record)
            .map(|(column, cell)| cell_value(column, cell));
        stmt.execute(params_from_iter(values))?;
    }

    Ok(table.records.len())
}

/// Converts one CSV cell into the value stored for it
fn cell_value(column: &str, cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    if is_flag_column(column) {
        match cell {
            "true" => return Value::Integer(1),
            "false" => return Value::Integer(0),
            _ => {}
        }
    }
    if is_date_column(column) {
        return match parse_dutch_date(cell) {
            Some(date) => Value::Text(date_key(date)),
            None => {
                tracing::warn!("Keeping unparsable {} value {:?} as is", column, cell);
                Value::Text(cell.to_string())
            }
        };
    }
    Value::Text(cell.to_string())
}

/// Subdirectories of `dir` sorted by name; a missing `dir` has none
fn sorted_subdirs(dir: &Path) -> StorageResult<Vec<PathBuf>> {
    let io_error = |source| StorageError::Io {
        path: dir.to_path_buf(),
        source,
    };

    if !dir.is_dir() {
        tracing::warn!("{} is not a directory; nothing to load", dir.display());
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}
