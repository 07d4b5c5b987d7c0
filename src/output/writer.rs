//! Persistence writer for resolved votings
//!
//! Each voting is written to `<data_dir>/<date_key>/<voting_id>/` as four CSV
//! files with a header row. Existing files are truncated, never appended to,
//! so a retry or refresh replaces the previous output.

use crate::output::{OutputError, OutputResult};
use crate::records::{Motion, RecordSet, Sponsor, Table, VoteDetail, Voting};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Extension of the table files
pub const TABLE_EXTENSION: &str = "csv";

/// Writes record sets into the output tree
#[derive(Debug, Clone)]
pub struct RecordWriter {
    root: PathBuf,
}

impl RecordWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the tables of one voting
    pub fn item_dir(&self, date_key: &str, voting_id: &str) -> PathBuf {
        self.root.join(date_key).join(voting_id)
    }

    /// Writes all four tables of `records`, replacing earlier output
    ///
    /// # Returns
    ///
    /// The item directory that was written
    pub fn write(
        &self,
        date_key: &str,
        voting_id: &str,
        records: &RecordSet,
    ) -> OutputResult<PathBuf> {
        let dir = self.item_dir(date_key, voting_id);
        std::fs::create_dir_all(&dir).map_err(|source| OutputError::Io {
            path: dir.clone(),
            source,
        })?;

        write_table::<Voting>(&dir, &records.votings)?;
        write_table::<Motion>(&dir, &records.motions)?;
        write_table::<Sponsor>(&dir, &records.sponsors)?;
        write_table::<VoteDetail>(&dir, &records.details)?;

        tracing::debug!(
            "Wrote {} motions, {} sponsors, {} vote details to {}",
            records.motions.len(),
            records.sponsors.len(),
            records.details.len(),
            dir.display()
        );
        Ok(dir)
    }
}

/// Path of one table file inside an item directory
pub fn table_path(dir: &Path, file_stem: &str) -> PathBuf {
    dir.join(format!("{}.{}", file_stem, TABLE_EXTENSION))
}

fn write_table<T: Table + Serialize>(dir: &Path, rows: &[T]) -> OutputResult<()> {
    let path = table_path(dir, T::FILE_STEM);
    let csv_error = |source| OutputError::Csv {
        path: path.clone(),
        source,
    };

    // Header is written by hand so empty tables still carry their columns
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)
        .map_err(csv_error)?;
    writer.write_record(T::COLUMNS).map_err(csv_error)?;
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    writer.flush().map_err(|source| OutputError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}
