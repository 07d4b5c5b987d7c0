//! Database schema definitions
//!
//! One table per output file, named after the file stem. Each carries an
//! auto-assigned `id` plus exactly the columns of its CSV file.

use crate::records::{Motion, Sponsor, Table, VoteDetail, Voting};

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS voting (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    voting_id TEXT NOT NULL,
    voting_did TEXT,
    title TEXT,
    date TEXT,
    kind TEXT
);

CREATE INDEX IF NOT EXISTS idx_voting_voting_id ON voting(voting_id);

CREATE TABLE IF NOT EXISTS motion (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    voting_id TEXT NOT NULL,
    motion_id TEXT NOT NULL,
    motion_did TEXT,
    document_nr TEXT,
    date TEXT,
    title TEXT,
    kind TEXT,
    text TEXT,
    is_fallback INTEGER,
    download TEXT,
    decision TEXT,
    outcome TEXT,
    votes_for INTEGER,
    votes_required INTEGER,
    votes_total INTEGER
);

CREATE INDEX IF NOT EXISTS idx_motion_voting_id ON motion(voting_id);

CREATE TABLE IF NOT EXISTS sponsors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    voting_id TEXT NOT NULL,
    motion_id TEXT NOT NULL,
    name TEXT,
    kind TEXT
);

CREATE INDEX IF NOT EXISTS idx_sponsors_voting_id ON sponsors(voting_id);

CREATE TABLE IF NOT EXISTS details (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    voting_id TEXT NOT NULL,
    motion_id TEXT NOT NULL,
    group_name TEXT,
    seats INTEGER,
    member TEXT,
    vote TEXT,
    not_participated INTEGER,
    mistake INTEGER
);

CREATE INDEX IF NOT EXISTS idx_details_voting_id ON details(voting_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Columns of the table stored under `stem`, if it is one of the four
pub fn table_columns(stem: &str) -> Option<&'static [&'static str]> {
    let tables: [(&str, &'static [&'static str]); 4] = [
        (Voting::FILE_STEM, Voting::COLUMNS),
        (Motion::FILE_STEM, Motion::COLUMNS),
        (Sponsor::FILE_STEM, Sponsor::COLUMNS),
        (VoteDetail::FILE_STEM, VoteDetail::COLUMNS),
    ];
    tables
        .into_iter()
        .find(|(name, _)| *name == stem)
        .map(|(_, columns)| columns)
}

/// Boolean columns, written as `true`/`false` and stored as 0/1
pub const FLAG_COLUMNS: [&str; 3] = ["is_fallback", "not_participated", "mistake"];

pub fn is_flag_column(column: &str) -> bool {
    FLAG_COLUMNS.contains(&column)
}

/// Columns holding dates, stored as ISO dates after parsing
pub fn is_date_column(column: &str) -> bool {
    column.contains("date")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::TABLE_ORDER;
    use rusqlite::Connection;

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_match_csv_columns() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for stem in TABLE_ORDER {
            let mut stmt = conn
                .prepare(&format!("SELECT name FROM pragma_table_info('{}')", stem))
                .unwrap();
            let names: Vec<String> = stmt
                .query_map([], |row| row.get(0))
                .unwrap()
                .collect::<Result<_, _>>()
                .unwrap();

            let expected: Vec<&str> = std::iter::once("id")
                .chain(table_columns(stem).unwrap().iter().copied())
                .collect();
            assert_eq!(names, expected, "Table {} columns", stem);
        }
    }

    #[test]
    fn test_date_columns() {
        assert!(is_date_column("date"));
        assert!(!is_date_column("voting_did"));
        assert!(!is_date_column("document_nr"));
    }

    #[test]
    fn test_flag_columns_are_integer_columns() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        for column in FLAG_COLUMNS {
            let declared: String = conn
                .query_row(
                    "SELECT p.type FROM sqlite_master m, pragma_table_info(m.name) p
                     WHERE m.type = 'table' AND p.name = ?1",
                    [column],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(declared, "INTEGER", "{} should be INTEGER", column);
        }
        assert!(is_flag_column("mistake"));
        assert!(!is_flag_column("title"));
        assert!(!is_flag_column("vote"));
    }
}
