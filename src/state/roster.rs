use rusqlite::{named_params, Connection, OptionalExtension, Result as SqlResult};
use std::fs;
use std::path::{Path, PathBuf};

use super::data::{LoadedRow, Nickname, SearchHit, Student};
use crate::error::{GreditError, Result};

/// Schema compiled into the binary, used when the schema file is missing
pub const BUILTIN_SCHEMA: &str = include_str!("../../Data/schema.sql");

const UPSERT_STUDENT: &str = "INSERT INTO students (idno, name, gender, hoscode, roomno, nick)
     VALUES (:idno, :name, :gender, :hoscode, :roomno, NULL)
     ON CONFLICT(idno) DO UPDATE SET
         hoscode = excluded.hoscode,
         roomno  = excluded.roomno";

const FTS_SEARCH: &str = "SELECT s.idno, s.name, s.hoscode, s.roomno
     FROM students s JOIN students_fts f ON s.rowid = f.rowid
     WHERE students_fts MATCH :query
     ORDER BY s.idno
     LIMIT :limit";

const ID_SEARCH: &str = "SELECT idno, name, hoscode, roomno
     FROM students
     WHERE idno LIKE :query ESCAPE '\\'
     ORDER BY idno
     LIMIT :limit";

/// Create the database file if needed and run the schema script on it.
///
/// A schema file that cannot be read is not fatal: the built-in schema
/// is executed instead.
pub fn prepare_database(db_path: &Path, schema_path: &Path) -> Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| GreditError::io(parent, e))?;
        }
    }

    let conn = Connection::open(db_path)?;
    log::info!("📁 Opened/created database at {}", db_path.display());

    let script = match fs::read_to_string(schema_path) {
        Ok(script) => script,
        Err(e) => {
            log::warn!(
                "Failed to open file: {} ({}), using built-in schema",
                schema_path.display(),
                e
            );
            BUILTIN_SCHEMA.to_string()
        }
    };

    conn.execute_batch(&script)?;
    log::info!("✅ SQL script executed successfully");
    Ok(())
}

/// The Roster manages the SQLite student database
/// and its full-text index.
pub struct Roster {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Roster {
    /// Open a database that `prepare_database` has already set up.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn,
            db_path: Some(db_path.to_path_buf()),
        })
    }

    /// An in-memory roster with the built-in schema
    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(BUILTIN_SCHEMA)?;
        Ok(Self {
            conn,
            db_path: None,
        })
    }

    #[cfg(test)]
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub fn student_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Write loaded rows in a single transaction.
    ///
    /// New ids are inserted without a nickname. Existing ids only get
    /// their building and room updated. Returns the number of rows written;
    /// on error nothing is written.
    pub fn commit(&mut self, rows: &[LoadedRow]) -> Result<usize> {
        // Dropping the transaction without commit rolls everything back
        let tx = self.conn.transaction()?;
        {
            // One prepared statement, re-bound for every row
            let mut stmt = tx.prepare(UPSERT_STUDENT)?;
            for row in rows {
                stmt.execute(named_params! {
                    ":idno": row.idno(),
                    ":name": row.name(),
                    ":gender": row.gender(),
                    ":hoscode": row.hoscode(),
                    ":roomno": row.roomno(),
                })?;
            }
        }
        tx.commit()?;

        log::info!("💾 Committed {} students", rows.len());
        Ok(rows.len())
    }

    /// Search the roster.
    ///
    /// Text containing a digit is matched as an id prefix; anything else
    /// goes through the full-text index on names and nicknames, each word
    /// acting as a prefix. Results are ordered by id.
    pub fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        // An empty MATCH is a syntax error, so nothing to search
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let (sql, pattern) = if query.chars().any(|c| c.is_ascii_digit()) {
            (ID_SEARCH, like_prefix(query))
        } else {
            match fts_prefix_query(query) {
                Some(pattern) => (FTS_SEARCH, pattern),
                None => return Ok(Vec::new()),
            }
        };

        let mut stmt = self.conn.prepare_cached(sql)?;
        let hits = stmt
            .query_map(
                named_params! { ":query": pattern, ":limit": limit as i64 },
                |row| {
                    Ok(SearchHit {
                        idno: row.get(0)?,
                        name: row.get(1)?,
                        hoscode: row.get(2)?,
                        roomno: row.get(3)?,
                    })
                },
            )?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(hits)
    }

    pub fn student(&self, idno: &str) -> Result<Option<Student>> {
        let student = self
            .conn
            .query_row(
                "SELECT idno, name, gender, hoscode, roomno, nick FROM students WHERE idno = ?1",
                [idno],
                |row| {
                    Ok(Student {
                        idno: row.get(0)?,
                        name: row.get(1)?,
                        gender: row.get(2)?,
                        hoscode: row.get(3)?,
                        roomno: row.get(4)?,
                        nick: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(student)
    }

    /// Set or clear a nickname. Returns false if the id is unknown.
    pub fn set_nick(&self, idno: &str, nick: Option<&str>) -> Result<bool> {
        let nick = nick.map(str::trim).filter(|n| !n.is_empty());
        let updated = self.conn.execute(
            "UPDATE students SET nick = ?1 WHERE idno = ?2",
            rusqlite::params![nick, idno],
        )?;
        Ok(updated > 0)
    }

    #[cfg(test)]
    pub fn nick(&self, idno: &str) -> Result<Option<String>> {
        let nick: Option<Option<String>> = self
            .conn
            .query_row("SELECT nick FROM students WHERE idno = ?1", [idno], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(nick.flatten())
    }

    /// Every student with a nickname, ordered by name
    pub fn nicknamed(&self) -> Result<Vec<Nickname>> {
        let mut stmt = self.conn.prepare(
            "SELECT name, idno, nick FROM students WHERE nick IS NOT NULL ORDER BY name",
        )?;

        let nicknames = stmt
            .query_map([], |row| {
                Ok(Nickname {
                    name: row.get(0)?,
                    idno: row.get(1)?,
                    nick: row.get(2)?,
                })
            })?
            .collect::<SqlResult<Vec<_>>>()?;

        Ok(nicknames)
    }
}

impl std::fmt::Debug for Roster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Roster")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// LIKE pattern matching ids that start with `prefix`
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Turn free text into an FTS5 query of quoted prefix terms.
///
/// Words are split the way the default tokenizer splits them, so typing
/// punctuation or FTS operators never produces a syntax error.
fn fts_prefix_query(text: &str) -> Option<String> {
    let terms: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(|word| format!("\"{}\"*", word))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::ROW_FIELDS;
    use tempfile::tempdir;

    fn row(fields: [&str; ROW_FIELDS]) -> LoadedRow {
        LoadedRow {
            fields: fields.map(str::to_string),
        }
    }

    fn seeded() -> Roster {
        let mut roster = Roster::in_memory().unwrap();
        roster
            .commit(&[
                row(["2021A7PS0001", "Asha Rao", "F", "MR", "101"]),
                row(["2021A7PS0002", "Vikram Shah", "M", "BD", "220"]),
                row(["2020B3PS0417", "Ashok Menon", "M", "SK", "14"]),
            ])
            .unwrap();
        roster
    }

    #[test]
    fn commit_inserts_rows() {
        let roster = seeded();
        assert_eq!(roster.student_count().unwrap(), 3);

        let student = roster.student("2021A7PS0002").unwrap().unwrap();
        assert_eq!(student.name, "Vikram Shah");
        assert_eq!(student.gender, "M");
        assert_eq!(student.nick, None);
    }

    #[test]
    fn upsert_updates_only_building_and_room() {
        let mut roster = seeded();
        roster.set_nick("2021A7PS0001", Some("ash")).unwrap();

        roster
            .commit(&[row(["2021A7PS0001", "Renamed", "M", "VK", "330"])])
            .unwrap();

        let student = roster.student("2021A7PS0001").unwrap().unwrap();
        assert_eq!(student.name, "Asha Rao");
        assert_eq!(student.gender, "F");
        assert_eq!(student.hoscode, "VK");
        assert_eq!(student.roomno, "330");
        assert_eq!(student.nick.as_deref(), Some("ash"));
        assert_eq!(roster.student_count().unwrap(), 3);
    }

    #[test]
    fn name_search_matches_word_prefixes() {
        let roster = seeded();

        let hits = roster.search("ash", 50).unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.idno.as_str()).collect();
        assert_eq!(ids, vec!["2020B3PS0417", "2021A7PS0001"]);

        let hits = roster.search("vik sh", 50).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].hoscode, "BD");
        assert_eq!(hits[0].roomno, "220");
    }

    #[test]
    fn search_follows_upserted_rows() {
        let mut roster = seeded();
        roster
            .commit(&[row(["2021A7PS0002", "Vikram Shah", "M", "RM", "5"])])
            .unwrap();

        let hits = roster.search("vikram", 50).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].hoscode, "RM");
    }

    #[test]
    fn id_search_is_a_prefix_match() {
        let roster = seeded();
        let hits = roster.search("2021", 50).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].idno, "2021A7PS0001");

        assert!(roster.search("2021%", 50).unwrap().is_empty());
    }

    #[test]
    fn empty_and_punctuation_queries_return_nothing() {
        let roster = seeded();
        assert!(roster.search("", 50).unwrap().is_empty());
        assert!(roster.search("   ", 50).unwrap().is_empty());
        assert!(roster.search("\"(*", 50).unwrap().is_empty());
        assert!(roster.search("AND OR", 50).unwrap().is_empty());
    }

    #[test]
    fn search_respects_limit() {
        let roster = seeded();
        assert_eq!(roster.search("20", 1).unwrap().len(), 1);
    }

    #[test]
    fn nicknames_are_searchable_and_listed() {
        let roster = seeded();
        assert!(roster.set_nick("2020B3PS0417", Some("tiger")).unwrap());
        assert!(!roster.set_nick("1999XXXX0000", Some("ghost")).unwrap());

        assert_eq!(roster.nick("2020B3PS0417").unwrap().as_deref(), Some("tiger"));
        assert_eq!(roster.search("tig", 50).unwrap()[0].idno, "2020B3PS0417");

        let listed = roster.nicknamed().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Ashok Menon");

        roster.set_nick("2020B3PS0417", Some("  ")).unwrap();
        assert_eq!(roster.nick("2020B3PS0417").unwrap(), None);
        assert!(roster.nicknamed().unwrap().is_empty());
    }

    #[test]
    fn failed_commit_writes_nothing() {
        let mut roster = Roster::in_memory().unwrap();
        roster
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_bad AFTER INSERT ON students
                 WHEN new.idno = 'bad' BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let result = roster.commit(&[
            row(["2021A7PS0001", "Asha Rao", "F", "MR", "101"]),
            row(["bad", "Nobody", "M", "BD", "1"]),
        ]);
        assert!(result.is_err());
        assert_eq!(roster.student_count().unwrap(), 0);
    }

    #[test]
    fn prepare_database_falls_back_to_builtin_schema() {
        let dir = tempdir().expect("failed to create temp dir");
        let db_path = dir.path().join("nested").join("database.db");

        prepare_database(&db_path, &dir.path().join("missing.sql")).unwrap();

        let mut roster = Roster::open(&db_path).unwrap();
        assert_eq!(roster.path(), Some(db_path.as_path()));
        roster
            .commit(&[row(["2021A7PS0001", "Asha Rao", "F", "MR", "101"])])
            .unwrap();
        assert_eq!(roster.search("asha", 10).unwrap().len(), 1);
    }

    #[test]
    fn prepare_database_runs_schema_file() {
        let dir = tempdir().expect("failed to create temp dir");
        let schema = dir.path().join("schema.sql");
        let extra = format!("{BUILTIN_SCHEMA}\nCREATE TABLE IF NOT EXISTS marker (id INTEGER);");
        std::fs::write(&schema, extra).unwrap();
        let db_path = dir.path().join("database.db");

        prepare_database(&db_path, &schema).unwrap();
        // Running it twice is harmless
        prepare_database(&db_path, &schema).unwrap();

        let conn = Connection::open(&db_path).unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'marker'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn fts_query_quotes_terms() {
        assert_eq!(fts_prefix_query("asha rao").as_deref(), Some("\"asha\"* \"rao\"*"));
        assert_eq!(fts_prefix_query("o'brien").as_deref(), Some("\"o\"* \"brien\"*"));
        assert_eq!(fts_prefix_query("--"), None);
        assert_eq!(like_prefix("20_1"), "20\\_1%");
    }
}
