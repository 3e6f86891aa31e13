use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::annotations::{self, AnnotationView};
use crate::error::{HotspotsError, Result};
use crate::model::{AnnotationGroup, StoredAnnotationSet};

pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA: &str = include_str!("../schema.sql");

/// Open (or create) the annotation store at the given path.
pub fn open(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    conn.execute_batch("PRAGMA synchronous=NORMAL;")?;
    Ok(conn)
}

/// Ensure the schema is initialized. Safe to call on an already-initialized DB.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let version: Option<u32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    match version {
        None => {
            conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![SCHEMA_VERSION],
            )?;
        }
        Some(v) if v == SCHEMA_VERSION => {}
        Some(v) => {
            return Err(HotspotsError::Other(format!(
                "Annotation store schema version {} is not supported by this binary ({}). \
                 Delete the store and re-run.",
                v, SCHEMA_VERSION
            )));
        }
    }
    Ok(())
}

/// The annotation sets of one source file, backed by SQLite.
///
/// Works on a plain connection or, through deref, on a transaction.
pub struct SqliteView<'a> {
    conn: &'a Connection,
    source_file: String,
}

impl<'a> SqliteView<'a> {
    pub fn new(conn: &'a Connection, source_file: &str) -> Self {
        Self {
            conn,
            source_file: source_file.to_string(),
        }
    }
}

impl AnnotationView for SqliteView<'_> {
    fn add_regions(&mut self, key: &str, group: &AnnotationGroup) -> Result<()> {
        self.erase_regions(key)?;

        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO annotation_set (source_file, key, color, bucket_key, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![self.source_file, key, group.color, group.bucket_key, now],
        )?;
        let set_id = self.conn.last_insert_rowid();

        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO annotation (set_id, position, line_index, label) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (position, (line_index, label)) in
            group.locations.iter().zip(&group.labels).enumerate()
        {
            stmt.execute(params![set_id, position as i64, line_index, label])?;
        }
        Ok(())
    }

    fn has_regions(&self, key: &str) -> Result<bool> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM annotation_set WHERE source_file = ?1 AND key = ?2",
            params![self.source_file, key],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn erase_regions(&mut self, key: &str) -> Result<()> {
        self.conn.execute(
            "DELETE FROM annotation WHERE set_id IN (
                 SELECT id FROM annotation_set WHERE source_file = ?1 AND key = ?2
             )",
            params![self.source_file, key],
        )?;
        self.conn.execute(
            "DELETE FROM annotation_set WHERE source_file = ?1 AND key = ?2",
            params![self.source_file, key],
        )?;
        Ok(())
    }
}

/// Replace the hotspots shown on `source_file` with `groups`.
/// Either every group is stored or none is. Returns the number of sets.
pub fn store_hotspots(
    conn: &mut Connection,
    source_file: &str,
    groups: &[AnnotationGroup],
) -> Result<usize> {
    let tx = conn.transaction()?;
    let registry = {
        let mut view = SqliteView::new(&tx, source_file);
        annotations::render_hotspots(&mut view, groups)?
    };
    tx.commit()?;
    Ok(registry.len())
}

/// Remove every hotspot set shown on `source_file`. Returns the number removed.
pub fn clear_hotspots(conn: &mut Connection, source_file: &str) -> Result<usize> {
    let tx = conn.transaction()?;
    let removed = {
        let mut view = SqliteView::new(&tx, source_file);
        annotations::clear_hotspots(&mut view)?
    };
    tx.commit()?;
    Ok(removed)
}

/// All annotation sets stored for `source_file`, in render order.
pub fn get_annotation_sets(
    conn: &Connection,
    source_file: &str,
) -> Result<Vec<StoredAnnotationSet>> {
    let mut stmt = conn.prepare(
        "SELECT id, key, color, created_at FROM annotation_set
         WHERE source_file = ?1
         ORDER BY id",
    )?;
    let rows = stmt.query_map(params![source_file], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            StoredAnnotationSet {
                key: row.get(1)?,
                color: row.get(2)?,
                created_at: row.get(3)?,
                annotations: Vec::new(),
            },
        ))
    })?;

    let mut line_stmt = conn.prepare_cached(
        "SELECT line_index, label FROM annotation WHERE set_id = ?1 ORDER BY position",
    )?;

    let mut result = Vec::new();
    for row in rows {
        let (set_id, mut set) = row?;
        let lines = line_stmt.query_map(params![set_id], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?))
        })?;
        for line in lines {
            set.annotations.push(line?);
        }
        result.push(set);
    }
    Ok(result)
}

/// Source files that currently have hotspots stored.
pub fn list_source_files(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT DISTINCT source_file FROM annotation_set ORDER BY source_file")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}
