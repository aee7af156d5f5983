//! Tabular sheet backends: rows of string cells, first row is the header

use std::cell::RefCell;

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::{LiftError, Result};

/// Minimal spreadsheet-like storage contract
pub trait Sheet {
    /// All rows in insertion order, header included
    fn read_all(&self) -> Result<Vec<Vec<String>>>;

    fn append_row(&self, row: &[String]) -> Result<()>;

    /// Set one cell (0-based), padding the row with empty cells if needed
    fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()>;

    /// Drop every row and write `rows` in order
    fn clear_and_write(&self, rows: &[Vec<String>]) -> Result<()>;
}

/// SQLite-backed sheet, one table row per sheet row
pub struct SqliteSheet {
    conn: Connection,
}

impl SqliteSheet {
    /// Open or create the sheet at `path` (`":memory:"` works too)
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let sheet = Self { conn };
        sheet.init_schema()?;
        Ok(sheet)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS sheet_rows (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                cells TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }
}

impl Sheet for SqliteSheet {
    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        let mut stmt = self.conn.prepare("SELECT cells FROM sheet_rows ORDER BY id")?;
        let encoded = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        encoded
            .iter()
            .map(|cells| serde_json::from_str::<Vec<String>>(cells).map_err(LiftError::from))
            .collect()
    }

    fn append_row(&self, row: &[String]) -> Result<()> {
        self.conn.execute(
            "INSERT INTO sheet_rows (cells) VALUES (?1)",
            params![serde_json::to_string(row)?],
        )?;
        Ok(())
    }

    fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        let found: Option<(i64, String)> = self
            .conn
            .query_row(
                "SELECT id, cells FROM sheet_rows ORDER BY id LIMIT 1 OFFSET ?1",
                params![row as i64],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;

        let (id, encoded) = found
            .ok_or_else(|| LiftError::DataUnavailable(format!("sheet row {} does not exist", row)))?;

        let mut cells: Vec<String> = serde_json::from_str(&encoded)?;
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();

        self.conn.execute(
            "UPDATE sheet_rows SET cells = ?1 WHERE id = ?2",
            params![serde_json::to_string(&cells)?, id],
        )?;
        Ok(())
    }

    fn clear_and_write(&self, rows: &[Vec<String>]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM sheet_rows", [])?;
        for row in rows {
            tx.execute(
                "INSERT INTO sheet_rows (cells) VALUES (?1)",
                params![serde_json::to_string(row)?],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// In-process sheet, handy for tests and dry runs
#[derive(Debug, Default)]
pub struct MemorySheet {
    rows: RefCell<Vec<Vec<String>>>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self { rows: RefCell::new(rows) }
    }

    /// Snapshot of the raw cells
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.rows.borrow().clone()
    }
}

impl Sheet for MemorySheet {
    fn read_all(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.rows())
    }

    fn append_row(&self, row: &[String]) -> Result<()> {
        self.rows.borrow_mut().push(row.to_vec());
        Ok(())
    }

    fn update_cell(&self, row: usize, col: usize, value: &str) -> Result<()> {
        let mut rows = self.rows.borrow_mut();
        let cells = rows
            .get_mut(row)
            .ok_or_else(|| LiftError::DataUnavailable(format!("sheet row {} does not exist", row)))?;
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();
        Ok(())
    }

    fn clear_and_write(&self, rows: &[Vec<String>]) -> Result<()> {
        *self.rows.borrow_mut() = rows.to_vec();
        Ok(())
    }
}
