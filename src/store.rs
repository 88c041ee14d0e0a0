use rusqlite::{params, Connection};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::record::{LogRow, RawRow};

const CREATE_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS ClothingWeather (
        Date DATE,
        Time INT,
        Location TEXT,
        WeatherData TEXT,
        ClothingData TEXT,
        SportsData TEXT,
        OtherData TEXT,
        ActivityData TEXT
    )";

const INSERT_ROW: &str = "
    INSERT INTO ClothingWeather
        (Date, Time, Location, WeatherData, ClothingData, SportsData, OtherData, ActivityData)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)";

const SELECT_ROWS: &str = "
    SELECT Date, Time, Location, WeatherData, ClothingData, SportsData, OtherData, ActivityData
    FROM ClothingWeather
    ORDER BY rowid";

/// Handle to the log database
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Points at a database file; nothing is opened until an operation runs
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        Ok(Connection::open(&self.path)?)
    }

    /// Creates the log table if it does not exist yet
    pub fn initialize(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        conn.execute_batch(CREATE_TABLE)?;
        tracing::debug!("Initialized log table in {}", self.path.display());
        Ok(())
    }

    /// Appends one row and returns its rowid.
    ///
    /// All blobs are encoded before the transaction starts, so a failure
    /// leaves the table untouched.
    pub fn append(&self, row: &LogRow) -> Result<i64, StoreError> {
        let raw = RawRow::encode(row)?;

        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute(
            INSERT_ROW,
            params![
                raw.date,
                raw.time,
                raw.location,
                raw.weather_data,
                raw.clothing_data,
                raw.sports_data,
                raw.other_data,
                raw.activity_data,
            ],
        )?;
        let rowid = tx.last_insert_rowid();
        tx.commit()?;

        tracing::info!(
            "Stored observation for {} {}:00 in {} (rowid {})",
            raw.date,
            raw.time,
            raw.location,
            rowid
        );
        Ok(rowid)
    }

    /// Deletes the most recently inserted row and returns its rowid.
    ///
    /// Fails with [`StoreError::Empty`] when there is nothing to delete.
    pub fn delete_last(&self) -> Result<i64, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let last: Option<i64> =
            tx.query_row("SELECT MAX(rowid) FROM ClothingWeather", [], |row| row.get(0))?;
        let rowid = last.ok_or(StoreError::Empty)?;
        tx.execute("DELETE FROM ClothingWeather WHERE rowid = ?1", params![rowid])?;
        tx.commit()?;

        tracing::info!("Deleted last observation (rowid {})", rowid);
        Ok(rowid)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let conn = self.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM ClothingWeather", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Every row as stored, in insertion order
    pub fn load_raw(&self) -> Result<Vec<RawRow>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(SELECT_ROWS)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(RawRow {
                    date: row.get(0)?,
                    time: row.get(1)?,
                    location: row.get(2)?,
                    weather_data: row.get(3)?,
                    clothing_data: row.get(4)?,
                    sports_data: row.get(5)?,
                    other_data: row.get(6)?,
                    activity_data: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Every row decoded, in insertion order
    pub fn load_all(&self) -> Result<Vec<LogRow>, StoreError> {
        let rows = self
            .load_raw()?
            .iter()
            .map(RawRow::decode)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!("Loaded {} observations from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    /// Writes every row to CSV with the table's column names as header.
    /// Returns the number of rows written.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, StoreError> {
        let rows = self.load_raw()?;
        let mut csv_writer = csv::Writer::from_writer(writer);
        for row in &rows {
            csv_writer.serialize(row)?;
        }
        csv_writer.flush()?;
        Ok(rows.len())
    }
}
