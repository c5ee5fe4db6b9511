use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::{CalendarInfo, DrawRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    draw_no       INTEGER PRIMARY KEY,
    date          TEXT NOT NULL,
    n1            INTEGER NOT NULL,
    n2            INTEGER NOT NULL,
    n3            INTEGER NOT NULL,
    n4            INTEGER NOT NULL,
    n5            INTEGER NOT NULL,
    n6            INTEGER NOT NULL,
    bonus         INTEGER NOT NULL,
    lunar_year    INTEGER,
    lunar_month   INTEGER,
    lunar_day     INTEGER,
    leap_month    INTEGER,
    ganzhi_year   TEXT,
    solar_term    TEXT,
    weekday       TEXT
);
";

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("lotolune.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, record: &DrawRecord) -> Result<bool> {
    // Les colonnes lunaires restent NULL si la conversion a échoué.
    let cal = record.calendar.as_ref();
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (draw_no, date, n1, n2, n3, n4, n5, n6, bonus,
             lunar_year, lunar_month, lunar_day, leap_month, ganzhi_year, solar_term, weekday)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        rusqlite::params![
            record.draw_no,
            record.date,
            record.numbers[0],
            record.numbers[1],
            record.numbers[2],
            record.numbers[3],
            record.numbers[4],
            record.numbers[5],
            record.bonus,
            cal.map(|c| c.lunar_year),
            cal.map(|c| c.lunar_month),
            cal.map(|c| c.lunar_day),
            cal.map(|c| c.leap_month),
            cal.and_then(|c| c.ganzhi_year.clone()),
            cal.and_then(|c| c.solar_term.clone()),
            cal.map(|c| c.weekday.clone()),
        ],
    )
    .context("Échec de l'insertion")?;
    Ok(changed > 0)
}

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DrawRecord> {
    let lunar_year: Option<i32> = row.get(9)?;
    let calendar = match lunar_year {
        Some(lunar_year) => Some(CalendarInfo {
            lunar_year,
            lunar_month: row.get(10)?,
            lunar_day: row.get(11)?,
            leap_month: row.get(12)?,
            ganzhi_year: row.get(13)?,
            solar_term: row.get(14)?,
            weekday: row.get::<_, Option<String>>(15)?.unwrap_or_default(),
        }),
        None => None,
    };
    Ok(DrawRecord {
        draw_no: row.get(0)?,
        date: row.get(1)?,
        numbers: [
            row.get::<_, u8>(2)?,
            row.get::<_, u8>(3)?,
            row.get::<_, u8>(4)?,
            row.get::<_, u8>(5)?,
            row.get::<_, u8>(6)?,
            row.get::<_, u8>(7)?,
        ],
        bonus: row.get(8)?,
        calendar,
    })
}

const SELECT_COLUMNS: &str = "draw_no, date, n1, n2, n3, n4, n5, n6, bonus,
             lunar_year, lunar_month, lunar_day, leap_month, ganzhi_year, solar_term, weekday";

/// Historique complet, ordonné par numéro de tirage croissant. C'est l'ordre
/// d'entrée attendu par le moteur d'analyse.
pub fn fetch_all_draws(conn: &Connection) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM draws ORDER BY draw_no ASC",
        SELECT_COLUMNS
    ))?;
    let draws = stmt
        .query_map([], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

/// Les `limit` tirages les plus récents, du plus récent au plus ancien.
pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<DrawRecord>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM draws ORDER BY draw_no DESC LIMIT ?1",
        SELECT_COLUMNS
    ))?;
    let draws = stmt
        .query_map([limit], record_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}
