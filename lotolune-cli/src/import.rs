use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

use lotolune_db::db::insert_draw;
use lotolune_db::models::{validate_record, DrawRecord, PICK_COUNT};
use lotolune_db::rusqlite::Connection;
use lotolune_core::lunar::LunarConverter;

/// Une entrée du fichier d'archive JSON : numéro de tirage, date solaire,
/// 6 numéros, bonus.
#[derive(Debug, Deserialize)]
pub struct RawDraw {
    pub draw_no: u32,
    pub date: String,
    pub numbers: Vec<u8>,
    pub bonus: u8,
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub conversion_failed: u32,
    pub errors: u32,
}

pub fn parse_raw_draw(raw: &RawDraw, converter: &dyn LunarConverter) -> Result<DrawRecord> {
    let numbers: [u8; PICK_COUNT] = raw
        .numbers
        .as_slice()
        .try_into()
        .with_context(|| format!("Tirage {} : attendu 6 numéros, reçu {}", raw.draw_no, raw.numbers.len()))?;
    validate_record(&numbers, raw.bonus)
        .with_context(|| format!("Tirage {} invalide", raw.draw_no))?;

    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
        .with_context(|| format!("Tirage {} : date invalide '{}'", raw.draw_no, raw.date))?;

    // Échec de conversion lunaire : le tirage est gardé sans annotation
    // calendaire, il sortira seulement des analyses compartimentées.
    let calendar = converter.convert(date).ok();

    Ok(DrawRecord {
        draw_no: raw.draw_no,
        date: raw.date.clone(),
        numbers,
        bonus: raw.bonus,
        calendar,
    })
}

pub fn import_json(
    conn: &Connection,
    path: &Path,
    converter: &dyn LunarConverter,
) -> Result<ImportResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;
    let raw_draws: Vec<RawDraw> =
        serde_json::from_str(&content).context("JSON d'archive invalide")?;

    let tx = conn
        .unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        conversion_failed: 0,
        errors: 0,
    };

    for raw in &raw_draws {
        result.total_records += 1;
        match parse_raw_draw(raw, converter) {
            Ok(record) => {
                if record.calendar.is_none() {
                    result.conversion_failed += 1;
                }
                match insert_draw(&tx, &record) {
                    Ok(true) => result.inserted += 1,
                    Ok(false) => result.skipped += 1,
                    Err(e) => {
                        eprintln!("Erreur insertion tirage {}: {}", raw.draw_no, e);
                        result.errors += 1;
                    }
                }
            }
            Err(e) => {
                eprintln!("Erreur parsing tirage {}: {:#}", raw.draw_no, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotolune_core::lunar::ApproxKoreanLunar;

    fn raw(draw_no: u32, date: &str) -> RawDraw {
        RawDraw {
            draw_no,
            date: date.to_string(),
            numbers: vec![1, 12, 23, 34, 40, 45],
            bonus: 7,
        }
    }

    #[test]
    fn test_parse_raw_draw_attaches_calendar() {
        let record = parse_raw_draw(&raw(1154, "2024-12-14"), &ApproxKoreanLunar).unwrap();
        assert_eq!(record.draw_no, 1154);
        let cal = record.calendar.expect("conversion attendue");
        assert!((1..=12).contains(&cal.lunar_month));
        assert_eq!(cal.weekday, "토요일");
    }

    #[test]
    fn test_parse_raw_draw_conversion_failure_tolerated() {
        // Date antérieure à l'époque du convertisseur : tirage gardé, sans
        // annotation.
        let record = parse_raw_draw(&raw(1, "1899-06-01"), &ApproxKoreanLunar).unwrap();
        assert!(record.calendar.is_none());
    }

    #[test]
    fn test_parse_raw_draw_bad_date() {
        assert!(parse_raw_draw(&raw(1, "14/12/2024"), &ApproxKoreanLunar).is_err());
    }

    #[test]
    fn test_parse_raw_draw_wrong_number_count() {
        let bad = RawDraw {
            draw_no: 1,
            date: "2024-12-14".to_string(),
            numbers: vec![1, 2, 3],
            bonus: 7,
        };
        assert!(parse_raw_draw(&bad, &ApproxKoreanLunar).is_err());
    }

    #[test]
    fn test_import_json_end_to_end() {
        use lotolune_db::db::{count_draws, migrate};

        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let json = r#"[
            {"draw_no": 1, "date": "2002-12-07", "numbers": [10, 23, 29, 33, 37, 40], "bonus": 16},
            {"draw_no": 2, "date": "2002-12-14", "numbers": [9, 13, 21, 25, 32, 42], "bonus": 2},
            {"draw_no": 2, "date": "2002-12-14", "numbers": [9, 13, 21, 25, 32, 42], "bonus": 2}
        ]"#;
        let dir = std::env::temp_dir().join("lotolune_import_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("draws.json");
        std::fs::write(&path, json).unwrap();

        let result = import_json(&conn, &path, &ApproxKoreanLunar).unwrap();
        assert_eq!(result.total_records, 3);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 0);
        assert_eq!(count_draws(&conn).unwrap(), 2);
    }
}
