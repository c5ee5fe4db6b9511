use lotolune_db::models::DrawRecord;

use crate::error::EngineError;

/// Historique des tirages chargé en mémoire, ordonné par numéro de tirage
/// croissant. Lecture seule pendant toute une passe d'analyse.
#[derive(Debug, Clone, Default)]
pub struct DrawStore {
    records: Vec<DrawRecord>,
}

impl DrawStore {
    pub fn from_records(mut records: Vec<DrawRecord>) -> Self {
        records.sort_by_key(|r| r.draw_no);
        Self { records }
    }

    pub fn records(&self) -> &[DrawRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Garde d'entrée commune à toutes les stratégies.
    pub fn ensure_data(&self) -> Result<(), EngineError> {
        if self.records.is_empty() {
            return Err(EngineError::DataUnavailable);
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use lotolune_db::models::{CalendarInfo, DrawRecord};

    pub fn record(draw_no: u32, numbers: [u8; 6], bonus: u8) -> DrawRecord {
        DrawRecord {
            draw_no,
            date: "2024-01-06".to_string(),
            numbers,
            bonus,
            calendar: None,
        }
    }

    pub fn lunar_record(
        draw_no: u32,
        numbers: [u8; 6],
        bonus: u8,
        lunar_month: u8,
        lunar_day: u8,
    ) -> DrawRecord {
        DrawRecord {
            draw_no,
            date: "2024-01-06".to_string(),
            numbers,
            bonus,
            calendar: Some(CalendarInfo {
                lunar_year: 2024,
                lunar_month,
                lunar_day,
                leap_month: false,
                ganzhi_year: Some("갑진(용)년".to_string()),
                solar_term: None,
                weekday: "토요일".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::record;
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn test_store_sorts_by_draw_no() {
        let store = DrawStore::from_records(vec![
            record(3, [1, 2, 3, 4, 5, 6], 7),
            record(1, [1, 2, 3, 4, 5, 6], 7),
            record(2, [1, 2, 3, 4, 5, 6], 7),
        ]);
        let ids: Vec<u32> = store.records().iter().map(|r| r.draw_no).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_ensure_data_empty() {
        let store = DrawStore::default();
        assert!(matches!(
            store.ensure_data(),
            Err(EngineError::DataUnavailable)
        ));
    }

    #[test]
    fn test_ensure_data_non_empty() {
        let store = DrawStore::from_records(vec![record(1, [1, 2, 3, 4, 5, 6], 7)]);
        assert!(store.ensure_data().is_ok());
    }
}
