use chrono::{Datelike, NaiveDate, Weekday};
use lotolune_db::models::CalendarInfo;

use crate::error::EngineError;

/// Service de conversion calendaire consommé par le moteur. Un échec de
/// conversion est signalé explicitement et traité comme « pas d'information
/// calendaire » par les consommateurs.
pub trait LunarConverter {
    fn convert(&self, date: NaiveDate) -> Result<CalendarInfo, EngineError>;
}

const HEAVENLY_STEMS: [&str; 10] = ["갑", "을", "병", "정", "무", "기", "경", "신", "임", "계"];
const EARTHLY_BRANCHES: [&str; 12] = [
    "자", "축", "인", "묘", "진", "사", "오", "미", "신", "유", "술", "해",
];
const ZODIAC_ANIMALS: [&str; 12] = [
    "쥐", "소", "호랑이", "토끼", "용", "뱀", "말", "양", "원숭이", "닭", "개", "돼지",
];

/// Dates grégoriennes approchées des 24 termes solaires (mois, jour).
const SOLAR_TERMS: [(&str, u32, u32); 24] = [
    ("입춘", 2, 4),
    ("우수", 2, 19),
    ("경칩", 3, 6),
    ("춘분", 3, 21),
    ("청명", 4, 5),
    ("곡우", 4, 20),
    ("입하", 5, 6),
    ("소만", 5, 21),
    ("망종", 6, 6),
    ("하지", 6, 21),
    ("소서", 7, 7),
    ("대서", 7, 23),
    ("입추", 8, 8),
    ("처서", 8, 23),
    ("백로", 9, 8),
    ("추분", 9, 23),
    ("한로", 10, 8),
    ("상강", 10, 23),
    ("입동", 11, 7),
    ("소설", 11, 22),
    ("대설", 12, 7),
    ("동지", 12, 22),
    ("소한", 1, 6),
    ("대한", 1, 20),
];

/// Année sexagésimale (간지) d'une année lunaire. Ancre : 1984 = 갑자년.
pub fn ganzhi_year_label(lunar_year: i32) -> String {
    let cycle = (lunar_year - 1984).rem_euclid(60) as usize;
    format!(
        "{}{}({})년",
        HEAVENLY_STEMS[cycle % 10],
        EARTHLY_BRANCHES[cycle % 12],
        ZODIAC_ANIMALS[cycle % 12]
    )
}

/// Terme solaire dont la date approchée tombe à ±2 jours de la date donnée.
pub fn solar_term_for(month: u32, day: u32) -> Option<String> {
    SOLAR_TERMS
        .iter()
        .find(|&&(_, m, d)| m == month && (day as i32 - d as i32).abs() <= 2)
        .map(|&(name, _, _)| name.to_string())
}

pub fn korean_weekday(weekday: Weekday) -> String {
    let name = match weekday {
        Weekday::Mon => "월",
        Weekday::Tue => "화",
        Weekday::Wed => "수",
        Weekday::Thu => "목",
        Weekday::Fri => "금",
        Weekday::Sat => "토",
        Weekday::Sun => "일",
    };
    format!("{}요일", name)
}

/// Convertisseur lunaire coréen approché : année lunaire moyenne de 354
/// jours, mois moyen de 29,5 jours, ancré sur 1900-01-31 = 1er jour du
/// 1er mois lunaire 1900. Suffisant pour le compartimentage statistique ;
/// une conversion astronomique exacte relève d'un collaborateur externe.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxKoreanLunar;

impl ApproxKoreanLunar {
    const MEAN_LUNAR_YEAR_DAYS: i64 = 354;
    const MEAN_LUNAR_MONTH_DAYS: f64 = 29.5;

    fn epoch() -> NaiveDate {
        // Jamais None : date fixe valide.
        NaiveDate::from_ymd_opt(1900, 1, 31).unwrap()
    }
}

impl LunarConverter for ApproxKoreanLunar {
    fn convert(&self, date: NaiveDate) -> Result<CalendarInfo, EngineError> {
        let days = date.signed_duration_since(Self::epoch()).num_days();
        if days < 0 {
            return Err(EngineError::CalendarConversionFailed {
                date: date.to_string(),
            });
        }

        let lunar_year = 1900 + (days / Self::MEAN_LUNAR_YEAR_DAYS) as i32;
        let remaining = (days % Self::MEAN_LUNAR_YEAR_DAYS) as f64;

        let lunar_month = ((remaining / Self::MEAN_LUNAR_MONTH_DAYS) as u8 + 1).min(12);
        let lunar_day = ((remaining % Self::MEAN_LUNAR_MONTH_DAYS) as u8 + 1).clamp(1, 30);

        Ok(CalendarInfo {
            lunar_year,
            lunar_month,
            lunar_day,
            // L'approximation ne détecte pas les mois intercalaires.
            leap_month: false,
            ganzhi_year: Some(ganzhi_year_label(lunar_year)),
            solar_term: solar_term_for(date.month(), date.day()),
            weekday: korean_weekday(date.weekday()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ganzhi_anchor_1984() {
        assert_eq!(ganzhi_year_label(1984), "갑자(쥐)년");
    }

    #[test]
    fn test_ganzhi_known_years() {
        assert_eq!(ganzhi_year_label(2024), "갑진(용)년");
        assert_eq!(ganzhi_year_label(2025), "을사(뱀)년");
        // Cycle complet : 60 ans plus tard, même étiquette.
        assert_eq!(ganzhi_year_label(2044), ganzhi_year_label(1984));
    }

    #[test]
    fn test_ganzhi_before_anchor() {
        // rem_euclid garde un index positif avant 1984.
        assert_eq!(ganzhi_year_label(1924), "갑자(쥐)년");
    }

    #[test]
    fn test_solar_term_window() {
        assert_eq!(solar_term_for(2, 4).as_deref(), Some("입춘"));
        assert_eq!(solar_term_for(2, 6).as_deref(), Some("입춘"));
        assert_eq!(solar_term_for(2, 10), None);
        assert_eq!(solar_term_for(12, 22).as_deref(), Some("동지"));
    }

    #[test]
    fn test_convert_epoch() {
        let cal = ApproxKoreanLunar
            .convert(NaiveDate::from_ymd_opt(1900, 1, 31).unwrap())
            .unwrap();
        assert_eq!(cal.lunar_year, 1900);
        assert_eq!(cal.lunar_month, 1);
        assert_eq!(cal.lunar_day, 1);
        assert_eq!(cal.weekday, "수요일");
    }

    #[test]
    fn test_convert_before_epoch_fails() {
        let err = ApproxKoreanLunar
            .convert(NaiveDate::from_ymd_opt(1899, 12, 31).unwrap())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::EngineError::CalendarConversionFailed { .. }
        ));
    }

    #[test]
    fn test_convert_ranges() {
        // Les bornes mois/jour restent dans le domaine quel que soit le jour.
        let mut date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        for _ in 0..400 {
            let cal = ApproxKoreanLunar.convert(date).unwrap();
            assert!((1..=12).contains(&cal.lunar_month));
            assert!((1..=30).contains(&cal.lunar_day));
            date = date.succ_opt().unwrap();
        }
    }
}
