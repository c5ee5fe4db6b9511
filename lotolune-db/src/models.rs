use anyhow::{bail, Result};

/// Taille du pool Lotto 6/45 coréen.
pub const POOL_SIZE: u8 = 45;
/// Nombre de numéros principaux par tirage.
pub const PICK_COUNT: usize = 6;

/// Annotation calendaire d'un tirage, dérivée de la date solaire par le
/// convertisseur lunaire. Produite une fois, jamais modifiée par le moteur.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarInfo {
    pub lunar_year: i32,
    /// Mois lunaire, 1-12.
    pub lunar_month: u8,
    /// Jour lunaire, 1-30.
    pub lunar_day: u8,
    pub leap_month: bool,
    /// Année sexagésimale (간지), ex. "갑자(쥐)년".
    pub ganzhi_year: Option<String>,
    /// Terme solaire (절기), ex. "입춘", si la date en croise un.
    pub solar_term: Option<String>,
    /// Jour de la semaine, ex. "토요일".
    pub weekday: String,
}

#[derive(Debug, Clone)]
pub struct DrawRecord {
    /// Numéro de tirage (회차), unique et strictement croissant.
    pub draw_no: u32,
    /// Date solaire ISO (YYYY-MM-DD).
    pub date: String,
    pub numbers: [u8; PICK_COUNT],
    pub bonus: u8,
    /// None si la conversion lunaire a échoué pour cette date : le tirage
    /// reste compté dans les analyses globales mais sort des analyses
    /// calendaires.
    pub calendar: Option<CalendarInfo>,
}

pub fn validate_record(numbers: &[u8; PICK_COUNT], bonus: u8) -> Result<()> {
    for &n in numbers {
        if n < 1 || n > POOL_SIZE {
            bail!("Numéro {} hors limites (1-{})", n, POOL_SIZE);
        }
    }
    if bonus < 1 || bonus > POOL_SIZE {
        bail!("Bonus {} hors limites (1-{})", bonus, POOL_SIZE);
    }
    for i in 0..numbers.len() {
        for j in (i + 1)..numbers.len() {
            if numbers[i] == numbers[j] {
                bail!("Numéro en double : {}", numbers[i]);
            }
        }
    }
    Ok(())
}
