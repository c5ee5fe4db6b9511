use lotolune_db::models::{DrawRecord, PICK_COUNT};

use crate::frequency::{FrequencyTable, Weights};

/// Bandes numériques fixes pour l'équilibrage : basse, moyenne, haute.
pub const BANDS: [(u8, u8); 3] = [(1, 15), (16, 30), (31, 45)];

pub const BAND_NAMES: [&str; 3] = ["1-15", "16-30", "31-45"];

/// Profil statistique d'un mois lunaire : table filtrée, numéros chauds et
/// froids, probabilités par bande, somme moyenne d'une grille.
#[derive(Debug, Clone)]
pub struct MonthProfile {
    pub month: u8,
    pub total_draws: u32,
    pub table: FrequencyTable,
    /// Top 10 par fréquence décroissante.
    pub hot: Vec<(u8, f64)>,
    /// Bottom 10, rang 1 = le moins fréquent.
    pub cold: Vec<(u8, f64)>,
    /// Part des occurrences pondérées tombant dans chaque bande (0-1).
    pub range_probability: [f64; 3],
    /// Somme moyenne d'une grille de 6 numéros pour ce mois.
    pub average_sum: f64,
}

const HOT_COLD_SIZE: usize = 10;

/// Construit le profil d'un mois lunaire à partir des tirages dont
/// l'annotation calendaire porte ce mois. Les tirages sans annotation sont
/// ignorés.
pub fn month_profile(records: &[DrawRecord], month: u8, weights: Weights) -> MonthProfile {
    let mut table = FrequencyTable::new();
    let mut total_draws = 0u32;
    let mut weighted_sum = 0.0f64;
    let mut weighted_n = 0.0f64;

    for record in records {
        let Some(cal) = record.calendar.as_ref() else {
            continue;
        };
        if cal.lunar_month != month {
            continue;
        }
        total_draws += 1;
        table.add_record(record, weights);
        for &n in &record.numbers {
            weighted_sum += n as f64 * weights.primary;
            weighted_n += weights.primary;
        }
        weighted_sum += record.bonus as f64 * weights.bonus;
        weighted_n += weights.bonus;
    }

    // Classement par fréquence décroissante, égalités par numéro croissant.
    let mut ranked: Vec<(u8, f64)> = table.iter().collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let hot: Vec<(u8, f64)> = ranked.iter().take(HOT_COLD_SIZE).copied().collect();
    let cold: Vec<(u8, f64)> = ranked
        .iter()
        .rev()
        .take(HOT_COLD_SIZE)
        .copied()
        .collect();

    let mut band_counts = [0.0f64; 3];
    for (n, count) in table.iter() {
        for (i, &(lo, hi)) in BANDS.iter().enumerate() {
            if (lo..=hi).contains(&n) {
                band_counts[i] += count;
            }
        }
    }
    let band_total: f64 = band_counts.iter().sum();
    let range_probability = if band_total > 0.0 {
        [
            band_counts[0] / band_total,
            band_counts[1] / band_total,
            band_counts[2] / band_total,
        ]
    } else {
        [0.0; 3]
    };

    let average_sum = if weighted_n > 0.0 {
        weighted_sum / weighted_n * PICK_COUNT as f64
    } else {
        0.0
    };

    MonthProfile {
        month,
        total_draws,
        table,
        hot,
        cold,
        range_probability,
        average_sum,
    }
}
