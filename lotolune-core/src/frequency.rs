use std::collections::BTreeMap;

use lotolune_db::models::{DrawRecord, POOL_SIZE};
use tracing::debug;

use crate::calendar::Dimension;

pub const POOL: usize = POOL_SIZE as usize;

/// Poids d'occurrence. Le bonus compte pour moitié — convention héritée de
/// l'historique du projet, sans justification statistique, donc gardée
/// configurable plutôt que codée en dur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub primary: f64,
    pub bonus: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            primary: 1.0,
            bonus: 0.5,
        }
    }
}

/// Table de fréquences pondérées, indexée sur le domaine fermé 1-45.
/// Reconstruite à chaque passe d'analyse, jamais mise en cache.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    counts: [f64; POOL],
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self {
            counts: [0.0; POOL],
        }
    }

    pub fn add_record(&mut self, record: &DrawRecord, weights: Weights) {
        for &n in &record.numbers {
            self.counts[(n - 1) as usize] += weights.primary;
        }
        self.counts[(record.bonus - 1) as usize] += weights.bonus;
    }

    pub fn count(&self, number: u8) -> f64 {
        self.counts[(number - 1) as usize]
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Paires (numéro, compte) pour tout le domaine 1-45.
    pub fn iter(&self) -> impl Iterator<Item = (u8, f64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &c)| ((i + 1) as u8, c))
    }

    /// Premier numéro par compte décroissant (égalité : numéro croissant).
    pub fn top_number(&self) -> u8 {
        let mut ranked: Vec<(u8, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        ranked[0].0
    }
}

/// Un compartiment calendaire : nombre de tirages contribuants et table de
/// fréquences associée.
#[derive(Debug, Clone)]
pub struct BucketStats {
    pub draws: u32,
    pub table: FrequencyTable,
}

impl BucketStats {
    fn new() -> Self {
        Self {
            draws: 0,
            table: FrequencyTable::new(),
        }
    }
}

/// Agrégation pure : plie l'historique dans des compartiments frais selon la
/// dimension calendaire demandée. Les tirages sans information calendaire
/// (conversion échouée) sont ignorés — tolérance de panne partielle, pas une
/// erreur.
pub fn aggregate(
    records: &[DrawRecord],
    dimension: Dimension,
    weights: Weights,
) -> BTreeMap<String, BucketStats> {
    let mut buckets: BTreeMap<String, BucketStats> = BTreeMap::new();

    for record in records {
        let Some(cal) = record.calendar.as_ref() else {
            debug!(draw_no = record.draw_no, "tirage sans info lunaire, ignoré");
            continue;
        };
        let Some(label) = dimension.label(cal) else {
            continue;
        };
        let bucket = buckets.entry(label).or_insert_with(BucketStats::new);
        bucket.draws += 1;
        bucket.table.add_record(record, weights);
    }

    buckets
}

/// Table globale, toutes dates confondues (chemin de repli indépendant du
/// calendrier : disponible dès qu'un tirage existe).
pub fn overall_table(records: &[DrawRecord], weights: Weights) -> (u32, FrequencyTable) {
    let mut table = FrequencyTable::new();
    for record in records {
        table.add_record(record, weights);
    }
    (records.len() as u32, table)
}

/// Fréquence pondérée et retard (tirages écoulés depuis la dernière sortie)
/// par numéro, sur un historique donné du plus récent au plus ancien.
#[derive(Debug, Clone)]
pub struct NumberStats {
    pub number: u8,
    pub count: f64,
    pub gap: u32,
}

pub fn compute_stats(records_recent_first: &[DrawRecord], weights: Weights) -> Vec<NumberStats> {
    let mut stats: Vec<NumberStats> = (1..=POOL_SIZE)
        .map(|n| NumberStats {
            number: n,
            count: 0.0,
            gap: u32::MAX,
        })
        .collect();

    for (i, record) in records_recent_first.iter().enumerate() {
        for &n in &record.numbers {
            let s = &mut stats[(n - 1) as usize];
            s.count += weights.primary;
            if s.gap == u32::MAX {
                s.gap = i as u32;
            }
        }
        let s = &mut stats[(record.bonus - 1) as usize];
        s.count += weights.bonus;
        if s.gap == u32::MAX {
            s.gap = i as u32;
        }
    }

    for s in &mut stats {
        if s.gap == u32::MAX {
            s.gap = records_recent_first.len() as u32;
        }
    }

    stats
}
