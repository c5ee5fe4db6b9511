use std::collections::BTreeMap;

use lotolune_db::models::{DrawRecord, PICK_COUNT, POOL_SIZE};

use crate::calendar::Dimension;
use crate::frequency::{aggregate, FrequencyTable, Weights, POOL};

/// Niveau de préférence d'un numéro dans un compartiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    High,
    Normal,
    Low,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::High => write!(f, "HIGH"),
            Tier::Normal => write!(f, "-"),
            Tier::Low => write!(f, "LOW"),
        }
    }
}

/// Seuils de classification du biais. Les valeurs 1.1/0.9 viennent de
/// l'historique du projet ; elles ne découlent d'aucun principe statistique,
/// d'où leur statut de paramètre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub high: f64,
    pub low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { high: 1.1, low: 0.9 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BiasEntry {
    pub number: u8,
    pub count: f64,
    /// count / (tirages × 6).
    pub frequency: f64,
    /// frequency / (1/45).
    pub bias: f64,
    pub tier: Tier,
}

/// Classe les 45 numéros d'un compartiment. Compartiment vide : fréquence et
/// biais nuls, niveau Normal — un compartiment sans données n'est pas un
/// compartiment « froid ».
pub fn classify(table: &FrequencyTable, draws: u32, thresholds: Thresholds) -> Vec<BiasEntry> {
    let expected = 1.0 / POOL as f64;
    let denominator = draws as f64 * PICK_COUNT as f64;

    (1..=POOL_SIZE)
        .map(|n| {
            let count = table.count(n);
            let (frequency, bias, tier) = if draws == 0 {
                (0.0, 0.0, Tier::Normal)
            } else {
                let frequency = count / denominator;
                let bias = frequency / expected;
                let tier = if bias > thresholds.high {
                    Tier::High
                } else if bias < thresholds.low {
                    Tier::Low
                } else {
                    Tier::Normal
                };
                (frequency, bias, tier)
            };
            BiasEntry {
                number: n,
                count,
                frequency,
                bias,
                tier,
            }
        })
        .collect()
}

/// Inspection d'une dimension complète : agrégation puis classification de
/// chaque compartiment. Pure et idempotente — deux appels sur le même
/// historique rendent exactement les mêmes tables.
pub fn analyze(
    records: &[DrawRecord],
    dimension: Dimension,
    weights: Weights,
    thresholds: Thresholds,
) -> BTreeMap<String, Vec<BiasEntry>> {
    aggregate(records, dimension, weights)
        .into_iter()
        .map(|(label, stats)| (label, classify(&stats.table, stats.draws, thresholds)))
        .collect()
}

/// Numéros du niveau High, biais décroissant (égalité : numéro croissant).
pub fn high_tier_ranked(entries: &[BiasEntry]) -> Vec<u8> {
    let mut high: Vec<&BiasEntry> = entries.iter().filter(|e| e.tier == Tier::High).collect();
    high.sort_by(|a, b| {
        b.bias
            .partial_cmp(&a.bias)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.number.cmp(&b.number))
    });
    high.into_iter().map(|e| e.number).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::overall_table;
    use crate::store::testutil::lunar_record;

    #[test]
    fn test_tiers_partition_domain() {
        let records = vec![
            lunar_record(1, [1, 2, 3, 4, 5, 6], 7, 1, 5),
            lunar_record(2, [1, 2, 3, 10, 11, 12], 13, 1, 6),
        ];
        let (draws, table) = overall_table(&records, Weights::default());
        let entries = classify(&table, draws, Thresholds::default());

        assert_eq!(entries.len(), 45);
        for (i, e) in entries.iter().enumerate() {
            assert_eq!(e.number, (i + 1) as u8);
        }
        // Chaque numéro porte exactement un niveau : la partition est
        // structurelle, on vérifie le domaine complet.
        let numbers: Vec<u8> = entries.iter().map(|e| e.number).collect();
        let expected: Vec<u8> = (1..=45).collect();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn test_single_draw_worked_example() {
        // Un tirage {1..6, bonus 7} au mois lunaire 1 : biais des numéros
        // principaux = (1/6)/(1/45) = 7.5, bonus = moitié.
        let records = vec![lunar_record(1, [1, 2, 3, 4, 5, 6], 7, 1, 5)];
        let tables = analyze(
            &records,
            Dimension::LunarMonth,
            Weights::default(),
            Thresholds::default(),
        );
        let entries = &tables["1"];

        for n in 1..=6u8 {
            let e = &entries[(n - 1) as usize];
            assert!((e.count - 1.0).abs() < 1e-9);
            assert!((e.bias - 7.5).abs() < 1e-9, "bias({}) = {}", n, e.bias);
            assert_eq!(e.tier, Tier::High);
        }
        let bonus = &entries[6];
        assert!((bonus.count - 0.5).abs() < 1e-9);
        assert!((bonus.bias - 3.75).abs() < 1e-9);
        for n in 8..=45u8 {
            let e = &entries[(n - 1) as usize];
            assert!((e.count - 0.0).abs() < 1e-9);
            assert_eq!(e.tier, Tier::Low);
        }
    }

    #[test]
    fn test_zero_draws_all_normal() {
        let table = FrequencyTable::new();
        let entries = classify(&table, 0, Thresholds::default());
        for e in &entries {
            assert_eq!(e.frequency, 0.0);
            assert_eq!(e.bias, 0.0);
            assert_eq!(e.tier, Tier::Normal);
        }
    }

    #[test]
    fn test_analyze_idempotent() {
        let records = vec![
            lunar_record(1, [1, 2, 3, 4, 5, 6], 7, 1, 5),
            lunar_record(2, [7, 8, 9, 10, 11, 12], 13, 2, 15),
        ];
        let a = analyze(
            &records,
            Dimension::LunarMonth,
            Weights::default(),
            Thresholds::default(),
        );
        let b = analyze(
            &records,
            Dimension::LunarMonth,
            Weights::default(),
            Thresholds::default(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_high_tier_ranking() {
        let records = vec![
            lunar_record(1, [1, 2, 3, 4, 5, 6], 7, 1, 5),
            lunar_record(2, [1, 2, 3, 4, 5, 6], 8, 1, 6),
            lunar_record(3, [1, 2, 10, 11, 12, 13], 9, 1, 7),
        ];
        let (draws, table) = overall_table(&records, Weights::default());
        let entries = classify(&table, draws, Thresholds::default());
        let ranked = high_tier_ranked(&entries);

        // 1 et 2 (3 sorties) devant 3-6 (2 sorties), égalités par numéro.
        assert_eq!(&ranked[0..2], &[1, 2]);
        assert!(ranked.contains(&3));
    }
}
