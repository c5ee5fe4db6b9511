use std::collections::BTreeMap;

use lotolune_db::models::{DrawRecord, POOL_SIZE};

use crate::frequency::{overall_table, Weights};

/// Comptes pondérés stockés en demi-unités (compte × 2) : les poids sont des
/// multiples de 0,5, la clé entière est donc exacte.
pub type CountKey = u64;

fn to_half_units(count: f64) -> CountKey {
    (count * 2.0).round() as CountKey
}

/// Numéros d'un tercile, sous-groupés par compte identique. Le tirage
/// aléatoire choisit d'abord une clé de compte, puis un numéro sous cette
/// clé.
#[derive(Debug, Clone, Default)]
pub struct CountGroup {
    keys: BTreeMap<CountKey, Vec<u8>>,
}

impl CountGroup {
    fn insert(&mut self, key: CountKey, number: u8) {
        self.keys.entry(key).or_default().push(number);
    }

    pub fn keys(&self) -> Vec<CountKey> {
        self.keys.keys().copied().collect()
    }

    pub fn numbers_for(&self, key: CountKey) -> &[u8] {
        self.keys.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn numbers(&self) -> Vec<u8> {
        self.keys.values().flatten().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.keys.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn min_key(&self) -> Option<CountKey> {
        self.keys.keys().next().copied()
    }

    pub fn max_key(&self) -> Option<CountKey> {
        self.keys.keys().next_back().copied()
    }
}

/// Les trois strates de comptes historiques : `low` = tiers le moins sorti,
/// `high` = tiers le plus sorti.
#[derive(Debug, Clone)]
pub struct TercileGroups {
    pub low: CountGroup,
    pub mid: CountGroup,
    pub high: CountGroup,
}

/// Partitionne les 45 numéros en trois terciles contigus par rang de compte
/// pondéré total (tri stable sur (compte, numéro)). Chemin indépendant du
/// calendrier : disponible dès qu'un tirage existe.
pub fn group_by_win_count(records: &[DrawRecord], weights: Weights) -> TercileGroups {
    let (_, table) = overall_table(records, weights);

    let mut ranked: Vec<(u8, CountKey)> = table
        .iter()
        .map(|(n, count)| (n, to_half_units(count)))
        .collect();
    ranked.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

    let tercile_size = (POOL_SIZE as usize).div_ceil(3);
    let mut groups = TercileGroups {
        low: CountGroup::default(),
        mid: CountGroup::default(),
        high: CountGroup::default(),
    };

    for (rank, (number, key)) in ranked.into_iter().enumerate() {
        let group = if rank < tercile_size {
            &mut groups.low
        } else if rank < tercile_size * 2 {
            &mut groups.mid
        } else {
            &mut groups.high
        };
        group.insert(key, number);
    }

    groups
}
