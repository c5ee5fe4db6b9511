use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use lotolune_core::bias::{BiasEntry, Tier};
use lotolune_core::calendar::{korean_month_name, Decile};
use lotolune_core::frequency::NumberStats;
use lotolune_core::monthly::{MonthProfile, BAND_NAMES};
use lotolune_core::strategy::RecommendedSet;
use lotolune_db::models::{CalendarInfo, DrawRecord};

use crate::import::ImportResult;

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn numbers_str(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

fn lunar_str(cal: &Option<CalendarInfo>) -> String {
    match cal {
        Some(c) => format!(
            "{} {}일 ({})",
            korean_month_name(c.lunar_month),
            c.lunar_day,
            Decile::from_day(c.lunar_day)
        ),
        None => "—".to_string(),
    }
}

pub fn display_draws(draws: &[DrawRecord]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = new_table(vec!["Tirage", "Date", "Lunaire", "Numéros", "Bonus"]);
    for draw in draws {
        let mut sorted = draw.numbers;
        sorted.sort();
        table.add_row(vec![
            draw.draw_no.to_string(),
            draw.date.clone(),
            lunar_str(&draw.calendar),
            numbers_str(&sorted),
            format!("{:2}", draw.bonus),
        ]);
    }
    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues    : {}", result.total_records);
    println!("  Insérés              : {}", result.inserted);
    println!("  Doublons ignorés     : {}", result.skipped);
    println!("  Conversions échouées : {}", result.conversion_failed);
    if result.errors > 0 {
        println!("  Erreurs              : {}", result.errors);
    }
}

pub fn display_stats(stats: &[NumberStats], window: u32) {
    println!("\n📊 Fréquences pondérées sur les {} derniers tirages\n", window);

    let mut table = new_table(vec!["Numéro", "Compte pondéré", "Retard"]);
    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| {
        b.count
            .partial_cmp(&a.count)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.number.cmp(&b.number))
    });
    for stat in &sorted {
        table.add_row(vec![
            format!("{:2}", stat.number),
            format!("{:.1}", stat.count),
            stat.gap.to_string(),
        ]);
    }
    println!("{table}");
}

pub fn display_bias_bucket(label: &str, draws: u32, entries: &[BiasEntry], top: usize) {
    println!("\n── Compartiment « {} » ({} tirages) ──", label, draws);

    let mut ranked: Vec<&BiasEntry> = entries.iter().collect();
    ranked.sort_by(|a, b| {
        b.bias
            .partial_cmp(&a.bias)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.number.cmp(&b.number))
    });

    let mut table = new_table(vec!["Numéro", "Compte", "Fréquence", "Biais", "Niveau"]);
    for entry in ranked.iter().take(top) {
        let color = match entry.tier {
            Tier::High => Color::Green,
            Tier::Low => Color::Red,
            Tier::Normal => Color::White,
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", entry.number)),
            Cell::new(format!("{:.1}", entry.count)),
            Cell::new(format!("{:.4}", entry.frequency)),
            Cell::new(format!("{:.2}", entry.bias)),
            Cell::new(entry.tier.to_string()).fg(color),
        ]);
    }
    println!("{table}");
}

pub fn display_month_profile(profile: &MonthProfile) {
    println!(
        "\n📅 {} — {} tirages analysés",
        korean_month_name(profile.month),
        profile.total_draws
    );
    println!("  Somme moyenne d'une grille : {:.1}", profile.average_sum);
    for (i, name) in BAND_NAMES.iter().enumerate() {
        println!(
            "  Bande {} : {:.1} %",
            name,
            profile.range_probability[i] * 100.0
        );
    }

    let hot = profile
        .hot
        .iter()
        .take(5)
        .map(|(n, _)| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let cold = profile
        .cold
        .iter()
        .take(5)
        .map(|(n, _)| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    println!("  Numéros chauds : {}", hot);
    println!("  Numéros froids : {}", cold);
}

pub fn display_today_lunar(cal: &CalendarInfo) {
    println!(
        "🌙 Aujourd'hui : {} {}일 ({}), année {}",
        korean_month_name(cal.lunar_month),
        cal.lunar_day,
        Decile::from_day(cal.lunar_day),
        cal.ganzhi_year.as_deref().unwrap_or("?")
    );
}

pub fn display_sets(sets: &[RecommendedSet], strategy_name: &str) {
    println!("\n🎲 Grilles recommandées ({strategy_name})\n");

    let mut table = new_table(vec!["#", "Numéros"]);
    for (i, set) in sets.iter().enumerate() {
        table.add_row(vec![format!("{}", i + 1), set.to_string()]);
    }
    println!("{table}");
}
