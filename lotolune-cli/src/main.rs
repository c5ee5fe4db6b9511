mod display;
mod import;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use lotolune_core::bias::{analyze, Thresholds};
use lotolune_core::calendar::Dimension;
use lotolune_core::frequency::{compute_stats, Weights};
use lotolune_core::lunar::{ApproxKoreanLunar, LunarConverter};
use lotolune_core::monthly::month_profile;
use lotolune_core::store::DrawStore;
use lotolune_core::strategy::{
    date_seed, LunarTiered, MonthRangeBalanced, SetStrategy, WinCountTercile,
};
use lotolune_db::db::{
    count_draws, db_path, fetch_all_draws, fetch_last_draws, insert_draw, migrate, open_db,
};
use lotolune_db::models::{validate_record, DrawRecord, PICK_COUNT};

use crate::display::{
    display_bias_bucket, display_draws, display_import_summary, display_month_profile,
    display_sets, display_stats, display_today_lunar,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DimensionArg {
    LunarMonth,
    GanzhiYear,
    SolarTerm,
    DayDecile,
    Weekday,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::LunarMonth => Dimension::LunarMonth,
            DimensionArg::GanzhiYear => Dimension::SexagenaryYear,
            DimensionArg::SolarTerm => Dimension::SolarTerm,
            DimensionArg::DayDecile => Dimension::DayDecile,
            DimensionArg::Weekday => Dimension::Weekday,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum StrategyArg {
    /// Compartiments calendaires du jour (mois, décade, jour lunaires)
    #[default]
    Lunar,
    /// Terciles de sorties historiques, indépendant du calendrier
    WinCount,
    /// Mois lunaire ciblé, chaud/froid et équilibrage par bande
    Monthly,
}

#[derive(Parser)]
#[command(name = "lotolune", about = "Analyseur lunaire du Lotto 6/45 coréen")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer l'archive des tirages depuis un fichier JSON
    Import {
        /// Chemin vers le fichier JSON
        #[arg(short, long, default_value = "assets/lotto_draws.json")]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Lister les derniers tirages avec leur annotation lunaire
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher les fréquences pondérées et retards
    Stats {
        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: u32,
    },

    /// Analyser le biais par compartiment calendaire
    Analyze {
        /// Dimension de compartimentage
        #[arg(short, long, default_value = "lunar-month")]
        dimension: DimensionArg,

        /// Restreindre à un compartiment (ex: "1", "초순", "입춘")
        #[arg(short, long)]
        bucket: Option<String>,

        /// Nombre de numéros affichés par compartiment
        #[arg(short, long, default_value = "10")]
        top: usize,
    },

    /// Profil statistique d'un mois lunaire
    Monthly {
        /// Mois lunaire (1-12), défaut : le mois courant
        #[arg(short, long)]
        month: Option<u8>,
    },

    /// Recommander des grilles
    Recommend {
        /// Stratégie de synthèse
        #[arg(short, long, default_value = "lunar")]
        strategy: StrategyArg,

        /// Mois lunaire ciblé (stratégie monthly), défaut : le mois courant
        #[arg(short, long)]
        month: Option<u8>,

        /// Date solaire de référence (YYYY-MM-DD), défaut : aujourd'hui
        #[arg(short, long)]
        date: Option<String>,

        /// Nombre de grilles
        #[arg(short, long, default_value = "5")]
        count: usize,

        /// Seed pour la reproductibilité (défaut : date du jour YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Ajouter un tirage manuellement
    Add,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window } => cmd_stats(&conn, window),
        Command::Analyze {
            dimension,
            bucket,
            top,
        } => cmd_analyze(&conn, dimension, bucket, top),
        Command::Monthly { month } => cmd_monthly(&conn, month),
        Command::Recommend {
            strategy,
            month,
            date,
            count,
            seed,
        } => cmd_recommend(&conn, strategy, month, date, count, seed),
        Command::Add => cmd_add(&conn),
    }
}

fn cmd_import(conn: &lotolune_db::rusqlite::Connection, file: &PathBuf) -> Result<()> {
    let result = import::import_json(conn, file, &ApproxKoreanLunar)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_list(conn: &lotolune_db::rusqlite::Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotolune import");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &lotolune_db::rusqlite::Connection, window: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotolune import");
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_last_draws(conn, effective_window)?;
    let stats = compute_stats(&draws, Weights::default());
    display_stats(&stats, effective_window);
    Ok(())
}

fn cmd_analyze(
    conn: &lotolune_db::rusqlite::Connection,
    dimension: DimensionArg,
    bucket: Option<String>,
    top: usize,
) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotolune import");
        return Ok(());
    }
    let records = fetch_all_draws(conn)?;
    let dimension: Dimension = dimension.into();
    let tables = analyze(&records, dimension, Weights::default(), Thresholds::default());

    if tables.is_empty() {
        println!("Aucune donnée calendaire pour la dimension « {} ».", dimension);
        return Ok(());
    }

    println!("🌙 Analyse de biais — {}", dimension);

    // Le nombre de tirages par compartiment ressort de l'agrégation brute.
    let buckets = lotolune_core::frequency::aggregate(&records, dimension, Weights::default());

    match bucket {
        Some(label) => {
            let Some(entries) = tables.get(&label) else {
                bail!("Compartiment « {} » introuvable pour cette dimension", label);
            };
            display_bias_bucket(&label, buckets[&label].draws, entries, top);
        }
        None => {
            for (label, entries) in &tables {
                display_bias_bucket(label, buckets[label].draws, entries, top);
            }
        }
    }
    Ok(())
}

/// Mois lunaire courant via le convertisseur approché.
fn current_lunar_month() -> Result<u8> {
    let today = chrono::Local::now().date_naive();
    let cal = ApproxKoreanLunar
        .convert(today)
        .context("Conversion lunaire de la date du jour impossible")?;
    Ok(cal.lunar_month)
}

fn cmd_monthly(conn: &lotolune_db::rusqlite::Connection, month: Option<u8>) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : lotolune import");
        return Ok(());
    }
    let month = match month {
        Some(m) if (1..=12).contains(&m) => m,
        Some(m) => bail!("Mois lunaire invalide : {} (attendu 1-12)", m),
        None => current_lunar_month()?,
    };
    let records = fetch_all_draws(conn)?;
    let profile = month_profile(&records, month, Weights::default());
    display_month_profile(&profile);
    Ok(())
}

fn cmd_recommend(
    conn: &lotolune_db::rusqlite::Connection,
    strategy: StrategyArg,
    month: Option<u8>,
    date: Option<String>,
    count: usize,
    seed: Option<u64>,
) -> Result<()> {
    let records = fetch_all_draws(conn)?;
    let store = DrawStore::from_records(records);

    let strategy: Box<dyn SetStrategy> = match strategy {
        StrategyArg::Lunar => {
            let date = match date {
                Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .with_context(|| format!("Date invalide : '{}'", s))?,
                None => chrono::Local::now().date_naive(),
            };
            let today = ApproxKoreanLunar
                .convert(date)
                .with_context(|| format!("Conversion lunaire impossible pour {}", date))?;
            display_today_lunar(&today);
            Box::new(LunarTiered::new(today))
        }
        StrategyArg::WinCount => Box::new(WinCountTercile::default()),
        StrategyArg::Monthly => {
            let month = match month {
                Some(m) if (1..=12).contains(&m) => m,
                Some(m) => bail!("Mois lunaire invalide : {} (attendu 1-12)", m),
                None => current_lunar_month()?,
            };
            Box::new(MonthRangeBalanced::new(month))
        }
    };

    let effective_seed = seed.unwrap_or_else(|| {
        let ds = date_seed();
        println!("(Seed du jour : {ds})");
        ds
    });
    let mut rng = StdRng::seed_from_u64(effective_seed);

    let sets = strategy
        .generate(&store, count, &mut rng)
        .context("Échec de la recommandation")?;
    display_sets(&sets, strategy.name());
    Ok(())
}

fn cmd_add(conn: &lotolune_db::rusqlite::Connection) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let draw_no: u32 = prompt("Numéro de tirage (ex: 1154) : ")?
        .parse()
        .context("Numéro de tirage invalide")?;
    let raw_date = prompt("Date solaire (YYYY-MM-DD) : ")?;
    let date = NaiveDate::parse_from_str(&raw_date, "%Y-%m-%d")
        .context("Format de date invalide")?;

    let numbers = prompt_numbers()?;
    let bonus = prompt_bonus(&numbers)?;

    let calendar = ApproxKoreanLunar.convert(date).ok();
    if calendar.is_none() {
        println!("(Conversion lunaire impossible : tirage inséré sans annotation)");
    }

    let record = DrawRecord {
        draw_no,
        date: raw_date,
        numbers,
        bonus,
        calendar,
    };

    println!("\nTirage à insérer :");
    display_draws(&[record.clone()]);

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        if insert_draw(conn, &record)? {
            println!("Tirage inséré avec succès.");
        } else {
            println!("Ce tirage existe déjà (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

fn prompt_numbers() -> Result<[u8; PICK_COUNT]> {
    loop {
        let input = prompt("6 numéros (séparés par des espaces, 1-45) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == PICK_COUNT => {
                let arr = [v[0], v[1], v[2], v[3], v[4], v[5]];
                if validate_record(&arr, 1).is_ok() {
                    return Ok(arr);
                }
                println!("Numéros invalides (1-45, pas de doublons). Réessayez.");
            }
            _ => println!("Entrez exactement {} numéros. Réessayez.", PICK_COUNT),
        }
    }
}

fn prompt_bonus(numbers: &[u8; PICK_COUNT]) -> Result<u8> {
    loop {
        let input = prompt("Bonus (1-45) : ")?;
        match input.parse::<u8>() {
            Ok(b) if validate_record(numbers, b).is_ok() => return Ok(b),
            _ => println!("Bonus invalide (1-45). Réessayez."),
        }
    }
}
