use lotolune_db::models::CalendarInfo;

/// Dimension calendaire servant de clé de compartimentage pour l'analyse
/// de fréquences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    LunarMonth,
    SexagenaryYear,
    SolarTerm,
    DayDecile,
    Weekday,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::LunarMonth,
        Dimension::SexagenaryYear,
        Dimension::SolarTerm,
        Dimension::DayDecile,
        Dimension::Weekday,
    ];

    /// Étiquette de compartiment pour un tirage donné. `None` si
    /// l'information calendaire requise manque (terme solaire absent,
    /// année sexagésimale inconnue) : le tirage sort alors de l'analyse
    /// pour cette dimension.
    pub fn label(&self, cal: &CalendarInfo) -> Option<String> {
        match self {
            Dimension::LunarMonth => Some(cal.lunar_month.to_string()),
            Dimension::SexagenaryYear => cal.ganzhi_year.clone(),
            Dimension::SolarTerm => cal.solar_term.clone(),
            Dimension::DayDecile => Some(Decile::from_day(cal.lunar_day).to_string()),
            Dimension::Weekday => Some(cal.weekday.clone()),
        }
    }
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dimension::LunarMonth => write!(f, "mois lunaire"),
            Dimension::SexagenaryYear => write!(f, "année sexagésimale (간지)"),
            Dimension::SolarTerm => write!(f, "terme solaire (절기)"),
            Dimension::DayDecile => write!(f, "décade lunaire"),
            Dimension::Weekday => write!(f, "jour de la semaine"),
        }
    }
}

/// Décade du mois lunaire : 초순 (1-10), 중순 (11-20), 말순 (21-30).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decile {
    Early,
    Mid,
    Late,
}

impl Decile {
    pub fn from_day(day: u8) -> Self {
        match day {
            0..=10 => Decile::Early,
            11..=20 => Decile::Mid,
            _ => Decile::Late,
        }
    }
}

impl std::fmt::Display for Decile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decile::Early => write!(f, "초순"),
            Decile::Mid => write!(f, "중순"),
            Decile::Late => write!(f, "말순"),
        }
    }
}

const KOREAN_MONTH_NAMES: [&str; 12] = [
    "정월", "이월", "삼월", "사월", "오월", "유월",
    "칠월", "팔월", "구월", "시월", "동월", "섣달",
];

/// Nom traditionnel coréen du mois lunaire (1-12).
pub fn korean_month_name(month: u8) -> String {
    if (1..=12).contains(&month) {
        KOREAN_MONTH_NAMES[(month - 1) as usize].to_string()
    } else {
        format!("{}월", month)
    }
}
