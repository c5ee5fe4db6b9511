use thiserror::Error;

/// Taxonomie des échecs du moteur. Seul `DataUnavailable` remonte jusqu'à
/// l'appelant ; les autres conditions sont absorbées localement (tirage
/// ignoré, repli de stratégie, élargissement du tirage aléatoire).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Aucun tirage en base : impossible de produire une recommandation")]
    DataUnavailable,

    #[error("Conversion lunaire impossible pour la date {date}")]
    CalendarConversionFailed { date: String },

    #[error("Aucun tirage dans le compartiment « {bucket} »")]
    EmptyBucket { bucket: String },

    #[error("Groupe de terciles épuisé pendant le remplissage")]
    ExhaustedGroup,
}
