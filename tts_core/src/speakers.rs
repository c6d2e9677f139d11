/// Stock multi-speaker voices, used when the loaded model does not enumerate
/// its own speakers. Order matters: the first entry is the default speaker.
pub const FALLBACK_SPEAKERS: [&str; 30] = [
    "Claribel Dervla",
    "Daisy Studious",
    "Gracie Wise",
    "Tammie Ema",
    "Alison Dietlinde",
    "Ana Florence",
    "Annmarie Nele",
    "Asya Anara",
    "Brenda Stern",
    "Gitta Nikolina",
    "Henriette Usha",
    "Sofia Hellen",
    "Tammy Grit",
    "Tanja Adelina",
    "Vjollca Johnnie",
    "Andrew Chipper",
    "Badr Odhiambo",
    "Dionisio Schuyler",
    "Royston Min",
    "Viktor Eka",
    "Abrahan Mack",
    "Adde Michal",
    "Baldur Sanjin",
    "Craig Gutsy",
    "Damien Black",
    "Gilberto Mathias",
    "Ilkin Urbano",
    "Kazuhiko Atallah",
    "Ludvig Milivoj",
    "Suad Qasim",
];

/// Use the model's own speakers when it has any, the stock list otherwise.
pub fn resolve_speakers(from_model: Vec<String>) -> Vec<String> {
    if from_model.is_empty() {
        FALLBACK_SPEAKERS.iter().map(|s| s.to_string()).collect()
    } else {
        from_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_list_is_unique() {
        let mut names = FALLBACK_SPEAKERS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 30);
    }

    #[test]
    fn test_resolve_prefers_model_speakers() {
        let speakers = resolve_speakers(vec!["B".into(), "A".into()]);
        assert_eq!(speakers, vec!["B".to_string(), "A".to_string()]);
    }

    #[test]
    fn test_resolve_falls_back_in_order() {
        let speakers = resolve_speakers(Vec::new());
        assert_eq!(speakers.len(), 30);
        assert_eq!(speakers[0], "Claribel Dervla");
        assert_eq!(speakers[29], "Suad Qasim");
    }
}
