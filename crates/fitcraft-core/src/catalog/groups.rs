//! Muscle-group classification of catalog entries.
//!
//! The catalog service uses free-form Portuguese categories ("Peitoral",
//! "Costas", "Pernas", ...). Manual plan building works on a fixed set of
//! groups, so categories are mapped with accent-tolerant substring rules.
//! Leg exercises are split into quadriceps and hamstrings by name keywords.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::{Catalog, CatalogEntry};

/// Fixed muscle groups offered when building a plan by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MuscleGroup {
    Peitoral,
    Dorsais,
    Ombros,
    Biceps,
    Triceps,
    Quadriceps,
    PosterioresDeCoxa,
    Gluteos,
    Panturrilhas,
    Trapezio,
    EretoresDaEspinha,
    CardioAcademia,
    Abdomen,
    Antebracos,
}

impl MuscleGroup {
    /// Every group, in display order.
    pub const ALL: [MuscleGroup; 14] = [
        Self::Peitoral,
        Self::Dorsais,
        Self::Ombros,
        Self::Biceps,
        Self::Triceps,
        Self::Quadriceps,
        Self::PosterioresDeCoxa,
        Self::Gluteos,
        Self::Panturrilhas,
        Self::Trapezio,
        Self::EretoresDaEspinha,
        Self::CardioAcademia,
        Self::Abdomen,
        Self::Antebracos,
    ];

    /// Stable key (e.g. `posteriores_de_coxa`).
    pub fn key(self) -> &'static str {
        match self {
            Self::Peitoral => "peitoral",
            Self::Dorsais => "dorsais",
            Self::Ombros => "ombros",
            Self::Biceps => "biceps",
            Self::Triceps => "triceps",
            Self::Quadriceps => "quadriceps",
            Self::PosterioresDeCoxa => "posteriores_de_coxa",
            Self::Gluteos => "gluteos",
            Self::Panturrilhas => "panturrilhas",
            Self::Trapezio => "trapezio",
            Self::EretoresDaEspinha => "eretores_da_espinha",
            Self::CardioAcademia => "cardio_academia",
            Self::Abdomen => "abdomen",
            Self::Antebracos => "antebracos",
        }
    }

    /// Display label in Portuguese.
    pub fn label(self) -> &'static str {
        match self {
            Self::Peitoral => "Peitoral",
            Self::Dorsais => "Dorsais",
            Self::Ombros => "Ombros",
            Self::Biceps => "Bíceps",
            Self::Triceps => "Tríceps",
            Self::Quadriceps => "Quadríceps",
            Self::PosterioresDeCoxa => "Posteriores de Coxa",
            Self::Gluteos => "Glúteos",
            Self::Panturrilhas => "Panturrilhas",
            Self::Trapezio => "Trapézio",
            Self::EretoresDaEspinha => "Eretores da Espinha",
            Self::CardioAcademia => "Cardio Academia",
            Self::Abdomen => "Abdômen",
            Self::Antebracos => "Antebraços",
        }
    }

    /// Classify a catalog entry, or `None` for unknown categories.
    pub fn classify(entry: &CatalogEntry) -> Option<Self> {
        let category = fold(&entry.category);
        let has = |needle: &str| category.contains(needle);

        let group = if has("peitoral") {
            Self::Peitoral
        } else if has("costas") || has("dorsais") {
            Self::Dorsais
        } else if has("ombros") {
            Self::Ombros
        } else if has("biceps") {
            Self::Biceps
        } else if has("triceps") {
            Self::Triceps
        } else if has("pernas") {
            Self::classify_leg(&entry.name)
        } else if has("gluteos") {
            Self::Gluteos
        } else if has("panturr") {
            Self::Panturrilhas
        } else if has("trapezio") {
            Self::Trapezio
        } else if has("eretores") {
            Self::EretoresDaEspinha
        } else if has("cardio") {
            Self::CardioAcademia
        } else if has("abdomen") {
            Self::Abdomen
        } else if has("antebra") {
            Self::Antebracos
        } else {
            return None;
        };
        Some(group)
    }

    fn classify_leg(name: &str) -> Self {
        const POSTERIOR_KEYWORDS: [&str; 5] =
            ["flexor", "flexora", "stiff", "levantamento terra", "romeno"];
        let name = name.to_lowercase();
        if POSTERIOR_KEYWORDS.iter().any(|k| name.contains(k)) {
            Self::PosterioresDeCoxa
        } else {
            Self::Quadriceps
        }
    }
}

impl fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MuscleGroup {
    type Err = MuscleGroupParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.key() == s)
            .ok_or_else(|| MuscleGroupParseError(s.to_owned()))
    }
}

/// Error returned when parsing an invalid [`MuscleGroup`] key.
#[derive(Debug, Clone)]
pub struct MuscleGroupParseError(pub String);

impl fmt::Display for MuscleGroupParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid muscle group: {:?}", self.0)
    }
}

impl std::error::Error for MuscleGroupParseError {}

/// Exercise names per muscle group, deduplicated and sorted.
///
/// Every group is present in the result, possibly with an empty list.
pub fn group_by_muscle(catalog: &Catalog) -> BTreeMap<MuscleGroup, Vec<String>> {
    let mut groups: BTreeMap<MuscleGroup, Vec<String>> =
        MuscleGroup::ALL.into_iter().map(|g| (g, Vec::new())).collect();

    for entry in catalog.entries() {
        if let Some(group) = MuscleGroup::classify(entry) {
            groups.entry(group).or_default().push(entry.name.clone());
        }
    }

    for names in groups.values_mut() {
        names.sort_by(|a, b| fold(a).cmp(&fold(b)).then_with(|| a.cmp(b)));
        names.dedup();
    }
    groups
}

/// Lowercase and strip Portuguese diacritics.
fn fold(s: &str) -> String {
    s.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, category: &str) -> CatalogEntry {
        CatalogEntry::new(name, category, format!("/{name}.gif"))
    }

    #[test]
    fn classify_accented_categories() {
        assert_eq!(
            MuscleGroup::classify(&entry("Rosca Direta", "Bíceps")),
            Some(MuscleGroup::Biceps)
        );
        assert_eq!(
            MuscleGroup::classify(&entry("Tríceps Testa", "TRÍCEPS")),
            Some(MuscleGroup::Triceps)
        );
        assert_eq!(
            MuscleGroup::classify(&entry("Abdominal Supra", "Abdômen")),
            Some(MuscleGroup::Abdomen)
        );
        assert_eq!(
            MuscleGroup::classify(&entry("Rosca Punho", "Antebraços")),
            Some(MuscleGroup::Antebracos)
        );
    }

    #[test]
    fn classify_back_aliases() {
        assert_eq!(
            MuscleGroup::classify(&entry("Puxada Frontal", "Costas")),
            Some(MuscleGroup::Dorsais)
        );
        assert_eq!(
            MuscleGroup::classify(&entry("Pulldown", "Dorsais")),
            Some(MuscleGroup::Dorsais)
        );
    }

    #[test]
    fn classify_legs_by_name() {
        assert_eq!(
            MuscleGroup::classify(&entry("Mesa Flexora", "Pernas")),
            Some(MuscleGroup::PosterioresDeCoxa)
        );
        assert_eq!(
            MuscleGroup::classify(&entry("Levantamento Terra Romeno", "Pernas")),
            Some(MuscleGroup::PosterioresDeCoxa)
        );
        assert_eq!(
            MuscleGroup::classify(&entry("Leg Press 45", "Pernas")),
            Some(MuscleGroup::Quadriceps)
        );
        assert_eq!(
            MuscleGroup::classify(&entry("Cadeira Abdutora", "Pernas")),
            Some(MuscleGroup::Quadriceps)
        );
    }

    #[test]
    fn classify_unknown_category() {
        assert_eq!(MuscleGroup::classify(&entry("Alongamento", "Mobilidade")), None);
        assert_eq!(MuscleGroup::classify(&entry("Sem categoria", "")), None);
    }

    #[test]
    fn group_by_muscle_sorts_and_dedups() {
        let catalog = Catalog::new(vec![
            entry("Supino Reto", "Peitoral"),
            entry("Crucifixo", "Peitoral"),
            entry("Íso Peitoral", "Peitoral"),
            entry("Alongamento", "Mobilidade"),
        ]);
        let groups = group_by_muscle(&catalog);
        assert_eq!(groups.len(), MuscleGroup::ALL.len());
        assert_eq!(
            groups[&MuscleGroup::Peitoral],
            vec!["Crucifixo", "Íso Peitoral", "Supino Reto"]
        );
        assert!(groups[&MuscleGroup::Dorsais].is_empty());
        let total: usize = groups.values().map(Vec::len).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn key_round_trips_through_from_str() {
        for group in MuscleGroup::ALL {
            assert_eq!(group.key().parse::<MuscleGroup>().unwrap(), group);
        }
        assert!("pescoço".parse::<MuscleGroup>().is_err());
    }
}
