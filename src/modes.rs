/// Transformation modes, plan tiers, and the loose parsing that maps client strings onto them
use enumset::{EnumSet, EnumSetType, enum_set};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ───────────────────────────────────────────────────────────────────────────────
// Errors
// ───────────────────────────────────────────────────────────────────────────────

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ModeError {
    #[error("Unknown mode '{name}'. Valid modes: {valid_list}")]
    UnknownMode { name: String, valid_list: String },
}

impl ModeError {
    pub fn unknown_mode(name: &str) -> Self {
        let valid_list = Mode::ALL
            .iter()
            .map(|m| m.id())
            .collect::<Vec<_>>()
            .join(", ");
        Self::UnknownMode {
            name: name.to_string(),
            valid_list,
        }
    }
}

// ───────────────────────────────────────────────────────────────────────────────
// Modes
// ───────────────────────────────────────────────────────────────────────────────

#[derive(EnumSetType, Debug, Hash)]
pub enum Mode {
    Correct,
    Summarize,
    RewriteAcademic,
    Humanize,
    Organize,
    Improve,
    Paraphrase,
    DetectAi,
    DetectPlagiarism,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Correct
    }
}

/// Whether a mode returns a rewritten text or a commentary about the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeKind {
    Transform,
    Analysis,
}

impl Mode {
    pub const ALL: [Mode; 9] = [
        Mode::Correct,
        Mode::Summarize,
        Mode::RewriteAcademic,
        Mode::Humanize,
        Mode::Organize,
        Mode::Improve,
        Mode::Paraphrase,
        Mode::DetectAi,
        Mode::DetectPlagiarism,
    ];

    /// Canonical wire id, as sent by the web client.
    pub const fn id(&self) -> &'static str {
        match self {
            Mode::Correct => "corregir",
            Mode::Summarize => "resumir",
            Mode::RewriteAcademic => "redactar",
            Mode::Humanize => "humanizar",
            Mode::Organize => "organizar",
            Mode::Improve => "mejorar",
            Mode::Paraphrase => "parafrasear",
            Mode::DetectAi => "detectarIA",
            Mode::DetectPlagiarism => "plagio",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Mode::Correct => "Corrección académica",
            Mode::Summarize => "Resumir",
            Mode::RewriteAcademic => "Redactar",
            Mode::Humanize => "Redacción natural",
            Mode::Organize => "Organizar",
            Mode::Improve => "Mejorar nivel",
            Mode::Paraphrase => "Parafrasear",
            Mode::DetectAi => "Detector IA",
            Mode::DetectPlagiarism => "Revisión de plagio",
        }
    }

    pub const fn kind(&self) -> ModeKind {
        match self {
            Mode::DetectAi | Mode::DetectPlagiarism => ModeKind::Analysis,
            _ => ModeKind::Transform,
        }
    }

    /// Analysis modes produce an explanation, never a replacement text.
    pub const fn is_analysis(&self) -> bool {
        matches!(self.kind(), ModeKind::Analysis)
    }

    /// Resolve a client-supplied mode, falling back to the default for anything unknown.
    pub fn resolve(input: Option<&str>) -> Self {
        input.and_then(parse_mode_loose).unwrap_or_default()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Mode {
    type Err = ModeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_mode_loose(s).ok_or_else(|| ModeError::unknown_mode(s))
    }
}

impl Serialize for Mode {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        s.serialize_str(self.id())
    }
}

fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_mode_loose(input: &str) -> Option<Mode> {
    let n = normalize(input);
    let mode = match n.as_str() {
        "corregir" | "correct" | "correction" => Mode::Correct,
        "resumir" | "summarize" | "summarise" | "summary" => Mode::Summarize,
        "redactar" | "rewriteacademic" | "rewrite" | "draft" => Mode::RewriteAcademic,
        "humanizar" | "humanize" | "humanise" => Mode::Humanize,
        "organizar" | "organize" | "organise" => Mode::Organize,
        "mejorar" | "improve" => Mode::Improve,
        "parafrasear" | "paraphrase" => Mode::Paraphrase,
        "detectaria" | "detectai" | "ai" | "aidetector" => Mode::DetectAi,
        "plagio" | "detectplagiarism" | "plagiarism" => Mode::DetectPlagiarism,
        _ => return None,
    };
    Some(mode)
}

pub fn ordered_modes(set: EnumSet<Mode>) -> impl Iterator<Item = Mode> {
    Mode::ALL.into_iter().filter(move |m| set.contains(*m))
}

// ───────────────────────────────────────────────────────────────────────────────
// Plan tiers (published for client-side gating, not enforced)
// ───────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
    Premium,
}

const FREE_MODES: EnumSet<Mode> = enum_set!(Mode::Correct | Mode::Summarize);
const PRO_ONLY_MODES: EnumSet<Mode> = enum_set!(
    Mode::RewriteAcademic | Mode::Humanize | Mode::Organize | Mode::Improve | Mode::Paraphrase
);

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [PlanTier::Free, PlanTier::Pro, PlanTier::Premium];

    pub fn modes(&self) -> EnumSet<Mode> {
        match self {
            PlanTier::Free => FREE_MODES,
            PlanTier::Pro => FREE_MODES | PRO_ONLY_MODES,
            PlanTier::Premium => EnumSet::all(),
        }
    }

    pub fn allows(&self, mode: Mode) -> bool {
        self.modes().contains(mode)
    }

    /// Cheapest tier that unlocks the mode.
    pub fn minimum_for(mode: Mode) -> PlanTier {
        PlanTier::ALL
            .into_iter()
            .find(|tier| tier.allows(mode))
            .unwrap_or(PlanTier::Premium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_ids_round_trip_through_from_str() {
        for mode in Mode::ALL {
            assert_eq!(mode.id().parse::<Mode>().unwrap(), mode);
        }
    }

    #[test]
    fn english_synonyms_are_accepted() {
        assert_eq!("rewrite-academic".parse::<Mode>().unwrap(), Mode::RewriteAcademic);
        assert_eq!("detect_ai".parse::<Mode>().unwrap(), Mode::DetectAi);
        assert_eq!("Detect Plagiarism".parse::<Mode>().unwrap(), Mode::DetectPlagiarism);
        assert_eq!("DETECTARIA".parse::<Mode>().unwrap(), Mode::DetectAi);
    }

    #[test]
    fn unknown_mode_resolves_to_default() {
        assert_eq!(Mode::resolve(Some("traducir")), Mode::Correct);
        assert_eq!(Mode::resolve(None), Mode::Correct);
        assert!(matches!(
            "traducir".parse::<Mode>(),
            Err(ModeError::UnknownMode { .. })
        ));
    }

    #[test]
    fn serializes_as_canonical_id() {
        assert_eq!(serde_json::to_string(&Mode::DetectAi).unwrap(), "\"detectarIA\"");
        assert_eq!(serde_json::to_string(&PlanTier::Pro).unwrap(), "\"pro\"");
    }

    #[test]
    fn only_detectors_are_analysis_modes() {
        let analysis: Vec<Mode> = Mode::ALL.into_iter().filter(Mode::is_analysis).collect();
        assert_eq!(analysis, vec![Mode::DetectAi, Mode::DetectPlagiarism]);
    }

    #[test]
    fn plan_tiers_are_nested() {
        let free = PlanTier::Free.modes();
        let pro = PlanTier::Pro.modes();
        let premium = PlanTier::Premium.modes();
        assert!(pro.is_superset(free));
        assert!(premium.is_superset(pro));
        assert_eq!(premium.len(), Mode::ALL.len());
        assert_eq!(free.len(), 2);
        assert!(!PlanTier::Pro.allows(Mode::DetectAi));
    }

    #[test]
    fn minimum_tier_per_mode() {
        assert_eq!(PlanTier::minimum_for(Mode::Summarize), PlanTier::Free);
        assert_eq!(PlanTier::minimum_for(Mode::Paraphrase), PlanTier::Pro);
        assert_eq!(PlanTier::minimum_for(Mode::DetectPlagiarism), PlanTier::Premium);
    }

    #[test]
    fn ordered_modes_follow_declaration_order() {
        let ids: Vec<&str> = ordered_modes(PlanTier::Free.modes()).map(|m| m.id()).collect();
        assert_eq!(ids, vec!["corregir", "resumir"]);
    }
}
