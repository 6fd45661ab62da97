//! Local text statistics used when no external model is configured.
//!
//! These are deliberately crude signals (vocabulary diversity and repeated
//! sentences). Every report they produce carries [`DISCLAIMER`].

use std::collections::{HashMap, HashSet};

use crate::modes::Mode;

pub const DISCLAIMER: &str = "Análisis orientativo generado con heurísticas locales simples; no es un detector de IA ni una verificación de plagio real.";

const LOW_DIVERSITY: f64 = 0.4;
const MEDIUM_DIVERSITY: f64 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct LexicalStats {
    pub total_words: usize,
    pub unique_words: usize,
    /// unique / total, 0.0 for empty input
    pub diversity: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatedSentence {
    pub sentence: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepetitionStats {
    pub total_sentences: usize,
    pub repeated: Vec<RepeatedSentence>,
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
}

fn sentences(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(['.', '!', '?', '¡', '¿', '\n'])
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase())
        .filter(|s| !s.is_empty())
}

pub fn lexical_diversity(text: &str) -> LexicalStats {
    let mut unique = HashSet::new();
    let mut total_words = 0;
    for word in words(text) {
        total_words += 1;
        unique.insert(word);
    }
    let diversity = if total_words == 0 {
        0.0
    } else {
        unique.len() as f64 / total_words as f64
    };
    LexicalStats {
        total_words,
        unique_words: unique.len(),
        diversity,
    }
}

pub fn sentence_repetition(text: &str) -> RepetitionStats {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();
    let mut total_sentences = 0;
    for sentence in sentences(text) {
        total_sentences += 1;
        let count = counts.entry(sentence.clone()).or_insert(0);
        if *count == 0 {
            order.push(sentence);
        }
        *count += 1;
    }
    let repeated = order
        .into_iter()
        .filter_map(|sentence| {
            let count = counts[&sentence];
            (count > 1).then_some(RepeatedSentence { sentence, count })
        })
        .collect();
    RepetitionStats {
        total_sentences,
        repeated,
    }
}

pub fn ai_report(text: &str) -> String {
    let stats = lexical_diversity(text);
    let verdict = if stats.diversity < LOW_DIVERSITY {
        "vocabulario muy repetitivo: rasgo frecuente en textos generados automáticamente"
    } else if stats.diversity < MEDIUM_DIVERSITY {
        "vocabulario moderadamente variado: no hay señales claras en ningún sentido"
    } else {
        "vocabulario variado: rasgo más propio de una redacción humana"
    };
    format!(
        "Detector IA (heurístico)\n\
         Palabras: {total}, palabras únicas: {unique}, diversidad léxica: {ratio:.2}\n\
         Resultado: {verdict}.\n\n{DISCLAIMER}",
        total = stats.total_words,
        unique = stats.unique_words,
        ratio = stats.diversity,
    )
}

pub fn plagiarism_report(text: &str) -> String {
    let stats = sentence_repetition(text);
    let mut report = format!(
        "Revisión de plagio (heurística)\nOraciones analizadas: {}, oraciones repetidas: {}\n",
        stats.total_sentences,
        stats.repeated.len()
    );
    if stats.repeated.is_empty() {
        report.push_str("No se encontraron oraciones repetidas dentro del texto.\n");
    } else {
        for item in &stats.repeated {
            report.push_str(&format!("- \"{}\" aparece {} veces\n", item.sentence, item.count));
        }
        report.push_str("Reescribe las oraciones repetidas con tus propias palabras.\n");
    }
    report.push('\n');
    report.push_str(DISCLAIMER);
    report
}

/// Local stand-in for a provider call. Transform modes cannot be performed
/// without a model, so the text comes back unchanged.
pub fn run_local(mode: Mode, text: &str) -> String {
    match mode {
        Mode::DetectAi => ai_report(text),
        Mode::DetectPlagiarism => plagiarism_report(text),
        _ => text.to_string(),
    }
}
