use crate::models::ChatMessage;
use crate::modes::Mode;

/// Instruction payload for one provider call.
///
/// The same prompt renders into either calling convention: a single instruction
/// string with the text inlined, or a system/user message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub mode: Mode,
    pub template: &'static str,
    pub text: String,
}

impl PromptSpec {
    pub fn instruction(&self) -> String {
        format!("{}\n\n{}", self.template, self.text)
    }

    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage {
                role: "system".to_string(),
                content: self.template.to_string(),
            },
            ChatMessage {
                role: "user".to_string(),
                content: self.text.clone(),
            },
        ]
    }
}

pub const fn template_for(mode: Mode) -> &'static str {
    match mode {
        Mode::Correct => {
            "Corrige ortografía, gramática y puntuación de este texto en español, manteniendo el estilo original. Solo devuelve el texto corregido:"
        }
        Mode::Summarize => {
            "Resume en un párrafo claro y conciso el siguiente texto en español. Solo devuelve el resumen:"
        }
        Mode::RewriteAcademic => {
            "Reescribe el siguiente texto o ideas en un párrafo académico coherente y bien redactado en español. Solo devuelve el párrafo:"
        }
        Mode::Humanize => {
            "El siguiente texto suena a veces como hecho por IA. Reescríbelo para que suene natural, humano y fluido, sin cambiar el contenido. Solo devuelve el texto reescrito:"
        }
        Mode::Organize => {
            "Organiza el siguiente texto en secciones y párrafos claros, con buena puntuación y cohesión. No agregues ideas nuevas. Solo devuelve el texto organizado:"
        }
        Mode::Improve => {
            "Mejora el vocabulario y la fluidez de este texto académico en español, manteniendo el significado. Solo devuelve el texto mejorado:"
        }
        Mode::Paraphrase => {
            "Parafrasea el siguiente texto con otras palabras en español, conservando el sentido. Solo devuelve el texto parafraseado:"
        }
        Mode::DetectAi => {
            "Analiza el siguiente texto en español y escribe un breve análisis (5-7 líneas) sobre si podría haber sido generado por IA, explicando por qué. Luego sugiere 2-3 cambios para que parezca más humano:"
        }
        Mode::DetectPlagiarism => {
            "No tienes acceso a bases de datos de plagio, pero actúa como un revisor académico: señala posibles partes problemáticas (muy literales o cliché) del texto y sugiere cómo reescribirlas para reducir riesgo de plagio:"
        }
    }
}

pub fn build_prompt(text: &str, mode: Mode) -> PromptSpec {
    PromptSpec {
        mode,
        template: template_for(mode),
        text: text.to_string(),
    }
}
