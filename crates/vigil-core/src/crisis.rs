//! Crisis response for the Crisis zone.
//!
//! Produces localized crisis resources and nothing else: no further
//! classification, no inference. Every path returns a non-empty
//! resource set; absent or undetermined locale degrades to the default
//! English/international set rather than raising.

use serde::{Deserialize, Serialize};

use crate::context::RequestContext;

/// Supported resource locales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    /// English / international (the default).
    #[default]
    En,
    /// Spanish.
    Es,
    /// French.
    Fr,
    /// German.
    De,
}

impl Locale {
    /// Parses a declared locale tag, e.g. `"es"` or `"fr-CA"`.
    ///
    /// Only the primary subtag is considered. Unknown tags yield
    /// `None` so detection can fall through to the next source.
    pub fn from_declared(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "es" => Some(Locale::Es),
            "fr" => Some(Locale::Fr),
            "de" => Some(Locale::De),
            _ => None,
        }
    }

    /// Guesses the language of a text by counting common function
    /// words. Deliberately conservative: a language must score at
    /// least two hits and strictly beat the others, otherwise `None`.
    pub fn detect_in_text(text: &str) -> Option<Self> {
        const ES: &[&str] = &[
            "el", "la", "los", "las", "que", "es", "estoy", "quiero", "una", "pero", "muy", "yo",
        ];
        const FR: &[&str] = &[
            "le", "les", "des", "est", "je", "ne", "pas", "une", "suis", "mais", "avec", "mon",
        ];
        const DE: &[&str] = &[
            "der", "die", "das", "und", "ich", "nicht", "ist", "ein", "eine", "mich", "habe",
            "kann",
        ];

        let mut scores = [(Locale::Es, 0usize), (Locale::Fr, 0), (Locale::De, 0)];
        for raw in text.split_whitespace() {
            let word: String = raw
                .chars()
                .filter(|c| c.is_alphabetic())
                .collect::<String>()
                .to_lowercase();
            if word.is_empty() {
                continue;
            }
            for (locale, score) in scores.iter_mut() {
                let list = match locale {
                    Locale::Es => ES,
                    Locale::Fr => FR,
                    Locale::De => DE,
                    Locale::En => unreachable!(),
                };
                if list.contains(&word.as_str()) {
                    *score += 1;
                }
            }
        }

        scores.sort_by(|a, b| b.1.cmp(&a.1));
        let (best, best_score) = scores[0];
        let (_, runner_up) = scores[1];
        if best_score >= 2 && best_score > runner_up {
            Some(best)
        } else {
            None
        }
    }

    /// Returns a human-readable name for this locale.
    pub fn name(&self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Es => "Spanish",
            Locale::Fr => "French",
            Locale::De => "German",
        }
    }
}

/// A single crisis resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisResource {
    /// Resource name.
    pub name: String,
    /// How to reach it.
    pub contact: String,
    /// One-line description.
    pub description: String,
}

impl CrisisResource {
    fn new(name: &str, contact: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            contact: contact.to_string(),
            description: description.to_string(),
        }
    }
}

/// The full crisis response handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisResponse {
    /// Locale the resources were selected for.
    pub locale: Locale,
    /// Supportive lead-in message in the selected language.
    pub message: String,
    /// Crisis resources; never empty.
    pub resources: Vec<CrisisResource>,
}

/// Maps call context to localized crisis resources.
pub struct CrisisResponder;

impl CrisisResponder {
    /// Creates a new responder.
    pub fn new() -> Self {
        Self
    }

    /// Returns crisis resources for the context's locale.
    ///
    /// Detection order: declared locale, then language heuristics over
    /// the context message, then the default set. This call cannot
    /// fail.
    pub fn respond(&self, ctx: Option<&RequestContext>) -> CrisisResponse {
        let locale = Self::detect_locale(ctx);
        CrisisResponse {
            locale,
            message: Self::message_for(locale).to_string(),
            resources: Self::resources_for(locale),
        }
    }

    fn detect_locale(ctx: Option<&RequestContext>) -> Locale {
        let Some(ctx) = ctx else {
            return Locale::En;
        };
        if let Some(declared) = ctx.locale.as_deref().and_then(Locale::from_declared) {
            return declared;
        }
        ctx.message
            .as_deref()
            .and_then(Locale::detect_in_text)
            .unwrap_or_default()
    }

    fn message_for(locale: Locale) -> &'static str {
        match locale {
            Locale::En => {
                "It sounds like you're going through something very painful. \
                 You don't have to face this alone - please reach out to one \
                 of these services right now."
            }
            Locale::Es => {
                "Parece que estás pasando por algo muy doloroso. No tienes \
                 que enfrentarlo solo; por favor contacta uno de estos \
                 servicios ahora mismo."
            }
            Locale::Fr => {
                "Il semble que vous traversiez une période très douloureuse. \
                 Vous n'êtes pas seul; veuillez contacter l'un de ces \
                 services dès maintenant."
            }
            Locale::De => {
                "Es klingt, als ob du gerade etwas sehr Schmerzhaftes \
                 durchmachst. Du bist nicht allein; bitte wende dich sofort \
                 an eine dieser Stellen."
            }
        }
    }

    fn resources_for(locale: Locale) -> Vec<CrisisResource> {
        let mut resources = match locale {
            Locale::En => vec![
                CrisisResource::new(
                    "988 Suicide & Crisis Lifeline",
                    "Call or text 988 (US)",
                    "Free, confidential support 24/7",
                ),
                CrisisResource::new(
                    "Crisis Text Line",
                    "Text HOME to 741741 (US/CA/UK)",
                    "Text-based crisis support 24/7",
                ),
            ],
            Locale::Es => vec![
                CrisisResource::new(
                    "Teléfono de la Esperanza",
                    "717 003 717 (España)",
                    "Apoyo emocional confidencial 24/7",
                ),
                CrisisResource::new(
                    "Línea de la Vida",
                    "800 911 2000 (México)",
                    "Atención en crisis 24/7",
                ),
            ],
            Locale::Fr => vec![
                CrisisResource::new(
                    "3114 - Numéro national de prévention du suicide",
                    "Appelez le 3114 (France)",
                    "Écoute professionnelle gratuite 24/7",
                ),
                CrisisResource::new(
                    "SOS Amitié",
                    "09 72 39 40 50 (France)",
                    "Écoute anonyme 24/7",
                ),
            ],
            Locale::De => vec![
                CrisisResource::new(
                    "TelefonSeelsorge",
                    "0800 111 0 111 (Deutschland)",
                    "Kostenlose, anonyme Beratung 24/7",
                ),
                CrisisResource::new(
                    "Nummer gegen Kummer",
                    "116 111 (Deutschland)",
                    "Beratung für junge Menschen",
                ),
            ],
        };
        // Every locale carries the international directory so the set
        // is useful wherever the caller actually is.
        resources.push(CrisisResource::new(
            "IASP Crisis Centres Directory",
            "https://www.iasp.info/resources/Crisis_Centres/",
            "Worldwide directory of crisis centres",
        ));
        resources
    }
}

impl Default for CrisisResponder {
    fn default() -> Self {
        Self::new()
    }
}
