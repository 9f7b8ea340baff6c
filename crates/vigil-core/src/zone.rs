//! Safety zones and classification records.
//!
//! Every user turn is classified into exactly one of five
//! priority-ordered zones before it reaches a model backend:
//!
//! 1. `Block` - never answered
//! 2. `Crisis` - answered with crisis resources only
//! 3. `Ethical` - answered with an ethical preamble prepended
//! 4. `Professional` - answered with a professional disclaimer appended
//! 5. `Safe` - passed through unmodified

use serde::{Deserialize, Serialize};

/// A safety zone.
///
/// Variants are declared in descending priority, so the derived `Ord`
/// sorts higher-priority zones first (`Zone::Block < Zone::Crisis`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Content that must be refused outright.
    Block,
    /// Content indicating the user may be in crisis.
    Crisis,
    /// Content raising an ethical concern worth a preamble.
    Ethical,
    /// Content touching a professional-advice topic.
    Professional,
    /// Everything else.
    Safe,
}

impl Zone {
    /// Returns all zones, highest priority first.
    pub fn all() -> &'static [Zone] {
        &[
            Zone::Block,
            Zone::Crisis,
            Zone::Ethical,
            Zone::Professional,
            Zone::Safe,
        ]
    }

    /// Returns the matchable zones in evaluation order.
    ///
    /// `Safe` is the default outcome, not a zone patterns can target.
    pub fn matchable() -> &'static [Zone] {
        &[Zone::Block, Zone::Crisis, Zone::Ethical, Zone::Professional]
    }

    /// Returns a human-readable name for this zone.
    pub fn name(&self) -> &'static str {
        match self {
            Zone::Block => "Block",
            Zone::Crisis => "Crisis",
            Zone::Ethical => "Ethical",
            Zone::Professional => "Professional",
            Zone::Safe => "Safe",
        }
    }
}

/// Semantic category driving ethical preamble selection for the
/// `Ethical` zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EthicalFlag {
    /// Attempts to engineer another person's feelings or decisions.
    Manipulation,
    /// Unhealthy emotional reliance on the assistant.
    Dependency,
    /// Using spiritual framing to avoid a real problem.
    SpiritualBypassing,
    /// Asking the assistant to act as a mental-health authority.
    MentalHealth,
}

impl EthicalFlag {
    /// Returns all flags.
    pub fn all() -> &'static [EthicalFlag] {
        &[
            EthicalFlag::Manipulation,
            EthicalFlag::Dependency,
            EthicalFlag::SpiritualBypassing,
            EthicalFlag::MentalHealth,
        ]
    }

    /// Parses a pattern's semantic tag into a flag.
    ///
    /// Returns `None` for tags outside the closed set; the caller
    /// treats that as a deliberate no-preamble outcome.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "manipulation" => Some(EthicalFlag::Manipulation),
            "dependency" => Some(EthicalFlag::Dependency),
            "spiritual_bypassing" => Some(EthicalFlag::SpiritualBypassing),
            "mental_health" => Some(EthicalFlag::MentalHealth),
            _ => None,
        }
    }

    /// Returns the semantic tag for this flag.
    pub fn tag(&self) -> &'static str {
        match self {
            EthicalFlag::Manipulation => "manipulation",
            EthicalFlag::Dependency => "dependency",
            EthicalFlag::SpiritualBypassing => "spiritual_bypassing",
            EthicalFlag::MentalHealth => "mental_health",
        }
    }
}

/// Semantic category driving disclaimer selection for the
/// `Professional` zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalCategory {
    /// Health, symptoms, medication.
    Medical,
    /// Law, contracts, disputes.
    Legal,
    /// Investments, taxes, debt.
    Financial,
    /// Therapy, anxiety, mood.
    MentalHealth,
}

impl ProfessionalCategory {
    /// Returns the categories in keyword-fallback priority order.
    ///
    /// When no explicit flag is supplied, the disclaimer keyword scan
    /// checks categories in this order and the first hit wins.
    pub fn fallback_order() -> &'static [ProfessionalCategory] {
        &[
            ProfessionalCategory::Medical,
            ProfessionalCategory::Legal,
            ProfessionalCategory::Financial,
            ProfessionalCategory::MentalHealth,
        ]
    }

    /// Parses a pattern's semantic tag into a category.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "medical" => Some(ProfessionalCategory::Medical),
            "legal" => Some(ProfessionalCategory::Legal),
            "financial" => Some(ProfessionalCategory::Financial),
            "mental_health" => Some(ProfessionalCategory::MentalHealth),
            _ => None,
        }
    }

    /// Returns the semantic tag for this category.
    pub fn tag(&self) -> &'static str {
        match self {
            ProfessionalCategory::Medical => "medical",
            ProfessionalCategory::Legal => "legal",
            ProfessionalCategory::Financial => "financial",
            ProfessionalCategory::MentalHealth => "mental_health",
        }
    }
}

/// Result of classifying a single user turn.
///
/// Produced fresh per call and never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneClassification {
    /// The winning zone.
    pub zone: Zone,
    /// The semantic tag of the pattern that decided the zone, or a
    /// diagnostic string for `Safe` outcomes.
    pub reason: String,
    /// Confidence score (0.0 to 1.0). Pattern hits are deterministic,
    /// so this is 1.0 throughout; probabilistic detectors layered on
    /// top may lower it but must preserve zone priority.
    pub confidence: f32,
    /// Typed ethical flag, present only for `Ethical` hits whose tag
    /// parses into the closed flag set.
    pub ethical_flag: Option<EthicalFlag>,
    /// Typed professional category, present only for `Professional`
    /// hits whose tag parses into the closed category set.
    pub professional_category: Option<ProfessionalCategory>,
    /// The literal text or regex match that triggered the zone.
    pub matched_pattern: Option<String>,
}

impl ZoneClassification {
    /// Creates a classification for a pattern hit.
    pub fn from_match(zone: Zone, tag: &str, matched: String) -> Self {
        Self {
            zone,
            reason: tag.to_string(),
            confidence: 1.0,
            ethical_flag: if zone == Zone::Ethical {
                EthicalFlag::from_tag(tag)
            } else {
                None
            },
            professional_category: if zone == Zone::Professional {
                ProfessionalCategory::from_tag(tag)
            } else {
                None
            },
            matched_pattern: Some(matched),
        }
    }

    /// Creates the default safe classification.
    pub fn safe() -> Self {
        Self::safe_with_reason("no pattern matched")
    }

    /// Creates a safe classification with a diagnostic reason.
    pub fn safe_with_reason(reason: &str) -> Self {
        Self {
            zone: Zone::Safe,
            reason: reason.to_string(),
            confidence: 1.0,
            ethical_flag: None,
            professional_category: None,
            matched_pattern: None,
        }
    }

    /// Returns true if the turn must be refused outright.
    pub fn should_block(&self) -> bool {
        self.zone == Zone::Block
    }

    /// Returns true if the turn should be answered with crisis
    /// resources only.
    pub fn needs_crisis_support(&self) -> bool {
        self.zone == Zone::Crisis
    }
}
