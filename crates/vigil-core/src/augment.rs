//! Response augmentation for the Ethical and Professional zones.
//!
//! Ethical hits get a preamble prepended before inference;
//! professional-advice hits get a disclaimer appended after. Selection
//! is an exhaustive match over the closed flag enums, so a missing
//! table entry is a compile error, not a silent empty string.

use crate::zone::{EthicalFlag, ProfessionalCategory};

const MANIPULATION_PREAMBLE: &str = "Before we go further: healthy relationships are built on \
     honesty and consent, not control. I can help you communicate \
     openly, but I won't help engineer someone else's feelings or \
     decisions.\n\n";

const DEPENDENCY_PREAMBLE: &str = "I'm glad our conversations help, and I want to be honest: \
     I'm a tool, not a substitute for the people in your life. It \
     might be worth bringing some of this to someone you trust.\n\n";

const SPIRITUAL_BYPASSING_PREAMBLE: &str = "Spiritual practice can be a real comfort, and it works best \
     alongside practical steps rather than instead of them. Here's a \
     grounded take.\n\n";

const MENTAL_HEALTH_PREAMBLE: &str = "I can share general information, but I can't assess or \
     diagnose anyone. A licensed professional can give you answers \
     that actually fit your situation.\n\n";

const MEDICAL_DISCLAIMER: &str = "\n\nThis is general information, not medical advice. For \
     anything affecting your health, please consult a qualified \
     clinician.";

const LEGAL_DISCLAIMER: &str = "\n\nThis is general information, not legal advice. Laws vary \
     by jurisdiction; please consult a licensed attorney about your \
     specific situation.";

const FINANCIAL_DISCLAIMER: &str = "\n\nThis is general information, not financial advice. Please \
     consult a qualified financial professional before making \
     decisions about your money.";

const MENTAL_HEALTH_DISCLAIMER: &str = "\n\nThis is general information, not a substitute for \
     professional mental-health care. A licensed therapist or \
     counselor can offer support tailored to you.";

/// Keyword sets for the disclaimer fallback scan, checked in
/// `ProfessionalCategory::fallback_order`. Plain lowercase substrings.
fn fallback_keywords(category: ProfessionalCategory) -> &'static [&'static str] {
    match category {
        ProfessionalCategory::Medical => &[
            "symptom",
            "diagnos",
            "medication",
            "prescription",
            "dosage",
            "treatment",
            "doctor",
            "illness",
            "disease",
            "chest pain",
        ],
        ProfessionalCategory::Legal => &[
            "lawsuit",
            "attorney",
            "lawyer",
            "legal",
            "contract",
            "custody",
            "court",
        ],
        ProfessionalCategory::Financial => &[
            "invest",
            "stock",
            "portfolio",
            "retirement",
            "mortgage",
            "tax",
            "loan",
            "savings",
        ],
        ProfessionalCategory::MentalHealth => &[
            "therap",
            "anxiety",
            "depress",
            "panic",
            "counsel",
            "mental health",
        ],
    }
}

/// Selects preamble and disclaimer text around model output.
pub struct ResponseAugmentor;

impl ResponseAugmentor {
    /// Creates a new augmentor.
    pub fn new() -> Self {
        Self
    }

    /// Returns the preamble for an ethical flag.
    ///
    /// `None` in, `None` out: an absent flag means the caller
    /// deliberately prepends nothing.
    pub fn preamble(&self, flag: Option<EthicalFlag>) -> Option<&'static str> {
        Some(match flag? {
            EthicalFlag::Manipulation => MANIPULATION_PREAMBLE,
            EthicalFlag::Dependency => DEPENDENCY_PREAMBLE,
            EthicalFlag::SpiritualBypassing => SPIRITUAL_BYPASSING_PREAMBLE,
            EthicalFlag::MentalHealth => MENTAL_HEALTH_PREAMBLE,
        })
    }

    /// Returns the disclaimer for a professional-advice turn.
    ///
    /// An explicit category always wins. Otherwise the input is
    /// scanned against each category's keyword set in fixed priority
    /// order (medical, legal, financial, mental health) and the first
    /// category with any hit wins; only one disclaimer is ever
    /// returned even when several categories' keywords are present.
    pub fn disclaimer(
        &self,
        category: Option<ProfessionalCategory>,
        input_text: &str,
    ) -> Option<&'static str> {
        if let Some(category) = category {
            return Some(Self::disclaimer_text(category));
        }
        let lower = input_text.to_lowercase();
        for &category in ProfessionalCategory::fallback_order() {
            if fallback_keywords(category)
                .iter()
                .any(|k| lower.contains(k))
            {
                return Some(Self::disclaimer_text(category));
            }
        }
        None
    }

    fn disclaimer_text(category: ProfessionalCategory) -> &'static str {
        match category {
            ProfessionalCategory::Medical => MEDICAL_DISCLAIMER,
            ProfessionalCategory::Legal => LEGAL_DISCLAIMER,
            ProfessionalCategory::Financial => FINANCIAL_DISCLAIMER,
            ProfessionalCategory::MentalHealth => MENTAL_HEALTH_DISCLAIMER,
        }
    }
}

impl Default for ResponseAugmentor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn augmentor() -> ResponseAugmentor {
        ResponseAugmentor::new()
    }

    #[test]
    fn preamble_exists_for_every_flag() {
        for flag in EthicalFlag::all() {
            let text = augmentor().preamble(Some(*flag));
            assert!(text.is_some_and(|t| !t.is_empty()), "{flag:?}");
        }
    }

    #[test]
    fn absent_flag_means_no_preamble() {
        assert_eq!(augmentor().preamble(None), None);
    }

    #[test]
    fn manipulation_preamble_is_the_configured_text() {
        assert_eq!(
            augmentor().preamble(Some(EthicalFlag::Manipulation)),
            Some(MANIPULATION_PREAMBLE)
        );
    }

    #[test]
    fn explicit_category_wins_over_keywords() {
        // Text screams medical, explicit flag says legal.
        let text = augmentor()
            .disclaimer(
                Some(ProfessionalCategory::Legal),
                "what dosage should my doctor prescribe",
            )
            .unwrap();
        assert_eq!(text, LEGAL_DISCLAIMER);
    }

    #[test]
    fn medical_beats_legal_in_fallback_order() {
        let text = augmentor()
            .disclaimer(None, "my doctor says the contract is making me sick")
            .unwrap();
        assert_eq!(text, MEDICAL_DISCLAIMER);
    }

    #[test]
    fn only_one_disclaimer_even_with_many_categories() {
        let input = "doctor lawyer invest therapy";
        let text = augmentor().disclaimer(None, input).unwrap();
        assert_eq!(text, MEDICAL_DISCLAIMER);
    }

    #[test]
    fn fallback_matches_each_category() {
        let cases = [
            ("should I change my medication", MEDICAL_DISCLAIMER),
            ("my attorney wants to settle", LEGAL_DISCLAIMER),
            ("is this stock worth buying", FINANCIAL_DISCLAIMER),
            ("my anxiety is getting worse", MENTAL_HEALTH_DISCLAIMER),
        ];
        for (input, expected) in cases {
            assert_eq!(augmentor().disclaimer(None, input), Some(expected), "{input}");
        }
    }

    #[test]
    fn no_keywords_means_no_disclaimer() {
        assert_eq!(
            augmentor().disclaimer(None, "what's a good recipe for banana bread?"),
            None
        );
    }

    #[test]
    fn fallback_is_case_insensitive() {
        assert_eq!(
            augmentor().disclaimer(None, "MY DOCTOR SAID SO"),
            Some(MEDICAL_DISCLAIMER)
        );
    }
}
