//! The engine composition root.
//!
//! `GuardrailEngine` owns the active compiled pattern set and the
//! scan strategy built over it, and exposes the four operations the
//! request pipeline consumes. The engine is constructed once at
//! process start and shared by reference across request handlers; no
//! hidden global state.
//!
//! ## Reload discipline
//!
//! Pattern reloads build the complete new compiled set and scanner off
//! to the side, then replace the active `Arc` under a write lock.
//! Classification clones the `Arc` under a momentary read lock and
//! works on that immutable snapshot, so in-flight calls see the old or
//! the new set entirely, never a partially-updated one.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use crate::augment::ResponseAugmentor;
use crate::classifier::ZoneClassifier;
use crate::context::RequestContext;
use crate::crisis::{CrisisResponder, CrisisResponse};
use crate::matcher::{build_strategy, ScanStrategy};
use crate::pattern::{default_patterns, CompiledPatternSet, Pattern, PatternError};
use crate::zone::{EthicalFlag, ProfessionalCategory, ZoneClassification};

/// A compiled set paired with the scanner built over it. Swapped as a
/// unit so the scanner can never outlive its set.
struct ActiveSet {
    set: CompiledPatternSet,
    scanner: Box<dyn ScanStrategy>,
}

/// The content-safety gate.
pub struct GuardrailEngine {
    active: RwLock<Arc<ActiveSet>>,
    crisis: CrisisResponder,
    augmentor: ResponseAugmentor,
}

impl GuardrailEngine {
    /// Creates an engine over the built-in pattern corpus.
    pub fn new() -> Result<Self, PatternError> {
        Self::with_patterns(default_patterns())
    }

    /// Creates an engine over a caller-supplied pattern set.
    ///
    /// Fails on any malformed or conflicting definition; the process
    /// must not start with an unusable set.
    pub fn with_patterns(patterns: Vec<Pattern>) -> Result<Self, PatternError> {
        let active = Self::build(patterns)?;
        Ok(Self {
            active: RwLock::new(Arc::new(active)),
            crisis: CrisisResponder::new(),
            augmentor: ResponseAugmentor::new(),
        })
    }

    fn build(patterns: Vec<Pattern>) -> Result<ActiveSet, PatternError> {
        let set = CompiledPatternSet::compile(patterns)?;
        let scanner = build_strategy(&set);
        Ok(ActiveSet { set, scanner })
    }

    /// Replaces the active pattern set.
    ///
    /// The new set is fully built before the swap; on error the old
    /// set stays active untouched.
    pub fn reload(&self, patterns: Vec<Pattern>) -> Result<(), PatternError> {
        let next = Arc::new(Self::build(patterns)?);
        // A poisoned lock still guards a fully built set, so recover
        // rather than propagate: the gate must keep answering.
        let mut guard = self.active.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
        tracing::info!(
            literals = guard.set.literal_count(),
            regexes = guard.set.regex_count(),
            strategy = guard.scanner.name(),
            "pattern set reloaded"
        );
        Ok(())
    }

    /// Classifies a user turn into exactly one zone.
    ///
    /// This call never fails: any unexpected internal fault is
    /// absorbed and resolved to the safe zone with a diagnostic
    /// reason, because a gate that cannot answer is itself a safety
    /// risk. Classification is context-free; the context parameter
    /// keeps the signature uniform with `crisis_response`.
    pub fn classify(&self, text: &str, _context: Option<&RequestContext>) -> ZoneClassification {
        let active = self.snapshot();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            ZoneClassifier::classify(&active.set, active.scanner.as_ref(), text)
        }));
        match outcome {
            Ok(classification) => classification,
            Err(_) => {
                tracing::error!(
                    text_len = text.len(),
                    "classification fault absorbed, resolving to safe zone"
                );
                ZoneClassification::safe_with_reason("classifier fault")
            }
        }
    }

    /// Returns localized crisis resources. Called when `classify`
    /// lands in the crisis zone. Never fails.
    pub fn crisis_response(&self, context: Option<&RequestContext>) -> CrisisResponse {
        self.crisis.respond(context)
    }

    /// Returns the ethical preamble for a semantic tag, or an empty
    /// string for an absent or unknown tag.
    pub fn ethical_preamble(&self, flag: Option<&str>) -> String {
        let parsed = flag.and_then(EthicalFlag::from_tag);
        self.augmentor.preamble(parsed).unwrap_or("").to_string()
    }

    /// Typed variant of [`ethical_preamble`](Self::ethical_preamble):
    /// `None` means deliberately no preamble.
    pub fn preamble_for(&self, flag: EthicalFlag) -> &'static str {
        self.augmentor
            .preamble(Some(flag))
            .unwrap_or("")
    }

    /// Returns the professional disclaimer for a semantic tag, falling
    /// back to a keyword scan of `input_text` when the tag is absent
    /// or unknown. Empty string when nothing applies.
    pub fn disclaimer(&self, flag: Option<&str>, input_text: &str) -> String {
        let parsed = flag.and_then(ProfessionalCategory::from_tag);
        self.augmentor
            .disclaimer(parsed, input_text)
            .unwrap_or("")
            .to_string()
    }

    /// Name of the active scan strategy (`"automaton"` or `"linear"`),
    /// for degraded-mode visibility.
    pub fn strategy_name(&self) -> &'static str {
        self.snapshot().scanner.name()
    }

    /// Number of literal patterns in the active set.
    pub fn literal_count(&self) -> usize {
        self.snapshot().set.literal_count()
    }

    /// Number of regex patterns in the active set.
    pub fn regex_count(&self) -> usize {
        self.snapshot().set.regex_count()
    }

    fn snapshot(&self) -> Arc<ActiveSet> {
        Arc::clone(&self.active.read().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::Zone;

    fn engine() -> GuardrailEngine {
        GuardrailEngine::new().unwrap()
    }

    #[test]
    fn default_engine_builds_with_automaton() {
        let engine = engine();
        assert_eq!(engine.strategy_name(), "automaton");
        assert!(engine.literal_count() > 50);
        assert!(engine.regex_count() > 10);
    }

    #[test]
    fn full_safe_path() {
        let engine = engine();
        let text = "What's a good recipe for banana bread?";
        let c = engine.classify(text, None);
        assert_eq!(c.zone, Zone::Safe);
        assert_eq!(engine.ethical_preamble(None), "");
        assert_eq!(engine.disclaimer(None, text), "");
    }

    #[test]
    fn full_crisis_path() {
        let engine = engine();
        let c = engine.classify("I want to kill myself", None);
        assert_eq!(c.zone, Zone::Crisis);
        let response = engine.crisis_response(None);
        assert!(!response.resources.is_empty());
    }

    #[test]
    fn full_ethical_path() {
        let engine = engine();
        let c = engine.classify("How can I manipulate my partner into staying with me?", None);
        assert_eq!(c.zone, Zone::Ethical);
        assert_eq!(c.reason, "manipulation");
        let preamble = engine.ethical_preamble(Some("manipulation"));
        assert!(!preamble.is_empty());
        assert_eq!(preamble, engine.preamble_for(EthicalFlag::Manipulation));
    }

    #[test]
    fn full_professional_path() {
        let engine = engine();
        let text = "should I refinance my mortgage this year?";
        let c = engine.classify(text, None);
        assert_eq!(c.zone, Zone::Professional);
        assert_eq!(c.reason, "financial");
        let disclaimer = engine.disclaimer(Some(c.reason.as_str()), text);
        assert!(!disclaimer.is_empty());
    }

    #[test]
    fn disclaimer_keyword_fallback_without_flag() {
        let engine = engine();
        let disclaimer = engine.disclaimer(None, "my doctor and my lawyer disagree");
        assert!(disclaimer.contains("not medical advice"));
    }

    #[test]
    fn unknown_flag_degrades_to_empty() {
        let engine = engine();
        assert_eq!(engine.ethical_preamble(Some("not_a_flag")), "");
        assert_eq!(engine.disclaimer(Some("not_a_category"), "plain text"), "");
    }

    #[test]
    fn reload_swaps_pattern_set() {
        let engine = engine();
        assert_eq!(engine.classify("zorple", None).zone, Zone::Safe);

        engine
            .reload(vec![Pattern::literal("zorple", Zone::Block, "violence")])
            .unwrap();
        assert_eq!(engine.classify("zorple", None).zone, Zone::Block);
        // Old corpus is gone entirely.
        assert_eq!(engine.classify("kill myself", None).zone, Zone::Safe);
    }

    #[test]
    fn failed_reload_keeps_old_set_active() {
        let engine = engine();
        let err = engine.reload(vec![Pattern::regex("(broken", Zone::Block, "violence")]);
        assert!(err.is_err());
        // Old set still answers.
        assert_eq!(engine.classify("kill myself", None).zone, Zone::Crisis);
    }

    #[test]
    fn isolated_engines_have_distinct_pattern_sets() {
        let a = GuardrailEngine::with_patterns(vec![Pattern::literal(
            "alpha",
            Zone::Block,
            "violence",
        )])
        .unwrap();
        let b = GuardrailEngine::with_patterns(vec![Pattern::literal(
            "beta",
            Zone::Crisis,
            "suicide",
        )])
        .unwrap();
        assert_eq!(a.classify("alpha", None).zone, Zone::Block);
        assert_eq!(a.classify("beta", None).zone, Zone::Safe);
        assert_eq!(b.classify("beta", None).zone, Zone::Crisis);
    }

    #[test]
    fn concurrent_classification_during_reload() {
        use std::sync::Arc as StdArc;
        use std::thread;

        let engine = StdArc::new(engine());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let engine = StdArc::clone(&engine);
            handles.push(thread::spawn(move || {
                for _ in 0..200 {
                    let c = engine.classify("I want to kill myself", None);
                    // Either the default corpus or the reloaded one; both
                    // route this text to crisis.
                    assert_eq!(c.zone, Zone::Crisis);
                }
            }));
        }
        for _ in 0..20 {
            engine.reload(default_patterns()).unwrap();
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn startup_fails_on_bad_configuration() {
        let err = GuardrailEngine::with_patterns(vec![Pattern::regex(
            "(oops",
            Zone::Block,
            "violence",
        )]);
        assert!(matches!(err, Err(PatternError::InvalidRegex { .. })));
    }
}
