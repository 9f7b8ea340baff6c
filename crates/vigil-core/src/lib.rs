//! Vigil Core - real-time content-safety classification.
//!
//! Gates every user turn before it reaches a model backend by
//! classifying free-form text into one of five priority-ordered safety
//! zones using multi-pattern matching over literal keywords and
//! regexes:
//!
//! | Zone | Meaning | Caller action |
//! |------|---------|---------------|
//! | Block | disallowed content | refuse, no inference |
//! | Crisis | user may be in crisis | return crisis resources only |
//! | Ethical | ethical concern | prepend preamble, then infer |
//! | Professional | professional-advice topic | infer, append disclaimer |
//! | Safe | everything else | pass through |
//!
//! The engine performs no I/O, holds no global state, and every public
//! operation is a synchronous computation over an immutable compiled
//! pattern set; it is safe to call concurrently from many request
//! handlers.
//!
//! ```
//! use vigil_core::{GuardrailEngine, Zone};
//!
//! let engine = GuardrailEngine::new().expect("built-in patterns compile");
//! let classification = engine.classify("What's a good recipe for banana bread?", None);
//! assert_eq!(classification.zone, Zone::Safe);
//! ```

mod augment;
mod classifier;
mod context;
mod crisis;
mod engine;
mod matcher;
mod pattern;
mod zone;

pub use augment::ResponseAugmentor;
pub use classifier::ZoneClassifier;
pub use context::RequestContext;
pub use crisis::{CrisisResource, CrisisResponder, CrisisResponse, Locale};
pub use engine::GuardrailEngine;
pub use matcher::{
    build_strategy, AutomatonScanner, LinearScanner, LiteralHit, ScanStrategy,
};
pub use pattern::{
    default_patterns, CompiledLiteral, CompiledPatternSet, Pattern, PatternError, ZoneRegexes,
};
pub use zone::{EthicalFlag, ProfessionalCategory, Zone, ZoneClassification};
