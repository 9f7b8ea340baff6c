//! Pattern definitions and the compiled, immutable pattern set.
//!
//! Patterns are loaded once at startup. Literals are case-folded at
//! load time; regexes are compiled once with case-insensitive
//! matching. Any malformed or conflicting definition is a fatal
//! configuration error, never a runtime condition. The compiled set is
//! never mutated; updating patterns builds a new set and swaps the
//! active reference (see `engine`).

use std::collections::{BTreeMap, HashMap};

use regex::{Regex, RegexBuilder, RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::zone::Zone;

/// Errors raised while loading a pattern set.
///
/// All variants are fatal: the process must not start with an
/// unusable pattern set.
#[derive(Debug, Error)]
pub enum PatternError {
    /// A regex pattern failed to compile.
    #[error("invalid regex pattern `{pattern}`: {source}")]
    InvalidRegex {
        /// The offending pattern text.
        pattern: String,
        /// The underlying compile error.
        #[source]
        source: Box<regex::Error>,
    },

    /// A pattern with empty text.
    #[error("empty pattern text for zone {zone:?}")]
    EmptyPattern {
        /// The zone the empty pattern targeted.
        zone: Zone,
    },

    /// The same pattern text registered twice in one zone.
    #[error("duplicate pattern `{pattern}` in zone {zone:?}")]
    DuplicatePattern {
        /// The duplicated pattern text.
        pattern: String,
        /// The zone it was registered under.
        zone: Zone,
    },

    /// The same pattern text registered under two different zones.
    #[error("pattern `{pattern}` registered under both {first:?} and {second:?}")]
    ConflictingPattern {
        /// The conflicting pattern text.
        pattern: String,
        /// The zone of the first registration.
        first: Zone,
        /// The zone of the second registration.
        second: Zone,
    },

    /// A pattern targeting the safe zone.
    #[error("pattern `{pattern}` targets the safe zone; safe is the default outcome, not a matchable zone")]
    SafeZonePattern {
        /// The offending pattern text.
        pattern: String,
    },

    /// Pattern definitions that failed to parse.
    #[error("failed to parse pattern definitions: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single pattern definition, as supplied by configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    /// Literal text or regex source.
    pub pattern: String,
    /// The zone a match places the input in.
    pub zone: Zone,
    /// Semantic tag, e.g. `"violence"` or `"manipulation"`.
    pub tag: String,
    /// True if `pattern` is a regex rather than a literal.
    #[serde(default)]
    pub is_regex: bool,
}

impl Pattern {
    /// Creates a literal pattern.
    pub fn literal(pattern: impl Into<String>, zone: Zone, tag: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            zone,
            tag: tag.into(),
            is_regex: false,
        }
    }

    /// Creates a regex pattern.
    pub fn regex(pattern: impl Into<String>, zone: Zone, tag: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            zone,
            tag: tag.into(),
            is_regex: true,
        }
    }

    /// Parses a JSON array of pattern definitions.
    pub fn from_json(json: &str) -> Result<Vec<Pattern>, PatternError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A case-folded literal with its originating zone and tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledLiteral {
    /// Lowercased literal text.
    pub text: String,
    /// Originating zone.
    pub zone: Zone,
    /// Semantic tag.
    pub tag: String,
}

/// The compiled regexes of one zone.
///
/// The `RegexSet` answers "does anything in this zone match" in one
/// pass; the individual regexes extract the matched text, in
/// definition order.
#[derive(Debug)]
pub struct ZoneRegexes {
    /// The zone these regexes belong to.
    pub zone: Zone,
    /// Combined set for the cheap any-match check.
    pub set: RegexSet,
    /// Individual regexes, definition order.
    pub regexes: Vec<Regex>,
    /// Semantic tag per regex, index-aligned with `regexes`.
    pub tags: Vec<String>,
    /// Regex source per regex, index-aligned with `regexes`.
    pub sources: Vec<String>,
}

/// An immutable, compiled pattern set shared read-only across all
/// classification calls.
#[derive(Debug)]
pub struct CompiledPatternSet {
    literals: Vec<CompiledLiteral>,
    regexes: Vec<ZoneRegexes>,
}

impl CompiledPatternSet {
    /// Compiles a pattern set, failing on the first malformed or
    /// conflicting definition.
    pub fn compile(patterns: Vec<Pattern>) -> Result<Self, PatternError> {
        let mut literals = Vec::new();
        let mut regex_groups: BTreeMap<Zone, (Vec<String>, Vec<String>)> = BTreeMap::new();
        let mut seen: HashMap<(String, bool), Zone> = HashMap::new();

        for p in patterns {
            if p.pattern.trim().is_empty() {
                return Err(PatternError::EmptyPattern { zone: p.zone });
            }
            if p.zone == Zone::Safe {
                return Err(PatternError::SafeZonePattern { pattern: p.pattern });
            }

            let key_text = if p.is_regex {
                p.pattern.clone()
            } else {
                p.pattern.to_lowercase()
            };
            if let Some(&first) = seen.get(&(key_text.clone(), p.is_regex)) {
                if first == p.zone {
                    return Err(PatternError::DuplicatePattern {
                        pattern: p.pattern,
                        zone: p.zone,
                    });
                }
                return Err(PatternError::ConflictingPattern {
                    pattern: p.pattern,
                    first,
                    second: p.zone,
                });
            }
            seen.insert((key_text.clone(), p.is_regex), p.zone);

            if p.is_regex {
                let (sources, tags) = regex_groups.entry(p.zone).or_default();
                sources.push(p.pattern);
                tags.push(p.tag);
            } else {
                literals.push(CompiledLiteral {
                    text: key_text,
                    zone: p.zone,
                    tag: p.tag,
                });
            }
        }

        let mut regexes = Vec::with_capacity(regex_groups.len());
        for (zone, (sources, tags)) in regex_groups {
            let mut compiled = Vec::with_capacity(sources.len());
            for source in &sources {
                let re = RegexBuilder::new(source)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| PatternError::InvalidRegex {
                        pattern: source.clone(),
                        source: Box::new(e),
                    })?;
                compiled.push(re);
            }
            let set = RegexSetBuilder::new(&sources)
                .case_insensitive(true)
                .build()
                .map_err(|e| PatternError::InvalidRegex {
                    pattern: sources.join(" | "),
                    source: Box::new(e),
                })?;
            regexes.push(ZoneRegexes {
                zone,
                set,
                regexes: compiled,
                tags,
                sources,
            });
        }

        Ok(Self { literals, regexes })
    }

    /// Returns all compiled literals, definition order.
    pub fn literals(&self) -> &[CompiledLiteral] {
        &self.literals
    }

    /// Returns the compiled regexes for a zone, if any.
    pub fn zone_regexes(&self, zone: Zone) -> Option<&ZoneRegexes> {
        self.regexes.iter().find(|zr| zr.zone == zone)
    }

    /// Number of compiled literals.
    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }

    /// Number of compiled regexes across all zones.
    pub fn regex_count(&self) -> usize {
        self.regexes.iter().map(|zr| zr.regexes.len()).sum()
    }

    /// True if the set holds no patterns at all.
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.regexes.is_empty()
    }
}

/// Returns the built-in pattern corpus.
pub fn default_patterns() -> Vec<Pattern> {
    let mut patterns = Vec::new();
    patterns.extend(block_patterns());
    patterns.extend(crisis_patterns());
    patterns.extend(ethical_patterns());
    patterns.extend(professional_patterns());
    patterns
}

fn block_patterns() -> Vec<Pattern> {
    let lit = |p: &str, tag: &str| Pattern::literal(p, Zone::Block, tag);
    let re = |p: &str, tag: &str| Pattern::regex(p, Zone::Block, tag);
    vec![
        lit("how to kill someone", "violence"),
        lit("how to murder someone", "violence"),
        lit("mass shooting", "violence"),
        lit("school shooting", "violence"),
        lit("terrorist attack", "violence"),
        lit("torture methods", "violence"),
        lit("how to make a bomb", "weapons"),
        lit("build a pipe bomb", "weapons"),
        lit("make an explosive device", "weapons"),
        lit("untraceable gun", "weapons"),
        lit("print a ghost gun", "weapons"),
        lit("child porn", "csam"),
        lit("child sexual abuse material", "csam"),
        lit("sexualize a minor", "csam"),
        lit("ethnic cleansing", "hate"),
        lit("racial genocide", "hate"),
        lit("kill all immigrants", "hate"),
        lit("white power", "hate"),
        lit("how to make meth", "illegal_synthesis"),
        lit("synthesize fentanyl", "illegal_synthesis"),
        lit("cook methamphetamine", "illegal_synthesis"),
        lit("make ricin", "illegal_synthesis"),
        re(
            r"\bhow\s+to\s+(kill|murder|poison)\s+(someone|somebody|a\s+person|my\s+(husband|wife|boss|neighbor))\b",
            "violence",
        ),
        re(
            r"\b(build|make|construct)\s+(a\s+|an\s+)?(bomb|explosive|pipe\s+bomb|silencer)\b",
            "weapons",
        ),
        re(
            r"\bignore\s+(all\s+)?(previous|prior|your)\s+(instructions|rules|guidelines)\b",
            "jailbreak",
        ),
        re(
            r"\bpretend\s+(you\s+are|to\s+be|you're)\s+(evil|unrestricted|unfiltered)\b",
            "jailbreak",
        ),
        re(
            r"\bbypass\s+(safety|content|ethical)\s+(filters?|restrictions?|guidelines?)\b",
            "jailbreak",
        ),
        re(r"\bjailbreak\s+(prompt|mode)\b", "jailbreak"),
        re(r"\b(dan|developer)\s+mode\b", "jailbreak"),
    ]
}

fn crisis_patterns() -> Vec<Pattern> {
    let lit = |p: &str, tag: &str| Pattern::literal(p, Zone::Crisis, tag);
    let re = |p: &str, tag: &str| Pattern::regex(p, Zone::Crisis, tag);
    vec![
        lit("suicide", "suicide"),
        lit("suicidal", "suicide"),
        lit("kill myself", "suicide"),
        lit("end my life", "suicide"),
        lit("take my own life", "suicide"),
        lit("want to die", "suicide"),
        lit("better off dead", "suicide"),
        lit("no reason to live", "suicide"),
        lit("hurt myself", "self_harm"),
        lit("cut myself", "self_harm"),
        lit("self harm", "self_harm"),
        lit("self-harm", "self_harm"),
        lit("harming myself", "self_harm"),
        re(r"\bend(ing)?\s+it\s+all\b", "suicide"),
        re(r"\bdon'?t\s+want\s+to\s+(live|be\s+alive)\b", "suicide"),
        re(r"\b(cutting|burning)\s+myself\b", "self_harm"),
    ]
}

fn ethical_patterns() -> Vec<Pattern> {
    let lit = |p: &str, tag: &str| Pattern::literal(p, Zone::Ethical, tag);
    let re = |p: &str, tag: &str| Pattern::regex(p, Zone::Ethical, tag);
    vec![
        lit("manipulate my partner", "manipulation"),
        lit("manipulate him into", "manipulation"),
        lit("manipulate her into", "manipulation"),
        lit("gaslight", "manipulation"),
        lit("guilt trip", "manipulation"),
        lit("love bomb", "manipulation"),
        lit("make him jealous", "manipulation"),
        lit("make her jealous", "manipulation"),
        lit("you're my only friend", "dependency"),
        lit("you are my only friend", "dependency"),
        lit("only one who understands me", "dependency"),
        lit("can't talk to anyone but you", "dependency"),
        lit("need you to decide for me", "dependency"),
        lit("manifest my ex", "spiritual_bypassing"),
        lit("twin flame reunion", "spiritual_bypassing"),
        lit("karma will punish them", "spiritual_bypassing"),
        lit("am i going crazy", "mental_health"),
        lit("do i have a mental illness", "mental_health"),
        lit("what is wrong with me mentally", "mental_health"),
        re(r"\bmanipulat\w*\s+(my|his|her|their)\b", "manipulation"),
        re(
            r"\bmake\s+(him|her|them)\s+(stay|love\s+me|feel\s+guilty)\b",
            "manipulation",
        ),
        re(r"\byou('re|\s+are)\s+all\s+i\s+have\b", "dependency"),
        re(r"\b(diagnose|analyze)\s+me\b", "mental_health"),
    ]
}

fn professional_patterns() -> Vec<Pattern> {
    let lit = |p: &str, tag: &str| Pattern::literal(p, Zone::Professional, tag);
    let re = |p: &str, tag: &str| Pattern::regex(p, Zone::Professional, tag);
    vec![
        lit("medication dosage", "medical"),
        lit("side effects", "medical"),
        lit("chest pain", "medical"),
        lit("blood pressure", "medical"),
        lit("is this a symptom", "medical"),
        lit("should i see a doctor", "medical"),
        lit("lawsuit", "legal"),
        lit("legal advice", "legal"),
        lit("sue my landlord", "legal"),
        lit("custody battle", "legal"),
        lit("breach of contract", "legal"),
        lit("power of attorney", "legal"),
        lit("invest my savings", "financial"),
        lit("stock portfolio", "financial"),
        lit("retirement fund", "financial"),
        lit("tax deduction", "financial"),
        lit("refinance my mortgage", "financial"),
        lit("financial advice", "financial"),
        lit("panic attack", "mental_health"),
        lit("anxiety disorder", "mental_health"),
        lit("feeling depressed", "mental_health"),
        lit("my therapist", "mental_health"),
        lit("antidepressants", "mental_health"),
        re(
            r"\bshould\s+i\s+(take|stop\s+taking)\s+(my\s+)?(meds?|medication|pills?|antibiotics)\b",
            "medical",
        ),
        re(r"\b(can|should)\s+i\s+sue\b", "legal"),
        re(r"\b(where|how)\s+should\s+i\s+invest\b", "financial"),
        re(
            r"\b(am\s+i\s+depressed|do\s+i\s+have\s+(depression|anxiety|adhd))\b",
            "mental_health",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::{EthicalFlag, ProfessionalCategory};

    #[test]
    fn compiles_default_corpus() {
        let set = CompiledPatternSet::compile(default_patterns()).unwrap();
        assert!(set.literal_count() > 50);
        assert!(set.regex_count() > 10);
        assert!(!set.is_empty());
    }

    #[test]
    fn literals_are_case_folded_at_load() {
        let set = CompiledPatternSet::compile(vec![Pattern::literal(
            "Guilt TRIP",
            Zone::Ethical,
            "manipulation",
        )])
        .unwrap();
        assert_eq!(set.literals()[0].text, "guilt trip");
    }

    #[test]
    fn invalid_regex_is_fatal() {
        let err = CompiledPatternSet::compile(vec![Pattern::regex(
            r"(unclosed",
            Zone::Block,
            "violence",
        )])
        .unwrap_err();
        assert!(matches!(err, PatternError::InvalidRegex { .. }));
    }

    #[test]
    fn empty_pattern_is_fatal() {
        let err = CompiledPatternSet::compile(vec![Pattern::literal("  ", Zone::Crisis, "suicide")])
            .unwrap_err();
        assert!(matches!(err, PatternError::EmptyPattern { .. }));
    }

    #[test]
    fn safe_zone_pattern_is_fatal() {
        let err = CompiledPatternSet::compile(vec![Pattern::literal("hello", Zone::Safe, "none")])
            .unwrap_err();
        assert!(matches!(err, PatternError::SafeZonePattern { .. }));
    }

    #[test]
    fn conflicting_zones_are_fatal() {
        let err = CompiledPatternSet::compile(vec![
            Pattern::literal("gaslight", Zone::Ethical, "manipulation"),
            Pattern::literal("Gaslight", Zone::Block, "violence"),
        ])
        .unwrap_err();
        assert!(matches!(err, PatternError::ConflictingPattern { .. }));
    }

    #[test]
    fn duplicate_in_same_zone_is_fatal() {
        let err = CompiledPatternSet::compile(vec![
            Pattern::literal("gaslight", Zone::Ethical, "manipulation"),
            Pattern::literal("gaslight", Zone::Ethical, "dependency"),
        ])
        .unwrap_err();
        assert!(matches!(err, PatternError::DuplicatePattern { .. }));
    }

    #[test]
    fn zone_regexes_grouped_per_zone() {
        let set = CompiledPatternSet::compile(default_patterns()).unwrap();
        let block = set.zone_regexes(Zone::Block).unwrap();
        assert_eq!(block.zone, Zone::Block);
        assert_eq!(block.regexes.len(), block.tags.len());
        assert_eq!(block.regexes.len(), block.sources.len());
        assert!(set.zone_regexes(Zone::Safe).is_none());
    }

    #[test]
    fn json_round_trip() {
        let json = r#"[
            {"pattern": "gaslight", "zone": "ethical", "tag": "manipulation"},
            {"pattern": "\\bjailbreak\\s+mode\\b", "zone": "block", "tag": "jailbreak", "is_regex": true}
        ]"#;
        let patterns = Pattern::from_json(json).unwrap();
        assert_eq!(patterns.len(), 2);
        assert!(!patterns[0].is_regex);
        assert!(patterns[1].is_regex);
        assert_eq!(patterns[1].zone, Zone::Block);
        CompiledPatternSet::compile(patterns).unwrap();
    }

    #[test]
    fn malformed_json_is_fatal() {
        let err = Pattern::from_json("not json").unwrap_err();
        assert!(matches!(err, PatternError::Parse(_)));
    }

    // Every Ethical/Professional tag in the shipped corpus must parse
    // into its closed flag set, so preamble/disclaimer selection never
    // silently no-ops for built-in patterns.
    #[test]
    fn default_corpus_tags_parse_into_closed_enums() {
        for p in default_patterns() {
            match p.zone {
                Zone::Ethical => {
                    assert!(
                        EthicalFlag::from_tag(&p.tag).is_some(),
                        "ethical pattern `{}` has unmapped tag `{}`",
                        p.pattern,
                        p.tag
                    );
                }
                Zone::Professional => {
                    assert!(
                        ProfessionalCategory::from_tag(&p.tag).is_some(),
                        "professional pattern `{}` has unmapped tag `{}`",
                        p.pattern,
                        p.tag
                    );
                }
                _ => {}
            }
        }
    }

    // Corpus invariant: no literal of a lower-priority zone contains a
    // higher-priority zone's literal as a substring. Keeps the
    // whole-corpus coverage property exact.
    #[test]
    fn no_cross_zone_literal_shadowing() {
        let patterns: Vec<Pattern> = default_patterns()
            .into_iter()
            .filter(|p| !p.is_regex)
            .collect();
        for outer in &patterns {
            for inner in &patterns {
                if inner.zone < outer.zone {
                    assert!(
                        !outer.pattern.to_lowercase().contains(&inner.pattern.to_lowercase()),
                        "`{}` ({:?}) is shadowed by `{}` ({:?})",
                        outer.pattern,
                        outer.zone,
                        inner.pattern,
                        inner.zone
                    );
                }
            }
        }
    }
}
