//! Multi-pattern literal scanning strategies.
//!
//! The primary strategy builds an Aho-Corasick automaton over every
//! literal across all zones, so one left-to-right pass over the input
//! yields every literal hit with its zone and tag, in time
//! proportional to input length plus matches rather than pattern
//! count. The fallback strategy tests substring containment per
//! literal and exists only as a degraded-availability path.
//!
//! Both strategies report each literal at most once, ordered by
//! pattern-definition index, so they are interchangeable behind
//! `ScanStrategy` and produce identical downstream classifications.

use std::collections::HashSet;

use aho_corasick::AhoCorasick;

use crate::pattern::{CompiledLiteral, CompiledPatternSet};
use crate::zone::Zone;

/// A single literal hit reported by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralHit {
    /// Zone of the matched literal.
    pub zone: Zone,
    /// Semantic tag of the matched literal.
    pub tag: String,
    /// The (case-folded) literal text that matched.
    pub pattern: String,
}

/// A literal-scanning strategy.
///
/// Implementations must report each distinct literal at most once, in
/// pattern-definition order, and expect input that is already
/// lowercased (normalization happens once per classification call).
pub trait ScanStrategy: Send + Sync {
    /// Scans lowercased text for literal hits.
    fn scan(&self, text_lower: &str) -> Vec<LiteralHit>;

    /// Returns the name of this strategy for logging/debugging.
    fn name(&self) -> &'static str;
}

/// Aho-Corasick automaton scanner (primary strategy).
pub struct AutomatonScanner {
    automaton: AhoCorasick,
    // Index-aligned with the automaton's pattern IDs.
    literals: Vec<CompiledLiteral>,
}

impl AutomatonScanner {
    /// Builds the automaton from every literal in the set.
    pub fn build(set: &CompiledPatternSet) -> Result<Self, aho_corasick::BuildError> {
        let literals = set.literals().to_vec();
        let automaton = AhoCorasick::builder().build(literals.iter().map(|l| l.text.as_str()))?;
        Ok(Self { automaton, literals })
    }
}

impl ScanStrategy for AutomatonScanner {
    fn scan(&self, text_lower: &str) -> Vec<LiteralHit> {
        let mut seen = HashSet::new();
        let mut indices = Vec::new();
        // Overlapping iteration so literals that end inside longer
        // literals are still reported.
        for m in self.automaton.find_overlapping_iter(text_lower) {
            let idx = m.pattern().as_usize();
            if seen.insert(idx) {
                indices.push(idx);
            }
        }
        indices.sort_unstable();
        indices
            .into_iter()
            .map(|idx| {
                let lit = &self.literals[idx];
                LiteralHit {
                    zone: lit.zone,
                    tag: lit.tag.clone(),
                    pattern: lit.text.clone(),
                }
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "automaton"
    }
}

/// Per-literal containment scanner (degraded fallback).
pub struct LinearScanner {
    literals: Vec<CompiledLiteral>,
}

impl LinearScanner {
    /// Creates a linear scanner over every literal in the set.
    pub fn new(set: &CompiledPatternSet) -> Self {
        Self {
            literals: set.literals().to_vec(),
        }
    }
}

impl ScanStrategy for LinearScanner {
    fn scan(&self, text_lower: &str) -> Vec<LiteralHit> {
        self.literals
            .iter()
            .filter(|lit| text_lower.contains(&lit.text))
            .map(|lit| LiteralHit {
                zone: lit.zone,
                tag: lit.tag.clone(),
                pattern: lit.text.clone(),
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "linear"
    }
}

/// Selects a strategy for the given set.
///
/// Automaton construction failure is non-fatal: the linear scanner is
/// functionally equivalent, so the engine degrades rather than
/// refusing to classify.
pub fn build_strategy(set: &CompiledPatternSet) -> Box<dyn ScanStrategy> {
    match AutomatonScanner::build(set) {
        Ok(scanner) => Box::new(scanner),
        Err(err) => {
            tracing::warn!(
                "automaton construction failed, degrading to linear scan: {err}"
            );
            Box::new(LinearScanner::new(set))
        }
    }
}
