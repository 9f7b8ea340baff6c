//! Priority-ordered zone resolution.
//!
//! One literal scan covers all zones at once (the scanner tags every
//! hit with its originating zone), then the hits are filtered in
//! priority order: Block, Crisis, Ethical, Professional. A zone's
//! regexes are consulted only when that zone had no literal hit, which
//! keeps the common safe-traffic case to the single cheap literal
//! pass.

use crate::matcher::ScanStrategy;
use crate::pattern::CompiledPatternSet;
use crate::zone::{Zone, ZoneClassification};

/// Stateless per-call classifier.
pub struct ZoneClassifier;

impl ZoneClassifier {
    /// Classifies text against a compiled set using the given scan
    /// strategy.
    ///
    /// Exactly one zone is returned. If patterns from multiple zones
    /// match, the highest-priority zone wins and lower-priority
    /// matches are discarded.
    pub fn classify(
        set: &CompiledPatternSet,
        scanner: &dyn ScanStrategy,
        text: &str,
    ) -> ZoneClassification {
        // Normalize once per call, not per pattern.
        let text_lower = text.to_lowercase();
        let hits = scanner.scan(&text_lower);

        for &zone in Zone::matchable() {
            if let Some(hit) = hits.iter().find(|h| h.zone == zone) {
                tracing::debug!(
                    zone = zone.name(),
                    tag = hit.tag.as_str(),
                    "literal pattern hit"
                );
                return ZoneClassification::from_match(zone, &hit.tag, hit.pattern.clone());
            }
            if let Some(zr) = set.zone_regexes(zone) {
                if zr.set.is_match(&text_lower) {
                    for (i, regex) in zr.regexes.iter().enumerate() {
                        if let Some(m) = regex.find(&text_lower) {
                            tracing::debug!(
                                zone = zone.name(),
                                tag = zr.tags[i].as_str(),
                                "regex pattern hit"
                            );
                            return ZoneClassification::from_match(
                                zone,
                                &zr.tags[i],
                                m.as_str().to_string(),
                            );
                        }
                    }
                }
            }
        }

        ZoneClassification::safe()
    }
}
