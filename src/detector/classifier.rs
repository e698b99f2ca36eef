use std::collections::HashMap;

use crate::config::DetectionConfig;
use crate::dom::{native_rows, GridNode};

const TABLE_ROLES: &[&str] = &["grid", "table"];
const TABLE_DISPLAYS: &[&str] = &["grid", "table", "inline-grid"];

/// `grid` or `table`, ignoring case and surrounding whitespace.
pub fn is_table_role(role: &str) -> bool {
    let role = role.trim();
    TABLE_ROLES.iter().any(|r| role.eq_ignore_ascii_case(r))
}

/// Which rule accepted an element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateReason {
    NativeTable,
    AriaRole,
    CssDisplay,
    RepeatedTag(f32),
    RepeatedClass(f32),
}

/// Share of sampled children that repeat the most common tag and the most
/// common class string. A missing class counts as the empty string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Similarity {
    pub sample_size: usize,
    pub tag_ratio: f32,
    pub class_ratio: f32,
}

/// Decides whether an element looks like it holds tabular data.
///
/// Semantic signals (markup, ARIA, CSS) are checked first; the repeated
/// children heuristic catches div-built tables. False positives are
/// expected, the row filter and the user's click gate the result.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: DetectionConfig,
}

impl Classifier {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn is_candidate<N: GridNode>(&self, element: &N) -> bool {
        self.classify(element).is_some()
    }

    /// First matching rule, or `None`.
    pub fn classify<N: GridNode>(&self, element: &N) -> Option<CandidateReason> {
        if element.is_native_table() {
            return Some(CandidateReason::NativeTable);
        }

        if element.role().map(is_table_role).unwrap_or(false) {
            return Some(CandidateReason::AriaRole);
        }

        if let Some(display) = element.display() {
            let display = display.trim();
            if TABLE_DISPLAYS.iter().any(|d| display.eq_ignore_ascii_case(d)) {
                return Some(CandidateReason::CssDisplay);
            }
        }

        let similarity = self.similarity(element)?;
        let threshold = self.config.similarity_ratio;
        if similarity.tag_ratio > threshold {
            Some(CandidateReason::RepeatedTag(similarity.tag_ratio))
        } else if similarity.class_ratio > threshold {
            Some(CandidateReason::RepeatedClass(similarity.class_ratio))
        } else {
            None
        }
    }

    /// `None` when the element has too few children to judge.
    pub fn similarity<N: GridNode>(&self, element: &N) -> Option<Similarity> {
        let children = element.children();
        if children.len() <= self.config.similarity_min_children {
            return None;
        }

        let sample = &children[..children.len().min(self.config.similarity_sample)];
        let sample_size = sample.len();

        let mut tags: HashMap<&str, usize> = HashMap::new();
        let mut classes: HashMap<&str, usize> = HashMap::new();
        for child in sample {
            *tags.entry(child.tag_name()).or_insert(0) += 1;
            *classes.entry(child.class_name()).or_insert(0) += 1;
        }

        let top = |counts: &HashMap<&str, usize>| counts.values().copied().max().unwrap_or(0);
        Some(Similarity {
            sample_size,
            tag_ratio: top(&tags) as f32 / sample_size as f32,
            class_ratio: top(&classes) as f32 / sample_size as f32,
        })
    }

    /// Rejects header-only and single-row candidates.
    pub fn has_enough_rows<N: GridNode>(&self, element: &N) -> bool {
        let rows = if element.is_native_table() {
            native_rows(element).len()
        } else {
            element.child_count()
        };
        rows > self.config.min_rows
    }

    /// Candidate and enough rows.
    pub fn qualifies<N: GridNode>(&self, element: &N) -> bool {
        self.is_candidate(element) && self.has_enough_rows(element)
    }
}
