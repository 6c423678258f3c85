//! The ordered list of selected passes and its display projections.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::PassId;

/// How the selected pass list is shown. Has no effect on execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Condensed,
    #[default]
    Expanded,
}

impl DisplayMode {
    pub fn toggled(self) -> Self {
        match self {
            DisplayMode::Condensed => DisplayMode::Expanded,
            DisplayMode::Expanded => DisplayMode::Condensed,
        }
    }

    /// Style class a front end attaches to the pass list widget.
    pub fn style_class(self) -> Option<&'static str> {
        match self {
            DisplayMode::Condensed => Some("condensed"),
            DisplayMode::Expanded => None,
        }
    }
}

/// One row of a projected pass list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedPass {
    pub pass: PassId,
    pub count: usize,
}

impl fmt::Display for ProjectedPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count > 1 {
            write!(f, "{} \u{d7}{}", self.pass, self.count)
        } else {
            write!(f, "{}", self.pass)
        }
    }
}

/// Passes in execution order. Duplicates are allowed; empty is the
/// identity pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PipelineSequence {
    passes: Vec<PassId>,
}

impl PipelineSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, pass: PassId) {
        self.passes.push(pass);
    }

    pub fn remove_last(&mut self) -> Option<PassId> {
        self.passes.pop()
    }

    pub fn clear(&mut self) {
        self.passes.clear();
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn as_slice(&self) -> &[PassId] {
        &self.passes
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PassId> {
        self.passes.iter()
    }

    /// Read-only rendering list. `Condensed` collapses consecutive repeats.
    pub fn project(&self, mode: DisplayMode) -> Vec<ProjectedPass> {
        match mode {
            DisplayMode::Expanded => self
                .passes
                .iter()
                .map(|p| ProjectedPass {
                    pass: p.clone(),
                    count: 1,
                })
                .collect(),
            DisplayMode::Condensed => {
                let mut rows: Vec<ProjectedPass> = Vec::new();
                for pass in &self.passes {
                    match rows.last_mut() {
                        Some(row) if &row.pass == pass => row.count += 1,
                        _ => rows.push(ProjectedPass {
                            pass: pass.clone(),
                            count: 1,
                        }),
                    }
                }
                rows
            }
        }
    }

    /// Command line that reproduces this pipeline, e.g. `irlab-opt -p dce,renumber`.
    pub fn to_query(&self, tool: &str) -> String {
        let list: Vec<&str> = self.passes.iter().map(PassId::as_str).collect();
        format!("{} -p {}", tool, list.join(","))
    }
}

impl FromIterator<PassId> for PipelineSequence {
    fn from_iter<I: IntoIterator<Item = PassId>>(iter: I) -> Self {
        PipelineSequence {
            passes: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a PipelineSequence {
    type Item = &'a PassId;
    type IntoIter = std::slice::Iter<'a, PassId>;

    fn into_iter(self) -> Self::IntoIter {
        self.passes.iter()
    }
}

/// Parse a comma-separated pass list (`"a, b,c"`). Empty segments are skipped.
pub fn parse_pass_list(list: &str) -> PipelineSequence {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PassId::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(names: &[&str]) -> PipelineSequence {
        names.iter().map(|n| PassId::new(n)).collect()
    }

    #[test]
    fn append_keeps_insertion_order_and_duplicates() {
        let mut s = PipelineSequence::new();
        s.append("b".into());
        s.append("a".into());
        s.append("b".into());
        assert_eq!(s, seq(&["b", "a", "b"]));
    }

    #[test]
    fn remove_last_on_empty_is_noop() {
        let mut s = PipelineSequence::new();
        assert_eq!(s.remove_last(), None);
        assert!(s.is_empty());
        s.append("x".into());
        assert_eq!(s.remove_last(), Some(PassId::new("x")));
    }

    #[test]
    fn condensed_projection_collapses_consecutive_runs_only() {
        let s = seq(&["dce", "dce", "dce", "fold", "dce"]);
        let rows: Vec<String> = s
            .project(DisplayMode::Condensed)
            .iter()
            .map(|r| r.to_string())
            .collect();
        assert_eq!(rows, vec!["dce \u{d7}3", "fold", "dce"]);
        assert_eq!(s.len(), 5);
    }

    #[test]
    fn expanded_projection_lists_every_pass() {
        let s = seq(&["a", "a", "b"]);
        let rows = s.project(DisplayMode::Expanded);
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.count == 1));
    }

    #[test]
    fn projection_does_not_touch_underlying_sequence() {
        let mut s = seq(&["a", "a", "b"]);
        let _ = s.project(DisplayMode::Condensed);
        assert_eq!(s.remove_last(), Some(PassId::new("b")));
        assert_eq!(s.remove_last(), Some(PassId::new("a")));
        assert_eq!(s.remove_last(), Some(PassId::new("a")));
    }

    #[test]
    fn query_round_trips_through_pass_list() {
        let s = seq(&["canonicalize", "dce", "dce"]);
        let query = s.to_query("irlab-opt");
        assert_eq!(query, "irlab-opt -p canonicalize,dce,dce");
        let list = query.split_once(" -p ").map(|(_, l)| l).unwrap();
        assert_eq!(parse_pass_list(list), s);
    }

    #[test]
    fn pass_list_skips_blank_segments() {
        assert_eq!(parse_pass_list(" a, ,b,, "), seq(&["a", "b"]));
        assert!(parse_pass_list("").is_empty());
    }

    #[test]
    fn display_mode_toggles_and_derives_style_class() {
        assert_eq!(DisplayMode::default(), DisplayMode::Expanded);
        assert_eq!(DisplayMode::Expanded.toggled(), DisplayMode::Condensed);
        assert_eq!(DisplayMode::Condensed.style_class(), Some("condensed"));
        assert_eq!(DisplayMode::Expanded.style_class(), None);
    }
}
