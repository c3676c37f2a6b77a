//! Lint diagnostics for templates.
//!
//! Reports structural issues without modifying anything. Runs on the raw
//! element list so problems that `template::from_json` would reject (or
//! that a `Document` cannot represent) are still reported.

use crate::id::ElementId;
use crate::model::{Element, ElementType};
use std::collections::{HashMap, HashSet};

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Breaks grouping or clipping.
    Warning,
    /// Harmless leftovers.
    Info,
}

/// A single lint diagnostic for an element.
#[derive(Debug, Clone)]
pub struct LintDiagnostic {
    pub element_id: ElementId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "duplicate-id", "orphan-mask").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over an element sequence.
#[must_use]
pub fn lint_elements(elements: &[Element]) -> Vec<LintDiagnostic> {
    let types: HashMap<ElementId, ElementType> = elements
        .iter()
        .map(|e| (e.id(), e.element_type()))
        .collect();

    let mut diags = Vec::new();
    lint_duplicate_ids(elements, &mut diags);
    lint_dangling_groups(elements, &types, &mut diags);
    lint_masks(elements, &mut diags);
    lint_empty_groups(elements, &mut diags);
    lint_group_cycles(elements, &mut diags);

    for d in &diags {
        if d.severity == LintSeverity::Warning {
            log::warn!("{}: {}", d.rule, d.message);
        }
    }
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

fn lint_duplicate_ids(elements: &[Element], diags: &mut Vec<LintDiagnostic>) {
    let mut seen = HashSet::new();
    for e in elements {
        if !seen.insert(e.id()) {
            diags.push(LintDiagnostic {
                element_id: e.id(),
                message: format!("Element id `{}` is used more than once.", e.id()),
                severity: LintSeverity::Warning,
                rule: "duplicate-id",
            });
        }
    }
}

/// `groupId` must name an existing group.
fn lint_dangling_groups(
    elements: &[Element],
    types: &HashMap<ElementId, ElementType>,
    diags: &mut Vec<LintDiagnostic>,
) {
    for e in elements {
        let Some(group) = e.group_id() else { continue };
        let message = match types.get(&group) {
            None => format!("`{}` belongs to missing group `{group}`.", e.id()),
            Some(ElementType::Group) => continue,
            Some(other) => format!("`{}` points at `{group}`, which is a {other}, not a group.", e.id()),
        };
        diags.push(LintDiagnostic {
            element_id: e.id(),
            message,
            severity: LintSeverity::Warning,
            rule: "dangling-group",
        });
    }
}

/// At most one mask per group, and masks only make sense inside one.
fn lint_masks(elements: &[Element], diags: &mut Vec<LintDiagnostic>) {
    let mut masks_per_group: HashMap<ElementId, usize> = HashMap::new();
    for e in elements.iter().filter(|e| e.is_clipping_mask()) {
        match e.group_id() {
            Some(group) => {
                let count = masks_per_group.entry(group).or_insert(0);
                *count += 1;
                if *count == 2 {
                    diags.push(LintDiagnostic {
                        element_id: group,
                        message: format!("Group `{group}` has more than one clipping mask."),
                        severity: LintSeverity::Warning,
                        rule: "multiple-masks",
                    });
                }
            }
            None => diags.push(LintDiagnostic {
                element_id: e.id(),
                message: format!("`{}` is marked as a clipping mask but is not in a group.", e.id()),
                severity: LintSeverity::Info,
                rule: "orphan-mask",
            }),
        }
    }
}

fn lint_empty_groups(elements: &[Element], diags: &mut Vec<LintDiagnostic>) {
    let parents: HashSet<ElementId> = elements.iter().filter_map(Element::group_id).collect();
    for e in elements.iter().filter(|e| e.is_group()) {
        if !parents.contains(&e.id()) {
            diags.push(LintDiagnostic {
                element_id: e.id(),
                message: format!("Group `{}` has no members.", e.id()),
                severity: LintSeverity::Info,
                rule: "empty-group",
            });
        }
    }
}

/// A group chain that loops back on itself would make the element invisible
/// to every traversal.
fn lint_group_cycles(elements: &[Element], diags: &mut Vec<LintDiagnostic>) {
    let parent: HashMap<ElementId, ElementId> = elements
        .iter()
        .filter_map(|e| e.group_id().map(|g| (e.id(), g)))
        .collect();

    let mut reported = HashSet::new();
    for e in elements.iter().filter(|e| e.is_group()) {
        let start = e.id();
        let mut current = parent.get(&start).copied();
        for _ in 0..parent.len() {
            match current {
                Some(id) if id == start => {
                    if reported.insert(start) {
                        diags.push(LintDiagnostic {
                            element_id: start,
                            message: format!("Group `{start}` is nested inside itself."),
                            severity: LintSeverity::Warning,
                            rule: "group-cycle",
                        });
                    }
                    break;
                }
                Some(id) => current = parent.get(&id).copied(),
                None => break,
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
