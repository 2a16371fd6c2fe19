//! Link consistency checks for a diagram.
//!
//! Reports disagreements between the three records of a link (handle
//! field, connection point list, graph edge) without modifying anything.

use crate::connpoint::HandleRef;
use crate::diagram::{Diagram, LinkRecord};
use crate::handle::ConnectionTarget;
use crate::id::ObjectId;
use std::collections::HashSet;

// ─── Diagnostic types ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// The link records disagree; connected moves will misbehave.
    Error,
    /// Redundant or stale data that is harmless to keep.
    Warning,
}

#[derive(Debug, Clone)]
pub struct LinkDiagnostic {
    pub object: ObjectId,
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dangling-handle").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

#[must_use]
pub fn check_links(dia: &Diagram) -> Vec<LinkDiagnostic> {
    let mut diags = Vec::new();
    check_handles(dia, &mut diags);
    check_backrefs(dia, &mut diags);
    check_edges(dia, &mut diags);
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

/// Every `connected_to` must name an existing point that lists the
/// handle back.
fn check_handles(dia: &Diagram, diags: &mut Vec<LinkDiagnostic>) {
    for obj in dia.objects() {
        for (i, h) in obj.handles().iter().enumerate() {
            let Some(target) = h.connected_to() else { continue };
            let Some(anchor) = dia.get(target.object) else {
                diags.push(LinkDiagnostic {
                    object: obj.id(),
                    message: format!("handle #{i} is bound to missing object {}", target.object),
                    severity: LintSeverity::Error,
                    rule: "dangling-handle",
                });
                continue;
            };
            let Some(cp) = anchor.connection_points().get(target.point) else {
                diags.push(LinkDiagnostic {
                    object: obj.id(),
                    message: format!(
                        "handle #{i} is bound to point #{} of {}, which has only {}",
                        target.point,
                        target.object,
                        anchor.connection_points().len()
                    ),
                    severity: LintSeverity::Error,
                    rule: "point-out-of-range",
                });
                continue;
            };
            let me = HandleRef {
                object: obj.id(),
                handle: i,
            };
            if !cp.connected().contains(&me) {
                diags.push(LinkDiagnostic {
                    object: obj.id(),
                    message: format!(
                        "handle #{i} is bound to {}@{} but the point does not list it",
                        target.object, target.point
                    ),
                    severity: LintSeverity::Error,
                    rule: "missing-backref",
                });
            }
        }
    }
}

/// Every back-reference must come from a handle bound to this point.
fn check_backrefs(dia: &Diagram, diags: &mut Vec<LinkDiagnostic>) {
    for obj in dia.objects() {
        for (p, cp) in obj.connection_points().iter().enumerate() {
            let here = ConnectionTarget {
                object: obj.id(),
                point: p,
            };
            for r in cp.connected() {
                let bound = dia
                    .get(r.object)
                    .and_then(|o| o.handles().get(r.handle))
                    .and_then(|h| h.connected_to());
                if bound != Some(here) {
                    diags.push(LinkDiagnostic {
                        object: obj.id(),
                        message: format!("point #{p} lists {}#{} which is not bound to it", r.object, r.handle),
                        severity: LintSeverity::Warning,
                        rule: "orphan-backref",
                    });
                }
            }
        }
    }
}

/// Graph edges and handle fields must describe the same set of links.
fn check_edges(dia: &Diagram, diags: &mut Vec<LinkDiagnostic>) {
    let edges: HashSet<LinkRecord> = dia.links().into_iter().collect();
    let fields: HashSet<LinkRecord> = dia
        .objects()
        .flat_map(|o| {
            let id = o.id();
            o.handles()
                .iter()
                .enumerate()
                .filter_map(move |(i, h)| {
                    h.connected_to().map(|target| LinkRecord {
                        object: id,
                        handle: i,
                        target,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect();
    for link in edges.symmetric_difference(&fields) {
        let side = if edges.contains(link) { "edge without field" } else { "field without edge" };
        diags.push(LinkDiagnostic {
            object: link.object,
            message: format!(
                "{side}: #{} -> {}@{}",
                link.handle, link.target.object, link.target.point
            ),
            severity: LintSeverity::Error,
            rule: "edge-mismatch",
        });
    }
}
