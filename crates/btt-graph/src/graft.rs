//! Predicate subgraph grafting
//!
//! Appends one renumbered copy of a located predicate per target application
//! and registers each copy in the archive's root list of alternatives.

use crate::error::GraftError;
use crate::graph::{ObjectGraph, NS_OBJECTS_KEY};
use crate::identity::AppIdentity;
use crate::locate::PredicateRange;
use crate::walk::walk_with;
use plist::{Uid, Value};
use std::convert::Infallible;

/// Outcome of one [`graft`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraftReport {
    /// Range that was copied
    pub range: PredicateRange,
    /// Head index of each appended copy, in target order
    pub roots: Vec<u64>,
    /// Number of objects appended
    pub appended: usize,
}

/// Duplicate `range` once per target and splice the copies into the root list
///
/// Inside each copy, references into `range` are shifted to the copy's own
/// indices and the marker string is replaced with the target's matching
/// field. References outside `range` point at shared objects (class
/// metadata, uniqued strings) and are kept.
///
/// # Errors
/// - [`GraftError::DanglingReference`] when `range` exceeds the object table
/// - [`GraftError::RootListNotFound`] when no `NS.objects` list references the range head
pub fn graft(
    graph: &mut ObjectGraph,
    range: PredicateRange,
    source: &AppIdentity,
    targets: &[AppIdentity],
) -> Result<GraftReport, GraftError> {
    let template = slice(graph, range)?;
    let marker = range.marker.value_of(source);
    let original_len = graph.len();
    let mut roots = Vec::with_capacity(targets.len());

    for target in targets {
        let base = graph.len() as u64;
        tracing::info!("Adding {} - starting at ID {}", target, base);

        let replacement = range.marker.value_of(target);
        let mut copy = template.clone();
        for object in &mut copy {
            fix_object(object, range, base, marker, replacement);
        }
        graph.objects_mut().extend(copy);
        roots.push(base);
    }

    splice_roots(graph, range.copy_from, &roots)?;
    tracing::info!("Added {} predicate copies to root tree", roots.len());

    Ok(GraftReport {
        range,
        appended: graph.len() - original_len,
        roots,
    })
}

/// New index for a reference when the range is re-based at `base`
#[inline]
#[must_use]
pub fn renumber(uid: u64, range: PredicateRange, base: u64) -> u64 {
    if range.contains(uid) {
        base + (uid - range.copy_from)
    } else {
        uid
    }
}

fn slice(graph: &ObjectGraph, range: PredicateRange) -> Result<Vec<Value>, GraftError> {
    let dangling = |index: u64| GraftError::DanglingReference {
        index,
        len: graph.len(),
    };
    let from = usize::try_from(range.copy_from).map_err(|_| dangling(range.copy_from))?;
    let to = usize::try_from(range.copy_to).map_err(|_| dangling(range.copy_to))?;
    graph
        .objects()
        .get(from..=to)
        .map(<[Value]>::to_vec)
        .ok_or_else(|| dangling(range.copy_to))
}

fn fix_object(object: &mut Value, range: PredicateRange, base: u64, marker: &str, replacement: &str) {
    match object {
        Value::Uid(uid) => *uid = Uid::new(renumber(uid.get(), range, base)),
        Value::String(text) if text.as_str() == marker => *text = replacement.to_string(),
        Value::Dictionary(_) | Value::Array(_) => {
            walk_with(object, |_, value: &mut Value| {
                Ok::<_, Infallible>(match value {
                    Value::Uid(uid) => Some(Value::Uid(Uid::new(renumber(uid.get(), range, base)))),
                    _ => None,
                })
            })
            .unwrap_or_else(|never| match never {});
        }
        _ => {}
    }
}

/// Append `roots` to the first `NS.objects` list that references `copy_from`
fn splice_roots(graph: &mut ObjectGraph, copy_from: u64, roots: &[u64]) -> Result<(), GraftError> {
    let anchor = Value::Uid(Uid::new(copy_from));
    let list = graph
        .objects_mut()
        .iter_mut()
        .find_map(|object| match object {
            Value::Dictionary(dict) => match dict.get_mut(NS_OBJECTS_KEY) {
                Some(Value::Array(members)) if members.contains(&anchor) => Some(members),
                _ => None,
            },
            _ => None,
        })
        .ok_or(GraftError::RootListNotFound { copy_from })?;

    list.extend(roots.iter().map(|&root| Value::Uid(Uid::new(root))));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::{locate, MarkerKind};
    use plist::Dictionary;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn uid(index: u64) -> Value {
        Value::Uid(Uid::new(index))
    }

    fn dict(entries: Vec<(&str, Value)>) -> Value {
        Value::Dictionary(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect::<Dictionary>(),
        )
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    fn vscode() -> AppIdentity {
        AppIdentity::new("com.microsoft.VSCode", "Visual Studio Code")
    }

    fn targets() -> Vec<AppIdentity> {
        vec![
            AppIdentity::new("com.microsoft.VSCodeInsiders", "Visual Studio Code - Insiders"),
            AppIdentity::new("com.microsoft.VSCodeExploration", "Visual Studio Code - Exploration"),
        ]
    }

    /// Root list at 1, shared class at 2, shared keypath at 3, chain 4..=7
    fn graph() -> ObjectGraph {
        ObjectGraph::from_objects(vec![
            string("$null"),
            dict(vec![("$class", uid(2)), ("NS.objects", Value::Array(vec![uid(4)]))]),
            dict(vec![("$classname", string("NSExpression"))]),
            string("BundleIdentifier"),
            dict(vec![("$class", uid(2)), ("NSLeftExpression", uid(5)), ("NSRightExpression", uid(6))]),
            dict(vec![("$class", uid(2)), ("NSKeyPath", uid(3))]),
            dict(vec![("$class", uid(2)), ("NSConstantValue", uid(7))]),
            string("com.microsoft.VSCode"),
        ])
    }

    #[test]
    fn renumber_shifts_only_inside_range() {
        let range = PredicateRange {
            center: 7,
            copy_from: 4,
            copy_to: 7,
            marker: MarkerKind::BundleIdentifier,
        };
        assert_eq!(renumber(4, range, 8), 8);
        assert_eq!(renumber(7, range, 8), 11);
        assert_eq!(renumber(3, range, 8), 3);
        assert_eq!(renumber(12, range, 8), 12);
    }

    #[test]
    fn grafts_one_copy_per_target() {
        let mut graph = graph();
        let range = locate(&graph, &vscode()).unwrap();
        assert_eq!((range.copy_from, range.copy_to), (4, 7));

        let report = graft(&mut graph, range, &vscode(), &targets()).unwrap();
        assert_eq!(report.roots, vec![8, 12]);
        assert_eq!(report.appended, 8);
        assert_eq!(graph.len(), 16);

        let objects = graph.objects();
        assert_eq!(
            objects[8],
            dict(vec![("$class", uid(2)), ("NSLeftExpression", uid(9)), ("NSRightExpression", uid(10))])
        );
        assert_eq!(objects[9], dict(vec![("$class", uid(2)), ("NSKeyPath", uid(3))]));
        assert_eq!(objects[10], dict(vec![("$class", uid(2)), ("NSConstantValue", uid(11))]));
        assert_eq!(objects[11], string("com.microsoft.VSCodeInsiders"));
        assert_eq!(objects[14], dict(vec![("$class", uid(2)), ("NSConstantValue", uid(15))]));
        assert_eq!(objects[15], string("com.microsoft.VSCodeExploration"));

        let root_list = objects[1].as_dictionary().unwrap();
        assert_eq!(
            root_list.get(NS_OBJECTS_KEY),
            Some(&Value::Array(vec![uid(4), uid(8), uid(12)]))
        );
    }

    #[test]
    fn source_range_is_untouched() {
        let mut graph = graph();
        let before = graph.objects()[2..8].to_vec();
        let range = locate(&graph, &vscode()).unwrap();
        graft(&mut graph, range, &vscode(), &targets()).unwrap();
        assert_eq!(&graph.objects()[2..8], before.as_slice());
    }

    #[test]
    fn display_name_marker_substitutes_names() {
        let mut objects = graph().objects().to_vec();
        objects[7] = string("Visual Studio Code");
        let mut graph = ObjectGraph::from_objects(objects);
        let range = locate(&graph, &vscode()).unwrap();
        graft(&mut graph, range, &vscode(), &targets()).unwrap();
        assert_eq!(graph.objects()[11], string("Visual Studio Code - Insiders"));
        assert_eq!(graph.objects()[15], string("Visual Studio Code - Exploration"));
    }

    #[test]
    fn missing_root_list_is_structure_fault() {
        let mut objects = graph().objects().to_vec();
        objects[1] = dict(vec![("NS.objects", Value::Array(vec![uid(3)]))]);
        let mut graph = ObjectGraph::from_objects(objects);
        let range = locate(&graph, &vscode()).unwrap();
        assert!(matches!(
            graft(&mut graph, range, &vscode(), &targets()),
            Err(GraftError::RootListNotFound { copy_from: 4 })
        ));
    }

    #[test]
    fn out_of_table_range_is_rejected() {
        let mut graph = graph();
        let range = PredicateRange {
            center: 7,
            copy_from: 4,
            copy_to: 30,
            marker: MarkerKind::BundleIdentifier,
        };
        assert!(matches!(
            graft(&mut graph, range, &vscode(), &targets()),
            Err(GraftError::DanglingReference { .. })
        ));
        assert_eq!(graph.len(), 8);
    }

    fn references_in(object: &Value, out: &mut Vec<u64>) {
        match object {
            Value::Uid(uid) => out.push(uid.get()),
            Value::Dictionary(dict) => dict.values().for_each(|v| references_in(v, out)),
            Value::Array(items) => items.iter().for_each(|v| references_in(v, out)),
            _ => {}
        }
    }

    proptest! {
        #[test]
        fn prop_graft_growth_and_renumbering(target_count in 1usize..6) {
            let mut graph = graph();
            let range = locate(&graph, &vscode()).unwrap();
            let targets: Vec<AppIdentity> = (0..target_count)
                .map(|i| AppIdentity::new(format!("com.example.App{i}"), format!("App {i}")))
                .collect();
            let before = graph.len();
            let report = graft(&mut graph, range, &vscode(), &targets).unwrap();

            prop_assert_eq!(graph.len(), before + target_count * range.span() as usize);
            for (copy, &root) in report.roots.iter().enumerate() {
                let copy_range = root..root + range.span();
                for offset in 0..range.span() {
                    let original = &graph.objects()[(range.copy_from + offset) as usize];
                    let copied = &graph.objects()[(root + offset) as usize];
                    let mut old_refs = Vec::new();
                    let mut new_refs = Vec::new();
                    references_in(original, &mut old_refs);
                    references_in(copied, &mut new_refs);
                    prop_assert_eq!(old_refs.len(), new_refs.len());
                    for (old, new) in old_refs.into_iter().zip(new_refs) {
                        if range.contains(old) {
                            prop_assert!(copy_range.contains(&new), "copy {} ref {} -> {}", copy, old, new);
                        } else {
                            prop_assert_eq!(old, new);
                        }
                    }
                }
            }
        }
    }
}
