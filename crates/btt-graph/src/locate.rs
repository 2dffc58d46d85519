//! Predicate subgraph locator
//!
//! BTT encodes "frontmost app is X" as a chain of objects: a comparison
//! predicate whose operator and expressions are stored right after it, ending
//! in the constant string naming the app. Nothing in the archive says where
//! that chain starts, so the range is recovered from the reference structure:
//!
//! 1. find the app's string (`center`),
//! 2. walk backwards collecting every dictionary that references something
//!    already collected; the last one collected is the head (`copy_from`),
//! 3. follow the highest direct reference forward until it stops growing
//!    (`copy_to`).
//!
//! The predicate is then the contiguous range `copy_from..=copy_to`.

use crate::error::GraftError;
use crate::graph::{direct_references, max_direct_reference, ObjectGraph};
use crate::identity::AppIdentity;

/// Which field of the source identity was found in the object table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// The bundle identifier string
    BundleIdentifier,
    /// The display name string (fallback)
    DisplayName,
}

impl MarkerKind {
    /// The identity field this marker kind refers to
    #[must_use]
    pub fn value_of(self, identity: &AppIdentity) -> &str {
        match self {
            Self::BundleIdentifier => &identity.bundle_id,
            Self::DisplayName => &identity.name,
        }
    }
}

/// Contiguous index range holding one application's predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateRange {
    /// Index of the identity string
    pub center: u64,
    /// First index of the predicate (its head)
    pub copy_from: u64,
    /// Last index of the predicate, inclusive
    pub copy_to: u64,
    /// Field used to find `center`
    pub marker: MarkerKind,
}

impl PredicateRange {
    /// Number of objects in the range
    #[inline]
    #[must_use]
    pub fn span(&self) -> u64 {
        self.copy_to - self.copy_from + 1
    }

    /// Whether `index` lies inside the range
    #[inline]
    #[must_use]
    pub fn contains(&self, index: u64) -> bool {
        (self.copy_from..=self.copy_to).contains(&index)
    }
}

/// Locate the predicate subgraph for `source`
///
/// The bundle identifier is tried first, then the display name.
///
/// # Errors
/// - [`GraftError::MarkerNotFound`] when neither string is in the object table
/// - [`GraftError::DanglingReference`] when the forward search leaves the table
pub fn locate(graph: &ObjectGraph, source: &AppIdentity) -> Result<PredicateRange, GraftError> {
    let (center, marker) = find_marker(graph, source)?;
    let copy_from = chase_back(graph, center);
    let copy_to = forward_bound(graph, copy_from, center)?;

    if center > copy_to {
        tracing::warn!(
            "Predicate range {}..={} does not cover marker at {}",
            copy_from,
            copy_to,
            center
        );
    }
    tracing::info!(
        "Located {} predicate: objects {}..={} (marker at {})",
        source,
        copy_from,
        copy_to,
        center
    );

    Ok(PredicateRange {
        center,
        copy_from,
        copy_to,
        marker,
    })
}

fn find_marker(graph: &ObjectGraph, source: &AppIdentity) -> Result<(u64, MarkerKind), GraftError> {
    if let Some(center) = graph.position_of_string(&source.bundle_id) {
        return Ok((center, MarkerKind::BundleIdentifier));
    }
    if let Some(center) = graph.position_of_string(&source.name) {
        tracing::debug!("Bundle id {} absent, using display name", source.bundle_id);
        return Ok((center, MarkerKind::DisplayName));
    }
    Err(GraftError::MarkerNotFound {
        source_app: source.clone(),
    })
}

/// Backward reference chase from `center`; returns the last index collected
fn chase_back(graph: &ObjectGraph, center: u64) -> u64 {
    let mut reachable = vec![center];
    for position in (0..=center).rev() {
        let Some(object) = graph.get(position) else {
            continue;
        };
        // non-dictionaries hold no direct references
        for target in direct_references(object) {
            if reachable.contains(&target) {
                reachable.push(position);
            }
        }
    }
    tracing::debug!("Backward chase from {} collected {:?}", center, reachable);
    reachable.last().copied().unwrap_or(center)
}

/// Forward transitive bound of the predicate headed at `copy_from`
fn forward_bound(graph: &ObjectGraph, copy_from: u64, center: u64) -> Result<u64, GraftError> {
    let head = graph.get(copy_from).ok_or(GraftError::DanglingReference {
        index: copy_from,
        len: graph.len(),
    })?;
    let Some(mut copy_to) = max_direct_reference(head) else {
        // head is the marker itself or holds no references
        return Ok(copy_from.max(center));
    };

    loop {
        let object = graph.get(copy_to).ok_or(GraftError::DanglingReference {
            index: copy_to,
            len: graph.len(),
        })?;
        match max_direct_reference(object) {
            Some(next) if next > copy_to => copy_to = next,
            _ => break,
        }
    }
    Ok(copy_to)
}
