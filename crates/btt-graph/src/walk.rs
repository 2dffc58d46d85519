//! Generic tree walker
//!
//! Visits every leaf of a nested mapping/sequence structure exactly once and
//! lets a [`Rewrite`] rule replace it in place. Mapping entries are visited
//! with their key, scalar sequence elements without one. Nested mappings and
//! sequences are recursed into, never handed to the rule.
//!
//! Implemented for [`serde_json::Value`] (preset documents) and
//! [`plist::Value`] (keyed-archive object tables).

use std::marker::PhantomData;

/// Classification of a tree node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Keyed container
    Mapping,
    /// Ordered container
    Sequence,
    /// Scalar value
    Leaf,
    /// Value the walker cannot classify
    Unknown(&'static str),
}

impl NodeKind {
    /// Whether the node holds children
    #[inline]
    #[must_use]
    pub fn is_container(self) -> bool {
        matches!(self, Self::Mapping | Self::Sequence)
    }
}

/// Mutable access to the direct children of a node
pub enum Children<'a, T> {
    /// Entries of a mapping
    Entries(Box<dyn Iterator<Item = (&'a str, &'a mut T)> + 'a>),
    /// Elements of a sequence
    Elements(&'a mut [T]),
    /// Leaf node
    None,
}

/// A node of a nested tree the walker can traverse
pub trait TreeNode: Sized {
    /// Classify this node
    fn kind(&self) -> NodeKind;

    /// Mutable access to the direct children
    fn children_mut(&mut self) -> Children<'_, Self>;
}

/// Rewrite rule applied to every leaf
pub trait Rewrite<T> {
    /// Error aborting the walk
    type Error;

    /// Inspect a leaf; `Some(replacement)` overwrites it in place
    ///
    /// # Errors
    /// Any error stops the walk and is returned from [`walk`].
    fn rewrite(&mut self, key: Option<&str>, value: &mut T) -> Result<Option<T>, Self::Error>;
}

struct FnRewrite<F, E> {
    rule: F,
    _error: PhantomData<fn() -> E>,
}

impl<T, E, F> Rewrite<T> for FnRewrite<F, E>
where
    F: FnMut(Option<&str>, &mut T) -> Result<Option<T>, E>,
{
    type Error = E;

    fn rewrite(&mut self, key: Option<&str>, value: &mut T) -> Result<Option<T>, E> {
        (self.rule)(key, value)
    }
}

/// Walk `root`, applying `rule` to every leaf
///
/// A root that is not a container has nothing to walk and is skipped with a
/// log line, as is any node of [`NodeKind::Unknown`].
///
/// # Errors
/// Returns the first error produced by `rule`.
pub fn walk<T, R>(root: &mut T, rule: &mut R) -> Result<(), R::Error>
where
    T: TreeNode,
    R: Rewrite<T> + ?Sized,
{
    match root.kind() {
        NodeKind::Mapping | NodeKind::Sequence => walk_children(root, rule),
        NodeKind::Leaf => {
            tracing::debug!("Ignoring non-collection root");
            Ok(())
        }
        NodeKind::Unknown(type_name) => {
            tracing::warn!("Ignoring item of type {}", type_name);
            Ok(())
        }
    }
}

/// Walk `root` with a closure as the rewrite rule
///
/// # Errors
/// Returns the first error produced by `rule`.
pub fn walk_with<T, E, F>(root: &mut T, rule: F) -> Result<(), E>
where
    T: TreeNode,
    F: FnMut(Option<&str>, &mut T) -> Result<Option<T>, E>,
{
    walk(
        root,
        &mut FnRewrite {
            rule,
            _error: PhantomData,
        },
    )
}

fn walk_children<T, R>(node: &mut T, rule: &mut R) -> Result<(), R::Error>
where
    T: TreeNode,
    R: Rewrite<T> + ?Sized,
{
    match node.children_mut() {
        Children::Entries(entries) => {
            for (key, value) in entries {
                visit(Some(key), value, rule)?;
            }
        }
        Children::Elements(items) => {
            for item in items {
                visit(None, item, rule)?;
            }
        }
        Children::None => {}
    }
    Ok(())
}

fn visit<T, R>(key: Option<&str>, value: &mut T, rule: &mut R) -> Result<(), R::Error>
where
    T: TreeNode,
    R: Rewrite<T> + ?Sized,
{
    match value.kind() {
        NodeKind::Mapping | NodeKind::Sequence => walk_children(value, rule),
        NodeKind::Leaf => {
            if let Some(replacement) = rule.rewrite(key, value)? {
                *value = replacement;
            }
            Ok(())
        }
        NodeKind::Unknown(type_name) => {
            tracing::warn!("Ignoring item of type {}", type_name);
            Ok(())
        }
    }
}

impl TreeNode for serde_json::Value {
    fn kind(&self) -> NodeKind {
        match self {
            Self::Object(_) => NodeKind::Mapping,
            Self::Array(_) => NodeKind::Sequence,
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => NodeKind::Leaf,
        }
    }

    fn children_mut(&mut self) -> Children<'_, Self> {
        match self {
            Self::Object(map) => {
                Children::Entries(Box::new(map.iter_mut().map(|(k, v)| (k.as_str(), v))))
            }
            Self::Array(items) => Children::Elements(items.as_mut_slice()),
            _ => Children::None,
        }
    }
}

impl TreeNode for plist::Value {
    fn kind(&self) -> NodeKind {
        match self {
            Self::Dictionary(_) => NodeKind::Mapping,
            Self::Array(_) => NodeKind::Sequence,
            Self::Boolean(_)
            | Self::Data(_)
            | Self::Date(_)
            | Self::Real(_)
            | Self::Integer(_)
            | Self::String(_)
            | Self::Uid(_) => NodeKind::Leaf,
            _ => NodeKind::Unknown("plist::Value"),
        }
    }

    fn children_mut(&mut self) -> Children<'_, Self> {
        match self {
            Self::Dictionary(dict) => {
                Children::Entries(Box::new(dict.iter_mut().map(|(k, v)| (k.as_str(), v))))
            }
            Self::Array(items) => Children::Elements(items.as_mut_slice()),
            _ => Children::None,
        }
    }
}
