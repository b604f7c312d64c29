//! Pre-order traversal over parse trees.
//!
//! Children of a value are all values of all fields of an object, or all
//! elements of an array, in order. Strings, numbers, booleans and null are
//! leaves.

use super::stack::ensure_sufficient_stack;
use serde_json::Value;

/// Iterator over the direct children of a tree value.
pub enum Children<'t> {
    /// Field values of an object.
    Object(serde_json::map::Values<'t>),
    /// Elements of an array.
    Array(std::slice::Iter<'t, Value>),
    /// A primitive leaf.
    Leaf,
}

impl<'t> Iterator for Children<'t> {
    type Item = &'t Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Children::Object(values) => values.next(),
            Children::Array(elements) => elements.next(),
            Children::Leaf => None,
        }
    }
}

/// Direct children of `value`.
pub fn children(value: &Value) -> Children<'_> {
    match value {
        Value::Object(map) => Children::Object(map.values()),
        Value::Array(elements) => Children::Array(elements.iter()),
        _ => Children::Leaf,
    }
}

/// Visit every value of `tree` in pre-order.
///
/// `visit` returns whether to descend into the children of the value it
/// was called with. Siblings are visited regardless.
pub fn walk<'t, F>(tree: &'t Value, visit: &mut F)
where
    F: FnMut(&'t Value) -> bool,
{
    if visit(tree) {
        for child in children(tree) {
            ensure_sufficient_stack(|| walk(child, &mut *visit));
        }
    }
}

/// Decision returned by the visitor of [`abortable_walk`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step<T> {
    /// Keep going into the children of this value.
    Descend,
    /// Skip the children of this value, continue with its siblings.
    Prune,
    /// Stop the whole traversal with a result.
    Found(T),
}

/// Pre-order traversal that stops at the first [`Step::Found`].
///
/// Returns the found result, or `None` once the whole tree was visited.
pub fn abortable_walk<'t, T, F>(tree: &'t Value, mut visit: F) -> Option<T>
where
    F: FnMut(&'t Value) -> Step<T>,
{
    fn go<'t, T, F>(value: &'t Value, visit: &mut F) -> Option<T>
    where
        F: FnMut(&'t Value) -> Step<T>,
    {
        match visit(value) {
            Step::Found(result) => Some(result),
            Step::Prune => None,
            Step::Descend => children(value)
                .find_map(|child| ensure_sufficient_stack(|| go(child, &mut *visit))),
        }
    }

    go(tree, &mut visit)
}
