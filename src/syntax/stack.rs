//! Stack safety for recursion over parse trees.
//!
//! Lowering, walking and pattern solving recurse once per nesting level.
//! Each recursive step runs through [`ensure_sufficient_stack`], which
//! grows the stack on demand instead of overflowing it.

/// Grow the stack when less than this remains.
const RED_ZONE: usize = 128 * 1024;

/// Size of each additional stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if it is close to exhausted.
#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}
