//! Stack growth for the recursive stages of the pipeline.
//!
//! Parsing, tree building and evaluation all recurse once per nesting level.
//! Wrapping those recursive entry points in [`ensure_sufficient_stack`] lets
//! the evaluator's own depth limit, not the native stack, decide when a
//! program is too deep.

/// If less than this remains, grow the stack.
const RED_ZONE: usize = 100 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
