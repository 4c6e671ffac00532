//! Circular dependency detection infrastructure.

use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{DiError, DiResult};

// Thread-local resolution state for circular dependency detection
thread_local! {
    static RESOLUTION_TLS: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
}

/// Panic payload carrying a resolution error out of a user factory.
///
/// Factories are plain closures returning instances, so a failure inside a
/// nested resolution unwinds to the nearest enclosing resolution, which turns
/// it back into a `DiError`.
#[derive(Debug)]
pub struct ResolutionPanic {
    pub error: DiError,
}

/// Guard for managing the thread-local resolution stack
pub(crate) struct StackGuard {
    name: &'static str,
}

impl StackGuard {
    fn enter(name: &'static str, max_depth: usize) -> DiResult<Self> {
        RESOLUTION_TLS.with(|tls| {
            let mut stack = tls.borrow_mut();

            // Circular detection BEFORE pushing the new name
            if stack.iter().any(|&n| n == name) {
                let mut path = stack.clone();
                path.push(name);
                return Err(DiError::Circular(path));
            }

            if stack.len() >= max_depth {
                return Err(DiError::DepthExceeded(stack.len()));
            }

            stack.push(name);
            Ok(Self { name })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_TLS.with(|tls| {
            let popped = tls.borrow_mut().pop();
            debug_assert_eq!(popped, Some(self.name));
        });
    }
}

/// Whether the current thread is inside a resolution.
pub(crate) fn in_resolution() -> bool {
    RESOLUTION_TLS.with(|tls| !tls.borrow().is_empty())
}

/// Run `f` as one resolution step of `name`.
///
/// A `ResolutionPanic` raised by a nested step is caught here and returned as
/// an error; every other panic keeps unwinding.
pub(crate) fn with_circular_catch<T, F>(name: &'static str, max_depth: usize, f: F) -> DiResult<T>
where
    F: FnOnce() -> DiResult<T>,
{
    let _guard = StackGuard::enter(name, max_depth)?;

    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => match payload.downcast::<ResolutionPanic>() {
            Ok(resolution) => Err(resolution.error),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

/// Fail fast with `error`.
///
/// Inside a resolution the error travels as a `ResolutionPanic` so the
/// enclosing step can report it; at the top level it becomes an ordinary
/// panic with a readable message.
pub(crate) fn raise(error: DiError) -> ! {
    if in_resolution() {
        panic::panic_any(ResolutionPanic { error })
    } else {
        panic!("{}", error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_reentry() {
        let result = with_circular_catch("A", 16, || {
            with_circular_catch("B", 16, || with_circular_catch("A", 16, || Ok(())))
        });
        assert_eq!(result, Err(DiError::Circular(vec!["A", "B", "A"])));
        assert!(!in_resolution());
    }

    #[test]
    fn depth_limit_applies() {
        let result = with_circular_catch("A", 1, || with_circular_catch("B", 1, || Ok(())));
        assert_eq!(result, Err(DiError::DepthExceeded(1)));
    }

    #[test]
    fn raised_errors_surface_at_enclosing_step() {
        let result: DiResult<()> =
            with_circular_catch("Outer", 16, || raise(DiError::TypeMismatch("Inner")));
        assert_eq!(result, Err(DiError::TypeMismatch("Inner")));
    }
}
