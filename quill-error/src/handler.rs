use crate::{error::CompileError, warning::CompileWarning};

use std::cell::RefCell;

/// A handler with which you can emit diagnostics.
///
/// Every compilation run owns its handler. Diagnostics accumulate for the whole run, there is no
/// way to clear them.
#[derive(Default, Debug)]
pub struct Handler {
    /// The inner handler.
    /// This construction is used to avoid `&mut` all over the compiler.
    inner: RefCell<HandlerDiagnostics>,
}

/// Contains the actual data for `Handler`.
/// Modelled this way to afford an API using interior mutability.
#[derive(Default, Debug)]
struct HandlerDiagnostics {
    /// The sink through which errors will be emitted.
    errors: Vec<CompileError>,
    /// The sink through which warnings will be emitted.
    warnings: Vec<CompileWarning>,
}

impl Handler {
    /// Emit the error `err`.
    pub fn emit_err(&self, err: CompileError) -> ErrorEmitted {
        self.inner.borrow_mut().errors.push(err);
        ErrorEmitted { _priv: () }
    }

    /// Emit the warning `warn`.
    pub fn emit_warn(&self, warn: CompileWarning) {
        self.inner.borrow_mut().warnings.push(warn);
    }

    pub fn has_errors(&self) -> bool {
        !self.inner.borrow().errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.inner.borrow().warnings.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.inner.borrow().errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.inner.borrow().warnings.len()
    }

    /// A snapshot of the errors emitted so far.
    pub fn errors(&self) -> Vec<CompileError> {
        self.inner.borrow().errors.clone()
    }

    /// A snapshot of the warnings emitted so far.
    pub fn warnings(&self) -> Vec<CompileWarning> {
        self.inner.borrow().warnings.clone()
    }

    /// Runs `f` against a fresh handler, moves everything it emitted into `self` and returns the
    /// emitted diagnostics alongside the result.
    pub fn scope<T>(
        &self,
        f: impl FnOnce(&Handler) -> Result<T, ErrorEmitted>,
    ) -> (Result<T, ErrorEmitted>, Vec<CompileError>, Vec<CompileWarning>) {
        let scoped = Handler::default();
        let mut result = f(&scoped);
        let (errors, warnings) = scoped.consume();
        // A closure may swallow an error it emitted; the scope still fails.
        if !errors.is_empty() && result.is_ok() {
            result = Err(ErrorEmitted { _priv: () });
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.errors.extend(errors.iter().cloned());
            inner.warnings.extend(warnings.iter().cloned());
        }
        (result, errors, warnings)
    }

    /// Extract all the warnings and errors from this handler.
    pub fn consume(self) -> (Vec<CompileError>, Vec<CompileWarning>) {
        let inner = self.inner.into_inner();
        (inner.errors, inner.warnings)
    }

    pub fn append(&self, other: Handler) {
        let (errors, warnings) = other.consume();
        let mut inner = self.inner.borrow_mut();
        inner.errors.extend(errors);
        inner.warnings.extend(warnings);
    }
}

/// Proof that an error was emitted through a `Handler`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorEmitted {
    _priv: (),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::warning::Warning;
    use quill_types::SourceLocation;

    fn invalid_args() -> CompileError {
        CompileError::InvalidArguments {
            location: SourceLocation::new("a.py", 1),
        }
    }

    #[test]
    fn scope_moves_diagnostics_into_parent() {
        let handler = Handler::default();
        let (result, errors, warnings) = handler.scope(|h| {
            h.emit_warn(CompileWarning::new(
                Warning::UnusedValue {
                    type_name: "uint64".into(),
                },
                None,
            ));
            Err::<(), _>(h.emit_err(invalid_args()))
        });
        assert!(result.is_err());
        assert_eq!(errors, vec![invalid_args()]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(handler.error_count(), 1);
        assert_eq!(handler.warning_count(), 1);
    }

    #[test]
    fn scope_fails_when_error_is_swallowed() {
        let handler = Handler::default();
        let (result, _, _) = handler.scope(|h| {
            let _ = h.emit_err(invalid_args());
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn diagnostics_accumulate_across_scopes() {
        let handler = Handler::default();
        for _ in 0..3 {
            let _ = handler.scope(|h| Err::<(), _>(h.emit_err(invalid_args())));
        }
        let other = Handler::default();
        let _ = other.emit_err(invalid_args());
        handler.append(other);
        assert_eq!(handler.errors().len(), 4);
    }
}
