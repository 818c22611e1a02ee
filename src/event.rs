//! Interception events.
//!
//! An [`InvocationEvent`] is created fresh at each boundary of a proxied
//! call and handed to the interceptor by mutable reference. Arguments and
//! results are stored type-erased; interceptors read them back with the
//! concrete types of the operation they are looking at.

use serde::Serialize;
use std::any::{Any, type_name};
use std::fmt;

use crate::contract::{Contract, Operation, OperationKind};
use crate::error::{ProxyError, Result};

/// Point in the call lifecycle at which the interceptor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    /// The target has not been called yet.
    Before,
    /// The target returned, successfully or with an error.
    After,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Before => f.write_str("before"),
            Boundary::After => f.write_str("after"),
        }
    }
}

/// Type-erased view of the arguments tuple.
pub(crate) trait ArgumentSlot: Any + fmt::Debug {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<A: Any + fmt::Debug> ArgumentSlot for A {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Type-erased view of an `Option<R>` holding the call's result.
pub(crate) trait ResultSlot: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn render(&self) -> Option<String>;
}

impl<R: Any + fmt::Debug> ResultSlot for Option<R> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn render(&self) -> Option<String> {
        self.as_ref().map(|value| format!("{value:?}"))
    }
}

/// Type-erased view of the error a target returned.
pub(crate) trait ErrorSlot: Any + fmt::Display {
    fn as_any(&self) -> &dyn Any;
    fn as_display(&self) -> &dyn fmt::Display;
}

impl<E: Any + fmt::Debug + fmt::Display> ErrorSlot for E {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_display(&self) -> &dyn fmt::Display {
        self
    }
}

/// One boundary crossing of a proxied call.
///
/// # Fields at each boundary
///
/// | boundary        | result  | error   | effect of `set_proceed(false)`       |
/// |-----------------|---------|---------|--------------------------------------|
/// | Before          | absent  | absent  | target is not called, default result |
/// | After (success) | present | absent  | none                                 |
/// | After (failure) | absent  | present | failure suppressed, default result   |
pub struct InvocationEvent<'a, T> {
    boundary: Boundary,
    contract: &'static Contract,
    operation: &'static Operation,
    target: &'a T,
    arguments: &'a mut (dyn ArgumentSlot + 'static),
    result: Option<&'a mut (dyn ResultSlot + 'static)>,
    result_type: &'static str,
    error: Option<&'a (dyn ErrorSlot + 'static)>,
    proceed: bool,
}

impl<'a, T> InvocationEvent<'a, T> {
    pub(crate) fn new<A: Any + fmt::Debug>(
        boundary: Boundary,
        contract: &'static Contract,
        operation: &'static Operation,
        target: &'a T,
        arguments: &'a mut A,
        result_type: &'static str,
    ) -> Self {
        Self {
            boundary,
            contract,
            operation,
            target,
            arguments,
            result: None,
            result_type,
            error: None,
            proceed: true,
        }
    }

    pub(crate) fn with_result<R: Any + fmt::Debug>(mut self, result: &'a mut Option<R>) -> Self {
        self.result = Some(result);
        self
    }

    pub(crate) fn with_error<E: Any + fmt::Debug + fmt::Display>(mut self, error: &'a E) -> Self {
        self.error = Some(error);
        self
    }

    pub fn boundary(&self) -> Boundary {
        self.boundary
    }

    pub fn contract(&self) -> &'static Contract {
        self.contract
    }

    /// The operation being invoked.
    ///
    /// This is descriptive metadata only. To call the target again from an
    /// interceptor, use [`target`](Self::target) with the typed
    /// [`arguments`](Self::arguments).
    pub fn operation(&self) -> &'static Operation {
        self.operation
    }

    /// The wrapped target.
    pub fn target(&self) -> &'a T {
        self.target
    }

    /// The call's arguments, if they are of type `A`.
    ///
    /// Arguments are always a tuple: `()` for no parameters, `(x,)` for one.
    pub fn arguments<A: Any>(&self) -> Option<&A> {
        ArgumentSlot::as_any(&*self.arguments).downcast_ref()
    }

    /// Mutable access to the arguments. Changes made at the
    /// [`Boundary::Before`] boundary are what the target receives; at
    /// [`Boundary::After`] they only affect what later code sees on this event.
    pub fn arguments_mut<A: Any>(&mut self) -> Option<&mut A> {
        ArgumentSlot::as_any_mut(&mut *self.arguments).downcast_mut()
    }

    /// The value the target returned, if there is one and it is an `R`.
    pub fn result<R: Any>(&self) -> Option<&R> {
        let slot = self.result.as_deref()?;
        ResultSlot::as_any(slot).downcast_ref::<Option<R>>()?.as_ref()
    }

    /// Replace the value the proxy will return.
    ///
    /// Only possible after a successful call, and only with a value of the
    /// operation's return type.
    pub fn set_result<R: Any>(&mut self, value: R) -> Result<()> {
        let operation = self.operation.name();
        let Some(slot) = self.result.as_deref_mut() else {
            return Err(ProxyError::ResultUnavailable {
                operation,
                boundary: self.boundary,
            });
        };
        match ResultSlot::as_any_mut(slot).downcast_mut::<Option<R>>() {
            Some(slot) => {
                *slot = Some(value);
                Ok(())
            }
            None => Err(ProxyError::ResultTypeMismatch {
                operation,
                expected: self.result_type,
                found: type_name::<R>(),
            }),
        }
    }

    /// Name of the operation's return type.
    pub fn result_type(&self) -> &'static str {
        self.result_type
    }

    /// The failure the target returned, for display.
    pub fn error(&self) -> Option<&'a dyn fmt::Display> {
        self.error.map(ErrorSlot::as_display)
    }

    /// The failure, exactly as the target returned it, if it is an `E`.
    pub fn error_as<E: Any>(&self) -> Option<&'a E> {
        ErrorSlot::as_any(self.error?).downcast_ref()
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn proceed(&self) -> bool {
        self.proceed
    }

    /// Veto the call (at Before) or suppress the failure (at After).
    pub fn set_proceed(&mut self, proceed: bool) {
        self.proceed = proceed;
    }

    /// Snapshot this event into a plain, serializable record.
    pub fn record(&self) -> EventRecord {
        EventRecord {
            boundary: self.boundary,
            contract: self.contract.name().to_string(),
            operation: self.operation.name().to_string(),
            kind: self.operation.kind(),
            arguments: format!("{:?}", &*self.arguments),
            result: self.result.as_deref().and_then(ResultSlot::render),
            error: self.error.map(|error| error.to_string()),
            proceed: self.proceed,
        }
    }
}

impl<T> fmt::Debug for InvocationEvent<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationEvent")
            .field("boundary", &self.boundary)
            .field("contract", &self.contract.name())
            .field("operation", &self.operation.name())
            .field("arguments", &&*self.arguments)
            .field("result", &self.result.as_deref().and_then(ResultSlot::render))
            .field("error", &self.error.map(|error| error.to_string()))
            .field("proceed", &self.proceed)
            .finish()
    }
}

/// Owned snapshot of an [`InvocationEvent`].
///
/// Values are kept as their `Debug` renderings so records of different
/// operations can be stored side by side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRecord {
    pub boundary: Boundary,
    pub contract: String,
    pub operation: String,
    pub kind: OperationKind,
    pub arguments: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub proceed: bool,
}
