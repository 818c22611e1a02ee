//! The intercepting proxy and its dispatch algorithm.

use std::any::type_name;
use std::convert::Infallible;
use std::fmt::{self, Debug, Display};

use crate::config::ProxyConfig;
use crate::contract::{Contract, Operation};
use crate::event::{Boundary, InvocationEvent};
use crate::generator::Interceptor;

/// Stand-in for a target that routes every operation through an interceptor.
///
/// A `Proxy<T>` implements a contract trait through a hand-written
/// `impl Trait for Proxy<T>` block whose methods forward to [`Proxy::invoke`]
/// and friends. Proxies are created by a
/// [`ProxyGenerator`](crate::ProxyGenerator).
///
/// The interceptor is fixed when the proxy is built. Apart from the target
/// itself the proxy keeps no state between calls.
pub struct Proxy<T> {
    target: T,
    contract: &'static Contract,
    interceptor: Option<Interceptor<T>>,
    config: ProxyConfig,
}

impl<T> Proxy<T> {
    pub(crate) fn new(
        target: T,
        contract: &'static Contract,
        interceptor: Option<Interceptor<T>>,
        config: ProxyConfig,
    ) -> Self {
        Self {
            target,
            contract,
            interceptor,
            config,
        }
    }

    /// The wrapped target. Calls made through this reference bypass interception.
    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    pub fn contract(&self) -> &'static Contract {
        self.contract
    }

    pub fn has_interceptor(&self) -> bool {
        self.interceptor.is_some()
    }

    /// Dispatch a fallible operation that borrows the target immutably.
    ///
    /// `arguments` is the tuple of the call's parameters and `call` performs
    /// the real invocation with them. The interceptor sees a Before event,
    /// then (unless it vetoed the call) an After event carrying either the
    /// result or the error. A vetoed call, or a failure the interceptor
    /// suppressed, yields `R::default()`. Failures that are not suppressed are
    /// returned exactly as `call` produced them.
    ///
    /// Panics raised by the interceptor are not caught.
    ///
    /// # Shape of forwarded operations
    ///
    /// Arguments are handed to the interceptor by type, so the tuple must
    /// own its values (`A: 'static`). A method taking `&str` forwards
    /// `(key.to_string(),)` and borrows it back inside `call`. The tuple is
    /// cloned once per call, and only when an interceptor is installed, so
    /// that the After event still sees it.
    ///
    /// Vetoed calls and suppressed failures need a value to return, hence
    /// `R: Default`. Fallible operations go through `invoke` with the error
    /// split out as `E`, which only needs `Debug + Display`, so
    /// `anyhow::Error` and `Box<dyn Error>` work as-is.
    ///
    /// # Panics
    ///
    /// If `operation` is not declared by the proxy's contract.
    pub fn invoke<A, R, E>(
        &self,
        operation: &str,
        arguments: A,
        call: impl FnOnce(&T, A) -> Result<R, E>,
    ) -> Result<R, E>
    where
        A: Clone + Debug + 'static,
        R: Default + Debug + 'static,
        E: Debug + Display + 'static,
    {
        let operation = self.resolve(operation);
        let _span = tracing::trace_span!(
            "intercept",
            contract = self.contract.name(),
            operation = operation.name()
        )
        .entered();

        let Some(interceptor) = &self.interceptor else {
            return call(&self.target, arguments);
        };

        let Some(arguments) = self.before::<A, R>(interceptor, operation, arguments) else {
            return Ok(R::default());
        };
        let outcome = call(&self.target, arguments.clone());
        self.after(interceptor, operation, arguments, outcome)
    }

    /// Like [`Proxy::invoke`], for operations that need `&mut` access to the target.
    pub fn invoke_mut<A, R, E>(
        &mut self,
        operation: &str,
        arguments: A,
        call: impl FnOnce(&mut T, A) -> Result<R, E>,
    ) -> Result<R, E>
    where
        A: Clone + Debug + 'static,
        R: Default + Debug + 'static,
        E: Debug + Display + 'static,
    {
        let operation = self.resolve(operation);
        let _span = tracing::trace_span!(
            "intercept",
            contract = self.contract.name(),
            operation = operation.name()
        )
        .entered();

        let Some(interceptor) = &self.interceptor else {
            return call(&mut self.target, arguments);
        };

        let Some(arguments) = self.before::<A, R>(interceptor, operation, arguments) else {
            return Ok(R::default());
        };
        let outcome = call(&mut self.target, arguments.clone());
        self.after(interceptor, operation, arguments, outcome)
    }

    /// Dispatch an operation that cannot fail.
    pub fn call<A, R>(&self, operation: &str, arguments: A, call: impl FnOnce(&T, A) -> R) -> R
    where
        A: Clone + Debug + 'static,
        R: Default + Debug + 'static,
    {
        let outcome = self.invoke(operation, arguments, |target, arguments| {
            Ok::<R, Infallible>(call(target, arguments))
        });
        match outcome {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Dispatch an operation that cannot fail and needs `&mut` access to the target.
    pub fn call_mut<A, R>(
        &mut self,
        operation: &str,
        arguments: A,
        call: impl FnOnce(&mut T, A) -> R,
    ) -> R
    where
        A: Clone + Debug + 'static,
        R: Default + Debug + 'static,
    {
        let outcome = self.invoke_mut(operation, arguments, |target, arguments| {
            Ok::<R, Infallible>(call(target, arguments))
        });
        match outcome {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    fn resolve(&self, operation: &str) -> &'static Operation {
        match self.contract.resolve(operation) {
            Ok(operation) => operation,
            Err(error) => panic!("misconfigured proxy: {error}"),
        }
    }

    /// Raise the Before event. Returns the arguments to call the target
    /// with, or `None` if the interceptor vetoed the call.
    fn before<A, R>(
        &self,
        interceptor: &Interceptor<T>,
        operation: &'static Operation,
        mut arguments: A,
    ) -> Option<A>
    where
        A: Debug + 'static,
        R: 'static,
    {
        let mut event = InvocationEvent::new(
            Boundary::Before,
            self.contract,
            operation,
            &self.target,
            &mut arguments,
            type_name::<R>(),
        );
        interceptor(&mut event);
        self.trace_event(&event);

        if event.proceed() {
            Some(arguments)
        } else {
            tracing::debug!(operation = operation.name(), "interceptor vetoed call");
            None
        }
    }

    /// Raise the After event for a completed call and settle what the caller gets.
    fn after<A, R, E>(
        &self,
        interceptor: &Interceptor<T>,
        operation: &'static Operation,
        mut arguments: A,
        outcome: Result<R, E>,
    ) -> Result<R, E>
    where
        A: Debug + 'static,
        R: Default + Debug + 'static,
        E: Debug + Display + 'static,
    {
        match outcome {
            Ok(value) => {
                let mut result = Some(value);
                let mut event = InvocationEvent::new(
                    Boundary::After,
                    self.contract,
                    operation,
                    &self.target,
                    &mut arguments,
                    type_name::<R>(),
                )
                .with_result(&mut result);
                interceptor(&mut event);
                self.trace_event(&event);
                Ok(result.unwrap_or_default())
            }
            Err(error) => {
                let mut event = InvocationEvent::new(
                    Boundary::After,
                    self.contract,
                    operation,
                    &self.target,
                    &mut arguments,
                    type_name::<R>(),
                )
                .with_error(&error);
                interceptor(&mut event);
                self.trace_event(&event);
                if event.proceed() {
                    return Err(error);
                }

                if self.config.warn_on_suppressed {
                    tracing::warn!(operation = operation.name(), %error, "interceptor suppressed target failure");
                } else {
                    tracing::debug!(operation = operation.name(), %error, "interceptor suppressed target failure");
                }
                Ok(R::default())
            }
        }
    }

    fn trace_event(&self, event: &InvocationEvent<'_, T>) {
        if self.config.trace_values {
            tracing::trace!(boundary = %event.boundary(), ?event, "interceptor returned");
        } else {
            tracing::trace!(
                boundary = %event.boundary(),
                proceed = event.proceed(),
                failed = event.is_failure(),
                "interceptor returned"
            );
        }
    }
}

impl<T: Clone> Clone for Proxy<T> {
    fn clone(&self) -> Self {
        Self {
            target: self.target.clone(),
            contract: self.contract,
            interceptor: self.interceptor.clone(),
            config: self.config,
        }
    }
}

impl<T: Debug> Debug for Proxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("target", &self.target)
            .field("contract", &self.contract.name())
            .field("intercepted", &self.interceptor.is_some())
            .field("config", &self.config)
            .finish()
    }
}
