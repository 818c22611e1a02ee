//! Factory for intercepting proxies.

use std::fmt;
use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::contract::Contract;
use crate::error::Result;
use crate::event::InvocationEvent;
use crate::proxy::Proxy;

/// Callback invoked at every boundary of every proxied call.
///
/// Interceptors run synchronously on the caller's thread. They may mutate
/// the event (veto, override, suppress) but return nothing; a panic inside
/// an interceptor unwinds straight through the proxy to the caller.
pub type Interceptor<T> = Arc<dyn Fn(&mut InvocationEvent<'_, T>) + Send + Sync>;

/// Builds [`Proxy`] values for one contract.
///
/// The generator carries a default interceptor and a [`ProxyConfig`]. Every
/// proxy takes its own copy of both when it is created, so reconfiguring the
/// generator later does not affect proxies that already exist.
pub struct ProxyGenerator<T> {
    contract: &'static Contract,
    interceptor: Option<Interceptor<T>>,
    config: ProxyConfig,
}

impl<T> ProxyGenerator<T> {
    /// Create a generator for `contract`, with no interceptor.
    ///
    /// Fails if the contract declares two operations with the same name.
    pub fn new(contract: &'static Contract) -> Result<Self> {
        contract.validate()?;
        Ok(Self {
            contract,
            interceptor: None,
            config: ProxyConfig::default(),
        })
    }

    pub fn with_interceptor(
        mut self,
        interceptor: impl Fn(&mut InvocationEvent<'_, T>) + Send + Sync + 'static,
    ) -> Self {
        self.set_interceptor(interceptor);
        self
    }

    pub fn with_config(mut self, config: ProxyConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the default interceptor used by [`ProxyGenerator::wrap`].
    pub fn set_interceptor(
        &mut self,
        interceptor: impl Fn(&mut InvocationEvent<'_, T>) + Send + Sync + 'static,
    ) {
        self.interceptor = Some(Arc::new(interceptor));
    }

    pub fn clear_interceptor(&mut self) {
        self.interceptor = None;
    }

    pub fn interceptor(&self) -> Option<&Interceptor<T>> {
        self.interceptor.as_ref()
    }

    pub fn contract(&self) -> &'static Contract {
        self.contract
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Wrap `target` using the generator's default interceptor, if any.
    ///
    /// Without an interceptor the proxy behaves exactly like the target.
    pub fn wrap(&self, target: T) -> Proxy<T> {
        tracing::debug!(
            contract = self.contract.name(),
            intercepted = self.interceptor.is_some(),
            "wrapping target"
        );
        Proxy::new(target, self.contract, self.interceptor.clone(), self.config)
    }

    /// Wrap `target` with `interceptor`, ignoring the generator's default.
    pub fn wrap_with(
        &self,
        target: T,
        interceptor: impl Fn(&mut InvocationEvent<'_, T>) + Send + Sync + 'static,
    ) -> Proxy<T> {
        tracing::debug!(contract = self.contract.name(), "wrapping target with explicit interceptor");
        Proxy::new(target, self.contract, Some(Arc::new(interceptor)), self.config)
    }
}

impl<T> fmt::Debug for ProxyGenerator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyGenerator")
            .field("contract", &self.contract.name())
            .field("intercepted", &self.interceptor.is_some())
            .field("config", &self.config)
            .finish()
    }
}
