//! Intercepting proxies.
//!
//! A [`Proxy`] wraps a target implementing some trait and implements that
//! same trait itself, routing every call through a single interceptor. The
//! interceptor sees each call twice: at the [`Boundary::Before`] boundary,
//! where it may edit the arguments or veto the call, and at the
//! [`Boundary::After`] boundary, where it may replace the result or suppress
//! a failure.
//!
//! Rust has no runtime facility that synthesizes an implementation of an
//! arbitrary trait, so each proxied trait gets a small hand-written
//! `impl Trait for Proxy<T>` that forwards every method to the shared
//! dispatch helpers. The trait's operations are listed once in a static
//! [`Contract`].
//!
//! ```
//! use interpose::{Boundary, Contract, Operation, Proxy, ProxyGenerator};
//!
//! trait Greeter {
//!     fn greet(&self, name: String) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self, name: String) -> String {
//!         format!("Hello, {name}!")
//!     }
//! }
//!
//! static GREETER: Contract = Contract::new("Greeter", &[Operation::method("greet", &["name"])]);
//!
//! impl<T: Greeter> Greeter for Proxy<T> {
//!     fn greet(&self, name: String) -> String {
//!         self.call("greet", (name,), |target, (name,)| target.greet(name))
//!     }
//! }
//!
//! let generator = ProxyGenerator::<English>::new(&GREETER)?.with_interceptor(|event| {
//!     if event.boundary() == Boundary::Before {
//!         if let Some((name,)) = event.arguments_mut::<(String,)>() {
//!             *name = name.to_uppercase();
//!         }
//!     }
//! });
//!
//! let greeter = generator.wrap(English);
//! assert_eq!(greeter.greet("ferris".to_string()), "Hello, FERRIS!");
//! # Ok::<(), interpose::ProxyError>(())
//! ```

mod config;
mod contract;
mod error;
mod event;
mod generator;
mod proxy;

pub use config::ProxyConfig;
pub use contract::{Contract, Operation, OperationKind};
pub use error::{ProxyError, Result};
pub use event::{Boundary, EventRecord, InvocationEvent};
pub use generator::{Interceptor, ProxyGenerator};
pub use proxy::Proxy;
