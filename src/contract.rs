//! Static descriptions of capability contracts.
//!
//! A contract is the set of operations a trait exposes. Each proxied trait
//! gets one `static` [`Contract`] that its `impl Trait for Proxy<T>` block
//! dispatches against:
//!
//! ```
//! use interpose::{Contract, Operation};
//!
//! static GREETER: Contract = Contract::new(
//!     "Greeter",
//!     &[
//!         Operation::method("greet", &["name"]),
//!         Operation::getter("language"),
//!     ],
//! );
//!
//! assert!(GREETER.resolve("greet").is_ok());
//! assert!(GREETER.resolve("shout").is_err());
//! ```

use serde::Serialize;
use std::fmt;

use crate::error::{ProxyError, Result};

/// What kind of member an operation stands for.
///
/// Accessors are dispatched exactly like methods; the kind only informs
/// interceptors that want to treat them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    Method,
    Getter,
    Setter,
}

/// One operation of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    name: &'static str,
    kind: OperationKind,
    parameters: &'static [&'static str],
}

impl Operation {
    /// A plain method taking the named parameters.
    pub const fn method(name: &'static str, parameters: &'static [&'static str]) -> Self {
        Self {
            name,
            kind: OperationKind::Method,
            parameters,
        }
    }

    /// A property read. Getter and setter of one property need distinct
    /// names, e.g. `name` and `set_name`.
    pub const fn getter(name: &'static str) -> Self {
        Self {
            name,
            kind: OperationKind::Getter,
            parameters: &[],
        }
    }

    /// A property write taking a single `value` parameter.
    pub const fn setter(name: &'static str) -> Self {
        Self {
            name,
            kind: OperationKind::Setter,
            parameters: &["value"],
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Parameter names, in call order.
    pub fn parameters(&self) -> &'static [&'static str] {
        self.parameters
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.parameters.join(", "))
    }
}

/// The full set of operations a proxied trait exposes.
#[derive(Debug, PartialEq, Eq)]
pub struct Contract {
    name: &'static str,
    operations: &'static [Operation],
}

impl Contract {
    pub const fn new(name: &'static str, operations: &'static [Operation]) -> Self {
        Self { name, operations }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn operations(&self) -> &'static [Operation] {
        self.operations
    }

    /// Look up an operation by name.
    pub fn resolve(&self, name: &str) -> Result<&'static Operation> {
        self.operations
            .iter()
            .find(|op| op.name == name)
            .ok_or_else(|| ProxyError::UnknownOperation {
                contract: self.name,
                operation: name.to_string(),
            })
    }

    /// Check that operation names are unique.
    ///
    /// [`ProxyGenerator::new`](crate::ProxyGenerator::new) runs this so a
    /// malformed contract is caught before any proxy exists.
    pub fn validate(&self) -> Result<()> {
        for (index, op) in self.operations.iter().enumerate() {
            if self.operations[..index].iter().any(|o| o.name == op.name) {
                return Err(ProxyError::DuplicateOperation {
                    contract: self.name,
                    operation: op.name,
                });
            }
        }
        Ok(())
    }
}
