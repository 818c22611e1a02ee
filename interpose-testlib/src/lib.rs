//! Test fixtures for interpose.
//!
//! Provides a small `Animal` contract with its proxy wrapper, a `Dog`
//! target that counts the calls it receives, and a [`RecordingInterceptor`]
//! whose behavior is switched on with builder flags.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use interpose::{Boundary, Contract, EventRecord, InvocationEvent, Operation, Proxy};

/// Install a `tracing` subscriber that honors `RUST_LOG`. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimalError {
    #[error("Dogs can't fly!")]
    CannotFly,
    #[error("{name} will not fetch the {item}")]
    Refused { name: String, item: String },
}

pub trait Animal {
    fn make_sound(&self) -> String;
    fn fly(&self) -> Result<(), AnimalError>;
    fn fetch(&self, item: String) -> Result<String, AnimalError>;
    fn name(&self) -> String;
    fn set_name(&mut self, name: String);
}

pub static ANIMAL: Contract = Contract::new(
    "Animal",
    &[
        Operation::method("make_sound", &[]),
        Operation::method("fly", &[]),
        Operation::method("fetch", &["item"]),
        Operation::getter("name"),
        Operation::setter("set_name"),
    ],
);

impl<T: Animal> Animal for Proxy<T> {
    fn make_sound(&self) -> String {
        self.call("make_sound", (), |animal, ()| animal.make_sound())
    }

    fn fly(&self) -> Result<(), AnimalError> {
        self.invoke("fly", (), |animal, ()| animal.fly())
    }

    fn fetch(&self, item: String) -> Result<String, AnimalError> {
        self.invoke("fetch", (item,), |animal, (item,)| animal.fetch(item))
    }

    fn name(&self) -> String {
        self.call("name", (), |animal, ()| animal.name())
    }

    fn set_name(&mut self, name: String) {
        self.call_mut("set_name", (name,), |animal, (name,)| animal.set_name(name))
    }
}

impl<A: Animal + ?Sized> Animal for Box<A> {
    fn make_sound(&self) -> String {
        (**self).make_sound()
    }

    fn fly(&self) -> Result<(), AnimalError> {
        (**self).fly()
    }

    fn fetch(&self, item: String) -> Result<String, AnimalError> {
        (**self).fetch(item)
    }

    fn name(&self) -> String {
        (**self).name()
    }

    fn set_name(&mut self, name: String) {
        (**self).set_name(name)
    }
}

/// Target that counts every call it receives.
#[derive(Debug)]
pub struct Dog {
    name: String,
    calls: AtomicUsize,
}

impl Dog {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of operations actually invoked on this dog.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Animal for Dog {
    fn make_sound(&self) -> String {
        self.count();
        "woof".to_string()
    }

    fn fly(&self) -> Result<(), AnimalError> {
        self.count();
        Err(AnimalError::CannotFly)
    }

    fn fetch(&self, item: String) -> Result<String, AnimalError> {
        self.count();
        if item == "cat" {
            return Err(AnimalError::Refused {
                name: self.name.clone(),
                item,
            });
        }
        Ok(format!("{} fetched the {item}", self.name))
    }

    fn name(&self) -> String {
        self.count();
        self.name.clone()
    }

    fn set_name(&mut self, name: String) {
        self.count();
        self.name = name;
    }
}

/// Interceptor that counts and records what it sees.
///
/// By default it only observes. The builder flags make it veto calls at
/// Before, clear `proceed` at every After, suppress failures, or replace
/// string results with `"quack"`.
#[derive(Debug, Default)]
pub struct RecordingInterceptor {
    cancel_before: bool,
    cancel_after: bool,
    cancel_failure: bool,
    duck: bool,
    intercepted: AtomicUsize,
    failures: AtomicUsize,
    records: Mutex<Vec<EventRecord>>,
}

impl RecordingInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel_before(mut self) -> Self {
        self.cancel_before = true;
        self
    }

    pub fn cancel_after(mut self) -> Self {
        self.cancel_after = true;
        self
    }

    pub fn cancel_failure(mut self) -> Self {
        self.cancel_failure = true;
        self
    }

    pub fn duck(mut self) -> Self {
        self.duck = true;
        self
    }

    /// Total number of events seen.
    pub fn intercepted(&self) -> usize {
        self.intercepted.load(Ordering::SeqCst)
    }

    /// Number of After events that carried a failure.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }

    /// Snapshots of every event, in the order they were seen.
    pub fn records(&self) -> Vec<EventRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn intercept<T>(&self, event: &mut InvocationEvent<'_, T>) {
        self.intercepted.fetch_add(1, Ordering::SeqCst);
        if event.is_failure() {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }

        match event.boundary() {
            Boundary::Before if self.cancel_before => event.set_proceed(false),
            Boundary::Before => {}
            Boundary::After if self.cancel_after => event.set_proceed(false),
            Boundary::After if event.is_failure() && self.cancel_failure => {
                event.set_proceed(false)
            }
            Boundary::After if self.duck && event.result::<String>().is_some() => {
                if let Err(error) = event.set_result("quack".to_string()) {
                    tracing::error!(%error, "duck interceptor could not replace result");
                }
            }
            Boundary::After => {}
        }

        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.record());
    }

    /// Adapt a shared recorder into an interceptor callback.
    pub fn install<T: 'static>(
        self: &Arc<Self>,
    ) -> impl Fn(&mut InvocationEvent<'_, T>) + Send + Sync + 'static {
        let this = Arc::clone(self);
        move |event: &mut InvocationEvent<'_, T>| this.intercept(event)
    }
}
