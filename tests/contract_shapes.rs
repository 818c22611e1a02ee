//! Contracts whose methods borrow their parameters or fail with error types
//! that are not `std::error::Error`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use interpose::{Contract, InvocationEvent, Operation, Proxy, ProxyGenerator};
use interpose_testlib::init_tracing;

trait Store {
    fn load(&self, key: &str) -> anyhow::Result<String>;
    fn parse(&self, raw: String) -> Result<u32, String>;
    fn redeem(&self, ticket: Ticket) -> String;
}

static STORE: Contract = Contract::new(
    "Store",
    &[
        Operation::method("load", &["key"]),
        Operation::method("parse", &["raw"]),
        Operation::method("redeem", &["ticket"]),
    ],
);

impl<T: Store> Store for Proxy<T> {
    fn load(&self, key: &str) -> anyhow::Result<String> {
        self.invoke("load", (key.to_string(),), |store, (key,)| store.load(&key))
    }

    fn parse(&self, raw: String) -> Result<u32, String> {
        self.invoke("parse", (raw,), |store, (raw,)| store.parse(raw))
    }

    fn redeem(&self, ticket: Ticket) -> String {
        self.call("redeem", (ticket,), |store, (ticket,)| store.redeem(ticket))
    }
}

/// Argument that counts how often it is cloned.
#[derive(Debug)]
struct Ticket(Arc<AtomicUsize>);

impl Clone for Ticket {
    fn clone(&self) -> Self {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ticket(Arc::clone(&self.0))
    }
}

struct MemoryStore;

impl Store for MemoryStore {
    fn load(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "greeting" => Ok("hello".to_string()),
            _ => anyhow::bail!("no entry for `{key}`"),
        }
    }

    fn parse(&self, raw: String) -> Result<u32, String> {
        raw.parse().map_err(|_| format!("`{raw}` is not a number"))
    }

    fn redeem(&self, _ticket: Ticket) -> String {
        "redeemed".to_string()
    }
}

fn generator() -> ProxyGenerator<MemoryStore> {
    init_tracing();
    ProxyGenerator::new(&STORE).expect("store contract is valid")
}

#[test]
fn anyhow_failures_reach_the_interceptor_and_the_caller() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    let proxy = generator().wrap_with(MemoryStore, move |event: &mut InvocationEvent<'_, MemoryStore>| {
        assert!(event.arguments::<(String,)>().is_some());
        if let Some(error) = event.error() {
            assert!(event.error_as::<anyhow::Error>().is_some());
            log.lock().unwrap().push(error.to_string());
        }
    });

    assert_eq!(proxy.load("greeting").unwrap(), "hello");
    let err = proxy.load("farewell").unwrap_err();
    assert_eq!(err.to_string(), "no entry for `farewell`");
    assert_eq!(*seen.lock().unwrap(), vec!["no entry for `farewell`".to_string()]);
}

#[test]
fn string_errors_can_be_suppressed() {
    let proxy = generator().wrap_with(MemoryStore, |event: &mut InvocationEvent<'_, MemoryStore>| {
        if event.error_as::<String>().is_some() {
            event.set_proceed(false);
        }
    });

    assert_eq!(proxy.parse("12".to_string()), Ok(12));
    assert_eq!(proxy.parse("twelve".to_string()), Ok(0));
}

#[test]
fn arguments_are_cloned_only_when_intercepted() {
    let clones = Arc::new(AtomicUsize::new(0));
    let generator = generator();

    let plain = generator.wrap(MemoryStore);
    assert_eq!(plain.redeem(Ticket(Arc::clone(&clones))), "redeemed");
    assert_eq!(clones.load(Ordering::SeqCst), 0);

    let watched = generator.wrap_with(MemoryStore, |_: &mut InvocationEvent<'_, MemoryStore>| {});
    assert_eq!(watched.redeem(Ticket(Arc::clone(&clones))), "redeemed");
    assert_eq!(clones.load(Ordering::SeqCst), 1);
}
