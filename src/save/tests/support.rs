//! Fake persistence backend for controller tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use tokio::time::Instant;

use crate::save::{Persist, PersistError, PersistFuture};

/// A call recorded by [`FakeStore`].
#[derive(Debug, Clone)]
pub struct Call<T> {
    pub data: T,
    pub started: Instant,
}

struct StoreInner<T> {
    calls: RefCell<Vec<Call<T>>>,
    latency: Cell<Duration>,
    fail_with: RefCell<Option<String>>,
}

/// In-memory store with configurable latency and failure.
///
/// Clones share the same recording.
pub struct FakeStore<T> {
    inner: Rc<StoreInner<T>>,
}

impl<T> Clone for FakeStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone> FakeStore<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(StoreInner {
                calls: RefCell::new(Vec::new()),
                latency: Cell::new(Duration::ZERO),
                fail_with: RefCell::new(None),
            }),
        }
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    pub fn set_latency(&self, latency: Duration) {
        self.inner.latency.set(latency);
    }

    pub fn fail_with(&self, message: &str) {
        *self.inner.fail_with.borrow_mut() = Some(message.to_string());
    }

    pub fn succeed(&self) {
        *self.inner.fail_with.borrow_mut() = None;
    }

    pub fn calls(&self) -> Vec<Call<T>> {
        self.inner.calls.borrow().clone()
    }

    pub fn saved(&self) -> Vec<T> {
        self.inner
            .calls
            .borrow()
            .iter()
            .map(|call| call.data.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.borrow().len()
    }
}

impl<T: 'static> Persist<T> for FakeStore<T> {
    fn persist(&self, data: T) -> PersistFuture<'_> {
        let inner = Rc::clone(&self.inner);
        Box::pin(async move {
            inner.calls.borrow_mut().push(Call {
                data,
                started: Instant::now(),
            });

            let latency = inner.latency.get();
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }

            match inner.fail_with.borrow().clone() {
                Some(message) => Err(PersistError::rejected(message)),
                None => Ok(()),
            }
        })
    }
}

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}
