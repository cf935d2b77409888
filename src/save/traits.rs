//! Trait definitions for persistence backends.

use std::future::Future;
use std::pin::Pin;

use crate::save::error::PersistError;

/// Future returned by [`Persist::persist`].
///
/// Not `Send`: persistence runs on the same local task set as the controller.
pub type PersistFuture<'a> = Pin<Box<dyn Future<Output = Result<(), PersistError>> + 'a>>;

/// Asynchronous persistence function driven by the auto-save controller.
///
/// Implemented for any `Fn(T) -> impl Future<Output = Result<(), PersistError>>`,
/// so a closure is usually enough. [`JsonFilePersister`](crate::save::JsonFilePersister)
/// is a ready-made implementation that writes JSON documents to disk.
pub trait Persist<T> {
    /// Persist `data`. May fail asynchronously; no latency assumptions are made.
    fn persist(&self, data: T) -> PersistFuture<'_>;
}

impl<T, F, Fut> Persist<T> for F
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<(), PersistError>> + 'static,
{
    fn persist(&self, data: T) -> PersistFuture<'_> {
        Box::pin(self(data))
    }
}
