//! Auto-save controller with debouncing.
//!
//! Watches a value, persists it after a quiet period, and tracks the status of
//! the save cycle so the UI can show it.
//!
//! The controller is single-threaded: it must be created and driven from
//! inside a [`tokio::task::LocalSet`], where its timers run as local tasks.
//! The two mechanisms that keep saves orderly are:
//! 1. **Debounce**: every qualifying change cancels the pending timer and
//!    starts a new one, so only the freshest value is persisted.
//! 2. **In-flight gate**: at most one persistence call runs at a time. A
//!    request arriving while one is outstanding is dropped, not queued.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::save::options::{AutoSaveOptions, ComparatorFn, ShouldSaveFn};
use crate::save::session::{SaveOutcome, SaveSession, SaveStatus, SkipReason};
use crate::save::traits::Persist;

/// Debounced save controller for a single watched value.
///
/// Dropping the controller disposes it.
pub struct AutoSaveController<T> {
    shared: Rc<Shared<T>>,
}

/// State shared between the controller handle and its timer tasks.
struct Shared<T> {
    state: RefCell<SaveState<T>>,
    persister: Box<dyn Persist<T>>,
    should_save: ShouldSaveFn<T>,
    comparator: ComparatorFn<T>,
    delay: Duration,
    saved_status_ttl: Duration,
    /// Cancelled on dispose. Every continuation checks it before touching state.
    alive: CancellationToken,
    /// Woken whenever a save attempt ends.
    settled: Notify,
}

struct SaveState<T> {
    session: SaveSession,
    enabled: bool,
    /// Last value known to be persisted.
    snapshot: T,
    /// Most recently observed value.
    latest: T,
    in_flight: bool,
    pending: Option<PendingSave>,
    revert: Option<JoinHandle<()>>,
    next_timer_id: u64,
    /// Bumped each time a save attempt starts.
    save_cycle: u64,
}

/// The single scheduled save.
struct PendingSave {
    id: u64,
    handle: JoinHandle<()>,
}

/// Clears the in-flight flag on every exit path of a save attempt.
///
/// If the attempt was abandoned mid-persist (its future dropped), the
/// `Saving` status it set is rolled back to `Idle`.
struct InFlightGuard<'a, T> {
    shared: &'a Shared<T>,
    cycle: u64,
}

impl<T> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.shared.state.try_borrow_mut() {
            state.in_flight = false;
            if !self.shared.alive.is_cancelled()
                && state.save_cycle == self.cycle
                && state.session.status == SaveStatus::Saving
            {
                state.session.status = SaveStatus::Idle;
                log::debug!("Auto-save: cycle {} abandoned", self.cycle);
            }
        }
        self.shared.settled.notify_waiters();
    }
}

impl<T: Clone + 'static> AutoSaveController<T> {
    /// Start a controller.
    ///
    /// `initial` is the value already persisted; observing it again is a no-op.
    pub fn start(
        initial: T,
        persister: impl Persist<T> + 'static,
        options: AutoSaveOptions<T>,
    ) -> Self {
        let AutoSaveOptions {
            delay,
            enabled,
            saved_status_ttl,
            should_save,
            comparator,
        } = options;

        log::debug!(
            "Auto-save: started (delay = {:?}, enabled = {})",
            delay,
            enabled
        );

        Self {
            shared: Rc::new(Shared {
                state: RefCell::new(SaveState {
                    session: SaveSession::default(),
                    enabled,
                    snapshot: initial.clone(),
                    latest: initial,
                    in_flight: false,
                    pending: None,
                    revert: None,
                    next_timer_id: 0,
                    save_cycle: 0,
                }),
                persister: Box::new(persister),
                should_save,
                comparator,
                delay,
                saved_status_ttl,
                alive: CancellationToken::new(),
                settled: Notify::new(),
            }),
        }
    }

    /// Record a new value of the watched data.
    ///
    /// Schedules a save `delay` after this call unless the controller is
    /// disabled or the value matches the last saved snapshot. Any previously
    /// scheduled save is superseded.
    ///
    /// The comparator runs without the controller borrowed, so it may read
    /// the controller.
    ///
    /// # Panics
    ///
    /// Panics when a save has to be scheduled outside a `LocalSet`.
    pub fn observe(&self, data: T) {
        let snapshot = {
            let mut state = self.shared.state.borrow_mut();
            if self.shared.alive.is_cancelled() || !state.enabled {
                state.latest = data;
                return;
            }
            state.snapshot.clone()
        };

        let unchanged = (self.shared.comparator)(&data, &snapshot);

        let mut state = self.shared.state.borrow_mut();
        state.latest = data;
        if unchanged {
            log::trace!("Auto-save: data unchanged, nothing to schedule");
            return;
        }

        let id = state.next_timer_id;
        state.next_timer_id += 1;

        let deadline = Instant::now() + self.shared.delay;
        let handle = tokio::task::spawn_local(run_timer(Rc::clone(&self.shared), id, deadline));

        if let Some(previous) = state.pending.replace(PendingSave { id, handle }) {
            previous.handle.abort();
            log::trace!("Auto-save: timer {} superseded by {}", previous.id, id);
        } else {
            log::trace!("Auto-save: timer {} scheduled", id);
        }
    }

    /// Save the latest value now, bypassing the debounce window.
    ///
    /// Cancels any scheduled save first. The enabled, in-flight and
    /// `should_save` gates still apply. Returns once the attempt, if any, has
    /// completed; failures are reported through the outcome and the session,
    /// never as an error.
    pub async fn manual_save(&self) -> SaveOutcome {
        let data = {
            let mut state = self.shared.state.borrow_mut();
            if let Some(pending) = state.pending.take() {
                pending.handle.abort();
            }
            state.latest.clone()
        };
        perform_save(&self.shared, data).await
    }

    /// Wait for any in-flight save to finish, then save the latest value if
    /// it still differs from the snapshot.
    ///
    /// Cancels the scheduled save first. Returns `None` when there was
    /// nothing left to save. Use this before shutting down, since a save
    /// still in flight when the runtime stops is lost.
    pub async fn flush(&self) -> Option<SaveOutcome> {
        let pending = self.shared.state.borrow_mut().pending.take();
        if let Some(pending) = pending {
            pending.handle.abort();
        }

        loop {
            self.settled().await;
            if !self.is_dirty() {
                return None;
            }
            match self.manual_save().await {
                // Another save slipped in while we were waking up.
                SaveOutcome::Skipped(SkipReason::InFlight) => continue,
                outcome => return Some(outcome),
            }
        }
    }

    /// Whether the latest observed value differs from the saved snapshot.
    pub fn is_dirty(&self) -> bool {
        let (latest, snapshot) = {
            let state = self.shared.state.borrow();
            (state.latest.clone(), state.snapshot.clone())
        };
        !(self.shared.comparator)(&latest, &snapshot)
    }

    /// Set the status back to `Idle` and clear the recorded error.
    ///
    /// Leaves scheduled and in-flight saves alone.
    pub fn reset_status(&self) {
        self.shared.state.borrow_mut().session.reset();
    }

    /// Turn automatic and manual saving on or off.
    ///
    /// Disabling cancels the scheduled save. Re-enabling schedules one if the
    /// latest value differs from the snapshot.
    pub fn set_enabled(&self, enabled: bool) {
        let resume = {
            let mut state = self.shared.state.borrow_mut();
            let was_enabled = std::mem::replace(&mut state.enabled, enabled);
            if !enabled {
                if let Some(pending) = state.pending.take() {
                    pending.handle.abort();
                }
            }
            log::debug!("Auto-save: enabled = {}", enabled);
            (enabled && !was_enabled).then(|| state.latest.clone())
        };

        if let Some(latest) = resume {
            self.observe(latest);
        }
    }
}

impl<T> AutoSaveController<T> {
    /// Tear the controller down.
    ///
    /// Cancels the scheduled save and the pending status revert. A save that
    /// is still in flight runs to completion but its result is discarded.
    pub fn dispose(&self) {
        if self.shared.alive.is_cancelled() {
            return;
        }
        self.shared.alive.cancel();

        let mut state = self.shared.state.borrow_mut();
        if let Some(pending) = state.pending.take() {
            pending.handle.abort();
        }
        if let Some(revert) = state.revert.take() {
            revert.abort();
        }
        log::debug!("Auto-save: disposed");
    }

    /// Current status.
    pub fn status(&self) -> SaveStatus {
        self.shared.state.borrow().session.status
    }

    /// Time of the last successful save.
    pub fn last_saved_at(&self) -> Option<DateTime<Utc>> {
        self.shared.state.borrow().session.last_saved_at
    }

    /// Message of the last failed save.
    pub fn error(&self) -> Option<String> {
        self.shared.state.borrow().session.error.clone()
    }

    /// Whether a save is in flight.
    pub fn is_saving(&self) -> bool {
        self.shared.state.borrow().session.is_saving()
    }

    /// Copy of the whole session, for status displays.
    pub fn session(&self) -> SaveSession {
        self.shared.state.borrow().session.clone()
    }

    /// Whether auto-save is enabled.
    pub fn is_enabled(&self) -> bool {
        self.shared.state.borrow().enabled
    }

    /// Whether a debounced save is waiting to fire.
    pub fn has_pending_save(&self) -> bool {
        self.shared.state.borrow().pending.is_some()
    }

    /// Whether [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.shared.alive.is_cancelled()
    }

    /// Resolve once no save is in flight.
    async fn settled(&self) {
        loop {
            let notified = self.shared.settled.notified();
            if !self.shared.state.borrow().in_flight {
                return;
            }
            notified.await;
        }
    }
}

impl<T> Drop for AutoSaveController<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Body of a debounce timer task.
async fn run_timer<T: Clone + 'static>(shared: Rc<Shared<T>>, id: u64, deadline: Instant) {
    tokio::select! {
        _ = shared.alive.cancelled() => return,
        _ = tokio::time::sleep_until(deadline) => {}
    }

    let data = {
        let mut state = shared.state.borrow_mut();
        if state.pending.as_ref().map(|pending| pending.id) != Some(id) {
            return;
        }
        // Releasing our own handle detaches this task, so a later cancel
        // cannot abort the save below halfway through.
        state.pending = None;
        state.latest.clone()
    };

    let outcome = perform_save(&shared, data).await;
    log::trace!("Auto-save: timer {} finished: {:?}", id, outcome);
}

/// Run one save attempt through the gates, the persister, and the status
/// bookkeeping.
async fn perform_save<T: Clone + 'static>(shared: &Rc<Shared<T>>, data: T) -> SaveOutcome {
    let skip = {
        let state = shared.state.borrow();
        if shared.alive.is_cancelled() {
            Some(SkipReason::Disposed)
        } else if !state.enabled {
            Some(SkipReason::Disabled)
        } else if state.in_flight {
            Some(SkipReason::InFlight)
        } else {
            None
        }
    };
    // Called unborrowed so the predicate may read the controller.
    let skip = skip.or_else(|| (!(shared.should_save)(&data)).then_some(SkipReason::Declined));

    if let Some(reason) = skip {
        log::debug!("Auto-save: skipped ({:?})", reason);
        return SaveOutcome::Skipped(reason);
    }

    let cycle = {
        let mut state = shared.state.borrow_mut();
        state.in_flight = true;
        state.save_cycle += 1;
        state.session.begin_attempt();
        state.save_cycle
    };

    let _in_flight = InFlightGuard { shared, cycle };

    log::debug!("Auto-save: saving (cycle {})", cycle);
    let result = shared.persister.persist(data.clone()).await;

    if shared.alive.is_cancelled() {
        log::debug!("Auto-save: cycle {} completed after dispose, discarded", cycle);
        return SaveOutcome::Discarded;
    }

    let mut state = shared.state.borrow_mut();
    let outcome = match result {
        Ok(()) => {
            state.session.mark_saved(Utc::now());
            state.snapshot = data;

            let revert_at = Instant::now() + shared.saved_status_ttl;
            let revert =
                tokio::task::spawn_local(revert_status(Rc::clone(shared), cycle, revert_at));
            if let Some(previous) = state.revert.replace(revert) {
                previous.abort();
            }

            log::info!("Auto-save complete (cycle {})", cycle);
            SaveOutcome::Saved
        }
        Err(e) => {
            let message = e.user_message();
            log::error!("Auto-save failed: {:?}", e);
            state.session.mark_failed(message.clone());
            SaveOutcome::Failed(message)
        }
    };
    drop(state);

    outcome
}

/// Revert `Saved` to `Idle` once the TTL has passed, unless another save
/// cycle has started since.
async fn revert_status<T>(shared: Rc<Shared<T>>, cycle: u64, revert_at: Instant) {
    tokio::select! {
        _ = shared.alive.cancelled() => return,
        _ = tokio::time::sleep_until(revert_at) => {}
    }

    let mut state = shared.state.borrow_mut();
    if state.save_cycle == cycle && state.session.status == SaveStatus::Saved {
        state.session.status = SaveStatus::Idle;
        log::trace!("Auto-save: status reverted to idle (cycle {})", cycle);
    }
}
