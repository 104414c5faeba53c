//! Write operations and their state machine.
//!
//! # Design
//! A `Mutation` handle drives one write at a time through
//! `idle -> pending -> success` or `idle -> pending -> idle` with the error
//! recorded. State lives in a `watch` channel so presentation code can
//! either read a snapshot or subscribe to changes.
//!
//! Side effects happen exactly once, at the transition out of `pending`:
//! on success the kind's cache keys are invalidated and a success
//! notification is sent; on error an error notification is sent. They are
//! never derived from reading the state.
//!
//! The write runs on its own task, so dropping the awaiting caller does not
//! cancel it. A second trigger while one is pending is rejected with
//! `ApiError::MutationInFlight` and has no side effects. Any state other
//! than `pending` accepts a new trigger, which starts from a clean state.
//!
//! If the write panics or its task is aborted, the handle still leaves
//! `pending`: it records `ApiError::Aborted` and sends the error
//! notification.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::error::ApiError;
use crate::notify::Notifier;
use crate::query::{QueryCache, QueryKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreateShop,
    UpdateShop,
    UpdateOrderStatus,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MutationKind::CreateShop => "create-shop",
            MutationKind::UpdateShop => "update-shop",
            MutationKind::UpdateOrderStatus => "update-order-status",
        }
    }

    /// Cache keys made stale by a successful mutation of this kind.
    pub fn invalidates(self) -> Vec<QueryKey> {
        match self {
            MutationKind::CreateShop | MutationKind::UpdateShop => vec![QueryKey::MY_SHOP],
            MutationKind::UpdateOrderStatus => vec![QueryKey::MY_SHOP_ORDERS],
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            MutationKind::CreateShop => "Shop created!",
            MutationKind::UpdateShop => "Shop Updated",
            MutationKind::UpdateOrderStatus => "Order updated",
        }
    }

    pub fn error_message(self) -> &'static str {
        match self {
            MutationKind::CreateShop => "Unable to create shop",
            MutationKind::UpdateShop => "Unable to update shop",
            MutationKind::UpdateOrderStatus => "Unable to update order",
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationPhase {
    #[default]
    Idle,
    Pending,
    Success,
}

/// Snapshot of a mutation handle. A failed write leaves the handle `Idle`
/// with `error` set until it is taken, reset or replaced by the next trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationState<T> {
    pub phase: MutationPhase,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T> MutationState<T> {
    fn with_phase(phase: MutationPhase) -> Self {
        Self {
            phase,
            data: None,
            error: None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == MutationPhase::Idle
    }

    pub fn is_loading(&self) -> bool {
        self.phase == MutationPhase::Pending
    }

    pub fn is_success(&self) -> bool {
        self.phase == MutationPhase::Success
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    fn failed(error: ApiError) -> Self {
        Self {
            phase: MutationPhase::Idle,
            data: None,
            error: Some(error),
        }
    }
}

impl<T> Default for MutationState<T> {
    fn default() -> Self {
        Self::with_phase(MutationPhase::Idle)
    }
}

type Runner<I, T> = Arc<dyn Fn(I) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

/// Handle for one kind of write. Clones share the same state.
pub struct Mutation<I, T> {
    kind: MutationKind,
    run: Runner<I, T>,
    cache: QueryCache,
    notifier: Arc<dyn Notifier>,
    state: Arc<watch::Sender<MutationState<T>>>,
}

impl<I, T> Clone for Mutation<I, T> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            run: self.run.clone(),
            cache: self.cache.clone(),
            notifier: self.notifier.clone(),
            state: self.state.clone(),
        }
    }
}

impl<I, T> Mutation<I, T>
where
    I: Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(
        kind: MutationKind,
        cache: QueryCache,
        notifier: Arc<dyn Notifier>,
        run: F,
    ) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (state, _) = watch::channel(MutationState::default());
        Self {
            kind,
            run: Arc::new(move |input| run(input).boxed()),
            cache,
            notifier,
            state: Arc::new(state),
        }
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    pub fn state(&self) -> MutationState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MutationState<T>> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    pub fn is_success(&self) -> bool {
        self.state.borrow().is_success()
    }

    pub fn is_error(&self) -> bool {
        self.state.borrow().is_error()
    }

    /// Start the mutation and return immediately. The outcome is reflected
    /// in the handle's state; the returned task can be awaited or dropped.
    ///
    /// Must be called within a tokio runtime.
    pub fn trigger(&self, input: I) -> JoinHandle<Result<T, ApiError>> {
        let started = self.begin().map(|()| PendingGuard {
            kind: self.kind,
            state: self.state.clone(),
            notifier: self.notifier.clone(),
            armed: true,
        });
        let this = self.clone();
        tokio::spawn(async move {
            let guard = started?;
            this.complete(input, guard).await
        })
    }

    /// Run the mutation and return its outcome to the caller, in addition to
    /// updating state and notifying.
    pub async fn trigger_async(&self, input: I) -> Result<T, ApiError> {
        match self.trigger(input).await {
            Ok(outcome) => outcome,
            Err(join_error) if join_error.is_panic() => {
                std::panic::resume_unwind(join_error.into_panic())
            }
            Err(_) => Err(ApiError::Aborted(self.kind)),
        }
    }

    /// Return to idle, discarding the last outcome. Ignored while pending.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if state.is_loading() || (state.is_idle() && state.error.is_none()) {
                return false;
            }
            *state = MutationState::default();
            true
        });
    }

    /// Hand the last error to the caller and return to idle.
    pub fn take_error(&self) -> Option<ApiError> {
        let mut taken = None;
        self.state.send_if_modified(|state| {
            if !state.is_error() {
                return false;
            }
            taken = state.error.take();
            *state = MutationState::default();
            true
        });
        taken
    }

    fn begin(&self) -> Result<(), ApiError> {
        let mut started = false;
        self.state.send_if_modified(|state| {
            if state.is_loading() {
                return false;
            }
            *state = MutationState::with_phase(MutationPhase::Pending);
            started = true;
            true
        });
        if started {
            Ok(())
        } else {
            warn!(kind = %self.kind, "mutation already pending; rejecting");
            Err(ApiError::MutationInFlight(self.kind))
        }
    }

    #[instrument(skip_all, fields(kind = %self.kind))]
    async fn complete(self, input: I, mut guard: PendingGuard<T>) -> Result<T, ApiError> {
        let outcome = (self.run)(input).await;
        guard.armed = false;
        match &outcome {
            Ok(value) => {
                for key in self.kind.invalidates() {
                    self.cache.invalidate(&key);
                }
                self.state.send_replace(MutationState {
                    phase: MutationPhase::Success,
                    data: Some(value.clone()),
                    error: None,
                });
                info!("mutation succeeded");
                self.notifier.notify_success(self.kind.success_message());
            }
            Err(err) => {
                self.state.send_replace(MutationState::failed(err.clone()));
                warn!(error = %err, "mutation failed");
                self.notifier.notify_error(self.kind.error_message());
            }
        }
        outcome
    }
}

/// Moves a started write out of `pending` if its task ends without
/// completing, either by panic or by abort.
struct PendingGuard<T> {
    kind: MutationKind,
    state: Arc<watch::Sender<MutationState<T>>>,
    notifier: Arc<dyn Notifier>,
    armed: bool,
}

impl<T> Drop for PendingGuard<T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let kind = self.kind;
        let released = self.state.send_if_modified(|state| {
            if !state.is_loading() {
                return false;
            }
            *state = MutationState::failed(ApiError::Aborted(kind));
            true
        });
        if released {
            warn!(%kind, "mutation ended before completing");
            self.notifier.notify_error(kind.error_message());
        }
    }
}
