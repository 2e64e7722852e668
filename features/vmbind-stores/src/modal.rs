use std::{
    any::type_name,
    fmt::Debug,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    task::{Context, Poll},
    time::Duration,
};

use futures::FutureExt;
use futures_channel::oneshot;
use vmbind::{Observable, Observe};
use vmbind_di::{DependencyInfo, DynError, Injectable, Injector, Provide};

use crate::timer::{SharedTimer, ThreadTimer, Timer};

/// Delay [ModalStore::hide_default] waits before clearing the payload
pub const DEFAULT_HIDE_DELAY: Duration = Duration::from_millis(500);

/// What a delayed clear does if the modal was shown again in the meantime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ClearPolicy {
    /// A `show` after `hide` cancels the pending clear
    #[default]
    Guarded,
    /// The pending clear always runs, even over a payload set by a later `show`
    Unguarded,
}

/// How a delayed clear ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    /// The payload was cleared
    Cleared,
    /// The modal was shown again before the delay elapsed, the payload was kept
    Skipped,
    /// The clear never ran - the store or the timer went away first
    Dropped,
}

/// Resolves once the clear scheduled by [ModalStore::hide] ran
///
/// Dropping it does not cancel the clear.
#[must_use = "the clear runs regardless, await this only to know when it did"]
#[derive(Debug)]
pub struct PendingClear {
    outcome: oneshot::Receiver<ClearOutcome>,
}

impl PendingClear {
    /// The outcome, if the clear already ran
    pub fn try_outcome(&mut self) -> Option<ClearOutcome> {
        match self.outcome.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Some(ClearOutcome::Dropped),
        }
    }
}

impl Future for PendingClear {
    type Output = ClearOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.outcome
            .poll_unpin(cx)
            .map(|outcome| outcome.unwrap_or(ClearOutcome::Dropped))
    }
}

/// Visibility plus payload of a modal, with a delayed payload clear on hide
///
/// The payload outlives `hide` for a while so the closing modal can still render it.
pub struct ModalStore<T> {
    visible: Observable<bool>,
    payload: Arc<Observable<Option<T>>>,
    /// Bumped by every `show`
    generation: Arc<AtomicU64>,
    timer: Arc<dyn Timer>,
    policy: ClearPolicy,
}
impl<T: Debug> Debug for ModalStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModalStore")
            .field("visible", &self.visible)
            .field("payload", &self.payload)
            .field("policy", &self.policy)
            .finish()
    }
}
impl<T> Default for ModalStore<T> {
    fn default() -> Self {
        Self::new(false, None)
    }
}

impl<T> ModalStore<T> {
    pub fn new(visible: bool, payload: Option<T>) -> Self {
        ModalStore {
            visible: Observable::new(visible),
            payload: Arc::new(Observable::new(payload)),
            generation: Arc::new(AtomicU64::new(0)),
            timer: Arc::new(ThreadTimer),
            policy: ClearPolicy::default(),
        }
    }

    /// Schedules delayed clears on `timer` instead of a thread per clear
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_policy(mut self, policy: ClearPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ClearPolicy {
        self.policy
    }

    pub fn visible(&self) -> &Observable<bool> {
        &self.visible
    }

    pub fn payload(&self) -> &Observable<Option<T>> {
        &self.payload
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Both fields, for [vmbind::Container::observed]
    pub fn observed(&self) -> Vec<&dyn Observe>
    where
        T: Send + Sync,
    {
        vec![&self.visible, &*self.payload]
    }

    /// Shows the modal with `payload`
    ///
    /// `visible` is written first, so payload subscribers already see the modal visible.
    pub fn show(&self, payload: Option<T>) {
        self.visible.set(true);
        // Bumped under the payload lock, a pending clear decides against the new payload
        self.payload.update(|current| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *current = payload;
        });
    }
}

impl<T: Clone> ModalStore<T> {
    pub fn current_payload(&self) -> Option<T> {
        self.payload.get()
    }
}

impl<T: Injectable> ModalStore<T> {
    /// Hides the modal now and clears the payload once `delay` elapsed
    pub fn hide(&self, delay: Duration) -> PendingClear {
        self.visible.set(false);

        let (tx, rx) = oneshot::channel();
        let hidden_at = self.generation.load(Ordering::SeqCst);
        let generation = self.generation.clone();
        let payload = Arc::downgrade(&self.payload);
        let policy = self.policy;

        self.timer.schedule(
            delay,
            Box::new(move || {
                // Store dropped - nothing left to clear
                let Some(payload) = payload.upgrade() else {
                    return;
                };

                let outcome = payload.update(|current| match policy {
                    ClearPolicy::Guarded if generation.load(Ordering::SeqCst) != hidden_at => {
                        tracing::debug!("Modal was shown again, keeping its payload");
                        ClearOutcome::Skipped
                    }
                    ClearPolicy::Guarded | ClearPolicy::Unguarded => {
                        *current = None;
                        ClearOutcome::Cleared
                    }
                });
                let _ = tx.send(outcome);
            }),
        );

        PendingClear { outcome: rx }
    }

    /// [Self::hide] with [DEFAULT_HIDE_DELAY]
    pub fn hide_default(&self) -> PendingClear {
        self.hide(DEFAULT_HIDE_DELAY)
    }
}

/// Resolves to an empty, hidden store, scheduling on a registered [SharedTimer] if any
impl<T: Injectable> Provide for ModalStore<T> {
    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::optional::<SharedTimer>()]
    }

    fn construct(injector: &Injector) -> Result<Self, DynError> {
        let store = ModalStore::default();
        match injector.try_get::<SharedTimer>() {
            Some(timer) => {
                tracing::debug!("{} schedules on the shared timer", type_name::<Self>());
                Ok(store.with_timer(timer.0.clone()))
            }
            None => Ok(store),
        }
    }
}
