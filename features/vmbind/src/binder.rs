use std::{
    any::type_name,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use vmbind_di::DynError;

use crate::{
    container::{Cleanup, Container, Hook},
    errors::{BindError, HookError},
    observable::{Listener, Subscription},
    resolver::ContainerResolver,
};

/// Where a bound element is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Not rendered yet - no container exists
    Unmounted,
    /// Rendered once, container resolved, not attached yet
    Rendered,
    /// Attached - `mount` ran, props updates are forwarded
    Mounted,
    /// Terminal
    Detached,
}

/// Ties one container instance to one mounted element
///
/// The host drives it: first render → [Self::resolve], attach → [Self::attach],
/// every props change → [Self::update_props], detach → [Self::detach].
pub struct LifecycleBinder<C: Container> {
    resolver: Arc<ContainerResolver<C>>,
    state: LifecycleState,
    container: Option<Arc<C>>,
    cleanup: Option<Cleanup>,
    subscriptions: Vec<Subscription>,
    stale: Arc<AtomicBool>,
    on_invalidate: Option<Listener>,
}

impl<C: Container> LifecycleBinder<C> {
    pub fn new(resolver: Arc<ContainerResolver<C>>) -> Self {
        LifecycleBinder {
            resolver,
            state: LifecycleState::Unmounted,
            container: None,
            cleanup: None,
            subscriptions: Vec::new(),
            stale: Arc::new(AtomicBool::new(false)),
            on_invalidate: None,
        }
    }

    /// Additionally calls `on_invalidate` whenever an observed field changes while attached
    pub fn with_invalidation(mut self, on_invalidate: Listener) -> Self {
        self.on_invalidate = Some(on_invalidate);
        self
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn container(&self) -> Option<&Arc<C>> {
        self.container.as_ref()
    }

    /// Resolves the container for the first render
    ///
    /// Memoized - later calls return the same container without resolving again.
    /// A failed resolution leaves the element unmounted.
    pub fn resolve(&mut self, props: &C::Props) -> Result<Arc<C>, BindError> {
        if self.state == LifecycleState::Detached {
            return Err(BindError::Detached);
        }
        if let Some(container) = &self.container {
            return Ok(container.clone());
        }

        let container = self.resolver.resolve(props)?;
        tracing::debug!("Resolved '{}' for a new element", type_name::<C>());

        self.container = Some(container.clone());
        self.state = LifecycleState::Rendered;
        Ok(container)
    }

    /// Subscribes to the observed fields and runs the `mount` hook
    pub fn attach(&mut self) -> Result<(), BindError> {
        let container = match self.state {
            LifecycleState::Unmounted => return Err(BindError::NotRendered),
            LifecycleState::Mounted => return Err(BindError::AlreadyAttached),
            LifecycleState::Detached => return Err(BindError::Detached),
            LifecycleState::Rendered => self.container.clone().ok_or(BindError::NotRendered)?,
        };

        let listener = self.invalidation_listener();
        self.subscriptions = container
            .observed()
            .into_iter()
            .map(|field| field.subscribe(listener.clone()))
            .collect();

        let cleanup = container.mount().map_err(|error| {
            self.subscriptions.clear();
            hook_error::<C>(Hook::Mount, error)
        })?;

        tracing::debug!(
            "Attached '{}', observing {} fields",
            type_name::<C>(),
            self.subscriptions.len()
        );
        self.cleanup = cleanup;
        self.state = LifecycleState::Mounted;
        Ok(())
    }

    /// Forwards a props change of the attached element
    pub fn update_props(&mut self, props: &C::Props) -> Result<(), BindError> {
        match self.state {
            LifecycleState::Mounted => {}
            LifecycleState::Detached => return Err(BindError::Detached),
            LifecycleState::Unmounted | LifecycleState::Rendered => {
                return Err(BindError::NotAttached)
            }
        }

        let Some(container) = &self.container else {
            return Err(BindError::NotAttached);
        };

        tracing::trace!("Props of '{}' changed", type_name::<C>());
        container
            .on_update_props(props)
            .map_err(|error| hook_error::<C>(Hook::UpdateProps, error).into())
    }

    /// Drops the subscriptions and runs the `mount` cleanup
    ///
    /// Detaching twice does nothing.
    pub fn detach(&mut self) -> Result<(), BindError> {
        if self.state == LifecycleState::Detached {
            tracing::warn!("'{}' element detached twice - ignoring", type_name::<C>());
            return Ok(());
        }

        self.state = LifecycleState::Detached;
        self.subscriptions.clear();
        self.container = None;
        tracing::debug!("Detached '{}'", type_name::<C>());

        match self.cleanup.take() {
            Some(cleanup) => {
                cleanup().map_err(|error| hook_error::<C>(Hook::Cleanup, error).into())
            }
            None => Ok(()),
        }
    }

    /// True if an observed field changed since the last [Self::take_stale]
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    /// Returns and resets the stale flag
    pub fn take_stale(&self) -> bool {
        self.stale.swap(false, Ordering::SeqCst)
    }

    fn invalidation_listener(&self) -> Listener {
        let stale = self.stale.clone();
        let on_invalidate = self.on_invalidate.clone();
        Arc::new(move || {
            stale.store(true, Ordering::SeqCst);
            if let Some(on_invalidate) = &on_invalidate {
                on_invalidate();
            }
        })
    }
}

impl<C: Container> Drop for LifecycleBinder<C> {
    fn drop(&mut self) {
        if self.state == LifecycleState::Mounted {
            tracing::warn!(
                "'{}' element dropped while attached - running cleanup",
                type_name::<C>()
            );
            if let Err(e) = self.detach() {
                tracing::error!("{e}");
            }
        }
    }
}

fn hook_error<C: Container>(hook: Hook, error: DynError) -> HookError {
    let container = type_name::<C>();
    tracing::error!("'{hook}' of '{container}' failed: {error}");
    HookError {
        hook,
        container,
        error: Arc::new(error),
    }
}
