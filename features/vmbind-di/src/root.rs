use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::{errors::ResolutionError, injector::Injector, provider::Provider};

/// Handle to "the" root injector
///
/// Bindings, containers and tests pass this handle around explicitly; [RootInjector::global]
/// is only the default every binding falls back to.
///
/// [RootInjector::reset] swaps in a brand new injector instead of clearing the old one,
/// so anything that already captured the previous root keeps a working, point-in-time registry.
#[derive(Clone, Debug)]
pub struct RootInjector(Arc<RwLock<Injector>>);

static GLOBAL_ROOT: OnceLock<RootInjector> = OnceLock::new();

impl Default for RootInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl RootInjector {
    /// A fresh, empty root independent of the process-wide one
    pub fn new() -> Self {
        RootInjector(Arc::new(RwLock::new(Injector::root())))
    }

    /// The process-wide root
    pub fn global() -> RootInjector {
        GLOBAL_ROOT.get_or_init(RootInjector::new).clone()
    }

    /// The injector currently acting as root
    pub fn current(&self) -> Injector {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Registers providers into the current root, see [Injector::register]
    pub fn register(&self, providers: &[Provider]) -> Result<(), ResolutionError> {
        self.current().register(providers)
    }

    /// Replaces the current root with an empty injector
    ///
    /// Returns the previous root.
    pub fn reset(&self) -> Injector {
        let mut current = self.0.write().unwrap_or_else(PoisonError::into_inner);
        tracing::debug!("Resetting root injector holding {} instances", current.len());
        std::mem::replace(&mut *current, Injector::root())
    }

    /// A new scoped injector, parented to the current root
    pub fn scope(&self) -> Injector {
        Injector::scoped(&self.current())
    }

    /// True if both handles refer to the same root slot
    pub fn same_as(&self, other: &RootInjector) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Registers providers into the process-wide root injector
pub fn register_global_providers(providers: &[Provider]) -> Result<(), ResolutionError> {
    RootInjector::global().register(providers)
}

/// Discards everything the process-wide root injector accumulated
pub fn reset_root_injector() {
    RootInjector::global().reset();
}

/// The injector currently acting as process-wide root
pub fn root_injector() -> Injector {
    RootInjector::global().current()
}
