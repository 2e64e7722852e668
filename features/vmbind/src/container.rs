use vmbind_di::{DependencyInfo, DynError, Injectable, Injector};

use crate::observable::Observe;

/// Returned by [Container::mount], runs once when the element detaches
pub type Cleanup = Box<dyn FnOnce() -> Result<(), DynError> + Send>;

/// The view-model bound to a mounted element
///
/// Containers are shared behind an `Arc`, so mutable state lives in
/// [crate::Observable] fields which the element re-renders on.
///
/// ```rust
/// use vmbind::{Container, DynError, Injector, Observable, Observe};
///
/// struct Counter {
///     count: Observable<u32>,
/// }
///
/// impl Container for Counter {
///     type Props = ();
///
///     fn construct(_: &Injector, _: &()) -> Result<Self, DynError> {
///         Ok(Counter { count: Observable::new(0) })
///     }
///
///     fn observed(&self) -> Vec<&dyn Observe> {
///         vec![&self.count]
///     }
/// }
/// ```
pub trait Container: Injectable + Sized {
    /// Props of the element the container is bound to
    type Props: Clone + Send + Sync + 'static;

    /// Types the constructor takes out of the injector
    ///
    /// They are checked before the container gets constructed.
    fn dependencies() -> Vec<DependencyInfo> {
        Vec::new()
    }

    /// Builds the container with the props of the element's first render
    fn construct(injector: &Injector, props: &Self::Props) -> Result<Self, DynError>;

    /// Called once after the element attached
    fn mount(&self) -> Result<Option<Cleanup>, DynError> {
        Ok(None)
    }

    /// Called for every props change after the first render
    fn on_update_props(&self, props: &Self::Props) -> Result<(), DynError> {
        let _ = props;
        Ok(())
    }

    /// Fields the element re-renders on
    fn observed(&self) -> Vec<&dyn Observe> {
        Vec::new()
    }
}

/// Optional lifecycle operation of a [Container]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Mount,
    UpdateProps,
    Cleanup,
}
impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Hook::Mount => "mount",
            Hook::UpdateProps => "on_update_props",
            Hook::Cleanup => "mount cleanup",
        })
    }
}
