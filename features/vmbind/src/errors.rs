use std::sync::Arc;

use thiserror::Error;
use vmbind_di::{DynError, LookupError, ResolutionError};

use crate::container::Hook;

/// A container hook failed
///
/// Passed on to the host unchanged - hooks are never retried.
#[derive(Error, Debug, Clone)]
#[error("'{hook}' of '{container}' failed - error: {error}")]
pub struct HookError {
    pub hook: Hook,
    pub container: &'static str,
    pub error: Arc<DynError>,
}

/// Errors of a bound element
#[derive(Error, Debug, Clone)]
pub enum BindError {
    /// The container or one of its providers could not be resolved, the mount is aborted
    #[error("Resolving '{container}' failed - {source}")]
    Resolution {
        container: &'static str,
        #[source]
        source: ResolutionError,
    },

    /// The container was registered but could not be looked up afterwards
    #[error("Looking up '{container}' after resolution failed - {source}")]
    Lookup {
        container: &'static str,
        #[source]
        source: LookupError,
    },

    #[error(transparent)]
    Hook(#[from] HookError),

    #[error("The element has not been rendered yet")]
    NotRendered,

    #[error("The element has already been rendered")]
    AlreadyRendered,

    #[error("The element is not attached")]
    NotAttached,

    #[error("The element is already attached")]
    AlreadyAttached,

    #[error("The element has been detached")]
    Detached,
}
