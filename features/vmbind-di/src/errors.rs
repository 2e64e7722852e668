use std::sync::Arc;

use thiserror::Error;

use crate::{
    dependency_graph::DependencyGraphErrors,
    types::{DynError, TypeInfo},
};

/// Errors while registering providers into an injector
///
/// Always fatal for the registration call that produced it - nothing is retried.
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    /// The batch can not be constructed - missing or circular dependencies
    #[error(transparent)]
    Graph(#[from] DependencyGraphErrors),

    /// A constructor failed
    #[error("Constructing '{product}' failed - error: {error}")]
    ConstructionFailed {
        product: &'static str,
        error: Arc<DynError>,
    },
}

/// Errors when trying to get a certain type out of an injector
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The required type is not registered anywhere in the injector chain
    #[error("The required type '{0}' is not registered.")]
    Missing(&'static str),

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

/// Errors when filling a [crate::Dependencies] bag
#[derive(Error, Debug, Clone)]
pub enum DependenciesError {
    /// The value type is already part of the bag
    #[error("A dependency of type '{0}' is already registered")]
    AlreadyRegistered(TypeInfo),
}
