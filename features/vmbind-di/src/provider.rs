use std::{fmt::Debug, sync::Arc};

use crate::{
    injector::Injector,
    types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo},
};

/// A type which knows how to construct itself out of an [Injector]
///
/// ```rust
/// use std::sync::Arc;
/// use vmbind_di::{DependencyInfo, DynError, Injector, Provide};
///
/// struct Engine;
/// impl Provide for Engine {
///     fn construct(_: &Injector) -> Result<Self, DynError> {
///         Ok(Engine)
///     }
/// }
///
/// struct Car {
///     engine: Arc<Engine>,
/// }
/// impl Provide for Car {
///     fn dependencies() -> Vec<DependencyInfo> {
///         vec![DependencyInfo::required::<Engine>()]
///     }
///
///     fn construct(injector: &Injector) -> Result<Self, DynError> {
///         Ok(Car { engine: injector.get()? })
///     }
/// }
/// ```
pub trait Provide: Injectable + Sized {
    /// Returns a list of dependencies the type requires to be constructed
    ///
    /// Required dependencies must be resolvable when the provider gets registered.
    fn dependencies() -> Vec<DependencyInfo> {
        Vec::new()
    }

    /// Constructs a new instance, taking its dependencies out of the injector
    fn construct(injector: &Injector) -> Result<Self, DynError>;
}

type ConstructFn = dyn Fn(&Injector) -> Result<Instance, DynError> + Send + Sync;

#[derive(Clone)]
enum Source {
    Construct(Arc<ConstructFn>),
    Value(Instance),
}

/// Declaration of something an injector can supply
///
/// Immutable once declared and cheap to clone, so a binding can hand the same list to
/// every resolution.
#[derive(Clone)]
pub struct Provider {
    info: TypeInfo,
    dependencies: Vec<DependencyInfo>,
    source: Source,
}
impl Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.source {
            Source::Construct(_) => "construct",
            Source::Value(_) => "value",
        };
        f.debug_struct("Provider")
            .field("supplies", &self.info.type_name)
            .field("kind", &kind)
            .field(
                "dependencies",
                &self
                    .dependencies
                    .iter()
                    .map(|dep| dep.type_info.type_name)
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Provider {
    /// Provider for a [Provide] type
    pub fn of<T: Provide>() -> Self {
        Self::from_fn(T::dependencies(), T::construct)
    }

    /// Provider backed by a constructor function
    pub fn from_fn<T, F>(dependencies: Vec<DependencyInfo>, construct: F) -> Self
    where
        T: Injectable,
        F: Fn(&Injector) -> Result<T, DynError> + Send + Sync + 'static,
    {
        Provider {
            info: TypeInfo::of::<T>(),
            dependencies,
            source: Source::Construct(Arc::new(move |injector| {
                construct(injector).map(Instance::new)
            })),
        }
    }

    /// Provider for an already existing instance
    pub fn value<T: Injectable>(value: T) -> Self {
        Self::value_arc(Arc::new(value))
    }

    /// Provider for an already existing shared instance
    pub fn value_arc<T: Injectable>(value: Arc<T>) -> Self {
        Self::instance(Instance::from_arc(value))
    }

    pub(crate) fn instance(instance: Instance) -> Self {
        Provider {
            info: instance.info,
            dependencies: Vec::new(),
            source: Source::Value(instance),
        }
    }

    /// The registration key of this provider
    pub fn supplies(&self) -> TypeInfo {
        self.info
    }

    pub fn dependencies(&self) -> &[DependencyInfo] {
        &self.dependencies
    }

    /// Produces the instance - values are handed out as is
    pub(crate) fn instantiate(&self, injector: &Injector) -> Result<Instance, DynError> {
        match &self.source {
            Source::Construct(construct) => construct(injector),
            Source::Value(instance) => Ok(instance.clone()),
        }
    }
}
