use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex, PoisonError, RwLock},
};

use crate::{
    dependency_graph::DependencyGraph,
    errors::{LookupError, ResolutionError},
    provider::Provider,
    types::{Injectable, Instance, TypeInfo},
};

/// Whether an injector is a root or the child of another injector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectorKind {
    Root,
    Scoped,
}

/// Resolves providers into live instances and caches them by type
///
/// Cloning is cheap and yields a handle to the same instance table.
/// A scoped injector delegates every lookup it can not answer to its parent.
#[derive(Clone)]
pub struct Injector(Arc<InjectorInner>);
struct InjectorInner {
    kind: InjectorKind,
    parent: Option<Injector>,
    table: RwLock<InstanceTable>,
    /// Serializes registrations so a key is never constructed twice
    registration: Mutex<()>,
}

#[derive(Default)]
struct InstanceTable {
    instances: HashMap<TypeId, Instance>,
    order: Vec<TypeInfo>,
}

impl Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let table = self.0.table.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Injector")
            .field("kind", &self.0.kind)
            .field(
                "instances",
                &table.order.iter().map(|info| info.type_name).collect::<Vec<_>>(),
            )
            .field("parent", &self.0.parent)
            .finish()
    }
}

impl Injector {
    /// Creates an empty injector without parent
    pub fn root() -> Self {
        Self::with_parent(InjectorKind::Root, None)
    }

    /// Creates an empty injector which falls back to `parent` for lookups
    pub fn scoped(parent: &Injector) -> Self {
        Self::with_parent(InjectorKind::Scoped, Some(parent.clone()))
    }

    fn with_parent(kind: InjectorKind, parent: Option<Injector>) -> Self {
        Injector(Arc::new(InjectorInner {
            kind,
            parent,
            table: RwLock::new(InstanceTable::default()),
            registration: Mutex::new(()),
        }))
    }

    pub fn kind(&self) -> InjectorKind {
        self.0.kind
    }

    pub fn parent(&self) -> Option<&Injector> {
        self.0.parent.as_ref()
    }

    /// Registers providers, constructing each one which is not yet in this injector
    ///
    /// Keys already present in this injector's own table are skipped silently.
    /// Before anything is constructed, the whole batch is checked - a required dependency
    /// which neither the batch nor the injector chain can supply fails the registration.
    /// Dependencies are constructed before their dependents, otherwise declaration order is kept.
    ///
    /// Constructors may look up instances from this injector, but must not register into it.
    pub fn register(&self, providers: &[Provider]) -> Result<(), ResolutionError> {
        let _registration = self
            .0
            .registration
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut graph = DependencyGraph::new();
        let mut pending = HashMap::new();
        for provider in providers {
            let info = provider.supplies();
            if self.contains(&info) {
                tracing::trace!("'{info}' is already registered - skipping");
                continue;
            }
            if graph.add(info, provider.dependencies().to_vec()) {
                pending.insert(info.type_id, provider);
            }
        }

        if graph.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            "Registering {} providers into {:?} injector",
            graph.len(),
            self.0.kind
        );

        graph.check(|info| self.resolves(info)).map_err(|errors| {
            tracing::error!("{errors}");
            errors
        })?;

        for info in graph.construction_order() {
            let Some(provider) = pending.get(&info.type_id) else {
                continue;
            };

            let instance = provider.instantiate(self).map_err(|error| {
                tracing::error!("Constructing '{info}' failed: {error}");
                ResolutionError::ConstructionFailed {
                    product: info.type_name,
                    error: Arc::new(error),
                }
            })?;

            tracing::debug!("Constructed instance of {info}");
            self.insert(info, instance);
        }

        Ok(())
    }

    fn insert(&self, info: TypeInfo, instance: Instance) {
        let mut table = self.0.table.write().unwrap_or_else(PoisonError::into_inner);
        if table.instances.insert(info.type_id, instance).is_none() {
            table.order.push(info);
        }
    }

    /// Attempts to get the requested type from this injector or its ancestors
    pub fn get<T: Injectable>(&self) -> Result<Arc<T>, LookupError> {
        let info = TypeInfo::of::<T>();
        let Some(instance) = self.instance(&info) else {
            return Err(LookupError::Missing(info.type_name));
        };

        instance
            .downcast()
            .map_err(|actual_type| LookupError::DowncastFailed {
                required_type: type_name::<T>(),
                actual_type,
            })
    }

    /// Like [Self::get], for dependencies which are allowed to be absent
    pub fn try_get<T: Injectable>(&self) -> Option<Arc<T>> {
        self.get().ok()
    }

    /// Untyped lookup through the injector chain
    pub fn instance(&self, info: &TypeInfo) -> Option<Instance> {
        let local = self
            .0
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .instances
            .get(&info.type_id)
            .cloned();

        match (local, &self.0.parent) {
            (Some(instance), _) => Some(instance),
            (None, Some(parent)) => parent.instance(info),
            (None, None) => None,
        }
    }

    /// True if this injector itself holds the type
    pub fn contains(&self, info: &TypeInfo) -> bool {
        self.0
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .instances
            .contains_key(&info.type_id)
    }

    /// True if this injector or one of its ancestors holds the type
    pub fn resolves(&self, info: &TypeInfo) -> bool {
        self.contains(info)
            || self
                .0
                .parent
                .as_ref()
                .is_some_and(|parent| parent.resolves(info))
    }

    /// Registered keys of this injector, in registration order
    pub fn keys(&self) -> Vec<TypeInfo> {
        self.0
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .clone()
    }

    pub fn len(&self) -> usize {
        self.0
            .table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .order
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True if both handles refer to the same injector
    pub fn same_as(&self, other: &Injector) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
