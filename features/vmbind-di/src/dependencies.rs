use std::{any::TypeId, collections::HashSet, fmt::Debug, sync::Arc};

use crate::{
    errors::DependenciesError,
    provider::Provider,
    types::{Injectable, Instance, TypeInfo},
};

/// A typed bag of ready-made values handed to a container next to its providers
///
/// Every value is keyed by its type, so a container asks the injector for `Arc<T>`
/// exactly like for any provider. Values are shared - every scope the bag is registered
/// into sees the same allocation.
///
/// ```rust
/// use vmbind_di::Dependencies;
///
/// #[derive(Debug)]
/// struct ApiUrl(&'static str);
///
/// let dependencies = Dependencies::new().with(ApiUrl("http://localhost")).unwrap();
/// assert_eq!(dependencies.get::<ApiUrl>().unwrap().0, "http://localhost");
/// ```
#[derive(Clone, Default)]
pub struct Dependencies {
    values: Vec<Instance>,
    keys: HashSet<TypeId>,
}
impl Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(|value| value.info.type_name))
            .finish()
    }
}

impl Dependencies {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value to the bag.
    ///
    /// If a value of the same type is already part of the bag, it will return a
    /// [`DependenciesError`]
    pub fn add<T: Injectable>(&mut self, value: T) -> Result<&mut Self, DependenciesError> {
        self.add_arc(Arc::new(value))
    }

    /// Add an already shared value to the bag
    pub fn add_arc<T: Injectable>(
        &mut self,
        value: Arc<T>,
    ) -> Result<&mut Self, DependenciesError> {
        let info = TypeInfo::of::<T>();
        if !self.keys.insert(info.type_id) {
            return Err(DependenciesError::AlreadyRegistered(info));
        }

        self.values.push(Instance::from_arc(value));
        Ok(self)
    }

    /// Can optionally add a value to the bag.
    ///
    /// If the value is `Some(T)`, it will be the same as calling [`Dependencies::add`]
    /// If the value is `None`, then the function just returns `Ok(self)` for chaining
    pub fn maybe_add<T: Injectable>(
        &mut self,
        value: Option<T>,
    ) -> Result<&mut Self, DependenciesError> {
        match value {
            Some(value) => self.add(value),
            None => Ok(self),
        }
    }

    /// Builder flavour of [`Dependencies::add`]
    pub fn with<T: Injectable>(mut self, value: T) -> Result<Self, DependenciesError> {
        self.add(value)?;
        Ok(self)
    }

    /// Retrieve a value with the specified type
    pub fn get<T: Injectable>(&self) -> Option<Arc<T>> {
        let type_id = TypeId::of::<T>();
        self.values
            .iter()
            .find(|value| value.info.type_id == type_id)
            .and_then(|value| value.downcast().ok())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value providers for every entry, in insertion order
    pub fn providers(&self) -> Vec<Provider> {
        self.values.iter().cloned().map(Provider::instance).collect()
    }
}
