use std::marker::PhantomData;

use vmbind_di::{Dependencies, DependenciesError, Injectable, Provider, RootInjector};

use crate::container::Container;

/// How many container instances a binding creates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// A fresh container for every mounted element
    #[default]
    PerElement,
    /// One container, created for the first element and shared by every later one
    Global,
}

/// Configuration of a [crate::bind] call
///
/// ```rust
/// use vmbind::{BindConfig, Container, DynError, Injector, Provider, Scope};
///
/// struct Api;
/// struct Store;
/// impl Container for Store {
///     type Props = ();
///     fn construct(_: &Injector, _: &()) -> Result<Self, DynError> {
///         Ok(Store)
///     }
/// }
///
/// let config = BindConfig::<Store>::new()
///     .provider(Provider::value(Api))
///     .scope(Scope::Global);
/// assert_eq!(config.get_scope(), Scope::Global);
/// ```
pub struct BindConfig<C> {
    providers: Vec<Provider>,
    dependencies: Dependencies,
    scope: Scope,
    root: Option<RootInjector>,
    _container: PhantomData<fn() -> C>,
}
impl<C: Container> Default for BindConfig<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Container> BindConfig<C> {
    pub fn new() -> Self {
        BindConfig {
            providers: Vec::new(),
            dependencies: Dependencies::new(),
            scope: Scope::default(),
            root: None,
            _container: PhantomData,
        }
    }

    /// Adds a provider which is registered into the root injector and shared
    pub fn provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn providers(mut self, providers: impl IntoIterator<Item = Provider>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Adds a ready-made value the container can take out of its injector
    pub fn dependency<T: Injectable>(mut self, value: T) -> Result<Self, DependenciesError> {
        self.dependencies.add(value)?;
        Ok(self)
    }

    /// Replaces all values added through [Self::dependency]
    pub fn dependencies(mut self, dependencies: Dependencies) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Shorthand for `scope(Scope::Global)`
    pub fn global(self) -> Self {
        self.scope(Scope::Global)
    }

    /// Root injector to register into, defaults to [RootInjector::global]
    pub fn root(mut self, root: RootInjector) -> Self {
        self.root = Some(root);
        self
    }

    pub fn get_scope(&self) -> Scope {
        self.scope
    }

    pub fn get_providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn get_dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    pub(crate) fn into_parts(self) -> (Vec<Provider>, Dependencies, Scope, RootInjector) {
        let root = self.root.unwrap_or_else(RootInjector::global);
        (self.providers, self.dependencies, self.scope, root)
    }
}
