use std::{
    any::type_name,
    sync::{Arc, Mutex, PoisonError},
};

use vmbind_di::{Dependencies, Provider, ResolutionError, RootInjector};

use crate::{
    config::{BindConfig, Scope},
    container::Container,
    errors::BindError,
};

/// Produces container instances for one binding
///
/// Per element: the binding's providers go into the root injector, the container itself
/// into a fresh scoped injector - so every call yields a new container while the providers
/// it depends on are shared.
/// Global: the first call does the same, every later call hands out that first instance.
pub struct ContainerResolver<C: Container> {
    providers: Vec<Provider>,
    dependencies: Dependencies,
    scope: Scope,
    root: RootInjector,
    /// Only used with [Scope::Global]
    shared: Mutex<Option<Arc<C>>>,
}

impl<C: Container> ContainerResolver<C> {
    pub fn new(config: BindConfig<C>) -> Self {
        let (providers, dependencies, scope, root) = config.into_parts();
        ContainerResolver {
            providers,
            dependencies,
            scope,
            root,
            shared: Mutex::new(None),
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn root(&self) -> &RootInjector {
        &self.root
    }

    /// The shared container, once a globally scoped binding resolved it
    pub fn shared_instance(&self) -> Option<Arc<C>> {
        self.shared
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Container for a newly mounted element, `props` being the element's first props
    pub fn resolve(&self, props: &C::Props) -> Result<Arc<C>, BindError> {
        match self.scope {
            Scope::PerElement => self.instantiate(props),
            Scope::Global => {
                // Held during construction, so racing elements wait for the one instance
                let mut shared = self.shared.lock().unwrap_or_else(PoisonError::into_inner);
                if let Some(container) = shared.as_ref() {
                    tracing::trace!("Reusing global container '{}'", type_name::<C>());
                    return Ok(container.clone());
                }

                let container = self.instantiate(props)?;
                *shared = Some(container.clone());
                Ok(container)
            }
        }
    }

    fn instantiate(&self, props: &C::Props) -> Result<Arc<C>, BindError> {
        let container = type_name::<C>();
        let resolution_error = |source: ResolutionError| {
            tracing::error!("Resolving '{container}' failed: {source}");
            BindError::Resolution { container, source }
        };

        self.root.register(&self.providers).map_err(resolution_error)?;

        let props = props.clone();
        let mut scoped_providers = self.dependencies.providers();
        scoped_providers.push(Provider::from_fn(C::dependencies(), move |injector| {
            C::construct(injector, &props)
        }));

        let scope = self.root.scope();
        scope.register(&scoped_providers).map_err(resolution_error)?;

        tracing::debug!("Instantiated container '{container}' ({:?})", self.scope);
        scope
            .get::<C>()
            .map_err(|source| BindError::Lookup { container, source })
    }
}
