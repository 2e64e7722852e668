use std::sync::Arc;

use crate::{
    binder::{LifecycleBinder, LifecycleState},
    config::BindConfig,
    container::Container,
    errors::BindError,
    observable::Listener,
    resolver::ContainerResolver,
};

/// Render function of a wrapped element
///
/// Implemented for every `Fn(&Props, &Container) -> Output`.
pub trait View<C: Container>: Send + Sync {
    type Output;

    fn render(&self, props: &C::Props, container: &C) -> Self::Output;
}
impl<C, F, Output> View<C> for F
where
    C: Container,
    F: Fn(&C::Props, &C) -> Output + Send + Sync,
{
    type Output = Output;

    fn render(&self, props: &C::Props, container: &C) -> Output {
        self(props, container)
    }
}

/// Binds a container type to elements
///
/// ```rust
/// use vmbind::{bind, BindConfig, Container, DynError, Injector, RootInjector};
///
/// struct Greeter;
/// impl Container for Greeter {
///     type Props = String;
///     fn construct(_: &Injector, _: &String) -> Result<Self, DynError> {
///         Ok(Greeter)
///     }
/// }
///
/// let greeting = bind(BindConfig::<Greeter>::new().root(RootInjector::new()))
///     .wrap(|name: &String, _: &Greeter| format!("hello {name}"));
///
/// let mut element = greeting.create();
/// assert_eq!(element.mount("world".to_string()).unwrap(), "hello world");
/// element.detach().unwrap();
/// ```
pub fn bind<C: Container>(config: BindConfig<C>) -> Binding<C> {
    Binding {
        resolver: Arc::new(ContainerResolver::new(config)),
    }
}

/// Result of [bind] - wraps views into bound elements
pub struct Binding<C: Container> {
    resolver: Arc<ContainerResolver<C>>,
}
impl<C: Container> Clone for Binding<C> {
    fn clone(&self) -> Self {
        Binding {
            resolver: self.resolver.clone(),
        }
    }
}

impl<C: Container> Binding<C> {
    pub fn wrap<V: View<C>>(&self, view: V) -> Wrapped<C, V> {
        Wrapped {
            resolver: self.resolver.clone(),
            view: Arc::new(view),
        }
    }

    pub fn resolver(&self) -> &ContainerResolver<C> {
        &self.resolver
    }
}

/// A view wrapped with its container binding - creates one [BoundElement] per mount
pub struct Wrapped<C: Container, V> {
    resolver: Arc<ContainerResolver<C>>,
    view: Arc<V>,
}
impl<C: Container, V> Clone for Wrapped<C, V> {
    fn clone(&self) -> Self {
        Wrapped {
            resolver: self.resolver.clone(),
            view: self.view.clone(),
        }
    }
}

impl<C: Container, V: View<C>> Wrapped<C, V> {
    /// A new, not yet rendered element
    pub fn create(&self) -> BoundElement<C, V> {
        BoundElement {
            binder: LifecycleBinder::new(self.resolver.clone()),
            view: self.view.clone(),
            props: None,
        }
    }

    /// Like [Self::create], with `on_invalidate` called whenever the element has to re-render
    pub fn create_with_invalidation(&self, on_invalidate: Listener) -> BoundElement<C, V> {
        BoundElement {
            binder: LifecycleBinder::new(self.resolver.clone()).with_invalidation(on_invalidate),
            view: self.view.clone(),
            props: None,
        }
    }
}

/// One mounted instance of a [Wrapped] view
///
/// The host calls, in that order: [Self::render] once, [Self::attach] once,
/// [Self::update] for every props change, [Self::rerender] whenever [Self::is_stale],
/// and [Self::detach] once.
pub struct BoundElement<C: Container, V> {
    binder: LifecycleBinder<C>,
    view: Arc<V>,
    props: Option<C::Props>,
}

impl<C: Container, V: View<C>> BoundElement<C, V> {
    /// First render - resolves the container with the initial props
    pub fn render(&mut self, props: C::Props) -> Result<V::Output, BindError> {
        match self.binder.state() {
            LifecycleState::Unmounted => {}
            LifecycleState::Detached => return Err(BindError::Detached),
            LifecycleState::Rendered | LifecycleState::Mounted => {
                return Err(BindError::AlreadyRendered)
            }
        }

        let container = self.binder.resolve(&props)?;
        self.binder.take_stale();
        let output = self.view.render(&props, &container);
        self.props = Some(props);
        Ok(output)
    }

    pub fn attach(&mut self) -> Result<(), BindError> {
        self.binder.attach()
    }

    /// First render followed by attach
    pub fn mount(&mut self, props: C::Props) -> Result<V::Output, BindError> {
        let output = self.render(props)?;
        self.attach()?;
        Ok(output)
    }

    /// Render caused by a props change - forwards the props to the container first
    pub fn update(&mut self, props: C::Props) -> Result<V::Output, BindError> {
        self.binder.update_props(&props)?;
        self.props = Some(props);
        self.rerender()
    }

    /// Render with the current props, after an observed field changed
    pub fn rerender(&mut self) -> Result<V::Output, BindError> {
        let (Some(container), Some(props)) = (self.binder.container(), &self.props) else {
            return Err(match self.binder.state() {
                LifecycleState::Detached => BindError::Detached,
                _ => BindError::NotRendered,
            });
        };

        self.binder.take_stale();
        Ok(self.view.render(props, container))
    }

    pub fn detach(&mut self) -> Result<(), BindError> {
        self.props = None;
        self.binder.detach()
    }

    /// True if an observed field changed since the last render
    pub fn is_stale(&self) -> bool {
        self.binder.is_stale()
    }

    pub fn state(&self) -> LifecycleState {
        self.binder.state()
    }

    pub fn container(&self) -> Option<&Arc<C>> {
        self.binder.container()
    }

    pub fn props(&self) -> Option<&C::Props> {
        self.props.as_ref()
    }
}
