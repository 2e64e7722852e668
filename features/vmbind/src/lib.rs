//! vmbind binds dependency-injected view-model containers to mounted UI elements.
//!
//! A [Container] declares what it needs, [bind] resolves it through the root and a scoped
//! [Injector], and every mounted [BoundElement] drives the container's hooks:
//!
//! 1. first render - the container is resolved with the element's initial props
//! 2. attach - [Container::mount] runs, observed fields start invalidating the element
//! 3. props change - [Container::on_update_props] runs before the re-render
//! 4. detach - the cleanup returned by `mount` runs
//!
//! With [Scope::PerElement] (default) every element gets its own container, with
//! [Scope::Global] all elements of a binding share the first one. Providers always live
//! in the root injector and are shared across bindings.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use vmbind::{
//!     bind, BindConfig, Container, DependencyInfo, DynError, Injector, Observable, Observe,
//!     Provide, Provider, RootInjector,
//! };
//!
//! struct Session {
//!     user: Observable<String>,
//! }
//! impl Provide for Session {
//!     fn construct(_: &Injector) -> Result<Self, DynError> {
//!         Ok(Session { user: Observable::new("anonymous".to_string()) })
//!     }
//! }
//!
//! struct Counter {
//!     count: Observable<u32>,
//!     session: Arc<Session>,
//! }
//! impl Container for Counter {
//!     type Props = ();
//!
//!     fn dependencies() -> Vec<DependencyInfo> {
//!         vec![DependencyInfo::required::<Session>()]
//!     }
//!
//!     fn construct(injector: &Injector, _: &()) -> Result<Self, DynError> {
//!         Ok(Counter { count: Observable::new(0), session: injector.get()? })
//!     }
//!
//!     fn observed(&self) -> Vec<&dyn Observe> {
//!         vec![&self.count, &self.session.user]
//!     }
//! }
//!
//! let counter = bind(
//!     BindConfig::<Counter>::new()
//!         .provider(Provider::of::<Session>())
//!         .root(RootInjector::new()),
//! )
//! .wrap(|_: &(), counter: &Counter| {
//!     format!("{}: {}", counter.session.user.get(), counter.count.get())
//! });
//!
//! let mut element = counter.create();
//! assert_eq!(element.mount(()).unwrap(), "anonymous: 0");
//!
//! element.container().unwrap().count.update(|count| *count += 1);
//! assert!(element.is_stale());
//! assert_eq!(element.rerender().unwrap(), "anonymous: 1");
//!
//! element.detach().unwrap();
//! ```

pub mod binder;
pub mod binding;
pub mod config;
pub mod container;
pub mod errors;
pub mod observable;
pub mod resolver;

pub use binder::{LifecycleBinder, LifecycleState};
pub use binding::{bind, Binding, BoundElement, View, Wrapped};
pub use config::{BindConfig, Scope};
pub use container::{Cleanup, Container, Hook};
pub use errors::{BindError, HookError};
pub use observable::{Listener, Observable, Observe, Subscription};
pub use resolver::ContainerResolver;

pub use vmbind_di::{
    register_global_providers, reset_root_injector, root_injector, Dependencies,
    DependenciesError, DependencyInfo, DynError, Injectable, Injector, LookupError, Provide,
    Provider, ResolutionError, RootInjector, TypeInfo,
};
