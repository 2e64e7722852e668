//! Dependency injection for vmbind containers.
//!
//! The crate consists of three parts:
//! 1. [Provider] / [Provide]: declarations of what can be constructed and what it needs
//! 2. [Injector]: resolves providers into instances - a root injector lives for the whole
//!    application, scoped injectors are created per container and fall back to their parent
//! 3. [RootInjector]: the resettable handle to "the" root injector
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//! use vmbind_di::{DependencyInfo, DynError, Injector, Provide, Provider, RootInjector};
//!
//! struct Engine;
//! impl Provide for Engine {
//!     fn construct(_: &Injector) -> Result<Self, DynError> {
//!         Ok(Engine)
//!     }
//! }
//!
//! struct Car(Arc<Engine>);
//! impl Provide for Car {
//!     fn dependencies() -> Vec<DependencyInfo> {
//!         vec![DependencyInfo::required::<Engine>()]
//!     }
//!
//!     fn construct(injector: &Injector) -> Result<Self, DynError> {
//!         Ok(Car(injector.get()?))
//!     }
//! }
//!
//! let root = RootInjector::new();
//! root.register(&[Provider::of::<Engine>()]).unwrap();
//!
//! let scope = root.scope();
//! scope.register(&[Provider::of::<Car>()]).unwrap();
//!
//! let car = scope.get::<Car>().unwrap();
//! assert!(Arc::ptr_eq(&car.0, &root.current().get::<Engine>().unwrap()));
//! ```

pub mod dependencies;
pub mod dependency_graph;
pub mod errors;
pub mod injector;
pub mod provider;
pub mod root;
pub mod types;

pub use dependencies::Dependencies;
pub use dependency_graph::{DependencyGraph, DependencyGraphError, DependencyGraphErrors};
pub use errors::{DependenciesError, LookupError, ResolutionError};
pub use injector::{Injector, InjectorKind};
pub use provider::{Provide, Provider};
pub use root::{register_global_providers, reset_root_injector, root_injector, RootInjector};
pub use types::{DependencyInfo, DynError, Injectable, Instance, TypeInfo};
