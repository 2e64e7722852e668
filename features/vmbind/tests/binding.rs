//! End-to-end behaviour of bound elements, driven the way a UI host drives them.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use vmbind::{
    bind, BindConfig, BindError, Cleanup, Container, DependencyInfo, DynError, Hook, Injector,
    LifecycleState, Observable, Observe, Provide, Provider, RootInjector, Scope,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Records every call it receives
#[derive(Default)]
struct Spy<T> {
    calls: Mutex<Vec<T>>,
}
impl<T: Clone> Spy<T> {
    fn record(&self, value: T) {
        self.calls.lock().unwrap().push(value);
    }

    fn calls(&self) -> Vec<T> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

// ============================================================================
// Counter with mount / unmount hooks and injected callbacks
// ============================================================================

#[derive(Default)]
struct CounterDependencies {
    do_something: Spy<()>,
    on_mount: Spy<()>,
    on_unmount: Spy<()>,
}

struct CounterStore {
    count: Observable<u32>,
    dependencies: Arc<CounterDependencies>,
}
impl CounterStore {
    fn increment(&self) {
        self.count.update(|count| *count += 1);
    }
}
impl Container for CounterStore {
    type Props = CounterProps;

    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required::<CounterDependencies>()]
    }

    fn construct(injector: &Injector, _: &CounterProps) -> Result<Self, DynError> {
        let dependencies = injector.get::<CounterDependencies>()?;
        dependencies.do_something.record(());
        Ok(CounterStore {
            count: Observable::new(0),
            dependencies,
        })
    }

    fn mount(&self) -> Result<Option<Cleanup>, DynError> {
        self.dependencies.on_mount.record(());
        let dependencies = self.dependencies.clone();
        Ok(Some(Box::new(move || {
            dependencies.on_unmount.record(());
            Ok(())
        })))
    }

    fn observed(&self) -> Vec<&dyn Observe> {
        vec![&self.count]
    }
}

#[derive(Clone, Default)]
struct CounterProps {
    prefix: String,
}

fn counter_view(props: &CounterProps, store: &CounterStore) -> String {
    format!("{}{}", props.prefix, store.count.get())
}

fn counter_binding(
    scope: Scope,
) -> (
    vmbind::Wrapped<CounterStore, fn(&CounterProps, &CounterStore) -> String>,
    Arc<CounterDependencies>,
) {
    let dependencies = Arc::new(CounterDependencies::default());
    let mut bag = vmbind::Dependencies::new();
    bag.add_arc(dependencies.clone()).unwrap();

    let binding = bind(
        BindConfig::<CounterStore>::new()
            .dependencies(bag)
            .scope(scope)
            .root(RootInjector::new()),
    );
    let view: fn(&CounterProps, &CounterStore) -> String = counter_view;
    (binding.wrap(view), dependencies)
}

#[test]
fn renders_container_values() {
    init_tracing();
    let (counter, _) = counter_binding(Scope::PerElement);
    let mut element = counter.create();

    assert_eq!(element.mount(CounterProps::default()).unwrap(), "0");
    element.detach().unwrap();
}

#[test]
fn updates_render_after_container_changes() {
    init_tracing();
    let (counter, _) = counter_binding(Scope::PerElement);
    let mut element = counter.create();
    element.mount(CounterProps::default()).unwrap();

    element.container().unwrap().increment();
    assert!(element.is_stale());
    assert_eq!(element.rerender().unwrap(), "1");
    assert!(!element.is_stale());
    element.detach().unwrap();
}

#[test]
fn passes_props_through_to_the_view() {
    let (counter, _) = counter_binding(Scope::PerElement);
    let mut element = counter.create();

    let props = CounterProps {
        prefix: "counter is ".to_string(),
    };
    assert_eq!(element.mount(props).unwrap(), "counter is 0");
}

#[test]
fn constructor_receives_dependencies() {
    let (counter, dependencies) = counter_binding(Scope::PerElement);
    let mut element = counter.create();
    element.render(CounterProps::default()).unwrap();

    assert_eq!(dependencies.do_something.count(), 1);
    assert_eq!(dependencies.on_mount.count(), 0);
}

#[test]
fn mount_and_cleanup_run_once_per_cycle() {
    init_tracing();
    let (counter, dependencies) = counter_binding(Scope::PerElement);

    for cycle in 1..=5 {
        let mut element = counter.create();
        element.mount(CounterProps::default()).unwrap();
        element.update(CounterProps::default()).unwrap();
        assert_eq!(dependencies.on_mount.count(), cycle);
        assert_eq!(dependencies.on_unmount.count(), cycle - 1);

        element.detach().unwrap();
        element.detach().unwrap();
        assert_eq!(dependencies.on_unmount.count(), cycle);
    }

    assert_eq!(dependencies.do_something.count(), 5);
}

#[test]
fn remount_resets_per_element_state() {
    let (counter, _) = counter_binding(Scope::PerElement);

    let mut element = counter.create();
    element.mount(CounterProps::default()).unwrap();
    element.container().unwrap().increment();
    assert_eq!(element.rerender().unwrap(), "1");
    element.detach().unwrap();

    let mut remounted = counter.create();
    assert_eq!(remounted.mount(CounterProps::default()).unwrap(), "0");
    assert_eq!(remounted.container().unwrap().count.get(), 0);
}

#[test]
fn global_scope_shares_one_container() {
    init_tracing();
    let (counter, dependencies) = counter_binding(Scope::Global);

    let mut first = counter.create();
    let mut second = counter.create();
    first.mount(CounterProps::default()).unwrap();
    second.mount(CounterProps::default()).unwrap();
    assert!(Arc::ptr_eq(
        first.container().unwrap(),
        second.container().unwrap()
    ));

    first.container().unwrap().increment();
    assert!(first.is_stale());
    assert!(second.is_stale());
    assert_eq!(second.rerender().unwrap(), "1");

    first.detach().unwrap();
    second.detach().unwrap();

    let mut third = counter.create();
    assert_eq!(third.mount(CounterProps::default()).unwrap(), "1");

    assert_eq!(dependencies.do_something.count(), 1);
    assert_eq!(dependencies.on_mount.count(), 3);
    assert_eq!(dependencies.on_unmount.count(), 2);
}

#[test]
fn invalidation_callback_fires_while_attached() {
    let (counter, _) = counter_binding(Scope::PerElement);
    let invalidations = Arc::new(AtomicUsize::new(0));
    let counted = invalidations.clone();

    let mut element = counter.create_with_invalidation(Arc::new(move || {
        counted.fetch_add(1, Ordering::SeqCst);
    }));
    element.mount(CounterProps::default()).unwrap();
    let container = element.container().unwrap().clone();

    container.increment();
    container.increment();
    element.detach().unwrap();
    container.increment();

    assert_eq!(invalidations.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Props handling
// ============================================================================

#[derive(Default)]
struct PropsSpies {
    constructed: Spy<Option<u32>>,
    updated: Spy<Option<u32>>,
}

#[derive(Clone, Default)]
struct CountProps {
    count: Option<u32>,
}

struct PropsStore {
    spies: Arc<PropsSpies>,
}
impl Container for PropsStore {
    type Props = CountProps;

    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required::<PropsSpies>()]
    }

    fn construct(injector: &Injector, props: &CountProps) -> Result<Self, DynError> {
        let spies = injector.get::<PropsSpies>()?;
        spies.constructed.record(props.count);
        Ok(PropsStore { spies })
    }

    fn on_update_props(&self, props: &CountProps) -> Result<(), DynError> {
        self.spies.updated.record(props.count);
        Ok(())
    }
}

fn props_element() -> (
    vmbind::BoundElement<PropsStore, impl vmbind::View<PropsStore, Output = &'static str>>,
    Arc<PropsSpies>,
) {
    let spies = Arc::new(PropsSpies::default());
    let mut bag = vmbind::Dependencies::new();
    bag.add_arc(spies.clone()).unwrap();

    let wrapped = bind(
        BindConfig::<PropsStore>::new()
            .dependencies(bag)
            .root(RootInjector::new()),
    )
    .wrap(|_: &CountProps, _: &PropsStore| "x");

    (wrapped.create(), spies)
}

#[test]
fn constructor_receives_missing_props() {
    let (mut element, spies) = props_element();
    element.mount(CountProps::default()).unwrap();
    assert_eq!(spies.constructed.calls(), vec![None]);
}

#[test]
fn constructor_receives_initial_props_only_once() {
    let (mut element, spies) = props_element();
    element.mount(CountProps { count: Some(1) }).unwrap();
    assert_eq!(spies.constructed.calls(), vec![Some(1)]);

    element.update(CountProps { count: Some(2) }).unwrap();
    assert_eq!(spies.constructed.calls(), vec![Some(1)]);
}

#[test]
fn props_changes_reach_on_update_props() {
    let (mut element, spies) = props_element();
    element.mount(CountProps { count: Some(1) }).unwrap();
    assert!(spies.updated.calls().is_empty());

    element.update(CountProps { count: Some(2) }).unwrap();
    assert_eq!(spies.updated.calls(), vec![Some(2)]);
    assert_eq!(element.props().and_then(|props| props.count), Some(2));

    element.rerender().unwrap();
    assert_eq!(spies.updated.count(), 1);
}

#[test]
fn first_render_is_not_a_props_update() {
    let (mut element, spies) = props_element();
    element.render(CountProps { count: Some(1) }).unwrap();
    assert!(matches!(
        element.render(CountProps { count: Some(2) }),
        Err(BindError::AlreadyRendered)
    ));
    assert!(matches!(
        element.update(CountProps { count: Some(2) }),
        Err(BindError::NotAttached)
    ));
    assert!(spies.updated.calls().is_empty());
}

// ============================================================================
// Shared providers
// ============================================================================

struct UserName {
    name: Observable<String>,
}
impl Provide for UserName {
    fn construct(_: &Injector) -> Result<Self, DynError> {
        Ok(UserName {
            name: Observable::new("anonymous".to_string()),
        })
    }
}

struct Greeting {
    user: Arc<UserName>,
    visits: Observable<u32>,
}
impl Container for Greeting {
    type Props = ();

    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required::<UserName>()]
    }

    fn construct(injector: &Injector, _: &()) -> Result<Self, DynError> {
        Ok(Greeting {
            user: injector.get()?,
            visits: Observable::new(0),
        })
    }

    fn observed(&self) -> Vec<&dyn Observe> {
        vec![&self.user.name, &self.visits]
    }
}

struct Badge {
    user: Arc<UserName>,
}
impl Container for Badge {
    type Props = ();

    fn dependencies() -> Vec<DependencyInfo> {
        vec![DependencyInfo::required::<UserName>()]
    }

    fn construct(injector: &Injector, _: &()) -> Result<Self, DynError> {
        Ok(Badge {
            user: injector.get()?,
        })
    }
}

#[test]
fn per_element_containers_share_providers() {
    init_tracing();
    let root = RootInjector::new();
    let greeting = bind(
        BindConfig::<Greeting>::new()
            .provider(Provider::of::<UserName>())
            .root(root.clone()),
    )
    .wrap(|_: &(), greeting: &Greeting| {
        format!("hello {} #{}", greeting.user.name.get(), greeting.visits.get())
    });

    let mut first = greeting.create();
    let mut second = greeting.create();
    first.mount(()).unwrap();
    second.mount(()).unwrap();
    assert!(!Arc::ptr_eq(
        first.container().unwrap(),
        second.container().unwrap()
    ));

    first.container().unwrap().visits.set(3);
    first.container().unwrap().user.name.set("ada".to_string());
    assert!(second.is_stale());
    assert_eq!(second.rerender().unwrap(), "hello ada #0");

    first.detach().unwrap();
    second.detach().unwrap();

    let mut remounted = greeting.create();
    assert_eq!(remounted.mount(()).unwrap(), "hello ada #0");
    assert_eq!(root.current().len(), 1);
}

#[test]
fn providers_are_shared_across_bindings() {
    let root = RootInjector::new();
    let greeting = bind(
        BindConfig::<Greeting>::new()
            .provider(Provider::of::<UserName>())
            .root(root.clone()),
    )
    .wrap(|_: &(), _: &Greeting| ());
    let badge = bind(
        BindConfig::<Badge>::new()
            .provider(Provider::of::<UserName>())
            .root(root.clone()),
    )
    .wrap(|_: &(), badge: &Badge| badge.user.name.get());

    let mut greeting_element = greeting.create();
    greeting_element.mount(()).unwrap();
    greeting_element
        .container()
        .unwrap()
        .user
        .name
        .set("grace".to_string());
    greeting_element.detach().unwrap();

    let mut badge_element = badge.create();
    assert_eq!(badge_element.mount(()).unwrap(), "grace");
}

#[test]
fn reset_root_discards_provider_state() {
    let root = RootInjector::new();
    let badge = bind(
        BindConfig::<Badge>::new()
            .provider(Provider::of::<UserName>())
            .root(root.clone()),
    )
    .wrap(|_: &(), badge: &Badge| badge.user.name.get());

    let mut element = badge.create();
    element.mount(()).unwrap();
    element
        .container()
        .unwrap()
        .user
        .name
        .set("linus".to_string());

    root.reset();
    assert_eq!(element.rerender().unwrap(), "linus");

    let mut after_reset = badge.create();
    assert_eq!(after_reset.mount(()).unwrap(), "anonymous");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn unresolvable_dependencies_abort_the_mount() {
    init_tracing();
    let badge = bind(BindConfig::<Badge>::new().root(RootInjector::new()))
        .wrap(|_: &(), badge: &Badge| badge.user.name.get());

    let mut element = badge.create();
    let err = element.mount(()).unwrap_err();
    assert!(matches!(err, BindError::Resolution { .. }), "{err}");
    assert_eq!(element.state(), LifecycleState::Unmounted);
    assert!(element.container().is_none());
}

struct FailingMount;
impl Container for FailingMount {
    type Props = ();

    fn construct(_: &Injector, _: &()) -> Result<Self, DynError> {
        Ok(FailingMount)
    }

    fn mount(&self) -> Result<Option<Cleanup>, DynError> {
        Err("mount exploded".into())
    }
}

#[test]
fn hook_errors_propagate() {
    let failing = bind(BindConfig::<FailingMount>::new().root(RootInjector::new()))
        .wrap(|_: &(), _: &FailingMount| ());

    let mut element = failing.create();
    let err = element.mount(()).unwrap_err();
    let hook_error = match err {
        BindError::Hook(hook_error) => hook_error,
        other => panic!("expected a hook error, got {other:?}"),
    };
    assert_eq!(hook_error.hook, Hook::Mount);
    assert_eq!(hook_error.error.to_string(), "mount exploded");
    assert_eq!(element.state(), LifecycleState::Rendered);
}

struct FailingCleanup {
    cleanups: Arc<AtomicUsize>,
}
impl Container for FailingCleanup {
    type Props = Arc<AtomicUsize>;

    fn construct(_: &Injector, cleanups: &Arc<AtomicUsize>) -> Result<Self, DynError> {
        Ok(FailingCleanup {
            cleanups: cleanups.clone(),
        })
    }

    fn mount(&self) -> Result<Option<Cleanup>, DynError> {
        let cleanups = self.cleanups.clone();
        Ok(Some(Box::new(move || {
            cleanups.fetch_add(1, Ordering::SeqCst);
            Err("cleanup exploded".into())
        })))
    }
}

#[test]
fn cleanup_errors_propagate_once() {
    let failing = bind(BindConfig::<FailingCleanup>::new().root(RootInjector::new()))
        .wrap(|_: &Arc<AtomicUsize>, _: &FailingCleanup| ());
    let cleanups = Arc::new(AtomicUsize::new(0));

    let mut element = failing.create();
    element.mount(cleanups.clone()).unwrap();
    let err = element.detach().unwrap_err();
    assert!(matches!(err, BindError::Hook(ref hook) if hook.hook == Hook::Cleanup));

    element.detach().unwrap();
    assert_eq!(cleanups.load(Ordering::SeqCst), 1);
    assert_eq!(element.state(), LifecycleState::Detached);
}

// ============================================================================
// Process-wide root
// ============================================================================

struct GlobalCounter {
    instances: AtomicUsize,
}
static GLOBAL_COUNTERS_BUILT: AtomicUsize = AtomicUsize::new(0);
impl Provide for GlobalCounter {
    fn construct(_: &Injector) -> Result<Self, DynError> {
        GLOBAL_COUNTERS_BUILT.fetch_add(1, Ordering::SeqCst);
        Ok(GlobalCounter {
            instances: AtomicUsize::new(0),
        })
    }
}

#[test]
fn process_wide_root_registration_and_reset() {
    let info = vmbind::TypeInfo::of::<GlobalCounter>();

    vmbind::register_global_providers(&[Provider::of::<GlobalCounter>()]).unwrap();
    vmbind::register_global_providers(&[Provider::of::<GlobalCounter>()]).unwrap();
    assert_eq!(GLOBAL_COUNTERS_BUILT.load(Ordering::SeqCst), 1);

    let captured = vmbind::root_injector();
    assert!(captured.keys().contains(&info));
    captured
        .get::<GlobalCounter>()
        .unwrap()
        .instances
        .fetch_add(1, Ordering::SeqCst);

    vmbind::reset_root_injector();
    assert!(!vmbind::root_injector().contains(&info));
    assert_eq!(
        captured
            .get::<GlobalCounter>()
            .unwrap()
            .instances
            .load(Ordering::SeqCst),
        1
    );
}
