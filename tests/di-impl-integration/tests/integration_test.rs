//! 依赖注入容器的端到端测试

use component_macros::Component;
use di_abstractions::{
    Component as _, ComponentRegistry, ComponentResolver, ContainerBuilder, Dep, DiContainer,
};
use di_common::{ContainerConfig, DependencyError, DuplicatePolicy};
use di_impl::{DiContainerBuilder, DiContainerImpl};
use std::sync::Arc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub trait LowLevel: Send + Sync {
    fn counter(&self) -> i32;
}

#[derive(Debug, Default, Component)]
#[component(constructor, provides(dyn LowLevel))]
struct LowLevelComponent {
    counter: i32,
}

impl LowLevelComponent {
    fn constructor(&self) -> Self {
        Self { counter: 12 }
    }
}

impl LowLevel for LowLevelComponent {
    fn counter(&self) -> i32 {
        self.counter
    }
}

#[derive(Debug, Default, Component)]
#[component(constructor)]
struct WithConstructor {
    number: i32,
}

impl WithConstructor {
    fn constructor(&self) -> Arc<Self> {
        Arc::new(Self { number: 13 })
    }
}

#[derive(Debug, Default, Component)]
struct ProvidedDep {
    name: String,
    number: i32,
}

#[derive(Debug, Default, Component)]
struct ZeroValueDep {
    number: i32,
}

#[derive(Debug, Default, Component)]
struct TopLevelComponent {
    #[dep]
    low_level: Dep<dyn LowLevel>,
    #[dep]
    with_constructor: Dep<WithConstructor>,
    #[dep]
    provided: Dep<ProvidedDep>,
    #[dep]
    zero_value: Dep<ZeroValueDep>,
    untouched: Option<String>,
}

#[test]
fn test_example_end_to_end() {
    init_tracing();
    let mut container = DiContainerImpl::new();

    container.register(TopLevelComponent::default()).unwrap();
    container
        .register(ProvidedDep {
            name: "surplus".to_string(),
            number: 9,
        })
        .unwrap();
    container.register(LowLevelComponent::default()).unwrap();
    container.resolve_all().unwrap();

    let top = container.get::<TopLevelComponent>().unwrap().unwrap();
    assert_eq!(top.low_level.counter(), 12);
    assert_eq!(top.provided.number, 9);
    assert_eq!(top.provided.name, "surplus");
    assert_eq!(top.zero_value.number, 0);
    assert_eq!(top.with_constructor.number, 13);
    assert!(top.untouched.is_none());

    // 按限定名称获取
    let by_name = container
        .get_by_name(&TopLevelComponent::component_name())
        .unwrap()
        .unwrap()
        .downcast::<TopLevelComponent>()
        .unwrap();
    assert!(Arc::ptr_eq(&top, &by_name));
    assert_eq!(by_name.low_level.counter(), 12);

    let stats = container.stats();
    assert_eq!(stats.registered_components, 5);
    assert_eq!(stats.auto_registered_components, 2);
    assert_eq!(stats.resolved_components, 5);
}

#[test]
fn test_get_twice_returns_same_instance() {
    let mut container = DiContainerImpl::new();
    container.register(TopLevelComponent::default()).unwrap();
    container.register(LowLevelComponent::default()).unwrap();

    let first = container.get::<TopLevelComponent>().unwrap().unwrap();
    let second = container.get::<TopLevelComponent>().unwrap().unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    // 依赖也是同一个实例
    let low = container.get::<LowLevelComponent>().unwrap().unwrap();
    let via_capability = container.get_capability::<dyn LowLevel>().unwrap().unwrap();
    assert_eq!(low.counter, via_capability.counter());
    assert!(std::ptr::eq(
        Arc::as_ptr(&low).cast::<u8>(),
        Arc::as_ptr(&via_capability).cast::<u8>()
    ));
}

#[test]
fn test_leaf_exists_right_after_registration() {
    let mut container = DiContainerImpl::new();
    container.register(LowLevelComponent::default()).unwrap();

    let metadata = container.registered_components();
    assert_eq!(metadata.len(), 1);
    assert!(metadata[0].resolved);
    assert_eq!(container.stats().resolved_components, 1);
}

#[test]
fn test_constructor_value_replaces_template() {
    let mut container = DiContainerImpl::new();
    container.register(LowLevelComponent { counter: 0 }).unwrap();

    let low = container.get::<LowLevelComponent>().unwrap().unwrap();
    assert_eq!(low.counter, 12);
}

#[derive(Debug, Default, Component)]
#[component(provides(dyn LowLevel))]
struct OtherLowLevel;

impl LowLevel for OtherLowLevel {
    fn counter(&self) -> i32 {
        -1
    }
}

#[test]
fn test_two_implementations_are_ambiguous() {
    let mut container = DiContainerImpl::new();
    container.register(LowLevelComponent::default()).unwrap();
    container.register(OtherLowLevel).unwrap();
    container.register(TopLevelComponent::default()).unwrap();

    let err = container.resolve_all().unwrap_err();
    match err.root_cause() {
        DependencyError::AmbiguousImplementation { candidates, .. } => {
            assert_eq!(candidates.len(), 2);
            assert!(candidates.contains(&LowLevelComponent::component_name()));
            assert!(candidates.contains(&OtherLowLevel::component_name()));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_missing_implementation_is_not_provided() {
    let mut container = DiContainerImpl::new();
    container.register(TopLevelComponent::default()).unwrap();

    let err = container.get::<TopLevelComponent>().unwrap_err();
    assert!(matches!(err, DependencyError::InjectionFailed { .. }));
    assert!(matches!(err.root_cause(), DependencyError::NotProvided { .. }));
}

#[derive(Debug, Default, Component)]
struct CycleA {
    #[dep]
    b: Dep<CycleB>,
}

#[derive(Debug, Default, Component)]
struct CycleB {
    #[dep]
    a: Dep<CycleA>,
}

#[test]
fn test_two_cycle_detected_from_either_side() {
    let mut container = DiContainerImpl::new();
    container.register(CycleA::default()).unwrap();
    container.register(CycleB::default()).unwrap();

    for result in [
        container.get::<CycleA>().map(|_| ()),
        container.get::<CycleB>().map(|_| ()),
    ] {
        let err = result.unwrap_err();
        match err.root_cause() {
            DependencyError::CircularDependency {
                component,
                dependency,
                ..
            } => {
                assert_ne!(component, dependency);
                let names = [CycleA::component_name(), CycleB::component_name()];
                assert!(names.contains(component));
                assert!(names.contains(dependency));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}

#[test]
fn test_cycle_detected_by_resolve_all() {
    let mut container = DiContainerImpl::new();
    container.register(CycleB::default()).unwrap();
    container.register(CycleA::default()).unwrap();

    let err = container.resolve_all().unwrap_err();
    assert!(err.to_string().contains(&CycleB::component_name()));
    assert!(matches!(
        err.root_cause(),
        DependencyError::CircularDependency { .. }
    ));
}

#[derive(Debug, Default, Component)]
struct NamedConsumer {
    #[dep = "custom"]
    provided: Dep<ProvidedDep>,
}

#[test]
fn test_explicit_name_overrides_field_type() {
    let mut container = DiContainerImpl::new();
    container
        .register(ProvidedDep {
            name: "default".to_string(),
            number: 1,
        })
        .unwrap();
    container
        .register_as(
            "custom",
            ProvidedDep {
                name: "custom".to_string(),
                number: 2,
            },
        )
        .unwrap();
    container.register(NamedConsumer::default()).unwrap();

    let consumer = container.get::<NamedConsumer>().unwrap().unwrap();
    assert_eq!(consumer.provided.name, "custom");
    assert_eq!(consumer.provided.number, 2);
}

#[derive(Debug, Default, Component)]
struct MisnamedConsumer {
    #[dep = "other"]
    provided: Dep<ProvidedDep>,
}

#[test]
fn test_named_dependency_of_wrong_type_is_type_mismatch() {
    let mut container = DiContainerImpl::new();
    container.register_as("other", ZeroValueDep::default()).unwrap();
    container.register(MisnamedConsumer::default()).unwrap();

    let err = container.get::<MisnamedConsumer>().unwrap_err();
    match err.root_cause() {
        DependencyError::TypeMismatch {
            dependency, actual, ..
        } => {
            assert_eq!(dependency, "other");
            assert_eq!(actual, &ZeroValueDep::component_name());
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_unregistered_name_is_not_found() {
    let mut container = DiContainerImpl::new();
    assert!(container.get_by_name("nowhere::Missing").unwrap().is_none());
    assert!(container.get::<ProvidedDep>().unwrap().is_none());
    assert_eq!(container.stats().resolution_errors, 0);
}

#[derive(Debug, Default, Component)]
#[component(constructor)]
struct Faulty;

impl Faulty {
    fn constructor(&self) -> Self {
        panic!("connection refused")
    }
}

#[derive(Debug, Default, Component)]
struct NeedsFaulty {
    #[dep]
    faulty: Dep<Faulty>,
}

#[test]
fn test_constructor_panic_is_reported_not_propagated() {
    let mut container = DiContainerImpl::with_config(ContainerConfig {
        eager_leaf_resolution: false,
        ..ContainerConfig::default()
    });
    container.register(Faulty).unwrap();
    container.register(NeedsFaulty::default()).unwrap();

    let err = container.get::<NeedsFaulty>().unwrap_err();
    match err.root_cause() {
        DependencyError::ConstructorFault { component, message } => {
            assert_eq!(component, &Faulty::component_name());
            assert_eq!(message, "connection refused");
        }
        other => panic!("unexpected: {other:?}"),
    }
    // 确定性地再次失败
    assert!(container.get::<NeedsFaulty>().is_err());
}

#[derive(Debug, Default, Component)]
#[component(constructor = "pair")]
struct TwoValues;

impl TwoValues {
    fn pair(&self) -> (Arc<Self>, Arc<Self>) {
        (Arc::new(Self), Arc::new(Self))
    }
}

#[test]
fn test_constructor_arity_error() {
    let mut container = DiContainerImpl::new();
    let err = container.register(TwoValues).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        DependencyError::ConstructorArity {
            expected: 1,
            actual: 2,
            ..
        }
    ));
    assert!(!container.is_registered::<TwoValues>());
}

#[test]
fn test_builder_and_config_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("container.toml");
    std::fs::write(&path, "duplicate_registration = \"ignore\"\n")?;
    let config = ContainerConfig::load(&path)?;
    assert_eq!(config.duplicate_registration, DuplicatePolicy::Ignore);

    let mut container = DiContainerBuilder::new()
        .with_config(config)
        .register(TopLevelComponent::default())
        .register(LowLevelComponent::default())
        .register(LowLevelComponent::default())
        .build()?;

    container.validate().map_err(|errors| anyhow::anyhow!("{errors:?}"))?;
    container.resolve_all()?;

    let metadata = serde_json::to_value(container.registered_components())?;
    assert_eq!(metadata.as_array().map(Vec::len), Some(5));
    assert_eq!(metadata[0]["dependencies"][0]["kind"], "capability");
    Ok(())
}

#[test]
fn test_independent_containers() {
    let mut first = DiContainerImpl::new();
    let mut second = DiContainerImpl::new();
    first.register(LowLevelComponent::default()).unwrap();

    assert!(first.get::<LowLevelComponent>().unwrap().is_some());
    assert!(second.get::<LowLevelComponent>().unwrap().is_none());
    assert_ne!(first.id(), second.id());
}
