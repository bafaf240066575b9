//! 组件宏集成测试

use component_macros::Component;
use di_abstractions::{
    Component as _, ComponentRegistry, ComponentResolver, ComponentShell, Dep, TypedShell,
};
use di_common::{qualified_name, DependencyError, DependencyKind, ValidationError};
use di_impl::DiContainerImpl;
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn backend(&self) -> &'static str;
}

pub trait Health: Send + Sync {
    fn healthy(&self) -> bool;
}

/// 测试服务配置
#[derive(Debug, Default, Component)]
#[component(name = "settings")]
struct Settings {
    retries: u32,
}

#[derive(Debug, Default, Component)]
#[component(provides(dyn Storage, dyn Health))]
struct DiskStorage;

impl Storage for DiskStorage {
    fn backend(&self) -> &'static str {
        "disk"
    }
}

impl Health for DiskStorage {
    fn healthy(&self) -> bool {
        true
    }
}

/// 测试服务
#[derive(Debug, Default, Component)]
#[component(constructor = "initialize")]
struct TestService {
    #[dep]
    storage: Dep<dyn Storage>,
    #[dep = "settings"]
    settings: Dep<Settings>,
    #[dep(name = "")]
    health: Dep<dyn Health>,
    initialized: bool,
}

impl TestService {
    fn initialize(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            settings: self.settings.clone(),
            health: self.health.clone(),
            initialized: true,
        }
    }
}

#[derive(Debug, Default, Component)]
struct ValueHolder {
    #[dep]
    retries: u32,
}

#[test]
fn test_derived_descriptor_fields() {
    let shell = TypedShell::new(TestService::component_name(), TestService::default());
    let fields = shell.fields();

    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0].field, "storage");
    assert_eq!(fields[0].kind, DependencyKind::Capability);
    assert_eq!(fields[0].name, qualified_name::<dyn Storage>());
    assert_eq!(fields[1].field, "settings");
    assert_eq!(fields[1].kind, DependencyKind::Concrete);
    assert_eq!(fields[1].name, "settings");
    assert_eq!(fields[2].name, qualified_name::<dyn Health>());
    assert!(shell.has_constructor());
}

#[test]
fn test_component_name_defaults_to_qualified_type_name() {
    assert_eq!(TestService::component_name(), qualified_name::<TestService>());
    assert_eq!(Settings::component_name(), "settings");
}

#[test]
fn test_provides_lists_every_capability() {
    let metadata = TypedShell::new("disk", DiskStorage).metadata();
    assert_eq!(
        metadata.capabilities,
        vec![qualified_name::<dyn Storage>(), qualified_name::<dyn Health>()]
    );
    assert!(!metadata.has_constructor);
}

#[test]
fn test_derived_component_resolves_in_container() {
    let mut container = DiContainerImpl::new();
    container.register(Settings { retries: 3 }).unwrap();
    container.register(DiskStorage).unwrap();
    container.register(TestService::default()).unwrap();

    let service = container.get::<TestService>().unwrap().unwrap();
    assert!(service.initialized);
    assert_eq!(service.storage.backend(), "disk");
    assert!(service.health.healthy());
    assert_eq!(service.settings.retries, 3);

    let settings = container.get_by_name("settings").unwrap().unwrap();
    assert!(Arc::ptr_eq(
        &settings.downcast::<Settings>().unwrap(),
        service.settings.get().unwrap()
    ));
}

#[test]
fn test_value_typed_dependency_is_rejected() {
    let mut container = DiContainerImpl::new();
    let err = container.register(ValueHolder::default()).unwrap_err();

    match err {
        DependencyError::Validation(ValidationError::UnsupportedFieldType {
            field, declared, ..
        }) => {
            assert_eq!(field, "retries");
            assert_eq!(declared, "u32");
        }
        other => panic!("unexpected: {other:?}"),
    }
}
