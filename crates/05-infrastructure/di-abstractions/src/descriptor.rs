//! 组件描述符
//!
//! [`ComponentDefinition`] 收集一个组件类型的依赖字段、能力和构造函数，
//! [`TypedShell`] 持有注册时的模板值并以 [`ComponentShell`] 的形式进入依赖图。

use crate::component::{
    Component, Constructed, ConstructorReturn, ConstructorValues, Dep, Instance,
};
use di_common::{
    qualified_name, ComponentMetadata, DependencyError, DependencyKind, DependencyMetadata,
    DependencyResult, TypeInfo, ValidationError,
};
use std::any::TypeId;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// 字段赋值函数，实例类型不匹配时返回 `false`
type Setter<T> = Box<dyn Fn(&mut T, &Instance) -> bool + Send + Sync>;

/// 能力转换函数，把具体实例转换为 `Arc<dyn Trait>` 并再次擦除
type CapabilityCast = Box<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

type Constructor<T> = Box<dyn Fn(&T) -> ConstructorValues + Send + Sync>;

/// 自动注册占位组件的工厂
pub type PlaceholderFactory = fn(&str) -> Box<dyn ComponentShell>;

/// 依赖字段
#[derive(Clone)]
pub struct DependencyField {
    /// 字段名
    pub field: &'static str,
    /// 依赖名称（显式指定或由字段类型推导）
    pub name: String,
    /// 字段要求的类型
    pub required: Option<TypeInfo>,
    /// 字段声明的类型（用于错误信息）
    pub declared_type: String,
    /// 类型种类
    pub kind: DependencyKind,
    /// 具体类型依赖的占位工厂
    pub placeholder: Option<PlaceholderFactory>,
    /// 依赖名称是否由字段类型推导
    pub derived_name: bool,
}

impl DependencyField {
    /// 是否为抽象能力依赖
    pub fn is_capability(&self) -> bool {
        self.kind == DependencyKind::Capability
    }

    /// 转换为元数据
    pub fn metadata(&self) -> DependencyMetadata {
        DependencyMetadata {
            field: self.field.to_string(),
            name: self.name.clone(),
            declared_type: self.declared_type.clone(),
            kind: self.kind,
        }
    }
}

impl fmt::Debug for DependencyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyField")
            .field("field", &self.field)
            .field("name", &self.name)
            .field("declared_type", &self.declared_type)
            .field("kind", &self.kind)
            .finish()
    }
}

/// 组件提供的能力
struct CapabilityProvider {
    info: TypeInfo,
    cast: CapabilityCast,
}

/// 组件定义构建器
///
/// 由 [`Component::describe`] 填充。
pub struct ComponentDefinition<T> {
    fields: Vec<DependencyField>,
    setters: Vec<Option<Setter<T>>>,
    capabilities: Vec<CapabilityProvider>,
    constructor: Option<Constructor<T>>,
}

impl<T: Component> ComponentDefinition<T> {
    /// 创建空定义
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            setters: Vec::new(),
            capabilities: Vec::new(),
            constructor: None,
        }
    }

    /// 声明具体类型依赖字段，`name` 为空时使用 `D::component_name()`
    pub fn dependency<D: Component>(
        &mut self,
        field: &'static str,
        name: &str,
        accessor: fn(&mut T) -> &mut Dep<D>,
    ) -> &mut Self {
        let derived_name = name.is_empty();
        let name = if derived_name {
            D::component_name()
        } else {
            name.to_string()
        };

        self.fields.push(DependencyField {
            field,
            name,
            required: Some(TypeInfo::of::<D>()),
            declared_type: qualified_name::<Dep<D>>(),
            kind: DependencyKind::Concrete,
            placeholder: Some(placeholder_shell::<D>),
            derived_name,
        });
        self.setters.push(Some(Box::new(move |target: &mut T, instance: &Instance| {
            match Arc::clone(instance).downcast::<D>() {
                Ok(value) => {
                    accessor(target).set(value);
                    true
                }
                Err(_) => false,
            }
        })));
        self
    }

    /// 声明抽象能力依赖字段，`name` 为空时使用能力的限定名称
    pub fn capability_dependency<D>(
        &mut self,
        field: &'static str,
        name: &str,
        accessor: fn(&mut T) -> &mut Dep<D>,
    ) -> &mut Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        let derived_name = name.is_empty();
        let name = if derived_name {
            qualified_name::<D>()
        } else {
            name.to_string()
        };

        self.fields.push(DependencyField {
            field,
            name,
            required: Some(TypeInfo::of::<D>()),
            declared_type: qualified_name::<Dep<D>>(),
            kind: DependencyKind::Capability,
            placeholder: None,
            derived_name,
        });
        self.setters.push(Some(Box::new(move |target: &mut T, instance: &Instance| {
            match instance.downcast_ref::<Arc<D>>() {
                Some(value) => {
                    accessor(target).set(Arc::clone(value));
                    true
                }
                None => false,
            }
        })));
        self
    }

    /// 记录一个被标记为依赖但类型不受支持的字段，注册时会被拒绝
    pub fn unsupported_field(&mut self, field: &'static str, declared_type: &str) -> &mut Self {
        self.fields.push(DependencyField {
            field,
            name: String::new(),
            required: None,
            declared_type: declared_type.to_string(),
            kind: DependencyKind::Unsupported,
            placeholder: None,
            derived_name: false,
        });
        self.setters.push(None);
        self
    }

    /// 声明组件满足能力 `D`
    pub fn provides<D>(&mut self, cast: fn(Arc<T>) -> Arc<D>) -> &mut Self
    where
        D: ?Sized + Send + Sync + 'static,
    {
        let info = TypeInfo::of::<D>();
        if self.capabilities.iter().any(|c| c.info.id == info.id) {
            return self;
        }
        self.capabilities.push(CapabilityProvider {
            info,
            cast: Box::new(move |instance: &Instance| {
                Arc::clone(instance)
                    .downcast::<T>()
                    .ok()
                    .map(|value| Arc::new(cast(value)) as Instance)
            }),
        });
        self
    }

    /// 声明构造函数
    pub fn constructor<R>(&mut self, constructor: fn(&T) -> R) -> &mut Self
    where
        R: ConstructorReturn + 'static,
    {
        self.constructor = Some(Box::new(move |template: &T| constructor(template).into_values()));
        self
    }
}

impl<T: Component> Default for ComponentDefinition<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn placeholder_shell<D: Component>(name: &str) -> Box<dyn ComponentShell> {
    Box::new(TypedShell::new(name, D::default()))
}

/// 依赖图中的组件节点（类型擦除）
pub trait ComponentShell: Send + Sync {
    /// 节点名称
    fn name(&self) -> &str;

    /// 具体类型信息
    fn type_info(&self) -> &TypeInfo;

    /// 按声明顺序排列的依赖字段
    fn fields(&self) -> &[DependencyField];

    /// 提供的能力
    fn capabilities(&self) -> Vec<&TypeInfo>;

    /// 是否满足指定能力
    fn implements(&self, capability: TypeId) -> bool;

    /// 把本组件的实例转换为指定能力
    fn cast_to(&self, capability: TypeId, instance: &Instance) -> Option<Instance>;

    /// 是否声明了构造函数
    fn has_constructor(&self) -> bool;

    /// 校验字段声明
    fn validate(&self) -> Result<(), ValidationError>;

    /// 把已解析的依赖写入第 `index` 个字段，类型不匹配时返回 `false`
    fn inject(&mut self, index: usize, instance: &Instance) -> bool;

    /// 调用构造函数（或直接取出模板），产出最终实例
    fn construct(&mut self) -> DependencyResult<(Instance, String)>;

    /// 组件元数据
    fn metadata(&self) -> ComponentMetadata {
        ComponentMetadata {
            name: self.name().to_string(),
            type_name: self.type_info().name.clone(),
            dependencies: self.fields().iter().map(DependencyField::metadata).collect(),
            capabilities: self.capabilities().into_iter().map(|c| c.name.clone()).collect(),
            has_constructor: self.has_constructor(),
            auto_registered: false,
            resolved: false,
        }
    }
}

/// 持有模板值的组件节点
pub struct TypedShell<T: Component> {
    name: String,
    type_info: TypeInfo,
    template: Option<T>,
    fields: Vec<DependencyField>,
    setters: Vec<Option<Setter<T>>>,
    capabilities: Vec<CapabilityProvider>,
    constructor: Option<Constructor<T>>,
}

impl<T: Component> TypedShell<T> {
    /// 以 `name` 为节点名称包装模板值
    pub fn new(name: impl Into<String>, template: T) -> Self {
        let mut definition = ComponentDefinition::new();
        T::describe(&mut definition);

        Self {
            name: name.into(),
            type_info: TypeInfo::of::<T>(),
            template: Some(template),
            fields: definition.fields,
            setters: definition.setters,
            capabilities: definition.capabilities,
            constructor: definition.constructor,
        }
    }
}

impl<T: Component> ComponentShell for TypedShell<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_info(&self) -> &TypeInfo {
        &self.type_info
    }

    fn fields(&self) -> &[DependencyField] {
        &self.fields
    }

    fn capabilities(&self) -> Vec<&TypeInfo> {
        self.capabilities.iter().map(|c| &c.info).collect()
    }

    fn implements(&self, capability: TypeId) -> bool {
        self.capabilities.iter().any(|c| c.info.id == capability)
    }

    fn cast_to(&self, capability: TypeId, instance: &Instance) -> Option<Instance> {
        self.capabilities
            .iter()
            .find(|c| c.info.id == capability)
            .and_then(|c| (c.cast)(instance))
    }

    fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self
            .fields
            .iter()
            .find(|f| f.kind == DependencyKind::Unsupported)
        {
            Some(field) => Err(ValidationError::UnsupportedFieldType {
                component: self.name.clone(),
                field: field.field.to_string(),
                declared: field.declared_type.clone(),
            }),
            None => Ok(()),
        }
    }

    fn inject(&mut self, index: usize, instance: &Instance) -> bool {
        match (self.template.as_mut(), self.setters.get(index)) {
            (Some(template), Some(Some(setter))) => setter(template, instance),
            _ => false,
        }
    }

    fn construct(&mut self) -> DependencyResult<(Instance, String)> {
        let Some(constructor) = &self.constructor else {
            return match self.template.take() {
                Some(template) => Ok((Arc::new(template), self.type_info.name.clone())),
                None => Err(DependencyError::ConstructorFault {
                    component: self.name.clone(),
                    message: "模板已被消费".to_string(),
                }),
            };
        };
        let Some(template) = &self.template else {
            return Err(DependencyError::ConstructorFault {
                component: self.name.clone(),
                message: "模板已被消费".to_string(),
            });
        };

        debug!("调用构造函数: {}", self.name);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| constructor(template)));
        let values = match outcome {
            Ok(Ok(values)) => values,
            Ok(Err(message)) => {
                error!("构造函数返回错误: {} - {}", self.name, message);
                return Err(DependencyError::ConstructorFault {
                    component: self.name.clone(),
                    message,
                });
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!("构造函数发生 panic: {} - {}", self.name, message);
                return Err(DependencyError::ConstructorFault {
                    component: self.name.clone(),
                    message,
                });
            }
        };

        let [value] = <[Constructed; 1]>::try_from(values).map_err(|values| {
            DependencyError::ConstructorArity {
                component: self.name.clone(),
                expected: 1,
                actual: values.len(),
            }
        })?;
        if !value.instance.is::<T>() {
            return Err(DependencyError::TypeMismatch {
                dependency: self.name.clone(),
                expected: self.type_info.name.clone(),
                actual: value.type_name.to_string(),
            });
        }

        self.template = None;
        Ok((value.instance, value.type_name.to_string()))
    }
}

/// 提取 panic 负载中的消息
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "未知 panic".to_string()
    }
}
