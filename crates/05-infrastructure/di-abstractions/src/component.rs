//! 组件基础接口定义
//!
//! 组件通过 [`Component::describe`] 声明依赖字段、提供的能力和构造函数，
//! 容器据此构建依赖图，不依赖运行时反射。

use crate::descriptor::ComponentDefinition;
use di_common::qualified_name;
use std::any::Any;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// 类型擦除后的组件实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 组件基础 trait
///
/// 一般通过 `#[derive(Component)]` 实现。`Default` 提供零值模板，
/// 用于自动注册未显式注册的具体类型依赖。
pub trait Component: Default + fmt::Debug + Send + Sync + 'static {
    /// 组件的限定名称，即依赖图中的键
    fn component_name() -> String {
        qualified_name::<Self>()
    }

    /// 按字段声明顺序描述依赖、能力和构造函数
    fn describe(definition: &mut ComponentDefinition<Self>);
}

/// 依赖字段槽位
///
/// `Dep<T>` 表示具体类型依赖，`Dep<dyn Trait>` 表示抽象能力依赖。
/// 注入前为空，注入后可以像 `Arc<T>` 一样解引用。
pub struct Dep<T: ?Sized>(Option<Arc<T>>);

impl<T: ?Sized> Dep<T> {
    /// 创建空槽位
    pub const fn empty() -> Self {
        Self(None)
    }

    /// 获取已注入的实例
    pub fn get(&self) -> Option<&Arc<T>> {
        self.0.as_ref()
    }

    /// 是否已注入
    pub fn is_injected(&self) -> bool {
        self.0.is_some()
    }

    /// 注入实例
    pub fn set(&mut self, value: Arc<T>) {
        self.0 = Some(value);
    }
}

impl<T: ?Sized> Default for Dep<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> Clone for Dep<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: ?Sized> Deref for Dep<T> {
    type Target = T;

    /// # Panics
    ///
    /// 槽位尚未注入时 panic。
    fn deref(&self) -> &T {
        match &self.0 {
            Some(value) => value,
            None => panic!("依赖 '{}' 尚未注入", std::any::type_name::<T>()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Dep<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.0.is_some() { "injected" } else { "empty" };
        f.debug_tuple("Dep")
            .field(&std::any::type_name::<T>())
            .field(&state)
            .finish()
    }
}

/// 构造函数产出的单个值
pub struct Constructed {
    /// 实例
    pub instance: Instance,
    /// 实例的具体类型名称
    pub type_name: &'static str,
}

impl Constructed {
    /// 包装一个组件实例
    pub fn of<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            instance: value,
            type_name: std::any::type_name::<T>(),
        }
    }
}

/// 构造函数返回值
///
/// 返回值被展开为产出值列表，容器要求恰好一个；`Err` 表示构造失败。
pub type ConstructorValues = Result<Vec<Constructed>, String>;

/// 可作为构造函数返回类型的类型
///
/// 组件类型自身的实现由 `#[derive(Component)]` 生成。
pub trait ConstructorReturn {
    /// 展开为产出值列表
    fn into_values(self) -> ConstructorValues;
}

impl<T: Component> ConstructorReturn for Arc<T> {
    fn into_values(self) -> ConstructorValues {
        Ok(vec![Constructed::of(self)])
    }
}

impl<T: Component> ConstructorReturn for Box<T> {
    fn into_values(self) -> ConstructorValues {
        Ok(vec![Constructed::of(Arc::<T>::from(self))])
    }
}

impl ConstructorReturn for () {
    fn into_values(self) -> ConstructorValues {
        Ok(Vec::new())
    }
}

impl<A: ConstructorReturn, B: ConstructorReturn> ConstructorReturn for (A, B) {
    fn into_values(self) -> ConstructorValues {
        let mut values = self.0.into_values()?;
        values.extend(self.1.into_values()?);
        Ok(values)
    }
}

impl<A: ConstructorReturn, B: ConstructorReturn, C: ConstructorReturn> ConstructorReturn
    for (A, B, C)
{
    fn into_values(self) -> ConstructorValues {
        let mut values = self.0.into_values()?;
        values.extend(self.1.into_values()?);
        values.extend(self.2.into_values()?);
        Ok(values)
    }
}

impl<R: ConstructorReturn, E: fmt::Display> ConstructorReturn for Result<R, E> {
    fn into_values(self) -> ConstructorValues {
        self.map_err(|e| e.to_string())?.into_values()
    }
}
