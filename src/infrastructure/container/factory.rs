//! 注册输入类型
//!
//! 一个注册项要么是普通值（数据或预先构建的对象），要么是工厂。
//! 是否可调用在注册时就由变体决定，无需运行时探测。

use super::ServiceContainer;
use crate::errors::BoxError;
use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

/// 容器中存取的服务值
pub type Service = Arc<dyn Any + Send + Sync>;

type FactoryFn = dyn Fn(&ServiceContainer) -> Result<Service, BoxError> + Send + Sync;

/// 服务工厂，以容器作为唯一参数调用
#[derive(Clone)]
pub struct Factory {
    factory_fn: Arc<FactoryFn>,
    type_name: &'static str,
    force_new: bool,
}

impl Factory {
    /// 创建不会失败的工厂
    pub fn new<T, F>(factory_fn: F) -> Self
    where
        F: Fn(&ServiceContainer) -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Self::try_new(move |container: &ServiceContainer| Ok::<T, BoxError>(factory_fn(container)))
    }

    /// 创建可能失败的工厂；错误原样交给调用者
    pub fn try_new<T, E, F>(factory_fn: F) -> Self
    where
        F: Fn(&ServiceContainer) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
        T: Send + Sync + 'static,
    {
        Self {
            factory_fn: Arc::new(move |container: &ServiceContainer| -> Result<Service, BoxError> {
                factory_fn(container)
                    .map(|service| Arc::new(service) as Service)
                    .map_err(Into::into)
            }),
            type_name: type_name::<T>(),
            force_new: false,
        }
    }

    /// 直接调用工厂，不经过任何缓存
    pub fn call(&self, container: &ServiceContainer) -> Result<Service, BoxError> {
        (self.factory_fn)(container)
    }

    /// 是否每次访问都重新实例化
    pub fn is_force_new(&self) -> bool {
        self.force_new
    }

    /// 产出值的类型名称
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub(crate) fn into_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("type_name", &self.type_name)
            .field("force_new", &self.force_new)
            .finish()
    }
}

/// 传给 `set` 的注册项，也是 `output` 的返回值
#[derive(Clone)]
pub enum Registration {
    /// 普通值或预先构建的对象，原样返回
    Value {
        value: Service,
        type_name: &'static str,
    },
    /// 工厂，首次 `get` 时被调用
    Factory(Factory),
}

impl Registration {
    pub fn value<T: Send + Sync + 'static>(value: T) -> Self {
        Registration::Value {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// 注册已共享的实例，保留其身份
    pub fn shared<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Registration::Value {
            value,
            type_name: type_name::<T>(),
        }
    }

    pub fn factory<T, F>(factory_fn: F) -> Self
    where
        F: Fn(&ServiceContainer) -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        Registration::Factory(Factory::new(factory_fn))
    }

    /// 是否为可调用的工厂
    pub fn is_invokable(&self) -> bool {
        matches!(self, Registration::Factory(_))
    }

    pub fn as_value(&self) -> Option<&Service> {
        match self {
            Registration::Value { value, .. } => Some(value),
            Registration::Factory(_) => None,
        }
    }

    pub fn as_factory(&self) -> Option<&Factory> {
        match self {
            Registration::Factory(factory) => Some(factory),
            Registration::Value { .. } => None,
        }
    }

    /// 将值向下转型；工厂返回 `None`
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.as_value()
            .and_then(|value| value.clone().downcast::<T>().ok())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Registration::Value { type_name, .. } => *type_name,
            Registration::Factory(factory) => factory.type_name(),
        }
    }
}

impl From<Factory> for Registration {
    fn from(factory: Factory) -> Self {
        Registration::Factory(factory)
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Registration::Value { type_name, .. } => {
                f.debug_struct("Value").field("type_name", type_name).finish()
            }
            Registration::Factory(factory) => f.debug_tuple("Factory").field(factory).finish(),
        }
    }
}
