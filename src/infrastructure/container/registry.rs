//! 服务容器实现
//!
//! 键值注册表，可以保存普通值、工厂和预先构建的对象：
//! - 懒加载工厂在首次 `get` 时调用一次，结果被缓存并冻结该键
//! - force-new 工厂每次 `get` 都重新调用
//! - `output` 返回原始注册项，不会触发调用
//!
//! 调用工厂时不持有任何内部锁，工厂可以通过传入的容器解析其他键。

use super::entry::{EntryState, EntryStatus, SingletonCell};
use super::factory::{Factory, Registration, Service};
use super::resolution::ResolutionGuard;
use super::stats::{ContainerStats, InnerStats};
use crate::config::ContainerConfig;
use crate::errors::{BoxError, ContainerError};
use crate::logging::OperationTimer;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

/// 服务容器；克隆后共享同一份注册表
#[derive(Clone)]
pub struct ServiceContainer {
    /// 键 -> 条目状态
    entries: Arc<DashMap<String, EntryState>>,
    config: Arc<ContainerConfig>,
    id: Uuid,
    stats: Arc<InnerStats>,
}

impl ServiceContainer {
    /// 创建新的容器实例
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            config: Arc::new(config),
            id: Uuid::new_v4(),
            stats: Arc::new(InnerStats::default()),
        }
    }

    /// 注册值或工厂
    ///
    /// 已冻结（工厂已被解析）的键返回 [`ContainerError::FrozenKey`]；
    /// 其他键（包括已注册但未冻结的）总是被覆盖。
    pub fn set(
        &self,
        key: impl Into<String>,
        registration: impl Into<Registration>,
    ) -> Result<(), ContainerError> {
        let key = key.into();
        let state = EntryState::from(registration.into());
        let status = state.status();

        // 被替换的条目在释放分片锁之后才 drop
        let _previous = match self.entries.entry(key) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_frozen() {
                    warn!(key = %occupied.key(), "Rejected assignment to frozen key");
                    return Err(ContainerError::FrozenKey {
                        key: occupied.key().clone(),
                    });
                }
                debug!(key = %occupied.key(), status = ?status, "Entry replaced");
                Some(occupied.insert(state))
            }
            Entry::Vacant(vacant) => {
                debug!(key = %vacant.key(), status = ?status, "Entry registered");
                vacant.insert(state);
                None
            }
        };

        Ok(())
    }

    /// 注册普通值，`get` 原样返回
    pub fn set_value<T: Send + Sync + 'static>(
        &self,
        key: impl Into<String>,
        value: T,
    ) -> Result<(), ContainerError> {
        self.set(key, Registration::value(value))
    }

    /// 注册懒加载工厂
    pub fn set_factory<T, F>(&self, key: impl Into<String>, factory_fn: F) -> Result<(), ContainerError>
    where
        F: Fn(&ServiceContainer) -> T + Send + Sync + 'static,
        T: Send + Sync + 'static,
    {
        self.set(key, Factory::new(factory_fn))
    }

    /// 注册可能失败的懒加载工厂
    pub fn set_fallible<T, E, F>(
        &self,
        key: impl Into<String>,
        factory_fn: F,
    ) -> Result<(), ContainerError>
    where
        F: Fn(&ServiceContainer) -> Result<T, E> + Send + Sync + 'static,
        E: Into<BoxError>,
        T: Send + Sync + 'static,
    {
        self.set(key, Factory::try_new(factory_fn))
    }

    /// 解析键
    ///
    /// 1. 未注册返回 [`ContainerError::NotFound`]
    /// 2. 普通值或已解析的单例原样返回
    /// 3. force-new 工厂每次调用，不改变状态
    /// 4. 懒加载工厂调用一次，结果替换条目并冻结该键
    ///
    /// 工厂失败时条目保持原状，下次 `get` 会重试。
    pub fn get(&self, key: &str) -> Result<Service, ContainerError> {
        self.stats.record_resolution();

        let state = match self.entries.get(key) {
            Some(entry) => entry.value().clone(),
            None => {
                self.stats.record_failure();
                return Err(ContainerError::NotFound {
                    key: key.to_string(),
                });
            }
        };

        match state {
            EntryState::Value { value, .. } | EntryState::Resolved { value, .. } => {
                self.stats.record_hit();
                trace!(key, "Returning stored value");
                Ok(value)
            }
            EntryState::ForceNew(factory) => {
                let _guard = self.enter_resolution(key)?;
                let value = self.call_factory(key, &factory)?;
                self.stats.record_transient();
                debug!(key, type_name = factory.type_name(), "Created force-new instance");
                Ok(value)
            }
            EntryState::Unresolved { factory, cell } => self.resolve_singleton(key, factory, cell),
        }
    }

    /// 解析并向下转型
    pub fn get_as<T: Send + Sync + 'static>(&self, key: &str) -> Result<Arc<T>, ContainerError> {
        self.get(key)?
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
            })
    }

    /// 返回原始注册项：已解析则为缓存的输出，否则为存储的值或工厂。
    /// 从不调用工厂。
    pub fn output(&self, key: &str) -> Result<Registration, ContainerError> {
        self.entries
            .get(key)
            .map(|entry| entry.value().to_registration())
            .ok_or_else(|| ContainerError::NotFound {
                key: key.to_string(),
            })
    }

    /// 检查键是否已注册
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// 删除键及其冻结、缓存和 force-new 状态；返回是否存在
    pub fn remove(&self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some((key, state)) => {
                debug!(key = %key, status = ?state.status(), "Entry removed");
                true
            }
            None => false,
        }
    }

    /// 将工厂标记为每次访问都重新实例化
    ///
    /// 返回同一个工厂，便于写成 `container.set(key, container.force_new(factory)?)`。
    /// 普通值返回 [`ContainerError::NotInstantiable`]。
    pub fn force_new(
        &self,
        registration: impl Into<Registration>,
    ) -> Result<Registration, ContainerError> {
        match registration.into() {
            Registration::Factory(factory) => {
                trace!(type_name = factory.type_name(), "Factory marked force-new");
                Ok(Registration::Factory(factory.into_force_new()))
            }
            Registration::Value { value, type_name } => Err(ContainerError::NotInstantiable {
                type_name,
                value: render_value(&value),
            }),
        }
    }

    /// 键是否已被解析并冻结
    pub fn is_frozen(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| entry.value().is_frozen())
            .unwrap_or(false)
    }

    pub fn status(&self, key: &str) -> Option<EntryStatus> {
        self.entries.get(key).map(|entry| entry.value().status())
    }

    /// 已注册的键（排序后）
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|entry| entry.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 获取容器统计信息
    pub fn stats(&self) -> ContainerStats {
        self.stats.snapshot()
    }

    /// 首次解析懒加载工厂
    ///
    /// 同一次注册的并发调用者共享一个 `OnceCell`：只有一个调用者执行工厂，
    /// 其余调用者阻塞等待并拿到同一个实例。工厂失败时槽位保持为空，可以重试。
    /// 循环依赖在进入槽位之前检测，同线程重入不会死锁。
    fn resolve_singleton(
        &self,
        key: &str,
        factory: Factory,
        cell: SingletonCell,
    ) -> Result<Service, ContainerError> {
        let _guard = self.enter_resolution(key)?;

        let mut created = false;
        let value = cell
            .get_or_try_init(|| {
                created = true;
                self.call_factory(key, &factory)
            })?
            .clone();

        if created {
            self.stats.record_singleton();
        } else {
            self.stats.record_hit();
        }

        let Some(mut entry) = self.entries.get_mut(key) else {
            debug!(key, "Entry removed during resolution; result not cached");
            return Ok(value);
        };

        match entry.value() {
            EntryState::Unresolved { cell: current, .. } if Arc::ptr_eq(current, &cell) => {}
            EntryState::Resolved { .. } => return Ok(value),
            _ => {
                debug!(key, "Entry replaced during resolution; result not cached");
                return Ok(value);
            }
        }

        *entry.value_mut() = EntryState::Resolved {
            value: value.clone(),
            type_name: factory.type_name(),
        };
        debug!(key, type_name = factory.type_name(), "Resolved singleton; key frozen");

        Ok(value)
    }

    fn enter_resolution(&self, key: &str) -> Result<ResolutionGuard, ContainerError> {
        ResolutionGuard::enter(self.id, key, &self.config).map_err(|err| {
            self.stats.record_failure();
            warn!(key, error = %err, "Resolution rejected");
            err
        })
    }

    fn call_factory(&self, key: &str, factory: &Factory) -> Result<Service, ContainerError> {
        let timer = OperationTimer::new("factory_invocation")
            .with_metadata("key", key)
            .with_metadata("type_name", factory.type_name());
        let result = factory.call(self);
        timer.finish();

        result.map_err(|source| {
            self.stats.record_failure();
            // 嵌套解析错误原样返回
            match source.downcast::<ContainerError>() {
                Ok(nested) => *nested,
                Err(source) => {
                    debug!(key, error = %source, "Factory failed; entry left unresolved");
                    ContainerError::Factory {
                        key: key.to_string(),
                        source,
                    }
                }
            }
        })
    }
}

/// 渲染常见的标量值，用于错误信息
fn render_value(value: &Service) -> Option<String> {
    macro_rules! render {
        ($($ty:ty),*) => {
            $(
                if let Some(v) = value.downcast_ref::<$ty>() {
                    return Some(v.to_string());
                }
            )*
        };
    }
    render!(&'static str, String, bool, char, i32, i64, u32, u64, usize, f64);
    None
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("id", &self.id)
            .field("entries", &self.entries.len())
            .finish()
    }
}
