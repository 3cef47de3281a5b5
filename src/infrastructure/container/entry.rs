use super::factory::{Factory, Registration, Service};
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// 懒加载工厂的单例槽位；同一次注册的所有并发解析共享它
pub(crate) type SingletonCell = Arc<OnceCell<Service>>;

/// 条目状态，对外只读
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// 普通值，永远原样返回
    Value,
    /// 尚未解析的懒加载工厂
    Unresolved,
    /// 已解析的单例，键被冻结
    Resolved,
    /// 每次访问都重新调用的工厂
    ForceNew,
}

/// 每个键的状态机：
/// `Unresolved -> Resolved`，`ForceNew` 与 `Value` 保持不变，
/// `remove` 使任意状态回到未注册。
#[derive(Clone)]
pub(crate) enum EntryState {
    Value {
        value: Service,
        type_name: &'static str,
    },
    Unresolved {
        factory: Factory,
        cell: SingletonCell,
    },
    Resolved {
        value: Service,
        type_name: &'static str,
    },
    ForceNew(Factory),
}

impl EntryState {
    pub(crate) fn is_frozen(&self) -> bool {
        matches!(self, EntryState::Resolved { .. })
    }

    pub(crate) fn status(&self) -> EntryStatus {
        match self {
            EntryState::Value { .. } => EntryStatus::Value,
            EntryState::Unresolved { .. } => EntryStatus::Unresolved,
            EntryState::Resolved { .. } => EntryStatus::Resolved,
            EntryState::ForceNew(_) => EntryStatus::ForceNew,
        }
    }

    /// `output` 使用的原始视图：已解析则为输出，否则为存储的注册项
    pub(crate) fn to_registration(&self) -> Registration {
        match self {
            EntryState::Value { value, type_name } | EntryState::Resolved { value, type_name } => {
                Registration::Value {
                    value: value.clone(),
                    type_name: *type_name,
                }
            }
            EntryState::Unresolved { factory, .. } | EntryState::ForceNew(factory) => {
                Registration::Factory(factory.clone())
            }
        }
    }
}

impl From<Registration> for EntryState {
    fn from(registration: Registration) -> Self {
        match registration {
            Registration::Value { value, type_name } => EntryState::Value { value, type_name },
            Registration::Factory(factory) if factory.is_force_new() => EntryState::ForceNew(factory),
            Registration::Factory(factory) => EntryState::Unresolved {
                factory,
                cell: Arc::new(OnceCell::new()),
            },
        }
    }
}
