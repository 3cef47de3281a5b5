use thiserror::Error;

/// 工厂函数返回的错误类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 容器错误
#[derive(Debug, Error)]
pub enum ContainerError {
    /// 键未注册
    #[error("key \"{key}\" is not registered")]
    NotFound { key: String },

    /// 键已被解析并冻结，禁止覆盖
    #[error("cannot assign to key \"{key}\": it has already been resolved and is frozen")]
    FrozenKey { key: String },

    /// 非工厂值不能标记为 force-new；能渲染的值显示值本身，否则显示类型名
    #[error("\"{}\" is not instantiable", value.as_deref().unwrap_or(*type_name))]
    NotInstantiable {
        type_name: &'static str,
        value: Option<String>,
    },

    /// 类型转换失败
    #[error("type mismatch for key \"{key}\": expected {expected}")]
    TypeMismatch { key: String, expected: &'static str },

    /// 循环依赖检测
    #[error("circular dependency detected: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("resolution of key \"{key}\" exceeded the maximum depth of {depth}")]
    ResolutionDepthExceeded { key: String, depth: usize },

    /// 工厂自身返回的错误，原样保留在 source 中
    #[error("factory for key \"{key}\" failed: {source}")]
    Factory {
        key: String,
        #[source]
        source: BoxError,
    },
}

impl ContainerError {
    /// 出错的键（如果有）
    pub fn key(&self) -> Option<&str> {
        match self {
            ContainerError::NotFound { key }
            | ContainerError::FrozenKey { key }
            | ContainerError::TypeMismatch { key, .. }
            | ContainerError::ResolutionDepthExceeded { key, .. }
            | ContainerError::Factory { key, .. } => Some(key.as_str()),
            ContainerError::CircularDependency { chain } => chain.last().map(String::as_str),
            ContainerError::NotInstantiable { .. } => None,
        }
    }

    /// 取出工厂返回的原始错误；其他错误原样返回
    pub fn into_factory_error(self) -> Result<BoxError, Self> {
        match self {
            ContainerError::Factory { source, .. } => Ok(source),
            other => Err(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read file '{0}': {1}")]
    FileRead(String, #[source] std::io::Error),
    #[error("Failed to parse TOML from file '{0}': {1}")]
    TomlParse(String, #[source] toml::de::Error),
    #[error("Invalid value '{value}' for environment variable {name}")]
    InvalidEnv { name: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ContainerError::NotFound {
            key: "doesNotExist".to_string(),
        };
        assert_eq!(format!("{}", err), "key \"doesNotExist\" is not registered");
        assert_eq!(err.key(), Some("doesNotExist"));
    }

    #[test]
    fn test_not_instantiable_message() {
        let err = ContainerError::NotInstantiable {
            type_name: "&str",
            value: Some("Hello".to_string()),
        };
        assert_eq!(format!("{}", err), "\"Hello\" is not instantiable");
        assert_eq!(err.key(), None);

        let err = ContainerError::NotInstantiable {
            type_name: "app::Mailer",
            value: None,
        };
        assert_eq!(format!("{}", err), "\"app::Mailer\" is not instantiable");
    }

    #[test]
    fn test_circular_dependency_message() {
        let err = ContainerError::CircularDependency {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(format!("{}", err), "circular dependency detected: a -> b -> a");
    }

    #[test]
    fn test_factory_error_is_preserved() {
        let err = ContainerError::Factory {
            key: "db".to_string(),
            source: "connection refused".into(),
        };
        assert!(std::error::Error::source(&err).is_some());
        let source = err.into_factory_error().unwrap();
        assert_eq!(source.to_string(), "connection refused");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidEnv {
            name: "SVC_LOCATOR_MAX_DEPTH".to_string(),
            value: "lots".to_string(),
        };
        assert_eq!(
            format!("{}", err),
            "Invalid value 'lots' for environment variable SVC_LOCATOR_MAX_DEPTH"
        );
    }
}
