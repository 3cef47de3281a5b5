//! 循环依赖检测
//!
//! 每个线程维护一个正在解析的 `(容器ID, 键)` 栈。工厂通过容器解析
//! 其他键时入栈，返回（包括 panic）时出栈。

use crate::config::ContainerConfig;
use crate::errors::ContainerError;
use std::cell::RefCell;
use uuid::Uuid;

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<(Uuid, String)>> = const { RefCell::new(Vec::new()) };
}

/// 解析栈帧，drop 时出栈
#[derive(Debug)]
pub(crate) struct ResolutionGuard {
    _private: (),
}

impl ResolutionGuard {
    pub(crate) fn enter(
        container_id: Uuid,
        key: &str,
        config: &ContainerConfig,
    ) -> Result<Self, ContainerError> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            let frames: Vec<&str> = stack
                .iter()
                .filter(|(id, _)| *id == container_id)
                .map(|(_, frame_key)| frame_key.as_str())
                .collect();

            if config.detect_cycles && frames.contains(&key) {
                let chain = frames
                    .iter()
                    .map(|frame| frame.to_string())
                    .chain(std::iter::once(key.to_string()))
                    .collect();
                return Err(ContainerError::CircularDependency { chain });
            }

            if config.max_resolution_depth > 0 && frames.len() >= config.max_resolution_depth {
                return Err(ContainerError::ResolutionDepthExceeded {
                    key: key.to_string(),
                    depth: config.max_resolution_depth,
                });
            }

            stack.push((container_id, key.to_string()));
            Ok(Self { _private: () })
        })
    }

    /// 当前线程的解析深度（所有容器）
    #[cfg(test)]
    pub(crate) fn depth() -> usize {
        RESOLUTION_STACK.with(|stack| stack.borrow().len())
    }
}

impl Drop for ResolutionGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_pops_on_drop() {
        let config = ContainerConfig::default();
        let id = Uuid::new_v4();
        {
            let _outer = ResolutionGuard::enter(id, "a", &config).unwrap();
            let _inner = ResolutionGuard::enter(id, "b", &config).unwrap();
            assert_eq!(ResolutionGuard::depth(), 2);
        }
        assert_eq!(ResolutionGuard::depth(), 0);
    }

    #[test]
    fn test_cycle_reports_chain() {
        let config = ContainerConfig::default();
        let id = Uuid::new_v4();
        let _a = ResolutionGuard::enter(id, "a", &config).unwrap();
        let _b = ResolutionGuard::enter(id, "b", &config).unwrap();

        let err = ResolutionGuard::enter(id, "a", &config).unwrap_err();

        match err {
            ContainerError::CircularDependency { chain } => assert_eq!(chain, vec!["a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_same_key_in_other_container_is_not_a_cycle() {
        let config = ContainerConfig::default();
        let _outer = ResolutionGuard::enter(Uuid::new_v4(), "db", &config).unwrap();

        assert!(ResolutionGuard::enter(Uuid::new_v4(), "db", &config).is_ok());
    }

    #[test]
    fn test_depth_limit() {
        let config = ContainerConfig {
            max_resolution_depth: 2,
            ..ContainerConfig::default()
        };
        let id = Uuid::new_v4();
        let _a = ResolutionGuard::enter(id, "a", &config).unwrap();
        let _b = ResolutionGuard::enter(id, "b", &config).unwrap();

        let err = ResolutionGuard::enter(id, "c", &config).unwrap_err();

        assert!(matches!(
            err,
            ContainerError::ResolutionDepthExceeded { depth: 2, .. }
        ));
    }

    #[test]
    fn test_cycle_detection_can_be_disabled() {
        let config = ContainerConfig {
            detect_cycles: false,
            ..ContainerConfig::default()
        };
        let id = Uuid::new_v4();
        let _a = ResolutionGuard::enter(id, "a", &config).unwrap();

        assert!(ResolutionGuard::enter(id, "a", &config).is_ok());
    }
}
