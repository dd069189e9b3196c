//! Hook Registry
//!
//! Per-service list of callbacks for each stage, and the wrapper that runs
//! an operation between them.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

use super::types::{HookCallback, HookContext, HookResult, HookStage};

// ============================================================================
// Hook Registry
// ============================================================================

/// Registered lifecycle callbacks for one service
#[derive(Clone)]
pub struct HookRegistry {
    inner: Arc<HookRegistryInner>,
}

struct HookRegistryInner {
    /// Component name recorded in every context
    component: String,

    before: RwLock<Vec<HookCallback>>,
    after: RwLock<Vec<HookCallback>>,
    error: RwLock<Vec<HookCallback>>,
}

impl HookRegistry {
    /// Create an empty registry for a component
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(HookRegistryInner {
                component: component.into(),
                before: RwLock::new(Vec::new()),
                after: RwLock::new(Vec::new()),
                error: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Component name
    pub fn component(&self) -> &str {
        &self.inner.component
    }

    fn stage_list(&self, stage: HookStage) -> &RwLock<Vec<HookCallback>> {
        match stage {
            HookStage::Before => &self.inner.before,
            HookStage::After => &self.inner.after,
            HookStage::Error => &self.inner.error,
        }
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Append a callback to a stage; callbacks run in registration order
    pub fn register(&self, stage: HookStage, callback: HookCallback) {
        self.stage_list(stage).write().push(callback);
    }

    pub fn on_before<F>(&self, f: F)
    where
        F: Fn(&HookContext) -> HookResult + Send + Sync + 'static,
    {
        self.register(HookStage::Before, HookCallback::sync(f));
    }

    pub fn on_after<F>(&self, f: F)
    where
        F: Fn(&HookContext) -> HookResult + Send + Sync + 'static,
    {
        self.register(HookStage::After, HookCallback::sync(f));
    }

    pub fn on_error<F>(&self, f: F)
    where
        F: Fn(&HookContext) -> HookResult + Send + Sync + 'static,
    {
        self.register(HookStage::Error, HookCallback::sync(f));
    }

    /// Number of callbacks registered for a stage
    pub fn len(&self, stage: HookStage) -> usize {
        self.stage_list(stage).read().len()
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Run every callback of a stage; failures are logged and dropped
    async fn trigger(&self, stage: HookStage, ctx: &HookContext) {
        // Snapshot so no lock is held across an await
        let callbacks: Vec<HookCallback> = self.stage_list(stage).read().clone();

        for (index, callback) in callbacks.iter().enumerate() {
            if let Err(e) = callback.invoke(ctx).await {
                tracing::error!(
                    component = %ctx.component,
                    operation = %ctx.operation,
                    stage = %stage,
                    hook_index = index,
                    "Error executing hook: {:#}",
                    e
                );
            }
        }
    }

    /// Run `operation` wrapped in this registry's hooks.
    ///
    /// `before` hooks run first, then the operation. On success the `after`
    /// hooks see the serialized result; on failure the `error` hooks see the
    /// error message and the original error is returned unchanged.
    pub async fn run<T, E, Fut>(&self, operation: &str, arguments: Value, fut: Fut) -> Result<T, E>
    where
        Fut: Future<Output = Result<T, E>>,
        T: Serialize,
        E: Display,
    {
        let mut ctx = HookContext::new(self.component(), operation, arguments);

        self.trigger(HookStage::Before, &ctx).await;

        match fut.await {
            Ok(result) => {
                ctx.result = Some(serde_json::to_value(&result).unwrap_or(Value::Null));
                self.trigger(HookStage::After, &ctx).await;
                Ok(result)
            }
            Err(e) => {
                ctx.error = Some(e.to_string());
                self.trigger(HookStage::Error, &ctx).await;
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("component", &self.inner.component)
            .field("before", &self.len(HookStage::Before))
            .field("after", &self.len(HookStage::After))
            .field("error", &self.len(HookStage::Error))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    #[tokio::test]
    async fn test_hooks_run_in_stage_and_registration_order() {
        let hooks = HookRegistry::new("TestService");
        let log = recorder();

        for name in ["before-1", "before-2"] {
            let log = log.clone();
            hooks.on_before(move |_| {
                log.lock().push(name.to_string());
                Ok(())
            });
        }
        let after_log = log.clone();
        hooks.on_after(move |_| {
            after_log.lock().push("after".to_string());
            Ok(())
        });

        let op_log = log.clone();
        let result: Result<u32, String> = hooks
            .run("work", json!({}), async move {
                op_log.lock().push("operation".to_string());
                Ok(7)
            })
            .await;

        assert_eq!(result, Ok(7));
        assert_eq!(*log.lock(), vec!["before-1", "before-2", "operation", "after"]);
    }

    #[tokio::test]
    async fn test_after_hook_sees_result_and_arguments() {
        let hooks = HookRegistry::new("TestService");
        let seen = Arc::new(Mutex::new(None::<HookContext>));

        let slot = seen.clone();
        hooks.on_after(move |ctx| {
            *slot.lock() = Some(ctx.clone());
            Ok(())
        });

        let _: Result<String, String> = hooks
            .run("get", json!({ "key": "abc" }), async { Ok("value".to_string()) })
            .await;

        let ctx = seen.lock().clone().unwrap();
        assert_eq!(ctx.component, "TestService");
        assert_eq!(ctx.operation, "get");
        assert_eq!(ctx.arguments, json!({ "key": "abc" }));
        assert_eq!(ctx.result, Some(json!("value")));
        assert!(ctx.error.is_none());
    }

    #[tokio::test]
    async fn test_error_hooks_run_and_original_error_is_returned() {
        let hooks = HookRegistry::new("TestService");
        let log = recorder();

        let error_log = log.clone();
        hooks.on_error(move |ctx| {
            error_log.lock().push(ctx.error.clone().unwrap_or_default());
            Ok(())
        });
        let after_log = log.clone();
        hooks.on_after(move |_| {
            after_log.lock().push("after".to_string());
            Ok(())
        });

        let result: Result<(), String> = hooks
            .run("fail", json!(null), async { Err("boom".to_string()) })
            .await;

        assert_eq!(result, Err("boom".to_string()));
        assert_eq!(*log.lock(), vec!["boom"]);
    }

    #[tokio::test]
    async fn test_failing_hooks_are_swallowed() {
        let hooks = HookRegistry::new("TestService");
        let log = recorder();

        hooks.on_before(|_| Err(anyhow::anyhow!("hook failure")));
        hooks.on_before(|_| panic!("hook panic"));
        let later = log.clone();
        hooks.on_before(move |_| {
            later.lock().push("still runs".to_string());
            Ok(())
        });
        hooks.register(
            HookStage::After,
            HookCallback::from_async(|_| async { Err(anyhow::anyhow!("async failure")) }),
        );

        let result: Result<&str, String> = hooks.run("work", json!({}), async { Ok("done") }).await;

        assert_eq!(result, Ok("done"));
        assert_eq!(*log.lock(), vec!["still runs"]);
    }

    #[tokio::test]
    async fn test_async_hooks_are_awaited() {
        let hooks = HookRegistry::new("TestService");
        let log = recorder();

        let async_log = log.clone();
        hooks.register(
            HookStage::Before,
            HookCallback::from_async(move |ctx| {
                let log = async_log.clone();
                async move {
                    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    log.lock().push(format!("async {}", ctx.operation));
                    Ok(())
                }
            }),
        );

        let op_log = log.clone();
        let _: Result<(), String> = hooks
            .run("slow", json!({}), async move {
                op_log.lock().push("operation".to_string());
                Ok(())
            })
            .await;

        assert_eq!(*log.lock(), vec!["async slow", "operation"]);
    }

    #[test]
    fn test_registration_counts() {
        let hooks = HookRegistry::new("TestService");
        hooks.on_before(|_| Ok(()));
        hooks.on_error(|_| Ok(()));
        hooks.on_error(|_| Ok(()));

        assert_eq!(hooks.len(HookStage::Before), 1);
        assert_eq!(hooks.len(HookStage::After), 0);
        assert_eq!(hooks.len(HookStage::Error), 2);
    }
}
