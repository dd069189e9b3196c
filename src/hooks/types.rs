//! Hook types

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::Serialize;
use serde_json::Value;

/// Outcome of a single hook callback
pub type HookResult = anyhow::Result<()>;

type SyncHookFn = dyn Fn(&HookContext) -> HookResult + Send + Sync;
type AsyncHookFn = dyn Fn(HookContext) -> BoxFuture<'static, HookResult> + Send + Sync;

// ============================================================================
// Stage
// ============================================================================

/// Point in an operation's lifecycle at which a hook fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HookStage {
    /// Before the wrapped operation starts
    Before,
    /// After the wrapped operation succeeded
    After,
    /// After the wrapped operation failed
    Error,
}

impl HookStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Context
// ============================================================================

/// Record passed through the stages of one invocation
#[derive(Debug, Clone, Serialize)]
pub struct HookContext {
    /// Service that owns the operation (e.g. "CacheClient")
    pub component: String,

    /// Operation name (e.g. "upload_file")
    pub operation: String,

    /// Operation arguments, as far as they are worth recording
    pub arguments: Value,

    /// Serialized result, set for `after` hooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    /// Error message, set for `error` hooks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the invocation started
    pub started_at: DateTime<Utc>,
}

impl HookContext {
    pub fn new(component: impl Into<String>, operation: impl Into<String>, arguments: Value) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            arguments,
            result: None,
            error: None,
            started_at: Utc::now(),
        }
    }

    /// Milliseconds since the invocation started
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

// ============================================================================
// Callback
// ============================================================================

/// A registered hook, either plain or async
#[derive(Clone)]
pub enum HookCallback {
    Sync(Arc<SyncHookFn>),
    Async(Arc<AsyncHookFn>),
}

impl HookCallback {
    /// Wrap a synchronous callback
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(&HookContext) -> HookResult + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Wrap a callback returning a future
    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(HookContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HookResult> + Send + 'static,
    {
        Self::Async(Arc::new(move |ctx| f(ctx).boxed()))
    }

    /// Invoke the callback, turning a panic into an error
    pub(crate) async fn invoke(&self, ctx: &HookContext) -> HookResult {
        match self {
            Self::Sync(f) => std::panic::catch_unwind(AssertUnwindSafe(|| f(ctx)))
                .unwrap_or_else(|_| Err(anyhow::anyhow!("hook panicked"))),
            Self::Async(f) => AssertUnwindSafe(f(ctx.clone()))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(anyhow::anyhow!("hook panicked"))),
        }
    }
}

impl fmt::Debug for HookCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("HookCallback::Sync"),
            Self::Async(_) => f.write_str("HookCallback::Async"),
        }
    }
}
