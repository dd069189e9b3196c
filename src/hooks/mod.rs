//! Lifecycle Hooks
//!
//! Runs registered `before` / `after` / `error` callbacks around any async
//! service operation, so timing, metrics and audit concerns can be attached
//! without touching the services themselves.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use upcache_server::hooks::{HookCallback, HookRegistry, HookStage};
//!
//! let hooks = HookRegistry::new("UploadOrchestrator");
//! hooks.on_after(|ctx| {
//!     tracing::info!(operation = %ctx.operation, "done");
//!     Ok(())
//! });
//! hooks.register(HookStage::Error, HookCallback::from_async(|ctx| async move {
//!     audit_log(ctx).await
//! }));
//!
//! let value = hooks.run("get", json!({ "key": key }), backend.get(key)).await?;
//! ```

mod registry;
mod tracing_hooks;
mod types;

pub use registry::HookRegistry;
pub use tracing_hooks::install_tracing_hooks;
pub use types::{HookCallback, HookContext, HookResult, HookStage};
