//! Default tracing hooks installed on every service at startup

use super::registry::HookRegistry;

/// Log start, completion time and failure of every operation
pub fn install_tracing_hooks(hooks: &HookRegistry) {
    hooks.on_before(|ctx| {
        tracing::debug!(
            component = %ctx.component,
            operation = %ctx.operation,
            "Operation started"
        );
        Ok(())
    });

    hooks.on_after(|ctx| {
        tracing::debug!(
            component = %ctx.component,
            operation = %ctx.operation,
            elapsed_ms = ctx.elapsed_ms(),
            "Operation completed"
        );
        Ok(())
    });

    hooks.on_error(|ctx| {
        tracing::warn!(
            component = %ctx.component,
            operation = %ctx.operation,
            elapsed_ms = ctx.elapsed_ms(),
            error = ctx.error.as_deref().unwrap_or("unknown"),
            "Operation failed"
        );
        Ok(())
    });
}
