//! Invoking sibling functions of the same deployment.

use tracing::debug;

use cirrus_core::{FunctionInvoker, InvocationMode};

use crate::error::{InvokeError, InvokeResult};

/// Builds the deployed name `{prefix}-{namespace}-{base_name}`.
pub fn function_name(prefix: &str, namespace: &str, base_name: &str) -> String {
    format!("{prefix}-{namespace}-{base_name}")
}

/// Invokes a sibling function and returns its raw response payload.
///
/// With [`InvocationMode::Event`] the call is fire-and-forget and the
/// returned payload only reflects delivery.
pub async fn invoke_function(
    invoker: &dyn FunctionInvoker,
    namespace: &str,
    base_name: &str,
    prefix: &str,
    payload: Vec<u8>,
    mode: InvocationMode,
) -> InvokeResult<Vec<u8>> {
    let name = function_name(prefix, namespace, base_name);
    debug!(
        function = %name,
        mode = mode.as_str(),
        bytes = payload.len(),
        "Invoking function"
    );

    invoker
        .invoke(&name, payload, mode)
        .await
        .map_err(|source| {
            if source.is_not_found() {
                InvokeError::NotFound { name }
            } else {
                InvokeError::Invoke { name, source }
            }
        })
}
