// Request dispatch: authenticate, look up, validate, invoke

use crate::protocol::ToolSchema;
use crate::tools::ToolRegistry;
use std::sync::Arc;
use tollgate_core::{AccessGrant, DispatchResult, ErrorOutcome, TokenAuthenticator};

/// Routes one authenticated call to its tool.
///
/// Holds the authenticator and a frozen registry; clones share both.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    authenticator: TokenAuthenticator,
    registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(authenticator: TokenAuthenticator, registry: ToolRegistry) -> Self {
        Self {
            authenticator,
            registry: Arc::new(registry),
        }
    }

    pub fn authenticate(&self, presented_token: &str) -> Result<AccessGrant, ErrorOutcome> {
        self.authenticator.authenticate(presented_token).ok_or_else(|| {
            tracing::warn!("Rejected request with invalid bearer token");
            ErrorOutcome::unauthorized()
        })
    }

    /// Authenticate and run a single tool call.
    ///
    /// Authentication happens before the tool name is even looked at, so an
    /// unauthenticated caller always sees `Unauthorized`.
    pub async fn dispatch(
        &self,
        presented_token: &str,
        tool_name: &str,
        raw_input: serde_json::Value,
    ) -> DispatchResult {
        let grant = self.authenticate(presented_token)?;
        self.call(&grant, tool_name, raw_input).await
    }

    /// Run a tool call for a caller that already holds a grant.
    ///
    /// Grants only come out of [`Dispatcher::authenticate`], so this stays
    /// crate-private to keep authentication the first step of every call.
    pub(crate) async fn call(
        &self,
        grant: &AccessGrant,
        tool_name: &str,
        raw_input: serde_json::Value,
    ) -> DispatchResult {
        let Some(descriptor) = self.registry.lookup(tool_name) else {
            tracing::warn!(client = grant.client_identity(), tool = tool_name, "Unknown tool");
            return Err(ErrorOutcome::unknown_tool(tool_name));
        };

        let pending = descriptor.prepare(raw_input).map_err(|e| {
            tracing::warn!(tool = tool_name, error = %e, "Invalid tool arguments");
            ErrorOutcome::invalid_params(e.to_string())
        })?;

        match pending.invoke().await {
            Ok(output) => {
                tracing::debug!(
                    client = grant.client_identity(),
                    tool = tool_name,
                    "Tool call succeeded"
                );
                Ok(output)
            }
            Err(e) => {
                tracing::warn!(tool = tool_name, error = %e, "Tool reported an error");
                Err(ErrorOutcome::handler_error(e.message))
            }
        }
    }

    /// Tool schemas visible to an authenticated caller
    pub(crate) fn list_tools(&self, grant: &AccessGrant) -> Vec<ToolSchema> {
        tracing::debug!(client = grant.client_identity(), "Listing tools");
        self.registry.list_schemas()
    }
}
