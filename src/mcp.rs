//! MCP server adapter.
//!
//! Exposes the retriever to MCP clients (Claude Desktop, Cursor, agent
//! frameworks) over stdio or streamable HTTP:
//!
//! * **Tool** `get_policy` `{query, k?}` returns the retrieved passages as
//!   text, one per line.
//! * **Prompt** `get_llm_prompt` `{query}` returns a ready-to-send user
//!   message with the HR-expert instructions and the retrieved context.
//!
//! The handler is implemented directly against [`ServerHandler`]; every
//! session gets a clone sharing the same `Arc<PolicyRetriever>`.

use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::*;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};
use tracing::debug;

use crate::error::RetrieverError;
use crate::prompt::build_llm_prompt;
use crate::retriever::PolicyRetriever;

pub const POLICY_TOOL: &str = "get_policy";
pub const PROMPT_NAME: &str = "get_llm_prompt";

#[derive(Clone)]
pub struct PolicyMcpServer {
    retriever: Arc<PolicyRetriever>,
    default_k: usize,
}

impl PolicyMcpServer {
    pub fn new(retriever: Arc<PolicyRetriever>, default_k: usize) -> Self {
        Self {
            retriever,
            default_k,
        }
    }

    fn policy_tool() -> Tool {
        let schema = serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The HR policy question to look up"
                },
                "k": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Number of passages to return"
                }
            },
            "required": ["query"]
        });
        let input_schema = match schema {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        };

        Tool {
            name: Cow::Borrowed(POLICY_TOOL),
            title: None,
            description: Some(Cow::Borrowed(
                "Retrieve the HR policy passages most relevant to a question.",
            )),
            input_schema,
            output_schema: None,
            annotations: Some(ToolAnnotations::new().read_only(true)),
            execution: None,
            icons: None,
            meta: None,
        }
    }

    fn llm_prompt() -> Prompt {
        Prompt {
            name: PROMPT_NAME.to_string(),
            title: None,
            description: Some(
                "Build an LLM prompt answering an HR question from the policy document."
                    .to_string(),
            ),
            arguments: Some(vec![PromptArgument {
                name: "query".to_string(),
                title: None,
                description: Some("The HR policy question".to_string()),
                required: Some(true),
            }]),
            icons: None,
            meta: None,
        }
    }

    /// Run the `get_policy` tool against raw JSON arguments.
    pub async fn lookup_policy(
        &self,
        args: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, McpError> {
        let query = required_str(args, "query")?;
        let k = optional_k(args)?.unwrap_or(self.default_k);
        debug!(k, "get_policy");
        self.retriever
            .query_text(query, k)
            .await
            .map_err(to_mcp_error)
    }

    /// Render the `get_llm_prompt` prompt against raw JSON arguments.
    pub async fn render_prompt(
        &self,
        args: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<String, McpError> {
        let query = required_str(args, "query")?;
        let context = self
            .retriever
            .query_text(query, self.default_k)
            .await
            .map_err(to_mcp_error)?;
        Ok(build_llm_prompt(query, &context))
    }
}

fn required_str<'a>(
    args: &'a serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Result<&'a str, McpError> {
    args.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
        McpError::invalid_params(format!("missing required string argument: {}", key), None)
    })
}

fn optional_k(args: &serde_json::Map<String, serde_json::Value>) -> Result<Option<usize>, McpError> {
    match args.get("k") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_u64()
            .map(|k| Some(k as usize))
            .ok_or_else(|| McpError::invalid_params("k must be a non-negative integer", None)),
    }
}

fn to_mcp_error(e: RetrieverError) -> McpError {
    match e {
        RetrieverError::InvalidQuery(_) => McpError::invalid_params(e.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}

impl ServerHandler for PolicyMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "hr-policy-agent".to_string(),
                title: Some("HR Policy Agent".to_string()),
                version: env!("CARGO_PKG_VERSION").to_string(),
                description: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Answers questions about company HR policies. Call get_policy with a \
                 question to retrieve the relevant policy text, or use the get_llm_prompt \
                 prompt for a ready-made expert prompt."
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(vec![Self::policy_tool()])))
    }

    fn get_tool(&self, name: &str) -> Option<Tool> {
        (name == POLICY_TOOL).then(Self::policy_tool)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if request.name != POLICY_TOOL {
            return Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no tool registered with name: {}", request.name),
                None,
            ));
        }

        let args = request.arguments.unwrap_or_default();
        match self.lookup_policy(&args).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(e.message.to_string())])),
        }
    }

    fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListPromptsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListPromptsResult::with_all_items(vec![Self::llm_prompt()])))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParams,
        _context: rmcp::service::RequestContext<rmcp::RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        if request.name != PROMPT_NAME {
            return Err(McpError::new(
                ErrorCode::METHOD_NOT_FOUND,
                format!("no prompt registered with name: {}", request.name),
                None,
            ));
        }

        let args = request.arguments.unwrap_or_default();
        let text = self.render_prompt(&args).await?;

        Ok(GetPromptResult {
            description: Some("HR policy expert prompt".to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

/// Serve MCP over stdin/stdout until the client disconnects.
pub async fn serve_stdio(server: PolicyMcpServer) -> anyhow::Result<()> {
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// Streamable HTTP MCP service, mountable on an axum router.
pub fn http_service(server: PolicyMcpServer) -> StreamableHttpService<PolicyMcpServer, LocalSessionManager> {
    StreamableHttpService::new(
        move || Ok(server.clone()),
        Arc::new(LocalSessionManager::default()),
        StreamableHttpServerConfig::default(),
    )
}
