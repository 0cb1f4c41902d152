//! Tool execution engine.
//!
//! Maps tool calls onto [`DocumentStore`] operations and shapes the results.
//!
//! Outcomes fall into three groups:
//! - bad arguments (wrong shape, query operators, touching `_id`) are
//!   returned as [`McpError`] and become JSON-RPC errors
//! - "nothing matched" is a normal result with an explanatory message
//! - store failures become a result with `isError: true`

use crate::catalog::{
    COUNT_PRODUCTS, DELETE_PRODUCT, FILTER_PRODUCT, INSERT_PRODUCT, LIST_CONTENT, UPDATE_PRODUCT,
};
use crate::error::McpError;
use crate::protocol::{CallToolResult, RequestContext, ToolContent};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use stockroom_core::Document;
use stockroom_store::{DocumentStore, StoreError};

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Whether the execution was successful.
    pub success: bool,
    /// The result content.
    pub content: Vec<ToolContent>,
    /// Machine-readable copy of the result.
    pub structured: Option<Value>,
}

impl ExecutionResult {
    /// Successful result with a human-readable message and structured data.
    pub fn success(text: impl Into<String>, structured: Value) -> Self {
        Self {
            success: true,
            content: vec![ToolContent::Text { text: text.into() }],
            structured: Some(structured),
        }
    }

    /// Successful result whose text is the structured value itself.
    pub fn success_json(structured: Value) -> Self {
        Self::success(structured.to_string(), structured)
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            structured: None,
        }
    }

    /// First text block, if any.
    pub fn text(&self) -> Option<&str> {
        self.content.first().map(|c| match c {
            ToolContent::Text { text } => text.as_str(),
        })
    }

    /// Convert into the `tools/call` response payload.
    pub fn into_call_result(self) -> CallToolResult {
        CallToolResult {
            content: self.content,
            structured_content: self.structured,
            is_error: !self.success,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FilterArgs {
    #[serde(alias = "filtro")]
    filter: Document,
}

#[derive(Debug, Deserialize)]
struct InsertArgs {
    #[serde(alias = "producto")]
    product: Document,
}

#[derive(Debug, Deserialize)]
struct UpdateArgs {
    #[serde(alias = "filtro")]
    filter: Document,
    #[serde(alias = "actualizacion")]
    update: Document,
}

#[derive(Debug, Deserialize)]
struct CountArgs {
    #[serde(default, alias = "filtro")]
    filter: Option<Document>,
}

fn parse_args<T: DeserializeOwned>(tool: &str, arguments: Option<Value>) -> Result<T, McpError> {
    let arguments = match arguments {
        None | Some(Value::Null) => Value::Object(Map::new()),
        Some(value) => value,
    };
    serde_json::from_value(arguments).map_err(|e| McpError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

fn render(filter: &Document) -> String {
    Value::Object(filter.clone()).to_string()
}

/// The tool executor runs product tools against the document store.
#[derive(Clone)]
pub struct ToolExecutor {
    store: Arc<dyn DocumentStore>,
}

impl ToolExecutor {
    /// Create a new tool executor.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Execute a tool by name.
    pub async fn execute(
        &self,
        name: &str,
        arguments: Option<Value>,
        context: &RequestContext,
    ) -> Result<ExecutionResult, McpError> {
        tracing::info!(
            tool = %name,
            subject = %context.subject(),
            collection = %self.store.collection(),
            "Executing tool"
        );

        let outcome = match name {
            LIST_CONTENT => self.list_content().await,
            FILTER_PRODUCT => self.filter_product(parse_args(name, arguments)?).await,
            INSERT_PRODUCT => self.insert_product(parse_args(name, arguments)?).await,
            DELETE_PRODUCT => self.delete_product(parse_args(name, arguments)?).await,
            UPDATE_PRODUCT => self.update_product(parse_args(name, arguments)?).await,
            COUNT_PRODUCTS => self.count_products(parse_args(name, arguments)?).await,
            other => {
                return Err(McpError::ToolNotFound {
                    name: other.to_string(),
                });
            }
        };

        match outcome {
            Ok(result) => Ok(result),
            Err(StoreError::InvalidRequest(e)) => Err(McpError::InvalidArguments {
                tool: name.to_string(),
                reason: e.to_string(),
            }),
            Err(e) => {
                tracing::warn!(tool = %name, error = %e, "Tool execution failed");
                Ok(ExecutionResult::error(format!("{} failed: {}", name, e)))
            }
        }
    }

    async fn list_content(&self) -> Result<ExecutionResult, StoreError> {
        let documents = self.store.find(&Document::new()).await?;
        let list = Value::Array(documents.into_iter().map(Value::Object).collect());
        Ok(ExecutionResult::success(
            list.to_string(),
            json!({ "result": list }),
        ))
    }

    async fn filter_product(&self, args: FilterArgs) -> Result<ExecutionResult, StoreError> {
        let structured = match self.store.find_one(&args.filter).await? {
            Some(document) => Value::Object(document),
            None => json!({
                "error": "Product not found",
                "filter": args.filter,
            }),
        };
        Ok(ExecutionResult::success_json(structured))
    }

    async fn insert_product(&self, args: InsertArgs) -> Result<ExecutionResult, StoreError> {
        let id = self.store.insert_one(args.product).await?;
        Ok(ExecutionResult::success(
            format!("Product inserted with ID: {}", id),
            json!({ "insertedId": id }),
        ))
    }

    async fn delete_product(&self, args: FilterArgs) -> Result<ExecutionResult, StoreError> {
        let deleted = self.store.delete_one(&args.filter).await?;
        let text = if deleted > 0 {
            format!("Product deleted: {}", render(&args.filter))
        } else {
            format!("No product found matching filter: {}", render(&args.filter))
        };
        Ok(ExecutionResult::success(
            text,
            json!({ "deletedCount": deleted, "filter": args.filter }),
        ))
    }

    async fn update_product(&self, args: UpdateArgs) -> Result<ExecutionResult, StoreError> {
        let result = self.store.update_one(&args.filter, &args.update).await?;
        let text = if result.matched_count > 0 {
            format!(
                "Product updated. Modified: {} field(s)",
                result.modified_count
            )
        } else {
            format!("No product found matching filter: {}", render(&args.filter))
        };
        Ok(ExecutionResult::success(
            text,
            json!({
                "matchedCount": result.matched_count,
                "modifiedCount": result.modified_count,
                "filter": args.filter,
            }),
        ))
    }

    async fn count_products(&self, args: CountArgs) -> Result<ExecutionResult, StoreError> {
        let filter = args.filter.unwrap_or_default();
        let count = self.store.count_documents(&filter).await?;
        Ok(ExecutionResult::success(
            count.to_string(),
            json!({ "result": count }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_auth::TokenClaims;
    use stockroom_store::MemoryStore;

    fn context() -> RequestContext {
        RequestContext::new(TokenClaims::for_days(
            "stockroom-client",
            "stockroom-mcp-server",
            "stockroom-mcp",
            1,
        ))
    }

    fn executor() -> ToolExecutor {
        ToolExecutor::new(Arc::new(MemoryStore::new("ecommerce")))
    }

    async fn call(executor: &ToolExecutor, name: &str, arguments: Value) -> ExecutionResult {
        executor
            .execute(name, Some(arguments), &context())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_filter() {
        let executor = executor();
        let inserted = call(
            &executor,
            INSERT_PRODUCT,
            json!({"product": {"idProducto": 1, "nombre": "X"}}),
        )
        .await;
        assert!(inserted.success);
        let id = inserted.structured.as_ref().unwrap()["insertedId"]
            .as_str()
            .unwrap()
            .to_string();
        assert_eq!(
            inserted.text().unwrap(),
            format!("Product inserted with ID: {}", id)
        );

        let found = call(&executor, FILTER_PRODUCT, json!({"filter": {"idProducto": 1}})).await;
        let product = found.structured.unwrap();
        assert_eq!(product["nombre"], "X");
        assert_eq!(product["_id"], json!(id));
    }

    #[tokio::test]
    async fn test_legacy_argument_names() {
        let executor = executor();
        call(&executor, INSERT_PRODUCT, json!({"producto": {"idProducto": 5}})).await;

        let updated = call(
            &executor,
            UPDATE_PRODUCT,
            json!({"filtro": {"idProducto": 5}, "actualizacion": {"stock": 2}}),
        )
        .await;
        assert_eq!(updated.structured.unwrap()["modifiedCount"], 1);

        let count = call(&executor, COUNT_PRODUCTS, json!({"filtro": {"stock": 2}})).await;
        assert_eq!(count.text(), Some("1"));
    }

    #[tokio::test]
    async fn test_filter_not_found_is_not_an_error() {
        let result = call(&executor(), FILTER_PRODUCT, json!({"filter": {"idProducto": 9}})).await;
        assert!(result.success);
        assert_eq!(
            result.structured.unwrap(),
            json!({"error": "Product not found", "filter": {"idProducto": 9}})
        );
    }

    #[tokio::test]
    async fn test_delete_messages() {
        let executor = executor();
        call(&executor, INSERT_PRODUCT, json!({"product": {"idProducto": 1}})).await;

        let deleted = call(&executor, DELETE_PRODUCT, json!({"filter": {"idProducto": 1}})).await;
        assert_eq!(deleted.text(), Some("Product deleted: {\"idProducto\":1}"));

        let missing = call(&executor, DELETE_PRODUCT, json!({"filter": {"idProducto": 1}})).await;
        assert!(missing.success);
        assert_eq!(
            missing.text(),
            Some("No product found matching filter: {\"idProducto\":1}")
        );
        assert_eq!(missing.structured.unwrap()["deletedCount"], 0);
    }

    #[tokio::test]
    async fn test_update_messages() {
        let executor = executor();
        call(&executor, INSERT_PRODUCT, json!({"product": {"idProducto": 1, "precio": 10}})).await;

        let same = call(
            &executor,
            UPDATE_PRODUCT,
            json!({"filter": {"idProducto": 1}, "update": {"precio": 10}}),
        )
        .await;
        assert_eq!(same.text(), Some("Product updated. Modified: 0 field(s)"));

        let missing = call(
            &executor,
            UPDATE_PRODUCT,
            json!({"filter": {"idProducto": 2}, "update": {"precio": 10}}),
        )
        .await;
        assert_eq!(
            missing.structured.unwrap(),
            json!({"matchedCount": 0, "modifiedCount": 0, "filter": {"idProducto": 2}})
        );
    }

    #[tokio::test]
    async fn test_count_without_filter() {
        let executor = executor();
        for id in 0..3 {
            call(&executor, INSERT_PRODUCT, json!({"product": {"idProducto": id}})).await;
        }
        let count = executor
            .execute(COUNT_PRODUCTS, None, &context())
            .await
            .unwrap();
        assert_eq!(count.structured.unwrap(), json!({"result": 3}));

        let listed = call(&executor, LIST_CONTENT, json!({})).await;
        assert_eq!(listed.structured.unwrap()["result"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_bad_arguments() {
        let executor = executor();
        let missing = executor
            .execute(FILTER_PRODUCT, Some(json!({})), &context())
            .await
            .unwrap_err();
        assert!(matches!(missing, McpError::InvalidArguments { .. }));

        let operator = executor
            .execute(
                FILTER_PRODUCT,
                Some(json!({"filter": {"precio": {"$gt": 1}}})),
                &context(),
            )
            .await
            .unwrap_err();
        assert_eq!(operator.code(), -32602);

        let id_change = executor
            .execute(
                UPDATE_PRODUCT,
                Some(json!({"filter": {}, "update": {"_id": "x"}})),
                &context(),
            )
            .await
            .unwrap_err();
        assert!(matches!(id_change, McpError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_tool_error() {
        let executor = executor();
        call(&executor, INSERT_PRODUCT, json!({"product": {"_id": "a"}})).await;
        let duplicate = call(&executor, INSERT_PRODUCT, json!({"product": {"_id": "a"}})).await;

        assert!(!duplicate.success);
        let result = duplicate.into_call_result();
        assert!(result.is_error);
        assert!(result.structured_content.is_none());
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = executor()
            .execute("drop_collection", None, &context())
            .await
            .unwrap_err();
        assert!(matches!(err, McpError::ToolNotFound { name } if name == "drop_collection"));
    }
}
