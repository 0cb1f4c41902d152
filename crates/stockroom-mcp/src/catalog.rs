//! The product tools exposed over MCP.
//!
//! | Tool | Arguments | Effect |
//! |------|-----------|--------|
//! | `list_content` | none | every document in the collection |
//! | `filter_product` | `filter` | first matching document |
//! | `insert_product` | `product` | insert one document |
//! | `delete_product` | `filter` | delete the first match |
//! | `update_product` | `filter`, `update` | merge fields into the first match |
//! | `count_products` | optional `filter` | number of matches |
//!
//! Filters are plain field equality (`{"idProducto": 1}`); dotted keys reach
//! into nested objects.

use crate::protocol::{ToolAnnotations, ToolDefinition};
use crate::tools::ToolRegistry;
use serde_json::{Value, json};

pub const LIST_CONTENT: &str = "list_content";
pub const FILTER_PRODUCT: &str = "filter_product";
pub const INSERT_PRODUCT: &str = "insert_product";
pub const DELETE_PRODUCT: &str = "delete_product";
pub const UPDATE_PRODUCT: &str = "update_product";
pub const COUNT_PRODUCTS: &str = "count_products";

fn filter_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "description": description,
        "additionalProperties": true,
    })
}

fn tool(name: &str, description: &str, input_schema: Value, annotations: ToolAnnotations) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema,
        annotations: Some(annotations),
    }
}

fn read_only() -> ToolAnnotations {
    ToolAnnotations {
        read_only: Some(true),
        destructive: Some(false),
        idempotent: Some(true),
    }
}

/// Definitions of all product tools.
pub fn product_tools() -> Vec<ToolDefinition> {
    vec![
        tool(
            LIST_CONTENT,
            "List every document in the collection.",
            json!({"type": "object", "properties": {}}),
            read_only(),
        ),
        tool(
            FILTER_PRODUCT,
            "Find the first product matching a filter, e.g. {\"idProducto\": 1}.",
            json!({
                "type": "object",
                "properties": {
                    "filter": filter_schema("Field/value pairs the product must match"),
                },
                "required": ["filter"],
            }),
            read_only(),
        ),
        tool(
            INSERT_PRODUCT,
            "Insert a new product and return its identifier.",
            json!({
                "type": "object",
                "properties": {
                    "product": {
                        "type": "object",
                        "description": "The product document to insert",
                        "additionalProperties": true,
                    },
                },
                "required": ["product"],
            }),
            ToolAnnotations {
                read_only: Some(false),
                destructive: Some(false),
                idempotent: Some(false),
            },
        ),
        tool(
            DELETE_PRODUCT,
            "Delete the first product matching a filter.",
            json!({
                "type": "object",
                "properties": {
                    "filter": filter_schema("Field/value pairs identifying the product"),
                },
                "required": ["filter"],
            }),
            ToolAnnotations {
                read_only: Some(false),
                destructive: Some(true),
                idempotent: Some(false),
            },
        ),
        tool(
            UPDATE_PRODUCT,
            "Set fields on the first product matching a filter. Fields not named in the update are kept.",
            json!({
                "type": "object",
                "properties": {
                    "filter": filter_schema("Field/value pairs identifying the product"),
                    "update": {
                        "type": "object",
                        "description": "Fields to set, e.g. {\"precioUnitarioUSD\": 50}",
                        "additionalProperties": true,
                    },
                },
                "required": ["filter", "update"],
            }),
            ToolAnnotations {
                read_only: Some(false),
                destructive: Some(false),
                idempotent: Some(true),
            },
        ),
        tool(
            COUNT_PRODUCTS,
            "Count the products matching an optional filter.",
            json!({
                "type": "object",
                "properties": {
                    "filter": filter_schema("Optional field/value pairs; omit to count everything"),
                },
            }),
            read_only(),
        ),
    ]
}

/// Registry preloaded with [`product_tools`].
pub fn product_registry() -> ToolRegistry {
    product_tools().into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_tools() {
        let registry = product_registry();
        assert_eq!(
            registry.names(),
            vec![
                COUNT_PRODUCTS,
                DELETE_PRODUCT,
                FILTER_PRODUCT,
                INSERT_PRODUCT,
                LIST_CONTENT,
                UPDATE_PRODUCT
            ]
        );
    }

    #[test]
    fn test_schemas_are_objects() {
        for tool in product_tools() {
            assert_eq!(tool.input_schema["type"], "object", "{}", tool.name);
            assert!(tool.description.is_some());
        }
    }

    #[test]
    fn test_only_delete_is_destructive() {
        for tool in product_tools() {
            let destructive = tool.annotations.unwrap().destructive.unwrap();
            assert_eq!(destructive, tool.name == DELETE_PRODUCT);
        }
    }
}
