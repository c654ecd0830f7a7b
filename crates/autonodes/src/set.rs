use async_trait::async_trait;
use autocore::{NodeError, Parameters};
use autoengine::NodeExecutor;
use serde_json::{Map, Value};

/// Sets static values on the payload: shallow-merges the node's
/// `values` parameter object over the upstream object (node values
/// win). A non-object upstream payload is replaced outright.
pub struct SetExecutor;

#[async_trait]
impl NodeExecutor for SetExecutor {
    async fn execute(&self, parameters: &Parameters, input: Value) -> Result<Value, NodeError> {
        let values = match parameters.get("values") {
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(NodeError::InvalidParameter {
                    name: "values".to_string(),
                    reason: "expected an object".to_string(),
                })
            }
            None => Map::new(),
        };

        let mut merged = match input {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        merged.extend(values);

        Ok(Value::Object(merged))
    }
}
