use async_trait::async_trait;
use autocore::{NodeError, Parameters};
use autoengine::NodeExecutor;
use serde_json::{json, Value};

/// Entry-point node: passes upstream data through unchanged, or an
/// empty object when there is none.
pub struct StartExecutor;

#[async_trait]
impl NodeExecutor for StartExecutor {
    async fn execute(&self, _parameters: &Parameters, input: Value) -> Result<Value, NodeError> {
        if input.is_null() {
            Ok(json!({}))
        } else {
            Ok(input)
        }
    }
}
