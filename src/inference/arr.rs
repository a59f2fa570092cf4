use serde_json::Value;
use tracing::debug;

use super::{kind_of, InferError, Walk};
use crate::ir::{FieldDescription, Kind};
use crate::naming::capitalize;

impl Walk {
    /// Resolve an array field from its first element only. Later elements are
    /// never inspected, so mixed arrays go unreported.
    pub(super) fn array(
        &mut self,
        key: &str,
        items: &[Value],
        depth: usize,
    ) -> Result<FieldDescription, InferError> {
        let field = match items.first() {
            None => {
                debug!(path = %self.pointer(), "empty array, element type needs manual check");
                FieldDescription::array(key, Kind::Unknown, None)
            }
            Some(Value::Object(first)) => {
                let type_name = capitalize(key);
                self.path.push("0".to_string());
                self.object(first, &type_name, depth + 1)?;
                self.path.pop();
                FieldDescription::array(key, Kind::Object, Some(type_name))
            }
            Some(first) => FieldDescription::array(key, kind_of(first), None),
        };
        Ok(field)
    }
}
