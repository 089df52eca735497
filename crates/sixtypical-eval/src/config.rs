//! Evaluation limits

use serde::{Deserialize, Serialize};

/// Resource bounds for one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Deepest chain of nested `call`s before evaluation fails.
    ///
    /// `call` recurses on the native stack, so this is what keeps a runaway
    /// recursive program from overflowing it. `goto` does not count.
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
}

pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

fn default_max_call_depth() -> usize {
    DEFAULT_MAX_CALL_DEPTH
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl EvalConfig {
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_when_fields_missing() {
        let config: EvalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EvalConfig::default());
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);

        let config: EvalConfig = serde_json::from_str(r#"{ "max_call_depth": 4 }"#).unwrap();
        assert_eq!(config.max_call_depth, 4);
    }
}
