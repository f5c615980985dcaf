use serde_json::{Map, Value};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Well-known session state keys.
pub mod keys {
    /// Preferred temperature unit (`"Fahrenheit"` or `"Celsius"`).
    pub const TEMPERATURE_UNIT: &str = "user_preference_temperature_unit";
    /// Last city a weather lookup succeeded for.
    pub const LAST_CITY_CHECKED: &str = "last_city_checked_stateful";
    /// Set once the request guardrail blocked a keyword.
    pub const KEYWORD_BLOCK_TRIGGERED: &str = "guardrail_block_keyword_triggered";
    /// Set once the tool guardrail blocked an argument.
    pub const TOOL_BLOCK_TRIGGERED: &str = "guardrail_tool_block_triggered";
    /// Final text of the weather agent's last turn.
    pub const LAST_WEATHER_REPORT: &str = "last_weather_report";
}

/// Shared key/value state for one conversation.
///
/// Cloning yields another handle to the same map. All reads and writes go
/// through a single per-session mutex, so guardrails and tools running on
/// different tasks never interleave a read-modify-write. Keys are never
/// removed, and flags written through [`SessionState::set_flag`] stay `true`.
#[derive(Debug, Clone)]
pub struct SessionState {
    id: Arc<str>,
    values: Arc<Mutex<Map<String, Value>>>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Arc::from(id.into()),
            values: Arc::new(Mutex::new(Map::new())),
        }
    }

    /// Seed a session with initial values, e.g. a unit preference.
    pub fn with_values(values: Map<String, Value>) -> Self {
        let state = Self::new();
        *state.lock() = values;
        state
    }

    pub fn session_id(&self) -> &str {
        &self.id
    }

    fn lock(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// String value for `key`, or `default` when absent or not a string.
    pub fn get_str_or(&self, key: &str, default: &str) -> String {
        self.lock()
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Insert or overwrite `key`.
    ///
    /// A flag that is already `true` is left untouched, whatever the new value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let mut values = self.lock();
        if is_flag_key(&key) && values.get(&key) == Some(&Value::Bool(true)) {
            return;
        }
        values.insert(key, value.into());
    }

    /// Raise a monotonic flag. Returns `true` if this call flipped it.
    pub fn set_flag(&self, key: impl Into<String>) -> bool {
        let key = key.into();
        let mut values = self.lock();
        let already = values.get(&key).and_then(Value::as_bool).unwrap_or(false);
        if !already {
            values.insert(key, Value::Bool(true));
        }
        !already
    }

    pub fn is_flag_set(&self, key: &str) -> bool {
        self.lock()
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

fn is_flag_key(key: &str) -> bool {
    matches!(key, keys::KEYWORD_BLOCK_TRIGGERED | keys::TOOL_BLOCK_TRIGGERED)
}
