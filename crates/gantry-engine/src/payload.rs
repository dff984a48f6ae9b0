use serde_json::{Map, Value};

/// Typed view over an event's raw `data` object.
///
/// All accessors return `None` for absent, null, or wrong-typed fields;
/// callers pick explicit defaults at the use site. This is the only place
/// that reads payload fields by key, so the tolerance rules live here
/// rather than being scattered through the merge code.
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Payload<'a> {
    pub fn new(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn str_field(&self, key: &str) -> Option<&'a str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }

    /// Like `str_field`, but treats the empty string as absent. Runtimes
    /// pad optional text fields (error, promptId) with `""`.
    pub fn non_empty_str(&self, key: &str) -> Option<&'a str> {
        self.str_field(key).filter(|s| !s.is_empty())
    }

    /// Integer field; accepts a float representation and truncates, since
    /// some emitters serialize millisecond counts as JSON doubles.
    pub fn i64_field(&self, key: &str) -> Option<i64> {
        let value = self.fields.get(key)?;
        value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
    }

    pub fn u64_field(&self, key: &str) -> Option<u64> {
        let value = self.fields.get(key)?;
        value.as_u64().or_else(|| {
            value
                .as_f64()
                .filter(|f| *f >= 0.0)
                .map(|f| f as u64)
        })
    }

    pub fn value_field(&self, key: &str) -> Option<Value> {
        self.fields.get(key).filter(|v| !v.is_null()).cloned()
    }
}
