use crate::catalog::{Sink, Source};
use crate::keyed_map::KeyedMap;
use crate::value::{Value, ValueKind};

/// Named values in insertion order; readable as a `Source` and writable as
/// a `Sink`.
#[derive(Debug, Default)]
pub struct Record {
    fields: KeyedMap<String, Value<'static>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, overwriting in place when it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value<'static>>) -> &mut Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn value(&self, name: &str) -> Option<&Value<'static>> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<'static>)> + '_ {
        self.fields.iter().map(|e| (e.key().as_str(), e.value()))
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}

impl Source for Record {
    fn get(&self, name: &str, _kind: ValueKind) -> Option<Value<'_>> {
        self.fields.get(name).map(Value::borrowed)
    }
}

impl Sink for Record {
    fn put(&mut self, name: &str, value: Value<'_>) {
        self.fields.insert(name.to_owned(), value.into_owned());
    }
}

impl<N: Into<String>, V: Into<Value<'static>>> FromIterator<(N, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut rec = Record::new();
        for (n, v) in iter {
            rec.set(n, v);
        }
        rec
    }
}
