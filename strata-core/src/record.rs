use crate::{Value, printable_pairs};
use std::fmt::{self, Display, Formatter};

/// Order preserving field name to value structure.
///
/// This is the single shape exchanged between models and executors: rows
/// returned by a select, projections handed to insert/update and the input
/// of [`Model::fill`](crate::Model::fill).
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Record {
    /// Field names.
    labels: Vec<String>,
    /// Data values (aligned by index with `labels`).
    values: Vec<Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            labels: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }
    /// Builder style [`Record::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }
    pub fn names(&self) -> &[String] {
        &self.labels
    }
    pub fn values(&self) -> &[Value] {
        &self.values
    }
    pub fn len(&self) -> usize {
        self.labels.len()
    }
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
    fn position(&self, name: &str) -> Option<usize> {
        self.labels.iter().position(|v| v == name)
    }
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|i| &self.values[i])
    }
    /// Sets a field, an existing one keeps its position. Returns the replaced value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => Some(std::mem::replace(&mut self.values[i], value)),
            None => {
                self.labels.push(name);
                self.values.push(value);
                None
            }
        }
    }
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let i = self.position(name)?;
        self.labels.remove(i);
        Some(self.values.remove(i))
    }
    pub fn retain(&mut self, mut f: impl FnMut(&str, &Value) -> bool) {
        let mut i = 0;
        while i < self.labels.len() {
            if f(&self.labels[i], &self.values[i]) {
                i += 1;
            } else {
                self.labels.remove(i);
                self.values.remove(i);
            }
        }
    }
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut result = Record::new();
        for (name, value) in iter {
            result.insert(name, value);
        }
        result
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::iter::Zip<std::vec::IntoIter<String>, std::vec::IntoIter<Value>>;
    fn into_iter(self) -> Self::IntoIter {
        self.labels.into_iter().zip(self.values)
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&printable_pairs(self.iter()))
    }
}
