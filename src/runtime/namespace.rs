use super::value::Value;

/// Ordered name bindings: a frame's locals, a module's globals or the
/// builtins. Rebinding a name keeps its original position.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    bindings: Vec<(String, Value)>,
}

impl Namespace {
    pub fn new() -> Self {
        Namespace::default()
    }

    /// Builder form of `insert`.
    pub fn with(mut self, name: &str, value: Value) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: Value) {
        match self.bindings.iter_mut().find(|(bound, _)| bound == name) {
            Some(binding) => binding.1 = value,
            None => self.bindings.push((name.to_string(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let index = self.bindings.iter().position(|(bound, _)| bound == name)?;
        Some(self.bindings.remove(index).1)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl FromIterator<(String, Value)> for Namespace {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut namespace = Namespace::new();
        for (name, value) in iter {
            namespace.insert(&name, value);
        }
        namespace
    }
}
