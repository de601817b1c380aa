//! Ordered attribute list.

use std::fmt;

/// One `name="value"` pair on an element or declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    /// Attribute name, normalized per the parse settings in effect.
    pub name: String,
    /// Attribute value with character references already decoded.
    pub value: String,
}

impl Attribute {
    /// Create an attribute.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}

/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#concept-element-attribute)
///
/// "An element has an associated ordered attribute list."
///
/// Source order is kept, which is what serializers and tests expect to see.
/// Lists are short in practice so lookups are linear scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    list: Vec<Attribute>,
}

impl Attributes {
    /// An empty attribute list.
    #[must_use]
    pub const fn new() -> Self {
        Self { list: Vec::new() }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Whether there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Value of the attribute with exactly this name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of the first attribute whose name matches ignoring ASCII case.
    #[must_use]
    pub fn get_ignore_case(&self, name: &str) -> Option<&str> {
        self.list
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Whether an attribute with exactly this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.list.iter().any(|a| a.name == name)
    }

    /// Whether an attribute with this name exists, ignoring ASCII case.
    #[must_use]
    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.list.iter().any(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Set an attribute, replacing the value of an existing one with the
    /// same name in place.
    pub fn put(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.list.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.list.push(Attribute { name, value }),
        }
    }

    /// Append an attribute without checking for an existing one.
    ///
    /// Callers that already know the name is new (or want duplicates, as the
    /// tokenizer's raw view does not) use this to skip the scan.
    pub fn push(&mut self, attribute: Attribute) {
        self.list.push(attribute);
    }

    /// Remove an attribute by exact name, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.list.iter().position(|a| a.name == name)?;
        Some(self.list.remove(index).value)
    }

    /// Remove every attribute, keeping the allocation.
    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Iterate attributes in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.list.iter()
    }
}

impl<'a> IntoIterator for &'a Attributes {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (name, value) in iter {
            attributes.put(name, value);
        }
        attributes
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, attribute) in self.list.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{attribute}")?;
        }
        Ok(())
    }
}
