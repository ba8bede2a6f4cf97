//! Element tree nodes
//!
//! An element is either a leaf carrying an optional text value or a
//! container of child elements, never both. The mutators keep that
//! invariant: setting a value drops children, adding a child drops the value.

/// Ordered attribute map. Keys are unique; insertion order is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    pub fn new() -> Self {
        Attributes::default()
    }

    /// Get attribute value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, returning the previous value.
    ///
    /// An existing key keeps its position and takes the new value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate over (name, value) pairs in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &str)> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A parsed markup element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Attributes,
    value: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// Create an empty element
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            attributes: Attributes::new(),
            value: None,
            children: Vec::new(),
        }
    }

    /// Create a leaf element with a text value
    pub fn with_value(tag: impl Into<String>, value: impl Into<String>) -> Self {
        let mut element = Element::new(tag);
        element.value = Some(value.into());
        element
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.attributes.set(name, value)
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Set the text value. Any children are dropped.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.children.clear();
        self.value = Some(value.into());
    }

    /// Append a child. Any text value is dropped.
    pub fn add_child(&mut self, child: Element) {
        self.value = None;
        self.children.push(child);
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// True if this element has no children
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
