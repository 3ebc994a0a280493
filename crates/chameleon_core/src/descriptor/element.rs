//! Raw descriptor fragments handed to extension materializers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_ELEMENT_NAME: &str = "extension";

fn default_element_name() -> String {
    DEFAULT_ELEMENT_NAME.to_string()
}

/// One still-unparsed descriptor fragment.
///
/// Materializers read `name`, `value`, `attributes` and `children`; the shape
/// mirrors a small element tree so descriptors stay format-agnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorElement {
    #[serde(default = "default_element_name")]
    name: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    attributes: BTreeMap<String, String>,
    #[serde(default)]
    children: Vec<DescriptorElement>,
}

impl Default for DescriptorElement {
    fn default() -> Self {
        Self::new(DEFAULT_ELEMENT_NAME)
    }
}

impl DescriptorElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: DescriptorElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text value with surrounding whitespace removed.
    pub fn value(&self) -> &str {
        self.value.trim()
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn children(&self) -> &[DescriptorElement] {
        &self.children
    }

    /// Direct children whose name equals `name`, in declaration order.
    pub fn children_by_name<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a DescriptorElement> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }
}
