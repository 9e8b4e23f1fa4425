/// Attribute holding a node's identity.
pub const ID_ATTR: &str = "id";
/// Attribute holding the readable instructions (see [`crate::readable`]).
pub const READABLE_ATTR: &str = "readable";
/// Attribute holding a node's short description.
pub const DESC_ATTR: &str = "desc";

/// One element of a script tree.
///
/// A node owns its children exclusively. The tag never changes after
/// construction and the `id` attribute, once set, is only ever read.
/// Mutation from outside the crate goes through [`crate::Script`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Node>,
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_attributes(tag: impl Into<String>, attributes: Vec<(String, String)>) -> Self {
        let mut node = Self::new(tag);
        for (name, value) in attributes {
            node.set_attr(name, value);
        }
        node
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The node's identity, if one has been assigned. Empty ids count as unset.
    pub fn id(&self) -> Option<&str> {
        self.attr(ID_ATTR).filter(|id| !id.is_empty())
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attributes in document order.
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Set or overwrite an attribute, keeping the original position of an
    /// existing key.
    pub(crate) fn set_attr(&mut self, name: String, value: String) {
        if let Some(slot) = self.attributes.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
    }

    pub(crate) fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self.attributes.iter().position(|(k, _)| k == name)?;
        Some(self.attributes.remove(pos).1)
    }

    pub(crate) fn set_text(&mut self, text: Option<String>) {
        self.text = text;
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }
}
