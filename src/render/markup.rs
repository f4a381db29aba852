use std::cell::RefCell;
use std::rc::{Rc, Weak};

const VOID_ELEMENTS: &[&str] = &["img", "br", "hr", "input"];

/// A detached element tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn div(classes: &str) -> Self {
        Self::new("div").with_class(classes)
    }

    pub fn span(classes: &str) -> Self {
        Self::new("span").with_class(classes)
    }

    pub fn with_class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.push((name.to_string(), value.into()));
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

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|candidate| candidate == class)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Concatenated text of this node and all descendants, depth first.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Every node in the tree (including `self`) carrying `class`.
    pub fn find_by_class(&self, class: &str) -> Vec<&Node> {
        let mut found = Vec::new();
        self.walk(&mut |node| {
            if node.has_class(class) {
                found.push(node);
            }
        });
        found
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        if !self.classes.is_empty() {
            push_attribute(out, "class", &self.classes.join(" "));
        }
        for (name, value) in &self.attributes {
            push_attribute(out, name, value);
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&self.tag.as_str()) {
            return;
        }
        if let Some(text) = &self.text {
            out.push_str(&escape_html(text));
        }
        for child in &self.children {
            child.write_html(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn push_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// A node attached to a live document that can be updated in place.
#[derive(Debug, Clone)]
pub struct NodeHandle(Rc<RefCell<Node>>);

impl NodeHandle {
    pub fn new(node: Node) -> Self {
        Self(Rc::new(RefCell::new(node)))
    }

    pub fn replace_children(&self, children: Vec<Node>) {
        self.0.borrow_mut().children = children;
    }

    pub fn snapshot(&self) -> Node {
        self.0.borrow().clone()
    }

    pub fn to_html(&self) -> String {
        self.0.borrow().to_html()
    }

    pub fn downgrade(&self) -> WeakNodeHandle {
        WeakNodeHandle(Rc::downgrade(&self.0))
    }
}

/// Held by in-flight fetches so a dropped target is simply skipped.
#[derive(Debug, Clone)]
pub struct WeakNodeHandle(Weak<RefCell<Node>>);

impl WeakNodeHandle {
    pub fn upgrade(&self) -> Option<NodeHandle> {
        self.0.upgrade().map(NodeHandle)
    }
}
