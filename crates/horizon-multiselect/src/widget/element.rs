//! A detached element tree.
//!
//! The dropdown's visual structure is built as a small tree of [`Element`]s:
//! tag, ordered attributes, class list, inline styles, text and children. The
//! tree can be queried and mutated in place, and serialized to HTML with
//! [`Element::to_html`].
//!
//! Hidden elements keep their place in the tree and serialize with
//! `style="display: none"`.

use std::fmt::Write;

/// One node of the element tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    tag: String,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    text: String,
    hidden: bool,
    children: Vec<Element>,
}

const VOID_TAGS: &[&str] = &["input", "hr", "br", "img"];

impl Element {
    /// Create an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    // Builder methods

    /// Add space-separated classes using builder pattern.
    pub fn with_class(mut self, classes: &str) -> Self {
        self.add_class(classes);
        self
    }

    /// Set an attribute using builder pattern.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Set an inline style property using builder pattern.
    pub fn with_style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_style(property, value);
        self
    }

    /// Set the text content using builder pattern.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a child using builder pattern.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set visibility using builder pattern.
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    // Accessors

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The `id` attribute, if any.
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Element> {
        &mut self.children
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    // Classes

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Add one or more space-separated classes, skipping ones already present.
    pub fn add_class(&mut self, classes: &str) {
        for class in classes.split_whitespace() {
            if !self.has_class(class) {
                self.classes.push(class.to_string());
            }
        }
    }

    /// Remove one or more space-separated classes.
    pub fn remove_class(&mut self, classes: &str) {
        for class in classes.split_whitespace() {
            self.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Add or remove classes depending on `on`.
    pub fn toggle_class(&mut self, classes: &str, on: bool) {
        if on {
            self.add_class(classes);
        } else {
            self.remove_class(classes);
        }
    }

    // Attributes

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    /// Set an attribute, keeping its original position if it already exists.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attributes.retain(|(n, _)| n != name);
    }

    /// Set or remove a boolean attribute such as `disabled` or `checked`.
    pub fn set_flag(&mut self, name: &str, on: bool) {
        if on {
            self.set_attr(name, name);
        } else {
            self.remove_attr(name);
        }
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    // Styles

    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(p, _)| p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, property: impl Into<String>, value: impl Into<String>) {
        let property = property.into();
        let value = value.into();
        match self.styles.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = value,
            None => self.styles.push((property, value)),
        }
    }

    // Queries

    /// Depth-first search for the first element matching `predicate`.
    pub fn find(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }

    /// Mutable depth-first search for the first element matching `predicate`.
    pub fn find_mut(&mut self, predicate: &dyn Fn(&Element) -> bool) -> Option<&mut Element> {
        if predicate(self) {
            return Some(self);
        }
        self.children
            .iter_mut()
            .find_map(|child| child.find_mut(predicate))
    }

    /// Every element matching `predicate`, in document order.
    pub fn find_all(&self, predicate: &dyn Fn(&Element) -> bool) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect(predicate, &mut found);
        found
    }

    fn collect<'a>(&'a self, predicate: &dyn Fn(&Element) -> bool, found: &mut Vec<&'a Element>) {
        if predicate(self) {
            found.push(self);
        }
        for child in &self.children {
            child.collect(predicate, found);
        }
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find(&|e| e.id() == Some(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.find_mut(&|e| e.id() == Some(id))
    }

    /// Apply `f` to this element and every descendant.
    pub fn for_each_mut(&mut self, f: &mut dyn FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            child.for_each_mut(f);
        }
    }

    // Serialization

    /// Serialize the subtree to HTML. Attribute values and text are escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        let _ = write!(out, "<{}", self.tag);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {}=\"{}\"", name, v_htmlescape::escape(value));
        }
        if !self.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", v_htmlescape::escape(&self.classes.join(" ")));
        }
        let mut styles: Vec<String> = self
            .styles
            .iter()
            .map(|(p, v)| format!("{p}: {v}"))
            .collect();
        if self.hidden {
            styles.push("display: none".to_string());
        }
        if !styles.is_empty() {
            let _ = write!(out, " style=\"{}\"", v_htmlescape::escape(&styles.join("; ")));
        }
        out.push('>');
        if VOID_TAGS.contains(&self.tag.as_str()) {
            return;
        }
        let _ = write!(out, "{}", v_htmlescape::escape(&self.text));
        for child in &self.children {
            child.write_html(out);
        }
        let _ = write!(out, "</{}>", self.tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_classes() {
        let mut el = Element::new("button")
            .with_class("btn btn-primary")
            .with_attr("type", "button")
            .with_text("Go");
        assert!(el.has_class("btn"));
        el.add_class("btn is-valid");
        assert_eq!(el.classes(), ["btn", "btn-primary", "is-valid"]);
        el.toggle_class("is-valid", false);
        assert!(!el.has_class("is-valid"));
        assert_eq!(el.attr("type"), Some("button"));
    }

    #[test]
    fn test_set_attr_keeps_position() {
        let mut el = Element::new("div").with_attr("id", "a").with_attr("role", "x");
        el.set_attr("id", "b");
        assert_eq!(el.attributes()[0], ("id".to_string(), "b".to_string()));
        el.set_flag("disabled", true);
        assert_eq!(el.attr("disabled"), Some("disabled"));
        el.set_flag("disabled", false);
        assert!(!el.has_attr("disabled"));
    }

    #[test]
    fn test_find_by_id() {
        let mut tree = Element::new("div").with_attr("id", "root").with_child(
            Element::new("ul").with_child(Element::new("li").with_attr("id", "row-1")),
        );
        assert_eq!(tree.find_by_id("row-1").map(Element::tag), Some("li"));
        tree.find_by_id_mut("row-1").unwrap().set_text("hi");
        assert_eq!(tree.find_by_id("row-1").unwrap().text(), "hi");
        assert!(tree.find_by_id("missing").is_none());
        assert_eq!(tree.find_all(&|e| e.tag() == "li" || e.tag() == "ul").len(), 2);
    }

    #[test]
    fn test_to_html_escapes_and_hides() {
        let el = Element::new("div")
            .with_class("menu")
            .with_style("max-height", "300px")
            .with_hidden(true)
            .with_child(Element::new("input").with_attr("value", "a\"b"))
            .with_child(Element::new("span").with_text("<x>"));
        assert_eq!(
            el.to_html(),
            "<div class=\"menu\" style=\"max-height: 300px; display: none\">\
             <input value=\"a&quot;b\"><span>&lt;x&gt;</span></div>"
        );
    }
}
