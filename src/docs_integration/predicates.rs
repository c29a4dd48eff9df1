/*!
# Tag Predicates

Композируемые предикаты над узлами DOM (`kuchikikiki::NodeRef`).

Predicates are pure: they read the node name, its attributes and its
ancestor chain, never mutate, and return `false` for anything unexpected
(text nodes, missing attributes, detached nodes).

```rust,ignore
let member_link = tag("a").with_parent(tag("td").with_parent(tag("tr")));
let hidden_row = tag("tr").and(has_class("hideInheritedProperty"));
```
*/

use kuchikikiki::NodeRef;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

type PredicateFn = dyn Fn(&NodeRef) -> bool + Send + Sync;

/// Именованный предикат над узлом DOM
#[derive(Clone)]
pub struct Predicate {
    description: String,
    test: Arc<PredicateFn>,
}

impl Predicate {
    pub fn new(
        description: impl Into<String>,
        test: impl Fn(&NodeRef) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            test: Arc::new(test),
        }
    }

    /// Проверяет узел
    pub fn matches(&self, node: &NodeRef) -> bool {
        (self.test)(node)
    }

    pub fn and(self, other: Predicate) -> Predicate {
        let description = format!("({} and {})", self.description, other.description);
        Predicate::new(description, move |node| {
            self.matches(node) && other.matches(node)
        })
    }

    pub fn or(self, other: Predicate) -> Predicate {
        let description = format!("({} or {})", self.description, other.description);
        Predicate::new(description, move |node| {
            self.matches(node) || other.matches(node)
        })
    }

    pub fn negate(self) -> Predicate {
        let description = format!("not {}", self.description);
        Predicate::new(description, move |node| !self.matches(node))
    }

    /// `self` matches and the direct parent matches `parent`
    pub fn with_parent(self, parent_predicate: Predicate) -> Predicate {
        self.and(parent(parent_predicate))
    }

    /// Все подходящие потомки `root` в порядке документа
    pub fn select_in(&self, root: &NodeRef) -> Vec<NodeRef> {
        root.descendants().filter(|node| self.matches(node)).collect()
    }

    /// Первый подходящий потомок `root`
    pub fn find_in(&self, root: &NodeRef) -> Option<NodeRef> {
        root.descendants().find(|node| self.matches(node))
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.description).finish()
    }
}

// ---------------------------------------------------------------------------
// Accessors
// ---------------------------------------------------------------------------

/// Local tag name of an element node, `None` for any other node kind.
pub fn element_name(node: &NodeRef) -> Option<String> {
    node.as_element()
        .map(|element| (&*element.name.local).to_string())
}

/// Значение атрибута элемента
pub fn attr(node: &NodeRef, name: &str) -> Option<String> {
    node.as_element()
        .and_then(|element| element.attributes.borrow().get(name).map(str::to_string))
}

/// Классы элемента (пустой список для не-элементов и отсутствующего атрибута)
pub fn classes(node: &NodeRef) -> Vec<String> {
    attr(node, "class")
        .map(|value| value.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Visible text of a node, whitespace-trimmed.
pub fn visible_text(node: &NodeRef) -> String {
    node.text_contents().trim().to_string()
}

/// Short human-readable description used in error messages.
pub fn describe(node: &NodeRef) -> String {
    match element_name(node) {
        Some(name) => format!("<{}>", name),
        None if node.as_text().is_some() => "text node".to_string(),
        None if node.as_comment().is_some() => "comment".to_string(),
        None => "non-element node".to_string(),
    }
}

/// n-th ancestor (`1` = parent).
pub fn nth_ancestor(node: &NodeRef, n: usize) -> Option<NodeRef> {
    let mut current = node.clone();
    for _ in 0..n {
        current = current.parent()?;
    }
    Some(current)
}

/// Immediate element children, skipping text and comments.
pub fn element_children(node: &NodeRef) -> Vec<NodeRef> {
    node.children()
        .filter(|child| child.as_element().is_some())
        .collect()
}

/// Previous sibling that is an element.
pub fn previous_element_sibling(node: &NodeRef) -> Option<NodeRef> {
    let mut current = node.previous_sibling();
    while let Some(sibling) = current {
        if sibling.as_element().is_some() {
            return Some(sibling);
        }
        current = sibling.previous_sibling();
    }
    None
}

// ---------------------------------------------------------------------------
// Predicate constructors
// ---------------------------------------------------------------------------

/// Элемент с заданным именем тега
pub fn tag(name: &str) -> Predicate {
    let expected = name.to_ascii_lowercase();
    Predicate::new(format!("<{}>", expected), move |node| {
        node.as_element()
            .is_some_and(|element| &*element.name.local == expected.as_str())
    })
}

/// Элемент с одним из имен тегов
pub fn tag_in(names: &[&str]) -> Predicate {
    let expected: BTreeSet<String> = names.iter().map(|n| n.to_ascii_lowercase()).collect();
    let description = format!(
        "one of <{}>",
        expected.iter().cloned().collect::<Vec<_>>().join("|")
    );
    Predicate::new(description, move |node| {
        node.as_element()
            .is_some_and(|element| expected.contains(&*element.name.local))
    })
}

pub fn has_attr(name: &str) -> Predicate {
    let name = name.to_string();
    Predicate::new(format!("[{}]", name), move |node| attr(node, &name).is_some())
}

pub fn attr_eq(name: &str, value: &str) -> Predicate {
    let name = name.to_string();
    let value = value.to_string();
    Predicate::new(format!("[{}={:?}]", name, value), move |node| {
        attr(node, &name).is_some_and(|actual| actual == value)
    })
}

/// Значение атрибута входит в набор (`is-one-of`)
pub fn attr_one_of(name: &str, values: &[String]) -> Predicate {
    let name = name.to_string();
    let values: BTreeSet<String> = values.iter().cloned().collect();
    let description = format!("[{} in {:?}]", name, values);
    Predicate::new(description, move |node| {
        attr(node, &name).is_some_and(|actual| values.contains(&actual))
    })
}

pub fn attr_contains(name: &str, needle: &str) -> Predicate {
    let name = name.to_string();
    let needle = needle.to_string();
    Predicate::new(format!("[{}*={:?}]", name, needle), move |node| {
        attr(node, &name).is_some_and(|actual| actual.contains(&needle))
    })
}

/// Элемент несет класс `class_name` (сравнение по токенам)
pub fn has_class(class_name: &str) -> Predicate {
    let class_name = class_name.to_string();
    Predicate::new(format!(".{}", class_name), move |node| {
        classes(node).iter().any(|c| *c == class_name)
    })
}

/// Элемент несет хотя бы один из классов
pub fn has_any_class(class_names: &BTreeSet<String>) -> Predicate {
    let class_names = class_names.clone();
    let description = format!("any class of {:?}", class_names);
    Predicate::new(description, move |node| {
        classes(node).iter().any(|c| class_names.contains(c))
    })
}

/// Хотя бы один класс начинается с `prefix`
pub fn class_prefix(prefix: &str) -> Predicate {
    let prefix = prefix.to_string();
    Predicate::new(format!(".{}*", prefix), move |node| {
        classes(node).iter().any(|c| c.starts_with(&prefix))
    })
}

/// Direct parent satisfies `inner`.
pub fn parent(inner: Predicate) -> Predicate {
    let description = format!("parent {}", inner.description);
    Predicate::new(description, move |node| {
        node.parent().is_some_and(|p| inner.matches(&p))
    })
}

/// Some ancestor (parent, grandparent, ...) satisfies `inner`.
pub fn ancestor(inner: Predicate) -> Predicate {
    let description = format!("ancestor {}", inner.description);
    Predicate::new(description, move |node| {
        node.ancestors().any(|a| inner.matches(&a))
    })
}

/// At least one immediate element child satisfies `inner`.
pub fn has_child(inner: Predicate) -> Predicate {
    let description = format!("child {}", inner.description);
    Predicate::new(description, move |node| {
        node.children().any(|child| inner.matches(&child))
    })
}
