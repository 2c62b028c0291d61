// SPDX-License-Identifier: PMPL-1.0-or-later
//! Uniform access to the two filter container shapes.
//!
//! A specification's top-level filter list and a nested [`FilterGroup`] both
//! hold an ordered list of children. [`Container`] lets the rewriter take,
//! clear and refill either one without caring which it holds.
//!
//! A `Container` borrows its group mutably. The rewriter recurses into a
//! nested group through a `Container` and only moves the group back into its
//! parent after that borrow has ended, so a group handed back to its parent
//! cannot be mutated through its adapter again.

use std::fmt;

use serde::{Deserialize, Serialize};
use virtassoc_filter::{FilterGroup, FilterNode, GroupOperator, Predicate};

/// Mutable adapter over a filter container.
#[derive(Debug)]
pub enum Container<'a> {
    /// Top-level filter list of a specification (implicit AND).
    Root(&'a mut Vec<FilterNode>),
    /// A nested boolean group.
    Group(&'a mut FilterGroup),
}

impl Container<'_> {
    fn children_mut(&mut self) -> &mut Vec<FilterNode> {
        match self {
            Container::Root(filters) => filters,
            Container::Group(group) => &mut group.children,
        }
    }

    fn children(&self) -> &[FilterNode] {
        match self {
            Container::Root(filters) => filters,
            Container::Group(group) => &group.children,
        }
    }

    /// Remove and return every child, leaving the container empty.
    pub fn take_children(&mut self) -> Vec<FilterNode> {
        std::mem::take(self.children_mut())
    }

    pub fn clear(&mut self) {
        self.children_mut().clear();
    }

    pub fn push(&mut self, node: impl Into<FilterNode>) {
        self.children_mut().push(node.into());
    }

    pub fn len(&self) -> usize {
        self.children().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children().is_empty()
    }

    /// Operator joining the children; the root list is a conjunction.
    pub fn operator(&self) -> GroupOperator {
        match self {
            Container::Root(_) => GroupOperator::And,
            Container::Group(group) => group.operator,
        }
    }
}

/// Position of a container in the filter tree: child indices from the root.
///
/// Rewriting only ever appends to a container, so a path recorded during the
/// rewrite stays valid until the tree is handed back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContainerPath(Vec<usize>);

impl ContainerPath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Path of the child at `index` of this container.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Display for ContainerPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root")?;
        for index in &self.0 {
            write!(f, "/{index}")?;
        }
        Ok(())
    }
}

/// Resolve `path` to a mutable container inside `filters`.
///
/// Returns `None` if the path does not lead to a group.
pub fn locate<'a>(filters: &'a mut Vec<FilterNode>, path: &ContainerPath) -> Option<Container<'a>> {
    let Some((first, rest)) = path.0.split_first() else {
        return Some(Container::Root(filters));
    };
    let mut group = match filters.get_mut(*first)? {
        FilterNode::Group(group) => group,
        FilterNode::Predicate(_) => return None,
    };
    for &index in rest {
        group = match group.children.get_mut(index)? {
            FilterNode::Group(inner) => inner,
            FilterNode::Predicate(_) => return None,
        };
    }
    Some(Container::Group(group))
}

/// Direct predicate children of the container at `path`.
pub fn predicates_at<'a>(
    filters: &'a [FilterNode],
    path: &ContainerPath,
) -> Option<Vec<&'a Predicate>> {
    let mut children = filters;
    for &index in &path.0 {
        children = match children.get(index)? {
            FilterNode::Group(group) => &group.children,
            FilterNode::Predicate(_) => return None,
        };
    }
    Some(children.iter().filter_map(FilterNode::as_predicate).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Vec<FilterNode> {
        vec![
            Predicate::equals("a", 1).into(),
            FilterGroup::or([
                Predicate::equals("b", 2).into(),
                FilterGroup::not_and([Predicate::equals("c", 3).into()]).into(),
            ])
            .into(),
        ]
    }

    #[test]
    fn test_take_children_empties_container() {
        let mut filters = tree();
        let mut root = Container::Root(&mut filters);
        let taken = root.take_children();
        assert_eq!(taken.len(), 2);
        assert!(root.is_empty());
    }

    #[test]
    fn test_group_push_and_clear() {
        let mut group = FilterGroup::new(GroupOperator::Or);
        let mut container = Container::Group(&mut group);
        container.push(Predicate::equals("x", 1));
        container.push(Predicate::equals("y", 2));
        assert_eq!(container.len(), 2);
        assert_eq!(container.operator(), GroupOperator::Or);
        container.clear();
        assert!(group.children.is_empty());
    }

    #[test]
    fn test_locate_nested_group() {
        let mut filters = tree();
        let path = ContainerPath::root().child(1).child(1);
        let mut container = locate(&mut filters, &path).unwrap();
        assert_eq!(container.operator(), GroupOperator::NotAnd);
        container.push(Predicate::equals("d", 4));

        let fields: Vec<&str> = predicates_at(&filters, &path)
            .unwrap()
            .into_iter()
            .map(Predicate::field)
            .collect();
        assert_eq!(fields, vec!["c", "d"]);
    }

    #[test]
    fn test_locate_rejects_predicate_index() {
        let mut filters = tree();
        assert!(locate(&mut filters, &ContainerPath::root().child(0)).is_none());
        assert!(locate(&mut filters, &ContainerPath::root().child(9)).is_none());
        assert!(predicates_at(&filters, &ContainerPath::root().child(0)).is_none());
    }

    #[test]
    fn test_path_display() {
        assert_eq!(ContainerPath::root().to_string(), "root");
        assert_eq!(ContainerPath::root().child(2).child(0).to_string(), "root/2/0");
    }

    #[test]
    fn test_path_indices() {
        let path = ContainerPath::root().child(2).child(0);
        assert!(ContainerPath::root().is_root());
        assert!(!path.is_root());
        assert_eq!(path.depth(), 2);
        assert_eq!(path.indices(), &[2, 0]);
    }
}
