use workbench_model::{Forest, SchemaNode};

/// Visitor pattern for traversing a schema forest immutably
///
/// Default implementations walk the entire forest depth-first, in
/// sibling order. Each callback receives the owning section, if any.
/// Override specific visit_* methods to act on nodes.
pub trait Visitor: Sized {
    fn visit_forest(&mut self, forest: &Forest) {
        walk_forest(self, forest);
    }

    fn visit_section(
        &mut self,
        forest: &Forest,
        section: &SchemaNode,
        _parent: Option<&SchemaNode>,
    ) {
        walk_section(self, forest, section);
    }

    fn visit_field(&mut self, _field: &SchemaNode, _parent: Option<&SchemaNode>) {
        // Leaf node, no children to walk
    }
}

pub fn walk_forest<V: Visitor>(visitor: &mut V, forest: &Forest) {
    for id in forest.roots() {
        if let Some(node) = forest.get(id) {
            walk_node(visitor, forest, node, None);
        }
    }
}

pub fn walk_section<V: Visitor>(visitor: &mut V, forest: &Forest, section: &SchemaNode) {
    for id in section.children() {
        if let Some(child) = forest.get(id) {
            walk_node(visitor, forest, child, Some(section));
        }
    }
}

pub fn walk_node<V: Visitor>(
    visitor: &mut V,
    forest: &Forest,
    node: &SchemaNode,
    parent: Option<&SchemaNode>,
) {
    if node.is_section() {
        visitor.visit_section(forest, node, parent);
    } else {
        visitor.visit_field(node, parent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workbench_model::{DataType, NodeId};

    #[derive(Default)]
    struct Collect {
        seen: Vec<(String, Option<String>)>,
    }

    impl Visitor for Collect {
        fn visit_section(
            &mut self,
            forest: &Forest,
            section: &SchemaNode,
            parent: Option<&SchemaNode>,
        ) {
            self.seen.push((
                section.id.to_string(),
                parent.map(|p| p.id.to_string()),
            ));
            walk_section(self, forest, section);
        }

        fn visit_field(&mut self, field: &SchemaNode, parent: Option<&SchemaNode>) {
            self.seen
                .push((field.id.to_string(), parent.map(|p| p.id.to_string())));
        }
    }

    #[test]
    fn test_visits_in_order_with_parent() {
        let mut edit = Forest::new().edit();
        edit.insert(SchemaNode::section("s1", None)).unwrap();
        edit.insert(SchemaNode::field("f1", "A", DataType::Text)).unwrap();
        edit.insert(SchemaNode::field("f2", "B", DataType::Text)).unwrap();
        edit.attach(&NodeId::new("s1"), None, None).unwrap();
        edit.attach(&NodeId::new("f1"), Some(&NodeId::new("s1")), None).unwrap();
        edit.attach(&NodeId::new("f2"), None, None).unwrap();
        let forest = edit.finish();

        let mut collect = Collect::default();
        collect.visit_forest(&forest);

        assert_eq!(
            collect.seen,
            vec![
                ("s1".to_string(), None),
                ("f1".to_string(), Some("s1".to_string())),
                ("f2".to_string(), None),
            ]
        );
    }
}
