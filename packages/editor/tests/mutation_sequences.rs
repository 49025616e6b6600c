//! Random mutation sequences
//!
//! This tests:
//! - Structural invariants after every step (unique ids, sections-only
//!   children, parent/children agreement, acyclicity)
//! - Rejected mutations leave the forest untouched
//! - Undo walks back through every recorded snapshot
//! - Dropping before then after a sibling leaves the rest of the list alone

use proptest::prelude::*;
use workbench_editor::{engine, DropPosition, Mutation, UndoStack};
use workbench_model::{DataType, Forest, NodeId, NodePatch, RoleTag, SchemaNode};

const POOL: usize = 8;

fn node_id() -> impl Strategy<Value = NodeId> {
    (0..POOL).prop_map(|n| NodeId::new(format!("n{}", n)))
}

fn position() -> impl Strategy<Value = DropPosition> {
    prop_oneof![
        Just(DropPosition::Before),
        Just(DropPosition::After),
        Just(DropPosition::Inside),
    ]
}

fn new_node() -> impl Strategy<Value = SchemaNode> {
    (node_id(), any::<bool>()).prop_map(|(id, section)| {
        if section {
            SchemaNode::section(id, None)
        } else {
            SchemaNode::field(id, "Field", DataType::Text)
        }
    })
}

fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        3 => (new_node(), proptest::option::of(node_id()))
            .prop_map(|(node, parent)| Mutation::AddNode { node, parent }),
        1 => node_id().prop_map(|node_id| Mutation::RemoveNode { node_id }),
        1 => node_id().prop_map(|node_id| Mutation::UpdateNode {
            node_id,
            patch: NodePatch::new().role(RoleTag::Outcome).data_type(DataType::Boolean),
        }),
        1 => node_id().prop_map(|node_id| Mutation::ToggleExpand { node_id }),
        4 => (node_id(), node_id(), position()).prop_map(|(dragged_id, target_id, position)| {
            Mutation::MoveNode { dragged_id, target_id, position }
        }),
        2 => (node_id(), proptest::option::of(node_id()))
            .prop_map(|(node_id, new_parent)| Mutation::ChangeParent { node_id, new_parent }),
        1 => node_id().prop_map(|node_id| Mutation::MoveUp { node_id }),
        1 => node_id().prop_map(|node_id| Mutation::MoveDown { node_id }),
    ]
}

proptest! {
    /// Every reachable forest satisfies the structural invariants.
    #[test]
    fn invariants_hold_after_every_step(steps in proptest::collection::vec(mutation(), 1..60)) {
        let mut forest = Forest::new();

        for step in &steps {
            forest = step.apply(&forest);
            prop_assert!(
                forest.check_integrity().is_ok(),
                "Integrity broken after {:?}: {:?}",
                step,
                forest.check_integrity()
            );
            prop_assert_eq!(forest.flatten().len(), forest.len());
        }
    }

    /// A mutation that fails validation returns the very same forest.
    #[test]
    fn rejected_mutations_are_noops(steps in proptest::collection::vec(mutation(), 1..60)) {
        let mut forest = Forest::new();

        for step in &steps {
            let next = step.apply(&forest);
            if step.validate(&forest).is_err() {
                prop_assert!(next.ptr_eq(&forest));
            }
            forest = next;
        }
    }

    /// Moves never detach a subtree from its descendants.
    #[test]
    fn moves_keep_subtrees_intact(
        steps in proptest::collection::vec(mutation(), 1..40),
        dragged in node_id(),
        target in node_id(),
        position in position(),
    ) {
        let forest = steps.iter().fold(Forest::new(), |forest, step| step.apply(&forest));
        let before = forest.descendants(&dragged);

        let move_cmd = Mutation::MoveNode {
            dragged_id: dragged.clone(),
            target_id: target,
            position,
        };
        let next = move_cmd.apply(&forest);

        prop_assert_eq!(next.descendants(&dragged), before);
        prop_assert_eq!(next.len(), forest.len());
    }

    /// Before then after places the dragged node right behind the target.
    #[test]
    fn before_then_after_keeps_other_siblings(
        len in 2..POOL,
        picks in (0..POOL, 0..POOL),
    ) {
        let ids: Vec<NodeId> = (0..len).map(|n| NodeId::new(format!("n{}", n))).collect();
        let forest = ids.iter().fold(Forest::new(), |forest, id| {
            engine::add_node(&forest, SchemaNode::field(id.clone(), "Field", DataType::Text), None)
        });
        let (i, j) = (picks.0 % len, picks.1 % len);
        prop_assume!(i != j);
        let (a, b) = (&ids[i], &ids[j]);

        let step = engine::move_node(&forest, a, b, DropPosition::Before);
        let next = engine::move_node(&step, a, b, DropPosition::After);

        let roots = next.roots();
        let at = roots.iter().position(|id| id == a).unwrap();
        prop_assert!(at > 0);
        prop_assert_eq!(&roots[at - 1], b);

        let others = |list: &[NodeId]| list.iter().filter(|id| *id != a).cloned().collect::<Vec<_>>();
        prop_assert_eq!(others(roots), others(forest.roots()));

        if j == i + 1 {
            let mut swapped = ids.clone();
            swapped.swap(i, j);
            prop_assert_eq!(roots, swapped.as_slice());
        }
    }

    /// Undoing every recorded step returns to the empty forest.
    #[test]
    fn undo_unwinds_everything(steps in proptest::collection::vec(mutation(), 1..40)) {
        let mut stack = UndoStack::with_max_levels(0);
        let mut forest = Forest::new();

        for step in &steps {
            if let Ok(next) = stack.apply(step, &forest) {
                forest = next;
            }
        }

        while let Some(previous) = stack.undo() {
            forest = previous;
        }
        prop_assert!(forest.is_empty());
    }
}

#[test]
fn test_move_then_delete_then_undo() {
    let mut stack = UndoStack::new();
    let mut forest = Forest::new();

    for mutation in [
        Mutation::AddNode {
            node: SchemaNode::section("root", Some("Root")),
            parent: None,
        },
        Mutation::AddNode {
            node: SchemaNode::section("child1", Some("Child 1")),
            parent: Some(NodeId::new("root")),
        },
        Mutation::AddNode {
            node: SchemaNode::section("child2", Some("Child 2")),
            parent: Some(NodeId::new("root")),
        },
    ] {
        forest = stack.apply(&mutation, &forest).unwrap();
    }

    // Move child2 into child1
    let move_mut = Mutation::MoveNode {
        dragged_id: NodeId::new("child2"),
        target_id: NodeId::new("child1"),
        position: DropPosition::Inside,
    };
    forest = stack.apply(&move_mut, &forest).unwrap();
    assert_eq!(forest.children(&NodeId::new("child1")), &[NodeId::new("child2")]);

    // Delete child1 (takes child2 with it)
    let delete_mut = Mutation::RemoveNode {
        node_id: NodeId::new("child1"),
    };
    forest = stack.apply(&delete_mut, &forest).unwrap();
    assert!(!forest.contains(&NodeId::new("child2")));

    // Undo delete restores both
    forest = stack.undo().unwrap();
    assert!(forest.contains(&NodeId::new("child1")));
    assert!(forest.contains(&NodeId::new("child2")));

    // Undo move puts child2 back under root
    forest = stack.undo().unwrap();
    assert_eq!(
        forest.children(&NodeId::new("root")),
        &[NodeId::new("child1"), NodeId::new("child2")]
    );
}
