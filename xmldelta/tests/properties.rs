//! End-to-end checks of diff, patch and script encoding on hand-built trees.

use xmldelta::{diff, patch, DiffMode, EditScript, Element, Error, InsertKind, Node, Op};

fn attr(name: &str, value: Option<&str>) -> Op {
    Op::Attr {
        name: name.to_string(),
        value: value.map(str::to_string),
    }
}

#[test]
fn attribute_changes_are_exact() {
    let left = Node::document(vec![Element::new("e")
        .with_attr("a", "1")
        .with_attr("b", "2")
        .into()]);
    let right = Node::document(vec![Element::new("e")
        .with_attr("b", "2")
        .with_attr("c", "3")
        .into()]);

    let script = diff(&left, &right, DiffMode::Transform).unwrap();
    assert_eq!(
        script.ops(),
        &[Op::Change {
            index: 0,
            name: Some("e".into()),
            children: vec![attr("a", None), attr("c", Some("3"))],
        }]
    );

    let mut patched = left.clone();
    patch(&mut patched, &script).unwrap();
    assert_eq!(patched, right);
}

#[test]
fn rename_becomes_remove_and_insert() {
    let left: Node = Element::new("r")
        .with_child(Node::element("a"))
        .with_child(Node::element("b"))
        .into();
    let right: Node = Element::new("r")
        .with_child(Node::element("a"))
        .with_child(Node::element("c"))
        .into();

    let script = diff(&left, &right, DiffMode::Transform).unwrap();
    assert_eq!(
        script.ops(),
        &[
            Op::Remove {
                index: 1,
                name: Some("b".into()),
            },
            Op::Insert {
                index: 1,
                kind: InsertKind::Element,
                name: Some("c".into()),
                children: vec![],
            },
        ]
    );

    let mut patched = left.clone();
    patch(&mut patched, &script).unwrap();
    assert_eq!(patched, right);
}

#[test]
fn null_and_empty_values_stay_distinct() {
    let null: Node = Element::new("p").with_child(Node::Text(None)).into();
    let empty: Node = Element::new("p").with_child(Node::text("")).into();

    let to_empty = diff(&null, &empty, DiffMode::Transform).unwrap();
    let to_null = diff(&empty, &null, DiffMode::Transform).unwrap();

    assert!(to_empty.to_xml().contains("<Value idx=\"0\"></Value>"));
    assert!(to_null.to_xml().contains("<Value idx=\"0\"/>"));

    // Through the encoding and back, the distinction must survive a patch.
    let mut patched = null.clone();
    patch(&mut patched, &EditScript::from_xml(&to_empty.to_xml()).unwrap()).unwrap();
    assert_eq!(patched, empty);

    let mut patched = empty.clone();
    patch(&mut patched, &EditScript::from_xml(&to_null.to_xml()).unwrap()).unwrap();
    assert_eq!(patched, null);
}

#[test]
fn remove_checks_the_node_name() {
    let mut tree: Node = Element::new("r").with_child(Node::element("y")).into();
    let script = EditScript::from_ops(vec![Op::Remove {
        index: 0,
        name: Some("x".into()),
    }]);

    let err = patch(&mut tree, &script).unwrap_err();
    assert!(
        matches!(err, Error::StructuralMismatch { index: 0, .. }),
        "got: {:?}",
        err
    );
    assert_eq!(tree.children(), &[Node::element("y")]);
}

#[test]
fn identical_trees_produce_empty_scripts() {
    let tree = Node::document(vec![Element::new("doc")
        .with_attr("v", "1")
        .with_child(Node::comment("c"))
        .with_child(
            Element::new("p")
                .with_child(Node::text("hello"))
                .with_child(Node::cdata("<x>"))
                .into(),
        )
        .into()]);

    for mode in [DiffMode::Transform, DiffMode::Merge] {
        assert!(diff(&tree, &tree, mode).unwrap().is_empty());
    }
}

#[test]
fn merge_keeps_left_only_nodes() {
    let left: Node = Element::new("list")
        .with_child(Element::new("a").with_attr("k", "old").into())
        .with_child(Node::element("only-left"))
        .into();
    let right: Node = Element::new("list")
        .with_child(Element::new("a").with_attr("k", "new").into())
        .with_child(Node::element("only-right"))
        .into();

    let script = diff(&left, &right, DiffMode::Merge).unwrap();
    assert!(script
        .ops()
        .iter()
        .all(|op| !matches!(op, Op::Remove { .. })));

    let mut merged = left.clone();
    patch(&mut merged, &script).unwrap();
    let expected: Node = Element::new("list")
        .with_child(Element::new("a").with_attr("k", "new").into())
        .with_child(Node::element("only-left"))
        .with_child(Node::element("only-right"))
        .into();
    assert_eq!(merged, expected);
}

#[test]
fn text_inserted_before_existing_text() {
    let left: Node = Element::new("p").with_child(Node::text("tail")).into();
    let right: Node = Element::new("p")
        .with_child(Node::comment("note"))
        .with_child(Node::text("tail"))
        .into();

    let script = diff(&left, &right, DiffMode::Transform).unwrap();
    let mut patched = left.clone();
    patch(&mut patched, &script).unwrap();
    assert_eq!(patched, right);

    let left: Node = Element::new("p").with_child(Node::element("b")).into();
    let right: Node = Element::new("p")
        .with_child(Node::text("head"))
        .with_child(Node::element("b"))
        .into();

    let script = diff(&left, &right, DiffMode::Transform).unwrap();
    let mut patched = left.clone();
    patch(&mut patched, &script).unwrap();
    assert_eq!(patched, right);
}

#[test]
fn root_name_mismatch_is_rejected() {
    let left = Node::element("a");
    let right = Node::element("b");
    let err = diff(&left, &right, DiffMode::Transform).unwrap_err();
    assert!(matches!(err, Error::StructuralMismatch { .. }), "got: {:?}", err);
}

#[test]
fn failed_patch_keeps_earlier_ops() {
    let mut tree: Node = Element::new("r").with_child(Node::element("a")).into();
    let script = EditScript::from_ops(vec![
        attr("k", Some("v")),
        Op::Change {
            index: 5,
            name: Some("a".into()),
            children: vec![],
        },
    ]);

    let err = patch(&mut tree, &script).unwrap_err();
    assert!(
        matches!(err, Error::IndexOutOfRange { index: 5, len: 1 }),
        "got: {:?}",
        err
    );
    assert_eq!(tree.attributes().and_then(|a| a.get("k")).map(String::as_str), Some("v"));
}
