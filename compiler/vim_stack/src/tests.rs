use super::*;

/// Shape of a nested list literal `[[[...]]]`, enough to mimic the
/// recursion of rendering or copying a deeply nested value.
enum Nested {
    Leaf,
    List(Box<Nested>),
}

fn build(depth: usize) -> Nested {
    let mut node = Nested::Leaf;
    for _ in 0..depth {
        node = Nested::List(Box::new(node));
    }
    node
}

fn render(node: &Nested, out: &mut String) {
    ensure_sufficient_stack(|| match node {
        Nested::Leaf => out.push('0'),
        Nested::List(inner) => {
            out.push('[');
            render(inner, out);
            out.push(']');
        }
    });
}

fn depth_of(node: &Nested) -> usize {
    ensure_sufficient_stack(|| match node {
        Nested::Leaf => 0,
        Nested::List(inner) => depth_of(inner) + 1,
    })
}

fn drop_iteratively(node: Nested) {
    let mut current = node;
    while let Nested::List(inner) = current {
        current = *inner;
    }
}

#[test]
fn shallow_render() {
    let mut out = String::new();
    render(&build(2), &mut out);
    assert_eq!(out, "[[0]]");
}

#[test]
fn deep_nesting_does_not_overflow() {
    let node = build(200_000);
    assert_eq!(depth_of(&node), 200_000);
    drop_iteratively(node);
}

#[test]
fn passes_result_through() {
    let result: Result<i64, String> = ensure_sufficient_stack(|| Ok(7));
    assert_eq!(result, Ok(7));
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn remaining_stack_is_reported() {
    assert!(remaining_stack().is_some_and(|bytes| bytes > 0));
}
