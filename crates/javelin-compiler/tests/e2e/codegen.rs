//! Jasmin output for arrays, literals and boolean negation

use super::harness::*;
use javelin_compiler::{Ast, AstBuilder, CompilerConfig, NodeId};

/// `import io; class Main { static void main(String[] args) { int[] arr; body } }`
fn array_program(body: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> Ast {
    let mut b = AstBuilder::new();
    let io = b.import("io");
    let arr_ty = b.array_ty("int");
    let arr = b.var_decl("arr", arr_ty);
    let stmts = body(&mut b);
    let main = b.main_method("args", &[arr], &stmts);
    let class = b.class("Main", None, &[], &[main]);
    let root = b.program(&[io], class);
    b.finish(root)
}

#[test]
fn test_array_allocation_store_and_load() {
    // arr = new int[3]; arr[0] = 200; io.println(arr[0]); io.println(arr.length);
    let ast = array_program(|b| {
        let three = b.int(3);
        let alloc = b.new_int_array(three);
        let init = b.assign("arr", alloc);
        let zero = b.int(0);
        let value = b.int(200);
        let store = b.array_assign("arr", zero, value);
        let arr = b.var("arr");
        let zero2 = b.int(0);
        let read = b.array_access(arr, zero2);
        let print_elem = println(b, read);
        let arr2 = b.var("arr");
        let len = b.array_length(arr2);
        let print_len = println(b, len);
        vec![init, store, print_elem, print_len]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");

    assert!(main.contains("    iconst_3\n    newarray int\n    astore_1\n"), "{}", main);
    assert!(main.contains("    aload_1\n    iconst_0\n    sipush 200\n    iastore\n"));
    assert!(main.contains("    aload_1\n    iconst_0\n    iaload\n"));
    assert!(main.contains("    aload_1\n    arraylength\n"));
    assert_eq!(main.matches("invokestatic io/println(I)V").count(), 2);
    assert!(main.contains(".limit stack 3\n"));
}

#[test]
fn test_array_literal_fills_each_slot() {
    // arr = [4, 5]; io.println(arr[1]);
    let ast = array_program(|b| {
        let four = b.int(4);
        let five = b.int(5);
        let literal = b.array(&[four, five]);
        let init = b.assign("arr", literal);
        let arr = b.var("arr");
        let one = b.int(1);
        let read = b.array_access(arr, one);
        vec![init, println(b, read)]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");

    assert_eq!(main.matches("newarray int").count(), 1, "{}", main);
    assert_eq!(main.matches("iastore").count(), 2);
    assert!(main.contains("    iconst_0\n    iconst_4\n    iastore\n"));
    assert!(main.contains("    iconst_1\n    iconst_5\n    iastore\n"));
}

#[test]
fn test_integer_constants_pick_the_shortest_push() {
    let ast = main_program(&[], |b| {
        [-1, 5, -100, 1000, 40000, -40000]
            .into_iter()
            .map(|value| {
                let lit = b.int(value);
                println(b, lit)
            })
            .collect()
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");
    for push in [
        "iconst_m1",
        "iconst_5",
        "bipush -100",
        "sipush 1000",
        "ldc 40000",
        "ldc -40000",
    ] {
        assert!(
            main.contains(&format!("    {}\n    invokestatic io/println(I)V\n", push)),
            "missing {} in {}",
            push,
            main
        );
    }
}

#[test]
fn test_not_is_xor_with_one() {
    // io.println(!true);
    let ast = main_program(&[], |b| {
        let t = b.boolean(true);
        let not = b.not(t);
        vec![println(b, not)]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("    iconst_1\n    iconst_1\n    ixor\n    istore_1\n"), "{}", main);
    assert!(main.contains("    iload_1\n    invokestatic io/println(Z)V\n"));
}

#[test]
fn test_class_skeleton() {
    let ast = main_program(&[], |_| Vec::new());
    let output = compile(ast, CompilerConfig::default());

    assert!(output
        .jasmin
        .starts_with(".class public Main\n.super java/lang/Object\n"));
    assert!(output.jasmin.contains(
        ".method public <init>()V\n    aload_0\n    invokespecial java/lang/Object/<init>()V\n    return\n.end method\n"
    ));
    assert!(output
        .jasmin
        .contains(".method public static main([Ljava/lang/String;)V\n"));
}
