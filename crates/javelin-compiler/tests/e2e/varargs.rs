//! Calls to methods with a variadic last parameter

use super::harness::*;
use javelin_compiler::{Ast, AstBuilder, CompilerConfig, NodeId};

/// `class Main { static int sum(int... xs) { return xs.length; }
///   static int pick(int first, int... rest) { return first; }
///   static void main(String[] args) { int[] arr; body } }`
fn vararg_program(body: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> Ast {
    let mut b = AstBuilder::new();
    let io = b.import("io");

    let sum_ret = b.ty("int");
    let xs_ty = b.vararg_ty("int");
    let xs = b.param("xs", xs_ty);
    let xs_ref = b.var("xs");
    let len = b.array_length(xs_ref);
    let ret = b.ret(Some(len));
    let sum = b.static_method("sum", sum_ret, &[xs], &[], &[ret]);

    let pick_ret = b.ty("int");
    let first_ty = b.ty("int");
    let first = b.param("first", first_ty);
    let rest_ty = b.vararg_ty("int");
    let rest = b.param("rest", rest_ty);
    let first_ref = b.var("first");
    let ret = b.ret(Some(first_ref));
    let pick = b.static_method("pick", pick_ret, &[first, rest], &[], &[ret]);

    let arr_ty = b.array_ty("int");
    let arr = b.var_decl("arr", arr_ty);
    let stmts = body(&mut b);
    let main = b.main_method("args", &[arr], &stmts);

    let class = b.class("Main", None, &[], &[sum, pick, main]);
    let root = b.program(&[io], class);
    b.finish(root)
}

/// `io.println(Main.<name>(args));`
fn print_call(b: &mut AstBuilder, name: &str, args: &[NodeId]) -> NodeId {
    let class = b.var("Main");
    let call = b.call(class, name, args);
    println(b, call)
}

#[test]
fn test_trailing_arguments_travel_as_one_array() {
    let ast = vararg_program(|b| {
        let args = [b.int(1), b.int(2), b.int(3)];
        vec![print_call(b, "sum", &args)]
    });

    let output = compile(ast, CompilerConfig::default());
    assert!(output
        .jasmin
        .contains(".method public static sum([I)I\n"));

    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("    iconst_3\n    newarray int\n"), "{}", main);
    assert_eq!(main.matches("iastore").count(), 3);
    assert!(main.contains("invokestatic Main/sum([I)I\n"));
    assert!(main.contains("invokestatic io/println(I)V\n"));
}

#[test]
fn test_array_argument_is_passed_through() {
    // arr = new int[2]; io.println(Main.sum(arr));
    let ast = vararg_program(|b| {
        let two = b.int(2);
        let alloc = b.new_int_array(two);
        let init = b.assign("arr", alloc);
        let arr = b.var("arr");
        vec![init, print_call(b, "sum", &[arr])]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");
    assert_eq!(main.matches("newarray int").count(), 1, "{}", main);
    assert!(main.contains("    aload_1\n    invokestatic Main/sum([I)I\n"));
}

#[test]
fn test_missing_varargs_become_an_empty_array() {
    // io.println(Main.pick(7));
    let ast = vararg_program(|b| {
        let seven = b.int(7);
        vec![print_call(b, "pick", &[seven])]
    });

    let output = compile(ast, CompilerConfig::default());
    assert!(output
        .jasmin
        .contains(".method public static pick(I[I)I\n"));

    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("    iconst_0\n    newarray int\n"), "{}", main);
    assert!(!main.contains("iastore"));
    assert!(main.contains("invokestatic Main/pick(I[I)I\n"));
}
