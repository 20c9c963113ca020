//! Constant folding and propagation through the whole pipeline

use super::harness::*;
use javelin_compiler::ir::{CallKind, IrInstr, Operand};
use javelin_compiler::{Compiler, CompilerConfig, PrettyPrint, RegisterAllocation};

fn optimized() -> CompilerConfig {
    CompilerConfig::new(true, RegisterAllocation::Skip)
}

/// `io.println(1 + 2 * 3);`
fn one_plus_two_times_three() -> javelin_compiler::Ast {
    main_program(&[], |b| {
        let one = b.int(1);
        let two = b.int(2);
        let three = b.int(3);
        let mul = b.binary("*", two, three);
        let add = b.binary("+", one, mul);
        vec![println(b, add)]
    })
}

#[test]
fn test_folded_expression_is_one_literal() {
    let output = compile(one_plus_two_times_three(), optimized());

    let main = output.ir.method("main").unwrap();
    match &main.instructions[0] {
        IrInstr::Call(call) => {
            assert_eq!(call.kind, CallKind::InvokeStatic);
            assert_eq!(call.args, vec![Operand::int(7)]);
        }
        other => panic!("expected a call, got {}", other),
    }
    assert!(output
        .jasmin
        .contains("    bipush 7\n    invokestatic io/println(I)V\n"));
    assert!(!output.jasmin.contains("imul"));
}

#[test]
fn test_unoptimized_expression_uses_two_temporaries() {
    let output = compile(one_plus_two_times_three(), CompilerConfig::default());

    let text = output.ir.method("main").unwrap().pretty_print();
    assert!(text.contains("t0.i32 :=.i32 2.i32 *.i32 3.i32;"), "{}", text);
    assert!(text.contains("t1.i32 :=.i32 1.i32 +.i32 t0.i32;"));
    assert!(text.contains("invokestatic(io, \"println\", t1.i32).V;"));

    let main = method_body(&output.jasmin, "main");
    let mul = main.find("imul").unwrap();
    let add = main.find("iadd").unwrap();
    assert!(mul < add, "{}", main);
    assert!(main.contains("    iconst_2\n    iconst_3\n    imul\n    istore_1\n"));
}

#[test]
fn test_propagated_locals_disappear() {
    // a = 2; b = a * 3; io.println(b + 1);
    let ast = main_program(&["a", "b"], |b| {
        let two = b.int(2);
        let set_a = b.assign("a", two);
        let a = b.var("a");
        let three = b.int(3);
        let mul = b.binary("*", a, three);
        let set_b = b.assign("b", mul);
        let b_ref = b.var("b");
        let one = b.int(1);
        let add = b.binary("+", b_ref, one);
        vec![set_a, set_b, println(b, add)]
    });

    let output = compile(ast, optimized());
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("bipush 7"), "{}", main);
    assert!(!main.contains("istore"));
}

#[test]
fn test_loop_variable_is_not_propagated() {
    // i = 0; while (i < 3) { i = i + 1; } io.println(i);
    let ast = main_program(&["i"], |b| {
        let zero = b.int(0);
        let init = b.assign("i", zero);
        let i = b.var("i");
        let three = b.int(3);
        let cond = b.binary("<", i, three);
        let i2 = b.var("i");
        let one = b.int(1);
        let add = b.binary("+", i2, one);
        let step = b.assign("i", add);
        let body = b.block(&[step]);
        let lp = b.while_stmt(cond, body);
        let i3 = b.var("i");
        vec![init, lp, println(b, i3)]
    });

    let output = compile(ast, optimized());
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("    iconst_0\n    istore_1\n"), "{}", main);
    assert!(main.contains("    iinc 1 1\n"));
    assert!(main.contains("    iload_1\n    invokestatic io/println(I)V\n"));
}

#[test]
fn test_recompiling_optimized_tree_is_stable() {
    let mut ast = one_plus_two_times_three();
    let compiler = Compiler::new(optimized());

    let first = compiler.compile(&mut ast).unwrap();
    let snapshot = ast.clone();
    let second = compiler.compile(&mut ast).unwrap();

    assert_eq!(first.jasmin, second.jasmin);
    assert_eq!(ast, snapshot);
}
