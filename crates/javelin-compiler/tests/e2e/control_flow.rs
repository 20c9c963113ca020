//! Conditionals, loops, short-circuit evaluation and method calls

use super::harness::*;
use javelin_compiler::{Ast, AstBuilder, CompilerConfig, PrettyPrint};

#[test]
fn test_and_skips_right_operand_when_left_is_false() {
    // if (false && io.check()) { io.println(1); } else { io.println(2); }
    let ast = main_program(&[], |b| {
        let left = b.boolean(false);
        let io = b.var("io");
        let check = b.call(io, "check", &[]);
        let and = b.binary("&&", left, check);
        let one = b.int(1);
        let then_s = println(b, one);
        let then_b = b.block(&[then_s]);
        let two = b.int(2);
        let else_s = println(b, two);
        let else_b = b.block(&[else_s]);
        vec![b.if_stmt(and, then_b, else_b)]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");

    let branch = main.find("ifne true_0").unwrap();
    let label = main.find("true_0:").unwrap();
    let call = main.find("invokestatic io/check()Z").unwrap();
    assert!(branch < label && label < call, "{}", main);
    assert!(main.contains("    iconst_0\n    ifne true_0\n"));
}

#[test]
fn test_while_counts_to_ten() {
    // i = 0; while (i < 10) { i = i + 1; }
    let ast = main_program(&["i"], |b| {
        let zero = b.int(0);
        let init = b.assign("i", zero);
        let i = b.var("i");
        let ten = b.int(10);
        let cond = b.binary("<", i, ten);
        let i2 = b.var("i");
        let one = b.int(1);
        let add = b.binary("+", i2, one);
        let step = b.assign("i", add);
        let body = b.block(&[step]);
        vec![init, b.while_stmt(cond, body)]
    });

    let output = compile(ast, CompilerConfig::default());
    let ir = output.ir.method("main").unwrap().pretty_print();
    assert!(ir.contains("goto while_cond_0;"), "{}", ir);
    assert!(ir.contains("if (i.i32 <.bool 10.i32) goto true_1;"));
    assert!(ir.contains("if (t0.bool) goto while_body_0;"));

    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("  while_body_0:\n    iinc 1 1\n  while_cond_0:\n"), "{}", main);
    assert!(main.contains("    iload_1\n    bipush 10\n    isub\n    iflt true_1\n"));
    assert!(main.contains("    iload_2\n    ifne while_body_0\n"));
}

/// `class Main { int count;
///   int max(int a, int b) { int r; if (a < b) { r = b; } else { r = a; } return r; }
///   void bump() { count = count + 1; }
///   static void main(String[] args) { io.println(new Main().max(3, 9)); } }`
fn counter_program() -> Ast {
    let mut b = AstBuilder::new();
    let io = b.import("io");

    let count_ty = b.ty("int");
    let count = b.var_decl("count", count_ty);

    let ret_ty = b.ty("int");
    let a_ty = b.ty("int");
    let a = b.param("a", a_ty);
    let b_ty = b.ty("int");
    let bp = b.param("b", b_ty);
    let r_ty = b.ty("int");
    let r = b.var_decl("r", r_ty);
    let a_ref = b.var("a");
    let b_ref = b.var("b");
    let cond = b.binary("<", a_ref, b_ref);
    let b_ref2 = b.var("b");
    let then_s = b.assign("r", b_ref2);
    let then_b = b.block(&[then_s]);
    let a_ref2 = b.var("a");
    let else_s = b.assign("r", a_ref2);
    let else_b = b.block(&[else_s]);
    let if_s = b.if_stmt(cond, then_b, else_b);
    let r_ref = b.var("r");
    let ret = b.ret(Some(r_ref));
    let max = b.method("max", ret_ty, &[a, bp], &[r], &[if_s, ret]);

    let void_ty = b.ty("void");
    let count_ref = b.var("count");
    let one = b.int(1);
    let add = b.binary("+", count_ref, one);
    let store = b.assign("count", add);
    let bump = b.method("bump", void_ty, &[], &[], &[store]);

    let obj = b.new_object("Main");
    let three = b.int(3);
    let nine = b.int(9);
    let call = b.call(obj, "max", &[three, nine]);
    let print = println(&mut b, call);
    let main = b.main_method("args", &[], &[print]);

    let class = b.class("Main", None, &[count], &[max, bump, main]);
    let root = b.program(&[io], class);
    b.finish(root)
}

#[test]
fn test_instance_method_call_and_constructor() {
    let output = compile(counter_program(), CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");

    let expected = "    new Main\n\
                    \x20   astore_1\n\
                    \x20   aload_1\n\
                    \x20   invokespecial Main/<init>()V\n\
                    \x20   aload_1\n\
                    \x20   iconst_3\n\
                    \x20   bipush 9\n\
                    \x20   invokevirtual Main/max(II)I\n";
    assert!(main.contains(expected), "{}", main);
    assert!(main.contains(".limit stack 3\n"));
}

#[test]
fn test_if_else_layout_in_assembly() {
    let output = compile(counter_program(), CompilerConfig::default());
    let max = method_body(&output.jasmin, "max");

    assert!(max.starts_with(".method public max(II)I\n"), "{}", max);
    // this, a, b, r, then the comparison temporary
    assert!(max.contains(".limit locals 5\n"));
    let else_at = max.find("    iload_1\n    istore_3\n").unwrap();
    let then_at = max.find("  if_then_1:\n    iload_2\n    istore_3\n").unwrap();
    assert!(else_at < then_at, "{}", max);
    assert!(max.contains("    iload_3\n    ireturn\n"));
}

#[test]
fn test_field_increment_uses_getfield_and_putfield() {
    let output = compile(counter_program(), CompilerConfig::default());
    let bump = method_body(&output.jasmin, "bump");

    assert!(output.jasmin.contains(".field public 'count' I\n"));
    let expected = "    aload_0\n\
                    \x20   getfield Main/count I\n\
                    \x20   istore_1\n\
                    \x20   iload_1\n\
                    \x20   iconst_1\n\
                    \x20   iadd\n\
                    \x20   istore_2\n\
                    \x20   aload_0\n\
                    \x20   iload_2\n\
                    \x20   putfield Main/count I\n\
                    \x20   return\n";
    assert!(bump.contains(expected), "{}", bump);
}
