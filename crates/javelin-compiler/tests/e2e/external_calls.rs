//! Calls into imported classes
//!
//! Their signatures are unknown, so the return type is taken from where the
//! call appears. This is an approximation: `a = io.read();` assumes `int`
//! because `a` is an `int`, whatever `io.read` really returns.

use super::harness::*;
use javelin_compiler::{Ast, AstBuilder, CompilerConfig, NodeId};

/// `import io; class Main { static boolean ready() { return io.check(); }
///   static void main(String[] args) { int a; body } }`
fn program_with_ready(body: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>) -> Ast {
    let mut b = AstBuilder::new();
    let io = b.import("io");

    let bool_ty = b.ty("boolean");
    let io_ref = b.var("io");
    let check = b.call(io_ref, "check", &[]);
    let ret = b.ret(Some(check));
    let ready = b.static_method("ready", bool_ty, &[], &[], &[ret]);

    let a_ty = b.ty("int");
    let a = b.var_decl("a", a_ty);
    let stmts = body(&mut b);
    let main = b.main_method("args", &[a], &stmts);

    let class = b.class("Main", None, &[], &[ready, main]);
    let root = b.program(&[io], class);
    b.finish(root)
}

#[test]
fn test_assignment_decides_the_return_type() {
    let ast = main_program(&["a"], |b| {
        let io = b.var("io");
        let read = b.call(io, "read", &[]);
        vec![b.assign("a", read)]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("    invokestatic io/read()I\n    istore_1\n"), "{}", main);
    assert!(!main.contains("pop"));
}

#[test]
fn test_return_decides_the_return_type() {
    let output = compile(program_with_ready(|_| Vec::new()), CompilerConfig::default());

    let ready = method_body(&output.jasmin, "ready");
    assert!(ready.starts_with(".method public static ready()Z\n"), "{}", ready);
    assert!(ready.contains("    invokestatic io/check()Z\n"));
    assert!(ready.contains("    ireturn\n"));
}

#[test]
fn test_arithmetic_operand_is_assumed_int() {
    // a = io.read() * 2;
    let ast = main_program(&["a"], |b| {
        let io = b.var("io");
        let read = b.call(io, "read", &[]);
        let two = b.int(2);
        let mul = b.binary("*", read, two);
        vec![b.assign("a", mul)]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("invokestatic io/read()I\n"), "{}", main);
    assert!(main.contains("    iconst_2\n    imul\n    istore_1\n"));
}

#[test]
fn test_statement_call_is_assumed_void() {
    // io.reset(); a = io.read();
    let ast = main_program(&["a"], |b| {
        let io = b.var("io");
        let reset = b.call(io, "reset", &[]);
        let io2 = b.var("io");
        let read = b.call(io2, "read", &[]);
        vec![b.expr_stmt(reset), b.assign("a", read)]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("    invokestatic io/reset()V\n    invokestatic io/read()I\n"), "{}", main);
    assert!(!main.contains("pop"));
}

#[test]
fn test_receiver_is_assumed_an_object() {
    // io.make().run();
    let ast = main_program(&[], |b| {
        let io = b.var("io");
        let make = b.call(io, "make", &[]);
        let run = b.call(make, "run", &[]);
        vec![b.expr_stmt(run)]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");
    assert!(
        main.contains(
            "    invokestatic io/make()Ljava/lang/Object;\n    astore_1\n    aload_1\n    invokevirtual java/lang/Object/run()V\n"
        ),
        "{}",
        main
    );
}

#[test]
fn test_own_static_method_keeps_its_declared_type() {
    // io.println(Main.ready()); the argument slot would guess int
    let ast = program_with_ready(|b| {
        let class = b.var("Main");
        let call = b.call(class, "ready", &[]);
        vec![println(b, call)]
    });

    let output = compile(ast, CompilerConfig::default());
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("invokestatic Main/ready()Z\n"), "{}", main);
    assert!(main.contains("invokestatic io/println(Z)V\n"));
}
