//! Register allocation through the whole pipeline

use super::harness::*;
use javelin_compiler::{Ast, CompilerConfig, RegisterAllocation, ReportKind, Stage};

/// `a = 1; io.println(a); b = 2; io.println(b); c = 3; io.println(c);`
fn disjoint_lifetimes() -> Ast {
    main_program(&["a", "b", "c"], |b| {
        let mut stmts = Vec::new();
        for (name, value) in [("a", 1), ("b", 2), ("c", 3)] {
            let lit = b.int(value);
            stmts.push(b.assign(name, lit));
            let var = b.var(name);
            stmts.push(println(b, var));
        }
        stmts
    })
}

/// `a = 1; b = 2; c = 3; io.println(a + b + c);`
fn overlapping_lifetimes() -> Ast {
    main_program(&["a", "b", "c"], |b| {
        let mut stmts = Vec::new();
        for (name, value) in [("a", 1), ("b", 2), ("c", 3)] {
            let lit = b.int(value);
            stmts.push(b.assign(name, lit));
        }
        let a = b.var("a");
        let bv = b.var("b");
        let c = b.var("c");
        let ab = b.binary("+", a, bv);
        let abc = b.binary("+", ab, c);
        stmts.push(println(b, abc));
        stmts
    })
}

fn config(mode: RegisterAllocation) -> CompilerConfig {
    CompilerConfig::new(false, mode)
}

#[test]
fn test_disjoint_variables_share_one_register() {
    let output = compile(disjoint_lifetimes(), config(RegisterAllocation::Minimize));

    let table = &output.ir.method("main").unwrap().var_table;
    assert_eq!(table.register("args"), Some(0));
    assert_eq!(table.register("a"), Some(1));
    assert_eq!(table.register("b"), Some(1));
    assert_eq!(table.register("c"), Some(1));

    let main = method_body(&output.jasmin, "main");
    assert!(main.contains(".limit locals 2\n"), "{}", main);
    assert_eq!(main.matches("istore_1").count(), 3);

    assert_eq!(output.reports.len(), 1);
    let report = &output.reports[0];
    assert_eq!(report.kind, ReportKind::Log);
    assert_eq!(report.stage, Stage::Optimization);
    assert_eq!(
        report.message,
        "Register allocation succeeded in method 'main' with 2 registers.\n\
         Variable 'args' was assigned to register 0.\n\
         Variable 'a' was assigned to register 1.\n\
         Variable 'b' was assigned to register 1.\n\
         Variable 'c' was assigned to register 1.\n"
    );
}

#[test]
fn test_minimum_for_three_live_values() {
    let output = compile(overlapping_lifetimes(), config(RegisterAllocation::Minimize));
    assert!(output.reports[0]
        .message
        .starts_with("Register allocation succeeded in method 'main' with 4 registers.\n"));

    let table = &output.ir.method("main").unwrap().var_table;
    let mut abc: Vec<u32> = ["a", "b", "c"]
        .iter()
        .filter_map(|name| table.register(name))
        .collect();
    abc.sort_unstable();
    abc.dedup();
    assert_eq!(abc.len(), 3);
    assert!(abc.iter().all(|&r| r >= 1));
}

#[test]
fn test_fixed_budget_below_minimum_is_reported() {
    let output = compile(overlapping_lifetimes(), config(RegisterAllocation::Fixed(3)));

    assert!(output.has_errors());
    let report = &output.reports[0];
    assert_eq!(report.kind, ReportKind::Error);
    assert_eq!((report.line, report.column), (-1, -1));
    assert_eq!(
        report.message,
        "Register allocation failed in method 'main'. The minimum number of registers for this method is 4"
    );

    // args, a, b, c, t0, t1 keep their lowering slots
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains(".limit locals 6\n"), "{}", main);
}

#[test]
fn test_fixed_budget_large_enough_is_committed() {
    let output = compile(overlapping_lifetimes(), config(RegisterAllocation::Fixed(5)));

    assert!(!output.has_errors());
    assert!(output.reports[0]
        .message
        .starts_with("Register allocation succeeded in method 'main' with 5 registers.\n"));
    let table = &output.ir.method("main").unwrap().var_table;
    assert!(table.max_register().unwrap() < 5);
}

#[test]
fn test_skip_keeps_sequential_slots() {
    let output = compile(disjoint_lifetimes(), CompilerConfig::default());
    assert!(output.reports.is_empty());

    let table = &output.ir.method("main").unwrap().var_table;
    assert_eq!(table.register("a"), Some(1));
    assert_eq!(table.register("b"), Some(2));
    assert_eq!(table.register("c"), Some(3));
}
