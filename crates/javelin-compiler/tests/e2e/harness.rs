//! Test harness for end-to-end compilation
//!
//! Provides utilities for compiling an AST through the whole pipeline and
//! checking the emitted Jasmin text.

use javelin_compiler::{Ast, AstBuilder, CompilationOutput, Compiler, CompilerConfig, NodeId};
use std::collections::{HashMap, VecDeque};

/// Compile with the given configuration, panicking on a fatal error
pub fn compile(mut ast: Ast, config: CompilerConfig) -> CompilationOutput {
    match Compiler::new(config).compile(&mut ast) {
        Ok(output) => {
            assert_stack_limits(&output.jasmin);
            output
        }
        Err(e) => panic!("Compilation failed: {}", e),
    }
}

/// Build `import io; class Main { public static void main(String[] args) { locals; body } }`.
///
/// `locals` are `int` variables.
pub fn main_program(
    locals: &[&str],
    body: impl FnOnce(&mut AstBuilder) -> Vec<NodeId>,
) -> Ast {
    let mut b = AstBuilder::new();
    let io = b.import("io");
    let decls: Vec<NodeId> = locals
        .iter()
        .map(|name| {
            let ty = b.ty("int");
            b.var_decl(name, ty)
        })
        .collect();
    let stmts = body(&mut b);
    let main = b.main_method("args", &decls, &stmts);
    let class = b.class("Main", None, &[], &[main]);
    let root = b.program(&[io], class);
    b.finish(root)
}

/// `io.println(expr);`
pub fn println(b: &mut AstBuilder, expr: NodeId) -> NodeId {
    let io = b.var("io");
    let call = b.call(io, "println", &[expr]);
    b.expr_stmt(call)
}

/// Text of one method, from its `.method` line to `.end method`
pub fn method_body<'a>(jasmin: &'a str, name: &str) -> &'a str {
    let start = jasmin
        .lines()
        .filter(|line| line.starts_with(".method "))
        .find(|line| {
            line.split_whitespace()
                .last()
                .is_some_and(|sig| sig.starts_with(&format!("{}(", name)))
        })
        .and_then(|line| jasmin.find(line))
        .unwrap_or_else(|| panic!("no method '{}' in:\n{}", name, jasmin));
    let end = jasmin[start..]
        .find(".end method")
        .map(|i| start + i)
        .unwrap_or(jasmin.len());
    &jasmin[start..end]
}

/// Instructions of a method body, labels included, without directives
fn instructions(body: &str) -> Vec<&str> {
    body.lines()
        .skip(1)
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('.') && !line.starts_with(';'))
        .collect()
}

/// Number of operand slots taken by the arguments of a method descriptor
fn descriptor_args(descriptor: &str) -> i32 {
    let inner = &descriptor[descriptor.find('(').map_or(0, |i| i + 1)..descriptor.find(')').unwrap_or(0)];
    let mut count = 0;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '[' => continue,
            'L' => {
                for c in chars.by_ref() {
                    if c == ';' {
                        break;
                    }
                }
                count += 1;
            }
            _ => count += 1,
        }
    }
    count
}

fn descriptor_returns(descriptor: &str) -> i32 {
    if descriptor.ends_with(")V") {
        0
    } else {
        1
    }
}

/// Net stack change of one instruction
pub fn stack_effect(instr: &str) -> i32 {
    let mut parts = instr.split_whitespace();
    let op = parts.next().unwrap_or_default();
    let operand = parts.next().unwrap_or_default();
    match op {
        o if o.starts_with("iconst_") => 1,
        "bipush" | "sipush" | "ldc" | "new" | "getstatic" => 1,
        o if o.starts_with("iload") || o.starts_with("aload") => 1,
        o if o.starts_with("istore") || o.starts_with("astore") => -1,
        "iadd" | "isub" | "imul" | "idiv" | "iand" | "ior" | "ixor" => -1,
        "iflt" | "ifgt" | "ifle" | "ifge" | "ifeq" | "ifne" => -1,
        "iaload" => -1,
        "iastore" => -3,
        "newarray" | "arraylength" | "getfield" | "goto" | "iinc" | "return" => 0,
        "pop" | "ireturn" | "areturn" | "putstatic" => -1,
        "putfield" => -2,
        "invokestatic" => descriptor_returns(operand) - descriptor_args(operand),
        "invokevirtual" | "invokespecial" => {
            descriptor_returns(operand) - descriptor_args(operand) - 1
        }
        other => panic!("unknown instruction '{}'", other),
    }
}

/// Maximum operand stack height over every path through a method body
pub fn replay_max_stack(body: &str) -> i32 {
    let code = instructions(body);
    let labels: HashMap<&str, usize> = code
        .iter()
        .enumerate()
        .filter_map(|(i, line)| line.strip_suffix(':').map(|label| (label, i)))
        .collect();

    let mut heights: Vec<Option<i32>> = vec![None; code.len()];
    let mut queue = VecDeque::from([(0usize, 0i32)]);
    let mut max = 0;

    while let Some((at, height)) = queue.pop_front() {
        if at >= code.len() {
            continue;
        }
        if let Some(seen) = heights[at] {
            assert_eq!(seen, height, "inconsistent stack height at '{}'", code[at]);
            continue;
        }
        heights[at] = Some(height);

        let line = code[at];
        if line.ends_with(':') {
            queue.push_back((at + 1, height));
            continue;
        }

        let after = height + stack_effect(line);
        assert!(after >= 0, "stack underflow at '{}'", line);
        max = max.max(after).max(height);

        let mut parts = line.split_whitespace();
        let op = parts.next().unwrap_or_default();
        let target = parts.next().and_then(|label| labels.get(label)).copied();
        match op {
            "goto" => queue.push_back((target.expect("goto target"), after)),
            "return" | "ireturn" | "areturn" => {}
            o if o.starts_with("if") => {
                queue.push_back((target.expect("branch target"), after));
                queue.push_back((at + 1, after));
            }
            _ => queue.push_back((at + 1, after)),
        }
    }
    max
}

/// Every method's `.limit stack` equals the replayed maximum height
pub fn assert_stack_limits(jasmin: &str) {
    for header in jasmin.lines().filter(|l| l.starts_with(".method ")) {
        let name = header
            .split_whitespace()
            .last()
            .and_then(|sig| sig.split('(').next())
            .unwrap_or_default();
        if name == "<init>" {
            continue;
        }
        let body = method_body(jasmin, name);
        let declared: i32 = body
            .lines()
            .find_map(|l| l.trim().strip_prefix(".limit stack "))
            .and_then(|n| n.parse().ok())
            .unwrap_or_else(|| panic!("no .limit stack in:\n{}", body));
        assert_eq!(
            declared,
            replay_max_stack(body),
            "stack limit mismatch in '{}':\n{}",
            name,
            body
        );
    }
}
