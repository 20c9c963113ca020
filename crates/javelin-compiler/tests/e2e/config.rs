//! Configuration parsing and its effect on a compilation

use super::harness::*;
use javelin_compiler::{CompileError, CompilerConfig, RegisterAllocation};

/// `a = 4; io.println(a + 1);`
fn small_program() -> javelin_compiler::Ast {
    main_program(&["a"], |b| {
        let four = b.int(4);
        let set = b.assign("a", four);
        let a = b.var("a");
        let one = b.int(1);
        let add = b.binary("+", a, one);
        vec![set, println(b, add)]
    })
}

#[test]
fn test_options_from_key_value_pairs() {
    let config = CompilerConfig::from_map([
        ("inputFile", "Main.jmm"),
        ("optimize", "true"),
        ("registerAllocation", "2"),
    ])
    .unwrap();
    assert!(config.optimize);
    assert_eq!(config.register_allocation, RegisterAllocation::Fixed(2));
}

#[test]
fn test_invalid_register_budget_is_a_config_error() {
    let err: CompileError = CompilerConfig::from_map([("registerAllocation", "-5")])
        .unwrap_err()
        .into();
    assert!(matches!(err, CompileError::Config(_)));
    assert_eq!(
        err.to_string(),
        "Invalid configuration: Invalid number in -r option: -5"
    );
}

#[test]
fn test_toml_configuration_drives_the_pipeline() {
    let config = CompilerConfig::from_toml_str("optimize = true\nregisterAllocation = 0\n").unwrap();
    assert_eq!(config.register_allocation, RegisterAllocation::Minimize);

    let output = compile(small_program(), config);
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("    iconst_5\n    invokestatic io/println(I)V\n"), "{}", main);
    assert_eq!(output.reports.len(), 1);
}

#[test]
fn test_optimizer_is_off_by_default() {
    let config = CompilerConfig::from_map([("inputFile", "Main.jmm")]).unwrap();
    let output = compile(small_program(), config);
    let main = method_body(&output.jasmin, "main");
    assert!(main.contains("    iconst_4\n    istore_1\n"), "{}", main);
    assert!(main.contains("iadd"));
    assert!(output.reports.is_empty());
}
