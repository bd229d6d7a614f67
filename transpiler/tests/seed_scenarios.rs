//! One test per spec.md §8 seed scenario, plus the boundary behaviors
//! the section calls out by exact message.

use std::collections::BTreeMap;

use transpiler::{transpile, transpile_with_name_map, transpile_with_path, TranspileError};
use transpiler_symbols::{Grammar, Rule, Symbol};

#[test]
fn seed_1_types_happy_path() {
    let out = transpile("begin var a: integer := 10; var r: real := a; end.").expect("should transpile");
    assert!(out.contains("int a = 10;"));
    assert!(out.contains("double r = a;"));
}

#[test]
fn seed_2_type_error() {
    let err = transpile("begin var c: real := 10.0; var b: integer := c; end.").unwrap_err();
    match err {
        TranspileError::Semantic(e) => {
            assert_eq!(e.lexeme, "c");
            assert_eq!(e.reason, "cannot assign a real value to an integer variable");
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn seed_3_for_loop_immutability() {
    let err = transpile("begin var x: integer := 0; for var i: integer := 1 to 10 do x := i; i := 12; end.")
        .unwrap_err();
    match err {
        TranspileError::Semantic(e) => {
            assert_eq!(e.lexeme, "i");
            assert_eq!(e.reason, "variable is not defined");
        }
        other => panic!("expected a semantic error, got {other:?}"),
    }
}

#[test]
fn seed_4_global_and_main_split() {
    let out = transpile(
        "var g1: boolean := true and false or true; begin var a: integer := 1; a := 2; end.",
    )
    .expect("should transpile");
    assert!(out.contains("static bool g1 = true && false || true;"));
    assert!(out.contains("int a = 1;"));
    assert!(out.contains("a = 2;"));
}

#[test]
fn seed_5_downto() {
    let out = transpile("begin for var i: integer := 10 downto 3 do print(i); end.").expect("should transpile");
    assert!(out.contains("for (int i = 10; i >= 3; i--) Console.Write(i);"));
}

#[test]
fn seed_6_ambiguous_grammar_raises_grammar_error_at_construction() {
    let mut non_terminals = BTreeMap::new();
    non_terminals.insert(0u32, "A");
    let mut terminals = BTreeMap::new();
    terminals.insert(0u32, "a");

    let grammar = Grammar::new(
        Symbol::NonTerminal(0),
        vec![
            Rule::new(0, vec![Symbol::Terminal(0)]),
            Rule::new(0, vec![Symbol::Terminal(0)]),
        ],
        non_terminals,
        terminals,
    );

    let err = transpiler_parsegen::generate_table(&grammar).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("NonTerminal(0)"));
    assert!(message.contains("Terminal(0)"));
}

#[test]
fn boundary_unterminated_block_comment() {
    let err = transpile("begin { unterminated end.").unwrap_err();
    assert!(matches!(err, TranspileError::Lexer(_)));
    assert!(err.to_string().contains("{ at line 1"));
}

#[test]
fn boundary_stray_character() {
    let err = transpile("begin x := %; end.").unwrap_err();
    assert!(matches!(err, TranspileError::Lexer(_)));
    assert!(err.to_string().contains("% at line 1"));
}

#[test]
fn boundary_redeclaration_in_same_scope() {
    let err = transpile("begin var a: integer := 1; var a: integer := 2; end.").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("a at line 1 - variable is already defined"));
}

#[test]
fn boundary_use_of_undeclared_name() {
    let err = transpile("begin x := 1; end.").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("x at line 1 - variable is not defined"));
}

#[test]
fn boundary_integer_literal_assigned_to_real_is_accepted() {
    transpile("begin var r: real := 10; end.").expect("integer literal widens to real");
}

#[test]
fn boundary_real_assigned_to_integer_is_rejected() {
    let err = transpile("begin var c: real := 1.5; var b: integer := c; end.").unwrap_err();
    assert!(matches!(err, TranspileError::Semantic(_)));
}

#[test]
fn boundary_for_loop_iterator_reassignment_inside_body_is_rejected() {
    let err = transpile("begin for var i: integer := 1 to 10 do i := 5; end.").unwrap_err();
    assert!(matches!(err, TranspileError::Semantic(_)));
}

#[test]
fn path_is_attached_to_semantic_errors() {
    let err = transpile_with_path("begin x := 1; end.", "prog.src").unwrap_err();
    assert!(err.to_string().contains("(prog.src:1)"));
}

#[test]
fn custom_name_map_flows_through_the_public_api() {
    let mut custom = BTreeMap::new();
    custom.insert("print", "Out.Emit");
    let out = transpile_with_name_map("begin print(1); end.", &custom).expect("should transpile");
    assert!(out.contains("Out.Emit(1);"));
}
