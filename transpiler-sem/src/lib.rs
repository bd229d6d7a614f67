//! Scope-stack semantic analysis: declaration/assignment checks, the
//! type-conversion rules, loop-variable immutability, and a structural
//! (non-evaluating) boolean classifier. Walks the tree the parser
//! built and never re-reads source text.

mod analyzer;
mod errors;
mod scope;
mod types;

pub use analyzer::{analyze, analyze_with_path, Analysis};
pub use errors::SemanticError;
pub use scope::VarInfo;
pub use types::{Kind, VarType};

#[cfg(test)]
mod tests {
    use super::*;
    use transpiler_parser::parse_source;

    fn analyze_source(source: &str) -> Result<Analysis, SemanticError> {
        let tree = parse_source(source).expect("source must parse for these tests");
        analyze(&tree)
    }

    #[test]
    fn types_happy_path() {
        analyze_source("begin var a: integer := 10; var r: real := a; end.").expect("should type-check");
    }

    #[test]
    fn real_assigned_to_integer_is_rejected() {
        let err = analyze_source("begin var c: real := 10.0; var b: integer := c; end.").unwrap_err();
        assert_eq!(err.lexeme, "c");
    }

    #[test]
    fn for_loop_iterator_is_out_of_scope_after_the_loop() {
        let err = analyze_source(
            "begin var x: integer := 0; for var i: integer := 1 to 10 do x := i; i := 12; end.",
        )
        .unwrap_err();
        assert_eq!(err.lexeme, "i");
        assert_eq!(err.reason, "variable is not defined");
    }

    #[test]
    fn for_loop_iterator_cannot_be_reassigned_inside_the_body() {
        let err = analyze_source("begin for var i: integer := 1 to 10 do i := 5; end.").unwrap_err();
        assert_eq!(err.lexeme, "i");
        assert!(err.reason.contains("iterator"));
    }

    #[test]
    fn globals_and_locals_share_the_flat_scope() {
        analyze_source(
            "var g1: boolean := true and false or true; begin var a: integer := 1; a := 2; end.",
        )
        .expect("should type-check");
    }

    #[test]
    fn downto_direction_type_checks_like_to() {
        analyze_source("begin for var i: integer := 10 downto 3 do i := i; end.")
            .expect_err("reassigning the iterator is still rejected");
    }

    #[test]
    fn redeclaration_in_the_same_scope_is_rejected() {
        let err = analyze_source("begin var a: integer := 1; var a: integer := 2; end.").unwrap_err();
        assert_eq!(err.reason, "variable is already defined");
    }

    #[test]
    fn undeclared_name_is_rejected() {
        let err = analyze_source("begin x := 1; end.").unwrap_err();
        assert_eq!(err.reason, "variable is not defined");
    }

    #[test]
    fn nested_for_loops_reusing_the_iterator_name_are_rejected() {
        let err = analyze_source(
            "begin for var i: integer := 1 to 2 do for var i: integer := 1 to 2 do i := i; end.",
        )
        .unwrap_err();
        assert_eq!(err.reason, "variable is already defined");
    }

    #[test]
    fn compound_assignment_is_reported_as_not_implemented() {
        let err = analyze_source("begin var a: integer := 1; a += 1; end.").unwrap_err();
        assert_eq!(err.lexeme, "+=");
        assert!(err.reason.contains("not implemented"));
    }

    #[test]
    fn single_char_string_literal_assigned_to_char_is_recorded_as_char_context() {
        let tree = parse_source("begin var c: char := 'x'; end.").unwrap();
        let analysis = analyze(&tree).expect("should type-check");
        assert_eq!(analysis.literal_contexts.values().next(), Some(&VarType::Char));
    }

    #[test]
    fn multi_char_string_literal_rejected_as_char() {
        let err = analyze_source("begin var c: char := 'xy'; end.").unwrap_err();
        assert!(err.reason.contains("one character"));
    }

    #[test]
    fn string_concatenation_type_checks() {
        analyze_source("begin var s: string := 'a' + 'b'; end.").expect("should type-check");
    }

    #[test]
    fn integer_division_is_rejected() {
        let err = analyze_source("begin var a: integer := 4 / 2; end.").unwrap_err();
        assert!(err.reason.contains("integer division"));
    }

    #[test]
    fn float_division_is_accepted() {
        analyze_source("begin var a: real := 4.0 / 2.0; end.").expect("should type-check");
    }

    #[test]
    fn call_results_are_compatible_with_any_expected_type() {
        analyze_source("begin var a: integer := sqrt(4); var b: boolean := ready(); end.")
            .expect("calls are typed any");
    }
}
