//! Public entry point: wires the lexer/parser/analyzer/generator
//! crates into the one `transpile` function, logging pipeline progress
//! with the `log` facade. No logging backend is linked here; callers
//! (the CLI) install one.

pub mod errors;

pub use errors::TranspileError;
pub use transpiler_codegen::default_name_table;

use std::collections::BTreeMap;

/// Translates `source` using the built-in name table.
pub fn transpile(source: &str) -> Result<String, TranspileError> {
    transpile_with(source, None, &default_name_table())
}

/// Translates `source`, attaching `path` to any semantic error so
/// messages carry a file name (spec.md §7: "optionally include a file
/// path").
pub fn transpile_with_path(source: &str, path: &str) -> Result<String, TranspileError> {
    transpile_with(source, Some(path), &default_name_table())
}

/// Translates `source` with a caller-supplied override of the built-in
/// call name table.
pub fn transpile_with_name_map(source: &str, name_map: &BTreeMap<&str, &str>) -> Result<String, TranspileError> {
    transpile_with(source, None, name_map)
}

fn transpile_with(source: &str, path: Option<&str>, name_map: &BTreeMap<&str, &str>) -> Result<String, TranspileError> {
    log::debug!("lexing and parsing {} bytes of source", source.len());
    let tree = transpiler_parser::parse_source(source).map_err(|e| {
        log::warn!("{e}");
        TranspileError::from(e)
    })?;
    let node_count = tree.walk().count();
    log::debug!("parsed {node_count} parse-tree nodes");

    let analysis = transpiler_sem::analyze_with_path(&tree, path).map_err(|e| {
        log::warn!("{e}");
        TranspileError::from(e)
    })?;
    log::debug!("semantic analysis recorded {} quoted-literal contexts", analysis.literal_contexts.len());

    let output = transpiler_codegen::generate_with_name_map(&tree, &analysis, name_map);
    log::debug!("generated {} bytes of target source", output.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transpiles_a_minimal_program() {
        let out = transpile("begin end.").expect("minimal program should transpile");
        assert!(out.contains("using System;"));
        assert!(out.contains("namespace Transpiler"));
        assert!(out.contains("class Program"));
    }

    #[test]
    fn semantic_error_is_reported_with_path() {
        let err = transpile_with_path("begin x := 1; end.", "prog.src").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("x at line 1"));
        assert!(message.contains("prog.src:1"));
    }

    #[test]
    fn lexer_error_propagates() {
        let err = transpile("begin x := %; end.").unwrap_err();
        assert!(matches!(err, TranspileError::Lexer(_)));
    }

    #[test]
    fn custom_name_map_is_honored_end_to_end() {
        let mut custom = BTreeMap::new();
        custom.insert("print", "Out.Emit");
        let out = transpile_with_name_map("begin print(1); end.", &custom).expect("should transpile");
        assert!(out.contains("Out.Emit(1);"));
    }
}
