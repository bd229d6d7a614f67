//! Syntax-directed code generation: a tree walk driven by the semantic
//! analyzer's output, writing into two append-only buffers (globals,
//! main) that are substituted into a fixed program template.

mod name_table;
mod templating;

use std::collections::{BTreeMap, HashMap};

use transpiler_parser::{NodeId, ParseTree};
use transpiler_sem::{Analysis, VarType};
use transpiler_symbols::{non_terminals as nt, terminals as t, Symbol};

pub use name_table::default_name_table;
use templating::Template;

const PROGRAM_TEMPLATE: &str = "\
using System;

namespace Transpiler
{
    class Program
    {
/*{globals}*/
        public static void Main(string[] args)
        {
/*{main}*/
        }
    }
}
";

fn resolve_name(name_map: &BTreeMap<&str, &str>, name: &str) -> String {
    name_map.get(name).map(|s| s.to_string()).unwrap_or_else(|| name.to_string())
}

fn map_var_type(var_type: VarType) -> &'static str {
    match var_type {
        VarType::Integer => "int",
        VarType::Real => "double",
        VarType::Boolean => "bool",
        VarType::Char => "char",
        VarType::String => "string",
    }
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Generates target text for `tree` using the annotations `analysis`
/// attached during semantic analysis, and the default name map.
pub fn generate(tree: &ParseTree, analysis: &Analysis) -> String {
    generate_with_name_map(tree, analysis, &default_name_table())
}

/// Generates target text using a caller-supplied override of the
/// built-in call name table (see [`default_name_table`]).
pub fn generate_with_name_map(tree: &ParseTree, analysis: &Analysis, name_map: &BTreeMap<&str, &str>) -> String {
    let mut gen = CodeGenerator {
        tree,
        literal_contexts: &analysis.literal_contexts,
        name_map,
        globals: String::new(),
        main: String::new(),
    };
    gen.run();
    let output = gen.assemble();
    log::debug!("emitted {} bytes of target source", output.len());
    output
}

struct CodeGenerator<'a> {
    tree: &'a ParseTree,
    literal_contexts: &'a HashMap<NodeId, VarType>,
    name_map: &'a BTreeMap<&'a str, &'a str>,
    globals: String,
    main: String,
}

impl<'a> CodeGenerator<'a> {
    fn children(&self, node: NodeId) -> &[NodeId] {
        self.tree.children(node)
    }

    fn symbol(&self, node: NodeId) -> Symbol {
        self.tree.get(node).symbol
    }

    fn lexeme(&self, node: NodeId) -> &str {
        &self.tree.get(node).token.as_ref().expect("leaf node must carry a token").lexeme
    }

    fn run(&mut self) {
        let root = self.tree.root();
        let kids = self.children(root).to_vec();
        self.emit_var_decl_list(kids[0], true);
        self.emit_stmt_list(kids[2], 3);
    }

    fn assemble(&self) -> String {
        let template = Template::new(PROGRAM_TEMPLATE);
        let mut writer = template.writer();
        let globals = self.globals.clone();
        let main = self.main.clone();
        writer.substitute("globals", move |w| write!(w, "{globals}"));
        writer.substitute("main", move |w| write!(w, "{main}"));
        let mut out = Vec::new();
        writer.write(&mut out).expect("writing to an in-memory buffer cannot fail");
        String::from_utf8(out).expect("generated source is valid utf8")
    }

    // --- declarations ---------------------------------------------------

    fn emit_var_decl_list(&mut self, node: NodeId, top_level: bool) {
        let kids = self.children(node).to_vec();
        if kids.is_empty() {
            return;
        }
        let text = self.var_decl_text(kids[0], top_level);
        self.globals.push_str(&indent(2));
        self.globals.push_str(&text);
        self.globals.push('\n');
        self.emit_var_decl_list(kids[1], top_level);
    }

    /// Emits a `var` declaration found in statement position (inside
    /// `begin...end`). Indentation/newline are the statement-list
    /// caller's job, matching every other statement kind.
    fn emit_var_decl(&mut self, node: NodeId, top_level: bool) {
        let text = self.var_decl_text(node, top_level);
        self.main.push_str(&text);
    }

    /// `type name [ = init];`, without surrounding indentation.
    fn var_decl_text(&mut self, node: NodeId, top_level: bool) -> String {
        let kids = self.children(node).to_vec();
        let name = self.lexeme(kids[1]).to_string();
        let var_type = self.type_of(kids[3]);
        let init_kids = self.children(kids[4]).to_vec();
        let init = if init_kids.is_empty() {
            String::new()
        } else {
            format!(" = {}", self.emit_expr(init_kids[1]))
        };
        let prefix = if top_level { "static " } else { "" };
        format!("{prefix}{} {name}{init};", map_var_type(var_type))
    }

    fn type_of(&self, type_node: NodeId) -> VarType {
        let terminal_node = self.children(type_node)[0];
        let terminal = match self.symbol(terminal_node) {
            Symbol::Terminal(i) => i,
            _ => unreachable!("Type's only child is always a terminal"),
        };
        VarType::from_terminal(terminal).expect("Type node always holds one of the five type keywords")
    }

    // --- statements -------------------------------------------------------

    fn emit_stmt_list(&mut self, node: NodeId, depth: usize) {
        let kids = self.children(node).to_vec();
        if kids.is_empty() {
            return;
        }
        self.main.push_str(&indent(depth));
        self.emit_stmt(kids[0], depth);
        self.main.push('\n');
        self.emit_stmt_list(kids[1], depth);
    }

    fn emit_stmt(&mut self, node: NodeId, depth: usize) {
        let inner = self.children(node)[0];
        self.emit_stmt_inner(inner, depth);
    }

    fn emit_then_body(&mut self, node: NodeId, depth: usize) {
        let inner = self.children(node)[0];
        self.emit_stmt_inner(inner, depth);
    }

    fn emit_stmt_inner(&mut self, node: NodeId, depth: usize) {
        match self.symbol(node) {
            Symbol::NonTerminal(n) if n == nt::VAR_DECL => self.emit_var_decl(node, false),
            Symbol::NonTerminal(n) if n == nt::ID_STMT => self.emit_id_stmt(node),
            Symbol::NonTerminal(n) if n == nt::IF_STMT => self.emit_if_stmt(node, depth),
            Symbol::NonTerminal(n) if n == nt::FOR_STMT => self.emit_for_stmt(node, depth),
            Symbol::NonTerminal(n) if n == nt::WHILE_STMT => self.emit_while_stmt(node, depth),
            Symbol::NonTerminal(n) if n == nt::REPEAT_STMT => self.emit_repeat_stmt(node, depth),
            Symbol::NonTerminal(n) if n == nt::BLOCK_STMT => self.emit_block_stmt(node, depth),
            other => unreachable!("unexpected statement shape: {other:?}"),
        }
    }

    /// A `ThenBody`/else arm: a brace-delimited block gets its own
    /// indented lines, anything else is emitted inline after the
    /// enclosing header (`if (...) x := 1;`).
    fn emit_body(&mut self, node: NodeId, depth: usize) {
        let inner = self.children(node)[0];
        if let Symbol::NonTerminal(n) = self.symbol(inner) {
            if n == nt::BLOCK_STMT {
                self.emit_block_stmt(inner, depth);
                return;
            }
        }
        self.emit_stmt_inner(inner, depth);
    }

    fn emit_block_stmt(&mut self, node: NodeId, depth: usize) {
        let kids = self.children(node).to_vec();
        self.main.push_str("{\n");
        self.emit_stmt_list(kids[1], depth + 1);
        self.main.push_str(&indent(depth));
        self.main.push('}');
    }

    fn emit_id_stmt(&mut self, node: NodeId) {
        let kids = self.children(node).to_vec();
        let name = self.lexeme(kids[0]).to_string();
        let tail_kids = self.children(kids[1]).to_vec();
        if self.symbol(tail_kids[0]) == Symbol::NonTerminal(nt::ASSIGN_OP) {
            let rhs = self.emit_expr(tail_kids[1]);
            self.main.push_str(&format!("{name} = {rhs};"));
        } else {
            let mapped = resolve_name(self.name_map, &name);
            let args = self.emit_args(tail_kids[1]);
            self.main.push_str(&format!("{mapped}({args});"));
        }
    }

    fn emit_if_stmt(&mut self, node: NodeId, depth: usize) {
        let kids = self.children(node).to_vec();
        let cond = self.emit_expr(kids[1]);
        self.main.push_str(&format!("if ({cond}) "));
        self.emit_body(kids[3], depth);
        let else_kids = self.children(kids[4]).to_vec();
        if !else_kids.is_empty() {
            self.main.push_str(" else ");
            self.emit_stmt(else_kids[1], depth);
        }
    }

    fn emit_for_stmt(&mut self, node: NodeId, depth: usize) {
        let kids = self.children(node).to_vec();
        let name = self.lexeme(kids[2]).to_string();
        let var_type = self.type_of(kids[4]);
        let start = self.emit_expr(kids[6]);
        let descending = self.symbol(self.children(kids[7])[0]) == Symbol::Terminal(t::DOWNTO);
        let end = self.emit_expr(kids[8]);
        let (cmp, step) = if descending { (">=", "--") } else { ("<=", "++") };
        self.main.push_str(&format!(
            "for ({} {name} = {start}; {name} {cmp} {end}; {name}{step}) ",
            map_var_type(var_type),
        ));
        self.emit_body(kids[10], depth);
    }

    fn emit_while_stmt(&mut self, node: NodeId, depth: usize) {
        let kids = self.children(node).to_vec();
        let cond = self.emit_expr(kids[1]);
        self.main.push_str(&format!("while ({cond}) "));
        self.emit_body(kids[3], depth);
    }

    fn emit_repeat_stmt(&mut self, node: NodeId, depth: usize) {
        let kids = self.children(node).to_vec();
        self.main.push_str("do {\n");
        self.emit_stmt_list(kids[1], depth + 1);
        self.main.push_str(&indent(depth));
        let cond = self.emit_expr(kids[3]);
        self.main.push_str(&format!("}} while ({cond});"));
    }

    fn emit_args(&mut self, args_opt: NodeId) -> String {
        let kids = self.children(args_opt).to_vec();
        if kids.is_empty() {
            return String::new();
        }
        let mut parts = vec![self.emit_expr(kids[0])];
        let mut tail = kids[1];
        loop {
            let tail_kids = self.children(tail).to_vec();
            if tail_kids.is_empty() {
                break;
            }
            parts.push(self.emit_expr(tail_kids[1]));
            tail = tail_kids[2];
        }
        parts.join(", ")
    }

    // --- expressions --------------------------------------------------

    fn emit_expr(&mut self, expr_node: NodeId) -> String {
        self.emit_or(self.children(expr_node)[0])
    }

    fn emit_or(&mut self, node: NodeId) -> String {
        let kids = self.children(node).to_vec();
        let mut acc = self.emit_and(kids[0]);
        let mut tail = kids[1];
        loop {
            let tail_kids = self.children(tail).to_vec();
            if tail_kids.is_empty() {
                return acc;
            }
            let op = if self.symbol(tail_kids[0]) == Symbol::Terminal(t::XOR) { "^" } else { "||" };
            let rhs = self.emit_and(tail_kids[1]);
            acc = format!("{acc} {op} {rhs}");
            tail = tail_kids[2];
        }
    }

    fn emit_and(&mut self, node: NodeId) -> String {
        let kids = self.children(node).to_vec();
        let mut acc = self.emit_not(kids[0]);
        let mut tail = kids[1];
        loop {
            let tail_kids = self.children(tail).to_vec();
            if tail_kids.is_empty() {
                return acc;
            }
            let rhs = self.emit_not(tail_kids[1]);
            acc = format!("{acc} && {rhs}");
            tail = tail_kids[2];
        }
    }

    fn emit_not(&mut self, node: NodeId) -> String {
        let kids = self.children(node).to_vec();
        if kids.len() == 2 {
            format!("!{}", self.emit_not(kids[1]))
        } else {
            self.emit_rel(kids[0])
        }
    }

    fn emit_rel(&mut self, node: NodeId) -> String {
        let kids = self.children(node).to_vec();
        let lhs = self.emit_add(kids[0]);
        let tail_kids = self.children(kids[1]).to_vec();
        if tail_kids.is_empty() {
            return lhs;
        }
        let op_terminal_node = self.children(tail_kids[0])[0];
        let op = match self.symbol(op_terminal_node) {
            Symbol::Terminal(i) if i == t::EQ => "==",
            Symbol::Terminal(i) if i == t::NE => "!=",
            Symbol::Terminal(i) if i == t::LE => "<=",
            Symbol::Terminal(i) if i == t::LT => "<",
            Symbol::Terminal(i) if i == t::GE => ">=",
            Symbol::Terminal(i) if i == t::GT => ">",
            other => unreachable!("unexpected relational operator: {other:?}"),
        };
        let rhs = self.emit_add(tail_kids[1]);
        format!("{lhs} {op} {rhs}")
    }

    fn emit_add(&mut self, node: NodeId) -> String {
        let kids = self.children(node).to_vec();
        let mut acc = self.emit_mul(kids[0]);
        let mut tail = kids[1];
        loop {
            let tail_kids = self.children(tail).to_vec();
            if tail_kids.is_empty() {
                return acc;
            }
            let op = if self.symbol(tail_kids[0]) == Symbol::Terminal(t::PLUS) { "+" } else { "-" };
            let rhs = self.emit_mul(tail_kids[1]);
            acc = format!("{acc} {op} {rhs}");
            tail = tail_kids[2];
        }
    }

    fn emit_mul(&mut self, node: NodeId) -> String {
        let kids = self.children(node).to_vec();
        let mut acc = self.emit_unary(kids[0]);
        let mut tail = kids[1];
        loop {
            let tail_kids = self.children(tail).to_vec();
            if tail_kids.is_empty() {
                return acc;
            }
            let op = if self.symbol(tail_kids[0]) == Symbol::Terminal(t::STAR) { "*" } else { "/" };
            let rhs = self.emit_unary(tail_kids[1]);
            acc = format!("{acc} {op} {rhs}");
            tail = tail_kids[2];
        }
    }

    fn emit_unary(&mut self, node: NodeId) -> String {
        let kids = self.children(node).to_vec();
        if kids.len() == 2 {
            let sign = if self.symbol(kids[0]) == Symbol::Terminal(t::PLUS) { "+" } else { "-" };
            format!("{sign}{}", self.emit_unary(kids[1]))
        } else {
            self.emit_primary(kids[0])
        }
    }

    fn emit_primary(&mut self, node: NodeId) -> String {
        let kids = self.children(node).to_vec();
        let head = kids[0];
        match self.symbol(head) {
            Symbol::Terminal(i) if i == t::INT_LIT || i == t::REAL_LIT => self.lexeme(head).to_string(),
            Symbol::Terminal(i) if i == t::TRUE || i == t::FALSE => self.lexeme(head).to_string(),
            Symbol::Terminal(i) if i == t::STRING_LIT => self.emit_string_literal(head),
            Symbol::Terminal(i) if i == t::ID => {
                let name = self.lexeme(head).to_string();
                let call_tail = kids[1];
                let call_kids = self.children(call_tail).to_vec();
                if call_kids.is_empty() {
                    name
                } else {
                    let mapped = resolve_name(self.name_map, &name);
                    let args = self.emit_args(call_kids[1]);
                    format!("{mapped}({args})")
                }
            }
            Symbol::Terminal(i) if i == t::LPAREN => format!("({})", self.emit_expr(kids[1])),
            other => unreachable!("unexpected Primary shape: {other:?}"),
        }
    }

    fn emit_string_literal(&self, leaf: NodeId) -> String {
        let lexeme = self.lexeme(leaf);
        let body = &lexeme[1..lexeme.len() - 1];
        match self.literal_contexts.get(&leaf) {
            Some(VarType::Char) => format!("'{body}'"),
            _ => format!("\"{body}\""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transpiler_parser::parse_source;

    fn generate_source(source: &str) -> String {
        let tree = parse_source(source).expect("source must parse for these tests");
        let analysis = transpiler_sem::analyze(&tree).expect("source must type-check for these tests");
        generate(&tree, &analysis)
    }

    #[test]
    fn types_happy_path_splits_into_main_only() {
        let out = generate_source("begin var a: integer := 10; var r: real := a; end.");
        assert!(out.contains("int a = 10;"));
        assert!(out.contains("double r = a;"));
    }

    #[test]
    fn globals_and_main_are_split() {
        let out = generate_source(
            "var g1: boolean := true and false or true; begin var a: integer := 1; a := 2; end.",
        );
        assert!(out.contains("static bool g1 = true && false || true;"));
        assert!(out.contains("int a = 1;"));
        assert!(out.contains("a = 2;"));
    }

    #[test]
    fn downto_loop_with_default_name_map() {
        let out = generate_source("begin for var i: integer := 10 downto 3 do print(i); end.");
        assert!(out.contains("for (int i = 10; i >= 3; i--) Console.Write(i);"));
    }

    #[test]
    fn ascending_for_loop() {
        let out = generate_source("begin for var i: integer := 1 to 10 do println(i); end.");
        assert!(out.contains("for (int i = 1; i <= 10; i++) Console.WriteLine(i);"));
    }

    #[test]
    fn repeat_until_emits_do_while() {
        let out = generate_source("begin var a: integer := 0; repeat a := a + 1; until a = 5; end.");
        assert!(out.contains("do {"));
        assert!(out.contains("} while (a == 5);"));
    }

    #[test]
    fn block_then_body_gets_its_own_braces() {
        let out = generate_source("begin var a: integer := 1; if a = 1 then begin a := 2; end end.");
        assert!(out.contains("if (a == 1) {"));
    }

    #[test]
    fn single_statement_then_body_is_inline() {
        let out = generate_source("begin var a: integer := 1; if a = 1 then a := 2; end.");
        assert!(out.contains("if (a == 1) a = 2;"));
    }

    #[test]
    fn char_and_string_literals_emit_distinct_quoting() {
        let out = generate_source("begin var c: char := 'x'; var s: string := 'hi'; end.");
        assert!(out.contains("char c = 'x';"));
        assert!(out.contains("string s = \"hi\";"));
    }

    #[test]
    fn custom_name_map_overrides_defaults() {
        let tree = parse_source("begin print(1); end.").unwrap();
        let analysis = transpiler_sem::analyze(&tree).unwrap();
        let mut custom = BTreeMap::new();
        custom.insert("print", "Out.Emit");
        let out = generate_with_name_map(&tree, &analysis, &custom);
        assert!(out.contains("Out.Emit(1);"));
    }
}
