//! The tree walk: scope discipline, declaration/assignment checks, and
//! target-driven type checking. `BOOLEAN` is the one target classified
//! structurally (fold operator/operand kinds) rather than by descending
//! toward a single expected leaf shape, per the expression grammar's
//! uniform `Or/And/Not/Rel/Add/Mul/Unary/Primary` chain.

use std::collections::HashMap;

use transpiler_parser::{NodeId, ParseTree};
use transpiler_symbols::{non_terminals as nt, terminals as t, Symbol};

use crate::errors::SemanticError;
use crate::scope::{ScopeStack, VarInfo};
use crate::types::{Kind, VarType};

/// Side table produced by `analyze`: for every quoted-literal leaf, the
/// target context (`Char` or `String`) it was checked against, so the
/// code generator can pick the right surrounding quote without redoing
/// type inference.
pub struct Analysis {
    pub literal_contexts: HashMap<NodeId, VarType>,
}

struct Ctx<'a> {
    tree: &'a ParseTree,
    path: Option<&'a str>,
    scopes: ScopeStack,
    literal_contexts: HashMap<NodeId, VarType>,
}

pub fn analyze(tree: &ParseTree) -> Result<Analysis, SemanticError> {
    analyze_with_path(tree, None)
}

pub fn analyze_with_path(tree: &ParseTree, path: Option<&str>) -> Result<Analysis, SemanticError> {
    let mut ctx = Ctx {
        tree,
        path,
        scopes: ScopeStack::new(),
        literal_contexts: HashMap::new(),
    };
    if let Err(e) = analyze_program(&mut ctx, tree.root()) {
        log::warn!("{e}");
        return Err(e);
    }
    log::debug!("semantic analysis recorded {} quoted-literal contexts", ctx.literal_contexts.len());
    Ok(Analysis { literal_contexts: ctx.literal_contexts })
}

// --- small tree helpers -----------------------------------------------

fn children(ctx: &Ctx, node: NodeId) -> Vec<NodeId> {
    ctx.tree.children(node).to_vec()
}

fn symbol(ctx: &Ctx, node: NodeId) -> Symbol {
    ctx.tree.get(node).symbol
}

fn token_lexeme(ctx: &Ctx, node: NodeId) -> (String, u32) {
    let tok = ctx.tree.get(node).token.as_ref().expect("leaf node must carry a token");
    (tok.lexeme.clone(), tok.line)
}

/// Leftmost token in a subtree, used to anchor error positions for
/// errors detected above the leaf that actually triggers them.
fn first_token(ctx: &Ctx, node: NodeId) -> (String, u32) {
    if let Some(tok) = &ctx.tree.get(node).token {
        return (tok.lexeme.clone(), tok.line);
    }
    let kids = children(ctx, node);
    for kid in kids {
        if ctx.tree.get(kid).token.is_some() || !ctx.tree.children(kid).is_empty() {
            return first_token(ctx, kid);
        }
    }
    ("<empty>".to_string(), 0)
}

fn err(ctx: &Ctx, node: NodeId, reason: impl Into<String>) -> SemanticError {
    let (lexeme, line) = first_token(ctx, node);
    SemanticError::new(lexeme, line, reason, ctx.path)
}

// --- declarations / program structure ----------------------------------

fn analyze_program(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, node);
    analyze_var_decl_list_opt(ctx, kids[0])?;
    analyze_stmt_list(ctx, kids[2])
}

fn analyze_var_decl_list_opt(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, node);
    if kids.is_empty() {
        return Ok(());
    }
    analyze_var_decl(ctx, kids[0])?;
    analyze_var_decl_list_opt(ctx, kids[1])
}

fn analyze_var_decl(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    // VAR ID COLON Type InitOpt SEMI
    let kids = children(ctx, node);
    let id_node = kids[1];
    let (name, line) = token_lexeme(ctx, id_node);
    if ctx.scopes.is_declared(&name) {
        return Err(SemanticError::new(name, line, "variable is already defined", ctx.path));
    }
    let var_type = type_of(ctx, kids[3]);
    let init_opt = kids[4];
    let init_kids = children(ctx, init_opt);
    if !init_kids.is_empty() {
        // InitOpt -> ASSIGN Expr
        check_expr_as(ctx, init_kids[1], var_type)?;
    }
    ctx.scopes.declare(name, VarInfo { var_type, loop_bound: false });
    Ok(())
}

fn type_of(ctx: &Ctx, type_node: NodeId) -> VarType {
    let kids = children(ctx, type_node);
    let terminal_node = kids[0];
    let terminal = match symbol(ctx, terminal_node) {
        Symbol::Terminal(i) => i,
        _ => unreachable!("Type's only child is always a terminal"),
    };
    VarType::from_terminal(terminal).expect("Type node always holds one of the five type keywords")
}

fn analyze_stmt_list(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, node);
    if kids.is_empty() {
        return Ok(());
    }
    analyze_stmt(ctx, kids[0])?;
    analyze_stmt_list(ctx, kids[1])
}

fn analyze_stmt(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, node);
    let inner = kids[0];
    dispatch_stmt(ctx, inner)
}

fn analyze_then_body(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, node);
    dispatch_stmt(ctx, kids[0])
}

fn dispatch_stmt(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    match symbol(ctx, node) {
        Symbol::NonTerminal(n) if n == nt::VAR_DECL => analyze_var_decl(ctx, node),
        Symbol::NonTerminal(n) if n == nt::ID_STMT => analyze_id_stmt(ctx, node),
        Symbol::NonTerminal(n) if n == nt::IF_STMT => analyze_if_stmt(ctx, node),
        Symbol::NonTerminal(n) if n == nt::FOR_STMT => analyze_for_stmt(ctx, node),
        Symbol::NonTerminal(n) if n == nt::WHILE_STMT => analyze_while_stmt(ctx, node),
        Symbol::NonTerminal(n) if n == nt::REPEAT_STMT => analyze_repeat_stmt(ctx, node),
        Symbol::NonTerminal(n) if n == nt::BLOCK_STMT => analyze_block_stmt(ctx, node),
        other => unreachable!("unexpected statement shape: {other:?}"),
    }
}

fn analyze_id_stmt(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    // ID IdStmtTail
    let kids = children(ctx, node);
    let id_node = kids[0];
    let tail = kids[1];
    let tail_kids = children(ctx, tail);
    let (name, line) = token_lexeme(ctx, id_node);

    // IdStmtTail -> AssignOp Expr SEMI | LPAREN ArgsOpt RPAREN SEMI
    if symbol(ctx, tail_kids[0]) == Symbol::NonTerminal(nt::ASSIGN_OP) {
        let assign_op_node = tail_kids[0];
        let op_terminal_node = children(ctx, assign_op_node)[0];
        let (op_lexeme, op_line) = token_lexeme(ctx, op_terminal_node);
        if symbol(ctx, op_terminal_node) != Symbol::Terminal(t::ASSIGN) {
            return Err(SemanticError::not_implemented(op_lexeme, op_line, ctx.path));
        }
        let info = ctx
            .scopes
            .lookup(&name)
            .cloned()
            .ok_or_else(|| SemanticError::new(name.clone(), line, "variable is not defined", ctx.path))?;
        if info.loop_bound {
            return Err(SemanticError::new(
                name,
                line,
                "a for-loop iterator may not be assigned inside the loop body",
                ctx.path,
            ));
        }
        check_expr_as(ctx, tail_kids[1], info.var_type)
    } else {
        // Call statement: the callee is resolved externally, only the
        // arguments need to be well-typed.
        let args_opt = tail_kids[1];
        validate_args(ctx, args_opt)
    }
}

fn validate_args(ctx: &mut Ctx, args_opt: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, args_opt);
    if kids.is_empty() {
        return Ok(());
    }
    classify_expr(ctx, kids[0])?;
    let mut tail = kids[1];
    loop {
        let tail_kids = children(ctx, tail);
        if tail_kids.is_empty() {
            return Ok(());
        }
        classify_expr(ctx, tail_kids[1])?;
        tail = tail_kids[2];
    }
}

fn analyze_if_stmt(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    // IF Expr THEN ThenBody ElseOpt
    let kids = children(ctx, node);
    check_expr_as(ctx, kids[1], VarType::Boolean)?;
    ctx.scopes.push_scope();
    let result = analyze_then_body(ctx, kids[3]);
    ctx.scopes.pop_scope();
    result?;

    let else_opt = kids[4];
    let else_kids = children(ctx, else_opt);
    if !else_kids.is_empty() {
        ctx.scopes.push_scope();
        let result = analyze_stmt(ctx, else_kids[1]);
        ctx.scopes.pop_scope();
        result?;
    }
    Ok(())
}

fn analyze_for_stmt(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    // FOR VAR ID COLON Type ASSIGN Expr ForDir Expr DO ThenBody
    let kids = children(ctx, node);
    let id_node = kids[2];
    let (name, line) = token_lexeme(ctx, id_node);
    let var_type = type_of(ctx, kids[4]);
    if !matches!(var_type, VarType::Integer | VarType::Char | VarType::Boolean) {
        return Err(err(
            ctx,
            kids[4],
            format!("a for-loop iterator may not be of type {var_type}"),
        ));
    }

    ctx.scopes.push_scope();
    let result = (|| -> Result<(), SemanticError> {
        if ctx.scopes.is_declared(&name) {
            return Err(SemanticError::new(name.clone(), line, "variable is already defined", ctx.path));
        }
        check_expr_as(ctx, kids[6], var_type)?;
        check_expr_as(ctx, kids[8], var_type)?;
        ctx.scopes.declare(name, VarInfo { var_type, loop_bound: true });
        analyze_then_body(ctx, kids[10])
    })();
    ctx.scopes.pop_scope();
    result
}

fn analyze_while_stmt(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    // WHILE Expr DO ThenBody
    let kids = children(ctx, node);
    check_expr_as(ctx, kids[1], VarType::Boolean)?;
    ctx.scopes.push_scope();
    let result = analyze_then_body(ctx, kids[3]);
    ctx.scopes.pop_scope();
    result
}

fn analyze_repeat_stmt(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    // REPEAT StmtList UNTIL Expr SEMI
    let kids = children(ctx, node);
    ctx.scopes.push_scope();
    let result = (|| -> Result<(), SemanticError> {
        analyze_stmt_list(ctx, kids[1])?;
        check_expr_as(ctx, kids[3], VarType::Boolean)
    })();
    ctx.scopes.pop_scope();
    result
}

fn analyze_block_stmt(ctx: &mut Ctx, node: NodeId) -> Result<(), SemanticError> {
    // BEGIN StmtList END -- a bare grouping, not its own scope boundary
    let kids = children(ctx, node);
    analyze_stmt_list(ctx, kids[1])
}

// --- target-driven type checking ---------------------------------------

fn check_expr_as(ctx: &mut Ctx, expr_node: NodeId, expected: VarType) -> Result<(), SemanticError> {
    if expected == VarType::Boolean {
        let kind = classify_expr(ctx, expr_node)?;
        if !kind.is_boolean_compatible() {
            return Err(err(ctx, expr_node, format!("expected a boolean expression, found {kind}")));
        }
        return Ok(());
    }

    // Expr -> OrExpr; reject boolean structure at every level on the
    // way down to the arithmetic/textual value the non-boolean targets
    // actually accept.
    let or_node = children(ctx, expr_node)[0];
    let or_kids = children(ctx, or_node);
    if !children(ctx, or_kids[1]).is_empty() {
        return Err(err(ctx, or_kids[1], format!("a boolean operator is not valid for a {expected} value")));
    }
    let and_node = or_kids[0];
    let and_kids = children(ctx, and_node);
    if !children(ctx, and_kids[1]).is_empty() {
        return Err(err(ctx, and_kids[1], format!("a boolean operator is not valid for a {expected} value")));
    }
    let not_node = and_kids[0];
    let not_kids = children(ctx, not_node);
    if not_kids.len() == 2 {
        return Err(err(ctx, not_node, format!("'not' is not valid for a {expected} value")));
    }
    let rel_node = not_kids[0];
    let rel_kids = children(ctx, rel_node);
    if !children(ctx, rel_kids[1]).is_empty() {
        return Err(err(ctx, rel_kids[1], format!("a comparison is not valid for a {expected} value")));
    }
    let add_node = rel_kids[0];

    match expected {
        VarType::Integer => check_numeric_add(ctx, add_node, VarType::Integer),
        VarType::Real => check_numeric_add(ctx, add_node, VarType::Real),
        VarType::Char => check_char_add(ctx, add_node),
        VarType::String => check_string_add(ctx, add_node),
        VarType::Boolean => unreachable!("handled above"),
    }
}

fn check_numeric_add(ctx: &mut Ctx, add_node: NodeId, expected: VarType) -> Result<(), SemanticError> {
    let kids = children(ctx, add_node);
    check_numeric_mul(ctx, kids[0], expected)?;
    let mut tail = kids[1];
    loop {
        let tail_kids = children(ctx, tail);
        if tail_kids.is_empty() {
            return Ok(());
        }
        check_numeric_mul(ctx, tail_kids[1], expected)?;
        tail = tail_kids[2];
    }
}

fn check_numeric_mul(ctx: &mut Ctx, mul_node: NodeId, expected: VarType) -> Result<(), SemanticError> {
    let kids = children(ctx, mul_node);
    check_numeric_unary(ctx, kids[0], expected)?;
    let mut tail = kids[1];
    loop {
        let tail_kids = children(ctx, tail);
        if tail_kids.is_empty() {
            return Ok(());
        }
        let op_node = tail_kids[0];
        if symbol(ctx, op_node) == Symbol::Terminal(t::SLASH) && expected == VarType::Integer {
            return Err(err(ctx, op_node, "integer division is not supported"));
        }
        check_numeric_unary(ctx, tail_kids[1], expected)?;
        tail = tail_kids[2];
    }
}

fn check_numeric_unary(ctx: &mut Ctx, unary_node: NodeId, expected: VarType) -> Result<(), SemanticError> {
    let kids = children(ctx, unary_node);
    if kids.len() == 2 {
        return check_numeric_unary(ctx, kids[1], expected);
    }
    check_numeric_primary(ctx, kids[0], expected)
}

fn check_numeric_primary(ctx: &mut Ctx, primary_node: NodeId, expected: VarType) -> Result<(), SemanticError> {
    let kids = children(ctx, primary_node);
    let head = kids[0];
    match symbol(ctx, head) {
        Symbol::Terminal(term) if term == t::INT_LIT => Ok(()),
        Symbol::Terminal(term) if term == t::REAL_LIT => {
            if expected == VarType::Real {
                Ok(())
            } else {
                Err(err(ctx, head, "cannot assign a real value to an integer variable"))
            }
        }
        Symbol::Terminal(term) if term == t::TRUE || term == t::FALSE => {
            Err(err(ctx, head, format!("a boolean value is not valid for a {expected} value")))
        }
        Symbol::Terminal(term) if term == t::STRING_LIT => {
            Err(err(ctx, head, format!("a string value is not valid for a {expected} value")))
        }
        Symbol::Terminal(term) if term == t::ID => {
            let call_tail = kids[1];
            if children(ctx, call_tail).is_empty() {
                let (name, line) = token_lexeme(ctx, head);
                let info = ctx
                    .scopes
                    .lookup(&name)
                    .cloned()
                    .ok_or_else(|| SemanticError::new(name.clone(), line, "variable is not defined", ctx.path))?;
                match info.var_type {
                    VarType::Integer => Ok(()),
                    VarType::Real if expected == VarType::Real => Ok(()),
                    VarType::Real => Err(SemanticError::new(
                        name,
                        line,
                        "cannot assign a real value to an integer variable",
                        ctx.path,
                    )),
                    other => Err(SemanticError::new(
                        name,
                        line,
                        format!("cannot use a {other} value where a {expected} value is expected"),
                        ctx.path,
                    )),
                }
            } else {
                validate_args(ctx, children(ctx, call_tail)[1])
            }
        }
        Symbol::Terminal(term) if term == t::LPAREN => check_expr_as(ctx, kids[1], expected),
        other => unreachable!("unexpected Primary shape: {other:?}"),
    }
}

fn check_char_add(ctx: &mut Ctx, add_node: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, add_node);
    if !children(ctx, kids[1]).is_empty() {
        return Err(err(ctx, kids[1], "an operator is not valid for a char value"));
    }
    let mul_kids = children(ctx, kids[0]);
    if !children(ctx, mul_kids[1]).is_empty() {
        return Err(err(ctx, mul_kids[1], "an operator is not valid for a char value"));
    }
    let unary_kids = children(ctx, mul_kids[0]);
    if unary_kids.len() == 2 {
        return Err(err(ctx, mul_kids[0], "a sign is not valid for a char value"));
    }
    check_char_primary(ctx, unary_kids[0])
}

fn check_char_primary(ctx: &mut Ctx, primary_node: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, primary_node);
    let head = kids[0];
    match symbol(ctx, head) {
        Symbol::Terminal(term) if term == t::STRING_LIT => {
            let (lexeme, line) = token_lexeme(ctx, head);
            let body = &lexeme[1..lexeme.len() - 1];
            if body.chars().count() == 1 {
                ctx.literal_contexts.insert(head, VarType::Char);
                Ok(())
            } else {
                Err(SemanticError::new(lexeme, line, "a char value must be exactly one character", ctx.path))
            }
        }
        Symbol::Terminal(term) if term == t::ID => {
            let call_tail = kids[1];
            if children(ctx, call_tail).is_empty() {
                let (name, line) = token_lexeme(ctx, head);
                let info = ctx
                    .scopes
                    .lookup(&name)
                    .cloned()
                    .ok_or_else(|| SemanticError::new(name.clone(), line, "variable is not defined", ctx.path))?;
                if info.var_type == VarType::Char {
                    Ok(())
                } else {
                    Err(SemanticError::new(
                        name,
                        line,
                        format!("cannot use a {} value where a char value is expected", info.var_type),
                        ctx.path,
                    ))
                }
            } else {
                validate_args(ctx, children(ctx, call_tail)[1])
            }
        }
        _ => Err(err(ctx, primary_node, "not a valid char value")),
    }
}

fn check_string_add(ctx: &mut Ctx, add_node: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, add_node);
    check_string_operand(ctx, kids[0])?;
    let mut tail = kids[1];
    loop {
        let tail_kids = children(ctx, tail);
        if tail_kids.is_empty() {
            return Ok(());
        }
        let op_node = tail_kids[0];
        if symbol(ctx, op_node) == Symbol::Terminal(t::MINUS) {
            return Err(err(ctx, op_node, "'-' is not valid for a string value"));
        }
        check_string_operand(ctx, tail_kids[1])?;
        tail = tail_kids[2];
    }
}

fn check_string_operand(ctx: &mut Ctx, mul_node: NodeId) -> Result<(), SemanticError> {
    let mul_kids = children(ctx, mul_node);
    if !children(ctx, mul_kids[1]).is_empty() {
        return Err(err(ctx, mul_kids[1], "'*' and '/' are not valid for a string value"));
    }
    let unary_kids = children(ctx, mul_kids[0]);
    if unary_kids.len() == 2 {
        return Err(err(ctx, mul_kids[0], "a sign is not valid for a string value"));
    }
    check_string_primary(ctx, unary_kids[0])
}

fn check_string_primary(ctx: &mut Ctx, primary_node: NodeId) -> Result<(), SemanticError> {
    let kids = children(ctx, primary_node);
    let head = kids[0];
    match symbol(ctx, head) {
        Symbol::Terminal(term) if term == t::STRING_LIT => {
            ctx.literal_contexts.insert(head, VarType::String);
            Ok(())
        }
        Symbol::Terminal(term) if term == t::ID => {
            let call_tail = kids[1];
            if children(ctx, call_tail).is_empty() {
                let (name, line) = token_lexeme(ctx, head);
                let info = ctx
                    .scopes
                    .lookup(&name)
                    .cloned()
                    .ok_or_else(|| SemanticError::new(name.clone(), line, "variable is not defined", ctx.path))?;
                if matches!(info.var_type, VarType::String | VarType::Char) {
                    Ok(())
                } else {
                    Err(SemanticError::new(
                        name,
                        line,
                        "combining a string with a non-string, non-call value is not allowed",
                        ctx.path,
                    ))
                }
            } else {
                validate_args(ctx, children(ctx, call_tail)[1])
            }
        }
        _ => Err(err(ctx, primary_node, "combining a string with a non-string, non-call value is not allowed")),
    }
}

// --- structural boolean / generic kind classification -------------------

fn classify_expr(ctx: &mut Ctx, expr_node: NodeId) -> Result<Kind, SemanticError> {
    classify_or(ctx, children(ctx, expr_node)[0])
}

fn classify_or(ctx: &mut Ctx, or_node: NodeId) -> Result<Kind, SemanticError> {
    let kids = children(ctx, or_node);
    let mut acc = classify_and(ctx, kids[0])?;
    let mut tail = kids[1];
    loop {
        let tail_kids = children(ctx, tail);
        if tail_kids.is_empty() {
            return Ok(acc);
        }
        let op_node = tail_kids[0];
        let rhs = classify_and(ctx, tail_kids[1])?;
        if !acc.is_boolean_compatible() || !rhs.is_boolean_compatible() {
            return Err(err(ctx, op_node, "'and'/'or'/'xor' require boolean operands"));
        }
        acc = Kind::Boolean;
        tail = tail_kids[2];
    }
}

fn classify_and(ctx: &mut Ctx, and_node: NodeId) -> Result<Kind, SemanticError> {
    let kids = children(ctx, and_node);
    let mut acc = classify_not(ctx, kids[0])?;
    let mut tail = kids[1];
    loop {
        let tail_kids = children(ctx, tail);
        if tail_kids.is_empty() {
            return Ok(acc);
        }
        let op_node = tail_kids[0];
        let rhs = classify_not(ctx, tail_kids[1])?;
        if !acc.is_boolean_compatible() || !rhs.is_boolean_compatible() {
            return Err(err(ctx, op_node, "'and' requires boolean operands"));
        }
        acc = Kind::Boolean;
        tail = tail_kids[2];
    }
}

fn classify_not(ctx: &mut Ctx, not_node: NodeId) -> Result<Kind, SemanticError> {
    let kids = children(ctx, not_node);
    if kids.len() == 2 {
        let inner = classify_not(ctx, kids[1])?;
        if !inner.is_boolean_compatible() {
            return Err(err(ctx, not_node, "'not' requires a boolean operand"));
        }
        Ok(Kind::Boolean)
    } else {
        classify_rel(ctx, kids[0])
    }
}

fn classify_rel(ctx: &mut Ctx, rel_node: NodeId) -> Result<Kind, SemanticError> {
    let kids = children(ctx, rel_node);
    let lhs = classify_add(ctx, kids[0])?;
    let tail_kids = children(ctx, kids[1]);
    if tail_kids.is_empty() {
        return Ok(lhs);
    }
    let rhs = classify_add(ctx, tail_kids[1])?;
    if !lhs.comparable_with(rhs) {
        return Err(err(ctx, tail_kids[0], format!("cannot compare a {lhs} value with a {rhs} value")));
    }
    Ok(Kind::Boolean)
}

fn classify_add(ctx: &mut Ctx, add_node: NodeId) -> Result<Kind, SemanticError> {
    let kids = children(ctx, add_node);
    let mut acc = classify_mul(ctx, kids[0])?;
    let mut tail = kids[1];
    loop {
        let tail_kids = children(ctx, tail);
        if tail_kids.is_empty() {
            return Ok(acc);
        }
        let op_node = tail_kids[0];
        let rhs = classify_mul(ctx, tail_kids[1])?;
        let is_plus = symbol(ctx, op_node) == Symbol::Terminal(t::PLUS);
        acc = if is_plus && acc.is_textual_compatible() && rhs.is_textual_compatible() {
            Kind::String
        } else if acc.is_numeric_compatible() && rhs.is_numeric_compatible() {
            widen_numeric(acc, rhs)
        } else {
            return Err(err(ctx, op_node, format!("'{}' is not valid between a {acc} value and a {rhs} value", if is_plus { "+" } else { "-" })));
        };
        tail = tail_kids[2];
    }
}

fn classify_mul(ctx: &mut Ctx, mul_node: NodeId) -> Result<Kind, SemanticError> {
    let kids = children(ctx, mul_node);
    let mut acc = classify_unary(ctx, kids[0])?;
    let mut tail = kids[1];
    loop {
        let tail_kids = children(ctx, tail);
        if tail_kids.is_empty() {
            return Ok(acc);
        }
        let op_node = tail_kids[0];
        let rhs = classify_unary(ctx, tail_kids[1])?;
        if !acc.is_numeric_compatible() || !rhs.is_numeric_compatible() {
            return Err(err(ctx, op_node, format!("'*'/'/ ' require numeric operands, found {acc} and {rhs}")));
        }
        acc = if symbol(ctx, op_node) == Symbol::Terminal(t::SLASH) {
            Kind::Real
        } else {
            widen_numeric(acc, rhs)
        };
        tail = tail_kids[2];
    }
}

fn widen_numeric(a: Kind, b: Kind) -> Kind {
    if a == Kind::Any {
        return b;
    }
    if b == Kind::Any {
        return a;
    }
    if a == Kind::Real || b == Kind::Real {
        Kind::Real
    } else {
        Kind::Integer
    }
}

fn classify_unary(ctx: &mut Ctx, unary_node: NodeId) -> Result<Kind, SemanticError> {
    let kids = children(ctx, unary_node);
    if kids.len() == 2 {
        let inner = classify_unary(ctx, kids[1])?;
        if !inner.is_numeric_compatible() {
            return Err(err(ctx, unary_node, format!("a sign is not valid for a {inner} value")));
        }
        Ok(inner)
    } else {
        classify_primary(ctx, kids[0])
    }
}

fn classify_primary(ctx: &mut Ctx, primary_node: NodeId) -> Result<Kind, SemanticError> {
    let kids = children(ctx, primary_node);
    let head = kids[0];
    match symbol(ctx, head) {
        Symbol::Terminal(term) if term == t::INT_LIT => Ok(Kind::Integer),
        Symbol::Terminal(term) if term == t::REAL_LIT => Ok(Kind::Real),
        Symbol::Terminal(term) if term == t::TRUE || term == t::FALSE => Ok(Kind::Boolean),
        Symbol::Terminal(term) if term == t::STRING_LIT => {
            // Reached outside a char/string target (a call argument, a
            // comparison operand, ...): no target context to pick a
            // quote style from, so default to string.
            ctx.literal_contexts.entry(head).or_insert(VarType::String);
            Ok(Kind::String)
        }
        Symbol::Terminal(term) if term == t::ID => {
            let call_tail = kids[1];
            if children(ctx, call_tail).is_empty() {
                let (name, line) = token_lexeme(ctx, head);
                let info = ctx
                    .scopes
                    .lookup(&name)
                    .cloned()
                    .ok_or_else(|| SemanticError::new(name, line, "variable is not defined", ctx.path))?;
                Ok(info.var_type.to_kind())
            } else {
                validate_args(ctx, children(ctx, call_tail)[1])?;
                Ok(Kind::Any)
            }
        }
        Symbol::Terminal(term) if term == t::LPAREN => classify_expr(ctx, kids[1]),
        other => unreachable!("unexpected Primary shape: {other:?}"),
    }
}
