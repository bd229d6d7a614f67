//! The fixed grammar for the source language.
//!
//! Dangling-else is resolved structurally rather than by a table
//! resolution rule: `ThenBody` excludes a bare `IfStmt`, and critically
//! `ForStmt`/`WhileStmt` bodies are themselves `ThenBody`, not `Stmt` —
//! otherwise an unparenthesized `if` could still reach an enclosing
//! `else` through a loop body, which reintroduces `ELSE` into
//! `FOLLOW(ElseOpt)` and makes the grammar fail the LL(1) check. Only
//! `RepeatStmt`, `BlockStmt`, and the top-level statement list may hold
//! a bare `Stmt` (and therefore a dangling `if`), because each of those
//! is closed by a fixed keyword (`until`/`end`) rather than an optional
//! `else`.

use transpiler_symbols::{non_terminals as nt, terminals as t, Grammar, Rule, Symbol};

fn rule(lhs: u32, rhs: Vec<Symbol>) -> Rule {
    Rule::new(lhs, rhs)
}

fn nonterm(i: u32) -> Symbol {
    Symbol::NonTerminal(i)
}

fn term(i: u32) -> Symbol {
    Symbol::Terminal(i)
}

const EPS: Symbol = Symbol::Epsilon;

pub fn build_grammar() -> Grammar {
    use nt::*;
    use t::*;

    let rules = vec![
        rule(PROGRAM, vec![nonterm(VAR_DECL_LIST_OPT), term(BEGIN), nonterm(STMT_LIST), term(END), term(DOT)]),
        rule(VAR_DECL_LIST_OPT, vec![nonterm(VAR_DECL), nonterm(VAR_DECL_LIST_OPT)]),
        rule(VAR_DECL_LIST_OPT, vec![EPS]),
        rule(VAR_DECL, vec![term(VAR), term(ID), term(COLON), nonterm(TYPE), nonterm(INIT_OPT), term(SEMI)]),
        rule(TYPE, vec![term(T_INTEGER)]),
        rule(TYPE, vec![term(T_REAL)]),
        rule(TYPE, vec![term(T_BOOLEAN)]),
        rule(TYPE, vec![term(T_CHAR)]),
        rule(TYPE, vec![term(T_STRING)]),
        rule(INIT_OPT, vec![term(ASSIGN), nonterm(EXPR)]),
        rule(INIT_OPT, vec![EPS]),
        rule(STMT_LIST, vec![nonterm(STMT), nonterm(STMT_LIST)]),
        rule(STMT_LIST, vec![EPS]),
        rule(STMT, vec![nonterm(VAR_DECL)]),
        rule(STMT, vec![nonterm(ID_STMT)]),
        rule(STMT, vec![nonterm(IF_STMT)]),
        rule(STMT, vec![nonterm(FOR_STMT)]),
        rule(STMT, vec![nonterm(WHILE_STMT)]),
        rule(STMT, vec![nonterm(REPEAT_STMT)]),
        rule(STMT, vec![nonterm(BLOCK_STMT)]),
        rule(THEN_BODY, vec![nonterm(VAR_DECL)]),
        rule(THEN_BODY, vec![nonterm(ID_STMT)]),
        rule(THEN_BODY, vec![nonterm(FOR_STMT)]),
        rule(THEN_BODY, vec![nonterm(WHILE_STMT)]),
        rule(THEN_BODY, vec![nonterm(REPEAT_STMT)]),
        rule(THEN_BODY, vec![nonterm(BLOCK_STMT)]),
        rule(ID_STMT, vec![term(ID), nonterm(ID_STMT_TAIL)]),
        rule(ID_STMT_TAIL, vec![nonterm(ASSIGN_OP), nonterm(EXPR), term(SEMI)]),
        rule(ID_STMT_TAIL, vec![term(LPAREN), nonterm(ARGS_OPT), term(RPAREN), term(SEMI)]),
        rule(ASSIGN_OP, vec![term(ASSIGN)]),
        rule(ASSIGN_OP, vec![term(PLUS_ASSIGN)]),
        rule(ASSIGN_OP, vec![term(MINUS_ASSIGN)]),
        rule(ASSIGN_OP, vec![term(STAR_ASSIGN)]),
        rule(ASSIGN_OP, vec![term(SLASH_ASSIGN)]),
        rule(IF_STMT, vec![term(IF), nonterm(EXPR), term(THEN), nonterm(THEN_BODY), nonterm(ELSE_OPT)]),
        rule(ELSE_OPT, vec![term(ELSE), nonterm(STMT)]),
        rule(ELSE_OPT, vec![EPS]),
        rule(
            FOR_STMT,
            vec![
                term(FOR),
                term(VAR),
                term(ID),
                term(COLON),
                nonterm(TYPE),
                term(ASSIGN),
                nonterm(EXPR),
                nonterm(FOR_DIR),
                nonterm(EXPR),
                term(DO),
                nonterm(THEN_BODY),
            ],
        ),
        rule(FOR_DIR, vec![term(TO)]),
        rule(FOR_DIR, vec![term(DOWNTO)]),
        rule(WHILE_STMT, vec![term(WHILE), nonterm(EXPR), term(DO), nonterm(THEN_BODY)]),
        rule(REPEAT_STMT, vec![term(REPEAT), nonterm(STMT_LIST), term(UNTIL), nonterm(EXPR), term(SEMI)]),
        rule(BLOCK_STMT, vec![term(BEGIN), nonterm(STMT_LIST), term(END)]),
        rule(EXPR, vec![nonterm(OR_EXPR)]),
        rule(OR_EXPR, vec![nonterm(AND_EXPR), nonterm(OR_EXPR_TAIL)]),
        rule(OR_EXPR_TAIL, vec![term(OR), nonterm(AND_EXPR), nonterm(OR_EXPR_TAIL)]),
        rule(OR_EXPR_TAIL, vec![term(XOR), nonterm(AND_EXPR), nonterm(OR_EXPR_TAIL)]),
        rule(OR_EXPR_TAIL, vec![EPS]),
        rule(AND_EXPR, vec![nonterm(NOT_EXPR), nonterm(AND_EXPR_TAIL)]),
        rule(AND_EXPR_TAIL, vec![term(AND), nonterm(NOT_EXPR), nonterm(AND_EXPR_TAIL)]),
        rule(AND_EXPR_TAIL, vec![EPS]),
        rule(NOT_EXPR, vec![term(NOT), nonterm(NOT_EXPR)]),
        rule(NOT_EXPR, vec![nonterm(REL_EXPR)]),
        rule(REL_EXPR, vec![nonterm(ADD_EXPR), nonterm(REL_EXPR_TAIL)]),
        rule(REL_EXPR_TAIL, vec![nonterm(REL_OP), nonterm(ADD_EXPR)]),
        rule(REL_EXPR_TAIL, vec![EPS]),
        rule(REL_OP, vec![term(EQ)]),
        rule(REL_OP, vec![term(NE)]),
        rule(REL_OP, vec![term(LT)]),
        rule(REL_OP, vec![term(LE)]),
        rule(REL_OP, vec![term(GT)]),
        rule(REL_OP, vec![term(GE)]),
        rule(ADD_EXPR, vec![nonterm(MUL_EXPR), nonterm(ADD_EXPR_TAIL)]),
        rule(ADD_EXPR_TAIL, vec![term(PLUS), nonterm(MUL_EXPR), nonterm(ADD_EXPR_TAIL)]),
        rule(ADD_EXPR_TAIL, vec![term(MINUS), nonterm(MUL_EXPR), nonterm(ADD_EXPR_TAIL)]),
        rule(ADD_EXPR_TAIL, vec![EPS]),
        rule(MUL_EXPR, vec![nonterm(UNARY_EXPR), nonterm(MUL_EXPR_TAIL)]),
        rule(MUL_EXPR_TAIL, vec![term(STAR), nonterm(UNARY_EXPR), nonterm(MUL_EXPR_TAIL)]),
        rule(MUL_EXPR_TAIL, vec![term(SLASH), nonterm(UNARY_EXPR), nonterm(MUL_EXPR_TAIL)]),
        rule(MUL_EXPR_TAIL, vec![EPS]),
        rule(UNARY_EXPR, vec![term(PLUS), nonterm(UNARY_EXPR)]),
        rule(UNARY_EXPR, vec![term(MINUS), nonterm(UNARY_EXPR)]),
        rule(UNARY_EXPR, vec![nonterm(PRIMARY)]),
        rule(PRIMARY, vec![term(INT_LIT)]),
        rule(PRIMARY, vec![term(REAL_LIT)]),
        rule(PRIMARY, vec![term(STRING_LIT)]),
        rule(PRIMARY, vec![term(TRUE)]),
        rule(PRIMARY, vec![term(FALSE)]),
        rule(PRIMARY, vec![term(ID), nonterm(CALL_TAIL)]),
        rule(PRIMARY, vec![term(LPAREN), nonterm(EXPR), term(RPAREN)]),
        rule(CALL_TAIL, vec![term(LPAREN), nonterm(ARGS_OPT), term(RPAREN)]),
        rule(CALL_TAIL, vec![EPS]),
        rule(ARGS_OPT, vec![nonterm(EXPR), nonterm(ARG_LIST_TAIL)]),
        rule(ARGS_OPT, vec![EPS]),
        rule(ARG_LIST_TAIL, vec![term(COMMA), nonterm(EXPR), nonterm(ARG_LIST_TAIL)]),
        rule(ARG_LIST_TAIL, vec![EPS]),
    ];

    let non_terminal_names = nt::ALL.iter().copied().collect();
    let terminal_names = t::ALL.iter().copied().collect();

    Grammar::new(nonterm(PROGRAM), rules, non_terminal_names, terminal_names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use transpiler_parsegen::generate_table;

    #[test]
    fn concrete_grammar_is_ll1() {
        let grammar = build_grammar();
        generate_table(&grammar).expect("concrete grammar must be LL(1)");
    }

    #[test]
    fn else_binds_to_nearest_if_without_a_table_conflict() {
        // Regression guard for the dangling-else fix: FOLLOW(ElseOpt)
        // must not contain ELSE, or `generate_table` above would have
        // already failed on `ElseOpt -> ELSE Stmt | eps`.
        let grammar = build_grammar();
        let first = transpiler_parsegen::compute_first_sets(&grammar);
        let follow = transpiler_parsegen::compute_follow_sets(&grammar, &first);
        let else_opt_follow = &follow[&nonterm(nt::ELSE_OPT)];
        assert!(!else_opt_follow.contains(&term(t::ELSE)));
    }
}
