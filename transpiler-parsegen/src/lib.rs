//! Computes FIRST/FOLLOW sets over a fixed grammar and builds the
//! predict table the parser drives off of, rejecting any grammar that
//! is not LL(1) at construction time.

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt;

use transpiler_symbols::{Grammar, Rule, Symbol};

pub fn get_first_terminals_of_sequence(
    sequence: &[Symbol],
    first_sets: &BTreeMap<Symbol, BTreeSet<Symbol>>,
) -> BTreeSet<Symbol> {
    let mut result = BTreeSet::new();
    for (i, &symbol) in sequence.iter().enumerate() {
        let is_last = i + 1 == sequence.len();
        match symbol {
            Symbol::End | Symbol::Terminal(_) => {
                result.insert(symbol);
                return result;
            }
            Symbol::Epsilon | Symbol::NonTerminal(_) => {
                let first_of_symbol: BTreeSet<Symbol> = if symbol == Symbol::Epsilon {
                    BTreeSet::from([Symbol::Epsilon])
                } else {
                    first_sets.get(&symbol).cloned().unwrap_or_default()
                };
                let has_epsilon = first_of_symbol.contains(&Symbol::Epsilon);
                result.extend(first_of_symbol.into_iter().filter(|s| *s != Symbol::Epsilon));
                if !has_epsilon {
                    return result;
                }
                if is_last {
                    result.insert(Symbol::Epsilon);
                }
            }
        }
    }
    result
}

pub fn compute_first_sets(grammar: &Grammar) -> BTreeMap<Symbol, BTreeSet<Symbol>> {
    let mut first_sets: BTreeMap<Symbol, BTreeSet<Symbol>> =
        grammar.non_terminals().map(|nt| (nt, BTreeSet::new())).collect();

    loop {
        let mut changed = false;
        for rule in grammar.rules() {
            let first_of_rhs = get_first_terminals_of_sequence(rule.rhs(), &first_sets);
            let entry = first_sets.get_mut(&rule.lhs()).unwrap();
            for symbol in first_of_rhs {
                changed |= entry.insert(symbol);
            }
        }
        if !changed {
            break;
        }
    }
    first_sets
}

fn get_follow_symbols_of_remainder(
    lhs: Symbol,
    remainder: &[Symbol],
    first_sets: &BTreeMap<Symbol, BTreeSet<Symbol>>,
    follow_sets: &BTreeMap<Symbol, BTreeSet<Symbol>>,
) -> BTreeSet<Symbol> {
    let mut result = BTreeSet::new();
    let remainder_first = get_first_terminals_of_sequence(remainder, first_sets);
    let remainder_can_vanish = remainder.is_empty() || remainder_first.contains(&Symbol::Epsilon);
    if remainder_can_vanish {
        result.extend(follow_sets.get(&lhs).cloned().unwrap_or_default());
    }
    result.extend(remainder_first.into_iter().filter(|s| *s != Symbol::Epsilon));
    result
}

pub fn compute_follow_sets(
    grammar: &Grammar,
    first_sets: &BTreeMap<Symbol, BTreeSet<Symbol>>,
) -> BTreeMap<Symbol, BTreeSet<Symbol>> {
    let mut follow_sets: BTreeMap<Symbol, BTreeSet<Symbol>> =
        grammar.non_terminals().map(|nt| (nt, BTreeSet::new())).collect();
    follow_sets
        .entry(grammar.entry_point())
        .or_default()
        .insert(Symbol::End);

    loop {
        let mut changed = false;
        for rule in grammar.rules() {
            let rhs = rule.rhs();
            for (i, &symbol) in rhs.iter().enumerate() {
                if let Symbol::NonTerminal(_) = symbol {
                    let remainder = &rhs[i + 1..];
                    let additions =
                        get_follow_symbols_of_remainder(rule.lhs(), remainder, first_sets, &follow_sets);
                    let entry = follow_sets.get_mut(&symbol).unwrap();
                    for s in additions {
                        changed |= entry.insert(s);
                    }
                }
            }
        }
        if !changed {
            break;
        }
    }
    follow_sets
}

#[derive(Debug, PartialEq)]
pub enum ParserGenError {
    ParserTableConflict {
        non_terminal: Symbol,
        terminal: Symbol,
        production: Vec<Symbol>,
        existing_production: Vec<Symbol>,
    },
}

impl Error for ParserGenError {}

impl fmt::Display for ParserGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParserGenError::ParserTableConflict {
                non_terminal,
                terminal,
                production,
                existing_production,
            } => write!(
                f,
                "grammar is not LL(1): table[{:?}][{:?}] would be set to both {:?} and {:?}",
                non_terminal, terminal, existing_production, production
            ),
        }
    }
}

/// `TABLE: NonTerminal x (Terminal | EOI) -> production`, keyed on the
/// raw non-terminal index so lookups don't require recreating a
/// `Symbol` to index with.
#[derive(Debug, PartialEq)]
pub struct LLParserTable {
    table: BTreeMap<(u32, Symbol), Vec<Symbol>>,
}

impl LLParserTable {
    fn new() -> Self {
        LLParserTable { table: BTreeMap::new() }
    }

    pub fn get_production(&self, non_terminal: Symbol, lookahead: Symbol) -> Option<&[Symbol]> {
        match non_terminal {
            Symbol::NonTerminal(index) => self.table.get(&(index, lookahead)).map(Vec::as_slice),
            _ => None,
        }
    }

    fn insert(&mut self, non_terminal: Symbol, lookahead: Symbol, production: Vec<Symbol>) -> Result<(), ParserGenError> {
        let Symbol::NonTerminal(index) = non_terminal else {
            panic!("predict table entries are only ever keyed by a non-terminal");
        };
        let key = (index, lookahead);
        if let Some(existing) = self.table.get(&key) {
            return Err(ParserGenError::ParserTableConflict {
                non_terminal,
                terminal: lookahead,
                production,
                existing_production: existing.clone(),
            });
        }
        self.table.insert(key, production);
        Ok(())
    }
}

/// Builds the predict table for `grammar`, failing if any cell would
/// need to hold two different productions.
pub fn generate_table(grammar: &Grammar) -> Result<LLParserTable, ParserGenError> {
    log::debug!("building predict table for {} rules", grammar.rules().len());
    let first_sets = compute_first_sets(grammar);
    let follow_sets = compute_follow_sets(grammar, &first_sets);
    let mut table = LLParserTable::new();

    let build = (|| -> Result<(), ParserGenError> {
        for rule in grammar.rules() {
            let first_of_rhs = get_first_terminals_of_sequence(rule.rhs(), &first_sets);
            for &symbol in first_of_rhs.iter().filter(|s| s.is_terminal()) {
                table.insert(rule.lhs(), symbol, rule.rhs().to_vec())?;
            }
            if first_of_rhs.contains(&Symbol::Epsilon) {
                let follow_of_lhs = follow_sets.get(&rule.lhs()).cloned().unwrap_or_default();
                for symbol in follow_of_lhs.into_iter().filter(Symbol::is_terminal) {
                    table.insert(rule.lhs(), symbol, rule.rhs().to_vec())?;
                }
            }
        }
        Ok(())
    })();

    match build {
        Ok(()) => {
            log::debug!("predict table has {} cells", table.table.len());
            Ok(table)
        }
        Err(e) => {
            log::warn!("{e}");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap as Map;

    // S -> A b | eps ; A -> a
    fn epsilon_grammar() -> Grammar {
        let mut nt = Map::new();
        nt.insert(0, "S");
        nt.insert(1, "A");
        let mut t = Map::new();
        t.insert(0, "a");
        t.insert(1, "b");
        Grammar::new(
            Symbol::NonTerminal(0),
            vec![
                Rule::new(0, vec![Symbol::NonTerminal(1), Symbol::Terminal(1)]),
                Rule::new(0, vec![Symbol::Epsilon]),
                Rule::new(1, vec![Symbol::Terminal(0)]),
            ],
            nt,
            t,
        )
    }

    // A -> a | a : two productions collide on [A][a].
    fn ambiguous_grammar() -> Grammar {
        let mut nt = Map::new();
        nt.insert(0, "A");
        let mut t = Map::new();
        t.insert(0, "a");
        Grammar::new(
            Symbol::NonTerminal(0),
            vec![
                Rule::new(0, vec![Symbol::Terminal(0)]),
                Rule::new(0, vec![Symbol::Terminal(0)]),
            ],
            nt,
            t,
        )
    }

    #[test]
    fn first_set_propagates_through_epsilon() {
        let g = epsilon_grammar();
        let first = compute_first_sets(&g);
        assert_eq!(
            first[&Symbol::NonTerminal(0)],
            BTreeSet::from([Symbol::Terminal(0), Symbol::Epsilon])
        );
        assert_eq!(first[&Symbol::NonTerminal(1)], BTreeSet::from([Symbol::Terminal(0)]));
    }

    #[test]
    fn follow_set_includes_end_for_entry_symbol() {
        let g = epsilon_grammar();
        let first = compute_first_sets(&g);
        let follow = compute_follow_sets(&g, &first);
        assert!(follow[&Symbol::NonTerminal(0)].contains(&Symbol::End));
        assert!(follow[&Symbol::NonTerminal(1)].contains(&Symbol::Terminal(1)));
    }

    #[test]
    fn table_is_built_for_an_ll1_grammar() {
        let g = epsilon_grammar();
        let table = generate_table(&g).expect("grammar is LL(1)");
        assert!(table.get_production(Symbol::NonTerminal(0), Symbol::Terminal(0)).is_some());
        assert!(table.get_production(Symbol::NonTerminal(0), Symbol::End).is_some());
    }

    #[test]
    fn ambiguous_grammar_is_rejected() {
        let g = ambiguous_grammar();
        let err = generate_table(&g).unwrap_err();
        match err {
            ParserGenError::ParserTableConflict { non_terminal, terminal, .. } => {
                assert_eq!(non_terminal, Symbol::NonTerminal(0));
                assert_eq!(terminal, Symbol::Terminal(0));
            }
        }
    }
}
