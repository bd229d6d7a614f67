//! Scope stack for the analyzer. Scopes are pushed on entry to an `if`,
//! `for`, `while`, or `repeat…until` subtree and popped on exit; names
//! are resolved by walking from the current scope down to scope 0
//! (flat shadowing: a name already live anywhere on the chain may not
//! be redeclared, even in an inner scope).

use std::collections::HashMap;

use crate::types::VarType;

#[derive(Debug, Clone)]
pub struct VarInfo {
    pub var_type: VarType,
    pub loop_bound: bool,
}

#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<HashMap<String, VarInfo>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        ScopeStack { scopes: vec![HashMap::new()] }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
        debug_assert!(!self.scopes.is_empty(), "scope 0 is never popped");
    }

    pub fn is_declared(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.contains_key(name))
    }

    pub fn declare(&mut self, name: String, info: VarInfo) {
        self.scopes
            .last_mut()
            .expect("scope stack is never empty")
            .insert(name, info);
    }

    pub fn lookup(&self, name: &str) -> Option<&VarInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(t: VarType) -> VarInfo {
        VarInfo { var_type: t, loop_bound: false }
    }

    #[test]
    fn inner_scope_sees_outer_declarations() {
        let mut stack = ScopeStack::new();
        stack.declare("g".to_string(), info(VarType::Integer));
        stack.push_scope();
        assert!(stack.lookup("g").is_some());
    }

    #[test]
    fn popping_a_scope_hides_its_declarations() {
        let mut stack = ScopeStack::new();
        stack.push_scope();
        stack.declare("i".to_string(), info(VarType::Integer));
        stack.pop_scope();
        assert!(stack.lookup("i").is_none());
    }

    #[test]
    fn flat_shadowing_is_declared_across_whole_chain() {
        let mut stack = ScopeStack::new();
        stack.declare("x".to_string(), info(VarType::Integer));
        stack.push_scope();
        assert!(stack.is_declared("x"));
    }
}
