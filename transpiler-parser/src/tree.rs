//! Arena-backed parse tree. Nodes own their children left-to-right and
//! hold a non-owning back reference to their parent, addressed by index
//! rather than by pointer so the tree can be built iteratively by the
//! table-driven parser without fighting the borrow checker.

use transpiler_symbols::{Symbol, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Debug)]
pub struct Node {
    pub symbol: Symbol,
    pub token: Option<Token>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug)]
pub struct ParseTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ParseTree {
    pub(crate) fn new(root_symbol: Symbol) -> Self {
        let root = Node {
            symbol: root_symbol,
            token: None,
            parent: None,
            children: Vec::new(),
        };
        ParseTree {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, symbol: Symbol) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            symbol,
            token: None,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn attach_token(&mut self, node: NodeId, token: Token) {
        self.nodes[node.0].token = Some(token);
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Depth-first, left-to-right walk, yielding every node in the order
    /// the source would have produced them.
    pub fn walk(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        let mut order = Vec::new();
        while let Some(id) = stack.pop() {
            order.push(id);
            for &child in self.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
        }
        order.into_iter()
    }

    /// All leaf tokens in source order, as produced by the lexer.
    pub fn leaf_tokens(&self) -> impl Iterator<Item = &Token> + '_ {
        self.walk()
            .collect::<Vec<_>>()
            .into_iter()
            .filter_map(move |id| self.get(id).token.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_visits_depth_first_left_to_right() {
        let mut tree = ParseTree::new(Symbol::NonTerminal(0));
        let root = tree.root();
        let a = tree.push_child(root, Symbol::NonTerminal(1));
        let _b = tree.push_child(root, Symbol::NonTerminal(2));
        let _c = tree.push_child(a, Symbol::Terminal(0));
        let order: Vec<Symbol> = tree.walk().map(|id| tree.get(id).symbol).collect();
        assert_eq!(
            order,
            vec![
                Symbol::NonTerminal(0),
                Symbol::NonTerminal(1),
                Symbol::Terminal(0),
                Symbol::NonTerminal(2),
            ]
        );
    }
}
