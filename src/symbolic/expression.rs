//! Deferred expression graphs.
//!
//! An [`Expr`] is a cheap handle to an immutable node in a directed acyclic
//! graph. Handles are reference counted, so a sub-expression that is used in
//! several places (the prime-vertical radius inside the geodetic iteration,
//! for instance) is stored once and evaluated once.
//!
//! Arithmetic follows IEEE semantics: dividing by zero yields an infinity or
//! NaN, exactly as the same operation on `f64` would.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;
use thiserror::Error;

/// Error that can occur during expression evaluation or compilation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpressionError {
    #[error("Undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },
}

/// Result type for expression evaluation
pub type ExprResult<T> = Result<T, ExpressionError>;

/// Unary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Negation (-)
    Neg,

    /// Square root
    Sqrt,

    /// Sine
    Sin,

    /// Cosine
    Cos,

    /// Arc tangent
    Atan,
}

impl UnaryOp {
    /// Apply the operation to a value.
    #[inline]
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Self::Neg => -value,
            Self::Sqrt => value.sqrt(),
            Self::Sin => value.sin(),
            Self::Cos => value.cos(),
            Self::Atan => value.atan(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Sqrt => "sqrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Atan => "atan",
        }
    }
}

/// Binary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Addition (+)
    Add,

    /// Subtraction (-)
    Sub,

    /// Multiplication (*)
    Mul,

    /// Division (/)
    Div,

    /// Two-argument arc tangent, `atan2(lhs, rhs)` with `lhs` the ordinate
    Atan2,
}

impl BinaryOp {
    /// Apply the operation to a pair of values.
    #[inline]
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div => lhs / rhs,
            Self::Atan2 => lhs.atan2(rhs),
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Atan2 => "atan2",
        }
    }
}

/// A single node of the expression graph
#[derive(Debug, PartialEq)]
pub enum Node {
    /// Constant number
    Number(f64),

    /// Variable reference
    Variable(String),

    /// Unary operations
    Unary(UnaryOp, Expr),

    /// Binary operations
    Binary(BinaryOp, Expr, Expr),
}

/// Shared handle to an expression graph node.
#[derive(Clone)]
pub struct Expr(Arc<Node>);

/// Context for expression evaluation, providing variable values
pub trait EvaluationContext {
    /// Get the value of a variable
    fn get_variable(&self, name: &str) -> ExprResult<f64>;

    /// Check if a variable exists
    fn has_variable(&self, name: &str) -> bool;

    /// Get the names of all variables
    fn variable_names(&self) -> Vec<String>;
}

/// Simple implementation of EvaluationContext using a HashMap
#[derive(Debug, Clone, Default)]
pub struct SimpleContext {
    variables: HashMap<String, f64>,
}

impl SimpleContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Set a variable value
    pub fn set_variable(&mut self, name: &str, value: f64) {
        self.variables.insert(name.to_string(), value);
    }

    /// Builder-style variant of [`SimpleContext::set_variable`]
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.set_variable(name, value);
        self
    }
}

impl EvaluationContext for SimpleContext {
    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        self.variables.get_variable(name)
    }

    fn has_variable(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    fn variable_names(&self) -> Vec<String> {
        self.variables.keys().cloned().collect()
    }
}

impl EvaluationContext for HashMap<String, f64> {
    fn get_variable(&self, name: &str) -> ExprResult<f64> {
        self.get(name)
            .copied()
            .ok_or_else(|| ExpressionError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    fn has_variable(&self, name: &str) -> bool {
        self.contains_key(name)
    }

    fn variable_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

impl Expr {
    fn from_node(node: Node) -> Self {
        Self(Arc::new(node))
    }

    /// Constant leaf.
    pub fn number(value: f64) -> Self {
        Self::from_node(Node::Number(value))
    }

    /// Named variable leaf.
    pub fn variable(name: &str) -> Self {
        Self::from_node(Node::Variable(name.to_string()))
    }

    /// Apply a unary operation.
    pub fn unary(op: UnaryOp, operand: &Expr) -> Self {
        Self::from_node(Node::Unary(op, operand.clone()))
    }

    /// Apply a binary operation.
    pub fn binary(op: BinaryOp, lhs: &Expr, rhs: &Expr) -> Self {
        Self::from_node(Node::Binary(op, lhs.clone(), rhs.clone()))
    }

    pub fn sqrt(&self) -> Self {
        Self::unary(UnaryOp::Sqrt, self)
    }

    pub fn sin(&self) -> Self {
        Self::unary(UnaryOp::Sin, self)
    }

    pub fn cos(&self) -> Self {
        Self::unary(UnaryOp::Cos, self)
    }

    pub fn atan(&self) -> Self {
        Self::unary(UnaryOp::Atan, self)
    }

    /// `atan2(self, x)`, with `self` as the ordinate.
    pub fn atan2(&self, x: &Expr) -> Self {
        Self::binary(BinaryOp::Atan2, self, x)
    }

    /// The node this handle points at.
    pub fn node(&self) -> &Node {
        &self.0
    }

    /// Identity of the underlying node, shared by every clone of the handle.
    pub(crate) fn id(&self) -> *const Node {
        Arc::as_ptr(&self.0)
    }

    /// Evaluate the expression with the given context.
    ///
    /// Shared nodes are evaluated once per call.
    pub fn evaluate<C: EvaluationContext>(&self, context: &C) -> ExprResult<f64> {
        let mut values: HashMap<*const Node, f64> = HashMap::new();
        let value_of = |values: &HashMap<*const Node, f64>, expr: &Expr| {
            values.get(&expr.id()).copied().ok_or_else(out_of_order)
        };

        for expr in self.post_order() {
            let value = match expr.node() {
                Node::Number(n) => *n,
                Node::Variable(name) => context.get_variable(name)?,
                Node::Unary(op, operand) => op.apply(value_of(&values, operand)?),
                Node::Binary(op, lhs, rhs) => {
                    op.apply(value_of(&values, lhs)?, value_of(&values, rhs)?)
                }
            };
            values.insert(expr.id(), value);
        }

        value_of(&values, self)
    }

    /// Every distinct node reachable from this expression, children before
    /// parents. Walks an explicit stack, so graph depth is bounded only by
    /// memory.
    pub(crate) fn post_order(&self) -> Vec<&Expr> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![(self, false)];

        while let Some((expr, expanded)) = stack.pop() {
            if expanded {
                order.push(expr);
                continue;
            }
            if !seen.insert(expr.id()) {
                continue;
            }
            stack.push((expr, true));
            match expr.node() {
                Node::Number(_) | Node::Variable(_) => {}
                Node::Unary(_, operand) => stack.push((operand, false)),
                Node::Binary(_, lhs, rhs) => {
                    stack.push((rhs, false));
                    stack.push((lhs, false));
                }
            }
        }
        order
    }

    /// Find all variable names used in the expression
    pub fn variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = self
            .post_order()
            .into_iter()
            .filter_map(|expr| match expr.node() {
                Node::Variable(name) => Some(name.clone()),
                _ => None,
            })
            .collect();
        vars.sort();
        vars.dedup();
        vars
    }

    /// Number of distinct nodes reachable from this expression.
    pub fn node_count(&self) -> usize {
        self.post_order().len()
    }
}

pub(crate) fn out_of_order() -> ExpressionError {
    ExpressionError::InvalidOperation {
        message: "Operand visited after its parent".to_string(),
    }
}

/// Structural equality. Shared sub-graphs are compared once, and identical
/// handles short-circuit.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        let mut compared = HashSet::new();
        let mut stack = vec![(self, other)];

        while let Some((a, b)) = stack.pop() {
            if Arc::ptr_eq(&a.0, &b.0) || !compared.insert((a.id(), b.id())) {
                continue;
            }
            match (a.node(), b.node()) {
                (Node::Number(x), Node::Number(y)) if x == y => {}
                (Node::Variable(x), Node::Variable(y)) if x == y => {}
                (Node::Unary(op_a, x), Node::Unary(op_b, y)) if op_a == op_b => {
                    stack.push((x, y));
                }
                (Node::Binary(op_a, xl, xr), Node::Binary(op_b, yl, yr)) if op_a == op_b => {
                    stack.push((xl, yl));
                    stack.push((xr, yr));
                }
                _ => return false,
            }
        }
        true
    }
}

/// Releases uniquely owned chains iteratively; the default drop glue would
/// recurse once per level of the graph.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        detach_children(&mut self.0, &mut pending);
        while let Some(mut expr) = pending.pop() {
            detach_children(&mut expr.0, &mut pending);
        }
    }
}

/// Move the children of `node` onto `pending` if this is its last handle.
fn detach_children(node: &mut Arc<Node>, pending: &mut Vec<Expr>) {
    let Some(node) = Arc::get_mut(node) else {
        return;
    };
    match std::mem::replace(node, Node::Number(0.0)) {
        Node::Unary(_, operand) => pending.push(operand),
        Node::Binary(_, lhs, rhs) => {
            pending.push(lhs);
            pending.push(rhs);
        }
        leaf => *node = leaf,
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr({})", self)
    }
}

/// Renders the graph as a fully parenthesised infix string. Shared nodes are
/// expanded at every use, so the output grows with the tree size, not the
/// node count.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Number(n) => write!(f, "{}", n),
            Node::Variable(name) => write!(f, "{}", name),
            Node::Unary(UnaryOp::Neg, operand) => write!(f, "(-{})", operand),
            Node::Unary(op, operand) => write!(f, "{}({})", op.name(), operand),
            Node::Binary(BinaryOp::Atan2, lhs, rhs) => write!(f, "atan2({}, {})", lhs, rhs),
            Node::Binary(op, lhs, rhs) => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Self::number(value)
    }
}

macro_rules! impl_binary_operator {
    ($trait:ident, $method:ident, $op:expr) => {
        impl $trait<&Expr> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, self, rhs)
            }
        }

        impl $trait<Expr> for Expr {
            type Output = Expr;

            fn $method(self, rhs: Expr) -> Expr {
                Expr::binary($op, &self, &rhs)
            }
        }

        impl $trait<f64> for &Expr {
            type Output = Expr;

            fn $method(self, rhs: f64) -> Expr {
                Expr::binary($op, self, &Expr::number(rhs))
            }
        }

        impl $trait<&Expr> for f64 {
            type Output = Expr;

            fn $method(self, rhs: &Expr) -> Expr {
                Expr::binary($op, &Expr::number(self), rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add, BinaryOp::Add);
impl_binary_operator!(Sub, sub, BinaryOp::Sub);
impl_binary_operator!(Mul, mul, BinaryOp::Mul);
impl_binary_operator!(Div, div, BinaryOp::Div);

impl Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, self)
    }
}

impl Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::unary(UnaryOp::Neg, &self)
    }
}
