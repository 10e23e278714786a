//! # Symbolic Expressions
//!
//! Immutable expression graphs used by the symbolic math backend. Building a
//! graph performs no arithmetic; the graph is evaluated later, either node by
//! node through an [`EvaluationContext`] or after compilation into a
//! [`CompiledFunction`].
//!
//! ```rust
//! use thermonets_rs::symbolic::{CompiledFunction, Expr, SimpleContext};
//!
//! let x = Expr::variable("x");
//! let y = Expr::variable("y");
//! let radius = (&(&x * &x) + &(&y * &y)).sqrt();
//!
//! let ctx = SimpleContext::new().with("x", 3.0).with("y", 4.0);
//! assert_eq!(radius.evaluate(&ctx).unwrap(), 5.0);
//!
//! let f = CompiledFunction::new(&[radius], &["x", "y"]).unwrap();
//! assert_eq!(f.eval(&[6.0, 8.0]).unwrap(), vec![10.0]);
//! ```

pub mod compile;
pub mod expression;

pub use compile::CompiledFunction;
pub use expression::{
    BinaryOp, EvaluationContext, Expr, ExprResult, ExpressionError, Node, SimpleContext, UnaryOp,
};
