//! Compilation of expression graphs into flat instruction tapes.
//!
//! A [`CompiledFunction`] is built once from a set of output expressions and
//! an ordered list of input variables. Building walks the graph on an
//! explicit stack and records every distinct node in topological order;
//! evaluation then replays that tape over a scratch buffer without any
//! hashing or recursion. The compiled function is immutable and `Sync`, so
//! [`CompiledFunction::eval_batch`] evaluates rows in parallel.

use std::collections::HashMap;

use ndarray::parallel::prelude::*;
use ndarray::{Array2, Axis};
use tracing::debug;

use super::expression::{
    out_of_order, BinaryOp, Expr, ExprResult, ExpressionError, Node, UnaryOp,
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Instruction {
    Constant(f64),
    Input(usize),
    Unary(UnaryOp, usize),
    Binary(BinaryOp, usize, usize),
}

/// A reusable numeric function compiled from expression graphs.
#[derive(Debug, Clone)]
pub struct CompiledFunction {
    variables: Vec<String>,
    tape: Vec<Instruction>,
    outputs: Vec<usize>,
}

impl CompiledFunction {
    /// Compile `outputs` as functions of `variables`.
    ///
    /// The position of a name in `variables` is the position of its value in
    /// the input slice passed to [`CompiledFunction::eval`]. Every variable
    /// referenced by the outputs must be listed.
    pub fn new(outputs: &[Expr], variables: &[&str]) -> ExprResult<Self> {
        let mut slots = HashMap::new();
        for (i, name) in variables.iter().enumerate() {
            if slots.insert(*name, i).is_some() {
                return Err(ExpressionError::InvalidOperation {
                    message: format!("Variable '{}' listed more than once", name),
                });
            }
        }

        let mut builder = TapeBuilder {
            slots,
            tape: Vec::new(),
            visited: HashMap::new(),
        };
        let outputs = outputs
            .iter()
            .map(|expr| builder.push(expr))
            .collect::<ExprResult<Vec<_>>>()?;

        debug!(
            instructions = builder.tape.len(),
            outputs = outputs.len(),
            "compiled expression graph"
        );

        Ok(Self {
            variables: variables.iter().map(|name| name.to_string()).collect(),
            tape: builder.tape,
            outputs,
        })
    }

    /// Ordered input variable names.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Number of outputs produced per evaluation.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Number of instructions on the tape.
    pub fn len(&self) -> usize {
        self.tape.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tape.is_empty()
    }

    /// Evaluate the function at a single input point.
    pub fn eval(&self, inputs: &[f64]) -> ExprResult<Vec<f64>> {
        self.check_arity(inputs.len())?;
        let mut scratch = Vec::with_capacity(self.tape.len());
        Ok(self.run(inputs, &mut scratch))
    }

    /// Evaluate the function for every row of `inputs` (one point per row,
    /// one variable per column). Rows are processed in parallel.
    pub fn eval_batch(&self, inputs: &Array2<f64>) -> ExprResult<Array2<f64>> {
        self.check_arity(inputs.ncols())?;

        let rows: Vec<Vec<f64>> = inputs
            .axis_iter(Axis(0))
            .into_par_iter()
            .map(|row| {
                let point = row.to_vec();
                let mut scratch = Vec::with_capacity(self.tape.len());
                self.run(&point, &mut scratch)
            })
            .collect();

        let flat = rows.into_iter().flatten().collect::<Vec<_>>();
        Array2::from_shape_vec((inputs.nrows(), self.outputs.len()), flat).map_err(|e| {
            ExpressionError::InvalidOperation {
                message: format!("Failed to assemble batch output: {}", e),
            }
        })
    }

    fn check_arity(&self, provided: usize) -> ExprResult<()> {
        if provided != self.variables.len() {
            return Err(ExpressionError::InvalidOperation {
                message: format!(
                    "Expected {} inputs, got {}",
                    self.variables.len(),
                    provided
                ),
            });
        }
        Ok(())
    }

    fn run(&self, inputs: &[f64], scratch: &mut Vec<f64>) -> Vec<f64> {
        scratch.clear();
        for instruction in &self.tape {
            let value = match *instruction {
                Instruction::Constant(c) => c,
                Instruction::Input(i) => inputs[i],
                Instruction::Unary(op, a) => op.apply(scratch[a]),
                Instruction::Binary(op, a, b) => op.apply(scratch[a], scratch[b]),
            };
            scratch.push(value);
        }
        self.outputs.iter().map(|&i| scratch[i]).collect()
    }
}

struct TapeBuilder<'a> {
    slots: HashMap<&'a str, usize>,
    tape: Vec<Instruction>,
    visited: HashMap<*const Node, usize>,
}

impl TapeBuilder<'_> {
    /// Append every node of `expr` not yet on the tape, children first;
    /// returns the tape index holding `expr`'s value.
    fn push(&mut self, expr: &Expr) -> ExprResult<usize> {
        for node in expr.post_order() {
            if self.visited.contains_key(&node.id()) {
                continue;
            }

            let instruction = match node.node() {
                Node::Number(n) => Instruction::Constant(*n),
                Node::Variable(name) => match self.slots.get(name.as_str()) {
                    Some(&slot) => Instruction::Input(slot),
                    None => {
                        return Err(ExpressionError::UndefinedVariable { name: name.clone() });
                    }
                },
                Node::Unary(op, operand) => Instruction::Unary(*op, self.index_of(operand)?),
                Node::Binary(op, lhs, rhs) => {
                    Instruction::Binary(*op, self.index_of(lhs)?, self.index_of(rhs)?)
                }
            };

            self.visited.insert(node.id(), self.tape.len());
            self.tape.push(instruction);
        }
        self.index_of(expr)
    }

    fn index_of(&self, expr: &Expr) -> ExprResult<usize> {
        self.visited.get(&expr.id()).copied().ok_or_else(out_of_order)
    }
}
