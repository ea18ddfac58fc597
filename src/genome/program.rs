//! Program-tree genomes.
//!
//! These are the genomes rewrite rules simplify. The tree is an expression over
//! numbered input variables; the engine only needs it to be evaluable for
//! constant folding, so how a program is trained or executed elsewhere is not
//! modelled here.

use super::{Genome, GenomeMeta};
use crate::error::Result;
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Functions available at interior nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Abs,
    Min,
    Max,
    Pow,
}

impl Opcode {
    pub fn arity(self) -> usize {
        match self {
            Opcode::Neg | Opcode::Abs => 1,
            _ => 2,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Opcode::Add => "+",
            Opcode::Sub => "-",
            Opcode::Mul => "*",
            Opcode::Div => "/",
            Opcode::Neg => "neg",
            Opcode::Abs => "abs",
            Opcode::Min => "min",
            Opcode::Max => "max",
            Opcode::Pow => "pow",
        }
    }

    /// Division is unprotected: dividing by zero yields an infinity or NaN.
    /// A wrong argument count yields NaN.
    pub fn apply(self, args: &[f64]) -> f64 {
        if args.len() != self.arity() {
            return f64::NAN;
        }
        match self {
            Opcode::Add => args[0] + args[1],
            Opcode::Sub => args[0] - args[1],
            Opcode::Mul => args[0] * args[1],
            Opcode::Div => args[0] / args[1],
            Opcode::Neg => -args[0],
            Opcode::Abs => args[0].abs(),
            Opcode::Min => args[0].min(args[1]),
            Opcode::Max => args[0].max(args[1]),
            Opcode::Pow => args[0].powf(args[1]),
        }
    }
}

/// Program tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProgramNode {
    Const(Value),
    Variable(usize),
    Call {
        function: Opcode,
        args: Vec<ProgramNode>,
    },
}

impl ProgramNode {
    pub fn int(value: i64) -> Self {
        ProgramNode::Const(Value::Integer(value))
    }

    pub fn float(value: f64) -> Self {
        ProgramNode::Const(Value::Float(value))
    }

    pub fn var(index: usize) -> Self {
        ProgramNode::Variable(index)
    }

    pub fn call(function: Opcode, args: Vec<ProgramNode>) -> Self {
        ProgramNode::Call { function, args }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, ProgramNode::Call { .. })
    }

    pub fn constant_value(&self) -> Option<Value> {
        match self {
            ProgramNode::Const(value) => Some(*value),
            _ => None,
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            ProgramNode::Const(_) | ProgramNode::Variable(_) => 1,
            ProgramNode::Call { args, .. } => 1 + args.iter().map(Self::node_count).sum::<usize>(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            ProgramNode::Const(_) | ProgramNode::Variable(_) => 1,
            ProgramNode::Call { args, .. } => 1 + args.iter().map(Self::depth).max().unwrap_or(0),
        }
    }

    /// True when every leaf below (and including) this node is a constant
    pub fn all_const_descendants(&self) -> bool {
        match self {
            ProgramNode::Const(_) => true,
            ProgramNode::Variable(_) => false,
            ProgramNode::Call { args, .. } => args.iter().all(Self::all_const_descendants),
        }
    }

    /// Evaluates the tree. Variables beyond `vars` evaluate to NaN.
    pub fn evaluate(&self, vars: &[f64]) -> f64 {
        match self {
            ProgramNode::Const(value) => value.as_f64(),
            ProgramNode::Variable(index) => vars.get(*index).copied().unwrap_or(f64::NAN),
            ProgramNode::Call { function, args } => {
                let values: Vec<f64> = args.iter().map(|arg| arg.evaluate(vars)).collect();
                function.apply(&values)
            }
        }
    }
}

impl fmt::Display for ProgramNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramNode::Const(value) => write!(f, "{}", value),
            ProgramNode::Variable(index) => write!(f, "x{}", index),
            ProgramNode::Call { function, args } => {
                write!(f, "({}", function.symbol())?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Genome whose genetic material is a single program tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramGenome {
    root: ProgramNode,
    meta: GenomeMeta,
}

impl ProgramGenome {
    pub fn new(root: ProgramNode) -> Self {
        Self {
            root,
            meta: GenomeMeta::default(),
        }
    }

    pub fn root(&self) -> &ProgramNode {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut ProgramNode {
        &mut self.root
    }

    pub fn set_root(&mut self, root: ProgramNode) {
        self.root = root;
    }

    pub fn evaluate(&self, vars: &[f64]) -> f64 {
        self.root.evaluate(vars)
    }
}

impl Genome for ProgramGenome {
    fn representation(&self) -> &'static str {
        "program-tree"
    }

    fn size(&self) -> usize {
        self.root.node_count()
    }

    fn meta(&self) -> &GenomeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut GenomeMeta {
        &mut self.meta
    }

    fn copy_from(&mut self, source: &Self) -> Result<()> {
        self.root = source.root.clone();
        self.meta.copy_from(&source.meta);
        Ok(())
    }
}
