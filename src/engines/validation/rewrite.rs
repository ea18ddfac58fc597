//! Simplifying rewrite rules for program-tree genomes.

use super::rules::RewriteRule;
use crate::genome::{Opcode, ProgramGenome, ProgramNode};
use crate::types::Value;

/// Distance from an integer below which a folded value is stored as an integer
const INTEGER_EPSILON: f64 = 1e-7;

/// Folds subtrees made only of constants into a single constant leaf.
///
/// Values within [`INTEGER_EPSILON`] of an integer become integer constants.
/// Subtrees that evaluate to NaN or an infinity are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteConstants;

impl RewriteConstants {
    fn fold(node: &mut ProgramNode) -> bool {
        if !node.is_leaf() && node.all_const_descendants() {
            if let Some(constant) = folded_constant(node.evaluate(&[])) {
                *node = ProgramNode::Const(constant);
                return true;
            }
        }

        match node {
            ProgramNode::Call { args, .. } => {
                let mut changed = false;
                for arg in args.iter_mut() {
                    changed |= Self::fold(arg);
                }
                changed
            }
            _ => false,
        }
    }
}

fn folded_constant(value: f64) -> Option<Value> {
    if !value.is_finite() {
        return None;
    }
    let rounded = value.round();
    if (value - rounded).abs() < INTEGER_EPSILON && rounded.abs() < i64::MAX as f64 {
        Some(Value::Integer(rounded as i64))
    } else {
        Some(Value::Float(value))
    }
}

impl RewriteRule<ProgramGenome> for RewriteConstants {
    fn rewrite(&self, genome: &mut ProgramGenome) -> bool {
        Self::fold(genome.root_mut())
    }
}

/// Removes algebraic identities: `x+0`, `0+x`, `x-0`, `x*1`, `1*x`, `x/1`,
/// `neg(neg x)`, and collapses `c*0` to `0` for a finite constant `c`.
/// A variable or subtree times zero is kept, since it may be infinite or NaN.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteAlgebraic;

impl RewriteAlgebraic {
    fn simplify(node: &mut ProgramNode) -> bool {
        let mut changed = false;
        if let ProgramNode::Call { args, .. } = node {
            for arg in args.iter_mut() {
                changed |= Self::simplify(arg);
            }
        }
        if let Some(replacement) = identity(node) {
            *node = replacement;
            changed = true;
        }
        changed
    }
}

fn is_const(node: &ProgramNode, expected: f64) -> bool {
    node.constant_value()
        .map_or(false, |value| value.as_f64() == expected)
}

fn is_finite_const(node: &ProgramNode) -> bool {
    node.constant_value()
        .map_or(false, |value| value.as_f64().is_finite())
}

fn identity(node: &ProgramNode) -> Option<ProgramNode> {
    let ProgramNode::Call { function, args } = node else {
        return None;
    };

    match (function, args.as_slice()) {
        (Opcode::Add, [x, zero]) if is_const(zero, 0.0) => Some(x.clone()),
        (Opcode::Add, [zero, x]) if is_const(zero, 0.0) => Some(x.clone()),
        (Opcode::Sub, [x, zero]) if is_const(zero, 0.0) => Some(x.clone()),
        (Opcode::Mul, [x, one]) if is_const(one, 1.0) => Some(x.clone()),
        (Opcode::Mul, [one, x]) if is_const(one, 1.0) => Some(x.clone()),
        (Opcode::Mul, [a, b])
            if (is_const(a, 0.0) && is_finite_const(b)) || (is_const(b, 0.0) && is_finite_const(a)) =>
        {
            Some(ProgramNode::int(0))
        }
        (Opcode::Div, [x, one]) if is_const(one, 1.0) => Some(x.clone()),
        (Opcode::Neg, [ProgramNode::Call { function: Opcode::Neg, args: inner }]) if inner.len() == 1 => {
            Some(inner[0].clone())
        }
        _ => None,
    }
}

impl RewriteRule<ProgramGenome> for RewriteAlgebraic {
    fn rewrite(&self, genome: &mut ProgramGenome) -> bool {
        Self::simplify(genome.root_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(function: Opcode, args: Vec<ProgramNode>) -> ProgramNode {
        ProgramNode::call(function, args)
    }

    #[test]
    fn test_constants_fold_to_integer() {
        // x0 * (2 + 3)
        let mut genome = ProgramGenome::new(call(
            Opcode::Mul,
            vec![
                ProgramNode::var(0),
                call(Opcode::Add, vec![ProgramNode::int(2), ProgramNode::int(3)]),
            ],
        ));

        assert!(RewriteConstants.rewrite(&mut genome));
        assert_eq!(genome.root().to_string(), "(* x0 5)");
        assert!(!RewriteConstants.rewrite(&mut genome));
    }

    #[test]
    fn test_constants_keep_fractional_values() {
        let mut genome = ProgramGenome::new(call(
            Opcode::Div,
            vec![ProgramNode::int(1), ProgramNode::int(4)],
        ));
        assert!(RewriteConstants.rewrite(&mut genome));
        assert_eq!(genome.root(), &ProgramNode::float(0.25));
    }

    #[test]
    fn test_near_integers_round() {
        let mut genome = ProgramGenome::new(call(
            Opcode::Add,
            vec![ProgramNode::float(2.00000000001), ProgramNode::int(1)],
        ));
        assert!(RewriteConstants.rewrite(&mut genome));
        assert_eq!(genome.root(), &ProgramNode::int(3));
    }

    #[test]
    fn test_non_finite_subtrees_are_not_folded() {
        // 1 / (2 - 2): the inner subtraction folds, the division does not
        let mut genome = ProgramGenome::new(call(
            Opcode::Div,
            vec![
                ProgramNode::int(1),
                call(Opcode::Sub, vec![ProgramNode::int(2), ProgramNode::int(2)]),
            ],
        ));
        assert!(RewriteConstants.rewrite(&mut genome));
        assert_eq!(genome.root().to_string(), "(/ 1 0)");
        assert!(!RewriteConstants.rewrite(&mut genome));
    }

    #[test]
    fn test_algebraic_identities() {
        // neg(neg((x0 + 0) * 1))
        let mut genome = ProgramGenome::new(call(
            Opcode::Neg,
            vec![call(
                Opcode::Neg,
                vec![call(
                    Opcode::Mul,
                    vec![
                        call(Opcode::Add, vec![ProgramNode::var(0), ProgramNode::int(0)]),
                        ProgramNode::int(1),
                    ],
                )],
            )],
        ));

        assert!(RewriteAlgebraic.rewrite(&mut genome));
        assert_eq!(genome.root(), &ProgramNode::var(0));
        assert!(!RewriteAlgebraic.rewrite(&mut genome));
    }

    #[test]
    fn test_zero_times_constant_collapses() {
        let mut genome = ProgramGenome::new(call(
            Opcode::Mul,
            vec![ProgramNode::int(0), ProgramNode::float(7.5)],
        ));
        assert!(RewriteAlgebraic.rewrite(&mut genome));
        assert_eq!(genome.root(), &ProgramNode::int(0));
    }

    #[test]
    fn test_zero_times_unknown_is_kept() {
        // x1 * 0 is NaN when x1 is infinite
        let mut genome = ProgramGenome::new(call(
            Opcode::Mul,
            vec![ProgramNode::var(1), ProgramNode::int(0)],
        ));
        assert!(!RewriteAlgebraic.rewrite(&mut genome));
        assert_eq!(genome.root().to_string(), "(* x1 0)");

        // (1 / 0) * 0
        let mut genome = ProgramGenome::new(call(
            Opcode::Mul,
            vec![
                call(Opcode::Div, vec![ProgramNode::int(1), ProgramNode::int(0)]),
                ProgramNode::int(0),
            ],
        ));
        assert!(!RewriteAlgebraic.rewrite(&mut genome));
        assert_eq!(genome.root().to_string(), "(* (/ 1 0) 0)");
    }
}
