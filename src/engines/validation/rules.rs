//! Post-operator rules.
//!
//! Rewrite rules simplify a genome in place and are applied until a full pass
//! changes nothing. Constraint rules decide whether an offspring may enter the
//! next generation; a genome is valid only if every constraint accepts it.

use log::warn;

/// In-place simplification. Returns true if the genome changed.
pub trait RewriteRule<G>: Send + Sync {
    fn rewrite(&self, genome: &mut G) -> bool;
}

/// Validity predicate an offspring must satisfy
pub trait ConstraintRule<G>: Send + Sync {
    fn is_valid(&self, genome: &G) -> bool;
}

const DEFAULT_MAX_PASSES: usize = 1000;

pub struct RuleHolder<G> {
    rewrite_rules: Vec<Box<dyn RewriteRule<G>>>,
    constraint_rules: Vec<Box<dyn ConstraintRule<G>>>,
    max_passes: usize,
}

impl<G> Default for RuleHolder<G> {
    fn default() -> Self {
        Self {
            rewrite_rules: Vec::new(),
            constraint_rules: Vec::new(),
            max_passes: DEFAULT_MAX_PASSES,
        }
    }
}

impl<G> RuleHolder<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rewrite_rule<R: RewriteRule<G> + 'static>(mut self, rule: R) -> Self {
        self.rewrite_rules.push(Box::new(rule));
        self
    }

    pub fn with_constraint_rule<R: ConstraintRule<G> + 'static>(mut self, rule: R) -> Self {
        self.constraint_rules.push(Box::new(rule));
        self
    }

    pub fn add_rewrite_rule(&mut self, rule: Box<dyn RewriteRule<G>>) {
        self.rewrite_rules.push(rule);
    }

    pub fn add_constraint_rule(&mut self, rule: Box<dyn ConstraintRule<G>>) {
        self.constraint_rules.push(rule);
    }

    /// Upper bound on rewrite passes for rule sets that never settle
    pub fn set_max_passes(&mut self, max_passes: usize) {
        self.max_passes = max_passes.max(1);
    }

    pub fn rewrite_rules(&self) -> usize {
        self.rewrite_rules.len()
    }

    pub fn constraint_rules(&self) -> usize {
        self.constraint_rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewrite_rules.is_empty() && self.constraint_rules.is_empty()
    }

    /// Applies every rewrite rule until a pass reports no change.
    /// Returns the number of passes that changed the genome.
    pub fn rewrite(&self, genome: &mut G) -> usize {
        let mut changed_passes = 0;
        loop {
            let mut changed = false;
            for rule in &self.rewrite_rules {
                changed |= rule.rewrite(genome);
            }
            if !changed {
                break;
            }
            changed_passes += 1;
            if changed_passes >= self.max_passes {
                warn!("Rewrite rules did not settle after {} passes", changed_passes);
                break;
            }
        }
        changed_passes
    }

    pub fn is_valid(&self, genome: &G) -> bool {
        self.constraint_rules.iter().all(|rule| rule.is_valid(genome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::IntegerArrayGenome;

    /// Halves the first allele until it reaches zero
    struct Halve;

    impl RewriteRule<IntegerArrayGenome> for Halve {
        fn rewrite(&self, genome: &mut IntegerArrayGenome) -> bool {
            let v = genome.get(0);
            if v == 0 {
                return false;
            }
            genome.set(0, v / 2);
            true
        }
    }

    /// Flips the sign of the first allele forever
    struct Flip;

    impl RewriteRule<IntegerArrayGenome> for Flip {
        fn rewrite(&self, genome: &mut IntegerArrayGenome) -> bool {
            genome.set(0, -genome.get(0));
            true
        }
    }

    struct NonNegative;

    impl ConstraintRule<IntegerArrayGenome> for NonNegative {
        fn is_valid(&self, genome: &IntegerArrayGenome) -> bool {
            genome.iter().all(|v| *v >= 0)
        }
    }

    struct ShortEnough;

    impl ConstraintRule<IntegerArrayGenome> for ShortEnough {
        fn is_valid(&self, genome: &IntegerArrayGenome) -> bool {
            genome.iter().count() <= 3
        }
    }

    #[test]
    fn test_rewrite_runs_to_fix_point() {
        let holder = RuleHolder::new().with_rewrite_rule(Halve);
        let mut genome = IntegerArrayGenome::from_alleles(vec![8]);

        assert_eq!(holder.rewrite(&mut genome), 4);
        assert_eq!(genome.get(0), 0);
        assert_eq!(holder.rewrite(&mut genome), 0);
    }

    #[test]
    fn test_rewrite_stops_at_pass_limit() {
        let mut holder = RuleHolder::new().with_rewrite_rule(Flip);
        holder.set_max_passes(7);
        let mut genome = IntegerArrayGenome::from_alleles(vec![1]);
        assert_eq!(holder.rewrite(&mut genome), 7);
    }

    #[test]
    fn test_constraints_are_conjunctive() {
        let holder = RuleHolder::new()
            .with_constraint_rule(NonNegative)
            .with_constraint_rule(ShortEnough);

        assert!(holder.is_valid(&IntegerArrayGenome::from_alleles(vec![1, 2])));
        assert!(!holder.is_valid(&IntegerArrayGenome::from_alleles(vec![1, -2])));
        assert!(!holder.is_valid(&IntegerArrayGenome::from_alleles(vec![1, 2, 3, 4])));
    }

    #[test]
    fn test_empty_holder_accepts_everything() {
        let holder: RuleHolder<IntegerArrayGenome> = RuleHolder::new();
        let mut genome = IntegerArrayGenome::from_alleles(vec![-5]);
        assert!(holder.is_empty());
        assert_eq!(holder.rewrite(&mut genome), 0);
        assert!(holder.is_valid(&genome));
    }
}
