pub mod constraints;
pub mod rewrite;
pub mod rules;

pub use constraints::{AlleleRangeConstraint, MaxProgramSize, PermutationConstraint};
pub use rewrite::{RewriteAlgebraic, RewriteConstants};
pub use rules::{ConstraintRule, RewriteRule, RuleHolder};
