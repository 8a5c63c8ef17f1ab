//! Verification IR (Intermediate Representation).
//!
//! A small AST decoupled from the root crate's `Statement` type, so this
//! crate never depends on `werewolf_puzzles` (it's the other way around):
//! the root crate lowers its own `Statement`/role-semantics formulas into
//! this IR before handing them to `solver::Verifier`.
//!
//! Trimmed to exactly the operators spec.md §4.5.2's boolean encoding
//! needs: boolean connectives over villager variables, the integer
//! comparisons the shill rule's `shill ∈ [0,N)` / `i = shill` clauses
//! require, and a first-class `Count` node for the scope-counting
//! statement variants (spec.md §2's E/M/L/V/O tags) so the root crate
//! never has to hand-decompose a sum into repeated `ite` additions.

/// How a `Count` node compares the number of true variables in its scope
/// against `k` (ignored for `Even`/`Odd`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountCmp {
    Exact,
    AtMost,
    AtLeast,
    Even,
    Odd,
}

/// Expression AST for verification.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyExpr {
    /// Boolean literal.
    BoolLit(bool),
    /// Reference to a boolean villager variable (`w_i`).
    BoolVar(String),
    /// Reference to the integer shill variable.
    IntVar(String),
    /// Integer literal (a villager index, in the shill encoding).
    IntLit(i64),
    /// Logical negation.
    Not(Box<VerifyExpr>),
    /// Conjunction of one or more boolean expressions.
    And(Vec<VerifyExpr>),
    /// Disjunction of one or more boolean expressions.
    Or(Vec<VerifyExpr>),
    /// `left => right`.
    Implies(Box<VerifyExpr>, Box<VerifyExpr>),
    /// Integer equality, producing a boolean.
    IntEq(Box<VerifyExpr>, Box<VerifyExpr>),
    /// `left <= right`, producing a boolean.
    IntLe(Box<VerifyExpr>, Box<VerifyExpr>),
    /// `left >= right`, producing a boolean.
    IntGe(Box<VerifyExpr>, Box<VerifyExpr>),
    /// `count(vars true) <cmp> k`, producing a boolean.
    Count { vars: Vec<String>, cmp: CountCmp, k: i64 },
}

impl VerifyExpr {
    pub fn bool_var(name: impl Into<String>) -> Self {
        VerifyExpr::BoolVar(name.into())
    }

    pub fn int_var(name: impl Into<String>) -> Self {
        VerifyExpr::IntVar(name.into())
    }

    pub fn not(expr: VerifyExpr) -> Self {
        VerifyExpr::Not(Box::new(expr))
    }

    pub fn and(exprs: Vec<VerifyExpr>) -> Self {
        VerifyExpr::And(exprs)
    }

    pub fn or(exprs: Vec<VerifyExpr>) -> Self {
        VerifyExpr::Or(exprs)
    }

    pub fn implies(left: VerifyExpr, right: VerifyExpr) -> Self {
        VerifyExpr::Implies(Box::new(left), Box::new(right))
    }

    /// `left <=> right`, built from a pair of implications since the IR
    /// has no dedicated biconditional node.
    pub fn iff(left: VerifyExpr, right: VerifyExpr) -> Self {
        VerifyExpr::And(vec![
            VerifyExpr::implies(left.clone(), right.clone()),
            VerifyExpr::implies(right, left),
        ])
    }

    pub fn int_eq(left: VerifyExpr, right: VerifyExpr) -> Self {
        VerifyExpr::IntEq(Box::new(left), Box::new(right))
    }

    pub fn int_le(left: VerifyExpr, right: VerifyExpr) -> Self {
        VerifyExpr::IntLe(Box::new(left), Box::new(right))
    }

    pub fn int_ge(left: VerifyExpr, right: VerifyExpr) -> Self {
        VerifyExpr::IntGe(Box::new(left), Box::new(right))
    }

    pub fn count(vars: Vec<String>, cmp: CountCmp, k: i64) -> Self {
        VerifyExpr::Count { vars, cmp, k }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_construct_expected_shapes() {
        let w0 = VerifyExpr::bool_var("w_0");
        let not_w0 = VerifyExpr::not(w0.clone());
        assert!(matches!(not_w0, VerifyExpr::Not(inner) if *inner == w0));

        let shill_eq_3 = VerifyExpr::int_eq(VerifyExpr::int_var("shill"), VerifyExpr::IntLit(3));
        assert!(matches!(shill_eq_3, VerifyExpr::IntEq(..)));
    }
}
