//! Z3 solver wrapper: lowers `VerifyExpr` into Z3 ASTs and runs the
//! assert-negation-check-UNSAT idiom to confirm a model is unique.

use std::collections::HashMap;

use z3::ast::{Ast, Bool, Int};
use z3::{Config, Context, SatResult, Solver};

use crate::error::{VerificationError, VerificationResult};
use crate::ir::{CountCmp, VerifyExpr};

/// The Z3-based SMT verifier. A fresh `Context`/`Solver` is built per call
/// to `verify_unique` so concurrent callers never share solver state.
pub struct Verifier {
    cfg: Config,
}

impl Verifier {
    /// A verifier with a 5-second default SMT timeout.
    pub fn new() -> Self {
        Self::with_timeout_ms(5_000)
    }

    pub fn with_timeout_ms(ms: u64) -> Self {
        let mut cfg = Config::new();
        cfg.set_param_value("timeout", &ms.to_string());
        Verifier { cfg }
    }

    /// Assert `assertions`, confirm SAT with a model matching
    /// `(expected_w, expected_shill)`, then add a blocking clause excluding
    /// that model and confirm UNSAT — i.e. no second model exists.
    pub fn verify_unique(
        &self,
        assertions: &[VerifyExpr],
        expected_w: &[bool],
        expected_shill: Option<u32>,
    ) -> VerificationResult<()> {
        let ctx = Context::new(&self.cfg);
        let solver = Solver::new(&ctx);

        let mut bool_vars: HashMap<String, Bool> = HashMap::new();
        for i in 0..expected_w.len() {
            let name = format!("w_{i}");
            bool_vars.insert(name.clone(), Bool::new_const(&ctx, name));
        }
        let int_vars: HashMap<String, Int> = if expected_shill.is_some() {
            let mut m = HashMap::new();
            m.insert("shill".to_string(), Int::new_const(&ctx, "shill"));
            m
        } else {
            HashMap::new()
        };

        for expr in assertions {
            let lowered = lower_bool(&ctx, &bool_vars, &int_vars, expr);
            solver.assert(&lowered);
        }

        match solver.check() {
            SatResult::Unsat => return Err(VerificationError::ExpectedModelUnsat),
            SatResult::Unknown => return Err(VerificationError::SolverUnknown),
            SatResult::Sat => {}
        }

        let model = solver.get_model().ok_or_else(|| VerificationError::SolverError {
            message: "solver reported SAT but returned no model".into(),
        })?;

        for (i, &expected) in expected_w.iter().enumerate() {
            let name = format!("w_{i}");
            let var = &bool_vars[&name];
            let value = model
                .eval(var, true)
                .and_then(|v| v.as_bool())
                .ok_or_else(|| VerificationError::SolverError { message: format!("no model value for {name}") })?;
            if value != expected {
                return Err(VerificationError::ModelMismatch {
                    detail: format!("{name} = {value}, expected {expected}"),
                });
            }
        }

        let mut blocking_literals: Vec<Bool> = expected_w
            .iter()
            .enumerate()
            .map(|(i, &expected)| {
                let var = &bool_vars[&format!("w_{i}")];
                if expected {
                    var.clone()
                } else {
                    var.not()
                }
            })
            .collect();

        if let Some(expected_shill) = expected_shill {
            let shill_var = &int_vars["shill"];
            let value = model
                .eval(shill_var, true)
                .and_then(|v| v.as_i64())
                .ok_or_else(|| VerificationError::SolverError { message: "no model value for shill".into() })?;
            if value != expected_shill as i64 {
                return Err(VerificationError::ModelMismatch {
                    detail: format!("shill = {value}, expected {expected_shill}"),
                });
            }
            blocking_literals.push(shill_var._eq(&Int::from_i64(&ctx, expected_shill as i64)));
        }

        let expected_model_conjunction =
            Bool::and(&ctx, &blocking_literals.iter().collect::<Vec<_>>());
        solver.assert(&expected_model_conjunction.not());

        match solver.check() {
            SatResult::Unsat => Ok(()),
            SatResult::Sat => Err(VerificationError::SecondModelExists),
            SatResult::Unknown => Err(VerificationError::SolverUnknown),
        }
    }
}

impl Default for Verifier {
    fn default() -> Self {
        Self::new()
    }
}

fn lower_bool<'c>(
    ctx: &'c Context,
    bool_vars: &HashMap<String, Bool<'c>>,
    int_vars: &HashMap<String, Int<'c>>,
    expr: &VerifyExpr,
) -> Bool<'c> {
    match expr {
        VerifyExpr::BoolLit(b) => Bool::from_bool(ctx, *b),
        VerifyExpr::BoolVar(name) => {
            bool_vars.get(name).cloned().unwrap_or_else(|| Bool::new_const(ctx, name.as_str()))
        }
        VerifyExpr::Not(inner) => lower_bool(ctx, bool_vars, int_vars, inner).not(),
        VerifyExpr::And(exprs) => {
            let lowered: Vec<Bool> = exprs.iter().map(|e| lower_bool(ctx, bool_vars, int_vars, e)).collect();
            Bool::and(ctx, &lowered.iter().collect::<Vec<_>>())
        }
        VerifyExpr::Or(exprs) => {
            let lowered: Vec<Bool> = exprs.iter().map(|e| lower_bool(ctx, bool_vars, int_vars, e)).collect();
            Bool::or(ctx, &lowered.iter().collect::<Vec<_>>())
        }
        VerifyExpr::Implies(l, r) => {
            let l = lower_bool(ctx, bool_vars, int_vars, l);
            let r = lower_bool(ctx, bool_vars, int_vars, r);
            l.implies(&r)
        }
        VerifyExpr::IntEq(l, r) => {
            let l = lower_int(ctx, int_vars, l);
            let r = lower_int(ctx, int_vars, r);
            l._eq(&r)
        }
        VerifyExpr::IntLe(l, r) => {
            let l = lower_int(ctx, int_vars, l);
            let r = lower_int(ctx, int_vars, r);
            l.le(&r)
        }
        VerifyExpr::IntGe(l, r) => {
            let l = lower_int(ctx, int_vars, l);
            let r = lower_int(ctx, int_vars, r);
            l.ge(&r)
        }
        VerifyExpr::Count { vars, cmp, k } => lower_count(ctx, bool_vars, vars, *cmp, *k),
        VerifyExpr::IntVar(_) | VerifyExpr::IntLit(_) => {
            panic!("IntVar/IntLit used in boolean position; wrap in IntEq")
        }
    }
}

/// `sum(ite(w, 1, 0) for w in vars) <cmp> k`. Parity is encoded with `rem`
/// against the literal `2`, a deterministic function of the `w_i` — not
/// via a fresh existential witness. An existential `q` with `sum = 2*q` (or
/// `2*q + 1`) lets the solver pick `q` to satisfy the equation regardless
/// of whether `sum` is actually even, which silently drops the constraint
/// under negation (exactly the position every speaker's statement is
/// asserted in, via the `bundle_formula <=> ¬liar` biconditional): a lying
/// speaker's "this count is odd" requirement would no longer force `sum` to
/// be odd, since the solver could just pick `q` to make the blocked
/// equation false on its own. `rem` has no such freedom.
fn lower_count<'c>(
    ctx: &'c Context,
    bool_vars: &HashMap<String, Bool<'c>>,
    vars: &[String],
    cmp: CountCmp,
    k: i64,
) -> Bool<'c> {
    let terms: Vec<Int> = vars
        .iter()
        .map(|name| {
            let b = bool_vars.get(name).cloned().unwrap_or_else(|| Bool::new_const(ctx, name.as_str()));
            b.ite(&Int::from_i64(ctx, 1), &Int::from_i64(ctx, 0))
        })
        .collect();
    let sum = Int::add(ctx, &terms.iter().collect::<Vec<_>>());
    let k_int = Int::from_i64(ctx, k);
    match cmp {
        CountCmp::Exact => sum._eq(&k_int),
        CountCmp::AtMost => sum.le(&k_int),
        CountCmp::AtLeast => sum.ge(&k_int),
        CountCmp::Even => sum.rem(&Int::from_i64(ctx, 2))._eq(&Int::from_i64(ctx, 0)),
        CountCmp::Odd => sum.rem(&Int::from_i64(ctx, 2))._eq(&Int::from_i64(ctx, 1)),
    }
}

fn lower_int<'c>(ctx: &'c Context, int_vars: &HashMap<String, Int<'c>>, expr: &VerifyExpr) -> Int<'c> {
    match expr {
        VerifyExpr::IntVar(name) => {
            int_vars.get(name).cloned().unwrap_or_else(|| Int::new_const(ctx, name.as_str()))
        }
        VerifyExpr::IntLit(n) => Int::from_i64(ctx, *n),
        other => panic!("expected an integer expression, found {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_baseline_model_verifies() {
        // Two villagers: w_0 must be false (a truthful human says "not w_0"),
        // w_1 must be true (a lying werewolf's statement "not w_1" is false).
        let verifier = Verifier::new();
        let assertions = vec![
            VerifyExpr::not(VerifyExpr::bool_var("w_0")),
            VerifyExpr::bool_var("w_1"),
        ];
        let result = verifier.verify_unique(&assertions, &[false, true], None);
        assert!(result.is_ok());
    }

    #[test]
    fn mismatched_expected_model_is_rejected() {
        let verifier = Verifier::new();
        let assertions = vec![VerifyExpr::not(VerifyExpr::bool_var("w_0"))];
        let result = verifier.verify_unique(&assertions, &[true], None);
        assert!(result.is_err());
    }

    #[test]
    fn non_unique_model_is_rejected() {
        // No constraints at all: w_0 is free, so two models survive blocking.
        let verifier = Verifier::new();
        let result = verifier.verify_unique(&[], &[false], None);
        assert!(matches!(result, Err(VerificationError::SecondModelExists)));
    }

    #[test]
    fn count_bound_constrains_the_model() {
        // Three villagers, exactly one of {w_0, w_1, w_2} is a werewolf, and
        // we pin it to w_1 via the other two assertions.
        let verifier = Verifier::new();
        let assertions = vec![
            VerifyExpr::count(vec!["w_0".into(), "w_1".into(), "w_2".into()], CountCmp::Exact, 1),
            VerifyExpr::not(VerifyExpr::bool_var("w_0")),
            VerifyExpr::not(VerifyExpr::bool_var("w_2")),
        ];
        let result = verifier.verify_unique(&assertions, &[false, true, false], None);
        assert!(result.is_ok());
    }

    #[test]
    fn negated_parity_forces_the_opposite_parity() {
        // Three villagers, w_1 = w_2 = false, and the NEGATION of "even
        // count over {w_0, w_1, w_2}" — the position a liar's parity
        // statement is asserted in. With w_1/w_2 pinned false, the sum is
        // just w_0; forcing it odd forces w_0 = true. An existential-witness
        // encoding would let the solver dodge this (pick a `q` for which
        // the blocked equation is false regardless of the real parity),
        // making w_0 = false a second model and failing uniqueness.
        let verifier = Verifier::new();
        let assertions = vec![
            VerifyExpr::not(VerifyExpr::bool_var("w_1")),
            VerifyExpr::not(VerifyExpr::bool_var("w_2")),
            VerifyExpr::not(VerifyExpr::count(vec!["w_0".into(), "w_1".into(), "w_2".into()], CountCmp::Even, 0)),
        ];
        let result = verifier.verify_unique(&assertions, &[true, false, false], None);
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn shill_identity_is_checked() {
        let verifier = Verifier::new();
        let assertions = vec![
            VerifyExpr::not(VerifyExpr::bool_var("w_0")),
            VerifyExpr::bool_var("w_1"),
            VerifyExpr::int_eq(VerifyExpr::int_var("shill"), VerifyExpr::IntLit(0)),
        ];
        let result = verifier.verify_unique(&assertions, &[false, true], Some(0));
        assert!(result.is_ok());
    }
}
