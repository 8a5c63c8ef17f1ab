//! The statement model (L1).
//!
//! A closed, tagged enum — no trait objects, no per-statement heap
//! allocation beyond the `Vec<u32>` a count/parity variant's scope needs.
//! Each variant supports evaluation against a role vector, a canonical
//! string encoding that round-trips, and a display form for debugging.

use std::fmt;

use crate::error::{PuzzleError, Result};

/// A boolean predicate over a role vector `W` of `N` villagers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    /// `W[a] => W[b]`
    Implication { a: u32, b: u32 },
    /// `W[a] = W[b]`, stored with `a < b`.
    Equivalence { a: u32, b: u32 },
    /// `W[a] | W[b]`, stored with `a < b`.
    Disjunction { a: u32, b: u32 },
    /// `W[a] xor W[b]`, stored with `a < b`.
    ExclusiveOne { a: u32, b: u32 },
    /// `!(W[a] & W[b])`, stored with `a < b`.
    AtMostOne { a: u32, b: u32 },
    /// `!W[a] => W[b]`
    ConverseImplication { a: u32, b: u32 },
    /// `!W[a] & !W[b]`, stored with `a < b`.
    Neither { a: u32, b: u32 },
    /// `sum(W[i] for i in scope) == k`
    ExactCount { scope: Vec<u32>, k: u32 },
    /// `sum(W[i] for i in scope) <= k`
    UpperBound { scope: Vec<u32>, k: u32 },
    /// `sum(W[i] for i in scope) >= k`
    LowerBound { scope: Vec<u32>, k: u32 },
    /// `sum(W[i] for i in scope) mod 2 == 0`
    EvenParity { scope: Vec<u32> },
    /// `sum(W[i] for i in scope) mod 2 == 1`
    OddParity { scope: Vec<u32> },
}

use Statement::*;

impl Statement {
    /// Evaluate this statement against the role vector implied by assignment
    /// index `j` (bit `i` of `j` is `W[i]`).
    pub fn evaluate(&self, j: u32) -> bool {
        let w = |i: u32| (j >> i) & 1 == 1;
        match self {
            Implication { a, b } => !w(*a) || w(*b),
            Equivalence { a, b } => w(*a) == w(*b),
            Disjunction { a, b } => w(*a) || w(*b),
            ExclusiveOne { a, b } => w(*a) ^ w(*b),
            AtMostOne { a, b } => !(w(*a) && w(*b)),
            ConverseImplication { a, b } => w(*a) || w(*b),
            Neither { a, b } => !w(*a) && !w(*b),
            ExactCount { scope, k } => count(scope, j) == *k,
            UpperBound { scope, k } => count(scope, j) <= *k,
            LowerBound { scope, k } => count(scope, j) >= *k,
            EvenParity { scope } => count(scope, j) % 2 == 0,
            OddParity { scope } => count(scope, j) % 2 == 1,
        }
    }

    /// The set of villager indices this statement mentions.
    pub fn variables_involved(&self) -> Vec<u32> {
        match self {
            Implication { a, b }
            | Equivalence { a, b }
            | Disjunction { a, b }
            | ExclusiveOne { a, b }
            | AtMostOne { a, b }
            | ConverseImplication { a, b }
            | Neither { a, b } => vec![*a, *b],
            ExactCount { scope, .. }
            | UpperBound { scope, .. }
            | LowerBound { scope, .. }
            | EvenParity { scope }
            | OddParity { scope } => scope.clone(),
        }
    }

    /// Small positive bias used only as a generator tie-breaker.
    pub fn complexity_cost(&self) -> u32 {
        match self {
            Implication { .. } | Equivalence { .. } | Disjunction { .. } => 1,
            ExclusiveOne { .. } | AtMostOne { .. } => 2,
            ConverseImplication { .. } => 1,
            Neither { .. } => 3,
            ExactCount { scope, k } => 2 * scope.len() as u32 + k,
            UpperBound { scope, k } => 2 * scope.len() as u32 + k,
            LowerBound { scope, k } => 2 * scope.len() as u32 + k,
            EvenParity { scope } | OddParity { scope } => 2 * scope.len() as u32,
        }
    }

    fn code_tag(&self) -> &'static str {
        match self {
            Implication { .. } => "I",
            Equivalence { .. } => "B",
            Disjunction { .. } => "A",
            ExclusiveOne { .. } => "X",
            AtMostOne { .. } => "T",
            ConverseImplication { .. } => "F",
            Neither { .. } => "N",
            ExactCount { .. } => "E",
            UpperBound { .. } => "M",
            LowerBound { .. } => "L",
            EvenParity { .. } => "V",
            OddParity { .. } => "O",
        }
    }

    /// Render the canonical code, e.g. `I-3-1`, `N-0-2`, `E-0.1.2.3.5-4`.
    pub fn encode(&self) -> String {
        let tag = self.code_tag();
        match self {
            Implication { a, b } | ConverseImplication { a, b } => format!("{tag}-{a}-{b}"),
            Equivalence { a, b }
            | Disjunction { a, b }
            | ExclusiveOne { a, b }
            | AtMostOne { a, b }
            | Neither { a, b } => format!("{tag}-{a}-{b}"),
            ExactCount { scope, k } | UpperBound { scope, k } | LowerBound { scope, k } => {
                format!("{tag}-{}-{k}", join_scope(scope))
            }
            EvenParity { scope } | OddParity { scope } => format!("{tag}-{}", join_scope(scope)),
        }
    }

    /// Parse a canonical code. Strict: fails on unknown tag, wrong arity,
    /// out-of-range indices, duplicate scope members, or non-canonical order.
    pub fn decode(code: &str, n: u32) -> Result<Statement> {
        let fields: Vec<&str> = code.split('-').collect();
        let tag = *fields.first().ok_or_else(|| malformed(code, "empty code"))?;
        let check_index = |v: u32| -> Result<u32> {
            if v >= n {
                return Err(PuzzleError::OutOfRangeIndex {
                    what: "villager index".into(),
                    value: v as i64,
                    bound: format!("< {n}"),
                });
            }
            Ok(v)
        };
        match tag {
            "I" | "F" => {
                let (a, b) = parse_pair(code, &fields)?;
                check_index(a)?;
                check_index(b)?;
                if a == b {
                    return Err(malformed(code, "implication endpoints must differ"));
                }
                Ok(if tag == "I" {
                    Implication { a, b }
                } else {
                    ConverseImplication { a, b }
                })
            }
            "B" | "A" | "X" | "T" | "N" => {
                let (a, b) = parse_pair(code, &fields)?;
                check_index(a)?;
                check_index(b)?;
                if a >= b {
                    return Err(PuzzleError::NonCanonicalPair { code: code.to_string() });
                }
                Ok(match tag {
                    "B" => Equivalence { a, b },
                    "A" => Disjunction { a, b },
                    "X" => ExclusiveOne { a, b },
                    "T" => AtMostOne { a, b },
                    _ => Neither { a, b },
                })
            }
            "E" | "M" | "L" => {
                if fields.len() != 3 {
                    return Err(malformed(code, "expected CODE-scope-k"));
                }
                let scope = parse_scope(code, fields[1], n)?;
                let k: u32 = fields[2]
                    .parse()
                    .map_err(|_| malformed(code, "k is not a non-negative integer"))?;
                if k as usize > scope.len() {
                    return Err(PuzzleError::OutOfRangeIndex {
                        what: "count bound k".into(),
                        value: k as i64,
                        bound: format!("<= {}", scope.len()),
                    });
                }
                Ok(match tag {
                    "E" => ExactCount { scope, k },
                    "M" => UpperBound { scope, k },
                    _ => LowerBound { scope, k },
                })
            }
            "V" | "O" => {
                if fields.len() != 2 {
                    return Err(malformed(code, "expected CODE-scope"));
                }
                let scope = parse_scope(code, fields[1], n)?;
                Ok(if tag == "V" { EvenParity { scope } } else { OddParity { scope } })
            }
            other => Err(malformed(code, &format!("unknown statement tag '{other}'"))),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implication { a, b } => write!(f, "W[{a}] -> W[{b}]"),
            ConverseImplication { a, b } => write!(f, "!W[{a}] -> W[{b}]"),
            Equivalence { a, b } => write!(f, "W[{a}] = W[{b}]"),
            Disjunction { a, b } => write!(f, "W[{a}] or W[{b}]"),
            ExclusiveOne { a, b } => write!(f, "W[{a}] xor W[{b}]"),
            AtMostOne { a, b } => write!(f, "not both W[{a}] and W[{b}]"),
            Neither { a, b } => write!(f, "neither W[{a}] nor W[{b}]"),
            ExactCount { scope, k } => write!(f, "exactly {k} of {} are werewolves", fmt_scope(scope)),
            UpperBound { scope, k } => write!(f, "at most {k} of {} are werewolves", fmt_scope(scope)),
            LowerBound { scope, k } => write!(f, "at least {k} of {} are werewolves", fmt_scope(scope)),
            EvenParity { scope } => write!(f, "an even number of {} are werewolves", fmt_scope(scope)),
            OddParity { scope } => write!(f, "an odd number of {} are werewolves", fmt_scope(scope)),
        }
    }
}

fn fmt_scope(scope: &[u32]) -> String {
    let parts: Vec<String> = scope.iter().map(|i| format!("W[{i}]")).collect();
    format!("{{{}}}", parts.join(", "))
}

fn count(scope: &[u32], j: u32) -> u32 {
    scope.iter().filter(|&&i| (j >> i) & 1 == 1).count() as u32
}

fn join_scope(scope: &[u32]) -> String {
    scope.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(".")
}

fn malformed(code: &str, reason: &str) -> PuzzleError {
    PuzzleError::MalformedCode { code: code.to_string(), reason: reason.to_string() }
}

fn parse_pair(code: &str, fields: &[&str]) -> Result<(u32, u32)> {
    if fields.len() != 3 {
        return Err(malformed(code, "expected CODE-a-b"));
    }
    let a: u32 = fields[1].parse().map_err(|_| malformed(code, "a is not an integer"))?;
    let b: u32 = fields[2].parse().map_err(|_| malformed(code, "b is not an integer"))?;
    Ok((a, b))
}

fn parse_scope(code: &str, raw: &str, n: u32) -> Result<Vec<u32>> {
    let mut scope = Vec::new();
    for part in raw.split('.') {
        let v: u32 = part.parse().map_err(|_| malformed(code, "scope member is not an integer"))?;
        if v >= n {
            return Err(PuzzleError::OutOfRangeIndex {
                what: "scope member".into(),
                value: v as i64,
                bound: format!("< {n}"),
            });
        }
        scope.push(v);
    }
    if scope.len() < 2 {
        return Err(malformed(code, "scope must name at least two villagers"));
    }
    let mut sorted = scope.clone();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != scope.len() {
        return Err(malformed(code, "scope contains duplicate members"));
    }
    if sorted != scope {
        return Err(PuzzleError::NonCanonicalPair { code: code.to_string() });
    }
    Ok(scope)
}
