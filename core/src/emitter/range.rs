//! Turns one or two chained comparisons over a single register into an
//! integer interval, and picks a value from it.
//!
//! Bounds are computed in `i128` so that adjusting a strict bound at the edge
//! of the `i64` domain never overflows; any interval that survives validation
//! lies entirely inside `i64`.

use rand::Rng;

use crate::emitter::CompileError;
use crate::parser::{Atom, ComparisonOp, Direction};

/// One `left op right` comparison whose operands are both atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeLink<'a> {
    pub left: &'a Atom,
    pub op: ComparisonOp,
    pub right: &'a Atom,
}

/// Inclusive set of admissible values, optionally with one hole (`!=`).
///
/// Only the solver builds intervals, so `low <= high` always holds.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Interval {
    low: i64,
    high: i64,
    excluded: Option<i64>,
}

impl Interval {
    fn new(low: i128, high: i128) -> Result<Self, CompileError> {
        if low > high {
            return Err(CompileError::EmptyRange { low, high });
        }
        match (i64::try_from(low), i64::try_from(high)) {
            (Ok(low), Ok(high)) => Ok(Interval {
                low,
                high,
                excluded: None,
            }),
            _ => Err(CompileError::EmptyRange { low, high }),
        }
    }

    pub fn low(&self) -> i64 {
        self.low
    }

    pub fn high(&self) -> i64 {
        self.high
    }

    /// The single value `!=` rules out, if any.
    pub fn excluded(&self) -> Option<i64> {
        self.excluded
    }

    pub fn contains(&self, value: i64) -> bool {
        self.low <= value && value <= self.high && self.excluded != Some(value)
    }

    /// Draws one admissible value uniformly.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> i64 {
        match self.excluded {
            Some(hole) if self.low <= hole && hole <= self.high => {
                // Sample from a range one shorter and step over the hole.
                let value = rng.random_range(self.low..=self.high - 1);
                if value >= hole { value + 1 } else { value }
            }
            _ => rng.random_range(self.low..=self.high),
        }
    }
}

/// A solved chain: the register it constrains and the admissible values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution<'a> {
    pub register: &'a str,
    pub interval: Interval,
}

pub fn solve<'a>(links: &[RangeLink<'a>]) -> Result<Solution<'a>, CompileError> {
    match links {
        [] => Err(CompileError::unsupported_shape("empty comparison chain")),
        [single] => solve_single(single),
        [first, second] => solve_double(first, second),
        _ => Err(CompileError::unsupported_shape(format!(
            "{} comparison operators (at most two are supported)",
            links.len()
        ))),
    }
}

/// `reg OP n` or `n OP reg`.
///
/// The second bound is implicitly 0. When 0 lies on the wrong side of `n`,
/// the edge of the `i64` domain is used instead, so the chosen value always
/// satisfies the comparison.
fn solve_single<'a>(link: &RangeLink<'a>) -> Result<Solution<'a>, CompileError> {
    let (register, op, literal) = match (link.left, link.right) {
        (Atom::Register(register), Atom::Int(n)) => (register.as_str(), link.op, *n),
        (Atom::Int(n), Atom::Register(register)) => (register.as_str(), link.op.flipped(), *n),
        (Atom::Register(_), Atom::Register(_)) => {
            return Err(CompileError::unsupported_shape(
                "register-to-register comparison",
            ));
        }
        (Atom::Int(_), Atom::Int(_)) => {
            return Err(CompileError::unsupported_shape(
                "comparison without a register",
            ));
        }
    };

    let n = i128::from(literal);
    let interval = match op {
        ComparisonOp::Lt | ComparisonOp::Le => {
            let high = if op.is_strict() { n - 1 } else { n };
            let low = if high >= 0 { 0 } else { i128::from(i64::MIN) };
            Interval::new(low, high)?
        }
        ComparisonOp::Gt | ComparisonOp::Ge => {
            let low = if op.is_strict() { n + 1 } else { n };
            let high = if low <= 0 { 0 } else { i128::from(i64::MAX) };
            Interval::new(low, high)?
        }
        ComparisonOp::Eq => Interval::new(n, n)?,
        ComparisonOp::Neq => Interval {
            low: 0,
            high: i64::MAX,
            excluded: Some(literal),
        },
    };

    Ok(Solution { register, interval })
}

/// `low OP1 reg OP2 high`, ascending or descending.
fn solve_double<'a>(
    first: &RangeLink<'a>,
    second: &RangeLink<'a>,
) -> Result<Solution<'a>, CompileError> {
    let direction = match (first.op.direction(), second.op.direction()) {
        (Some(a), Some(b)) if a == b => a,
        (Some(_), Some(_)) => {
            return Err(CompileError::InconsistentDirection {
                first: first.op,
                second: second.op,
            });
        }
        _ => {
            return Err(CompileError::unsupported_shape(
                "equality operator in a chained comparison",
            ));
        }
    };

    let (Some(outer_left), Some(outer_right)) = (first.left.as_int(), second.right.as_int())
    else {
        return Err(CompileError::unsupported_shape(
            "chained comparison bounds must be integer literals",
        ));
    };

    let register = match (first.right, second.left) {
        (Atom::Register(a), Atom::Register(b)) if a.eq_ignore_ascii_case(b) => a.as_str(),
        (Atom::Register(a), Atom::Register(b)) => {
            return Err(CompileError::RegisterMismatch {
                first: a.clone(),
                second: b.clone(),
            });
        }
        _ => {
            return Err(CompileError::unsupported_shape(
                "chained comparison without a register in the middle",
            ));
        }
    };

    // Normalize to ascending: `hi > reg > lo` is `lo < reg < hi`.
    let ((low, low_strict), (high, high_strict)) = match direction {
        Direction::Ascending => (
            (outer_left, first.op.is_strict()),
            (outer_right, second.op.is_strict()),
        ),
        Direction::Descending => (
            (outer_right, second.op.is_strict()),
            (outer_left, first.op.is_strict()),
        ),
    };

    let low = i128::from(low) + i128::from(low_strict);
    let high = i128::from(high) - i128::from(high_strict);

    Ok(Solution {
        register,
        interval: Interval::new(low, high)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn reg(name: &str) -> Atom {
        Atom::Register(name.to_string())
    }

    fn int(value: i64) -> Atom {
        Atom::Int(value)
    }

    fn interval(low: i64, high: i64) -> Interval {
        Interval {
            low,
            high,
            excluded: None,
        }
    }

    fn single(left: &Atom, op: ComparisonOp, right: &Atom) -> Result<Interval, CompileError> {
        solve(&[RangeLink { left, op, right }]).map(|s| s.interval)
    }

    fn double(
        a: &Atom,
        op1: ComparisonOp,
        m: &Atom,
        op2: ComparisonOp,
        b: &Atom,
    ) -> Result<Interval, CompileError> {
        solve(&[
            RangeLink {
                left: a,
                op: op1,
                right: m,
            },
            RangeLink {
                left: m,
                op: op2,
                right: b,
            },
        ])
        .map(|s| s.interval)
    }

    use ComparisonOp::{Ge, Gt, Le, Lt, Neq};

    #[test]
    fn test_single_link_bounds() {
        let rax = reg("rax");
        assert_eq!(single(&rax, Lt, &int(12)), Ok(interval(0, 11)));
        assert_eq!(single(&rax, Le, &int(13)), Ok(interval(0, 13)));
        assert_eq!(single(&rax, Gt, &int(5)), Ok(interval(6, i64::MAX)));
        assert_eq!(single(&rax, Ge, &int(5)), Ok(interval(5, i64::MAX)));
        assert_eq!(single(&rax, Gt, &int(-5)), Ok(interval(-4, 0)));
        assert_eq!(single(&rax, Lt, &int(-3)), Ok(interval(i64::MIN, -4)));
        assert_eq!(single(&rax, ComparisonOp::Eq, &int(42)), Ok(interval(42, 42)));
    }

    #[test]
    fn test_literal_on_the_left_is_flipped() {
        let rax = reg("rax");
        assert_eq!(single(&int(12), Gt, &rax), single(&rax, Lt, &int(12)));
        assert_eq!(single(&int(3), Le, &rax), single(&rax, Ge, &int(3)));
    }

    #[test]
    fn test_single_link_at_domain_edges_is_empty() {
        let rax = reg("rax");
        assert!(matches!(
            single(&rax, Lt, &int(i64::MIN)),
            Err(CompileError::EmptyRange { .. })
        ));
        assert!(matches!(
            single(&rax, Gt, &int(i64::MAX)),
            Err(CompileError::EmptyRange { .. })
        ));
        assert_eq!(
            single(&rax, Ge, &int(i64::MAX)),
            Ok(interval(i64::MAX, i64::MAX))
        );
    }

    #[test]
    fn test_not_equal_has_a_hole() {
        let interval = single(&reg("rax"), Neq, &int(3)).unwrap();
        assert!(!interval.contains(3));
        assert!(interval.contains(2));
        assert!(interval.contains(4));
        assert_eq!(interval.excluded(), Some(3));
    }

    #[test]
    fn test_solved_intervals_are_ordered() {
        let rax = reg("rax");
        for op in [Lt, Le, Gt, Ge, ComparisonOp::Eq, Neq] {
            for n in [i64::MIN + 1, -5, 0, 5, i64::MAX - 1] {
                let Ok(interval) = single(&rax, op, &int(n)) else {
                    continue;
                };
                assert!(interval.low() <= interval.high(), "rax {op:?} {n}");
                let mut rng = StdRng::seed_from_u64(n as u64);
                assert!(interval.contains(interval.sample(&mut rng)));
            }
        }
    }

    #[test]
    fn test_single_link_shapes() {
        assert!(matches!(
            single(&reg("rax"), Lt, &reg("rbx")),
            Err(CompileError::UnsupportedShape { .. })
        ));
        assert!(matches!(
            single(&int(1), Lt, &int(2)),
            Err(CompileError::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn test_double_link_ascending() {
        let rax = reg("rax");
        assert_eq!(double(&int(0), Le, &rax, Lt, &int(7)), Ok(interval(0, 6)));
        assert_eq!(double(&int(0), Lt, &rax, Lt, &int(7)), Ok(interval(1, 6)));
        assert_eq!(double(&int(-4), Le, &rax, Le, &int(-2)), Ok(interval(-4, -2)));
    }

    #[test]
    fn test_double_link_descending_is_normalized() {
        let rax = reg("rax");
        assert_eq!(
            double(&int(7), Gt, &rax, Ge, &int(0)),
            double(&int(0), Le, &rax, Lt, &int(7))
        );
        assert_eq!(double(&int(9), Ge, &rax, Gt, &int(2)), Ok(interval(3, 9)));
    }

    #[test]
    fn test_double_link_errors() {
        let rax = reg("rax");
        assert_eq!(
            double(&int(0), Lt, &rax, Gt, &int(7)),
            Err(CompileError::InconsistentDirection {
                first: Lt,
                second: Gt
            })
        );
        assert_eq!(
            double(&int(5), Lt, &rax, Lt, &int(5)),
            Err(CompileError::EmptyRange { low: 6, high: 4 })
        );
        assert!(matches!(
            double(&int(0), ComparisonOp::Eq, &rax, Lt, &int(5)),
            Err(CompileError::UnsupportedShape { .. })
        ));
        assert!(matches!(
            double(&reg("rbx"), Lt, &rax, Lt, &int(5)),
            Err(CompileError::UnsupportedShape { .. })
        ));
        assert!(matches!(
            double(&int(0), Lt, &int(3), Lt, &int(5)),
            Err(CompileError::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn test_double_link_register_mismatch() {
        let (rax, rbx) = (reg("rax"), reg("rbx"));
        let links = [
            RangeLink {
                left: &int(0),
                op: Lt,
                right: &rax,
            },
            RangeLink {
                left: &rbx,
                op: Lt,
                right: &int(5),
            },
        ];
        assert_eq!(
            solve(&links),
            Err(CompileError::RegisterMismatch {
                first: "rax".to_string(),
                second: "rbx".to_string(),
            })
        );
    }

    #[test]
    fn test_single_point_interval_is_valid() {
        let rax = reg("rax");
        assert_eq!(double(&int(5), Lt, &rax, Lt, &int(7)), Ok(interval(6, 6)));
    }

    #[test]
    fn test_too_many_links() {
        let (rax, zero, five) = (reg("rax"), int(0), int(5));
        let link = RangeLink {
            left: &zero,
            op: Lt,
            right: &rax,
        };
        let tail = RangeLink {
            left: &rax,
            op: Lt,
            right: &five,
        };
        assert!(matches!(
            solve(&[link.clone(), tail.clone(), tail]),
            Err(CompileError::UnsupportedShape { .. })
        ));
        assert!(matches!(
            solve(&[]),
            Err(CompileError::UnsupportedShape { .. })
        ));
    }

    #[test]
    fn test_sample_stays_inside() {
        let mut rng = StdRng::seed_from_u64(7);
        let bounded = interval(-3, 3);
        let holed = Interval {
            low: 0,
            high: 2,
            excluded: Some(1),
        };
        for _ in 0..500 {
            assert!(bounded.contains(bounded.sample(&mut rng)));
            let v = holed.sample(&mut rng);
            assert!(v == 0 || v == 2, "sampled {v}");
        }
        let full = interval(i64::MIN, i64::MAX);
        full.sample(&mut rng);
    }
}
