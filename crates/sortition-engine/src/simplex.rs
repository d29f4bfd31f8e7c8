//! Exact linear programming by two-phase primal simplex.
//!
//! All arithmetic is `BigRational`, end to end: feasibility and optimality
//! are decided exactly, so the dominance decisions built on top need no
//! tolerance and never compare floats. Pivot selection follows Bland's
//! rule, which rules out cycling.

use num::rational::BigRational;
use num::traits::{One, Zero};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimplexError {
    #[error("Row has {got} coefficients, program has {expected} variables")]
    ShapeMismatch { expected: usize, got: usize },
    #[error("Program is infeasible")]
    Infeasible,
    #[error("Objective is unbounded above")]
    Unbounded,
}

/// Comparison operator of one constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Le,
    Ge,
    Eq,
}

/// One linear constraint `coeffs · x <op> rhs`.
#[derive(Debug, Clone)]
struct Row {
    coeffs: Vec<BigRational>,
    op: ConstraintOp,
    rhs: BigRational,
}

/// A linear program over nonnegative variables: maximize `objective · x`
/// subject to the constraint rows and `x >= 0`.
#[derive(Debug, Clone)]
pub struct LinearProgram {
    num_vars: usize,
    objective: Vec<BigRational>,
    rows: Vec<Row>,
}

/// An optimal vertex and its objective value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub value: BigRational,
    pub point: Vec<BigRational>,
}

impl LinearProgram {
    pub fn new(num_vars: usize) -> Self {
        Self {
            num_vars,
            objective: vec![BigRational::zero(); num_vars],
            rows: Vec::new(),
        }
    }

    pub fn num_vars(&self) -> usize {
        self.num_vars
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    /// Set the objective coefficients (maximization).
    pub fn set_objective(&mut self, coeffs: Vec<BigRational>) -> Result<(), SimplexError> {
        if coeffs.len() != self.num_vars {
            return Err(SimplexError::ShapeMismatch {
                expected: self.num_vars,
                got: coeffs.len(),
            });
        }
        self.objective = coeffs;
        Ok(())
    }

    /// Add the constraint `coeffs · x <op> rhs`.
    pub fn add_constraint(
        &mut self,
        coeffs: Vec<BigRational>,
        op: ConstraintOp,
        rhs: BigRational,
    ) -> Result<(), SimplexError> {
        if coeffs.len() != self.num_vars {
            return Err(SimplexError::ShapeMismatch {
                expected: self.num_vars,
                got: coeffs.len(),
            });
        }
        self.rows.push(Row { coeffs, op, rhs });
        Ok(())
    }

    /// Maximize the objective over the feasible region.
    pub fn maximize(&self) -> Result<Solution, SimplexError> {
        let mut tableau = Tableau::build(self);
        let pivots = tableau.run_two_phases(&self.objective)?;
        debug!(
            vars = self.num_vars,
            constraints = self.rows.len(),
            pivots,
            "simplex finished"
        );

        let mut point = vec![BigRational::zero(); self.num_vars];
        for (i, &column) in tableau.basis.iter().enumerate() {
            if column < self.num_vars {
                point[column] = tableau.rhs[i].clone();
            }
        }
        let value = self
            .objective
            .iter()
            .zip(&point)
            .map(|(c, x)| c.clone() * x.clone())
            .sum();
        Ok(Solution { value, point })
    }
}

/// Dense simplex tableau in equality form, kept as `B⁻¹A | B⁻¹b` with the
/// right-hand side nonnegative throughout.
struct Tableau {
    rows: Vec<Vec<BigRational>>,
    rhs: Vec<BigRational>,
    /// Basic column of each row.
    basis: Vec<usize>,
    /// Columns at or beyond this index are artificial.
    artificial_start: usize,
}

impl Tableau {
    fn build(program: &LinearProgram) -> Self {
        let n = program.num_vars;

        // Normalize to nonnegative right-hand sides.
        let mut normalized: Vec<Row> = program
            .rows
            .iter()
            .map(|row| {
                let mut row = row.clone();
                if row.rhs < BigRational::zero() {
                    for c in &mut row.coeffs {
                        *c = -c.clone();
                    }
                    row.rhs = -row.rhs.clone();
                    row.op = match row.op {
                        ConstraintOp::Le => ConstraintOp::Ge,
                        ConstraintOp::Ge => ConstraintOp::Le,
                        ConstraintOp::Eq => ConstraintOp::Eq,
                    };
                }
                row
            })
            .collect();

        let num_slack = normalized
            .iter()
            .filter(|row| row.op != ConstraintOp::Eq)
            .count();
        let num_artificial = normalized
            .iter()
            .filter(|row| row.op != ConstraintOp::Le)
            .count();
        let artificial_start = n + num_slack;
        let total = artificial_start + num_artificial;

        let mut rows = Vec::with_capacity(normalized.len());
        let mut rhs = Vec::with_capacity(normalized.len());
        let mut basis = Vec::with_capacity(normalized.len());
        let mut next_slack = n;
        let mut next_artificial = artificial_start;
        for row in normalized.drain(..) {
            let mut full = vec![BigRational::zero(); total];
            full[..n].clone_from_slice(&row.coeffs);
            match row.op {
                ConstraintOp::Le => {
                    full[next_slack] = BigRational::one();
                    basis.push(next_slack);
                    next_slack += 1;
                }
                ConstraintOp::Ge => {
                    full[next_slack] = -BigRational::one();
                    next_slack += 1;
                    full[next_artificial] = BigRational::one();
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
                ConstraintOp::Eq => {
                    full[next_artificial] = BigRational::one();
                    basis.push(next_artificial);
                    next_artificial += 1;
                }
            }
            rows.push(full);
            rhs.push(row.rhs);
        }

        Self {
            rows,
            rhs,
            basis,
            artificial_start,
        }
    }

    fn total_columns(&self) -> usize {
        self.rows.first().map_or(self.artificial_start, Vec::len)
    }

    fn run_two_phases(&mut self, objective: &[BigRational]) -> Result<u64, SimplexError> {
        let total = self.total_columns();
        let mut pivots = 0;

        if total > self.artificial_start {
            let mut phase_one = vec![BigRational::zero(); total];
            for cost in phase_one.iter_mut().skip(self.artificial_start) {
                *cost = -BigRational::one();
            }
            pivots += self.optimize(&phase_one, total)?;
            for (i, &column) in self.basis.iter().enumerate() {
                if column >= self.artificial_start && !self.rhs[i].is_zero() {
                    return Err(SimplexError::Infeasible);
                }
            }
            self.evict_artificials();
        }

        let mut phase_two = vec![BigRational::zero(); self.total_columns()];
        phase_two[..objective.len()].clone_from_slice(objective);
        pivots += self.optimize(&phase_two, self.artificial_start)?;
        Ok(pivots)
    }

    /// Simplex iterations with Bland's rule: enter the lowest-index column
    /// with positive reduced cost, leave by minimum ratio with lowest basic
    /// column breaking ties. Only columns below `eligible` may enter.
    fn optimize(&mut self, costs: &[BigRational], eligible: usize) -> Result<u64, SimplexError> {
        let mut pivots = 0;
        loop {
            let mut entering = None;
            for j in 0..eligible {
                if self.basis.contains(&j) {
                    continue;
                }
                let mut reduced = costs[j].clone();
                for (i, row) in self.rows.iter().enumerate() {
                    let basic_cost = &costs[self.basis[i]];
                    if !basic_cost.is_zero() && !row[j].is_zero() {
                        reduced -= basic_cost.clone() * row[j].clone();
                    }
                }
                if reduced > BigRational::zero() {
                    entering = Some(j);
                    break;
                }
            }
            let Some(entering) = entering else {
                return Ok(pivots);
            };

            let mut leaving: Option<(usize, BigRational)> = None;
            for i in 0..self.rows.len() {
                let coefficient = self.rows[i][entering].clone();
                if coefficient <= BigRational::zero() {
                    continue;
                }
                let ratio = self.rhs[i].clone() / coefficient;
                let replace = match &leaving {
                    None => true,
                    Some((row, best)) => {
                        ratio < *best || (ratio == *best && self.basis[i] < self.basis[*row])
                    }
                };
                if replace {
                    leaving = Some((i, ratio));
                }
            }
            let Some((pivot_row, _)) = leaving else {
                return Err(SimplexError::Unbounded);
            };
            self.pivot(pivot_row, entering);
            pivots += 1;
        }
    }

    /// After phase one, no artificial column may stay basic: pivot each one
    /// out on any nonbasic structural column, or drop the row as redundant
    /// when it has none left.
    fn evict_artificials(&mut self) {
        let mut i = 0;
        while i < self.rows.len() {
            if self.basis[i] < self.artificial_start {
                i += 1;
                continue;
            }
            let replacement = (0..self.artificial_start)
                .find(|&j| !self.rows[i][j].is_zero() && !self.basis.contains(&j));
            match replacement {
                Some(column) => {
                    // The artificial is basic at zero, so this pivot keeps
                    // every right-hand side unchanged.
                    self.pivot(i, column);
                    i += 1;
                }
                None => {
                    self.rows.remove(i);
                    self.rhs.remove(i);
                    self.basis.remove(i);
                }
            }
        }
    }

    fn pivot(&mut self, pivot_row: usize, pivot_column: usize) {
        let divisor = self.rows[pivot_row][pivot_column].clone();
        for value in &mut self.rows[pivot_row] {
            *value /= divisor.clone();
        }
        self.rhs[pivot_row] /= divisor;

        let pivot_coeffs = self.rows[pivot_row].clone();
        let pivot_rhs = self.rhs[pivot_row].clone();
        for i in 0..self.rows.len() {
            if i == pivot_row {
                continue;
            }
            let factor = self.rows[i][pivot_column].clone();
            if factor.is_zero() {
                continue;
            }
            let row = &mut self.rows[i];
            for (j, pivot_value) in pivot_coeffs.iter().enumerate() {
                if !pivot_value.is_zero() {
                    row[j] -= factor.clone() * pivot_value.clone();
                }
            }
            self.rhs[i] -= factor * pivot_rhs.clone();
        }
        self.basis[pivot_row] = pivot_column;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(numer: i64, denom: i64) -> BigRational {
        BigRational::new(numer.into(), denom.into())
    }

    fn whole(value: i64) -> BigRational {
        BigRational::from_integer(value.into())
    }

    #[test]
    fn maximizes_over_the_unit_simplex() {
        let mut lp = LinearProgram::new(3);
        lp.set_objective(vec![whole(2), whole(1), whole(0)]).unwrap();
        lp.add_constraint(vec![whole(1), whole(1), whole(1)], ConstraintOp::Eq, whole(1))
            .unwrap();
        let solution = lp.maximize().unwrap();
        assert_eq!(solution.value, whole(2));
        assert_eq!(solution.point, vec![whole(1), whole(0), whole(0)]);
    }

    #[test]
    fn lower_bounds_bind() {
        let mut lp = LinearProgram::new(2);
        lp.set_objective(vec![whole(0), whole(1)]).unwrap();
        lp.add_constraint(vec![whole(1), whole(0)], ConstraintOp::Ge, ratio(1, 2))
            .unwrap();
        lp.add_constraint(vec![whole(1), whole(1)], ConstraintOp::Eq, whole(1))
            .unwrap();
        let solution = lp.maximize().unwrap();
        assert_eq!(solution.value, ratio(1, 2));
        assert_eq!(solution.point, vec![ratio(1, 2), ratio(1, 2)]);
    }

    #[test]
    fn contradictory_bounds_are_infeasible() {
        let mut lp = LinearProgram::new(1);
        lp.add_constraint(vec![whole(1)], ConstraintOp::Le, ratio(1, 3))
            .unwrap();
        lp.add_constraint(vec![whole(1)], ConstraintOp::Ge, ratio(2, 3))
            .unwrap();
        assert_eq!(lp.maximize(), Err(SimplexError::Infeasible));
    }

    #[test]
    fn missing_upper_bound_is_unbounded() {
        let mut lp = LinearProgram::new(2);
        lp.set_objective(vec![whole(1), whole(0)]).unwrap();
        lp.add_constraint(vec![whole(0), whole(1)], ConstraintOp::Le, whole(1))
            .unwrap();
        assert_eq!(lp.maximize(), Err(SimplexError::Unbounded));
    }

    #[test]
    fn redundant_equalities_are_dropped() {
        let mut lp = LinearProgram::new(2);
        lp.set_objective(vec![whole(0), whole(1)]).unwrap();
        lp.add_constraint(vec![whole(1), whole(0)], ConstraintOp::Eq, ratio(1, 2))
            .unwrap();
        lp.add_constraint(vec![whole(1), whole(0)], ConstraintOp::Eq, ratio(1, 2))
            .unwrap();
        lp.add_constraint(vec![whole(1), whole(1)], ConstraintOp::Eq, whole(1))
            .unwrap();
        let solution = lp.maximize().unwrap();
        assert_eq!(solution.value, ratio(1, 2));
    }

    #[test]
    fn negative_right_hand_sides_are_normalized() {
        let mut lp = LinearProgram::new(2);
        lp.set_objective(vec![whole(0), whole(1)]).unwrap();
        // -x0 <= -1/2 is x0 >= 1/2.
        lp.add_constraint(vec![-whole(1), whole(0)], ConstraintOp::Le, ratio(-1, 2))
            .unwrap();
        lp.add_constraint(vec![whole(1), whole(1)], ConstraintOp::Eq, whole(1))
            .unwrap();
        let solution = lp.maximize().unwrap();
        assert_eq!(solution.value, ratio(1, 2));
        assert_eq!(solution.point[0], ratio(1, 2));
    }

    #[test]
    fn shape_mismatches_are_rejected() {
        let mut lp = LinearProgram::new(3);
        assert_eq!(
            lp.set_objective(vec![whole(1)]),
            Err(SimplexError::ShapeMismatch {
                expected: 3,
                got: 1
            })
        );
        assert_eq!(
            lp.add_constraint(vec![whole(1), whole(1)], ConstraintOp::Le, whole(1)),
            Err(SimplexError::ShapeMismatch {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn feasibility_only_programs_report_zero_value() {
        let mut lp = LinearProgram::new(2);
        lp.add_constraint(vec![whole(1), whole(1)], ConstraintOp::Eq, whole(1))
            .unwrap();
        lp.add_constraint(vec![whole(1), whole(0)], ConstraintOp::Ge, ratio(1, 4))
            .unwrap();
        let solution = lp.maximize().unwrap();
        assert_eq!(solution.value, whole(0));
        let total: BigRational = solution.point.iter().cloned().sum();
        assert_eq!(total, whole(1));
        assert!(solution.point[0] >= ratio(1, 4));
    }
}
