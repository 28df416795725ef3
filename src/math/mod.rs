//! Mathematical utilities for the force-method engine

pub mod integrate;
pub mod poly;

use nalgebra::{DMatrix, DVector};

pub use integrate::{simpson_composite, simpson_product};
pub use poly::{Poly, PiecewisePoly};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// Moment of a force about a point, clockwise positive with Y+ down
///
/// `p` is the point moments are taken about, `f` the application point of
/// the force `(fx, fy)`. Expands to `−Fy·(xₚ − x_f) + Fx·(yₚ − y_f)`.
pub fn moment_about(p: [f64; 2], f: [f64; 2], fx: f64, fy: f64) -> f64 {
    (f[0] - p[0]) * fy - (f[1] - p[1]) * fx
}

/// Solve a dense square system by LU with partial pivoting
pub fn solve_lu(a: &Mat, b: &Vec) -> Option<Vec> {
    a.clone().lu().solve(b)
}

/// 2-norm condition number via singular values
///
/// Returns infinity for a numerically singular matrix.
pub fn condition_number(a: &Mat) -> f64 {
    let sv = a.clone().svd(false, false).singular_values;
    let mut s_max = 0.0_f64;
    let mut s_min = f64::INFINITY;
    for &s in sv.iter() {
        s_max = s_max.max(s);
        s_min = s_min.min(s);
    }
    if s_min <= 0.0 || !s_min.is_finite() {
        return f64::INFINITY;
    }
    s_max / s_min
}

/// Numerical rank with a scale-relative tolerance
pub fn rank(a: &Mat) -> usize {
    let sv = a.clone().svd(false, false).singular_values;
    let s_max = sv.iter().cloned().fold(0.0_f64, f64::max);
    if s_max == 0.0 {
        return 0;
    }
    let eps = s_max * 1e-10 * (a.nrows().max(a.ncols()) as f64);
    sv.iter().filter(|&&s| s > eps).count()
}

/// Infinity norm of the symmetry defect, relative to the matrix norm
pub fn symmetry_defect(a: &Mat) -> f64 {
    let mut defect = 0.0_f64;
    let mut norm = 0.0_f64;
    for i in 0..a.nrows() {
        for j in 0..a.ncols() {
            norm = norm.max(a[(i, j)].abs());
            defect = defect.max((a[(i, j)] - a[(j, i)]).abs());
        }
    }
    if norm == 0.0 {
        0.0
    } else {
        defect / norm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moment_rule() {
        // Downward force at x = 3 about the origin: clockwise positive
        let m = moment_about([0.0, 0.0], [3.0, 0.0], 0.0, 10.0);
        assert!((m - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_solve_lu() {
        let a = Mat::from_row_slice(2, 2, &[2.0, 1.0, 1.0, 3.0]);
        let b = Vec::from_vec(vec![5.0, 10.0]);
        let x = solve_lu(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_condition_number_identity() {
        let a = Mat::identity(4, 4);
        assert!((condition_number(&a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_deficient() {
        let a = Mat::from_row_slice(2, 2, &[1.0, 2.0, 2.0, 4.0]);
        assert_eq!(rank(&a), 1);
    }
}
