//! Piecewise polynomial internal-force fields
//!
//! Each bar field is an ordered sequence of breakpoints with a small
//! polynomial per segment, expressed in the local offset t = x − x_start
//! of the segment. Evaluation, combination and integration stay exact
//! closed forms; nothing is ever collapsed into sampled arrays.

use serde::{Deserialize, Serialize};

/// Breakpoints closer than this are merged
const BREAK_TOL: f64 = 1e-9;

/// A dense-coefficient polynomial c0 + c1·t + c2·t² + ...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poly {
    /// Coefficients, constant term first
    pub coeffs: std::vec::Vec<f64>,
}

impl Poly {
    /// The zero polynomial
    pub fn zero() -> Self {
        Self { coeffs: vec![0.0] }
    }

    /// Constant polynomial
    pub fn constant(c: f64) -> Self {
        Self { coeffs: vec![c] }
    }

    /// Polynomial from coefficients, constant term first
    pub fn new(coeffs: std::vec::Vec<f64>) -> Self {
        let mut p = Self { coeffs };
        if p.coeffs.is_empty() {
            p.coeffs.push(0.0);
        }
        p
    }

    /// Degree, ignoring trailing zero coefficients
    pub fn degree(&self) -> usize {
        for (k, &c) in self.coeffs.iter().enumerate().rev() {
            if c != 0.0 {
                return k;
            }
        }
        0
    }

    /// Evaluate at t by Horner's rule
    pub fn eval(&self, t: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }

    /// Add `factor` times another polynomial in place
    pub fn add_scaled(&mut self, other: &Poly, factor: f64) {
        if other.coeffs.len() > self.coeffs.len() {
            self.coeffs.resize(other.coeffs.len(), 0.0);
        }
        for (c, &o) in self.coeffs.iter_mut().zip(other.coeffs.iter()) {
            *c += factor * o;
        }
    }

    /// Re-express in the shifted variable s = t − dt (Taylor shift)
    ///
    /// The result q satisfies q(s) = p(s + dt) for every s.
    pub fn shifted(&self, dt: f64) -> Poly {
        let n = self.coeffs.len();
        let mut out = vec![0.0; n];
        for j in 0..n {
            let cj = self.coeffs[j];
            if cj == 0.0 {
                continue;
            }
            // out[k] += c_j · C(j,k) · dt^(j−k)
            let mut binom = 1.0_f64;
            let mut dt_pow = 1.0_f64;
            for k in (0..=j).rev() {
                out[k] += cj * binom * dt_pow;
                if k > 0 {
                    binom = binom * (k as f64) / ((j - k + 1) as f64);
                    dt_pow *= dt;
                }
            }
        }
        Poly::new(out)
    }

    /// Antiderivative with the given constant term
    pub fn antiderivative(&self, c0: f64) -> Poly {
        let mut out = vec![0.0; self.coeffs.len() + 1];
        out[0] = c0;
        for (k, &c) in self.coeffs.iter().enumerate() {
            out[k + 1] = c / (k as f64 + 1.0);
        }
        Poly::new(out)
    }

    /// Exact integral over [0, t]
    pub fn integral_to(&self, t: f64) -> f64 {
        self.antiderivative(0.0).eval(t)
    }

    /// Multiply by a scalar in place
    pub fn scale(&mut self, factor: f64) {
        for c in &mut self.coeffs {
            *c *= factor;
        }
    }
}

/// A piecewise polynomial over sorted breakpoints
///
/// `polys[k]` covers `[breaks[k], breaks[k+1]]` in the local variable
/// t = x − breaks[k]. Evaluation is right-continuous at interior
/// breakpoints; `value_before` gives the left limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PiecewisePoly {
    /// Sorted breakpoints, at least two
    pub breaks: std::vec::Vec<f64>,
    /// One polynomial per segment
    pub polys: std::vec::Vec<Poly>,
}

impl PiecewisePoly {
    /// Zero field over [0, length]
    pub fn zero(length: f64) -> Self {
        Self {
            breaks: vec![0.0, length],
            polys: vec![Poly::zero()],
        }
    }

    /// Build from breakpoints and segment polynomials
    pub fn new(breaks: std::vec::Vec<f64>, polys: std::vec::Vec<Poly>) -> Self {
        debug_assert!(breaks.len() >= 2 && polys.len() + 1 == breaks.len());
        Self { breaks, polys }
    }

    /// Domain start
    pub fn start(&self) -> f64 {
        self.breaks[0]
    }

    /// Domain end
    pub fn end(&self) -> f64 {
        *self.breaks.last().unwrap()
    }

    /// Index of the segment containing x (right-continuous)
    fn segment_of(&self, x: f64) -> usize {
        let n = self.polys.len();
        for k in 0..n {
            if x < self.breaks[k + 1] - BREAK_TOL {
                return k;
            }
        }
        n - 1
    }

    /// Value at x, right-continuous at interior breakpoints
    pub fn value(&self, x: f64) -> f64 {
        let k = self.segment_of(x);
        self.polys[k].eval(x - self.breaks[k])
    }

    /// Left limit at x (differs from `value` only across a jump)
    pub fn value_before(&self, x: f64) -> f64 {
        let mut k = self.segment_of(x);
        if k > 0 && (x - self.breaks[k]).abs() <= BREAK_TOL {
            k -= 1;
        }
        self.polys[k].eval(x - self.breaks[k])
    }

    /// Merge this field's breakpoints with another set
    pub fn merged_breaks(&self, other: &[f64]) -> std::vec::Vec<f64> {
        let mut all: std::vec::Vec<f64> = self.breaks.iter().chain(other.iter()).copied().collect();
        all.sort_by(|a, b| a.partial_cmp(b).unwrap());
        all.dedup_by(|a, b| (*a - *b).abs() <= BREAK_TOL);
        all
    }

    /// Re-express over a superset of breakpoints
    pub fn refined(&self, breaks: &[f64]) -> PiecewisePoly {
        let mut polys = std::vec::Vec::with_capacity(breaks.len() - 1);
        for k in 0..breaks.len() - 1 {
            let mid = 0.5 * (breaks[k] + breaks[k + 1]);
            let src = self.segment_of(mid);
            // Shift the source polynomial to the new segment origin
            let dt = breaks[k] - self.breaks[src];
            polys.push(self.polys[src].shifted(dt));
        }
        PiecewisePoly::new(breaks.to_vec(), polys)
    }

    /// Exact linear combination Σ factor·field over merged breakpoints
    pub fn linear_combination(terms: &[(f64, &PiecewisePoly)]) -> PiecewisePoly {
        assert!(!terms.is_empty());
        let mut breaks = terms[0].1.breaks.clone();
        for (_, f) in terms.iter().skip(1) {
            breaks = f.merged_breaks(&breaks);
        }
        let mut polys = vec![Poly::zero(); breaks.len() - 1];
        for &(factor, field) in terms {
            let refined = field.refined(&breaks);
            for (p, r) in polys.iter_mut().zip(refined.polys.iter()) {
                p.add_scaled(r, factor);
            }
        }
        PiecewisePoly::new(breaks, polys)
    }

    /// Exact integral over the whole domain
    pub fn integral(&self) -> f64 {
        let mut total = 0.0;
        for k in 0..self.polys.len() {
            total += self.polys[k].integral_to(self.breaks[k + 1] - self.breaks[k]);
        }
        total
    }

    /// Running integral from the domain start, as a continuous field
    pub fn cumulative(&self, at_start: f64) -> PiecewisePoly {
        let mut acc = at_start;
        let mut polys = std::vec::Vec::with_capacity(self.polys.len());
        for k in 0..self.polys.len() {
            let anti = self.polys[k].antiderivative(acc);
            acc = anti.eval(self.breaks[k + 1] - self.breaks[k]);
            polys.push(anti);
        }
        PiecewisePoly::new(self.breaks.clone(), polys)
    }

    /// Multiply every segment by a scalar
    pub fn scaled(&self, factor: f64) -> PiecewisePoly {
        let mut out = self.clone();
        for p in &mut out.polys {
            p.scale(factor);
        }
        out
    }

    /// Largest polynomial degree over all segments
    pub fn max_degree(&self) -> usize {
        self.polys.iter().map(Poly::degree).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eval_horner() {
        let p = Poly::new(vec![1.0, -2.0, 3.0]);
        assert!((p.eval(2.0) - (1.0 - 4.0 + 12.0)).abs() < 1e-12);
    }

    #[test]
    fn test_taylor_shift() {
        // p(t) = t² shifted by dt = 1: q(s) = (s+1)² = 1 + 2s + s²
        let p = Poly::new(vec![0.0, 0.0, 1.0]);
        let q = p.shifted(1.0);
        assert!((q.coeffs[0] - 1.0).abs() < 1e-12);
        assert!((q.coeffs[1] - 2.0).abs() < 1e-12);
        assert!((q.coeffs[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_piecewise_value_and_jump() {
        // Shear-like field with a jump at x = 3
        let f = PiecewisePoly::new(
            vec![0.0, 3.0, 6.0],
            vec![Poly::constant(5.0), Poly::constant(-5.0)],
        );
        assert_eq!(f.value(1.0), 5.0);
        assert_eq!(f.value_before(3.0), 5.0);
        assert_eq!(f.value(3.0), -5.0);
        assert_eq!(f.value(6.0), -5.0);
    }

    #[test]
    fn test_linear_combination_exact() {
        let a = PiecewisePoly::new(vec![0.0, 6.0], vec![Poly::new(vec![0.0, 1.0])]);
        let b = PiecewisePoly::new(
            vec![0.0, 3.0, 6.0],
            vec![Poly::constant(1.0), Poly::constant(2.0)],
        );
        let c = PiecewisePoly::linear_combination(&[(2.0, &a), (-1.0, &b)]);
        assert!((c.value(1.0) - (2.0 - 1.0)).abs() < 1e-12);
        assert!((c.value(4.0) - (8.0 - 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_cumulative_integral() {
        let f = PiecewisePoly::new(vec![0.0, 2.0], vec![Poly::new(vec![0.0, 3.0])]);
        let cum = f.cumulative(1.0);
        // 1 + ∫0^2 3t dt = 1 + 6
        assert!((cum.value(2.0) - 7.0).abs() < 1e-12);
    }
}
