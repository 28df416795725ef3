//! Composite Simpson quadrature over piecewise-polynomial fields
//!
//! Simpson is exact for cubics, which covers every single field segment;
//! products of two fields reach degree six, where sampling is doubled
//! until successive estimates agree.

use crate::math::poly::PiecewisePoly;

/// Relative agreement required between successive adaptive estimates
const ADAPTIVE_TOL: f64 = 1e-10;

/// Hard cap on doubling rounds; polynomial integrands converge long before
const MAX_DOUBLINGS: usize = 24;

/// Composite Simpson with `n` samples (odd, ≥ 3) over [a, b]
pub fn simpson_composite<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, n: usize) -> f64 {
    debug_assert!(n >= 3 && n % 2 == 1);
    let h = (b - a) / ((n - 1) as f64);
    let mut sum = f(a) + f(b);
    for k in 1..n - 1 {
        let w = if k % 2 == 1 { 4.0 } else { 2.0 };
        sum += w * f(a + h * (k as f64));
    }
    sum * h / 3.0
}

/// Simpson with adaptive doubling until successive estimates agree
///
/// Returns `None` when the doubling cap is hit without convergence.
fn simpson_adaptive<F: Fn(f64) -> f64>(f: &F, a: f64, b: f64, base_n: usize) -> Option<f64> {
    let mut n = base_n;
    let mut prev = simpson_composite(f, a, b, n);
    for _ in 0..MAX_DOUBLINGS {
        n = 2 * n - 1;
        let next = simpson_composite(f, a, b, n);
        if (next - prev).abs() <= ADAPTIVE_TOL * next.abs().max(1.0) {
            return Some(next);
        }
        prev = next;
    }
    None
}

/// Integrate the product of two fields over their common domain
///
/// Sub-intervals are aligned with the union of both fields' breakpoints so
/// each integrand piece is a single polynomial. `base_n` is the base
/// sample count per sub-interval (odd, ≥ 5). Segments whose product
/// degree stays within Simpson's exactness use one pass; higher degrees
/// refine adaptively.
pub fn simpson_product(
    f: &PiecewisePoly,
    g: &PiecewisePoly,
    base_n: usize,
) -> Option<f64> {
    let breaks = f.merged_breaks(&g.breaks);
    let mut total = 0.0;
    for k in 0..breaks.len() - 1 {
        let (a, b) = (breaks[k], breaks[k + 1]);
        if b - a <= 0.0 {
            continue;
        }
        let mid = 0.5 * (a + b);
        let deg = segment_degree(f, mid) + segment_degree(g, mid);
        let integrand = |x: f64| f.value(x) * g.value(x);
        total += if deg <= 3 {
            simpson_composite(&integrand, a, b, base_n)
        } else {
            simpson_adaptive(&integrand, a, b, base_n)?
        };
    }
    Some(total)
}

fn segment_degree(f: &PiecewisePoly, x: f64) -> usize {
    let mut k = 0;
    while k + 1 < f.polys.len() && x >= f.breaks[k + 1] {
        k += 1;
    }
    f.polys[k].degree()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::poly::Poly;

    #[test]
    fn test_simpson_exact_for_cubic() {
        // ∫0^2 t³ dt = 4
        let f = |x: f64| x * x * x;
        assert!((simpson_composite(&f, 0.0, 2.0, 5) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_product_of_linears() {
        // f = t, g = 6 − t on [0, 6]: ∫ t(6−t) dt = 36
        let f = PiecewisePoly::new(vec![0.0, 6.0], vec![Poly::new(vec![0.0, 1.0])]);
        let g = PiecewisePoly::new(vec![0.0, 6.0], vec![Poly::new(vec![6.0, -1.0])]);
        let v = simpson_product(&f, &g, 21).unwrap();
        assert!((v - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_product_beyond_cubic_refines() {
        // Two cubics: degree-6 product, handled by adaptive doubling
        let f = PiecewisePoly::new(vec![0.0, 1.0], vec![Poly::new(vec![0.0, 0.0, 0.0, 1.0])]);
        let v = simpson_product(&f, &f, 5).unwrap();
        // ∫0^1 t^6 dt = 1/7
        assert!((v - 1.0 / 7.0).abs() < 1e-8);
    }

    #[test]
    fn test_misaligned_breakpoints() {
        // Jumpy g: alignment keeps each piece polynomial
        let f = PiecewisePoly::new(vec![0.0, 6.0], vec![Poly::constant(2.0)]);
        let g = PiecewisePoly::new(
            vec![0.0, 3.0, 6.0],
            vec![Poly::constant(1.0), Poly::constant(-1.0)],
        );
        let v = simpson_product(&f, &g, 5).unwrap();
        assert!(v.abs() < 1e-12);
    }
}
