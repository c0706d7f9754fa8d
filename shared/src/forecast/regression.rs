//! Ordinary least squares for the degree-2 stock trend

use crate::models::PolynomialCoefficients;

/// Degree of the fitted polynomial
pub const DEGREE: usize = 2;

/// Number of coefficients, and the minimum number of points for a fit
pub const TERMS: usize = DEGREE + 1;

const PIVOT_EPSILON: f64 = 1e-10;

/// Fit `y = c0 + c1·x + c2·x²` by solving the normal equations `(XᵗX)β = XᵗY`
///
/// Returns `None` when there are fewer than [`TERMS`] points, when the inputs
/// differ in length, or when the system is singular or not finite.
pub fn fit_quadratic(xs: &[f64], ys: &[f64]) -> Option<PolynomialCoefficients> {
    if xs.len() != ys.len() || xs.len() < TERMS {
        return None;
    }

    let (mut xtx, mut xty) = normal_equations(xs, ys);
    let beta = gaussian_elimination(&mut xtx, &mut xty)?;

    let coefficients = PolynomialCoefficients {
        intercept: beta[0],
        linear: beta[1],
        quadratic: beta[2],
    };
    coefficients.is_finite().then_some(coefficients)
}

/// Accumulate `XᵗX` and `XᵗY` for design rows `[1, x, x²]`
fn normal_equations(xs: &[f64], ys: &[f64]) -> ([[f64; TERMS]; TERMS], [f64; TERMS]) {
    let mut xtx = [[0.0; TERMS]; TERMS];
    let mut xty = [0.0; TERMS];

    for (&x, &y) in xs.iter().zip(ys) {
        let row = [1.0, x, x * x];
        for i in 0..TERMS {
            for j in 0..TERMS {
                xtx[i][j] += row[i] * row[j];
            }
            xty[i] += row[i] * y;
        }
    }

    (xtx, xty)
}

/// Solve `a·x = b` in place with partial pivoting
pub fn gaussian_elimination(
    a: &mut [[f64; TERMS]; TERMS],
    b: &mut [f64; TERMS],
) -> Option<[f64; TERMS]> {
    for col in 0..TERMS {
        let pivot = (col..TERMS).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if !(a[pivot][col].abs() > PIVOT_EPSILON) {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in (col + 1)..TERMS {
            let factor = a[row][col] / a[col][col];
            for k in col..TERMS {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; TERMS];
    for i in (0..TERMS).rev() {
        let tail: f64 = ((i + 1)..TERMS).map(|j| a[i][j] * x[j]).sum();
        x[i] = (b[i] - tail) / a[i][i];
    }

    Some(x)
}

/// `1 - SS_res / SS_tot` on the unclamped curve, clamped to [0, 1]
///
/// A flat history (`SS_tot == 0`) scores 0.
pub fn r_squared(coefficients: &PolynomialCoefficients, xs: &[f64], ys: &[f64]) -> f64 {
    if ys.is_empty() || xs.len() != ys.len() {
        return 0.0;
    }

    let mean = ys.iter().sum::<f64>() / ys.len() as f64;
    let (ss_res, ss_tot) = xs
        .iter()
        .zip(ys)
        .fold((0.0, 0.0), |(res, tot), (&x, &y)| {
            let fitted = coefficients.evaluate(x);
            (res + (y - fitted).powi(2), tot + (y - mean).powi(2))
        });

    if ss_tot == 0.0 {
        return 0.0;
    }

    let score = 1.0 - ss_res / ss_tot;
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_exact_quadratic_recovered() {
        let xs: Vec<f64> = (0..8).map(f64::from).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 4.0 - 1.5 * x + 0.25 * x * x).collect();

        let c = fit_quadratic(&xs, &ys).unwrap();
        assert!(approx(c.intercept, 4.0));
        assert!(approx(c.linear, -1.5));
        assert!(approx(c.quadratic, 0.25));
        assert!(approx(r_squared(&c, &xs, &ys), 1.0));
    }

    #[test]
    fn test_three_points_interpolated() {
        let xs = [0.0, 1.0, 3.0];
        let ys = [100.0, 90.0, 85.0];

        let c = fit_quadratic(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys) {
            assert!(approx(c.evaluate(*x), y));
        }
    }

    #[test]
    fn test_too_few_points() {
        assert!(fit_quadratic(&[0.0, 1.0], &[1.0, 2.0]).is_none());
        assert!(fit_quadratic(&[0.0, 1.0, 2.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_singular_system() {
        // All observations on the same x
        assert!(fit_quadratic(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_gaussian_elimination_needs_pivoting() {
        let mut a = [[0.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]];
        let mut b = [5.0, 4.0, 3.0];

        let x = gaussian_elimination(&mut a, &mut b).unwrap();
        assert!(approx(x[0], 1.0));
        assert!(approx(x[1], 2.0));
        assert!(approx(x[2], 3.0));
    }

    #[test]
    fn test_flat_series_scores_zero() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [7.0; 4];
        let c = fit_quadratic(&xs, &ys).unwrap();
        assert_eq!(r_squared(&c, &xs, &ys), 0.0);
    }
}
