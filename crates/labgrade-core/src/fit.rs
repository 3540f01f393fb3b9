//! Curve fits: the logistic plasmolysis model and ordinary least squares.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::FitError;

/// Default evaluation budget for the logistic fit.
pub const DEFAULT_MAX_EVALUATIONS: usize = 5000;

const XTOL: f64 = 1e-10;
const LAMBDA_START: f64 = 1e-3;
const LAMBDA_MAX: f64 = 1e16;
/// How far outside the observed x range, as a fraction of the range, the
/// midpoint may fall.
const XMID_MARGIN: f64 = 0.5;
/// Share of the variance of y the curve must explain.
const MIN_EXPLAINED_VARIANCE: f64 = 0.5;

/// Fitted `y = 100 / (1 + exp(−(x − xmid)·scale))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SigmoidFit {
    pub xmid: f64,
    pub scale: f64,
    /// Cost-function evaluations spent, across retries.
    pub evaluations: usize,
}

impl SigmoidFit {
    pub fn predict(&self, x: f64) -> f64 {
        sigmoid(x, self.xmid, self.scale)
    }

    /// `ln((100 − percent) / percent) / scale + xmid`: the x at which the
    /// curve reaches `100 − percent`. Both coincide with `xmid` at 50.
    pub fn threshold_potential(&self, percent: f64) -> f64 {
        ((100.0 - percent) / percent).ln() / self.scale + self.xmid
    }
}

/// Logistic function that does not overflow for large |z|.
fn logistic(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

fn sigmoid(x: f64, xmid: f64, scale: f64) -> f64 {
    100.0 * logistic((x - xmid) * scale)
}

fn cost(points: &[(f64, f64)], p: &Vector2<f64>) -> f64 {
    points
        .iter()
        .map(|&(x, y)| {
            let r = y - sigmoid(x, p[0], p[1]);
            r * r
        })
        .sum()
}

/// Damped Gauss-Newton iterations on `(xmid, scale)`.
fn levenberg_marquardt(
    points: &[(f64, f64)],
    start: Vector2<f64>,
    budget: usize,
) -> Result<(Vector2<f64>, usize), FitError> {
    let mut p = start;
    let mut current = cost(points, &p);
    let mut evaluations = 1;
    let mut lambda = LAMBDA_START;

    if !current.is_finite() {
        return Err(FitError::Degenerate("non-finite residuals at start".into()));
    }

    loop {
        let mut jtj = Matrix2::<f64>::zeros();
        let mut jtr = Vector2::<f64>::zeros();
        for &(x, y) in points {
            let s = logistic((x - p[0]) * p[1]);
            let d = 100.0 * s * (1.0 - s);
            let j = Vector2::new(-p[1] * d, (x - p[0]) * d);
            jtj += j * j.transpose();
            jtr += j * (y - 100.0 * s);
        }

        loop {
            if evaluations >= budget {
                return Err(FitError::NoConvergence { evaluations });
            }

            let mut damped = jtj;
            for i in 0..2 {
                damped[(i, i)] += lambda * jtj[(i, i)].max(f64::EPSILON);
            }

            let Some(delta) = damped.lu().solve(&jtr) else {
                lambda *= 10.0;
                if lambda > LAMBDA_MAX {
                    return Ok((p, evaluations));
                }
                continue;
            };

            let candidate = p + delta;
            let next = cost(points, &candidate);
            evaluations += 1;

            if next.is_finite() && next < current {
                let small_step = delta.norm() <= XTOL * (XTOL + p.norm());
                p = candidate;
                current = next;
                lambda = (lambda / 10.0).max(f64::EPSILON);
                if small_step || current < 1e-24 {
                    return Ok((p, evaluations));
                }
                break;
            }

            lambda *= 10.0;
            if lambda > LAMBDA_MAX {
                // No damped step lowers the cost any more: we are at a minimum.
                return Ok((p, evaluations));
            }
        }
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

fn check_params(p: &Vector2<f64>) -> Result<(), FitError> {
    if !p[0].is_finite() || !p[1].is_finite() {
        return Err(FitError::Degenerate("non-finite parameters".into()));
    }
    if p[1].abs() < 1e-9 {
        return Err(FitError::Degenerate(format!("scale {:e} is effectively zero", p[1])));
    }
    Ok(())
}

/// A converged fit still has to describe the data: the midpoint near the
/// observed x range, and the curve better than the mean of y.
fn check_plausible(points: &[(f64, f64)], p: &Vector2<f64>) -> Result<(), FitError> {
    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    let margin = (hi - lo) * XMID_MARGIN;
    if p[0] < lo - margin || p[0] > hi + margin {
        return Err(FitError::Degenerate(format!(
            "midpoint {:.3} lies outside the data ({lo:.3} to {hi:.3})",
            p[0]
        )));
    }

    let mean = points.iter().map(|pt| pt.1).sum::<f64>() / points.len() as f64;
    let total: f64 = points.iter().map(|&(_, y)| (y - mean).powi(2)).sum();
    let residual = cost(points, p);
    if total == 0.0 || residual > (1.0 - MIN_EXPLAINED_VARIANCE) * total {
        return Err(FitError::Degenerate(
            "the curve does not explain the observations".into(),
        ));
    }
    Ok(())
}

/// Fit the logistic model to `(x, y)` pairs, y in percent.
///
/// Starts from `(median(x), 1)` and retries once from `(median(x), −1)`
/// when the first attempt fails.
pub fn fit_sigmoid(x: &[f64], y: &[f64], max_evaluations: usize) -> Result<SigmoidFit, FitError> {
    let points: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    if points.len() < 3 {
        return Err(FitError::TooFewPoints {
            needed: 3,
            got: points.len(),
        });
    }
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    if xs.iter().all(|v| *v == xs[0]) {
        return Err(FitError::ConstantInput);
    }

    let mid = median(&xs);
    let mut spent = 0;
    let mut last_err = None;
    for scale in [1.0, -1.0] {
        let attempt = levenberg_marquardt(&points, Vector2::new(mid, scale), max_evaluations)
            .and_then(|(p, evaluations)| {
                spent += evaluations;
                check_params(&p)?;
                check_plausible(&points, &p)?;
                Ok(p)
            });
        match attempt {
            Ok(p) => {
                tracing::debug!(xmid = p[0], scale = p[1], evaluations = spent, "sigmoid fit converged");
                return Ok(SigmoidFit {
                    xmid: p[0],
                    scale: p[1],
                    evaluations: spent,
                });
            }
            Err(e) => {
                if let FitError::NoConvergence { evaluations } = e {
                    spent += evaluations;
                }
                tracing::debug!(start_scale = scale, "sigmoid fit attempt failed: {e}");
                last_err = Some(e);
            }
        }
    }

    Err(match last_err {
        Some(FitError::NoConvergence { .. }) | None => FitError::NoConvergence { evaluations: spent },
        Some(other) => other,
    })
}

/// Ordinary least-squares line with Pearson correlation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_value: f64,
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Where the line crosses y = 0; undefined for a flat line.
    pub fn x_intercept(&self) -> Option<f64> {
        if self.slope == 0.0 {
            None
        } else {
            Some(-self.intercept / self.slope)
        }
    }
}

pub fn fit_linear(x: &[f64], y: &[f64]) -> Result<LinearFit, FitError> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Err(FitError::TooFewPoints { needed: 2, got: n });
    }
    let (x, y) = (&x[..n], &y[..n]);
    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let (mut sxx, mut syy, mut sxy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }
    if sxx == 0.0 {
        return Err(FitError::ConstantInput);
    }

    let slope = sxy / sxx;
    let r_value = if syy == 0.0 { 0.0 } else { sxy / (sxx * syy).sqrt() };
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        r_value,
    })
}
