//! Curve fitting
//!
//! Fits one of five families to an attribute series by least squares and
//! scores the fit with the coefficient of determination:
//!
//! | family      | model              | fitted as                      |
//! |-------------|--------------------|--------------------------------|
//! | linear      | y = a + bx         | OLS                            |
//! | exponential | y = a·e^(bx)       | OLS of ln(y) on x              |
//! | polynomial  | y = a + bx + cx²   | 3×3 normal equations           |
//! | logarithmic | y = a + b·ln(x)    | OLS of y on ln(x)              |
//! | power       | y = a·x^b          | OLS of ln(y) on ln(x)          |
//!
//! Series fits use the 1-based position of each reading in the time-sorted
//! series as x, so logarithmic and power fits are always defined in x.
//! Readings whose value is absent are skipped without renumbering the rest.

use crate::config::RegressionConfig;
use crate::error::{AnalyticsError, Result};
use crate::reading::ReadingSeries;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Functional shape fitted to the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegressionFamily {
    Linear,
    Exponential,
    Polynomial,
    Logarithmic,
    Power,
}

impl RegressionFamily {
    /// Every family, in the order `fit_best` tries them.
    pub const ALL: [RegressionFamily; 5] = [
        RegressionFamily::Linear,
        RegressionFamily::Exponential,
        RegressionFamily::Polynomial,
        RegressionFamily::Logarithmic,
        RegressionFamily::Power,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RegressionFamily::Linear => "linear",
            RegressionFamily::Exponential => "exponential",
            RegressionFamily::Polynomial => "polynomial",
            RegressionFamily::Logarithmic => "logarithmic",
            RegressionFamily::Power => "power",
        }
    }

    /// Minimum number of points (with distinct x) the fit needs.
    pub fn min_points(&self) -> usize {
        match self {
            RegressionFamily::Polynomial => 3,
            _ => 2,
        }
    }
}

impl fmt::Display for RegressionFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegressionFamily {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(RegressionFamily::Linear),
            "exponential" => Ok(RegressionFamily::Exponential),
            "polynomial" | "quadratic" => Ok(RegressionFamily::Polynomial),
            "logarithmic" => Ok(RegressionFamily::Logarithmic),
            "power" => Ok(RegressionFamily::Power),
            other => Err(AnalyticsError::Config(format!(
                "unknown regression family: {}",
                other
            ))),
        }
    }
}

/// Interpretation band of R².
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitStrength {
    Strong,
    Moderate,
    Weak,
}

impl FitStrength {
    pub fn from_r_squared(r_squared: f64, bands: &RegressionConfig) -> Self {
        if r_squared > bands.strong_threshold {
            FitStrength::Strong
        } else if r_squared > bands.moderate_threshold {
            FitStrength::Moderate
        } else {
            FitStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FitStrength::Strong => "strong",
            FitStrength::Moderate => "moderate",
            FitStrength::Weak => "weak",
        }
    }
}

/// A fitted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub family: RegressionFamily,
    /// `[a, b]`, or `[a, b, c]` for the polynomial family.
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    /// Human-readable model, e.g. `y = 1.0000 + 2.0000x`.
    pub equation: String,
    /// Observed x values.
    pub x: Vec<f64>,
    /// Model evaluated at each observed x.
    pub predicted: Vec<f64>,
    pub strength: FitStrength,
    /// Family-specific reading of the strength band.
    pub interpretation: String,
}

impl RegressionResult {
    /// Evaluate the model at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        evaluate(self.family, &self.coefficients, x)
    }
}

/// Fit `family` to an attribute of a series.
pub fn fit(
    series: &ReadingSeries,
    attribute: &str,
    family: RegressionFamily,
    bands: &RegressionConfig,
) -> Result<RegressionResult> {
    fit_points(&series_points(series, attribute), family, bands)
}

/// Fit every family and keep the one with the highest R².
///
/// Families that cannot be fitted to this data are skipped; if none can be,
/// the error of the first family is returned.
pub fn fit_best(
    series: &ReadingSeries,
    attribute: &str,
    bands: &RegressionConfig,
) -> Result<RegressionResult> {
    let points = series_points(series, attribute);
    let mut best: Option<RegressionResult> = None;
    let mut first_err = None;

    for family in RegressionFamily::ALL {
        match fit_points(&points, family, bands) {
            Ok(result) => {
                if best.as_ref().map_or(true, |b| result.r_squared > b.r_squared) {
                    best = Some(result);
                }
            }
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }

    match (best, first_err) {
        (Some(result), _) => Ok(result),
        (None, Some(e)) => Err(e),
        (None, None) => Err(AnalyticsError::InsufficientData {
            required: 2,
            available: points.len(),
        }),
    }
}

/// `(position, value)` pairs with 1-based positions, absent values skipped.
pub fn series_points(series: &ReadingSeries, attribute: &str) -> Vec<(f64, f64)> {
    series
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.value(attribute).map(|v| ((i + 1) as f64, v)))
        .collect()
}

/// Fit `family` to explicit `(x, y)` points.
pub fn fit_points(
    points: &[(f64, f64)],
    family: RegressionFamily,
    bands: &RegressionConfig,
) -> Result<RegressionResult> {
    if points.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            required: 2,
            available: points.len(),
        });
    }
    if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(AnalyticsError::domain(family, "points must be finite"));
    }

    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();

    let needs_positive_x = matches!(
        family,
        RegressionFamily::Logarithmic | RegressionFamily::Power
    );
    let needs_positive_y = matches!(
        family,
        RegressionFamily::Exponential | RegressionFamily::Power
    );
    if needs_positive_x && xs.iter().any(|&x| x <= 0.0) {
        return Err(AnalyticsError::domain(family, "requires x > 0"));
    }
    if needs_positive_y && ys.iter().any(|&y| y <= 0.0) {
        return Err(AnalyticsError::domain(family, "requires y > 0"));
    }

    let coefficients = match family {
        RegressionFamily::Linear => {
            let (a, b) = ols(&xs, &ys).ok_or_else(|| constant_x(family))?;
            vec![a, b]
        }
        RegressionFamily::Exponential => {
            let ln_y: Vec<f64> = ys.iter().map(|y| y.ln()).collect();
            let (ln_a, b) = ols(&xs, &ln_y).ok_or_else(|| constant_x(family))?;
            vec![ln_a.exp(), b]
        }
        RegressionFamily::Logarithmic => {
            let ln_x: Vec<f64> = xs.iter().map(|x| x.ln()).collect();
            let (a, b) = ols(&ln_x, &ys).ok_or_else(|| constant_x(family))?;
            vec![a, b]
        }
        RegressionFamily::Power => {
            let ln_x: Vec<f64> = xs.iter().map(|x| x.ln()).collect();
            let ln_y: Vec<f64> = ys.iter().map(|y| y.ln()).collect();
            let (ln_a, b) = ols(&ln_x, &ln_y).ok_or_else(|| constant_x(family))?;
            vec![ln_a.exp(), b]
        }
        RegressionFamily::Polynomial => quadratic(&xs, &ys)?,
    };

    let predicted: Vec<f64> = xs
        .iter()
        .map(|&x| evaluate(family, &coefficients, x))
        .collect();
    let r_squared = r_squared(&ys, &predicted);
    let strength = FitStrength::from_r_squared(r_squared, bands);

    log_debug!(
        "{} fit over {} points: r2={:.4} ({})",
        family,
        xs.len(),
        r_squared,
        strength.as_str()
    );

    Ok(RegressionResult {
        family,
        equation: equation(family, &coefficients),
        interpretation: interpretation(family, strength, &coefficients),
        coefficients,
        r_squared,
        x: xs,
        predicted,
        strength,
    })
}

fn constant_x(family: RegressionFamily) -> AnalyticsError {
    AnalyticsError::domain(family, "x values have zero variance")
}

/// Ordinary least squares `y = a + bx`. `None` when x has no spread.
fn ols(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx <= f64::EPSILON * n * mean_x.abs().max(1.0) {
        return None;
    }

    let b = sxy / sxx;
    Some((mean_y - b * mean_x, b))
}

/// Quadratic least squares via the normal equations.
///
/// x is centered and scaled to [-1, 1] before solving and the coefficients
/// are mapped back, which keeps the 3×3 system well conditioned for long
/// series.
fn quadratic(xs: &[f64], ys: &[f64]) -> Result<Vec<f64>> {
    let family = RegressionFamily::Polynomial;

    let mut distinct = xs.to_vec();
    distinct.sort_by(f64::total_cmp);
    distinct.dedup();
    if xs.len() < 3 || distinct.len() < 3 {
        return Err(AnalyticsError::InsufficientData {
            required: 3,
            available: distinct.len(),
        });
    }

    let lo = distinct[0];
    let hi = distinct[distinct.len() - 1];
    let m = (lo + hi) / 2.0;
    let s = (hi - lo) / 2.0;

    let mut normal = Matrix3::<f64>::zeros();
    let mut rhs = Vector3::<f64>::zeros();
    for (&x, &y) in xs.iter().zip(ys) {
        let t = (x - m) / s;
        let row = Vector3::new(1.0, t, t * t);
        normal += row * row.transpose();
        rhs += row * y;
    }

    let sol = normal
        .lu()
        .solve(&rhs)
        .ok_or_else(|| AnalyticsError::domain(family, "normal equations are singular"))?;
    let (a1, b1, c1) = (sol[0], sol[1], sol[2]);

    // y = a1 + b1*t + c1*t^2 with t = (x - m) / s
    let c = c1 / (s * s);
    let b = b1 / s - 2.0 * c1 * m / (s * s);
    let a = a1 - b1 * m / s + c1 * m * m / (s * s);
    Ok(vec![a, b, c])
}

fn evaluate(family: RegressionFamily, c: &[f64], x: f64) -> f64 {
    match family {
        RegressionFamily::Linear => c[0] + c[1] * x,
        RegressionFamily::Exponential => c[0] * (c[1] * x).exp(),
        RegressionFamily::Polynomial => c[0] + c[1] * x + c[2] * x * x,
        RegressionFamily::Logarithmic => c[0] + c[1] * x.ln(),
        RegressionFamily::Power => c[0] * x.powf(c[1]),
    }
}

/// `1 - SS_res / SS_tot`. Flat data scores 1 when reproduced exactly, else 0.
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    let n = observed.len() as f64;
    let mean = observed.iter().sum::<f64>() / n;
    let ss_tot: f64 = observed.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = observed
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();

    if ss_tot == 0.0 {
        let scale = observed.iter().map(|y| y * y).sum::<f64>().max(1.0);
        return if ss_res <= 1e-12 * scale { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

fn signed(v: f64) -> String {
    if v < 0.0 {
        format!(" - {:.4}", -v)
    } else {
        format!(" + {:.4}", v)
    }
}

fn equation(family: RegressionFamily, c: &[f64]) -> String {
    match family {
        RegressionFamily::Linear => format!("y = {:.4}{}x", c[0], signed(c[1])),
        RegressionFamily::Exponential => format!("y = {:.4}e^({:.4}x)", c[0], c[1]),
        RegressionFamily::Polynomial => {
            format!("y = {:.4}{}x{}x²", c[0], signed(c[1]), signed(c[2]))
        }
        RegressionFamily::Logarithmic => format!("y = {:.4}{}·ln(x)", c[0], signed(c[1])),
        RegressionFamily::Power => format!("y = {:.4}·x^{:.4}", c[0], c[1]),
    }
}

fn interpretation(family: RegressionFamily, strength: FitStrength, c: &[f64]) -> String {
    let direction = if c[1] >= 0.0 { "rising" } else { "falling" };
    match (family, strength) {
        (RegressionFamily::Linear, FitStrength::Strong) => {
            format!("Strong linear relationship; values are steadily {}", direction)
        }
        (RegressionFamily::Linear, FitStrength::Moderate) => {
            "Moderate linear relationship".to_string()
        }
        (RegressionFamily::Linear, FitStrength::Weak) => {
            "Weak or no linear relationship".to_string()
        }
        (RegressionFamily::Exponential, FitStrength::Weak) => {
            "Weak or no exponential pattern".to_string()
        }
        (RegressionFamily::Exponential, s) => {
            let shape = if c[1] >= 0.0 { "growth" } else { "decay" };
            format!("{} exponential {}", capitalize(s.as_str()), shape)
        }
        (RegressionFamily::Polynomial, FitStrength::Weak) => {
            "Weak or no quadratic pattern".to_string()
        }
        (RegressionFamily::Polynomial, s) => {
            let shape = if c[2] >= 0.0 {
                "curving upward"
            } else {
                "curving downward"
            };
            format!("{} quadratic fit; values are {}", capitalize(s.as_str()), shape)
        }
        (RegressionFamily::Logarithmic, FitStrength::Weak) => {
            "Weak or no logarithmic pattern".to_string()
        }
        (RegressionFamily::Logarithmic, s) => format!(
            "{} logarithmic trend; change is {} and levelling off",
            capitalize(s.as_str()),
            direction
        ),
        (RegressionFamily::Power, FitStrength::Weak) => {
            "Weak or no power-law relationship".to_string()
        }
        (RegressionFamily::Power, s) => {
            format!("{} power-law relationship", capitalize(s.as_str()))
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
