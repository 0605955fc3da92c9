//! Derivative-free Nelder–Mead minimizer.
//!
//! Standard coefficients: reflection 1, expansion 2, contraction ½,
//! shrink ½. The search stops when both the simplex diameter (largest
//! coordinate distance from the best vertex) and the spread of objective
//! values fall under their tolerances, or when the iteration cap is hit.
//!
//! NaN objective values are treated as `+∞`, so a trial point that cannot be
//! evaluated is always rejected in favour of any finite one.

#[cfg(test)]
#[path = "simplex_test.rs"]
mod simplex_test;

use tracing::trace;

const REFLECT: f64 = 1.0;
const EXPAND: f64 = 2.0;
const CONTRACT: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Relative step used for a non-zero start coordinate with no explicit step.
const NONZERO_STEP: f64 = 0.05;
/// Absolute step used for a zero start coordinate with no explicit step.
const ZERO_STEP: f64 = 0.000_25;

#[derive(Debug, Clone, PartialEq)]
pub struct NelderMead {
    pub max_iterations: usize,
    /// Convergence threshold on vertex coordinates.
    pub xatol: f64,
    /// Convergence threshold on objective values.
    pub fatol: f64,
    /// Initial simplex edge per coordinate. Missing entries are derived from
    /// the start point.
    pub initial_step: Vec<f64>,
}

impl Default for NelderMead {
    fn default() -> Self {
        Self { max_iterations: 2000, xatol: 1e-6, fatol: 1e-9, initial_step: Vec::new() }
    }
}

/// Outcome of a minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    pub x: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub evaluations: usize,
    /// Whether the tolerances were met before the iteration cap.
    pub converged: bool,
}

struct Vertex {
    x: Vec<f64>,
    f: f64,
}

impl NelderMead {
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_initial_step(mut self, step: Vec<f64>) -> Self {
        self.initial_step = step;
        self
    }

    fn step(&self, i: usize, x0: f64) -> f64 {
        match self.initial_step.get(i) {
            Some(&s) if s != 0.0 => s,
            _ if x0 != 0.0 => NONZERO_STEP * x0,
            _ => ZERO_STEP,
        }
    }

    /// Minimize `objective` starting from `x0`.
    pub fn minimize<F>(&self, mut objective: F, x0: &[f64]) -> Minimum
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = x0.len();
        let mut evaluations = 0_usize;
        let mut eval = |x: &[f64]| {
            evaluations += 1;
            let v = objective(x);
            if v.is_nan() { f64::INFINITY } else { v }
        };

        let mut simplex: Vec<Vertex> = Vec::with_capacity(n + 1);
        simplex.push(Vertex { x: x0.to_vec(), f: eval(x0) });
        for i in 0..n {
            let mut x = x0.to_vec();
            x[i] += self.step(i, x0[i]);
            let f = eval(&x);
            simplex.push(Vertex { x, f });
        }

        let mut iterations = 0;
        let mut converged = n == 0;

        while !converged && iterations < self.max_iterations {
            simplex.sort_by(|a, b| a.f.total_cmp(&b.f));
            if self.has_converged(&simplex) {
                converged = true;
                break;
            }
            iterations += 1;

            let centroid = centroid(&simplex[..n]);
            let worst_f = simplex[n].f;
            let second_worst_f = simplex[n - 1].f;
            let best_f = simplex[0].f;

            let reflected = along(&centroid, &simplex[n].x, -REFLECT);
            let fr = eval(&reflected);

            if fr < best_f {
                let expanded = along(&centroid, &reflected, EXPAND);
                let fe = eval(&expanded);
                simplex[n] = if fe < fr { Vertex { x: expanded, f: fe } } else { Vertex { x: reflected, f: fr } };
                continue;
            }
            if fr < second_worst_f {
                simplex[n] = Vertex { x: reflected, f: fr };
                continue;
            }

            let (contracted, fc, accept) = if fr < worst_f {
                let x = along(&centroid, &reflected, CONTRACT);
                let f = eval(&x);
                (x, f, f <= fr)
            } else {
                let x = along(&centroid, &simplex[n].x, CONTRACT);
                let f = eval(&x);
                (x, f, f < worst_f)
            };
            if accept {
                simplex[n] = Vertex { x: contracted, f: fc };
                continue;
            }

            let best = simplex[0].x.clone();
            for vertex in simplex.iter_mut().skip(1) {
                vertex.x = along(&best, &vertex.x, SHRINK);
                vertex.f = eval(&vertex.x);
            }
        }

        simplex.sort_by(|a, b| a.f.total_cmp(&b.f));
        let best = simplex.swap_remove(0);
        trace!(iterations, evaluations, converged, value = best.f, "simplex: finished");
        Minimum { x: best.x, value: best.f, iterations, evaluations, converged }
    }

    fn has_converged(&self, sorted: &[Vertex]) -> bool {
        let best = &sorted[0];
        let rest = &sorted[1..];
        let x_spread = rest
            .iter()
            .flat_map(|v| v.x.iter().zip(&best.x).map(|(a, b)| (a - b).abs()))
            .fold(0.0_f64, f64::max);
        let f_spread = rest.iter().map(|v| (v.f - best.f).abs()).fold(0.0_f64, f64::max);
        x_spread <= self.xatol && f_spread <= self.fatol
    }
}

#[allow(clippy::cast_precision_loss)]
fn centroid(vertices: &[Vertex]) -> Vec<f64> {
    let dim = vertices.first().map_or(0, |v| v.x.len());
    let mut c = vec![0.0; dim];
    for v in vertices {
        for (ci, xi) in c.iter_mut().zip(&v.x) {
            *ci += xi;
        }
    }
    let count = vertices.len().max(1) as f64;
    c.iter_mut().for_each(|ci| *ci /= count);
    c
}

/// `origin + t · (target − origin)`.
fn along(origin: &[f64], target: &[f64], t: f64) -> Vec<f64> {
    origin.iter().zip(target).map(|(o, p)| o + t * (p - o)).collect()
}
