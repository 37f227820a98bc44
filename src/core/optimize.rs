//! Derivative-free minimisation used to estimate smoothing parameters.

#[derive(Debug, Clone, Copy)]
pub struct NelderMeadConfig {
    pub max_iterations: usize,
    /// Stop once the spread of objective values across the simplex drops below this.
    pub tolerance: f64,
    pub reflection: f64,
    pub expansion: f64,
    pub contraction: f64,
    pub shrink: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iterations: 2000,
            tolerance: 1e-10,
            reflection: 1.0,
            expansion: 2.0,
            contraction: 0.5,
            shrink: 0.5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: usize,
    pub converged: bool,
}

/// Minimises `objective` starting from `initial`, with `steps[i]` as the
/// initial simplex edge along dimension `i`.
///
/// Non-finite objective values are treated as `+inf` so the simplex moves
/// away from them.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    steps: &[f64],
    config: &NelderMeadConfig,
) -> NelderMeadResult
where
    F: Fn(&[f64]) -> f64,
{
    let n = initial.len();
    let eval = |x: &[f64]| {
        let v = objective(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    };

    let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    simplex.push(initial.to_vec());
    for i in 0..n {
        let mut vertex = initial.to_vec();
        vertex[i] += steps.get(i).copied().unwrap_or(0.1);
        simplex.push(vertex);
    }
    let mut values: Vec<f64> = simplex.iter().map(|v| eval(v)).collect();

    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;

        // 依目標值排序頂點
        let mut order: Vec<usize> = (0..=n).collect();
        order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
        simplex = order.iter().map(|&i| simplex[i].clone()).collect();
        values = order.iter().map(|&i| values[i]).collect();

        let best = values[0];
        let worst = values[n];
        if worst.is_finite() && (worst - best).abs() <= config.tolerance * (1.0 + best.abs()) {
            converged = true;
            break;
        }

        let centroid: Vec<f64> = (0..n)
            .map(|d| simplex[..n].iter().map(|v| v[d]).sum::<f64>() / n as f64)
            .collect();
        let towards = |coef: f64| -> Vec<f64> {
            (0..n)
                .map(|d| centroid[d] + coef * (simplex[n][d] - centroid[d]))
                .collect()
        };

        let reflected = towards(-config.reflection);
        let reflected_value = eval(&reflected);

        if reflected_value < values[0] {
            let expanded = towards(-config.reflection * config.expansion);
            let expanded_value = eval(&expanded);
            if expanded_value < reflected_value {
                simplex[n] = expanded;
                values[n] = expanded_value;
            } else {
                simplex[n] = reflected;
                values[n] = reflected_value;
            }
            continue;
        }

        if reflected_value < values[n - 1] {
            simplex[n] = reflected;
            values[n] = reflected_value;
            continue;
        }

        let (contracted, contracted_value) = if reflected_value < values[n] {
            let outside = towards(-config.reflection * config.contraction);
            let value = eval(&outside);
            (outside, value)
        } else {
            let inside = towards(config.contraction);
            let value = eval(&inside);
            (inside, value)
        };

        if contracted_value < values[n].min(reflected_value) {
            simplex[n] = contracted;
            values[n] = contracted_value;
            continue;
        }

        let anchor = simplex[0].clone();
        for i in 1..=n {
            for d in 0..n {
                simplex[i][d] = anchor[d] + config.shrink * (simplex[i][d] - anchor[d]);
            }
            values[i] = eval(&simplex[i]);
        }
    }

    let best_idx = (0..=n)
        .min_by(|&a, &b| values[a].total_cmp(&values[b]))
        .unwrap_or(0);

    NelderMeadResult {
        point: simplex[best_idx].clone(),
        value: values[best_idx],
        iterations,
        converged,
    }
}
