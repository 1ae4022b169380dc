use std::error::Error;
use std::time::Instant;

use tracing::{error, info, warn};

use backprop::gradient_check::check_gradient;
use backprop::linear_algebra::Value;
use backprop::loss::classification_errors;

use crate::args::{CheckConfig, EvaluateConfig};
use crate::problem::Problem;

/// Returns whether the gradient was within tolerance.
pub fn run_check(config: CheckConfig) -> bool {
    match check(&config) {
        Ok(passed) => passed,
        Err(err) => {
            error!(error = %err, "Gradient check failed to run.");
            false
        }
    }
}

fn check(config: &CheckConfig) -> Result<bool, Box<dyn Error>> {
    let problem = Problem::from_setup(&config.setup)?;

    let start_time = Instant::now();
    let check = check_gradient(
        &problem.network,
        &problem.parameters,
        &problem.manifest,
        &problem.inputs,
        &problem.targets,
        config.epsilon,
    )?;
    let elapsed = start_time.elapsed().as_secs_f32();

    let (worst, _) = check
        .analytic
        .iter()
        .zip(&check.numeric)
        .enumerate()
        .fold((0, 0.0), |(worst, max): (usize, Value), (i, (a, n))| {
            let difference = (a - n).abs();
            if difference > max {
                (i, difference)
            } else {
                (worst, max)
            }
        });

    info!(
        cost = check.cost,
        max_relative_error = check.max_relative_error,
        tolerance = config.tolerance,
        "Checked {} parameters in {elapsed:.2}s.",
        check.analytic.len()
    );

    if check.max_relative_error <= config.tolerance {
        info!("Gradient check passed.");
        Ok(true)
    } else {
        warn!(
            parameter = worst,
            analytic = check.analytic[worst],
            numeric = check.numeric[worst],
            "Gradient check failed."
        );
        Ok(false)
    }
}

pub fn run_evaluate(config: EvaluateConfig) -> bool {
    match evaluate(&config) {
        Ok(()) => true,
        Err(err) => {
            error!(error = %err, "Evaluation failed.");
            false
        }
    }
}

fn evaluate(config: &EvaluateConfig) -> Result<(), Box<dyn Error>> {
    let problem = Problem::from_setup(&config.setup)?;

    let start_time = Instant::now();
    let (cost, gradient) = problem.network.cost_gradient(
        &problem.parameters,
        &problem.manifest,
        &problem.inputs,
        &problem.targets,
    )?;
    let elapsed = start_time.elapsed().as_secs_f32();

    let gradient_norm = gradient.iter().map(|g| g * g).sum::<Value>().sqrt();

    let probabilities = problem
        .network
        .predict(&problem.parameters, &problem.manifest, &problem.inputs)?;
    let errors = classification_errors(&probabilities, &problem.targets)?;

    info!(
        cost,
        gradient_norm,
        errors,
        samples = problem.inputs.rows(),
        "Evaluated in {elapsed:.4}s."
    );

    Ok(())
}
