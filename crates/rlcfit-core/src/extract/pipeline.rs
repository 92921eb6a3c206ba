//! End-to-end extraction
//!
//! Parse, reduce, fit, score, assemble. Parse and conversion failures
//! abort the run; a fit that merely fails to converge still produces a
//! record, flagged through its convergence status and score.

use std::path::Path;

use crate::error::ExtractError;
use crate::extract::config::Config;
use crate::extract::record::ExtractionRecord;
use crate::fit::{evaluate, fit, heuristic_guess, FitError, FitQuality, FitResult};
use crate::network::{convert, NetworkResponse, TwoPort};
use crate::touchstone::Touchstone;

/// Run the extraction pipeline on a Touchstone file
pub fn extract_file<P: AsRef<Path>>(
    path: P,
    config: &Config,
) -> Result<ExtractionRecord, ExtractError> {
    let path = path.as_ref();
    let touchstone = Touchstone::from_file(path)?;
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    run(&source, &touchstone, config)
}

/// Run the extraction pipeline on in-memory Touchstone content
///
/// # Arguments
/// * `source` - Label recorded in the output, standing in for a file name
/// * `content` - Touchstone v1 two-port text
/// * `config` - Run settings
pub fn extract_str(
    source: &str,
    content: &str,
    config: &Config,
) -> Result<ExtractionRecord, ExtractError> {
    let touchstone = Touchstone::from_str(content)?;
    run(source, &touchstone, config)
}

fn run(
    source: &str,
    touchstone: &Touchstone,
    config: &Config,
) -> Result<ExtractionRecord, ExtractError> {
    let net = TwoPort::from_touchstone(touchstone, config.reference_impedance);
    let response = convert(&net, config.reduction, config.frequency_band)?;

    let (f_start, f_stop) = response.freq_range();
    log::info!(
        "{}: fitting {} points over {:.4e}..{:.4e} Hz ({} dropped)",
        source,
        response.points().len(),
        f_start,
        f_stop,
        response.dropped()
    );

    let (result, quality) = best_fit(&response, config)?;

    log::info!(
        "{}: {} R={:?} L={:?} C={:?} gof={:.6}",
        source,
        result.topology,
        result.params.r,
        result.params.l,
        result.params.c,
        quality.goodness_of_fit
    );

    Ok(ExtractionRecord::assemble(
        source,
        &response,
        &result,
        &quality,
        config.save_curves,
    ))
}

/// Fit every candidate topology and keep the best-scoring result
///
/// Candidates that cannot be started (too few points, inadmissible guess)
/// are skipped; the error only propagates when no candidate could run.
fn best_fit(
    response: &NetworkResponse,
    config: &Config,
) -> Result<(FitResult, FitQuality), FitError> {
    let settings = config.fit_settings();
    let mut best: Option<(FitResult, FitQuality)> = None;
    let mut last_err: Option<FitError> = None;

    for topology in config.candidates() {
        let initial = config
            .initial_guess
            .unwrap_or_else(|| heuristic_guess(topology, response));

        match fit(response, topology, &initial, &settings) {
            Ok(result) => {
                let quality = evaluate(&result, response, config.gof_threshold);
                log::debug!(
                    "candidate {}: gof={:.6} rmse={:.4e} ({:?})",
                    topology,
                    quality.goodness_of_fit,
                    quality.rmse,
                    result.status
                );
                let better = best
                    .as_ref()
                    .map(|(_, q)| quality.goodness_of_fit > q.goodness_of_fit)
                    .unwrap_or(true);
                if better {
                    best = Some((result, quality));
                }
            }
            Err(e) => {
                log::warn!("candidate {} skipped: {}", topology, e);
                last_err = Some(e);
            }
        }
    }

    match (best, last_err) {
        (Some(found), _) => Ok(found),
        (None, Some(e)) => Err(e),
        // candidates() never yields an empty list
        (None, None) => unreachable!("no fit candidates"),
    }
}
