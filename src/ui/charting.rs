/// Points for the CPS history chart: run number (1-based, oldest first) against CPS.
pub fn history_points<I: IntoIterator<Item = f64>>(scores: I) -> Vec<(f64, f64)> {
    scores
        .into_iter()
        .enumerate()
        .map(|(idx, cps)| ((idx + 1) as f64, cps))
        .collect()
}

/// Compute X (runs) and Y (CPS) bounds for the history chart
pub fn compute_chart_params(points: &[(f64, f64)]) -> (f64, f64) {
    let highest_cps = points.iter().map(|&(_, cps)| cps).fold(0.0, f64::max);

    let runs = match points.last() {
        Some(&(x, _)) => x.max(2.0),
        None => 2.0,
    };

    // leave some headroom above the best run
    (runs, (highest_cps + 1.0).ceil())
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
