use plotters::prelude::*;
use std::path::Path;

use crate::error::{AgentError, Result};

fn plot_error<E: std::fmt::Display>(e: E) -> AgentError {
    AgentError::Plot(e.to_string())
}

/// Draw one line per series into a PNG file at `path`.
pub fn plot_moving_average(
    series: &[Vec<f64>],
    colors: &[RGBColor],
    legends: &[&str],
    title: &str,
    path: &Path,
) -> Result<()> {
    if series.is_empty() || colors.is_empty() {
        return Err(AgentError::Plot("nothing to plot".to_string()));
    }
    let max_len: usize = series.iter().map(Vec::len).max().unwrap_or(0).max(2);
    let finite = || series.iter().flatten().copied().filter(|v| v.is_finite());
    let mut min_y: f64 = finite().fold(f64::INFINITY, f64::min);
    let mut max_y: f64 = finite().fold(f64::NEG_INFINITY, f64::max);
    if !min_y.is_finite() || !max_y.is_finite() {
        min_y = 0.0;
        max_y = 1.0;
    }
    if min_y == max_y {
        min_y -= 1.0;
        max_y += 1.0;
    }

    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 30))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0..max_len, min_y..max_y)
        .map_err(plot_error)?;
    chart.configure_mesh().draw().map_err(plot_error)?;

    for (i, values) in series.iter().enumerate() {
        let style = colors[i % colors.len()].stroke_width(2);
        let label = legends.get(i).copied().unwrap_or("");
        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(x, y)| (x, *y)),
                style,
            ))
            .map_err(plot_error)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;
    root.present().map_err(plot_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nothing_to_plot() {
        let result = plot_moving_average(&[], &[BLUE], &[], "empty", Path::new("unused.png"));
        assert!(matches!(result, Err(AgentError::Plot(_))));
    }

    #[test]
    fn test_plot_writes_png() {
        let path = std::env::temp_dir().join("box_pushing_qlearning_plot_test.png");
        let _ = std::fs::remove_file(&path);
        let rewards: Vec<f64> = (0..50).map(|x| x as f64 * 0.5 - 10.0).collect();
        let lengths: Vec<f64> = (0..40).map(|x| 40.0 - x as f64).collect();
        plot_moving_average(
            &[rewards, lengths],
            &[BLUE, RED],
            &["reward", "length"],
            "training",
            &path,
        )
        .unwrap();
        assert!(path.exists());
        std::fs::remove_file(&path).unwrap();
    }
}
