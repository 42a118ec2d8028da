//! PNG snapshots of mean versus sweep value, one image per channel.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::Local;
use log::info;
use plotters::prelude::*;

use crate::{
    error::ChartError,
    record::{Record, RecordLayout},
    sweep::Direction,
};

const SIZE: (u32, u32) = (1024, 640);

/// Draw one chart per channel of `records` into `dir`.
///
/// Files are named `<title>_<channel>_<YYYYmmdd_HHMMSS>.png`, with characters other than ASCII
/// letters, digits, and `-` replaced by `_`. Forward points are drawn in blue, backward
/// points in red, each with standard deviation error bars. Records whose mean is not finite are
/// left out.
pub fn export_charts<'a>(
    records: impl IntoIterator<Item = &'a Record>,
    layout: &RecordLayout,
    dir: &Path,
    title: &str,
) -> Result<Vec<PathBuf>, ChartError> {
    fs::create_dir_all(dir)?;
    let records: Vec<&Record> = records.into_iter().collect();
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let x_desc = layout.setpoints.first().map_or("", String::as_str);
    let prefix = file_stem(title);

    let mut written = Vec::with_capacity(layout.channels.len());
    for (ch, name) in layout.channels.iter().enumerate() {
        let path = dir.join(format!("{prefix}_{}_{timestamp}.png", file_stem(name)));
        draw_channel(&path, &records, ch, &format!("{title}: {name}"), x_desc, name)?;
        info!("Chart saved to {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// (x, mean, std) of a channel for the points of one direction.
fn series(records: &[&Record], ch: usize, direction: Direction) -> Vec<(f64, f64, f64)> {
    records
        .iter()
        .filter(|r| r.direction == direction)
        .filter_map(|r| {
            let x = *r.setpoints.first()?;
            let reading = r.readings.get(ch)?;
            let std = if reading.std.is_finite() { reading.std } else { 0.0 };
            (x.is_finite() && reading.mean.is_finite()).then_some((x, reading.mean, std))
        })
        .collect()
}

/// Axis range covering `values`, padded by 5 %. Empty or degenerate ranges are widened.
fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (-1.0, 1.0);
    }
    let span = max - min;
    let pad = if span > 0.0 {
        0.05 * span
    } else if min != 0.0 {
        0.05 * min.abs()
    } else {
        1.0
    };
    (min - pad, max + pad)
}

fn draw_channel(
    path: &Path,
    records: &[&Record],
    ch: usize,
    caption: &str,
    x_desc: &str,
    y_desc: &str,
) -> Result<(), ChartError> {
    let drawing = |err: &dyn std::fmt::Display| ChartError::Drawing(err.to_string());

    let forward = series(records, ch, Direction::Forward);
    let backward = series(records, ch, Direction::Backward);
    let all = || forward.iter().chain(backward.iter());
    let x_range = axis_range(all().map(|p| p.0));
    let y_range = axis_range(all().flat_map(|p| [p.1 - p.2, p.1 + p.2]));

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| drawing(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, ("sans-serif", 22))
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)
        .map_err(|e| drawing(&e))?;
    chart
        .configure_mesh()
        .x_desc(x_desc)
        .y_desc(y_desc)
        .draw()
        .map_err(|e| drawing(&e))?;

    for (points, color) in [(&forward, BLUE), (&backward, RED)] {
        if points.is_empty() {
            continue;
        }
        chart
            .draw_series(LineSeries::new(points.iter().map(|p| (p.0, p.1)), &color))
            .map_err(|e| drawing(&e))?;
        chart
            .draw_series(points.iter().map(|&(x, mean, std)| {
                ErrorBar::new_vertical(x, mean - std, mean, mean + std, color.filled(), 6)
            }))
            .map_err(|e| drawing(&e))?;
    }

    root.present().map_err(|e| drawing(&e))?;
    Ok(())
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_range() {
        assert_eq!(axis_range([0.0, 10.0].into_iter()), (-0.5, 10.5));
        assert_eq!(axis_range(std::iter::empty()), (-1.0, 1.0));
        assert_eq!(axis_range([0.0].into_iter()), (-1.0, 1.0));
        assert_eq!(axis_range([2.0, 2.0].into_iter()), (1.9, 2.1));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("B2900_Voltage"), "B2900_Voltage");
        assert_eq!(file_stem("V (mV)"), "V__mV_");
    }
}
