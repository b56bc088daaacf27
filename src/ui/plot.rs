use std::f64::consts::TAU;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::{generate_palette, ColorMap};
use crate::data::aggregate::ChartData;
use crate::data::model::format_number;

const CHART_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// The six distribution charts (central panel)
// ---------------------------------------------------------------------------

/// Render all charts in a two-column grid.
pub fn charts(ui: &mut Ui, data: &ChartData, blood_colors: &ColorMap, hair_colors: &ColorMap) {
    ui.columns(2, |cols| {
        cols[0].strong("Age distribution");
        age_histogram(&mut cols[0], data);
        cols[1].strong("Blood type distribution");
        blood_type_pie(&mut cols[1], data, blood_colors);
    });
    ui.columns(2, |cols| {
        cols[0].strong("Height vs weight");
        height_weight_scatter(&mut cols[0], data);
        cols[1].strong("Hair color distribution");
        category_bars(&mut cols[1], "hair_colors", &data.hair_color_counts, |label| {
            hair_colors.color_for(label)
        });
    });
    ui.columns(2, |cols| {
        cols[0].strong("Shoe size distribution");
        shoe_size_line(&mut cols[0], data);
        cols[1].strong("Top 10 neighborhoods");
        let palette = generate_palette(data.top_neighborhoods.len());
        category_bars(&mut cols[1], "neighborhoods", &data.top_neighborhoods, |label| {
            data.top_neighborhoods
                .iter()
                .position(|(l, _)| l == label)
                .and_then(|i| palette.get(i).copied())
                .unwrap_or(Color32::LIGHT_BLUE)
        });
    });
}

fn age_histogram(ui: &mut Ui, data: &ChartData) {
    let bars: Vec<Bar> = data
        .age_histogram
        .iter()
        .map(|bin| {
            Bar::new((bin.start + bin.end) / 2.0, bin.count as f64)
                .width(bin.end - bin.start)
                .name(format!("{:.1} – {:.1}", bin.start, bin.end))
        })
        .collect();

    Plot::new("age_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Age")
        .y_axis_label("Students")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE).name("Age"));
        });
}

/// Pie chart drawn from one filled polygon per slice.
fn blood_type_pie(ui: &mut Ui, data: &ChartData, colors: &ColorMap) {
    const STEPS_PER_TURN: f64 = 96.0;

    Plot::new("blood_type_pie")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            let mut start = 0.0;
            for share in &data.blood_type_shares {
                let sweep = TAU * share.percent / 100.0;
                let steps = ((sweep / TAU) * STEPS_PER_TURN).ceil().max(1.0) as usize;
                let mut points = vec![[0.0, 0.0]];
                points.extend((0..=steps).map(|s| {
                    let angle = start + sweep * s as f64 / steps as f64;
                    [angle.cos(), angle.sin()]
                }));
                start += sweep;

                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(points))
                        .fill_color(colors.color_for(&share.label))
                        .name(format!("{} ({:.1}%)", share.label, share.percent)),
                );
            }
        });
}

fn height_weight_scatter(ui: &mut Ui, data: &ChartData) {
    Plot::new("height_weight")
        .height(CHART_HEIGHT)
        .x_axis_label("Height (cm)")
        .y_axis_label("Weight (kg)")
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(data.height_weight.clone()))
                    .radius(3.0)
                    .color(Color32::LIGHT_BLUE)
                    .name("Students"),
            );
        });
}

/// One bar per category, each its own series so the legend names it.
fn category_bars(
    ui: &mut Ui,
    id: &str,
    counts: &[(String, usize)],
    color_for: impl Fn(&str) -> Color32,
) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Students")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, (label, count)) in counts.iter().enumerate() {
                let bar = Bar::new(i as f64, *count as f64).width(0.7).name(label);
                plot_ui.bar_chart(BarChart::new(vec![bar]).color(color_for(label)).name(label));
            }
        });
}

fn shoe_size_line(ui: &mut Ui, data: &ChartData) {
    let points: Vec<[f64; 2]> = data
        .shoe_size_counts
        .iter()
        .map(|&(size, count)| [size, count as f64])
        .collect();

    Plot::new("shoe_sizes")
        .height(CHART_HEIGHT)
        .x_axis_label("Shoe size")
        .y_axis_label("Students")
        .label_formatter(|_name, point| {
            format!("size {}: {}", format_number(point.x), format_number(point.y))
        })
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(points.clone())).width(1.5).name("Sizes"));
            plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.0));
        });
}
