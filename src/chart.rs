//! Grade distribution rendering: a terminal bar chart and a standalone SVG
//! area chart.

use crate::grading::Boundaries;
use crate::summary::GradeCount;

const BAR_WIDTH: usize = 40;

const SVG_WIDTH: f64 = 640.0;
const SVG_HEIGHT: f64 = 300.0;
const MARGIN: f64 = 40.0;

/// Renders one line per grade, bars scaled to the largest count.
pub fn render_bars(distribution: &[GradeCount]) -> String {
    let max = distribution.iter().map(|c| c.count).max().unwrap_or(0);
    let mut out = String::new();

    for entry in distribution {
        let len = if max == 0 {
            0
        } else {
            (entry.count * BAR_WIDTH).div_ceil(max)
        };
        out.push_str(&format!(
            "{:>2} | {} {}\n",
            entry.grade.as_str(),
            "#".repeat(len),
            entry.count
        ));
    }

    out
}

/// Renders the boundary cut-offs as a two-column table.
pub fn render_boundaries(boundaries: &Boundaries) -> String {
    let mut out = String::from("Grade  Min Marks\n");
    for (grade, min) in boundaries.cutoffs() {
        out.push_str(&format!("{:<6} {:>9.2}\n", grade.as_str(), min));
    }
    out
}

/// Renders the distribution as a filled area chart, grades along the x axis.
pub fn render_svg(distribution: &[GradeCount]) -> String {
    let max = distribution.iter().map(|c| c.count).max().unwrap_or(0).max(1) as f64;
    let plot_w = SVG_WIDTH - 2.0 * MARGIN;
    let plot_h = SVG_HEIGHT - 2.0 * MARGIN;
    let baseline = SVG_HEIGHT - MARGIN;

    let step = if distribution.len() > 1 {
        plot_w / (distribution.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<(f64, f64)> = distribution
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let x = if distribution.len() > 1 {
                MARGIN + step * i as f64
            } else {
                SVG_WIDTH / 2.0
            };
            (x, baseline - plot_h * c.count as f64 / max)
        })
        .collect();

    let mut lines = vec![
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{SVG_WIDTH}" height="{SVG_HEIGHT}" viewBox="0 0 {SVG_WIDTH} {SVG_HEIGHT}">"#
        ),
        format!(
            r#"  <text x="{MARGIN}" y="20" font-family="sans-serif" font-size="14">Grade Distribution</text>"#
        ),
        format!(
            r##"  <line x1="{MARGIN}" y1="{baseline}" x2="{}" y2="{baseline}" stroke="#333"/>"##,
            SVG_WIDTH - MARGIN
        ),
    ];

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        let mut area = format!("M {:.1} {:.1}", first.0, baseline);
        let mut line = String::new();
        for (i, (x, y)) in points.iter().enumerate() {
            area.push_str(&format!(" L {x:.1} {y:.1}"));
            line.push_str(&format!("{} {x:.1} {y:.1}", if i == 0 { "M" } else { " L" }));
        }
        area.push_str(&format!(" L {:.1} {:.1} Z", last.0, baseline));

        lines.push(format!(
            r#"  <path d="{area}" fill="teal" fill-opacity="0.6"/>"#
        ));
        lines.push(format!(
            r#"  <path d="{line}" fill="none" stroke="teal" stroke-width="2"/>"#
        ));
    }

    for ((x, y), entry) in points.iter().zip(distribution) {
        lines.push(format!(
            r#"  <text x="{x:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="12">{}</text>"#,
            baseline + 18.0,
            escape_xml(entry.grade.as_str())
        ));
        lines.push(format!(
            r#"  <text x="{x:.1}" y="{:.1}" text-anchor="middle" font-family="sans-serif" font-size="11">{}</text>"#,
            y - 6.0,
            entry.count
        ));
    }

    lines.push("</svg>".to_string());
    let mut svg = lines.join("\n");
    svg.push('\n');
    svg
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
