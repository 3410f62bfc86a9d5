// src/render/svg.rs
// Inline SVG chart builders for the dashboard page.

use crate::dashboard::{Heatmap, Slice};
use crate::render::escape;
use std::f64::consts::PI;
use std::fmt::Write;

const WIDTH: f64 = 760.0;
const HEIGHT: f64 = 360.0;
const LEFT: f64 = 80.0;
const RIGHT: f64 = 30.0;
const TOP: f64 = 44.0;
const BOTTOM: f64 = 56.0;

/// Qualitative palette, cycled for pie slices and line series.
pub const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

/// One line of a line chart. Missing points break the line.
#[derive(Debug, Clone)]
pub struct Series<'a> {
    pub name: &'a str,
    pub color: &'a str,
    pub points: Vec<(i64, Option<f64>)>,
}

/// Count-style formatting: integers get thousands separators, everything
/// else one decimal.
pub fn fmt_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        let digits = format!("{}", v.abs() as i64);
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if v < 0.0 {
            out.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    } else {
        format!("{:.1}", v)
    }
}

fn open_svg(out: &mut String, width: f64, height: f64, title: &str) {
    let _ = writeln!(
        out,
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img">"##,
        w = width,
        h = height
    );
    let _ = writeln!(
        out,
        r##"<text x="{}" y="24" text-anchor="middle" font-size="15" font-weight="600" fill="#374151">{}</text>"##,
        width / 2.0,
        escape(title)
    );
}

/// Placeholder shown when a chart has nothing to draw.
pub fn empty_chart(title: &str) -> String {
    let mut out = String::new();
    open_svg(&mut out, WIDTH, 120.0, title);
    let _ = writeln!(
        out,
        r##"<text x="{}" y="72" text-anchor="middle" font-size="13" fill="#9ca3af">데이터 없음</text>"##,
        WIDTH / 2.0
    );
    out.push_str("</svg>\n");
    out
}

/// Year on the x axis, one or more series on the y axis.
pub fn line_chart(title: &str, x_label: &str, y_label: &str, series: &[Series<'_>]) -> String {
    let present: Vec<(i64, f64)> = series
        .iter()
        .flat_map(|s| s.points.iter().filter_map(|&(x, y)| y.map(|y| (x, y))))
        .collect();
    if present.is_empty() {
        return empty_chart(title);
    }

    let mut years: Vec<i64> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|&(x, _)| x))
        .collect();
    years.sort_unstable();
    years.dedup();
    let (x_min, x_max) = (years[0], years[years.len() - 1]);

    let y_lo = present.iter().map(|&(_, y)| y).fold(0.0_f64, f64::min);
    let mut y_hi = present.iter().map(|&(_, y)| y).fold(f64::MIN, f64::max);
    if y_hi <= y_lo {
        y_hi = y_lo + 1.0;
    } else {
        y_hi += (y_hi - y_lo) * 0.05;
    }

    let plot_w = WIDTH - LEFT - RIGHT;
    let plot_h = HEIGHT - TOP - BOTTOM;
    let sx = |x: i64| {
        if x_max == x_min {
            LEFT + plot_w / 2.0
        } else {
            // f64 span: any two i64 years can be far enough apart to overflow
            LEFT + (x as f64 - x_min as f64) / (x_max as f64 - x_min as f64) * plot_w
        }
    };
    let sy = |y: f64| TOP + plot_h - (y - y_lo) / (y_hi - y_lo) * plot_h;

    let mut out = String::new();
    open_svg(&mut out, WIDTH, HEIGHT, title);

    // grid + y ticks
    for i in 0..=5 {
        let v = y_lo + (y_hi - y_lo) * i as f64 / 5.0;
        let y = sy(v);
        let _ = writeln!(
            out,
            r##"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="#e5e7eb"/>"##,
            LEFT,
            y,
            WIDTH - RIGHT,
            y
        );
        let _ = writeln!(
            out,
            r##"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11" fill="#6b7280">{}</text>"##,
            LEFT - 6.0,
            y + 4.0,
            fmt_value(v.round())
        );
    }

    // x ticks
    let step = (years.len() + 11) / 12;
    for (i, &yr) in years.iter().enumerate() {
        if i % step.max(1) != 0 {
            continue;
        }
        let _ = writeln!(
            out,
            r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="11" fill="#6b7280">{}</text>"##,
            sx(yr),
            HEIGHT - BOTTOM + 18.0,
            yr
        );
    }

    // axes + labels
    let _ = writeln!(
        out,
        r##"<line x1="{l}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="#9ca3af"/><line x1="{l}" y1="{t}" x2="{l}" y2="{b:.1}" stroke="#9ca3af"/>"##,
        l = LEFT,
        r = WIDTH - RIGHT,
        t = TOP,
        b = HEIGHT - BOTTOM
    );
    let _ = writeln!(
        out,
        r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12" fill="#374151">{}</text>"##,
        LEFT + plot_w / 2.0,
        HEIGHT - 14.0,
        escape(x_label)
    );
    let _ = writeln!(
        out,
        r##"<text x="16" y="{c:.1}" text-anchor="middle" font-size="12" fill="#374151" transform="rotate(-90, 16, {c:.1})">{}</text>"##,
        escape(y_label),
        c = TOP + plot_h / 2.0
    );

    for s in series {
        let mut d = String::new();
        let mut pen_down = false;
        for &(x, y) in &s.points {
            match y {
                Some(y) => {
                    let cmd = if pen_down { 'L' } else { 'M' };
                    let _ = write!(d, "{}{:.1},{:.1} ", cmd, sx(x), sy(y));
                    pen_down = true;
                }
                None => pen_down = false,
            }
        }
        let _ = writeln!(
            out,
            r##"<path d="{}" fill="none" stroke="{}" stroke-width="2.5"/>"##,
            d.trim_end(),
            s.color
        );
        for &(x, y) in &s.points {
            if let Some(y) = y {
                let _ = writeln!(
                    out,
                    r##"<circle cx="{:.1}" cy="{:.1}" r="4" fill="{}"><title>{} {}: {}</title></circle>"##,
                    sx(x),
                    sy(y),
                    s.color,
                    escape(s.name),
                    x,
                    fmt_value(y)
                );
            }
        }
    }

    if series.len() > 1 {
        for (i, s) in series.iter().enumerate() {
            let y = TOP + 4.0 + i as f64 * 18.0;
            let _ = writeln!(
                out,
                r##"<rect x="{:.1}" y="{:.1}" width="12" height="12" fill="{}"/><text x="{:.1}" y="{:.1}" font-size="12" fill="#374151">{}</text>"##,
                WIDTH - RIGHT - 110.0,
                y,
                s.color,
                WIDTH - RIGHT - 92.0,
                y + 10.0,
                escape(s.name)
            );
        }
    }

    out.push_str("</svg>\n");
    out
}

/// Share of each slice; non-positive values are not drawn.
pub fn pie_chart(title: &str, slices: &[Slice]) -> String {
    let drawn: Vec<&Slice> = slices.iter().filter(|s| s.value > 0.0).collect();
    let total: f64 = drawn.iter().map(|s| s.value).sum();
    if drawn.is_empty() || total <= 0.0 {
        return empty_chart(title);
    }

    let (cx, cy, r) = (230.0, 200.0, 140.0);
    let mut out = String::new();
    open_svg(&mut out, WIDTH, HEIGHT + 40.0, title);

    if drawn.len() == 1 {
        let _ = writeln!(
            out,
            r##"<circle cx="{}" cy="{}" r="{}" fill="{}"><title>{}: {}</title></circle>"##,
            cx,
            cy,
            r,
            PALETTE[0],
            escape(&drawn[0].category),
            fmt_value(drawn[0].value)
        );
    } else {
        let mut angle = -PI / 2.0;
        for (i, s) in drawn.iter().enumerate() {
            let sweep = s.value / total * 2.0 * PI;
            let (x0, y0) = (cx + r * angle.cos(), cy + r * angle.sin());
            let end = angle + sweep;
            let (x1, y1) = (cx + r * end.cos(), cy + r * end.sin());
            let large = if sweep > PI { 1 } else { 0 };
            let _ = writeln!(
                out,
                r##"<path d="M{cx},{cy} L{:.2},{:.2} A{r},{r} 0 {} 1 {:.2},{:.2} Z" fill="{}" stroke="#ffffff"><title>{}: {}</title></path>"##,
                x0,
                y0,
                large,
                x1,
                y1,
                PALETTE[i % PALETTE.len()],
                escape(&s.category),
                fmt_value(s.value),
                cx = cx,
                cy = cy,
                r = r
            );
            angle = end;
        }
    }

    for (i, s) in drawn.iter().enumerate() {
        let y = 70.0 + i as f64 * 24.0;
        let _ = writeln!(
            out,
            r##"<rect x="420" y="{:.1}" width="14" height="14" fill="{}"/><text x="442" y="{:.1}" font-size="12" fill="#374151">{} ({:.1}%)</text>"##,
            y,
            PALETTE[i % PALETTE.len()],
            y + 11.0,
            escape(&s.category),
            s.value / total * 100.0
        );
    }

    out.push_str("</svg>\n");
    out
}

/// Blue → grey → red, `t` in `[0, 1]`.
pub fn coolwarm(t: f64) -> String {
    const STOPS: [(f64, f64, f64); 3] = [(59.0, 76.0, 192.0), (221.0, 221.0, 221.0), (180.0, 4.0, 38.0)];
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
    let (a, b, u) = if t < 0.5 {
        (STOPS[0], STOPS[1], t * 2.0)
    } else {
        (STOPS[1], STOPS[2], (t - 0.5) * 2.0)
    };
    let lerp = |p: f64, q: f64| (p + (q - p) * u).round() as u8;
    format!("#{:02x}{:02x}{:02x}", lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
}

/// Year rows × category columns. Missing cells are drawn without fill.
pub fn heatmap_chart(
    title: &str,
    x_label: &str,
    y_label: &str,
    legend_label: &str,
    heatmap: &Heatmap,
) -> String {
    if heatmap.years.is_empty() || heatmap.categories.is_empty() {
        return empty_chart(title);
    }

    let legend_w = 110.0;
    let bottom = 120.0;
    let width = WIDTH + 180.0;
    let height = (TOP + bottom + heatmap.years.len() as f64 * 28.0).max(HEIGHT);
    let plot_w = width - LEFT - legend_w;
    let plot_h = height - TOP - bottom;
    let cell_w = plot_w / heatmap.categories.len() as f64;
    let cell_h = plot_h / heatmap.years.len() as f64;
    let (lo, hi) = heatmap.value_range().unwrap_or((0.0, 1.0));
    let norm = |v: f64| if hi > lo { (v - lo) / (hi - lo) } else { 0.5 };

    let mut out = String::new();
    open_svg(&mut out, width, height, title);

    for (r, (year, row)) in heatmap.years.iter().zip(&heatmap.cells).enumerate() {
        let y = TOP + r as f64 * cell_h;
        let _ = writeln!(
            out,
            r##"<text x="{:.1}" y="{:.1}" text-anchor="end" font-size="11" fill="#374151">{}</text>"##,
            LEFT - 6.0,
            y + cell_h / 2.0 + 4.0,
            year
        );
        for (c, cell) in row.iter().enumerate() {
            let x = LEFT + c as f64 * cell_w;
            match cell {
                Some(v) => {
                    let _ = writeln!(
                        out,
                        r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}"><title>{} {}: {:.1}%</title></rect>"##,
                        x,
                        y,
                        cell_w,
                        cell_h,
                        coolwarm(norm(*v)),
                        year,
                        escape(&heatmap.categories[c]),
                        v
                    );
                }
                None => {
                    let _ = writeln!(
                        out,
                        r##"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="none" stroke="#f3f4f6"/>"##,
                        x, y, cell_w, cell_h
                    );
                }
            }
        }
    }

    let label_y = TOP + plot_h + 10.0;
    for (c, name) in heatmap.categories.iter().enumerate() {
        let x = LEFT + c as f64 * cell_w + cell_w / 2.0;
        let _ = writeln!(
            out,
            r##"<text x="{x:.1}" y="{y:.1}" text-anchor="end" font-size="11" fill="#374151" transform="rotate(-35, {x:.1}, {y:.1})">{}</text>"##,
            escape(name),
            x = x,
            y = label_y
        );
    }

    let _ = writeln!(
        out,
        r##"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="12" fill="#374151">{}</text>"##,
        LEFT + plot_w / 2.0,
        height - 10.0,
        escape(x_label)
    );
    let _ = writeln!(
        out,
        r##"<text x="16" y="{c:.1}" text-anchor="middle" font-size="12" fill="#374151" transform="rotate(-90, 16, {c:.1})">{}</text>"##,
        escape(y_label),
        c = TOP + plot_h / 2.0
    );

    // colour bar
    let bar_x = width - legend_w + 24.0;
    let _ = writeln!(
        out,
        r##"<defs><linearGradient id="coolwarm" x1="0" y1="1" x2="0" y2="0"><stop offset="0" stop-color="{}"/><stop offset="0.5" stop-color="{}"/><stop offset="1" stop-color="{}"/></linearGradient></defs>"##,
        coolwarm(0.0),
        coolwarm(0.5),
        coolwarm(1.0)
    );
    let _ = writeln!(
        out,
        r##"<rect x="{:.1}" y="{:.1}" width="16" height="{:.1}" fill="url(#coolwarm)"/>"##,
        bar_x, TOP, plot_h
    );
    let _ = writeln!(
        out,
        r##"<text x="{:.1}" y="{:.1}" font-size="11" fill="#374151">{:.1}</text><text x="{:.1}" y="{:.1}" font-size="11" fill="#374151">{:.1}</text>"##,
        bar_x + 20.0,
        TOP + 10.0,
        hi,
        bar_x + 20.0,
        TOP + plot_h,
        lo
    );
    let _ = writeln!(
        out,
        r##"<text x="{x:.1}" y="{c:.1}" text-anchor="middle" font-size="12" fill="#374151" transform="rotate(90, {x:.1}, {c:.1})">{}</text>"##,
        escape(legend_label),
        x = bar_x + 66.0,
        c = TOP + plot_h / 2.0
    );

    out.push_str("</svg>\n");
    out
}
