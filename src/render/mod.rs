// src/render/mod.rs
pub mod svg;

use crate::dashboard::Dashboard;
use anyhow::Result;
use chrono::NaiveDateTime;
use std::fmt::Write as FmtWrite;
use svg::{heatmap_chart, line_chart, pie_chart, Series, PALETTE};
use tracing::debug;

/// Escape text for HTML/SVG element content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const SCRIPT: &str = r#"function show(group, key) {
  document.querySelectorAll('[data-group="' + group + '"]').forEach(function (el) {
    el.hidden = el.getAttribute('data-key') !== key;
  });
}"#;

/// Render the whole dashboard as a self-contained HTML page.
///
/// Every year's breakdown and every category's trend are rendered up front;
/// the two selects only toggle which one is visible.
#[tracing::instrument(level = "info", skip_all)]
pub fn render_html(d: &Dashboard, generated_at: NaiveDateTime) -> Result<String> {
    let mut html = String::with_capacity(64 * 1024);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"ko\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(
        html,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\"/>"
    )?;
    writeln!(html, "<title>{}</title>", escape(&d.title))?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:'Noto Sans KR',Arial,sans-serif;margin:0;color:#222;background:#fff;display:flex;}}"
    )?;
    writeln!(
        html,
        "aside{{width:220px;padding:20px;background:#f6f7f9;min-height:100vh;box-sizing:border-box;}}"
    )?;
    writeln!(html, "main{{flex:1;padding:20px 32px;}}")?;
    writeln!(html, "h1{{margin:0 0 12px 0;font-size:26px;}}")?;
    writeln!(html, "h2{{margin:28px 0 8px 0;font-size:20px;}}")?;
    writeln!(html, "label{{display:block;margin:14px 0 4px 0;font-size:13px;}}")?;
    writeln!(html, "select{{width:100%;padding:4px;}}")?;
    writeln!(html, ".info{{background:#e8f1fb;padding:10px 14px;border-radius:6px;}}")?;
    writeln!(html, ".meta{{color:#777;font-size:12px;margin-top:32px;}}")?;
    writeln!(html, "svg{{max-width:100%;height:auto;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "<script>{}</script>", SCRIPT)?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;

    write_sidebar(&mut html, d)?;

    writeln!(html, "<main>")?;
    writeln!(html, "<h1>💻 {}</h1>", escape(&d.title))?;

    if d.years.is_empty() {
        writeln!(
            html,
            "<p class=\"info\">표시할 발생건수 데이터가 없습니다. '연도'/'구분' 열과 '발생건수'/'검거건수' 행을 확인하세요.</p>"
        )?;
    }

    // 1) 연도별 전체 추세
    writeln!(html, "<section id=\"trend\">")?;
    writeln!(html, "<h2>📈 연도별 전체 사이버 범죄 발생 추세</h2>")?;
    let total = Series {
        name: "발생건수합계",
        color: PALETTE[0],
        points: d.trend.iter().map(|p| (p.year, Some(p.total))).collect(),
    };
    html.push_str(&line_chart(
        "연도별 전체 사이버 범죄 발생 건수 추세",
        "연도",
        "발생건수합계",
        &[total],
    ));
    writeln!(html, "</section>")?;

    // 2) 범주별 비중
    writeln!(html, "<section id=\"breakdown\">")?;
    for &year in &d.years {
        writeln!(
            html,
            "<div data-group=\"year\" data-key=\"{}\"{}>",
            year,
            hidden_unless(d.selection.year == Some(year))
        )?;
        writeln!(html, "<h2>🥧 {}년 범주별 비중 (Top {})</h2>", year, d.top_n)?;
        html.push_str(&pie_chart(
            &format!("{}년 사이버 범죄 발생 비중 (Top {})", year, d.top_n),
            d.breakdown(year),
        ));
        writeln!(html, "</div>")?;
    }
    writeln!(html, "</section>")?;

    // 3) 검거율 히트맵
    writeln!(html, "<section id=\"heatmap\">")?;
    writeln!(html, "<h2>🔍 발생 대비 검거율 (히트맵)</h2>")?;
    html.push_str(&heatmap_chart(
        "연도별 범죄 유형별 검거율(%)",
        "범죄 유형",
        "연도",
        "검거율(%)",
        &d.heatmap,
    ));
    writeln!(html, "</section>")?;

    // 4) 특정 범주 추세
    writeln!(html, "<section id=\"category\">")?;
    for (idx, (category, points)) in d.comparisons.iter().enumerate() {
        writeln!(
            html,
            "<div data-group=\"category\" data-key=\"{}\"{}>",
            idx,
            hidden_unless(d.selection.category.as_deref() == Some(category.as_str()))
        )?;
        writeln!(html, "<h2>📊 '{}' 연도별 발생/검거 추세</h2>", escape(category))?;
        let series = [
            Series {
                name: "발생건수",
                color: PALETTE[0],
                points: points.iter().map(|p| (p.year, p.occurrences)).collect(),
            },
            Series {
                name: "검거건수",
                color: PALETTE[1],
                points: points.iter().map(|p| (p.year, p.arrests)).collect(),
            },
        ];
        html.push_str(&line_chart(
            &format!("{} 발생 vs 검거 추세", category),
            "연도",
            "건수",
            &series,
        ));
        writeln!(html, "</div>")?;
    }
    writeln!(html, "</section>")?;

    writeln!(
        html,
        "<p class=\"meta\">생성 시각 {}</p>",
        generated_at.format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(html, "</main>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;

    debug!(bytes = html.len(), "rendered page");
    Ok(html)
}

fn hidden_unless(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        " hidden"
    }
}

fn write_sidebar(html: &mut String, d: &Dashboard) -> Result<()> {
    writeln!(html, "<aside>")?;
    writeln!(html, "<h3>⚙️ 설정</h3>")?;

    writeln!(html, "<label for=\"year-select\">연도 선택</label>")?;
    writeln!(
        html,
        "<select id=\"year-select\" onchange=\"show('year', this.value)\"{}>",
        if d.years.is_empty() { " disabled" } else { "" }
    )?;
    for &year in &d.years {
        writeln!(
            html,
            "<option value=\"{y}\"{}>{y}</option>",
            selected_if(d.selection.year == Some(year)),
            y = year
        )?;
    }
    writeln!(html, "</select>")?;

    writeln!(html, "<label for=\"category-select\">범죄 유형 선택</label>")?;
    writeln!(
        html,
        "<select id=\"category-select\" onchange=\"show('category', this.value)\"{}>",
        if d.categories.is_empty() { " disabled" } else { "" }
    )?;
    for (idx, category) in d.categories.iter().enumerate() {
        writeln!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            idx,
            selected_if(d.selection.category.as_deref() == Some(category.as_str())),
            escape(category)
        )?;
    }
    writeln!(html, "</select>")?;
    writeln!(html, "</aside>")?;
    Ok(())
}

fn selected_if(selected: bool) -> &'static str {
    if selected {
        " selected"
    } else {
        ""
    }
}
