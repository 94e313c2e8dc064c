//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use ujian_core::report::GradingReport;
use ujian_core::statistics::QuestionStats;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report from a grading report.
pub fn generate_html(report: &GradingReport) -> String {
    let mut html = String::new();
    let stats = &report.aggregate;

    html.push_str("<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Hasil ujian: {}</title>\n",
        html_escape(&report.package.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str(&format!(
        "<h1>{}</h1>\n",
        html_escape(&report.package.name)
    ));
    html.push_str(&format!(
        "<p class=\"meta\">Paket: <strong>{}</strong> | {} soal | {} poin | {} peserta | {}</p>\n",
        html_escape(&report.package.id),
        report.package.question_count,
        report.package.total_points,
        stats.submission_count,
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "<p class=\"meta\">Nilai parsial: {} | Penalti pilihan salah: {}</p>\n",
        if report.config.allow_partial_credit { "ya" } else { "tidak" },
        report.config.wrong_pick_penalty_per_option
    ));
    html.push_str("</header>\n");

    // Summary dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Ringkasan</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Rata-rata %</th><th>Terendah %</th><th>Tertinggi %</th><th>Rata-rata skor</th><th>Menunggu koreksi</th><th>Gagal dimuat</th></tr></thead>\n");
    html.push_str(&format!(
        "<tbody><tr><td>{:.1}%</td><td>{}%</td><td>{}%</td><td>{:.2}</td><td>{}</td><td>{}</td></tr></tbody>\n",
        stats.mean_percentage,
        stats.min_percentage,
        stats.max_percentage,
        stats.mean_score,
        stats.pending_reviews,
        report.failures.len(),
    ));
    html.push_str("</table>\n");

    if !stats.per_question.is_empty() {
        html.push_str(&generate_bar_chart(&stats.per_question));
    }
    html.push_str("</section>\n");

    // Per-participant results
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Peserta</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Peserta</th><th onclick=\"sortTable(1)\">Skor</th><th onclick=\"sortTable(2)\">Maks</th><th onclick=\"sortTable(3)\">Nilai</th><th onclick=\"sortTable(4)\">Koreksi</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for s in &report.submissions {
        let r = &s.result;
        let class = if r.needs_review_count > 0 {
            "review"
        } else if r.total_score >= r.total_max {
            "pass"
        } else {
            ""
        };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}%</td><td>{}</td></tr>\n",
            class,
            html_escape(&s.participant_id),
            r.total_score,
            r.total_max,
            r.percentage(),
            r.needs_review_count
        ));
    }
    for f in &report.failures {
        html.push_str(&format!(
            "<tr class=\"fail\"><td>{}</td><td colspan=\"4\">{}</td></tr>\n",
            html_escape(&f.participant_id),
            html_escape(&f.error)
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Manual review queue
    let queue = report.review_queue();
    if !queue.is_empty() {
        html.push_str("<section class=\"review-queue\">\n");
        html.push_str(&format!("<h2>Antrian koreksi ({})</h2>\n", queue.len()));
        html.push_str("<table>\n<thead><tr><th>Peserta</th><th>Soal</th><th>Tipe</th><th>Maks</th><th>Catatan</th></tr></thead>\n<tbody>\n");
        for item in &queue {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                html_escape(&item.participant_id),
                html_escape(&item.question_id),
                html_escape(item.kind.as_str()),
                item.max,
                html_escape(item.feedback.as_deref().unwrap_or("-"))
            ));
        }
        html.push_str("</tbody></table>\n</section>\n");
    }

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Data JSON</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &GradingReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report: {}", path.display()))?;
    Ok(())
}

/// Horizontal bars of mean score ratio per question.
fn generate_bar_chart(per_question: &[QuestionStats]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 120;

    let total_height = per_question.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, q) in per_question.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let ratio = if q.max > 0.0 {
            (q.mean_score / q.max).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let width = (ratio * max_width as f64) as usize;

        let color = if q.review_count > 0 {
            "#60a5fa"
        } else if ratio >= 0.8 {
            "#22c55e"
        } else if ratio >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"13\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&q.question_id)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            ratio * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --review: #dbeafe; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; --review: #1e3a8a; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.review { background: var(--review); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    const na = parseFloat(va), nb = parseFloat(vb);
    const cmp = isNaN(na) || isNaN(nb) ? va.localeCompare(vb) : na - nb;
    return asc ? cmp : -cmp;
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
