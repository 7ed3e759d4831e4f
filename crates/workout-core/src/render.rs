//! HTML rendering of the heatmap.
//!
//! Pure string templating over [`HeatmapIndex`], [`CalendarLayout`] and
//! the [`Legend`]; years are rendered newest first.

use chrono::TimeZone;
use std::fmt::Write as _;

use crate::calendar::{CalendarLayout, Cell, Orientation};
use crate::heatmap::{HeatmapIndex, Legend, YearSummary};

const STYLESHEET: &str = r#"
    body { font-family: -apple-system, BlinkMacSystemFont, sans-serif; margin: 20px; background-color: #f5f5f5; }
    .year-container { background: white; border-radius: 10px; padding: 20px; margin-bottom: 20px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); display: inline-block; width: fit-content; }
    .year-title { font-size: 18px; font-weight: bold; margin-bottom: 15px; color: #333; text-align: center; }
    .month-container, .week-container { margin-bottom: 10px; display: flex; align-items: center; min-height: 14px; }
    .month-heatmap { display: grid; gap: 2px; }
    .week-heatmap { display: grid; grid-template-rows: repeat(7, 14px); grid-auto-flow: column; gap: 2px; }
    .week-column { display: contents; }
    .day-cell { width: 14px; height: 14px; border-radius: 2px; background-color: #ebedf0; }
    .day-cell.level-1 { background-color: #4e79a7; }
    .day-cell.level-2 { background-color: #edc949; }
    .day-cell.level-3 { background-color: #e15759; }
    .day-cell.level-4 { background-color: #76b7b2; }
    .day-cell.level-5 { background-color: #f28e2c; }
    .legend { display: flex; align-items: center; justify-content: center; font-size: 12px; color: #666; margin-top: 10px; gap: 10px; }
    .legend-item { display: flex; align-items: center; margin-right: 15px; }
    .legend-item .day-cell { margin-right: 8px; }
"#;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn cell_html(out: &mut String, cell: &Cell) {
    match cell.level() {
        Some(level) => {
            let _ = write!(out, "<div class='day-cell level-{level}'></div>");
        }
        None => out.push_str("<div class='day-cell'></div>"),
    }
}

fn layout_html<Tz: TimeZone>(out: &mut String, layout: CalendarLayout<'_, Tz>) {
    match layout {
        CalendarLayout::Month(months) => {
            for row in months {
                let _ = write!(
                    out,
                    "<div class=\"month-container\"><div class=\"month-heatmap\" style=\"grid-template-columns: repeat({}, 14px);\">",
                    row.columns
                );
                for cell in &row.cells {
                    cell_html(out, cell);
                }
                out.push_str("</div></div>\n");
            }
        }
        CalendarLayout::Week(weeks) => {
            out.push_str("<div class=\"week-container\"><div class=\"week-heatmap\">");
            for column in weeks {
                out.push_str("<div class='week-column'>");
                for cell in &column.0 {
                    cell_html(out, cell);
                }
                out.push_str("</div>");
            }
            out.push_str("</div></div>\n");
        }
    }
}

/// Title line for a year, e.g. `2023 (1/365 days, 0.3%)`.
pub fn year_title(summary: &YearSummary) -> String {
    format!(
        "{} ({}/{} days, {:.1}%)",
        summary.year, summary.recorded_days, summary.total_days, summary.percentage
    )
}

/// Body fragment: one container per year.
pub fn render_years<Tz: TimeZone>(
    index: &HeatmapIndex,
    legend: &Legend,
    orientation: Orientation,
    tz: &Tz,
) -> String {
    let mut out = String::new();
    for (year, days) in index.years_descending() {
        let summary = YearSummary::new(year, days);
        let _ = write!(
            out,
            "<div class=\"year-container\">\n<div class=\"year-title\">{}</div>\n",
            escape(&year_title(&summary))
        );
        layout_html(
            &mut out,
            CalendarLayout::for_orientation(orientation, year, days, tz),
        );
        out.push_str("<div class=\"legend\">");
        for entry in legend.entries(year, &summary.legend_counts) {
            let _ = write!(
                out,
                "<div class=\"legend-item\"><div class=\"day-cell level-{}\"></div><span>{} ({})</span></div>",
                entry.level,
                escape(&entry.label),
                entry.count
            );
        }
        out.push_str("</div>\n</div>\n");
    }
    out
}

/// Complete standalone document.
pub fn render_html<Tz: TimeZone>(
    index: &HeatmapIndex,
    legend: &Legend,
    orientation: Orientation,
    tz: &Tz,
    title: &str,
) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>{title}</title>\n<style>{STYLESHEET}</style>\n</head>\n<body>\n<h1>{title}</h1>\n{body}</body>\n</html>\n",
        title = escape(title),
        body = render_years(index, legend, orientation, tz),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_index() -> HeatmapIndex {
        let mut index = HeatmapIndex::new();
        // 2023-01-03 and 2024-02-01 at UTC midnight
        index.insert(2023, 1_672_704_000, 2);
        index.insert(2024, 1_706_745_600, 5);
        index
    }

    #[test]
    fn test_years_rendered_newest_first() {
        let html = render_years(&sample_index(), &Legend::default(), Orientation::Portrait, &Utc);
        let newer = html.find("2024 (1/366 days, 0.3%)").unwrap();
        let older = html.find("2023 (1/365 days, 0.3%)").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn test_portrait_has_one_cell_per_day() {
        let mut index = HeatmapIndex::new();
        index.insert(2023, 1_672_704_000, 2);
        let html = render_years(&index, &Legend::default(), Orientation::Portrait, &Utc);
        assert_eq!(html.matches("month-container").count(), 12);
        assert_eq!(html.matches("<div class='day-cell level-").count(), 365);
        assert_eq!(html.matches("<div class='day-cell level-2'>").count(), 1);
        assert!(html.contains("swim (1)"));
        assert!(html.contains("hiit (0)"));
    }

    #[test]
    fn test_landscape_pads_weeks() {
        let mut index = HeatmapIndex::new();
        index.insert(2023, 1_672_704_000, 2);
        let html = render_years(&index, &Legend::default(), Orientation::Landscape, &Utc);
        let columns = html.matches("<div class='week-column'>").count();
        let cells = html.matches("<div class='day-cell").count();
        assert_eq!(cells, columns * 7);
        assert_eq!(html.matches("<div class='day-cell'></div>").count(), columns * 7 - 365);
    }

    #[test]
    fn test_document_escapes_title() {
        let html = render_html(
            &sample_index(),
            &Legend::default(),
            Orientation::Portrait,
            &Utc,
            "Workouts <2024>",
        );
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>Workouts &lt;2024&gt;</h1>"));
    }
}
