//! Read-only outage reports for the terminal.

use std::sync::Arc;

use chrono::Utc;
use outage_core::{lookup_area, AreaCode, TimeWindow};
use outage_db::AreaAggregateRow;
use outage_summary::{IncidentSummary, OutagePipeline, SummaryVariant, TextGenerator};

/// Print technical-support call counts per area for the trailing window.
///
/// # Errors
///
/// Returns an error if `hours` is out of range or the query fails.
pub(crate) async fn run_areas(pool: &sqlx::PgPool, hours: i64) -> anyhow::Result<()> {
    let window = TimeWindow::trailing(hours, Utc::now())?;
    let rows = outage_db::list_area_aggregates(pool, &window).await?;
    tracing::info!(hours, areas = rows.len(), "loaded area aggregates");

    if rows.is_empty() {
        println!("no technical-support calls in the last {hours}h");
        return Ok(());
    }

    println!("{}", areas_header());
    for row in &rows {
        println!("{}", format_area_row(row));
    }
    Ok(())
}

fn areas_header() -> String {
    format!(
        "{:<8}{:<18}{:>7}{:>11}{:>10}{:>20}",
        "AREA", "NAME", "CALLS", "CUSTOMERS", "AVG MIN", "LAT,LON"
    )
}

fn format_area_row(row: &AreaAggregateRow) -> String {
    let (name, position) = lookup_area(&row.area_code).map_or_else(
        || ("(unmapped)".to_string(), "-".to_string()),
        |c| {
            (
                c.display_name.to_string(),
                format!("{:.4},{:.4}", c.latitude, c.longitude),
            )
        },
    );
    format!(
        "{:<8}{:<18}{:>7}{:>11}{:>10.1}{:>20}",
        row.area_code,
        name,
        row.call_count,
        row.customer_ids.len(),
        row.avg_duration_minutes,
        position
    )
}

/// Run the summary pipeline for one area and print the result.
///
/// # Errors
///
/// Returns an error for an invalid area or window, a missing credential, no
/// matching calls, or a store/service failure.
pub(crate) async fn run_summarize(
    pool: sqlx::PgPool,
    generator: Option<Arc<dyn TextGenerator>>,
    area: &str,
    hours: i64,
    alert: bool,
) -> anyhow::Result<()> {
    let area_code = AreaCode::parse(area)?;
    let window = TimeWindow::trailing(hours, Utc::now())?;
    let variant = if alert {
        SummaryVariant::Alert
    } else {
        SummaryVariant::Analyst
    };

    let summary = OutagePipeline::new(pool, generator)
        .summarize(&area_code, &window, variant)
        .await?;
    tracing::info!(
        area_code = %area_code,
        variant = variant.as_str(),
        call_count = summary.call_count,
        "summary generated"
    );
    println!("{}", format_summary(&summary));
    Ok(())
}

fn format_summary(summary: &IncidentSummary) -> String {
    let name = lookup_area(summary.area_code.as_str()).map_or("", |c| c.display_name);
    format!(
        "area:      {} {name}\nwindow:    {} \u{2192} {}\ncalls:     {}\ncustomers: {}\n\n{}",
        summary.area_code,
        summary.outage_start.format("%Y-%m-%d %H:%M UTC"),
        summary.outage_end.format("%Y-%m-%d %H:%M UTC"),
        summary.call_count,
        summary.affected_customers,
        summary.summary_text.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unmapped_areas_are_still_listed() {
        let line = format_area_row(&AreaAggregateRow {
            area_code: "90210".to_string(),
            call_count: 4,
            avg_duration_minutes: 7.25,
            customer_ids: vec!["C-1".to_string(), "C-2".to_string()],
        });
        assert!(line.starts_with("90210"));
        assert!(line.contains("(unmapped)"));
        assert!(line.contains("7.2") || line.contains("7.3"));
    }

    #[test]
    fn mapped_area_shows_name_and_position() {
        let line = format_area_row(&AreaAggregateRow {
            area_code: "06105".to_string(),
            call_count: 3,
            avg_duration_minutes: 11.0,
            customer_ids: vec!["C-100".to_string(), "C-101".to_string()],
        });
        assert!(line.contains("Hartford"));
        assert!(line.contains("41.7662,-72.7009"));
    }

    #[test]
    fn summary_block_lists_metrics_then_text() {
        let text = format_summary(&IncidentSummary {
            area_code: AreaCode::parse("06105").unwrap(),
            outage_start: Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            outage_end: Utc.with_ymd_and_hms(2025, 3, 10, 9, 45, 0).unwrap(),
            affected_customers: 2,
            call_count: 3,
            summary_text: "Fiber cut.\n".to_string(),
        });
        assert!(text.starts_with("area:      06105 Hartford"));
        assert!(text.contains("2025-03-10 09:00 UTC \u{2192} 2025-03-10 09:45 UTC"));
        assert!(text.contains("calls:     3"));
        assert!(text.contains("customers: 2"));
        assert!(text.ends_with("Fiber cut."));
    }
}
