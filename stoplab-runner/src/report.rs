//! Scenario reports — the stop-order table and audit trail, as text or CSV.
//!
//! Row columns mirror the trading console's stop-orders tab: instrument
//! code, trigger rendering ("Mark > 103.00"), expiry, signed size, order
//! type, status wire name, limit price (or "-"), time in force, updated-at.

use serde::Serialize;
use std::path::Path;
use stoplab_core::domain::{Market, Side, StopOrder, StopOrderAuditEntry};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a scenario run leaves behind: the final stop-order table and
/// the full audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub rows: Vec<StopOrderRow>,
    pub audit: Vec<StopOrderAuditEntry>,
}

impl ScenarioReport {
    /// Persist the whole report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// One row of the stop-order table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StopOrderRow {
    pub market_code: String,
    pub trigger: String,
    pub expires_at: String,
    pub size: String,
    pub order_type: String,
    pub status: String,
    pub price: String,
    pub time_in_force: String,
    pub updated_at: String,
}

/// Signed size rendering: buys "+3", sells "-3".
fn render_size(side: Side, size: f64) -> String {
    let sign = match side {
        Side::Buy => "+",
        Side::Sell => "-",
    };
    if size.fract() == 0.0 {
        format!("{sign}{}", size as i64)
    } else {
        format!("{sign}{size}")
    }
}

/// Build a table row from a stop order and its market.
pub fn row_for(order: &StopOrder, market: &Market) -> StopOrderRow {
    let sub = &order.submission;
    StopOrderRow {
        market_code: market.code.clone(),
        trigger: sub.trigger.render(market),
        expires_at: sub
            .expiry
            .map(|e| e.to_rfc3339())
            .unwrap_or_default(),
        size: render_size(sub.side, sub.size),
        order_type: sub.order.label().to_string(),
        status: order.status.wire_name().to_string(),
        price: sub.order.render_price(market),
        time_in_force: sub.time_in_force.label().to_string(),
        // Empty until the first transition, like the console's column.
        updated_at: if order.status.is_pending() {
            String::new()
        } else {
            order.updated_at.to_rfc3339()
        },
    }
}

/// Render rows as an aligned text table for terminal output.
pub fn render_table(rows: &[StopOrderRow]) -> String {
    const HEADERS: [&str; 9] = [
        "Market", "Trigger", "Expires", "Size", "Type", "Status", "Price", "TIF", "Updated",
    ];

    let cells: Vec<[&str; 9]> = rows
        .iter()
        .map(|r| {
            [
                r.market_code.as_str(),
                r.trigger.as_str(),
                r.expires_at.as_str(),
                r.size.as_str(),
                r.order_type.as_str(),
                r.status.as_str(),
                r.price.as_str(),
                r.time_in_force.as_str(),
                r.updated_at.as_str(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let render_line = |line: &[&str; 9]| {
        line.iter()
            .zip(widths.iter())
            .map(|(cell, w)| format!("{cell:<width$}", width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    out.push_str(&render_line(&HEADERS));
    out.push('\n');
    for row in &cells {
        out.push_str(&render_line(row));
        out.push('\n');
    }
    out
}

/// Write the stop-order table to a CSV file.
pub fn write_rows_csv(rows: &[StopOrderRow], path: &Path) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the audit trail to a CSV file.
pub fn write_audit_csv(entries: &[StopOrderAuditEntry], path: &Path) -> Result<(), ReportError> {
    #[derive(Serialize)]
    struct AuditRow<'a> {
        order_id: &'a str,
        at: String,
        from_status: &'static str,
        to_status: &'static str,
        reason: &'a str,
    }

    let mut writer = csv::Writer::from_path(path)?;
    for entry in entries {
        writer.serialize(AuditRow {
            order_id: &entry.order_id.0,
            at: entry.at.to_rfc3339(),
            from_status: entry.from_status.wire_name(),
            to_status: entry.to_status.wire_name(),
            reason: &entry.reason,
        })?;
    }
    writer.flush()?;
    Ok(())
}
