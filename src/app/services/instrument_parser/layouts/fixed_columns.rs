//! One analyte per file, fixed positional fields per row

use super::{PassContext, PassEnd};
use crate::app::models::{Keyword, ResultRecord, normalize_identifier};
use crate::app::services::instrument_parser::decoder::RawRow;
use crate::profiles::{ColumnKind, FixedColumnsLayout};

pub fn process(
    ctx: &mut PassContext<'_>,
    layout: &FixedColumnsLayout,
    keyword: &Keyword,
    rows: &[RawRow],
) -> PassEnd {
    let required = layout
        .columns
        .iter()
        .map(|column| column.index)
        .chain([layout.sample_column])
        .max()
        .unwrap_or(0)
        + 1;

    for row in rows {
        if row.is_blank() || row.cell(layout.label_column) == layout.label_value {
            continue;
        }
        let stored = process_row(ctx, layout, keyword, required, row);
        ctx.stats.record_row(stored);
    }
    PassEnd::Completed
}

fn process_row(
    ctx: &mut PassContext<'_>,
    layout: &FixedColumnsLayout,
    keyword: &Keyword,
    required: usize,
    row: &RawRow,
) -> usize {
    if row.len() < required {
        ctx.diagnostics
            .error("Expected at least ${expected} columns, found ${found}")
            .with("expected", required)
            .with("found", row.len())
            .at(row);
        return 0;
    }

    let sample_id = normalize_identifier(row.cell(layout.sample_column));
    if sample_id.is_empty() {
        return 0;
    }
    let Some(sample) = ctx.find_sample(&sample_id, row) else {
        return 0;
    };
    let Some(analysis_keyword) = ctx.resolve_keyword(&sample, keyword.as_str(), row) else {
        return 0;
    };

    let mut record = ResultRecord::new(layout.default_result.clone());
    for column in &layout.columns {
        let cell = row.cell(column.index);
        match column.kind {
            ColumnKind::Text => record.set_text(column.field.clone(), cell),
            ColumnKind::Numeric => {
                if let Some(value) = ctx.coerce(column.field.as_str(), cell, row) {
                    record.set_number(column.field.clone(), value);
                }
            }
        }
    }
    for field in &layout.blank_fields {
        record.set_text(field.clone(), "");
    }

    ctx.results.add(&sample_id, &analysis_keyword, record);
    1
}
