//! One (sample, analyte, value) triple per row
//!
//! Rows naming an unknown sample may still belong to a reference (QC)
//! group; when the profile enables it, the analyte is then resolved against
//! the group's analyses and stored under the reference result field.

use super::{PassContext, PassEnd};
use crate::app::models::{ResultRecord, normalize_identifier};
use crate::app::services::instrument_parser::decoder::{LabeledRow, LabeledTable};
use crate::profiles::AnalyteRowsLayout;

pub fn process(ctx: &mut PassContext<'_>, layout: &AnalyteRowsLayout, table: &LabeledTable) -> PassEnd {
    for row in table.records() {
        let stored = process_row(ctx, layout, &row);
        ctx.stats.record_row(stored);
    }
    PassEnd::Completed
}

fn process_row(ctx: &mut PassContext<'_>, layout: &AnalyteRowsLayout, row: &LabeledRow<'_>) -> usize {
    let raw = row.raw();
    let sample_id = normalize_identifier(row.get(&layout.sample_column));
    if sample_id.is_empty() {
        return 0;
    }

    let (owner, field) = match ctx.catalog.find_sample(&sample_id) {
        Some(sample) => {
            ctx.results.ensure_sample(&sample_id);
            (sample, &layout.output_field)
        }
        None => {
            let group = layout
                .reference_fallback
                .then(|| ctx.catalog.find_reference_group(&sample_id))
                .flatten();
            match group {
                Some(group) => (group, &layout.reference_field),
                None => {
                    ctx.sample_not_found(&sample_id, raw);
                    return 0;
                }
            }
        }
    };

    let Some(keyword) = ctx.resolve_keyword(&owner, row.get(&layout.analyte_column), raw) else {
        return 0;
    };
    let Some(value) = ctx.coerce(field.as_str(), row.get(&layout.value_column), raw) else {
        return 0;
    };

    ctx.results
        .add(&sample_id, &keyword, ResultRecord::with_primary(field.clone(), value));
    1
}
