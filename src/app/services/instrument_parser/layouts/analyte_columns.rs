//! One sample per row, analytes as columns

use super::{PassContext, PassEnd};
use crate::app::models::{ResultRecord, normalize_identifier};
use crate::app::services::instrument_parser::decoder::{LabeledRow, LabeledTable};
use crate::app::services::instrument_parser::field_mapping::{FieldMapper, MappedField};
use crate::profiles::AnalyteColumnsLayout;

pub fn process(
    ctx: &mut PassContext<'_>,
    layout: &AnalyteColumnsLayout,
    table: &LabeledTable,
) -> PassEnd {
    let mapper = FieldMapper::with_metadata(&layout.metadata_columns);
    for row in table.records() {
        let stored = process_row(ctx, layout, &mapper, &row);
        ctx.stats.record_row(stored);
    }
    PassEnd::Completed
}

fn is_skip_marker(layout: &AnalyteColumnsLayout, cell: &str) -> bool {
    let cell = cell.trim().to_lowercase();
    layout
        .skip_markers
        .iter()
        .any(|marker| marker.to_lowercase() == cell)
}

fn process_row(
    ctx: &mut PassContext<'_>,
    layout: &AnalyteColumnsLayout,
    mapper: &FieldMapper<'_>,
    row: &LabeledRow<'_>,
) -> usize {
    let raw = row.raw();
    let sample_cell = row.get(&layout.sample_column);
    if is_skip_marker(layout, sample_cell) {
        return 0;
    }

    let sample_id = normalize_identifier(sample_cell);
    if sample_id.is_empty() {
        return 0;
    }
    let Some(sample) = ctx.find_sample(&sample_id, raw) else {
        return 0;
    };

    let mut stored = 0;
    for (label, value) in row.iter() {
        if label == layout.sample_column {
            continue;
        }
        let candidate = match mapper.map_field(label) {
            MappedField::Candidate(candidate) => candidate,
            MappedField::Known(_) | MappedField::Metadata => continue,
        };
        let Some(keyword) = ctx.resolve_keyword(&sample, &candidate, raw) else {
            continue;
        };
        let Some(reading) = ctx.coerce(label, value, raw) else {
            continue;
        };

        ctx.results.add(
            &sample_id,
            &keyword,
            ResultRecord::with_primary(layout.output_field.clone(), reading),
        );
        stored += 1;
    }
    stored
}
