//! One formula per row for a sample named by the file itself
//!
//! The sample identifier is the file stem, or the stem without its last
//! `-suffix` (instrument software appends a run counter). Columns go through
//! the static field table; the formula names the analysis and the reading
//! is the primary result.

use std::path::Path;
use std::sync::Arc;

use super::{PassContext, PassEnd};
use crate::app::models::{CanonicalField, Keyword, ResultRecord};
use crate::app::services::catalog::SampleRef;
use crate::app::services::instrument_parser::coercion::{UnitFailure, disambiguate_units};
use crate::app::services::instrument_parser::decoder::{LabeledRow, LabeledTable};
use crate::app::services::instrument_parser::field_mapping::FieldMapper;
use crate::profiles::FormulaRowsLayout;

/// Candidate sample identifiers derived from a file name, most specific first
pub fn sample_id_candidates(filename: &str) -> Vec<String> {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("");

    let mut candidates = vec![stem.to_string()];
    if let Some((head, _)) = stem.rsplit_once('-') {
        candidates.push(head.to_string());
    }
    candidates
}

pub fn process(
    ctx: &mut PassContext<'_>,
    layout: &FormulaRowsLayout,
    table: &LabeledTable,
) -> PassEnd {
    let found = sample_id_candidates(ctx.filename)
        .into_iter()
        .find_map(|id| ctx.catalog.find_sample(&id).map(|sample| (id, sample)));

    let Some((sample_id, sample)) = found else {
        ctx.diagnostics
            .warn("Can't find sample for ${file}")
            .with("file", ctx.filename);
        return PassEnd::Rejected;
    };
    ctx.results.ensure_sample(&sample_id);

    let mapper = FieldMapper::new(&layout.field_map);
    for row in table.records() {
        let stored = process_row(ctx, layout, &mapper, &sample_id, &sample, &row);
        ctx.stats.record_row(stored);
    }
    PassEnd::Completed
}

fn process_row(
    ctx: &mut PassContext<'_>,
    layout: &FormulaRowsLayout,
    mapper: &FieldMapper<'_>,
    sample_id: &str,
    sample: &Arc<SampleRef>,
    row: &LabeledRow<'_>,
) -> usize {
    let raw = row.raw();
    let fields = mapper.known_fields(row.iter());

    let Some(reading) = fields
        .get(&layout.reading_field)
        .copied()
        .filter(|reading| !reading.is_empty())
    else {
        ctx.diagnostics
            .error("Missing '${field}' interim field.")
            .with("field", &layout.reading_field)
            .at(raw);
        return 0;
    };

    let formula = fields.get(&layout.keyword_field).copied().unwrap_or("");
    let candidate = Keyword::identifier(formula);
    let Some(keyword) = ctx.resolve(sample, &candidate, raw) else {
        return 0;
    };

    let mut record = ResultRecord::new(Some(layout.reading_field.clone()));
    for (field, value) in &fields {
        if *field != layout.reading_field {
            record.set_text(field.clone(), *value);
        }
    }

    match ctx.profile.unit_rule {
        Some(rule) => match disambiguate_units(reading) {
            Ok(units) => {
                record.set_number(CanonicalField::ReadingPct, units.pct);
                record.set_number(CanonicalField::ReadingPpm, units.ppm);
                record.set_number(layout.reading_field.clone(), units.primary(rule.default_unit));
            }
            Err(UnitFailure::NoNumber) => {
                ctx.diagnostics
                    .warn("Can't extract numerical value from `concentration`")
                    .at(raw);
                return 0;
            }
            Err(UnitFailure::Undecided) => {
                ctx.diagnostics
                    .warn("Can't decide if reading units are PPM or %")
                    .at(raw);
                return 0;
            }
        },
        None => {
            let Some(value) = ctx.coerce(layout.reading_field.as_str(), reading, raw) else {
                return 0;
            };
            record.set_number(layout.reading_field.clone(), value);
        }
    }

    ctx.results.add(sample_id, &keyword, record);
    1
}
