//! Positional keyword columns under a sentinel header line
//!
//! Data lines carry the sample identifier first and one value per header
//! keyword after it. A keyword that names no analysis may still name an
//! interim field; its owning analysis then receives every one of its
//! interim values found on the line, and those columns are not processed
//! again for the same line. Values attributed to the same analysis on one
//! line are merged into a single record.

use std::collections::{BTreeMap, HashSet};

use super::{PassContext, PassEnd};
use crate::app::models::{CanonicalField, Keyword, ResultRecord, normalize_identifier};
use crate::app::services::catalog::AnalysisRef;
use crate::app::services::instrument_parser::decoder::RawRow;
use crate::app::services::instrument_parser::keyword_resolver::Resolution;
use crate::profiles::KeywordColumnsLayout;

pub fn process(
    ctx: &mut PassContext<'_>,
    layout: &KeywordColumnsLayout,
    keywords: &[String],
    rows: &[RawRow],
) -> PassEnd {
    let keywords: Vec<Keyword> = keywords.iter().map(|label| Keyword::normalize(label)).collect();

    for row in rows {
        if row.is_blank() || row.cell(0) == layout.data_end_token {
            continue;
        }
        let stored = process_row(ctx, layout, &keywords, row);
        ctx.stats.record_row(stored);
    }
    PassEnd::Completed
}

fn process_row(
    ctx: &mut PassContext<'_>,
    layout: &KeywordColumnsLayout,
    keywords: &[Keyword],
    row: &RawRow,
) -> usize {
    let values = row.cells_from(1);

    for (index, token) in values.iter().enumerate().skip(keywords.len()) {
        if !token.is_empty() {
            ctx.diagnostics
                .error("Orphan value in column ${index} (${token})")
                .with("index", index + 1)
                .with("token", token)
                .at(row);
        }
    }

    let sample_id = normalize_identifier(row.cell(0));
    if sample_id.is_empty() {
        return 0;
    }
    let Some(sample) = ctx.find_sample(&sample_id, row) else {
        return 0;
    };

    let mut attributed: HashSet<&str> = HashSet::new();
    let mut line_records: BTreeMap<String, ResultRecord> = BTreeMap::new();

    for (index, keyword) in keywords.iter().enumerate() {
        if keyword.is_empty() || attributed.contains(keyword.as_str()) {
            continue;
        }
        let raw_value = values.get(index).copied().unwrap_or("");

        match ctx.resolver.resolve(&sample, keyword) {
            Resolution::Unique(analysis) => {
                let Some(value) = ctx.coerce(layout.output_field.as_str(), raw_value, row) else {
                    continue;
                };
                line_records
                    .entry(analysis.keyword().to_string())
                    .or_default()
                    .merge(ResultRecord::with_primary(layout.output_field.clone(), value));
            }
            Resolution::Ambiguous(count) => ctx.keyword_ambiguous(keyword, count, row),
            Resolution::NotFound => match ctx.resolver.resolve_interim(&sample, keyword) {
                Some(owner) => {
                    let interims = collect_interims(ctx, owner, keywords, &values, row, &mut attributed);
                    if !interims.is_empty() {
                        line_records
                            .entry(owner.keyword().to_string())
                            .or_default()
                            .merge(interims);
                    }
                }
                None => ctx.keyword_not_found(keyword, row),
            },
        }
    }

    let stored = line_records.len();
    for (keyword, record) in line_records {
        ctx.results.add(&sample_id, &keyword, record);
    }
    stored
}

/// Gather every interim value of `owner` present on the line
fn collect_interims<'s>(
    ctx: &mut PassContext<'_>,
    owner: &'s AnalysisRef,
    keywords: &[Keyword],
    values: &[&str],
    row: &RawRow,
    attributed: &mut HashSet<&'s str>,
) -> ResultRecord {
    let mut record = ResultRecord::new(None);

    for interim in owner.interim_keywords() {
        let Some(column) = keywords.iter().position(|keyword| keyword.as_str() == interim.as_str()) else {
            continue;
        };
        attributed.insert(interim.as_str());

        let raw_value = values.get(column).copied().unwrap_or("");
        if let Some(value) = ctx.coerce(interim, raw_value, row) {
            record.set_number(CanonicalField::interim(interim), value);
        }
    }
    record
}
