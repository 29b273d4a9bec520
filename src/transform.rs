use crate::structs::{Dataset, DatasetKind, FieldValue};
use log::debug;

/// A correction applied to one field value.
type FieldRule = fn(FieldValue) -> FieldValue;

const VEHICLE_RULES: &[(&str, FieldRule)] =
    &[("nome", fix_encoding), ("vendas", coerce_number)];
const BRAND_RULES: &[(&str, FieldRule)] = &[("marca", fix_encoding)];

/// Correction rules for a dataset kind, keyed by field name.
///
/// Kept as an explicit table rather than ad-hoc conditionals so a new kind or
/// field only means a new table entry.
fn rules_for(kind: DatasetKind) -> &'static [(&'static str, FieldRule)] {
    match kind {
        DatasetKind::Vehicles => VEHICLE_RULES,
        DatasetKind::Brands => BRAND_RULES,
    }
}

/// Applies the field-correction rules for `kind` to every record, in place.
///
/// Correction is pure per-record: no aggregation, no deduplication, no
/// reordering. Length and record order are untouched, and a field stays at its
/// original position in the record.
///
/// # Arguments
///
/// * `dataset` - Records parsed from one input file
/// * `kind` - Which rule table to apply (`Vehicles` or `Brands`)
///
/// Fields without a rule pass through unchanged, with their original type.
/// Records missing a ruled field are left alone for that field: no error, no
/// key added.
pub fn correct_dataset(dataset: &mut Dataset, kind: DatasetKind) {
    let rules = rules_for(kind);
    for record in dataset.iter_mut() {
        for (field, rule) in rules {
            if let Some(value) = record.fields.get_mut(*field) {
                *value = rule(value.clone());
            }
        }
    }
    debug!("Corrected {} records with {:?} rules", dataset.len(), kind);
}

/// Undoes the known encoding artifacts in a text field.
///
/// Only the lowercase code points "æ" and "ø" are substituted; uppercase
/// variants and other diacritics are left as-is. That matches the artifacts
/// actually present in the broken dumps and is a known gap, not an oversight.
fn fix_encoding(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(text) => {
            FieldValue::Text(text.replace('æ', "a").replace('ø', "o"))
        }
        other => other,
    }
}

/// Coerces a numeric field stored as text back into a number.
///
/// Text parses with standard decimal syntax; a failed parse becomes the
/// explicit not-a-number sentinel so exporters can render it faithfully instead
/// of dropping it. Values that are already numbers (or anything non-text) are
/// unchanged.
fn coerce_number(value: FieldValue) -> FieldValue {
    match value {
        FieldValue::Text(text) => match text.trim().parse::<serde_json::Number>() {
            Ok(number) => FieldValue::Number(number),
            Err(_) => FieldValue::NotANumber,
        },
        other => other,
    }
}
