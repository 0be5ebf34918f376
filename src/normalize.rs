use crate::models::{Attribute, Dataset, NormalizedRecord, Record, ResolvedSchema, SchemaMapping};
use rayon::prelude::*;

/// Characters in model names that separate tokens rather than belong to them.
const MODEL_PUNCTUATION: &[char] = &['.', '-', '_', '/', '(', ')', '[', ']', '{', '}', ':'];

/// Tokens dropped from model names: generic descriptors, then brand names.
/// Sub-brands (aspire, nitro, vostro, ...) stay in the name.
const NOISE_TERMS: &[&str] = &[
    "notebook",
    "laptop",
    "gamer",
    "gaming",
    "kit",
    "bundle",
    "ordenador",
    "ultrabook",
    "acer",
    "dell",
    "hp",
    "lenovo",
    "asus",
    "msi",
    "apple",
    "microsoft",
    "samsung",
    "lg",
    "huawei",
    "razer",
    "alienware",
];

/// Generic key: trim and lowercase; absent values become the empty key.
pub fn normalize_field(raw: Option<&str>) -> String {
    match raw {
        Some(s) => s.trim().to_lowercase(),
        None => String::new(),
    }
}

/// Canonical model-name key.
///
/// Punctuation is turned into spaces (so "i7-12700H" keeps two tokens), whitespace is
/// collapsed, and noise/brand tokens are removed.
pub fn clean_model_name(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(s) if !s.is_empty() => s,
        _ => return String::new(),
    };
    let lowered = raw.to_lowercase();
    let trimmed = lowered.trim();

    let mut spaced = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        if MODEL_PUNCTUATION.contains(&ch) {
            spaced.push(' ');
        } else {
            spaced.push(ch);
        }
    }

    spaced
        .split_whitespace()
        .filter(|tok| !NOISE_TERMS.contains(tok))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_record(record: &Record, schema: &ResolvedSchema) -> NormalizedRecord {
    let field = |attr: Attribute| normalize_field(schema.read(record, attr));
    NormalizedRecord {
        region_key: field(Attribute::Region),
        country_key: field(Attribute::Country),
        brand_key: field(Attribute::Brand),
        model_key: clean_model_name(schema.read(record, Attribute::Model)),
        cpu_key: field(Attribute::Cpu),
        gpu_key: field(Attribute::Gpu),
        resolution_key: field(Attribute::Resolution),
    }
}

/// Normalized keys for every record, in dataset order.
pub fn normalize_dataset(dataset: &Dataset, mapping: &SchemaMapping) -> Vec<NormalizedRecord> {
    let schema = mapping.resolve(dataset);
    dataset
        .records
        .par_iter()
        .map(|r| normalize_record(r, &schema))
        .collect()
}
