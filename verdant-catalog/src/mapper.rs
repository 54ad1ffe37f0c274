//! Strain → cultivar/breeder normalization
//!
//! Pure functions over raw catalog JSON. No network, no cache, no mutable
//! state; safe to call from any number of tasks without coordination.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use verdant_core::{BreederRecord, CannabinoidContent, CultivarRecord, Genetics};

/// Explicit split annotation, e.g. "sativa 60% / indica 40%".
static GENETICS_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"sativa\s*(\d+)%\s*/\s*indica\s*(\d+)%").expect("genetics regex"));

static HTTP_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^https?://").expect("url scheme regex"));

/// Source fields that count as "the catalog mentioned THC".
const THC_FIELDS: &[&str] = &["thc", "thc_content", "thc_percentage"];
/// Source fields that count as "the catalog mentioned CBD".
const CBD_FIELDS: &[&str] = &["cbd", "cbd_content", "cbd_percentage"];

/// Map a raw `race` tag to an indica/sativa split.
///
/// Exact tags map to the pure splits; an explicit "sativa X% / indica Y%"
/// annotation is honored when X + Y <= 100; anything else (including a
/// missing tag) defaults to an even hybrid.
pub fn parse_race_to_genetics(race: Option<&str>) -> Genetics {
    let Some(race) = race else {
        return Genetics::HYBRID;
    };
    let race = race.trim().to_lowercase();
    match race.as_str() {
        "sativa" => Genetics::SATIVA,
        "indica" => Genetics::INDICA,
        "hybrid" => Genetics::HYBRID,
        "ruderalis" => Genetics::RUDERALIS,
        other => {
            if let Some(caps) = GENETICS_SPLIT_RE.captures(other) {
                if let (Ok(sativa), Ok(indica)) =
                    (caps[1].parse::<u32>(), caps[2].parse::<u32>())
                {
                    if sativa.saturating_add(indica) <= 100 {
                        return Genetics {
                            indica: indica as u8,
                            sativa: sativa as u8,
                        };
                    }
                }
            }
            Genetics::HYBRID
        }
    }
}

/// Parse a cannabinoid percentage out of a loosely-typed source value.
///
/// Numbers pass through. Strings are trimmed and a trailing `%` stripped; a
/// two-part numeric range ("18-22", hyphen or en-dash) yields `None` — ranges
/// are deliberately not averaged. Anything unparsable yields `None`.
pub fn parse_percentage_value(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim().trim_end_matches('%').trim();
            if trimmed.is_empty() || is_numeric_range(trimmed) {
                return None;
            }
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    }
}

fn is_numeric_range(s: &str) -> bool {
    for separator in ['-', '\u{2013}'] {
        if let Some((low, high)) = s.split_once(separator) {
            let (low, high) = (low.trim(), high.trim());
            if !low.is_empty()
                && !high.is_empty()
                && low.parse::<f64>().is_ok()
                && high.parse::<f64>().is_ok()
            {
                return true;
            }
        }
    }
    false
}

/// Trim a URL and guarantee an http(s) scheme, defaulting to https.
pub fn normalize_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    HTTP_URL_RE.is_match(&candidate).then_some(candidate)
}

/// Trim and Title-Case a country name.
pub fn normalize_country(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let titled = trimmed
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ");
    Some(titled)
}

/// True iff the flowering type mentions autoflowering.
pub fn detect_autoflower(flowering_type: Option<&str>) -> bool {
    flowering_type
        .map(|t| t.to_lowercase().contains("autoflower"))
        .unwrap_or(false)
}

fn non_blank(value: &Value) -> Option<&str> {
    let s = value.as_str()?.trim();
    (!s.is_empty()).then_some(s)
}

fn stringify_id(id: &Value) -> Option<String> {
    match id {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        _ => None,
    }
}

fn parent_name(parents: &[Value], index: usize) -> Option<String> {
    let parent = parents.get(index)?;
    let name = parent
        .get("name")
        .or_else(|| parent.get("strain_name"))
        .and_then(non_blank)?;
    Some(name.to_string())
}

fn cannabinoid_content(obj: &Map<String, Value>, fields: &[&str]) -> Option<CannabinoidContent> {
    // Key presence mirrors source presence; the value may still be Unparsed.
    let raw = fields.iter().find_map(|field| obj.get(*field))?;
    Some(parse_percentage_value(raw).into())
}

/// Normalize one raw catalog strain into a [`CultivarRecord`].
///
/// Requires a usable `id` (stringified into `external_id_value`) and a
/// non-blank `name`; returns `None` otherwise.
pub fn map_strain(raw: &Value) -> Option<CultivarRecord> {
    let obj = raw.as_object()?;
    let external_id_value = obj.get("id").and_then(stringify_id)?;
    let name = obj.get("name").and_then(non_blank)?.to_string();

    let genetics = parse_race_to_genetics(obj.get("race").and_then(Value::as_str));
    let mut record = CultivarRecord::new(name, genetics, external_id_value);

    record.flowering_type = obj.get("flowering_type").and_then(non_blank).map(String::from);
    record.autoflower = detect_autoflower(record.flowering_type.as_deref());

    if let Some(lineage) = obj.get("lineage").filter(|v| v.is_object()) {
        record.lineage_json = Some(lineage.clone());
        if let Some(parents) = lineage.get("parents").and_then(Value::as_array) {
            record.parent_1 = parent_name(parents, 0);
            record.parent_2 = parent_name(parents, 1);
        }
    } else {
        record.parent_1 = obj.get("parent_1").and_then(non_blank).map(String::from);
        record.parent_2 = obj.get("parent_2").and_then(non_blank).map(String::from);
    }

    record.cycle_time = obj.get("cycle_time").and_then(Value::as_i64);
    record.seed_count = obj.get("seed_count").and_then(Value::as_i64);
    record.url = obj.get("url").and_then(Value::as_str).and_then(normalize_url);
    record.description = obj.get("description").and_then(non_blank).map(String::from);
    record.thc_content = cannabinoid_content(obj, THC_FIELDS);
    record.cbd_content = cannabinoid_content(obj, CBD_FIELDS);

    Some(record)
}

/// Normalize one raw catalog breeder into a [`BreederRecord`].
pub fn map_breeder(raw: &Value) -> Option<BreederRecord> {
    let obj = raw.as_object()?;
    let name = obj.get("name").and_then(non_blank)?.to_string();
    Some(BreederRecord {
        name,
        country: obj
            .get("country")
            .and_then(Value::as_str)
            .and_then(normalize_country),
        website: obj
            .get("website")
            .and_then(Value::as_str)
            .and_then(normalize_url),
        description: obj.get("description").and_then(non_blank).map(String::from),
        seedfinder_id: obj.get("seedfinder_id").and_then(non_blank).map(String::from),
    })
}

// =============================================================================
// TESTS
// =============================================================================
