//! Birth-decade cohorts.

/// Universal cohort every reader falls back to.
pub const COMMON_COHORT: &str = "common";

/// Cohort name for a birth year, e.g. 1994 -> `"1990s"`.
pub fn birth_year_to_cohort(year: i32) -> String {
    format!("{}s", year.div_euclid(10) * 10)
}

/// Strip zero-width characters, map NBSP to a space, trim and lowercase.
///
/// Cohort values arrive from query strings and pasted admin input, where
/// invisible characters are common.
pub fn normalize_cohort(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}'))
        .map(|c| if c == '\u{00A0}' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_lowercase()
}

pub fn is_common(cohort: &str) -> bool {
    cohort == COMMON_COHORT
}

/// Unique cohorts for birth years within `span` years of `year`, ascending.
pub fn cohort_options(year: i32, span: i32) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for y in (year - span)..=(year + span) {
        let cohort = birth_year_to_cohort(y);
        if !out.contains(&cohort) {
            out.push(cohort);
        }
    }
    out
}
