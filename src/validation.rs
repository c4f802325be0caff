use regex::Regex;
use std::sync::LazyLock;

// Shape check only: day 01-31, month 01-12, year 20xx. No calendar arithmetic.
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|[12][0-9]|3[01])-(0[1-9]|1[012])-20\d\d$")
        .expect("date pattern is a valid regex")
});

/// Whether `date` has the `DD-MM-YYYY` shape accepted on creation
pub fn is_valid_date(date: &str) -> bool {
    DATE_PATTERN.is_match(date)
}
