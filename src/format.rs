//! Display formatting for dates and currency. Presentation only; nothing
//! here feeds back into the numeric fields of a record.

use chrono::NaiveDate;

/// `MM/DD/YYYY`, zero-padded
pub fn us_date(date: NaiveDate) -> String {
    date.format("%m/%d/%Y").to_string()
}

/// US currency string, e.g. `$13,775.00` or `-$42.50`
pub fn usd(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let dollars = (cents / 100).to_string();

    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

/// Two-decimal GPA string
pub fn gpa(value: f64) -> String {
    format!("{:.2}", value)
}

/// Credit hours without a trailing `.0` for whole values
pub fn hours(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
