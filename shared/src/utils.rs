// Shared helpers for the locale quirks of the clipping data: Brazilian and
// American number conventions, `dd/mm/yyyy` dates and pt-BR display labels.

pub mod brazilian_format {
    use chrono::{Datelike, NaiveDate};

    use crate::models::RawValue;

    const PT_BR_MONTHS: [&str; 12] = [
        "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
    ];

    /// Reads a numeric-ish cell as a finite float. Never fails: anything
    /// absent, blank or unparseable is 0.
    pub fn parse_value(input: Option<&RawValue>) -> f64 {
        match input {
            None => 0.0,
            Some(RawValue::Number(n)) if n.is_finite() => *n,
            Some(RawValue::Number(_)) => 0.0,
            Some(RawValue::Text(s)) => parse_decimal_str(s),
        }
    }

    /// Parses "1.234,56" or "1,234.56". The convention is picked by whichever
    /// separator occurs last: a trailing comma means Brazilian.
    pub fn parse_decimal_str(s: &str) -> f64 {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return 0.0;
        }
        let normalized = match (trimmed.rfind(','), trimmed.rfind('.')) {
            (Some(comma), dot) if dot.map_or(true, |dot| comma > dot) => {
                trimmed.replace('.', "").replacen(',', ".", 1)
            }
            _ => trimmed.replace(',', ""),
        };
        leading_float(&normalized).unwrap_or(0.0)
    }

    // Longest `[sign] digits [. digits] [e [sign] digits]` prefix, parsed.
    fn leading_float(s: &str) -> Option<f64> {
        let s = s.trim_start();
        let bytes = s.as_bytes();
        let digits_from = |mut i: usize| {
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            i
        };

        let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
        let int_end = digits_from(end);
        let mut mantissa_digits = int_end - end;
        end = int_end;

        if bytes.get(end) == Some(&b'.') {
            let frac_end = digits_from(end + 1);
            let frac_digits = frac_end - (end + 1);
            if mantissa_digits + frac_digits > 0 {
                mantissa_digits += frac_digits;
                end = frac_end;
            }
        }
        if mantissa_digits == 0 {
            return None;
        }

        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp_start = end + 1;
            if matches!(bytes.get(exp_start), Some(b'+' | b'-')) {
                exp_start += 1;
            }
            let exp_end = digits_from(exp_start);
            if exp_end > exp_start {
                end = exp_end;
            }
        }

        s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// Parses a strict `DD/MM/YYYY` date. Anything else, including impossible
    /// calendar dates such as `31/04/2024`, is `None`.
    pub fn parse_date(s: &str) -> Option<NaiveDate> {
        let mut parts = s.trim().split('/');
        let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }
        let well_formed = [(day, 2), (month, 2), (year, 4)]
            .iter()
            .all(|(token, len)| token.len() == *len && token.bytes().all(|b| b.is_ascii_digit()));
        if !well_formed {
            return None;
        }
        NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
    }

    /// `YYYY-MM-DD`
    pub fn day_key(date: NaiveDate) -> String {
        format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
    }

    /// `YYYY-MM`
    pub fn month_key(date: NaiveDate) -> String {
        format!("{:04}-{:02}", date.year(), date.month())
    }

    /// `DD/MM/YY`
    pub fn day_label(date: NaiveDate) -> String {
        format!("{:02}/{:02}/{:02}", date.day(), date.month(), date.year().rem_euclid(100))
    }

    /// `mmm/YY` with pt-BR month abbreviations, e.g. `mar/24`.
    pub fn month_label(date: NaiveDate) -> String {
        format!("{}/{:02}", PT_BR_MONTHS[date.month0() as usize], date.year().rem_euclid(100))
    }

    /// Formats with `.` thousands and `,` decimals: 1234.5 -> "1.234,50".
    pub fn format_decimal(value: f64, decimals: usize) -> String {
        let formatted = format!("{:.decimals$}", value.abs(), decimals = decimals);
        let (int_part, frac_part) = match formatted.split_once('.') {
            Some((int_part, frac_part)) => (int_part, Some(frac_part)),
            None => (formatted.as_str(), None),
        };

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, c) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }

        let sign = if value < 0.0 && formatted.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
            "-"
        } else {
            ""
        };
        match frac_part {
            Some(frac) => format!("{}{},{}", sign, grouped, frac),
            None => format!("{}{}", sign, grouped),
        }
    }

    /// BRL currency: 1234.56 -> "R$ 1.234,56".
    pub fn format_currency(value: f64) -> String {
        let amount = format_decimal(value, 2);
        match amount.strip_prefix('-') {
            Some(abs) => format!("-R$ {}", abs),
            None => format!("R$ {}", amount),
        }
    }

    /// Compact magnitude label used by the KPI cards: 1.5M, 12.0K, 950.
    pub fn format_compact(value: f64) -> String {
        if value >= 1_000_000_000.0 {
            format!("{:.1}B", value / 1_000_000_000.0)
        } else if value >= 1_000_000.0 {
            format!("{:.1}M", value / 1_000_000.0)
        } else if value >= 1_000.0 {
            format!("{:.1}K", value / 1_000.0)
        } else {
            format!("{:.0}", value)
        }
    }

}
