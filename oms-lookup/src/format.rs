use chrono::{DateTime, Local, TimeZone, Utc};
use std::fmt::Display;

const NBSP: char = '\u{a0}';

/// en-US symbols; other codes print as the code itself
fn symbol(code: &str) -> Option<&'static str> {
    let symbol = match code {
        "USD" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" => "¥",
        "CNY" => "CN¥",
        "INR" => "₹",
        "KRW" => "₩",
        "ILS" => "₪",
        "BRL" => "R$",
        "CAD" => "CA$",
        "AUD" => "A$",
        "MXN" => "MX$",
        "HKD" => "HK$",
        "NZD" => "NZ$",
        "TWD" => "NT$",
        "VND" => "₫",
        "PHP" => "₱",
        _ => return None,
    };
    Some(symbol)
}

fn fraction_digits(code: &str) -> u32 {
    match code {
        "JPY" | "KRW" | "VND" => 0,
        _ => 2,
    }
}

fn group_thousands(mut value: u64) -> String {
    let mut groups = Vec::new();
    loop {
        let group = value % 1000;
        value /= 1000;
        if value == 0 {
            groups.push(group.to_string());
            break;
        }
        groups.push(format!("{:03}", group));
    }
    groups.reverse();
    groups.join(",")
}

/// Formats an amount given in minor units (`amount / 100`) the way en-US
/// renders currency, e.g. `181700, "USD"` becomes `$1,817.00`.
pub fn format_currency(minor_units: i64, currency: &str) -> String {
    let code = currency.trim().to_ascii_uppercase();
    let negative = minor_units < 0;
    let abs = minor_units.unsigned_abs();

    let number = if fraction_digits(&code) == 0 {
        // Round half away from zero
        group_thousands((abs + 50) / 100)
    } else {
        format!("{}.{:02}", group_thousands(abs / 100), abs % 100)
    };

    let sign = if negative { "-" } else { "" };
    match symbol(&code) {
        Some(symbol) => format!("{sign}{symbol}{number}"),
        None => format!("{sign}{code}{NBSP}{number}"),
    }
}

/// Renders a timestamp in the local time zone as `M/D/YYYY, h:mm:ss AM|PM`
pub fn format_date(date: &DateTime<Utc>) -> String {
    format_date_in(date, &Local)
}

pub fn format_date_in<Tz>(date: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    date.with_timezone(tz).format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}
