//! `tel:`, `mailto:` and `sms:` links for contacting a customer.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rust_decimal::Decimal;

use crate::calculations::common::format_money;

/// Business name used in the SMS body when none is configured.
pub const DEFAULT_BUSINESS_NAME: &str = "Vasseur Fencing";

/// Characters left as-is in an SMS body, the same set a browser's
/// `encodeURIComponent` keeps.
const SMS_BODY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Keeps the characters a dialer understands: digits and `+`.
fn dialable(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

pub fn tel_link(phone: &str) -> Option<String> {
    let number = dialable(phone);
    (!number.is_empty()).then(|| format!("tel:{number}"))
}

pub fn mailto_link(email: &str) -> Option<String> {
    let email = email.trim();
    (!email.is_empty()).then(|| format!("mailto:{email}"))
}

/// Text-message link prefilled with the estimate total, e.g.
/// `sms:2315550100?&body=Vasseur%20Fencing%20estimate%3A%20%2413%2C980.00`.
pub fn sms_link(
    phone: &str,
    business: &str,
    total: Decimal,
) -> Option<String> {
    let number = dialable(phone);
    if number.is_empty() {
        return None;
    }

    let body = format!("{business} estimate: {}", format_money(total));
    Some(format!("sms:{number}?&body={}", utf8_percent_encode(&body, SMS_BODY)))
}
