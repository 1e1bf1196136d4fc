//! Currency-tagged amount detection.
use crate::model::{Currency, Prices};
use once_cell::sync::Lazy;
use regex::Regex;

// An integer, optionally grouped in thousands by spaces, commas or
// non-breaking/thin spaces: `1200`, `1 200`, `1,200`, `12 000 000`.
const AMOUNT: &str = r"\d{1,3}(?:[ ,\x{00A0}\x{202F}]\d{3})+|\d+";

// A suffix symbol must not be followed by another amount on the same line;
// `90 $150` reads as `$150`.
const SYMBOL_END: &str = r"[ \t]*(?:[^\d \t]|$)";

struct Detector {
    currency: Currency,
    pattern: Regex,
}

fn detector(currency: Currency, symbols: &str, words: &str) -> Detector {
    let mut alternatives = Vec::new();
    if !symbols.is_empty() {
        alternatives.push(format!(r"(?:{symbols})\s*(?P<a>{AMOUNT})"));
        alternatives.push(format!(r"(?P<b>{AMOUNT})\s*(?:{symbols}){SYMBOL_END}"));
    }
    if !words.is_empty() {
        alternatives.push(format!(r"(?P<c>{AMOUNT})\s*(?i:{words})"));
    }
    let source = alternatives.join("|");
    Detector {
        currency,
        pattern: Regex::new(&source).expect("currency pattern"),
    }
}

static DETECTORS: Lazy<Vec<Detector>> = Lazy::new(|| {
    vec![
        detector(Currency::Usd, r"\$", r"\bUSD\b|\bдолл(?:ар(?:ов|а|ы)?)?\b\.?"),
        detector(Currency::Eur, "€", r"\bEUR\b|\bевро\b"),
        detector(Currency::Rub, "₽", r"\bRUB\b|\bруб(?:лей|ля|ль)?\b\.?"),
        detector(Currency::Byn, "", r"\bBYN\b|\bб\.\s?р\b\.?"),
    ]
});

/// Find every currency mentioned with an amount. Each detector scans the
/// whole text independently and keeps its first positive amount.
pub fn extract_prices(text: &str) -> Prices {
    let mut prices = Prices::new();
    for det in DETECTORS.iter() {
        let amount = det.pattern.captures_iter(text).find_map(|caps| {
            if let Some(prefixed) = caps.name("a") {
                return parse_amount(prefixed.as_str());
            }
            let m = caps.name("b").or_else(|| caps.name("c"))?;
            parse_amount(adjacent_amount(&text[..m.start()], m.as_str()))
        });
        if let Some(amount) = amount {
            prices.insert(det.currency, amount);
        }
    }
    prices
}

/// A space-grouped amount only counts as one number when it starts a line or
/// follows punctuation. After a word or another number (`Air Max 95 150 USD`,
/// `Размер 42 120 USD`) only the group next to the marker is the price.
fn adjacent_amount<'t>(before: &str, raw: &'t str) -> &'t str {
    if !raw.contains(' ') {
        return raw;
    }
    let at_boundary = before
        .trim_end_matches([' ', '\t'])
        .chars()
        .next_back()
        .map_or(true, |c| !c.is_alphanumeric());
    if at_boundary {
        raw
    } else {
        raw.rsplit(' ').next().unwrap_or(raw)
    }
}

fn parse_amount(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(n) => Some(n),
    }
}

/// Choose the amount that represents a multi-currency listing: USD when
/// present, otherwise the first currency in `order` that has an amount.
pub fn primary_price(prices: &Prices, order: &[Currency]) -> Option<(Currency, u64)> {
    if let Some(&usd) = prices.get(&Currency::Usd) {
        return Some((Currency::Usd, usd));
    }
    order
        .iter()
        .find_map(|c| prices.get(c).map(|&amount| (*c, amount)))
}
