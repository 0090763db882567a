//! Locale → currency detection and locale-aware price formatting.
//!
//! Catalog prices are stored in the base currency and converted for display
//! with a single exchange rate.

/// Currency all catalog prices are expressed in.
pub const BASE_CURRENCY: &str = "USD";

/// Locale used when nothing usable is detected.
pub const DEFAULT_LOCALE: &str = "en-US";

/// Ordered locale table; prefix fallback picks the first `<lang>-*` entry.
const LOCALE_CURRENCIES: &[(&str, &str)] = &[
    // Americas
    ("en-US", "USD"),
    ("en-CA", "CAD"),
    ("fr-CA", "CAD"),
    ("pt-BR", "BRL"),
    ("es-MX", "MXN"),
    ("es-AR", "ARS"),
    ("es-CL", "CLP"),
    ("es-CO", "COP"),
    ("es-PE", "PEN"),
    // Euro zone
    ("fr-FR", "EUR"),
    ("de-DE", "EUR"),
    ("es-ES", "EUR"),
    ("it-IT", "EUR"),
    ("pt-PT", "EUR"),
    ("nl-NL", "EUR"),
    ("nl-BE", "EUR"),
    ("fr-BE", "EUR"),
    ("de-AT", "EUR"),
    ("fi-FI", "EUR"),
    ("el-GR", "EUR"),
    ("sk-SK", "EUR"),
    ("sl-SI", "EUR"),
    ("et-EE", "EUR"),
    ("lv-LV", "EUR"),
    ("lt-LT", "EUR"),
    ("mt-MT", "EUR"),
    ("fr-LU", "EUR"),
    // Europe outside the euro
    ("en-GB", "GBP"),
    ("sv-SE", "SEK"),
    ("da-DK", "DKK"),
    ("nb-NO", "NOK"),
    ("nn-NO", "NOK"),
    ("pl-PL", "PLN"),
    ("cs-CZ", "CZK"),
    ("hu-HU", "HUF"),
    ("ro-RO", "RON"),
    ("bg-BG", "BGN"),
    ("fr-CH", "CHF"),
    ("de-CH", "CHF"),
    ("it-CH", "CHF"),
    ("uk-UA", "UAH"),
    ("ru-RU", "RUB"),
    ("tr-TR", "TRY"),
    ("kk-KZ", "KZT"),
    // Asia-Pacific
    ("en-AU", "AUD"),
    ("en-NZ", "NZD"),
    ("ja-JP", "JPY"),
    ("zh-CN", "CNY"),
    ("zh-TW", "TWD"),
    ("zh-HK", "HKD"),
    ("ko-KR", "KRW"),
    ("hi-IN", "INR"),
    ("th-TH", "THB"),
    ("id-ID", "IDR"),
    ("ms-MY", "MYR"),
    ("vi-VN", "VND"),
    ("fil-PH", "PHP"),
    ("en-SG", "SGD"),
    ("en-IN", "INR"),
    ("en-PH", "PHP"),
    // Middle East & Africa
    ("ar-SA", "SAR"),
    ("ar-AE", "AED"),
    ("ar-LY", "LYD"),
    ("ar-EG", "EGP"),
    ("ar-MA", "MAD"),
    ("he-IL", "ILS"),
    ("en-ZA", "ZAR"),
    ("en-NG", "NGN"),
    ("sw-KE", "KES"),
    ("fr-MA", "MAD"),
];

/// Normalizes POSIX and BCP 47 spellings (`en_US.UTF-8`, `en-us`) to `en-US`.
///
/// Returns `None` for empty input and the `C`/`POSIX` pseudo-locales.
#[must_use]
pub fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace('_', "-");
    if tag.is_empty() || tag.eq_ignore_ascii_case("C") || tag.eq_ignore_ascii_case("POSIX") {
        return None;
    }

    let mut parts = tag.split('-').filter(|p| !p.is_empty());
    let lang = parts.next()?.to_ascii_lowercase();
    match parts.next() {
        Some(region) => Some(format!("{lang}-{}", region.to_ascii_uppercase())),
        None => Some(lang),
    }
}

/// Maps a locale to its currency code.
///
/// Exact table match first, then the first entry sharing the language prefix,
/// then the base currency.
#[must_use]
pub fn currency_for_locale(locale: &str) -> &'static str {
    if let Some((_, code)) = LOCALE_CURRENCIES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(locale))
    {
        return code;
    }

    let lang = locale.split('-').next().unwrap_or_default();
    if lang.is_empty() {
        return BASE_CURRENCY;
    }
    let prefix = format!("{}-", lang.to_ascii_lowercase());
    LOCALE_CURRENCIES
        .iter()
        .find(|(key, _)| key.to_ascii_lowercase().starts_with(&prefix))
        .map_or(BASE_CURRENCY, |(_, code)| code)
}

//
// ─── FORMATTING ────────────────────────────────────────────────────────────────
//

const NBSP: char = '\u{a0}';

#[derive(Debug, Clone, Copy)]
struct NumberStyle {
    group: &'static str,
    symbol_first: bool,
    symbol_spaced: bool,
}

fn number_style(locale: &str) -> NumberStyle {
    const PREFIX_COMMA: NumberStyle = NumberStyle {
        group: ",",
        symbol_first: true,
        symbol_spaced: false,
    };
    let (lang, region) = locale.split_once('-').unwrap_or((locale, ""));
    match (lang, region) {
        (_, "CH") => NumberStyle {
            group: "\u{2019}",
            symbol_first: true,
            symbol_spaced: true,
        },
        ("fr", _) => NumberStyle {
            group: "\u{202f}",
            symbol_first: false,
            symbol_spaced: true,
        },
        ("fi" | "sv" | "nb" | "nn" | "pl" | "cs" | "sk" | "hu" | "et" | "lv" | "lt" | "uk"
        | "ru" | "kk" | "bg", _) => NumberStyle {
            group: "\u{a0}",
            symbol_first: false,
            symbol_spaced: true,
        },
        ("de" | "es" | "it" | "el" | "sl" | "ro" | "da" | "vi" | "ar", _)
        | ("pt", "PT") => NumberStyle {
            group: ".",
            symbol_first: false,
            symbol_spaced: true,
        },
        ("pt" | "nl" | "id", _) => NumberStyle {
            group: ".",
            symbol_first: true,
            symbol_spaced: true,
        },
        ("tr", _) => NumberStyle {
            group: ".",
            symbol_first: true,
            symbol_spaced: false,
        },
        _ => PREFIX_COMMA,
    }
}

fn currency_symbol(currency: &str) -> &str {
    match currency {
        "USD" | "CAD" | "AUD" | "NZD" | "SGD" | "MXN" | "ARS" | "CLP" | "COP" => "$",
        "EUR" => "€",
        "GBP" => "£",
        "JPY" | "CNY" => "¥",
        "INR" => "₹",
        "KRW" => "₩",
        "BRL" => "R$",
        "HKD" => "HK$",
        "TWD" => "NT$",
        "SEK" | "NOK" => "kr",
        "DKK" => "kr.",
        "PLN" => "zł",
        "CZK" => "Kč",
        "HUF" => "Ft",
        "BGN" => "лв.",
        "UAH" => "₴",
        "RUB" => "₽",
        "TRY" => "₺",
        "KZT" => "₸",
        "THB" => "฿",
        "IDR" => "Rp",
        "MYR" => "RM",
        "VND" => "₫",
        "PHP" => "₱",
        "ILS" => "₪",
        "ZAR" => "R",
        "NGN" => "₦",
        "KES" => "Ksh",
        "PEN" => "S/",
        "EGP" => "E£",
        other => other,
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Formats `amount` in `currency` the way `locale` writes prices, with no decimals.
#[must_use]
pub fn format_currency(amount: f64, locale: &str, currency: &str) -> String {
    let style = number_style(locale);
    let rounded = if amount.is_finite() { amount.round() } else { 0.0 };
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());
    let number = group_digits(&digits, style.group);
    let symbol = currency_symbol(currency);

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if style.symbol_first {
        out.push_str(symbol);
        if style.symbol_spaced {
            out.push(NBSP);
        }
        out.push_str(&number);
    } else {
        out.push_str(&number);
        if style.symbol_spaced {
            out.push(NBSP);
        }
        out.push_str(symbol);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_posix_locales() {
        assert_eq!(normalize_locale("en_US.UTF-8").as_deref(), Some("en-US"));
        assert_eq!(normalize_locale("de-de").as_deref(), Some("de-DE"));
        assert_eq!(normalize_locale("fr").as_deref(), Some("fr"));
        assert_eq!(normalize_locale("C.UTF-8"), None);
        assert_eq!(normalize_locale(""), None);
    }

    #[test]
    fn exact_locale_match() {
        assert_eq!(currency_for_locale("en-GB"), "GBP");
        assert_eq!(currency_for_locale("ja-JP"), "JPY");
        assert_eq!(currency_for_locale("ar-LY"), "LYD");
    }

    #[test]
    fn language_prefix_takes_first_table_entry() {
        assert_eq!(currency_for_locale("fr"), "CAD");
        assert_eq!(currency_for_locale("de-LI"), "EUR");
        assert_eq!(currency_for_locale("es-UY"), "MXN");
    }

    #[test]
    fn unknown_locale_defaults_to_base_currency() {
        assert_eq!(currency_for_locale("xx-YY"), BASE_CURRENCY);
        assert_eq!(currency_for_locale(""), BASE_CURRENCY);
    }

    #[test]
    fn formats_us_dollars() {
        assert_eq!(format_currency(1234.4, "en-US", "USD"), "$1,234");
        assert_eq!(format_currency(49.5, "en-US", "USD"), "$50");
        assert_eq!(format_currency(0.0, "en-US", "USD"), "$0");
    }

    #[test]
    fn formats_euro_after_the_amount() {
        assert_eq!(format_currency(1234.0, "de-DE", "EUR"), "1.234\u{a0}€");
        assert_eq!(
            format_currency(1_234_567.0, "fr-FR", "EUR"),
            "1\u{202f}234\u{202f}567\u{a0}€"
        );
    }

    #[test]
    fn unknown_currency_uses_its_code() {
        assert_eq!(format_currency(10.0, "ar-SA", "SAR"), "10\u{a0}SAR");
    }

    #[test]
    fn groups_only_above_three_digits() {
        assert_eq!(group_digits("999", ","), "999");
        assert_eq!(group_digits("1000", ","), "1,000");
    }
}
