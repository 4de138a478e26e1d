//! Normalisation of presentation fragments into canonical values.
//!
//! Result pages mix relative dates, localised count strings and
//! double-encoded thumbnail links into otherwise plain text. The helpers
//! here turn those fragments into `yyyy-MM-dd` dates, integers and
//! absolute URLs, or give up and return `None`.

use chrono::{Days, NaiveDate};
use url::Url;

/// Separator between a leading date phrase and the snippet body.
const DATE_SEPARATOR: &str = " · ";

/// A date phrase is only recognised when the separator starts within
/// this many characters of the snippet.
const DATE_PHRASE_MAX_CHARS: usize = 20;

/// Canonical output format for derived dates.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Wrapper fragments removed from the total-match summary text.
const COUNT_WRAPPERS: &[&str] = &["约 ", " 个结果", "About ", " results", ","];

/// Split a raw snippet into an optional derived date and the body text.
///
/// `"3天前 · body"` becomes `(Some(today - 3 days), "body")`. When no
/// separator appears near the start the whole input is body. A phrase that
/// does not parse as a date is dropped; the body is kept either way.
pub fn split_date_and_body(input: &str, today: NaiveDate) -> (Option<String>, &str) {
    let Some(index) = input.find(DATE_SEPARATOR) else {
        return (None, input);
    };
    if input[..index].chars().count() >= DATE_PHRASE_MAX_CHARS {
        return (None, input);
    }

    let phrase = input[..index].trim();
    let body = &input[index + DATE_SEPARATOR.len()..];
    let date = parse_date_phrase(phrase, today).map(|d| d.format(DATE_FORMAT).to_string());
    (date, body)
}

/// Interpret a date phrase relative to `today`.
///
/// Rules, first match wins:
/// 1. `N天前` / `N天之前` → `today - N days`
/// 2. anything else ending in `之前` → `today`
/// 3. `YYYY年M月D日`
pub fn parse_date_phrase(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let days_ago = phrase
        .strip_suffix("天之前")
        .or_else(|| phrase.strip_suffix("天前"));
    if let Some(days) = days_ago {
        let days: u64 = days.trim().parse().ok()?;
        return today.checked_sub_days(Days::new(days));
    }
    if phrase.ends_with("之前") {
        return Some(today);
    }
    NaiveDate::parse_from_str(phrase, "%Y年%m月%d日").ok()
}

/// Parse the "about N results" summary into a count.
///
/// Returns `None` (not zero) when the text is missing or does not reduce
/// to an integer, so callers can tell "unknown" from "no matches".
pub fn parse_total_count(input: Option<&str>) -> Option<u64> {
    let mut cleaned = input?.trim().to_owned();
    for wrapper in COUNT_WRAPPERS {
        cleaned = cleaned.replace(wrapper, "");
    }
    cleaned.trim().parse().ok()
}

/// Cut `input` to at most `max_chars` characters. No ellipsis is added.
pub fn truncate_snippet(input: &str, max_chars: usize) -> String {
    match input.char_indices().nth(max_chars) {
        Some((byte_index, _)) => input[..byte_index].to_owned(),
        None => input.to_owned(),
    }
}

/// Recover the full-size image URL from a thumbnail anchor value.
///
/// The raw value (an `aria-label` or `href`) is entity-decoded, resolved
/// against `host` and its `mediaurl` query parameter returned.
pub fn media_url(host: &Url, raw: &str) -> Option<String> {
    let decoded = html_escape::decode_html_entities(raw.trim());
    let resolved = host.join(&decoded).ok()?;
    resolved
        .query_pairs()
        .find(|(key, _)| key == "mediaurl")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Form-encode a query for use in a URL query string.
pub fn encode_query(query: &str) -> String {
    url::form_urlencoded::byte_serialize(query.as_bytes()).collect()
}
