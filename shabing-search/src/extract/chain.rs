//! Selector fallback chains.
//!
//! Every field is read through an ordered list of attempts, each trying
//! one DOM shape. The first attempt yielding a non-empty value wins; an
//! exhausted chain leaves the field absent.

use scraper::{ElementRef, Selector};

/// One extraction attempt in a fallback chain.
pub(crate) type Attempt<'a> = &'a dyn Fn() -> Option<String>;

/// Run `attempts` in order and return the first non-empty value.
pub(crate) fn first_non_empty(attempts: &[Attempt<'_>]) -> Option<String> {
    attempts
        .iter()
        .filter_map(|attempt| attempt())
        .find(|value| !value.is_empty())
}

/// Trimmed text content of `element`, or `None` if it is blank.
pub(crate) fn element_text(element: ElementRef<'_>) -> Option<String> {
    non_empty(element.text().collect::<String>().trim())
}

/// Trimmed attribute value of `element`, or `None` if missing or blank.
pub(crate) fn element_attr(element: ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).and_then(|v| non_empty(v.trim()))
}

/// Text of the first descendant of `scope` matching `selector`.
pub(crate) fn text_of(scope: ElementRef<'_>, selector: &Selector) -> Option<String> {
    scope.select(selector).next().and_then(element_text)
}

/// Attribute of the first descendant of `scope` matching `selector`.
pub(crate) fn attr_of(scope: ElementRef<'_>, selector: &Selector, name: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|element| element_attr(element, name))
}

/// Concatenate optional text blocks, treating missing blocks as empty.
pub(crate) fn concat<const N: usize>(parts: [Option<String>; N]) -> Option<String> {
    non_empty(&parts.into_iter().flatten().collect::<String>())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}
