//! Ordinary (organic) result extraction.
//!
//! Items missing a title or link are still emitted with those fields
//! absent; degraded output beats dropping a ranked position.

use chrono::NaiveDate;
use scraper::ElementRef;
use url::Url;

use super::chain::{attr_of, concat, element_attr, first_non_empty, text_of};
use super::selectors::Selectors;
use crate::normalize::{media_url, split_date_and_body, truncate_snippet};
use crate::types::WebResult;

pub(crate) fn extract(
    item: ElementRef<'_>,
    s: &Selectors,
    host: &Url,
    snippet_max_length: usize,
    today: NaiveDate,
) -> WebResult {
    let link = item.select(&s.organic_link).next();
    let url = first_non_empty(&[
        &|| link.and_then(|a| element_attr(a, "href")),
        &|| attr_of(item, &s.title_link, "href"),
    ]);

    let (date_last_crawled, snippet) = match raw_snippet(item, s) {
        Some(raw) => {
            let (date, body) = split_date_and_body(&raw, today);
            let body = truncate_snippet(body.trim_start(), snippet_max_length);
            (date, Some(body).filter(|b| !b.is_empty()))
        }
        None => (None, None),
    };

    WebResult {
        id: String::new(),
        name: text_of(item, &s.title_link),
        display_url: url.clone(),
        url,
        snippet,
        site_name: link.and_then(|a| element_attr(a, "aria-label")),
        site_icon: attr_of(item, &s.organic_icon, "src"),
        site_images: images(item, s, host),
        date_last_crawled,
    }
}

/// Body text before date splitting and truncation.
fn raw_snippet(item: ElementRef<'_>, s: &Selectors) -> Option<String> {
    first_non_empty(&[
        &|| text_of(item, &s.caption_two_line),
        &|| text_of(item, &s.image_caption_three_line),
        &|| {
            concat([
                text_of(item, &s.caption_three_line),
                text_of(item, &s.caption_fact_row),
            ])
        },
        &|| text_of(item, &s.quiz_go_big),
        &|| text_of(item, &s.tab_content),
    ])
}

/// Image URLs: one per horizontal-list entry, else a single fallback image.
fn images(item: ElementRef<'_>, s: &Selectors, host: &Url) -> Vec<String> {
    let entries: Vec<ElementRef<'_>> = item.select(&s.image_list_items).collect();
    if !entries.is_empty() {
        return entries
            .into_iter()
            .filter_map(|li| li.select(&s.anchor).next())
            .filter_map(|a| anchor_image(a, host))
            .collect();
    }

    first_non_empty(&[
        &|| attr_of(item, &s.canvas_icon, "src"),
        &|| {
            item.select(&s.image_pair_anchor)
                .next()
                .and_then(|a| anchor_image(a, host))
        },
    ])
    .into_iter()
    .collect()
}

fn anchor_image(anchor: ElementRef<'_>, host: &Url) -> Option<String> {
    let raw = first_non_empty(&[
        &|| element_attr(anchor, "aria-label"),
        &|| element_attr(anchor, "href"),
    ])?;
    media_url(host, &raw)
}
