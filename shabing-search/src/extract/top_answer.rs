//! Featured "top answer" card extraction.
//!
//! Unlike ordinary results, a card without both a title and a link is
//! rejected outright.

use scraper::ElementRef;

use super::chain::{attr_of, concat, element_attr, element_text, first_non_empty, text_of};
use super::selectors::Selectors;
use crate::normalize::truncate_snippet;
use crate::types::WebResult;

pub(crate) fn extract(
    container: ElementRef<'_>,
    s: &Selectors,
    snippet_max_length: usize,
) -> Option<WebResult> {
    let card = container.select(&s.top_answer).next()?;
    let link = card.select(&s.title_link).next()?;
    let name = element_text(link)?;
    let url = element_attr(link, "href")?;

    let site_icon = first_non_empty(&[
        &|| attr_of(card, &s.top_icon_pair, "src"),
        &|| attr_of(card, &s.top_icon_attribution, "src"),
    ]);
    let snippet = first_non_empty(&[
        &|| text_of(card, &s.top_answer_body),
        &|| text_of(card, &s.top_card_body),
        &|| {
            concat([
                text_of(card, &s.top_paired_text),
                text_of(card, &s.top_paired_caption),
            ])
        },
    ])
    .map(|body| truncate_snippet(&body, snippet_max_length));

    Some(WebResult {
        id: String::new(),
        name: Some(name),
        display_url: Some(url.clone()),
        url: Some(url),
        snippet,
        site_name: text_of(card, &s.top_site_name),
        site_icon,
        site_images: Vec::new(),
        date_last_crawled: None,
    })
}
