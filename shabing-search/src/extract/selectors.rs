//! Compiled CSS selectors for the result-page markup.
//!
//! This is the most volatile part of the crate: every selector here is
//! coupled to the engine's current markup.

use scraper::Selector;

use crate::error::SearchError;

/// All selectors used by the extractors, compiled once per [`super::Extractor`].
#[derive(Debug)]
pub(crate) struct Selectors {
    pub container: Selector,
    pub total_count: Selector,
    pub title_link: Selector,
    pub anchor: Selector,

    pub top_answer: Selector,
    pub top_site_name: Selector,
    pub top_icon_pair: Selector,
    pub top_icon_attribution: Selector,
    pub top_answer_body: Selector,
    pub top_card_body: Selector,
    pub top_paired_text: Selector,
    pub top_paired_caption: Selector,

    pub organic: Selector,
    pub organic_link: Selector,
    pub organic_icon: Selector,
    pub caption_two_line: Selector,
    pub image_caption_three_line: Selector,
    pub caption_three_line: Selector,
    pub caption_fact_row: Selector,
    pub quiz_go_big: Selector,
    pub tab_content: Selector,
    pub image_list_items: Selector,
    pub canvas_icon: Selector,
    pub image_pair_anchor: Selector,
}

impl Selectors {
    pub fn new() -> Result<Self, SearchError> {
        Ok(Self {
            container: compile("#b_results")?,
            total_count: compile("#b_tween_searchResults span")?,
            title_link: compile("h2 a")?,
            anchor: compile("a")?,

            top_answer: compile("li.b_ans.b_top")?,
            top_site_name: compile("div.b_attribution cite")?,
            top_icon_pair: compile("div.b_imagePair img")?,
            top_icon_attribution: compile("div.rdtopattr div.cico img")?,
            top_answer_body: compile("div.qna_body")?,
            top_card_body: compile("div.rd_card_ml")?,
            top_paired_text: compile("div.df_con div.rwrl")?,
            top_paired_caption: compile("div.df_con div.rch-cap-cntr")?,

            organic: compile("li.b_algo")?,
            organic_link: compile("div.b_tpcn a")?,
            organic_icon: compile("div.wr_fav div img")?,
            caption_two_line: compile("div.b_caption p.b_lineclamp2")?,
            image_caption_three_line: compile("div.b_imgcap_altitle p.b_lineclamp3")?,
            caption_three_line: compile("div.b_caption p.b_lineclamp3")?,
            caption_fact_row: compile("div.b_caption div.b_factrow div.b_vlist2col")?,
            quiz_go_big: compile("div.b_algoQuizGoBig")?,
            tab_content: compile("div.tab-content")?,
            image_list_items: compile("ul.b_hList li")?,
            canvas_icon: compile("div.mc_vtvc_con_rc div.b_canvas div.cico img")?,
            image_pair_anchor: compile("div.b_imgcap_altitle div.b_imagePair div.inner a")?,
        })
    }
}

fn compile(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css).map_err(|e| SearchError::Parse(format!("invalid selector `{css}`: {e:?}")))
}
