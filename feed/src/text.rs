use lazy_static::lazy_static;
use regex::Regex;
use scraper::Html;

lazy_static! {
    static ref WS: Regex = Regex::new(r"\s+").expect("valid regex");
    static ref SPACE_BEFORE_PUNCT: Regex = Regex::new(r"\s+([.,;:!?])").expect("valid regex");
}

/// Strip markup from an HTML fragment, keeping text nodes separated by single spaces.
pub fn html_to_text(html: &str) -> String {
    if html.trim().is_empty() { return String::new(); }
    let fragment = Html::parse_fragment(html);
    let joined = fragment.root_element().text().collect::<Vec<_>>().join(" ");
    let collapsed = WS.replace_all(&joined, " ");
    SPACE_BEFORE_PUNCT.replace_all(collapsed.trim(), "$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_and_entities() {
        let t = html_to_text("<p>Set on the desert planet <i>Arrakis</i>.</p><p>A&amp;B</p>");
        assert_eq!(t, "Set on the desert planet Arrakis. A&B");
    }

    #[test]
    fn empty_description() {
        assert_eq!(html_to_text("   "), "");
    }
}
