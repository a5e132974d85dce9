//! Extraction from archived status pages.
//!
//! Status page markup changed several times over the years. Each layout gets
//! its own [`ExtractionStrategy`], tried in order from newest to oldest.

use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

use super::text::leading_mention;

/// Fields recovered from a status page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlFields {
    pub text: String,
    pub reply_to_handle: Option<String>,
    pub quoted_handle: Option<String>,
    pub quoted_text: Option<String>,
}

/// One page layout.
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// CSS selector for the element holding the post text.
    fn marker(&self) -> &'static str;

    /// Extract from the single element matching [`marker`](Self::marker).
    /// `None` means the layout did not fit after all.
    fn try_extract(&self, element: ElementRef<'_>) -> Option<HtmlFields>;
}

/// Large-text layout with quote and reply context around the text.
pub struct JumboText;

/// Mid-size text layout.
pub struct LargeText;

/// Permalink overlay layout.
pub struct OpenedTweet;

/// Preexpanded conversation layout.
pub struct Preexpanded;

impl ExtractionStrategy for JumboText {
    fn name(&self) -> &'static str {
        "jumbo"
    }

    fn marker(&self) -> &'static str {
        "p.TweetTextSize--jumbo"
    }

    fn try_extract(&self, element: ElementRef<'_>) -> Option<HtmlFields> {
        let text = text_with_emoji(element)?;
        if text.is_empty() {
            return None;
        }
        let mut fields = HtmlFields {
            text,
            ..HtmlFields::default()
        };

        let Some(parent) = element.parent().and_then(ElementRef::wrap) else {
            return Some(fields);
        };

        let next_div = parent
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "div");
        if let Some(quote) = next_div {
            let handle = first_text(quote, "span.username");
            let body = first_text(quote, "div.QuoteTweet-text");
            match (handle, body) {
                (Some(handle), Some(body)) => {
                    fields.quoted_handle = Some(handle.replace('@', ""));
                    fields.quoted_text = Some(body.trim().to_string());
                }
                _ => {
                    fields.quoted_handle = Some(String::new());
                    fields.quoted_text = Some(String::new());
                }
            }
        }

        let prev_div = parent
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "div");
        if let Some(context) = prev_div {
            if context.text().collect::<String>().contains("Replying to") {
                let handle = first_text(context, "span.username").unwrap_or_default();
                fields.reply_to_handle = Some(handle.replace('@', ""));
            }
        }

        Some(fields)
    }
}

impl ExtractionStrategy for LargeText {
    fn name(&self) -> &'static str {
        "26px"
    }

    fn marker(&self) -> &'static str {
        "p.TweetTextSize--26px"
    }

    fn try_extract(&self, element: ElementRef<'_>) -> Option<HtmlFields> {
        text_with_emoji(element).map(mention_fields)
    }
}

impl ExtractionStrategy for OpenedTweet {
    fn name(&self) -> &'static str {
        "opened-tweet"
    }

    fn marker(&self) -> &'static str {
        "div.opened-tweet"
    }

    fn try_extract(&self, element: ElementRef<'_>) -> Option<HtmlFields> {
        nested_tweet_text(element)
    }
}

impl ExtractionStrategy for Preexpanded {
    fn name(&self) -> &'static str {
        "preexpanded"
    }

    fn marker(&self) -> &'static str {
        "div.preexpanded"
    }

    fn try_extract(&self, element: ElementRef<'_>) -> Option<HtmlFields> {
        nested_tweet_text(element)
    }
}

/// Layouts in the order they are tried.
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(JumboText),
        Box::new(LargeText),
        Box::new(OpenedTweet),
        Box::new(Preexpanded),
    ]
}

/// Run strategies in order. A strategy is only attempted when its marker
/// matches exactly one element; the first successful extraction wins.
pub fn extract_html(
    body: &str,
    strategies: &[Box<dyn ExtractionStrategy>],
) -> Option<HtmlFields> {
    let document = Html::parse_document(body);

    for strategy in strategies {
        let selector = match Selector::parse(strategy.marker()) {
            Ok(s) => s,
            Err(e) => {
                debug!("Invalid marker for {}: {:?}", strategy.name(), e);
                continue;
            }
        };
        let mut matches = document.select(&selector);
        let (Some(element), None) = (matches.next(), matches.next()) else {
            continue;
        };
        if let Some(fields) = strategy.try_extract(element) {
            debug!("Extracted with {} layout", strategy.name());
            return Some(fields);
        }
    }

    None
}

fn mention_fields(text: String) -> HtmlFields {
    HtmlFields {
        reply_to_handle: leading_mention(&text),
        quoted_handle: Some(String::new()),
        quoted_text: Some(String::new()),
        text,
    }
}

fn nested_tweet_text(container: ElementRef<'_>) -> Option<HtmlFields> {
    let selector = Selector::parse("p.js-tweet-text").ok()?;
    let element = container.select(&selector).next()?;
    text_with_emoji(element).map(mention_fields)
}

/// Text of the first descendant matching `css`.
fn first_text(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    scope
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>())
}

/// Trimmed text of an element with emoji images replaced by their alt text.
///
/// An emoji image without alt text makes the element unreadable.
fn text_with_emoji(element: ElementRef<'_>) -> Option<String> {
    let mut out = String::new();
    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.name() == "img" && el.classes().any(|c| c == "Emoji") => {
                out.push_str(el.attr("alt")?);
            }
            _ => {}
        }
    }
    Some(out.trim().to_string())
}
