use scraper::{ElementRef, Html, Selector};

use super::{parse_px, GridNode, Rect};
use crate::error::{GridflowError, GridflowResult};

/// A parsed HTML document.
///
/// Static markup carries no computed styles or layout, so the node view
/// reads `display` from the inline `style` attribute and the rectangle from
/// `data-top`/`data-left`/`data-width`/`data-height` (falling back to inline
/// `px` lengths). Pages saved by the extension carry those attributes.
pub struct HtmlPage {
    document: Html,
}

impl HtmlPage {
    pub fn parse(html_content: &str) -> Self {
        Self {
            document: Html::parse_document(html_content),
        }
    }

    /// The `<html>` element.
    pub fn root(&self) -> HtmlNode<'_> {
        HtmlNode {
            element: self.document.root_element(),
        }
    }

    /// The `<body>` element, or the root when the parser produced none.
    pub fn body(&self) -> HtmlNode<'_> {
        self.select_first("body").unwrap_or_else(|_| self.root())
    }

    pub fn select_all(&self, css: &str) -> GridflowResult<Vec<HtmlNode<'_>>> {
        let selector = Selector::parse(css).map_err(|_| GridflowError::invalid_selector(css))?;
        Ok(self
            .document
            .select(&selector)
            .map(|element| HtmlNode { element })
            .collect())
    }

    pub fn select_first(&self, css: &str) -> GridflowResult<HtmlNode<'_>> {
        self.select_all(css)?
            .into_iter()
            .next()
            .ok_or_else(|| GridflowError::node_not_found(css))
    }
}

/// An element of an [`HtmlPage`].
#[derive(Debug, Clone, Copy)]
pub struct HtmlNode<'a> {
    element: ElementRef<'a>,
}

impl<'a> HtmlNode<'a> {
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Value of one property of the inline `style` attribute.
    fn inline_style(&self, property: &str) -> Option<&'a str> {
        let style = self.attr("style")?;
        style.split(';').find_map(|rule| {
            let (name, value) = rule.split_once(':')?;
            if name.trim().eq_ignore_ascii_case(property) {
                let value = value.trim();
                Some(value.strip_suffix("!important").map(str::trim_end).unwrap_or(value))
            } else {
                None
            }
        })
    }

    fn dimension(&self, name: &str) -> f32 {
        self.attr(&format!("data-{}", name))
            .and_then(parse_px)
            .or_else(|| self.inline_style(name).and_then(parse_px))
            .unwrap_or(0.0)
    }
}

impl<'a> GridNode for HtmlNode<'a> {
    fn tag_name(&self) -> &str {
        self.element.value().name()
    }

    fn role(&self) -> Option<&str> {
        self.attr("role")
    }

    fn class_name(&self) -> &str {
        self.attr("class").unwrap_or("")
    }

    fn display(&self) -> Option<&str> {
        self.inline_style("display")
    }

    fn children(&self) -> Vec<Self> {
        self.element
            .children()
            .filter_map(ElementRef::wrap)
            .map(|element| HtmlNode { element })
            .collect()
    }

    fn parent(&self) -> Option<Self> {
        self.element
            .parent()
            .and_then(ElementRef::wrap)
            .map(|element| HtmlNode { element })
    }

    fn rect(&self) -> Rect {
        Rect {
            top: self.dimension("top"),
            left: self.dimension("left"),
            width: self.dimension("width"),
            height: self.dimension("height"),
        }
    }

    fn text(&self) -> String {
        self.element.text().collect()
    }

    fn same_node(&self, other: &Self) -> bool {
        self.element == other.element
    }
}
