//! Extraction of shop listings from a findbook search results page.

use librakeeper_core::error::AppError;
use librakeeper_core::models::BookListing;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const RESULTS_SECTION: &str = "section.container.results";
const RESULT_LINE: &str = "div.row.results__line";
const TITLE: &str = "div.results__book-name > a";
const AUTHOR: &str = "div.results__authors";
const PUBLISHER: &str = "div.results__publishing";
const COVER: &str = "a.results__image > img";
const SHOP_NAME: &str = "div.results__shop-name > a";
const PAGINATION_LINK: &str = "div.pagination__pages a";
const NEXT_PAGE_ICON: &str = "i.icon-angle-right";

/// Everything taken from one results page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsPage {
    pub listings: Vec<BookListing>,
    /// Absolute URL of the following page, if the pager offers one.
    pub next_page: Option<Url>,
}

/// Parse a results page fetched from `page_url`.
///
/// A page without a results section yields no listings; that is not an
/// error. Placeholder covers are normalized to an empty URL.
pub fn parse_results_page(html: &str, page_url: &Url) -> Result<ResultsPage, AppError> {
    let document = Html::parse_document(html);

    let section_sel = selector(RESULTS_SECTION)?;
    let line_sel = selector(RESULT_LINE)?;
    let fields = FieldSelectors::new()?;

    let listings = document
        .select(&section_sel)
        .flat_map(|section| section.select(&line_sel))
        .map(|line| fields.listing(line).normalize_cover())
        .collect();

    Ok(ResultsPage {
        listings,
        next_page: next_page_url(&document, page_url)?,
    })
}

struct FieldSelectors {
    title: Selector,
    author: Selector,
    publisher: Selector,
    cover: Selector,
    shop_name: Selector,
}

impl FieldSelectors {
    fn new() -> Result<Self, AppError> {
        Ok(Self {
            title: selector(TITLE)?,
            author: selector(AUTHOR)?,
            publisher: selector(PUBLISHER)?,
            cover: selector(COVER)?,
            shop_name: selector(SHOP_NAME)?,
        })
    }

    fn listing(&self, line: ElementRef<'_>) -> BookListing {
        BookListing {
            title: child_text(line, &self.title),
            author: child_text(line, &self.author),
            publisher: child_text(line, &self.publisher),
            cover_url: child_attr(line, &self.cover, "src"),
            shop_name: child_text(line, &self.shop_name),
        }
    }
}

fn next_page_url(document: &Html, page_url: &Url) -> Result<Option<Url>, AppError> {
    let link_sel = selector(PAGINATION_LINK)?;
    let icon_sel = selector(NEXT_PAGE_ICON)?;

    let href = document
        .select(&link_sel)
        .find(|link| link.select(&icon_sel).next().is_some())
        .and_then(|link| link.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty());

    match href {
        Some(href) => match page_url.join(href) {
            Ok(url) => Ok(Some(url)),
            Err(e) => {
                tracing::warn!(%href, error = %e, "Ignoring unresolvable next-page link");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

fn selector(css: &str) -> Result<Selector, AppError> {
    Selector::parse(css).map_err(|e| AppError::ParseError(format!("Invalid selector '{css}': {e}")))
}

/// Text of the first match, with runs of whitespace collapsed.
fn child_text(element: ElementRef<'_>, sel: &Selector) -> String {
    element
        .select(sel)
        .next()
        .map(|child| {
            child
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

fn child_attr(element: ElementRef<'_>, sel: &Selector, attr: &str) -> String {
    element
        .select(sel)
        .next()
        .and_then(|child| child.value().attr(attr))
        .map(|value| value.trim().to_string())
        .unwrap_or_default()
}
