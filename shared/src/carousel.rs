//! Carousel construction from shop search results.

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::search::ShopRecord;

/// Maximum number of columns LINE accepts in one carousel.
pub const MAX_COLUMNS: usize = 10;

/// Column title limit.
pub const MAX_TITLE_CHARS: usize = 40;

/// Column text limit when the column has both an image and a title.
pub const MAX_TEXT_CHARS: usize = 60;

/// Alternative text shown in notifications and on clients without template support.
pub const ALT_TEXT: &str = "ラーメン一覧";

/// Label of the link to a shop's detail page.
pub const DETAIL_LABEL: &str = "詳細";

const IMAGE_BACKGROUND: &str = "#FFFFFF";

#[derive(Error, Debug, PartialEq)]
pub enum CarouselError {
    #[error("No shops to build a carousel from")]
    Empty,
}

/// URI action attached to a column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UriAction {
    #[serde(rename = "type")]
    pub action_type: &'static str,
    pub label: String,
    pub uri: String,
}

/// A single carousel column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselCard {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub thumbnail_image_url: String,
    pub image_background_color: &'static str,
    pub title: String,
    pub text: String,
    pub actions: Vec<UriAction>,
}

/// Carousel template body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Carousel {
    #[serde(rename = "type")]
    pub template_type: &'static str,
    pub image_aspect_ratio: &'static str,
    pub image_size: &'static str,
    pub columns: Vec<CarouselCard>,
}

impl Carousel {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Build a carousel from search results.
///
/// Records without a name, address, or detail link are skipped. At most
/// [`MAX_COLUMNS`] cards are produced, in input order.
///
/// LINE rejects a carousel where only some columns carry an image, so if any
/// kept record has no photo the thumbnails are dropped from every column.
pub fn build(shops: &[ShopRecord]) -> Result<Carousel, CarouselError> {
    let mut columns: Vec<CarouselCard> = shops
        .iter()
        .filter_map(card_from_shop)
        .take(MAX_COLUMNS)
        .collect();

    if columns.is_empty() {
        return Err(CarouselError::Empty);
    }

    if columns.iter().any(|c| c.thumbnail_image_url.is_empty()) {
        warn!("Shop without photo in results, omitting all thumbnails");
        for column in &mut columns {
            column.thumbnail_image_url.clear();
        }
    }

    Ok(Carousel {
        template_type: "carousel",
        image_aspect_ratio: "rectangle",
        image_size: "cover",
        columns,
    })
}

fn card_from_shop(shop: &ShopRecord) -> Option<CarouselCard> {
    let name = shop.name.trim();
    let address = shop.address.trim();
    let detail_url = shop.detail_url().trim();

    if name.is_empty() || address.is_empty() || detail_url.is_empty() {
        warn!(name, "Skipping shop with missing name, address, or detail URL");
        return None;
    }

    Some(CarouselCard {
        thumbnail_image_url: shop.photo_url().trim().to_string(),
        image_background_color: IMAGE_BACKGROUND,
        title: truncate_chars(name, MAX_TITLE_CHARS),
        text: truncate_chars(address, MAX_TEXT_CHARS),
        actions: vec![UriAction {
            action_type: "uri",
            label: DETAIL_LABEL.to_string(),
            uri: detail_url.to_string(),
        }],
    })
}

/// Shorten `s` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
