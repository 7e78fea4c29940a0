//! Infinite-scroll thumbnail grid

use std::collections::HashMap;

use iced::widget::image::Handle;
use iced::widget::{
    button, column, container, horizontal_space, image, row, scrollable, text, text_input,
};
use iced::{Alignment, ContentFit, Element, Length, Size};
use iced_aw::Wrap;

use crate::state::data::ImageRecord;
use crate::state::loader::{LoaderState, PageLoader};
use crate::Message;

const CARD_WIDTH: f32 = 240.0;
const CARD_HEIGHT: f32 = 180.0;
const CARD_PADDING: f32 = 6.0;
const CAPTION_HEIGHT: f32 = 20.0;
const SPACING: f32 = 12.0;
const PADDING: f32 = 20.0;
/// Title row plus the gap below it
const HEADER_HEIGHT: f32 = 40.0 + 16.0;
/// Footer row plus the gap above it
const FOOTER_HEIGHT: f32 = 24.0 + 62.0;

/// Per-record thumbnail state
#[derive(Debug, Clone)]
pub enum Thumbnail {
    /// Request in flight, a skeleton is shown
    Pending,
    Ready(Handle),
    Failed,
}

/// Build the gallery screen
pub fn view<'a>(
    loader: &'a PageLoader,
    thumbnails: &'a HashMap<String, Thumbnail>,
    id_input: &'a str,
) -> Element<'a, Message> {
    let header = row![
        text("Photo Gallery").size(32),
        horizontal_space(),
        text_input("Image id", id_input)
            .on_input(Message::IdInputChanged)
            .on_submit(Message::OpenTyped)
            .width(Length::Fixed(160.0)),
        button("Open").on_press(Message::OpenTyped),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let cards: Vec<Element<Message>> = loader
        .records()
        .iter()
        .map(|record| card(record, thumbnails.get(&record.id)))
        .collect();

    let grid = Wrap::with_elements(cards)
        .spacing(SPACING)
        .line_spacing(SPACING);

    let content = column![grid, footer(loader)]
        .spacing(24)
        .width(Length::Fill);

    column![
        header,
        scrollable(content)
            .on_scroll(Message::Scrolled)
            .height(Length::Fill),
    ]
    .spacing(16)
    .padding(PADDING)
    .into()
}

/// Whether `count` cards laid out in a window of `window` size leave the
/// footer on screen without scrolling
pub fn fits_in(count: usize, window: Size) -> bool {
    let card_width = CARD_WIDTH + 2.0 * CARD_PADDING;
    let card_height = CARD_HEIGHT + CAPTION_HEIGHT + 6.0 + 2.0 * CARD_PADDING;

    let usable_width = (window.width - 2.0 * PADDING).max(card_width);
    let per_row = ((usable_width + SPACING) / (card_width + SPACING)).floor().max(1.0) as usize;
    let rows = count.div_ceil(per_row) as f32;

    let grid_height = rows * card_height + (rows - 1.0).max(0.0) * SPACING;
    let available = window.height - 2.0 * PADDING - HEADER_HEIGHT;
    grid_height + FOOTER_HEIGHT <= available
}

fn card<'a>(record: &'a ImageRecord, thumbnail: Option<&'a Thumbnail>) -> Element<'a, Message> {
    let picture: Element<Message> = match thumbnail {
        Some(Thumbnail::Ready(handle)) => image(handle.clone())
            .width(Length::Fixed(CARD_WIDTH))
            .height(Length::Fixed(CARD_HEIGHT))
            .content_fit(ContentFit::Cover)
            .into(),
        Some(Thumbnail::Failed) => placeholder("Unavailable"),
        Some(Thumbnail::Pending) | None => placeholder(""),
    };

    button(column![picture, text(&record.author).size(14)].spacing(6))
        .on_press(Message::Open(record.id.clone()))
        .padding(CARD_PADDING)
        .style(button::text)
        .into()
}

/// Skeleton shown until the thumbnail arrives
fn placeholder(label: &str) -> Element<'_, Message> {
    container(text(label).size(12))
        .center_x(Length::Fixed(CARD_WIDTH))
        .center_y(Length::Fixed(CARD_HEIGHT))
        .style(container::rounded_box)
        .into()
}

fn footer(loader: &PageLoader) -> Element<'_, Message> {
    let content: Element<Message> = match loader.state() {
        LoaderState::Loading => text("Loading more photos...").into(),
        LoaderState::Exhausted if loader.is_empty() => text("No photos available.").into(),
        LoaderState::Exhausted => text(format!("That's all {} photos.", loader.len())).into(),
        LoaderState::Error(message) => row![
            text(format!("Could not load page {}: {}", loader.cursor(), message)),
            button("Retry").on_press(Message::Retry),
        ]
        .spacing(12)
        .align_y(Alignment::Center)
        .into(),
        LoaderState::Idle => button("Load more").on_press(Message::LoadMore).into(),
    };

    container(content).center_x(Length::Fill).padding(16).into()
}
