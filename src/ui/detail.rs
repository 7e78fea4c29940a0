//! Single image view with filter and download controls

use iced::widget::image::Handle;
use iced::widget::{button, column, container, horizontal_space, image, row, text};
use iced::{Alignment, ContentFit, Element, Length};

use crate::state::data::DisplaySource;
use crate::state::viewer::Viewer;
use crate::transform::Filter;
use crate::Message;

/// Where the detail screen is in its load sequence
#[derive(Debug)]
pub enum DetailPhase {
    /// Waiting for the record
    Loading,
    /// The id does not exist
    NotFound,
    /// Any other failure fetching the record
    Failed(String),
    Ready(Box<Viewer>),
}

/// State of the detail screen for one image id
#[derive(Debug)]
pub struct DetailScreen {
    pub id: String,
    pub phase: DetailPhase,
    /// Handle for the original rendition, once its bytes arrived
    original: Option<Handle>,
    /// Handle for whatever the viewer currently displays
    current: Option<Handle>,
    /// Last download outcome
    pub status: Option<String>,
}

impl DetailScreen {
    pub fn new(id: String) -> Self {
        Self {
            id,
            phase: DetailPhase::Loading,
            original: None,
            current: None,
            status: None,
        }
    }

    pub fn viewer(&self) -> Option<&Viewer> {
        match &self.phase {
            DetailPhase::Ready(viewer) => Some(&**viewer),
            _ => None,
        }
    }

    pub fn viewer_mut(&mut self) -> Option<&mut Viewer> {
        match &mut self.phase {
            DetailPhase::Ready(viewer) => Some(&mut **viewer),
            _ => None,
        }
    }

    /// The original rendition's bytes were fetched
    pub fn set_original(&mut self, bytes: Vec<u8>) {
        self.original = Some(Handle::from_bytes(bytes));
        self.refresh();
    }

    /// Rebuild the displayed handle after the viewer's current source changed
    pub fn refresh(&mut self) {
        self.current = match self.viewer().map(Viewer::current) {
            Some(DisplaySource::Encoded(encoded)) => Some(Handle::from_bytes(encoded.bytes.clone())),
            Some(DisplaySource::Remote(_)) => self.original.clone(),
            None => None,
        };
    }

    pub fn view(&self, blur_radius: u32) -> Element<'_, Message> {
        let back = button("← Back").on_press(Message::Back);

        let body: Element<Message> = match &self.phase {
            DetailPhase::Loading => centered(text("Loading...").size(18)),
            DetailPhase::NotFound => centered(
                column![
                    text("Image not found").size(28),
                    text(format!("There is no image with id \"{}\".", self.id)),
                ]
                .spacing(8)
                .align_x(Alignment::Center),
            ),
            DetailPhase::Failed(message) => centered(
                column![
                    text("Something went wrong").size(28),
                    text(message),
                    button("Try again").on_press(Message::Open(self.id.clone())),
                ]
                .spacing(8)
                .align_x(Alignment::Center),
            ),
            DetailPhase::Ready(viewer) => self.viewer_body(viewer, blur_radius),
        };

        column![back, body].spacing(16).padding(20).into()
    }

    fn viewer_body<'a>(&'a self, viewer: &'a Viewer, blur_radius: u32) -> Element<'a, Message> {
        let record = viewer.record();

        let picture: Element<Message> = match &self.current {
            Some(handle) => image(handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Contain)
                .into(),
            None => centered(text(if viewer.error().is_some() {
                "Image unavailable"
            } else {
                "Loading image..."
            })),
        };

        // Filters need the decoded bitmap and run one at a time
        let ready = viewer.bitmap().is_some() && !viewer.is_busy();

        let controls = row![
            filter_button("Grayscale", Filter::Grayscale, ready),
            filter_button("Blur", Filter::Blur { radius: blur_radius }, ready),
            button("Revert").on_press_maybe(viewer.is_modified().then_some(Message::Revert)),
            horizontal_space(),
            button("Download").on_press(Message::Download),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let mut info = column![
            text(format!("Photo by {}", record.author)).size(22),
            text(format!(
                "{} × {} · {}",
                record.width, record.height, record.source_url
            ))
            .size(14),
        ]
        .spacing(4);

        if viewer.is_busy() {
            info = info.push(text("Applying filter...").size(14));
        }
        if let Some(filter) = viewer.active_filter() {
            info = info.push(text(format!("Filter: {}", filter.label())).size(14));
        }
        if let Some(error) = viewer.error() {
            info = info.push(text(error).size(14));
        }
        if let Some(status) = &self.status {
            info = info.push(text(status).size(14));
        }

        column![picture, controls, info].spacing(16).into()
    }
}

fn filter_button(label: &str, filter: Filter, enabled: bool) -> Element<'_, Message> {
    button(label)
        .on_press_maybe(enabled.then_some(Message::ApplyFilter(filter)))
        .into()
}

fn centered<'a>(content: impl Into<Element<'a, Message>>) -> Element<'a, Message> {
    container(content)
        .center_x(Length::Fill)
        .center_y(Length::Fill)
        .into()
}
