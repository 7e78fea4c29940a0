use iced::widget::image::Handle;
use iced::widget::scrollable::Viewport;
use iced::{window, Element, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

mod api;
mod config;
mod download;
mod logging;
mod state;
mod transform;
mod ui;

use api::{ApiError, CachePolicy, ImageSource, PicsumClient};
use config::GalleryConfig;
use download::{Downloader, SavedFile};
use state::data::{EncodedImage, ImageRecord};
use state::loader::PageLoader;
use state::viewer::Viewer;
use transform::{Bitmap, Filter, TransformError};
use ui::detail::{DetailPhase, DetailScreen};
use ui::grid::Thumbnail;
use ui::trigger::VisibilityTrigger;

/// Which screen is showing
enum Screen {
    Grid,
    Detail(DetailScreen),
}

/// Main application state
struct Gallery {
    config: GalleryConfig,
    client: PicsumClient,
    downloader: Downloader<PicsumClient>,
    /// Records, page cursor and loading flags for the grid
    loader: PageLoader,
    /// Thumbnail bytes per record id
    thumbnails: HashMap<String, Thumbnail>,
    trigger: VisibilityTrigger,
    /// Last known window size, used to tell whether the grid fills the window
    window_size: Option<Size>,
    screen: Screen,
    /// Contents of the "open by id" box
    id_input: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// Footer button or scroll trigger asked for the next page
    LoadMore,
    /// User clicked Retry after a failed page
    Retry,
    /// The first page finished loading on its own loader
    FirstPage(PageLoader),
    /// A page fetch completed
    PageLoaded(u32, Result<Vec<ImageRecord>, ApiError>),
    WindowResized(Size),
    /// The grid was scrolled
    Scrolled(Viewport),
    ThumbnailLoaded(String, Result<Vec<u8>, ApiError>),
    IdInputChanged(String),
    OpenTyped,
    /// Open the detail screen for an id
    Open(String),
    RecordLoaded(String, Result<ImageRecord, ApiError>),
    /// The detail rendition was fetched and decoded
    ImageLoaded(String, Result<(Vec<u8>, Bitmap), String>),
    ApplyFilter(Filter),
    Transformed(String, Filter, Result<EncodedImage, TransformError>),
    Revert,
    Download,
    Downloaded(String, Result<SavedFile, String>),
    Back,
}

impl Gallery {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        let config = GalleryConfig::load();

        // The app cannot do anything without its HTTP client, so fail loudly
        let client = PicsumClient::new(&config)
            .expect("Failed to initialize HTTP client. Check your TLS setup.");
        let downloader = Downloader::new(
            client.clone(),
            Duration::from_millis(config.temp_release_delay_ms),
        );

        info!("📷 Photo Gallery starting against {}", client.base_url());

        // The grid shows "loading" and ignores triggers until the first page lands
        let mut loader = PageLoader::new(config.page_size);
        loader.begin_load();

        let first_page = {
            let client = client.clone();
            let mut first = PageLoader::new(config.page_size);
            Task::perform(
                async move {
                    first.load_next_page(&client).await;
                    first
                },
                Message::FirstPage,
            )
        };
        let size = window::get_latest()
            .and_then(window::get_size)
            .map(Message::WindowResized);

        let gallery = Gallery {
            loader,
            config,
            client,
            downloader,
            thumbnails: HashMap::new(),
            trigger: VisibilityTrigger::default(),
            window_size: None,
            screen: Screen::Grid,
            id_input: String::new(),
        };

        (gallery, Task::batch([first_page, size]))
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::LoadMore => self.load_next(false),
            Message::Retry => self.load_next(true),
            Message::FirstPage(loader) => {
                self.loader = loader;
                self.trigger.reset();
                let thumbnails = self.fetch_thumbnails(0);
                Task::batch([thumbnails, self.fill_window()])
            }
            Message::PageLoaded(page, result) => {
                let before = self.loader.len();
                self.loader.finish_load(page, result);
                // New content pushed the sentinel out of view
                self.trigger.reset();
                let thumbnails = self.fetch_thumbnails(before);
                Task::batch([thumbnails, self.fill_window()])
            }
            Message::WindowResized(size) => {
                self.window_size = Some(size);
                self.fill_window()
            }
            Message::Scrolled(viewport) => {
                let fits = viewport.content_bounds().height <= viewport.bounds().height;
                if self.trigger.observe(viewport.relative_offset().y, fits) {
                    return self.load_next(false);
                }
                Task::none()
            }
            Message::ThumbnailLoaded(id, result) => {
                let thumbnail = match result {
                    Ok(bytes) => Thumbnail::Ready(Handle::from_bytes(bytes)),
                    Err(e) => {
                        warn!("⚠️  Thumbnail for {} failed: {}", id, e);
                        Thumbnail::Failed
                    }
                };
                self.thumbnails.insert(id, thumbnail);
                Task::none()
            }
            Message::IdInputChanged(value) => {
                self.id_input = value;
                Task::none()
            }
            Message::OpenTyped => {
                let id = self.id_input.trim().to_string();
                if id.is_empty() {
                    return Task::none();
                }
                self.open(id)
            }
            Message::Open(id) => self.open(id),
            Message::RecordLoaded(id, result) => self.on_record(id, result),
            Message::ImageLoaded(id, result) => {
                if let Some(screen) = self.detail_mut(&id) {
                    match result {
                        Ok((bytes, bitmap)) => {
                            if let Some(viewer) = screen.viewer_mut() {
                                viewer.set_bitmap(bitmap);
                            }
                            screen.set_original(bytes);
                        }
                        Err(message) => {
                            if let Some(viewer) = screen.viewer_mut() {
                                viewer.set_load_error(message);
                            }
                        }
                    }
                }
                Task::none()
            }
            Message::ApplyFilter(filter) => {
                let encoding = self.config.encoding();
                let Screen::Detail(screen) = &mut self.screen else {
                    return Task::none();
                };
                let id = screen.id.clone();
                let Some(bitmap) = screen.viewer_mut().and_then(Viewer::begin_transform) else {
                    return Task::none();
                };

                Task::perform(
                    transform::apply_filter(bitmap, filter, encoding),
                    move |result| Message::Transformed(id.clone(), filter, result),
                )
            }
            Message::Transformed(id, filter, result) => {
                if let Some(screen) = self.detail_mut(&id) {
                    if let Some(viewer) = screen.viewer_mut() {
                        viewer.apply(filter, result);
                    }
                    screen.refresh();
                }
                Task::none()
            }
            Message::Revert => {
                if let Screen::Detail(screen) = &mut self.screen {
                    if let Some(viewer) = screen.viewer_mut() {
                        viewer.revert();
                    }
                    screen.refresh();
                }
                Task::none()
            }
            Message::Download => self.download(),
            Message::Downloaded(id, result) => {
                if let Some(screen) = self.detail_mut(&id) {
                    screen.status = Some(match result {
                        Ok(saved) => format!("✅ Saved to {}", saved.path.display()),
                        Err(e) => format!("Download failed: {}", e),
                    });
                }
                debug!(
                    "Temporary files: {} created, {} live",
                    self.downloader.temp_created(),
                    self.downloader.temp_live()
                );
                Task::none()
            }
            Message::Back => {
                self.screen = Screen::Grid;
                self.fill_window()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        match &self.screen {
            Screen::Grid => ui::grid::view(&self.loader, &self.thumbnails, &self.id_input),
            Screen::Detail(screen) => screen.view(self.config.default_blur_radius),
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        window::resize_events().map(|(_id, size)| Message::WindowResized(size))
    }

    /// Ask the loader for the next page and fetch it if admitted
    fn load_next(&mut self, retry: bool) -> Task<Message> {
        let Some(request) = self.loader.next_request(retry) else {
            return Task::none();
        };

        let client = self.client.clone();
        Task::perform(
            async move { request.fetch(&client).await },
            move |result| Message::PageLoaded(request.page, result),
        )
    }

    /// Scrollables don't report a viewport when nothing overflows, so keep
    /// loading while the grid is shorter than the window
    fn fill_window(&mut self) -> Task<Message> {
        let Some(size) = self.window_size else {
            return Task::none();
        };
        if !matches!(self.screen, Screen::Grid) {
            return Task::none();
        }

        let fits = ui::grid::fits_in(self.loader.len(), size);
        if fits && self.trigger.observe(0.0, true) {
            return self.load_next(false);
        }
        Task::none()
    }

    /// Request thumbnails for records appended after index `from`
    fn fetch_thumbnails(&mut self, from: usize) -> Task<Message> {
        let (width, height) = (self.config.thumbnail_width, self.config.thumbnail_height);
        let wanted: Vec<(String, String)> = self.loader.records()[from..]
            .iter()
            .filter(|record| !self.thumbnails.contains_key(&record.id))
            .map(|record| {
                let url = self.client.build_resized_url(&record.id, width, height);
                (record.id.clone(), url)
            })
            .collect();

        let mut tasks = Vec::with_capacity(wanted.len());
        for (id, url) in wanted {
            self.thumbnails.insert(id.clone(), Thumbnail::Pending);
            let client = self.client.clone();
            tasks.push(Task::perform(
                async move { client.fetch_bytes(&url).await },
                move |result| Message::ThumbnailLoaded(id.clone(), result),
            ));
        }

        Task::batch(tasks)
    }

    /// Switch to the detail screen and fetch the record
    fn open(&mut self, id: String) -> Task<Message> {
        info!("🔍 Opening image {}", id);
        self.screen = Screen::Detail(DetailScreen::new(id.clone()));

        let client = self.client.clone();
        let lookup = id.clone();
        Task::perform(
            async move { client.fetch_by_id(&lookup, CachePolicy::PreferCached).await },
            move |result| Message::RecordLoaded(id.clone(), result),
        )
    }

    fn on_record(&mut self, id: String, result: Result<ImageRecord, ApiError>) -> Task<Message> {
        let (width, height) = (self.config.detail_width, self.config.detail_height);
        let client = self.client.clone();
        let Some(screen) = self.detail_mut(&id) else {
            return Task::none();
        };

        match result {
            Ok(record) => {
                let url = client.build_resized_url(&record.id, width, height);
                screen.phase = DetailPhase::Ready(Box::new(Viewer::new(record, url.clone())));
                Task::perform(fetch_bitmap(client, url), move |result| {
                    Message::ImageLoaded(id.clone(), result)
                })
            }
            Err(e) if e.is_not_found() => {
                info!("Image {} does not exist", id);
                screen.phase = DetailPhase::NotFound;
                Task::none()
            }
            Err(e) => {
                warn!("⚠️  Could not load record {}: {}", id, e);
                screen.phase = DetailPhase::Failed(format!("{} ({})", e.user_message(), e));
                Task::none()
            }
        }
    }

    fn download(&mut self) -> Task<Message> {
        let start_dir = self.config.download_dir();
        let Screen::Detail(screen) = &mut self.screen else {
            return Task::none();
        };
        let Some(viewer) = screen.viewer() else {
            return Task::none();
        };

        // Show the native save dialog
        let mut dialog = FileDialog::new()
            .set_title("Save Photo")
            .set_file_name(viewer.suggested_filename());
        if let Some(dir) = start_dir {
            dialog = dialog.set_directory(dir);
        }
        let Some(path) = dialog.save_file() else {
            return Task::none();
        };

        let source = viewer.download_source();
        let id = screen.id.clone();
        screen.status = Some(format!("Saving to {}...", path.display()));

        let downloader = self.downloader.clone();
        Task::perform(
            async move {
                downloader
                    .save(&source, &path)
                    .await
                    .map_err(|e| e.to_string())
            },
            move |result| Message::Downloaded(id.clone(), result),
        )
    }

    /// The detail screen, if it is showing `id`
    fn detail_mut(&mut self, id: &str) -> Option<&mut DetailScreen> {
        match &mut self.screen {
            Screen::Detail(screen) if screen.id == id => Some(screen),
            _ => None,
        }
    }
}

fn main() -> iced::Result {
    logging::init();

    iced::application("Photo Gallery", Gallery::update, Gallery::view)
        .theme(Gallery::theme)
        .subscription(Gallery::subscription)
        .centered()
        .run_with(Gallery::new)
}

/// Fetch a rendition and decode it into a bitmap
/// Decoding runs on the blocking pool to keep the UI responsive
async fn fetch_bitmap(client: PicsumClient, url: String) -> Result<(Vec<u8>, Bitmap), String> {
    let bytes = client.fetch_bytes(&url).await.map_err(|e| e.to_string())?;

    let decoded = {
        let bytes = bytes.clone();
        tokio::task::spawn_blocking(move || Bitmap::decode(&bytes))
            .await
            .map_err(|e| format!("Task join error: {}", e))?
    };

    let bitmap = decoded.map_err(|e| e.to_string())?;
    info!("🖼️  Decoded {}x{} bitmap from {}", bitmap.width(), bitmap.height(), url);
    Ok((bytes, bitmap))
}
