use iced::task;
use iced::widget::image::Handle as ImageHandle;
use iced::widget::{button, column, container, row, slider, text, text_input, Column, Image};
use iced::{Alignment, Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod codec;
mod config;
mod error;
mod pipeline;
mod state;
mod storage;

use codec::{Codec, JpegCodec};
use config::Settings;
use error::CompressError;
use pipeline::{JobOutcome, RecompressPipeline};
use state::data::{CompressedResult, Notice, SourceImage};
use state::quality::{Quality, QualityControl};

/// Extensions offered by the picker; anything `image` decodes works
const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff"];

/// Main application state
struct ImageCompressor {
    settings: Settings,
    codec: Arc<dyn Codec>,
    pipeline: RecompressPipeline,
    /// The picked image, if any
    source: Option<SourceImage>,
    original_preview: Option<ImageHandle>,
    quality: QualityControl,
    /// The one live compressed result
    result: Option<CompressedResult>,
    compressed_preview: Option<ImageHandle>,
    /// Timer task of the newest request, aborted when superseded
    pending: Option<task::Handle>,
    notice: Option<Notice>,
    next_notice_id: u64,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Select Image"
    SelectImage,
    /// User typed in the quality field
    QualityTextChanged(String),
    /// User dragged the quality slider
    QualitySliderChanged(u8),
    /// A scheduled compression job resolved
    CompressionDone(JobOutcome),
    /// User clicked "Save Image"
    SaveImage,
    /// Background save finished
    SaveDone(Result<PathBuf, CompressError>),
    /// Notice timer elapsed
    DismissNotice(u64),
}

impl ImageCompressor {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        (Self::with_settings(Settings::load()), Task::none())
    }

    fn with_settings(settings: Settings) -> Self {
        let codec: Arc<dyn Codec> = Arc::new(JpegCodec);
        let pipeline = RecompressPipeline::new(Arc::clone(&codec), settings.debounce());
        let quality = QualityControl::new(settings.initial_quality());

        info!("🎨 Image Compressor ready (debounce {:?})", pipeline.delay());

        ImageCompressor {
            settings,
            codec,
            pipeline,
            source: None,
            original_preview: None,
            quality,
            result: None,
            compressed_preview: None,
            pending: None,
            notice: None,
            next_notice_id: 0,
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::SelectImage => {
                let picked = FileDialog::new()
                    .set_title("Select an Image")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file();

                match picked {
                    Some(path) => self.select_source(path),
                    None => Task::none(),
                }
            }
            Message::QualityTextChanged(value) => {
                let quality = self.quality.on_text(value);
                self.schedule(quality)
            }
            Message::QualitySliderChanged(value) => {
                let quality = self.quality.on_slider(value);
                self.schedule(quality)
            }
            Message::CompressionDone(outcome) => {
                if self.pipeline.is_current(outcome.generation()) {
                    self.pending = None;
                }

                match self.pipeline.accept(outcome) {
                    Some(Ok(result)) => {
                        self.compressed_preview =
                            Some(ImageHandle::from_bytes(result.bytes.as_ref().clone()));
                        self.result = Some(result);
                        Task::none()
                    }
                    Some(Err(e)) => {
                        warn!("Compression failed: {}", e);
                        // The live result must match the newest request
                        self.result = None;
                        self.compressed_preview = None;
                        self.show_notice(e.to_string())
                    }
                    None => Task::none(),
                }
            }
            Message::SaveImage => {
                if self.result.is_none() {
                    debug!("Save ignored, no compressed result yet");
                    return Task::none();
                }

                Task::perform(
                    storage::save_compressed(
                        Arc::clone(&self.codec),
                        self.result.clone(),
                        self.settings.clone(),
                    ),
                    Message::SaveDone,
                )
            }
            Message::SaveDone(Ok(path)) => {
                self.show_notice(format!("Image saved to {}", path.display()))
            }
            Message::SaveDone(Err(e)) => {
                warn!("Save failed: {}", e);
                if e.is_permission_denied() {
                    self.show_notice("Permission denied")
                } else {
                    self.show_notice("Failed to save image")
                }
            }
            Message::DismissNotice(id) => {
                if self.notice.as_ref().is_some_and(|n| n.id == id) {
                    self.notice = None;
                }
                Task::none()
            }
        }
    }

    /// Replace the source image and kick off its first compression
    fn select_source(&mut self, path: PathBuf) -> Task<Message> {
        let original_size = storage::query_size(&path);
        let source = SourceImage::new(path, original_size);
        info!(
            "📂 Selected {} ({})",
            source.path.display(),
            source.size_label()
        );

        // Nothing computed for the previous image may show up now
        self.pipeline.invalidate();
        self.abort_pending();
        self.result = None;
        self.compressed_preview = None;

        self.original_preview = Some(ImageHandle::from_path(&source.path));
        self.source = Some(source);

        self.schedule(self.quality.effective())
    }

    /// Request a compression of the current source, if there is one
    fn schedule(&mut self, quality: Quality) -> Task<Message> {
        let Some(source) = self.source.clone() else {
            return Task::none();
        };

        self.abort_pending();
        let (task, handle) =
            Task::perform(self.pipeline.request(&source, quality), Message::CompressionDone)
                .abortable();
        self.pending = Some(handle);
        task
    }

    fn abort_pending(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    /// Show a transient notice and schedule its removal
    fn show_notice(&mut self, text: impl Into<String>) -> Task<Message> {
        self.next_notice_id += 1;
        let id = self.next_notice_id;
        self.notice = Some(Notice {
            id,
            text: text.into(),
        });

        let duration = self.settings.notice_duration();
        Task::perform(tokio::time::sleep(duration), move |_| {
            Message::DismissNotice(id)
        })
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let original_size = match &self.source {
            Some(source) => source.size_label(),
            None => "-".to_string(),
        };
        let compressed_size = match &self.result {
            Some(result) => format!("{} KB", result.size_kb()),
            None => "-".to_string(),
        };

        let previews = row![
            preview_panel(
                self.original_preview.as_ref(),
                format!("Original Image Size: {}", original_size),
            ),
            preview_panel(
                self.compressed_preview.as_ref(),
                format!("Compressed Image Size: {}", compressed_size),
            ),
        ]
        .spacing(20);

        let quality_controls = row![
            text("Quality"),
            text_input("0-100", self.quality.text())
                .on_input(Message::QualityTextChanged)
                .width(Length::Fixed(80.0)),
            slider(
                0..=100u8,
                self.quality.slider_value(),
                Message::QualitySliderChanged
            ),
        ]
        .spacing(12)
        .align_y(Alignment::Center);

        let save = button("Save Image")
            .on_press_maybe(self.result.as_ref().map(|_| Message::SaveImage))
            .padding(10);

        let notice = text(
            self.notice
                .as_ref()
                .map(|n| n.text.clone())
                .unwrap_or_default(),
        )
        .size(14);

        let content: Column<Message> = column![
            text("Image Compressor").size(32),
            button("Select Image")
                .on_press(Message::SelectImage)
                .padding(10),
            previews,
            quality_controls,
            save,
            notice,
        ]
        .spacing(20)
        .padding(30)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// One preview image with its size label underneath
fn preview_panel<'a>(handle: Option<&ImageHandle>, label: String) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match handle {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fixed(320.0))
            .height(Length::Fixed(320.0))
            .into(),
        None => container(text("No image"))
            .width(Length::Fixed(320.0))
            .height(Length::Fixed(320.0))
            .center_x(Length::Fixed(320.0))
            .center_y(Length::Fixed(320.0))
            .into(),
    };

    column![picture, text(label).size(16)]
        .spacing(8)
        .align_x(Alignment::Center)
        .into()
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    iced::application(
        "Image Compressor",
        ImageCompressor::update,
        ImageCompressor::view,
    )
    .theme(ImageCompressor::theme)
    .centered()
    .run_with(ImageCompressor::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn test_settings() -> Settings {
        Settings {
            debounce_ms: 5,
            ..Settings::default()
        }
    }

    fn write_png(dir: &TempDir, name: &str) -> PathBuf {
        let img = ImageBuffer::from_fn(48, 32, |x, y| Rgb([(x * 5) as u8, (y * 7) as u8, 90u8]));
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut bytes, ImageFormat::Png)
            .unwrap();

        let path = dir.path().join(name);
        std::fs::write(&path, bytes.into_inner()).unwrap();
        path
    }

    /// Resolve the job the app is waiting on, as the runtime would
    async fn settle(app: &ImageCompressor, quality: u8) -> JobOutcome {
        let source = app.source.clone().unwrap();
        app.pipeline
            .request(&source, Quality::new(i64::from(quality)))
            .await
    }

    #[tokio::test]
    async fn test_result_is_published_and_pending_cleared() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = ImageCompressor::with_settings(test_settings());
        let _ = app.select_source(write_png(&dir, "a.png"));

        let _ = app.update(Message::QualitySliderChanged(50));
        assert!(app.pending.is_some());

        let outcome = settle(&app, 50).await;
        let _ = app.update(Message::CompressionDone(outcome));

        assert!(app.pending.is_none());
        assert_eq!(app.result.as_ref().unwrap().quality.get(), 50);
        assert!(app.compressed_preview.is_some());
    }

    #[tokio::test]
    async fn test_failed_compression_clears_live_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(&dir, "a.png");
        let mut app = ImageCompressor::with_settings(test_settings());
        let _ = app.select_source(path.clone());

        let _ = app.update(Message::QualitySliderChanged(50));
        let outcome = settle(&app, 50).await;
        let _ = app.update(Message::CompressionDone(outcome));
        assert!(app.result.is_some());

        std::fs::remove_file(&path).unwrap();
        let _ = app.update(Message::QualitySliderChanged(10));
        let outcome = settle(&app, 10).await;
        let _ = app.update(Message::CompressionDone(outcome));

        assert!(app.result.is_none());
        assert!(app.compressed_preview.is_none());
        assert!(app.notice.is_some());
    }

    #[tokio::test]
    async fn test_new_source_drops_previous_result() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = ImageCompressor::with_settings(test_settings());
        let _ = app.select_source(write_png(&dir, "a.png"));

        let outcome = settle(&app, 40).await;
        let _ = app.update(Message::CompressionDone(outcome));
        assert!(app.result.is_some());

        // Finished for the first image but delivered after the second is picked
        let late = settle(&app, 60).await;
        let _ = app.select_source(write_png(&dir, "b.png"));
        assert!(app.result.is_none());

        let _ = app.update(Message::CompressionDone(late));
        assert!(app.result.is_none());
        assert_eq!(app.source.as_ref().unwrap().path, dir.path().join("b.png"));
    }

    #[tokio::test]
    async fn test_save_without_result_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            output_subdir: dir.path().join("saved").to_string_lossy().to_string(),
            ..test_settings()
        };
        let mut app = ImageCompressor::with_settings(settings);

        let _ = app.update(Message::SaveImage);

        assert!(app.notice.is_none());
        assert!(!dir.path().join("saved").exists());
    }

    #[tokio::test]
    async fn test_save_errors_become_notices() {
        let mut app = ImageCompressor::with_settings(test_settings());

        let _ = app.update(Message::SaveDone(Err(CompressError::PermissionDenied(
            PathBuf::from("/locked/compressed_image.jpg"),
        ))));
        assert_eq!(app.notice.as_ref().unwrap().text, "Permission denied");

        let _ = app.update(Message::SaveDone(Err(CompressError::Io("disk full".into()))));
        assert_eq!(app.notice.as_ref().unwrap().text, "Failed to save image");
    }

    #[tokio::test]
    async fn test_dismiss_only_matching_notice() {
        let mut app = ImageCompressor::with_settings(test_settings());

        let _ = app.update(Message::SaveDone(Ok(PathBuf::from("/pics/one.jpg"))));
        let first = app.notice.as_ref().unwrap().id;
        let _ = app.update(Message::SaveDone(Ok(PathBuf::from("/pics/two.jpg"))));
        let second = app.notice.as_ref().unwrap().id;

        // The older timer must not hide the newer notice
        let _ = app.update(Message::DismissNotice(first));
        assert_eq!(
            app.notice.as_ref().unwrap().text,
            "Image saved to /pics/two.jpg"
        );

        let _ = app.update(Message::DismissNotice(second));
        assert!(app.notice.is_none());
    }
}
