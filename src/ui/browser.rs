/// Image browser panel
///
/// Shows the current image of an `ImageLibrary` with previous/next
/// buttons, an index slider and a zoomed view of the area under the
/// cursor. Only one decoded image is kept at a time.
use iced::widget::image::{FilterMethod, Handle, Image};
use iced::widget::{button, column, container, mouse_area, row, slider, text};
use iced::{ContentFit, Element, Length, Point, Task};
use std::path::{Path, PathBuf};

use crate::images::decode::UvRect;
use crate::images::{decode_async, magnifier_region, DecodedImage, ImageLibrary};
use crate::Message;

/// Size the current image is stretched to
pub const DISPLAY_SIZE: (f32, f32) = (720.0, 480.0);
/// Side of the square shown by the magnifier, in display pixels
pub const MAGNIFIER_REGION: f32 = 32.0;
pub const MAGNIFIER_ZOOM: f32 = 4.0;

/// The decoded image for the library's current index
pub struct CurrentImage {
    pub index: usize,
    pub decoded: DecodedImage,
    pub handle: Handle,
}

struct Magnifier {
    uv: UvRect,
    handle: Handle,
}

#[derive(Default)]
pub struct Browser {
    library: Option<ImageLibrary>,
    current: Option<CurrentImage>,
    magnifier: Option<Magnifier>,
    /// Last scan or decode failure
    error: Option<String>,
}

impl Browser {
    /// Scan `folder`. A failed scan leaves an empty browser showing the error.
    pub fn open(folder: &Path) -> Self {
        match ImageLibrary::scan(folder) {
            Ok(library) => Self {
                library: Some(library),
                ..Self::default()
            },
            Err(e) => {
                log::error!("{}", e);
                Self {
                    error: Some(e.to_string()),
                    ..Self::default()
                }
            }
        }
    }

    pub fn library(&self) -> Option<&ImageLibrary> {
        self.library.as_ref()
    }

    pub fn next(&mut self) -> Task<Message> {
        match self.library.as_mut().and_then(|l| l.next().map(Path::to_path_buf)) {
            Some(path) => self.load(path),
            None => Task::none(),
        }
    }

    pub fn previous(&mut self) -> Task<Message> {
        match self.library.as_mut().and_then(|l| l.previous().map(Path::to_path_buf)) {
            Some(path) => self.load(path),
            None => Task::none(),
        }
    }

    pub fn select(&mut self, index: usize) -> Task<Message> {
        if self.library.as_ref().map(ImageLibrary::index) == Some(index) {
            return Task::none();
        }
        match self.library.as_mut().and_then(|l| l.select(index).map(Path::to_path_buf)) {
            Some(path) => self.load(path),
            None => Task::none(),
        }
    }

    /// Decode whatever the library currently points at
    pub fn load_current(&mut self) -> Task<Message> {
        match self.library.as_ref().and_then(ImageLibrary::current_path) {
            Some(path) => {
                let path = path.to_path_buf();
                self.load(path)
            }
            None => Task::none(),
        }
    }

    /// Release the current image and start decoding `path`
    fn load(&mut self, path: PathBuf) -> Task<Message> {
        self.current = None;
        self.magnifier = None;
        self.error = None;

        let index = self.library.as_ref().map_or(0, ImageLibrary::index);
        Task::perform(decode_async(path.clone()), move |result| {
            Message::ImageDecoded {
                index,
                path: path.clone(),
                result,
            }
        })
    }

    /// Keep a decode result if it is still for the current index
    pub fn decoded(&mut self, index: usize, path: PathBuf, result: Result<DecodedImage, String>) {
        let still_current = self
            .library
            .as_ref()
            .is_some_and(|l| l.index() == index && l.current_path() == Some(path.as_path()));
        if !still_current {
            log::debug!("Dropping stale decode of {}", path.display());
            return;
        }

        match result {
            Ok(decoded) => {
                let handle = Handle::from_rgba(
                    decoded.width(),
                    decoded.height(),
                    decoded.pixels.as_raw().clone(),
                );
                self.current = Some(CurrentImage {
                    index,
                    decoded,
                    handle,
                });
            }
            Err(e) => {
                log::warn!("⚠️  {}", e);
                self.error = Some(e);
            }
        }
    }

    /// Update the magnifier for a cursor position relative to the image
    pub fn hover(&mut self, position: Point) {
        let Some(current) = &self.current else {
            return;
        };

        let uv = magnifier_region((position.x, position.y), DISPLAY_SIZE, MAGNIFIER_REGION);
        if self.magnifier.as_ref().is_some_and(|m| m.uv == uv) {
            return;
        }

        self.magnifier = current.decoded.crop_uv(uv).map(|crop| Magnifier {
            uv,
            handle: Handle::from_rgba(crop.width(), crop.height(), crop.into_raw()),
        });
    }

    pub fn leave(&mut self) {
        self.magnifier = None;
    }

    pub fn view(&self) -> Element<Message> {
        let title = match &self.library {
            Some(library) => format!("{}  ({} images)", library.folder().display(), library.len()),
            None => "No folder".to_string(),
        };

        let mut controls = row![
            button("Previous").on_press(Message::PreviousImage),
            button("Next").on_press(Message::NextImage),
        ]
        .spacing(10)
        .align_y(iced::Alignment::Center);

        if let Some(library) = self.library.as_ref().filter(|l| l.len() > 1) {
            let max = (library.len() - 1) as u32;
            controls = controls.push(
                slider(0..=max, library.index() as u32, Message::SliderChanged).width(Length::Fixed(300.0)),
            );
            controls = controls.push(text(format!("{}", library.index())));
        }

        controls = controls.push(button("Open folder…").on_press(Message::OpenFolder));

        let (width, height) = DISPLAY_SIZE;
        let picture: Element<Message> = match &self.current {
            Some(current) => mouse_area(
                Image::new(current.handle.clone())
                    .width(Length::Fixed(width))
                    .height(Length::Fixed(height))
                    .content_fit(ContentFit::Fill),
            )
            .on_move(Message::CursorMoved)
            .on_exit(Message::CursorLeft)
            .into(),
            None => {
                let message = match (&self.error, &self.library) {
                    (Some(error), _) => error.clone(),
                    (None, Some(library)) if library.is_empty() => "No images in this folder".to_string(),
                    (None, Some(_)) => "Loading…".to_string(),
                    (None, None) => "Open a folder to browse images".to_string(),
                };
                container(text(message))
                    .style(container::bordered_box)
                    .center_x(Length::Fixed(width))
                    .center_y(Length::Fixed(height))
                    .into()
            }
        };

        let zoomed = MAGNIFIER_REGION * MAGNIFIER_ZOOM;
        let magnifier: Element<Message> = match &self.magnifier {
            Some(magnifier) => Image::new(magnifier.handle.clone())
                .width(Length::Fixed(zoomed))
                .height(Length::Fixed(zoomed))
                .content_fit(ContentFit::Fill)
                .filter_method(FilterMethod::Nearest)
                .into(),
            None => container(text("Hover the image to zoom").size(12))
                .style(container::bordered_box)
                .center_x(Length::Fixed(zoomed))
                .center_y(Length::Fixed(zoomed))
                .into(),
        };

        let caption = self
            .current
            .as_ref()
            .map(|current| {
                let name = current
                    .decoded
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                format!(
                    "#{} {} ({}x{})",
                    current.index,
                    name,
                    current.decoded.width(),
                    current.decoded.height()
                )
            })
            .unwrap_or_default();

        column![
            text(title).size(18),
            controls,
            row![picture, column![magnifier, text(caption).size(12)].spacing(8)].spacing(12),
        ]
        .spacing(12)
        .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;
    use std::fs;
    use tempfile::tempdir;

    fn folder_with(names: &[&str]) -> tempfile::TempDir {
        let dir = tempdir().expect("failed to create temp dir");
        for name in names {
            fs::write(dir.path().join(name), b"").expect("failed to write file");
        }
        dir
    }

    fn decoded(path: &Path) -> Result<DecodedImage, String> {
        Ok(DecodedImage {
            path: path.to_path_buf(),
            pixels: RgbaImage::new(4, 4),
        })
    }

    #[test]
    fn result_for_current_index_is_kept() {
        let dir = folder_with(&["a.png", "b.png", "c.png"]);
        let mut browser = Browser::open(dir.path());
        let _ = browser.load_current();

        let a = dir.path().join("a.png");
        browser.decoded(0, a.clone(), decoded(&a));

        let current = browser.current.as_ref().expect("image should be kept");
        assert_eq!(current.index, 0);
        assert_eq!(current.decoded.path, a);
    }

    #[test]
    fn moving_releases_the_current_image() {
        let dir = folder_with(&["a.png", "b.png", "c.png"]);
        let mut browser = Browser::open(dir.path());
        let a = dir.path().join("a.png");
        browser.decoded(0, a.clone(), decoded(&a));
        browser.hover(Point::new(10.0, 10.0));
        assert!(browser.current.is_some());
        assert!(browser.magnifier.is_some());

        let _ = browser.next();
        assert!(browser.current.is_none());
        assert!(browser.magnifier.is_none());

        let b = dir.path().join("b.png");
        browser.decoded(1, b.clone(), decoded(&b));
        assert!(browser.current.is_some());

        let _ = browser.select(2);
        assert!(browser.current.is_none());
    }

    #[test]
    fn stale_result_is_dropped() {
        let dir = folder_with(&["a.png", "b.png", "c.png"]);
        let mut browser = Browser::open(dir.path());
        let _ = browser.next();

        // Old index
        let a = dir.path().join("a.png");
        browser.decoded(0, a.clone(), decoded(&a));
        assert!(browser.current.is_none());

        // Current index but another file
        browser.decoded(1, a.clone(), decoded(&a));
        assert!(browser.current.is_none());

        // A late failure for an old index leaves no error behind
        browser.decoded(0, a, Err("broken".to_string()));
        assert!(browser.error.is_none());
    }

    #[test]
    fn late_result_from_previous_folder_is_dropped() {
        let first = folder_with(&["a.png", "b.png"]);
        let second = folder_with(&["a.png"]);

        let mut browser = Browser::open(first.path());
        let _ = browser.load_current();
        browser = Browser::open(second.path());
        let _ = browser.load_current();

        let old = first.path().join("a.png");
        browser.decoded(0, old.clone(), decoded(&old));
        assert!(browser.current.is_none());

        let new = second.path().join("a.png");
        browser.decoded(0, new.clone(), decoded(&new));
        assert_eq!(browser.current.as_ref().map(|c| c.decoded.path.clone()), Some(new));
    }

    #[test]
    fn decode_failure_is_shown() {
        let dir = folder_with(&["a.png"]);
        let mut browser = Browser::open(dir.path());
        let a = dir.path().join("a.png");
        browser.decoded(0, a, Err("Failed to decode image".to_string()));
        assert!(browser.current.is_none());
        assert_eq!(browser.error.as_deref(), Some("Failed to decode image"));
    }
}
