use iced::keyboard::{self, key};
use iced::widget::{column, container, row, scrollable, text};
use iced::{Element, Font, Length, Pixels, Point, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;

mod config;
mod error;
mod images;
mod state;
mod timing;
mod ui;

use config::Settings;
use images::DecodedImage;
use state::roster::{prepare_database, Roster};
use timing::Stopwatch;

/// Family name of the bundled UI font
const FONT_FAMILY: &str = "Quantico";

/// Main application state
struct Gredit {
    settings: Settings,
    /// The student database
    roster: Roster,
    browser: ui::browser::Browser,
    import: ui::import::Import,
    search: ui::search::Search,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    PreviousImage,
    NextImage,
    SliderChanged(u32),
    OpenFolder,
    /// Background decode finished for the image at `index`
    ImageDecoded {
        index: usize,
        path: PathBuf,
        result: Result<DecodedImage, String>,
    },
    CursorMoved(Point),
    CursorLeft,
    OpenCsv,
    CloseLoaded,
    CommitLoaded,
    SearchChanged(String),
    SelectStudent(String),
    NickChanged(String),
    SaveNick,
    ClearNick,
}

impl Gredit {
    fn new(settings: Settings, roster: Roster) -> (Self, Task<Message>) {
        let mut browser = ui::browser::Browser::open(&settings.image_folder);
        let task = browser.load_current();

        let mut app = Gredit {
            settings,
            roster,
            browser,
            import: ui::import::Import::default(),
            search: ui::search::Search::default(),
            status: String::new(),
        };
        app.refresh_nicknames();
        app.set_ready_status();

        (app, task)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PreviousImage => self.browser.previous(),
            Message::NextImage => self.browser.next(),
            Message::SliderChanged(index) => self.browser.select(index as usize),
            Message::OpenFolder => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select Folder with Images")
                    .set_directory(&self.settings.image_folder)
                    .pick_folder();

                match folder {
                    Some(folder) => {
                        // Replacing the browser releases the old folder's image
                        self.browser = ui::browser::Browser::open(&folder);
                        self.settings.image_folder = folder;
                        self.browser.load_current()
                    }
                    None => Task::none(),
                }
            }
            Message::ImageDecoded {
                index,
                path,
                result,
            } => {
                // Stale results are dropped inside the browser
                self.browser.decoded(index, path, result);
                Task::none()
            }
            Message::CursorMoved(position) => {
                self.browser.hover(position);
                Task::none()
            }
            Message::CursorLeft => {
                self.browser.leave();
                Task::none()
            }
            Message::OpenCsv => {
                // Show the native file picker, limited to CSV files
                let file = FileDialog::new()
                    .set_title("Select Mess List")
                    .add_filter("CSV", &["csv"])
                    .pick_file();

                if let Some(path) = file {
                    // Rows stay in memory until the user commits them
                    match state::csv::read_csv(&path) {
                        Ok(rows) => {
                            self.status = format!("Read {} rows from {}", rows.len(), path.display());
                            self.import.loaded(path, rows);
                        }
                        Err(e) => {
                            log::error!("{}", e);
                            self.status = format!("❌ {}", e);
                        }
                    }
                }
                Task::none()
            }
            Message::CloseLoaded => {
                self.import.visible = false;
                Task::none()
            }
            Message::CommitLoaded => {
                // Time the whole batch for the "Loaded in" label
                let watch = Stopwatch::start();
                match self.roster.commit(&self.import.rows) {
                    Ok(_) => {
                        self.import.load_time = Some(watch.elapsed_natural());
                        self.set_ready_status();

                        // Results may now include the new rows
                        self.run_search();
                    }
                    Err(e) => {
                        log::error!("Failed to commit mess list: {}", e);
                        self.status = format!("❌ {}", e);
                    }
                }
                Task::none()
            }
            Message::SearchChanged(query) => {
                // Re-run the search on every keystroke
                self.search.query = query;
                self.run_search();
                Task::none()
            }
            Message::SelectStudent(idno) => {
                match self.roster.student(&idno) {
                    Ok(student) => self.search.select(student),
                    Err(e) => self.report(e),
                }
                Task::none()
            }
            Message::NickChanged(nick) => {
                self.search.nick_draft = nick;
                Task::none()
            }
            Message::SaveNick => {
                // Blank drafts clear the nickname
                let nick = self.search.nick_draft.clone();
                self.store_nick(Some(&nick));
                Task::none()
            }
            Message::ClearNick => {
                self.store_nick(None);
                Task::none()
            }
        }
    }

    fn run_search(&mut self) {
        let watch = Stopwatch::start();
        match self.roster.search(&self.search.query, self.settings.search_limit) {
            Ok(hits) => self.search.hits = hits,
            Err(e) => {
                log::warn!("Search failed: {}", e);
                self.search.hits.clear();
            }
        }
        self.search.elapsed = watch.elapsed_natural();
    }

    fn store_nick(&mut self, nick: Option<&str>) {
        let Some(idno) = self.search.selected.as_ref().map(|s| s.idno.clone()) else {
            return;
        };

        match self.roster.set_nick(&idno, nick) {
            Ok(_) => {
                match self.roster.student(&idno) {
                    Ok(student) => self.search.select(student),
                    Err(e) => self.report(e),
                }
                self.refresh_nicknames();
                self.run_search();
            }
            Err(e) => self.report(e),
        }
    }

    fn refresh_nicknames(&mut self) {
        match self.roster.nicknamed() {
            Ok(nicknames) => self.search.nicknames = nicknames,
            Err(e) => self.report(e),
        }
    }

    fn set_ready_status(&mut self) {
        let students = self.roster.student_count().unwrap_or(0);
        let images = self.browser.library().map_or(0, |l| l.len());
        self.status = format!("Ready. {} students in roster, {} images in folder.", students, images);
    }

    fn report(&mut self, e: error::GreditError) {
        log::error!("{}", e);
        self.status = format!("❌ {}", e);
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let content = column![
            row![
                self.browser.view(),
                column![self.search.view(), self.import.view()]
                    .spacing(24)
                    .width(Length::Fill),
            ]
            .spacing(24),
            text(&self.status).size(14),
        ]
        .spacing(16)
        .padding(20);

        container(scrollable(content))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, _modifiers| match key.as_ref() {
            keyboard::Key::Named(key::Named::ArrowLeft) => Some(Message::PreviousImage),
            keyboard::Key::Named(key::Named::ArrowRight) => Some(Message::NextImage),
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn open_roster(settings: &Settings) -> error::Result<Roster> {
    let db_path = settings.database_path();
    prepare_database(&db_path, &settings.schema_path())?;
    Roster::open(&db_path)
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load();

    let roster = match open_roster(&settings) {
        Ok(roster) => roster,
        Err(e) => {
            log::error!("Cannot open database: {}", e);
            std::process::exit(1);
        }
    };

    let mut app = iced::application("Gredit", Gredit::update, Gredit::view)
        .settings(iced::Settings {
            default_text_size: Pixels(settings.font_size),
            ..iced::Settings::default()
        })
        .theme(Gredit::theme)
        .subscription(Gredit::subscription)
        .window_size(Size::new(1280.0, 800.0))
        .centered();

    let font_path = settings.font_path();
    match std::fs::read(&font_path) {
        Ok(bytes) => {
            log::info!("🔤 Loaded font {}", font_path.display());
            app = app.font(bytes).default_font(Font::with_name(FONT_FAMILY));
        }
        Err(e) => log::warn!("Failed to open file: {} ({}), using default font", font_path.display(), e),
    }

    app.run_with(move || Gredit::new(settings, roster))
}
