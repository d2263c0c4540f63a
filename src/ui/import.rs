/// "Loaded Mess List" panel: review parsed CSV rows before committing them
use iced::widget::{button, column, row, text};
use iced::{Alignment, Element, Length};
use std::path::PathBuf;

use super::table::{table, table_row, ColumnSpec};
use crate::state::data::LoadedRow;
use crate::Message;

const COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec::fixed("ID", 120.0),
    ColumnSpec::stretch("Name", 2),
    ColumnSpec::fixed("Sex", 40.0),
    ColumnSpec::fixed("Bhawan", 60.0),
    ColumnSpec::fixed("Room", 50.0),
];

#[derive(Debug, Default)]
pub struct Import {
    pub rows: Vec<LoadedRow>,
    pub source: Option<PathBuf>,
    pub visible: bool,
    /// Time the last commit took
    pub load_time: Option<String>,
}

impl Import {
    /// Replace the pending rows with a freshly read file
    pub fn loaded(&mut self, source: PathBuf, rows: Vec<LoadedRow>) {
        self.rows = rows;
        self.source = Some(source);
        self.visible = true;
        self.load_time = None;
    }

    pub fn view(&self) -> Element<Message> {
        let open = button("Open CSV…").on_press(Message::OpenCsv);

        if !self.visible {
            return row![open, text("No mess list loaded").size(14)]
                .spacing(10)
                .align_y(Alignment::Center)
                .into();
        }

        let source = self
            .source
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        let rows = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, r)| table_row(&COLUMNS, r.fields.iter().map(String::as_str), i % 2 == 1, None))
            .collect();

        let mut commit = row![button("Looks good to me, load this messlist").on_press(Message::CommitLoaded)]
            .spacing(10)
            .align_y(Alignment::Center);
        if let Some(load_time) = &self.load_time {
            commit = commit.push(text(format!("Loaded in {}!", load_time)));
        }

        column![
            row![
                text("Loaded Mess List").size(18),
                open,
                button("Close").on_press(Message::CloseLoaded),
            ]
            .spacing(10)
            .align_y(Alignment::Center),
            text(source).size(12),
            text(format!(
                "{} lines of csv parsed, scroll to the bottom to load this mess list",
                self.rows.len()
            )),
            table(&COLUMNS, rows, Length::Fixed(220.0)),
            commit,
        ]
        .spacing(8)
        .into()
    }
}
