/// Search window: per-keystroke roster search plus a nickname editor
use iced::widget::{button, column, row, text, text_input};
use iced::{Alignment, Element, Length};

use super::table::{table, table_row, ColumnSpec};
use crate::state::data::{Nickname, SearchHit, Student};
use crate::Message;

const COLUMNS: [ColumnSpec; 4] = [
    ColumnSpec::fixed("ID", 120.0),
    ColumnSpec::stretch("Name", 2),
    ColumnSpec::fixed("Bhawan", 60.0),
    ColumnSpec::fixed("Room", 50.0),
];

const NICK_COLUMNS: [ColumnSpec; 3] = [
    ColumnSpec::fixed("ID", 120.0),
    ColumnSpec::stretch("Name", 2),
    ColumnSpec::stretch("Nick", 1),
];

#[derive(Debug, Default)]
pub struct Search {
    pub query: String,
    pub hits: Vec<SearchHit>,
    /// How long the last search took
    pub elapsed: String,
    pub selected: Option<Student>,
    pub nick_draft: String,
    pub nicknames: Vec<Nickname>,
}

impl Search {
    pub fn select(&mut self, student: Option<Student>) {
        self.nick_draft = student
            .as_ref()
            .and_then(|s| s.nick.clone())
            .unwrap_or_default();
        self.selected = student;
    }

    pub fn view(&self) -> Element<Message> {
        let input = row![
            text_input("Search by name, nickname or id…", &self.query)
                .on_input(Message::SearchChanged)
                .width(Length::Fill),
            text(format!("Searched in {}", self.elapsed)).size(14),
        ]
        .spacing(10)
        .align_y(Alignment::Center);

        let rows = self
            .hits
            .iter()
            .enumerate()
            .map(|(i, hit)| {
                table_row(
                    &COLUMNS,
                    [
                        hit.idno.as_str(),
                        hit.name.as_str(),
                        hit.hoscode.as_str(),
                        hit.roomno.as_str(),
                    ],
                    i % 2 == 1,
                    Some(Message::SelectStudent(hit.idno.clone())),
                )
            })
            .collect();

        let mut content = column![
            text("Search Window").size(18),
            input,
            table(&COLUMNS, rows, Length::Fixed(260.0)),
        ]
        .spacing(8);

        if let Some(student) = &self.selected {
            content = content.push(
                row![
                    text(format!("{} ({})", student.name, student.idno)).width(Length::FillPortion(2)),
                    text_input("Nickname", &self.nick_draft)
                        .on_input(Message::NickChanged)
                        .on_submit(Message::SaveNick)
                        .width(Length::FillPortion(2)),
                    button("Save").on_press(Message::SaveNick),
                    button("Clear").on_press(Message::ClearNick),
                ]
                .spacing(10)
                .align_y(Alignment::Center),
            );
        }

        if !self.nicknames.is_empty() {
            let rows = self
                .nicknames
                .iter()
                .enumerate()
                .map(|(i, n)| {
                    table_row(
                        &NICK_COLUMNS,
                        [n.idno.as_str(), n.name.as_str(), n.nick.as_str()],
                        i % 2 == 1,
                        Some(Message::SelectStudent(n.idno.clone())),
                    )
                })
                .collect();
            content = content.push(text("Nicknames").size(16));
            content = content.push(table(&NICK_COLUMNS, rows, Length::Fixed(120.0)));
        }

        content.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selecting_a_student_fills_the_nick_draft() {
        let mut search = Search::default();
        search.select(Some(Student {
            idno: "2021A7PS0001".into(),
            name: "Asha Rao".into(),
            gender: "F".into(),
            hoscode: "MR".into(),
            roomno: "101".into(),
            nick: Some("ash".into()),
        }));
        assert_eq!(search.nick_draft, "ash");

        search.select(None);
        assert!(search.nick_draft.is_empty());
        assert!(search.selected.is_none());
    }
}
