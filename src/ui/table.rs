/// Plain text tables built from rows of widgets
use iced::widget::{button, column, container, scrollable, text, Column, Row};
use iced::{Element, Length};

use crate::Message;

/// Title and width of one table column
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub title: &'static str,
    pub width: Length,
}

impl ColumnSpec {
    pub const fn fixed(title: &'static str, width: f32) -> Self {
        Self {
            title,
            width: Length::Fixed(width),
        }
    }

    pub const fn stretch(title: &'static str, portion: u16) -> Self {
        Self {
            title,
            width: Length::FillPortion(portion),
        }
    }
}

const CELL_SPACING: u16 = 8;

fn cells<'a, I>(columns: &[ColumnSpec], values: I) -> Row<'a, Message>
where
    I: IntoIterator<Item = &'a str>,
{
    Row::with_children(
        columns
            .iter()
            .zip(values)
            .map(|(column, value)| Element::from(text(value).width(column.width))),
    )
    .spacing(CELL_SPACING)
}

/// One table row, optionally clickable
pub fn table_row<'a, I>(
    columns: &[ColumnSpec],
    values: I,
    striped: bool,
    on_press: Option<Message>,
) -> Element<'a, Message>
where
    I: IntoIterator<Item = &'a str>,
{
    let row = cells(columns, values).width(Length::Fill);

    let content: Element<'a, Message> = match on_press {
        Some(message) => button(row)
            .on_press(message)
            .style(button::text)
            .padding(2)
            .width(Length::Fill)
            .into(),
        None => container(row).padding(2).into(),
    };

    if striped {
        container(content)
            .style(container::rounded_box)
            .width(Length::Fill)
            .into()
    } else {
        content
    }
}

/// Header plus a scrollable body of rows
pub fn table<'a>(
    columns: &[ColumnSpec],
    rows: Vec<Element<'a, Message>>,
    height: Length,
) -> Element<'a, Message> {
    let header = Row::with_children(
        columns
            .iter()
            .map(|column| Element::from(text(column.title).size(14).width(column.width))),
    )
    .spacing(CELL_SPACING)
    .padding(2);

    column![
        header,
        scrollable(Column::with_children(rows).spacing(2)).height(height),
    ]
    .spacing(6)
    .into()
}
