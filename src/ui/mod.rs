mod detail;
mod home;
mod popup;
mod results;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, Screen};
use crate::types::{genre_name, SortOrder};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::Home => home::render(frame, app, chunks[1]),
        Screen::Results => results::render(frame, app, chunks[1]),
        Screen::Detail => detail::render(frame, app, chunks[1]),
    }

    if app.sort_popup {
        popup::render_sort_select(frame, app.popup_index);
    }

    render_status_bar(frame, app, chunks[2]);
}

/// Rating badge color, mirroring the usual 0-10 vote scale buckets.
pub(crate) fn rating_color(rating: f64) -> Color {
    if rating >= 7.0 {
        Color::Green
    } else if rating >= 5.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.screen {
        Screen::Home => "flick - Movies".to_string(),
        Screen::Results => {
            if let Some(genre_id) = app.genre {
                format!("flick - {}", genre_name(genre_id))
            } else {
                format!("flick - Search: {}", app.query)
            }
        }
        Screen::Detail => {
            if let Some(detail) = &app.detail {
                format!("flick - {}", detail.title)
            } else {
                "flick - Movie".to_string()
            }
        }
    };

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if app.search_mode {
        Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Yellow)),
            Span::raw(app.search_input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        )])
    } else if app.loading {
        Line::from(vec![Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        )])
    } else {
        let help = match app.screen {
            Screen::Home => "Tab: sections | j/k: nav | Enter: open | /: search | q: quit",
            Screen::Results => "j/k: nav | Enter: details | s: sort | /: search | q: back",
            Screen::Detail => "j/k: scroll | o: trailer | y: copy url | p: save poster | q: back",
        };

        if app.screen == Screen::Results && app.total_results > 0 {
            let sort = match app.sort_order {
                SortOrder::None => String::new(),
                order => format!(" | {}", order),
            };
            Line::from(vec![
                Span::styled(
                    format!("Found {} movies{}  ", app.total_results, sort),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(help, Style::default().fg(Color::Gray)),
            ])
        } else {
            Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
        }
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
