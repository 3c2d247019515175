use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::{App, HomeSection};
use crate::types::GENRES;
use crate::ui::rating_color;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_now_playing(frame, app, chunks[0]);
    render_genres(frame, app, chunks[1]);
}

fn section_block(title: String, is_active: bool) -> Block<'static> {
    let title_style = if is_active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, title_style))
        .border_style(if is_active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        })
}

fn render_now_playing(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.home_section == HomeSection::NowPlaying;
    let block = section_block(
        format!(" Now Playing ({}) ", app.now_playing.len()),
        is_active,
    );

    if app.now_playing.is_empty() && !app.loading {
        let empty = Paragraph::new("Nothing playing right now")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 13; // rating(5) + spaces(2) + year(4) + spaces(2)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = app
        .now_playing
        .iter()
        .enumerate()
        .map(|(i, movie)| {
            let is_selected = is_active && i == app.now_playing_index;
            let style = if is_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let title = if movie.title.len() > flex {
                format!("{}...", &movie.title[..flex.saturating_sub(3)])
            } else {
                movie.title.clone()
            };

            let year = movie
                .release_date
                .map(|d| d.format("%Y").to_string())
                .unwrap_or_else(|| "----".to_string());

            let line = Line::from(vec![
                Span::styled(
                    format!("{:>4.1} ", movie.rating()),
                    Style::default().fg(rating_color(movie.rating())),
                ),
                Span::raw("  "),
                Span::styled(format!("{:<flex$}", title), style),
                Span::raw("  "),
                Span::styled(year, Style::default().fg(Color::DarkGray)),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if is_active && !app.now_playing.is_empty() {
        state.select(Some(app.now_playing_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}

fn render_genres(frame: &mut Frame, app: &App, area: Rect) {
    let is_active = app.home_section == HomeSection::Genres;
    let block = section_block(" Genres ".to_string(), is_active);

    let items: Vec<ListItem> = GENRES
        .iter()
        .enumerate()
        .map(|(i, genre)| {
            let is_selected = is_active && i == app.genre_index;
            let style = if is_selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(Span::styled(genre.name, style)))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if is_active {
        state.select(Some(app.genre_index));
    }

    frame.render_stateful_widget(list, area, &mut state);
}
