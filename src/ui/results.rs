use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::types::genre_name;
use crate::ui::rating_color;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let what = if let Some(genre_id) = app.genre {
        genre_name(genre_id).to_string()
    } else {
        format!("\"{}\"", app.query)
    };
    let block = Block::default().borders(Borders::ALL).title(format!(
        " {} - {}/{} loaded, page {}/{} ",
        what,
        app.movies.len(),
        app.total_results,
        app.current_page,
        app.total_pages
    ));

    if app.movies.is_empty() {
        let message = if app.loading {
            "Loading..."
        } else {
            "No movies found"
        };
        let empty = Paragraph::new(message)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let w = area.width.saturating_sub(2) as usize;
    let fixed = 13; // rating(5) + spaces(2) + year(4) + spaces(2)
    let flex = w.saturating_sub(fixed).max(10);

    let items: Vec<ListItem> = app
        .movies
        .iter()
        .enumerate()
        .map(|(i, movie)| {
            let is_selected = i == app.selected;
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
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}
