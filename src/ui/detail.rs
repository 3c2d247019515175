use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::types::MovieDetail;
use crate::ui::rating_color;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(detail) = &app.detail else {
        let block = Block::default().borders(Borders::ALL).title("Movie");
        let empty = Paragraph::new("No movie selected")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Min(0),
            Constraint::Length(8),
        ])
        .split(area);

    render_header(frame, app, detail, chunks[0]);
    render_overview(frame, app, detail, chunks[1]);
    render_cast(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, detail: &MovieDetail, area: Rect) {
    let rating = detail.vote_average.unwrap_or(0.0);
    let runtime = detail
        .runtime
        .map(|m| format!("{}h {:02}m", m / 60, m % 60))
        .unwrap_or_else(|| "unknown runtime".to_string());
    let released = detail
        .release_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unreleased".to_string());

    let trailer_line = match app.trailer() {
        Some(video) => Line::from(vec![
            Span::styled("Trailer: ", Style::default().fg(Color::Gray)),
            Span::styled(video.url(), Style::default().fg(Color::Cyan)),
        ]),
        None => Line::from(Span::styled(
            "No trailer available",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let lines = vec![
        Line::from(Span::styled(
            detail.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(
                format!("★ {:.1}", rating),
                Style::default()
                    .fg(rating_color(rating))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::raw(runtime),
            Span::raw(" | "),
            Span::styled("Released: ", Style::default().fg(Color::Gray)),
            Span::raw(released),
        ]),
        trailer_line,
    ];

    let header =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Details "));
    frame.render_widget(header, area);
}

fn render_overview(frame: &mut Frame, app: &App, detail: &MovieDetail, area: Rect) {
    let overview = detail.overview.as_deref().unwrap_or("No overview.");

    let inner_width = area.width.saturating_sub(2) as usize;
    let lines = wrap_text(overview, inner_width.max(10));

    let inner_height = area.height.saturating_sub(2) as usize;
    let max_scroll = lines.len().saturating_sub(inner_height);
    let scroll = app.detail_scroll.min(max_scroll);

    let visible: Vec<Line> = lines
        .into_iter()
        .skip(scroll)
        .take(inner_height)
        .map(Line::from)
        .collect();

    let body = Paragraph::new(Text::from(visible))
        .block(Block::default().borders(Borders::ALL).title(" Overview "));
    frame.render_widget(body, area);
}

fn render_cast(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Cast ({}) ", app.cast.len()));

    if app.cast.is_empty() {
        let empty = Paragraph::new("No cast information")
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = app
        .cast
        .iter()
        .map(|member| {
            let mut spans = vec![Span::styled(
                member.name.clone(),
                Style::default().fg(Color::Yellow),
            )];
            if let Some(character) = &member.character {
                spans.push(Span::styled(
                    format!(" as {}", character),
                    Style::default().fg(Color::Gray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Greedy word wrap; overlong words land on their own line untouched.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for source_line in text.lines() {
        let mut current = String::new();
        for word in source_line.split_whitespace() {
            if current.is_empty() {
                current = word.to_string();
            } else if current.len() + 1 + word.len() <= width {
                current.push(' ');
                current.push_str(word);
            } else {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            }
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_splits_at_width() {
        let lines = wrap_text("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn wrap_keeps_short_text_on_one_line() {
        assert_eq!(wrap_text("short", 40), vec!["short"]);
    }

    #[test]
    fn wrap_preserves_paragraph_breaks() {
        let lines = wrap_text("first\nsecond", 40);
        assert_eq!(lines, vec!["first", "second"]);
    }
}
