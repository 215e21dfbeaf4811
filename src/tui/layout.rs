use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::tui::app::{ActivePane, TuiApp};

pub const TITLE: &str = "Papers You May Like";

pub fn render(frame: &mut Frame, app: &mut TuiApp) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),      // Title
            Constraint::Percentage(40), // Items pane
            Constraint::Min(10),        // Preview pane
            Constraint::Length(1),      // Status bar
        ])
        .split(frame.area());

    render_title(frame, chunks[0]);
    render_items_pane(frame, app, chunks[1]);
    render_preview_pane(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);
}

fn border_style(is_active: bool) -> Style {
    if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn render_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new(TITLE)
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD));
    frame.render_widget(title, area);
}

fn render_items_pane(frame: &mut Frame, app: &mut TuiApp, area: Rect) {
    let is_active = app.active_pane == ActivePane::Items;

    let items: Vec<ListItem> = app
        .matches
        .iter()
        .map(|found| {
            let date = found
                .item
                .published_at
                .map(|d| d.format("%m/%d").to_string())
                .unwrap_or_else(|| "     ".to_string());

            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", date)),
                Span::styled(
                    format!("[{}] ", found.trigger),
                    Style::default().fg(Color::Yellow),
                ),
                Span::raw(found.item.display_title().to_string()),
            ]))
        })
        .collect();

    let highlight = if is_active {
        Style::default()
            .bg(Color::Cyan)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().bg(Color::DarkGray)
    };

    let title = format!(" Matches ({}) ", app.matches.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active));

    let list = List::new(items).block(block).highlight_style(highlight);
    frame.render_stateful_widget(list, area, &mut app.item_list_state);
}

fn render_preview_pane(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let is_active = app.active_pane == ActivePane::Preview;

    let (title, content) = if let Some(found) = app.selected() {
        let item = &found.item;
        let mut lines = Vec::new();

        lines.push(Line::from(Span::styled(
            item.display_title().to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));

        if !item.subject.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Subject: {}", item.subject),
                Style::default().fg(Color::Yellow),
            )));
        }
        if let Some(date) = item.published_at {
            lines.push(Line::from(Span::styled(
                format!("Date: {}", date.format("%Y-%m-%d %H:%M")),
                Style::default().fg(Color::Yellow),
            )));
        }
        if !item.link.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("Link: {}", item.link),
                Style::default().fg(Color::Blue),
            )));
        }
        lines.push(Line::from(Span::styled(
            format!("Matched: {}", found.trigger),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from("─".repeat(area.width.saturating_sub(2) as usize)));
        lines.push(Line::from(""));
        lines.push(Line::from(item.summary.clone()));

        (" Preview ".to_string(), Text::from(lines))
    } else {
        (
            " Preview ".to_string(),
            Text::from("Waiting for matching items..."),
        )
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style(is_active));

    let paragraph = Paragraph::new(content)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.preview_scroll, 0));

    frame.render_widget(paragraph, area);
}

fn render_status_bar(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let status = if let Some(ref msg) = app.status_message {
        msg.clone()
    } else if !app.polling {
        "Polling stopped".to_string()
    } else {
        "j/k:Navigate  Tab:Pane  o:Open  q:Quit".to_string()
    };

    let paragraph =
        Paragraph::new(status).style(Style::default().fg(Color::White).bg(Color::DarkGray));

    frame.render_widget(paragraph, area);
}
