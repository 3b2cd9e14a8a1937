//! The UI renders the session into something visible and vim-able.
//!
//! The draw function dispatches based on the current view: one of the three
//! pick lists (files, sections, keys) or the value editor.

use crate::app_state::{AppState, View};
use edtui::{EditorTheme, EditorView};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Renders the active view based on current application state.
pub fn draw(f: &mut Frame, app: &mut AppState) {
    let view = if app.current_view == View::Command {
        app.previous_view
    } else {
        app.current_view
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Breadcrumb
            Constraint::Min(0),    // List or editor
            Constraint::Length(3), // Help
        ])
        .split(f.area());

    draw_breadcrumb(f, app, chunks[0]);
    match view {
        View::FileList | View::Command => draw_files(f, app, chunks[1]),
        View::Sections => draw_sections(f, app, chunks[1]),
        View::Keys => draw_keys(f, app, chunks[1]),
        View::Value => draw_value(f, app, chunks[1]),
    }
    draw_help(f, app, view, chunks[2]);
}

fn draw_breadcrumb(f: &mut Frame, app: &AppState, area: Rect) {
    let mut parts = vec![app
        .directory
        .as_ref()
        .map_or_else(|| "(no directory, use :cd)".to_string(), |d| d.display().to_string())];

    if let Some(doc) = &app.document {
        if app.current_view != View::FileList {
            if let Some(name) = doc.path().file_name() {
                parts.push(name.to_string_lossy().into_owned());
            }
        }
    }
    if matches!(app.current_view, View::Keys | View::Value) {
        if let Some(label) = app
            .document
            .as_ref()
            .and_then(|d| d.display_labels().get(app.current_section_index))
        {
            parts.push(label.label.clone());
        }
    }
    if app.current_view == View::Value {
        if let Some(key) = app.current_key() {
            parts.push(key);
        }
    }

    let widget = Paragraph::new(parts.join(" > "))
        .block(Block::default().borders(Borders::ALL).title("Location"));
    f.render_widget(widget, area);
}

fn draw_list(f: &mut Frame, area: Rect, title: String, rows: Vec<Line<'_>>, selected: usize) {
    let items: Vec<ListItem> = rows.into_iter().map(ListItem::new).collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

    let mut state = ListState::default();
    state.select(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_files(f: &mut Frame, app: &AppState, area: Rect) {
    let rows = app
        .files
        .iter()
        .map(|name| {
            Line::from(Span::styled(
                format!("📄 {name}"),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
            ))
        })
        .collect();
    let title = format!("Files ({})", app.files.len());
    draw_list(f, area, title, rows, app.current_file_index);
}

fn draw_sections(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(doc) = &app.document else {
        return;
    };
    let rows = doc
        .display_labels()
        .iter()
        .map(|l| Line::from(l.label.as_str()))
        .collect();
    let title = format!("Parts ({})", doc.display_labels().len());
    draw_list(f, area, title, rows, app.current_section_index);
}

fn draw_keys(f: &mut Frame, app: &AppState, area: Rect) {
    let Some(doc) = &app.document else {
        return;
    };
    let Some(section) = app.current_section_ref().and_then(|name| doc.section(name)) else {
        return;
    };

    let rows = section
        .entries
        .iter()
        .map(|e| {
            Line::from(vec![
                Span::styled(e.key.clone(), Style::default().fg(Color::Cyan)),
                Span::styled(" = ", Style::default().fg(Color::DarkGray)),
                Span::raw(e.value.clone()),
            ])
        })
        .collect();
    let title = format!("Params [{}]", section.name);
    draw_list(f, area, title, rows, app.current_key_index);
}

fn draw_value(f: &mut Frame, app: &mut AppState, area: Rect) {
    let title = format!("Value ({})", app.options.encoding.name());
    if let Some(ref mut editor_state) = app.editor_state {
        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let editor = EditorView::new(editor_state)
            .theme(EditorTheme::default())
            .wrap(true);
        f.render_widget(editor, inner);
    }
}

fn draw_help(f: &mut Frame, app: &AppState, view: View, area: Rect) {
    let help_text = if app.current_view == View::Command {
        format!(":{}", app.command_buffer)
    } else if let Some(ref msg) = app.message {
        msg.clone()
    } else {
        let hint = match view {
            View::FileList | View::Command => {
                "↑/↓: Navigate | Enter: Open | :cd DIR Change directory | q: Quit"
            }
            View::Sections => "↑/↓: Navigate | Enter: Params | Esc: Files | q: Quit",
            View::Keys => "↑/↓: Navigate | Enter: Edit value | Esc: Parts | q: Quit",
            View::Value => ":w Save | :x Save & Back | :q Back | Esc: Back (normal mode)",
        };
        hint.to_string()
    };

    let style = if app.message.is_some() && app.current_view != View::Command {
        Style::default().fg(Color::Blue)
    } else {
        Style::default()
    };
    let help = Paragraph::new(help_text)
        .style(style)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, area);
}
