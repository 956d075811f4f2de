//! UI rendering for the TUI

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::highlight::HighlightCategory;
use crate::node::Classification;

use super::app::App;
use super::widget::TreeRow;

/// Main draw function - orchestrates all rendering
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: header, filter bar, tree, footer
    let main_layout = Layout::vertical([
        Constraint::Length(1), // Header
        Constraint::Length(1), // Filter bar
        Constraint::Min(5),    // Tree
        Constraint::Length(1), // Footer/status
    ])
    .split(area);

    draw_header(frame, app, main_layout[0]);
    draw_filter_bar(frame, app, main_layout[1]);
    draw_tree(frame, app, main_layout[2]);
    draw_footer(frame, app, main_layout[3]);

    if app.show_help {
        draw_help_overlay(frame, area);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let stats = app.tree.stats();
    let refresh_indicator = if app.refresh_shown_at.is_some() {
        " [Updated]"
    } else {
        ""
    };

    let header_text = format!(
        " filetree │ {} │ {} files  {} containers  {} exec  {} duplicates  {} dirs{}",
        app.report_path().display(),
        stats.files,
        stats.containers,
        stats.executables,
        stats.duplicates,
        stats.directories,
        refresh_indicator
    );

    let header =
        Paragraph::new(header_text).style(Style::default().bg(Color::Blue).fg(Color::White).bold());
    frame.render_widget(header, area);
}

fn draw_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let filters = app.tree.filters();
    let mut spans = vec![Span::raw(" ")];
    spans.push(toggle_span("simplify", filters.simplify_mime));
    spans.push(Span::raw(" "));
    spans.push(toggle_span("deselect duplicates", filters.deselect_duplicates));
    spans.push(Span::raw(" │ Highlight: "));

    for (i, category) in HighlightCategory::ALL.iter().enumerate() {
        let label = format!("{}:{}", i + 1, category);
        spans.push(toggle_span(&label, app.highlights.contains(category)));
        spans.push(Span::raw(" "));
    }

    let filter_bar = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(filter_bar, area);
}

fn toggle_span(label: &str, active: bool) -> Span<'static> {
    let style = if active {
        Style::default().fg(Color::Black).bg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    Span::styled(format!("[{}]", label), style)
}

fn draw_tree(frame: &mut Frame, app: &App, area: Rect) {
    let widget = app.widget();
    let dark = app.theme.is_dark();
    let (fg, bg) = if dark {
        (Color::Gray, Color::Black)
    } else {
        (Color::Black, Color::White)
    };
    let mark = if dark { Color::Rgb(90, 75, 0) } else { Color::Rgb(255, 243, 176) };

    let Some(settings) = widget.settings() else {
        frame.render_widget(Paragraph::new(" Tree not drawn"), area);
        return;
    };

    let header = Row::new(settings.columns.iter().map(|c| c.header.clone()))
        .style(Style::default().fg(Color::Cyan).bold());

    let rows: Vec<Row> = widget
        .rows()
        .iter()
        .map(|row| {
            let mut cells = row.cells.clone();
            if let Some(label) = cells.first_mut() {
                *label = tree_label(row, label);
            }
            let mut style = Style::default().fg(node_type_color(row.node_type, fg));
            if row.handle.is_highlighted() {
                style = style.bg(mark);
            }
            Row::new(cells).style(style)
        })
        .collect();

    let widths: Vec<Constraint> = settings
        .columns
        .iter()
        .map(|c| column_width(&c.width))
        .collect();

    let title = if widget.rows().is_empty() {
        " Extracted files (empty) ".to_string()
    } else {
        format!(" Extracted files ({}/{}) ", widget.cursor() + 1, widget.rows().len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .style(Style::default().fg(fg).bg(bg))
        .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .column_spacing(2);

    let mut state = TableState::default().with_selected(Some(widget.cursor()));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Indentation, expander, checkbox and icon in front of the label
fn tree_label(row: &TreeRow, label: &str) -> String {
    let expander = if !row.has_children {
        " "
    } else if row.expanded {
        "▾"
    } else {
        "▸"
    };
    format!(
        "{}{} {} {} {}",
        "  ".repeat(row.depth),
        expander,
        row.check.checkbox(),
        icon_glyph(row.icon.as_deref()),
        label
    )
}

/// Terminal stand-ins for the viewer's font icons
fn icon_glyph(icon: Option<&str>) -> &'static str {
    match icon {
        Some("fa fa-file-archive-o") => "▣",
        Some("fa fa-file-text") => "⚙",
        Some("fa fa-file-word-o") => "✎",
        Some("fa fa-ban") => "⊘",
        Some(_) => "·",
        None => "▤",
    }
}

/// Grid widths are CSS lengths; fixed pixel widths become a narrow minimum
fn column_width(width: &str) -> Constraint {
    match width.strip_suffix("px").and_then(|w| w.parse::<u16>().ok()) {
        Some(px) => Constraint::Min(px.max(10)),
        None => Constraint::Fill(1),
    }
}

pub fn node_type_color(node_type: Classification, default: Color) -> Color {
    match node_type {
        Classification::Directory => Color::Cyan,
        Classification::Exec => Color::Red,
        Classification::Office => Color::Blue,
        Classification::Container => Color::Magenta,
        Classification::Duplicate => Color::DarkGray,
        Classification::File => default,
    }
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let keybinds = "j/k:move  h/l:fold  space:check  s:simplify  d:dedupe  1-4:highlight  enter:done  ?:help  q:quit";

    let footer_text = if let Some((ref msg, _)) = app.status_message {
        msg.clone()
    } else {
        keybinds.to_string()
    };

    let footer = Paragraph::new(format!(" {}", footer_text))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    frame.render_widget(footer, area);
}

fn draw_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_width = 56.min(area.width.saturating_sub(4));
    let popup_height = 28.min(area.height.saturating_sub(4));

    let popup_area = Rect {
        x: (area.width - popup_width) / 2,
        y: (area.height - popup_height) / 2,
        width: popup_width,
        height: popup_height,
    };

    frame.render_widget(Clear, popup_area);

    let help_text = r#"
  Tree
  ─────────────────────────────────
  j/k, ↑/↓     Move up/down
  g/G          Jump to top/bottom
  Ctrl+d/u     Page down/up
  l/→          Expand
  h/←          Collapse / go to parent
  Tab          Toggle expand
  Space        Toggle checkbox
  a / n        Check all / none

  Filters
  ─────────────────────────────────
  s            Simplify mime & magic
  d            Deselect duplicates
  1-4          Highlight files, exec,
               containers, duplicates
  r            Reload report

  Enter        Print selection and exit
  q            Quit

  Press ? or Esc to close
"#;

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .wrap(Wrap { trim: false })
        .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(help, popup_area);
}
