mod components;
mod renderfns;
mod views;

pub use components::{CommandEvent, CommandInput, KeyResult, SearchEvent, SearchInput};
pub use renderfns::{format_date, truncate};

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

const OFFLINE_BANNER: &str = " Offline Mode - showing cached data where available";
const CACHED_BANNER: &str = " Some repositories could not be fetched - showing cached data";

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let session = app.session();
  let banner_height = if session.show_banner() { 1 } else { 0 };

  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1),             // Header
      Constraint::Length(banner_height), // Offline banner
      Constraint::Min(3),                // Repository list
      Constraint::Length(7),             // Detail pane
      Constraint::Length(1),             // Status bar
    ])
    .split(frame.area());

  renderfns::draw_header(
    frame,
    chunks[0],
    app.title(),
    session.is_online(),
    session.is_refreshing(),
  );

  if session.show_banner() {
    let text = if session.is_online() && session.any_from_cache() {
      CACHED_BANNER
    } else {
      OFFLINE_BANNER
    };
    let banner = Paragraph::new(text).style(Style::default().fg(Color::Black).bg(Color::Yellow));
    frame.render_widget(banner, chunks[1]);
  }

  let entries = app.visible_entries();
  let filter = app.filter();
  views::draw_repo_list(
    frame,
    chunks[2],
    &views::RepoListProps {
      entries: &entries,
      total: session.entries().len(),
      selected: app.selected(),
      loading: session.is_loading(),
      filter_label: filter.is_active().then(|| filter_label(app)),
    },
  );

  views::draw_repo_detail(frame, chunks[3], entries.get(app.selected()).copied());

  draw_status_bar(frame, chunks[4], app);

  app.search().render_overlay(frame, chunks[2]);
  app.command().render_overlay(frame, chunks[2]);
}

fn filter_label(app: &App) -> String {
  let filter = app.filter();
  let query = filter.query.trim();
  if query.is_empty() {
    filter.license.label().to_string()
  } else {
    format!("\"{}\" · {}", query, filter.license.label())
  }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.status_message() {
    Some(message) => (format!(" {}", message), Style::default().fg(Color::Yellow)),
    None => (
      " j/k:nav  r:refresh  /:search  l:license  Esc:clear  :command  q:quit".to_string(),
      Style::default().fg(Color::DarkGray),
    ),
  };

  frame.render_widget(Paragraph::new(content).style(style), area);
}
