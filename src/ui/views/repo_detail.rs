use crate::reconcile::Reconciled;
use crate::ui::renderfns::{format_date, origin_marker};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

pub fn draw_repo_detail(frame: &mut Frame, area: Rect, entry: Option<&Reconciled>) {
  let block = Block::default()
    .title(" Details ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let Some(entry) = entry else {
    frame.render_widget(block, area);
    return;
  };
  let record = &entry.record;

  let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));

  let mut lines = vec![
    Line::from(vec![Span::styled(
      record.identifier.clone(),
      Style::default().fg(Color::Cyan).bold(),
    )]),
    Line::from(record.description.clone().unwrap_or_else(|| "No description".to_string())),
    Line::from(vec![
      label("Homepage: "),
      Span::raw(record.homepage_url.clone()),
    ]),
    Line::from(vec![
      label("Updated:  "),
      Span::raw(format_date(record.last_updated)),
      label("   License: "),
      Span::raw(record.license.clone()),
      label("   Stars: "),
      Span::raw(record.popularity.to_string()),
    ]),
  ];

  if let Some((marker, color)) = origin_marker(entry.origin) {
    lines.push(Line::from(Span::styled(
      format!("Source: {}", marker),
      Style::default().fg(color),
    )));
  }

  let paragraph = Paragraph::new(lines)
    .block(block)
    .wrap(Wrap { trim: true });
  frame.render_widget(paragraph, area);
}
