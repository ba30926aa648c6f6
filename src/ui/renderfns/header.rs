use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with title, connectivity and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, title: &str, online: bool, refreshing: bool) {
  let (status, status_color) = connectivity_label(online);

  let mut spans = vec![
    Span::styled(format!(" {} ", title), Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", status), Style::default().fg(status_color).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
  ];

  if refreshing {
    spans.push(Span::styled(" Refreshing... ", Style::default().fg(Color::Yellow)));
  }
  spans.push(Span::raw("  "));

  // Shortcuts - keys and brackets highlighted, descriptions dimmed
  for (key, label) in [
    ("<r>", "refresh"),
    ("</>", "search"),
    ("<l>", "license"),
    ("<:>", "command"),
    ("<q>", "quit"),
  ] {
    spans.push(Span::styled(key, Style::default().fg(Color::Cyan)));
    spans.push(Span::styled(
      format!(" {}   ", label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

fn connectivity_label(online: bool) -> (&'static str, Color) {
  if online {
    ("online", Color::Green)
  } else {
    ("offline", Color::Red)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ratatui::backend::TestBackend;
  use ratatui::Terminal;

  fn rendered(online: bool, refreshing: bool) -> String {
    let mut terminal = Terminal::new(TestBackend::new(120, 1)).unwrap();
    terminal
      .draw(|frame| draw_header(frame, frame.area(), "FOSS Hub", online, refreshing))
      .unwrap();
    terminal
      .backend()
      .buffer()
      .content()
      .iter()
      .map(|cell| cell.symbol())
      .collect()
  }

  #[test]
  fn test_header_shows_connectivity() {
    assert!(rendered(true, false).contains("online"));
    assert!(rendered(false, false).contains("offline"));
  }

  #[test]
  fn test_header_shows_refreshing() {
    assert!(rendered(true, true).contains("Refreshing..."));
    assert!(!rendered(true, false).contains("Refreshing..."));
  }
}
