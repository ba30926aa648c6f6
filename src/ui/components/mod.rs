mod command_input;
mod input;
mod key_result;
mod search_input;

pub use command_input::{CommandEvent, CommandInput};
pub use key_result::KeyResult;
pub use search_input::{SearchEvent, SearchInput};

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Clear and frame an overlay in the top-left of `area`.
///
/// Returns the inner area, or `None` when there is no room to draw into.
fn overlay_frame(frame: &mut Frame, area: Rect, extra_rows: u16, title: &str) -> Option<Rect> {
  let width = (area.width * 60 / 100).clamp(30, 60).min(area.width.saturating_sub(2));
  let height = (3 + extra_rows).min(area.height.saturating_sub(1));
  let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height);

  frame.render_widget(Clear, overlay_area);

  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Yellow))
    .title(title.to_string());
  let inner = block.inner(overlay_area);
  frame.render_widget(block, overlay_area);

  (inner.height > 0).then_some(inner)
}

fn draw_input_line(frame: &mut Frame, area: Rect, prefix: &'static str, value: &str) {
  let line = Line::from(vec![
    Span::styled(prefix, Style::default().fg(Color::Yellow)),
    Span::raw(value.to_string()),
    Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
  ]);
  frame.render_widget(Paragraph::new(line), area);
}
