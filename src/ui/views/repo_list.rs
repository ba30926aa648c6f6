use crate::reconcile::Reconciled;
use crate::ui::renderfns::{format_date, license_color, origin_marker, truncate};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub struct RepoListProps<'a> {
  pub entries: &'a [&'a Reconciled],
  pub total: usize,
  pub selected: usize,
  pub loading: bool,
  pub filter_label: Option<String>,
}

pub fn draw_repo_list(frame: &mut Frame, area: Rect, props: &RepoListProps<'_>) {
  let title = if props.loading {
    " Repositories (loading...) ".to_string()
  } else if props.entries.len() == props.total {
    format!(" Repositories ({}) ", props.total)
  } else {
    format!(" Repositories ({}/{}) ", props.entries.len(), props.total)
  };

  let mut block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));
  if let Some(label) = &props.filter_label {
    block = block.title_bottom(Line::from(format!(" {} ", label)).right_aligned());
  }

  if props.entries.is_empty() {
    let content = if props.loading {
      "Loading repositories..."
    } else if props.total == 0 {
      "No repositories configured. Add some under `items` in the config file."
    } else {
      "No repositories match the current filters."
    };
    let paragraph = Paragraph::new(content)
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = props.entries.iter().map(|entry| row(entry)).collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(props.selected.min(props.entries.len() - 1)));

  frame.render_stateful_widget(list, area, &mut state);
}

fn row(entry: &Reconciled) -> ListItem<'static> {
  let record = &entry.record;
  let name_color = if entry.origin.is_placeholder() {
    Color::DarkGray
  } else {
    Color::Cyan
  };
  let mut spans = vec![
    Span::styled(
      format!("{:<44}", truncate(&record.identifier, 44)),
      Style::default().fg(name_color),
    ),
    Span::raw(" "),
    Span::styled(
      format!("★ {:>6}", record.popularity.to_string()),
      Style::default().fg(Color::Yellow),
    ),
    Span::raw(" "),
    Span::styled(
      format!("{:<12}", truncate(&record.license, 12)),
      Style::default().fg(license_color(&record.license)),
    ),
    Span::raw(" "),
    Span::styled(
      format_date(record.last_updated),
      Style::default().fg(Color::DarkGray),
    ),
  ];

  if let Some((marker, color)) = origin_marker(entry.origin) {
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
      format!("[{}]", marker),
      Style::default().fg(color),
    ));
  }

  ListItem::new(Line::from(spans))
}
