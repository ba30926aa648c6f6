use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::filter::{LicenseFilter, RecordFilter};
use crate::reconcile::Reconciled;
use crate::services::Services;
use crate::session::Session;
use crate::ui::{self, CommandEvent, CommandInput, KeyResult, SearchEvent, SearchInput};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Main application state
pub struct App {
  /// Application configuration
  config: Arc<Config>,

  /// Reconciler and connectivity monitor
  services: Services,

  /// Outcome of the latest accepted pass plus flags
  session: Session,

  /// Client-side filters over the session entries
  filter: RecordFilter,

  /// Index into the filtered list
  selected: usize,

  search: SearchInput,
  command: CommandInput,

  /// One-shot message for the status bar, cleared on next key
  status: Option<String>,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, services: Services) -> Self {
    let (tx, _rx) = mpsc::unbounded_channel();
    let session = Session::new(services.monitor.is_online());

    Self {
      config: Arc::new(config),
      services,
      session,
      filter: RecordFilter::default(),
      selected: 0,
      search: SearchInput::new(),
      command: CommandInput::new(),
      status: None,
      event_tx: tx,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    self.forward_connectivity();
    self.start_pass();

    let result = self.event_loop(&mut terminal, &mut events).await;

    // Cleanup terminal, even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(
    &mut self,
    terminal: &mut Terminal<B>,
    events: &mut EventHandler,
  ) -> Result<()> {
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  /// Relay connectivity transitions into the event loop
  fn forward_connectivity(&self) {
    let mut state = self.services.monitor.subscribe();
    let tx = self.event_tx.clone();

    tokio::spawn(async move {
      while state.changed().await.is_ok() {
        let online = *state.borrow_and_update();
        if tx.send(Event::Connectivity(online)).is_err() {
          break;
        }
      }
    });
  }

  /// Spawn a reconciliation pass; its outcome comes back as an event
  fn start_pass(&mut self) {
    let generation = self.session.begin_pass();
    let reconciler = Arc::clone(&self.services.reconciler);
    let config = Arc::clone(&self.config);
    let tx = self.event_tx.clone();
    debug!(generation, "starting pass");

    tokio::spawn(async move {
      let outcome = reconciler.reconcile(&config.items).await;
      let _ = tx.send(Event::PassFinished {
        generation,
        outcome,
      });
    });
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::PassFinished {
        generation,
        outcome,
      } => {
        if self.session.finish_pass(generation, outcome) {
          self.clamp_selection();
        } else {
          debug!(generation, "discarded superseded pass");
        }
      }
      Event::Connectivity(online) => {
        self.session.set_online(online);
        self.status = Some(if online {
          "Back online - press r to refresh".to_string()
        } else {
          "Connection lost - showing cached data".to_string()
        });
      }
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }
    self.status = None;

    // An open overlay owns the keyboard
    if self.search.is_active() {
      self.handle_search_key(key);
      return;
    }
    if self.handle_command_key(key) || self.handle_search_key(key) {
      return;
    }

    match key.code {
      KeyCode::Char('q') => self.should_quit = true,

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),

      KeyCode::Char('r') => self.refresh(),
      KeyCode::Char('l') => self.cycle_license(),
      KeyCode::Esc => self.clear_filters(),

      _ => {}
    }
  }

  /// Returns true when the command palette consumed the key
  fn handle_command_key(&mut self, key: KeyEvent) -> bool {
    match self.command.handle_key(key) {
      KeyResult::Event(CommandEvent::Submitted(cmd)) => {
        self.execute_command(&cmd);
        true
      }
      KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => true,
      KeyResult::NotHandled => false,
    }
  }

  fn handle_search_key(&mut self, key: KeyEvent) -> bool {
    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(query)) => {
        self.filter.query = query;
        self.clamp_selection();
        true
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => true,
      KeyResult::NotHandled => false,
    }
  }

  fn execute_command(&mut self, cmd: &str) {
    match cmd {
      "refresh" => self.refresh(),
      "probe" => {
        self.services.monitor.probe_now();
        self.status = Some("Checking connectivity...".to_string());
      }
      "license" => self.cycle_license(),
      "clear" => self.clear_filters(),
      "quit" => self.should_quit = true,
      "" => {}
      other => self.status = Some(format!("Unknown command: {}", other)),
    }
  }

  fn refresh(&mut self) {
    info!("manual refresh");
    self.start_pass();
  }

  fn cycle_license(&mut self) {
    self.filter.license = self.filter.license.cycle();
    self.clamp_selection();
  }

  fn clear_filters(&mut self) {
    self.filter.query.clear();
    self.filter.license = LicenseFilter::All;
    self.clamp_selection();
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.visible_entries().len();
    if len == 0 {
      self.selected = 0;
      return;
    }

    self.selected = if delta > 0 {
      (self.selected + delta as usize).min(len - 1)
    } else {
      self.selected.saturating_sub(delta.unsigned_abs() as usize)
    };
  }

  fn clamp_selection(&mut self) {
    let len = self.visible_entries().len();
    self.selected = self.selected.min(len.saturating_sub(1));
  }

  // Getters for UI

  pub fn title(&self) -> &str {
    self.config.title.as_deref().unwrap_or("fosshub")
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn visible_entries(&self) -> Vec<&Reconciled> {
    self.filter.apply(self.session.entries())
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn filter(&self) -> &RecordFilter {
    &self.filter
  }

  pub fn search(&self) -> &SearchInput {
    &self.search
  }

  pub fn command(&self) -> &CommandInput {
    &self.command
  }

  pub fn status_message(&self) -> Option<&str> {
    self.status.as_deref()
  }
}
