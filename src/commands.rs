/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "refresh",
    aliases: &["r", "reload"],
    description: "Start a new reconciliation pass",
  },
  Command {
    name: "probe",
    aliases: &["p", "ping"],
    description: "Re-check connectivity now",
  },
  Command {
    name: "license",
    aliases: &["l", "licenses"],
    description: "Cycle the license filter",
  },
  Command {
    name: "clear",
    aliases: &["c", "reset"],
    description: "Clear search and license filters",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit fosshub",
  },
];

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.trim().to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_priority(cmd, &input_lower).map(|p| (cmd, p)))
    .collect();

  // Stable sort keeps declaration order among equal priorities
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Lower is better; `None` means no match at all
fn match_priority(cmd: &Command, input: &str) -> Option<u32> {
  if cmd.name == input {
    Some(0)
  } else if cmd.aliases.contains(&input) {
    Some(1)
  } else if cmd.name.starts_with(input) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(input)) {
    Some(3)
  } else if cmd.name.contains(input) {
    Some(4)
  } else if cmd.aliases.iter().any(|a| a.contains(input)) {
    Some(5)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_input_returns_all() {
    let suggestions = get_suggestions("");
    assert_eq!(suggestions.len(), COMMANDS.len());
  }

  #[test]
  fn test_exact_match() {
    let suggestions = get_suggestions("probe");
    assert_eq!(suggestions[0].name, "probe");
  }

  #[test]
  fn test_alias_match() {
    let suggestions = get_suggestions("r");
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_prefix_match() {
    let suggestions = get_suggestions("lic");
    assert_eq!(suggestions[0].name, "license");
  }

  #[test]
  fn test_fuzzy_match() {
    let suggestions = get_suggestions("fres");
    assert_eq!(suggestions[0].name, "refresh");
  }

  #[test]
  fn test_no_match() {
    assert!(get_suggestions("zzz").is_empty());
  }
}
