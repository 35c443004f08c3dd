//! People tab: contact list on the left, the selected contact on the right.

use peeps_core::contact::Contact;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};

use super::local_date;
use crate::app::{App, Tab};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
    .split(area);

  draw_list(f, cols[0], app);
  draw_detail(f, cols[1], app);
}

/// "Role at Organization", tolerating either half being blank.
pub fn role_line(c: &Contact) -> String {
  match (c.role.is_empty(), c.organization.is_empty()) {
    (false, false) => format!("{} at {}", c.role, c.organization),
    (false, true) => c.role.clone(),
    (true, false) => c.organization.clone(),
    (true, true) => String::new(),
  }
}

fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let filtered = app.filtered_contacts();
  let total = app.contacts.len();

  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" People ({}/{}) ", filtered.len(), total)
  } else {
    format!(" People ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  let mut inner = block.inner(area);
  f.render_widget(block, area);

  if (app.filter_active || !app.filter.is_empty()) && inner.height > 2 {
    let filter_area = Rect { y: inner.y + inner.height - 1, height: 1, ..inner };
    inner.height -= 1;
    let cursor = if app.filter_active { "_" } else { "" };
    f.render_widget(
      Paragraph::new(format!("/{}{cursor}", app.filter)).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  if filtered.is_empty() {
    f.render_widget(
      Paragraph::new("No contacts. Press a to add one.").style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|c| {
      ListItem::new(Line::from(vec![
        Span::raw(c.name.clone()),
        Span::styled(format!("  {}", c.organization), Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.cursors[Tab::People.index()]));
  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner,
    &mut state,
  );
}

fn draw_detail(f: &mut Frame, area: Rect, app: &App) {
  let Some(contact) = app.cursor_contact() else {
    let block = Block::default()
      .title(" Detail ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(block, area);
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", contact.name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let label = |s: &'static str| {
    Span::styled(
      format!("{s:<10}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
  };

  let mut lines = vec![Line::from(Span::styled(
    role_line(contact),
    Style::default().add_modifier(Modifier::ITALIC),
  ))];
  lines.push(Line::from(""));

  let optional = [
    ("phone", &contact.phone),
    ("email", &contact.email),
    ("profile", &contact.profile_url),
    ("photo", &contact.photo_url),
  ];
  for (name, value) in optional {
    if let Some(value) = value {
      lines.push(Line::from(vec![label(name), Span::raw(value.clone())]));
    }
  }
  lines.push(Line::from(vec![label("added"), Span::raw(local_date(contact.created_at))]));

  let groups: Vec<&str> = app
    .groups
    .iter()
    .filter(|g| g.has_member(contact.contact_id))
    .map(|g| g.name.as_str())
    .collect();
  if !groups.is_empty() {
    lines.push(Line::from(vec![label("groups"), Span::raw(groups.join(", "))]));
  }

  if !contact.notes.is_empty() {
    lines.push(Line::from(""));
    lines.extend(contact.notes.lines().map(|l| Line::from(l.to_owned())));
  }

  f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
