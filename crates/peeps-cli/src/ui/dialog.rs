//! Modal dialogs: forms, group members, add-to-groups.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};
use uuid::Uuid;

use super::centered;
use crate::{
  app::{App, Dialog},
  form::Form,
};

pub fn draw(f: &mut Frame, area: Rect, app: &App, dialog: &Dialog) {
  match dialog {
    Dialog::Form(_, form) => {
      let height = form.fields.len() as u16 * 2 + 5;
      draw_form(f, centered(area, 64, height), form);
    }
    Dialog::GroupMembers { group_id, cursor } => draw_members(f, area, app, *group_id, *cursor),
    Dialog::AddToGroups { selected, cursor, .. } => {
      let rect = centered(area, 56, app.groups.len() as u16 + 4);
      let items: Vec<ListItem> = app
        .groups
        .iter()
        .map(|g| {
          let mark = if selected.contains(&g.group_id) { "[x] " } else { "[ ] " };
          ListItem::new(Line::from(vec![
            Span::raw(mark),
            Span::styled(g.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", g.description), Style::default().fg(Color::DarkGray)),
          ]))
        })
        .collect();
      draw_list(f, rect, " Add to groups (Space toggle, Enter add) ", items, *cursor, "No groups yet.");
    }
  }
}

/// Render a form with its title, fields and form-level error.
pub fn draw_form(f: &mut Frame, rect: Rect, form: &Form) {
  let block = Block::default()
    .title(format!(" {} ", form.title))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  let inner = block.inner(rect);
  f.render_widget(Clear, rect);
  f.render_widget(block, rect);

  let mut lines: Vec<Line> = Vec::new();
  for (i, field) in form.fields.iter().enumerate() {
    let focused = i == form.focus;
    let label_style = if focused {
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(Color::Gray)
    };
    let marker = if field.required { "*" } else { "" };
    lines.push(Line::from(Span::styled(format!("{}{marker}", field.label), label_style)));

    let cursor = if focused { "_" } else { "" };
    lines.push(Line::from(format!("  {}{cursor}", field.display())));
  }

  if let Some(error) = &form.error {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(error.clone(), Style::default().fg(Color::Red))));
  }

  f.render_widget(Paragraph::new(lines), inner);
}

fn draw_members(f: &mut Frame, area: Rect, app: &App, group_id: Uuid, cursor: usize) {
  let Some(group) = app.groups.iter().find(|g| g.group_id == group_id) else {
    return;
  };

  let items: Vec<ListItem> = group
    .members
    .iter()
    .map(|id| {
      let name = app
        .contact_name(*id)
        .map(str::to_owned)
        .unwrap_or_else(|| id.to_string());
      ListItem::new(name)
    })
    .collect();

  let rect = centered(area, 56, group.members.len() as u16 + 4);
  let title = format!(" {} members (d remove, Esc close) ", group.name);
  draw_list(f, rect, &title, items, cursor, "No members yet.");
}

fn draw_list(
  f: &mut Frame,
  rect: Rect,
  title: &str,
  items: Vec<ListItem>,
  cursor: usize,
  empty: &str,
) {
  let block = Block::default()
    .title(title.to_owned())
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));
  f.render_widget(Clear, rect);

  if items.is_empty() {
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    f.render_widget(
      Paragraph::new(empty.to_owned()).style(Style::default().fg(Color::DarkGray)),
      inner,
    );
    return;
  }

  let mut state = ListState::default();
  state.select(Some(cursor));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    rect,
    &mut state,
  );
}
