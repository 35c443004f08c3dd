//! Groups tab.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Tab};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(format!(" Groups ({}) ", app.groups.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if app.groups.is_empty() {
    f.render_widget(
      Paragraph::new("No groups. Press a to add one.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }

  let items: Vec<ListItem> = app
    .groups
    .iter()
    .map(|g| {
      let members = match g.members.len() {
        1 => "1 member".to_owned(),
        n => format!("{n} members"),
      };
      ListItem::new(vec![
        Line::from(vec![
          Span::styled(g.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
          Span::styled(format!("  {members}"), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled(
          format!("  {}", g.description),
          Style::default().fg(Color::DarkGray),
        )),
      ])
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.cursors[Tab::Groups.index()]));
  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}
