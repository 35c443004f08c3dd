//! TUI rendering for every screen and pane.

pub mod auth;
pub mod dialog;
pub mod feed;
pub mod groups;
pub mod people;

use chrono::{DateTime, Local, Utc};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph, Tabs},
};

use crate::app::{App, Screen, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  if app.screen != Screen::Main {
    auth::draw(f, area, app);
    return;
  }

  // Vertical stack: header, tabs, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Length(1), // tabs
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_tabs(f, rows[1], app);
  match app.tab {
    Tab::People => people::draw(f, rows[2], app),
    Tab::Groups => groups::draw(f, rows[2], app),
    Tab::Feed => feed::draw(f, rows[2], app),
  }
  draw_status(f, rows[3], app);

  if let Some(d) = &app.dialog {
    dialog::draw(f, area, app, d);
  }
}

/// Format a timestamp in the local timezone.
pub fn local_date(dt: DateTime<Utc>) -> String {
  dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// A rectangle of `width` × `height` centred in `area`, clipped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
  let width = width.min(area.width);
  let height = height.min(area.height);
  Rect {
    x: area.x + (area.width - width) / 2,
    y: area.y + (area.height - height) / 2,
    width,
    height,
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let who = app
    .user
    .as_ref()
    .map(|u| {
      let photo = if u.photo_url.is_some() { " ◉" } else { "" };
      format!("{}{photo} ", u.email)
    })
    .unwrap_or_default();

  let left = Span::styled(
    " peeps  [p] photo  [o] sign out  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(who, Style::default().fg(Color::Gray));

  // Simple left-right header: pad the middle.
  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
  let counts = [app.contacts.len(), app.groups.len(), app.posts.len()];
  let titles: Vec<Line> = Tab::ALL
    .iter()
    .zip(counts)
    .enumerate()
    .map(|(i, (tab, n))| Line::from(format!("{} {} ({n})", i + 1, tab.title())))
    .collect();

  let tabs = Tabs::new(titles)
    .select(app.tab.index())
    .style(Style::default().fg(Color::DarkGray))
    .highlight_style(
      Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )
    .divider("│");
  f.render_widget(tabs, area);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match (&app.dialog, app.tab) {
    (Some(_), _) => ("DIALOG", "Tab next field  Enter confirm  Esc cancel"),
    (None, Tab::People) if app.filter_active => (
      "SEARCH",
      "Type to filter  Esc clear  Enter keep",
    ),
    (None, Tab::People) => (
      "PEOPLE",
      "↑↓/jk move  a add  g groups  d delete  / search  Tab next tab",
    ),
    (None, Tab::Groups) => (
      "GROUPS",
      "↑↓/jk move  a add  Enter members  d delete  Tab next tab",
    ),
    (None, Tab::Feed) => (
      "FEED",
      "↑↓/jk move  a post  l like  x dislike  r repost  d delete  R reload",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span])).style(Style::default().bg(Color::Black)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn centered_rect_fits_inside() {
    let area = Rect::new(0, 0, 80, 24);
    assert_eq!(centered(area, 40, 10), Rect::new(20, 7, 40, 10));
    assert_eq!(centered(area, 200, 50), area);
  }
}
