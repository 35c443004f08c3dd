//! Login and register screens.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Style},
  text::{Line, Span},
  widgets::Paragraph,
};

use super::{centered, dialog::draw_form};
use crate::app::{App, Screen};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let (form, hint) = match app.screen {
    Screen::Register => (&app.register, "Enter create  Tab next field  Esc back to sign in"),
    _ => (&app.login, "Enter sign in  Tab next field  Ctrl-R register  Esc quit"),
  };

  let height = form.fields.len() as u16 * 2 + 5;
  let rect = centered(area, 56, height);
  draw_form(f, rect, form);

  let server = Line::from(vec![
    Span::styled("server ", Style::default().fg(Color::DarkGray)),
    Span::raw(app.client.base_url().to_owned()),
  ]);
  let below = Rect {
    x:      rect.x,
    y:      (rect.y + rect.height).min(area.bottom().saturating_sub(2)),
    width:  rect.width,
    height: 2.min(area.height),
  };
  f.render_widget(
    Paragraph::new(vec![
      Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
      server,
    ]),
    below,
  );
}
