//! Feed tab: every post, newest first.

use peeps_core::{post::Post, reaction::Reaction};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use uuid::Uuid;

use super::local_date;
use crate::app::{App, Tab};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(format!(" Feed ({}) ", app.posts.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  if app.posts.is_empty() {
    f.render_widget(
      Paragraph::new("Nothing posted yet. Press a to write something.")
        .style(Style::default().fg(Color::DarkGray))
        .block(block),
      area,
    );
    return;
  }

  let me = app.user.as_ref().map(|u| u.user_id);
  let items: Vec<ListItem> = app.posts.iter().map(|p| ListItem::new(post_lines(p, me))).collect();

  let mut state = ListState::default();
  state.select(Some(app.cursors[Tab::Feed.index()]));
  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::Rgb(30, 40, 60)))
      .highlight_symbol("▌"),
    area,
    &mut state,
  );
}

/// Counters plus the viewer's own reaction, e.g. `▲ 3  ▼ 0  ⟳ 1  (liked)`.
pub fn counters(post: &Post, me: Option<Uuid>) -> String {
  let mine = me.map(|id| post.reaction_of(id)).unwrap_or_default();
  let reposted = me.is_some_and(|id| post.has_reposted(id));

  let mut own = Vec::new();
  if !mine.is_none() {
    own.push(mine.as_str());
  }
  if reposted {
    own.push("reposted");
  }
  let own = if own.is_empty() { String::new() } else { format!("  ({})", own.join(", ")) };

  format!(
    "▲ {}  ▼ {}  ⟳ {}{own}",
    post.liked_by().len(),
    post.disliked_by().len(),
    post.reposted_by.len()
  )
}

fn post_lines(post: &Post, me: Option<Uuid>) -> Vec<Line<'static>> {
  let header = Line::from(vec![
    Span::styled(post.author_name.clone(), Style::default().add_modifier(Modifier::BOLD)),
    Span::styled(
      format!("  {}", local_date(post.created_at)),
      Style::default().fg(Color::DarkGray),
    ),
    Span::styled(
      if post.is_repost() { "  reposted" } else { "" },
      Style::default().fg(Color::Magenta),
    ),
  ]);

  let mut lines = vec![header];
  match (&post.original_post, post.original_post_id) {
    (Some(original), _) => {
      let quote = Style::default().fg(Color::Gray);
      lines.push(Line::from(Span::styled(
        format!("  ┃ {} · {}", original.author_name, local_date(original.created_at)),
        quote,
      )));
      lines.extend(
        original
          .content
          .lines()
          .map(|l| Line::from(Span::styled(format!("  ┃ {l}"), quote))),
      );
    }
    (None, Some(_)) => lines.push(Line::from(Span::styled(
      "  ┃ original post deleted",
      Style::default().fg(Color::DarkGray),
    ))),
    (None, None) => {
      lines.extend(post.content.lines().map(|l| Line::from(format!("  {l}"))));
    }
  }

  let own_style = match me.map(|id| post.reaction_of(id)) {
    Some(Reaction::Liked) => Style::default().fg(Color::Green),
    Some(Reaction::Disliked) => Style::default().fg(Color::Red),
    _ => Style::default().fg(Color::DarkGray),
  };
  lines.push(Line::from(Span::styled(format!("  {}", counters(post, me)), own_style)));
  lines.push(Line::from(""));
  lines
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeMap;

  use chrono::Utc;

  use super::*;

  fn post() -> Post {
    Post {
      post_id:          Uuid::new_v4(),
      author_id:        Uuid::new_v4(),
      author_name:      "a@example.com".into(),
      content:          "hello".into(),
      created_at:       Utc::now(),
      reactions:        BTreeMap::new(),
      reposted_by:      Vec::new(),
      original_post_id: None,
      original_post:    None,
    }
  }

  #[test]
  fn counters_show_own_state() {
    let me = Uuid::new_v4();
    let mut p = post();
    p.toggle_like(me);
    p.toggle_dislike(Uuid::new_v4());
    p.reposted_by.push(me);

    assert_eq!(counters(&p, Some(me)), "▲ 1  ▼ 1  ⟳ 1  (liked, reposted)");
    assert_eq!(counters(&p, None), "▲ 1  ▼ 1  ⟳ 1");
  }

  #[test]
  fn repost_of_deleted_original_is_marked() {
    let mut p = post();
    p.original_post_id = Some(Uuid::new_v4());
    let text: Vec<String> = post_lines(&p, None).iter().map(|l| l.to_string()).collect();
    assert!(text.iter().any(|l| l.contains("original post deleted")));
  }
}
