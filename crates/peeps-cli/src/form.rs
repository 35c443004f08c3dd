//! Minimal multi-field text form used by the auth screens and dialogs.

use crossterm::event::{KeyCode, KeyEvent};

#[derive(Debug, Clone)]
pub struct Field {
  pub label:    &'static str,
  pub value:    String,
  /// Rendered as bullets.
  pub secret:   bool,
  pub required: bool,
}

impl Field {
  pub fn text(label: &'static str) -> Self {
    Self { label, value: String::new(), secret: false, required: false }
  }

  pub fn required(mut self) -> Self {
    self.required = true;
    self
  }

  pub fn secret(mut self) -> Self {
    self.secret = true;
    self
  }

  /// What the UI shows for this field.
  pub fn display(&self) -> String {
    if self.secret {
      "•".repeat(self.value.chars().count())
    } else {
      self.value.clone()
    }
  }
}

/// What a key press did to a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
  Edited,
  Submit,
  Cancel,
}

#[derive(Debug, Clone)]
pub struct Form {
  pub title:  &'static str,
  pub fields: Vec<Field>,
  pub focus:  usize,
  /// Form-level message, e.g. a rejected sign-in.
  pub error:  Option<String>,
}

impl Form {
  pub fn new(title: &'static str, fields: Vec<Field>) -> Self {
    Self { title, fields, focus: 0, error: None }
  }

  pub fn login() -> Self {
    Self::new("Sign in", vec![
      Field::text("Email").required(),
      Field::text("Password").required().secret(),
    ])
  }

  pub fn register() -> Self {
    Self::new("Create account", vec![
      Field::text("Email").required(),
      Field::text("Password").required().secret(),
      Field::text("Confirm password").required().secret(),
    ])
  }

  pub fn add_contact() -> Self {
    Self::new("Add contact", vec![
      Field::text("Name").required(),
      Field::text("Role").required(),
      Field::text("Organization").required(),
      Field::text("Phone"),
      Field::text("Email"),
      Field::text("Profile URL"),
      Field::text("Notes"),
      Field::text("Photo file"),
    ])
  }

  pub fn add_group() -> Self {
    Self::new("Add group", vec![
      Field::text("Name").required(),
      Field::text("Description"),
    ])
  }

  pub fn add_post() -> Self { Self::new("New post", vec![Field::text("Content").required()]) }

  pub fn profile_photo() -> Self {
    Self::new("Profile photo", vec![Field::text("Image file").required()])
  }

  /// Trimmed value of the field labelled `label`; empty if there is none.
  pub fn value(&self, label: &str) -> &str {
    self
      .fields
      .iter()
      .find(|f| f.label == label)
      .map(|f| f.value.trim())
      .unwrap_or_default()
  }

  /// Raw (untrimmed) value; passwords are taken verbatim.
  pub fn raw(&self, label: &str) -> &str {
    self
      .fields
      .iter()
      .find(|f| f.label == label)
      .map(|f| f.value.as_str())
      .unwrap_or_default()
  }

  /// Labels of required fields that are still blank.
  pub fn missing(&self) -> Vec<&'static str> {
    self
      .fields
      .iter()
      .filter(|f| f.required && f.value.trim().is_empty())
      .map(|f| f.label)
      .collect()
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
    match key.code {
      KeyCode::Esc => return FormAction::Cancel,
      KeyCode::Enter => return FormAction::Submit,
      KeyCode::Tab | KeyCode::Down => self.focus = (self.focus + 1) % self.fields.len().max(1),
      KeyCode::BackTab | KeyCode::Up => {
        let len = self.fields.len().max(1);
        self.focus = (self.focus + len - 1) % len;
      }
      KeyCode::Backspace => {
        if let Some(field) = self.fields.get_mut(self.focus) {
          field.value.pop();
        }
      }
      KeyCode::Char(c) => {
        if let Some(field) = self.fields.get_mut(self.focus) {
          field.value.push(c);
        }
      }
      _ => {}
    }
    FormAction::Edited
  }
}

/// Local check on the register form before anything is sent.
pub fn register_error(form: &Form) -> Option<String> {
  if let Some(label) = form.missing().first() {
    return Some(format!("{label} is required"));
  }
  if form.raw("Password") != form.raw("Confirm password") {
    return Some("Passwords do not match".into());
  }
  None
}

#[cfg(test)]
mod tests {
  use crossterm::event::KeyModifiers;

  use super::*;

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  fn type_str(form: &mut Form, s: &str) {
    for c in s.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn typing_goes_to_the_focused_field() {
    let mut form = Form::login();
    type_str(&mut form, "a@b.c");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "hunter2");
    form.handle_key(key(KeyCode::Backspace));

    assert_eq!(form.value("Email"), "a@b.c");
    assert_eq!(form.raw("Password"), "hunter");
    assert_eq!(form.fields[1].display(), "••••••");
  }

  #[test]
  fn focus_wraps_both_ways() {
    let mut form = Form::login();
    form.handle_key(key(KeyCode::BackTab));
    assert_eq!(form.focus, 1);
    form.handle_key(key(KeyCode::Down));
    assert_eq!(form.focus, 0);
  }

  #[test]
  fn enter_and_esc_are_actions() {
    let mut form = Form::add_post();
    assert_eq!(form.handle_key(key(KeyCode::Enter)), FormAction::Submit);
    assert_eq!(form.handle_key(key(KeyCode::Esc)), FormAction::Cancel);
  }

  #[test]
  fn mismatched_passwords_are_caught_locally() {
    let mut form = Form::register();
    type_str(&mut form, "a@example.com");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "secret1");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "secret2");
    assert_eq!(register_error(&form).as_deref(), Some("Passwords do not match"));

    form.handle_key(key(KeyCode::Backspace));
    type_str(&mut form, "1");
    assert_eq!(register_error(&form), None);
  }

  #[test]
  fn required_fields_are_reported() {
    let mut form = Form::add_contact();
    type_str(&mut form, "Alice");
    assert_eq!(form.missing(), vec!["Role", "Organization"]);
  }
}
