//! Application state machine and event dispatcher.
//!
//! Every network failure other than a rejected sign-in or sign-up is logged
//! and swallowed; the UI simply keeps showing what it had.

use std::{collections::BTreeSet, mem, path::Path};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use peeps_core::{
  contact::{Contact, NewContact},
  group::{Group, NewGroup},
  identity::{ProfileUpdate, User},
  post::Post,
  reconcile,
};
use uuid::Uuid;

use crate::{
  cache::LocalCache,
  client::ApiClient,
  form::{Form, FormAction, register_error},
};

// ─── Screen / tabs / dialogs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  Login,
  Register,
  Main,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  People,
  Groups,
  Feed,
}

impl Tab {
  pub const ALL: [Tab; 3] = [Tab::People, Tab::Groups, Tab::Feed];

  pub fn title(self) -> &'static str {
    match self {
      Tab::People => "People",
      Tab::Groups => "Groups",
      Tab::Feed => "Feed",
    }
  }

  pub fn index(self) -> usize {
    match self {
      Tab::People => 0,
      Tab::Groups => 1,
      Tab::Feed => 2,
    }
  }

  pub fn next(self) -> Self { Self::ALL[(self.index() + 1) % 3] }

  pub fn prev(self) -> Self { Self::ALL[(self.index() + 2) % 3] }
}

/// Which form a [`Dialog::Form`] is collecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
  AddContact,
  AddGroup,
  AddPost,
  ProfilePhoto,
}

#[derive(Debug, Clone)]
pub enum Dialog {
  Form(FormKind, Form),
  /// Members of one group; members can be removed.
  GroupMembers { group_id: Uuid, cursor: usize },
  /// Multi-select of groups to add one contact to.
  AddToGroups {
    contact_id: Uuid,
    selected:   BTreeSet<Uuid>,
    cursor:     usize,
  },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  pub screen: Screen,
  pub tab:    Tab,
  pub dialog: Option<Dialog>,

  pub login:    Form,
  pub register: Form,

  /// Signed-in user, once authenticated.
  pub user: Option<User>,

  pub contacts: Vec<Contact>,
  pub groups:   Vec<Group>,
  pub posts:    Vec<Post>,

  /// Cursor per tab, indexed by [`Tab::index`].
  pub cursors: [usize; 3],

  /// Fuzzy filter over the People tab.
  pub filter:        String,
  pub filter_active: bool,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  pub client: ApiClient,
  pub cache:  LocalCache,
}

fn opt(value: &str) -> Option<String> {
  let value = value.trim();
  (!value.is_empty()).then(|| value.to_owned())
}

fn clamp(cursor: &mut usize, len: usize) { *cursor = (*cursor).min(len.saturating_sub(1)); }

fn step(cursor: &mut usize, len: usize, down: bool) {
  if down {
    if *cursor + 1 < len {
      *cursor += 1;
    }
  } else {
    *cursor = cursor.saturating_sub(1);
  }
}

impl App {
  pub fn new(client: ApiClient, cache: LocalCache) -> Self {
    Self {
      screen: Screen::Login,
      tab: Tab::People,
      dialog: None,
      login: Form::login(),
      register: Form::register(),
      user: None,
      contacts: Vec::new(),
      groups: Vec::new(),
      posts: Vec::new(),
      cursors: [0; 3],
      filter: String::new(),
      filter_active: false,
      status_msg: String::new(),
      client,
      cache,
    }
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// First load phase: whatever the cache holds, synchronously.
  pub fn hydrate_from_cache(&mut self) {
    self.contacts = self.cache.load_contacts();
    self.groups = self.cache.load_groups();
    tracing::debug!(
      contacts = self.contacts.len(),
      groups = self.groups.len(),
      "hydrated from cache"
    );
  }

  /// Second load phase: fetch from the server and merge.
  pub async fn load_remote(&mut self) {
    self.status_msg = "Loading…".into();

    match self.client.list_contacts().await {
      Ok(remote) => self.merge_contacts(remote),
      Err(e) => tracing::warn!(error = %e, "fetching contacts failed"),
    }
    match self.client.list_groups().await {
      Ok(remote) => self.merge_groups(remote),
      Err(e) => tracing::warn!(error = %e, "fetching groups failed"),
    }
    self.refresh_feed().await;

    self.status_msg.clear();
  }

  /// Reconcile fetched contacts into the local list and persist the result.
  pub fn merge_contacts(&mut self, remote: Vec<Contact>) {
    self.contacts = reconcile(mem::take(&mut self.contacts), remote);
    self.cache.save_contacts(&self.contacts);
    clamp(&mut self.cursors[Tab::People.index()], self.contacts.len());
  }

  pub fn merge_groups(&mut self, remote: Vec<Group>) {
    self.groups = reconcile(mem::take(&mut self.groups), remote);
    self.cache.save_groups(&self.groups);
    clamp(&mut self.cursors[Tab::Groups.index()], self.groups.len());
  }

  /// Posts are never cached; the feed is replaced wholesale.
  async fn refresh_feed(&mut self) {
    match self.client.feed().await {
      Ok(posts) => {
        self.posts = posts;
        clamp(&mut self.cursors[Tab::Feed.index()], self.posts.len());
      }
      Err(e) => tracing::warn!(error = %e, "fetching feed failed"),
    }
  }

  fn upsert_group(&mut self, group: Group) {
    match self.groups.iter_mut().find(|g| g.group_id == group.group_id) {
      Some(slot) => *slot = group,
      None => self.groups.push(group),
    }
  }

  // ── Selection ─────────────────────────────────────────────────────────────

  pub fn cursor(&self) -> usize { self.cursors[self.tab.index()] }

  /// Contacts matching the current filter query, in list order.
  pub fn filtered_contacts(&self) -> Vec<&Contact> {
    if self.filter.is_empty() {
      return self.contacts.iter().collect();
    }
    let matcher = SkimMatcherV2::default();
    self
      .contacts
      .iter()
      .filter(|c| {
        let haystack = format!("{} {} {}", c.name, c.role, c.organization);
        matcher.fuzzy_match(&haystack, &self.filter).is_some()
      })
      .collect()
  }

  pub fn cursor_contact(&self) -> Option<&Contact> {
    self
      .filtered_contacts()
      .get(self.cursors[Tab::People.index()])
      .copied()
  }

  pub fn cursor_group(&self) -> Option<&Group> { self.groups.get(self.cursors[Tab::Groups.index()]) }

  pub fn cursor_post(&self) -> Option<&Post> { self.posts.get(self.cursors[Tab::Feed.index()]) }

  pub fn contact_name(&self, id: Uuid) -> Option<&str> {
    self
      .contacts
      .iter()
      .find(|c| c.contact_id == id)
      .map(|c| c.name.as_str())
  }

  fn tab_len(&self) -> usize {
    match self.tab {
      Tab::People => self.filtered_contacts().len(),
      Tab::Groups => self.groups.len(),
      Tab::Feed => self.posts.len(),
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    match self.screen {
      Screen::Login => self.handle_login_key(key).await,
      Screen::Register => self.handle_register_key(key).await,
      Screen::Main => self.handle_main_key(key).await,
    }
  }

  async fn handle_login_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('r') {
      self.screen = Screen::Register;
      return Ok(true);
    }
    match self.login.handle_key(key) {
      FormAction::Cancel => return Ok(false),
      FormAction::Edited => {}
      FormAction::Submit => {
        if !self.login.missing().is_empty() {
          self.login.error = Some("Email and password are required".into());
          return Ok(true);
        }
        let email = self.login.value("Email").to_owned();
        let password = self.login.raw("Password").to_owned();
        match self.client.sign_in(&email, &password).await {
          Ok(user) => self.enter_main(user).await,
          Err(e) => {
            tracing::info!(error = %e, "sign-in rejected");
            self.login.error = Some(e.to_string());
          }
        }
      }
    }
    Ok(true)
  }

  async fn handle_register_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    match self.register.handle_key(key) {
      FormAction::Cancel => self.screen = Screen::Login,
      FormAction::Edited => {}
      FormAction::Submit => {
        if let Some(message) = register_error(&self.register) {
          self.register.error = Some(message);
          return Ok(true);
        }
        let email = self.register.value("Email").to_owned();
        let password = self.register.raw("Password").to_owned();
        match self.client.sign_up(&email, &password).await {
          Ok(user) => self.enter_main(user).await,
          Err(e) => {
            tracing::info!(error = %e, "sign-up rejected");
            self.register.error = Some(e.to_string());
          }
        }
      }
    }
    Ok(true)
  }

  async fn enter_main(&mut self, user: User) {
    tracing::info!(user_id = %user.user_id, "signed in");
    self.user = Some(user);
    self.login = Form::login();
    self.register = Form::register();
    self.screen = Screen::Main;
    self.load_remote().await;
  }

  async fn sign_out(&mut self) {
    if let Err(e) = self.client.sign_out().await {
      tracing::warn!(error = %e, "sign-out failed");
    }
    self.user = None;
    self.dialog = None;
    self.posts.clear();
    self.screen = Screen::Login;
  }

  async fn handle_main_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    if let Some(dialog) = self.dialog.take() {
      self.dialog = self.handle_dialog_key(dialog, key).await;
      return Ok(true);
    }
    if self.filter_active {
      self.handle_filter_key(key);
      return Ok(true);
    }

    let len = self.tab_len();
    match key.code {
      KeyCode::Char('q') => return Ok(false),

      // Tabs
      KeyCode::Tab | KeyCode::Right => self.tab = self.tab.next(),
      KeyCode::BackTab | KeyCode::Left => self.tab = self.tab.prev(),
      KeyCode::Char('1') => self.tab = Tab::People,
      KeyCode::Char('2') => self.tab = Tab::Groups,
      KeyCode::Char('3') => self.tab = Tab::Feed,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => step(&mut self.cursors[self.tab.index()], len, true),
      KeyCode::Up | KeyCode::Char('k') => step(&mut self.cursors[self.tab.index()], len, false),

      // Account
      KeyCode::Char('p') => {
        self.dialog = Some(Dialog::Form(FormKind::ProfilePhoto, Form::profile_photo()));
      }
      KeyCode::Char('o') => self.sign_out().await,
      KeyCode::Char('R') => self.load_remote().await,

      _ => match self.tab {
        Tab::People => self.handle_people_key(key).await,
        Tab::Groups => self.handle_groups_key(key).await,
        Tab::Feed => self.handle_feed_key(key).await,
      },
    }
    Ok(true)
  }

  fn handle_filter_key(&mut self, key: KeyEvent) {
    let people = Tab::People.index();
    match key.code {
      KeyCode::Esc => {
        self.filter_active = false;
        self.filter.clear();
      }
      KeyCode::Enter => self.filter_active = false,
      KeyCode::Backspace => {
        self.filter.pop();
      }
      KeyCode::Char(c) => self.filter.push(c),
      _ => {}
    }
    self.cursors[people] = 0;
  }

  async fn handle_people_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('a') => {
        self.dialog = Some(Dialog::Form(FormKind::AddContact, Form::add_contact()));
      }
      KeyCode::Char('/') => {
        self.filter_active = true;
        self.filter.clear();
        self.cursors[Tab::People.index()] = 0;
      }
      KeyCode::Char('g') => {
        if let Some(contact_id) = self.cursor_contact().map(|c| c.contact_id) {
          self.dialog = Some(Dialog::AddToGroups {
            contact_id,
            selected: BTreeSet::new(),
            cursor: 0,
          });
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        if let Some(id) = self.cursor_contact().map(|c| c.contact_id) {
          self.delete_contact(id).await;
        }
      }
      _ => {}
    }
  }

  async fn handle_groups_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('a') => {
        self.dialog = Some(Dialog::Form(FormKind::AddGroup, Form::add_group()));
      }
      KeyCode::Enter => {
        if let Some(group_id) = self.cursor_group().map(|g| g.group_id) {
          self.dialog = Some(Dialog::GroupMembers { group_id, cursor: 0 });
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => {
        if let Some(id) = self.cursor_group().map(|g| g.group_id) {
          self.delete_group(id).await;
        }
      }
      _ => {}
    }
  }

  async fn handle_feed_key(&mut self, key: KeyEvent) {
    let Some(post_id) = self.cursor_post().map(|p| p.post_id) else {
      if key.code == KeyCode::Char('a') {
        self.dialog = Some(Dialog::Form(FormKind::AddPost, Form::add_post()));
      }
      return;
    };

    let outcome = match key.code {
      KeyCode::Char('a') => {
        self.dialog = Some(Dialog::Form(FormKind::AddPost, Form::add_post()));
        return;
      }
      KeyCode::Char('l') => self.client.like(post_id).await.map(|_| ()),
      KeyCode::Char('x') => self.client.dislike(post_id).await.map(|_| ()),
      KeyCode::Char('r') => self.client.repost(post_id).await.map(|_| ()),
      KeyCode::Char('d') | KeyCode::Delete => {
        self.delete_post(post_id).await;
        return;
      }
      _ => return,
    };

    match outcome {
      Ok(()) => self.refresh_feed().await,
      Err(e) => tracing::warn!(%post_id, error = %e, "post action failed"),
    }
  }

  // ── Dialogs ───────────────────────────────────────────────────────────────

  /// Returns the dialog to keep open, or `None` to close it.
  async fn handle_dialog_key(&mut self, dialog: Dialog, key: KeyEvent) -> Option<Dialog> {
    match dialog {
      Dialog::Form(kind, mut form) => match form.handle_key(key) {
        FormAction::Cancel => None,
        FormAction::Edited => Some(Dialog::Form(kind, form)),
        FormAction::Submit => {
          if let Some(label) = form.missing().first() {
            form.error = Some(format!("{label} is required"));
            return Some(Dialog::Form(kind, form));
          }
          self.submit_form(kind, &form).await;
          None
        }
      },

      Dialog::GroupMembers { group_id, mut cursor } => {
        let members: Vec<Uuid> = self
          .groups
          .iter()
          .find(|g| g.group_id == group_id)
          .map(|g| g.members.iter().copied().collect())
          .unwrap_or_default();
        match key.code {
          KeyCode::Esc | KeyCode::Char('q') => return None,
          KeyCode::Down | KeyCode::Char('j') => step(&mut cursor, members.len(), true),
          KeyCode::Up | KeyCode::Char('k') => step(&mut cursor, members.len(), false),
          KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(&contact_id) = members.get(cursor) {
              self.remove_member(group_id, contact_id).await;
              clamp(&mut cursor, members.len() - 1);
            }
          }
          _ => {}
        }
        Some(Dialog::GroupMembers { group_id, cursor })
      }

      Dialog::AddToGroups { contact_id, mut selected, mut cursor } => {
        match key.code {
          KeyCode::Esc => return None,
          KeyCode::Down | KeyCode::Char('j') => step(&mut cursor, self.groups.len(), true),
          KeyCode::Up | KeyCode::Char('k') => step(&mut cursor, self.groups.len(), false),
          KeyCode::Char(' ') => {
            if let Some(group_id) = self.groups.get(cursor).map(|g| g.group_id)
              && !selected.remove(&group_id)
            {
              selected.insert(group_id);
            }
          }
          KeyCode::Enter => {
            self.add_to_groups(contact_id, &selected).await;
            return None;
          }
          _ => {}
        }
        Some(Dialog::AddToGroups { contact_id, selected, cursor })
      }
    }
  }

  async fn submit_form(&mut self, kind: FormKind, form: &Form) {
    match kind {
      FormKind::AddContact => self.add_contact(form).await,
      FormKind::AddGroup => self.add_group(form).await,
      FormKind::AddPost => self.add_post(form.value("Content")).await,
      FormKind::ProfilePhoto => self.upload_profile_photo(Path::new(form.value("Image file"))).await,
    }
  }

  // ── Mutations ─────────────────────────────────────────────────────────────

  async fn add_contact(&mut self, form: &Form) {
    // A failed photo upload still adds the contact, just without a photo.
    let photo_url = match opt(form.value("Photo file")) {
      Some(path) => match self.client.upload_image(Path::new(&path)).await {
        Ok(url) => Some(url),
        Err(e) => {
          tracing::warn!(%path, error = %e, "photo upload failed");
          None
        }
      },
      None => None,
    };

    let input = NewContact {
      name: form.value("Name").to_owned(),
      role: form.value("Role").to_owned(),
      organization: form.value("Organization").to_owned(),
      notes: form.value("Notes").to_owned(),
      photo_url,
      phone: opt(form.value("Phone")),
      email: opt(form.value("Email")),
      profile_url: opt(form.value("Profile URL")),
    };

    match self.client.add_contact(&input).await {
      Ok(contact) => {
        self.status_msg = format!("Added {}", contact.name);
        self.contacts.push(contact);
        self.cache.save_contacts(&self.contacts);
      }
      Err(e) => tracing::warn!(error = %e, "adding contact failed"),
    }
  }

  async fn delete_contact(&mut self, id: Uuid) {
    match self.client.delete_contact(id).await {
      Ok(()) => {
        self.contacts.retain(|c| c.contact_id != id);
        for group in &mut self.groups {
          group.members.remove(&id);
        }
        self.cache.save_contacts(&self.contacts);
        self.cache.save_groups(&self.groups);
        let len = self.filtered_contacts().len();
        clamp(&mut self.cursors[Tab::People.index()], len);
      }
      Err(e) => tracing::warn!(contact_id = %id, error = %e, "deleting contact failed"),
    }
  }

  async fn add_group(&mut self, form: &Form) {
    let input = NewGroup::new(form.value("Name"), form.value("Description"));
    match self.client.add_group(&input).await {
      Ok(group) => {
        self.status_msg = format!("Added {}", group.name);
        self.groups.push(group);
        self.cache.save_groups(&self.groups);
      }
      Err(e) => tracing::warn!(error = %e, "adding group failed"),
    }
  }

  async fn delete_group(&mut self, id: Uuid) {
    match self.client.delete_group(id).await {
      Ok(()) => {
        self.groups.retain(|g| g.group_id != id);
        self.cache.save_groups(&self.groups);
        clamp(&mut self.cursors[Tab::Groups.index()], self.groups.len());
      }
      Err(e) => tracing::warn!(group_id = %id, error = %e, "deleting group failed"),
    }
  }

  async fn remove_member(&mut self, group_id: Uuid, contact_id: Uuid) {
    match self.client.remove_member(group_id, contact_id).await {
      Ok(group) => {
        self.upsert_group(group);
        self.cache.save_groups(&self.groups);
      }
      Err(e) => tracing::warn!(%group_id, %contact_id, error = %e, "removing member failed"),
    }
  }

  async fn add_to_groups(&mut self, contact_id: Uuid, group_ids: &BTreeSet<Uuid>) {
    for &group_id in group_ids {
      match self.client.add_member(group_id, contact_id).await {
        Ok(group) => self.upsert_group(group),
        Err(e) => tracing::warn!(%group_id, %contact_id, error = %e, "adding member failed"),
      }
    }
    self.cache.save_groups(&self.groups);
  }

  async fn add_post(&mut self, content: &str) {
    match self.client.create_post(content).await {
      Ok(post) => {
        self.posts.insert(0, post);
        self.cursors[Tab::Feed.index()] = 0;
      }
      Err(e) => tracing::warn!(error = %e, "creating post failed"),
    }
  }

  async fn delete_post(&mut self, post_id: Uuid) {
    let is_mine = self
      .cursor_post()
      .zip(self.user.as_ref())
      .is_some_and(|(p, u)| p.author_id == u.user_id);
    if !is_mine {
      return;
    }
    match self.client.delete_post(post_id).await {
      Ok(()) => self.refresh_feed().await,
      Err(e) => tracing::warn!(%post_id, error = %e, "deleting post failed"),
    }
  }

  async fn upload_profile_photo(&mut self, path: &Path) {
    let url = match self.client.upload_image(path).await {
      Ok(url) => url,
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "profile photo upload failed");
        return;
      }
    };
    let update = ProfileUpdate { photo_url: Some(url) };
    match self.client.update_profile(&update).await {
      Ok(user) => {
        self.user = Some(user);
        self.status_msg = "Profile photo updated".into();
      }
      Err(e) => tracing::warn!(error = %e, "profile update failed"),
    }
  }
}
