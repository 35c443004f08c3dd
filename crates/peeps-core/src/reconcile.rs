//! Merging a locally cached collection with a freshly fetched one.

use std::collections::HashSet;

use uuid::Uuid;

use crate::{contact::Contact, group::Group, post::Post};

/// Anything keyed by a stable identifier.
pub trait Identified {
  fn id(&self) -> Uuid;
}

impl Identified for Contact {
  fn id(&self) -> Uuid { self.contact_id }
}

impl Identified for Group {
  fn id(&self) -> Uuid { self.group_id }
}

impl Identified for Post {
  fn id(&self) -> Uuid { self.post_id }
}

/// Union of `local` and `remote` keyed by identifier.
///
/// Local entries come first in their cached order and win on collision; no
/// field-level merge happens. Remote entries whose identifier is not yet
/// present follow in fetch order. Each identifier appears at most once.
pub fn reconcile<T: Identified>(local: Vec<T>, remote: Vec<T>) -> Vec<T> {
  let mut seen: HashSet<Uuid> = HashSet::with_capacity(local.len() + remote.len());
  let mut merged = Vec::with_capacity(local.len() + remote.len());

  for item in local.into_iter().chain(remote) {
    if seen.insert(item.id()) {
      merged.push(item);
    }
  }

  merged
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::contact::Contact;

  #[derive(Debug, Clone, PartialEq)]
  struct Item {
    id:   Uuid,
    name: &'static str,
  }

  impl Identified for Item {
    fn id(&self) -> Uuid { self.id }
  }

  fn id(n: u128) -> Uuid { Uuid::from_u128(n) }

  fn contact(n: u128, name: &str) -> Contact {
    Contact {
      contact_id:   id(n),
      owner_id:     Uuid::nil(),
      name:         name.into(),
      role:         String::new(),
      organization: String::new(),
      notes:        String::new(),
      created_at:   Utc::now(),
      photo_url:    None,
      phone:        None,
      email:        None,
      profile_url:  None,
    }
  }

  #[test]
  fn cached_alice_and_remote_bob() {
    let cached_alice = contact(1, "Alice");
    let local = vec![cached_alice.clone()];
    let mut remote_alice = contact(1, "Alice");
    remote_alice.notes = "edited elsewhere".into();
    let remote = vec![remote_alice, contact(2, "Bob")];

    let merged = reconcile(local, remote);
    let names: Vec<_> = merged.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob"]);
    assert_eq!(merged[0], cached_alice);
  }

  #[test]
  fn local_wins_on_collision() {
    let local = vec![Item { id: id(1), name: "local" }];
    let remote = vec![Item { id: id(1), name: "remote" }];
    assert_eq!(reconcile(local, remote), vec![Item { id: id(1), name: "local" }]);
  }

  #[test]
  fn order_is_local_then_new_remote() {
    let local = vec![Item { id: id(3), name: "c" }, Item { id: id(1), name: "a" }];
    let remote = vec![
      Item { id: id(4), name: "d" },
      Item { id: id(1), name: "a'" },
      Item { id: id(2), name: "b" },
    ];
    let ids: Vec<_> = reconcile(local, remote).iter().map(|i| i.id).collect();
    assert_eq!(ids, [id(3), id(1), id(4), id(2)]);
  }

  #[test]
  fn every_identifier_exactly_once() {
    // A small exhaustive sweep over overlapping id ranges.
    for l in 0..5u128 {
      for r in 0..5u128 {
        let local: Vec<_> = (0..l).map(|n| Item { id: id(n), name: "l" }).collect();
        let remote: Vec<_> = (2..2 + r).map(|n| Item { id: id(n), name: "r" }).collect();

        let merged = reconcile(local.clone(), remote.clone());

        for item in &local {
          assert_eq!(merged.iter().filter(|m| *m == item).count(), 1);
        }
        for item in &remote {
          let expected = usize::from(!local.iter().any(|x| x.id == item.id));
          assert_eq!(merged.iter().filter(|m| *m == item).count(), expected);
        }
        let unique: HashSet<_> = merged.iter().map(|m| m.id).collect();
        assert_eq!(unique.len(), merged.len());
      }
    }
  }

  #[test]
  fn repeated_remote_id_keeps_first_occurrence() {
    let remote = vec![
      Item { id: id(2), name: "b" },
      Item { id: id(2), name: "b'" },
    ];
    assert_eq!(reconcile(Vec::new(), remote.clone()), vec![Item { id: id(2), name: "b" }]);

    let local = vec![Item { id: id(1), name: "a" }];
    assert_eq!(reconcile(local, remote), vec![
      Item { id: id(1), name: "a" },
      Item { id: id(2), name: "b" },
    ]);
  }

  #[test]
  fn empty_cache_takes_remote_verbatim() {
    let remote = vec![Item { id: id(9), name: "x" }, Item { id: id(8), name: "y" }];
    assert_eq!(reconcile(Vec::new(), remote.clone()), remote);
  }
}
