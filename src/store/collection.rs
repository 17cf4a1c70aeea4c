//! Ordered entity collection with single selection.

use crate::agent::Agent;
use crate::config::DuplicateIdPolicy;
use crate::error::{Result, TaskpilotError};
use crate::execution::ExecutionLog;
use crate::task::{Task, TaskPatch};
use crate::workflow::{Workflow, WorkflowPatch};
use chrono::{DateTime, Utc};

/// Anything the store keeps in a collection.
pub trait Entity: Clone {
    /// Human-readable kind used in errors and logs.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

/// Entities that support partial updates.
pub trait Patchable: Entity {
    type Patch;

    fn apply_patch(&mut self, patch: Self::Patch);

    fn touch(&mut self, at: DateTime<Utc>);
}

impl Entity for Task {
    const KIND: &'static str = "Task";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Patchable for Task {
    type Patch = TaskPatch;

    fn apply_patch(&mut self, patch: TaskPatch) {
        self.apply(patch);
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Entity for Workflow {
    const KIND: &'static str = "Workflow";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Patchable for Workflow {
    type Patch = WorkflowPatch;

    fn apply_patch(&mut self, patch: WorkflowPatch) {
        self.apply(patch);
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Entity for Agent {
    const KIND: &'static str = "Agent";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Entity for ExecutionLog {
    const KIND: &'static str = "Execution log";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Where `insert` places a new item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

/// Items in insertion order plus the id of the selected item, if any.
///
/// The selection is resolved against the live items, so it always reflects
/// the latest version of the entity and vanishes once the entity is gone.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    items: Vec<T>,
    selected: Option<String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
        }
    }
}

impl<T: Entity> Collection<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    /// Replace every item. The selection survives only if its id is still present.
    pub fn set_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.drop_stale_selection();
    }

    pub fn insert(&mut self, item: T, policy: DuplicateIdPolicy, placement: Placement) -> Result<()> {
        if let Some(index) = self.position(item.id()) {
            return match policy {
                DuplicateIdPolicy::Reject => Err(TaskpilotError::DuplicateId {
                    kind: T::KIND,
                    id: item.id().to_string(),
                }),
                DuplicateIdPolicy::Overwrite => {
                    self.items[index] = item;
                    Ok(())
                }
            };
        }

        match placement {
            Placement::Append => self.items.push(item),
            Placement::Prepend => self.items.insert(0, item),
        }
        Ok(())
    }

    /// Remove by id, clearing the selection if it pointed at the removed item.
    pub fn remove(&mut self, id: &str) -> Result<T> {
        let index = self
            .position(id)
            .ok_or_else(|| TaskpilotError::not_found(T::KIND, id))?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Ok(self.items.remove(index))
    }

    /// Remove every item matching `pred`, keeping the rest in order.
    pub fn remove_where(&mut self, mut pred: impl FnMut(&T) -> bool) -> Vec<T> {
        let (removed, kept): (Vec<T>, Vec<T>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| pred(item));
        self.items = kept;
        self.drop_stale_selection();
        removed
    }

    /// Select an item of this collection. Items not in the collection clear the selection.
    pub fn select(&mut self, item: Option<&T>) {
        self.selected = item
            .map(|i| i.id())
            .filter(|id| self.contains(id))
            .map(str::to_string);
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    fn drop_stale_selection(&mut self) {
        if let Some(id) = self.selected.take() {
            if self.contains(&id) {
                self.selected = Some(id);
            }
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

impl<T: Patchable> Collection<T> {
    /// Merge `patch` into the item and stamp `at` as its update time.
    pub fn update(&mut self, id: &str, patch: T::Patch, at: DateTime<Utc>) -> Result<&T> {
        let item = self
            .get_mut(id)
            .ok_or_else(|| TaskpilotError::not_found(T::KIND, id))?;
        item.apply_patch(patch);
        item.touch(at);
        Ok(item)
    }
}
