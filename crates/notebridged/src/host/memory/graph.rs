//! Note graph held by the in-memory host.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub(crate) const ROOT_NOTE_ID: &str = "root";
const DEFAULT_ATTRIBUTE_POSITION: i64 = 1000;
const NOTE_POSITION_STEP: i64 = 10;

/// A note as stored by the in-memory host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    pub note_id: String,
    pub title: String,
    #[serde(rename = "type", default = "default_note_type")]
    pub note_type: String,
    #[serde(default = "default_mime")]
    pub mime: String,
    #[serde(default, skip_serializing)]
    pub content: String,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub delete_id: Option<String>,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub date_modified: String,
    #[serde(default)]
    pub utc_date_created: String,
    #[serde(default)]
    pub utc_date_modified: String,
}

/// Placement of a note under a parent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchRecord {
    pub branch_id: String,
    pub note_id: String,
    pub parent_note_id: String,
    #[serde(default)]
    pub note_position: i64,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub delete_id: Option<String>,
    #[serde(default)]
    pub utc_date_created: String,
    #[serde(default)]
    pub utc_date_modified: String,
}

/// A label or relation owned by a note.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeRecord {
    pub attribute_id: String,
    pub note_id: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(default = "default_attribute_position")]
    pub position: i64,
    #[serde(default)]
    pub is_inheritable: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub delete_id: Option<String>,
    #[serde(default)]
    pub utc_date_modified: String,
}

/// Earlier title and content of a note, kept each time the content changes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRevisionRecord {
    pub note_revision_id: String,
    pub note_id: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub mime: String,
    pub title: String,
    #[serde(default, skip_serializing)]
    pub content: String,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub date_last_edited: String,
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub utc_date_last_edited: String,
    #[serde(default)]
    pub utc_date_created: String,
    #[serde(default)]
    pub utc_date_modified: String,
}

/// Serialized form of the whole graph, used to seed the host.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSnapshot {
    #[serde(default)]
    pub instance_name: Option<String>,
    #[serde(default)]
    pub notes: Vec<NoteRecord>,
    #[serde(default)]
    pub branches: Vec<BranchRecord>,
    #[serde(default)]
    pub attributes: Vec<AttributeRecord>,
    #[serde(default)]
    pub note_revisions: Vec<NoteRevisionRecord>,
}

impl HostSnapshot {
    /// A graph holding only the root note.
    #[must_use]
    pub fn with_root() -> Self {
        let stamp = now_stamp();
        Self {
            instance_name: None,
            notes: vec![NoteRecord {
                note_id: ROOT_NOTE_ID.to_owned(),
                title: ROOT_NOTE_ID.to_owned(),
                note_type: default_note_type(),
                mime: default_mime(),
                content: String::new(),
                is_protected: false,
                is_deleted: false,
                delete_id: None,
                date_created: stamp.clone(),
                date_modified: stamp.clone(),
                utc_date_created: stamp.clone(),
                utc_date_modified: stamp,
            }],
            branches: Vec::new(),
            attributes: Vec::new(),
            note_revisions: Vec::new(),
        }
    }
}

/// Fields accepted when creating a note.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewNote {
    pub parent_note_id: String,
    pub title: String,
    #[serde(default)]
    pub content: Value,
    #[serde(rename = "type", default = "default_note_type")]
    pub note_type: String,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub note_position: Option<i64>,
}

impl NewNote {
    /// An empty text note under `parent_note_id`.
    pub(crate) fn text(parent_note_id: &str, title: impl Into<String>) -> Self {
        Self {
            parent_note_id: parent_note_id.to_owned(),
            title: title.into(),
            content: Value::String(String::new()),
            note_type: default_note_type(),
            mime: None,
            is_protected: false,
            is_expanded: false,
            prefix: None,
            note_position: None,
        }
    }
}

/// Filter over a note's attributes.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AttributeFilter<'a> {
    pub attribute_type: Option<&'a str>,
    pub name: Option<&'a str>,
    pub value: Option<&'a str>,
}

impl AttributeFilter<'_> {
    fn matches(&self, attribute: &AttributeRecord) -> bool {
        !attribute.is_deleted
            && self
                .attribute_type
                .is_none_or(|kind| attribute.attribute_type == kind)
            && self.name.is_none_or(|name| attribute.name == name)
            && self.value.is_none_or(|value| attribute.value == value)
    }
}

/// Notes, branches and attributes indexed by identifier.
#[derive(Debug, Default)]
pub(crate) struct NoteGraph {
    instance_name: Option<String>,
    notes: BTreeMap<String, NoteRecord>,
    branches: BTreeMap<String, BranchRecord>,
    attributes: BTreeMap<String, AttributeRecord>,
    /// Oldest first.
    revisions: Vec<NoteRevisionRecord>,
    next_id: u64,
}

impl NoteGraph {
    pub(crate) fn from_snapshot(snapshot: HostSnapshot) -> Self {
        let HostSnapshot {
            instance_name,
            notes,
            branches,
            attributes,
            note_revisions,
        } = snapshot;
        Self {
            instance_name,
            notes: notes
                .into_iter()
                .map(|note| (note.note_id.clone(), note))
                .collect(),
            branches: branches
                .into_iter()
                .map(|branch| (branch.branch_id.clone(), branch))
                .collect(),
            attributes: attributes
                .into_iter()
                .map(|attribute| (attribute.attribute_id.clone(), attribute))
                .collect(),
            revisions: note_revisions,
            next_id: 0,
        }
    }

    pub(crate) fn instance_name(&self) -> Option<&str> {
        self.instance_name.as_deref()
    }

    pub(crate) fn note(&self, note_id: &str) -> Option<&NoteRecord> {
        self.notes.get(note_id).filter(|note| !note.is_deleted)
    }

    pub(crate) fn note_mut(&mut self, note_id: &str) -> Option<&mut NoteRecord> {
        self.notes.get_mut(note_id).filter(|note| !note.is_deleted)
    }

    pub(crate) fn branch(&self, branch_id: &str) -> Option<&BranchRecord> {
        self.branches
            .get(branch_id)
            .filter(|branch| !branch.is_deleted)
    }

    pub(crate) fn attribute(&self, attribute_id: &str) -> Option<&AttributeRecord> {
        self.attributes
            .get(attribute_id)
            .filter(|attribute| !attribute.is_deleted)
    }

    pub(crate) fn attributes_of<'a>(
        &'a self,
        note_id: &'a str,
        filter: AttributeFilter<'a>,
    ) -> impl Iterator<Item = &'a AttributeRecord> + 'a {
        self.attributes
            .values()
            .filter(move |attribute| attribute.note_id == note_id && filter.matches(attribute))
    }

    /// Live relations on any note that point at `note_id`.
    pub(crate) fn target_relations<'a>(
        &'a self,
        note_id: &'a str,
    ) -> impl Iterator<Item = &'a AttributeRecord> + 'a {
        self.attributes.values().filter(move |attribute| {
            !attribute.is_deleted
                && attribute.attribute_type == "relation"
                && attribute.value == note_id
                && self.note(&attribute.note_id).is_some()
        })
    }

    /// Revisions of `note_id`, oldest first.
    pub(crate) fn revisions_of(&self, note_id: &str) -> Vec<&NoteRevisionRecord> {
        self.revisions
            .iter()
            .filter(|revision| revision.note_id == note_id)
            .collect()
    }

    /// Every root-to-note path of identifiers leading to `note_id`.
    ///
    /// Cloned notes have one path per placement. Paths that loop back on
    /// themselves are dropped.
    pub(crate) fn note_paths(&self, note_id: &str) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        let mut trail = vec![note_id.to_owned()];
        self.collect_paths(&mut trail, &mut paths);
        paths.sort();
        paths
    }

    fn collect_paths(&self, trail: &mut Vec<String>, paths: &mut Vec<Vec<String>>) {
        let Some(current) = trail.last().cloned() else {
            return;
        };
        if current == ROOT_NOTE_ID {
            paths.push(trail.iter().rev().cloned().collect());
            return;
        }
        for parent in self.parent_note_ids(&current) {
            if trail.contains(&parent) {
                continue;
            }
            trail.push(parent);
            self.collect_paths(trail, paths);
            trail.pop();
        }
    }

    pub(crate) fn live_branches(&self) -> impl Iterator<Item = &BranchRecord> {
        self.branches.values().filter(|branch| !branch.is_deleted)
    }

    pub(crate) fn child_branches(&self, parent_note_id: &str) -> Vec<&BranchRecord> {
        let mut branches: Vec<&BranchRecord> = self
            .live_branches()
            .filter(|branch| branch.parent_note_id == parent_note_id)
            .collect();
        branches.sort_by_key(|branch| branch.note_position);
        branches
    }

    pub(crate) fn parent_branches(&self, note_id: &str) -> Vec<&BranchRecord> {
        self.live_branches()
            .filter(|branch| branch.note_id == note_id)
            .collect()
    }

    pub(crate) fn child_note_ids(&self, parent_note_id: &str) -> Vec<String> {
        self.child_branches(parent_note_id)
            .into_iter()
            .filter(|branch| self.note(&branch.note_id).is_some())
            .map(|branch| branch.note_id.clone())
            .collect()
    }

    pub(crate) fn parent_note_ids(&self, note_id: &str) -> Vec<String> {
        self.parent_branches(note_id)
            .into_iter()
            .filter(|branch| self.note(&branch.parent_note_id).is_some())
            .map(|branch| branch.parent_note_id.clone())
            .collect()
    }

    /// The note itself followed by every note below it, breadth first.
    pub(crate) fn descendant_note_ids(&self, note_id: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut ordered = Vec::new();
        let mut queue = VecDeque::from([note_id.to_owned()]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current.clone()) {
                continue;
            }
            queue.extend(self.child_note_ids(&current));
            ordered.push(current);
        }
        ordered
    }

    pub(crate) fn is_descendant_of(&self, note_id: &str, ancestor_id: &str) -> bool {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from(self.parent_note_ids(note_id));
        while let Some(current) = queue.pop_front() {
            if current == ancestor_id {
                return true;
            }
            if seen.insert(current.clone()) {
                queue.extend(self.parent_note_ids(&current));
            }
        }
        false
    }

    /// Notes whose title contains `query`, ignoring case.
    pub(crate) fn search_titles(&self, query: &str) -> Vec<&NoteRecord> {
        let needle = query.to_lowercase();
        self.notes
            .values()
            .filter(|note| !note.is_deleted && note.title.to_lowercase().contains(&needle))
            .collect()
    }

    pub(crate) fn notes_with_label(&self, name: &str, value: Option<&str>) -> Vec<&NoteRecord> {
        let filter = AttributeFilter {
            attribute_type: Some("label"),
            name: Some(name),
            value,
        };
        let owners: BTreeSet<&str> = self
            .attributes
            .values()
            .filter(|attribute| filter.matches(attribute))
            .map(|attribute| attribute.note_id.as_str())
            .collect();
        owners
            .into_iter()
            .filter_map(|note_id| self.note(note_id))
            .collect()
    }

    /// JSON view of a note, including its neighbours as `parents` and
    /// `children`.
    pub(crate) fn note_json(&self, note: &NoteRecord) -> Value {
        let mut object = record_object(note);
        let summaries = |ids: Vec<String>| -> Value {
            ids.iter()
                .filter_map(|id| self.note(id))
                .map(record_object)
                .map(Value::Object)
                .collect()
        };
        object.insert("parents".to_owned(), summaries(self.parent_note_ids(&note.note_id)));
        object.insert("children".to_owned(), summaries(self.child_note_ids(&note.note_id)));
        Value::Object(object)
    }

    pub(crate) fn note_json_by_id(&self, note_id: &str) -> Value {
        self.note(note_id)
            .map_or(Value::Null, |note| self.note_json(note))
    }

    pub(crate) fn create_note(&mut self, request: NewNote) -> Result<(Value, Value), String> {
        let (note_id, branch_id) = self.insert_note(request)?;
        let note = self.note_json_by_id(&note_id);
        let branch = self
            .branch(&branch_id)
            .map_or(Value::Null, |branch| Value::Object(record_object(branch)));
        Ok((note, branch))
    }

    /// Stores a new note and its branch, returning both identifiers.
    pub(crate) fn insert_note(&mut self, request: NewNote) -> Result<(String, String), String> {
        if self.note(&request.parent_note_id).is_none() {
            return Err(format!(
                "parent note '{}' does not exist",
                request.parent_note_id
            ));
        }
        let stamp = now_stamp();
        let note_id = self.allocate_id("note");
        let mime = request
            .mime
            .clone()
            .unwrap_or_else(|| mime_for_type(&request.note_type).to_owned());
        let content = match request.content {
            Value::String(text) => text,
            Value::Null => String::new(),
            other => other.to_string(),
        };
        let note = NoteRecord {
            note_id: note_id.clone(),
            title: request.title,
            note_type: request.note_type,
            mime,
            content,
            is_protected: request.is_protected,
            is_deleted: false,
            delete_id: None,
            date_created: stamp.clone(),
            date_modified: stamp.clone(),
            utc_date_created: stamp.clone(),
            utc_date_modified: stamp,
        };
        self.notes.insert(note_id.clone(), note);
        let branch_id = self.place_note(
            &note_id,
            &request.parent_note_id,
            request.prefix,
            request.note_position,
            request.is_expanded,
        );
        Ok((note_id, branch_id))
    }

    /// Returns the live branch linking `note_id` under `parent_note_id`,
    /// creating it when absent.
    pub(crate) fn ensure_present(
        &mut self,
        note_id: &str,
        parent_note_id: &str,
        prefix: Option<String>,
    ) -> Result<String, String> {
        self.require_note(note_id)?;
        self.require_note(parent_note_id)?;
        if let Some(existing) = self
            .live_branches()
            .find(|branch| branch.note_id == note_id && branch.parent_note_id == parent_note_id)
        {
            return Ok(existing.branch_id.clone());
        }
        Ok(self.place_note(note_id, parent_note_id, prefix, None, false))
    }

    /// Deletes the branch linking `note_id` under `parent_note_id`. Returns
    /// whether a branch was removed.
    pub(crate) fn ensure_absent(&mut self, note_id: &str, parent_note_id: &str) -> bool {
        let stamp = now_stamp();
        let delete_id = self.allocate_id("delete");
        let mut removed = false;
        for branch in self.branches.values_mut() {
            if !branch.is_deleted
                && branch.note_id == note_id
                && branch.parent_note_id == parent_note_id
            {
                branch.is_deleted = true;
                branch.delete_id = Some(delete_id.clone());
                branch.utc_date_modified.clone_from(&stamp);
                removed = true;
            }
        }
        if removed && self.parent_branches(note_id).is_empty() {
            self.delete_subtree(note_id, &delete_id);
        }
        removed
    }

    pub(crate) fn sort_children_alphabetically(&mut self, parent_note_id: &str) -> Result<(), String> {
        self.require_note(parent_note_id)?;
        let mut ordered: Vec<(String, String)> = self
            .child_branches(parent_note_id)
            .into_iter()
            .map(|branch| {
                let title = self
                    .note(&branch.note_id)
                    .map(|note| note.title.to_lowercase())
                    .unwrap_or_default();
                (title, branch.branch_id.clone())
            })
            .collect();
        ordered.sort();
        let mut position = NOTE_POSITION_STEP;
        for (_, branch_id) in ordered {
            if let Some(branch) = self.branches.get_mut(&branch_id) {
                branch.note_position = position;
            }
            position += NOTE_POSITION_STEP;
        }
        Ok(())
    }

    pub(crate) fn add_attribute(
        &mut self,
        note_id: &str,
        attribute_type: &str,
        name: &str,
        value: &str,
        is_inheritable: bool,
        position: Option<i64>,
    ) -> Result<Value, String> {
        self.require_note(note_id)?;
        let attribute_id = self.allocate_id("attr");
        let attribute = AttributeRecord {
            attribute_id: attribute_id.clone(),
            note_id: note_id.to_owned(),
            attribute_type: attribute_type.to_owned(),
            name: name.to_owned(),
            value: value.to_owned(),
            position: position.unwrap_or(DEFAULT_ATTRIBUTE_POSITION),
            is_inheritable,
            is_deleted: false,
            delete_id: None,
            utc_date_modified: now_stamp(),
        };
        let json = Value::Object(record_object(&attribute));
        self.attributes.insert(attribute_id, attribute);
        Ok(json)
    }

    /// Updates the first matching attribute's value, creating one when none
    /// matches.
    pub(crate) fn set_attribute(
        &mut self,
        note_id: &str,
        attribute_type: &str,
        name: &str,
        value: &str,
    ) -> Result<(), String> {
        self.require_note(note_id)?;
        let filter = AttributeFilter {
            attribute_type: Some(attribute_type),
            name: Some(name),
            value: None,
        };
        let existing = self
            .attributes
            .values_mut()
            .find(|attribute| attribute.note_id == note_id && filter.matches(attribute));
        match existing {
            Some(attribute) => {
                attribute.value = value.to_owned();
                attribute.utc_date_modified = now_stamp();
            }
            None => {
                self.add_attribute(note_id, attribute_type, name, value, false, None)?;
            }
        }
        Ok(())
    }

    pub(crate) fn remove_attributes(&mut self, note_id: &str, filter: AttributeFilter<'_>) {
        let stamp = now_stamp();
        let delete_id = self.allocate_id("delete");
        for attribute in self.attributes.values_mut() {
            if attribute.note_id == note_id && filter.matches(attribute) {
                attribute.is_deleted = true;
                attribute.delete_id = Some(delete_id.clone());
                attribute.utc_date_modified.clone_from(&stamp);
            }
        }
    }

    /// Replaces a note's content, keeping the previous title and content as
    /// a revision when the content changes.
    pub(crate) fn replace_content(&mut self, note_id: &str, content: String) -> Result<(), String> {
        let previous = self
            .note(note_id)
            .cloned()
            .ok_or_else(|| format!("note '{note_id}' does not exist"))?;
        if previous.content == content {
            return Ok(());
        }
        let stamp = now_stamp();
        let note_revision_id = self.allocate_id("revision");
        self.revisions.push(NoteRevisionRecord {
            note_revision_id,
            note_id: previous.note_id,
            note_type: previous.note_type,
            mime: previous.mime,
            title: previous.title,
            content: previous.content,
            is_protected: previous.is_protected,
            date_last_edited: previous.date_modified,
            date_created: stamp.clone(),
            utc_date_last_edited: previous.utc_date_modified,
            utc_date_created: stamp.clone(),
            utc_date_modified: stamp,
        });
        if let Some(note) = self.note_mut(note_id) {
            note.content = content;
        }
        self.touch_note(note_id);
        Ok(())
    }

    pub(crate) fn touch_note(&mut self, note_id: &str) {
        let stamp = now_stamp();
        if let Some(note) = self.note_mut(note_id) {
            note.date_modified.clone_from(&stamp);
            note.utc_date_modified = stamp;
        }
    }

    fn require_note(&self, note_id: &str) -> Result<(), String> {
        self.note(note_id)
            .map(|_| ())
            .ok_or_else(|| format!("note '{note_id}' does not exist"))
    }

    fn place_note(
        &mut self,
        note_id: &str,
        parent_note_id: &str,
        prefix: Option<String>,
        note_position: Option<i64>,
        is_expanded: bool,
    ) -> String {
        let position = note_position.unwrap_or_else(|| {
            self.child_branches(parent_note_id)
                .last()
                .map_or(NOTE_POSITION_STEP, |branch| {
                    branch.note_position + NOTE_POSITION_STEP
                })
        });
        let branch_id = self.allocate_id("branch");
        let stamp = now_stamp();
        self.branches.insert(
            branch_id.clone(),
            BranchRecord {
                branch_id: branch_id.clone(),
                note_id: note_id.to_owned(),
                parent_note_id: parent_note_id.to_owned(),
                note_position: position,
                prefix: prefix.filter(|prefix| !prefix.is_empty()),
                is_expanded,
                is_deleted: false,
                delete_id: None,
                utc_date_created: stamp.clone(),
                utc_date_modified: stamp,
            },
        );
        branch_id
    }

    fn delete_subtree(&mut self, note_id: &str, delete_id: &str) {
        for descendant in self.descendant_note_ids(note_id) {
            if let Some(note) = self.notes.get_mut(&descendant) {
                note.is_deleted = true;
                note.delete_id = Some(delete_id.to_owned());
            }
            for branch in self.branches.values_mut() {
                if !branch.is_deleted
                    && (branch.note_id == descendant || branch.parent_note_id == descendant)
                {
                    branch.is_deleted = true;
                    branch.delete_id = Some(delete_id.to_owned());
                }
            }
        }
    }

    fn allocate_id(&mut self, prefix: &str) -> String {
        loop {
            self.next_id += 1;
            let candidate = format!("{prefix}{:06}", self.next_id);
            let taken = self.notes.contains_key(&candidate)
                || self.branches.contains_key(&candidate)
                || self.attributes.contains_key(&candidate)
                || self
                    .revisions
                    .iter()
                    .any(|revision| revision.note_revision_id == candidate);
            if !taken {
                return candidate;
            }
        }
    }
}

/// Serializes a record into its JSON object form.
pub(crate) fn record_object<T: Serialize>(record: &T) -> Map<String, Value> {
    match serde_json::to_value(record) {
        Ok(Value::Object(object)) => object,
        _ => Map::new(),
    }
}

/// Reads one property from a record's JSON form.
pub(crate) fn record_property<T: Serialize>(record: &T, property: &str) -> Value {
    record_object(record)
        .remove(property)
        .unwrap_or(Value::Null)
}

pub(crate) fn app_info(instance_name: Option<&str>) -> Value {
    json!({
        "appVersion": env!("CARGO_PKG_VERSION"),
        "host": "memory",
        "instanceName": instance_name,
    })
}

pub(crate) fn now_stamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}

fn mime_for_type(note_type: &str) -> &'static str {
    match note_type {
        "code" => "application/json",
        "file" | "image" => "application/octet-stream",
        _ => "text/html",
    }
}

fn default_note_type() -> String {
    "text".to_owned()
}

fn default_mime() -> String {
    "text/html".to_owned()
}

fn default_attribute_position() -> i64 {
    DEFAULT_ATTRIBUTE_POSITION
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;

    fn new_note(parent: &str, title: &str) -> NewNote {
        NewNote::text(parent, title)
    }

    fn created_id(graph: &mut NoteGraph, parent: &str, title: &str) -> String {
        let (note, _) = graph.create_note(new_note(parent, title)).expect("create note");
        note["noteId"].as_str().expect("note id").to_owned()
    }

    #[fixture]
    fn graph() -> NoteGraph {
        NoteGraph::from_snapshot(HostSnapshot::with_root())
    }

    #[rstest]
    fn created_notes_hang_under_their_parent(mut graph: NoteGraph) {
        let child = created_id(&mut graph, ROOT_NOTE_ID, "Groceries");
        assert_eq!(graph.child_note_ids(ROOT_NOTE_ID), vec![child.clone()]);
        assert_eq!(graph.parent_note_ids(&child), vec![ROOT_NOTE_ID.to_owned()]);
    }

    #[rstest]
    fn create_rejects_missing_parent(mut graph: NoteGraph) {
        let error = graph
            .create_note(new_note("nope", "Orphan"))
            .expect_err("missing parent");
        assert!(error.contains("nope"));
    }

    #[rstest]
    fn note_json_lists_neighbours(mut graph: NoteGraph) {
        let child = created_id(&mut graph, ROOT_NOTE_ID, "Groceries");
        let json = graph.note_json_by_id(&child);
        assert_eq!(json["title"], "Groceries");
        assert_eq!(json["parents"][0]["noteId"], ROOT_NOTE_ID);
        assert!(json["children"].as_array().is_some_and(Vec::is_empty));
        assert!(json.get("content").is_none());
    }

    #[rstest]
    fn descendants_include_the_note_itself(mut graph: NoteGraph) {
        let child = created_id(&mut graph, ROOT_NOTE_ID, "A");
        let grandchild = created_id(&mut graph, &child, "B");
        assert_eq!(
            graph.descendant_note_ids(ROOT_NOTE_ID),
            vec![ROOT_NOTE_ID.to_owned(), child, grandchild.clone()]
        );
        assert!(graph.is_descendant_of(&grandchild, ROOT_NOTE_ID));
        assert!(!graph.is_descendant_of(ROOT_NOTE_ID, &grandchild));
    }

    #[rstest]
    fn removing_last_branch_deletes_subtree(mut graph: NoteGraph) {
        let child = created_id(&mut graph, ROOT_NOTE_ID, "A");
        let grandchild = created_id(&mut graph, &child, "B");
        assert!(graph.ensure_absent(&child, ROOT_NOTE_ID));
        assert!(graph.note(&child).is_none());
        assert!(graph.note(&grandchild).is_none());
        assert!(!graph.ensure_absent(&child, ROOT_NOTE_ID));
    }

    #[rstest]
    fn ensure_present_is_idempotent(mut graph: NoteGraph) {
        let first = created_id(&mut graph, ROOT_NOTE_ID, "A");
        let second = created_id(&mut graph, ROOT_NOTE_ID, "B");
        let branch = graph
            .ensure_present(&second, &first, None)
            .expect("clone into first");
        let again = graph
            .ensure_present(&second, &first, None)
            .expect("already present");
        assert_eq!(branch, again);
        assert_eq!(graph.parent_note_ids(&second).len(), 2);
    }

    #[rstest]
    fn sorts_children_by_title(mut graph: NoteGraph) {
        let zebra = created_id(&mut graph, ROOT_NOTE_ID, "zebra");
        let apple = created_id(&mut graph, ROOT_NOTE_ID, "Apple");
        graph
            .sort_children_alphabetically(ROOT_NOTE_ID)
            .expect("sort");
        assert_eq!(graph.child_note_ids(ROOT_NOTE_ID), vec![apple, zebra]);
    }

    #[rstest]
    fn set_attribute_updates_in_place(mut graph: NoteGraph) {
        graph
            .set_attribute(ROOT_NOTE_ID, "label", "status", "draft")
            .expect("create label");
        graph
            .set_attribute(ROOT_NOTE_ID, "label", "status", "final")
            .expect("update label");
        let labels: Vec<_> = graph
            .attributes_of(
                ROOT_NOTE_ID,
                AttributeFilter {
                    attribute_type: Some("label"),
                    name: Some("status"),
                    value: None,
                },
            )
            .collect();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels[0].value, "final");
    }

    #[rstest]
    fn finds_notes_by_label_and_title(mut graph: NoteGraph) {
        let child = created_id(&mut graph, ROOT_NOTE_ID, "Weekly Groceries");
        graph
            .add_attribute(&child, "label", "todo", "yes", false, None)
            .expect("label");
        let labelled: Vec<_> = graph
            .notes_with_label("todo", Some("yes"))
            .into_iter()
            .map(|note| note.note_id.clone())
            .collect();
        assert_eq!(labelled, vec![child.clone()]);
        assert!(graph.notes_with_label("todo", Some("no")).is_empty());
        assert_eq!(graph.search_titles("groceries").len(), 1);
    }

    #[rstest]
    fn cloned_notes_have_one_path_per_placement(mut graph: NoteGraph) {
        let work = created_id(&mut graph, ROOT_NOTE_ID, "Work");
        let home = created_id(&mut graph, ROOT_NOTE_ID, "Home");
        let shared = created_id(&mut graph, &work, "Shared");
        graph
            .ensure_present(&shared, &home, None)
            .expect("clone under home");
        let mut expected = vec![
            vec![ROOT_NOTE_ID.to_owned(), work, shared.clone()],
            vec![ROOT_NOTE_ID.to_owned(), home, shared.clone()],
        ];
        expected.sort();
        assert_eq!(graph.note_paths(&shared), expected);
        assert_eq!(graph.note_paths(ROOT_NOTE_ID), vec![vec![ROOT_NOTE_ID.to_owned()]]);
    }

    #[rstest]
    fn relations_are_found_from_their_target(mut graph: NoteGraph) {
        let source = created_id(&mut graph, ROOT_NOTE_ID, "Source");
        let target = created_id(&mut graph, ROOT_NOTE_ID, "Target");
        graph
            .add_attribute(&source, "relation", "seeAlso", &target, false, None)
            .expect("relation");
        graph
            .add_attribute(&source, "label", "seeAlso", &target, false, None)
            .expect("label with the same value");
        let owners: Vec<_> = graph
            .target_relations(&target)
            .map(|relation| relation.note_id.clone())
            .collect();
        assert_eq!(owners, vec![source]);
    }

    #[rstest]
    fn content_changes_keep_revisions(mut graph: NoteGraph) {
        let note = created_id(&mut graph, ROOT_NOTE_ID, "Draft");
        graph
            .replace_content(&note, "first".to_owned())
            .expect("first edit");
        graph
            .replace_content(&note, "first".to_owned())
            .expect("unchanged edit");
        graph
            .replace_content(&note, "second".to_owned())
            .expect("second edit");
        let contents: Vec<_> = graph
            .revisions_of(&note)
            .into_iter()
            .map(|revision| revision.content.clone())
            .collect();
        assert_eq!(contents, vec![String::new(), "first".to_owned()]);
        assert_eq!(graph.note(&note).map(|record| record.content.as_str()), Some("second"));
    }

    #[rstest]
    fn deletions_share_a_delete_id(mut graph: NoteGraph) {
        let child = created_id(&mut graph, ROOT_NOTE_ID, "A");
        let grandchild = created_id(&mut graph, &child, "B");
        assert!(graph.ensure_absent(&child, ROOT_NOTE_ID));
        let child_delete = graph.notes.get(&child).and_then(|note| note.delete_id.clone());
        let grandchild_delete = graph
            .notes
            .get(&grandchild)
            .and_then(|note| note.delete_id.clone());
        assert!(child_delete.is_some());
        assert_eq!(child_delete, grandchild_delete);
    }
}
