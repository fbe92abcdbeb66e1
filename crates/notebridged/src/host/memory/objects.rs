//! Host objects exposed by the in-memory host.
//!
//! Handles hold the shared graph plus an identifier and look their record up
//! on every access, so a handle whose record was deleted fails cleanly.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Value, json};
use tracing::info;

use crate::host::{HostError, HostObject};

use super::args::Args;
use super::calendar::{self, WeekStart};
use super::graph::{
    AttributeFilter, NewNote, NoteGraph, NoteRecord, app_info, record_object, record_property,
};

const HOST_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::host");

pub(crate) type SharedGraph = Arc<RwLock<NoteGraph>>;

fn read(graph: &SharedGraph) -> Result<RwLockReadGuard<'_, NoteGraph>, HostError> {
    graph
        .read()
        .map_err(|_| HostError::new("note graph lock poisoned"))
}

fn write(graph: &SharedGraph) -> Result<RwLockWriteGuard<'_, NoteGraph>, HostError> {
    graph
        .write()
        .map_err(|_| HostError::new("note graph lock poisoned"))
}

fn not_a_method(owner: &str, method: &str) -> HostError {
    HostError::new(format!("{method} is not a method of {owner}"))
}

fn not_a_property(owner: &str, property: &str) -> HostError {
    HostError::new(format!("{property} is not a property of {owner}"))
}

fn notes_json(graph: &NoteGraph, notes: Vec<&NoteRecord>) -> Value {
    notes.into_iter().map(|note| graph.note_json(note)).collect()
}

fn first_note_json(graph: &NoteGraph, notes: Vec<&NoteRecord>) -> Value {
    notes
        .into_iter()
        .next()
        .map_or(Value::Null, |note| graph.note_json(note))
}

fn created_json((note, branch): (Value, Value)) -> Value {
    json!({ "note": note, "branch": branch })
}

fn is_javascript(note: &NoteRecord) -> bool {
    matches!(note.note_type.as_str(), "code" | "file")
        && (note.mime.starts_with("application/javascript")
            || note.mime == "application/x-javascript"
            || note.mime == "text/javascript")
}

fn is_html(note: &NoteRecord) -> bool {
    matches!(note.note_type.as_str(), "code" | "file" | "render") && note.mime == "text/html"
}

fn script_env(note: &NoteRecord) -> Value {
    let env = if is_html(note)
        || note.note_type == "render"
        || (is_javascript(note) && note.mime.ends_with("env=frontend"))
    {
        Some("frontend")
    } else if is_javascript(note) && note.mime.ends_with("env=backend") {
        Some("backend")
    } else {
        None
    };
    env.map_or(Value::Null, |env| Value::String(env.to_owned()))
}

/// The root scripting API.
pub(crate) struct ApiObject {
    graph: SharedGraph,
    context_note: String,
}

impl ApiObject {
    pub(crate) fn new(graph: SharedGraph, context_note: String) -> Self {
        Self {
            graph,
            context_note,
        }
    }

    fn create(&self, request: NewNote) -> Result<Value, HostError> {
        write(&self.graph)?
            .create_note(request)
            .map(created_json)
            .map_err(HostError::new)
    }

    fn create_simple(&self, args: Args<'_>, note_type: &str) -> Result<Value, HostError> {
        let content = args.value(2).cloned().unwrap_or(Value::Null);
        self.create(NewNote {
            parent_note_id: args.string(0)?.to_owned(),
            title: args.string(1)?.to_owned(),
            mime: (note_type == "code").then(|| "application/json".to_owned()),
            content: match (note_type, content) {
                ("code", Value::String(text)) => Value::String(text),
                ("code", other) => Value::String(
                    serde_json::to_string_pretty(&other)
                        .map_err(|error| HostError::new(error.to_string()))?,
                ),
                (_, other) => other,
            },
            note_type: note_type.to_owned(),
            is_protected: false,
            is_expanded: false,
            prefix: None,
            note_position: None,
        })
    }

    fn ensure_present(&self, args: Args<'_>, prefix_index: usize) -> Result<Value, HostError> {
        let note_id = args.string(prefix_index - 2)?;
        let parent_id = args.string(prefix_index - 1)?;
        let prefix = args.opt_string(prefix_index).map(str::to_owned);
        let mut graph = write(&self.graph)?;
        let branch_id = graph
            .ensure_present(note_id, parent_id, prefix)
            .map_err(HostError::new)?;
        Ok(graph
            .branch(&branch_id)
            .map_or(Value::Null, |branch| Value::Object(record_object(branch))))
    }

    fn calendar_note(
        &self,
        locate: impl FnOnce(&mut NoteGraph) -> Result<String, String>,
    ) -> Result<Value, HostError> {
        let mut graph = write(&self.graph)?;
        let note_id = locate(&mut *graph).map_err(HostError::new)?;
        Ok(graph.note_json_by_id(&note_id))
    }
}

impl HostObject for ApiObject {
    fn read(&self, property: &str) -> Result<Value, HostError> {
        match property {
            "startNote" | "currentNote" => {
                Ok(read(&self.graph)?.note_json_by_id(&self.context_note))
            }
            "originEntity" => Ok(Value::Null),
            other => Err(not_a_property("api", other)),
        }
    }

    fn call(&self, method: &str, values: &[Value]) -> Result<Value, HostError> {
        let args = Args::new(method, values);
        match method {
            "getInstanceName" => Ok(read(&self.graph)?
                .instance_name()
                .map_or(Value::Null, |name| Value::String(name.to_owned()))),
            "getAppInfo" => Ok(app_info(read(&self.graph)?.instance_name())),
            "getNote" => Ok(read(&self.graph)?.note_json_by_id(args.string(0)?)),
            "getBranch" => Ok(read(&self.graph)?
                .branch(args.string(0)?)
                .map_or(Value::Null, |branch| Value::Object(record_object(branch)))),
            "getAttribute" => Ok(read(&self.graph)?
                .attribute(args.string(0)?)
                .map_or(Value::Null, |attribute| Value::Object(record_object(attribute)))),
            "searchForNotes" => {
                let graph = read(&self.graph)?;
                Ok(notes_json(&graph, graph.search_titles(args.string(0)?)))
            }
            "searchForNote" => {
                let graph = read(&self.graph)?;
                Ok(first_note_json(&graph, graph.search_titles(args.string(0)?)))
            }
            "getNotesWithLabel" => {
                let graph = read(&self.graph)?;
                let notes = graph.notes_with_label(args.string(0)?, args.opt_string(1));
                Ok(notes_json(&graph, notes))
            }
            "getNoteWithLabel" => {
                let graph = read(&self.graph)?;
                let notes = graph.notes_with_label(args.string(0)?, args.opt_string(1));
                Ok(first_note_json(&graph, notes))
            }
            "ensureNoteIsPresentInParent" => self.ensure_present(args, 2),
            "ensureNoteIsAbsentFromParent" => Ok(Value::Bool(
                write(&self.graph)?.ensure_absent(args.string(0)?, args.string(1)?),
            )),
            "toggleNoteInParent" => {
                if args.boolean(0)? {
                    self.ensure_present(args, 3)
                } else {
                    Ok(Value::Bool(
                        write(&self.graph)?.ensure_absent(args.string(1)?, args.string(2)?),
                    ))
                }
            }
            "createTextNote" => self.create_simple(args, "text"),
            "createDataNote" => self.create_simple(args, "code"),
            "createNewNote" => {
                let params = args.value(0).cloned().unwrap_or(Value::Null);
                let request: NewNote = serde_json::from_value(params)
                    .map_err(|error| HostError::new(format!("createNewNote: {error}")))?;
                self.create(request)
            }
            "getRootCalendarNote" => self.calendar_note(calendar::root_note),
            "getTodayNote" => {
                self.calendar_note(|graph| calendar::date_note(graph, calendar::today()))
            }
            "getDateNote" => {
                let date = calendar::parse_date(args.string(0)?).map_err(HostError::new)?;
                self.calendar_note(|graph| calendar::date_note(graph, date))
            }
            "getWeekNote" => {
                let date = calendar::parse_date(args.string(0)?).map_err(HostError::new)?;
                let start = WeekStart::from_options(args.value(1)).map_err(HostError::new)?;
                let week_start = calendar::week_start(date, start);
                self.calendar_note(|graph| calendar::date_note(graph, week_start))
            }
            "getMonthNote" => {
                let (year, month) =
                    calendar::parse_month(args.string(0)?).map_err(HostError::new)?;
                self.calendar_note(|graph| calendar::month_note(graph, year, month))
            }
            "getYearNote" => {
                let year = calendar::parse_year(args.value(0).unwrap_or(&Value::Null))
                    .map_err(HostError::new)?;
                self.calendar_note(|graph| calendar::year_note(graph, year))
            }
            "sortNotesAlphabetically" => {
                write(&self.graph)?
                    .sort_children_alphabetically(args.string(0)?)
                    .map_err(HostError::new)?;
                Ok(Value::Null)
            }
            "log" => {
                let message = args
                    .value(0)
                    .map(|value| match value {
                        Value::String(text) => text.clone(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default();
                info!(target: HOST_TARGET, text = %message, "script log");
                Ok(Value::Null)
            }
            other => Err(not_a_method("api", other)),
        }
    }
}

/// A note addressed by identifier.
pub(crate) struct NoteObject {
    graph: SharedGraph,
    note_id: String,
}

impl NoteObject {
    pub(crate) fn new(graph: SharedGraph, note_id: String) -> Self {
        Self { graph, note_id }
    }

    fn vanished(&self) -> HostError {
        HostError::new(format!("note '{}' no longer exists", self.note_id))
    }

    fn attributes(&self, filter: AttributeFilter<'_>) -> Result<Value, HostError> {
        let graph = read(&self.graph)?;
        graph.note(&self.note_id).ok_or_else(|| self.vanished())?;
        Ok(graph
            .attributes_of(&self.note_id, filter)
            .map(|attribute| Value::Object(record_object(attribute)))
            .collect())
    }

    fn first_attribute(&self, filter: AttributeFilter<'_>) -> Result<Value, HostError> {
        Ok(match self.attributes(filter)? {
            Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
            _ => Value::Null,
        })
    }

    fn attribute_value(&self, filter: AttributeFilter<'_>) -> Result<Value, HostError> {
        Ok(self
            .first_attribute(filter)?
            .get("value")
            .cloned()
            .unwrap_or(Value::Null))
    }

    fn has_attribute(&self, filter: AttributeFilter<'_>) -> Result<Value, HostError> {
        Ok(Value::Bool(
            self.attributes(filter)?
                .as_array()
                .is_some_and(|items| !items.is_empty()),
        ))
    }

    fn set_attribute(&self, kind: &str, name: &str, value: Option<&str>) -> Result<Value, HostError> {
        let mut graph = write(&self.graph)?;
        graph
            .set_attribute(&self.note_id, kind, name, value.unwrap_or_default())
            .map_err(HostError::new)?;
        Ok(Value::Null)
    }

    fn remove_attribute(&self, filter: AttributeFilter<'_>) -> Result<Value, HostError> {
        write(&self.graph)?.remove_attributes(&self.note_id, filter);
        Ok(Value::Null)
    }

    fn add_attribute(
        &self,
        kind: &str,
        name: &str,
        value: Option<&str>,
        is_inheritable: Option<bool>,
        position: Option<i64>,
    ) -> Result<Value, HostError> {
        write(&self.graph)?
            .add_attribute(
                &self.note_id,
                kind,
                name,
                value.unwrap_or_default(),
                is_inheritable.unwrap_or(false),
                position,
            )
            .map_err(HostError::new)
    }

    fn set_content(&self, content: String) -> Result<Value, HostError> {
        write(&self.graph)?
            .replace_content(&self.note_id, content)
            .map_err(HostError::new)?;
        Ok(Value::Null)
    }

    fn set_relation(&self, name: &str, target: Option<&str>) -> Result<Value, HostError> {
        self.require_target(target)?;
        self.set_attribute("relation", name, target)
    }

    fn require_target(&self, target: Option<&str>) -> Result<(), HostError> {
        match target {
            Some(target) if read(&self.graph)?.note(target).is_none() => {
                Err(HostError::new(format!("note '{target}' does not exist")))
            }
            _ => Ok(()),
        }
    }

    fn toggle(
        &self,
        kind: &str,
        enabled: bool,
        name: &str,
        value: Option<&str>,
    ) -> Result<Value, HostError> {
        match (enabled, kind) {
            (true, "relation") => self.set_relation(name, value),
            (true, _) => self.set_attribute(kind, name, value),
            (false, _) => self.remove_attribute(filter(Some(kind), Some(name), value)),
        }
    }

    fn relation_targets(&self, name: Option<&str>) -> Result<Vec<Value>, HostError> {
        self.with_note(|graph, note| {
            graph
                .attributes_of(&note.note_id, filter(Some("relation"), name, None))
                .filter_map(|relation| graph.note(&relation.value))
                .map(|target| graph.note_json(target))
                .collect()
        })
    }

    fn with_note<T>(&self, view: impl FnOnce(&NoteGraph, &NoteRecord) -> T) -> Result<T, HostError> {
        let graph = read(&self.graph)?;
        let note = graph.note(&self.note_id).ok_or_else(|| self.vanished())?;
        Ok(view(&graph, note))
    }
}

fn filter<'a>(
    attribute_type: Option<&'a str>,
    name: Option<&'a str>,
    value: Option<&'a str>,
) -> AttributeFilter<'a> {
    AttributeFilter {
        attribute_type,
        name,
        value,
    }
}

impl HostObject for NoteObject {
    fn read(&self, property: &str) -> Result<Value, HostError> {
        self.with_note(|_, note| record_property(note, property))
    }

    fn call(&self, method: &str, values: &[Value]) -> Result<Value, HostError> {
        let args = Args::new(method, values);
        match method {
            "getTitle" => self.with_note(|_, note| Value::String(note.title.clone())),
            "getContent" => self.with_note(|_, note| Value::String(note.content.clone())),
            "setContent" => {
                let content = match args.value(0) {
                    Some(Value::String(text)) => text.clone(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                self.set_content(content)
            }
            "getJsonContent" => {
                let content = self.with_note(|_, note| note.content.clone())?;
                serde_json::from_str(&content).map_err(|error| {
                    HostError::new(format!(
                        "content of note '{}' is not valid JSON: {error}",
                        self.note_id
                    ))
                })
            }
            "setJsonContent" => {
                let content = args.value(0).cloned().unwrap_or(Value::Null);
                self.set_content(
                    serde_json::to_string(&content)
                        .map_err(|error| HostError::new(error.to_string()))?,
                )
            }
            "isRoot" => self.with_note(|_, note| Value::Bool(note.note_id == "root")),
            "isJson" => self.with_note(|_, note| Value::Bool(note.mime == "application/json")),
            "isStringNote" => self.with_note(|_, note| {
                Value::Bool(
                    matches!(note.note_type.as_str(), "text" | "code" | "relation-map" | "search")
                        || note.mime.starts_with("text/"),
                )
            }),
            "getAttributes" | "getOwnedAttributes" => {
                self.attributes(filter(args.opt_string(0), args.opt_string(1), None))
            }
            "getAttribute" | "getOwnedAttribute" => {
                self.first_attribute(filter(Some(args.string(0)?), Some(args.string(1)?), None))
            }
            "getAttributeValue" | "getOwnedAttributeValue" => {
                self.attribute_value(filter(Some(args.string(0)?), Some(args.string(1)?), None))
            }
            "hasAttribute" | "hasOwnedAttribute" => {
                self.has_attribute(filter(Some(args.string(0)?), Some(args.string(1)?), None))
            }
            "setAttribute" => {
                self.set_attribute(args.string(0)?, args.string(1)?, args.opt_string(2))
            }
            "removeAttribute" => self.remove_attribute(filter(
                Some(args.string(0)?),
                Some(args.string(1)?),
                args.opt_string(2),
            )),
            "addAttribute" => self.add_attribute(
                args.string(0)?,
                args.string(1)?,
                args.opt_string(2),
                args.opt_boolean(3),
                args.opt_integer(4),
            ),
            "getLabels" | "getOwnedLabels" => {
                self.attributes(filter(Some("label"), args.opt_string(0), None))
            }
            "getLabel" | "getOwnedLabel" => {
                self.first_attribute(filter(Some("label"), Some(args.string(0)?), None))
            }
            "getLabelValue" | "getOwnedLabelValue" => {
                self.attribute_value(filter(Some("label"), Some(args.string(0)?), None))
            }
            "hasLabel" | "hasOwnedLabel" => {
                self.has_attribute(filter(Some("label"), Some(args.string(0)?), None))
            }
            "setLabel" => self.set_attribute("label", args.string(0)?, args.opt_string(1)),
            "removeLabel" => self.remove_attribute(filter(
                Some("label"),
                Some(args.string(0)?),
                args.opt_string(1),
            )),
            "addLabel" => self.add_attribute(
                "label",
                args.string(0)?,
                args.opt_string(1),
                args.opt_boolean(2),
                None,
            ),
            "toggleLabel" => {
                self.toggle("label", args.boolean(0)?, args.string(1)?, args.opt_string(2))
            }
            "toggleRelation" => {
                self.toggle("relation", args.boolean(0)?, args.string(1)?, args.opt_string(2))
            }
            "toggleAttribute" => self.toggle(
                args.string(0)?,
                args.boolean(1)?,
                args.string(2)?,
                args.opt_string(3),
            ),
            "getRelations" | "getOwnedRelations" => {
                self.attributes(filter(Some("relation"), args.opt_string(0), None))
            }
            "getRelationValue" | "getOwnedRelationValue" => {
                self.attribute_value(filter(Some("relation"), Some(args.string(0)?), None))
            }
            "hasRelation" | "hasOwnedRelation" => {
                self.has_attribute(filter(Some("relation"), Some(args.string(0)?), None))
            }
            "addRelation" => {
                let target = args.string(1)?;
                self.require_target(Some(target))?;
                self.add_attribute(
                    "relation",
                    args.string(0)?,
                    Some(target),
                    args.opt_boolean(2),
                    None,
                )
            }
            "getRelation" | "getOwnedRelation" => {
                self.first_attribute(filter(Some("relation"), Some(args.string(0)?), None))
            }
            "getRelationTarget" | "getOwnedRelationTarget" => Ok(self
                .relation_targets(Some(args.string(0)?))?
                .into_iter()
                .next()
                .unwrap_or(Value::Null)),
            "getRelationTargets" => Ok(Value::Array(self.relation_targets(args.opt_string(0))?)),
            "setRelation" => self.set_relation(args.string(0)?, args.opt_string(1)),
            "removeRelation" => self.remove_attribute(filter(
                Some("relation"),
                Some(args.string(0)?),
                args.opt_string(1),
            )),
            "getTargetRelations" => self.with_note(|graph, note| {
                graph
                    .target_relations(&note.note_id)
                    .map(|relation| Value::Object(record_object(relation)))
                    .collect()
            }),
            "getContentMetadata" => self.with_note(|_, note| {
                json!({
                    "contentLength": note.content.len(),
                    "dateModified": note.date_modified,
                    "utcDateModified": note.utc_date_modified,
                })
            }),
            "isJavaScript" => self.with_note(|_, note| Value::Bool(is_javascript(note))),
            "isHtml" => self.with_note(|_, note| Value::Bool(is_html(note))),
            "getScriptEnv" => self.with_note(|_, note| script_env(note)),
            "getAllNotePaths" => {
                self.with_note(|graph, note| Value::from(graph.note_paths(&note.note_id)))
            }
            "getNoteRevisions" => self.with_note(|graph, note| {
                graph
                    .revisions_of(&note.note_id)
                    .into_iter()
                    .map(|revision| Value::Object(record_object(revision)))
                    .collect()
            }),
            "hasChildren" => {
                self.with_note(|graph, note| Value::Bool(!graph.child_note_ids(&note.note_id).is_empty()))
            }
            "getChildNotes" => self.with_note(|graph, note| {
                graph
                    .child_note_ids(&note.note_id)
                    .iter()
                    .map(|id| graph.note_json_by_id(id))
                    .collect()
            }),
            "getParentNotes" => self.with_note(|graph, note| {
                graph
                    .parent_note_ids(&note.note_id)
                    .iter()
                    .map(|id| graph.note_json_by_id(id))
                    .collect()
            }),
            "getChildBranches" => self.with_note(|graph, note| {
                graph
                    .child_branches(&note.note_id)
                    .into_iter()
                    .map(|branch| Value::Object(record_object(branch)))
                    .collect()
            }),
            "getBranches" => self.with_note(|graph, note| {
                graph
                    .parent_branches(&note.note_id)
                    .into_iter()
                    .map(|branch| Value::Object(record_object(branch)))
                    .collect()
            }),
            "getDescendantNoteIds" => self.with_note(|graph, note| {
                graph
                    .descendant_note_ids(&note.note_id)
                    .into_iter()
                    .map(Value::String)
                    .collect()
            }),
            "isDescendantOfNote" => {
                let ancestor = args.string(0)?;
                self.with_note(|graph, note| Value::Bool(graph.is_descendant_of(&note.note_id, ancestor)))
            }
            other => Err(not_a_method("note", other)),
        }
    }
}

/// A branch addressed by identifier.
pub(crate) struct BranchObject {
    graph: SharedGraph,
    branch_id: String,
}

impl BranchObject {
    pub(crate) fn new(graph: SharedGraph, branch_id: String) -> Self {
        Self { graph, branch_id }
    }
}

impl HostObject for BranchObject {
    fn read(&self, property: &str) -> Result<Value, HostError> {
        let graph = read(&self.graph)?;
        let branch = graph.branch(&self.branch_id).ok_or_else(|| {
            HostError::new(format!("branch '{}' no longer exists", self.branch_id))
        })?;
        Ok(record_property(branch, property))
    }

    fn call(&self, method: &str, _values: &[Value]) -> Result<Value, HostError> {
        let graph = read(&self.graph)?;
        let branch = graph.branch(&self.branch_id).ok_or_else(|| {
            HostError::new(format!("branch '{}' no longer exists", self.branch_id))
        })?;
        match method {
            "getNote" => Ok(graph.note_json_by_id(&branch.note_id)),
            "getParentNote" => Ok(graph.note_json_by_id(&branch.parent_note_id)),
            other => Err(not_a_method("branch", other)),
        }
    }
}

/// An attribute addressed by identifier.
pub(crate) struct AttributeObject {
    graph: SharedGraph,
    attribute_id: String,
}

impl AttributeObject {
    pub(crate) fn new(graph: SharedGraph, attribute_id: String) -> Self {
        Self {
            graph,
            attribute_id,
        }
    }
}

impl HostObject for AttributeObject {
    fn read(&self, property: &str) -> Result<Value, HostError> {
        let graph = read(&self.graph)?;
        let attribute = graph.attribute(&self.attribute_id).ok_or_else(|| {
            HostError::new(format!("attribute '{}' no longer exists", self.attribute_id))
        })?;
        Ok(record_property(attribute, property))
    }

    fn call(&self, method: &str, _values: &[Value]) -> Result<Value, HostError> {
        let graph = read(&self.graph)?;
        let attribute = graph.attribute(&self.attribute_id).ok_or_else(|| {
            HostError::new(format!("attribute '{}' no longer exists", self.attribute_id))
        })?;
        match method {
            "getNote" => Ok(graph.note_json_by_id(&attribute.note_id)),
            "getTargetNote" => Ok(if attribute.attribute_type == "relation" {
                graph.note_json_by_id(&attribute.value)
            } else {
                Value::Null
            }),
            "isDefinition" => Ok(Value::Bool(
                attribute.name.starts_with("label:") || attribute.name.starts_with("relation:"),
            )),
            other => Err(not_a_method("attribute", other)),
        }
    }
}

/// SQL façade of a host without a database.
pub(crate) struct DetachedSql;

impl HostObject for DetachedSql {
    fn read(&self, property: &str) -> Result<Value, HostError> {
        Err(not_a_property("sql", property))
    }

    fn call(&self, method: &str, _values: &[Value]) -> Result<Value, HostError> {
        Err(HostError::new(format!(
            "sql.{method}: no database is attached to the in-memory host"
        )))
    }
}
