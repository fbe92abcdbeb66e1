//! Per-kind member tables.
//!
//! Each handle kind exposes a fixed set of members. A member is either a
//! property, read without arguments, or a method with an ordered parameter
//! schema. Requests naming anything else never reach the host.

use serde_json::Value;

use super::errors::DispatchError;
use super::resolver::HandleKind;

use self::ParamType::{Any, Boolean, Integer, Object, String as Str};

/// JSON type a parameter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Boolean,
    Integer,
    Number,
    Object,
    Array,
    Any,
}

impl ParamType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Any => true,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Boolean => "a boolean",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Object => "an object",
            Self::Array => "an array",
            Self::Any => "a value",
        }
    }
}

/// One positional parameter of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub name: &'static str,
    pub ty: ParamType,
    pub required: bool,
}

const fn req(name: &'static str, ty: ParamType) -> Param {
    Param {
        name,
        ty,
        required: true,
    }
}

const fn opt(name: &'static str, ty: ParamType) -> Param {
    Param {
        name,
        ty,
        required: false,
    }
}

/// How a member is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberShape {
    Property,
    Method(&'static [Param]),
}

/// A named entry in a kind's catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Member {
    pub name: &'static str,
    pub shape: MemberShape,
}

impl Member {
    /// Checks `args` against this member's schema.
    ///
    /// Omitted trailing arguments and explicit `null` both count as absent.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidArguments` when a property receives
    /// arguments, a method receives too many, a required argument is absent,
    /// or an argument has the wrong type.
    pub fn validate(&self, args: &[Value]) -> Result<(), DispatchError> {
        let params = match self.shape {
            MemberShape::Property if args.is_empty() => return Ok(()),
            MemberShape::Property => {
                return Err(DispatchError::invalid_arguments(
                    self.name,
                    "properties take no arguments",
                ));
            }
            MemberShape::Method(params) => params,
        };

        if args.len() > params.len() {
            return Err(DispatchError::invalid_arguments(
                self.name,
                format!(
                    "expected at most {} argument(s), got {}",
                    params.len(),
                    args.len()
                ),
            ));
        }

        for (index, param) in params.iter().enumerate() {
            match args.get(index).filter(|value| !value.is_null()) {
                None if param.required => {
                    return Err(DispatchError::invalid_arguments(
                        self.name,
                        format!("missing required argument '{}'", param.name),
                    ));
                }
                Some(value) if !param.ty.accepts(value) => {
                    return Err(DispatchError::invalid_arguments(
                        self.name,
                        format!("argument '{}' must be {}", param.name, param.ty.describe()),
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

const fn property(name: &'static str) -> Member {
    Member {
        name,
        shape: MemberShape::Property,
    }
}

const fn method(name: &'static str, params: &'static [Param]) -> Member {
    Member {
        name,
        shape: MemberShape::Method(params),
    }
}

const NONE: &[Param] = &[];
const NAME: &[Param] = &[req("name", Str)];
const OPT_NAME: &[Param] = &[opt("name", Str)];
const NAME_OPT_VALUE: &[Param] = &[req("name", Str), opt("value", Str)];
const TYPE_NAME: &[Param] = &[req("type", Str), req("name", Str)];
const TYPE_NAME_OPT_VALUE: &[Param] = &[req("type", Str), req("name", Str), opt("value", Str)];
const OPT_TYPE_NAME: &[Param] = &[opt("type", Str), opt("name", Str)];
const CONTENT: &[Param] = &[req("content", Any)];
const QUERY: &[Param] = &[req("query", Str), opt("params", Any)];

const GET_NOTE_PARAMS: &[Param] = &[req("noteId", Str)];
const GET_BRANCH_PARAMS: &[Param] = &[req("branchId", Str)];
const GET_ATTRIBUTE_PARAMS: &[Param] = &[req("attributeId", Str)];
const SEARCH_FOR_NOTES_PARAMS: &[Param] = &[req("query", Str), opt("searchParams", Object)];
const SEARCH_FOR_NOTE_PARAMS: &[Param] = &[req("query", Str)];
const ENSURE_NOTE_IS_PRESENT_IN_PARENT_PARAMS: &[Param] = &[
    req("noteId", Str),
    req("parentNoteId", Str),
    opt("prefix", Str),
];
const ENSURE_NOTE_IS_ABSENT_FROM_PARENT_PARAMS: &[Param] = &[
    req("noteId", Str),
    req("parentNoteId", Str),
];
const TOGGLE_NOTE_IN_PARENT_PARAMS: &[Param] = &[
    req("present", Boolean),
    req("noteId", Str),
    req("parentNoteId", Str),
    opt("prefix", Str),
];
const CREATE_TEXT_NOTE_PARAMS: &[Param] = &[
    req("parentNoteId", Str),
    req("title", Str),
    req("content", Str),
];
const CREATE_DATA_NOTE_PARAMS: &[Param] = &[
    req("parentNoteId", Str),
    req("title", Str),
    req("content", Any),
];
const CREATE_NEW_NOTE_PARAMS: &[Param] = &[req("params", Object)];
const SORT_NOTES_ALPHABETICALLY_PARAMS: &[Param] = &[req("parentNoteId", Str)];
const LOG_PARAMS: &[Param] = &[req("message", Any)];
const ADD_ATTRIBUTE_PARAMS: &[Param] = &[
    req("type", Str),
    req("name", Str),
    opt("value", Str),
    opt("isInheritable", Boolean),
    opt("position", Integer),
];
const ADD_LABEL_PARAMS: &[Param] = &[
    req("name", Str),
    opt("value", Str),
    opt("isInheritable", Boolean),
];
const TOGGLE_PARAMS: &[Param] = &[
    req("enabled", Boolean),
    req("name", Str),
    opt("value", Str),
];
const ADD_RELATION_PARAMS: &[Param] = &[
    req("name", Str),
    req("targetNoteId", Str),
    opt("isInheritable", Boolean),
];
const TOGGLE_ATTRIBUTE_PARAMS: &[Param] = &[
    req("type", Str),
    req("enabled", Boolean),
    req("name", Str),
    opt("value", Str),
];
const DATE: &[Param] = &[req("date", Str)];
const GET_WEEK_NOTE_PARAMS: &[Param] = &[req("date", Str), opt("options", Object)];
const GET_MONTH_NOTE_PARAMS: &[Param] = &[req("month", Str)];
const GET_YEAR_NOTE_PARAMS: &[Param] = &[req("year", Any)];
const IS_DESCENDANT_OF_NOTE_PARAMS: &[Param] = &[req("ancestorNoteId", Str)];

const ROOT_API: &[Member] = &[
    property("startNote"),
    property("currentNote"),
    property("originEntity"),
    method("getInstanceName", NONE),
    method("getAppInfo", NONE),
    method("getNote", GET_NOTE_PARAMS),
    method("getBranch", GET_BRANCH_PARAMS),
    method("getAttribute", GET_ATTRIBUTE_PARAMS),
    method("searchForNotes", SEARCH_FOR_NOTES_PARAMS),
    method("searchForNote", SEARCH_FOR_NOTE_PARAMS),
    method("getNotesWithLabel", NAME_OPT_VALUE),
    method("getNoteWithLabel", NAME_OPT_VALUE),
    method("ensureNoteIsPresentInParent", ENSURE_NOTE_IS_PRESENT_IN_PARENT_PARAMS),
    method("ensureNoteIsAbsentFromParent", ENSURE_NOTE_IS_ABSENT_FROM_PARENT_PARAMS),
    method("toggleNoteInParent", TOGGLE_NOTE_IN_PARENT_PARAMS),
    method("createTextNote", CREATE_TEXT_NOTE_PARAMS),
    method("createDataNote", CREATE_DATA_NOTE_PARAMS),
    method("createNewNote", CREATE_NEW_NOTE_PARAMS),
    method("sortNotesAlphabetically", SORT_NOTES_ALPHABETICALLY_PARAMS),
    method("getRootCalendarNote", NONE),
    method("getDateNote", DATE),
    method("getTodayNote", NONE),
    method("getWeekNote", GET_WEEK_NOTE_PARAMS),
    method("getMonthNote", GET_MONTH_NOTE_PARAMS),
    method("getYearNote", GET_YEAR_NOTE_PARAMS),
    method("log", LOG_PARAMS),
];

const NOTE: &[Member] = &[
    property("noteId"),
    property("type"),
    property("mime"),
    property("title"),
    property("isProtected"),
    property("isDeleted"),
    property("deleteId"),
    property("dateCreated"),
    property("dateModified"),
    property("utcDateCreated"),
    property("utcDateModified"),
    method("getTitle", NONE),
    method("getContent", NONE),
    method("setContent", CONTENT),
    method("getJsonContent", NONE),
    method("setJsonContent", CONTENT),
    method("isRoot", NONE),
    method("isJson", NONE),
    method("isStringNote", NONE),
    method("isJavaScript", NONE),
    method("isHtml", NONE),
    method("getScriptEnv", NONE),
    method("getContentMetadata", NONE),
    method("getNoteRevisions", NONE),
    method("getAttributes", OPT_TYPE_NAME),
    method("getOwnedAttributes", OPT_TYPE_NAME),
    method("getAttribute", TYPE_NAME),
    method("getOwnedAttribute", TYPE_NAME),
    method("getAttributeValue", TYPE_NAME),
    method("getOwnedAttributeValue", TYPE_NAME),
    method("hasAttribute", TYPE_NAME),
    method("hasOwnedAttribute", TYPE_NAME),
    method("setAttribute", TYPE_NAME_OPT_VALUE),
    method("removeAttribute", TYPE_NAME_OPT_VALUE),
    method("addAttribute", ADD_ATTRIBUTE_PARAMS),
    method("toggleAttribute", TOGGLE_ATTRIBUTE_PARAMS),
    method("getLabels", OPT_NAME),
    method("getOwnedLabels", OPT_NAME),
    method("getLabel", NAME),
    method("getOwnedLabel", NAME),
    method("getLabelValue", NAME),
    method("getOwnedLabelValue", NAME),
    method("hasLabel", NAME),
    method("hasOwnedLabel", NAME),
    method("setLabel", NAME_OPT_VALUE),
    method("removeLabel", NAME_OPT_VALUE),
    method("addLabel", ADD_LABEL_PARAMS),
    method("toggleLabel", TOGGLE_PARAMS),
    method("getRelations", OPT_NAME),
    method("getOwnedRelations", OPT_NAME),
    method("getRelation", NAME),
    method("getOwnedRelation", NAME),
    method("getRelationValue", NAME),
    method("getOwnedRelationValue", NAME),
    method("hasRelation", NAME),
    method("hasOwnedRelation", NAME),
    method("getRelationTarget", NAME),
    method("getOwnedRelationTarget", NAME),
    method("getRelationTargets", OPT_NAME),
    method("getTargetRelations", NONE),
    method("setRelation", NAME_OPT_VALUE),
    method("removeRelation", NAME_OPT_VALUE),
    method("toggleRelation", TOGGLE_PARAMS),
    method("addRelation", ADD_RELATION_PARAMS),
    method("hasChildren", NONE),
    method("getChildNotes", NONE),
    method("getChildBranches", NONE),
    method("getParentNotes", NONE),
    method("getBranches", NONE),
    method("getDescendantNoteIds", NONE),
    method("getAllNotePaths", NONE),
    method("isDescendantOfNote", IS_DESCENDANT_OF_NOTE_PARAMS),
];

const BRANCH: &[Member] = &[
    property("branchId"),
    property("noteId"),
    property("parentNoteId"),
    property("notePosition"),
    property("prefix"),
    property("isExpanded"),
    property("isDeleted"),
    property("deleteId"),
    property("utcDateCreated"),
    property("utcDateModified"),
    method("getNote", NONE),
    method("getParentNote", NONE),
];

const ATTRIBUTE: &[Member] = &[
    property("attributeId"),
    property("noteId"),
    property("type"),
    property("name"),
    property("value"),
    property("position"),
    property("isInheritable"),
    property("isDeleted"),
    property("deleteId"),
    property("utcDateModified"),
    method("getNote", NONE),
    method("getTargetNote", NONE),
    method("isDefinition", NONE),
];

const SQL: &[Member] = &[
    method("execute", QUERY),
    method("getRows", QUERY),
    method("getRow", QUERY),
    method("getValue", QUERY),
    method("getColumn", QUERY),
];

/// Lookup over every kind's member table.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemberCatalogue;

impl MemberCatalogue {
    pub fn new() -> Self {
        Self
    }

    /// Members exposed by `kind`.
    pub fn members(&self, kind: HandleKind) -> &'static [Member] {
        match kind {
            HandleKind::RootApi => ROOT_API,
            HandleKind::Note => NOTE,
            HandleKind::Branch => BRANCH,
            HandleKind::Attribute => ATTRIBUTE,
            HandleKind::SqlFacade => SQL,
        }
    }

    /// Finds `name` in `kind`'s table. Matching is exact.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::UnsupportedOperation` when the kind has no
    /// such member.
    pub fn lookup(&self, kind: HandleKind, name: &str) -> Result<&'static Member, DispatchError> {
        self.members(kind)
            .iter()
            .find(|member| member.name == name)
            .ok_or_else(|| DispatchError::unsupported_operation(kind.as_str(), name))
    }
}
