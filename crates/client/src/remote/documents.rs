//! Firestore REST v1 wire types and domain conversions.
//!
//! Firestore documents carry typed field values (`{"stringValue": "x"}`,
//! `{"integerValue": "5"}`, ...). Integers are decimal strings on the wire.
//! This module models the subset of the value space the application reads and
//! writes; exotic value kinds it never produces (maps, references,
//! timestamps) are still representable so a foreign document does not break
//! deserialization of a whole scan response.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use ladle_core::{CartLine, Quantity, Recipe, RecipeId};

use super::RemoteError;

/// A typed Firestore field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Value {
    /// Explicit null.
    NullValue(Option<()>),
    /// Boolean.
    BooleanValue(bool),
    /// 64-bit integer, decimal string on the wire.
    IntegerValue(String),
    /// Double-precision float.
    DoubleValue(f64),
    /// RFC 3339 timestamp.
    TimestampValue(String),
    /// UTF-8 string.
    StringValue(String),
    /// Document reference path.
    ReferenceValue(String),
    /// Homogeneous or mixed array.
    ArrayValue(ArrayValue),
    /// Nested map, kept opaque.
    MapValue(serde_json::Value),
}

impl Value {
    /// A string value.
    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::StringValue(value.into())
    }

    /// An integer value (decimal string on the wire).
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Self::IntegerValue(value.to_string())
    }

    /// An array of string values.
    #[must_use]
    pub fn string_array(values: &[String]) -> Self {
        Self::ArrayValue(ArrayValue {
            values: values.iter().cloned().map(Self::StringValue).collect(),
        })
    }

    fn as_str(&self) -> Option<&str> {
        match self {
            Self::StringValue(s) => Some(s),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self {
            Self::IntegerValue(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// An array field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayValue {
    /// Element values; absent on the wire when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
}

/// A Firestore document: resource name plus typed fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Full resource name
    /// (`projects/{p}/databases/{d}/documents/{collection}/{id}`).
    /// Absent when sending an upsert body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Field map.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    /// The last path segment of the resource name, which is the document id.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.name.as_deref()?.rsplit('/').next()
    }
}

/// Response of a collection list call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDocumentsResponse {
    /// One page of documents.
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Continuation token; absent on the last page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Body of a `documents:commit` call carrying field transforms.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRequest {
    /// Writes applied atomically, in order.
    pub writes: Vec<Write>,
}

/// A single write within a commit.
#[derive(Debug, Clone, Serialize)]
pub struct Write {
    /// Transform applied to one document.
    pub transform: DocumentTransform,
}

/// A server-side document transformation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTransform {
    /// Full resource name of the target document.
    pub document: String,
    /// Field transforms applied in order.
    pub field_transforms: Vec<FieldTransform>,
}

/// A server-side field transformation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTransform {
    /// Dotted path of the field to transform.
    pub field_path: String,
    /// Atomic numeric addition.
    pub increment: Value,
}

impl CommitRequest {
    /// A commit that atomically adds `delta` to one numeric field.
    #[must_use]
    pub fn increment(document: String, field_path: &str, delta: i64) -> Self {
        Self {
            writes: vec![Write {
                transform: DocumentTransform {
                    document,
                    field_transforms: vec![FieldTransform {
                        field_path: field_path.to_owned(),
                        increment: Value::integer(delta),
                    }],
                },
            }],
        }
    }
}

// =============================================================================
// Domain conversions
// =============================================================================

/// Encode a cart line as document fields.
///
/// The record layout is `{id, title, quantity, photoURL}`, keyed by the
/// line's id; the id is stored in the fields as well as the document name.
#[must_use]
pub fn cart_line_fields(line: &CartLine) -> BTreeMap<String, Value> {
    BTreeMap::from([
        ("id".to_owned(), Value::string(line.id.as_str())),
        ("title".to_owned(), Value::string(line.title.clone())),
        (
            "quantity".to_owned(),
            Value::integer(i64::from(line.quantity.get())),
        ),
        ("photoURL".to_owned(), Value::string(line.photo_url.clone())),
    ])
}

/// Decode a cart line from a document.
///
/// The id is taken from the `id` field, falling back to the document name.
/// A missing or non-positive quantity is invalid: a remote record never
/// legitimately holds quantity zero.
pub fn cart_line_from_document(doc: &Document) -> Result<CartLine, RemoteError> {
    let id = doc
        .fields
        .get("id")
        .and_then(Value::as_str)
        .or_else(|| doc.id())
        .ok_or_else(|| RemoteError::InvalidDocument("cart line without an id".to_owned()))?;

    let quantity_raw = integer_field(doc, "quantity")?;
    let quantity_raw = u32::try_from(quantity_raw).map_err(|_| {
        RemoteError::InvalidDocument(format!("cart line {id}: quantity {quantity_raw} out of range"))
    })?;
    let quantity = Quantity::new(quantity_raw).map_err(|e| {
        RemoteError::InvalidDocument(format!("cart line {id}: {e}"))
    })?;

    Ok(CartLine {
        id: RecipeId::new(id),
        title: string_field(doc, "title")?,
        quantity,
        photo_url: string_field(doc, "photoURL").unwrap_or_default(),
    })
}

/// Decode a recipe from a document in the `recipes` collection.
///
/// Recipe documents carry no `id` field; the id is the document name.
pub fn recipe_from_document(doc: &Document) -> Result<Recipe, RemoteError> {
    let id = doc
        .id()
        .ok_or_else(|| RemoteError::InvalidDocument("recipe document without a name".to_owned()))?;

    let cooking_time = integer_field(doc, "cookingTime")?;
    let cooking_time = u32::try_from(cooking_time).map_err(|_| {
        RemoteError::InvalidDocument(format!("recipe {id}: cookingTime {cooking_time} out of range"))
    })?;

    Ok(Recipe {
        id: RecipeId::new(id),
        title: string_field(doc, "title")?,
        cooking_time,
        ingredients: string_array_field(doc, "ingredients"),
        images: string_array_field(doc, "images"),
        method: string_field(doc, "method").unwrap_or_default(),
    })
}

fn string_field(doc: &Document, name: &str) -> Result<String, RemoteError> {
    doc.fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| RemoteError::InvalidDocument(format!("missing string field `{name}`")))
}

fn integer_field(doc: &Document, name: &str) -> Result<i64, RemoteError> {
    doc.fields
        .get(name)
        .and_then(Value::as_integer)
        .ok_or_else(|| RemoteError::InvalidDocument(format!("missing integer field `{name}`")))
}

fn string_array_field(doc: &Document, name: &str) -> Vec<String> {
    let Some(Value::ArrayValue(array)) = doc.fields.get(name) else {
        return Vec::new();
    };
    array
        .values
        .iter()
        .filter_map(|v| v.as_str().map(str::to_owned))
        .collect()
}
