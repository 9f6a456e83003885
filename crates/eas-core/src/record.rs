//! # Typed Records — Schema Reflection Without Runtime Reflection
//!
//! A Rust type opts into schema-checked encoding by implementing
//! [`AbiRecord`], which returns a [`SchemaDescriptor`]: an ordered table of
//! `(order, type, name, accessor)` entries built once with
//! [`SchemaDescriptor::builder()`].
//!
//! The descriptor does two things:
//!
//! - [`SchemaLayout::reflect()`] renders the schema string the type declares,
//!   with or without field names.
//! - [`SchemaDescriptor::values()`] extracts positional [`AbiValue`]s in the
//!   same order, so a record always encodes exactly as its reflected schema
//!   says.
//!
//! ## Ordering
//!
//! Fields are sorted by their explicit order index, never by the order the
//! builder calls were made in. Duplicate indices are a build error.
//!
//! ## Strictness
//!
//! [`encode_record()`] compares the reflected schema with the declared one in
//! canonical form and refuses to encode on any difference in type, name,
//! order or nesting. Nothing is coerced.

use std::fmt;
use std::sync::Arc;

use crate::abi::{encode, AbiType, AbiValue};
use crate::error::{EncodeError, SchemaError, SchemaMismatch};
use crate::schema::{normalize, Schema};

type Accessor<T> = Arc<dyn Fn(&T) -> AbiValue + Send + Sync>;

/// A type whose values can be encoded against a schema.
pub trait AbiRecord: Sized + 'static {
    /// Describe this type's fields.
    ///
    /// Called on every [`encode_record()`]; implementations are expected to
    /// be cheap and deterministic.
    fn descriptor() -> Result<SchemaDescriptor<Self>, SchemaError>;
}

/// Reflected metadata for one record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Explicit ordering index.
    pub order: u32,
    /// Declared type name, `"tuple"` for nested records.
    pub type_name: String,
    /// Declared field name.
    pub name: String,
    /// Whether the field holds an array of `type_name`.
    pub is_array: bool,
    /// Layout of the nested record for tuple fields.
    pub components: Option<SchemaLayout>,
}

/// The ordered field layout of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaLayout {
    fields: Vec<FieldLayout>,
}

impl SchemaLayout {
    /// Fields sorted by order index.
    pub fn fields(&self) -> &[FieldLayout] {
        &self.fields
    }

    /// Render the schema string this layout declares.
    ///
    /// With names: `uint256 eventId, tuple(uint8 voteIndex, bool isValid) details`.
    /// Without: `uint256,(uint8,bool)`.
    pub fn reflect(&self, include_names: bool) -> String {
        let separator = if include_names { ", " } else { "," };
        self.fields
            .iter()
            .map(|field| reflect_field(field, include_names))
            .collect::<Vec<_>>()
            .join(separator)
            .trim()
            .to_string()
    }
}

impl fmt::Display for SchemaLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reflect(true))
    }
}

fn reflect_field(field: &FieldLayout, include_names: bool) -> String {
    let array = if field.is_array { "[]" } else { "" };
    let mut out = match &field.components {
        Some(inner) if include_names => format!("tuple({}){array}", inner.reflect(true)),
        Some(inner) => format!("({}){array}", inner.reflect(false)),
        None => format!("{}{array}", field.type_name.to_lowercase()),
    };
    if include_names {
        out.push(' ');
        out.push_str(&field.name);
    }
    out
}

/// Field layout plus value accessors for a record type `T`.
pub struct SchemaDescriptor<T> {
    layout: SchemaLayout,
    accessors: Vec<Accessor<T>>,
}

impl<T> Clone for SchemaDescriptor<T> {
    fn clone(&self) -> Self {
        Self {
            layout: self.layout.clone(),
            accessors: self.accessors.clone(),
        }
    }
}

impl<T> fmt::Debug for SchemaDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDescriptor")
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> SchemaDescriptor<T> {
    /// Start describing `T`.
    pub fn builder() -> SchemaDescriptorBuilder<T> {
        SchemaDescriptorBuilder {
            entries: Vec::new(),
            error: None,
        }
    }

    /// The sorted field layout.
    pub fn layout(&self) -> &SchemaLayout {
        &self.layout
    }

    /// Reflected schema with field names.
    pub fn schema(&self) -> String {
        self.layout.reflect(true)
    }

    /// Reflected schema without field names.
    pub fn signature(&self) -> String {
        self.layout.reflect(false)
    }

    /// Extract positional values from `record` in layout order.
    pub fn values(&self, record: &T) -> Vec<AbiValue> {
        self.accessors.iter().map(|get| get(record)).collect()
    }
}

/// Builder for [`SchemaDescriptor`]. The first invalid entry is reported by
/// [`build()`](SchemaDescriptorBuilder::build).
pub struct SchemaDescriptorBuilder<T> {
    entries: Vec<(FieldLayout, Accessor<T>)>,
    error: Option<SchemaError>,
}

impl<T: 'static> SchemaDescriptorBuilder<T> {
    /// A scalar field such as `uint256 eventId`.
    pub fn field<F>(self, order: u32, type_name: &str, name: &str, accessor: F) -> Self
    where
        F: Fn(&T) -> AbiValue + Send + Sync + 'static,
    {
        self.push(order, type_name, name, false, None, Arc::new(accessor))
    }

    /// An array field such as `uint32[] ages`; `type_name` is the element type.
    pub fn array<F>(self, order: u32, type_name: &str, name: &str, accessor: F) -> Self
    where
        F: Fn(&T) -> Vec<AbiValue> + Send + Sync + 'static,
    {
        let get: Accessor<T> = Arc::new(move |record: &T| AbiValue::Array(accessor(record)));
        self.push(order, type_name, name, true, None, get)
    }

    /// A nested record rendered as `tuple(...) name`.
    pub fn tuple<U, F>(self, order: u32, name: &str, accessor: F) -> Self
    where
        U: AbiRecord,
        F: Fn(&T) -> &U + Send + Sync + 'static,
    {
        match U::descriptor() {
            Ok(inner) => {
                let layout = inner.layout.clone();
                let get: Accessor<T> =
                    Arc::new(move |record: &T| AbiValue::Tuple(inner.values(accessor(record))));
                self.push(order, "tuple", name, false, Some(layout), get)
            }
            Err(err) => self.fail(err),
        }
    }

    /// An array of nested records rendered as `tuple(...)[] name`.
    pub fn tuple_array<U, F>(self, order: u32, name: &str, accessor: F) -> Self
    where
        U: AbiRecord,
        F: Fn(&T) -> &[U] + Send + Sync + 'static,
    {
        match U::descriptor() {
            Ok(inner) => {
                let layout = inner.layout.clone();
                let get: Accessor<T> = Arc::new(move |record: &T| {
                    AbiValue::Array(
                        accessor(record)
                            .iter()
                            .map(|item| AbiValue::Tuple(inner.values(item)))
                            .collect(),
                    )
                });
                self.push(order, "tuple", name, true, Some(layout), get)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Sort by order index and validate.
    ///
    /// # Errors
    ///
    /// [`SchemaError::Empty`] with no fields; [`SchemaError::InvalidField`]
    /// for a duplicate order index, an empty name, or the `tuple` kind used
    /// outside [`tuple()`](Self::tuple); [`SchemaError::UnknownType`] for an
    /// unsupported type name.
    pub fn build(self) -> Result<SchemaDescriptor<T>, SchemaError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.entries.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut entries = self.entries;
        entries.sort_by_key(|(field, _)| field.order);
        if let Some(pair) = entries.windows(2).find(|w| w[0].0.order == w[1].0.order) {
            return Err(SchemaError::InvalidField(format!(
                "duplicate order {} for {} and {}",
                pair[0].0.order, pair[0].0.name, pair[1].0.name
            )));
        }
        let (fields, accessors) = entries.into_iter().unzip();
        Ok(SchemaDescriptor {
            layout: SchemaLayout { fields },
            accessors,
        })
    }

    fn push(
        mut self,
        order: u32,
        type_name: &str,
        name: &str,
        is_array: bool,
        components: Option<SchemaLayout>,
        accessor: Accessor<T>,
    ) -> Self {
        if self.error.is_none() {
            if let Err(err) = validate_entry(type_name, name, is_array, components.is_some()) {
                self.error = Some(err);
            }
        }
        self.entries.push((
            FieldLayout {
                order,
                type_name: type_name.to_string(),
                name: name.to_string(),
                is_array,
                components,
            },
            accessor,
        ));
        self
    }

    fn fail(mut self, err: SchemaError) -> Self {
        self.error.get_or_insert(err);
        self
    }
}

fn validate_entry(
    type_name: &str,
    name: &str,
    is_array: bool,
    is_tuple: bool,
) -> Result<(), SchemaError> {
    let valid_name = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if !valid_name {
        return Err(SchemaError::InvalidField(format!("{type_name} {name}")));
    }
    if is_tuple {
        return Ok(());
    }
    let token = if is_array {
        format!("{type_name}[]")
    } else {
        type_name.to_string()
    };
    match AbiType::parse(&token)? {
        AbiType::Tuple(_) => Err(SchemaError::InvalidField(format!(
            "{type_name} {name}: nested records must use tuple()"
        ))),
        _ => Ok(()),
    }
}

/// Encode `record` against the declared `schema`.
///
/// # Errors
///
/// [`SchemaMismatch::Shape`] when the record's reflected schema differs from
/// `schema` in canonical form. `expected` is the declared schema
/// (normalized), `actual` the reflected one.
pub fn encode_record<T: AbiRecord>(schema: &str, record: &T) -> Result<Vec<u8>, EncodeError> {
    let descriptor = T::descriptor()?;
    let declared = Schema::parse(schema)?;
    let reflected = descriptor.schema();
    let reflected_canonical = Schema::parse(&reflected)?.canonical();
    if declared.canonical() != reflected_canonical {
        return Err(SchemaMismatch::Shape {
            expected: normalize(schema)?,
            actual: reflected,
        }
        .into());
    }
    encode(&declared.types(), &descriptor.values(record))
}
