use std::collections::BTreeMap;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use serde::Serialize;
use tracing::{debug, warn};

use super::domain::{FieldOperation, PdfFieldAssignment};

const FLAG_READ_ONLY: i64 = 1;
const FLAG_EDITABLE_COMBO: i64 = 1 << 18;
const DEFAULT_ON_STATE: &[u8] = b"Yes";
const OFF_STATE: &[u8] = b"Off";

/// Failure to open or serialize a template. These abort the whole generation.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("template is not a readable PDF: {0}")]
    Parse(String),
    #[error("template has no interactive form (AcroForm)")]
    MissingAcroForm,
    #[error("failed to serialize filled form: {0}")]
    Save(String),
}

/// Failure to apply a single assignment. The renderer records these and moves on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("no field named '{0}' in template")]
    UnknownField(String),
    #[error("field '{field}' is a {actual} field and cannot take a {operation:?} operation")]
    TypeMismatch {
        field: String,
        actual: &'static str,
        operation: FieldOperation,
    },
    #[error("'{value}' is not an option of field '{field}'")]
    UnknownOption { field: String, value: String },
    #[error("field '{0}' could not be updated in the document")]
    Unwritable(String),
}

/// Render behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Mark every field that received a value as read-only.
    pub lock_fields: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedField {
    pub field: String,
    pub reason: String,
}

/// Outcome of applying a batch of assignments to a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub applied: Vec<String>,
    pub skipped: Vec<SkippedField>,
}

impl RenderReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Text,
    Choice,
    Button,
    Signature,
    Unknown,
}

impl FieldKind {
    fn from_type(value: Option<&[u8]>) -> Self {
        match value {
            Some(b"Tx") => Self::Text,
            Some(b"Ch") => Self::Choice,
            Some(b"Btn") => Self::Button,
            Some(b"Sig") => Self::Signature,
            _ => Self::Unknown,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Choice => "choice",
            Self::Button => "button",
            Self::Signature => "signature",
            Self::Unknown => "untyped",
        }
    }
}

#[derive(Debug, Clone)]
struct FieldEntry {
    id: ObjectId,
    kind: FieldKind,
    flags: i64,
    widgets: Vec<ObjectId>,
}

#[derive(Debug, Clone, Copy)]
enum AcroFormLocation {
    Indirect(ObjectId),
    Inline(ObjectId),
}

/// A loaded fillable PDF with its terminal form fields indexed by fully-qualified name.
pub struct PdfTemplate {
    document: Document,
    fields: BTreeMap<String, FieldEntry>,
    acro_form: AcroFormLocation,
}

impl PdfTemplate {
    pub fn load(bytes: &[u8]) -> Result<Self, RenderError> {
        let document =
            Document::load_mem(bytes).map_err(|err| RenderError::Parse(err.to_string()))?;
        let (acro_form, roots) = locate_acro_form(&document)?;

        let mut fields = BTreeMap::new();
        for root in roots {
            collect_fields(&document, root, None, Inherited::default(), &mut fields, 0);
        }
        debug!(fields = fields.len(), "indexed template form fields");

        Ok(Self {
            document,
            fields,
            acro_form,
        })
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Applies every assignment it can. A bad assignment is logged and reported, never fatal.
    pub fn apply(
        &mut self,
        assignments: &[PdfFieldAssignment],
        options: &RenderOptions,
    ) -> RenderReport {
        let mut report = RenderReport::default();

        for assignment in assignments {
            match self.apply_one(assignment, options) {
                Ok(()) => report.applied.push(assignment.field.clone()),
                Err(err) => {
                    warn!(field = %assignment.field, error = %err, "skipping form field");
                    report.skipped.push(SkippedField {
                        field: assignment.field.clone(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        report
    }

    /// Serializes the filled document, asking viewers to regenerate field appearances.
    pub fn save(mut self) -> Result<Vec<u8>, RenderError> {
        self.acro_form_mut()?
            .set("NeedAppearances", Object::Boolean(true));

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|err| RenderError::Save(err.to_string()))?;
        Ok(output)
    }

    fn apply_one(
        &mut self,
        assignment: &PdfFieldAssignment,
        options: &RenderOptions,
    ) -> Result<(), FieldError> {
        let entry = self
            .fields
            .get(&assignment.field)
            .cloned()
            .ok_or_else(|| FieldError::UnknownField(assignment.field.clone()))?;

        let expected = match assignment.operation {
            FieldOperation::SetText => FieldKind::Text,
            FieldOperation::Select => FieldKind::Choice,
            FieldOperation::Check => FieldKind::Button,
        };
        if entry.kind != expected {
            return Err(FieldError::TypeMismatch {
                field: assignment.field.clone(),
                actual: entry.kind.label(),
                operation: assignment.operation,
            });
        }

        match assignment.operation {
            FieldOperation::SetText => self.set_text(&assignment.field, &entry, &assignment.value)?,
            FieldOperation::Select => self.select(&assignment.field, &entry, &assignment.value)?,
            FieldOperation::Check => self.check(&assignment.field, &entry)?,
        }

        if options.lock_fields {
            let field = self.field_dict_mut(&assignment.field, entry.id)?;
            field.set("Ff", Object::Integer(entry.flags | FLAG_READ_ONLY));
        }
        Ok(())
    }

    fn set_text(&mut self, name: &str, entry: &FieldEntry, value: &str) -> Result<(), FieldError> {
        self.field_dict_mut(name, entry.id)?
            .set("V", encode_text(value));
        self.drop_stale_appearances(name, entry)
    }

    fn select(&mut self, name: &str, entry: &FieldEntry, value: &str) -> Result<(), FieldError> {
        let editable = entry.flags & FLAG_EDITABLE_COMBO != 0;
        if !editable && !self.option_values(entry.id).iter().any(|option| option == value) {
            return Err(FieldError::UnknownOption {
                field: name.to_string(),
                value: value.to_string(),
            });
        }

        self.field_dict_mut(name, entry.id)?
            .set("V", encode_text(value));
        self.drop_stale_appearances(name, entry)
    }

    fn check(&mut self, name: &str, entry: &FieldEntry) -> Result<(), FieldError> {
        let on_state = entry
            .widgets
            .iter()
            .find_map(|widget| on_state(&self.document, *widget))
            .unwrap_or_else(|| DEFAULT_ON_STATE.to_vec());

        self.field_dict_mut(name, entry.id)?
            .set("V", Object::Name(on_state.clone()));

        for widget in &entry.widgets {
            let appearance = if has_appearance_state(&self.document, *widget, &on_state) {
                on_state.clone()
            } else {
                OFF_STATE.to_vec()
            };
            self.field_dict_mut(name, *widget)?
                .set("AS", Object::Name(appearance));
        }
        Ok(())
    }

    fn drop_stale_appearances(&mut self, name: &str, entry: &FieldEntry) -> Result<(), FieldError> {
        for widget in &entry.widgets {
            self.field_dict_mut(name, *widget)?.remove(b"AP");
        }
        Ok(())
    }

    fn option_values(&self, id: ObjectId) -> Vec<String> {
        let Some(field) = self.document.get_object(id).ok().and_then(|obj| obj.as_dict().ok())
        else {
            return Vec::new();
        };
        let Some(Object::Array(options)) = field
            .get(b"Opt")
            .ok()
            .and_then(|obj| resolve(&self.document, obj))
        else {
            return Vec::new();
        };

        options
            .iter()
            .filter_map(|option| match resolve(&self.document, option)? {
                Object::String(bytes, _) => Some(decode_text(bytes)),
                Object::Array(pair) => match pair.first() {
                    Some(Object::String(bytes, _)) => Some(decode_text(bytes)),
                    _ => None,
                },
                _ => None,
            })
            .collect()
    }

    fn field_dict_mut(&mut self, name: &str, id: ObjectId) -> Result<&mut Dictionary, FieldError> {
        self.document
            .get_object_mut(id)
            .ok()
            .and_then(|obj| obj.as_dict_mut().ok())
            .ok_or_else(|| FieldError::Unwritable(name.to_string()))
    }

    fn acro_form_mut(&mut self) -> Result<&mut Dictionary, RenderError> {
        match self.acro_form {
            AcroFormLocation::Indirect(id) => self
                .document
                .get_object_mut(id)
                .ok()
                .and_then(|obj| obj.as_dict_mut().ok())
                .ok_or(RenderError::MissingAcroForm),
            AcroFormLocation::Inline(catalog) => self
                .document
                .get_object_mut(catalog)
                .ok()
                .and_then(|obj| obj.as_dict_mut().ok())
                .and_then(|catalog| catalog.get_mut(b"AcroForm").ok())
                .and_then(|obj| obj.as_dict_mut().ok())
                .ok_or(RenderError::MissingAcroForm),
        }
    }
}

fn locate_acro_form(document: &Document) -> Result<(AcroFormLocation, Vec<ObjectId>), RenderError> {
    let catalog_id = document
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| RenderError::MissingAcroForm)?;
    let catalog = document
        .get_object(catalog_id)
        .and_then(Object::as_dict)
        .map_err(|_| RenderError::MissingAcroForm)?;

    let (location, acro_form) = match catalog.get(b"AcroForm") {
        Ok(Object::Reference(id)) => (
            AcroFormLocation::Indirect(*id),
            document
                .get_object(*id)
                .and_then(Object::as_dict)
                .map_err(|_| RenderError::MissingAcroForm)?,
        ),
        Ok(Object::Dictionary(dict)) => (AcroFormLocation::Inline(catalog_id), dict),
        _ => return Err(RenderError::MissingAcroForm),
    };

    let roots = match acro_form.get(b"Fields").ok().and_then(|obj| resolve(document, obj)) {
        Some(Object::Array(fields)) => fields
            .iter()
            .filter_map(|field| field.as_reference().ok())
            .collect(),
        _ => Vec::new(),
    };

    Ok((location, roots))
}

#[derive(Debug, Clone, Copy, Default)]
struct Inherited<'a> {
    field_type: Option<&'a [u8]>,
    flags: Option<i64>,
}

// Nested forms deeper than this are treated as malformed (or cyclic) and ignored.
const MAX_FIELD_DEPTH: usize = 32;

fn collect_fields<'a>(
    document: &'a Document,
    id: ObjectId,
    parent_name: Option<&str>,
    inherited: Inherited<'a>,
    fields: &mut BTreeMap<String, FieldEntry>,
    depth: usize,
) {
    if depth > MAX_FIELD_DEPTH {
        return;
    }
    let Ok(dict) = document.get_object(id).and_then(Object::as_dict) else {
        return;
    };

    let partial = match dict.get(b"T") {
        Ok(Object::String(bytes, _)) => Some(decode_text(bytes)),
        _ => None,
    };
    let name = match (parent_name, partial) {
        (Some(parent), Some(partial)) => format!("{parent}.{partial}"),
        (None, Some(partial)) => partial,
        (Some(parent), None) => parent.to_string(),
        (None, None) => return,
    };

    let inherited = Inherited {
        field_type: match dict.get(b"FT") {
            Ok(Object::Name(kind)) => Some(kind.as_slice()),
            _ => inherited.field_type,
        },
        flags: match dict.get(b"Ff") {
            Ok(Object::Integer(flags)) => Some(*flags),
            _ => inherited.flags,
        },
    };

    let kids: Vec<ObjectId> = match dict.get(b"Kids").ok().and_then(|obj| resolve(document, obj)) {
        Some(Object::Array(kids)) => kids
            .iter()
            .filter_map(|kid| kid.as_reference().ok())
            .collect(),
        _ => Vec::new(),
    };

    let (child_fields, widgets): (Vec<ObjectId>, Vec<ObjectId>) =
        kids.into_iter().partition(|kid| {
            document
                .get_object(*kid)
                .and_then(Object::as_dict)
                .map(|kid| kid.has(b"T"))
                .unwrap_or(false)
        });

    if child_fields.is_empty() {
        let widgets = if widgets.is_empty() { vec![id] } else { widgets };
        fields.insert(
            name,
            FieldEntry {
                id,
                kind: FieldKind::from_type(inherited.field_type),
                flags: inherited.flags.unwrap_or(0),
                widgets,
            },
        );
        return;
    }

    for child in child_fields {
        collect_fields(document, child, Some(&name), inherited, fields, depth + 1);
    }
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> Option<&'a Object> {
    match object {
        Object::Reference(id) => document.get_object(*id).ok(),
        other => Some(other),
    }
}

fn normal_appearance(document: &Document, widget: ObjectId) -> Option<&Dictionary> {
    let widget = document.get_object(widget).ok()?.as_dict().ok()?;
    let appearance = resolve(document, widget.get(b"AP").ok()?)?.as_dict().ok()?;
    resolve(document, appearance.get(b"N").ok()?)?.as_dict().ok()
}

fn on_state(document: &Document, widget: ObjectId) -> Option<Vec<u8>> {
    normal_appearance(document, widget)?
        .iter()
        .map(|(state, _)| state)
        .find(|state| state.as_slice() != OFF_STATE)
        .cloned()
}

fn has_appearance_state(document: &Document, widget: ObjectId, state: &[u8]) -> bool {
    match normal_appearance(document, widget) {
        Some(states) => states.has(state),
        None => true,
    }
}

/// Text strings go out as PDFDocEncoding when ASCII, otherwise UTF-16BE with a byte order mark.
fn encode_text(value: &str) -> Object {
    if value.is_ascii() {
        return Object::String(value.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in value.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|byte| char::from(*byte)).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::tests::common::{field_value, sample_template, widget_state};
    use lopdf::dictionary;

    fn load() -> PdfTemplate {
        PdfTemplate::load(&sample_template()).expect("template loads")
    }

    #[test]
    fn indexes_flat_and_hierarchical_names() {
        let template = load();
        assert!(template.has_field("Last Name (Family Name)"));
        assert!(template.has_field("State"));
        assert!(template.has_field("CB_1"));
        assert!(template.has_field("topmostSubform[0].Page1[0].f1_05[0]"));
        assert!(!template.has_field("topmostSubform[0]"));
    }

    #[test]
    fn fills_text_select_and_checkbox() {
        let mut template = load();
        let report = template.apply(
            &[
                PdfFieldAssignment::text("Last Name (Family Name)", "DOE"),
                PdfFieldAssignment::select("State", "FL"),
                PdfFieldAssignment::check("CB_1"),
                PdfFieldAssignment::text("topmostSubform[0].Page1[0].f1_05[0]", "123456789"),
            ],
            &RenderOptions::default(),
        );
        assert!(report.is_complete(), "skipped: {:?}", report.skipped);
        assert_eq!(report.applied.len(), 4);

        let bytes = template.save().expect("saves");
        let document = Document::load_mem(&bytes).expect("output parses");
        assert_eq!(
            field_value(&document, "Last Name (Family Name)"),
            Some("DOE".to_string())
        );
        assert_eq!(field_value(&document, "State"), Some("FL".to_string()));
        assert_eq!(widget_state(&document, "CB_1"), Some(b"On".to_vec()));
    }

    #[test]
    fn bad_assignments_are_skipped_without_aborting() {
        let mut template = load();
        let report = template.apply(
            &[
                PdfFieldAssignment::text("No Such Field", "x"),
                PdfFieldAssignment::select("State", "ZZ"),
                PdfFieldAssignment::check("Last Name (Family Name)"),
                PdfFieldAssignment::text("Last Name (Family Name)", "DOE"),
            ],
            &RenderOptions::default(),
        );

        assert_eq!(report.applied, vec!["Last Name (Family Name)".to_string()]);
        assert_eq!(report.skipped.len(), 3);
        assert!(report.skipped[0].reason.contains("no field named"));
        assert!(report.skipped[1].reason.contains("not an option"));
        assert!(report.skipped[2].reason.contains("text field"));
    }

    #[test]
    fn non_ascii_text_is_utf16_encoded() {
        match encode_text("MUÑOZ") {
            Object::String(bytes, StringFormat::Hexadecimal) => assert_eq!(
                bytes,
                vec![0xFE, 0xFF, 0, b'M', 0, b'U', 0, 0xD1, 0, b'O', 0, b'Z']
            ),
            other => panic!("expected utf-16 hex string, got {other:?}"),
        }
        assert!(matches!(
            encode_text("DOE"),
            Object::String(bytes, StringFormat::Literal) if bytes == b"DOE".to_vec()
        ));
        assert_eq!(decode_text(&[0xFE, 0xFF, 0, b'M', 0, 0xD1]), "MÑ");
    }

    #[test]
    fn lock_option_marks_fields_read_only() {
        let mut template = load();
        template.apply(
            &[PdfFieldAssignment::text("Last Name (Family Name)", "DOE")],
            &RenderOptions { lock_fields: true },
        );
        let entry = template
            .fields
            .get("Last Name (Family Name)")
            .cloned()
            .expect("entry");
        let flags = template
            .document
            .get_object(entry.id)
            .and_then(Object::as_dict)
            .and_then(|dict| dict.get(b"Ff"))
            .and_then(Object::as_i64)
            .expect("flags set");
        assert_eq!(flags & FLAG_READ_ONLY, FLAG_READ_ONLY);
    }

    #[test]
    fn rejects_documents_without_forms() {
        let mut document = Document::with_version("1.7");
        let pages_id = document.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        let catalog_id = document.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        document.trailer.set("Root", Object::Reference(catalog_id));
        let mut bytes = Vec::new();
        document.save_to(&mut bytes).expect("save");

        assert!(matches!(
            PdfTemplate::load(&bytes),
            Err(RenderError::MissingAcroForm)
        ));
        assert!(matches!(
            PdfTemplate::load(b"not a pdf"),
            Err(RenderError::Parse(_))
        ));
    }
}
