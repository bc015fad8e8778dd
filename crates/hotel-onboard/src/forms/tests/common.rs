use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use lopdf::{dictionary, Document, Object, ObjectId};
use serde_json::Value;

use crate::forms::domain::{ApplicantFormData, CitizenshipStatus, FormKind, W4FormData};
use crate::forms::i9::fields as i9_fields;
use crate::forms::notify::{FormNotice, NotifyError, OnboardingNotifier};
use crate::forms::render::RenderOptions;
use crate::forms::service::FormGenerator;
use crate::forms::template::StaticTemplateSource;
use crate::forms::w4::fields as w4_fields;

pub(crate) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 6).expect("valid date")
}

pub(crate) fn jane_doe() -> ApplicantFormData {
    let mut data = ApplicantFormData::new(CitizenshipStatus::Citizen);
    data.last_name = "Doe".to_string();
    data.first_name = "Jane".to_string();
    data.address = "1200 Harbor Blvd".to_string();
    data.city = "St. Augustine".to_string();
    data.state = Some("FL".to_string());
    data.zip_code = "32084".to_string();
    data.date_of_birth = Some("1990-01-15".to_string());
    data.phone = Some("555-123-4567".to_string());
    data.ssn = Some("123-45-6789".to_string());
    data.email = Some("jane.doe@example.com".to_string());
    data
}

pub(crate) fn w4_employee() -> W4FormData {
    W4FormData {
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
        address: "1200 Harbor Blvd".to_string(),
        city: "St. Augustine".to_string(),
        state: "FL".to_string(),
        zip_code: "32084".to_string(),
        ssn: Some("123-45-6789".to_string()),
        qualifying_children: 1,
        ..W4FormData::default()
    }
}

const I9_TEXT_FIELDS: &[&str] = &[
    i9_fields::LAST_NAME,
    i9_fields::FIRST_NAME,
    i9_fields::MIDDLE_INITIAL,
    i9_fields::OTHER_LAST_NAMES,
    i9_fields::ADDRESS,
    i9_fields::APT_NUMBER,
    i9_fields::CITY,
    i9_fields::ZIP_CODE,
    i9_fields::DATE_OF_BIRTH,
    i9_fields::SSN,
    i9_fields::EMAIL,
    i9_fields::PHONE,
    i9_fields::TODAY,
    i9_fields::PERMANENT_RESIDENT_NUMBER,
    i9_fields::ALIEN_NUMBER,
    i9_fields::EXPIRATION_DATE,
    i9_fields::I94_ADMISSION_NUMBER,
    i9_fields::FOREIGN_PASSPORT,
];

fn text_field(document: &mut Document, name: &str) -> ObjectId {
    document.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal(name),
        "Rect" => vec![0.into(), 0.into(), 100.into(), 20.into()],
    })
}

fn checkbox_field(document: &mut Document, name: &str, on_state: &str) -> ObjectId {
    document.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "T" => Object::string_literal(name),
        "AS" => "Off",
        "AP" => dictionary! {
            "N" => dictionary! {
                on_state => Object::Null,
                "Off" => Object::Null,
            },
        },
    })
}

fn state_field(document: &mut Document) -> ObjectId {
    document.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Ch",
        "Ff" => 1i64 << 17,
        "T" => Object::string_literal(i9_fields::STATE),
        "Opt" => vec![
            Object::string_literal("CA"),
            Object::Array(vec![Object::string_literal("FL"), Object::string_literal("Florida")]),
            Object::string_literal("NY"),
        ],
    })
}

/// Builds a W-4 style subtree: `topmostSubform[0].Page1[0].<leaf>` with one widget per leaf.
fn w4_subtree(document: &mut Document) -> ObjectId {
    let root_id = document.new_object_id();
    let page_id = document.new_object_id();

    let mut leaves = Vec::new();
    for path in [
        w4_fields::FIRST_NAME,
        w4_fields::LAST_NAME,
        w4_fields::ADDRESS,
        w4_fields::CITY_STATE_ZIP,
        w4_fields::SSN,
        w4_fields::CHILDREN_AMOUNT,
        w4_fields::OTHER_DEPENDENTS_AMOUNT,
        w4_fields::DEPENDENTS_TOTAL,
    ] {
        leaves.push((path, "Tx", None));
    }
    leaves.push((w4_fields::SINGLE, "Btn", Some("1")));
    leaves.push((w4_fields::MARRIED_FILING_JOINTLY, "Btn", Some("2")));
    leaves.push((w4_fields::HEAD_OF_HOUSEHOLD, "Btn", Some("3")));

    let mut page_kids = Vec::new();
    let mut groups: Vec<(String, ObjectId, Vec<Object>)> = Vec::new();
    for (path, kind, on_state) in leaves {
        let relative = path
            .strip_prefix("topmostSubform[0].Page1[0].")
            .expect("w4 field under page one");
        let (group, leaf) = match relative.split_once('.') {
            Some((group, leaf)) => (Some(group), leaf),
            None => (None, relative),
        };
        let parent = match group {
            Some(group) => match groups.iter().position(|(name, _, _)| name == group) {
                Some(index) => groups[index].1,
                None => {
                    let id = document.new_object_id();
                    groups.push((group.to_string(), id, Vec::new()));
                    page_kids.push(Object::Reference(id));
                    id
                }
            },
            None => page_id,
        };

        let widget_id = document.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Parent" => Object::Reference(parent),
            "AP" => dictionary! {
                "N" => dictionary! {
                    on_state.unwrap_or("Yes") => Object::Null,
                    "Off" => Object::Null,
                },
            },
        });
        let leaf_id = document.add_object(dictionary! {
            "FT" => kind,
            "T" => Object::string_literal(leaf),
            "Parent" => Object::Reference(parent),
            "Kids" => vec![Object::Reference(widget_id)],
        });

        match groups.iter_mut().find(|(_, id, _)| *id == parent) {
            Some((_, _, kids)) => kids.push(Object::Reference(leaf_id)),
            None => page_kids.push(Object::Reference(leaf_id)),
        }
    }

    for (name, id, kids) in groups {
        document.objects.insert(
            id,
            Object::Dictionary(dictionary! {
                "T" => Object::string_literal(name),
                "Parent" => Object::Reference(page_id),
                "Kids" => kids,
            }),
        );
    }
    document.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "T" => Object::string_literal("Page1[0]"),
            "Parent" => Object::Reference(root_id),
            "Kids" => page_kids,
        }),
    );
    document.objects.insert(
        root_id,
        Object::Dictionary(dictionary! {
            "T" => Object::string_literal("topmostSubform[0]"),
            "Kids" => vec![Object::Reference(page_id)],
        }),
    );
    root_id
}

/// A small fillable PDF carrying every I-9 field plus a hierarchical W-4 subtree.
pub(crate) fn sample_template() -> Vec<u8> {
    let mut document = Document::with_version("1.7");

    let mut fields: Vec<Object> = I9_TEXT_FIELDS
        .iter()
        .map(|name| Object::Reference(text_field(&mut document, name)))
        .collect();
    fields.push(Object::Reference(state_field(&mut document)));
    for checkbox in ["CB_1", "CB_2", "CB_3", "CB_4"] {
        fields.push(Object::Reference(checkbox_field(&mut document, checkbox, "On")));
    }
    fields.push(Object::Reference(w4_subtree(&mut document)));

    let acro_form_id = document.add_object(dictionary! {
        "Fields" => fields,
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
    });
    let page_id = document.new_object_id();
    let pages_id = document.add_object(dictionary! {
        "Type" => "Pages",
        "Kids" => vec![Object::Reference(page_id)],
        "Count" => 1,
    });
    document.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
        "AcroForm" => Object::Reference(acro_form_id),
    });
    document.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    document.save_to(&mut bytes).expect("fixture saves");
    bytes
}

fn find_field<'a>(document: &'a Document, name: &str) -> Option<&'a lopdf::Dictionary> {
    document.objects.values().find_map(|object| {
        let dict = object.as_dict().ok()?;
        match dict.get(b"T") {
            Ok(Object::String(bytes, _)) if bytes.as_slice() == name.as_bytes() => Some(dict),
            _ => None,
        }
    })
}

/// Reads back `/V` of a top-level field by its partial name.
pub(crate) fn field_value(document: &Document, name: &str) -> Option<String> {
    match find_field(document, name)?.get(b"V").ok()? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Reads back `/AS` of a merged field/widget by its partial name.
pub(crate) fn widget_state(document: &Document, name: &str) -> Option<Vec<u8>> {
    match find_field(document, name)?.get(b"AS").ok()? {
        Object::Name(bytes) => Some(bytes.clone()),
        _ => None,
    }
}

#[derive(Default, Clone)]
pub(crate) struct MemoryNotifier {
    notices: Arc<Mutex<Vec<FormNotice>>>,
}

impl MemoryNotifier {
    pub(crate) fn notices(&self) -> Vec<FormNotice> {
        self.notices.lock().expect("notifier mutex poisoned").clone()
    }
}

impl OnboardingNotifier for MemoryNotifier {
    fn publish(&self, notice: FormNotice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .expect("notifier mutex poisoned")
            .push(notice);
        Ok(())
    }
}

pub(crate) struct OfflineNotifier;

impl OnboardingNotifier for OfflineNotifier {
    fn publish(&self, _notice: FormNotice) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("socket closed".to_string()))
    }
}

pub(crate) fn template_source() -> StaticTemplateSource {
    let template = sample_template();
    StaticTemplateSource::default()
        .with_template(FormKind::I9, template.clone())
        .with_template(FormKind::W4, template)
}

pub(crate) fn build_generator() -> (
    FormGenerator<StaticTemplateSource, MemoryNotifier>,
    MemoryNotifier,
) {
    let notifier = MemoryNotifier::default();
    let generator = FormGenerator::new(
        Arc::new(template_source()),
        Arc::new(notifier.clone()),
        RenderOptions::default(),
    );
    (generator, notifier)
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
