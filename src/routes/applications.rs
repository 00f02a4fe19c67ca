use std::collections::HashMap;

use axum::{
    extract::{Multipart, Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;
use validator::Validate;

use crate::config::get_config;
use crate::dto::application_dto::{ListApplicationsResponse, SendEmailRequest};
use crate::error::{Error, Result};
use crate::models::application::{
    EducationQualification, NewApplication, Reference, SocialMedia, WorkExperience,
};
use crate::models::ledger::StatusBucket;
use crate::query::compiler::compile_filter;
use crate::AppState;

const ALLOWED_UPLOAD_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "png", "jpg", "jpeg"];

/// Multipart intake: text fields build the application, `resume` and `photo`
/// files land under the uploads dir. Confirmation mails are best-effort and
/// never fail the submission.
pub async fn create_application(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let mut fields: HashMap<String, String> = HashMap::new();
    let mut photo_link = None;
    let mut resume_link = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "photo" | "resume" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field.bytes().await?;
                let link = store_upload(&name, &filename, data).await?;
                if name == "photo" {
                    photo_link = Some(link);
                } else {
                    resume_link = Some(link);
                }
            }
            _ => {
                fields.insert(name, field.text().await?);
            }
        }
    }

    let mut new = parse_intake(fields);
    new.photo_link = photo_link;
    new.resume_link = resume_link;

    let saved = state.application_service.create(new).await?;

    let config = get_config();
    let full_name = saved.full_name.clone().unwrap_or_default();
    let hr_message = format!(
        "<h2>New Job Application Received</h2><p><b>Name:</b> {}</p><p><b>Email:</b> {}</p>",
        full_name,
        saved.email.clone().unwrap_or_default()
    );
    state
        .mail_service
        .send_logged(
            &config.hr_email,
            &format!("New Application - {}", full_name),
            &hr_message,
        )
        .await;
    if let Some(email) = &saved.email {
        let candidate_message = format!(
            "<h2>Dear {},</h2><p>Thank you for applying for the position of <b>{}</b>.</p><p>We have successfully received your application.</p>",
            full_name,
            saved.applying_for.clone().unwrap_or_else(|| "N/A".to_string())
        );
        state
            .mail_service
            .send_logged(email, "Your Application Has Been Received", &candidate_message)
            .await;
    }

    Ok(Json(json!({
        "message": "Application submitted successfully",
        "data": saved,
    })))
}

/// Listing with pagination plus arbitrary filters, free text and experience
/// range included. Unknown filter keys are passed through, not rejected.
pub async fn list_applications(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListApplicationsResponse>> {
    let page = params
        .get("page")
        .and_then(|p| p.parse::<i64>().ok())
        .unwrap_or(1);
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<i64>().ok())
        .unwrap_or(10);

    let predicate = compile_filter(&params);
    let result = state
        .application_service
        .list(&predicate, page, limit)
        .await?;

    Ok(Json(ListApplicationsResponse {
        page: page.max(1),
        limit: limit.max(1),
        total: result.total,
        total_pages: result.total_pages,
        data: result.items,
    }))
}

pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let annotated = state
        .application_service
        .get(id)
        .await?
        .ok_or_else(|| Error::NotFound("Application not found".to_string()))?;
    Ok(Json(json!({
        "message": "Application fetched successfully",
        "data": annotated,
    })))
}

pub async fn get_application_counts(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let counts = state.application_service.counts_by_applying_for().await?;
    Ok(Json(json!({
        "message": "Application counts fetched successfully",
        "data": counts,
    })))
}

/// Sends an HR outcome mail and records it in the status ledger. The mail
/// leaves first; the ledger append and cache refresh happen atomically at
/// the store.
pub async fn send_status_email(
    State(state): State<AppState>,
    Json(payload): Json<SendEmailRequest>,
) -> Result<impl IntoResponse> {
    payload.validate()?;

    let bucket = payload
        .status
        .as_deref()
        .and_then(StatusBucket::parse)
        .unwrap_or(StatusBucket::Interview);

    state
        .mail_service
        .send(&payload.to, &payload.subject, &payload.message)
        .await?;

    let entry = state
        .application_service
        .record_status_change(
            payload.application_id,
            bucket,
            payload.to,
            payload.subject,
            payload.message,
        )
        .await?;

    Ok(Json(json!({
        "message": "Email sent and stored successfully",
        "hrRemark": entry,
    })))
}

pub async fn remove_duplicates(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let removed = state.application_service.remove_duplicates().await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Removed {} duplicates.", removed),
    })))
}

async fn store_upload(kind: &str, filename: &str, data: bytes::Bytes) -> Result<String> {
    let extension = std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !ALLOWED_UPLOAD_EXTENSIONS.contains(&extension.as_str()) {
        return Err(Error::BadRequest(
            "Only PDF/DOC/DOCX/PNG/JPG files are allowed".to_string(),
        ));
    }

    let uploads_dir = &get_config().uploads_dir;
    tokio::fs::create_dir_all(uploads_dir).await?;
    let stored_name = format!("{}_{}.{}", kind, Uuid::new_v4(), extension);
    tokio::fs::write(format!("{}/{}", uploads_dir, stored_name), &data).await?;
    Ok(format!("/uploads/{}", stored_name))
}

/// Lenient form decoding in the spirit of the web intake: list fields arrive
/// as JSON strings, numbers as free text; anything that fails to parse
/// degrades to a default instead of rejecting the submission. Unrecognized
/// fields are kept verbatim in `extra_data`.
fn parse_intake(mut fields: HashMap<String, String>) -> NewApplication {
    let mut take = |key: &str| fields.remove(key).filter(|v| !v.is_empty());

    let languages_known = take("languagesKnown")
        .map(|raw| parse_string_list(&raw))
        .unwrap_or_default();
    let education_qualifications: Vec<EducationQualification> = take("educationQualifications")
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();
    let work_experience: Vec<WorkExperience> = take("workExperience")
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();
    let references: Vec<Reference> = take("references")
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();
    let social_media = take("socialMedia")
        .map(|raw| parse_social_media(&raw))
        .unwrap_or_default();

    let new = NewApplication {
        application_type: take("applicationType").map(|v| v.to_lowercase()),
        applying_for: take("applyingFor"),
        subject_or_department: take("subjectOrDepartment"),
        full_name: take("fullName"),
        father_name: take("fatherName"),
        father_occupation: take("fatherOccupation"),
        mother_name: take("motherName"),
        mother_occupation: take("motherOccupation"),
        date_of_birth: take("dateOfBirth").and_then(|raw| parse_date(&raw)),
        gender: take("gender"),
        blood_group: take("bloodGroup"),
        category: take("category"),
        religion: take("religion"),
        nationality: take("nationality"),
        region: take("region"),
        country_name: take("countryName"),
        languages_known,
        physical_disability: take("physicalDisability")
            .map(|v| {
                let v = v.to_lowercase();
                v == "true" || v == "on"
            })
            .unwrap_or(false),
        disability_percentage: take("disabilityPercentage")
            .and_then(|v| v.parse::<f64>().ok())
            .map(|p| p.clamp(0.0, 100.0)),
        marital_status: take("maritalStatus"),
        spouse_name: take("spouseName"),
        children: take("children")
            .and_then(|v| v.parse::<i32>().ok())
            .unwrap_or(0),
        address: take("address"),
        address_pincode: take("addressPincode"),
        permanent_address: take("permanentAddress"),
        permanent_address_pincode: take("permanentAddressPincode"),
        mobile_number: take("mobileNumber"),
        emergency_mobile_number: take("emergencyMobileNumber"),
        email: take("email"),
        area_of_interest: take("areaOfInterest"),
        experience_type: take("experienceType"),
        total_work_experience: take("totalWorkExperience")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0)
            .max(0.0),
        expected_salary: take("expectedSalary"),
        photo_link: None,
        resume_link: None,
        education_qualifications,
        work_experience,
        references,
        social_media,
        extra_data: fields
            .into_iter()
            .map(|(k, v)| (k, JsonValue::String(v)))
            .collect(),
    };
    new
}

fn parse_string_list(raw: &str) -> Vec<String> {
    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return list;
    }
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_social_media(raw: &str) -> SocialMedia {
    if let Ok(sm) = serde_json::from_str::<SocialMedia>(raw) {
        return sm;
    }
    // A bare string is taken as a LinkedIn profile link.
    SocialMedia {
        linkedin: Some(raw.to_string()),
        ..SocialMedia::default()
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Some(date);
    }
    raw.parse::<chrono::DateTime<chrono::Utc>>()
        .ok()
        .map(|dt| dt.date_naive())
}
