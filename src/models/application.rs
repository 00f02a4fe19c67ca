use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// One candidate's submitted record. Created once via intake and never
/// mutated afterwards; HR actions live in the ledger, not here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub application_type: Option<String>,
    pub applying_for: Option<String>,
    pub subject_or_department: Option<String>,
    pub full_name: Option<String>,
    pub father_name: Option<String>,
    pub father_occupation: Option<String>,
    pub mother_name: Option<String>,
    pub mother_occupation: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub category: Option<String>,
    pub religion: Option<String>,
    pub nationality: Option<String>,
    pub region: Option<String>,
    pub country_name: Option<String>,
    pub languages_known: Json<Vec<String>>,
    pub physical_disability: bool,
    pub disability_percentage: Option<f64>,
    pub marital_status: Option<String>,
    pub spouse_name: Option<String>,
    pub children: i32,
    pub address: Option<String>,
    pub address_pincode: Option<String>,
    pub permanent_address: Option<String>,
    pub permanent_address_pincode: Option<String>,
    pub mobile_number: Option<String>,
    pub emergency_mobile_number: Option<String>,
    pub email: Option<String>,
    pub area_of_interest: Option<String>,
    pub experience_type: Option<String>,
    /// Denormalized years of experience as entered by the candidate; not
    /// cross-checked against the work experience list.
    pub total_work_experience: f64,
    pub expected_salary: Option<String>,
    pub photo_link: Option<String>,
    pub resume_link: Option<String>,
    pub education_qualifications: Json<Vec<EducationQualification>>,
    pub work_experience: Json<Vec<WorkExperience>>,
    pub references: Json<Vec<Reference>>,
    pub social_media: Json<SocialMedia>,
    /// Unrecognized intake fields, kept verbatim so permissive filters have
    /// somewhere to look them up.
    pub extra_data: Json<JsonMap<String, JsonValue>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationQualification {
    pub level: Option<String>,
    pub exam_type: Option<String>,
    pub medium: Option<String>,
    pub subject: Option<String>,
    pub board_or_university: Option<String>,
    pub institution_name: Option<String>,
    pub year_of_passing: Option<i32>,
    pub percentage_or_cgpa: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub serial_no: Option<i32>,
    pub institution_name: Option<String>,
    pub designation: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub net_monthly_salary: Option<f64>,
    pub reason_of_leaving: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub name: Option<String>,
    pub designation: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialMedia {
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
}

/// Intake payload: everything an `Application` carries except the identity
/// the store assigns on insert.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplication {
    pub application_type: Option<String>,
    pub applying_for: Option<String>,
    pub subject_or_department: Option<String>,
    pub full_name: Option<String>,
    pub father_name: Option<String>,
    pub father_occupation: Option<String>,
    pub mother_name: Option<String>,
    pub mother_occupation: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub category: Option<String>,
    pub religion: Option<String>,
    pub nationality: Option<String>,
    pub region: Option<String>,
    pub country_name: Option<String>,
    pub languages_known: Vec<String>,
    pub physical_disability: bool,
    pub disability_percentage: Option<f64>,
    pub marital_status: Option<String>,
    pub spouse_name: Option<String>,
    pub children: i32,
    pub address: Option<String>,
    pub address_pincode: Option<String>,
    pub permanent_address: Option<String>,
    pub permanent_address_pincode: Option<String>,
    pub mobile_number: Option<String>,
    pub emergency_mobile_number: Option<String>,
    pub email: Option<String>,
    pub area_of_interest: Option<String>,
    pub experience_type: Option<String>,
    pub total_work_experience: f64,
    pub expected_salary: Option<String>,
    pub photo_link: Option<String>,
    pub resume_link: Option<String>,
    pub education_qualifications: Vec<EducationQualification>,
    pub work_experience: Vec<WorkExperience>,
    pub references: Vec<Reference>,
    pub social_media: SocialMedia,
    pub extra_data: JsonMap<String, JsonValue>,
}

impl Application {
    /// Materializes a stored record from an intake payload plus the identity
    /// the store assigned. Used by store backends that hold records in
    /// memory; the Postgres store does this in SQL.
    pub fn from_new(new: NewApplication, id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            application_type: new.application_type,
            applying_for: new.applying_for,
            subject_or_department: new.subject_or_department,
            full_name: new.full_name,
            father_name: new.father_name,
            father_occupation: new.father_occupation,
            mother_name: new.mother_name,
            mother_occupation: new.mother_occupation,
            date_of_birth: new.date_of_birth,
            gender: new.gender,
            blood_group: new.blood_group,
            category: new.category,
            religion: new.religion,
            nationality: new.nationality,
            region: new.region,
            country_name: new.country_name,
            languages_known: Json(new.languages_known),
            physical_disability: new.physical_disability,
            disability_percentage: new.disability_percentage,
            marital_status: new.marital_status,
            spouse_name: new.spouse_name,
            children: new.children,
            address: new.address,
            address_pincode: new.address_pincode,
            permanent_address: new.permanent_address,
            permanent_address_pincode: new.permanent_address_pincode,
            mobile_number: new.mobile_number,
            emergency_mobile_number: new.emergency_mobile_number,
            email: new.email,
            area_of_interest: new.area_of_interest,
            experience_type: new.experience_type,
            total_work_experience: new.total_work_experience,
            expected_salary: new.expected_salary,
            photo_link: new.photo_link,
            resume_link: new.resume_link,
            education_qualifications: Json(new.education_qualifications),
            work_experience: Json(new.work_experience),
            references: Json(new.references),
            social_media: Json(new.social_media),
            extra_data: Json(new.extra_data),
            created_at,
        }
    }

    /// Resolves a wire-form (camelCase) field name to the record's value in
    /// string form. Unknown names fall back to `extra_data`. Predicate
    /// evaluation and the SQL translation both key off these names.
    pub fn scalar_field(&self, name: &str) -> Option<String> {
        let owned;
        let value: &str = match name {
            "applicationType" => self.application_type.as_deref()?,
            "applyingFor" => self.applying_for.as_deref()?,
            "subjectOrDepartment" => self.subject_or_department.as_deref()?,
            "fullName" => self.full_name.as_deref()?,
            "fatherName" => self.father_name.as_deref()?,
            "fatherOccupation" => self.father_occupation.as_deref()?,
            "motherName" => self.mother_name.as_deref()?,
            "motherOccupation" => self.mother_occupation.as_deref()?,
            "gender" => self.gender.as_deref()?,
            "bloodGroup" => self.blood_group.as_deref()?,
            "category" => self.category.as_deref()?,
            "religion" => self.religion.as_deref()?,
            "nationality" => self.nationality.as_deref()?,
            "region" => self.region.as_deref()?,
            "countryName" => self.country_name.as_deref()?,
            "maritalStatus" => self.marital_status.as_deref()?,
            "spouseName" => self.spouse_name.as_deref()?,
            "address" => self.address.as_deref()?,
            "addressPincode" => self.address_pincode.as_deref()?,
            "permanentAddress" => self.permanent_address.as_deref()?,
            "permanentAddressPincode" => self.permanent_address_pincode.as_deref()?,
            "mobileNumber" => self.mobile_number.as_deref()?,
            "emergencyMobileNumber" => self.emergency_mobile_number.as_deref()?,
            "email" => self.email.as_deref()?,
            "areaOfInterest" => self.area_of_interest.as_deref()?,
            "experienceType" => self.experience_type.as_deref()?,
            "expectedSalary" => self.expected_salary.as_deref()?,
            "photoLink" => self.photo_link.as_deref()?,
            "resumeLink" => self.resume_link.as_deref()?,
            "dateOfBirth" => {
                owned = self.date_of_birth?.to_string();
                &owned
            }
            "physicalDisability" => {
                owned = self.physical_disability.to_string();
                &owned
            }
            "disabilityPercentage" => {
                owned = format_number(self.disability_percentage?);
                &owned
            }
            "children" => {
                owned = self.children.to_string();
                &owned
            }
            "totalWorkExperience" => {
                owned = format_number(self.total_work_experience);
                &owned
            }
            other => match self.extra_data.get(other) {
                Some(JsonValue::String(s)) => s.as_str(),
                Some(v) => {
                    owned = v.to_string();
                    &owned
                }
                None => return None,
            },
        };
        Some(value.to_string())
    }
}

/// Integral floats print without the trailing `.0` so they compare equal to
/// the text form query values arrive in.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
