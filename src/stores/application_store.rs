use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::error::Result;
use crate::models::application::{Application, NewApplication};
use crate::query::predicate::{Clause, Predicate, TextTarget};

/// Persistence seam for application records. The fixed sort everywhere is
/// newest first (created_at desc).
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, new: NewApplication) -> Result<Application>;
    /// Predicate-based fetch; `limit: None` means unbounded (export path).
    async fn find(
        &self,
        predicate: &Predicate,
        skip: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Application>>;
    async fn count(&self, predicate: &Predicate) -> Result<i64>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>>;
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Application>>;
    async fn counts_by_applying_for(&self) -> Result<Vec<(String, i64)>>;
    /// Keeps the earliest record of each (fullName, mobileNumber) pair and
    /// deletes the rest. Returns how many rows went away.
    async fn delete_duplicates(&self) -> Result<u64>;
}

#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, new: NewApplication) -> Result<Application> {
        let app = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications (
                application_type, applying_for, subject_or_department,
                full_name, father_name, father_occupation, mother_name, mother_occupation,
                date_of_birth, gender, blood_group, category, religion, nationality,
                region, country_name, languages_known, physical_disability,
                disability_percentage, marital_status, spouse_name, children,
                address, address_pincode, permanent_address, permanent_address_pincode,
                mobile_number, emergency_mobile_number, email, area_of_interest,
                experience_type, total_work_experience, expected_salary,
                photo_link, resume_link, education_qualifications, work_experience,
                "references", social_media, extra_data
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20,
                $21, $22, $23, $24, $25, $26, $27, $28, $29, $30,
                $31, $32, $33, $34, $35, $36, $37, $38, $39, $40
            )
            RETURNING *
            "#,
        )
        .bind(new.application_type)
        .bind(new.applying_for)
        .bind(new.subject_or_department)
        .bind(new.full_name)
        .bind(new.father_name)
        .bind(new.father_occupation)
        .bind(new.mother_name)
        .bind(new.mother_occupation)
        .bind(new.date_of_birth)
        .bind(new.gender)
        .bind(new.blood_group)
        .bind(new.category)
        .bind(new.religion)
        .bind(new.nationality)
        .bind(new.region)
        .bind(new.country_name)
        .bind(Json(new.languages_known))
        .bind(new.physical_disability)
        .bind(new.disability_percentage)
        .bind(new.marital_status)
        .bind(new.spouse_name)
        .bind(new.children)
        .bind(new.address)
        .bind(new.address_pincode)
        .bind(new.permanent_address)
        .bind(new.permanent_address_pincode)
        .bind(new.mobile_number)
        .bind(new.emergency_mobile_number)
        .bind(new.email)
        .bind(new.area_of_interest)
        .bind(new.experience_type)
        .bind(new.total_work_experience)
        .bind(new.expected_salary)
        .bind(new.photo_link)
        .bind(new.resume_link)
        .bind(Json(new.education_qualifications))
        .bind(Json(new.work_experience))
        .bind(Json(new.references))
        .bind(Json(new.social_media))
        .bind(Json(new.extra_data))
        .fetch_one(&self.pool)
        .await?;
        Ok(app)
    }

    async fn find(
        &self,
        predicate: &Predicate,
        skip: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Application>> {
        let mut qb = QueryBuilder::new("SELECT * FROM applications");
        push_where(&mut qb, predicate);
        qb.push(" ORDER BY created_at DESC, id DESC");
        qb.push(" OFFSET ");
        qb.push_bind(skip);
        if let Some(limit) = limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }
        let rows = qb
            .build_query_as::<Application>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count(&self, predicate: &Predicate) -> Result<i64> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM applications");
        push_where(&mut qb, predicate);
        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Application>> {
        let app = sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(app)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Application>> {
        let rows = sqlx::query_as::<_, Application>(
            "SELECT * FROM applications WHERE id = ANY($1) ORDER BY created_at DESC, id DESC",
        )
        .bind(ids.to_vec())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn counts_by_applying_for(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query(
            r#"
            SELECT COALESCE(applying_for, '') AS applying_for, COUNT(*) AS count
            FROM applications
            GROUP BY applying_for
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.get("applying_for"), row.get("count")))
            .collect())
    }

    async fn delete_duplicates(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM applications a
            USING applications b
            WHERE a.full_name IS NOT DISTINCT FROM b.full_name
              AND a.mobile_number IS NOT DISTINCT FROM b.mobile_number
              AND (a.created_at > b.created_at
                   OR (a.created_at = b.created_at AND a.id > b.id))
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

/// Maps a wire-form field name to its column. Names outside this table are
/// the permissive passthrough keys and get looked up in `extra_data`.
fn column_for(field: &str) -> Option<&'static str> {
    Some(match field {
        "applicationType" => "application_type",
        "applyingFor" => "applying_for",
        "subjectOrDepartment" => "subject_or_department",
        "fullName" => "full_name",
        "fatherName" => "father_name",
        "fatherOccupation" => "father_occupation",
        "motherName" => "mother_name",
        "motherOccupation" => "mother_occupation",
        "dateOfBirth" => "date_of_birth",
        "gender" => "gender",
        "bloodGroup" => "blood_group",
        "category" => "category",
        "religion" => "religion",
        "nationality" => "nationality",
        "region" => "region",
        "countryName" => "country_name",
        "physicalDisability" => "physical_disability",
        "disabilityPercentage" => "disability_percentage",
        "maritalStatus" => "marital_status",
        "spouseName" => "spouse_name",
        "children" => "children",
        "address" => "address",
        "addressPincode" => "address_pincode",
        "permanentAddress" => "permanent_address",
        "permanentAddressPincode" => "permanent_address_pincode",
        "mobileNumber" => "mobile_number",
        "emergencyMobileNumber" => "emergency_mobile_number",
        "email" => "email",
        "areaOfInterest" => "area_of_interest",
        "experienceType" => "experience_type",
        "totalWorkExperience" => "total_work_experience",
        "expectedSalary" => "expected_salary",
        "photoLink" => "photo_link",
        "resumeLink" => "resume_link",
        _ => return None,
    })
}

fn nested_column(list: &str) -> Option<&'static str> {
    Some(match list {
        "educationQualifications" => "education_qualifications",
        "workExperience" => "work_experience",
        "references" => "\"references\"",
        _ => return None,
    })
}

/// Escapes LIKE metacharacters and wraps the value for a substring match.
/// Every ILIKE below uses `ESCAPE '\'` to match.
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Translates the predicate into a WHERE clause. Must agree with
/// [`Predicate::matches`], which is the reference semantics.
fn push_where(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    if predicate.is_empty() {
        return;
    }
    qb.push(" WHERE ");
    for (i, clause) in predicate.clauses.iter().enumerate() {
        if i > 0 {
            qb.push(" AND ");
        }
        push_clause(qb, clause);
    }
}

fn push_clause(qb: &mut QueryBuilder<'_, Postgres>, clause: &Clause) {
    match clause {
        Clause::Eq { field, value } => match column_for(field) {
            Some(col) => {
                qb.push(format!("{col}::text = "));
                qb.push_bind(value.clone());
            }
            None => {
                qb.push("extra_data ->> ");
                qb.push_bind(field.clone());
                qb.push(" = ");
                qb.push_bind(value.clone());
            }
        },
        Clause::Contains { field, value } => match column_for(field) {
            Some(col) => {
                qb.push(format!("{col} ILIKE "));
                qb.push_bind(like_pattern(value));
                qb.push(" ESCAPE '\\'");
            }
            None => {
                qb.push("extra_data ->> ");
                qb.push_bind(field.clone());
                qb.push(" ILIKE ");
                qb.push_bind(like_pattern(value));
                qb.push(" ESCAPE '\\'");
            }
        },
        Clause::Range { field, min, max } => {
            let col = column_for(field).unwrap_or("total_work_experience");
            qb.push("(");
            let mut first = true;
            if let Some(min) = min {
                qb.push(format!("{col} >= "));
                qb.push_bind(*min);
                first = false;
            }
            if let Some(max) = max {
                if !first {
                    qb.push(" AND ");
                }
                qb.push(format!("{col} <= "));
                qb.push_bind(*max);
                first = false;
            }
            if first {
                // Both bounds were dropped by the compiler; nothing to
                // restrict.
                qb.push("TRUE");
            }
            qb.push(")");
        }
        Clause::AnyContains { needle, targets } => {
            qb.push("(");
            for (i, target) in targets.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                match target {
                    TextTarget::Scalar(field) => {
                        let col = column_for(field).unwrap_or("full_name");
                        qb.push(format!("{col} ILIKE "));
                        qb.push_bind(like_pattern(needle));
                        qb.push(" ESCAPE '\\'");
                    }
                    TextTarget::Nested { list, field } => {
                        let col = nested_column(list).unwrap_or("education_qualifications");
                        qb.push(format!(
                            "EXISTS (SELECT 1 FROM jsonb_array_elements({col}) AS elem WHERE elem ->> "
                        ));
                        qb.push_bind(*field);
                        qb.push(" ILIKE ");
                        qb.push_bind(like_pattern(needle));
                        qb.push(" ESCAPE '\\')");
                    }
                }
            }
            qb.push(")");
        }
    }
}
