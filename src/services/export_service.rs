use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};

use crate::dto::application_dto::AnnotatedApplication;
use crate::error::Result;

/// Renders an already-resolved, status-annotated record set to XLSX. Pure
/// consumer: no querying, no status derivation of its own.
pub struct ExportService;

const APPLICATION_COLUMNS: [(&str, f64); 32] = [
    ("Full Name", 24.0),
    ("Father Name", 20.0),
    ("Mother Name", 20.0),
    ("DOB", 16.0),
    ("Gender", 10.0),
    ("Blood Group", 12.0),
    ("Category", 12.0),
    ("Religion", 14.0),
    ("Nationality", 14.0),
    ("Region/State", 16.0),
    ("Country", 16.0),
    ("Email", 28.0),
    ("Mobile", 16.0),
    ("Emergency Mobile", 18.0),
    ("Address", 30.0),
    ("Address Pincode", 14.0),
    ("Permanent Address", 30.0),
    ("Permanent Pincode", 16.0),
    ("Applying For", 18.0),
    ("Application Type", 14.0),
    ("Subject/Department", 22.0),
    ("Area Of Interest", 20.0),
    ("Experience Type", 14.0),
    ("Experience (yrs)", 18.0),
    ("Expected Salary", 18.0),
    ("Languages Known", 22.0),
    ("LinkedIn", 28.0),
    ("Facebook", 28.0),
    ("Instagram", 28.0),
    ("Status", 14.0),
    ("Status Updated At", 22.0),
    ("Applied On", 20.0),
];

impl ExportService {
    /// One Applications sheet of scalar columns plus Education /
    /// WorkExperience / References detail sheets keyed by application id.
    pub fn generate_applications_xlsx(rows: &[AnnotatedApplication]) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();

        let header_format = Format::new()
            .set_bold()
            .set_background_color(Color::RGB(0x0F172A))
            .set_font_color(Color::White);

        Self::write_applications_sheet(&mut workbook, &header_format, rows)?;
        Self::write_education_sheet(&mut workbook, &header_format, rows)?;
        Self::write_work_experience_sheet(&mut workbook, &header_format, rows)?;
        Self::write_references_sheet(&mut workbook, &header_format, rows)?;

        let buffer = workbook.save_to_buffer()?;
        Ok(buffer)
    }

    fn write_applications_sheet(
        workbook: &mut Workbook,
        header_format: &Format,
        rows: &[AnnotatedApplication],
    ) -> Result<()> {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Applications")?;

        for (col, (header, width)) in APPLICATION_COLUMNS.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
            worksheet.write_string_with_format(0, col as u16, *header, header_format)?;
        }

        for (i, row) in rows.iter().enumerate() {
            let r = (i + 1) as u32;
            let app = &row.application;
            let cells = [
                opt(&app.full_name),
                opt(&app.father_name),
                opt(&app.mother_name),
                app.date_of_birth.map(|d| d.to_string()).unwrap_or_default(),
                opt(&app.gender),
                opt(&app.blood_group),
                opt(&app.category),
                opt(&app.religion),
                opt(&app.nationality),
                opt(&app.region),
                opt(&app.country_name),
                opt(&app.email),
                opt(&app.mobile_number),
                opt(&app.emergency_mobile_number),
                opt(&app.address),
                opt(&app.address_pincode),
                opt(&app.permanent_address),
                opt(&app.permanent_address_pincode),
                opt(&app.applying_for),
                opt(&app.application_type),
                opt(&app.subject_or_department),
                opt(&app.area_of_interest),
                opt(&app.experience_type),
                app.total_work_experience.to_string(),
                opt(&app.expected_salary),
                app.languages_known.join(", "),
                opt(&app.social_media.linkedin),
                opt(&app.social_media.facebook),
                opt(&app.social_media.instagram),
                row.status.as_str().to_string(),
                row.status_updated_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_default(),
                app.created_at.to_rfc3339(),
            ];
            for (col, cell) in cells.iter().enumerate() {
                worksheet.write_string(r, col as u16, cell)?;
            }
        }
        Ok(())
    }

    fn write_education_sheet(
        workbook: &mut Workbook,
        header_format: &Format,
        rows: &[AnnotatedApplication],
    ) -> Result<()> {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Education")?;
        let headers = [
            ("App ID", 36.0),
            ("Level", 16.0),
            ("Exam Type", 14.0),
            ("Medium", 12.0),
            ("Subject", 22.0),
            ("Board/University", 26.0),
            ("Institution", 26.0),
            ("Year", 10.0),
            ("% / CGPA", 12.0),
        ];
        write_headers(worksheet, header_format, &headers)?;

        let mut r = 1u32;
        for row in rows {
            for e in row.application.education_qualifications.iter() {
                worksheet.write_string(r, 0, row.application.id.to_string())?;
                worksheet.write_string(r, 1, e.level.as_deref().unwrap_or(""))?;
                worksheet.write_string(r, 2, e.exam_type.as_deref().unwrap_or(""))?;
                worksheet.write_string(r, 3, e.medium.as_deref().unwrap_or(""))?;
                worksheet.write_string(r, 4, e.subject.as_deref().unwrap_or(""))?;
                worksheet.write_string(r, 5, e.board_or_university.as_deref().unwrap_or(""))?;
                worksheet.write_string(r, 6, e.institution_name.as_deref().unwrap_or(""))?;
                if let Some(year) = e.year_of_passing {
                    worksheet.write_number(r, 7, year as f64)?;
                }
                worksheet.write_string(r, 8, e.percentage_or_cgpa.as_deref().unwrap_or(""))?;
                r += 1;
            }
        }
        Ok(())
    }

    fn write_work_experience_sheet(
        workbook: &mut Workbook,
        header_format: &Format,
        rows: &[AnnotatedApplication],
    ) -> Result<()> {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("WorkExperience")?;
        let headers = [
            ("App ID", 36.0),
            ("S.No", 8.0),
            ("Company/Institution", 26.0),
            ("Designation", 22.0),
            ("Start Date", 16.0),
            ("End Date", 16.0),
            ("Net Monthly Salary", 18.0),
            ("Reason of Leaving", 22.0),
        ];
        write_headers(worksheet, header_format, &headers)?;

        let mut r = 1u32;
        for row in rows {
            for w in row.application.work_experience.iter() {
                worksheet.write_string(r, 0, row.application.id.to_string())?;
                if let Some(serial) = w.serial_no {
                    worksheet.write_number(r, 1, serial as f64)?;
                }
                worksheet.write_string(r, 2, w.institution_name.as_deref().unwrap_or(""))?;
                worksheet.write_string(r, 3, w.designation.as_deref().unwrap_or(""))?;
                worksheet.write_string(
                    r,
                    4,
                    &w.start_date.map(|d| d.to_string()).unwrap_or_default(),
                )?;
                // An open-ended engagement exports as "Present".
                worksheet.write_string(
                    r,
                    5,
                    &w.end_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "Present".to_string()),
                )?;
                if let Some(salary) = w.net_monthly_salary {
                    worksheet.write_number(r, 6, salary)?;
                }
                worksheet.write_string(r, 7, w.reason_of_leaving.as_deref().unwrap_or(""))?;
                r += 1;
            }
        }
        Ok(())
    }

    fn write_references_sheet(
        workbook: &mut Workbook,
        header_format: &Format,
        rows: &[AnnotatedApplication],
    ) -> Result<()> {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("References")?;
        let headers = [
            ("App ID", 36.0),
            ("Name", 22.0),
            ("Designation", 22.0),
            ("Contact", 20.0),
        ];
        write_headers(worksheet, header_format, &headers)?;

        let mut r = 1u32;
        for row in rows {
            for reference in row.application.references.iter() {
                worksheet.write_string(r, 0, row.application.id.to_string())?;
                worksheet.write_string(r, 1, reference.name.as_deref().unwrap_or(""))?;
                worksheet.write_string(r, 2, reference.designation.as_deref().unwrap_or(""))?;
                worksheet.write_string(r, 3, reference.contact.as_deref().unwrap_or(""))?;
                r += 1;
            }
        }
        Ok(())
    }
}

fn write_headers(
    worksheet: &mut Worksheet,
    header_format: &Format,
    headers: &[(&str, f64)],
) -> Result<()> {
    for (col, (header, width)) in headers.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
        worksheet.write_string_with_format(0, col as u16, *header, header_format)?;
    }
    Ok(())
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}
