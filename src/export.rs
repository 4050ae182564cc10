use crate::errors::AppError;
use crate::models::Lead;
use rust_xlsxwriter::Workbook;

/// Column order is part of the export contract; consumers key on it.
pub const EXPORT_COLUMNS: [&str; 12] = [
    "Full Name",
    "LinkedIn URL",
    "Headline",
    "Company",
    "Job Title",
    "Location",
    "Industry",
    "Interaction Type",
    "Liked",
    "Commented",
    "Comment Count",
    "Enriched",
];

fn text_fields(lead: &Lead) -> [&str; 8] {
    [
        lead.full_name.as_deref().unwrap_or(""),
        &lead.profile_url,
        lead.headline.as_deref().unwrap_or(""),
        lead.company.as_deref().unwrap_or(""),
        lead.job_title.as_deref().unwrap_or(""),
        lead.location.as_deref().unwrap_or(""),
        lead.industry.as_deref().unwrap_or(""),
        &lead.interaction_type,
    ]
}

/// Renders a post's leads as CSV, header first, one row per lead.
pub fn leads_to_csv(leads: &[Lead]) -> Result<Vec<u8>, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_COLUMNS)
        .map_err(|e| AppError::InternalError(format!("CSV write failed: {}", e)))?;

    for lead in leads {
        let mut record: Vec<String> = text_fields(lead).iter().map(|s| s.to_string()).collect();
        record.push(lead.liked.to_string());
        record.push(lead.commented.to_string());
        record.push(lead.comment_count.to_string());
        record.push(lead.enriched.to_string());
        writer
            .write_record(&record)
            .map_err(|e| AppError::InternalError(format!("CSV write failed: {}", e)))?;
    }

    writer
        .into_inner()
        .map_err(|e| AppError::InternalError(format!("CSV write failed: {}", e)))
}

/// Renders a post's leads as an xlsx workbook with a single "Leads" sheet,
/// same columns as the CSV export.
pub fn leads_to_xlsx(leads: &[Lead]) -> Result<Vec<u8>, AppError> {
    let xlsx_err = |e: rust_xlsxwriter::XlsxError| {
        AppError::InternalError(format!("Excel write failed: {}", e))
    };

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Leads").map_err(xlsx_err)?;

    for (col, header) in EXPORT_COLUMNS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(xlsx_err)?;
    }

    for (idx, lead) in leads.iter().enumerate() {
        let row = (idx + 1) as u32;
        for (col, value) in text_fields(lead).iter().enumerate() {
            worksheet
                .write_string(row, col as u16, *value)
                .map_err(xlsx_err)?;
        }
        worksheet.write_boolean(row, 8, lead.liked).map_err(xlsx_err)?;
        worksheet
            .write_boolean(row, 9, lead.commented)
            .map_err(xlsx_err)?;
        worksheet
            .write_number(row, 10, lead.comment_count as f64)
            .map_err(xlsx_err)?;
        worksheet
            .write_boolean(row, 11, lead.enriched)
            .map_err(xlsx_err)?;
    }

    workbook.save_to_buffer().map_err(xlsx_err)
}
