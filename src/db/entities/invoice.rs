use sea_orm::entity::prelude::{DateTimeWithTimeZone, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which table an invoice row lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceKind {
    Success,
    Failed,
}

impl InvoiceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            InvoiceKind::Success => "success",
            InvoiceKind::Failed => "failed",
        }
    }
}

/// Table-independent view of an invoice row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceRecord {
    #[serde(skip)]
    pub kind: InvoiceKind,
    pub id: i32,
    pub tracking_id: Uuid,
    pub user_id: i32,
    pub uploaded_at: DateTimeWithTimeZone,
    pub xml_path: Option<String>,
    pub xml_validation_pass: bool,
    pub xml_convert_message: Option<String>,
    pub edi_path: Option<String>,
    pub edi_convert_pass: bool,
    pub edi_convert_message: Option<String>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub processing_steps_error: Option<Json>,
    pub blob_xml_path: Option<String>,
    pub blob_edi_path: Option<String>,
    pub request_type: String,
}

impl InvoiceRecord {
    /// Blob storage paths win over local upload paths.
    pub fn effective_xml_path(&self) -> Option<&str> {
        self.blob_xml_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .or(self.xml_path.as_deref())
    }

    pub fn effective_edi_path(&self) -> Option<&str> {
        self.blob_edi_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .or(self.edi_path.as_deref())
    }
}
