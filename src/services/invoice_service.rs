use chrono::Utc;
use sea_orm::entity::prelude::{DateTimeWithTimeZone, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::dao::{DaoResult, FailedInvoiceDao, InvoiceDao, InvoiceEntity, SuccessInvoiceDao},
    db::entities::{
        invoice::{InvoiceKind, InvoiceRecord},
        invoice_failed,
    },
    error::AppError,
};

pub const DEFAULT_SKIP: u64 = 0;
pub const DEFAULT_LIMIT: u64 = 100;

/// One failed processing step, as recorded by the upload pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub step: String,
    pub error_type: String,
    #[serde(default)]
    pub field_name: Option<String>,
    pub error_message: String,
    #[serde(default)]
    pub expected_format: Option<String>,
    #[serde(default)]
    pub actual_value: Option<String>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

/// Decodes `processing_steps_error`. Older rows hold the list as a JSON
/// string; anything that does not decode to a list of details is dropped.
pub fn parse_error_details(raw: Option<&Json>) -> Option<Vec<ErrorDetail>> {
    let value = match raw? {
        Json::Null => return None,
        Json::String(text) => match serde_json::from_str::<Json>(text) {
            Ok(value) => value,
            Err(err) => {
                tracing::debug!(error = %err, "processing_steps_error is not valid JSON");
                return None;
            }
        },
        value => value.clone(),
    };

    match serde_json::from_value(value) {
        Ok(details) => Some(details),
        Err(err) => {
            tracing::debug!(error = %err, "processing_steps_error has unexpected shape");
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceCounts {
    pub successful: u64,
    pub failed: u64,
    pub deleted: u64,
    pub total: u64,
    pub processing: u64,
}

/// List entry for live invoices. File paths already prefer blob storage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceView {
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
    pub processing_steps_error: Option<Vec<ErrorDetail>>,
    pub blob_xml_path: Option<String>,
    pub blob_edi_path: Option<String>,
    pub request_type: String,
}

impl From<InvoiceRecord> for InvoiceView {
    fn from(record: InvoiceRecord) -> Self {
        let xml_path = record.effective_xml_path().map(str::to_string);
        let edi_path = record.effective_edi_path().map(str::to_string);
        let processing_steps_error = parse_error_details(record.processing_steps_error.as_ref());
        Self {
            id: record.id,
            tracking_id: record.tracking_id,
            user_id: record.user_id,
            uploaded_at: record.uploaded_at,
            xml_path,
            xml_validation_pass: record.xml_validation_pass,
            xml_convert_message: record.xml_convert_message,
            edi_path,
            edi_convert_pass: record.edi_convert_pass,
            edi_convert_message: record.edi_convert_message,
            processing_steps_error,
            blob_xml_path: record.blob_xml_path,
            blob_edi_path: record.blob_edi_path,
            request_type: record.request_type,
        }
    }
}

/// Trash-bin entry shared by both tables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedInvoice {
    pub id: i32,
    pub filename: String,
    pub status: InvoiceKind,
    pub accepted: u32,
    pub rejected: u32,
    pub uploaded_at: DateTimeWithTimeZone,
    pub tracking_id: Uuid,
    pub xml_validation_pass: bool,
    pub xml_convert_message: Option<String>,
    pub edi_convert_pass: bool,
    pub edi_convert_message: Option<String>,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

impl From<InvoiceRecord> for DeletedInvoice {
    fn from(record: InvoiceRecord) -> Self {
        let (accepted, rejected) = match record.kind {
            InvoiceKind::Success => (1, 0),
            InvoiceKind::Failed => (0, 1),
        };
        Self {
            id: record.id,
            filename: format!("{}_invoice.xml", record.tracking_id),
            status: record.kind,
            accepted,
            rejected,
            uploaded_at: record.uploaded_at,
            tracking_id: record.tracking_id,
            xml_validation_pass: record.xml_validation_pass,
            xml_convert_message: record.xml_convert_message,
            edi_convert_pass: record.edi_convert_pass,
            edi_convert_message: record.edi_convert_message,
            deleted_at: record.deleted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceAction {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Clone)]
pub struct InvoiceService {
    success: SuccessInvoiceDao,
    failed: FailedInvoiceDao,
}

async fn list_records<E: InvoiceEntity>(
    dao: &InvoiceDao<E>,
    user_id: i32,
    skip: u64,
    limit: u64,
    deleted: bool,
) -> DaoResult<Vec<InvoiceRecord>> {
    let page = if deleted {
        dao.list_deleted(user_id, skip, limit).await?
    } else {
        dao.list_active(user_id, skip, limit).await?
    };
    Ok(page.data.into_iter().map(E::into_record).collect())
}

impl InvoiceService {
    pub fn new(success: SuccessInvoiceDao, failed: FailedInvoiceDao) -> Self {
        Self { success, failed }
    }

    pub async fn counts(&self, user_id: i32) -> Result<InvoiceCounts, AppError> {
        let successful = self.success.count_active(user_id).await?;
        let failed = self.failed.count_active(user_id).await?;
        let deleted =
            self.failed.count_deleted(user_id).await? + self.success.count_deleted(user_id).await?;

        tracing::debug!(user_id, successful, failed, deleted, "invoice counts");
        Ok(InvoiceCounts {
            successful,
            failed,
            deleted,
            total: successful + failed,
            processing: 0,
        })
    }

    pub async fn list_success(
        &self,
        user_id: i32,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<InvoiceView>, AppError> {
        let records = list_records(&self.success, user_id, skip, limit, false).await?;
        Ok(records.into_iter().map(InvoiceView::from).collect())
    }

    pub async fn list_failed(
        &self,
        user_id: i32,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<InvoiceView>, AppError> {
        let records = list_records(&self.failed, user_id, skip, limit, false).await?;
        Ok(records.into_iter().map(InvoiceView::from).collect())
    }

    pub async fn failed_by_tracking_id(
        &self,
        user_id: i32,
        tracking_id: &str,
    ) -> Result<InvoiceView, AppError> {
        let tracking_id = Uuid::parse_str(tracking_id.trim())
            .map_err(|_| AppError::bad_request("Invalid tracking ID format"))?;

        let model = self
            .failed
            .find_active_by_tracking_id(user_id, tracking_id)
            .await?
            .ok_or_else(|| AppError::not_found("Failed invoice not found"))?;
        Ok(InvoiceView::from(invoice_failed::Entity::into_record(model)))
    }

    /// Deleted rows of both tables, most recently deleted first. `skip` and
    /// `limit` page each table independently before the merge.
    pub async fn list_deleted(
        &self,
        user_id: i32,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<DeletedInvoice>, AppError> {
        let mut records = list_records(&self.success, user_id, skip, limit, true).await?;
        records.extend(list_records(&self.failed, user_id, skip, limit, true).await?);
        records.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        Ok(records.into_iter().map(DeletedInvoice::from).collect())
    }

    pub async fn delete(&self, user_id: i32, invoice_id: i32) -> Result<InvoiceAction, AppError> {
        let now = Utc::now().fixed_offset();
        let kind = if self.success.mark_deleted(invoice_id, user_id, now).await? {
            InvoiceKind::Success
        } else if self.failed.mark_deleted(invoice_id, user_id, now).await? {
            InvoiceKind::Failed
        } else {
            tracing::warn!(invoice_id, user_id, "invoice not found or already deleted");
            return Err(AppError::not_found("Invoice not found or already deleted"));
        };

        tracing::info!(invoice_id, user_id, table = kind.as_str(), "invoice soft-deleted");
        Ok(InvoiceAction {
            success: true,
            message: "Invoice deleted successfully",
        })
    }

    pub async fn restore(&self, user_id: i32, invoice_id: i32) -> Result<InvoiceAction, AppError> {
        let kind = if self.success.restore(invoice_id, user_id).await? {
            InvoiceKind::Success
        } else if self.failed.restore(invoice_id, user_id).await? {
            InvoiceKind::Failed
        } else {
            tracing::warn!(invoice_id, user_id, "invoice not found or not deleted");
            return Err(AppError::not_found("Invoice not found or not deleted"));
        };

        tracing::info!(invoice_id, user_id, table = kind.as_str(), "invoice restored");
        Ok(InvoiceAction {
            success: true,
            message: "Invoice restored successfully",
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ErrorDetail, parse_error_details};

    fn detail() -> ErrorDetail {
        ErrorDetail {
            step: "XML_VALIDATION".to_string(),
            error_type: "VALIDATION_ERROR".to_string(),
            field_name: Some("InvoiceNumber".to_string()),
            error_message: "missing element".to_string(),
            expected_format: None,
            actual_value: None,
            suggestions: None,
        }
    }

    #[test]
    fn parses_structured_and_string_encoded_details() {
        let structured = json!([{
            "step": "XML_VALIDATION",
            "error_type": "VALIDATION_ERROR",
            "field_name": "InvoiceNumber",
            "error_message": "missing element"
        }]);
        assert_eq!(parse_error_details(Some(&structured)), Some(vec![detail()]));

        let encoded = json!(structured.to_string());
        assert_eq!(parse_error_details(Some(&encoded)), Some(vec![detail()]));
    }

    #[test]
    fn undecodable_details_become_none() {
        assert_eq!(parse_error_details(None), None);
        assert_eq!(parse_error_details(Some(&json!(null))), None);
        assert_eq!(parse_error_details(Some(&json!("{not json"))), None);
        assert_eq!(parse_error_details(Some(&json!({"step": 3}))), None);
    }
}
