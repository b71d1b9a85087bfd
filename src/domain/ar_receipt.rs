//! AR Receipt Context
//!
//! 应收款收据及其核销明细

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::audit::Audit;
use super::entity::{
    require, validate_nested, DocumentPayload, Entity, FieldError, FieldKind, Fields, FilterSpec,
    LineSet, ParentKey, Payload, Writable,
};

/// 应收款收据
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ArReceipt {
    pub id: Uuid,
    pub location_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub doc_number: Option<i64>,
    pub doc_date: Option<NaiveDate>,
    pub posted_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub note: Option<String>,
    pub status_id: Option<i64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ArReceiptDetail>>,
}

impl Entity for ArReceipt {
    type Id = Uuid;

    const TABLE: &'static str = "ar_receipt";
    const LABEL: &'static str = "AR receipt";
    const LABEL_PLURAL: &'static str = "AR receipts";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("customer_id", FieldKind::Int),
        FilterSpec::eq("status_id", FieldKind::Int),
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Writable for ArReceipt {
    type Payload = ArReceiptPayload;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArReceiptPayload {
    pub location_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub doc_number: Option<i64>,
    pub doc_date: Option<NaiveDate>,
    pub posted_date: Option<NaiveDate>,
    pub total_amount: Option<f64>,
    pub note: Option<String>,
    pub status_id: Option<i64>,
    #[serde(default)]
    pub details: Vec<ArReceiptDetailPayload>,
}

impl Payload for ArReceiptPayload {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "customer_id", self.customer_id.is_some());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn fields(&self) -> Fields {
        vec![
            ("location_id", self.location_id.into()),
            ("customer_id", self.customer_id.into()),
            ("payment_method_id", self.payment_method_id.into()),
            ("doc_number", self.doc_number.into()),
            ("doc_date", self.doc_date.into()),
            ("posted_date", self.posted_date.into()),
            ("total_amount", self.total_amount.into()),
            ("note", self.note.clone().into()),
            ("status_id", self.status_id.into()),
        ]
    }
}

impl DocumentPayload for ArReceiptPayload {
    fn validate_lines(&self) -> Result<(), Vec<FieldError>> {
        let errors = validate_nested("details", "ar_receipt_id", &self.details);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn lines(&self) -> Vec<LineSet> {
        vec![LineSet::from_payloads::<ArReceiptDetail>(
            "ar_receipt_id",
            &self.details,
        )]
    }
}

/// 收据明细：对某张销售单的收款金额
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ArReceiptDetail {
    pub id: i64,
    pub ar_receipt_id: Option<Uuid>,
    pub sales_order_id: Option<Uuid>,
    pub receipt_amount: Option<f64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Entity for ArReceiptDetail {
    type Id = i64;

    const TABLE: &'static str = "ar_receipt_detail";
    const LABEL: &'static str = "AR receipt detail";
    const LABEL_PLURAL: &'static str = "AR receipt details";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("ar_receipt_id", FieldKind::Uuid),
        FilterSpec::eq("sales_order_id", FieldKind::Uuid),
    ];
    const PARENT: Option<ParentKey> = Some(ParentKey {
        column: "ar_receipt_id",
        kind: FieldKind::Uuid,
        label: "AR receipt",
    });

    fn id(&self) -> i64 {
        self.id
    }
}

impl Writable for ArReceiptDetail {
    type Payload = ArReceiptDetailPayload;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArReceiptDetailPayload {
    pub ar_receipt_id: Option<Uuid>,
    pub sales_order_id: Option<Uuid>,
    pub receipt_amount: Option<f64>,
}

impl Payload for ArReceiptDetailPayload {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "ar_receipt_id", self.ar_receipt_id.is_some());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn fields(&self) -> Fields {
        vec![
            ("ar_receipt_id", self.ar_receipt_id.into()),
            ("sales_order_id", self.sales_order_id.into()),
            ("receipt_amount", self.receipt_amount.into()),
        ]
    }
}
