//! Treatment Context
//!
//! 疗程记录及其耗材明细

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::audit::Audit;
use super::entity::{
    non_negative, require, validate_nested, DocumentPayload, Entity, FieldError, FieldKind,
    Fields, FilterSpec, LineSet, ParentKey, Payload, Writable,
};

/// 疗程
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Treatment {
    pub id: Uuid,
    pub location_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub sales_order_id: Option<Uuid>,
    pub sales_order_detail_id: Option<i64>,
    pub sales_order_service_id: Option<i64>,
    pub service_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub nurse_id: Option<i64>,
    pub beautician_id: Option<i64>,
    pub doc_number: Option<String>,
    pub doc_date: Option<NaiveDate>,
    pub posted_date: Option<NaiveDate>,
    pub service_text: Option<String>,
    pub note: Option<String>,
    pub status_id: Option<i64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<TreatmentDetail>>,
}

impl Entity for Treatment {
    type Id = Uuid;

    const TABLE: &'static str = "treatment";
    const LABEL: &'static str = "treatment";
    const LABEL_PLURAL: &'static str = "treatments";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("status_id", FieldKind::Int),
        FilterSpec::eq("patient_id", FieldKind::Int),
        FilterSpec::eq("doctor_id", FieldKind::Int),
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Writable for Treatment {
    type Payload = TreatmentPayload;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreatmentPayload {
    pub location_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub sales_order_id: Option<Uuid>,
    pub sales_order_detail_id: Option<i64>,
    pub sales_order_service_id: Option<i64>,
    pub service_id: Option<i64>,
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub nurse_id: Option<i64>,
    pub beautician_id: Option<i64>,
    pub doc_number: Option<String>,
    pub doc_date: Option<NaiveDate>,
    pub posted_date: Option<NaiveDate>,
    pub service_text: Option<String>,
    pub note: Option<String>,
    pub status_id: Option<i64>,
    #[serde(default)]
    pub details: Vec<TreatmentDetailPayload>,
}

impl Payload for TreatmentPayload {
    fn fields(&self) -> Fields {
        vec![
            ("location_id", self.location_id.into()),
            ("customer_id", self.customer_id.into()),
            ("sales_order_id", self.sales_order_id.into()),
            ("sales_order_detail_id", self.sales_order_detail_id.into()),
            ("sales_order_service_id", self.sales_order_service_id.into()),
            ("service_id", self.service_id.into()),
            ("patient_id", self.patient_id.into()),
            ("doctor_id", self.doctor_id.into()),
            ("nurse_id", self.nurse_id.into()),
            ("beautician_id", self.beautician_id.into()),
            ("doc_number", self.doc_number.clone().into()),
            ("doc_date", self.doc_date.into()),
            ("posted_date", self.posted_date.into()),
            ("service_text", self.service_text.clone().into()),
            ("note", self.note.clone().into()),
            ("status_id", self.status_id.into()),
        ]
    }
}

impl DocumentPayload for TreatmentPayload {
    fn validate_lines(&self) -> Result<(), Vec<FieldError>> {
        let errors = validate_nested("details", "treatment_id", &self.details);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn lines(&self) -> Vec<LineSet> {
        vec![LineSet::from_payloads::<TreatmentDetail>(
            "treatment_id",
            &self.details,
        )]
    }
}

/// 疗程耗材明细（无单价，不计算金额）
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct TreatmentDetail {
    pub id: i64,
    pub treatment_id: Option<Uuid>,
    pub item_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub quantity: Option<i64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Entity for TreatmentDetail {
    type Id = i64;

    const TABLE: &'static str = "treatment_detail";
    const LABEL: &'static str = "treatment detail";
    const LABEL_PLURAL: &'static str = "treatment details";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("treatment_id", FieldKind::Uuid),
        FilterSpec::eq("item_id", FieldKind::Int),
    ];
    const PARENT: Option<ParentKey> = Some(ParentKey {
        column: "treatment_id",
        kind: FieldKind::Uuid,
        label: "treatment",
    });

    fn id(&self) -> i64 {
        self.id
    }
}

impl Writable for TreatmentDetail {
    type Payload = TreatmentDetailPayload;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreatmentDetailPayload {
    pub treatment_id: Option<Uuid>,
    pub item_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub quantity: Option<i64>,
}

impl Payload for TreatmentDetailPayload {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "quantity", self.quantity.is_some());
        non_negative(&mut errors, "quantity", self.quantity);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn fields(&self) -> Fields {
        vec![
            ("treatment_id", self.treatment_id.into()),
            ("item_id", self.item_id.into()),
            ("unit_id", self.unit_id.into()),
            ("quantity", self.quantity.into()),
        ]
    }
}
