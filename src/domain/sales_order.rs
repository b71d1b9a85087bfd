//! Sales Order Context
//!
//! 销售单（头）、销售明细、服务项

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::audit::Audit;
use super::entity::{
    non_negative, require, validate_nested, DocumentPayload, Entity, FieldError, FieldKind,
    Fields, FilterSpec, LineSet, ParentKey, Payload, Writable,
};
use super::line_item;
use super::lookup::SalesOrderStatus;

// ============================================================================
// SalesOrder
// ============================================================================

/// 销售单
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SalesOrder {
    pub id: Uuid,
    pub location_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub doc_number: Option<i64>,
    pub doc_date: Option<NaiveDate>,
    pub inv_number: Option<String>,
    pub address: Option<String>,
    pub delivery_cost: Option<f64>,
    pub total_amount: Option<f64>,
    pub total_payment: Option<f64>,
    pub outstanding: Option<f64>,
    pub total_voucher: Option<f64>,
    pub voucher_number: Option<String>,
    pub posted_date: Option<NaiveDate>,
    pub migrated: Option<bool>,
    pub additional_cost: Option<f64>,
    pub previous_payment: Option<f64>,
    pub fully_paid: Option<bool>,
    pub note: Option<String>,
    pub status_id: Option<i64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<SalesOrderStatus>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<SalesOrderDetail>>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub services: Option<Vec<SalesOrderService>>,
}

impl Entity for SalesOrder {
    type Id = Uuid;

    const TABLE: &'static str = "sales_order";
    const LABEL: &'static str = "sales order";
    const LABEL_PLURAL: &'static str = "sales orders";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("status_id", FieldKind::Int),
        FilterSpec::eq("customer_id", FieldKind::Int),
    ];

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Writable for SalesOrder {
    type Payload = SalesOrderPayload;
}

/// 销售单请求体；`details` / `services` 仅在创建时使用
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesOrderPayload {
    pub location_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub doc_number: Option<i64>,
    pub doc_date: Option<NaiveDate>,
    pub inv_number: Option<String>,
    pub address: Option<String>,
    pub delivery_cost: Option<f64>,
    pub total_amount: Option<f64>,
    pub total_payment: Option<f64>,
    pub outstanding: Option<f64>,
    pub total_voucher: Option<f64>,
    pub voucher_number: Option<String>,
    pub posted_date: Option<NaiveDate>,
    pub migrated: Option<bool>,
    pub additional_cost: Option<f64>,
    pub previous_payment: Option<f64>,
    pub fully_paid: Option<bool>,
    pub note: Option<String>,
    pub status_id: Option<i64>,
    #[serde(default)]
    pub details: Vec<SalesOrderDetailPayload>,
    #[serde(default)]
    pub services: Vec<SalesOrderServicePayload>,
}

impl Payload for SalesOrderPayload {
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
            ("doc_number", self.doc_number.into()),
            ("doc_date", self.doc_date.into()),
            ("inv_number", self.inv_number.clone().into()),
            ("address", self.address.clone().into()),
            ("delivery_cost", self.delivery_cost.into()),
            ("total_amount", self.total_amount.into()),
            ("total_payment", self.total_payment.into()),
            ("outstanding", self.outstanding.into()),
            ("total_voucher", self.total_voucher.into()),
            ("voucher_number", self.voucher_number.clone().into()),
            ("posted_date", self.posted_date.into()),
            ("migrated", self.migrated.into()),
            ("additional_cost", self.additional_cost.into()),
            ("previous_payment", self.previous_payment.into()),
            ("fully_paid", self.fully_paid.into()),
            ("note", self.note.clone().into()),
            ("status_id", self.status_id.into()),
        ]
    }
}

impl DocumentPayload for SalesOrderPayload {
    fn validate_lines(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = validate_nested("details", "sales_order_id", &self.details);
        errors.extend(validate_nested("services", "sales_order_id", &self.services));
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn lines(&self) -> Vec<LineSet> {
        vec![
            LineSet::from_payloads::<SalesOrderDetail>("sales_order_id", &self.details),
            LineSet::from_payloads::<SalesOrderService>("sales_order_id", &self.services),
        ]
    }
}

// ============================================================================
// SalesOrderDetail
// ============================================================================

/// 销售明细
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SalesOrderDetail {
    pub id: i64,
    pub sales_order_id: Option<Uuid>,
    pub item_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub promoter_id: Option<i64>,
    pub item_name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
    pub item_total: Option<f64>,
    pub discount_pct: Option<i64>,
    pub used_sessions: Option<i64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Entity for SalesOrderDetail {
    type Id = i64;

    const TABLE: &'static str = "sales_order_detail";
    const LABEL: &'static str = "sales order detail";
    const LABEL_PLURAL: &'static str = "sales order details";
    const ID_LABEL: &'static str = "detail";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("sales_order_id", FieldKind::Uuid),
        FilterSpec::eq("item_id", FieldKind::Int),
    ];
    const PARENT: Option<ParentKey> = Some(ParentKey {
        column: "sales_order_id",
        kind: FieldKind::Uuid,
        label: "sales order",
    });

    fn id(&self) -> i64 {
        self.id
    }
}

impl Writable for SalesOrderDetail {
    type Payload = SalesOrderDetailPayload;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesOrderDetailPayload {
    pub sales_order_id: Option<Uuid>,
    pub item_id: Option<i64>,
    pub unit_id: Option<i64>,
    pub promoter_id: Option<i64>,
    pub item_name: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<f64>,
    pub item_total: Option<f64>,
    pub discount_pct: Option<i64>,
    pub used_sessions: Option<i64>,
}

impl Payload for SalesOrderDetailPayload {
    /// 未提供 item_total 时按数量、单价、折扣计算
    fn fill_computed(&mut self) {
        if self.item_total.is_none() {
            self.item_total = line_item::item_total(self.quantity, self.price, self.discount_pct);
        }
    }

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(&mut errors, "quantity", self.quantity.is_some());
        non_negative(&mut errors, "quantity", self.quantity);
        require(&mut errors, "price", self.price.is_some());
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn fields(&self) -> Fields {
        vec![
            ("sales_order_id", self.sales_order_id.into()),
            ("item_id", self.item_id.into()),
            ("unit_id", self.unit_id.into()),
            ("promoter_id", self.promoter_id.into()),
            ("item_name", self.item_name.clone().into()),
            ("quantity", self.quantity.into()),
            ("price", self.price.into()),
            ("item_total", self.item_total.into()),
            ("discount_pct", self.discount_pct.into()),
            ("used_sessions", self.used_sessions.into()),
        ]
    }
}

// ============================================================================
// SalesOrderService
// ============================================================================

/// 销售单中的服务项（疗程排期）
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SalesOrderService {
    pub id: i64,
    pub sales_order_id: Option<Uuid>,
    pub sales_order_detail_id: Option<i64>,
    pub service_id: Option<i64>,
    pub treatment_id: Option<Uuid>,
    pub message_log_detail_id: Option<String>,
    pub reminded_id: Option<i64>,
    pub service_name: Option<String>,
    pub treated: Option<bool>,
    pub schedule: Option<NaiveDate>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,
}

impl Entity for SalesOrderService {
    type Id = i64;

    const TABLE: &'static str = "sales_order_service";
    const LABEL: &'static str = "sales order service";
    const LABEL_PLURAL: &'static str = "sales order services";
    const ID_LABEL: &'static str = "service";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("sales_order_id", FieldKind::Uuid),
        FilterSpec::eq("treated", FieldKind::Bool),
        FilterSpec::eq("service_id", FieldKind::Int),
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

impl Writable for SalesOrderService {
    type Payload = SalesOrderServicePayload;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesOrderServicePayload {
    pub sales_order_id: Option<Uuid>,
    pub sales_order_detail_id: Option<i64>,
    pub service_id: Option<i64>,
    pub treatment_id: Option<Uuid>,
    pub message_log_detail_id: Option<String>,
    pub reminded_id: Option<i64>,
    pub service_name: Option<String>,
    pub treated: Option<bool>,
    pub schedule: Option<NaiveDate>,
}

impl Payload for SalesOrderServicePayload {
    fn fields(&self) -> Fields {
        vec![
            ("sales_order_id", self.sales_order_id.into()),
            ("sales_order_detail_id", self.sales_order_detail_id.into()),
            ("service_id", self.service_id.into()),
            ("treatment_id", self.treatment_id.into()),
            ("message_log_detail_id", self.message_log_detail_id.clone().into()),
            ("reminded_id", self.reminded_id.into()),
            ("service_name", self.service_name.clone().into()),
            ("treated", self.treated.into()),
            ("schedule", self.schedule.into()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FieldValue;

    fn column<'a>(fields: &'a Fields, name: &str) -> Option<&'a FieldValue> {
        fields.iter().find(|(c, _)| *c == name).map(|(_, v)| v)
    }

    #[test]
    fn test_detail_computes_item_total_when_missing() {
        let mut payload = SalesOrderDetailPayload {
            quantity: Some(2),
            price: Some(150.0),
            discount_pct: Some(10),
            ..Default::default()
        };
        payload.fill_computed();
        assert_eq!(payload.item_total, Some(270.0));
    }

    #[test]
    fn test_detail_keeps_supplied_item_total() {
        let mut payload = SalesOrderDetailPayload {
            quantity: Some(2),
            price: Some(150.0),
            item_total: Some(999.0),
            ..Default::default()
        };
        payload.fill_computed();
        assert_eq!(payload.item_total, Some(999.0));
    }

    #[test]
    fn test_sales_order_requires_customer() {
        let payload = SalesOrderPayload::default();
        assert_eq!(payload.validate(), Err(vec![FieldError::required("customer_id")]));
    }

    #[test]
    fn test_detail_rejects_negative_quantity() {
        let payload = SalesOrderDetailPayload {
            quantity: Some(-1),
            price: Some(10.0),
            ..Default::default()
        };
        assert_eq!(
            payload.validate(),
            Err(vec![FieldError::new("quantity", "Must not be negative")])
        );
    }

    #[test]
    fn test_nested_lines_validation_uses_indexed_names() {
        let payload = SalesOrderPayload {
            customer_id: Some(1),
            details: vec![
                SalesOrderDetailPayload {
                    quantity: Some(1),
                    price: Some(10.0),
                    ..Default::default()
                },
                SalesOrderDetailPayload {
                    quantity: Some(1),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            payload.validate_lines(),
            Err(vec![FieldError::required("details[1].price")])
        );
    }

    #[test]
    fn test_lines_exclude_parent_column_and_fill_totals() {
        let payload = SalesOrderPayload {
            customer_id: Some(1),
            details: vec![SalesOrderDetailPayload {
                sales_order_id: Some(Uuid::new_v4()),
                quantity: Some(3),
                price: Some(10.0),
                ..Default::default()
            }],
            ..Default::default()
        };

        let lines = payload.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].table, "sales_order_detail");
        assert_eq!(lines[1].rows.len(), 0);

        let row = &lines[0].rows[0];
        assert!(column(row, "sales_order_id").is_none());
        assert_eq!(column(row, "item_total"), Some(&FieldValue::Real(Some(30.0))));
    }

    #[test]
    fn test_update_fields_cover_every_mutable_column() {
        let fields = SalesOrderPayload::default().fields();
        assert_eq!(fields.len(), 19);
        assert!(fields.iter().all(|(_, v)| v.is_null()));
    }
}
