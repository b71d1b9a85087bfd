//! Bookkeeping Context
//!
//! 每日账簿、账簿流水，以及按交易类型 / 支付方式汇总的三张统计表

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::audit::Audit;
use super::entity::{Entity, FieldKind, Fields, FilterSpec, ParentKey, Payload, Writable};
use super::lookup::{BookTransactionCategory, BookTransactionType, BookkeepingStatus, PaymentMethod};

const BY_BOOKKEEPING: Option<ParentKey> = Some(ParentKey {
    column: "bookkeeping_id",
    kind: FieldKind::Int,
    label: "bookkeeping",
});

// ============================================================================
// Bookkeeping
// ============================================================================

/// 账簿（某门店某日的期初、收入、支出、结余）
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Bookkeeping {
    pub id: i64,
    pub location_id: Option<String>,
    pub book_date: Option<NaiveDate>,
    pub opening: Option<f64>,
    pub income: Option<f64>,
    pub expanse: Option<f64>,
    pub balance: Option<f64>,
    pub note: Option<String>,
    pub status_id: Option<i64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookkeepingStatus>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<BookkeepingDetail>>,
}

impl Entity for Bookkeeping {
    type Id = i64;

    const TABLE: &'static str = "bookkeeping";
    const LABEL: &'static str = "bookkeeping record";
    const LABEL_PLURAL: &'static str = "bookkeeping records";
    const ID_LABEL: &'static str = "bookkeeping";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("location_id", FieldKind::Text),
        FilterSpec::eq("status_id", FieldKind::Int),
        FilterSpec::gte("book_date_from", "book_date", FieldKind::Date),
        FilterSpec::lte("book_date_to", "book_date", FieldKind::Date),
    ];
    const PARENT: Option<ParentKey> = Some(ParentKey {
        column: "location_id",
        kind: FieldKind::Text,
        label: "location",
    });

    fn id(&self) -> i64 {
        self.id
    }
}

impl Writable for Bookkeeping {
    type Payload = BookkeepingPayload;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookkeepingPayload {
    pub location_id: Option<String>,
    pub book_date: Option<NaiveDate>,
    pub opening: Option<f64>,
    pub income: Option<f64>,
    pub expanse: Option<f64>,
    pub balance: Option<f64>,
    pub note: Option<String>,
    pub status_id: Option<i64>,
}

impl Payload for BookkeepingPayload {
    fn fields(&self) -> Fields {
        vec![
            ("location_id", self.location_id.clone().into()),
            ("book_date", self.book_date.into()),
            ("opening", self.opening.into()),
            ("income", self.income.into()),
            ("expanse", self.expanse.into()),
            ("balance", self.balance.into()),
            ("note", self.note.clone().into()),
            ("status_id", self.status_id.into()),
        ]
    }
}

// ============================================================================
// BookkeepingDetail
// ============================================================================

/// 账簿流水
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct BookkeepingDetail {
    pub id: i64,
    pub bookkeeping_id: Option<i64>,
    pub type_id: Option<i64>,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub posted_date: Option<NaiveDate>,
    pub doc_number: Option<String>,
    pub income: Option<f64>,
    pub expanse: Option<f64>,
    pub description: Option<String>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    #[sqlx(skip)]
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<BookTransactionType>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<BookTransactionCategory>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl Entity for BookkeepingDetail {
    type Id = i64;

    const TABLE: &'static str = "bookkeeping_detail";
    const LABEL: &'static str = "bookkeeping detail";
    const LABEL_PLURAL: &'static str = "bookkeeping details";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("bookkeeping_id", FieldKind::Int),
        FilterSpec::eq("type_id", FieldKind::Int),
        FilterSpec::eq("category_id", FieldKind::Int),
        FilterSpec::eq("payment_method_id", FieldKind::Int),
        FilterSpec::gte("posted_date_from", "posted_date", FieldKind::Date),
        FilterSpec::lte("posted_date_to", "posted_date", FieldKind::Date),
    ];
    const PARENT: Option<ParentKey> = BY_BOOKKEEPING;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Writable for BookkeepingDetail {
    type Payload = BookkeepingDetailPayload;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookkeepingDetailPayload {
    pub bookkeeping_id: Option<i64>,
    pub type_id: Option<i64>,
    pub category_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub posted_date: Option<NaiveDate>,
    pub doc_number: Option<String>,
    pub income: Option<f64>,
    pub expanse: Option<f64>,
    pub description: Option<String>,
}

impl Payload for BookkeepingDetailPayload {
    fn fields(&self) -> Fields {
        vec![
            ("bookkeeping_id", self.bookkeeping_id.into()),
            ("type_id", self.type_id.into()),
            ("category_id", self.category_id.into()),
            ("payment_method_id", self.payment_method_id.into()),
            ("posted_date", self.posted_date.into()),
            ("doc_number", self.doc_number.clone().into()),
            ("income", self.income.into()),
            ("expanse", self.expanse.into()),
            ("description", self.description.clone().into()),
        ]
    }
}

// ============================================================================
// Summaries
// ============================================================================

/// 按交易类型汇总
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SummaryByTransactionType {
    pub id: i64,
    pub bookkeeping_id: Option<i64>,
    pub type_id: Option<i64>,
    pub total: Option<f64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookkeeping: Option<Box<Bookkeeping>>,
    #[sqlx(skip)]
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<BookTransactionType>,
}

impl Entity for SummaryByTransactionType {
    type Id = i64;

    const TABLE: &'static str = "summary_by_transaction_type";
    const LABEL: &'static str = "summary";
    const LABEL_PLURAL: &'static str = "summaries";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("bookkeeping_id", FieldKind::Int),
        FilterSpec::eq("type_id", FieldKind::Int),
    ];
    const PARENT: Option<ParentKey> = BY_BOOKKEEPING;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Writable for SummaryByTransactionType {
    type Payload = SummaryByTransactionTypePayload;
}

/// 按支付方式汇总
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SummaryByPaymentMethod {
    pub id: i64,
    pub bookkeeping_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub total: Option<f64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookkeeping: Option<Box<Bookkeeping>>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl Entity for SummaryByPaymentMethod {
    type Id = i64;

    const TABLE: &'static str = "summary_by_payment_method";
    const LABEL: &'static str = "summary";
    const LABEL_PLURAL: &'static str = "summaries";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("bookkeeping_id", FieldKind::Int),
        FilterSpec::eq("payment_method_id", FieldKind::Int),
    ];
    const PARENT: Option<ParentKey> = BY_BOOKKEEPING;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Writable for SummaryByPaymentMethod {
    type Payload = SummaryByPaymentMethodPayload;
}

/// 按交易类型 + 支付方式汇总
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct SummaryByTransactionTypeAndPaymentMethod {
    pub id: i64,
    pub bookkeeping_id: Option<i64>,
    pub type_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub total: Option<f64>,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub audit: Audit,

    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bookkeeping: Option<Box<Bookkeeping>>,
    #[sqlx(skip)]
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<BookTransactionType>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

impl Entity for SummaryByTransactionTypeAndPaymentMethod {
    type Id = i64;

    const TABLE: &'static str = "summary_by_transaction_type_and_payment_method";
    const LABEL: &'static str = "summary";
    const LABEL_PLURAL: &'static str = "summaries";
    const FILTERS: &'static [FilterSpec] = &[
        FilterSpec::eq("bookkeeping_id", FieldKind::Int),
        FilterSpec::eq("type_id", FieldKind::Int),
        FilterSpec::eq("payment_method_id", FieldKind::Int),
    ];
    const PARENT: Option<ParentKey> = BY_BOOKKEEPING;

    fn id(&self) -> i64 {
        self.id
    }
}

impl Writable for SummaryByTransactionTypeAndPaymentMethod {
    type Payload = SummaryByTransactionTypeAndPaymentMethodPayload;
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryByTransactionTypePayload {
    pub bookkeeping_id: Option<i64>,
    pub type_id: Option<i64>,
    pub total: Option<f64>,
}

impl Payload for SummaryByTransactionTypePayload {
    fn fields(&self) -> Fields {
        vec![
            ("bookkeeping_id", self.bookkeeping_id.into()),
            ("type_id", self.type_id.into()),
            ("total", self.total.into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryByPaymentMethodPayload {
    pub bookkeeping_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub total: Option<f64>,
}

impl Payload for SummaryByPaymentMethodPayload {
    fn fields(&self) -> Fields {
        vec![
            ("bookkeeping_id", self.bookkeeping_id.into()),
            ("payment_method_id", self.payment_method_id.into()),
            ("total", self.total.into()),
        ]
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryByTransactionTypeAndPaymentMethodPayload {
    pub bookkeeping_id: Option<i64>,
    pub type_id: Option<i64>,
    pub payment_method_id: Option<i64>,
    pub total: Option<f64>,
}

impl Payload for SummaryByTransactionTypeAndPaymentMethodPayload {
    fn fields(&self) -> Fields {
        vec![
            ("bookkeeping_id", self.bookkeeping_id.into()),
            ("type_id", self.type_id.into()),
            ("payment_method_id", self.payment_method_id.into()),
            ("total", self.total.into()),
        ]
    }
}
