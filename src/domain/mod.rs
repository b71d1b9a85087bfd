//! Domain Layer - 领域层
//!
//! 销售单业务的表模型：
//! - sales_order: 销售单、明细、服务项
//! - ar_receipt: 应收款收据
//! - treatment: 疗程
//! - bookkeeping: 账簿、流水、汇总
//! - lookup: 字典表
//!
//! entity 定义所有表共用的描述 trait（主键、过滤参数、请求体）

mod ar_receipt;
mod audit;
mod bookkeeping;
mod entity;
pub mod line_item;
mod lookup;
mod sales_order;
mod treatment;

pub use ar_receipt::{ArReceipt, ArReceiptDetail, ArReceiptDetailPayload, ArReceiptPayload};
pub use audit::Audit;
pub use bookkeeping::{
    Bookkeeping, BookkeepingDetail, BookkeepingDetailPayload, BookkeepingPayload,
    SummaryByPaymentMethod, SummaryByPaymentMethodPayload, SummaryByTransactionType,
    SummaryByTransactionTypeAndPaymentMethod, SummaryByTransactionTypeAndPaymentMethodPayload,
    SummaryByTransactionTypePayload,
};
pub use entity::{
    capitalize, require, validate_nested, DocumentPayload, Entity, EntityId, FieldError,
    FieldKind, FieldValue, Fields, Filter, FilterOp, FilterSpec, LineSet, ParentKey, Payload,
    Writable,
};
pub use lookup::{
    BookTransactionCategory, BookTransactionType, BookkeepingStatus, NamePayload, PaymentMethod,
    Reminded, SalesOrderStatus,
};
pub use sales_order::{
    SalesOrder, SalesOrderDetail, SalesOrderDetailPayload, SalesOrderPayload, SalesOrderService,
    SalesOrderServicePayload,
};
pub use treatment::{Treatment, TreatmentDetail, TreatmentDetailPayload, TreatmentPayload};
