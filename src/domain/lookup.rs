//! Lookup Tables
//!
//! 只有名称的字典表：状态、支付方式、记账类型与类别、提醒

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::audit::Audit;
use super::entity::{require, Entity, FieldError, Fields, FilterSpec, Payload, Writable};

/// 字典表的创建 / 更新请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamePayload {
    pub name: Option<String>,
}

impl Payload for NamePayload {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();
        require(
            &mut errors,
            "name",
            self.name.as_deref().is_some_and(|n| !n.trim().is_empty()),
        );
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn fields(&self) -> Fields {
        vec![("name", self.name.clone().into())]
    }
}

macro_rules! name_lookup {
    (
        $(#[$meta:meta])*
        $name:ident {
            table: $table:literal,
            label: $label:literal,
            plural: $plural:literal,
            id_label: $id_label:literal $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
        pub struct $name {
            pub id: i64,
            pub name: Option<String>,
            #[sqlx(flatten)]
            #[serde(flatten)]
            pub audit: Audit,
        }

        impl Entity for $name {
            type Id = i64;

            const TABLE: &'static str = $table;
            const LABEL: &'static str = $label;
            const LABEL_PLURAL: &'static str = $plural;
            const ID_LABEL: &'static str = $id_label;
            const FILTERS: &'static [FilterSpec] = &[FilterSpec::contains("name")];

            fn id(&self) -> i64 {
                self.id
            }
        }

        impl Writable for $name {
            type Payload = NamePayload;
        }
    };
}

name_lookup! {
    /// 销售单状态
    SalesOrderStatus {
        table: "sales_order_status",
        label: "sales order status",
        plural: "sales order statuses",
        id_label: "status",
    }
}

name_lookup! {
    /// 服务提醒记录
    Reminded {
        table: "reminded",
        label: "reminded record",
        plural: "reminded records",
        id_label: "reminded",
    }
}

name_lookup! {
    /// 账簿状态
    BookkeepingStatus {
        table: "bookkeeping_status",
        label: "bookkeeping status",
        plural: "bookkeeping statuses",
        id_label: "bookkeeping status",
    }
}

name_lookup! {
    PaymentMethod {
        table: "payment_method",
        label: "payment method",
        plural: "payment methods",
        id_label: "payment method",
    }
}

name_lookup! {
    /// 记账交易类型（收入 / 支出等）
    BookTransactionType {
        table: "book_transaction_type",
        label: "book transaction type",
        plural: "book transaction types",
        id_label: "book transaction type",
    }
}

name_lookup! {
    BookTransactionCategory {
        table: "book_transaction_category",
        label: "book transaction category",
        plural: "book transaction categories",
        id_label: "book transaction category",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_required() {
        let payload = NamePayload { name: Some("  ".to_string()) };
        assert_eq!(payload.validate(), Err(vec![FieldError::required("name")]));

        let payload = NamePayload { name: Some("Cash".to_string()) };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn test_lookup_serializes_audit_inline() {
        let status = SalesOrderStatus {
            id: 1,
            name: Some("Open".to_string()),
            audit: Audit {
                created_by: Some(7),
                ..Audit::default()
            },
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["name"], "Open");
        assert_eq!(json["created_by"], 7);
        assert!(json["deleted_at"].is_null());
    }
}
