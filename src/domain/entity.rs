//! Entity Model - 通用实体描述
//!
//! 所有 CRUD 资源共用的类型描述：表名、主键、可过滤列、请求负载。
//! 仓储与 HTTP 层只依赖这些 trait，不关心具体实体。

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use uuid::Uuid;

// ============================================================================
// Field values
// ============================================================================

/// 一列的取值（可为空）
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(Option<i64>),
    Real(Option<f64>),
    Text(Option<String>),
    Bool(Option<bool>),
    Date(Option<NaiveDate>),
    Uuid(Option<Uuid>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        match self {
            FieldValue::Int(v) => v.is_none(),
            FieldValue::Real(v) => v.is_none(),
            FieldValue::Text(v) => v.is_none(),
            FieldValue::Bool(v) => v.is_none(),
            FieldValue::Date(v) => v.is_none(),
            FieldValue::Uuid(v) => v.is_none(),
        }
    }
}

impl From<Option<i64>> for FieldValue {
    fn from(v: Option<i64>) -> Self {
        FieldValue::Int(v)
    }
}

impl From<Option<f64>> for FieldValue {
    fn from(v: Option<f64>) -> Self {
        FieldValue::Real(v)
    }
}

impl From<Option<String>> for FieldValue {
    fn from(v: Option<String>) -> Self {
        FieldValue::Text(v)
    }
}

impl From<Option<bool>> for FieldValue {
    fn from(v: Option<bool>) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<Option<NaiveDate>> for FieldValue {
    fn from(v: Option<NaiveDate>) -> Self {
        FieldValue::Date(v)
    }
}

impl From<Option<Uuid>> for FieldValue {
    fn from(v: Option<Uuid>) -> Self {
        FieldValue::Uuid(v)
    }
}

/// 列类型，用于解析查询参数和路径参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    Real,
    Text,
    Bool,
    Date,
    Uuid,
}

impl FieldKind {
    /// 将原始字符串解析为对应类型的值，格式不符时返回 None
    pub fn parse(self, raw: &str) -> Option<FieldValue> {
        let raw = raw.trim();
        match self {
            FieldKind::Int => raw.parse::<i64>().ok().map(|v| FieldValue::Int(Some(v))),
            FieldKind::Real => raw.parse::<f64>().ok().map(|v| FieldValue::Real(Some(v))),
            FieldKind::Text => Some(FieldValue::Text(Some(raw.to_string()))),
            FieldKind::Bool => raw.parse::<bool>().ok().map(|v| FieldValue::Bool(Some(v))),
            FieldKind::Date => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .map(|v| FieldValue::Date(Some(v))),
            FieldKind::Uuid => Uuid::parse_str(raw).ok().map(|v| FieldValue::Uuid(Some(v))),
        }
    }
}

// ============================================================================
// Filters
// ============================================================================

/// 过滤运算
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// 相等
    Eq,
    /// 不区分大小写的包含匹配
    Contains,
    /// 大于等于
    Gte,
    /// 小于等于
    Lte,
}

/// 列表接口支持的单个查询参数
#[derive(Debug, Clone, Copy)]
pub struct FilterSpec {
    /// 查询参数名
    pub param: &'static str,
    /// 对应的列
    pub column: &'static str,
    pub kind: FieldKind,
    pub op: FilterOp,
}

impl FilterSpec {
    pub const fn eq(column: &'static str, kind: FieldKind) -> Self {
        Self {
            param: column,
            column,
            kind,
            op: FilterOp::Eq,
        }
    }

    pub const fn contains(column: &'static str) -> Self {
        Self {
            param: column,
            column,
            kind: FieldKind::Text,
            op: FilterOp::Contains,
        }
    }

    pub const fn gte(param: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            param,
            column,
            kind,
            op: FilterOp::Gte,
        }
    }

    pub const fn lte(param: &'static str, column: &'static str, kind: FieldKind) -> Self {
        Self {
            param,
            column,
            kind,
            op: FilterOp::Lte,
        }
    }

    /// 绑定一个已解析的值
    pub fn bind(&self, value: FieldValue) -> Filter {
        Filter {
            column: self.column,
            op: self.op,
            value,
        }
    }
}

/// 已解析的过滤条件
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub op: FilterOp,
    pub value: FieldValue,
}

/// 子资源的父级外键（如 `/by-sales-order/:id`）
#[derive(Debug, Clone, Copy)]
pub struct ParentKey {
    pub column: &'static str,
    pub kind: FieldKind,
    /// 父资源名称，用于错误信息
    pub label: &'static str,
}

// ============================================================================
// Entity
// ============================================================================

/// 主键类型
pub trait EntityId: Copy + Debug + Display + PartialEq + Send + Sync + Unpin + 'static {
    /// 解析路径参数
    fn parse(raw: &str) -> Option<Self>;

    fn value(&self) -> FieldValue;

    /// 由应用生成的主键；整型主键返回 None，交给数据库分配
    fn generate() -> Option<Self>;

    /// 由 SQLite rowid 得到主键
    fn from_rowid(rowid: i64) -> Option<Self>;
}

impl EntityId for i64 {
    fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse().ok()
    }

    fn value(&self) -> FieldValue {
        FieldValue::Int(Some(*self))
    }

    fn generate() -> Option<Self> {
        None
    }

    fn from_rowid(rowid: i64) -> Option<Self> {
        Some(rowid)
    }
}

impl EntityId for Uuid {
    fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok()
    }

    fn value(&self) -> FieldValue {
        FieldValue::Uuid(Some(*self))
    }

    fn generate() -> Option<Self> {
        Some(Uuid::new_v4())
    }

    fn from_rowid(_rowid: i64) -> Option<Self> {
        None
    }
}

/// 一张带审计字段、软删除的业务表
pub trait Entity: Serialize + Debug + Send + Sync + Unpin + Sized + 'static {
    type Id: EntityId;

    const TABLE: &'static str;

    /// 单数名称（小写开头，如 "sales order"）
    const LABEL: &'static str;

    /// 复数名称
    const LABEL_PLURAL: &'static str;

    /// 路径参数错误时使用的名称（"Invalid {ID_LABEL} ID"）
    const ID_LABEL: &'static str = Self::LABEL;

    /// 列表接口支持的过滤参数
    const FILTERS: &'static [FilterSpec] = &[];

    /// 子资源的父级外键
    const PARENT: Option<ParentKey> = None;

    fn id(&self) -> Self::Id;
}

/// 首字母大写，用于响应消息
pub fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// 字段级校验错误
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "This field is required")
    }
}

/// 记录缺失的必填字段
pub fn require(errors: &mut Vec<FieldError>, field: &str, present: bool) {
    if !present {
        errors.push(FieldError::required(field));
    }
}

/// 记录为负数的计数字段
pub fn non_negative(errors: &mut Vec<FieldError>, field: &str, value: Option<i64>) {
    if value.is_some_and(|v| v < 0) {
        errors.push(FieldError::new(field, "Must not be negative"));
    }
}

/// 列名与值的列表
pub type Fields = Vec<(&'static str, FieldValue)>;

/// 创建 / 更新请求体
///
/// `fields()` 返回全部可写列：更新时整体覆盖，未提供的字段写入 NULL。
pub trait Payload: DeserializeOwned + Debug + Send + Sync + 'static {
    /// 补全派生字段
    fn fill_computed(&mut self) {}

    fn validate(&self) -> Result<(), Vec<FieldError>> {
        Ok(())
    }

    fn fields(&self) -> Fields;
}

/// 可通过 POST / PUT 写入的实体
pub trait Writable: Entity {
    type Payload: Payload;
}

// ============================================================================
// Documents (parent + lines)
// ============================================================================

/// 一组待插入的子表行，父级外键由仓储在事务中填写
#[derive(Debug, Clone)]
pub struct LineSet {
    pub table: &'static str,
    pub label: &'static str,
    pub parent_column: &'static str,
    pub rows: Vec<Fields>,
}

impl LineSet {
    /// 由子资源负载构建，派生字段在此补全
    pub fn from_payloads<C>(parent_column: &'static str, items: &[C::Payload]) -> Self
    where
        C: Writable,
        C::Payload: Clone,
    {
        let rows = items
            .iter()
            .map(|item| {
                let mut item = item.clone();
                item.fill_computed();
                let mut fields = item.fields();
                fields.retain(|(column, _)| *column != parent_column);
                fields
            })
            .collect();

        Self {
            table: C::TABLE,
            label: C::LABEL,
            parent_column,
            rows,
        }
    }
}

/// 带明细的单据请求体（父表 + 子表在同一事务中创建）
pub trait DocumentPayload: Payload {
    fn validate_lines(&self) -> Result<(), Vec<FieldError>>;

    fn lines(&self) -> Vec<LineSet>;
}

/// 校验嵌套明细，忽略父级外键，字段名加上 `prefix[i].` 前缀
pub fn validate_nested<P: Payload>(
    prefix: &str,
    parent_column: &str,
    items: &[P],
) -> Vec<FieldError> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| item.validate().err().map(|errors| (index, errors)))
        .flat_map(move |(index, errors)| {
            errors
                .into_iter()
                .filter(move |e| e.field != parent_column)
                .map(move |e| FieldError::new(format!("{}[{}].{}", prefix, index, e.field), e.message))
        })
        .collect()
}
