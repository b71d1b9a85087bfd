//! Line Item Pricing
//!
//! 订单明细金额计算

/// 明细金额：`quantity × price`，`discount_pct > 0` 时按百分比扣减
///
/// 数量或单价缺失时无法计算，返回 None
pub fn item_total(quantity: Option<i64>, price: Option<f64>, discount_pct: Option<i64>) -> Option<f64> {
    let gross = quantity? as f64 * price?;
    match discount_pct {
        Some(pct) if pct > 0 => Some(gross - gross * pct as f64 / 100.0),
        _ => Some(gross),
    }
}
