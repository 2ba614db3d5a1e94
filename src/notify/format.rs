//! Trade event formatting for chat notifications

use chrono::Local;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Renders a filled grid order as the message card sent to the chat channel.
///
/// `retry_count` is `(current, max)` when the fill happened on a retried
/// order placement.
pub fn format_trade_message(
    side: TradeSide,
    symbol: &str,
    price: Decimal,
    amount: Decimal,
    total: Decimal,
    grid_size: Decimal,
    retry_count: Option<(u32, u32)>,
) -> String {
    let (emoji, direction) = match side {
        TradeSide::Buy => ("🟢", "买入"),
        TradeSide::Sell => ("🔴", "卖出"),
    };

    let mut message = format!(
        "\n{emoji} {direction} {symbol}\n\
         ━━━━━━━━━━━━━━━━━━━━\n\
         💰 价格：{price:.2} USDT\n\
         📊 数量：{amount:.4} BNB\n\
         💵 金额：{total:.2} USDT\n\
         📈 网格：{grid_size}%\n"
    );

    if let Some((current, max)) = retry_count {
        message.push_str(&format!("🔄 尝试：{current}/{max}次\n"));
    }

    message.push_str(&format!(
        "⏰ 时间：{}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    message
}
