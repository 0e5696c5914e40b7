use serde::Serialize;
use uuid::Uuid;

use crate::models::Trade;

/// Trade changes pushed to the owning user's WebSocket connections.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    #[serde(rename = "trade_created")]
    TradeCreated(Trade),

    #[serde(rename = "trade_closed")]
    TradeClosed(Trade),

    #[serde(rename = "trade_deleted")]
    TradeDeleted(DeletedTrade),
}

#[derive(Debug, Clone, Serialize)]
pub struct DeletedTrade {
    pub id: Uuid,
    pub user_id: Uuid,
}

impl WsMessage {
    /// The user whose feed this message belongs to.
    pub fn owner(&self) -> Uuid {
        match self {
            WsMessage::TradeCreated(trade) | WsMessage::TradeClosed(trade) => trade.user_id,
            WsMessage::TradeDeleted(deleted) => deleted.user_id,
        }
    }
}
