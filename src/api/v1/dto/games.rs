/*
 * Responsibility
 * - games カタログの response DTO
 * - id は encode 済みの公開 ID を返す (内部 ID を漏らさない)
 */
use serde::Serialize;

use crate::repos::game_repo::GameRow;
use crate::services::id_codec::{self, IdCodec};

#[derive(Debug, Serialize)]
pub struct GameResponse {
    pub id: String, // encoded
    pub name: String,
    pub category: String,
    pub icon_url: Option<String>,
}

impl GameResponse {
    pub fn from_row(row: GameRow, codec: &IdCodec) -> id_codec::Result<Self> {
        Ok(Self {
            id: codec.encode(row.id)?,
            name: row.name,
            category: row.category,
            icon_url: row.icon_url,
        })
    }
}
