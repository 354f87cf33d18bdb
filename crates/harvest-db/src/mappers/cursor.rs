//! Channel cursor entity <-> model mapper

use harvest_core::entities::ChannelCursor;
use harvest_core::value_objects::{ChannelId, MessageId};

use crate::models::CursorModel;

/// Convert CursorModel to ChannelCursor entity
impl From<CursorModel> for ChannelCursor {
    fn from(model: CursorModel) -> Self {
        ChannelCursor {
            channel_id: ChannelId::new(model.channel_id),
            channel_name: model.channel_name,
            last_message_id: MessageId::new(model.last_message_id),
            last_polled_at: model.last_polled_at,
        }
    }
}
