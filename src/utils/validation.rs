use crate::models::*;
use anyhow::{Result, anyhow};

pub fn validate_interaction_event(event: &InteractionEvent) -> Result<()> {
    if event.user_id.is_empty() {
        return Err(anyhow!("User ID cannot be empty"));
    }

    if event.content_id.is_empty() {
        return Err(anyhow!("Content ID cannot be empty"));
    }

    if event.channel_id == 0 {
        return Err(anyhow!("Channel ID cannot be zero"));
    }

    // Only views carry a watch duration.
    if event.kind != InteractionKind::View && event.duration_secs != 0 {
        return Err(anyhow!("Duration must be zero for non-view interactions"));
    }

    // Validate timestamp is not too far in the future
    let now = chrono::Utc::now();
    let max_future = now + chrono::Duration::hours(1);
    if event.timestamp > max_future {
        return Err(anyhow!("Timestamp cannot be more than 1 hour in the future"));
    }

    Ok(())
}

pub fn validate_content_item(item: &ContentItem) -> Result<()> {
    if item.content_id.is_empty() {
        return Err(anyhow!("Content ID cannot be empty"));
    }

    if item.channel_id == 0 {
        return Err(anyhow!("Channel ID cannot be zero"));
    }

    if item.title.is_empty() {
        return Err(anyhow!("Content title cannot be empty"));
    }

    if item.title.len() > 200 {
        return Err(anyhow!("Content title too long (max 200 characters)"));
    }

    for topic in &item.topics {
        if topic.is_empty() {
            return Err(anyhow!("Topic name cannot be empty"));
        }
        if topic.len() > 100 {
            return Err(anyhow!("Topic name too long (max 100 characters)"));
        }
    }

    if !item.popularity_score.is_finite() {
        return Err(anyhow!("Popularity score contains invalid values (NaN or Infinity)"));
    }

    if item.popularity_score < 0.0 || item.popularity_score > 1.0 {
        return Err(anyhow!("Popularity score must be between 0.0 and 1.0"));
    }

    Ok(())
}
