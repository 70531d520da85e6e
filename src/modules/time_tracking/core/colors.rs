use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventColors {
    pub background_color: String,
    pub border_color: String,
    pub text_color: String,
}

/// Stable hue in `0..360` for a seed string.
pub fn hash_hue(seed: &str) -> u32 {
    seed.encode_utf16()
        .fold(0u32, |hash, unit| hash.wrapping_mul(31).wrapping_add(u32::from(unit)))
        % 360
}

/// Colors for a calendar block; an explicit ticket color wins over the hashed hue.
pub fn event_colors(seed: &str, ticket_color: Option<&str>) -> EventColors {
    let text_color = "rgba(255,255,255,.95)".to_string();
    if let Some(color) = ticket_color {
        return EventColors {
            background_color: color.to_string(),
            border_color: color.to_string(),
            text_color,
        };
    }
    let hue = hash_hue(seed);
    EventColors {
        background_color: format!("hsla({hue}, 80%, 55%, 0.20)"),
        border_color: format!("hsla({hue}, 85%, 60%, 0.55)"),
        text_color,
    }
}
