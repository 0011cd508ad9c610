use chrono::Utc;
use uuid::Uuid;

/// Media type assumed when a capture stream doesn't report one.
pub const DEFAULT_MEDIA_TYPE: &str = "audio/webm";

/// Fresh, globally unique object locator under the user's namespace.
///
/// Shape: `entries/{uid}/{unix_millis}-{uuid}.{ext}`.
pub fn object_locator(uid: &str, media_type: &str) -> String {
    format!(
        "entries/{}/{}-{}.{}",
        uid,
        Utc::now().timestamp_millis(),
        Uuid::new_v4(),
        extension_for(media_type)
    )
}

/// File extension for an audio MIME type, ignoring parameters.
pub fn extension_for(media_type: &str) -> &'static str {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or(media_type)
        .trim()
        .to_ascii_lowercase();

    match essence.as_str() {
        "audio/wav" | "audio/wave" | "audio/x-wav" => "wav",
        "audio/ogg" => "ogg",
        "audio/mp4" | "audio/aac" => "m4a",
        "audio/mpeg" => "mp3",
        _ => "webm",
    }
}
