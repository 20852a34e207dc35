use std::sync::LazyLock;

use regex::Regex;

/// Thumbnail endpoint; `{id}` is replaced with the 11-character video id.
pub const THUMBNAIL_TEMPLATE: &str = "https://img.youtube.com/vi/{id}/hqdefault.jpg";
pub const VIDEO_ID_LEN: usize = 11;

// Short link, `/v/`, `/u/<char>/`, `/embed/`, `watch?v=` and trailing `&v=` forms.
const VIDEO_LINK_PATTERN: &str = r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*";

static VIDEO_LINK_REGEX: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(VIDEO_LINK_PATTERN)
        .inspect_err(|error| tracing::warn!(%error, "video link pattern failed to compile"))
        .ok()
});

/// Extracts the video id from a link, if the link has a recognizable shape.
pub fn extract_video_id(link: &str) -> Option<&str> {
    let regex = VIDEO_LINK_REGEX.as_ref()?;
    let id = regex.captures(link.trim())?.get(2)?.as_str();

    (id.chars().count() == VIDEO_ID_LEN).then_some(id)
}

/// Resolves a video link to its thumbnail URL. Unrecognized links yield `None`.
pub fn resolve_thumbnail(link: &str) -> Option<String> {
    extract_video_id(link).map(|id| THUMBNAIL_TEMPLATE.replace("{id}", id))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    #[test]
    fn all_link_shapes_resolve_to_same_thumbnail() {
        let links = [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ?version=3",
            "https://www.youtube.com/user/fibrelab#p/u/1/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/watch?feature=player_embedded&v=dQw4w9WgXcQ",
        ];

        for link in links {
            assert_eq!(extract_video_id(link), Some(ID), "link: {link}");
            assert_eq!(
                resolve_thumbnail(link).as_deref(),
                Some("https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg"),
                "link: {link}"
            );
        }
    }

    #[test]
    fn query_and_fragment_after_id_are_ignored() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s#comments"),
            Some(ID)
        );
        assert_eq!(extract_video_id("https://youtu.be/dQw4w9WgXcQ?t=10"), Some(ID));
    }

    #[test]
    fn unparseable_links_yield_none() {
        assert_eq!(resolve_thumbnail("https://www.youtube.com/"), None);
        assert_eq!(resolve_thumbnail(""), None);
        assert_eq!(resolve_thumbnail("not a url at all"), None);
        assert_eq!(resolve_thumbnail("https://youtu.be/short"), None);
        assert_eq!(resolve_thumbnail("https://youtu.be/dQw4w9WgXcQextra"), None);
    }
}
