use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structure or morphology image attached to an answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ImageAttachment {
    #[serde(default, alias = "fiberName")]
    pub fiber_name: Option<String>,
    #[serde(default, alias = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default, alias = "fiberId")]
    pub fiber_id: Option<String>,
    #[serde(default, alias = "imageCmsId")]
    pub image_cms_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fiber summary card attached to an answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FiberCard {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, alias = "fiberId")]
    pub fiber_id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "className")]
    pub class_name: Option<String>,
    #[serde(default, alias = "subtypeName")]
    pub subtype_name: Option<String>,
    #[serde(default)]
    pub applications: Option<Vec<String>>,
    #[serde(default)]
    pub density_g_cm3: Option<f64>,
    #[serde(default)]
    pub biodegradability: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Related video link attached to an answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VideoAttachment {
    #[serde(default, rename = "videoLink", alias = "video_link")]
    pub video_link: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Raw attachment arrays as delivered with a message. Any array may be absent or `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentPayload {
    #[serde(default)]
    pub structure_images: Option<Vec<ImageAttachment>>,
    #[serde(default)]
    pub morphology_images: Option<Vec<ImageAttachment>>,
    #[serde(default)]
    pub fiber_cards: Option<Vec<FiberCard>>,
    #[serde(default)]
    pub related_videos: Option<Vec<VideoAttachment>>,
}

/// The four attachment categories, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKind {
    StructureImages,
    MorphologyImages,
    FiberCards,
    RelatedVideos,
}

impl GroupKind {
    pub const ALL: [GroupKind; 4] = [
        GroupKind::StructureImages,
        GroupKind::MorphologyImages,
        GroupKind::FiberCards,
        GroupKind::RelatedVideos,
    ];

    /// Section heading shown once the group is disclosed.
    pub fn title(self) -> &'static str {
        match self {
            Self::StructureImages => "Structure Diagrams",
            Self::MorphologyImages => "Morphology Images",
            Self::FiberCards => "Related Fibers",
            Self::RelatedVideos => "Related Videos",
        }
    }

    /// Phrase used in the disclosure question. Cards and videos share one phrase.
    pub fn prompt_label(self) -> &'static str {
        match self {
            Self::StructureImages => "structure diagrams",
            Self::MorphologyImages => "morphology images",
            Self::FiberCards | Self::RelatedVideos => "related materials",
        }
    }
}

/// Attachment arrays partitioned into the named groups, absent arrays normalized to empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AttachmentGroups {
    pub structure_images: Vec<ImageAttachment>,
    pub morphology_images: Vec<ImageAttachment>,
    pub fiber_cards: Vec<FiberCard>,
    pub related_videos: Vec<VideoAttachment>,
}

impl AttachmentGroups {
    /// Classifies a raw payload. Never fails.
    pub fn classify(payload: &AttachmentPayload) -> Self {
        Self {
            structure_images: payload.structure_images.clone().unwrap_or_default(),
            morphology_images: payload.morphology_images.clone().unwrap_or_default(),
            fiber_cards: payload.fiber_cards.clone().unwrap_or_default(),
            related_videos: payload.related_videos.clone().unwrap_or_default(),
        }
    }

    pub fn len_of(&self, kind: GroupKind) -> usize {
        match kind {
            GroupKind::StructureImages => self.structure_images.len(),
            GroupKind::MorphologyImages => self.morphology_images.len(),
            GroupKind::FiberCards => self.fiber_cards.len(),
            GroupKind::RelatedVideos => self.related_videos.len(),
        }
    }

    /// Non-empty groups in display order.
    pub fn present(&self) -> Vec<GroupKind> {
        GroupKind::ALL
            .into_iter()
            .filter(|kind| self.len_of(*kind) > 0)
            .collect()
    }

    pub fn has_any(&self) -> bool {
        GroupKind::ALL.into_iter().any(|kind| self.len_of(kind) > 0)
    }
}
