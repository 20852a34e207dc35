use crate::attachments::{AttachmentGroups, FiberCard, GroupKind, ImageAttachment};
use crate::session::RevealState;
use crate::video::resolve_thumbnail;

/// The user's decision about showing attachments for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Consent {
    #[default]
    Unknown,
    Accepted,
    Declined,
}

/// Where an image is loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Remote(String),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisclosedItem {
    Image {
        caption: Option<String>,
        source: ImageSource,
    },
    Fiber(FiberCard),
    Video {
        title: Option<String>,
        link: String,
        thumbnail: ImageSource,
    },
}

impl DisclosedItem {
    /// Swaps the item's image for the placeholder after a failed load.
    pub fn fall_back_to_placeholder(&mut self) {
        match self {
            Self::Image { source, .. } => *source = ImageSource::Placeholder,
            Self::Video { thumbnail, .. } => *thumbnail = ImageSource::Placeholder,
            Self::Fiber(_) => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisclosedSection {
    pub kind: GroupKind,
    pub title: &'static str,
    pub items: Vec<DisclosedItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisclosurePrompt {
    pub groups: Vec<GroupKind>,
    pub question: String,
}

/// What the media area of a message shows on this render.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Disclosure {
    #[default]
    Hidden,
    Prompt(DisclosurePrompt),
    Sections(Vec<DisclosedSection>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisclosureGate {
    consent: Consent,
}

impl DisclosureGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consent(&self) -> Consent {
        self.consent
    }

    /// Records the user's answer. Only the first answer counts and `Unknown` is never accepted.
    pub fn choose(&mut self, consent: Consent) -> bool {
        if self.consent != Consent::Unknown || consent == Consent::Unknown {
            return false;
        }

        self.consent = consent;
        true
    }

    pub fn prompt_eligible(state: RevealState, groups: &AttachmentGroups) -> bool {
        state.is_media_ready() && groups.has_any()
    }

    pub fn decide(&self, state: RevealState, groups: &AttachmentGroups) -> Disclosure {
        if !Self::prompt_eligible(state, groups) {
            return Disclosure::Hidden;
        }

        match self.consent {
            Consent::Unknown => Disclosure::Prompt(build_prompt(groups)),
            Consent::Accepted => Disclosure::Sections(build_sections(groups)),
            Consent::Declined => Disclosure::Hidden,
        }
    }
}

fn build_prompt(groups: &AttachmentGroups) -> DisclosurePrompt {
    let present = groups.present();

    let mut labels: Vec<&'static str> = Vec::with_capacity(present.len());
    for kind in &present {
        let label = kind.prompt_label();
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    DisclosurePrompt {
        question: format!("Do you need to see {}?", labels.join(", ")),
        groups: present,
    }
}

fn build_sections(groups: &AttachmentGroups) -> Vec<DisclosedSection> {
    groups
        .present()
        .into_iter()
        .map(|kind| DisclosedSection {
            kind,
            title: kind.title(),
            items: section_items(kind, groups),
        })
        .collect()
}

fn section_items(kind: GroupKind, groups: &AttachmentGroups) -> Vec<DisclosedItem> {
    match kind {
        GroupKind::StructureImages => groups.structure_images.iter().map(image_item).collect(),
        GroupKind::MorphologyImages => groups.morphology_images.iter().map(image_item).collect(),
        GroupKind::FiberCards => groups
            .fiber_cards
            .iter()
            .cloned()
            .map(DisclosedItem::Fiber)
            .collect(),
        GroupKind::RelatedVideos => groups
            .related_videos
            .iter()
            .map(|video| DisclosedItem::Video {
                title: video.title.clone(),
                link: video.video_link.clone(),
                thumbnail: resolve_thumbnail(&video.video_link)
                    .map(ImageSource::Remote)
                    .unwrap_or(ImageSource::Placeholder),
            })
            .collect(),
    }
}

fn image_item(image: &ImageAttachment) -> DisclosedItem {
    let source = image
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(|url| ImageSource::Remote(url.to_string()))
        .unwrap_or(ImageSource::Placeholder);

    DisclosedItem::Image {
        caption: image.fiber_name.clone(),
        source,
    }
}
