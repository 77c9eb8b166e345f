use serde::{Deserialize, Serialize};

use crate::{
    domain::{Attribution, GenerationResult, SourceImage},
    error::IncompleteResult,
};

pub const GENERATE_PATH: &str = "/api/generate";
pub const CREATE_STORY_PATH: &str = "/api/create-story";

pub const IMAGE_FIELD: &str = "image";
pub const QUOTE_FIELD: &str = "quote";
pub const AUTHOR_FIELD: &str = "author";
pub const TITLE_FIELD: &str = "title";

/// File name the rendered story image is saved under.
pub const STORY_FILENAME: &str = "picture_to_poetry_story.png";

/// Generation response as it arrives on the wire. Every field is optional here;
/// presence is checked when converting into [`GenerationResult`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourcePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourcePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TryFrom<GenerationResponse> for GenerationResult {
    type Error = IncompleteResult;

    fn try_from(value: GenerationResponse) -> Result<Self, Self::Error> {
        let quote = value.quote.ok_or(IncompleteResult::new("quote"))?;
        let source = value.source.ok_or(IncompleteResult::new("source"))?;
        let author = source
            .author
            .ok_or(IncompleteResult::new("source.author"))?;
        let title = source.title.ok_or(IncompleteResult::new("source.title"))?;
        let commentary = value
            .commentary
            .ok_or(IncompleteResult::new("commentary"))?;

        Ok(Self {
            quote,
            source: Attribution { author, title },
            commentary,
        })
    }
}

impl From<GenerationResult> for GenerationResponse {
    fn from(value: GenerationResult) -> Self {
        Self {
            quote: Some(value.quote),
            source: Some(SourcePayload {
                author: Some(value.source.author),
                title: Some(value.source.title),
            }),
            commentary: Some(value.commentary),
        }
    }
}

/// Inputs for the story image render: the original image plus the generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    pub image: SourceImage,
    pub quote: String,
    pub author: String,
    pub title: String,
}

impl StoryRequest {
    pub fn new(image: SourceImage, result: &GenerationResult) -> Self {
        Self {
            image,
            quote: result.quote.clone(),
            author: result.source.author.clone(),
            title: result.source.title.clone(),
        }
    }
}
