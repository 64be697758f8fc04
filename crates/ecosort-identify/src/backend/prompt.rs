use serde::Serialize;

use crate::request::IdentificationRequest;

const CATEGORY_CHOICES: &str =
    "one of: plastic, paper, glass, metal, organic, electronic, hazardous, mixed";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentPart {
    Text { text: String },
    Image { image: String },
}

/// The system and user messages sent to the generative endpoint.
pub fn messages_for(request: &IdentificationRequest) -> Vec<ChatMessage> {
    let (system, user) = match request {
        IdentificationRequest::ImageCapture { image } => (
            image_system_prompt(),
            MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "Identify this item and tell me if it's recyclable.".to_string(),
                },
                ContentPart::Image {
                    image: image.as_captured().to_string(),
                },
            ]),
        ),
        IdentificationRequest::BarcodeCapture { image } => (
            barcode_system_prompt(),
            MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "Scan this barcode and identify the product's recycling information."
                        .to_string(),
                },
                ContentPart::Image {
                    image: image.as_captured().to_string(),
                },
            ]),
        ),
        IdentificationRequest::TextQuery { text } => (
            search_system_prompt(),
            MessageContent::Text(format!("What are the recycling guidelines for: {text}")),
        ),
    };
    vec![
        ChatMessage {
            role: "system",
            content: MessageContent::Text(system),
        },
        ChatMessage {
            role: "user",
            content: user,
        },
    ]
}

fn image_system_prompt() -> String {
    format!(
        "You are a recycling expert AI. Analyze the image to identify the main item and determine if it's recyclable.\n\n\
Respond in this exact JSON format:\n\
{{\n  \"item\": \"specific item name\",\n  \"category\": \"{CATEGORY_CHOICES}\",\n  \"recyclable\": true or false\n}}\n\n\
Be accurate about recycling classification based on common recycling guidelines."
    )
}

fn barcode_system_prompt() -> String {
    format!(
        "You are a barcode scanning expert AI. Analyze the image to detect and read barcodes, then provide recycling information for the product.\n\n\
Respond in this exact JSON format:\n\
{{\n  \"item\": \"product name from barcode\",\n  \"category\": \"{CATEGORY_CHOICES}\",\n  \"material\": \"specific material type\",\n  \"recyclable\": true or false,\n  \"barcode\": \"detected barcode number if visible\"\n}}\n\n\
If no barcode is detected, analyze the visible product instead."
    )
}

fn search_system_prompt() -> String {
    format!(
        "You are a comprehensive recycling database AI. Based on the item name provided, give detailed recycling information.\n\n\
Respond in this exact JSON format:\n\
{{\n  \"item\": \"cleaned up item name\",\n  \"category\": \"{CATEGORY_CHOICES}\",\n  \"material\": \"specific material type\",\n  \"recyclable\": true or false,\n  \"commonVariations\": [\"list of similar items\"]\n}}\n\n\
Be comprehensive and accurate about recycling guidelines."
    )
}
