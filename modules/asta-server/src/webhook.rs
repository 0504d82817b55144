use std::sync::{Arc, LazyLock};

use axum::{
    extract::{Form, State},
    http::header,
    response::{IntoResponse, Response},
};
use regex::Regex;
use serde::Deserialize;
use tracing::{info, warn};

use asta_core::ServerDeps;
use asta_domains::Property;

/// Twilio posts inbound WhatsApp messages as form fields; `Body` is the
/// message text, `From` the sender's number.
#[derive(Deserialize)]
pub struct TwilioWebhook {
    #[serde(rename = "Body")]
    pub body: String,
    #[serde(rename = "From")]
    pub from: String,
}

static SEARCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:find|search)\b[\s:,-]*(.*)$").unwrap());

/// What the sender wants: a search, or a new listing to ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Search(String),
    Submit,
}

pub fn parse_intent(text: &str) -> Intent {
    if let Some(caps) = SEARCH_RE.captures(text) {
        return Intent::Search(caps[1].trim().to_string());
    }
    Intent::Submit
}

/// Inbound WhatsApp webhook. Always answers with TwiML — a per-message
/// failure becomes an apologetic reply, never a 500 back at Twilio.
pub async fn whatsapp(
    State(deps): State<Arc<ServerDeps>>,
    Form(form): Form<TwilioWebhook>,
) -> Response {
    info!(from = form.from.as_str(), "WhatsApp message received");

    let reply = match parse_intent(&form.body) {
        Intent::Search(query) if query.is_empty() => {
            "Tell me where to look, e.g. \"find Osu\".".to_string()
        }
        Intent::Search(query) => search_reply(&deps, &query).await,
        Intent::Submit => submit_reply(&deps, &form.body).await,
    };

    twiml(&reply)
}

async fn search_reply(deps: &ServerDeps, query: &str) -> String {
    match Property::search_by_location(query, 5, deps.pool()).await {
        Ok(properties) if properties.is_empty() => {
            format!("No active listings found around \"{query}\" yet.")
        }
        Ok(properties) => {
            let mut lines = vec![format!("Top listings around \"{query}\":")];
            for (i, p) in properties.iter().enumerate() {
                lines.push(format!(
                    "{}. {} — GHS {:.0} ({})",
                    i + 1,
                    p.title,
                    p.price,
                    p.property_type
                ));
            }
            lines.join("\n")
        }
        Err(e) => {
            warn!(error = %e, "Webhook search failed");
            "Something went wrong searching listings. Please try again.".to_string()
        }
    }
}

async fn submit_reply(deps: &ServerDeps, raw_text: &str) -> String {
    let draft = match deps.extractor.extract(raw_text).await {
        Ok(draft) => draft,
        Err(e) => {
            warn!(error = %e, "Webhook extraction failed");
            return "Sorry, I couldn't read a property listing in that message. \
                    Try including the place, price, and whether it's for rent or sale."
                .to_string();
        }
    };

    match Property::save(&draft, deps.pool()).await {
        Some(property) => format!(
            "Listed: {} in {} at GHS {:.0}. Thanks!",
            property.title, property.location_name, property.price
        ),
        None => "Your listing was understood but couldn't be saved. Please resend it.".to_string(),
    }
}

/// Minimal TwiML message response.
fn twiml(message: &str) -> Response {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Response><Message>{}</Message></Response>",
        escape_xml(message)
    );
    ([(header::CONTENT_TYPE, "application/xml")], body).into_response()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
