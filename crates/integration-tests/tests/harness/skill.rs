//! Request envelope builders and response accessors

use std::time::Duration;

use serde_json::{Value, json};

use super::server::TestServer;

/// Envelope for a request of `request` kind with the given session attributes
pub fn envelope(request: Value, attributes: &Value, apl: bool) -> Value {
    let interfaces = if apl {
        json!({"Alexa.Presentation.APL": {"runtime": {"maxVersion": "2024.2"}}})
    } else {
        json!({})
    };

    json!({
        "version": "1.0",
        "session": {"new": false, "sessionId": "amzn1.echo-api.session.test", "attributes": attributes},
        "context": {"System": {"device": {"deviceId": "device-1", "supportedInterfaces": interfaces}}},
        "request": request
    })
}

pub fn launch(request_id: &str) -> Value {
    envelope(
        json!({"type": "LaunchRequest", "requestId": request_id}),
        &json!({}),
        true,
    )
}

pub fn intent(name: &str, request_id: &str, slots: Value, attributes: &Value) -> Value {
    envelope(
        json!({"type": "IntentRequest", "requestId": request_id, "intent": {"name": name, "slots": slots}}),
        attributes,
        true,
    )
}

pub fn story(request_id: &str, subject: &str) -> Value {
    intent(
        "StoryIntent",
        request_id,
        json!({"subject": {"name": "subject", "value": subject}}),
        &json!({}),
    )
}

pub fn question(request_id: &str, text: &str, attributes: &Value) -> Value {
    intent(
        "QuestionIntent",
        request_id,
        json!({"question": {"name": "question", "value": text}}),
        attributes,
    )
}

pub fn yes(request_id: &str, attributes: &Value) -> Value {
    intent("AMAZON.YesIntent", request_id, json!({}), attributes)
}

pub fn no(request_id: &str, attributes: &Value) -> Value {
    intent("AMAZON.NoIntent", request_id, json!({}), attributes)
}

/// Spoken markup of a response, empty when there is none
pub fn speech(response: &Value) -> &str {
    response["response"]["outputSpeech"]["ssml"].as_str().unwrap_or_default()
}

pub fn reprompt(response: &Value) -> &str {
    response["response"]["reprompt"]["outputSpeech"]["ssml"]
        .as_str()
        .unwrap_or_default()
}

pub fn attributes(response: &Value) -> Value {
    response["sessionAttributes"].clone()
}

/// Say "yes" until the pending story is delivered or reported as failed
pub async fn wait_for_story(server: &TestServer, attributes: &Value) -> Value {
    for attempt in 0..200 {
        let response = server.turn(&yes(&format!("req-yes-{attempt}"), attributes)).await;
        if response["sessionAttributes"]["awaitingStoryConfirmation"] != true {
            return response;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    panic!("story was not settled in time");
}
