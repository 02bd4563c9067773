//! Browser-side execution of AI service calls via `fetch`.

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Request, RequestInit, RequestMode, Response};

use escape_engine::service::gemini;
use escape_engine::{GenerateRequest, ServiceCall, ServiceConfig, ServiceError, ServiceResult};

use crate::runner::{Dispatcher, ReplyInbox};

/// Runs each call as a `spawn_local` task and posts the outcome to the inbox.
pub struct FetchDispatcher;

impl Dispatcher for FetchDispatcher {
    fn dispatch(&mut self, call: ServiceCall, config: &ServiceConfig, inbox: &ReplyInbox) {
        let ServiceCall { id, request } = call;
        // No key: answer on the next tick without touching the network.
        if let Err(e) = config.api_key() {
            log::warn!("service call {id:?} skipped: {e}");
            inbox.deliver(id, Err(e));
            return;
        }

        let config = config.clone();
        let inbox = inbox.clone();
        spawn_local(async move {
            let result = execute(&config, &request).await;
            if let Err(e) = &result {
                log::warn!("service call {id:?} failed: {e}");
            }
            inbox.deliver(id, result);
        });
    }
}

async fn execute(config: &ServiceConfig, request: &GenerateRequest) -> ServiceResult {
    let key = config.api_key()?;
    let inline_data = match &request.image {
        Some(image) => Some(load_base64(&image.url).await?),
        None => None,
    };
    let body = gemini::request_body(request, inline_data.as_deref()).to_string();
    let reply = post_json(&gemini::endpoint_url(config), key, &body).await?;
    gemini::response_text(&reply)
}

fn js_err(value: JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

fn transport(value: JsValue) -> ServiceError {
    ServiceError::Transport(js_err(value))
}

fn asset(value: JsValue) -> ServiceError {
    ServiceError::Asset(js_err(value))
}

async fn fetch(request: &Request) -> Result<Response, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let value = JsFuture::from(window.fetch_with_request(request)).await?;
    value.dyn_into::<Response>()
}

async fn post_json(url: &str, key: &str, body: &str) -> Result<String, ServiceError> {
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_mode(RequestMode::Cors);
    init.set_body(&JsValue::from_str(body));

    let request = Request::new_with_str_and_init(url, &init).map_err(transport)?;
    let headers = request.headers();
    headers.set("Content-Type", "application/json").map_err(transport)?;
    headers.set(gemini::API_KEY_HEADER, key).map_err(transport)?;

    let response = fetch(&request).await.map_err(transport)?;
    if !response.ok() {
        return Err(ServiceError::Status(response.status()));
    }
    let text = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?;
    text.as_string()
        .ok_or_else(|| ServiceError::Malformed("response body is not text".to_string()))
}

/// Fetch a same-origin asset and return it base64-encoded.
async fn load_base64(url: &str) -> Result<String, ServiceError> {
    let request = Request::new_with_str(url).map_err(asset)?;
    let response = fetch(&request).await.map_err(asset)?;
    if !response.ok() {
        return Err(ServiceError::Asset(format!("{url}: HTTP {}", response.status())));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(asset)?)
        .await
        .map_err(asset)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    Ok(gemini::encode_inline(&bytes))
}
