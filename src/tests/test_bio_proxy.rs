#[cfg(test)]
mod tests {
    use crate::bio_proxy::{
        build_prompt, extract_candidate_text, handle_bio_request, BioGenerator, BioPayload,
        GenerationOptions, ProxyState, CORS_HEADERS, MSG_CONFIGURATION, MSG_GENERATION_FAILED,
        MSG_METHOD_NOT_ALLOWED, MSG_MISSING_BODY, MSG_MISSING_NAME,
    };
    use crate::errors::BioGenerationError;
    use async_trait::async_trait;
    use axum::body::to_bytes;
    use axum::http::{Method, StatusCode};
    use axum::response::Response;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Copy)]
    enum Outcome {
        Text,
        NoCredential,
        Upstream,
    }

    struct FakeGenerator {
        outcome: Outcome,
        prompts: Mutex<Vec<(String, GenerationOptions)>>,
    }

    impl FakeGenerator {
        fn new(outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl BioGenerator for FakeGenerator {
        async fn generate(
            &self,
            prompt: &str,
            options: &GenerationOptions,
        ) -> Result<String, BioGenerationError> {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), options.clone()));
            match self.outcome {
                Outcome::Text => Ok("Una chispa de alegria.".to_string()),
                Outcome::NoCredential => Err(BioGenerationError::MissingCredential),
                Outcome::Upstream => Err(BioGenerationError::Upstream("HTTP 503".to_string())),
            }
        }
    }

    async fn call(generator: Arc<FakeGenerator>, method: Method, body: &str) -> Response {
        let state = ProxyState { generator };
        handle_bio_request(&state, &method, body.as_bytes()).await
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors(response: &Response) {
        for (name, value) in CORS_HEADERS {
            assert_eq!(
                response.headers().get(name).and_then(|v| v.to_str().ok()),
                Some(value),
                "missing {}",
                name
            );
        }
    }

    const PIKACHU: &str = r#"{"name":"pikachu","types":["electric"],"abilities":["static"]}"#;

    #[tokio::test]
    async fn test_preflight_is_no_content() {
        let response = call(FakeGenerator::new(Outcome::Text), Method::OPTIONS, "").await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_cors(&response);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[rstest]
    #[case(Method::GET, PIKACHU, StatusCode::METHOD_NOT_ALLOWED, MSG_METHOD_NOT_ALLOWED)]
    #[case(Method::PUT, PIKACHU, StatusCode::METHOD_NOT_ALLOWED, MSG_METHOD_NOT_ALLOWED)]
    #[case(Method::POST, "", StatusCode::BAD_REQUEST, MSG_MISSING_BODY)]
    #[case(Method::POST, "  \n", StatusCode::INTERNAL_SERVER_ERROR, MSG_GENERATION_FAILED)]
    #[case(Method::POST, "{}", StatusCode::BAD_REQUEST, MSG_MISSING_NAME)]
    #[case(Method::POST, r#"{"name":""}"#, StatusCode::BAD_REQUEST, MSG_MISSING_NAME)]
    #[case(Method::POST, r#"{"name":null}"#, StatusCode::BAD_REQUEST, MSG_MISSING_NAME)]
    #[case(Method::POST, "{nope", StatusCode::INTERNAL_SERVER_ERROR, MSG_GENERATION_FAILED)]
    #[tokio::test]
    async fn test_rejected_requests(
        #[case] method: Method,
        #[case] body: &str,
        #[case] status: StatusCode,
        #[case] message: &str,
    ) {
        let generator = FakeGenerator::new(Outcome::Text);
        let response = call(generator.clone(), method, body).await;

        assert_eq!(response.status(), status);
        assert_cors(&response);
        assert_eq!(body_json(response).await, json!({ "message": message }));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_generation() {
        let generator = FakeGenerator::new(Outcome::Text);
        let body = r#"{"name":"pikachu","types":["electric"],"abilities":["static","lightning-rod"],
                       "language":"es","maxWords":40,"model":"gemini-2.5-flash","temperature":0.5}"#;
        let response = call(generator.clone(), Method::POST, body).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert_eq!(
            body_json(response).await,
            json!({ "bio": "Una chispa de alegria." })
        );

        let prompts = generator.prompts.lock().unwrap();
        let (prompt, options) = &prompts[0];
        assert!(prompt.contains("pikachu"));
        assert!(prompt.contains("static, lightning-rod"));
        assert!(prompt.contains("Spanish"));
        assert_eq!(options.temperature, Some(0.5));
    }

    #[tokio::test]
    async fn test_blank_name_is_passed_through() {
        let generator = FakeGenerator::new(Outcome::Text);
        let response = call(generator.clone(), Method::POST, r#"{"name":"  "}"#).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(generator.prompts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_is_generic_configuration_error() {
        let response = call(FakeGenerator::new(Outcome::NoCredential), Method::POST, PIKACHU).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        let body = body_json(response).await;
        assert_eq!(body, json!({ "message": MSG_CONFIGURATION }));
        assert!(!body.to_string().contains("GEMINI"));
    }

    #[tokio::test]
    async fn test_upstream_failure_is_generation_error() {
        let response = call(FakeGenerator::new(Outcome::Upstream), Method::POST, PIKACHU).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "message": MSG_GENERATION_FAILED })
        );
    }

    #[test]
    fn test_prompt_defaults() {
        let payload = BioPayload {
            name: Some("eevee".to_string()),
            types: vec!["normal".to_string()],
            language: Some("en".to_string()),
            ..BioPayload::default()
        };
        let prompt = build_prompt("eevee", &payload);
        assert!(prompt.contains("at most 40 words"));
        assert!(prompt.contains("English"));
        assert!(prompt.contains("type normal"));
    }

    #[test]
    fn test_candidate_text_extraction() {
        let response = json!({
            "candidates": [{
                "content": { "parts": [{ "text": " Hello " }, { "text": "there." }] }
            }]
        });
        assert_eq!(
            extract_candidate_text(&response).as_deref(),
            Some("Hello there.")
        );
        assert_eq!(extract_candidate_text(&json!({ "candidates": [] })), None);
        assert_eq!(
            extract_candidate_text(&json!({
                "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
            })),
            None
        );
    }
}
