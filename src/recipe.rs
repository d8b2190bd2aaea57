//! Response generation: one agent run per request, flattened to text at the edge.

use std::sync::Arc;

use thiserror::Error;

use crate::agent::{AgentError, Conversation, RecipeAgent};
use crate::config::{ApiKey, Config};
use crate::llm::LlmError;

/// Categorized failure of a generation request.
///
/// `Display` is the bare underlying message; [`ResponseGenerator::generate`] adds the
/// `"Error: "` prefix.
#[derive(Debug, Error)]
pub enum RecipeError {
    /// Client construction failed before any request was sent
    #[error("{0}")]
    Setup(String),

    /// The model endpoint could not be reached
    #[error("{0}")]
    Network(String),

    /// The model endpoint answered with an error
    #[error("{0}")]
    Upstream(String),

    /// The model endpoint answered with something unreadable
    #[error("{0}")]
    Parse(String),

    /// The agent finished without a usable final message
    #[error("{0}")]
    Incomplete(String),
}

impl From<AgentError> for RecipeError {
    fn from(err: AgentError) -> Self {
        let message = err.to_string();
        match err {
            AgentError::Llm(LlmError::Setup(_)) | AgentError::Weather(_) => {
                RecipeError::Setup(message)
            }
            AgentError::Llm(LlmError::Network(_)) => RecipeError::Network(message),
            AgentError::Llm(LlmError::Api { .. }) => RecipeError::Upstream(message),
            AgentError::Llm(LlmError::Parse(_)) => RecipeError::Parse(message),
            AgentError::MaxIterations(_) => RecipeError::Incomplete(message),
        }
    }
}

/// Builds a fresh agent for each request.
pub type AgentFactory = Arc<dyn Fn() -> Result<RecipeAgent, AgentError> + Send + Sync>;

/// Turns free text into a recipe.
#[derive(Clone)]
pub struct ResponseGenerator {
    factory: AgentFactory,
}

impl ResponseGenerator {
    /// Generator that builds a real agent with the given configuration and credential.
    pub fn new(config: Config, credential: ApiKey) -> Self {
        let config = Arc::new(config);
        Self::with_factory(Arc::new(move || {
            RecipeAgent::build(&config, credential.clone())
        }))
    }

    pub fn with_factory(factory: AgentFactory) -> Self {
        Self { factory }
    }

    /// Run one request, keeping the failure category.
    pub async fn try_generate(&self, text: &str) -> Result<String, RecipeError> {
        let agent = (self.factory)()?;
        let conversation = agent.invoke(Conversation::from_user(text)).await?;

        conversation
            .final_content()
            .map(str::to_string)
            .ok_or_else(|| RecipeError::Incomplete("no message in final response".to_string()))
    }

    /// Run one request. Never fails: errors come back as `"Error: <message>"`.
    pub async fn generate(&self, text: &str) -> String {
        match self.try_generate(text).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = ?e, "Recipe generation failed");
                format!("Error: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentRuntime;
    use crate::llm::{ChatMessage, ChatRequest, ChatResponse, LlmClient, Role, ToolCall};
    use crate::tools::ToolRegistry;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FRENCH_STOPWORDS: [&str; 8] = ["le", "la", "les", "de", "des", "et", "une", "pour"];

    fn looks_french(text: &str) -> bool {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .map(|w| w.to_lowercase())
            .collect();
        FRENCH_STOPWORDS
            .iter()
            .filter(|stop| words.iter().any(|w| w == *stop))
            .count()
            >= 3
    }

    /// Asks for the weather of the city it finds, then writes a recipe from the tool result.
    struct FrenchCook;

    #[async_trait]
    impl LlmClient for FrenchCook {
        async fn chat_completion(
            &self,
            request: ChatRequest<'_>,
        ) -> Result<ChatResponse, LlmError> {
            let last = request.messages.last().cloned().unwrap_or_else(|| ChatMessage::user(""));
            if last.role == Role::User {
                let text = last.content.unwrap_or_default();
                let city = text.split_whitespace().last().unwrap_or("Paris").to_string();
                return Ok(ChatResponse {
                    tool_calls: Some(vec![ToolCall::new(
                        "call_1",
                        "get_weather",
                        json!({ "city": city }).to_string(),
                    )]),
                    ..ChatResponse::default()
                });
            }

            let observed = last.content.unwrap_or_default();
            let answer = if observed.contains("Cloudy") {
                "Par ce temps nuageux et frais, voici une recette de gratin de cardons à la lyonnaise : \
                 faites cuire les cardons, ajoutez la béchamel et le fromage, puis gratinez pour le dîner."
            } else {
                "La météo n'est pas disponible, voici donc une recette de la ville : \
                 la soupe à l'oignon gratinée, avec des oignons, du bouillon et du fromage."
            };
            Ok(ChatResponse {
                content: Some(answer.to_string()),
                ..ChatResponse::default()
            })
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn chat_completion(&self, _: ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
            Err(LlmError::Network("boom".to_string()))
        }
    }

    fn config_with_weather(base_url: String) -> Config {
        let mut config = Config::default();
        config.weather.base_url = base_url;
        config
    }

    fn generator_with(config: Config, llm: Arc<dyn LlmClient>) -> ResponseGenerator {
        ResponseGenerator::with_factory(Arc::new(move || {
            RecipeAgent::build_with_llm(&config, llm.clone())
        }))
    }

    #[tokio::test]
    async fn lyon_end_to_end_produces_french_recipe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/lyon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "current_condition": {"temp_C": "5", "weatherDesc": [{"value": "Cloudy"}]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = generator_with(config_with_weather(server.uri()), Arc::new(FrenchCook));
        let response = generator.generate("Je suis à Lyon").await;

        assert!(!response.is_empty());
        assert!(!response.starts_with("Error:"));
        assert!(response.contains("nuageux"));
        assert!(looks_french(&response));
    }

    #[tokio::test]
    async fn weather_outage_still_returns_a_recipe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let generator = generator_with(config_with_weather(server.uri()), Arc::new(FrenchCook));
        let response = generator.generate("Paris").await;

        assert!(!response.is_empty());
        assert!(!response.starts_with("Error:"));
        assert!(looks_french(&response));
    }

    #[tokio::test]
    async fn llm_failure_is_flattened_to_error_string() {
        let generator = generator_with(Config::default(), Arc::new(FailingLlm));
        assert_eq!(generator.generate("Lyon").await, "Error: boom");

        let err = generator.try_generate("Lyon").await.unwrap_err();
        assert!(matches!(err, RecipeError::Network(_)));
    }

    #[tokio::test]
    async fn empty_final_answer_is_returned_unchanged() {
        struct Silent;

        #[async_trait]
        impl LlmClient for Silent {
            async fn chat_completion(&self, _: ChatRequest<'_>) -> Result<ChatResponse, LlmError> {
                Ok(ChatResponse {
                    content: Some(String::new()),
                    ..ChatResponse::default()
                })
            }
        }

        let generator = generator_with(Config::default(), Arc::new(Silent));
        assert_eq!(generator.generate("Lyon").await, "");
    }

    #[tokio::test]
    async fn factory_failure_is_flattened_to_error_string() {
        let generator = ResponseGenerator::with_factory(Arc::new(|| -> Result<RecipeAgent, AgentError> {
            Err(AgentError::Llm(LlmError::Setup("no TLS backend".to_string())))
        }));
        assert_eq!(generator.generate("Lyon").await, "Error: no TLS backend");

        let err = generator.try_generate("Lyon").await.unwrap_err();
        assert!(matches!(err, RecipeError::Setup(_)));
    }

    #[tokio::test]
    async fn builds_a_fresh_agent_per_call() {
        struct Canned;

        #[async_trait]
        impl AgentRuntime for Canned {
            async fn respond(
                &self,
                mut conversation: Conversation,
                _tools: &ToolRegistry,
            ) -> Result<Conversation, AgentError> {
                conversation.push(ChatMessage::assistant("Une tarte aux pommes."));
                Ok(conversation)
            }
        }

        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let generator = ResponseGenerator::with_factory(Arc::new(move || -> Result<RecipeAgent, AgentError> {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(RecipeAgent::from_parts(Arc::new(Canned), ToolRegistry::new()))
        }));

        assert_eq!(generator.generate("Rouen").await, "Une tarte aux pommes.");
        assert_eq!(generator.generate("Caen").await, "Une tarte aux pommes.");
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn returns_content_of_the_last_message_only() {
        struct EchoLast;

        #[async_trait]
        impl AgentRuntime for EchoLast {
            async fn respond(
                &self,
                mut conversation: Conversation,
                _tools: &ToolRegistry,
            ) -> Result<Conversation, AgentError> {
                conversation.push(ChatMessage::assistant("premier"));
                conversation.push(ChatMessage::assistant("dernier"));
                Ok(conversation)
            }
        }

        let generator = ResponseGenerator::with_factory(Arc::new(|| -> Result<RecipeAgent, AgentError> {
            Ok(RecipeAgent::from_parts(Arc::new(EchoLast), ToolRegistry::new()))
        }));
        assert_eq!(generator.generate("Brest").await, "dernier");
    }
}
