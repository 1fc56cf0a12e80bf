//! # LLM Helpers
//!
//! Provider dispatch for structured LLM calls. Each provider client is a
//! distinct type, so the match lives in a macro rather than behind a trait
//! object.

/// Run an `LlmFunction` producing `$output_type` against the provider
/// selected by a `ModelConfig`.
#[macro_export]
macro_rules! run_llm_function {
    ($config:expr, $output_type:ty, $system_prompt:expr, $input:expr) => {{
        use radkit::models::providers::{
            AnthropicLlm, DeepSeekLlm, GeminiLlm, GrokLlm, OpenAILlm, OpenRouterLlm,
        };
        use $crate::models::LlmProvider;

        let config = $config;
        let result: anyhow::Result<$output_type> = match config.provider {
            LlmProvider::Anthropic => $crate::__llm_function_call!(
                AnthropicLlm::from_env(&config.model)?,
                $output_type,
                $system_prompt,
                $input
            ),
            LlmProvider::OpenAI => {
                let mut llm = OpenAILlm::from_env(&config.model)?;
                if let Some(base_url) = &config.base_url {
                    llm = llm.with_base_url(base_url);
                }
                $crate::__llm_function_call!(llm, $output_type, $system_prompt, $input)
            }
            LlmProvider::Gemini => $crate::__llm_function_call!(
                GeminiLlm::from_env(&config.model)?,
                $output_type,
                $system_prompt,
                $input
            ),
            LlmProvider::OpenRouter => $crate::__llm_function_call!(
                OpenRouterLlm::from_env(&config.model)?,
                $output_type,
                $system_prompt,
                $input
            ),
            LlmProvider::Grok => $crate::__llm_function_call!(
                GrokLlm::from_env(&config.model)?,
                $output_type,
                $system_prompt,
                $input
            ),
            LlmProvider::DeepSeek => $crate::__llm_function_call!(
                DeepSeekLlm::from_env(&config.model)?,
                $output_type,
                $system_prompt,
                $input
            ),
        };
        result
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __llm_function_call {
    ($llm:expr, $output_type:ty, $system_prompt:expr, $input:expr) => {{
        let func = radkit::agent::LlmFunction::<$output_type>::new_with_system_instructions(
            $llm,
            $system_prompt,
        );
        func.run($input).await.map_err(Into::into)
    }};
}

pub use run_llm_function;
